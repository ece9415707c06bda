use super::Xyhw;
use serde::{Deserialize, Serialize};

/// A physical output as reported by the display server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub output: String,
    pub bbox: Xyhw,
}

impl Screen {
    #[must_use]
    pub const fn new(bbox: Xyhw, output: String) -> Self {
        Self { output, bbox }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            output: String::default(),
            bbox: Xyhw::new(0, 0, 800, 600),
        }
    }
}
