use super::{Corner, Handle, WindowHandle, Xyhw};
use serde::{Deserialize, Serialize};

/// The pointer interaction in progress. At most one drag exists at a time.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode<H: Handle> {
    #[default]
    Normal,
    #[serde(bound = "")]
    MovingWindow {
        handle: WindowHandle<H>,
        last: (i32, i32),
        was_tiled: bool,
    },
    #[serde(bound = "")]
    ResizingWindow {
        handle: WindowHandle<H>,
        corner: Corner,
        /// Pointer position when the button went down.
        origin: (i32, i32),
        /// Geometry when the button went down.
        start: Xyhw,
    },
}

impl<H: Handle> Mode<H> {
    /// The window being dragged, if any.
    #[must_use]
    pub const fn dragged(&self) -> Option<WindowHandle<H>> {
        match self {
            Self::Normal => None,
            Self::MovingWindow { handle, .. } | Self::ResizingWindow { handle, .. } => {
                Some(*handle)
            }
        }
    }

    #[must_use]
    pub const fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}
