use serde::{Deserialize, Serialize};

/// The `_NET_WM_STATE` entries a window can carry.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum WindowState {
    Modal,
    Sticky,
    MaximizedVert,
    MaximizedHorz,
    Shaded,
    SkipTaskbar,
    SkipPager,
    Hidden,
    Fullscreen,
    Above,
    Below,
    DemandsAttention,
}

/// The three ways a client message may ask to change a window state.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum StateChange {
    Remove,
    Add,
    Toggle,
}

impl StateChange {
    /// Maps the `_NET_WM_STATE` client message action (0, 1 or 2).
    #[must_use]
    pub const fn from_action(action: i64) -> Option<Self> {
        match action {
            0 => Some(Self::Remove),
            1 => Some(Self::Add),
            2 => Some(Self::Toggle),
            _ => None,
        }
    }

    /// The resulting state given the current one.
    #[must_use]
    pub const fn apply(self, current: bool) -> bool {
        match self {
            Self::Remove => false,
            Self::Add => true,
            Self::Toggle => !current,
        }
    }
}
