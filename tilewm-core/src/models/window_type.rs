use serde::{Deserialize, Serialize};

/// The `_NET_WM_WINDOW_TYPE` of a window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowType {
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
    #[default]
    Normal,
}

impl WindowType {
    /// Types that are placed by hand rather than by the layout.
    #[must_use]
    pub const fn prefers_floating(self) -> bool {
        matches!(self, Self::Dialog | Self::Utility | Self::Splash)
    }
}
