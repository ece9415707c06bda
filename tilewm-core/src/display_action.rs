use crate::models::{Client, Handle, WindowHandle, WindowState, WorkspaceId};
use serde::{Deserialize, Serialize};

/// These are responses from the window manager.
/// The display server should act on these actions.
#[allow(clippy::large_enum_variant)]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum DisplayAction<H: Handle> {
    /// Nicely ask a window if it would please close at its convenience.
    #[serde(bound = "")]
    KillWindow(WindowHandle<H>),

    /// Get triggered after a new window is discovered and WE are
    /// managing it. Carries whether it floats.
    #[serde(bound = "")]
    AddedWindow(WindowHandle<H>, bool),

    /// Tell the DS we no longer care about this window and other
    /// cleanup.
    #[serde(bound = "")]
    DestroyedWindow(WindowHandle<H>),

    /// Tell a window that it is to become focused.
    #[serde(bound = "")]
    WindowTakeFocus {
        window: Client<H>,
        previous_window: Option<Client<H>>,
    },

    /// Remove focus on any window by focusing the root window and clearing the
    /// active window.
    #[serde(bound = "")]
    Unfocus(Option<WindowHandle<H>>),

    /// Change a window's state.
    #[serde(bound = "")]
    SetState(WindowHandle<H>, bool, WindowState),

    /// Sets the "z-index" order of the windows
    /// first in the array is top most
    #[serde(bound = "")]
    SetWindowOrder(Vec<WindowHandle<H>>),

    /// Raises a given window.
    #[serde(bound = "")]
    MoveToTop(WindowHandle<H>),

    /// Grab or release the move/resize button chords on a window.
    #[serde(bound = "")]
    SetButtonGrabs(WindowHandle<H>, bool),

    /// Grab the pointer for a move.
    #[serde(bound = "")]
    ReadyToMoveWindow(WindowHandle<H>),

    /// Grab the pointer for a resize.
    #[serde(bound = "")]
    ReadyToResizeWindow(WindowHandle<H>),

    /// Release the pointer after a move or resize.
    NormalMode,

    /// Publish the current desktop.
    SetCurrentWorkspace(WorkspaceId),

    /// Publish the desktop of a window.
    #[serde(bound = "")]
    SetWindowWorkspace(WindowHandle<H>, WorkspaceId),

    /// Send a synthetic configure notification with the client's current geometry.
    #[serde(bound = "")]
    ConfigureWindow(Client<H>),
}
