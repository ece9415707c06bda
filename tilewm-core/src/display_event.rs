use crate::Command;
use crate::models::{Client, Handle, Screen, StateChange, WindowChange, WindowHandle};
use crate::utils::modmask_lookup::{Button, ModMask};

/// Everything the display server reports to the engine.
#[derive(Debug)]
pub enum DisplayEvent<H: Handle> {
    /// A key combination was pressed. The key is a keysym name.
    KeyCombo(ModMask, String),
    /// A button was pressed on a window: modifiers, button, window and root coordinates.
    MouseCombo(ModMask, Button, WindowHandle<H>, i32, i32),
    /// The pointer moved to the given root coordinates.
    Motion(i32, i32),
    /// A button was released at the given root coordinates.
    ButtonRelease(i32, i32),
    /// A window wants to be shown; the coordinates are where the pointer is.
    WindowCreate(Client<H>, i32, i32),
    WindowChange(WindowChange<H>),
    /// The window no longer exists.
    WindowDestroy(WindowHandle<H>),
    /// The pointer entered a window through a normal crossing.
    WindowEnter(WindowHandle<H>),
    /// A client asked to be activated.
    ActivateWindow(WindowHandle<H>),
    /// A client asked to enter or leave fullscreen.
    SetFullscreen(WindowHandle<H>, StateChange),
    /// Periodic pointer sample: window under the pointer (if managed or not) and position.
    PointerSample(Option<WindowHandle<H>>, i32, i32),
    /// The output topology changed; this is the full new set.
    ScreensChanged(Vec<Screen>),
    SendCommand(Command),
}
