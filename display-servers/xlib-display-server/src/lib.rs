//! An Xlib backend for tilewm.
// allow casting types
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod event_translate;
mod event_translate_client_message;
mod event_translate_property_notify;
mod xatom;
mod xcursor;
mod xwrap;

use serde::{Deserialize, Serialize};
pub use xwrap::{XWrap, XlibError};

use self::xwrap::ICONIC_STATE;
use event_translate::XEvent;
use futures::prelude::*;
use std::pin::Pin;
use tilewm_core::config::Config;
use tilewm_core::errors::{Result, TileError};
use tilewm_core::models::{Client, Handle, WindowHandle, WindowState, WorkspaceId};
use tilewm_core::{DisplayAction, DisplayEvent, DisplayServer};

use x11_dl::xlib;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct XlibWindowHandle(xlib::Window);
impl Handle for XlibWindowHandle {}

pub struct XlibDisplayServer {
    xw: XWrap,
    root: xlib::Window,
    initial_events: Vec<DisplayEvent<XlibWindowHandle>>,
}

impl DisplayServer<XlibWindowHandle> for XlibDisplayServer {
    fn new(config: &impl Config) -> Result<Self> {
        let mut wrap = XWrap::new().map_err(|err| TileError::DisplayServer(err.to_string()))?;

        wrap.init(config); // setup events masks

        let root = wrap.get_default_root();
        let mut instance = Self {
            xw: wrap,
            root,
            initial_events: Vec::new(),
        };
        instance.initial_events = instance.initial_events();
        Ok(instance)
    }

    fn load_config(
        &mut self,
        config: &impl Config,
        focused: Option<WindowHandle<XlibWindowHandle>>,
        clients: &[Client<XlibWindowHandle>],
    ) {
        self.xw.load_config(config, focused, clients);
    }

    fn update_windows(
        &self,
        clients: &[&Client<XlibWindowHandle>],
        focused: Option<WindowHandle<XlibWindowHandle>>,
    ) {
        let _guard = self.xw.visibility_guard();
        for client in clients {
            self.xw.update_window(client, focused == Some(client.handle));
        }
    }

    fn get_next_events(&mut self) -> Vec<DisplayEvent<XlibWindowHandle>> {
        let mut events = std::mem::take(&mut self.initial_events);

        let events_in_queue = self.xw.queue_len();
        for _ in 0..events_in_queue {
            let xlib_event = self.xw.get_next_event();
            let event = XEvent(&mut self.xw, xlib_event).into();
            if let Some(e) = event {
                tracing::trace!("DisplayEvent: {:?}", e);
                events.push(e);
            }
        }

        compress_motion(events)
    }

    fn execute_action(
        &mut self,
        act: DisplayAction<XlibWindowHandle>,
    ) -> Option<DisplayEvent<XlibWindowHandle>> {
        tracing::trace!("DisplayAction: {:?}", act);
        let xw = &mut self.xw;
        let event: Option<DisplayEvent<XlibWindowHandle>> = match act {
            DisplayAction::KillWindow(h) => from_kill_window(xw, h),
            DisplayAction::AddedWindow(h, f) => from_added_window(xw, h, f),
            DisplayAction::DestroyedWindow(h) => from_destroyed_window(xw, h),
            DisplayAction::Unfocus(h) => from_unfocus(xw, h),
            DisplayAction::SetState(h, t, s) => from_set_state(xw, h, t, s),
            DisplayAction::SetWindowOrder(ws) => from_set_window_order(xw, ws),
            DisplayAction::MoveToTop(h) => from_move_to_top(xw, h),
            DisplayAction::SetButtonGrabs(h, g) => from_set_button_grabs(xw, h, g),
            DisplayAction::ReadyToMoveWindow(_) => from_ready_to_drag(xw, false),
            DisplayAction::ReadyToResizeWindow(_) => from_ready_to_drag(xw, true),
            DisplayAction::SetCurrentWorkspace(ws) => from_set_current_workspace(xw, ws),
            DisplayAction::SetWindowWorkspace(h, ws) => from_set_window_workspace(xw, h, ws),
            DisplayAction::ConfigureWindow(c) => from_configure_window(xw, &c),

            DisplayAction::WindowTakeFocus {
                window,
                previous_window,
            } => from_window_take_focus(xw, &window, previous_window.as_ref()),

            DisplayAction::NormalMode => from_normal_mode(xw),
        };
        if event.is_some() {
            tracing::trace!("DisplayEvent: {:?}", event);
        }
        event
    }

    fn wait_readable(&self) -> Pin<Box<dyn Future<Output = ()>>> {
        let task_notify = self.xw.task_notify.clone();
        Box::pin(async move {
            task_notify.notified().await;
        })
    }

    fn flush(&self) {
        self.xw.flush();
    }

    /// Where the pointer is and which managed window it is over.
    fn generate_pointer_sample(&self) -> Option<DisplayEvent<XlibWindowHandle>> {
        let pointer = self.xw.get_pointer().ok()?;
        let window = pointer
            .window
            .filter(|w| self.xw.managed_windows.contains(w))
            .map(|w| WindowHandle(XlibWindowHandle(w)));
        Some(DisplayEvent::PointerSample(window, pointer.x, pointer.y))
    }
}

impl XlibDisplayServer {
    /// Return a vec of events for setting up state of WM.
    fn initial_events(&self) -> Vec<DisplayEvent<XlibWindowHandle>> {
        let mut events = vec![DisplayEvent::ScreensChanged(self.xw.get_screens())];

        // Tell manager about existing windows.
        events.append(&mut self.find_all_windows());

        events
    }

    fn find_all_windows(&self) -> Vec<DisplayEvent<XlibWindowHandle>> {
        let mut all: Vec<DisplayEvent<XlibWindowHandle>> = Vec::new();
        match self.xw.get_all_windows() {
            Ok(handles) => handles.into_iter().for_each(|handle| {
                if handle == self.root {
                    return;
                }
                let Ok(attrs) = self.xw.get_window_attrs(handle) else {
                    return;
                };
                let iconic = self.xw.get_wm_state(handle) == Some(ICONIC_STATE);
                if attrs.map_state == xlib::IsViewable || iconic {
                    if let Some(event) = self.xw.setup_window(handle) {
                        all.push(event);
                    }
                }
            }),
            Err(err) => {
                tracing::error!("Could not list the existing windows: {err}");
            }
        }
        all
    }
}

/// Keep only the last of each run of consecutive motion events.
fn compress_motion(
    events: Vec<DisplayEvent<XlibWindowHandle>>,
) -> Vec<DisplayEvent<XlibWindowHandle>> {
    let mut compressed: Vec<DisplayEvent<XlibWindowHandle>> = Vec::with_capacity(events.len());
    for event in events {
        if matches!(event, DisplayEvent::Motion(..))
            && matches!(compressed.last(), Some(DisplayEvent::Motion(..)))
        {
            compressed.pop();
        }
        compressed.push(event);
    }
    compressed
}

// Display actions.
fn from_kill_window(
    xw: &mut XWrap,
    handle: WindowHandle<XlibWindowHandle>,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    xw.kill_window(&handle);
    None
}

fn from_added_window(
    xw: &mut XWrap,
    handle: WindowHandle<XlibWindowHandle>,
    floating: bool,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    xw.setup_managed_window(handle, floating);
    None
}

fn from_destroyed_window(
    xw: &mut XWrap,
    handle: WindowHandle<XlibWindowHandle>,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    let WindowHandle(XlibWindowHandle(window)) = handle;
    if xw.managed_windows.contains(&window) {
        let gone = xw.is_window_gone(window);
        xw.teardown_managed_window(&handle, gone);
    }
    None
}

fn from_unfocus(
    xw: &mut XWrap,
    handle: Option<WindowHandle<XlibWindowHandle>>,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    xw.unfocus(handle);
    None
}

fn from_set_state(
    xw: &mut XWrap,
    handle: WindowHandle<XlibWindowHandle>,
    toggle_to: bool,
    window_state: WindowState,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    let atom = xw.atoms.state_atom(window_state);
    xw.set_state(handle, toggle_to, atom);
    None
}

fn from_set_window_order(
    xw: &mut XWrap,
    windows: Vec<WindowHandle<XlibWindowHandle>>,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    // Unmanaged windows such as docks.
    let unmanaged: Vec<WindowHandle<XlibWindowHandle>> = xw
        .get_all_windows()
        .unwrap_or_default()
        .iter()
        .filter(|&w| *w != xw.get_default_root())
        .map(|&w| WindowHandle(XlibWindowHandle(w)))
        .filter(|h| !windows.iter().any(|w| w == h))
        .collect();
    // Unmanaged windows on top.
    xw.restack(&[unmanaged, windows].concat());
    None
}

fn from_move_to_top(
    xw: &mut XWrap,
    handle: WindowHandle<XlibWindowHandle>,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    xw.move_to_top(&handle);
    None
}

fn from_set_button_grabs(
    xw: &mut XWrap,
    handle: WindowHandle<XlibWindowHandle>,
    grab: bool,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    let WindowHandle(XlibWindowHandle(window)) = handle;
    if grab {
        let is_focused = xw.focused_window == window;
        xw.grab_mouse_clicks(window, is_focused);
    } else {
        xw.ungrab_buttons(window);
    }
    None
}

fn from_ready_to_drag(xw: &mut XWrap, resize: bool) -> Option<DisplayEvent<XlibWindowHandle>> {
    xw.begin_drag(resize);
    None
}

fn from_set_current_workspace(
    xw: &mut XWrap,
    workspace: WorkspaceId,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    xw.set_current_desktop(workspace);
    None
}

fn from_set_window_workspace(
    xw: &mut XWrap,
    handle: WindowHandle<XlibWindowHandle>,
    workspace: WorkspaceId,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    let WindowHandle(XlibWindowHandle(window)) = handle;
    xw.set_window_desktop(window, workspace);
    None
}

fn from_configure_window(
    xw: &mut XWrap,
    client: &Client<XlibWindowHandle>,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    xw.configure_window(client);
    None
}

fn from_window_take_focus(
    xw: &mut XWrap,
    window: &Client<XlibWindowHandle>,
    previous_window: Option<&Client<XlibWindowHandle>>,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    xw.window_take_focus(window, previous_window);
    None
}

fn from_normal_mode(xw: &mut XWrap) -> Option<DisplayEvent<XlibWindowHandle>> {
    xw.end_drag();
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: xlib::Window) -> WindowHandle<XlibWindowHandle> {
        WindowHandle(XlibWindowHandle(id))
    }

    #[test]
    fn consecutive_motion_collapses_to_the_last() {
        let events = vec![
            DisplayEvent::Motion(1, 1),
            DisplayEvent::Motion(2, 2),
            DisplayEvent::Motion(3, 3),
        ];
        let compressed = compress_motion(events);
        assert_eq!(compressed.len(), 1);
        assert!(matches!(compressed[0], DisplayEvent::Motion(3, 3)));
    }

    #[test]
    fn motion_separated_by_other_events_is_kept() {
        let events = vec![
            DisplayEvent::Motion(1, 1),
            DisplayEvent::WindowEnter(handle(7)),
            DisplayEvent::Motion(2, 2),
            DisplayEvent::Motion(4, 4),
            DisplayEvent::ButtonRelease(4, 4),
        ];
        let compressed = compress_motion(events);
        assert_eq!(compressed.len(), 4);
        assert!(matches!(compressed[0], DisplayEvent::Motion(1, 1)));
        assert!(matches!(compressed[2], DisplayEvent::Motion(4, 4)));
        assert!(matches!(compressed[3], DisplayEvent::ButtonRelease(4, 4)));
    }

    #[test]
    fn no_motion_leaves_events_alone() {
        let events = vec![
            DisplayEvent::WindowDestroy(handle(1)),
            DisplayEvent::WindowEnter(handle(2)),
        ];
        assert_eq!(compress_motion(events).len(), 2);
    }
}
