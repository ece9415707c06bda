use crate::XlibWindowHandle;

use super::{DisplayEvent, XWrap};
use std::os::raw::c_long;
use tilewm_core::Command;
use tilewm_core::models::{StateChange, WindowChange, WindowHandle};

use x11_dl::xlib;

pub fn from_event(
    xw: &XWrap,
    event: xlib::XClientMessageEvent,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    let root = xw.get_default_root();
    if !xw.managed_windows.contains(&event.window) && event.window != root {
        return None;
    }
    tracing::trace!(
        "ClientMessage: {:#x} : {}",
        event.window,
        event.message_type
    );

    if event.message_type == xw.atoms.NetCurrentDesktop {
        let value = event.data.get_long(0);
        return match usize::try_from(value) {
            Ok(index) => Some(DisplayEvent::SendCommand(Command::SwitchWorkspace(index))),
            Err(err) => {
                tracing::debug!("Invalid desktop index ({value}) requested: {err}");
                None
            }
        };
    }

    if event.window == root {
        return None;
    }
    let handle = WindowHandle(XlibWindowHandle(event.window));

    if event.message_type == xw.atoms.NetActiveWindow {
        return Some(DisplayEvent::ActivateWindow(handle));
    }

    if event.message_type != xw.atoms.NetWMState {
        return None;
    }

    // The engine owns fullscreen; it writes the property back once it has decided.
    let fullscreen = xw.atoms.NetWMStateFullscreen as c_long;
    if event.data.get_long(1) == fullscreen || event.data.get_long(2) == fullscreen {
        let action = event.data.get_long(0);
        return StateChange::from_action(action.into())
            .map(|change| DisplayEvent::SetFullscreen(handle, change));
    }

    let action = StateChange::from_action(event.data.get_long(0).into())?;
    let current = xw.get_window_states_atoms(event.window);
    for index in 1..=2 {
        let atom = event.data.get_long(index) as xlib::Atom;
        if atom == 0 || xw.atoms.window_state(atom).is_none() {
            continue;
        }
        let toggle_to = action.apply(current.contains(&atom));
        xw.set_state(handle, toggle_to, atom);
    }

    let mut change = WindowChange::new(handle);
    change.states = Some(xw.get_window_states(event.window));
    Some(DisplayEvent::WindowChange(change))
}
