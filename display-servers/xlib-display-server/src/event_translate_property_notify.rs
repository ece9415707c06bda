use crate::XlibWindowHandle;

use super::{DisplayEvent, XWrap};
use tilewm_core::models::{WindowChange, WindowHandle};

use x11_dl::xlib;

pub fn from_event(
    xw: &XWrap,
    event: xlib::XPropertyEvent,
) -> Option<DisplayEvent<XlibWindowHandle>> {
    if event.window == xw.get_default_root()
        || event.state == xlib::PropertyDelete
        || !xw.managed_windows.contains(&event.window)
    {
        return None;
    }
    tracing::trace!("PropertyNotify: {:#x} : {}", event.window, event.atom);

    let handle = WindowHandle(XlibWindowHandle(event.window));
    let mut change = WindowChange::new(handle);
    match event.atom {
        xlib::XA_WM_TRANSIENT_FOR => {
            change.transient = Some(
                xw.get_transient_for(event.window)
                    .filter(|parent| *parent != xw.get_default_root())
                    .map(|parent| WindowHandle(XlibWindowHandle(parent))),
            );
        }
        xlib::XA_WM_NORMAL_HINTS => change.hints = Some(xw.get_size_hints(event.window)?),
        xlib::XA_WM_HINTS => {
            let hints = xw.get_wmhints(event.window)?;
            change.never_focus = Some(hints.flags & xlib::InputHint != 0 && hints.input == 0);
            change.urgent = Some(hints.flags & xlib::XUrgencyHint != 0);
        }
        xlib::XA_WM_NAME => change.name = Some(xw.get_window_name(event.window)),
        atom if atom == xw.atoms.NetWMName => change.name = Some(xw.get_window_name(event.window)),
        atom if atom == xw.atoms.NetWMWindowType => {
            change.r#type = Some(xw.get_window_type(event.window));
        }
        atom if atom == xw.atoms.NetWMState => {
            change.states = Some(xw.get_window_states(event.window));
        }
        _ => return None,
    }
    Some(DisplayEvent::WindowChange(change))
}
