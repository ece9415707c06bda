use crate::XlibWindowHandle;

use super::xwrap::WITHDRAWN_STATE;
use super::{DisplayEvent, XWrap, event_translate_client_message, event_translate_property_notify};
use std::os::raw::c_ulong;
use tilewm_core::models::{WindowChange, WindowHandle, Xyhw};
use tilewm_core::utils::modmask_lookup::{Button, ModMask};
use x11_dl::xlib;

pub struct XEvent<'a>(pub &'a mut XWrap, pub xlib::XEvent);

impl From<XEvent<'_>> for Option<DisplayEvent<XlibWindowHandle>> {
    fn from(x_event: XEvent) -> Self {
        let raw_event = x_event.1;
        let dragging = x_event.0.dragging;

        match raw_event.get_type() {
            // New window is mapped.
            xlib::MapRequest => from_map_request(x_event),
            // Window is unmapped.
            xlib::UnmapNotify => from_unmap_event(x_event),
            // Window is destroyed.
            xlib::DestroyNotify => from_destroy_notify(x_event),
            // Window is taking focus.
            xlib::FocusIn => from_focus_in(&x_event),
            // Window client message.
            xlib::ClientMessage => from_client_message(x_event),
            // Window property notify.
            xlib::PropertyNotify => from_property_notify(x_event),
            // Window configure request.
            xlib::ConfigureRequest => from_configure_request(&x_event),
            // The root changed size, outputs were added or removed.
            xlib::ConfigureNotify => from_configure_notify(&x_event),
            // Mouse entered notify.
            xlib::EnterNotify if !dragging => from_enter_notify(&x_event),
            // Mouse motion notify.
            xlib::MotionNotify if dragging => from_motion_notify(x_event),
            // Mouse button pressed.
            xlib::ButtonPress => from_button_press(&x_event),
            // Mouse button released.
            xlib::ButtonRelease if dragging => Some(from_button_release(raw_event)),
            // Key pressed.
            xlib::KeyPress => from_key_press(&x_event),
            // Keyboard layout changed.
            xlib::MappingNotify => from_mapping_notify(x_event),
            _other => None,
        }
    }
}

fn from_map_request(x_event: XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let xw = x_event.0;
    let event = xlib::XMapRequestEvent::from(x_event.1);
    if xw.managed_windows.contains(&event.window) {
        // A client that withdrew itself comes back. Hidden clients stay hidden.
        if xw.get_wm_state(event.window) == Some(WITHDRAWN_STATE) {
            xw.toggle_window_visibility(event.window, true);
        }
        return None;
    }
    xw.setup_window(event.window)
}

fn from_unmap_event(x_event: XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let xw = x_event.0;
    let event = xlib::XUnmapEvent::from(x_event.1);
    if !xw.managed_windows.contains(&event.window) {
        return None;
    }
    let h = WindowHandle(XlibWindowHandle(event.window));
    if xw.is_window_gone(event.window) {
        xw.teardown_managed_window(&h, true);
        return Some(DisplayEvent::WindowDestroy(h));
    }
    // Still there, only withdrawn.
    xw.set_wm_states(event.window, &[WITHDRAWN_STATE]);
    None
}

fn from_destroy_notify(x_event: XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let xw = x_event.0;
    let event = xlib::XDestroyWindowEvent::from(x_event.1);
    if xw.managed_windows.contains(&event.window) {
        let h = WindowHandle(XlibWindowHandle(event.window));
        xw.teardown_managed_window(&h, true);
        return Some(DisplayEvent::WindowDestroy(h));
    }
    None
}

fn from_focus_in(x_event: &XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let xw = &x_event.0;
    let event = xlib::XFocusChangeEvent::from(x_event.1);
    // Clients may not steal the focus.
    if xw.focused_window != event.window && xw.focused_window != xw.get_default_root() {
        let never_focus = xw
            .get_wmhints(xw.focused_window)
            .is_some_and(|hint| hint.flags & xlib::InputHint != 0 && hint.input == 0);
        xw.focus(xw.focused_window, never_focus);
    }
    None
}

fn from_client_message(x_event: XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let event = xlib::XClientMessageEvent::from(x_event.1);
    event_translate_client_message::from_event(x_event.0, event)
}

fn from_property_notify(x_event: XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let event = xlib::XPropertyEvent::from(x_event.1);
    event_translate_property_notify::from_event(x_event.0, event)
}

fn from_configure_request(x_event: &XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let xw = &x_event.0;
    let event = xlib::XConfigureRequestEvent::from(x_event.1);
    // Windows we do not manage get what they ask for.
    if !xw.managed_windows.contains(&event.window) {
        let window_changes = xlib::XWindowChanges {
            x: event.x,
            y: event.y,
            width: event.width,
            height: event.height,
            border_width: event.border_width,
            sibling: event.above,
            stack_mode: event.detail,
        };
        xw.set_window_config(event.window, window_changes, event.value_mask as u32);
        return None;
    }
    let mut change = WindowChange::new(WindowHandle(XlibWindowHandle(event.window)));
    change.requested = Some(Xyhw::new(event.x, event.y, event.width, event.height));
    Some(DisplayEvent::WindowChange(change))
}

fn from_configure_notify(x_event: &XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let xw = &x_event.0;
    let event = xlib::XConfigureEvent::from(x_event.1);
    if event.window != xw.get_default_root() {
        return None;
    }
    Some(DisplayEvent::ScreensChanged(xw.get_screens()))
}

fn from_enter_notify(x_event: &XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let event = xlib::XCrossingEvent::from(x_event.1);
    if event.mode != xlib::NotifyNormal
        || event.detail == xlib::NotifyInferior
        || event.window == x_event.0.get_default_root()
    {
        return None;
    }

    let h = WindowHandle(XlibWindowHandle(event.window));
    Some(DisplayEvent::WindowEnter(h))
}

fn from_motion_notify(x_event: XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let xw = x_event.0;
    let event = xlib::XMotionEvent::from(x_event.1);

    // Limit motion events to current refresh rate.
    let rate = xw.refresh_rate.max(1) as c_ulong;
    if event.time.wrapping_sub(xw.motion_event_limiter) <= 1000 / rate {
        return None;
    }
    xw.motion_event_limiter = event.time;
    Some(DisplayEvent::Motion(event.x_root, event.y_root))
}

fn from_button_press(x_event: &XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let xw = &x_event.0;
    let event = xlib::XButtonPressedEvent::from(x_event.1);
    // Plain clicks are grabbed synchronously; let the client have them.
    xw.replay_pointer();
    if !xw.managed_windows.contains(&event.window) {
        return None;
    }
    let h = WindowHandle(XlibWindowHandle(event.window));
    Some(DisplayEvent::MouseCombo(
        ModMask::from_bits_truncate(event.state as u16),
        Button::from_index(event.button),
        h,
        event.x_root,
        event.y_root,
    ))
}

fn from_button_release(raw_event: xlib::XEvent) -> DisplayEvent<XlibWindowHandle> {
    let event = xlib::XButtonReleasedEvent::from(raw_event);
    DisplayEvent::ButtonRelease(event.x_root, event.y_root)
}

fn from_key_press(x_event: &XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let event = xlib::XKeyEvent::from(x_event.1);
    let key = x_event.0.keysym_name(event.keycode)?;
    let modifiers = ModMask::from_bits_truncate(event.state as u16);
    Some(DisplayEvent::KeyCombo(modifiers, key))
}

fn from_mapping_notify(x_event: XEvent) -> Option<DisplayEvent<XlibWindowHandle>> {
    let xw = x_event.0;
    let mut event = xlib::XMappingEvent::from(x_event.1);
    if event.request == xlib::MappingModifier || event.request == xlib::MappingKeyboard {
        if let Err(err) = xw.refresh_keyboard(&mut event) {
            tracing::warn!("Could not refresh the keyboard mapping: {err}");
        }
        xw.reset_grabs();
    }
    None
}
