//! Xlib calls related to a window.
use super::{ICONIC_STATE, NORMAL_STATE, WITHDRAWN_STATE, on_error_from_xlib, on_error_from_xlib_dummy};
use crate::{XWrap, XlibWindowHandle};
use std::os::raw::{c_long, c_ulong};
use tilewm_core::DisplayEvent;
use tilewm_core::models::{Client, WindowHandle, WindowType};
use x11_dl::xlib;

impl XWrap {
    /// Gathers what we know about a window that asked to be mapped. Override-redirect windows,
    /// windows we already manage and windows that are already gone yield nothing. Docks and
    /// desktops are mapped but never managed.
    #[must_use]
    pub fn setup_window(&self, window: xlib::Window) -> Option<DisplayEvent<XlibWindowHandle>> {
        let attrs = match self.get_window_attrs(window) {
            Ok(attr) if attr.override_redirect == 0 && !self.managed_windows.contains(&window) => {
                attr
            }
            _ => return None,
        };
        let r#type = self.get_window_type(window);
        if matches!(r#type, WindowType::Dock | WindowType::Desktop) {
            tracing::debug!("Mapping {window:#x} ({:?}) without managing it", r#type);
            unsafe { (self.xlib.XMapWindow)(self.display, window) };
            return None;
        }

        let handle = WindowHandle(XlibWindowHandle(window));
        let mut client = Client::new(handle, self.get_window_name(window));
        if let Some((res_name, res_class)) = self.get_window_class(window) {
            client.res_name = Some(res_name);
            client.res_class = Some(res_class);
        }
        client.r#type = r#type;
        client.states = self.get_window_states(window);
        client.transient = self
            .get_transient_for(window)
            .filter(|parent| *parent != self.root)
            .map(|parent| WindowHandle(XlibWindowHandle(parent)));
        client.geometry.x = attrs.x;
        client.geometry.y = attrs.y;
        client.geometry.w = attrs.width;
        client.geometry.h = attrs.height;
        if let Some(hints) = self.get_size_hints(window) {
            client.hints = hints;
        }
        if let Some(hint) = self.get_wmhints(window) {
            client.never_focus = hint.flags & xlib::InputHint != 0 && hint.input == 0;
            client.urgent = hint.flags & xlib::XUrgencyHint != 0;
        }

        let (x, y) = self.get_cursor_point().unwrap_or_default();
        Some(DisplayEvent::WindowCreate(client, x, y))
    }

    /// Start managing a window the engine accepted. It is mapped on the next update once it
    /// is visible.
    pub fn setup_managed_window(&mut self, h: WindowHandle<XlibWindowHandle>, floating: bool) {
        let WindowHandle(XlibWindowHandle(handle)) = h;
        self.subscribe_to_window_events(handle);
        self.managed_windows.push(handle);
        self.set_client_list();

        // Make sure there is at least an empty list of _NET_WM_STATE.
        let states = self.get_window_states_atoms(handle);
        self.set_window_states_atoms(handle, &states);

        let color = if floating {
            self.colors.floating
        } else {
            self.colors.normal
        };
        self.set_window_border_color(handle, color);
        self.grab_mouse_clicks(handle, false);
    }

    /// Forget a window. A window that still exists is withdrawn.
    // `XGrabServer`: https://tronche.com/gui/x/xlib/window-and-session-manager/XGrabServer.html
    // `XUngrabServer`: https://tronche.com/gui/x/xlib/window-and-session-manager/XUngrabServer.html
    pub fn teardown_managed_window(&mut self, h: &WindowHandle<XlibWindowHandle>, destroyed: bool) {
        let WindowHandle(XlibWindowHandle(handle)) = *h;
        self.managed_windows.retain(|x| *x != handle);
        if self.focused_window == handle {
            self.focused_window = self.root;
        }
        if !destroyed {
            unsafe {
                (self.xlib.XGrabServer)(self.display);
                (self.xlib.XSetErrorHandler)(Some(on_error_from_xlib_dummy));
                self.ungrab_buttons(handle);
                self.set_wm_states(handle, &[WITHDRAWN_STATE]);
                self.sync();
                (self.xlib.XSetErrorHandler)(Some(on_error_from_xlib));
                (self.xlib.XUngrabServer)(self.display);
            }
        }
        self.set_client_list();
    }

    /// Push geometry, border and visibility of a client.
    pub fn update_window(&self, client: &Client<XlibWindowHandle>, is_focused: bool) {
        let WindowHandle(XlibWindowHandle(handle)) = client.handle;
        if client.visible() {
            let changes = xlib::XWindowChanges {
                x: client.geometry.x,
                y: client.geometry.y,
                width: client.geometry.w.max(1),
                height: client.geometry.h.max(1),
                border_width: client.border,
                sibling: 0,
                stack_mode: 0,
            };
            let unlock =
                xlib::CWX | xlib::CWY | xlib::CWWidth | xlib::CWHeight | xlib::CWBorderWidth;
            self.set_window_config(handle, changes, u32::from(unlock));
            self.configure_window(client);
            self.set_window_border_color(handle, self.border_color(client, is_focused));
        }
        let state = self.get_wm_state(handle);
        // Only change when needed. This prevents task bar icons flashing.
        if client.visible() && state != Some(NORMAL_STATE) {
            self.toggle_window_visibility(handle, true);
        } else if !client.visible() && state != Some(ICONIC_STATE) {
            self.toggle_window_visibility(handle, false);
        }
    }

    /// Maps and unmaps a window depending on whether it is visible.
    // `XMapWindow`: https://tronche.com/gui/x/xlib/window/XMapWindow.html
    // `XUnmapWindow`: https://tronche.com/gui/x/xlib/window/XUnmapWindow.html
    pub fn toggle_window_visibility(&self, window: xlib::Window, visible: bool) {
        let _guard = self.visibility_guard();
        if visible {
            self.set_wm_states(window, &[NORMAL_STATE]);
            unsafe { (self.xlib.XMapWindow)(self.display, window) };
        } else {
            unsafe { (self.xlib.XUnmapWindow)(self.display, window) };
            self.set_wm_states(window, &[ICONIC_STATE]);
        }
    }

    /// Makes a window take focus.
    pub fn window_take_focus(
        &mut self,
        window: &Client<XlibWindowHandle>,
        previous: Option<&Client<XlibWindowHandle>>,
    ) {
        let WindowHandle(XlibWindowHandle(handle)) = window.handle;
        if let Some(previous) = previous {
            let WindowHandle(XlibWindowHandle(previous_handle)) = previous.handle;
            self.set_window_border_color(previous_handle, self.border_color(previous, false));
            // Clicking the previous window focuses it again.
            if !previous.is_fullscreen() {
                self.grab_mouse_clicks(previous_handle, false);
            }
        }
        self.focused_window = handle;
        if !window.is_fullscreen() {
            self.grab_mouse_clicks(handle, true);
        }
        self.set_window_urgency(handle, false);
        self.set_window_border_color(handle, self.border_color(window, true));
        self.focus(handle, window.never_focus);
        self.sync();
    }

    /// Focuses a window.
    // `XSetInputFocus`: https://tronche.com/gui/x/xlib/input/XSetInputFocus.html
    pub fn focus(&self, window: xlib::Window, never_focus: bool) {
        if !never_focus {
            unsafe {
                (self.xlib.XSetInputFocus)(
                    self.display,
                    window,
                    xlib::RevertToPointerRoot,
                    xlib::CurrentTime,
                );
            }
            self.set_active_window(Some(window));
        }
        // Tell the window to take focus
        self.send_xevent_atom(window, self.atoms.WMTakeFocus);
    }

    /// Hands the input focus to the root and clears the active window.
    // `XSetInputFocus`: https://tronche.com/gui/x/xlib/input/XSetInputFocus.html
    pub fn unfocus(&mut self, previous: Option<WindowHandle<XlibWindowHandle>>) {
        if let Some(WindowHandle(XlibWindowHandle(handle))) = previous {
            if !self.is_window_gone(handle) {
                self.set_window_border_color(handle, self.colors.normal);
                self.grab_mouse_clicks(handle, false);
            }
        }
        self.focused_window = self.root;
        unsafe {
            (self.xlib.XSetInputFocus)(
                self.display,
                self.root,
                xlib::RevertToPointerRoot,
                xlib::CurrentTime,
            );
        }
        self.set_active_window(None);
    }

    /// Send a synthetic `ConfigureNotify` telling a client where it is.
    pub fn configure_window(&self, client: &Client<XlibWindowHandle>) {
        let WindowHandle(XlibWindowHandle(handle)) = client.handle;
        let mut configure_event: xlib::XConfigureEvent = unsafe { std::mem::zeroed() };
        configure_event.type_ = xlib::ConfigureNotify;
        configure_event.display = self.display;
        configure_event.event = handle;
        configure_event.window = handle;
        configure_event.x = client.geometry.x;
        configure_event.y = client.geometry.y;
        configure_event.width = client.geometry.w;
        configure_event.height = client.geometry.h;
        configure_event.border_width = client.border;
        configure_event.above = 0;
        configure_event.override_redirect = 0;
        self.send_xevent(
            handle,
            0,
            xlib::StructureNotifyMask,
            &mut configure_event.into(),
        );
    }

    /// Change a windows attributes.
    // `XChangeWindowAttributes`: https://tronche.com/gui/x/xlib/window/XChangeWindowAttributes.html
    pub fn change_window_attributes(
        &self,
        window: xlib::Window,
        mask: c_ulong,
        mut attrs: xlib::XSetWindowAttributes,
    ) {
        unsafe {
            (self.xlib.XChangeWindowAttributes)(self.display, window, mask, &mut attrs);
        }
    }

    /// Restacks the windows to the order of the vec, first on top.
    // `XRestackWindows`: https://tronche.com/gui/x/xlib/window/XRestackWindows.html
    pub fn restack(&self, handles: &[WindowHandle<XlibWindowHandle>]) {
        let mut windows: Vec<xlib::Window> = handles
            .iter()
            .map(|WindowHandle(XlibWindowHandle(window))| *window)
            .collect();
        unsafe {
            (self.xlib.XRestackWindows)(self.display, windows.as_mut_ptr(), windows.len() as i32);
        }
    }

    /// Raise a window.
    // `XRaiseWindow`: https://tronche.com/gui/x/xlib/window/XRaiseWindow.html
    pub fn move_to_top(&self, handle: &WindowHandle<XlibWindowHandle>) {
        let WindowHandle(XlibWindowHandle(window)) = *handle;
        unsafe {
            (self.xlib.XRaiseWindow)(self.display, window);
        }
    }

    /// Ask a window to close, or kill its client when it does not speak `WM_DELETE_WINDOW`.
    // `XSetCloseDownMode`: https://tronche.com/gui/x/xlib/display/XSetCloseDownMode.html
    // `XKillClient`: https://tronche.com/gui/x/xlib/window-and-session-manager/XKillClient.html
    pub fn kill_window(&self, h: &WindowHandle<XlibWindowHandle>) {
        let WindowHandle(XlibWindowHandle(handle)) = *h;
        if self.send_xevent_atom(handle, self.atoms.WMDelete) {
            return;
        }
        unsafe {
            (self.xlib.XGrabServer)(self.display);
            (self.xlib.XSetErrorHandler)(Some(on_error_from_xlib_dummy));
            (self.xlib.XSetCloseDownMode)(self.display, xlib::DestroyAll);
            (self.xlib.XKillClient)(self.display, handle);
            self.sync();
            (self.xlib.XSetErrorHandler)(Some(on_error_from_xlib));
            (self.xlib.XUngrabServer)(self.display);
        }
    }

    /// Subscribe to the wanted events of a window.
    // `XSelectInput`: https://tronche.com/gui/x/xlib/event-handling/XSelectInput.html
    pub fn subscribe_to_window_events(&self, window: xlib::Window) {
        let mask: c_long = xlib::EnterWindowMask | xlib::FocusChangeMask | xlib::PropertyChangeMask;
        unsafe { (self.xlib.XSelectInput)(self.display, window, mask) };
    }
}
