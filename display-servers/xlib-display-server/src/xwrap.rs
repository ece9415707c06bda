//! A wrapper around calls to xlib and X related functions.
// We allow this _ because if we don't we'll receive an error that it isn't read on _task_guard.
#![allow(clippy::used_underscore_binding)]
// We allow this so that extern "C" functions are not flagged as confusing. The current placement
// allows for easy reading.
#![allow(clippy::items_after_statements)]
use super::xatom::XAtom;
use super::xcursor::XCursor;
use crate::XlibWindowHandle;
use std::cell::Cell;
use std::ffi::CString;
use std::os::raw::{c_char, c_double, c_int, c_long, c_short, c_ulong};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{ptr, slice};
use thiserror::Error;
use tilewm_core::config::{Config, Keybind};
use tilewm_core::models::{Client, WindowHandle};
use tilewm_core::utils::modmask_lookup::ModMask;
use tokio::sync::{Notify, oneshot};
use tokio::time::Duration;

use x11_dl::xlib;
use x11_dl::xrandr::Xrandr;

mod getters;
mod keyboard;
mod mouse;
mod setters;
mod window;

type WindowStateConst = c_long;
pub const WITHDRAWN_STATE: WindowStateConst = 0;
pub const NORMAL_STATE: WindowStateConst = 1;
pub const ICONIC_STATE: WindowStateConst = 2;
const MAX_PROPERTY_VALUE_LEN: c_long = 4096;

const WM_NAME: &str = "tilewm";

pub const ROOT_EVENT_MASK: c_long = xlib::SubstructureRedirectMask
    | xlib::SubstructureNotifyMask
    | xlib::ButtonPressMask
    | xlib::PointerMotionMask
    | xlib::StructureNotifyMask
    | xlib::PropertyChangeMask;

const BUTTONMASK: c_long = xlib::ButtonPressMask | xlib::ButtonReleaseMask | xlib::ButtonMotionMask;
const MOUSEMASK: c_long = BUTTONMASK | xlib::PointerMotionMask;

const X_CONFIGUREWINDOW: u8 = 12;
const X_GRABBUTTON: u8 = 28;
const X_GRABKEY: u8 = 33;
const X_SETINPUTFOCUS: u8 = 42;
const X_COPYAREA: u8 = 62;
const X_POLYSEGMENT: u8 = 66;
const X_POLYFILLRECTANGLE: u8 = 70;
const X_POLYTEXT8: u8 = 74;

static OTHER_WM_RUNNING: AtomicBool = AtomicBool::new(false);

/// Clients vanish at any moment, so most errors are races with a window going away. Those are
/// dropped; everything else is logged. No error ends the window manager.
pub extern "C" fn on_error_from_xlib(_: *mut xlib::Display, er: *mut xlib::XErrorEvent) -> c_int {
    let err = unsafe { *er };
    let ec = err.error_code;
    let rc = err.request_code;
    let ba = ec == xlib::BadAccess;
    let bd = ec == xlib::BadDrawable;
    let bm = ec == xlib::BadMatch;

    if ec == xlib::BadWindow
        || (rc == X_CONFIGUREWINDOW && bm)
        || (rc == X_GRABBUTTON && ba)
        || (rc == X_GRABKEY && ba)
        || (rc == X_SETINPUTFOCUS && bm)
        || (rc == X_COPYAREA && bd)
        || (rc == X_POLYSEGMENT && bd)
        || (rc == X_POLYFILLRECTANGLE && bd)
        || (rc == X_POLYTEXT8 && bd)
    {
        return 0;
    }
    tracing::error!(
        "X error: request {rc}, error code {ec}, resource {:#x}",
        err.resourceid
    );
    0
}

pub extern "C" fn on_error_from_xlib_dummy(
    _: *mut xlib::Display,
    _: *mut xlib::XErrorEvent,
) -> c_int {
    0
}

// Only one client may select `SubstructureRedirect` on the root.
extern "C" fn on_startup_error(_: *mut xlib::Display, _: *mut xlib::XErrorEvent) -> c_int {
    OTHER_WM_RUNNING.store(true, Ordering::SeqCst);
    0
}

#[derive(Debug, Default)]
pub struct Colors {
    normal: c_ulong,
    floating: c_ulong,
    active: c_ulong,
}

#[derive(Debug, Error)]
pub enum XlibError {
    #[error("Could not load Xlib: {0}")]
    Library(#[from] x11_dl::error::OpenError),
    #[error("Could not open the display")]
    NoDisplay,
    #[error("Another window manager is already running")]
    OtherWindowManager,
    #[error("Could not watch the display connection: {0}")]
    Poll(#[from] std::io::Error),
    #[error("Xlib call failed")]
    FailedStatus,
    #[error("Root window not found")]
    RootWindowNotFound,
}

/// Contains Xserver information and origins.
pub struct XWrap {
    xlib: xlib::Xlib,
    display: *mut xlib::Display,
    root: xlib::Window,
    check_window: xlib::Window,
    pub atoms: XAtom,
    cursors: XCursor,
    colors: Colors,
    pub managed_windows: Vec<xlib::Window>,
    pub focused_window: xlib::Window,
    pub workspace_names: Vec<String>,
    keybinds: Vec<Keybind>,
    pub mouse_key_mask: ModMask,
    /// Set while the pointer is grabbed for a move or resize.
    pub dragging: bool,
    guard_depth: Cell<u32>,
    _task_guard: oneshot::Receiver<()>,
    pub task_notify: Arc<Notify>,
    pub motion_event_limiter: c_ulong,
    pub refresh_rate: c_short,
}

/// Masks structure notifications on the root while held. The maps and unmaps done on behalf of
/// workspace switches and fullscreen are not read back as clients leaving.
pub struct VisibilityGuard<'a> {
    xw: &'a XWrap,
}

impl Drop for VisibilityGuard<'_> {
    fn drop(&mut self) {
        let depth = self.xw.guard_depth.get().saturating_sub(1);
        self.xw.guard_depth.set(depth);
        if depth == 0 {
            self.xw.set_root_event_mask(ROOT_EVENT_MASK);
        }
    }
}

impl XWrap {
    /// Connect to the display named by `$DISPLAY` and start watching the connection.
    ///
    /// Must run inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if Xlib cannot be loaded, the display cannot be opened, or the connection cannot
    /// be polled.
    // `XOpenDisplay`: https://tronche.com/gui/x/xlib/display/opening.html
    // `XConnectionNumber`: https://tronche.com/gui/x/xlib/display/display-macros.html#ConnectionNumber
    // `XDefaultRootWindow`: https://tronche.com/gui/x/xlib/display/display-macros.html#DefaultRootWindow
    pub fn new() -> Result<Self, XlibError> {
        const SERVER: mio::Token = mio::Token(0);
        let xlib = xlib::Xlib::open()?;
        let display = unsafe { (xlib.XOpenDisplay)(ptr::null()) };
        if display.is_null() {
            return Err(XlibError::NoDisplay);
        }

        let fd = unsafe { (xlib.XConnectionNumber)(display) };

        let (guard, _task_guard) = oneshot::channel();
        let notify = Arc::new(Notify::new());
        let task_notify = notify.clone();

        let mut poll = mio::Poll::new()?;
        let mut events = mio::Events::with_capacity(1);
        poll.registry().register(
            &mut mio::unix::SourceFd(&fd),
            SERVER,
            mio::Interest::READABLE,
        )?;
        let timeout = Duration::from_millis(100);
        tokio::task::spawn_blocking(move || {
            loop {
                if guard.is_closed() {
                    return;
                }

                if let Err(err) = poll.poll(&mut events, Some(timeout)) {
                    tracing::warn!("Xlib socket poll failed with {:?}", err);
                    continue;
                }

                events
                    .iter()
                    .filter(|event| SERVER == event.token())
                    .for_each(|_| notify.notify_one());
            }
        });

        let atoms = XAtom::new(&xlib, display);
        let cursors = XCursor::new(&xlib, display);
        let root = unsafe { (xlib.XDefaultRootWindow)(display) };
        let refresh_rate = refresh_rate(display, root);
        tracing::debug!("Refresh Rate: {}", refresh_rate);

        let xw = Self {
            xlib,
            display,
            root,
            check_window: 0,
            atoms,
            cursors,
            colors: Colors::default(),
            managed_windows: vec![],
            focused_window: root,
            workspace_names: vec![],
            keybinds: vec![],
            mouse_key_mask: ModMask::empty(),
            dragging: false,
            guard_depth: Cell::new(0),
            _task_guard,
            task_notify,
            motion_event_limiter: 0,
            refresh_rate,
        };

        // `XSetErrorHandler`: https://tronche.com/gui/x/xlib/event-handling/protocol-errors/XSetErrorHandler.html
        // `XSelectInput`: https://tronche.com/gui/x/xlib/event-handling/XSelectInput.html
        unsafe {
            (xw.xlib.XSetErrorHandler)(Some(on_startup_error));
            (xw.xlib.XSelectInput)(xw.display, root, xlib::SubstructureRedirectMask);
        };
        xw.sync();
        if OTHER_WM_RUNNING.load(Ordering::SeqCst) {
            return Err(XlibError::OtherWindowManager);
        }

        unsafe { (xw.xlib.XSetErrorHandler)(Some(on_error_from_xlib)) };
        xw.sync();
        Ok(xw)
    }

    /// Select the root events, publish what we support and grab the bindings.
    // `XChangeWindowAttributes`: https://tronche.com/gui/x/xlib/window/XChangeWindowAttributes.html
    // `XDeleteProperty`: https://tronche.com/gui/x/xlib/window-information/XDeleteProperty.html
    pub fn init(&mut self, config: &impl Config) {
        self.apply_config(config);

        let mut attrs: xlib::XSetWindowAttributes = unsafe { std::mem::zeroed() };
        attrs.cursor = self.cursors.normal;
        attrs.event_mask = ROOT_EVENT_MASK;
        self.change_window_attributes(self.root, xlib::CWEventMask | xlib::CWCursor, attrs);

        let supported: Vec<c_long> = self
            .atoms
            .net_supported()
            .iter()
            .map(|&atom| atom as c_long)
            .collect();
        self.replace_property_long(
            self.root,
            self.atoms.NetSupported,
            xlib::XA_ATOM,
            &supported,
        );
        unsafe { (self.xlib.XDeleteProperty)(self.display, self.root, self.atoms.NetClientList) };

        self.init_supporting_wm_check();
        self.init_desktops_hints();
        self.set_current_desktop(0);
        self.reset_grabs();
        self.sync();
    }

    /// Take over the settings that live on the X side: colors, bindings and desktop names.
    pub fn load_config(
        &mut self,
        config: &impl Config,
        focused: Option<WindowHandle<XlibWindowHandle>>,
        clients: &[Client<XlibWindowHandle>],
    ) {
        self.apply_config(config);
        self.init_desktops_hints();
        self.reset_grabs();
        for client in clients {
            let WindowHandle(XlibWindowHandle(handle)) = client.handle;
            let is_focused = focused == Some(client.handle);
            self.set_window_border_color(handle, self.border_color(client, is_focused));
            if !client.is_fullscreen() {
                self.grab_mouse_clicks(handle, is_focused);
            }
        }
        self.sync();
    }

    fn apply_config(&mut self, config: &impl Config) {
        self.mouse_key_mask = config.mousekey();
        self.keybinds = config.mapped_bindings();
        self.workspace_names = config.workspaces();
        self.colors = Colors {
            normal: self.get_color(&config.default_border_color()),
            floating: self.get_color(&config.floating_border_color()),
            active: self.get_color(&config.focused_border_color()),
        };
    }

    /// The border color a client should have.
    #[must_use]
    pub const fn border_color(
        &self,
        client: &Client<XlibWindowHandle>,
        is_focused: bool,
    ) -> c_ulong {
        if is_focused {
            self.colors.active
        } else if client.floating() {
            self.colors.floating
        } else {
            self.colors.normal
        }
    }

    /// Advertise ourselves through a child window carrying our name.
    // `XCreateSimpleWindow`: https://tronche.com/gui/x/xlib/window/XCreateWindow.html
    fn init_supporting_wm_check(&mut self) {
        if self.check_window == 0 {
            self.check_window = unsafe {
                (self.xlib.XCreateSimpleWindow)(self.display, self.root, 0, 0, 1, 1, 0, 0, 0)
            };
        }
        for window in [self.root, self.check_window] {
            self.replace_property_long(
                window,
                self.atoms.NetSupportingWmCheck,
                xlib::XA_WINDOW,
                &[self.check_window as c_long],
            );
        }
        self.set_string_prop(
            self.check_window,
            WM_NAME,
            self.atoms.NetWMName,
            self.atoms.UTF8String,
        );
    }

    /// EWMH support used for bars such as polybar.
    // `Xutf8TextListToTextProperty`: https://linux.die.net/man/3/xutf8textlisttotextproperty
    // `XSetTextProperty`: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/XSetTextProperty.html
    pub fn init_desktops_hints(&self) {
        let count = self.workspace_names.len();
        self.set_desktop_prop(&[count as u32], self.atoms.NetNumberOfDesktops);

        let names: Vec<CString> = self
            .workspace_names
            .iter()
            .map(|name| CString::new(name.as_str()).unwrap_or_default())
            .collect();
        let mut pointers: Vec<*mut c_char> =
            names.iter().map(|name| name.as_ptr().cast_mut()).collect();
        unsafe {
            let mut text: xlib::XTextProperty = std::mem::zeroed();
            let status = (self.xlib.Xutf8TextListToTextProperty)(
                self.display,
                pointers.as_mut_ptr(),
                pointers.len() as c_int,
                xlib::XUTF8StringStyle,
                &mut text,
            );
            if status == i32::from(xlib::Success) {
                (self.xlib.XSetTextProperty)(
                    self.display,
                    self.root,
                    &mut text,
                    self.atoms.NetDesktopNames,
                );
                (self.xlib.XFree)(text.value.cast());
            }
        }

        self.set_desktop_prop(&[0, 0], self.atoms.NetDesktopViewport);
    }

    /// Mask root structure notifications until the returned guard is dropped. Guards nest.
    #[must_use]
    pub fn visibility_guard(&self) -> VisibilityGuard<'_> {
        let depth = self.guard_depth.get();
        if depth == 0 {
            self.set_root_event_mask(ROOT_EVENT_MASK & !xlib::SubstructureNotifyMask);
        }
        self.guard_depth.set(depth + 1);
        VisibilityGuard { xw: self }
    }

    fn set_root_event_mask(&self, mask: c_long) {
        let mut attrs: xlib::XSetWindowAttributes = unsafe { std::mem::zeroed() };
        attrs.event_mask = mask;
        self.change_window_attributes(self.root, xlib::CWEventMask, attrs);
    }

    /// Send a `WM_PROTOCOLS` message for a window. Returns false if the window does not take
    /// part in the protocol.
    // `XSendEvent`: https://tronche.com/gui/x/xlib/event-handling/XSendEvent.html
    fn send_xevent_atom(&self, window: xlib::Window, atom: xlib::Atom) -> bool {
        if self.can_send_xevent_atom(window, atom) {
            let mut msg: xlib::XClientMessageEvent = unsafe { std::mem::zeroed() };
            msg.type_ = xlib::ClientMessage;
            msg.window = window;
            msg.message_type = self.atoms.WMProtocols;
            msg.format = 32;
            msg.data.set_long(0, atom as c_long);
            msg.data.set_long(1, xlib::CurrentTime as c_long);
            let mut ev: xlib::XEvent = msg.into();
            self.send_xevent(window, 0, xlib::NoEventMask, &mut ev);
            return true;
        }
        false
    }

    /// Send a xevent for a window to X.
    // `XSendEvent`: https://tronche.com/gui/x/xlib/event-handling/XSendEvent.html
    pub fn send_xevent(
        &self,
        window: xlib::Window,
        propagate: i32,
        mask: c_long,
        event: &mut xlib::XEvent,
    ) {
        unsafe { (self.xlib.XSendEvent)(self.display, window, propagate, mask, event) };
        self.sync();
    }

    /// Returns whether a window lists a protocol in `WM_PROTOCOLS`.
    // `XGetWMProtocols`: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/XGetWMProtocols.html
    fn can_send_xevent_atom(&self, window: xlib::Window, atom: xlib::Atom) -> bool {
        unsafe {
            let mut array: *mut xlib::Atom = ptr::null_mut();
            let mut length: c_int = 0;
            let status: xlib::Status =
                (self.xlib.XGetWMProtocols)(self.display, window, &mut array, &mut length);
            if status == 0 || array.is_null() {
                return false;
            }
            let found = slice::from_raw_parts(array, length as usize).contains(&atom);
            (self.xlib.XFree)(array.cast());
            found
        }
    }

    /// Grab the pointer for a move or resize.
    pub fn begin_drag(&mut self, resize: bool) {
        let cursor = if resize {
            self.cursors.resize
        } else {
            self.cursors.move_
        };
        self.grab_pointer(cursor);
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        if self.dragging {
            self.ungrab_pointer();
            self.dragging = false;
        }
    }

    /// Flush and sync the xserver.
    // `XSync`: https://tronche.com/gui/x/xlib/event-handling/XSync.html
    pub fn sync(&self) {
        unsafe { (self.xlib.XSync)(self.display, xlib::False) };
    }

    /// Flush the xserver.
    // `XFlush`: https://tronche.com/gui/x/xlib/event-handling/XFlush.html
    pub fn flush(&self) {
        unsafe { (self.xlib.XFlush)(self.display) };
    }

    /// Returns how many events are waiting.
    // `XPending`: https://tronche.com/gui/x/xlib/event-handling/XPending.html
    #[must_use]
    pub fn queue_len(&self) -> i32 {
        unsafe { (self.xlib.XPending)(self.display) }
    }
}

impl Drop for XWrap {
    // `XCloseDisplay`: https://tronche.com/gui/x/xlib/display/XCloseDisplay.html
    fn drop(&mut self) {
        unsafe {
            (self.xlib.XDeleteProperty)(self.display, self.root, self.atoms.NetClientList);
            (self.xlib.XDeleteProperty)(self.display, self.root, self.atoms.NetActiveWindow);
            if self.check_window != 0 {
                (self.xlib.XDestroyWindow)(self.display, self.check_window);
            }
            self.cursors.free(&self.xlib, self.display);
            (self.xlib.XSetInputFocus)(
                self.display,
                xlib::PointerRoot as xlib::Window,
                xlib::RevertToPointerRoot,
                xlib::CurrentTime,
            );
            (self.xlib.XCloseDisplay)(self.display);
        }
    }
}

/// The highest refresh rate of the active outputs, used to throttle drag motion. 60 when
/// xrandr is unavailable.
fn refresh_rate(display: *mut xlib::Display, root: xlib::Window) -> c_short {
    const FALLBACK: c_short = 60;
    let Ok(xrandr) = Xrandr::open() else {
        return FALLBACK;
    };
    unsafe {
        let screen_resources = (xrandr.XRRGetScreenResources)(display, root);
        if screen_resources.is_null() {
            return FALLBACK;
        }
        let crtcs = slice::from_raw_parts(
            (*screen_resources).crtcs,
            (*screen_resources).ncrtc as usize,
        );
        let mut active_modes: Vec<c_ulong> = vec![];
        for crtc in crtcs {
            let crtc_info = (xrandr.XRRGetCrtcInfo)(display, screen_resources, *crtc);
            if crtc_info.is_null() {
                continue;
            }
            if (*crtc_info).mode != 0 {
                active_modes.push((*crtc_info).mode);
            }
            (xrandr.XRRFreeCrtcInfo)(crtc_info);
        }
        let modes = slice::from_raw_parts(
            (*screen_resources).modes,
            (*screen_resources).nmode as usize,
        );
        let rate = modes
            .iter()
            .filter(|mode_info| active_modes.contains(&mode_info.id))
            .filter(|mode_info| mode_info.hTotal > 0 && mode_info.vTotal > 0)
            .map(|mode_info| {
                (mode_info.dotClock as c_double
                    / (c_double::from(mode_info.hTotal) * c_double::from(mode_info.vTotal)))
                    as c_short
            })
            .max()
            .unwrap_or(FALLBACK);
        (xrandr.XRRFreeScreenResources)(screen_resources);
        rate
    }
}
