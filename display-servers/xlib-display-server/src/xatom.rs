//! The atoms the window manager reads and writes.
use std::ffi::CStr;
use tilewm_core::models::{WindowState, WindowType};
use x11_dl::xlib;

#[derive(Clone, Debug)]
#[allow(non_snake_case)]
pub struct XAtom {
    pub WMProtocols: xlib::Atom,
    pub WMDelete: xlib::Atom,
    pub WMState: xlib::Atom,
    pub WMTakeFocus: xlib::Atom,
    pub UTF8String: xlib::Atom,
    pub NetActiveWindow: xlib::Atom,
    pub NetSupported: xlib::Atom,
    pub NetSupportingWmCheck: xlib::Atom,
    pub NetWMName: xlib::Atom,
    pub NetWMDesktop: xlib::Atom,
    pub NetClientList: xlib::Atom,
    pub NetDesktopViewport: xlib::Atom,
    pub NetNumberOfDesktops: xlib::Atom,
    pub NetCurrentDesktop: xlib::Atom,
    pub NetDesktopNames: xlib::Atom,

    pub NetWMState: xlib::Atom,
    pub NetWMStateModal: xlib::Atom,
    pub NetWMStateSticky: xlib::Atom,
    pub NetWMStateMaximizedVert: xlib::Atom,
    pub NetWMStateMaximizedHorz: xlib::Atom,
    pub NetWMStateShaded: xlib::Atom,
    pub NetWMStateSkipTaskbar: xlib::Atom,
    pub NetWMStateSkipPager: xlib::Atom,
    pub NetWMStateHidden: xlib::Atom,
    pub NetWMStateFullscreen: xlib::Atom,
    pub NetWMStateAbove: xlib::Atom,
    pub NetWMStateBelow: xlib::Atom,
    pub NetWMStateDemandsAttention: xlib::Atom,

    pub NetWMWindowType: xlib::Atom,
    pub NetWMWindowTypeDesktop: xlib::Atom,
    pub NetWMWindowTypeDock: xlib::Atom,
    pub NetWMWindowTypeToolbar: xlib::Atom,
    pub NetWMWindowTypeMenu: xlib::Atom,
    pub NetWMWindowTypeUtility: xlib::Atom,
    pub NetWMWindowTypeSplash: xlib::Atom,
    pub NetWMWindowTypeDialog: xlib::Atom,
    pub NetWMWindowTypeNormal: xlib::Atom,
}

impl XAtom {
    /// What goes into `_NET_SUPPORTED` on the root.
    pub fn net_supported(&self) -> Vec<xlib::Atom> {
        vec![
            self.NetActiveWindow,
            self.NetSupported,
            self.NetSupportingWmCheck,
            self.NetWMName,
            self.NetWMDesktop,
            self.NetClientList,
            self.NetDesktopViewport,
            self.NetNumberOfDesktops,
            self.NetCurrentDesktop,
            self.NetDesktopNames,
            self.NetWMState,
            self.NetWMStateFullscreen,
            self.NetWMStateDemandsAttention,
            self.NetWMWindowType,
            self.NetWMWindowTypeDock,
            self.NetWMWindowTypeDialog,
            self.NetWMWindowTypeUtility,
            self.NetWMWindowTypeSplash,
        ]
    }

    pub fn window_state(&self, atom: xlib::Atom) -> Option<WindowState> {
        let state = match atom {
            x if x == self.NetWMStateModal => WindowState::Modal,
            x if x == self.NetWMStateSticky => WindowState::Sticky,
            x if x == self.NetWMStateMaximizedVert => WindowState::MaximizedVert,
            x if x == self.NetWMStateMaximizedHorz => WindowState::MaximizedHorz,
            x if x == self.NetWMStateShaded => WindowState::Shaded,
            x if x == self.NetWMStateSkipTaskbar => WindowState::SkipTaskbar,
            x if x == self.NetWMStateSkipPager => WindowState::SkipPager,
            x if x == self.NetWMStateHidden => WindowState::Hidden,
            x if x == self.NetWMStateFullscreen => WindowState::Fullscreen,
            x if x == self.NetWMStateAbove => WindowState::Above,
            x if x == self.NetWMStateBelow => WindowState::Below,
            x if x == self.NetWMStateDemandsAttention => WindowState::DemandsAttention,
            _ => return None,
        };
        Some(state)
    }

    pub const fn state_atom(&self, state: WindowState) -> xlib::Atom {
        match state {
            WindowState::Modal => self.NetWMStateModal,
            WindowState::Sticky => self.NetWMStateSticky,
            WindowState::MaximizedVert => self.NetWMStateMaximizedVert,
            WindowState::MaximizedHorz => self.NetWMStateMaximizedHorz,
            WindowState::Shaded => self.NetWMStateShaded,
            WindowState::SkipTaskbar => self.NetWMStateSkipTaskbar,
            WindowState::SkipPager => self.NetWMStateSkipPager,
            WindowState::Hidden => self.NetWMStateHidden,
            WindowState::Fullscreen => self.NetWMStateFullscreen,
            WindowState::Above => self.NetWMStateAbove,
            WindowState::Below => self.NetWMStateBelow,
            WindowState::DemandsAttention => self.NetWMStateDemandsAttention,
        }
    }

    pub fn window_type(&self, atom: xlib::Atom) -> WindowType {
        match atom {
            x if x == self.NetWMWindowTypeDesktop => WindowType::Desktop,
            x if x == self.NetWMWindowTypeDock => WindowType::Dock,
            x if x == self.NetWMWindowTypeToolbar => WindowType::Toolbar,
            x if x == self.NetWMWindowTypeMenu => WindowType::Menu,
            x if x == self.NetWMWindowTypeUtility => WindowType::Utility,
            x if x == self.NetWMWindowTypeSplash => WindowType::Splash,
            x if x == self.NetWMWindowTypeDialog => WindowType::Dialog,
            _ => WindowType::Normal,
        }
    }

    pub fn new(xlib: &xlib::Xlib, dpy: *mut xlib::Display) -> Self {
        let from = |name: &CStr| intern(xlib, dpy, name);
        Self {
            WMProtocols: from(c"WM_PROTOCOLS"),
            WMDelete: from(c"WM_DELETE_WINDOW"),
            WMState: from(c"WM_STATE"),
            WMTakeFocus: from(c"WM_TAKE_FOCUS"),
            UTF8String: from(c"UTF8_STRING"),
            NetActiveWindow: from(c"_NET_ACTIVE_WINDOW"),
            NetSupported: from(c"_NET_SUPPORTED"),
            NetSupportingWmCheck: from(c"_NET_SUPPORTING_WM_CHECK"),
            NetWMName: from(c"_NET_WM_NAME"),
            NetWMDesktop: from(c"_NET_WM_DESKTOP"),
            NetClientList: from(c"_NET_CLIENT_LIST"),
            NetDesktopViewport: from(c"_NET_DESKTOP_VIEWPORT"),
            NetNumberOfDesktops: from(c"_NET_NUMBER_OF_DESKTOPS"),
            NetCurrentDesktop: from(c"_NET_CURRENT_DESKTOP"),
            NetDesktopNames: from(c"_NET_DESKTOP_NAMES"),

            NetWMState: from(c"_NET_WM_STATE"),
            NetWMStateModal: from(c"_NET_WM_STATE_MODAL"),
            NetWMStateSticky: from(c"_NET_WM_STATE_STICKY"),
            NetWMStateMaximizedVert: from(c"_NET_WM_STATE_MAXIMIZED_VERT"),
            NetWMStateMaximizedHorz: from(c"_NET_WM_STATE_MAXIMIZED_HORZ"),
            NetWMStateShaded: from(c"_NET_WM_STATE_SHADED"),
            NetWMStateSkipTaskbar: from(c"_NET_WM_STATE_SKIP_TASKBAR"),
            NetWMStateSkipPager: from(c"_NET_WM_STATE_SKIP_PAGER"),
            NetWMStateHidden: from(c"_NET_WM_STATE_HIDDEN"),
            NetWMStateFullscreen: from(c"_NET_WM_STATE_FULLSCREEN"),
            NetWMStateAbove: from(c"_NET_WM_STATE_ABOVE"),
            NetWMStateBelow: from(c"_NET_WM_STATE_BELOW"),
            NetWMStateDemandsAttention: from(c"_NET_WM_STATE_DEMANDS_ATTENTION"),

            NetWMWindowType: from(c"_NET_WM_WINDOW_TYPE"),
            NetWMWindowTypeDesktop: from(c"_NET_WM_WINDOW_TYPE_DESKTOP"),
            NetWMWindowTypeDock: from(c"_NET_WM_WINDOW_TYPE_DOCK"),
            NetWMWindowTypeToolbar: from(c"_NET_WM_WINDOW_TYPE_TOOLBAR"),
            NetWMWindowTypeMenu: from(c"_NET_WM_WINDOW_TYPE_MENU"),
            NetWMWindowTypeUtility: from(c"_NET_WM_WINDOW_TYPE_UTILITY"),
            NetWMWindowTypeSplash: from(c"_NET_WM_WINDOW_TYPE_SPLASH"),
            NetWMWindowTypeDialog: from(c"_NET_WM_WINDOW_TYPE_DIALOG"),
            NetWMWindowTypeNormal: from(c"_NET_WM_WINDOW_TYPE_NORMAL"),
        }
    }
}

// `XInternAtom`: https://tronche.com/gui/x/xlib/window-information/XInternAtom.html
fn intern(xlib: &xlib::Xlib, dpy: *mut xlib::Display, name: &CStr) -> xlib::Atom {
    unsafe { (xlib.XInternAtom)(dpy, name.as_ptr(), xlib::False) }
}
