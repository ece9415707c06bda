//! `XWrap` getters.
use super::{MAX_PROPERTY_VALUE_LEN, XlibError};
use crate::{XWrap, XlibWindowHandle};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_long, c_uchar, c_uint, c_ulong};
use std::slice;
use tilewm_core::models::{Screen, SizeHints, WindowHandle, WindowState, WindowType, Xyhw};
use x11_dl::xlib;

/// Where the pointer is and which top level window, if any, it is over.
#[derive(Debug, Clone, Copy)]
pub struct PointerPosition {
    pub window: Option<xlib::Window>,
    pub x: i32,
    pub y: i32,
}

impl XWrap {
    /// Returns the child windows of the root.
    /// # Errors
    ///
    /// Will error if the window tree cannot be queried.
    // `XQueryTree`: https://tronche.com/gui/x/xlib/window-information/XQueryTree.html
    pub fn get_all_windows(&self) -> Result<Vec<xlib::Window>, XlibError> {
        unsafe {
            let mut root_return: xlib::Window = 0;
            let mut parent_return: xlib::Window = 0;
            let mut array: *mut xlib::Window = std::ptr::null_mut();
            let mut length: c_uint = 0;
            let status: xlib::Status = (self.xlib.XQueryTree)(
                self.display,
                self.root,
                &mut root_return,
                &mut parent_return,
                &mut array,
                &mut length,
            );
            if status == 0 {
                return Err(XlibError::FailedStatus);
            }
            if array.is_null() {
                return Ok(vec![]);
            }
            let windows = slice::from_raw_parts(array, length as usize).to_vec();
            (self.xlib.XFree)(array.cast());
            Ok(windows)
        }
    }

    /// Returns the pixel for a color such as `#ff0000`.
    // `XDefaultScreen`: https://tronche.com/gui/x/xlib/display/display-macros.html#DefaultScreen
    // `XDefaultColormap`: https://tronche.com/gui/x/xlib/display/display-macros.html#DefaultColormap
    // `XAllocNamedColor`: https://tronche.com/gui/x/xlib/color/XAllocNamedColor.html
    #[must_use]
    pub fn get_color(&self, color: &str) -> c_ulong {
        let Ok(name) = CString::new(color) else {
            return 0;
        };
        unsafe {
            let screen = (self.xlib.XDefaultScreen)(self.display);
            let cmap: xlib::Colormap = (self.xlib.XDefaultColormap)(self.display, screen);
            let mut exact: xlib::XColor = std::mem::zeroed();
            let mut closest: xlib::XColor = std::mem::zeroed();
            let status = (self.xlib.XAllocNamedColor)(
                self.display,
                cmap,
                name.as_ptr(),
                &mut closest,
                &mut exact,
            );
            if status == 0 {
                tracing::warn!("Unknown color {color}");
                return 0;
            }
            closest.pixel
        }
    }

    /// Returns the pointer position in root coordinates and the child of the root under it.
    /// # Errors
    ///
    /// Will error if the pointer is on another screen.
    // `XQueryPointer`: https://tronche.com/gui/x/xlib/window-information/XQueryPointer.html
    pub fn get_pointer(&self) -> Result<PointerPosition, XlibError> {
        let mut root_return: xlib::Window = 0;
        let mut child_return: xlib::Window = 0;
        let mut root_x_return: c_int = 0;
        let mut root_y_return: c_int = 0;
        let mut win_x_return: c_int = 0;
        let mut win_y_return: c_int = 0;
        let mut mask_return: c_uint = 0;
        let success = unsafe {
            (self.xlib.XQueryPointer)(
                self.display,
                self.root,
                &mut root_return,
                &mut child_return,
                &mut root_x_return,
                &mut root_y_return,
                &mut win_x_return,
                &mut win_y_return,
                &mut mask_return,
            )
        };
        if success == 0 {
            return Err(XlibError::RootWindowNotFound);
        }
        Ok(PointerPosition {
            window: (child_return != 0).then_some(child_return),
            x: root_x_return,
            y: root_y_return,
        })
    }

    /// Returns the current position of the cursor.
    /// # Errors
    ///
    /// Will error if the pointer is on another screen.
    pub fn get_cursor_point(&self) -> Result<(i32, i32), XlibError> {
        self.get_pointer().map(|p| (p.x, p.y))
    }

    /// Returns the handle of the default root.
    #[must_use]
    pub const fn get_default_root_handle(&self) -> WindowHandle<XlibWindowHandle> {
        WindowHandle(XlibWindowHandle(self.root))
    }

    /// Returns the default root.
    #[must_use]
    pub const fn get_default_root(&self) -> xlib::Window {
        self.root
    }

    /// Returns the `WM_NORMAL_HINTS` of a window.
    #[must_use]
    pub fn get_size_hints(&self, window: xlib::Window) -> Option<SizeHints> {
        let size = self.get_hint_sizing(window)?;
        let mut hints = SizeHints::default();
        if (size.flags & xlib::PBaseSize) != 0 {
            hints.basew = size.base_width;
            hints.baseh = size.base_height;
        } else if (size.flags & xlib::PMinSize) != 0 {
            hints.basew = size.min_width;
            hints.baseh = size.min_height;
        }
        if (size.flags & xlib::PMinSize) != 0 {
            hints.minw = size.min_width;
            hints.minh = size.min_height;
        } else if (size.flags & xlib::PBaseSize) != 0 {
            hints.minw = size.base_width;
            hints.minh = size.base_height;
        }
        if (size.flags & xlib::PMaxSize) != 0 {
            hints.maxw = size.max_width;
            hints.maxh = size.max_height;
        }
        hints.valid = hints.minw > 0 || hints.minh > 0 || hints.maxw > 0 || hints.maxh > 0;
        Some(hints)
    }

    /// Returns the next `Xevent` of the xserver.
    // `XNextEvent`: https://tronche.com/gui/x/xlib/event-handling/manipulating-event-queue/XNextEvent.html
    #[must_use]
    pub fn get_next_event(&self) -> xlib::XEvent {
        unsafe {
            let mut event: xlib::XEvent = std::mem::zeroed();
            (self.xlib.XNextEvent)(self.display, &mut event);
            event
        }
    }

    /// Returns all the screens of the display.
    ///
    /// Uses randr when available since only randr knows output names, then Xinerama, then the
    /// size of the default screen.
    #[must_use]
    pub fn get_screens(&self) -> Vec<Screen> {
        let screens = self.get_randr_screens();
        if !screens.is_empty() {
            return screens;
        }
        let screens = self.get_xinerama_screens();
        if !screens.is_empty() {
            return screens;
        }
        let (w, h) = unsafe {
            let screen = (self.xlib.XDefaultScreen)(self.display);
            (
                (self.xlib.XDisplayWidth)(self.display, screen),
                (self.xlib.XDisplayHeight)(self.display, screen),
            )
        };
        vec![Screen::new(Xyhw::new(0, 0, w, h), String::new())]
    }

    fn get_randr_screens(&self) -> Vec<Screen> {
        use x11_dl::xrandr::Xrandr;
        let Ok(xrandr) = Xrandr::open() else {
            return vec![];
        };
        let mut screens = vec![];
        unsafe {
            let resources = (xrandr.XRRGetScreenResources)(self.display, self.root);
            if resources.is_null() {
                return screens;
            }
            let outputs =
                slice::from_raw_parts((*resources).outputs, (*resources).noutput as usize);
            for output in outputs {
                let output_info = (xrandr.XRRGetOutputInfo)(self.display, resources, *output);
                if output_info.is_null() {
                    continue;
                }
                if (*output_info).crtc != 0 {
                    let crtc_info =
                        (xrandr.XRRGetCrtcInfo)(self.display, resources, (*output_info).crtc);
                    if !crtc_info.is_null() {
                        let bbox = Xyhw::new(
                            (*crtc_info).x,
                            (*crtc_info).y,
                            (*crtc_info).width as i32,
                            (*crtc_info).height as i32,
                        );
                        let name = CStr::from_ptr((*output_info).name)
                            .to_string_lossy()
                            .into_owned();
                        screens.push(Screen::new(bbox, name));
                        (xrandr.XRRFreeCrtcInfo)(crtc_info);
                    }
                }
                (xrandr.XRRFreeOutputInfo)(output_info);
            }
            (xrandr.XRRFreeScreenResources)(resources);
        }
        // Mirrored outputs share a crtc; one monitor is enough for them.
        screens.dedup_by(|a, b| a.bbox == b.bbox);
        screens
    }

    fn get_xinerama_screens(&self) -> Vec<Screen> {
        use x11_dl::xinerama::Xlib as Xinerama;
        let Ok(xinerama) = Xinerama::open() else {
            return vec![];
        };
        unsafe {
            if (xinerama.XineramaIsActive)(self.display) == 0 {
                return vec![];
            }
            let mut count = 0;
            let infos = (xinerama.XineramaQueryScreens)(self.display, &mut count);
            if infos.is_null() {
                return vec![];
            }
            let screens = slice::from_raw_parts(infos, count as usize)
                .iter()
                .map(|info| {
                    let bbox = Xyhw::new(
                        info.x_org.into(),
                        info.y_org.into(),
                        info.width.into(),
                        info.height.into(),
                    );
                    Screen::new(bbox, format!("xinerama-{}", info.screen_number))
                })
                .collect();
            (self.xlib.XFree)(infos.cast());
            screens
        }
    }

    /// Returns the transient parent of a window.
    // `XGetTransientForHint`: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/XGetTransientForHint.html
    #[must_use]
    pub fn get_transient_for(&self, window: xlib::Window) -> Option<xlib::Window> {
        let mut transient: xlib::Window = 0;
        let status: c_int =
            unsafe { (self.xlib.XGetTransientForHint)(self.display, window, &mut transient) };
        (status > 0 && transient != 0).then_some(transient)
    }

    /// Returns the attributes of a window.
    /// # Errors
    ///
    /// Will error if window status is 0 (no attributes).
    // `XGetWindowAttributes`: https://tronche.com/gui/x/xlib/window-information/XGetWindowAttributes.html
    pub fn get_window_attrs(
        &self,
        window: xlib::Window,
    ) -> Result<xlib::XWindowAttributes, XlibError> {
        let mut attrs: xlib::XWindowAttributes = unsafe { std::mem::zeroed() };
        let status = unsafe { (self.xlib.XGetWindowAttributes)(self.display, window, &mut attrs) };
        if status == 0 {
            return Err(XlibError::FailedStatus);
        }
        Ok(attrs)
    }

    /// Whether a window has been destroyed. Unmapping alone does not count.
    #[must_use]
    pub fn is_window_gone(&self, window: xlib::Window) -> bool {
        self.get_window_attrs(window).is_err()
    }

    /// Returns a windows class `WM_CLASS` as instance and class.
    // `XGetClassHint`: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/XGetClassHint.html
    #[must_use]
    pub fn get_window_class(&self, window: xlib::Window) -> Option<(String, String)> {
        unsafe {
            let mut class_return: xlib::XClassHint = std::mem::zeroed();
            let status = (self.xlib.XGetClassHint)(self.display, window, &mut class_return);
            if status == 0 {
                return None;
            }
            let take = |ptr: *mut c_char| {
                if ptr.is_null() {
                    return String::new();
                }
                let text = CStr::from_ptr(ptr).to_string_lossy().into_owned();
                (self.xlib.XFree)(ptr.cast());
                text
            };
            let res_name = take(class_return.res_name);
            let res_class = take(class_return.res_class);
            Some((res_name, res_class))
        }
    }

    /// Returns the geometry of a window.
    /// # Errors
    ///
    /// Errors if Xlib returns a status of 0.
    // `XGetGeometry`: https://tronche.com/gui/x/xlib/window-information/XGetGeometry.html
    pub fn get_window_geometry(&self, window: xlib::Window) -> Result<Xyhw, XlibError> {
        let mut root_return: xlib::Window = 0;
        let mut x_return: c_int = 0;
        let mut y_return: c_int = 0;
        let mut width_return: c_uint = 0;
        let mut height_return: c_uint = 0;
        let mut border_width_return: c_uint = 0;
        let mut depth_return: c_uint = 0;
        let status = unsafe {
            (self.xlib.XGetGeometry)(
                self.display,
                window,
                &mut root_return,
                &mut x_return,
                &mut y_return,
                &mut width_return,
                &mut height_return,
                &mut border_width_return,
                &mut depth_return,
            )
        };
        if status == 0 {
            return Err(XlibError::FailedStatus);
        }
        Ok(Xyhw::new(
            x_return,
            y_return,
            width_return as i32,
            height_return as i32,
        ))
    }

    /// Returns a windows name, preferring `_NET_WM_NAME`.
    #[must_use]
    pub fn get_window_name(&self, window: xlib::Window) -> Option<String> {
        self.get_text_prop(window, self.atoms.NetWMName)
            .or_else(|_| self.get_text_prop(window, xlib::XA_WM_NAME))
            .ok()
    }

    /// Returns the states of a window.
    #[must_use]
    pub fn get_window_states(&self, window: xlib::Window) -> Vec<WindowState> {
        self.get_window_states_atoms(window)
            .into_iter()
            .filter_map(|atom| self.atoms.window_state(atom))
            .collect()
    }

    /// Returns the atom states of a window.
    #[must_use]
    pub fn get_window_states_atoms(&self, window: xlib::Window) -> Vec<xlib::Atom> {
        self.get_atoms(window, self.atoms.NetWMState)
    }

    /// Returns the type of a window. The first type we know wins.
    #[must_use]
    pub fn get_window_type(&self, window: xlib::Window) -> WindowType {
        self.get_atoms(window, self.atoms.NetWMWindowType)
            .into_iter()
            .map(|atom| self.atoms.window_type(atom))
            .find(|t| *t != WindowType::Normal)
            .unwrap_or_default()
    }

    /// Returns the `WM_HINTS` of a window.
    // `XGetWMHints`: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/XGetWMHints.html
    #[must_use]
    pub fn get_wmhints(&self, window: xlib::Window) -> Option<xlib::XWMHints> {
        unsafe {
            let hints_ptr: *mut xlib::XWMHints = (self.xlib.XGetWMHints)(self.display, window);
            if hints_ptr.is_null() {
                return None;
            }
            let hints: xlib::XWMHints = *hints_ptr;
            (self.xlib.XFree)(hints_ptr.cast());
            Some(hints)
        }
    }

    /// Returns the `WM_STATE` of a window.
    #[must_use]
    #[allow(clippy::cast_ptr_alignment)]
    pub fn get_wm_state(&self, window: xlib::Window) -> Option<c_long> {
        let (prop_return, nitems_return) = self
            .get_property(window, self.atoms.WMState, self.atoms.WMState)
            .ok()?;
        let state = (nitems_return > 0).then(|| unsafe { *prop_return.cast::<c_long>() });
        unsafe { (self.xlib.XFree)(prop_return.cast()) };
        state
    }

    // Internal functions.

    /// Returns the `WM_SIZE_HINTS`/`WM_NORMAL_HINTS` of a window.
    // `XGetWMNormalHints`: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/XGetWMNormalHints.html
    fn get_hint_sizing(&self, window: xlib::Window) -> Option<xlib::XSizeHints> {
        let mut xsize: xlib::XSizeHints = unsafe { std::mem::zeroed() };
        let mut msize: c_long = 0;
        let status =
            unsafe { (self.xlib.XGetWMNormalHints)(self.display, window, &mut xsize, &mut msize) };
        (status != 0).then_some(xsize)
    }

    /// Returns an atom list property of a window.
    fn get_atoms(&self, window: xlib::Window, property: xlib::Atom) -> Vec<xlib::Atom> {
        let Ok((prop_return, nitems_return)) =
            self.get_property(window, property, xlib::XA_ATOM)
        else {
            return vec![];
        };
        unsafe {
            #[allow(clippy::cast_ptr_alignment)]
            let ptr = prop_return.cast::<xlib::Atom>();
            let atoms = slice::from_raw_parts(ptr, nitems_return as usize).to_vec();
            (self.xlib.XFree)(prop_return.cast());
            atoms
        }
    }

    /// Returns a property of a window. The caller frees the data with `XFree`.
    /// # Errors
    ///
    /// Errors if the property is missing.
    // `XGetWindowProperty`: https://tronche.com/gui/x/xlib/window-information/XGetWindowProperty.html
    fn get_property(
        &self,
        window: xlib::Window,
        property: xlib::Atom,
        r#type: xlib::Atom,
    ) -> Result<(*mut c_uchar, c_ulong), XlibError> {
        let mut format_return: i32 = 0;
        let mut nitems_return: c_ulong = 0;
        let mut type_return: xlib::Atom = 0;
        let mut bytes_after_return: c_ulong = 0;
        let mut prop_return: *mut c_uchar = std::ptr::null_mut();
        unsafe {
            let status = (self.xlib.XGetWindowProperty)(
                self.display,
                window,
                property,
                0,
                MAX_PROPERTY_VALUE_LEN / 4,
                xlib::False,
                r#type,
                &mut type_return,
                &mut format_return,
                &mut nitems_return,
                &mut bytes_after_return,
                &mut prop_return,
            );
            if status == i32::from(xlib::Success) && !prop_return.is_null() {
                return Ok((prop_return, nitems_return));
            }
        };
        Err(XlibError::FailedStatus)
    }

    /// Returns a text property for a window.
    /// # Errors
    ///
    /// Errors if the property is missing or empty.
    // `XGetTextProperty`: https://tronche.com/gui/x/xlib/ICC/client-to-window-manager/XGetTextProperty.html
    fn get_text_prop(&self, window: xlib::Window, atom: xlib::Atom) -> Result<String, XlibError> {
        unsafe {
            let mut text_prop: xlib::XTextProperty = std::mem::zeroed();
            let status: c_int =
                (self.xlib.XGetTextProperty)(self.display, window, &mut text_prop, atom);
            if status == 0 || text_prop.value.is_null() {
                return Err(XlibError::FailedStatus);
            }
            let bytes = slice::from_raw_parts(text_prop.value, text_prop.nitems as usize);
            let text = String::from_utf8_lossy(bytes).into_owned();
            (self.xlib.XFree)(text_prop.value.cast());
            if text.is_empty() {
                return Err(XlibError::FailedStatus);
            }
            Ok(text)
        }
    }
}
