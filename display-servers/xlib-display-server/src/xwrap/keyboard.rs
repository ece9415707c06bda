//! Key grabs, looked up by keysym name.
use super::XlibError;
use crate::XWrap;
use std::ffi::{CStr, CString};
use std::os::raw::c_ulong;
use x11_dl::xlib;

impl XWrap {
    /// The name of the unshifted keysym a keycode produces, such as `Return` or `q`.
    // `XkbKeycodeToKeysym`: https://linux.die.net/man/3/xkbkeycodetokeysym
    // `XKeysymToString`: https://tronche.com/gui/x/xlib/utilities/keyboard/XKeysymToString.html
    #[must_use]
    pub fn keysym_name(&self, keycode: u32) -> Option<String> {
        let keycode = u8::try_from(keycode).ok()?;
        unsafe {
            let sym = (self.xlib.XkbKeycodeToKeysym)(self.display, keycode, 0, 0);
            if sym == 0 {
                return None;
            }
            let name = (self.xlib.XKeysymToString)(sym);
            if name.is_null() {
                return None;
            }
            // Owned by Xlib, must not be freed.
            Some(CStr::from_ptr(name).to_string_lossy().into_owned())
        }
    }

    /// The keysym with the given name.
    // `XStringToKeysym`: https://tronche.com/gui/x/xlib/utilities/keyboard/XStringToKeysym.html
    #[must_use]
    pub fn keysym_for_name(&self, name: &str) -> Option<c_ulong> {
        let name = CString::new(name).ok()?;
        let sym = unsafe { (self.xlib.XStringToKeysym)(name.as_ptr()) };
        (sym != 0).then_some(sym)
    }

    /// Updates the keyboard mapping.
    /// # Errors
    ///
    /// Will error if updating the keyboard failed.
    // `XRefreshKeyboardMapping`: https://tronche.com/gui/x/xlib/utilities/keyboard/XRefreshKeyboardMapping.html
    pub fn refresh_keyboard(&self, evt: &mut xlib::XMappingEvent) -> Result<(), XlibError> {
        let status = unsafe { (self.xlib.XRefreshKeyboardMapping)(evt) };
        if status == 0 {
            Err(XlibError::FailedStatus)
        } else {
            Ok(())
        }
    }

    /// Grabs the keysym with the modifier on the root.
    // `XGrabKey`: https://tronche.com/gui/x/xlib/input/XGrabKey.html
    pub fn grab_keys(&self, keysym: c_ulong, modifiers: u32) {
        let code = unsafe { (self.xlib.XKeysymToKeycode)(self.display, keysym) };
        if code == 0 {
            return;
        }
        // Grab the keys with and without numlock (Mod2) and caps lock.
        let mods = [
            modifiers,
            modifiers | xlib::Mod2Mask,
            modifiers | xlib::LockMask,
            modifiers | xlib::Mod2Mask | xlib::LockMask,
        ];
        for m in mods {
            unsafe {
                (self.xlib.XGrabKey)(
                    self.display,
                    i32::from(code),
                    m,
                    self.root,
                    1,
                    xlib::GrabModeAsync,
                    xlib::GrabModeAsync,
                );
            }
        }
    }

    /// Drop every key grab and grab the configured bindings again.
    // `XUngrabKey`: https://tronche.com/gui/x/xlib/input/XUngrabKey.html
    pub fn reset_grabs(&self) {
        unsafe {
            (self.xlib.XUngrabKey)(self.display, xlib::AnyKey, xlib::AnyModifier, self.root);
        }
        for bind in &self.keybinds {
            match self.keysym_for_name(&bind.key) {
                Some(keysym) => self.grab_keys(keysym, u32::from(bind.modifier.bits())),
                None => tracing::warn!("Unknown key {:?} in a binding", bind.key),
            }
        }
    }
}
