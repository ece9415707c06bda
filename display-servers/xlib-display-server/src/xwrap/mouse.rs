//! Xlib calls related to a mouse.
use super::{BUTTONMASK, MOUSEMASK};
use crate::XWrap;
use std::os::raw::c_ulong;
use x11_dl::xlib;

impl XWrap {
    /// Grab the buttons of a client. The move and resize chords are always grabbed; an unfocused
    /// client also grabs plain clicks so that clicking it focuses it.
    pub fn grab_mouse_clicks(&self, handle: xlib::Window, is_focused: bool) {
        self.ungrab_buttons(handle);
        if !is_focused {
            self.grab_buttons(handle, xlib::AnyButton as u32, xlib::AnyModifier, true);
        }
        let mouse_key = u32::from(self.mouse_key_mask.bits());
        self.grab_buttons(handle, xlib::Button1, mouse_key, false);
        self.grab_buttons(handle, xlib::Button3, mouse_key, false);
    }

    /// Grabs the button with the modifier for a window. A synchronous grab freezes the pointer
    /// until the click is replayed.
    // `XGrabButton`: https://tronche.com/gui/x/xlib/input/XGrabButton.html
    pub fn grab_buttons(&self, window: xlib::Window, button: u32, modifiers: u32, sync: bool) {
        let pointer_mode = if sync {
            xlib::GrabModeSync
        } else {
            xlib::GrabModeAsync
        };
        // Grab the buttons with and without numlock (Mod2) and caps lock.
        let mods: Vec<u32> = if modifiers == xlib::AnyModifier {
            vec![modifiers]
        } else {
            vec![
                modifiers,
                modifiers | xlib::Mod2Mask,
                modifiers | xlib::LockMask,
                modifiers | xlib::Mod2Mask | xlib::LockMask,
            ]
        };
        for m in mods {
            unsafe {
                (self.xlib.XGrabButton)(
                    self.display,
                    button,
                    m,
                    window,
                    0,
                    BUTTONMASK as u32,
                    pointer_mode,
                    xlib::GrabModeAsync,
                    0,
                    0,
                );
            }
        }
    }

    /// Cleans all currently grabbed buttons of a window.
    // `XUngrabButton`: https://tronche.com/gui/x/xlib/input/XUngrabButton.html
    pub fn ungrab_buttons(&self, handle: xlib::Window) {
        unsafe {
            (self.xlib.XUngrabButton)(
                self.display,
                xlib::AnyButton as u32,
                xlib::AnyModifier,
                handle,
            );
        }
    }

    /// Grabs the cursor and sets its visual.
    // `XGrabPointer`: https://tronche.com/gui/x/xlib/input/XGrabPointer.html
    pub fn grab_pointer(&self, cursor: c_ulong) {
        unsafe {
            (self.xlib.XGrabPointer)(
                self.display,
                self.root,
                0,
                MOUSEMASK as u32,
                xlib::GrabModeAsync,
                xlib::GrabModeAsync,
                0,
                cursor,
                xlib::CurrentTime,
            );
        }
    }

    /// Ungrab the cursor.
    // `XUngrabPointer`: https://tronche.com/gui/x/xlib/input/XUngrabPointer.html
    pub fn ungrab_pointer(&self) {
        unsafe {
            (self.xlib.XUngrabPointer)(self.display, xlib::CurrentTime);
        }
    }

    /// Hand a click that a synchronous grab froze on to the client.
    // `XAllowEvents`: https://linux.die.net/man/3/xallowevents
    pub fn replay_pointer(&self) {
        unsafe { (self.xlib.XAllowEvents)(self.display, xlib::ReplayPointer, xlib::CurrentTime) };
    }
}
