#![allow(clippy::wildcard_imports)]

use super::*;
use crate::display_action::DisplayAction;
use crate::models::Handle;
use crate::state::State;
use crate::utils::modmask_lookup::{Button, ModMask};

/// A tiled client picked up with the mouse shrinks to this share of its tile.
const PICKUP_SCALE_NUM: i32 = 4;
const PICKUP_SCALE_DEN: i32 = 5;

impl<H: Handle> State<H> {
    /// A button went down on a managed window.
    pub fn mouse_combo_handler(
        &mut self,
        modmask: ModMask,
        button: Button,
        handle: WindowHandle<H>,
        x: i32,
        y: i32,
    ) -> bool {
        if !self.mode.is_normal() {
            return false;
        }
        if self.client(&handle).is_none() {
            return false;
        }
        if modmask.without_locks() != self.mousekey {
            // A plain click only focuses.
            return self.focus_window(&handle);
        }
        self.focus_window(&handle);
        if button == Button::Button1 {
            self.start_move(handle, x, y)
        } else if button == Button::Button3 {
            self.start_resize(handle, x, y)
        } else {
            false
        }
    }

    fn start_move(&mut self, handle: WindowHandle<H>, x: i32, y: i32) -> bool {
        let Some(client) = self.client_mut(&handle) else {
            return false;
        };
        if client.is_fullscreen() {
            return false;
        }
        let was_tiled = client.is_tiled();
        if was_tiled {
            let (w, h) = client.hints.apply(
                client.geometry.w * PICKUP_SCALE_NUM / PICKUP_SCALE_DEN,
                client.geometry.h * PICKUP_SCALE_NUM / PICKUP_SCALE_DEN,
            );
            client.geometry.w = w;
            client.geometry.h = h;
            client.geometry.center_on(x, y);
            client.set_floating(true);
            let monitor = client.monitor;
            self.arrange(monitor);
        }
        self.mode = Mode::MovingWindow {
            handle,
            last: (x, y),
            was_tiled,
        };
        self.actions
            .push_back(DisplayAction::ReadyToMoveWindow(handle));
        self.restack();
        true
    }

    fn start_resize(&mut self, handle: WindowHandle<H>, x: i32, y: i32) -> bool {
        let Some(client) = self.client(&handle) else {
            return false;
        };
        if !client.floating() || client.is_fullscreen() {
            return false;
        }
        let corner = client.outer().corner_at(x, y);
        let start = client.geometry;
        self.mode = Mode::ResizingWindow {
            handle,
            corner,
            origin: (x, y),
            start,
        };
        self.actions
            .push_back(DisplayAction::ReadyToResizeWindow(handle));
        self.restack();
        true
    }

    /// The pointer moved while a button is held.
    pub fn motion_handler(&mut self, x: i32, y: i32) -> bool {
        match self.mode {
            Mode::Normal => false,
            Mode::MovingWindow {
                handle,
                last,
                was_tiled,
            } => {
                self.mode = Mode::MovingWindow {
                    handle,
                    last: (x, y),
                    was_tiled,
                };
                self.window_move_handler(&handle, (x - last.0, y - last.1), x, y)
            }
            Mode::ResizingWindow {
                handle,
                corner,
                origin,
                start,
            } => {
                let offset = (x - origin.0, y - origin.1);
                self.window_resize_handler(&handle, corner, start, offset)
            }
        }
    }

    /// The held button was let go. Ends any drag.
    pub fn button_release_handler(&mut self, x: i32, y: i32) -> bool {
        let mode = std::mem::take(&mut self.mode);
        if mode.is_normal() {
            return false;
        }
        if let Mode::MovingWindow {
            handle,
            was_tiled: true,
            ..
        } = mode
        {
            self.drop_on_tile(&handle, x, y);
        }
        self.actions.push_back(DisplayAction::NormalMode);
        self.restack();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Corner, SizeHints, Xyhw};

    #[test]
    fn picking_up_a_tiled_client_floats_it_under_the_pointer() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        let tile = manager.state.clients[0].geometry;
        assert!(manager.state.mouse_combo_handler(
            ModMask::Super,
            Button::Button1,
            WindowHandle(1),
            100,
            100
        ));

        let client = &manager.state.clients[0];
        assert!(client.floating());
        assert_eq!(client.geometry.w, tile.w * 4 / 5);
        assert_eq!(client.geometry.center(), (100, 100));
        assert_eq!(
            manager.state.mode,
            Mode::MovingWindow {
                handle: WindowHandle(1),
                last: (100, 100),
                was_tiled: true
            }
        );
        // The other client has the monitor to itself now.
        assert_eq!(manager.state.clients[1].geometry, Xyhw::new(0, 0, 798, 598));
    }

    #[test]
    fn pickup_respects_the_minimum_size() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.clients[0].hints = SizeHints {
            minw: 430,
            minh: 10,
            valid: true,
            ..SizeHints::default()
        };
        manager
            .state
            .mouse_combo_handler(ModMask::Super, Button::Button1, WindowHandle(1), 100, 100);
        assert_eq!(manager.state.clients[0].geometry.w, 430);
    }

    #[test]
    fn a_plain_click_only_focuses() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager
            .state
            .mouse_combo_handler(ModMask::empty(), Button::Button1, WindowHandle(1), 10, 10);
        assert_eq!(manager.state.focused, Some(WindowHandle(1)));
        assert!(manager.state.mode.is_normal());
    }

    #[test]
    fn lock_keys_do_not_prevent_a_drag() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        let mask = ModMask::Super | ModMask::NumLock;
        manager
            .state
            .mouse_combo_handler(mask, Button::Button1, WindowHandle(1), 10, 10);
        assert!(!manager.state.mode.is_normal());
    }

    #[test]
    fn tiled_clients_cannot_be_resized() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        assert!(!manager.state.mouse_combo_handler(
            ModMask::Super,
            Button::Button3,
            WindowHandle(1),
            10,
            10
        ));
        assert!(manager.state.mode.is_normal());
    }

    #[test]
    fn the_resize_corner_is_the_pointer_quadrant() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.toggle_floating(&WindowHandle(1));
        manager.state.clients[0].geometry = Xyhw::new(100, 100, 200, 100);
        manager
            .state
            .mouse_combo_handler(ModMask::Super, Button::Button3, WindowHandle(1), 110, 110);
        assert!(matches!(
            manager.state.mode,
            Mode::ResizingWindow {
                corner: Corner::TopLeft,
                ..
            }
        ));
    }

    #[test]
    fn the_resized_corner_stays_under_the_pointer() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.toggle_floating(&WindowHandle(1));
        let start = Xyhw::new(100, 100, 200, 100);
        manager.state.clients[0].geometry = start;
        manager
            .state
            .mouse_combo_handler(ModMask::Super, Button::Button3, WindowHandle(1), 290, 190);

        // Far past the minimum, then back to where the drag began.
        assert!(manager.state.motion_handler(40, 40));
        assert_eq!(manager.state.clients[0].geometry, Xyhw::new(100, 100, 15, 15));
        assert!(manager.state.motion_handler(200, 150));
        assert_eq!(manager.state.clients[0].geometry, Xyhw::new(100, 100, 110, 60));
        assert!(manager.state.motion_handler(290, 190));
        assert_eq!(manager.state.clients[0].geometry, start);
    }

    #[test]
    fn release_ends_the_drag() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.toggle_floating(&WindowHandle(1));
        manager
            .state
            .mouse_combo_handler(ModMask::Super, Button::Button1, WindowHandle(1), 10, 10);
        manager.state.actions.clear();
        assert!(manager.state.button_release_handler(10, 10));
        assert!(manager.state.mode.is_normal());
        assert!(matches!(
            manager.state.actions.front(),
            Some(DisplayAction::NormalMode)
        ));
        assert!(!manager.state.button_release_handler(10, 10));
    }
}
