#![allow(clippy::wildcard_imports)]

use super::*;
use crate::display_action::DisplayAction;
use crate::models::Handle;
use crate::state::State;
use crate::utils::helpers;

impl<H: Handle> State<H> {
    /// Give a client the input focus and do everything that goes with it.
    /// Returns true if the focus changed.
    pub fn focus_window(&mut self, handle: &WindowHandle<H>) -> bool {
        let Some(index) = self.client_index(handle) else {
            return false;
        };
        if self.focused == Some(*handle) && !self.clients[index].urgent {
            return false;
        }
        let previous_window = self
            .focused
            .filter(|h| h != handle)
            .and_then(|h| self.client(&h).cloned());

        let client = &mut self.clients[index];
        client.urgent = false;
        let window = client.clone();
        self.active_monitor = window.monitor;
        self.focused = Some(*handle);

        let act = DisplayAction::WindowTakeFocus {
            window,
            previous_window,
        };
        self.actions.push_back(act);
        // A fullscreen client hidden behind a peer comes forward once focused.
        self.update_visibility();
        self.restack();
        true
    }

    /// Drop the focus, handing the input to the root window.
    pub fn unfocus(&mut self) {
        let previous = self.focused.take();
        self.actions.push_back(DisplayAction::Unfocus(previous));
    }

    /// The first client shown on a monitor, in registry order.
    #[must_use]
    pub fn first_visible_on(&self, monitor: usize) -> Option<WindowHandle<H>> {
        self.clients
            .iter()
            .find(|c| c.monitor == monitor && c.visible())
            .map(|c| c.handle)
    }

    /// Focus the first client shown on a monitor, or nothing if it shows none.
    pub fn focus_monitor(&mut self, monitor: usize) {
        self.active_monitor = monitor;
        match self.first_visible_on(monitor) {
            Some(handle) => {
                self.focus_window(&handle);
            }
            None => {
                if self.focused.is_some() {
                    self.unfocus();
                }
            }
        }
    }

    /// The pointer crossed into a window.
    pub fn window_enter_handler(&mut self, handle: &WindowHandle<H>) -> bool {
        if !self.focus_follows_mouse || !self.mode.is_normal() {
            return false;
        }
        if self.suppress_enter {
            self.suppress_enter = false;
            return false;
        }
        let Some(client) = self.client(handle) else {
            return false;
        };
        if !self.is_on_active_workspace(client) {
            return false;
        }
        self.focus_window(handle)
    }

    /// Idle poll of the pointer. Catches what enter notifications miss, such as the pointer
    /// moving onto an empty monitor.
    pub fn pointer_sample_handler(
        &mut self,
        window: Option<WindowHandle<H>>,
        x: i32,
        y: i32,
    ) -> bool {
        if !self.focus_follows_mouse || !self.mode.is_normal() {
            return false;
        }
        let sample = Some((window, x, y));
        if self.last_pointer == sample {
            return false;
        }
        self.last_pointer = sample;

        if let Some(handle) = window {
            if self.client(&handle).is_some_and(Client::visible) {
                // Any pending enter would be about this very window.
                self.suppress_enter = false;
                return self.focus_window(&handle);
            }
        }

        let Some(monitor) = self.monitor_at(x, y) else {
            return false;
        };
        let focused_monitor = self
            .focused_client()
            .map_or(self.active_monitor, |c| c.monitor);
        if monitor == focused_monitor {
            return false;
        }
        self.focus_monitor(monitor);
        true
    }

    /// Move the focus `shift` clients along the ones shown on the active monitor.
    pub fn focus_cycle(&mut self, shift: i32) -> bool {
        let monitor = self.active_monitor;
        let shown: Vec<WindowHandle<H>> = self
            .clients
            .iter()
            .filter(|c| c.monitor == monitor && c.visible())
            .map(|c| c.handle)
            .collect();
        let Some(focused) = self.focused else {
            return shown.first().is_some_and(|first| self.focus_window(first));
        };
        let Some(next) = helpers::relative_find(&shown, |h| *h == focused, shift, true).copied()
        else {
            return false;
        };
        let changed = self.focus_window(&next);
        self.suppress_enter = changed;
        changed
    }

    /// A client asked to be activated.
    pub fn activate_window(&mut self, handle: &WindowHandle<H>) -> bool {
        let Some(client) = self.client(handle) else {
            return false;
        };
        if self.is_on_active_workspace(client) {
            return self.focus_window(handle);
        }
        match self.client_mut(handle) {
            Some(client) if !client.urgent => {
                client.urgent = true;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Xyhw;

    #[test]
    fn focusing_a_window_should_make_it_active() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.focus_window(&WindowHandle(1));
        assert_eq!(manager.state.focused, Some(WindowHandle(1)));
        assert_eq!(
            manager.state.focused_client().map(|c| c.handle),
            Some(WindowHandle(1))
        );
    }

    #[test]
    fn focusing_the_same_window_twice_is_quiet() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.actions.clear();
        assert!(!manager.state.focus_window(&WindowHandle(1)));
        assert!(manager.state.actions.is_empty());
    }

    #[test]
    fn focus_clears_urgency() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.clients[0].urgent = true;
        manager.state.focus_window(&WindowHandle(1));
        assert!(!manager.state.clients[0].urgent);
    }

    #[test]
    fn focus_tells_the_display_server_about_the_previous_window() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.actions.clear();
        manager.state.focus_window(&WindowHandle(1));
        match manager.state.actions.front() {
            Some(DisplayAction::WindowTakeFocus {
                window,
                previous_window,
            }) => {
                assert_eq!(window.handle, WindowHandle(1));
                assert_eq!(previous_window.as_ref().map(|c| c.handle), Some(WindowHandle(2)));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn enter_is_ignored_while_dragging() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.mode = Mode::MovingWindow {
            handle: WindowHandle(2),
            last: (0, 0),
            was_tiled: false,
        };
        assert!(!manager.state.window_enter_handler(&WindowHandle(1)));
        assert_eq!(manager.state.focused, Some(WindowHandle(2)));
    }

    #[test]
    fn one_enter_is_swallowed_after_a_programmatic_change() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.suppress_enter = true;
        assert!(!manager.state.window_enter_handler(&WindowHandle(1)));
        assert!(manager.state.window_enter_handler(&WindowHandle(1)));
        assert_eq!(manager.state.focused, Some(WindowHandle(1)));
    }

    #[test]
    fn enter_on_a_hidden_workspace_is_ignored() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.clients[0].workspace = 2;
        assert!(!manager.state.window_enter_handler(&WindowHandle(1)));
    }

    #[test]
    fn pointer_samples_focus_the_window_under_the_pointer() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        assert!(manager.state.pointer_sample_handler(Some(WindowHandle(1)), 10, 10));
        assert_eq!(manager.state.focused, Some(WindowHandle(1)));
        // The same sample again changes nothing.
        manager.state.focus_window(&WindowHandle(2));
        assert!(!manager.state.pointer_sample_handler(Some(WindowHandle(1)), 10, 10));
        assert_eq!(manager.state.focused, Some(WindowHandle(2)));
    }

    #[test]
    fn pointer_on_an_empty_monitor_clears_focus() {
        let mut manager = Manager::new_test();
        manager.state.screens_changed_handler(vec![
            Screen::new(Xyhw::new(0, 0, 800, 600), "left".to_string()),
            Screen::new(Xyhw::new(800, 0, 800, 600), "right".to_string()),
        ]);
        manager.add_test_clients(1);
        assert!(manager.state.pointer_sample_handler(None, 900, 100));
        assert_eq!(manager.state.focused, None);
        assert_eq!(manager.state.active_monitor, 1);
    }

    #[test]
    fn focus_cycle_wraps_around() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(3);
        assert!(manager.state.focus_cycle(1));
        assert_eq!(manager.state.focused, Some(WindowHandle(1)));
        assert!(manager.state.focus_cycle(-1));
        assert_eq!(manager.state.focused, Some(WindowHandle(3)));
    }

    #[test]
    fn activation_on_a_hidden_workspace_marks_urgent() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.clients[0].workspace = 5;
        manager.state.update_visibility();
        assert!(manager.state.activate_window(&WindowHandle(1)));
        assert!(manager.state.clients[0].urgent);
        assert_eq!(manager.state.focused, Some(WindowHandle(2)));
    }

    #[test]
    fn activation_on_the_shown_workspace_focuses() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        assert!(manager.state.activate_window(&WindowHandle(1)));
        assert_eq!(manager.state.focused, Some(WindowHandle(1)));
    }
}
