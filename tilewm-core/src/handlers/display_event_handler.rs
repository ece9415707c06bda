use super::{Config, DisplayEvent, Manager};
use crate::display_servers::DisplayServer;
use crate::models::Handle;

impl<H: Handle, C: Config, SERVER: DisplayServer<H>> Manager<H, C, SERVER> {
    /// Process a collection of events, and apply them changes to a manager.
    /// Returns true if changes need to be rendered.
    pub fn display_event_handler(&mut self, event: DisplayEvent<H>) -> bool {
        match event {
            DisplayEvent::ScreensChanged(screens) => self.state.screens_changed_handler(screens),
            DisplayEvent::WindowCreate(client, x, y) => self.window_created_handler(client, x, y),
            DisplayEvent::WindowChange(change) => self.window_changed_handler(change),
            DisplayEvent::WindowDestroy(handle) => self.window_destroyed_handler(&handle),

            DisplayEvent::KeyCombo(mod_mask, key) => {
                // The first binding wins when two share a combination.
                let command = self
                    .state
                    .keybinds
                    .iter()
                    .find(|bind| bind.matches(mod_mask, &key))
                    .map(|bind| bind.command.clone());
                command.is_some_and(|cmd| self.command_handler(&cmd))
            }
            DisplayEvent::SendCommand(command) => self.command_handler(&command),

            DisplayEvent::MouseCombo(mod_mask, button, handle, x, y) => self
                .state
                .mouse_combo_handler(mod_mask, button, handle, x, y),
            DisplayEvent::Motion(x, y) => {
                if self.state.mode.is_normal() {
                    return false;
                }
                self.state.motion_handler(x, y)
            }
            DisplayEvent::ButtonRelease(x, y) => self.state.button_release_handler(x, y),

            DisplayEvent::WindowEnter(handle) => self.state.window_enter_handler(&handle),
            DisplayEvent::PointerSample(handle, x, y) => {
                self.state.pointer_sample_handler(handle, x, y)
            }
            DisplayEvent::ActivateWindow(handle) => self.state.activate_window(&handle),
            DisplayEvent::SetFullscreen(handle, change) => {
                self.state.fullscreen_request_handler(&handle, change)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;
    use crate::config::Keybind;
    use crate::config::tests::TestConfig;
    use crate::models::{StateChange, WindowHandle};
    use crate::utils::modmask_lookup::ModMask;

    #[test]
    fn key_combos_run_their_binding() {
        let mut manager = Manager::new_test_with(TestConfig {
            keybinds: vec![Keybind {
                command: Command::SwitchWorkspace(3),
                modifier: ModMask::Super,
                key: "4".to_string(),
            }],
            ..TestConfig::default()
        });
        let pressed = ModMask::Super | ModMask::NumLock;
        assert!(manager.display_event_handler(DisplayEvent::KeyCombo(pressed, "4".to_string())));
        assert_eq!(manager.state.monitors[0].active_workspace, 3);
        assert!(
            !manager.display_event_handler(DisplayEvent::KeyCombo(ModMask::Alt, "4".to_string()))
        );
    }

    #[test]
    fn motion_without_a_drag_is_ignored() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        assert!(!manager.display_event_handler(DisplayEvent::Motion(10, 10)));
    }

    #[test]
    fn client_requests_reach_the_handlers() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        assert!(manager.display_event_handler(DisplayEvent::SetFullscreen(
            WindowHandle(1),
            StateChange::Toggle
        )));
        assert!(manager.state.clients[0].is_fullscreen());
        assert!(manager.display_event_handler(DisplayEvent::WindowDestroy(WindowHandle(1))));
        assert!(manager.state.clients.is_empty());
        assert_eq!(manager.state.focused, None);
    }
}
