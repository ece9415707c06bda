#![allow(clippy::wildcard_imports)]

use super::*;
use crate::config::Diagnostic;
use crate::display_action::DisplayAction;
use crate::display_servers::DisplayServer;
use crate::models::{Handle, WorkspaceId};
use crate::state::State;
use crate::utils::child_process::{Children, exec_shell};
use crate::utils::command_socket::{Reply, Request};

impl<H: Handle, C: Config, SERVER: DisplayServer<H>> Manager<H, C, SERVER> {
    /// Processes a command and invokes the associated function.
    ///
    /// Returns `true` if changes need to be rendered.
    pub fn command_handler(&mut self, command: &Command) -> bool {
        tracing::debug!("Running command {command:?}");
        process_internal(self, command).unwrap_or(false)
    }

    /// Answer a request from the command socket. The flag tells whether changes need to be
    /// rendered.
    pub fn request_handler(&mut self, request: &Request) -> (Reply, bool) {
        match request {
            Request::Reload | Request::Command(Command::Reload) => match self.reload_config() {
                Ok(()) => (Reply::ok("configuration reloaded"), true),
                Err(diagnostics) => (Reply::error(join(&diagnostics)), false),
            },
            Request::Validate => {
                let diagnostics = self.config.validate();
                let reply = if diagnostics.iter().any(Diagnostic::is_fatal) {
                    Reply::error(join(&diagnostics))
                } else if diagnostics.is_empty() {
                    Reply::ok("configuration is valid")
                } else {
                    Reply::ok(join(&diagnostics))
                };
                (reply, false)
            }
            Request::Command(command) => {
                let changed = self.command_handler(command);
                (Reply::ok("ok"), changed)
            }
        }
    }

    /// Load the configuration again and apply it to every monitor and client. A failing
    /// source leaves the running configuration untouched.
    ///
    /// # Errors
    ///
    /// Returns the diagnostics of a configuration source with a fatal problem.
    pub fn reload_config(&mut self) -> std::result::Result<(), Vec<Diagnostic>> {
        let config = self.config.reload().inspect_err(|diagnostics| {
            tracing::warn!("Keeping the running configuration: {}", join(diagnostics));
        })?;
        self.config = config;
        self.state.load_config(&self.config);
        self.display_server
            .load_config(&self.config, self.state.focused, &self.state.clients);
        self.state.arrange_all();
        self.state.update_visibility();
        self.state.restack();
        tracing::info!("Configuration reloaded");
        Ok(())
    }
}

fn process_internal<H: Handle, C: Config, SERVER: DisplayServer<H>>(
    manager: &mut Manager<H, C, SERVER>,
    command: &Command,
) -> Option<bool> {
    let state = &mut manager.state;
    match command {
        Command::SwitchWorkspace(workspace) => {
            Some(state.switch_workspace(state.active_monitor, *workspace))
        }
        Command::MoveToWorkspace(workspace) => move_to_workspace(state, *workspace),

        Command::IncreaseFactor => change_split_factor(state, 1.0),
        Command::DecreaseFactor => change_split_factor(state, -1.0),
        Command::IncreaseMaster => change_master_count(state, 1),
        Command::DecreaseMaster => change_master_count(state, -1),
        Command::ToggleLayoutMode => toggle_layout_mode(state),

        Command::ToggleFloating => {
            let handle = state.focused?;
            Some(state.toggle_floating(&handle))
        }
        Command::ToggleFullscreen => {
            let client = state.focused_client()?;
            let (handle, enabled) = (client.handle, !client.is_fullscreen());
            Some(state.set_fullscreen(&handle, enabled))
        }
        Command::CloseWindow => close_window(state),

        Command::FocusNext => Some(state.focus_cycle(1)),
        Command::FocusPrevious => Some(state.focus_cycle(-1)),

        Command::Spawn(shell_command) => execute(&mut manager.children, shell_command),
        Command::Reload => Some(manager.reload_config().is_ok()),
        Command::Quit => {
            tracing::info!("Quit requested");
            manager.quit_requested = true;
            None
        }
    }
}

fn execute(children: &mut Children, shell_command: &str) -> Option<bool> {
    let _ = exec_shell(shell_command, children);
    None
}

fn move_to_workspace<H: Handle>(state: &mut State<H>, workspace: WorkspaceId) -> Option<bool> {
    let handle = state.focused?;
    Some(state.move_client_to_workspace(&handle, workspace))
}

fn change_split_factor<H: Handle>(state: &mut State<H>, direction: f32) -> Option<bool> {
    let monitor = state.active_monitor;
    let delta = direction * state.layout.factor_step;
    if !state.monitors.get_mut(monitor)?.adjust_split_factor(delta) {
        return Some(false);
    }
    state.arrange(monitor);
    Some(true)
}

fn change_master_count<H: Handle>(state: &mut State<H>, delta: isize) -> Option<bool> {
    let monitor = state.active_monitor;
    let mon = state.monitors.get_mut(monitor)?;
    let count = mon.master_count.checked_add_signed(delta)?;
    mon.master_count = count;
    state.arrange(monitor);
    Some(true)
}

fn toggle_layout_mode<H: Handle>(state: &mut State<H>) -> Option<bool> {
    let monitor = state.active_monitor;
    let mon = state.monitors.get_mut(monitor)?;
    mon.layout_mode = mon.layout_mode.toggled();
    tracing::debug!("Monitor {monitor} switched to {:?}", mon.layout_mode);
    state.arrange(monitor);
    state.restack();
    Some(true)
}

fn close_window<H: Handle>(state: &mut State<H>) -> Option<bool> {
    let handle = state.focused?;
    state.actions.push_back(DisplayAction::KillWindow(handle));
    None
}

fn join(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::TestConfig;
    use crate::layouts::LayoutMode;

    #[test]
    fn switch_workspace_acts_on_the_active_monitor() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        assert!(manager.command_handler(&Command::SwitchWorkspace(2)));
        assert_eq!(manager.state.monitors[0].active_workspace, 2);
        assert!(!manager.state.clients[0].visible());
        assert!(!manager.command_handler(&Command::SwitchWorkspace(2)));
        assert!(!manager.command_handler(&Command::SwitchWorkspace(42)));
    }

    #[test]
    fn move_to_workspace_needs_a_focused_client() {
        let mut manager = Manager::new_test();
        assert!(!manager.command_handler(&Command::MoveToWorkspace(1)));
        manager.add_test_clients(2);
        assert!(manager.command_handler(&Command::MoveToWorkspace(1)));
        let moved = manager.state.client(&WindowHandle(2)).unwrap();
        assert_eq!(moved.workspace, 1);
        assert!(!moved.visible());
    }

    #[test]
    fn split_factor_commands_widen_and_narrow_the_master() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        let before = manager.state.clients[0].geometry.w;
        assert!(manager.command_handler(&Command::IncreaseFactor));
        let wider = manager.state.clients[0].geometry.w;
        assert!(wider > before);
        assert!(manager.command_handler(&Command::DecreaseFactor));
        assert!(manager.command_handler(&Command::DecreaseFactor));
        assert!(manager.state.clients[0].geometry.w < before);
    }

    #[test]
    fn split_factor_stops_at_its_bounds() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        for _ in 0..40 {
            manager.command_handler(&Command::IncreaseFactor);
        }
        assert!(!manager.command_handler(&Command::IncreaseFactor));
        let factor = manager.state.monitors[0].split_factor();
        assert!((factor - crate::models::MAX_SPLIT_FACTOR).abs() < f32::EPSILON);
    }

    #[test]
    fn master_count_never_goes_below_zero() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        assert!(manager.command_handler(&Command::DecreaseMaster));
        assert_eq!(manager.state.monitors[0].master_count, 0);
        // Both clients now share the full width stack.
        assert_eq!(manager.state.clients[0].geometry.w, 798);
        assert!(!manager.command_handler(&Command::DecreaseMaster));
        assert!(manager.command_handler(&Command::IncreaseMaster));
        assert!(manager.command_handler(&Command::IncreaseMaster));
        assert_eq!(manager.state.monitors[0].master_count, 2);
    }

    #[test]
    fn floating_layout_leaves_geometry_alone() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        assert!(manager.command_handler(&Command::ToggleLayoutMode));
        assert_eq!(manager.state.monitors[0].layout_mode, LayoutMode::Floating);
        manager.add_test_clients(3);
        let placed = manager.state.client(&WindowHandle(3)).unwrap().geometry;
        manager.state.arrange(0);
        assert_eq!(manager.state.client(&WindowHandle(3)).unwrap().geometry, placed);
    }

    #[test]
    fn toggles_act_on_the_focused_client() {
        let mut manager = Manager::new_test();
        assert!(!manager.command_handler(&Command::ToggleFloating));
        manager.add_test_clients(1);
        assert!(manager.command_handler(&Command::ToggleFloating));
        assert!(manager.state.clients[0].floating());
        assert!(manager.command_handler(&Command::ToggleFullscreen));
        assert!(manager.state.clients[0].is_fullscreen());
        assert!(manager.command_handler(&Command::ToggleFullscreen));
        assert!(!manager.state.clients[0].is_fullscreen());
        assert!(manager.state.clients[0].floating());
    }

    #[test]
    fn close_window_asks_the_display_server() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.actions.clear();
        manager.command_handler(&Command::CloseWindow);
        assert!(matches!(
            manager.state.actions.back(),
            Some(DisplayAction::KillWindow(WindowHandle(1)))
        ));
        // The client stays managed until the display server reports it gone.
        assert_eq!(manager.state.clients.len(), 1);
    }

    #[test]
    fn quit_is_only_a_request() {
        let mut manager = Manager::new_test();
        assert!(!manager.command_handler(&Command::Quit));
        assert!(manager.quit_requested);
    }

    #[test]
    fn failed_reload_keeps_the_running_configuration() {
        let mut manager = Manager::new_test();
        let (reply, changed) = manager.request_handler(&Request::Reload);
        assert_eq!(reply.status, 1);
        assert!(reply.message.contains("broken on purpose"));
        assert!(!changed);
        assert_eq!(manager.state.workspaces.len(), 9);
    }

    #[test]
    fn reload_applies_the_new_configuration() {
        let reloaded = TestConfig {
            workspaces: vec!["web".to_string(), "code".to_string()],
            ..TestConfig::default()
        };
        let mut manager = Manager::new_test_with(TestConfig {
            reloaded: Some(Box::new(reloaded)),
            ..TestConfig::default()
        });
        manager.add_test_clients(1);
        manager.state.switch_workspace(0, 5);
        manager.command_handler(&Command::MoveToWorkspace(7));

        let (reply, changed) = manager.request_handler(&Request::Reload);
        assert_eq!(reply, Reply::ok("configuration reloaded"));
        assert!(changed);
        assert_eq!(manager.state.workspaces, vec!["web", "code"]);
        assert_eq!(manager.state.monitors[0].workspace_count(), 2);
        assert_eq!(manager.state.clients[0].workspace, 1);
    }

    #[test]
    fn validate_reports_without_applying() {
        let mut manager = Manager::new_test();
        let (reply, changed) = manager.request_handler(&Request::Validate);
        assert_eq!(reply.status, 1);
        assert!(!changed);

        let mut manager = Manager::new_test_with(TestConfig {
            reloaded: Some(Box::default()),
            ..TestConfig::default()
        });
        let (reply, _) = manager.request_handler(&Request::Validate);
        assert_eq!(reply, Reply::ok("configuration is valid"));
    }

    #[test]
    fn commands_over_the_socket_are_acknowledged() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        let (reply, changed) =
            manager.request_handler(&Request::Command(Command::SwitchWorkspace(3)));
        assert_eq!(reply.status, 0);
        assert!(changed);
    }
}
