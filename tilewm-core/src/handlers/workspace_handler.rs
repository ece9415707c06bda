#![allow(clippy::wildcard_imports)]

use super::*;
use crate::display_action::DisplayAction;
use crate::models::{Handle, WorkspaceId};
use crate::state::State;

impl<H: Handle> State<H> {
    /// Show workspace `workspace` on a monitor. Out of range or already shown is a no-op.
    pub fn switch_workspace(&mut self, monitor: usize, workspace: WorkspaceId) -> bool {
        if workspace >= self.workspaces.len() {
            return false;
        }
        let Some(mon) = self.monitors.get_mut(monitor) else {
            return false;
        };
        if mon.active_workspace == workspace {
            return false;
        }
        mon.active_workspace = workspace;
        tracing::debug!("Monitor {monitor} now shows workspace {workspace}");

        self.actions
            .push_back(DisplayAction::SetCurrentWorkspace(workspace));
        self.arrange(monitor);
        self.update_visibility();
        self.focus_monitor(monitor);
        self.suppress_enter = true;
        true
    }

    /// Send a client to another workspace of its monitor.
    pub fn move_client_to_workspace(
        &mut self,
        handle: &WindowHandle<H>,
        workspace: WorkspaceId,
    ) -> bool {
        if workspace >= self.workspaces.len() {
            return false;
        }
        let Some(client) = self.client_mut(handle) else {
            return false;
        };
        if client.workspace == workspace {
            return false;
        }
        client.workspace = workspace;
        let monitor = client.monitor;
        self.move_to_tail(handle);
        self.actions
            .push_back(DisplayAction::SetWindowWorkspace(*handle, workspace));

        self.update_visibility();
        self.arrange(monitor);
        let showing: Vec<usize> = self
            .monitors
            .iter()
            .filter(|m| m.index != monitor && m.active_workspace == workspace)
            .map(|m| m.index)
            .collect();
        for other in showing {
            self.arrange(other);
        }

        if self.focused == Some(*handle) {
            let under_pointer = self
                .last_pointer
                .and_then(|(window, _, _)| window)
                .filter(|h| h != handle && self.client(h).is_some_and(Client::visible));
            match under_pointer {
                Some(next) => {
                    self.focus_window(&next);
                }
                None => self.focus_monitor(monitor),
            }
        }
        self.restack();
        self.suppress_enter = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_shows_only_the_target_workspace() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.move_client_to_workspace(&WindowHandle(2), 1);

        assert!(manager.state.switch_workspace(0, 1));
        assert_eq!(manager.state.monitors[0].active_workspace, 1);
        assert!(!manager.state.clients[0].visible());
        assert!(manager.state.clients[1].visible());
        assert_eq!(manager.state.focused, Some(WindowHandle(2)));
    }

    #[test]
    fn switching_to_the_shown_or_an_unknown_workspace_is_a_no_op() {
        let mut manager = Manager::new_test();
        manager.state.actions.clear();
        assert!(!manager.state.switch_workspace(0, 0));
        assert!(!manager.state.switch_workspace(0, 42));
        assert!(!manager.state.switch_workspace(7, 1));
        assert!(manager.state.actions.is_empty());
    }

    #[test]
    fn switching_to_an_empty_workspace_clears_focus() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.switch_workspace(0, 3);
        assert_eq!(manager.state.focused, None);
        assert!(manager.state.suppress_enter);
    }

    #[test]
    fn moved_clients_go_to_the_tail_and_hide() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(3);
        manager.state.focus_window(&WindowHandle(1));
        assert!(manager.state.move_client_to_workspace(&WindowHandle(1), 2));

        let order: Vec<_> = manager.state.clients.iter().map(|c| c.handle).collect();
        assert_eq!(order, vec![WindowHandle(2), WindowHandle(3), WindowHandle(1)]);
        assert!(!manager.state.clients[2].visible());
        assert_eq!(manager.state.focused, Some(WindowHandle(2)));
        // The two remaining clients share the monitor.
        assert_eq!(manager.state.clients[0].geometry.x, 0);
        assert!(manager.state.clients[1].geometry.x > 0);
    }

    #[test]
    fn focus_follows_the_pointer_after_a_move() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(3);
        manager.state.last_pointer = Some((Some(WindowHandle(3)), 700, 500));
        manager.state.focus_window(&WindowHandle(1));
        manager.state.move_client_to_workspace(&WindowHandle(1), 2);
        assert_eq!(manager.state.focused, Some(WindowHandle(3)));
    }
}
