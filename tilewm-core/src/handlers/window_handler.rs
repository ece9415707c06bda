use super::{Client, Config, Manager, WindowChange, WindowHandle};
use crate::config::MAX_CLIENTS;
use crate::display_action::DisplayAction;
use crate::display_servers::DisplayServer;
use crate::models::{Handle, Mode, WindowState, Xyhw};
use crate::state::State;

/// Where a transient window lands relative to its parent.
const TRANSIENT_OFFSET: i32 = 50;

impl<H: Handle, C: Config, SERVER: DisplayServer<H>> Manager<H, C, SERVER> {
    /// Start managing a window the display server found. `x`/`y` is the pointer position.
    /// Returns true if changes need to be rendered.
    pub fn window_created_handler(&mut self, mut client: Client<H>, x: i32, y: i32) -> bool {
        //don't add the window if the manager already knows about it
        if self.state.client(&client.handle).is_some() {
            return false;
        }
        if self.state.clients.len() >= MAX_CLIENTS {
            tracing::warn!(
                "Refusing to manage {:?}: already managing {MAX_CLIENTS} windows",
                client.handle
            );
            return false;
        }
        if self.state.monitors.is_empty() {
            tracing::warn!("Refusing to manage {:?}: no monitor", client.handle);
            return false;
        }

        let parent = client
            .transient
            .and_then(|h| self.state.client(&h))
            .map(|p| (p.monitor, p.workspace, p.geometry));
        let mut floating = parent.is_some()
            || client.hints.is_fixed()
            || client.r#type.prefers_floating();

        match parent {
            Some((monitor, workspace, _)) => {
                client.monitor = monitor;
                client.workspace = workspace;
            }
            None => {
                client.monitor = self
                    .state
                    .monitor_at(x, y)
                    .or_else(|| self.state.focused_client().map(|c| c.monitor))
                    .unwrap_or(0);
                client.workspace = self.state.monitors[client.monitor].active_workspace;
            }
        }

        let mut explicit_size = None;
        if let Some(rule) = self.config.window_rule(&client) {
            tracing::debug!("Window rule {rule:?} applies to {:?}", client.handle);
            if let Some(monitor) = rule.monitor.filter(|m| *m < self.state.monitors.len()) {
                client.monitor = monitor;
                client.workspace = self.state.monitors[monitor].active_workspace;
            }
            if let Some(workspace) = rule.workspace.filter(|w| *w < self.state.workspaces.len()) {
                client.workspace = workspace;
            }
            floating = rule.floating.unwrap_or(floating);
            explicit_size = rule.size;
        }

        client.border = self.state.layout.border_width;
        place_client(&self.state, &mut client, parent.map(|p| p.2), explicit_size);
        client.set_floating(floating);

        let handle = client.handle;
        let monitor = client.monitor;
        let workspace = client.workspace;
        let wants_fullscreen = client.states.contains(&WindowState::Fullscreen);
        tracing::debug!("Managing {:?} on monitor {monitor}, workspace {workspace}", handle);

        //let the DS know we are managing this window
        let act = DisplayAction::AddedWindow(handle, floating);
        self.state.actions.push_back(act);
        let act = DisplayAction::SetWindowWorkspace(handle, workspace);
        self.state.actions.push_back(act);
        self.state.clients.push(client);

        if wants_fullscreen {
            self.state.set_fullscreen(&handle, true);
        } else {
            self.state.arrange(monitor);
            self.state.update_visibility();
            self.state.restack();
        }

        if self.state.active_workspace_of(monitor) == Some(workspace) {
            self.state.focus_window(&handle);
        }

        true
    }

    /// Forget a window that no longer exists.
    /// Returns true if changes need to be rendered.
    pub fn window_destroyed_handler(&mut self, handle: &WindowHandle<H>) -> bool {
        let Some(index) = self.state.client_index(handle) else {
            return false;
        };
        let successor = self.state.successor_of(index);
        let removed = self.state.clients.remove(index);
        tracing::debug!("Unmanaging {handle:?}");

        if self.state.mode.dragged() == Some(*handle) {
            self.state.mode = Mode::Normal;
            self.state.actions.push_back(DisplayAction::NormalMode);
        }
        self.state
            .actions
            .push_back(DisplayAction::DestroyedWindow(*handle));

        //make sure focus is recalculated if we closed the currently focused window
        if self.state.focused == Some(*handle) {
            match successor {
                Some(next) => {
                    self.state.focused = None;
                    self.state.focus_window(&next);
                }
                None => self.state.unfocus(),
            }
        }

        self.state.arrange(removed.monitor);
        self.state.update_visibility();
        true
    }

    pub fn window_changed_handler(&mut self, change: WindowChange<H>) -> bool {
        let parent_managed = change
            .transient
            .flatten()
            .is_some_and(|p| self.state.client(&p).is_some());
        let Some(index) = self.state.client_index(&change.handle) else {
            return false;
        };
        let client = &mut self.state.clients[index];
        tracing::trace!("Window changed {:?} {:?}", client.handle, change);

        let was_floating = client.floating();
        let mut changed = change.update(client);

        if change.r#type.is_some_and(|t| t.prefers_floating()) || parent_managed {
            client.set_floating(true);
        }
        if change.hints.is_some() && client.hints.is_fixed() {
            client.set_floating(true);
        }

        let mut wants_fullscreen = false;
        if let Some(states) = &change.states {
            let fullscreen = client.is_fullscreen();
            wants_fullscreen = !fullscreen && states.contains(&WindowState::Fullscreen);
            client.states = states
                .iter()
                .copied()
                .filter(|s| *s != WindowState::Fullscreen)
                .collect();
            if fullscreen {
                client.states.push(WindowState::Fullscreen);
            }
        }

        if let Some(requested) = change.requested {
            if client.floating() && !client.is_fullscreen() {
                let (w, h) = client.hints.apply(requested.w, requested.h);
                client.geometry = Xyhw::new(requested.x, requested.y, w, h);
                changed = true;
            } else {
                // Tiled and fullscreen clients keep the geometry they have, tell them so.
                let act = DisplayAction::ConfigureWindow(client.clone());
                self.state.actions.push_back(act);
            }
        }

        let handle = client.handle;
        let monitor = client.monitor;
        let floating_changed = was_floating != client.floating();
        if change.requested.is_some() {
            self.state.keep_on_monitor(&handle);
        }
        if wants_fullscreen {
            return self.state.set_fullscreen(&handle, true) || changed;
        }
        if floating_changed {
            self.state.arrange(monitor);
            self.state.restack();
        }
        changed || floating_changed
    }
}

impl<H: Handle> State<H> {
    /// The client that takes over focus when the one at `index` goes away: the first one on
    /// the same monitor and workspace after it in registry order, wrapping around.
    pub(crate) fn successor_of(&self, index: usize) -> Option<WindowHandle<H>> {
        let removed = self.clients.get(index)?;
        let (head, tail) = self.clients.split_at(index);
        tail[1..]
            .iter()
            .chain(head)
            .find(|c| c.is_on(removed.monitor, removed.workspace))
            .map(|c| c.handle)
    }

    /// Recenter a floating client on its monitor when its middle left every monitor.
    pub(crate) fn keep_on_monitor(&mut self, handle: &WindowHandle<H>) {
        let Some(index) = self.client_index(handle) else {
            return;
        };
        let (cx, cy) = self.clients[index].outer().center();
        if self.monitor_at(cx, cy).is_some() {
            return;
        }
        let Some(bbox) = self.monitors.get(self.clients[index].monitor).map(|m| m.bbox) else {
            return;
        };
        let client = &mut self.clients[index];
        let border = client.border;
        client.geometry.clamp_size_within(&bbox, border);
        client.geometry.center_relative(&bbox, border);
    }
}

/// Initial geometry of a new client: next to its parent for transients, otherwise its own
/// size clamped to the monitor and centered on it, below the reserved strip.
fn place_client<H: Handle>(
    state: &State<H>,
    client: &mut Client<H>,
    parent: Option<Xyhw>,
    explicit_size: Option<(i32, i32)>,
) {
    if let Some((w, h)) = explicit_size {
        client.geometry.w = w;
        client.geometry.h = h;
    }
    let (w, h) = client.hints.apply(client.geometry.w, client.geometry.h);
    client.geometry.w = w.max(1);
    client.geometry.h = h.max(1);

    if let Some(parent) = parent {
        client.geometry.x = parent.x + TRANSIENT_OFFSET;
        client.geometry.y = parent.y + TRANSIENT_OFFSET;
        return;
    }

    let bbox = state.monitors[client.monitor].bbox;
    let border = client.border;
    client.geometry.clamp_size_within(&bbox, border);
    client.geometry.center_relative(&bbox, border);
    let top = bbox.y + state.layout.bar_height;
    if client.geometry.y < top {
        client.geometry.y = top;
        client.geometry.h = client.geometry.h.min(bbox.y + bbox.h - top - 2 * border).max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleOutcome;
    use crate::config::tests::TestConfig;
    use crate::models::{SizeHints, WindowType};

    fn floating_client(handle: i32, geometry: Xyhw) -> Client<i32> {
        let mut client = Client::new(WindowHandle(handle), None);
        client.geometry = geometry;
        client.r#type = WindowType::Dialog;
        client
    }

    #[test]
    fn managing_twice_is_a_no_op() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        let client = Client::new(WindowHandle(1), None);
        assert!(!manager.window_created_handler(client, 0, 0));
        assert_eq!(manager.state.clients.len(), 1);
    }

    #[test]
    fn unmanaging_an_unknown_window_is_a_no_op() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        assert!(!manager.window_destroyed_handler(&WindowHandle(42)));
        assert_eq!(manager.state.clients.len(), 1);
    }

    #[test]
    fn new_clients_are_appended_and_focused() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(3);
        let handles: Vec<_> = manager.state.clients.iter().map(|c| c.handle).collect();
        assert_eq!(handles, vec![WindowHandle(1), WindowHandle(2), WindowHandle(3)]);
        assert_eq!(manager.state.focused, Some(WindowHandle(3)));
    }

    #[test]
    fn transients_float_next_to_their_parent() {
        let mut manager = Manager::new_test();
        let parent = floating_client(1, Xyhw::new(100, 100, 400, 300));
        manager.window_created_handler(parent, 0, 0);
        // Dialogs are centered, put the parent back where the test wants it.
        manager.state.clients[0].geometry = Xyhw::new(100, 100, 400, 300);

        let mut child = Client::new(WindowHandle(2), None);
        child.transient = Some(WindowHandle(1));
        child.geometry = Xyhw::new(0, 0, 200, 100);
        manager.window_created_handler(child, 700, 500);

        let child = manager.state.client(&WindowHandle(2)).unwrap();
        assert!(child.floating());
        assert_eq!(child.geometry, Xyhw::new(150, 150, 200, 100));
    }

    #[test]
    fn fixed_size_windows_float() {
        let mut manager = Manager::new_test();
        let mut client = Client::new(WindowHandle(1), None);
        client.hints = SizeHints {
            minw: 200,
            minh: 100,
            maxw: 200,
            maxh: 100,
            valid: true,
            ..SizeHints::default()
        };
        manager.window_created_handler(client, 0, 0);
        let client = &manager.state.clients[0];
        assert!(client.floating());
        assert_eq!((client.geometry.w, client.geometry.h), (200, 100));
    }

    #[test]
    fn oversized_floating_windows_are_clamped_and_centered() {
        let mut manager = Manager::new_test();
        manager.window_created_handler(floating_client(1, Xyhw::new(0, 0, 2000, 100)), 0, 0);
        assert_eq!(manager.state.clients[0].geometry, Xyhw::new(0, 249, 798, 100));
    }

    #[test]
    fn tall_windows_below_the_bar_stay_on_the_monitor() {
        let config = TestConfig {
            layout: crate::layouts::LayoutSettings {
                bar_height: 30,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut manager = Manager::new_test_with(config);
        manager.window_created_handler(floating_client(1, Xyhw::new(0, 0, 300, 900)), -1, -1);
        let geometry = manager.state.clients[0].geometry;
        assert_eq!(geometry.y, 30);
        assert_eq!(geometry.h, 600 - 30 - 2);
        assert!(geometry.y + geometry.h + 2 <= 600);
    }

    #[test]
    fn rules_pick_the_workspace_and_floating() {
        let config = TestConfig {
            rules: vec![(
                "Gimp".to_string(),
                RuleOutcome {
                    floating: Some(true),
                    workspace: Some(4),
                    size: Some((300, 200)),
                    ..RuleOutcome::default()
                },
            )],
            ..TestConfig::default()
        };
        let mut manager = Manager::new_test_with(config);
        let mut client = Client::new(WindowHandle(1), None);
        client.res_class = Some("Gimp".to_string());
        manager.window_created_handler(client, 0, 0);

        let client = &manager.state.clients[0];
        assert!(client.floating());
        assert_eq!(client.workspace, 4);
        assert_eq!((client.geometry.w, client.geometry.h), (300, 200));
        // Not on the shown workspace, so it did not take focus.
        assert_eq!(manager.state.focused, None);
        manager.state.update_visibility();
        assert!(!manager.state.clients[0].visible());
    }

    #[test]
    fn focus_moves_to_the_next_client_on_the_workspace() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(4);
        manager.state.clients[2].workspace = 1;
        manager.state.focus_window(&WindowHandle(2));
        manager.window_destroyed_handler(&WindowHandle(2));
        // Client 3 is elsewhere, client 4 is next on the same workspace.
        assert_eq!(manager.state.focused, Some(WindowHandle(4)));
    }

    #[test]
    fn focus_search_wraps_around() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(3);
        manager.state.focus_window(&WindowHandle(3));
        manager.window_destroyed_handler(&WindowHandle(3));
        assert_eq!(manager.state.focused, Some(WindowHandle(1)));
    }

    #[test]
    fn removing_the_last_focused_client_clears_focus() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.actions.clear();
        manager.window_destroyed_handler(&WindowHandle(1));
        assert_eq!(manager.state.focused, None);
        assert!(
            manager
                .state
                .actions
                .iter()
                .any(|a| matches!(a, DisplayAction::Unfocus(Some(WindowHandle(1)))))
        );
    }

    #[test]
    fn tiled_configure_requests_are_answered_with_the_current_geometry() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        let before = manager.state.clients[0].geometry;
        manager.state.actions.clear();
        let mut change = WindowChange::new(WindowHandle(1));
        change.requested = Some(Xyhw::new(1, 2, 3, 4));
        manager.window_changed_handler(change);
        assert_eq!(manager.state.clients[0].geometry, before);
        assert!(matches!(
            manager.state.actions.front(),
            Some(DisplayAction::ConfigureWindow(_))
        ));
    }

    #[test]
    fn floating_configure_requests_are_honored() {
        let mut manager = Manager::new_test();
        manager.window_created_handler(floating_client(1, Xyhw::new(0, 0, 100, 100)), 0, 0);
        let mut change = WindowChange::new(WindowHandle(1));
        change.requested = Some(Xyhw::new(10, 20, 300, 200));
        assert!(manager.window_changed_handler(change));
        assert_eq!(manager.state.clients[0].geometry, Xyhw::new(10, 20, 300, 200));
    }

    #[test]
    fn fullscreen_state_property_enters_fullscreen() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        let mut change = WindowChange::new(WindowHandle(1));
        change.states = Some(vec![WindowState::Fullscreen]);
        manager.window_changed_handler(change);
        let client = manager.state.client(&WindowHandle(1)).unwrap();
        assert!(client.is_fullscreen());
        assert_eq!(client.geometry, Xyhw::new(0, 0, 800, 600));

        // Dropping the property on its own does not leave fullscreen.
        let mut change = WindowChange::new(WindowHandle(1));
        change.states = Some(vec![]);
        manager.window_changed_handler(change);
        assert!(manager.state.client(&WindowHandle(1)).unwrap().is_fullscreen());
    }
}
