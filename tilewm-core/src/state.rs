//! The window registry, the monitors, and the bookkeeping that keeps them consistent.
use crate::config::{Config, Keybind, MAX_KEYBINDS};
use crate::display_action::DisplayAction;
use crate::layouts::{master_stack, LayoutMode, LayoutSettings};
use crate::models::{Client, Handle, Mode, Monitor, WindowHandle, WorkspaceId};
use crate::utils::modmask_lookup::ModMask;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct State<H: Handle> {
    /// Every managed client, in registry order. New clients are appended.
    pub clients: Vec<Client<H>>,
    pub monitors: Vec<Monitor>,
    pub focused: Option<WindowHandle<H>>,
    pub active_monitor: usize,
    pub mode: Mode<H>,
    /// Workspace names. Every monitor offers all of them.
    pub workspaces: Vec<String>,
    pub layout: LayoutSettings,
    pub keybinds: Vec<Keybind>,
    pub mousekey: ModMask,
    pub focus_follows_mouse: bool,
    pub actions: VecDeque<DisplayAction<H>>,
    /// Swallow the next enter notification. Set whenever the layout moved windows under a
    /// pointer that did not move.
    pub(crate) suppress_enter: bool,
    pub(crate) last_pointer: Option<(Option<WindowHandle<H>>, i32, i32)>,
}

impl<H: Handle> State<H> {
    pub(crate) fn new(config: &impl Config) -> Self {
        let mut state = Self {
            clients: vec![],
            monitors: vec![],
            focused: None,
            active_monitor: 0,
            mode: Mode::Normal,
            workspaces: vec![],
            layout: LayoutSettings::default(),
            keybinds: vec![],
            mousekey: ModMask::empty(),
            focus_follows_mouse: true,
            actions: VecDeque::new(),
            suppress_enter: false,
            last_pointer: None,
        };
        state.load_config(config);
        state
    }

    /// Replace every configured value. Monitors keep their output and active workspace but
    /// take the new layout defaults.
    pub fn load_config(&mut self, config: &impl Config) {
        self.workspaces = config.workspaces();
        if self.workspaces.is_empty() {
            tracing::warn!("No workspaces configured, falling back to a single one");
            self.workspaces.push("1".to_string());
        }
        self.layout = config.layout_settings();
        self.mousekey = config.mousekey();
        self.focus_follows_mouse = config.focus_follows_mouse();
        self.keybinds = config.mapped_bindings();
        if self.keybinds.len() > MAX_KEYBINDS {
            tracing::warn!(
                "Dropping {} key bindings past the limit of {MAX_KEYBINDS}",
                self.keybinds.len() - MAX_KEYBINDS
            );
            self.keybinds.truncate(MAX_KEYBINDS);
        }

        let count = self.workspaces.len();
        let settings = self.layout;
        for monitor in &mut self.monitors {
            let active = monitor.active_workspace;
            let layout_mode = monitor.layout_mode;
            let screen = crate::models::Screen::new(monitor.bbox, monitor.output.clone());
            *monitor = Monitor::new(monitor.index, &screen, count, &settings);
            monitor.layout_mode = layout_mode;
            if active < count {
                monitor.active_workspace = active;
            }
        }

        for client in &mut self.clients {
            if !client.is_fullscreen() {
                client.border = settings.border_width;
            }
            if client.workspace >= count {
                client.workspace = count - 1;
            }
        }
    }

    #[must_use]
    pub fn client(&self, handle: &WindowHandle<H>) -> Option<&Client<H>> {
        self.clients.iter().find(|c| &c.handle == handle)
    }

    pub fn client_mut(&mut self, handle: &WindowHandle<H>) -> Option<&mut Client<H>> {
        self.clients.iter_mut().find(|c| &c.handle == handle)
    }

    #[must_use]
    pub fn client_index(&self, handle: &WindowHandle<H>) -> Option<usize> {
        self.clients.iter().position(|c| &c.handle == handle)
    }

    #[must_use]
    pub fn focused_client(&self) -> Option<&Client<H>> {
        self.focused.as_ref().and_then(|h| self.client(h))
    }

    /// The monitor whose area holds the point.
    #[must_use]
    pub fn monitor_at(&self, x: i32, y: i32) -> Option<usize> {
        self.monitors.iter().position(|m| m.contains_point(x, y))
    }

    /// The workspace currently shown on a monitor.
    #[must_use]
    pub fn active_workspace_of(&self, monitor: usize) -> Option<WorkspaceId> {
        self.monitors.get(monitor).map(|m| m.active_workspace)
    }

    /// Whether the client's workspace is the one its monitor shows.
    #[must_use]
    pub fn is_on_active_workspace(&self, client: &Client<H>) -> bool {
        self.active_workspace_of(client.monitor) == Some(client.workspace)
    }

    /// The fullscreen client that gets to be seen on a monitor and workspace: the focused
    /// one if it is fullscreen there, otherwise the first in registry order.
    #[must_use]
    pub fn shown_fullscreen(
        &self,
        monitor: usize,
        workspace: WorkspaceId,
    ) -> Option<WindowHandle<H>> {
        let candidate = |c: &&Client<H>| c.is_fullscreen() && c.is_on(monitor, workspace);
        self.focused_client()
            .filter(candidate)
            .or_else(|| self.clients.iter().find(candidate))
            .map(|c| c.handle)
    }

    /// Recompute which clients are mapped. Returns whether any of them changed.
    pub fn update_visibility(&mut self) -> bool {
        let decisions: Vec<bool> = self
            .clients
            .iter()
            .map(|c| {
                if !self.is_on_active_workspace(c) {
                    return false;
                }
                !c.is_fullscreen()
                    || self.shown_fullscreen(c.monitor, c.workspace) == Some(c.handle)
            })
            .collect();
        let mut changed = false;
        for (client, visible) in self.clients.iter_mut().zip(decisions) {
            changed |= client.visible() != visible;
            client.set_visible(visible);
        }
        changed
    }

    /// Tile the clients shown on a monitor.
    pub fn arrange(&mut self, monitor: usize) {
        let Some(mon) = self.monitors.get(monitor) else {
            return;
        };
        if mon.layout_mode == LayoutMode::Floating {
            return;
        }
        let workspace = mon.active_workspace;
        let tiled: Vec<usize> = self
            .clients
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_on(monitor, workspace) && c.is_tiled())
            .map(|(i, _)| i)
            .collect();
        if tiled.len() <= 1 {
            let default = self.layout.split_factor;
            self.monitors[monitor].reset_split_factor(workspace, default);
        }
        let mon = &self.monitors[monitor];
        let rects = master_stack::update(
            mon.usable_area(&self.layout),
            tiled.len(),
            mon.master_count,
            mon.split_factor(),
            self.layout.gap,
        );
        for (index, rect) in tiled.into_iter().zip(rects) {
            let client = &mut self.clients[index];
            client.geometry = rect.shrink(client.border);
        }
    }

    pub fn arrange_all(&mut self) {
        for monitor in 0..self.monitors.len() {
            self.arrange(monitor);
        }
    }

    /// Publish the stacking order, top first: the dragged client, then fullscreen clients,
    /// then floating ones, then the tiled ones.
    pub fn restack(&mut self) {
        let dragged = self.mode.dragged();
        let rank = |c: &Client<H>| {
            if Some(c.handle) == dragged {
                0
            } else if c.is_fullscreen() {
                1
            } else if c.floating() {
                2
            } else {
                3
            }
        };
        let mut order: Vec<(u8, WindowHandle<H>)> =
            self.clients.iter().map(|c| (rank(c), c.handle)).collect();
        // Stable, so registry order is kept within a rank.
        order.sort_by_key(|(rank, _)| *rank);
        let act = DisplayAction::SetWindowOrder(order.into_iter().map(|(_, h)| h).collect());
        self.actions.push_back(act);
    }

    /// Move a client to the end of the registry.
    pub fn move_to_tail(&mut self, handle: &WindowHandle<H>) {
        if let Some(index) = self.client_index(handle) {
            let client = self.clients.remove(index);
            self.clients.push(client);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Screen, Xyhw};
    use crate::Manager;

    #[test]
    fn tiled_clients_fill_the_usable_area() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        let state = &manager.state;
        // Default border of one pixel is drawn outside of the tile geometry.
        assert_eq!(state.clients[0].geometry, Xyhw::new(0, 0, 438, 598));
        assert_eq!(state.clients[1].geometry, Xyhw::new(440, 0, 358, 598));
    }

    #[test]
    fn gaps_and_the_bar_strip_partition_an_odd_sized_monitor() {
        let config = crate::config::tests::TestConfig {
            layout: LayoutSettings {
                gap: 4,
                outer_gap: 6,
                bar_height: 20,
                ..LayoutSettings::default()
            },
            ..Default::default()
        };
        let mut manager = Manager::new_test_with(config);
        let screen = Screen::new(Xyhw::new(0, 0, 1001, 757), "odd".to_string());
        manager.state.screens_changed_handler(vec![screen]);
        manager.add_test_clients(5);

        let outer: Vec<Xyhw> = manager
            .state
            .clients
            .iter()
            .map(|c| Xyhw::new(c.geometry.x, c.geometry.y, c.geometry.w + 2, c.geometry.h + 2))
            .collect();
        // Usable area is (6, 26, 989, 725).
        assert_eq!(outer[0], Xyhw::new(6, 26, 543, 725));
        assert_eq!(
            outer[1..],
            [
                Xyhw::new(553, 26, 442, 179),
                Xyhw::new(553, 209, 442, 178),
                Xyhw::new(553, 391, 442, 178),
                Xyhw::new(553, 573, 442, 178),
            ]
        );
        for (i, a) in outer.iter().enumerate() {
            for b in &outer[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
        let covered: i32 = outer.iter().map(|r| r.w * r.h).sum();
        let gaps = 4 * 725 + 3 * 4 * 442;
        assert_eq!(covered + gaps, 989 * 725);
    }

    #[test]
    fn a_lone_client_resets_the_split_factor() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.monitors[0].adjust_split_factor(0.2);
        manager.window_destroyed_handler(&WindowHandle(2));
        let default = manager.state.layout.split_factor;
        assert!((manager.state.monitors[0].split_factor() - default).abs() < f32::EPSILON);
    }

    #[test]
    fn floating_monitors_are_not_tiled() {
        let mut manager = Manager::new_test();
        manager.state.monitors[0].layout_mode = LayoutMode::Floating;
        let mut client = Client::new(WindowHandle(1), None);
        client.geometry = Xyhw::new(5, 5, 100, 100);
        manager.window_created_handler(client, 0, 0);
        assert_eq!(manager.state.clients[0].geometry.w, 100);
    }

    #[test]
    fn clients_elsewhere_are_hidden() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        manager.state.clients[1].workspace = 3;
        manager.state.update_visibility();
        assert!(manager.state.clients[0].visible());
        assert!(!manager.state.clients[1].visible());
    }

    #[test]
    fn only_one_fullscreen_client_is_shown() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(3);
        let monitor = Screen::default().bbox;
        for client in &mut manager.state.clients[..2] {
            client.enter_fullscreen(monitor);
        }
        manager.state.focused = None;
        manager.state.update_visibility();
        let visible: Vec<bool> = manager.state.clients.iter().map(Client::visible).collect();
        assert_eq!(visible, vec![true, false, true]);

        manager.state.focused = Some(WindowHandle(2));
        manager.state.update_visibility();
        let visible: Vec<bool> = manager.state.clients.iter().map(Client::visible).collect();
        assert_eq!(visible, vec![false, true, true]);
    }

    #[test]
    fn restack_puts_floating_above_tiled() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(3);
        manager.state.clients[2].set_floating(true);
        manager.state.actions.clear();
        manager.state.restack();
        match manager.state.actions.pop_back() {
            Some(DisplayAction::SetWindowOrder(order)) => assert_eq!(
                order,
                vec![WindowHandle(3), WindowHandle(1), WindowHandle(2)]
            ),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn reload_clamps_workspaces_and_borders() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.clients[0].workspace = 8;
        let config = crate::config::tests::TestConfig {
            workspaces: vec!["a".to_string(), "b".to_string()],
            layout: LayoutSettings {
                border_width: 3,
                ..LayoutSettings::default()
            },
            ..Default::default()
        };
        manager.state.load_config(&config);
        assert_eq!(manager.state.clients[0].workspace, 1);
        assert_eq!(manager.state.clients[0].border, 3);
        assert_eq!(manager.state.monitors[0].workspace_count(), 2);
    }
}
