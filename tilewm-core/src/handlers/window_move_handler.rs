use super::WindowHandle;
use crate::display_action::DisplayAction;
use crate::models::{Handle, Xyhw};
use crate::state::State;

impl<H: Handle> State<H> {
    /// Follow the pointer with the dragged client. `x`/`y` is where the pointer is now.
    pub fn window_move_handler(
        &mut self,
        handle: &WindowHandle<H>,
        (offset_x, offset_y): (i32, i32),
        x: i32,
        y: i32,
    ) -> bool {
        let target_monitor = self.monitor_at(x, y);
        let Some(client) = self.client_mut(handle) else {
            return false;
        };
        client.geometry.x += offset_x;
        client.geometry.y += offset_y;

        let previous = client.monitor;
        match target_monitor {
            Some(monitor) if monitor != previous => {
                self.move_to_monitor(handle, monitor);
                self.arrange(previous);
                self.arrange(monitor);
            }
            _ => {}
        }
        true
    }

    /// Hand a client over to another monitor, onto the workspace that monitor shows.
    pub(crate) fn move_to_monitor(&mut self, handle: &WindowHandle<H>, monitor: usize) {
        let Some(workspace) = self.active_workspace_of(monitor) else {
            return;
        };
        let Some(client) = self.client_mut(handle) else {
            return;
        };
        client.monitor = monitor;
        client.workspace = workspace;
        self.active_monitor = monitor;
        self.actions
            .push_back(DisplayAction::SetWindowWorkspace(*handle, workspace));
    }

    /// A client picked up from the tiling was dropped. Swap it with the tile under the
    /// pointer, or the tile whose center is nearest. With no tile around it stays floating.
    pub(crate) fn drop_on_tile(&mut self, handle: &WindowHandle<H>, x: i32, y: i32) -> bool {
        let Some(dragged) = self.client_index(handle) else {
            return false;
        };
        let (monitor, workspace) = (self.clients[dragged].monitor, self.clients[dragged].workspace);
        let candidates: Vec<(usize, Xyhw)> = self
            .clients
            .iter()
            .enumerate()
            .filter(|(i, c)| *i != dragged && c.is_on(monitor, workspace) && c.is_tiled())
            .map(|(i, c)| (i, c.outer()))
            .collect();
        let target = candidates
            .iter()
            .find(|(_, rect)| rect.contains_point(x, y))
            .or_else(|| {
                // min_by_key keeps the first of equal elements.
                candidates
                    .iter()
                    .min_by_key(|(_, rect)| rect.center_distance_sq(x, y))
            })
            .map(|(i, _)| *i);
        let Some(target) = target else {
            return false;
        };

        self.clients.swap(dragged, target);
        self.clients[target].set_floating(false);
        self.arrange(monitor);
        self.suppress_enter = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Manager;
    use crate::models::Screen;
    use crate::utils::modmask_lookup::{Button, ModMask};

    fn pick_up(state: &mut State<i32>, handle: i32, x: i32, y: i32) {
        state.mouse_combo_handler(ModMask::Super, Button::Button1, WindowHandle(handle), x, y);
    }

    #[test]
    fn moving_follows_the_pointer_delta() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.toggle_floating(&WindowHandle(1));
        let start = manager.state.clients[0].geometry;
        pick_up(&mut manager.state, 1, 50, 50);
        manager.state.motion_handler(60, 45);
        manager.state.motion_handler(70, 40);
        let now = manager.state.clients[0].geometry;
        assert_eq!((now.x, now.y), (start.x + 20, start.y - 10));
    }

    #[test]
    fn dropping_on_a_tile_swaps_positions() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(3);
        // Master is client 1 on the left, 2 and 3 share the right column.
        pick_up(&mut manager.state, 1, 100, 300);
        manager.state.motion_handler(600, 500);
        manager.state.button_release_handler(600, 500);

        let order: Vec<_> = manager.state.clients.iter().map(|c| c.handle).collect();
        assert_eq!(order, vec![WindowHandle(3), WindowHandle(2), WindowHandle(1)]);
        assert!(manager.state.clients.iter().all(|c| c.is_tiled()));
        assert!(manager.state.suppress_enter);
        assert!(manager.state.mode.is_normal());
    }

    #[test]
    fn dropping_nowhere_near_a_tile_picks_the_nearest_center() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(2);
        pick_up(&mut manager.state, 2, 600, 300);
        // Client 1 alone tiles the whole monitor, drop outside of it.
        manager.state.motion_handler(900, 300);
        manager.state.button_release_handler(900, 300);
        let order: Vec<_> = manager.state.clients.iter().map(|c| c.handle).collect();
        assert_eq!(order, vec![WindowHandle(2), WindowHandle(1)]);
    }

    #[test]
    fn a_lone_client_stays_floating_where_dropped() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        pick_up(&mut manager.state, 1, 400, 300);
        manager.state.motion_handler(420, 300);
        manager.state.button_release_handler(420, 300);
        assert!(manager.state.clients[0].floating());
    }

    #[test]
    fn moving_across_monitors_changes_the_monitor() {
        let mut manager = Manager::new_test();
        manager.state.screens_changed_handler(vec![
            Screen::new(Xyhw::new(0, 0, 800, 600), "left".to_string()),
            Screen::new(Xyhw::new(800, 0, 800, 600), "right".to_string()),
        ]);
        manager.add_test_clients(1);
        manager.state.toggle_floating(&WindowHandle(1));
        pick_up(&mut manager.state, 1, 400, 300);
        manager.state.motion_handler(1200, 300);
        let client = &manager.state.clients[0];
        assert_eq!(client.monitor, 1);
        assert_eq!(client.workspace, manager.state.monitors[1].active_workspace);
        assert_eq!(manager.state.active_monitor, 1);
    }
}
