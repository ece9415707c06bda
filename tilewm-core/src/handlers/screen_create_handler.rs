use super::{Monitor, Screen};
use crate::config::MAX_MONITORS;
use crate::models::Handle;
use crate::state::State;

impl<H: Handle> State<H> {
    /// Rebuild the monitors from the full set of outputs, then move clients stranded off
    /// every monitor back onto the first one. Fullscreen clients are refitted to their
    /// monitor.
    ///
    /// Returns `true` if changes need to be rendered.
    pub fn screens_changed_handler(&mut self, mut screens: Vec<Screen>) -> bool {
        if screens.is_empty() {
            tracing::warn!("Ignoring an output change without any output");
            return false;
        }
        if screens.len() > MAX_MONITORS {
            tracing::warn!(
                "Ignoring {} outputs past the limit of {MAX_MONITORS}",
                screens.len() - MAX_MONITORS
            );
            screens.truncate(MAX_MONITORS);
        }

        let count = self.workspaces.len();
        let previous = std::mem::take(&mut self.monitors);
        self.monitors = screens
            .iter()
            .enumerate()
            .map(|(index, screen)| {
                let mut monitor = Monitor::new(index, screen, count, &self.layout);
                if let Some(old) = previous.get(index) {
                    monitor.inherit(old);
                }
                monitor
            })
            .collect();
        tracing::info!("Now running on {} monitor(s)", self.monitors.len());

        let fallback = self.monitors[0].bbox;
        for client in &mut self.clients {
            let (cx, cy) = client.outer().center();
            let stranded = client.monitor >= self.monitors.len()
                || !self.monitors.iter().any(|m| m.contains_point(cx, cy));
            if !stranded {
                continue;
            }
            client.monitor = 0;
            let border = client.border;
            client.geometry.clamp_size_within(&fallback, border);
            client.geometry.center_relative(&fallback, border);
        }
        let border = self.layout.border_width;
        for client in self.clients.iter_mut().filter(|c| c.is_fullscreen()) {
            let bbox = self.monitors[client.monitor].bbox;
            client.geometry = bbox;
            // Leaving fullscreen has to land on the new area too.
            if let Some(saved) = client.saved.as_mut() {
                let (cx, cy) = saved.geometry.center();
                saved.geometry.clamp_size_within(&bbox, border);
                if !bbox.contains_point(cx, cy) {
                    saved.geometry.center_relative(&bbox, border);
                }
            }
        }
        if self.active_monitor >= self.monitors.len() {
            self.active_monitor = 0;
        }

        self.arrange_all();
        self.update_visibility();
        self.restack();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Manager;
    use crate::models::{WindowHandle, Xyhw};

    fn two_screens() -> Vec<Screen> {
        vec![
            Screen::new(Xyhw::new(0, 0, 1920, 1080), "left".to_string()),
            Screen::new(Xyhw::new(1920, 0, 1280, 1024), "right".to_string()),
        ]
    }

    #[test]
    fn monitors_follow_the_outputs() {
        let mut manager = Manager::new_test();
        manager.state.screens_changed_handler(two_screens());
        let state = &manager.state;
        assert_eq!(state.monitors.len(), 2);
        assert_eq!(state.monitors[1].bbox, Xyhw::new(1920, 0, 1280, 1024));
        assert_eq!(state.monitors[1].index, 1);
        assert_eq!(state.monitors[1].workspace_count(), state.workspaces.len());
    }

    #[test]
    fn an_empty_output_list_is_ignored() {
        let mut manager = Manager::new_test();
        assert!(!manager.state.screens_changed_handler(vec![]));
        assert_eq!(manager.state.monitors.len(), 1);
    }

    #[test]
    fn monitors_keep_their_tuning_across_changes() {
        let mut manager = Manager::new_test();
        manager.state.screens_changed_handler(two_screens());
        manager.state.monitors[1].master_count = 3;
        manager.state.switch_workspace(1, 4);
        manager.state.screens_changed_handler(two_screens());
        assert_eq!(manager.state.monitors[1].master_count, 3);
        assert_eq!(manager.state.monitors[1].active_workspace, 4);
    }

    #[test]
    fn fullscreen_clients_cover_their_resized_monitor() {
        let mut manager = Manager::new_test();
        manager.add_test_clients(1);
        manager.state.set_fullscreen(&WindowHandle(1), true);
        assert_eq!(manager.state.clients[0].geometry, Xyhw::new(0, 0, 800, 600));

        let wide = Screen::new(Xyhw::new(0, 0, 1920, 1080), "wide".to_string());
        manager.state.screens_changed_handler(vec![wide]);
        assert_eq!(manager.state.clients[0].geometry, Xyhw::new(0, 0, 1920, 1080));

        let small = Screen::new(Xyhw::new(0, 0, 640, 480), "small".to_string());
        manager.state.screens_changed_handler(vec![small]);
        assert_eq!(manager.state.clients[0].geometry, Xyhw::new(0, 0, 640, 480));
        manager.state.set_fullscreen(&WindowHandle(1), false);
        let restored = manager.state.clients[0].geometry;
        assert!(restored.x >= 0 && restored.y >= 0);
        assert!(restored.x + restored.w <= 640 && restored.y + restored.h <= 480);
    }

    #[test]
    fn clients_of_a_lost_monitor_move_to_the_first() {
        let mut manager = Manager::new_test();
        manager.state.screens_changed_handler(two_screens());
        let mut client = crate::models::Client::new(WindowHandle(1), None);
        client.geometry = Xyhw::new(0, 0, 300, 200);
        client.r#type = crate::models::WindowType::Dialog;
        manager.window_created_handler(client, 2000, 100);
        assert_eq!(manager.state.clients[0].monitor, 1);

        let left = two_screens().remove(0);
        manager.state.screens_changed_handler(vec![left]);
        let client = &manager.state.clients[0];
        assert_eq!(client.monitor, 0);
        assert_eq!(client.geometry, Xyhw::new(809, 439, 300, 200));
    }
}
