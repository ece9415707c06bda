#![allow(clippy::wildcard_imports)]

use super::*;
use crate::display_action::DisplayAction;
use crate::models::{Handle, StateChange, WindowState};
use crate::state::State;

impl<H: Handle> State<H> {
    /// Enter or leave fullscreen. Returns false if the client already was in that state.
    pub fn set_fullscreen(&mut self, handle: &WindowHandle<H>, enabled: bool) -> bool {
        let Some(index) = self.client_index(handle) else {
            return false;
        };
        let monitor = self.clients[index].monitor;
        let Some(bbox) = self.monitors.get(monitor).map(|m| m.bbox) else {
            return false;
        };
        let border = self.layout.border_width;

        let client = &mut self.clients[index];
        if enabled {
            if !client.enter_fullscreen(bbox) {
                return false;
            }
            self.actions
                .push_back(DisplayAction::SetState(*handle, true, WindowState::Fullscreen));
            self.actions
                .push_back(DisplayAction::SetButtonGrabs(*handle, false));
            self.actions.push_back(DisplayAction::MoveToTop(*handle));
        } else {
            if !client.exit_fullscreen(border) {
                return false;
            }
            self.actions
                .push_back(DisplayAction::SetState(*handle, false, WindowState::Fullscreen));
            self.actions
                .push_back(DisplayAction::SetButtonGrabs(*handle, true));
        }
        tracing::debug!("Fullscreen of {handle:?} is now {enabled}");

        self.arrange(monitor);
        self.update_visibility();
        self.restack();
        true
    }

    /// Answer a fullscreen client message.
    pub fn fullscreen_request_handler(
        &mut self,
        handle: &WindowHandle<H>,
        change: StateChange,
    ) -> bool {
        let Some(current) = self.client(handle).map(Client::is_fullscreen) else {
            return false;
        };
        self.set_fullscreen(handle, change.apply(current))
    }

    /// Flip a client between tiled and floating. Fullscreen clients are left alone.
    pub fn toggle_floating(&mut self, handle: &WindowHandle<H>) -> bool {
        let Some(client) = self.client_mut(handle) else {
            return false;
        };
        if client.is_fullscreen() {
            return false;
        }
        let floating = !client.floating();
        client.set_floating(floating);
        let monitor = client.monitor;
        if floating {
            // Keep the tile geometry, it only becomes a floating window at the same spot.
            self.keep_on_monitor(handle);
        }
        self.arrange(monitor);
        self.restack();
        true
    }
}
