#[cfg(test)]
mod mock_display_server;

use crate::DisplayEvent;
use crate::config::Config;
use crate::display_action::DisplayAction;
use crate::errors::Result;
use crate::models::{Client, Handle, WindowHandle};

use futures::prelude::*;
use std::pin::Pin;

#[cfg(test)]
pub use self::mock_display_server::MockDisplayServer;

pub trait DisplayServer<H: Handle> {
    /// Connect to the display and take over window management.
    ///
    /// # Errors
    ///
    /// Fails if the display cannot be reached or another window manager owns it.
    fn new(config: &impl Config) -> Result<Self>
    where
        Self: Sized;

    fn get_next_events(&mut self) -> Vec<DisplayEvent<H>>;

    fn load_config(
        &mut self,
        _config: &impl Config,
        _focused: Option<WindowHandle<H>>,
        _clients: &[Client<H>],
    ) {
    }

    /// Push geometry, border and visibility of the given clients to the display.
    fn update_windows(&self, _clients: &[&Client<H>], _focused: Option<WindowHandle<H>>) {}

    fn execute_action(&mut self, _act: DisplayAction<H>) -> Option<DisplayEvent<H>> {
        None
    }

    fn wait_readable(&self) -> Pin<Box<dyn Future<Output = ()>>>;

    fn flush(&self);

    /// Sample the pointer for focus-follows-pointer.
    fn generate_pointer_sample(&self) -> Option<DisplayEvent<H>>;
}
