use crate::config::Config;
use crate::display_servers::DisplayServer;
use crate::errors::Result;
use crate::models::Handle;
use crate::state::State;
use crate::utils::child_process::Children;
use std::sync::{Arc, atomic::AtomicBool};

/// Maintains current program state.
#[derive(Debug)]
pub struct Manager<H: Handle, C, SERVER> {
    pub state: State<H>,
    pub config: C,

    pub(crate) children: Children,
    pub(crate) reap_requested: Arc<AtomicBool>,
    pub(crate) quit_requested: bool,
    pub display_server: SERVER,
}

impl<H, C, SERVER> Manager<H, C, SERVER>
where
    H: Handle,
    C: Config,
    SERVER: DisplayServer<H>,
{
    /// Connect to the display server and build an empty state from `config`.
    ///
    /// # Errors
    ///
    /// Fails when the display server cannot take over the display.
    pub fn new(config: C) -> Result<Self> {
        let display_server = SERVER::new(&config)?;

        Ok(Self {
            state: State::new(&config),
            config,
            children: Children::default(),
            reap_requested: Arc::default(),
            quit_requested: false,
            display_server,
        })
    }

    pub fn register_child_hook(&self) {
        crate::utils::child_process::register_child_hook(self.reap_requested.clone());
    }
}

#[cfg(test)]
pub(crate) type TestManager = Manager<
    crate::models::MockHandle,
    crate::config::tests::TestConfig,
    crate::display_servers::MockDisplayServer<crate::models::MockHandle>,
>;

#[cfg(test)]
impl TestManager {
    /// A manager with the default test config and one 800x600 monitor.
    pub fn new_test() -> Self {
        Self::new_test_with(crate::config::tests::TestConfig::default())
    }

    pub fn new_test_with(config: crate::config::tests::TestConfig) -> Self {
        let mut manager = Self::new(config).expect("the mock display server never fails");
        let screens = vec![crate::models::Screen::default()];
        manager.state.screens_changed_handler(screens);
        manager
    }

    /// Manage `count` plain clients with handles `1..=count`.
    pub fn add_test_clients(&mut self, count: i32) {
        for handle in 1..=count {
            let client = crate::models::Client::new(crate::models::WindowHandle(handle), None);
            self.window_created_handler(client, -1, -1);
        }
    }
}
