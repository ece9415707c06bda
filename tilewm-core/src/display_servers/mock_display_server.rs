use super::{Config, DisplayEvent, DisplayServer};
use crate::display_action::DisplayAction;
use crate::errors::Result;
use crate::models::{Client, Handle, Screen, WindowHandle};
use std::cell::RefCell;

/// A display server that remembers what it was asked to do.
pub struct MockDisplayServer<H: Handle> {
    pub screens: Vec<Screen>,
    pub executed: Vec<DisplayAction<H>>,
    pub updated: RefCell<Vec<WindowHandle<H>>>,
    pub pointer: (Option<WindowHandle<H>>, i32, i32),
}

impl<H: Handle> DisplayServer<H> for MockDisplayServer<H> {
    fn new(_: &impl Config) -> Result<Self> {
        Ok(Self {
            screens: vec![Screen::default()],
            executed: vec![],
            updated: RefCell::new(vec![]),
            pointer: (None, 0, 0),
        })
    }

    fn get_next_events(&mut self) -> Vec<DisplayEvent<H>> {
        vec![DisplayEvent::ScreensChanged(std::mem::take(&mut self.screens))]
    }

    fn update_windows(&self, clients: &[&Client<H>], _focused: Option<WindowHandle<H>>) {
        self.updated
            .borrow_mut()
            .extend(clients.iter().map(|c| c.handle));
    }

    fn execute_action(&mut self, act: DisplayAction<H>) -> Option<DisplayEvent<H>> {
        self.executed.push(act);
        None
    }

    fn wait_readable(&self) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()>>> {
        Box::pin(std::future::pending())
    }

    fn flush(&self) {}

    fn generate_pointer_sample(&self) -> Option<DisplayEvent<H>> {
        let (window, x, y) = self.pointer;
        Some(DisplayEvent::PointerSample(window, x, y))
    }
}
