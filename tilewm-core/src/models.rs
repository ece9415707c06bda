//! Objects (such as clients and monitors) the window manager keeps track of.
mod client;
mod manager;
mod mode;
mod monitor;
mod screen;
mod size_hints;
mod window_change;
mod window_state;
mod window_type;
mod xyhw;

pub mod dto;

pub use client::{Client, Handle, MockHandle, SavedGeometry, WindowHandle};
pub use manager::Manager;
#[cfg(test)]
pub(crate) use manager::TestManager;
pub use mode::Mode;
pub use monitor::{Monitor, MAX_SPLIT_FACTOR, MIN_SPLIT_FACTOR};
pub use screen::Screen;
pub use size_hints::SizeHints;
pub use window_change::WindowChange;
pub use window_state::{StateChange, WindowState};
pub use window_type::WindowType;
pub use xyhw::{Corner, Xyhw};

pub type WorkspaceId = usize;
