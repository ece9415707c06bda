//! The window management engine of tilewm: clients, monitors, tiling, focus, and the event
//! loop that ties them to a display server.
// We warn on clippy pedantic lints, primarily to keep code as correct as possible.
#![warn(clippy::pedantic)]
// Each of these lints are globally allowed because they otherwise make a lot
// of noise.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::must_use_candidate,
    clippy::default_trait_access
)]
mod command;
pub mod config;
mod display_action;
mod display_event;
pub mod display_servers;
pub mod errors;
mod event_loop;
mod handlers;
pub mod layouts;
pub mod models;
pub mod state;
pub mod utils;

pub use command::Command;
pub use config::{Config, Diagnostic, Keybind, RuleOutcome, Severity};
pub use display_action::DisplayAction;
pub use display_event::DisplayEvent;
pub use display_servers::DisplayServer;
pub use models::{Manager, Mode};
pub use state::State;
pub use utils::command_socket::{CommandSocket, Reply, Request};
pub use utils::modmask_lookup::{Button, ModMask};
pub use utils::state_socket::StateSocket;
