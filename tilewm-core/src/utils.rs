//! Shared plumbing: child processes, the two sockets, and key/button masks.
pub mod child_process;
pub mod command_socket;
pub mod helpers;
pub mod modmask_lookup;
pub mod state_socket;
