//! Core window manager state: clients, monitors and the registry tying the
//! two together.
pub mod bindings;
pub mod client;
pub mod monitor;
pub mod state;

pub use client::Client;
pub use monitor::Monitor;
pub use state::ClientSet;
