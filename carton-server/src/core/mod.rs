//! Core: configuration, state, server

pub mod config;
pub mod server;
pub mod state;

pub use config::{Config, PrintMode};
pub use server::Server;
pub use state::ServerState;
