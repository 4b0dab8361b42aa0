//! HTTP surface and command-line entry points for SupplySense.

pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod user;

pub use config::{Cli, Command, Config};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
