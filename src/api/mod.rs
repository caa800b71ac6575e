//! Store REST service: the synchronization protocol's wire surface.

pub mod handlers;
pub mod server;

pub use server::{run_api_server, ApiConfig, AppState};
