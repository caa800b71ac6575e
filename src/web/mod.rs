//! Server-rendered form surface: a landing page that opens a sheet by name
//! and an update page driving the evaluation engine through validated
//! commands, re-rendered in full after every request.

pub mod controller;
pub mod server;
pub mod view;

pub use server::{run_web_server, WebConfig};
pub use view::{view_model, ViewModel};
