//! Browser page and JSON API over the task store.

mod server;
pub mod templates;

pub use server::{ServerHandle, TodoServer, build_router, start_server};
