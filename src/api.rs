//! HTTP API serving the chat page
//!
//! The server hosts a single shared session.

mod assets;
mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::controller::SharedController;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: SharedController,
}

impl AppState {
    pub fn new(controller: SharedController) -> Self {
        Self { controller }
    }
}
