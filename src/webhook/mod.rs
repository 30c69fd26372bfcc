//! HTTPS admission endpoint
//!
//! Decodes admission reviews, runs them through the gate and writes exactly
//! one admission response per request.

pub mod handler;
pub mod server;
pub mod tls;

pub use handler::{create_webhook_router, handle_admission, WebhookState, JSON_CONTENT_TYPE};
pub use server::run_webhook_server;
pub use tls::load_server_config;
