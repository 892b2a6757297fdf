//! Contract acceptance gateway.
//!
//! Serves the acceptance page and proxies its two calls to the automation
//! webhook: the contract lookup (whose response is flattened by
//! [`normalize::normalize`]) and the acceptance submission (re-encoded as an
//! HTML form post).

pub mod config;
pub mod error;
pub mod normalize;
pub mod quote;
pub mod web;
pub mod webhook;

pub use error::{GatewayError, GatewayResult};
pub use web::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
