//! Wiring and process-level setup.

pub mod config;
pub mod seller_app;
pub mod tracing;

pub use config::AppConfig;
pub use seller_app::{Collaborators, SellerApp};
