//! Typed handles for talking to running actors.

pub mod mock;
pub mod reconciler_client;

pub use reconciler_client::*;
