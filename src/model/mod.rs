//! Plain data carried between the store, the reconciler and the renderer.

pub mod order;
pub mod profile;

pub use order::*;
pub use profile::*;
