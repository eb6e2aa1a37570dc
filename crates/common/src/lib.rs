//! Crate includes reusable utils shared by the SDK crates and the applications
//! embedding them, such as initializing the tracing framework.

pub mod logging;

// Re-export tracing crate for convenience.
pub use tracing;
