// Port Layer - Interfaces for external dependencies

pub mod render_target;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use render_target::{RenderError, RenderTarget};
pub use time_provider::TimeProvider;
