// Promo Countdown Infrastructure - Console Adapters
// Implements: RenderTarget for a terminal line and for the log stream

pub mod log_target;
pub mod terminal;

pub use log_target::LogRenderTarget;
pub use terminal::{LineMode, TerminalRenderTarget};
