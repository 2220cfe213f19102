// Log sink Render Target
// Emits each frame as a structured tracing event

use promo_countdown_core::domain::Frame;
use promo_countdown_core::port::{RenderError, RenderTarget};
use tracing::info;

/// RenderTarget that writes frames to the log stream
pub struct LogRenderTarget {
    label: String,
}

impl LogRenderTarget {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl RenderTarget for LogRenderTarget {
    fn render(&self, frame: &Frame) -> Result<(), RenderError> {
        info!(
            target: "promo_countdown::render",
            label = %self.label,
            days = %frame.days,
            hours = %frame.hours,
            minutes = %frame.minutes,
            seconds = %frame.seconds,
            "Countdown frame"
        );
        Ok(())
    }
}
