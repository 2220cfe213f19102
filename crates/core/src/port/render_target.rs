// Render Target Port
// Four write-only text slots the countdown pushes formatted values into

use crate::domain::{Frame, Slot};
use thiserror::Error;

/// Render-side failures reported by an adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Slot missing: {0}")]
    SlotMissing(Slot),

    #[error("Target detached: {0}")]
    Detached(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err.to_string())
    }
}

/// Render target owned by the caller
///
/// The timer holds a shared handle and never creates or destroys the target.
/// `render` is called once per tick with a fully formatted frame; calls never
/// overlap for a given timer.
pub trait RenderTarget: Send + Sync {
    /// Check that every slot is addressable
    ///
    /// Called once before the first render. Adapters backed by something that
    /// can be missing (page markup, widgets) report `RenderError::SlotMissing`.
    fn resolve(&self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Write the frame into the four slots
    fn render(&self, frame: &Frame) -> Result<(), RenderError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every frame it receives
    #[derive(Clone, Default)]
    pub struct RecordingRenderTarget {
        frames: Arc<Mutex<Vec<Frame>>>,
        missing: Option<Slot>,
        fail_after: Option<usize>,
    }

    impl RecordingRenderTarget {
        pub fn new() -> Self {
            Self::default()
        }

        /// Target whose `resolve` reports `slot` as missing
        pub fn missing_slot(slot: Slot) -> Self {
            Self {
                missing: Some(slot),
                ..Self::default()
            }
        }

        /// Target that accepts `renders` frames, then fails every write
        pub fn failing_after(renders: usize) -> Self {
            Self {
                fail_after: Some(renders),
                ..Self::default()
            }
        }

        pub fn frames(&self) -> Vec<Frame> {
            self.frames.lock().unwrap().clone()
        }

        pub fn render_count(&self) -> usize {
            self.frames.lock().unwrap().len()
        }

        pub fn last_frame(&self) -> Option<Frame> {
            self.frames.lock().unwrap().last().cloned()
        }
    }

    impl RenderTarget for RecordingRenderTarget {
        fn resolve(&self) -> Result<(), RenderError> {
            match self.missing {
                Some(slot) => Err(RenderError::SlotMissing(slot)),
                None => Ok(()),
            }
        }

        fn render(&self, frame: &Frame) -> Result<(), RenderError> {
            let mut frames = self.frames.lock().unwrap();
            if let Some(limit) = self.fail_after {
                if frames.len() >= limit {
                    return Err(RenderError::Detached("mock target detached".to_string()));
                }
            }
            frames.push(frame.clone());
            Ok(())
        }
    }
}
