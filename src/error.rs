// src/error.rs

//! Error type returned by every drawing and lifecycle operation.

use crate::display::messages::DisplayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrawError {
    /// The context has no presentation driver: never initialized, or torn down.
    #[error("render context not initialized")]
    NotInitialized,

    /// A strict single-pixel write landed outside the grid.
    #[error("pixel ({x}, {y}) is outside the framebuffer")]
    OutOfBounds { x: i32, y: i32 },

    #[error("framebuffer of {width}x{height} has no pixels")]
    EmptyFrameBuffer { width: u32, height: u32 },

    #[error("failed to allocate {pixels} pixels: {reason}")]
    Allocation { pixels: usize, reason: String },

    #[error("sprite holds {actual} pixels but its rect covers {expected}")]
    SpriteSizeMismatch { expected: usize, actual: usize },

    #[error("pixel buffer holds {actual} pixels, framebuffer needs {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Display(#[from] DisplayError),
}

impl DrawError {
    /// Whether the error leaves no usable display surface. The driver loop is
    /// expected to stop on these; everything else is per-call.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DrawError::Display(DisplayError::ResourceUnavailable { .. })
                | DrawError::Allocation { .. }
        )
    }
}
