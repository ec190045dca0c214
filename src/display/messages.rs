// src/display/messages.rs
//! Message types for communication between DisplayManager and DisplayDriver.
//!
//! All communication happens via ownership transfer: a frame moves into the driver
//! with `Present` and comes back with `PresentComplete`.

use crate::color::Color;
use crate::framebuffer::FrameSnapshot;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

bitflags! {
    /// Window creation hints. Drivers honour what they can express and ignore the rest.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct WindowFlags: u32 {
        const RESIZABLE     = 1 << 0;
        const BORDERLESS    = 1 << 1;
        const FULLSCREEN    = 1 << 2;
        const HIDDEN        = 1 << 3;
        const ALWAYS_ON_TOP = 1 << 4;
    }
}

/// Everything a driver needs to create its window and pixel surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub title: String,
    pub width_px: u32,
    pub height_px: u32,
    pub flags: WindowFlags,
    /// Always 4: one packed ABGR8888 value per pixel.
    pub bytes_per_pixel: usize,
}

/// Requests sent from DisplayManager to DisplayDriver.
#[derive(Debug, Clone)]
pub enum DriverRequest {
    /// Acquire window, renderer and texture. Responds with `InitComplete`.
    Init(DriverConfig),

    /// Fetch queued native events. Responds with `Events`.
    PollEvents,

    /// Clear the platform draw target (not the framebuffer). Responds with `SurfaceCleared`.
    ClearSurface(Color),

    /// Upload the frame verbatim and display it. Responds with `PresentComplete`,
    /// handing the frame back.
    Present(FrameSnapshot),

    SetTitle(String),

    /// Release texture, renderer and window, in that order. Responds with `ShutdownComplete`.
    Shutdown,
}

/// Responses sent from DisplayDriver to DisplayManager.
#[derive(Debug)]
pub enum DriverResponse {
    InitComplete { width_px: u32, height_px: u32 },
    Events(Vec<DisplayEvent>),
    SurfaceCleared,
    /// Presentation complete; frame ownership returns to the caller.
    PresentComplete(FrameSnapshot),
    TitleSet,
    ShutdownComplete,
}

/// Platform-agnostic window events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// User asked to close the window.
    CloseRequested,
    /// Part of the window needs repainting.
    Exposed,
    FocusGained,
    FocusLost,
}

/// The three platform resources a driver must acquire before it can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformResource {
    Window,
    Renderer,
    Texture,
}

impl fmt::Display for PlatformResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformResource::Window => "window",
            PlatformResource::Renderer => "renderer",
            PlatformResource::Texture => "texture",
        };
        f.write_str(name)
    }
}

/// Errors a driver can report.
///
/// A failed `Present` carries the frame back in `PresentationFailed` so the
/// caller's framebuffer is never lost.
#[derive(Error, Debug)]
pub enum DisplayError {
    /// Could not acquire a platform resource. There is no useful degraded mode
    /// without a surface, so callers treat this as fatal.
    #[error("could not create {resource}: {reason}")]
    ResourceUnavailable {
        resource: PlatformResource,
        reason: String,
    },

    #[error("presentation failed: {reason}")]
    PresentationFailed {
        snapshot: Option<Box<FrameSnapshot>>,
        reason: String,
    },

    /// A request other than `Init` arrived before `Init` or after `Shutdown`.
    #[error("display driver not initialized")]
    NotInitialized,

    #[error("unexpected driver response: {0}")]
    UnexpectedResponse(String),

    #[error("platform error: {0}")]
    Platform(String),
}
