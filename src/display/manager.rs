// src/display/manager.rs
//! DisplayManager - synchronous wrapper around a DisplayDriver.
//!
//! Owns the boxed driver, performs the `Init` handshake and turns each
//! request/response pair into a typed method call.

use crate::color::Color;
use crate::display::driver::DisplayDriver;
use crate::display::messages::{
    DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse,
};
use crate::framebuffer::FrameSnapshot;
use log::{debug, info, trace, warn};

/// Display metrics discovered during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub width_px: u32,
    pub height_px: u32,
}

/// DisplayManager manages the display driver and tracks window state.
pub struct DisplayManager {
    driver: Box<dyn DisplayDriver>,
    metrics: DisplayMetrics,
}

impl std::fmt::Debug for DisplayManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayManager")
            .field("driver", &self.driver.name())
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl DisplayManager {
    /// Runs the `Init` handshake. On failure the driver is dropped, which releases
    /// whatever it had acquired before failing.
    pub fn init(
        mut driver: Box<dyn DisplayDriver>,
        config: DriverConfig,
    ) -> Result<Self, DisplayError> {
        info!(
            "DisplayManager: initializing {} driver ({}x{}, flags {:?})",
            driver.name(),
            config.width_px,
            config.height_px,
            config.flags
        );
        let (requested_w, requested_h) = (config.width_px, config.height_px);

        let metrics = match driver.handle_request(DriverRequest::Init(config))? {
            DriverResponse::InitComplete {
                width_px,
                height_px,
            } => DisplayMetrics {
                width_px,
                height_px,
            },
            other => return Err(unexpected("InitComplete", &other)),
        };

        if (metrics.width_px, metrics.height_px) != (requested_w, requested_h) {
            warn!(
                "DisplayManager: driver reports {}x{}, framebuffer is {}x{}",
                metrics.width_px, metrics.height_px, requested_w, requested_h
            );
        }
        info!(
            "DisplayManager: initialized - {}x{} px",
            metrics.width_px, metrics.height_px
        );
        Ok(Self { driver, metrics })
    }

    pub fn poll_events(&mut self) -> Result<Vec<DisplayEvent>, DisplayError> {
        match self.driver.handle_request(DriverRequest::PollEvents)? {
            DriverResponse::Events(events) => {
                if !events.is_empty() {
                    debug!("DisplayManager: {} event(s)", events.len());
                }
                Ok(events)
            }
            other => Err(unexpected("Events", &other)),
        }
    }

    pub fn clear_surface(&mut self, color: Color) -> Result<(), DisplayError> {
        match self.driver.handle_request(DriverRequest::ClearSurface(color))? {
            DriverResponse::SurfaceCleared => Ok(()),
            other => Err(unexpected("SurfaceCleared", &other)),
        }
    }

    /// Uploads and displays `frame`, returning it once the driver is done.
    pub fn present(&mut self, frame: FrameSnapshot) -> Result<FrameSnapshot, DisplayError> {
        trace!("DisplayManager: present {}x{}", frame.width, frame.height);
        match self.driver.handle_request(DriverRequest::Present(frame))? {
            DriverResponse::PresentComplete(frame) => Ok(frame),
            other => Err(unexpected("PresentComplete", &other)),
        }
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), DisplayError> {
        match self
            .driver
            .handle_request(DriverRequest::SetTitle(title.to_string()))?
        {
            DriverResponse::TitleSet => Ok(()),
            other => Err(unexpected("TitleSet", &other)),
        }
    }

    /// Releases the platform resources. The driver is dropped either way.
    pub fn shutdown(mut self) -> Result<(), DisplayError> {
        info!("DisplayManager: shutting down {} driver", self.driver.name());
        match self.driver.handle_request(DriverRequest::Shutdown)? {
            DriverResponse::ShutdownComplete => Ok(()),
            other => Err(unexpected("ShutdownComplete", &other)),
        }
    }

    /// Get current display metrics.
    pub fn metrics(&self) -> &DisplayMetrics {
        &self.metrics
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }
}

fn unexpected(wanted: &str, got: &DriverResponse) -> DisplayError {
    DisplayError::UnexpectedResponse(format!("expected {wanted}, got {got:?}"))
}
