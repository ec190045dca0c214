// src/context/mod.rs

//! RenderContext: owns the framebuffer and the display manager for one window.
//!
//! Lifecycle is `create` → `initialize` → frames → `teardown`. Drawing is refused
//! with [`DrawError::NotInitialized`] unless a display manager is held, which is
//! only true between a successful `initialize` and `teardown`.

use crate::color::Color;
use crate::compositor;
use crate::display::{
    DisplayDriver, DisplayError, DisplayEvent, DisplayManager, DisplayMetrics, DriverConfig,
    WindowFlags,
};
use crate::error::DrawError;
use crate::filter;
use crate::framebuffer::{FrameBuffer, FrameSnapshot};
use crate::geometry::Rect;
use crate::instrument;
use crate::rasterizer;
use log::{debug, info, trace, warn};


const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug)]
pub struct RenderContext {
    title: String,
    size: Rect,
    clear_color: Color,
    flags: WindowFlags,
    framebuffer: FrameBuffer,
    display: Option<DisplayManager>,
}

impl RenderContext {
    /// Allocates the framebuffer, filled with opaque black. No platform resources are
    /// touched until [`RenderContext::initialize`].
    pub fn create(
        title: impl Into<String>,
        width: u16,
        height: u16,
        flags: WindowFlags,
    ) -> Result<Self, DrawError> {
        let title = title.into();
        let clear_color = Color::BLACK;
        let framebuffer = FrameBuffer::new(u32::from(width), u32::from(height), clear_color)?;
        info!("RenderContext: created '{}' {}x{}", title, width, height);
        Ok(Self {
            title,
            size: Rect::new(0, 0, width, height),
            clear_color,
            flags,
            framebuffer,
            display: None,
        })
    }

    /// Acquires window, renderer and texture through `driver`.
    ///
    /// Failure here is fatal: the error is a
    /// [`DisplayError::ResourceUnavailable`] and the context stays uninitialized.
    pub fn initialize(&mut self, driver: Box<dyn DisplayDriver>) -> Result<(), DrawError> {
        if let Some(previous) = self.display.take() {
            warn!("RenderContext: initialize called twice, replacing {} driver", previous.driver_name());
            if let Err(e) = previous.shutdown() {
                warn!("RenderContext: previous driver shutdown failed: {}", e);
            }
        }

        let config = DriverConfig {
            title: self.title.clone(),
            width_px: self.framebuffer.width(),
            height_px: self.framebuffer.height(),
            flags: self.flags,
            bytes_per_pixel: BYTES_PER_PIXEL,
        };
        let manager = DisplayManager::init(driver, config)?;
        info!("RenderContext: initialized with {} driver", manager.driver_name());
        self.display = Some(manager);
        Ok(())
    }

    /// Releases platform resources. Every later call fails with `NotInitialized`.
    pub fn teardown(&mut self) -> Result<(), DrawError> {
        let manager = self.display.take().ok_or(DrawError::NotInitialized)?;
        info!("RenderContext: teardown '{}'", self.title);
        manager.shutdown()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.display.is_some()
    }

    fn display(&mut self) -> Result<&mut DisplayManager, DrawError> {
        self.display.as_mut().ok_or(DrawError::NotInitialized)
    }

    /// Resets the framebuffer to the clear color and clears the platform surface.
    pub fn clear(&mut self) -> Result<(), DrawError> {
        let color = self.clear_color;
        self.display()?.clear_surface(color)?;
        self.framebuffer.clear(color);
        trace!("RenderContext: cleared to {}", color);
        Ok(())
    }

    /// Sets the color used by later [`RenderContext::clear`] calls.
    pub fn set_clear_color(&mut self, color: Color) -> Result<(), DrawError> {
        self.display()?;
        self.clear_color = color;
        Ok(())
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), DrawError> {
        let title = title.into();
        self.display()?.set_title(&title)?;
        self.title = title;
        Ok(())
    }

    /// Blends a single pixel. Unlike the shape primitives this is strict: an
    /// off-grid coordinate is [`DrawError::OutOfBounds`].
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<(), DrawError> {
        self.display()?;
        compositor::blend(&mut self.framebuffer, x, y, color)
    }

    /// Returns the number of pixels drawn after clipping.
    pub fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<usize, DrawError> {
        self.display()?;
        Ok(rasterizer::fill_rect(&mut self.framebuffer, rect, color))
    }

    /// Draws from `(p0.x, p0.y)` to `(p1.x, p1.y)`. Returns the number of pixels
    /// drawn after clipping.
    pub fn draw_line(&mut self, p0: Rect, p1: Rect, color: Color) -> Result<usize, DrawError> {
        self.display()?;
        Ok(rasterizer::draw_line(&mut self.framebuffer, p0, p1, color))
    }

    pub fn draw_sprite(&mut self, rect: Rect, pixels: &[Color]) -> Result<usize, DrawError> {
        self.display()?;
        rasterizer::blit_sprite(&mut self.framebuffer, rect, pixels)
    }

    pub fn blur(&mut self, radius: u16) -> Result<(), DrawError> {
        self.display()?;
        let framebuffer = &mut self.framebuffer;
        instrument::timed("box_blur", || filter::box_blur(framebuffer, radius))
    }

    /// Hands the settled frame to the driver for upload and display.
    ///
    /// The pixels travel by value and come back with the response. If the driver
    /// fails without returning them, the framebuffer is reallocated at the clear
    /// color so the context stays usable.
    pub fn render(&mut self) -> Result<(), DrawError> {
        let display = self.display.as_mut().ok_or(DrawError::NotInitialized)?;
        let frame = self.framebuffer.lend();

        match display.present(frame) {
            Ok(frame) => self.restore(Some(frame)),
            Err(DisplayError::PresentationFailed { snapshot, reason }) => {
                warn!("RenderContext: present failed: {}", reason);
                self.restore(snapshot.map(|frame| *frame))?;
                Err(DisplayError::PresentationFailed {
                    snapshot: None,
                    reason,
                }
                .into())
            }
            Err(e) => {
                warn!("RenderContext: present failed: {}", e);
                self.restore(None)?;
                Err(e.into())
            }
        }
    }

    /// Puts a frame back after presentation, or rebuilds the grid when the frame was
    /// lost or came back the wrong size.
    fn restore(&mut self, frame: Option<FrameSnapshot>) -> Result<(), DrawError> {
        let reclaimed = match frame {
            Some(frame) => self.framebuffer.reclaim(frame),
            None => Err(DrawError::BufferSizeMismatch {
                expected: self.framebuffer.len(),
                actual: 0,
            }),
        };
        if let Err(e) = reclaimed {
            warn!("RenderContext: frame not recovered ({}), reallocating", e);
            self.framebuffer = FrameBuffer::new(
                self.framebuffer.width(),
                self.framebuffer.height(),
                self.clear_color,
            )?;
        }
        Ok(())
    }

    pub fn poll_events(&mut self) -> Result<Vec<DisplayEvent>, DrawError> {
        let events = self.display()?.poll_events()?;
        for event in &events {
            debug!("RenderContext: event {:?}", event);
        }
        Ok(events)
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> Rect {
        self.size
    }

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn display_metrics(&self) -> Option<&DisplayMetrics> {
        self.display.as_ref().map(DisplayManager::metrics)
    }
}
