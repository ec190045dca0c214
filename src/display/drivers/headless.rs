//! Headless display driver: an in-memory presentation surface.
//!
//! The "texture" is a `Vec<Color>` sized at `Init`; `Present` copies the frame into
//! it verbatim. A [`HeadlessHandle`] shares that state with the caller, so the last
//! presented frame can still be inspected after the driver has been boxed and moved
//! into a render context.

use crate::color::Color;
use crate::display::driver::DisplayDriver;
use crate::display::messages::{
    DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse, PlatformResource,
    WindowFlags,
};
use crate::framebuffer::FrameSnapshot;
use anyhow::Result;
use log::{debug, info, trace};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
struct SurfaceState {
    title: Option<String>,
    flags: WindowFlags,
    width_px: u32,
    height_px: u32,
    window_open: bool,
    renderer_ready: bool,
    texture: Option<Vec<Color>>,
    frames_presented: u64,
    last_clear: Option<Color>,
    pending_events: VecDeque<DisplayEvent>,
}

/// Shared view of a headless surface, usable after the driver has been moved.
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    state: Rc<RefCell<SurfaceState>>,
}

impl HeadlessHandle {
    /// Copy of the texture as of the last present, or `None` before the first one.
    pub fn last_frame(&self) -> Option<FrameSnapshot> {
        let state = self.state.borrow();
        if state.frames_presented == 0 {
            return None;
        }
        state.texture.as_ref().map(|texture| FrameSnapshot {
            width: state.width_px,
            height: state.height_px,
            pixels: texture.clone().into_boxed_slice(),
        })
    }

    pub fn frames_presented(&self) -> u64 {
        self.state.borrow().frames_presented
    }

    /// Color of the most recent platform-level clear.
    pub fn last_clear(&self) -> Option<Color> {
        self.state.borrow().last_clear
    }

    pub fn title(&self) -> Option<String> {
        self.state.borrow().title.clone()
    }

    pub fn flags(&self) -> WindowFlags {
        self.state.borrow().flags
    }

    /// True while window, renderer and texture are all held.
    pub fn is_live(&self) -> bool {
        let state = self.state.borrow();
        state.window_open && state.renderer_ready && state.texture.is_some()
    }

    /// Queues an event for the next `PollEvents`.
    pub fn push_event(&self, event: DisplayEvent) {
        self.state.borrow_mut().pending_events.push_back(event);
    }
}

pub struct HeadlessDisplayDriver {
    state: Rc<RefCell<SurfaceState>>,
    /// Resource that `Init` pretends it could not acquire.
    fail_on: Option<PlatformResource>,
}

impl HeadlessDisplayDriver {
    /// A driver whose `Init` fails while acquiring `resource`.
    pub fn failing_on(resource: PlatformResource) -> Self {
        Self {
            state: Rc::default(),
            fail_on: Some(resource),
        }
    }

    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            state: Rc::clone(&self.state),
        }
    }

    fn acquire(&self, resource: PlatformResource) -> Result<(), DisplayError> {
        if self.fail_on == Some(resource) {
            return Err(DisplayError::ResourceUnavailable {
                resource,
                reason: format!("headless {resource} creation disabled"),
            });
        }
        trace!("HeadlessDisplayDriver: acquired {}", resource);
        Ok(())
    }

    fn handle_init(&mut self, config: DriverConfig) -> Result<DriverResponse, DisplayError> {
        info!(
            "HeadlessDisplayDriver: Init '{}' {}x{}",
            config.title, config.width_px, config.height_px
        );

        self.acquire(PlatformResource::Window)?;
        self.state.borrow_mut().window_open = true;

        // Anything acquired so far is released again if a later step fails.
        if let Err(e) = self.acquire(PlatformResource::Renderer) {
            self.release_all();
            return Err(e);
        }
        self.state.borrow_mut().renderer_ready = true;

        if let Err(e) = self.acquire(PlatformResource::Texture) {
            self.release_all();
            return Err(e);
        }

        let len = config.width_px as usize * config.height_px as usize;
        let mut state = self.state.borrow_mut();
        state.texture = Some(vec![Color::TRANSPARENT; len]);
        state.width_px = config.width_px;
        state.height_px = config.height_px;
        state.flags = config.flags;
        state.title = Some(config.title);

        Ok(DriverResponse::InitComplete {
            width_px: config.width_px,
            height_px: config.height_px,
        })
    }

    fn handle_present(&mut self, frame: FrameSnapshot) -> Result<DriverResponse, DisplayError> {
        let mut state = self.state.borrow_mut();
        let Some(texture) = state.texture.as_mut() else {
            return Err(DisplayError::PresentationFailed {
                snapshot: Some(Box::new(frame)),
                reason: "no texture".to_string(),
            });
        };
        if texture.len() != frame.pixels.len() {
            let reason = format!(
                "frame has {} pixels, texture holds {}",
                frame.pixels.len(),
                texture.len()
            );
            return Err(DisplayError::PresentationFailed {
                snapshot: Some(Box::new(frame)),
                reason,
            });
        }
        texture.copy_from_slice(&frame.pixels);
        state.frames_presented += 1;
        trace!("HeadlessDisplayDriver: Present #{}", state.frames_presented);
        Ok(DriverResponse::PresentComplete(frame))
    }

    /// Releases texture, renderer and window, in that order.
    fn release_all(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.texture.take().is_some() {
            debug!("HeadlessDisplayDriver: released texture");
        }
        if std::mem::take(&mut state.renderer_ready) {
            debug!("HeadlessDisplayDriver: released renderer");
        }
        if std::mem::take(&mut state.window_open) {
            debug!("HeadlessDisplayDriver: released window");
        }
    }

    fn is_live(&self) -> bool {
        self.state.borrow().texture.is_some()
    }
}

impl DisplayDriver for HeadlessDisplayDriver {
    fn new() -> Result<Self> {
        Ok(Self {
            state: Rc::default(),
            fail_on: None,
        })
    }

    fn name(&self) -> &'static str {
        "headless"
    }

    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError> {
        if !matches!(request, DriverRequest::Init(_)) && !self.is_live() {
            if let DriverRequest::Present(frame) = request {
                return Err(DisplayError::PresentationFailed {
                    snapshot: Some(Box::new(frame)),
                    reason: "driver not initialized".to_string(),
                });
            }
            return Err(DisplayError::NotInitialized);
        }

        match request {
            DriverRequest::Init(config) => self.handle_init(config),
            DriverRequest::PollEvents => {
                let events = self.state.borrow_mut().pending_events.drain(..).collect();
                Ok(DriverResponse::Events(events))
            }
            DriverRequest::ClearSurface(color) => {
                self.state.borrow_mut().last_clear = Some(color);
                Ok(DriverResponse::SurfaceCleared)
            }
            DriverRequest::Present(frame) => self.handle_present(frame),
            DriverRequest::SetTitle(title) => {
                info!("HeadlessDisplayDriver: SetTitle '{}'", title);
                self.state.borrow_mut().title = Some(title);
                Ok(DriverResponse::TitleSet)
            }
            DriverRequest::Shutdown => {
                self.release_all();
                Ok(DriverResponse::ShutdownComplete)
            }
        }
    }
}

impl Drop for HeadlessDisplayDriver {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn config(w: u32, h: u32) -> DriverConfig {
        DriverConfig {
            title: "headless test".to_string(),
            width_px: w,
            height_px: h,
            flags: WindowFlags::HIDDEN,
            bytes_per_pixel: 4,
        }
    }

    fn frame(w: u32, h: u32, color: Color) -> FrameSnapshot {
        FrameSnapshot {
            width: w,
            height: h,
            pixels: vec![color; (w * h) as usize].into_boxed_slice(),
        }
    }

    #[test]
    fn requests_before_init_are_rejected() {
        let mut driver = HeadlessDisplayDriver::new().unwrap();
        assert!(matches!(
            driver.handle_request(DriverRequest::PollEvents),
            Err(DisplayError::NotInitialized)
        ));
        match driver.handle_request(DriverRequest::Present(frame(2, 2, Color::WHITE))) {
            Err(DisplayError::PresentationFailed {
                snapshot: Some(back),
                ..
            }) => assert_eq!(back.pixels.len(), 4),
            other => panic!("expected PresentationFailed with frame, got {other:?}"),
        }
    }

    #[test]
    fn present_copies_frame_verbatim() {
        let mut driver = HeadlessDisplayDriver::new().unwrap();
        let handle = driver.handle();
        driver.handle_request(DriverRequest::Init(config(3, 2))).unwrap();
        assert!(handle.is_live());
        assert_eq!(handle.flags(), WindowFlags::HIDDEN);
        assert!(handle.last_frame().is_none());

        let mut sent = frame(3, 2, Color::BLACK);
        sent.pixels[4] = Color::new(1, 2, 3, 4);
        let expected = sent.clone();
        match driver.handle_request(DriverRequest::Present(sent)).unwrap() {
            DriverResponse::PresentComplete(back) => assert_eq!(back, expected),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(handle.frames_presented(), 1);
        assert_eq!(handle.last_frame(), Some(expected));
    }

    #[test]
    fn wrong_sized_frame_is_returned() {
        let mut driver = HeadlessDisplayDriver::new().unwrap();
        driver.handle_request(DriverRequest::Init(config(3, 2))).unwrap();
        let err = driver
            .handle_request(DriverRequest::Present(frame(2, 2, Color::WHITE)))
            .unwrap_err();
        assert!(matches!(
            err,
            DisplayError::PresentationFailed { snapshot: Some(_), .. }
        ));
    }

    #[test]
    fn failed_init_releases_earlier_resources() {
        let mut driver = HeadlessDisplayDriver::failing_on(PlatformResource::Texture);
        let handle = driver.handle();
        let err = driver
            .handle_request(DriverRequest::Init(config(4, 4)))
            .unwrap_err();
        assert!(matches!(
            err,
            DisplayError::ResourceUnavailable {
                resource: PlatformResource::Texture,
                ..
            }
        ));
        assert!(!handle.is_live());
        let state = handle.state.borrow();
        assert!(!state.window_open && !state.renderer_ready);
    }

    #[test]
    fn events_drain_in_order() {
        let mut driver = HeadlessDisplayDriver::new().unwrap();
        let handle = driver.handle();
        driver.handle_request(DriverRequest::Init(config(1, 1))).unwrap();
        handle.push_event(DisplayEvent::FocusGained);
        handle.push_event(DisplayEvent::CloseRequested);
        match driver.handle_request(DriverRequest::PollEvents).unwrap() {
            DriverResponse::Events(events) => assert_eq!(
                events,
                vec![DisplayEvent::FocusGained, DisplayEvent::CloseRequested]
            ),
            other => panic!("unexpected {other:?}"),
        }
        match driver.handle_request(DriverRequest::PollEvents).unwrap() {
            DriverResponse::Events(events) => assert!(events.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn shutdown_then_requests_fail() {
        let mut driver = HeadlessDisplayDriver::new().unwrap();
        let handle = driver.handle();
        driver.handle_request(DriverRequest::Init(config(1, 1))).unwrap();
        driver.handle_request(DriverRequest::Shutdown).unwrap();
        assert!(!handle.is_live());
        assert!(matches!(
            driver.handle_request(DriverRequest::ClearSurface(Color::BLACK)),
            Err(DisplayError::NotInitialized)
        ));
    }
}
