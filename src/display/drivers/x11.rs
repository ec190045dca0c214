//! Minimal Xlib display driver.
//!
//! - Window creation at the framebuffer's size (`HIDDEN` skips mapping,
//!   `BORDERLESS` sets override-redirect)
//! - A GC as the renderer and a client-side `XImage` as the texture
//! - Framebuffer presentation via XPutImage
//!
//! X11 TrueColor visuals want `0x00RRGGBB` words, so `Present` repacks each
//! ABGR8888 pixel into the image's backing store before the upload.

use crate::color::Color;
use crate::display::driver::DisplayDriver;
use crate::display::messages::{
    DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse, PlatformResource,
    WindowFlags,
};
use crate::framebuffer::FrameSnapshot;
use anyhow::Result;
use log::{debug, info, trace, warn};
use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::ptr;
use x11::xlib;

const BYTES_PER_PIXEL: usize = 4;

/// Client-side image and the pixel words it points at.
struct Texture {
    image: *mut xlib::XImage,
    words: Vec<u32>,
}

pub struct X11DisplayDriver {
    display: *mut xlib::Display,
    window: Option<xlib::Window>,
    gc: Option<xlib::GC>,
    texture: Option<Texture>,
    wm_delete_window: xlib::Atom,
    width_px: u32,
    height_px: u32,
}

fn unavailable(resource: PlatformResource, reason: impl Into<String>) -> DisplayError {
    DisplayError::ResourceUnavailable {
        resource,
        reason: reason.into(),
    }
}

/// ABGR8888 to the `0x00RRGGBB` layout of a 24-bit TrueColor visual.
fn to_x11_pixel(color: Color) -> u32 {
    (u32::from(color.r()) << 16) | (u32::from(color.g()) << 8) | u32::from(color.b())
}

impl X11DisplayDriver {
    fn handle_init(&mut self, config: DriverConfig) -> Result<DriverResponse, DisplayError> {
        info!(
            "X11DisplayDriver: Init '{}' {}x{} flags {:?}",
            config.title, config.width_px, config.height_px, config.flags
        );
        self.width_px = config.width_px;
        self.height_px = config.height_px;

        // On failure, whatever was created so far is released by Drop.
        self.create_window(&config)?;
        self.create_gc()?;
        self.create_texture()?;

        Ok(DriverResponse::InitComplete {
            width_px: self.width_px,
            height_px: self.height_px,
        })
    }

    fn create_window(&mut self, config: &DriverConfig) -> Result<(), DisplayError> {
        let title = CString::new(config.title.as_str())
            .map_err(|e| unavailable(PlatformResource::Window, e.to_string()))?;

        // SAFETY: `self.display` is a live connection opened in `new()`.
        unsafe {
            let screen = xlib::XDefaultScreen(self.display);
            let root = xlib::XRootWindow(self.display, screen);
            let window = xlib::XCreateSimpleWindow(
                self.display,
                root,
                0,
                0,
                self.width_px as c_uint,
                self.height_px as c_uint,
                0,
                xlib::XBlackPixel(self.display, screen),
                xlib::XBlackPixel(self.display, screen),
            );
            if window == 0 {
                return Err(unavailable(
                    PlatformResource::Window,
                    "XCreateSimpleWindow returned no window",
                ));
            }
            self.window = Some(window);

            xlib::XStoreName(self.display, window, title.as_ptr());
            xlib::XSelectInput(
                self.display,
                window,
                xlib::ExposureMask | xlib::FocusChangeMask | xlib::StructureNotifyMask,
            );

            let protocol = b"WM_DELETE_WINDOW\0";
            self.wm_delete_window =
                xlib::XInternAtom(self.display, protocol.as_ptr() as *const c_char, xlib::False);
            let mut atoms = [self.wm_delete_window];
            xlib::XSetWMProtocols(self.display, window, atoms.as_mut_ptr(), 1);

            if config.flags.contains(WindowFlags::BORDERLESS) {
                let mut attrs: xlib::XSetWindowAttributes = std::mem::zeroed();
                attrs.override_redirect = xlib::True;
                xlib::XChangeWindowAttributes(
                    self.display,
                    window,
                    xlib::CWOverrideRedirect,
                    &mut attrs,
                );
            }
            let unsupported =
                config.flags & (WindowFlags::FULLSCREEN | WindowFlags::ALWAYS_ON_TOP | WindowFlags::RESIZABLE);
            if !unsupported.is_empty() {
                debug!("X11DisplayDriver: ignoring flags {:?}", unsupported);
            }

            if !config.flags.contains(WindowFlags::HIDDEN) {
                xlib::XMapWindow(self.display, window);
            }
            xlib::XFlush(self.display);
        }
        debug!("X11DisplayDriver: window created");
        Ok(())
    }

    fn create_gc(&mut self) -> Result<(), DisplayError> {
        let window = self
            .window
            .ok_or_else(|| unavailable(PlatformResource::Renderer, "no window"))?;
        // SAFETY: display and window are live.
        let gc = unsafe { xlib::XCreateGC(self.display, window, 0, ptr::null_mut()) };
        if gc.is_null() {
            return Err(unavailable(PlatformResource::Renderer, "XCreateGC failed"));
        }
        self.gc = Some(gc);
        debug!("X11DisplayDriver: GC created");
        Ok(())
    }

    fn create_texture(&mut self) -> Result<(), DisplayError> {
        let len = self.width_px as usize * self.height_px as usize;
        let mut words = vec![0u32; len];

        // SAFETY: display is live; `words` outlives the image because both live in
        // `Texture` and the image struct is freed before the Vec in `release_all`.
        let image = unsafe {
            let screen = xlib::XDefaultScreen(self.display);
            let depth = xlib::XDefaultDepth(self.display, screen);
            if depth != 24 && depth != 32 {
                return Err(unavailable(
                    PlatformResource::Texture,
                    format!("unsupported visual depth {depth}"),
                ));
            }
            xlib::XCreateImage(
                self.display,
                xlib::XDefaultVisual(self.display, screen),
                depth as c_uint,
                xlib::ZPixmap,
                0,
                words.as_mut_ptr() as *mut c_char,
                self.width_px as c_uint,
                self.height_px as c_uint,
                32,
                (self.width_px as usize * BYTES_PER_PIXEL) as c_int,
            )
        };
        if image.is_null() {
            return Err(unavailable(PlatformResource::Texture, "XCreateImage failed"));
        }
        self.texture = Some(Texture { image, words });
        debug!("X11DisplayDriver: image texture created");
        Ok(())
    }

    fn handle_present(&mut self, frame: FrameSnapshot) -> Result<DriverResponse, DisplayError> {
        let (Some(window), Some(gc), Some(texture)) = (self.window, self.gc, self.texture.as_mut())
        else {
            return Err(DisplayError::PresentationFailed {
                snapshot: Some(Box::new(frame)),
                reason: "driver not initialized".to_string(),
            });
        };
        if frame.pixels.len() != texture.words.len() {
            let reason = format!(
                "frame has {} pixels, image holds {}",
                frame.pixels.len(),
                texture.words.len()
            );
            return Err(DisplayError::PresentationFailed {
                snapshot: Some(Box::new(frame)),
                reason,
            });
        }

        for (word, &color) in texture.words.iter_mut().zip(frame.pixels.iter()) {
            *word = to_x11_pixel(color);
        }

        // SAFETY: image points at `texture.words`, which has exactly width*height words.
        unsafe {
            xlib::XPutImage(
                self.display,
                window,
                gc,
                texture.image,
                0,
                0,
                0,
                0,
                self.width_px as c_uint,
                self.height_px as c_uint,
            );
            xlib::XFlush(self.display);
        }
        trace!("X11DisplayDriver: presented frame");
        Ok(DriverResponse::PresentComplete(frame))
    }

    fn handle_clear(&mut self, color: Color) -> Result<DriverResponse, DisplayError> {
        let window = self.window.ok_or(DisplayError::NotInitialized)?;
        // SAFETY: display and window are live.
        unsafe {
            xlib::XSetWindowBackground(self.display, window, u64::from(to_x11_pixel(color)) as _);
            xlib::XClearWindow(self.display, window);
        }
        Ok(DriverResponse::SurfaceCleared)
    }

    fn handle_poll_events(&mut self) -> Result<DriverResponse, DisplayError> {
        let mut events = Vec::new();
        // SAFETY: display is live; XNextEvent fully initializes `event`.
        unsafe {
            while xlib::XPending(self.display) > 0 {
                let mut event: xlib::XEvent = std::mem::zeroed();
                xlib::XNextEvent(self.display, &mut event);
                match event.get_type() {
                    xlib::ClientMessage => {
                        let message = xlib::XClientMessageEvent::from(event);
                        if message.data.get_long(0) as xlib::Atom == self.wm_delete_window {
                            events.push(DisplayEvent::CloseRequested);
                        }
                    }
                    xlib::Expose => events.push(DisplayEvent::Exposed),
                    xlib::FocusIn => events.push(DisplayEvent::FocusGained),
                    xlib::FocusOut => events.push(DisplayEvent::FocusLost),
                    other => trace!("X11DisplayDriver: ignoring event type {}", other),
                }
            }
        }
        Ok(DriverResponse::Events(events))
    }

    fn handle_set_title(&mut self, title: &str) -> Result<DriverResponse, DisplayError> {
        let window = self.window.ok_or(DisplayError::NotInitialized)?;
        let title = CString::new(title).map_err(|e| DisplayError::Platform(e.to_string()))?;
        // SAFETY: display and window are live; `title` is NUL-terminated.
        unsafe {
            xlib::XStoreName(self.display, window, title.as_ptr());
            xlib::XFlush(self.display);
        }
        Ok(DriverResponse::TitleSet)
    }

    /// Releases texture, GC and window, in that order. The connection stays open.
    fn release_all(&mut self) {
        if let Some(texture) = self.texture.take() {
            // SAFETY: the image struct was allocated by XCreateImage; its data pointer
            // belongs to `texture.words`, so only the struct itself is freed here.
            unsafe {
                (*texture.image).data = ptr::null_mut();
                xlib::XFree(texture.image as *mut c_void);
            }
            drop(texture.words);
            debug!("X11DisplayDriver: released image texture");
        }
        if let Some(gc) = self.gc.take() {
            // SAFETY: gc was created on this display.
            unsafe { xlib::XFreeGC(self.display, gc) };
            debug!("X11DisplayDriver: released GC");
        }
        if let Some(window) = self.window.take() {
            // SAFETY: window was created on this display.
            unsafe { xlib::XDestroyWindow(self.display, window) };
            debug!("X11DisplayDriver: released window");
        }
    }
}

impl DisplayDriver for X11DisplayDriver {
    fn new() -> Result<Self> {
        info!("X11DisplayDriver::new() - connecting to X server");
        // SAFETY: a null name selects $DISPLAY.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(anyhow::anyhow!(
                "Failed to open X11 display. Is DISPLAY set?"
            ));
        }
        Ok(Self {
            display,
            window: None,
            gc: None,
            texture: None,
            wm_delete_window: 0,
            width_px: 0,
            height_px: 0,
        })
    }

    fn name(&self) -> &'static str {
        "x11"
    }

    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError> {
        match request {
            DriverRequest::Init(config) => self.handle_init(config),
            DriverRequest::PollEvents => self.handle_poll_events(),
            DriverRequest::ClearSurface(color) => self.handle_clear(color),
            DriverRequest::Present(frame) => self.handle_present(frame),
            DriverRequest::SetTitle(title) => self.handle_set_title(&title),
            DriverRequest::Shutdown => {
                self.release_all();
                Ok(DriverResponse::ShutdownComplete)
            }
        }
    }
}

impl Drop for X11DisplayDriver {
    fn drop(&mut self) {
        self.release_all();
        if self.display.is_null() {
            warn!("X11DisplayDriver: dropped without a display connection");
            return;
        }
        // SAFETY: display was opened in `new()` and is closed exactly once.
        unsafe { xlib::XCloseDisplay(self.display) };
    }
}
