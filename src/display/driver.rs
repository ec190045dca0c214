// src/display/driver.rs
//! DisplayDriver trait - minimal interface for platform-specific presentation.
//!
//! The core never touches windowing APIs directly. A driver owns the window,
//! renderer and texture equivalent, and the core talks to it only through
//! request/response messages.
//!
//! ## Lifecycle
//! 1. `new()` - Pure initialization (connect to the platform, no window yet)
//! 2. `handle_request(Init)` - Create window, renderer and texture
//! 3. Request/response loop - `PollEvents`, `ClearSurface`, `Present`, ...
//! 4. `handle_request(Shutdown)` or `Drop` - Release resources in reverse order

use crate::display::messages::{DisplayError, DriverRequest, DriverResponse};
use anyhow::Result;

/// Platform-specific presentation surface.
pub trait DisplayDriver {
    /// Pure initialization only - no window creation, no resource allocation.
    fn new() -> Result<Self>
    where
        Self: Sized;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Handle a request from DisplayManager, returning a response.
    ///
    /// ## Request/Response Pairs
    /// - `Init(config)` → `InitComplete`
    /// - `PollEvents` → `Events`
    /// - `ClearSurface(color)` → `SurfaceCleared`
    /// - `Present(frame)` → `PresentComplete(frame)`
    /// - `SetTitle(s)` → `TitleSet`
    /// - `Shutdown` → `ShutdownComplete`
    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError>;
}
