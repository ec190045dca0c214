// src/display/mod.rs
//! Message-based presentation bridge.
//!
//! - DisplayDriver: platform primitives (headless surface, X11)
//! - DisplayManager: init handshake and typed request helpers
//! - Messages: request/response protocol between the two

pub mod driver;
pub mod drivers;
pub mod manager;
pub mod messages;

pub use driver::DisplayDriver;
pub use drivers::{HeadlessDisplayDriver, HeadlessHandle};
pub use manager::{DisplayManager, DisplayMetrics};
pub use messages::{
    DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse, PlatformResource,
    WindowFlags,
};

#[cfg(feature = "x11")]
pub use drivers::X11DisplayDriver;
