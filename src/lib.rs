//! Softframe library crate.
//!
//! A software-rendered framebuffer: primitives blend into an in-memory pixel grid,
//! an optional box blur runs over the settled frame, and a display driver uploads
//! the result once per frame.

pub mod color;
pub mod compositor;
pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod filter;
pub mod framebuffer;
pub mod geometry;
pub mod instrument;
pub mod rasterizer;

pub use color::{Color, NamedColor};
pub use context::RenderContext;
pub use error::DrawError;
pub use framebuffer::FrameBuffer;
pub use geometry::Rect;
