// src/framebuffer.rs

//! The off-screen pixel grid every primitive draws into.
//!
//! Storage is a single row-major `Box<[Color]>`; pixel `(x, y)` lives at
//! `y * width + x`. The length equals `width * height` whenever the buffer is
//! observable from outside the crate.

use crate::color::Color;
use crate::error::DrawError;
use log::trace;
use std::fmt;

/// Row-major grid of colors sized to the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Box<[Color]>,
}

impl FrameBuffer {
    /// Allocates a `width * height` grid filled with `clear_color`.
    pub fn new(width: u32, height: u32, clear_color: Color) -> Result<Self, DrawError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| DrawError::Allocation {
                pixels: usize::MAX,
                reason: format!("{width}x{height} overflows the address space"),
            })?;
        if len == 0 {
            return Err(DrawError::EmptyFrameBuffer { width, height });
        }

        let pixels = try_grid(len, clear_color)?;
        trace!("FrameBuffer: allocated {}x{} ({} pixels)", width, height, len);

        Ok(Self {
            width,
            height,
            pixels: pixels.into_boxed_slice(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels the grid must hold.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Always false for a constructed buffer; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrites every pixel.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Maps a signed coordinate to its storage index, or `None` when it falls outside
    /// `[0, width) x [0, height)`.
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        self.index_of(x, y).map(|i| self.pixels[i])
    }

    /// Raw overwrite with no blending. Returns `false` on a miss.
    pub fn set(&mut self, x: i32, y: i32, color: Color) -> bool {
        match self.index_of(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Packed upload bytes, 4 per pixel in `[r, g, b, a]` order.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_bytes()).collect()
    }

    /// Swaps in a complete replacement grid. The old contents stay in place if the
    /// length is wrong.
    pub fn replace_pixels(&mut self, pixels: Box<[Color]>) -> Result<(), DrawError> {
        if pixels.len() != self.len() {
            return Err(DrawError::BufferSizeMismatch {
                expected: self.len(),
                actual: pixels.len(),
            });
        }
        self.pixels = pixels;
        Ok(())
    }

    /// Moves the pixels out for presentation. The buffer is empty until
    /// [`FrameBuffer::reclaim`] hands them back.
    pub(crate) fn lend(&mut self) -> FrameSnapshot {
        FrameSnapshot {
            width: self.width,
            height: self.height,
            pixels: std::mem::take(&mut self.pixels),
        }
    }

    pub(crate) fn reclaim(&mut self, snapshot: FrameSnapshot) -> Result<(), DrawError> {
        self.replace_pixels(snapshot.pixels)
    }
}

/// Allocates `len` pixels of `fill`, reporting failure instead of aborting.
pub(crate) fn try_grid(len: usize, fill: Color) -> Result<Vec<Color>, DrawError> {
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|e| DrawError::Allocation {
            pixels: len,
            reason: e.to_string(),
        })?;
    pixels.resize(len, fill);
    Ok(pixels)
}

/// A settled frame in transit to the presentation driver.
///
/// Ownership of the pixels moves into the driver for the duration of a present and
/// comes back in the response, so the grid is never copied on the core side.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Box<[Color]>,
}

impl fmt::Debug for FrameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSnapshot")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &self.pixels.len())
            .finish()
    }
}

impl FrameSnapshot {
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}
