// src/instrument.rs

//! Wall-clock timing for frame phases and a running frame-time summary.

use log::debug;
use std::fmt;
use std::time::{Duration, Instant};

/// Runs `f`, logging how long it took at `debug`.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    debug!("{}: {:.3} ms", label, start.elapsed().as_secs_f64() * 1000.0);
    out
}

/// Min/avg/max over every recorded frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    frames: u64,
    total: Duration,
    min: Option<Duration>,
    max: Duration,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame_time: Duration) {
        self.frames += 1;
        self.total += frame_time;
        self.min = Some(self.min.map_or(frame_time, |m| m.min(frame_time)));
        self.max = self.max.max(frame_time);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    pub fn max(&self) -> Option<Duration> {
        (self.frames > 0).then_some(self.max)
    }

    pub fn average(&self) -> Option<Duration> {
        if self.frames == 0 {
            return None;
        }
        // Frame counts beyond u32::MAX saturate the divisor.
        Some(self.total / u32::try_from(self.frames).unwrap_or(u32::MAX))
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        match (self.min(), self.average(), self.max()) {
            (Some(min), Some(avg), Some(max)) => write!(
                f,
                "{} frames, min {:.3} ms, avg {:.3} ms, max {:.3} ms",
                self.frames,
                ms(min),
                ms(avg),
                ms(max)
            ),
            _ => write!(f, "no frames"),
        }
    }
}
