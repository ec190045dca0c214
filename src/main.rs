// src/main.rs

use softframe::{
    config::CONFIG,
    display::{DisplayDriver, DisplayEvent},
    instrument::{self, FrameStats},
    Color, NamedColor, Rect, RenderContext,
};

use anyhow::Context;
use log::{error, info};
use std::time::{Duration, Instant};

/// Picks the windowing backend compiled into this build.
fn make_driver() -> anyhow::Result<Box<dyn DisplayDriver>> {
    #[cfg(feature = "x11")]
    {
        let driver = softframe::display::X11DisplayDriver::new()
            .context("Failed to connect to the X server")?;
        Ok(Box::new(driver))
    }
    #[cfg(not(feature = "x11"))]
    {
        info!("No windowing backend compiled in; presenting to a headless surface");
        let driver = softframe::display::HeadlessDisplayDriver::new()?;
        Ok(Box::new(driver))
    }
}

/// One frame of the demo scene: a pixel, a filled rect and a line.
fn draw_scene(ctx: &mut RenderContext) -> Result<(), softframe::DrawError> {
    ctx.clear()?;
    ctx.draw_pixel(100, 100, NamedColor::Red.to_color())?;
    ctx.draw_rect(Rect::new(10, 10, 30, 30), NamedColor::Green.to_color())?;
    ctx.draw_line(
        Rect::point(350, 80),
        Rect::point(200, 400),
        NamedColor::Blue.to_color(),
    )?;
    // A translucent overlay, so the compositor has something to blend.
    ctx.draw_rect(Rect::new(20, 20, 40, 40), Color::new(255, 255, 255, 96))?;
    if let Some(radius) = CONFIG.render.blur_radius {
        ctx.blur(radius)?;
    }
    ctx.render()
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting softframe...");
    let window = &CONFIG.window;
    let run = &CONFIG.run;

    let mut ctx = RenderContext::create(&window.title, window.width, window.height, window.flags)
        .context("Failed to create render context")?;

    let driver = make_driver()?;
    if let Err(e) = ctx.initialize(driver) {
        error!("Failed to initialize display: {}", e);
        return Err(e).context("Failed to initialize render context");
    }
    ctx.set_clear_color(CONFIG.render.clear_color)
        .context("Failed to set clear color")?;

    // Without a window there is nothing to close, so a headless run stops by itself.
    let max_frames = if cfg!(feature = "x11") {
        run.max_frames
    } else {
        Some(run.max_frames.unwrap_or_else(|| {
            info!("Headless run without max_frames; rendering a single frame");
            1
        }))
    };

    let mut stats = FrameStats::new();
    info!("Starting render loop...");
    'frames: loop {
        if max_frames.is_some_and(|max| stats.frames() >= max) {
            info!("Rendered {} frames. Exiting render loop.", stats.frames());
            break;
        }

        for event in ctx.poll_events().context("Failed to poll events")? {
            if event == DisplayEvent::CloseRequested {
                info!("Close requested. Exiting render loop.");
                break 'frames;
            }
        }

        let start = Instant::now();
        match instrument::timed("frame", || draw_scene(&mut ctx)) {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                error!("Fatal render error: {}. Exiting.", e);
                return Err(e).context("Render loop failed");
            }
            Err(e) => error!("Frame {} failed: {}", stats.frames(), e),
        }
        stats.record(start.elapsed());
        if run.log_frame_timings {
            info!("Frame {}: {:?}", stats.frames(), start.elapsed());
        }

        std::thread::sleep(Duration::from_millis(run.frame_interval_ms));
    }

    info!("Frame stats: {}", stats);
    ctx.teardown().context("Failed to tear down render context")?;
    info!("softframe exited successfully.");
    Ok(())
}
