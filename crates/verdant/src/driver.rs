//! # Frame Driver
//!
//! Polls the anchor, steps the world, keeps time. One call to
//! [`FrameDriver::frame`] is one rendered frame in a real client.

use std::time::{Duration, Instant};

use tracing::{debug, warn};
use verdant_procedural::{FrameReport, Window, World, WorldStats};

use crate::anchor::ScriptedAnchor;

/// Target frame time for 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Maximum allowed frame time before warning.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(33);

/// Outcome of [`FrameDriver::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Frames stepped by this run.
    pub frames: u64,
    /// Anchor x after the last frame.
    pub anchor_x: f32,
    /// Window after the last frame.
    pub window: Window,
    /// Live entities after the last frame.
    pub entities: usize,
    /// World totals since creation.
    pub stats: WorldStats,
    /// Mean wall time per frame.
    pub mean_frame: Duration,
    /// Slowest frame.
    pub max_frame: Duration,
    /// Frames slower than [`MAX_FRAME_TIME`].
    pub slow_frames: u64,
}

/// Steps a [`World`] once per frame around a [`ScriptedAnchor`].
#[derive(Debug)]
pub struct FrameDriver {
    world: World,
    anchor: ScriptedAnchor,
    /// Simulated seconds per frame.
    dt: f32,
    frame: u64,
}

impl FrameDriver {
    /// Creates a driver with a fixed time step.
    #[must_use]
    pub fn new(world: World, anchor: ScriptedAnchor, dt: f32) -> Self {
        Self {
            world,
            anchor,
            dt,
            frame: 0,
        }
    }

    /// Runs one frame.
    pub fn frame(&mut self) -> FrameReport {
        let anchor_x = self.anchor.advance(self.dt);
        let report = self.world.step(self.dt, anchor_x);
        self.frame += 1;

        if report.tick.changed() {
            debug!(
                frame = self.frame,
                anchor_x,
                min_x = self.world.window().min_x,
                max_x = self.world.window().max_x,
                "window moved"
            );
        }
        report
    }

    /// Runs `frames` frames and summarizes them.
    pub fn run(&mut self, frames: u64) -> RunSummary {
        let mut total = Duration::ZERO;
        let mut max_frame = Duration::ZERO;
        let mut slow_frames = 0;

        for _ in 0..frames {
            let start = Instant::now();
            self.frame();
            let elapsed = start.elapsed();

            if elapsed > MAX_FRAME_TIME {
                slow_frames += 1;
                warn!(frame = self.frame, elapsed_us = elapsed.as_micros() as u64, "slow frame");
            }
            total += elapsed;
            max_frame = max_frame.max(elapsed);
        }

        let mean_frame = u32::try_from(frames)
            .ok()
            .filter(|&n| n > 0)
            .map_or(Duration::ZERO, |n| total / n);

        RunSummary {
            frames,
            anchor_x: self.anchor.x(),
            window: self.world.window(),
            entities: self.world.scene().len(),
            stats: self.world.stats(),
            mean_frame,
            max_frame,
            slow_frames,
        }
    }

    /// Frames stepped so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// The world being driven.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The observer.
    #[must_use]
    pub fn anchor(&self) -> &ScriptedAnchor {
        &self.anchor
    }

    /// Simulated seconds per frame.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_procedural::WorldConfig;

    fn small_world() -> World {
        let mut config = WorldConfig::default();
        config.window.half_width = 1200.0;
        config.window.lookahead = Some(400.0);
        World::new(config).unwrap()
    }

    #[test]
    fn test_idle_run_keeps_window() {
        let world = small_world();
        let window = world.window();
        let mut driver = FrameDriver::new(world, ScriptedAnchor::from_speed(0.0, None), 1.0 / 60.0);

        let summary = driver.run(30);

        assert_eq!(summary.frames, 30);
        assert_eq!(driver.frames(), 30);
        assert_eq!(summary.window, window);
        assert_eq!(summary.stats.window_changes, 0);
        assert_eq!(summary.anchor_x, 0.0);
    }

    #[test]
    fn test_walking_grows_window() {
        let mut driver = FrameDriver::new(small_world(), ScriptedAnchor::from_speed(600.0, None), 0.5);

        let summary = driver.run(20);

        assert_eq!(summary.anchor_x, 6000.0);
        assert!(summary.window.contains(6000.0));
        assert!(summary.stats.window_changes > 0);
        assert!(summary.stats.columns_generated > 0);
    }

    #[test]
    fn test_zero_frames() {
        let mut driver = FrameDriver::new(small_world(), ScriptedAnchor::from_speed(10.0, None), 0.1);
        let summary = driver.run(0);

        assert_eq!(summary.frames, 0);
        assert_eq!(summary.mean_frame, Duration::ZERO);
        assert_eq!(summary.slow_frames, 0);
    }
}
