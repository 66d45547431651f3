//! Frame timing for [`crate::scene::Scene::tick`].
//!
//! The compositor only needs a `time` in seconds to drive oscillation,
//! breathing and twinkle. [`FrameClock`] supplies it either from the wall
//! clock ([`FrameClock::update`]) or from explicit steps
//! ([`FrameClock::advance`]) when frames are rendered offline.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! loop {
//!     let time = clock.update();
//!     scene.tick(progress, time, &mut sink)?;
//! }
//! ```

use std::time::{Duration, Instant};

/// Elapsed/delta time, frame counter and FPS estimate.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    elapsed: f32,
    delta: f32,
    frame: u64,
    fps: f32,
    fps_frames: u64,
    fps_since: Instant,
    fps_interval: Duration,
    paused: bool,
    fixed_delta: Option<f32>,
    time_scale: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            elapsed: 0.0,
            delta: 0.0,
            frame: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_since: now,
            fps_interval: Duration::from_millis(500),
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Clock that steps by `dt` on every [`update`](Self::update),
    /// regardless of wall time.
    pub fn fixed(dt: f32) -> Self {
        let mut clock = Self::new();
        clock.set_fixed_delta(Some(dt));
        clock
    }

    /// Advance from the wall clock (or the fixed delta). Returns the new
    /// elapsed time.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.step(self.fixed_delta.unwrap_or(raw));

        let since = now.duration_since(self.fps_since);
        if since >= self.fps_interval {
            self.fps = (self.frame - self.fps_frames) as f32 / since.as_secs_f32();
            self.fps_frames = self.frame;
            self.fps_since = now;
        }
        self.elapsed
    }

    /// Advance by exactly `dt` seconds (scaled), ignoring the wall clock.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.step(dt);
        self.elapsed
    }

    fn step(&mut self, dt: f32) {
        if self.paused {
            self.delta = 0.0;
            return;
        }
        self.delta = dt.max(0.0) * self.time_scale;
        self.elapsed += self.delta;
        self.frame += 1;
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Frames stepped so far (paused updates do not count).
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Wall-clock frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Freeze animation time. `delta()` reads 0 until resumed.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Negative scales clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn reset(&mut self) {
        *self = Self {
            fixed_delta: self.fixed_delta,
            time_scale: self.time_scale,
            ..Self::new()
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_paused());
        assert_eq!(clock.time_scale(), 1.0);
    }

    #[test]
    fn test_clock_update() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let elapsed = clock.update();
        assert!(elapsed > 0.0);
        assert!(clock.delta() > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_advance_is_exact() {
        let mut clock = FrameClock::new();
        clock.set_time_scale(2.0);
        clock.advance(0.25);
        clock.advance(0.25);
        assert_eq!(clock.elapsed(), 1.0);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut clock = FrameClock::fixed(0.1);
        clock.update();
        clock.pause();
        let before = clock.elapsed();
        clock.update();
        clock.advance(1.0);
        assert_eq!(clock.elapsed(), before);
        assert_eq!(clock.delta(), 0.0);
        clock.resume();
        clock.update();
        assert!(clock.elapsed() > before);
    }

    #[test]
    fn test_fixed_delta() {
        let mut clock = FrameClock::fixed(1.0 / 60.0);
        thread::sleep(Duration::from_millis(50));
        clock.update();
        assert!((clock.delta() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_negative_scale_clamps() {
        let mut clock = FrameClock::new();
        clock.set_time_scale(-1.0);
        assert_eq!(clock.time_scale(), 0.0);
    }

    #[test]
    fn test_reset_keeps_settings() {
        let mut clock = FrameClock::fixed(0.5);
        clock.set_time_scale(3.0);
        clock.update();
        clock.reset();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        clock.update();
        assert_eq!(clock.elapsed(), 1.5);
    }
}
