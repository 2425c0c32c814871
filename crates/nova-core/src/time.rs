// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wall-clock helpers: a stopwatch and the per-frame clock.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Measures time since it was started.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Starts a new stopwatch.
    #[inline]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since start.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time since start, in milliseconds.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Restarts and returns the time measured so far.
    pub fn restart(&mut self) -> Duration {
        let elapsed = self.elapsed();
        self.start = Instant::now();
        elapsed
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

const FPS_WINDOW: usize = 60;

/// Tracks frame delta time.
///
/// Deltas are clamped to `max_delta` so a long stall (debugger break, window
/// drag) does not hand the simulation one huge step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_tick: Option<Instant>,
    max_delta: f32,
    delta: f32,
    elapsed: f64,
    frame_count: u64,
    recent: VecDeque<f32>,
}

impl FrameClock {
    /// Default clamp for a single frame, in seconds.
    pub const DEFAULT_MAX_DELTA: f32 = 0.25;

    /// Creates a clock with the given delta clamp in seconds.
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_tick: None,
            max_delta: max_delta.max(0.0),
            delta: 0.0,
            elapsed: 0.0,
            frame_count: 0,
            recent: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    /// Advances using the wall clock and returns the clamped delta in seconds.
    ///
    /// The first tick returns zero.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        self.advance(raw)
    }

    /// Advances by an explicit duration, ignoring the wall clock.
    pub fn tick_with(&mut self, delta: Duration) -> f32 {
        self.advance(delta.as_secs_f32())
    }

    fn advance(&mut self, raw: f32) -> f32 {
        let delta = raw.clamp(0.0, self.max_delta);
        self.delta = delta;
        self.elapsed += delta as f64;
        self.frame_count += 1;
        if self.recent.len() == FPS_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(delta);
        delta
    }

    /// Last clamped delta, in seconds.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Sum of all clamped deltas, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of ticks so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The clamp applied to each delta.
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Average frames per second over the recent window, 0 before any time passed.
    pub fn fps(&self) -> f32 {
        let total: f32 = self.recent.iter().sum();
        if total <= 0.0 {
            0.0
        } else {
            self.recent.len() as f32 / total
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DELTA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_explicit_ticks_accumulate() {
        let mut clock = FrameClock::default();
        for _ in 0..4 {
            clock.tick_with(Duration::from_millis(16));
        }
        assert_eq!(clock.frame_count(), 4);
        assert_relative_eq!(clock.elapsed() as f32, 0.064, epsilon = 1e-5);
        assert_relative_eq!(clock.fps(), 62.5, epsilon = 1e-2);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut clock = FrameClock::new(0.1);
        assert_eq!(clock.tick_with(Duration::from_secs(3)), 0.1);
        assert_eq!(clock.delta(), 0.1);
    }

    #[test]
    fn test_first_wall_clock_tick_is_zero() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn test_stopwatch_restart_resets() {
        let mut sw = Stopwatch::new();
        std::thread::sleep(Duration::from_millis(2));
        assert!(sw.restart() >= Duration::from_millis(2));
        assert!(sw.elapsed() < Duration::from_secs(1));
    }
}
