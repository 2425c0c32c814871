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

//! Resize coalescing shared by the render systems.
//!
//! Window managers deliver bursts of resize events while the user drags a
//! border. Reconfiguring the swapchain for each one stalls the GPU, so a
//! resize is applied right away only when the surface has not been touched
//! recently; otherwise it is parked and applied once the size has been quiet
//! for `resize_debounce_ms`, after `resize_max_pending_frames` frames, or
//! once the same size has been reported several frames in a row.

use nova_core::renderer::RenderSettings;
use std::time::{Duration, Instant};

const IMMEDIATE_THRESHOLD: Duration = Duration::from_millis(80);
const EARLY_STABLE_THRESHOLD: Duration = Duration::from_millis(20);

/// Outcome of [`ResizeDebouncer::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDecision {
    /// Reconfigure now.
    Apply,
    /// Parked until [`ResizeDebouncer::poll`] says otherwise.
    Deferred,
    /// Zero-sized request; nothing to configure.
    Ignored,
}

#[derive(Debug, Default, Clone)]
pub struct ResizeDebouncer {
    last_resize_event: Option<Instant>,
    pending: bool,
    last_surface_config: Option<Instant>,
    pending_frames: u32,
    last_pending_size: Option<(u32, u32)>,
    stable_size_frame_count: u32,
}

impl ResizeDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resize to `width`x`height` observed at `now`.
    pub fn request(&mut self, width: u32, height: u32, now: Instant) -> ResizeDecision {
        if width == 0 || height == 0 {
            return ResizeDecision::Ignored;
        }

        if self.last_pending_size == Some((width, height)) {
            self.stable_size_frame_count = self.stable_size_frame_count.saturating_add(1);
        } else {
            self.stable_size_frame_count = 0;
        }
        self.last_pending_size = Some((width, height));

        let since_config = self.last_surface_config.map(|t| now.saturating_duration_since(t));
        let can_immediate = since_config.is_none_or(|d| d >= IMMEDIATE_THRESHOLD);
        let early_stable = self.stable_size_frame_count >= 2
            && since_config.is_none_or(|d| d >= EARLY_STABLE_THRESHOLD);

        if can_immediate || early_stable {
            return ResizeDecision::Apply;
        }

        self.last_resize_event = Some(now);
        self.pending = true;
        self.pending_frames = 0;
        ResizeDecision::Deferred
    }

    /// Called once per frame while a resize is parked. Returns `true` when
    /// the parked size should be applied now.
    pub fn poll(&mut self, settings: &RenderSettings, now: Instant) -> bool {
        if !self.pending {
            return false;
        }
        self.pending_frames = self.pending_frames.saturating_add(1);
        let quiet = self
            .last_resize_event
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::MAX);
        quiet >= Duration::from_millis(settings.resize_debounce_ms)
            || self.pending_frames >= settings.resize_max_pending_frames
            || self.stable_size_frame_count >= 3
    }

    /// The surface was configured at `now`.
    pub fn mark_configured(&mut self, now: Instant) {
        self.last_surface_config = Some(now);
        self.pending = false;
        self.pending_frames = 0;
        self.stable_size_frame_count = 0;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(debounce_ms: u64, max_frames: u32) -> RenderSettings {
        RenderSettings {
            resize_debounce_ms: debounce_ms,
            resize_max_pending_frames: max_frames,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_resize_applies_immediately() {
        let mut debouncer = ResizeDebouncer::new();
        assert_eq!(debouncer.request(800, 600, Instant::now()), ResizeDecision::Apply);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_zero_size_is_ignored() {
        let mut debouncer = ResizeDebouncer::new();
        assert_eq!(debouncer.request(0, 600, Instant::now()), ResizeDecision::Ignored);
        assert_eq!(debouncer.request(800, 0, Instant::now()), ResizeDecision::Ignored);
    }

    #[test]
    fn test_burst_is_deferred_until_quiet() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::new();
        debouncer.mark_configured(start);

        let t1 = start + Duration::from_millis(5);
        assert_eq!(debouncer.request(801, 600, t1), ResizeDecision::Deferred);
        assert!(debouncer.is_pending());

        let s = settings(120, 100);
        assert!(!debouncer.poll(&s, t1 + Duration::from_millis(10)));
        assert!(debouncer.poll(&s, t1 + Duration::from_millis(120)));

        debouncer.mark_configured(t1 + Duration::from_millis(120));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(&s, t1 + Duration::from_millis(500)));
    }

    #[test]
    fn test_pending_frame_cap_forces_apply() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::new();
        debouncer.mark_configured(start);
        debouncer.request(640, 480, start);

        let s = settings(10_000, 3);
        assert!(!debouncer.poll(&s, start));
        assert!(!debouncer.poll(&s, start));
        assert!(debouncer.poll(&s, start));
    }

    #[test]
    fn test_repeated_size_counts_as_stable() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::new();
        debouncer.mark_configured(start);
        let t = start + Duration::from_millis(1);
        assert_eq!(debouncer.request(640, 480, t), ResizeDecision::Deferred);
        assert_eq!(debouncer.request(640, 480, t), ResizeDecision::Deferred);
        // Third identical report after the short threshold goes through.
        let later = start + EARLY_STABLE_THRESHOLD;
        assert_eq!(debouncer.request(640, 480, later), ResizeDecision::Apply);
    }
}
