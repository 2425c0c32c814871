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

//! Frame lifecycle bookkeeping shared by the render systems.
//!
//! A frame goes through `begin_frame` → `end_frame` → `present`. The
//! scheduler rotates over `frames_in_flight` slots, one per swapchain image,
//! and keeps the swapchain validity and surface availability flags that
//! decide whether a frame may start at all. It owns no GPU object: backends
//! translate its answers into surface reconfiguration and presentation.

use crate::renderer::api::SwapchainBuffering;
use crate::renderer::error::FrameError;

/// Where the scheduler is in the frame protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    /// No frame started.
    #[default]
    Idle,
    /// Between `begin_frame` and `end_frame`.
    Recording,
    /// Between `end_frame` and `present`.
    Submitted,
}

/// The frame handed out by a successful `begin_frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Per-frame resource slot, in `0..frames_in_flight`.
    pub slot: u32,
    /// Number of frames presented before this one.
    pub frame_number: u64,
}

/// Outcome of [`FrameScheduler::begin_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginFrame {
    /// Record into this frame.
    Ready(FrameInfo),
    /// Nothing can be drawn (minimized or zero-sized surface).
    Skipped,
    /// Recreate the swapchain, call `swapchain_recreated`, and try again.
    RecreateSwapchain,
}

/// A copy of the scheduler's observable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStatus {
    /// Protocol state.
    pub state: FrameState,
    /// Frames presented so far.
    pub frame_number: u64,
    /// Slot the next frame uses.
    pub current_slot: u32,
    /// Slot of the last presented frame.
    pub last_slot: Option<u32>,
    /// Slot count.
    pub frames_in_flight: u32,
    /// Whether the swapchain matches the surface.
    pub swapchain_valid: bool,
    /// Whether the surface can be drawn to.
    pub surface_available: bool,
}

/// Drives the begin / end / present protocol.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    frames_in_flight: u32,
    current_slot: u32,
    last_slot: Option<u32>,
    frame_number: u64,
    state: FrameState,
    swapchain_valid: bool,
    surface_available: bool,
    frames_presented: u64,
    frames_skipped: u64,
    swapchain_recreations: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(SwapchainBuffering::default())
    }
}

impl FrameScheduler {
    /// A scheduler with one slot per swapchain image. The swapchain starts valid.
    pub fn new(buffering: SwapchainBuffering) -> Self {
        Self {
            frames_in_flight: buffering.image_count(),
            current_slot: 0,
            last_slot: None,
            frame_number: 0,
            state: FrameState::Idle,
            swapchain_valid: true,
            surface_available: true,
            frames_presented: 0,
            frames_skipped: 0,
            swapchain_recreations: 0,
        }
    }

    /// Tries to start a frame.
    ///
    /// # Errors
    /// [`FrameError::FrameInProgress`] when the previous frame was not presented or aborted.
    pub fn begin_frame(&mut self) -> Result<BeginFrame, FrameError> {
        if !self.surface_available {
            self.frames_skipped += 1;
            log::trace!("FrameScheduler: surface unavailable, skipping frame");
            return Ok(BeginFrame::Skipped);
        }
        if !self.swapchain_valid {
            return Ok(BeginFrame::RecreateSwapchain);
        }
        if self.state != FrameState::Idle {
            return Err(FrameError::FrameInProgress);
        }
        self.state = FrameState::Recording;
        Ok(BeginFrame::Ready(FrameInfo {
            slot: self.current_slot,
            frame_number: self.frame_number,
        }))
    }

    /// Closes recording; the frame's commands have been submitted.
    pub fn end_frame(&mut self) -> Result<(), FrameError> {
        if self.state != FrameState::Recording {
            return Err(FrameError::NotRecording);
        }
        self.state = FrameState::Submitted;
        Ok(())
    }

    /// Completes the frame and advances to the next slot. Returns the presented frame.
    pub fn present(&mut self) -> Result<FrameInfo, FrameError> {
        if self.state != FrameState::Submitted {
            return Err(FrameError::NotSubmitted);
        }
        let presented = FrameInfo {
            slot: self.current_slot,
            frame_number: self.frame_number,
        };
        self.last_slot = Some(self.current_slot);
        self.current_slot = (self.current_slot + 1) % self.frames_in_flight;
        self.frame_number += 1;
        self.frames_presented += 1;
        self.state = FrameState::Idle;
        Ok(presented)
    }

    /// Drops the in-progress frame without advancing. Returns `false` when idle.
    pub fn abort_frame(&mut self) -> bool {
        if self.state == FrameState::Idle {
            return false;
        }
        log::debug!(
            "FrameScheduler: aborting frame {} in state {:?}",
            self.frame_number,
            self.state
        );
        self.state = FrameState::Idle;
        true
    }

    /// Marks the swapchain as out of date; the next `begin_frame` asks for recreation.
    pub fn invalidate_swapchain(&mut self) {
        self.swapchain_valid = false;
    }

    /// Acknowledges a swapchain recreation. Any in-progress frame is dropped.
    pub fn swapchain_recreated(&mut self) {
        if self.abort_frame() {
            log::warn!("FrameScheduler: swapchain recreated while a frame was in progress");
        }
        self.swapchain_valid = true;
        self.current_slot = 0;
        self.swapchain_recreations += 1;
    }

    /// Changes the slot count. The swapchain must be recreated afterwards.
    pub fn set_buffering(&mut self, buffering: SwapchainBuffering) {
        self.frames_in_flight = buffering.image_count();
        self.invalidate_swapchain();
    }

    /// Marks the surface as drawable or not.
    pub fn set_surface_available(&mut self, available: bool) {
        self.surface_available = available;
    }

    /// Current protocol state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Frames presented since creation.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// `begin_frame` calls answered with `Skipped`.
    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    /// `swapchain_recreated` calls.
    pub fn swapchain_recreations(&self) -> u64 {
        self.swapchain_recreations
    }

    /// Slot count.
    pub fn frames_in_flight(&self) -> u32 {
        self.frames_in_flight
    }

    /// Whether the swapchain is up to date.
    pub fn is_swapchain_valid(&self) -> bool {
        self.swapchain_valid
    }

    /// Whether the surface is drawable.
    pub fn is_surface_available(&self) -> bool {
        self.surface_available
    }

    /// Snapshot of the observable state.
    pub fn status(&self) -> FrameStatus {
        FrameStatus {
            state: self.state,
            frame_number: self.frame_number,
            current_slot: self.current_slot,
            last_slot: self.last_slot,
            frames_in_flight: self.frames_in_flight,
            swapchain_valid: self.swapchain_valid,
            surface_available: self.surface_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(scheduler: &mut FrameScheduler) -> FrameInfo {
        match scheduler.begin_frame() {
            Ok(BeginFrame::Ready(info)) => info,
            other => panic!("expected a ready frame, got {other:?}"),
        }
    }

    #[test]
    fn test_slots_rotate_over_frames_in_flight() {
        let mut s = FrameScheduler::new(SwapchainBuffering::Double);
        let mut slots = Vec::new();
        for _ in 0..5 {
            let info = ready(&mut s);
            slots.push(info.slot);
            s.end_frame().unwrap();
            s.present().unwrap();
        }
        assert_eq!(slots, vec![0, 1, 0, 1, 0]);
        assert_eq!(s.frames_presented(), 5);
        assert_eq!(s.status().last_slot, Some(0));
        assert_eq!(s.status().frame_number, 5);
    }

    #[test]
    fn test_begin_twice_is_rejected() {
        let mut s = FrameScheduler::default();
        ready(&mut s);
        assert_eq!(s.begin_frame(), Err(FrameError::FrameInProgress));
        s.end_frame().unwrap();
        assert_eq!(s.begin_frame(), Err(FrameError::FrameInProgress));
        s.present().unwrap();
        assert!(matches!(s.begin_frame(), Ok(BeginFrame::Ready(_))));
    }

    #[test]
    fn test_out_of_order_calls_are_errors() {
        let mut s = FrameScheduler::default();
        assert_eq!(s.end_frame(), Err(FrameError::NotRecording));
        assert_eq!(s.present(), Err(FrameError::NotSubmitted));
        ready(&mut s);
        assert_eq!(s.present(), Err(FrameError::NotSubmitted));
    }

    #[test]
    fn test_unavailable_surface_skips_and_counts() {
        let mut s = FrameScheduler::default();
        s.set_surface_available(false);
        assert_eq!(s.begin_frame(), Ok(BeginFrame::Skipped));
        assert_eq!(s.begin_frame(), Ok(BeginFrame::Skipped));
        assert_eq!(s.frames_skipped(), 2);
        assert_eq!(s.state(), FrameState::Idle);
        s.set_surface_available(true);
        assert_eq!(ready(&mut s).frame_number, 0);
    }

    #[test]
    fn test_invalid_swapchain_requests_recreation_and_resets_slot() {
        let mut s = FrameScheduler::new(SwapchainBuffering::Triple);
        ready(&mut s);
        s.end_frame().unwrap();
        s.present().unwrap();
        assert_eq!(s.status().current_slot, 1);

        s.invalidate_swapchain();
        assert_eq!(s.begin_frame(), Ok(BeginFrame::RecreateSwapchain));
        assert_eq!(s.state(), FrameState::Idle);
        s.swapchain_recreated();

        assert_eq!(s.swapchain_recreations(), 1);
        let info = ready(&mut s);
        assert_eq!(info.slot, 0);
        assert_eq!(info.frame_number, 1);
    }

    #[test]
    fn test_abort_returns_to_idle_without_advancing() {
        let mut s = FrameScheduler::default();
        assert!(!s.abort_frame());
        let first = ready(&mut s);
        assert!(s.abort_frame());
        let again = ready(&mut s);
        assert_eq!(first, again);
        assert_eq!(s.frames_presented(), 0);
    }

    #[test]
    fn test_changing_buffering_invalidates() {
        let mut s = FrameScheduler::new(SwapchainBuffering::Triple);
        s.set_buffering(SwapchainBuffering::Double);
        assert_eq!(s.frames_in_flight(), 2);
        assert!(!s.is_swapchain_valid());
    }
}
