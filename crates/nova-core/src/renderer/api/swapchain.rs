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

//! Swapchain presentation settings.

use serde::{Deserialize, Serialize};

/// How finished frames are handed to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresentMode {
    /// No synchronization, may tear.
    Immediate,
    /// Latest frame wins at vblank, no tearing, no blocking.
    Mailbox,
    /// Queued presentation at vblank. Always supported.
    Fifo,
}

/// Number of swapchain images in rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SwapchainBuffering {
    /// Two images.
    Double,
    /// Three images.
    #[default]
    Triple,
}

impl SwapchainBuffering {
    /// Image count, which is also the number of frames in flight.
    pub const fn image_count(self) -> u32 {
        match self {
            SwapchainBuffering::Double => 2,
            SwapchainBuffering::Triple => 3,
        }
    }
}

/// Requested swapchain configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapchainConfig {
    /// Image rotation.
    pub buffering: SwapchainBuffering,
    /// Wait for vblank.
    pub vsync: bool,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for SwapchainConfig {
    fn default() -> Self {
        Self {
            buffering: SwapchainBuffering::Triple,
            vsync: true,
            width: 1280,
            height: 720,
        }
    }
}

impl SwapchainConfig {
    /// Picks a present mode among those the surface supports.
    ///
    /// Vsync always maps to `Fifo`. Without vsync `Mailbox` is preferred,
    /// then `Immediate`, then `Fifo`.
    pub fn preferred_present_mode(&self, supported: &[PresentMode]) -> PresentMode {
        if self.vsync {
            return PresentMode::Fifo;
        }
        [PresentMode::Mailbox, PresentMode::Immediate]
            .into_iter()
            .find(|mode| supported.contains(mode))
            .unwrap_or(PresentMode::Fifo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vsync_forces_fifo() {
        let cfg = SwapchainConfig::default();
        assert_eq!(
            cfg.preferred_present_mode(&[PresentMode::Mailbox, PresentMode::Fifo]),
            PresentMode::Fifo
        );
    }

    #[test]
    fn test_no_vsync_prefers_mailbox_then_immediate() {
        let cfg = SwapchainConfig {
            vsync: false,
            ..Default::default()
        };
        assert_eq!(
            cfg.preferred_present_mode(&[
                PresentMode::Fifo,
                PresentMode::Immediate,
                PresentMode::Mailbox
            ]),
            PresentMode::Mailbox
        );
        assert_eq!(
            cfg.preferred_present_mode(&[PresentMode::Fifo, PresentMode::Immediate]),
            PresentMode::Immediate
        );
        assert_eq!(
            cfg.preferred_present_mode(&[PresentMode::Fifo]),
            PresentMode::Fifo
        );
    }

    #[test]
    fn test_buffering_image_counts() {
        assert_eq!(SwapchainBuffering::Double.image_count(), 2);
        assert_eq!(SwapchainBuffering::Triple.image_count(), 3);
    }
}
