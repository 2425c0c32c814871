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

//! The window contract graphics backends render into.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;

/// Window and display handle access combined into one object-safe trait.
pub trait WindowHandle: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle> WindowHandle for T {}

/// Shared, thread-safe handle used by graphics backends to create surfaces.
pub type NovaWindowHandle = Arc<dyn WindowHandle + Send + Sync>;

/// Behavior every windowing backend provides to the engine.
pub trait NovaWindow: HasWindowHandle + HasDisplayHandle + Send + Sync {
    /// Physical size of the drawable area.
    fn inner_size(&self) -> (u32, u32);

    /// DPI scale factor.
    fn scale_factor(&self) -> f64;

    /// Asks the platform for another redraw.
    fn request_redraw(&self);

    /// A shareable handle for surface creation.
    fn clone_handle_arc(&self) -> NovaWindowHandle;

    /// Backend-specific identifier.
    fn id(&self) -> u64;

    /// `true` when the drawable area has no pixels (e.g. minimized).
    fn is_minimized(&self) -> bool {
        let (w, h) = self.inner_size();
        w == 0 || h == 0
    }
}
