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

//! GPU buffer descriptors and handles.

use crate::nova_bitflags;
use std::borrow::Cow;

nova_bitflags! {
    /// How a buffer may be used once created.
    ///
    /// Backends validate every binding against these flags, and drivers use
    /// them to pick a memory heap.
    pub struct BufferUsage: u32 {
        /// Mappable for CPU reads.
        const MAP_READ = 1 << 0;
        /// Mappable for CPU writes.
        const MAP_WRITE = 1 << 1;
        /// Source of a copy.
        const COPY_SRC = 1 << 2;
        /// Destination of a copy or a queue write.
        const COPY_DST = 1 << 3;
        /// Bindable as a vertex buffer.
        const VERTEX = 1 << 4;
        /// Bindable as an index buffer.
        const INDEX = 1 << 5;
        /// Bindable as a uniform buffer.
        const UNIFORM = 1 << 6;
        /// Bindable as a storage buffer.
        const STORAGE = 1 << 7;
    }
}

/// Parameters for [`GraphicsDevice::create_buffer`](crate::renderer::GraphicsDevice::create_buffer).
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// Debug label.
    pub label: Option<Cow<'a, str>>,
    /// Size in bytes.
    pub size: u64,
    /// Allowed usages.
    pub usage: BufferUsage,
    /// Create the buffer already mapped for CPU writes.
    pub mapped_at_creation: bool,
}

/// An opaque handle to a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);
