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

//! # Nova Core
//!
//! Foundational crate of the Nova engine: math primitives, timing, the event
//! bus, platform abstractions, and the rendering interface contracts that the
//! backends in `nova-infra` implement.

#![warn(missing_docs)]

pub mod event;
pub mod math;
pub mod platform;
pub mod renderer;
pub mod time;
pub mod utils;

pub use time::{FrameClock, Stopwatch};
