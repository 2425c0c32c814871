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

//! Shader modules.

use std::borrow::Cow;

/// Shader source handed verbatim to the backend.
#[derive(Debug, Clone)]
pub enum ShaderSourceData<'a> {
    /// WGSL text.
    Wgsl(Cow<'a, str>),
}

impl ShaderSourceData<'_> {
    /// `true` when the source contains no code at all.
    pub fn is_empty(&self) -> bool {
        match self {
            ShaderSourceData::Wgsl(src) => src.trim().is_empty(),
        }
    }
}

/// Parameters for creating a shader module.
#[derive(Debug, Clone)]
pub struct ShaderModuleDescriptor<'a> {
    /// Debug label.
    pub label: Option<&'a str>,
    /// The source.
    pub source: ShaderSourceData<'a>,
}

/// An opaque handle to a shader module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderModuleId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = r#"
        @vertex
        fn vs_main(@location(0) p: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(p, 1.0);
        }
        @fragment fn fs_main () -> @location(0) vec4<f32> { return vec4<f32>(1.0); }
    "#;

    #[test]
    fn test_blank_source_is_empty() {
        assert!(ShaderSourceData::Wgsl(Cow::Borrowed("  \n")).is_empty());
        assert!(!ShaderSourceData::Wgsl(Cow::Borrowed(SRC)).is_empty());
    }
}
