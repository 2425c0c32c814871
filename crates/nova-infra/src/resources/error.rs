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

use nova_core::renderer::ResourceError;
use std::fmt;
use std::path::PathBuf;

/// Loading an asset into a library failed.
#[derive(Debug)]
pub enum AssetError {
    /// The file could not be read.
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },
    /// The bytes are not a usable image.
    Decode {
        /// Library name of the asset.
        name: String,
        /// Decoder diagnostics.
        details: String,
    },
    /// The device refused to create the resource.
    Resource(ResourceError),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io { path, source } => {
                write!(f, "Failed to read asset '{}': {source}", path.display())
            }
            AssetError::Decode { name, details } => {
                write!(f, "Failed to decode asset '{name}': {details}")
            }
            AssetError::Resource(err) => write!(f, "Asset resource error: {err}"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            AssetError::Resource(err) => Some(err),
            AssetError::Decode { .. } => None,
        }
    }
}

impl From<ResourceError> for AssetError {
    fn from(err: ResourceError) -> Self {
        AssetError::Resource(err)
    }
}
