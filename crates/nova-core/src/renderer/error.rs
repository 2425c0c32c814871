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

//! Error hierarchy of the rendering subsystem.
//!
//! `ShaderError` and `PipelineError` nest inside `ResourceError`, which nests
//! inside `RenderError` together with `FrameError`. Each level keeps the
//! lower one reachable through [`std::error::Error::source`].

use crate::renderer::api::pipeline::RenderPipelineId;
use crate::renderer::api::shader::ShaderModuleId;
use std::fmt;

/// Shader module creation or lookup failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// No module with this id.
    NotFound {
        /// The missing id.
        id: ShaderModuleId,
    },
    /// The module does not declare the requested entry point.
    InvalidEntryPoint {
        /// The module.
        id: ShaderModuleId,
        /// The entry point that was asked for.
        entry_point: String,
    },
    /// The backend rejected the source.
    CompilationError {
        /// The module label.
        label: String,
        /// Backend diagnostics.
        details: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::NotFound { id } => write!(f, "Shader module not found for ID: {id:?}"),
            ShaderError::InvalidEntryPoint { id, entry_point } => {
                write!(
                    f,
                    "Invalid entry point '{entry_point}' for shader module {id:?}"
                )
            }
            ShaderError::CompilationError { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// Render pipeline creation or lookup failed.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A stage references a module that does not exist.
    InvalidShaderModuleForPipeline {
        /// The module.
        id: ShaderModuleId,
        /// The pipeline label.
        pipeline_label: Option<String>,
    },
    /// No pipeline with this id.
    InvalidRenderPipeline {
        /// The missing id.
        id: RenderPipelineId,
    },
    /// A fragment module was given without an entry point.
    MissingEntryPointForFragmentShader {
        /// The pipeline label.
        pipeline_label: Option<String>,
        /// The fragment module.
        shader_id: ShaderModuleId,
    },
    /// The backend rejected the pipeline state.
    CompilationFailed {
        /// The pipeline label.
        label: Option<String>,
        /// Backend diagnostics.
        details: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidShaderModuleForPipeline { id, pipeline_label } => write!(
                f,
                "Invalid shader module {:?} for pipeline '{}'",
                id,
                pipeline_label.as_deref().unwrap_or("Unknown")
            ),
            PipelineError::InvalidRenderPipeline { id } => {
                write!(f, "Invalid render pipeline ID: {id:?}")
            }
            PipelineError::MissingEntryPointForFragmentShader {
                pipeline_label,
                shader_id,
            } => write!(
                f,
                "Missing entry point for fragment shader in pipeline '{}', shader ID: {:?}",
                pipeline_label.as_deref().unwrap_or("Unknown"),
                shader_id
            ),
            PipelineError::CompilationFailed { label, details } => write!(
                f,
                "Pipeline compilation failed for '{}': {}",
                label.as_deref().unwrap_or("Unknown"),
                details
            ),
        }
    }
}

impl std::error::Error for PipelineError {}

/// A GPU resource operation failed.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// Shader failure.
    Shader(ShaderError),
    /// Pipeline failure.
    Pipeline(PipelineError),
    /// No resource with the given id.
    NotFound,
    /// The id is of the wrong kind or already consumed.
    InvalidHandle,
    /// An access past the end of a resource.
    OutOfBounds,
    /// The descriptor is inconsistent.
    InvalidDescriptor(String),
    /// The backend reported an error.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::Pipeline(err) => write!(f, "Pipeline resource error: {err}"),
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::InvalidDescriptor(msg) => {
                write!(f, "Invalid resource descriptor: {msg}")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            ResourceError::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

impl From<PipelineError> for ResourceError {
    fn from(err: PipelineError) -> Self {
        ResourceError::Pipeline(err)
    }
}

/// Misuse of the begin / end / present protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// `begin_frame` while a frame is still recording or awaiting present.
    FrameInProgress,
    /// `end_frame` without a recording frame.
    NotRecording,
    /// `present` without a submitted frame.
    NotSubmitted,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::FrameInProgress => write!(f, "A frame is already in progress."),
            FrameError::NotRecording => write!(f, "No frame is being recorded."),
            FrameError::NotSubmitted => write!(f, "No submitted frame is waiting to be presented."),
        }
    }
}

impl std::error::Error for FrameError {}

/// Top-level error of the render system.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Used before `init`.
    NotInitialized,
    /// Backend initialization failed.
    InitializationFailed(String),
    /// The next swapchain image could not be acquired.
    SurfaceAcquisitionFailed(String),
    /// Encoding or submission failed.
    RenderingFailed(String),
    /// Resource failure.
    ResourceError(ResourceError),
    /// Frame protocol misuse.
    Frame(FrameError),
    /// The device is gone and must be recreated.
    DeviceLost,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => write!(f, "The rendering system is not initialized."),
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::SurfaceAcquisitionFailed(msg) => {
                write!(f, "Failed to acquire surface for rendering: {msg}")
            }
            RenderError::RenderingFailed(msg) => {
                write!(f, "A critical rendering operation failed: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::Frame(err) => write!(f, "Frame lifecycle error: {err}"),
            RenderError::DeviceLost => write!(
                f,
                "The graphics device was lost and needs to be reinitialized."
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            RenderError::Frame(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

impl From<FrameError> for RenderError {
    fn from(err: FrameError) -> Self {
        RenderError::Frame(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_shader_error_display() {
        let err = ShaderError::CompilationError {
            label: "Triangle".to_string(),
            details: "unexpected token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Shader compilation failed for 'Triangle': unexpected token"
        );
    }

    #[test]
    fn test_nested_errors_chain_sources() {
        let shader_err = ShaderError::NotFound {
            id: ShaderModuleId(7),
        };
        let render_err: RenderError = ResourceError::from(shader_err).into();
        assert_eq!(
            render_err.to_string(),
            "Graphics resource operation failed: Shader resource error: Shader module not found for ID: ShaderModuleId(7)"
        );
        let level1 = render_err.source().unwrap();
        assert!(level1.source().is_some());
    }

    #[test]
    fn test_pipeline_error_uses_unknown_label() {
        let err = PipelineError::MissingEntryPointForFragmentShader {
            pipeline_label: None,
            shader_id: ShaderModuleId(3),
        };
        assert!(err.to_string().contains("pipeline 'Unknown'"));
        let res: ResourceError = err.into();
        assert!(res.source().is_some());
    }

    #[test]
    fn test_frame_error_converts_into_render_error() {
        let err: RenderError = FrameError::FrameInProgress.into();
        assert_eq!(err, RenderError::Frame(FrameError::FrameInProgress));
        assert!(err.source().is_some());
    }
}
