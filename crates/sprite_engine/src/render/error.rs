//! Rendering error types.

use thiserror::Error;

use crate::backend::ShaderStage;

/// Errors raised while constructing a renderer.
///
/// All variants are construction-time failures and are fatal to renderer
/// initialization; no partially-initialized renderer is ever returned. The
/// steady-state draw/flush path is infallible: once a program, buffer, and
/// texture handle exist, using them is assumed to succeed.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A shader stage failed to compile.
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile {
        /// Stage that failed.
        stage: ShaderStage,
        /// Backend-reported diagnostic log.
        log: String,
    },

    /// The compiled stages failed to link into a program.
    #[error("shader program link failed: {log}")]
    ProgramLink {
        /// Backend-reported diagnostic log.
        log: String,
    },

    /// The backend refused a buffer or texture allocation.
    #[error("allocation failed: {0}")]
    Allocation(String),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
