//! Sprite rendering: shader program builder, staging buffer, and the
//! batching renderer.

mod batch;
mod error;
mod program;
mod staging;

pub mod shaders;

#[cfg(test)]
mod batch_tests;

pub use batch::{pack_rgba, BatchRenderer};
pub use error::{RenderError, RenderResult};
pub use program::ShaderProgram;
pub use staging::{
    QuadAttributes, StagingBuffer, INDICES_PER_QUAD, MAX_BATCH_QUADS, VERTEX_STRIDE_BYTES,
    VERTEX_STRIDE_WORDS, VERTICES_PER_QUAD,
};
