//! # sprite_engine
//!
//! A minimal 2D sprite renderer built around an immediate-mode draw API.
//! Callers request individual textured-quad draws and the engine packs them
//! into as few GPU submissions as possible: per-sprite attributes are staged
//! into a shared vertex buffer, and a pending batch is flushed as one indexed
//! draw call when the texture changes, the batch fills up, or the frame ends.
//!
//! The GPU itself sits behind the [`backend::RenderBackend`] trait. The crate
//! ships the recording [`backend::HeadlessBackend`] for tests and headless
//! runs; a native backend implements the same trait out of tree.
//!
//! ```
//! use sprite_engine::backend::{FilterMode, HeadlessBackend, RenderBackend, WrapMode};
//! use sprite_engine::render::BatchRenderer;
//!
//! let mut renderer = BatchRenderer::new(HeadlessBackend::new(640, 480)).unwrap();
//! let texture = renderer
//!     .backend_mut()
//!     .create_texture(WrapMode::ClampToEdge, FilterMode::Nearest)
//!     .unwrap();
//!
//! renderer.set_clear_color(0.227, 0.227, 0.227);
//! renderer.clear();
//! renderer.draw(texture, -16.0, 0.0, 32.0, 32.0, 0.0, 100.0, 100.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0);
//! renderer.flush();
//!
//! assert_eq!(renderer.backend().stats().draw_calls, 1);
//! ```

pub mod assets;
pub mod backend;
pub mod config;
pub mod render;

pub use backend::{HeadlessBackend, RenderBackend, TextureHandle};
pub use render::{BatchRenderer, RenderError, RenderResult};
