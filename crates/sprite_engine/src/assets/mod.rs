//! Asset loading: image decoding and texture upload glue.
//!
//! The renderer core only consumes ready-to-bind texture handles; this module
//! is the peripheral that produces them from image files or raw pixels.

mod image_loader;

pub use image_loader::ImageData;

use thiserror::Error;

/// Asset loading errors.
#[derive(Error, Debug)]
pub enum AssetError {
    /// An asset could not be read or decoded.
    #[error("asset load failed: {0}")]
    LoadFailed(String),
}
