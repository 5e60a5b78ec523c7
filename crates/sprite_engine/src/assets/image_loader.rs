//! Image loading utilities for texture data.

use std::path::Path;

use crate::backend::{FilterMode, RenderBackend, TextureHandle, WrapMode};
use crate::render::RenderResult;

use super::AssetError;

/// Decoded RGBA pixel data ready for GPU upload.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw RGBA pixel data, row-major.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    /// Load an image from a file path and convert it to RGBA8.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("loading image from {path:?}");

        let img = image::open(path)
            .map_err(|e| AssetError::LoadFailed(format!("{}: {e}", path.display())))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("loaded {width}x{height} image from {path:?}");

        Ok(Self { data: rgba.into_raw(), width, height })
    }

    /// Decode an image from memory (embedded resources).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("in-memory image: {e}")))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self { data: rgba.into_raw(), width, height })
    }

    /// A single solid color, useful for placeholders and tests.
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity((width * height) as usize * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        Self { data, width, height }
    }

    /// Create a backend texture and upload this image's pixels into it.
    pub fn upload_to(
        &self,
        backend: &mut impl RenderBackend,
        wrap: WrapMode,
        filter: FilterMode,
    ) -> RenderResult<TextureHandle> {
        let texture = backend.create_texture(wrap, filter)?;
        backend.upload_texture_rgba(texture, self.width, self.height, &self.data);
        Ok(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    #[test]
    fn solid_color_fills_every_pixel() {
        let img = ImageData::solid_color(4, 2, [10, 20, 30, 255]);
        assert_eq!(img.data.len(), 4 * 2 * 4);
        assert_eq!(&img.data[..4], &[10, 20, 30, 255]);
        assert_eq!(&img.data[img.data.len() - 4..], &[10, 20, 30, 255]);
    }

    #[test]
    fn upload_creates_texture_with_image_dimensions() {
        let mut backend = HeadlessBackend::new(64, 64);
        let img = ImageData::solid_color(8, 16, [255, 255, 255, 255]);
        let texture = img
            .upload_to(&mut backend, WrapMode::ClampToEdge, FilterMode::Nearest)
            .unwrap();
        assert_eq!(backend.texture_size(texture), Some((8, 16)));
        assert_eq!(backend.stats().textures_created, 1);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = ImageData::from_bytes(&[0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, AssetError::LoadFailed(_)));
    }
}
