//! Texture atlas packing.
//!
//! This module combines block textures into a single square atlas and hands
//! out a [`TextureHandle`] per packed texture. The atlas is immutable once
//! packed; geometry refers to it only through handles and regions.

mod packer;

pub use packer::{pack, AtlasPacker, PackMiss, PackResult};

use crate::error::Result;
use image::ImageEncoder;
use std::collections::HashMap;

/// Index of a packed texture within its [`TextureAtlas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub usize);

/// A region within the texture atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    /// U coordinate of the left edge (0-1).
    pub u_min: f32,
    /// V coordinate of the top edge (0-1).
    pub v_min: f32,
    /// U coordinate of the right edge (0-1).
    pub u_max: f32,
    /// V coordinate of the bottom edge (0-1).
    pub v_max: f32,
    /// Pixel rectangle in the atlas.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRegion {
    /// Region of a `width x height` rect at `(x, y)` in an atlas of `side`.
    pub fn from_pixels(x: u32, y: u32, width: u32, height: u32, side: u32) -> Self {
        let side = side as f32;
        Self {
            u_min: x as f32 / side,
            v_min: y as f32 / side,
            u_max: (x + width) as f32 / side,
            v_max: (y + height) as f32 / side,
            x,
            y,
            width,
            height,
        }
    }

    /// Transform a local UV coordinate (0-1) to atlas coordinate.
    pub fn transform_uv(&self, u: f32, v: f32) -> [f32; 2] {
        [
            self.u_min + u * (self.u_max - self.u_min).abs(),
            self.v_min + v * (self.v_max - self.v_min).abs(),
        ]
    }
}

/// A packed texture atlas.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    side: u32,
    /// RGBA pixel data, `side * side * 4` bytes.
    pixels: Vec<u8>,
    regions: Vec<(String, AtlasRegion)>,
    handles: HashMap<String, TextureHandle>,
}

impl TextureAtlas {
    fn from_parts(
        side: u32,
        pixels: Vec<u8>,
        regions: Vec<(String, AtlasRegion)>,
        handles: HashMap<String, TextureHandle>,
    ) -> Self {
        Self {
            side,
            pixels,
            regions,
            handles,
        }
    }

    /// Side length in pixels (a power of two).
    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Handle of a packed texture by atlas key.
    pub fn handle(&self, name: &str) -> Option<TextureHandle> {
        self.handles.get(name).copied()
    }

    pub fn region(&self, handle: TextureHandle) -> Option<&AtlasRegion> {
        self.regions.get(handle.0).map(|(_, region)| region)
    }

    pub fn region_by_name(&self, name: &str) -> Option<&AtlasRegion> {
        self.handle(name).and_then(|handle| self.region(handle))
    }

    /// Texture name behind a handle.
    pub fn name(&self, handle: TextureHandle) -> Option<&str> {
        self.regions.get(handle.0).map(|(name, _)| name.as_str())
    }

    /// Packed textures in packing order.
    pub fn regions(&self) -> impl Iterator<Item = (&str, &AtlasRegion)> {
        self.regions.iter().map(|(name, region)| (name.as_str(), region))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize * self.side as usize) + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Export the atlas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);

        encoder.write_image(
            &self.pixels,
            self.side,
            self.side,
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::texture::load_texture_from_bytes;
    use crate::assets::TextureData;

    #[test]
    fn test_atlas_region_transform() {
        let region = AtlasRegion::from_pixels(16, 32, 16, 16, 64);
        assert_eq!(region.u_min, 0.25);
        assert_eq!(region.v_max, 0.75);

        let [u, v] = region.transform_uv(0.0, 0.0);
        assert!((u - 0.25).abs() < 0.001);
        assert!((v - 0.5).abs() < 0.001);

        let [u, v] = region.transform_uv(1.0, 1.0);
        assert!((u - 0.5).abs() < 0.001);
        assert!((v - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_handles_and_names() {
        let red = TextureData::solid(16, 16, [255, 0, 0, 255]);
        let atlas = pack([("red", &red)], 1024).atlas;

        let handle = atlas.handle("red").unwrap();
        assert_eq!(atlas.name(handle), Some("red"));
        assert_eq!(atlas.region(handle), atlas.region_by_name("red"));
        assert!(atlas.region(TextureHandle(5)).is_none());
        assert_eq!(atlas.regions().count(), 1);
    }

    #[test]
    fn test_png_round_trip() {
        let green = TextureData::solid(8, 8, [0, 255, 0, 255]);
        let atlas = pack([("green", &green)], 1024).atlas;

        let decoded = load_texture_from_bytes(&atlas.to_png().unwrap()).unwrap();
        assert_eq!((decoded.width, decoded.height), (8, 8));
        assert_eq!(decoded.pixels, atlas.pixels());
    }
}
