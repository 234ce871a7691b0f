//! Texture loading and handling.

/// Raw texture data loaded from PNG.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a texture filled with one color.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixels = (0..width as usize * height as usize)
            .flat_map(|_| color)
            .collect();
        Self::new(width, height, pixels)
    }

    /// Crop to a `width x width` square from the top.
    ///
    /// Animated textures are vertical strips of square frames, so this keeps
    /// the first frame. Textures that are not taller than wide are returned
    /// unchanged.
    pub fn square_crop(&self) -> TextureData {
        if self.height <= self.width {
            return self.clone();
        }

        let frame_size = self.width as usize * self.width as usize * 4;
        Self {
            width: self.width,
            height: self.width,
            pixels: self.pixels[..frame_size.min(self.pixels.len())].to_vec(),
        }
    }

    /// Pixel area of the texture.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}

/// Load a texture from PNG bytes.
pub fn load_texture_from_bytes(data: &[u8]) -> Result<TextureData, image::ImageError> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(TextureData {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
