//! Texture atlas packing using first-fit placement on an occupancy grid.

use super::{AtlasRegion, TextureAtlas, TextureHandle};
use crate::assets::TextureData;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A texture that could not be placed in the atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackMiss {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Side of the atlas it did not fit into.
    pub atlas_side: u32,
}

impl std::fmt::Display for PackMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}x{}) does not fit in a {}x{} atlas",
            self.name, self.width, self.height, self.atlas_side, self.atlas_side
        )
    }
}

/// The outcome of packing: the atlas plus every texture left out of it.
#[derive(Debug)]
pub struct PackResult {
    pub atlas: TextureAtlas,
    pub misses: Vec<PackMiss>,
}

/// Collects textures and packs them into one square atlas.
pub struct AtlasPacker {
    max_size: u32,
    textures: Vec<(String, TextureData)>,
}

impl AtlasPacker {
    /// Create a packer whose atlas side never exceeds `max_size`
    /// (rounded down to a power of two).
    pub fn new(max_size: u32) -> Self {
        Self {
            max_size,
            textures: Vec::new(),
        }
    }

    /// Add a texture to the atlas. Textures taller than wide are cropped to
    /// their first square frame.
    pub fn add_texture(&mut self, name: impl Into<String>, texture: &TextureData) {
        self.textures.push((name.into(), texture.square_crop()));
    }

    /// Pack all added textures.
    ///
    /// The atlas side is the smallest power of two holding both the total
    /// texture area and the largest texture, capped at the maximum size.
    /// Textures are placed largest first (ties by name); each goes to the
    /// first free position scanning rows top to bottom, and columns left to
    /// right within a row.
    pub fn pack(mut self) -> PackResult {
        self.textures.sort_by(by_area_then_name);

        let total_area: u64 = self.textures.iter().map(|(_, t)| t.area()).sum();
        let max_dim = self
            .textures
            .iter()
            .map(|(_, t)| t.width.max(t.height))
            .max()
            .unwrap_or(1);

        let wanted = (ceil_sqrt(total_area).max(max_dim as u64).clamp(1, u32::MAX as u64) as u32)
            .checked_next_power_of_two()
            .unwrap_or(u32::MAX);
        let cap = power_of_two_floor(self.max_size);
        let side = if wanted > cap {
            log::warn!(
                "Atlas needs {}x{} but is capped at {}x{}",
                wanted,
                wanted,
                cap,
                cap
            );
            cap
        } else {
            wanted
        };

        log::debug!(
            "Packing {} textures ({} px total) into {}x{} atlas",
            self.textures.len(),
            total_area,
            side,
            side
        );

        let mut grid = OccupancyGrid::new(side);
        let mut pixels = vec![0u8; side as usize * side as usize * 4];
        let mut regions = Vec::with_capacity(self.textures.len());
        let mut handles = HashMap::with_capacity(self.textures.len());
        let mut misses = Vec::new();

        for (name, texture) in self.textures {
            let Some((x, y)) = grid.first_fit(texture.width, texture.height) else {
                let miss = PackMiss {
                    name,
                    width: texture.width,
                    height: texture.height,
                    atlas_side: side,
                };
                log::warn!("Missed texture {}", miss);
                misses.push(miss);
                continue;
            };

            grid.occupy(x, y, texture.width, texture.height);
            blit(&mut pixels, side, &texture, x, y);

            let region = AtlasRegion::from_pixels(x, y, texture.width, texture.height, side);
            handles.insert(name.clone(), TextureHandle(regions.len()));
            regions.push((name, region));
        }

        PackResult {
            atlas: TextureAtlas::from_parts(side, pixels, regions, handles),
            misses,
        }
    }
}

/// Pack a set of named textures in one call.
pub fn pack<'a, I>(textures: I, max_size: u32) -> PackResult
where
    I: IntoIterator<Item = (&'a str, &'a TextureData)>,
{
    let mut packer = AtlasPacker::new(max_size);
    for (name, texture) in textures {
        packer.add_texture(name, texture);
    }
    packer.pack()
}

fn by_area_then_name(a: &(String, TextureData), b: &(String, TextureData)) -> Ordering {
    b.1.area().cmp(&a.1.area()).then_with(|| a.0.cmp(&b.0))
}

fn ceil_sqrt(value: u64) -> u64 {
    let mut root = (value as f64).sqrt() as u64;
    while root * root < value {
        root += 1;
    }
    while root > 0 && (root - 1) * (root - 1) >= value {
        root -= 1;
    }
    root
}

fn power_of_two_floor(value: u32) -> u32 {
    if value <= 1 {
        1
    } else {
        1 << (31 - value.leading_zeros())
    }
}

/// Copy a texture's rows into the atlas unmodified.
fn blit(pixels: &mut [u8], side: u32, texture: &TextureData, x: u32, y: u32) {
    let row_bytes = texture.width as usize * 4;
    for row in 0..texture.height as usize {
        let src = row * row_bytes;
        let dst = ((y as usize + row) * side as usize + x as usize) * 4;
        if src + row_bytes <= texture.pixels.len() {
            pixels[dst..dst + row_bytes].copy_from_slice(&texture.pixels[src..src + row_bytes]);
        }
    }
}

/// One flag per atlas pixel, set once a texture covers it.
struct OccupancyGrid {
    side: u32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    fn new(side: u32) -> Self {
        Self {
            side,
            cells: vec![false; side as usize * side as usize],
        }
    }

    fn is_occupied(&self, x: u32, y: u32) -> bool {
        self.cells[y as usize * self.side as usize + x as usize]
    }

    /// Rightmost occupied column inside the footprint, if any.
    fn blocking_column(&self, x: u32, y: u32, width: u32, height: u32) -> Option<u32> {
        (x..x + width)
            .rev()
            .find(|&cx| (y..y + height).any(|cy| self.is_occupied(cx, cy)))
    }

    /// First free top-left position, rows outer and columns inner.
    fn first_fit(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width == 0 || height == 0 || width > self.side || height > self.side {
            return None;
        }

        for y in 0..=self.side - height {
            let mut x = 0;
            while x <= self.side - width {
                match self.blocking_column(x, y, width, height) {
                    // Every start up to the blocking column overlaps it too.
                    Some(column) => x = column + 1,
                    None => return Some((x, y)),
                }
            }
        }
        None
    }

    fn occupy(&mut self, x: u32, y: u32, width: u32, height: u32) {
        for cy in y..y + height {
            let start = cy as usize * self.side as usize + x as usize;
            self.cells[start..start + width as usize].fill(true);
        }
    }
}
