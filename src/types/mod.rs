//! Shared types used throughout the library.

mod direction;
mod transform;

pub use direction::{Axis, Direction, FaceCorners};
pub use transform::{
    quarter_turns, to_local, ElementRotation, PlacementTransform, ELEMENT_ANGLES,
};

use std::collections::HashMap;

/// Block properties, e.g. `{"facing": "north"}`.
pub type BlockProperties = HashMap<String, String>;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Parse a `key=value` pair as used by variant keys and the CLI.
pub fn parse_property(s: &str) -> Option<(String, String)> {
    let (key, value) = s.split_once('=')?;
    Some((key.trim().to_string(), value.trim().to_string()))
}
