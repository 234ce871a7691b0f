//! Transform types for placement and element rotations.

use super::Axis;
use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};

/// Element angles accepted by the model format.
pub const ELEMENT_ANGLES: [f32; 5] = [-45.0, -22.5, 0.0, 22.5, 45.0];

/// Placement-level transform from a blockstate entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementTransform {
    /// X rotation in degrees (multiple of 90).
    pub x: i32,
    /// Y rotation in degrees (multiple of 90).
    pub y: i32,
    /// If true, UV coordinates don't rotate with the block.
    pub uvlock: bool,
}

impl PlacementTransform {
    pub fn new(x: i32, y: i32, uvlock: bool) -> Self {
        Self { x, y, uvlock }
    }

    /// Check if this is an identity transform (no rotation).
    pub fn is_identity(&self) -> bool {
        quarter_turns(self.x) == 0 && quarter_turns(self.y) == 0
    }

    /// Reject rotations that are not multiples of 90 degrees.
    pub fn validate(&self) -> Result<()> {
        if self.x % 90 != 0 || self.y % 90 != 0 {
            return Err(CompileError::InvalidPlacement(format!(
                "rotation x={} y={} is not a multiple of 90",
                self.x, self.y
            )));
        }
        Ok(())
    }
}

/// Number of quarter turns (0-3) in a rotation of `degrees`.
pub fn quarter_turns(degrees: i32) -> usize {
    (((degrees / 90) % 4 + 4) % 4) as usize
}

/// Element-level rotation from model element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRotation {
    /// Origin point for rotation (in 0-16 Minecraft coordinates).
    #[serde(default = "default_origin")]
    pub origin: [f32; 3],
    /// Axis to rotate around.
    pub axis: Axis,
    /// Rotation angle in degrees (-45 to 45, in 22.5 increments).
    #[serde(default)]
    pub angle: f32,
    /// Whether to rescale the element after rotation.
    #[serde(default)]
    pub rescale: bool,
}

fn default_origin() -> [f32; 3] {
    [8.0, 8.0, 8.0]
}

impl ElementRotation {
    /// Origin in model-local space.
    pub fn local_origin(&self) -> [f32; 3] {
        to_local(self.origin)
    }

    /// Get the angle in radians.
    pub fn angle_radians(&self) -> f32 {
        self.angle.to_radians()
    }

    /// Get the rescale factor for this rotation.
    /// When rescale is true, the element is scaled to maintain its original size.
    pub fn rescale_factor(&self) -> f32 {
        if self.rescale {
            1.0 / self.angle_radians().cos()
        } else {
            1.0
        }
    }

    /// Check the angle against the model format's allowed steps.
    pub fn validate(&self) -> Result<()> {
        if ELEMENT_ANGLES.iter().any(|a| (a - self.angle).abs() < 1e-4) {
            Ok(())
        } else {
            Err(CompileError::InvalidElement(format!(
                "rotation angle {} is not one of {:?}",
                self.angle, ELEMENT_ANGLES
            )))
        }
    }
}

/// Convert a block-space point (0-16) to model-local space: scaled to block
/// units and centred horizontally, with the base at y = 0.
pub fn to_local(point: [f32; 3]) -> [f32; 3] {
    [
        point[0] / 16.0 - 0.5,
        point[1] / 16.0,
        point[2] / 16.0 - 0.5,
    ]
}
