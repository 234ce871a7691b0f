//! Direction and axis types for face and rotation handling.
//!
//! Each [`Direction`] carries the data the geometry compiler needs for a face:
//! the corner pair spanning the quad, the outward normal and the default UV
//! rectangle. Keeping this as data on the enum makes every face mapping
//! exhaustive at compile time.

use serde::{Deserialize, Serialize};

/// The six cardinal directions / face directions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

/// The two opposite corners of a face quad, in block space (0-16).
///
/// `first` is the top-left corner as seen from outside the face and `second`
/// the bottom-right one. `shares_first_z` picks which of the two z values the
/// remaining corners take (west and east faces run along z).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceCorners {
    pub first: [f32; 3],
    pub second: [f32; 3],
    pub shares_first_z: bool,
}

impl FaceCorners {
    /// The four quad corners in winding order: top-left, bottom-left,
    /// bottom-right, top-right.
    pub fn ring(&self) -> [[f32; 3]; 4] {
        let (a, b) = (self.first, self.second);
        let (left_z, right_z) = if self.shares_first_z {
            (a[2], b[2])
        } else {
            (b[2], a[2])
        };
        [
            a,
            [a[0], b[1], left_z],
            b,
            [b[0], a[1], right_z],
        ]
    }
}

impl Direction {
    /// All six directions in order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Get the normal vector for this direction.
    pub fn normal(&self) -> [f32; 3] {
        match self {
            Direction::Down => [0.0, -1.0, 0.0],
            Direction::Up => [0.0, 1.0, 0.0],
            Direction::North => [0.0, 0.0, -1.0],
            Direction::South => [0.0, 0.0, 1.0],
            Direction::West => [-1.0, 0.0, 0.0],
            Direction::East => [1.0, 0.0, 0.0],
        }
    }

    /// Get the axis this direction is on.
    pub fn axis(&self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Y,
            Direction::North | Direction::South => Axis::Z,
            Direction::West | Direction::East => Axis::X,
        }
    }

    /// Select the corner pair of an element's face.
    pub fn corners(&self, from: [f32; 3], to: [f32; 3]) -> FaceCorners {
        let [fx, fy, fz] = from;
        let [tx, ty, tz] = to;
        let (first, second, shares_first_z) = match self {
            Direction::Down => ([tx, fy, fz], [fx, fy, tz], false),
            Direction::Up => ([fx, ty, fz], [tx, ty, tz], false),
            Direction::North => ([tx, ty, fz], [fx, fy, fz], false),
            Direction::South => ([fx, ty, tz], [tx, fy, tz], false),
            Direction::West => ([fx, ty, fz], [fx, fy, tz], true),
            Direction::East => ([tx, ty, tz], [tx, fy, fz], true),
        };
        FaceCorners {
            first,
            second,
            shares_first_z,
        }
    }

    /// UV rectangle `[u0, v0, u1, v1]` (0-16) used when a face omits `uv`.
    pub fn default_uv(&self, from: [f32; 3], to: [f32; 3]) -> [f32; 4] {
        let [fx, fy, fz] = from;
        let [tx, ty, tz] = to;
        match self {
            Direction::Down => [tx, fz, fx, tz],
            Direction::Up => [fx, fz, tx, tz],
            Direction::North => [tx, 16.0 - ty, fx, 16.0 - fy],
            Direction::South => [fx, 16.0 - ty, tx, 16.0 - fy],
            Direction::West => [fz, 16.0 - ty, tz, 16.0 - fy],
            Direction::East => [tz, 16.0 - ty, fz, 16.0 - fy],
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "down" => Some(Direction::Down),
            "up" => Some(Direction::Up),
            "north" => Some(Direction::North),
            "south" => Some(Direction::South),
            "west" => Some(Direction::West),
            "east" => Some(Direction::East),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Down => write!(f, "down"),
            Direction::Up => write!(f, "up"),
            Direction::North => write!(f, "north"),
            Direction::South => write!(f, "south"),
            Direction::West => write!(f, "west"),
            Direction::East => write!(f, "east"),
        }
    }
}

/// The three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis in an `[x, y, z]` array.
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}
