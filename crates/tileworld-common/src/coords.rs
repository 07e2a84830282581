//! Tile coordinates within a world grid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a single tile (column `x`, row `y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
}

impl TilePos {
    /// Creates a new tile position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Converts to a row-major index for a grid of the given width.
    #[must_use]
    pub const fn to_index(self, width: u32) -> usize {
        (self.y as usize) * (width as usize) + (self.x as usize)
    }

    /// Creates from a row-major index.
    #[must_use]
    pub const fn from_index(index: usize, width: u32) -> Self {
        let w = width as usize;
        Self {
            x: (index % w) as u32,
            y: (index / w) as u32,
        }
    }

    /// Offsets this position by `(dx, dy)`, wrapping at both axes.
    #[must_use]
    pub fn wrapping_offset(self, dx: i32, dy: i32, width: u32, height: u32) -> Self {
        let x = (i64::from(self.x) + i64::from(dx)).rem_euclid(i64::from(width));
        let y = (i64::from(self.y) + i64::from(dy)).rem_euclid(i64::from(height));
        Self::new(x as u32, y as u32)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_offset_at_origin() {
        let origin = TilePos::new(0, 0);
        assert_eq!(origin.wrapping_offset(-1, -1, 5, 4), TilePos::new(4, 3));
        assert_eq!(origin.wrapping_offset(-1, 0, 5, 4), TilePos::new(4, 0));
        assert_eq!(origin.wrapping_offset(0, -1, 5, 4), TilePos::new(0, 3));
    }

    #[test]
    fn test_wrapping_offset_at_far_corner() {
        let corner = TilePos::new(4, 3);
        assert_eq!(corner.wrapping_offset(1, 1, 5, 4), TilePos::new(0, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(TilePos::new(3, 9).to_string(), "(3, 9)");
    }
}
