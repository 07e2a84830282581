//! Fixed-size 2D grids.

use std::collections::BTreeSet;
use std::ops::Index;

use tileworld_common::{GenError, GenResult, TerrainKind, TilePos};

/// Row-major `width` x `height` grid. Dimensions never change after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// Continuous values, normalized to `[0, 1]` once synthesized.
pub type ScalarField = Grid<f64>;

/// One terrain category per cell.
pub type TerrainGrid = Grid<TerrainKind>;

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `fill`.
    pub fn new(width: u32, height: u32, fill: T) -> GenResult<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
        })
    }

    /// Creates a grid by evaluating `f` for each position in row-major order.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(TilePos) -> T) -> GenResult<Self> {
        check_dimensions(width, height)?;
        let cells = (0..width as usize * height as usize)
            .map(|i| f(TilePos::from_index(i, width)))
            .collect();
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Wraps existing row-major cells.
    pub fn from_cells(width: u32, height: u32, cells: Vec<T>) -> GenResult<Self> {
        check_dimensions(width, height)?;
        if cells.len() != width as usize * height as usize {
            return Err(GenError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Sets a cell. Returns `false` if `pos` is outside the grid.
    pub fn set(&mut self, pos: TilePos, value: T) -> bool {
        if !self.contains(pos) {
            return false;
        }
        self.cells[pos.to_index(self.width)] = value;
        true
    }
}

impl<T> Grid<T> {
    /// Grid width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; grids have at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `pos` lies inside the grid.
    #[must_use]
    pub const fn contains(&self, pos: TilePos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Gets a cell.
    #[must_use]
    pub fn get(&self, pos: TilePos) -> Option<&T> {
        if self.contains(pos) {
            self.cells.get(pos.to_index(self.width))
        } else {
            None
        }
    }

    /// Returns a slice of all cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> {
        let width = self.width;
        (0..self.cells.len()).map(move |i| TilePos::from_index(i, width))
    }

    /// Builds a same-sized grid by evaluating `f` at every position.
    #[must_use]
    pub fn map_positions<U>(&self, f: impl FnMut(TilePos) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.positions().map(f).collect(),
        }
    }

    /// Whether two grids have the same dimensions.
    #[must_use]
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl<T> Index<TilePos> for Grid<T> {
    type Output = T;

    fn index(&self, pos: TilePos) -> &T {
        assert!(self.contains(pos), "{pos} outside {}x{} grid", self.width, self.height);
        &self.cells[pos.to_index(self.width)]
    }
}

impl ScalarField {
    /// Smallest and largest value.
    #[must_use]
    pub fn min_max(&self) -> (f64, f64) {
        self.cells
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

impl TerrainGrid {
    /// Number of cells of `kind`.
    #[must_use]
    pub fn count(&self, kind: TerrainKind) -> usize {
        self.cells.iter().filter(|&&k| k == kind).count()
    }

    /// Distinct kinds present in the grid.
    #[must_use]
    pub fn kinds(&self) -> BTreeSet<TerrainKind> {
        self.cells.iter().copied().collect()
    }
}

fn check_dimensions(width: u32, height: u32) -> GenResult<()> {
    if width == 0 || height == 0 {
        return Err(GenError::InvalidDimensions { width, height });
    }
    Ok(())
}
