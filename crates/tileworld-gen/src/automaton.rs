//! Cellular-automaton smoothing of a terrain grid.
//!
//! Updates are synchronous: every iteration reads only the previous
//! iteration's grid and writes a fresh one. The 8-cell neighborhood wraps
//! at both edges.
//!
//! Only ocean, mountain and forest propagate or persist through these rules.
//! Plain never spreads; it is only ever replaced by an ocean majority.

use tileworld_common::{GenResult, TerrainKind, TilePos};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::grid::{Grid, TerrainGrid};

/// Iterations used when composing a world.
pub const DEFAULT_ITERATIONS: u32 = 5;

/// Ocean neighbors that turn any cell into ocean.
pub const OCEAN_INVASION: usize = 5;
/// Mountain neighbors that keep a mountain cell.
pub const MOUNTAIN_SURVIVAL: usize = 3;
/// Forest neighbors that keep a forest cell.
pub const FOREST_SURVIVAL: usize = 4;

const OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The eight toroidal neighbors of `pos`.
#[must_use]
pub fn neighbors<T>(grid: &Grid<T>, pos: TilePos) -> [TilePos; 8] {
    OFFSETS.map(|(dx, dy)| pos.wrapping_offset(dx, dy, grid.width(), grid.height()))
}

/// Next state of a single cell.
fn next_state(grid: &TerrainGrid, pos: TilePos) -> TerrainKind {
    let around = neighbors(grid, pos);
    let count = |kind: TerrainKind| around.iter().filter(|&&p| grid[p] == kind).count();
    let current = grid[pos];

    if count(TerrainKind::Ocean) >= OCEAN_INVASION {
        TerrainKind::Ocean
    } else if current == TerrainKind::Mountain && count(TerrainKind::Mountain) >= MOUNTAIN_SURVIVAL {
        TerrainKind::Mountain
    } else if current == TerrainKind::Forest && count(TerrainKind::Forest) >= FOREST_SURVIVAL {
        TerrainKind::Forest
    } else {
        current
    }
}

/// One synchronous iteration.
#[must_use]
pub fn step(grid: &TerrainGrid) -> TerrainGrid {
    grid.map_positions(|pos| next_state(grid, pos))
}

/// Runs `iterations` synchronous iterations.
#[must_use]
pub fn smooth(grid: TerrainGrid, iterations: u32) -> TerrainGrid {
    (0..iterations).fold(grid, |current, _| step(&current))
}

/// Like [`smooth`], checking `cancel` before each iteration.
pub fn smooth_cancellable(
    mut grid: TerrainGrid,
    iterations: u32,
    cancel: &CancelToken,
) -> GenResult<TerrainGrid> {
    for iteration in 0..iterations {
        cancel.check()?;
        grid = step(&grid);
        debug!(iteration, ocean = grid.count(TerrainKind::Ocean), "Smoothing iteration");
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use TerrainKind::{Forest, Mountain, Ocean, Plain};

    fn grid_from_rows(rows: &[&[TerrainKind]]) -> TerrainGrid {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        Grid::from_cells(width, height, rows.concat()).expect("valid dims")
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let grid = grid_from_rows(&[&[Ocean, Plain, Forest], &[Mountain, Plain, Ocean]]);
        assert_eq!(smooth(grid.clone(), 0), grid);
    }

    #[test]
    fn test_all_ocean_is_fixed_point() {
        let grid = Grid::new(6, 4, Ocean).expect("valid dims");
        for iterations in [0, 1, 5, 12] {
            assert_eq!(smooth(grid.clone(), iterations), grid);
        }
    }

    #[test]
    fn test_all_mountain_is_fixed_point() {
        let grid = Grid::new(10, 10, Mountain).expect("valid dims");
        assert_eq!(smooth(grid.clone(), DEFAULT_ITERATIONS), grid);
    }

    #[test]
    fn test_neighbors_wrap_at_origin() {
        let grid = Grid::new(5, 4, Plain).expect("valid dims");
        let around = neighbors(&grid, TilePos::new(0, 0));
        assert!(around.contains(&TilePos::new(4, 3)));
        assert!(around.contains(&TilePos::new(4, 0)));
        assert!(around.contains(&TilePos::new(0, 3)));
        assert!(!around.contains(&TilePos::new(0, 0)));
    }

    #[test]
    fn test_ocean_invades_through_wraparound() {
        // (0,0) sees five ocean cells only by wrapping to the far column and row.
        let mut grid = Grid::new(4, 4, Plain).expect("valid dims");
        for pos in [(3, 3), (3, 0), (3, 1), (0, 3), (1, 3)] {
            grid.set(TilePos::new(pos.0, pos.1), Ocean);
        }
        let next = step(&grid);
        assert_eq!(next[TilePos::new(0, 0)], Ocean);
    }

    #[test]
    fn test_update_is_synchronous() {
        // (2,1) has five ocean neighbors and converts. (2,2) has four and must
        // not see (2,1)'s conversion within the same iteration.
        let mut grid = Grid::new(5, 5, Plain).expect("valid dims");
        for pos in [(1, 0), (2, 0), (3, 0), (1, 1), (3, 1), (1, 2), (3, 2)] {
            grid.set(TilePos::new(pos.0, pos.1), Ocean);
        }
        let next = step(&grid);
        assert_eq!(next[TilePos::new(2, 1)], Ocean);
        assert_eq!(next[TilePos::new(2, 2)], Plain);
    }

    #[test]
    fn test_isolated_mountain_erodes_to_itself() {
        // Rule 4 keeps the current value when no rule matches.
        let mut grid = Grid::new(5, 5, Plain).expect("valid dims");
        grid.set(TilePos::new(2, 2), Mountain);
        let next = step(&grid);
        assert_eq!(next[TilePos::new(2, 2)], Mountain);
        assert_eq!(next.count(Mountain), 1);
    }

    #[test]
    fn test_plain_never_spreads() {
        let mut grid = Grid::new(5, 5, Forest).expect("valid dims");
        grid.set(TilePos::new(2, 2), Plain);
        grid.set(TilePos::new(2, 3), Plain);
        let next = smooth(grid, 3);
        assert_eq!(next.count(Plain), 2);
    }

    #[test]
    fn test_cancel_between_iterations() {
        let grid = Grid::new(3, 3, Plain).expect("valid dims");
        let cancel = CancelToken::new();
        assert!(smooth_cancellable(grid.clone(), 2, &cancel).is_ok());
        cancel.cancel();
        assert!(smooth_cancellable(grid.clone(), 2, &cancel).is_err());
        assert!(smooth_cancellable(grid, 0, &cancel).is_ok());
    }

    fn landscape() -> impl Strategy<Value = TerrainKind> {
        prop_oneof![Just(Ocean), Just(Mountain), Just(Forest), Just(Plain)]
    }

    proptest! {
        #[test]
        fn prop_plain_count_never_grows(cells in proptest::collection::vec(landscape(), 36)) {
            let grid = Grid::from_cells(6, 6, cells).expect("valid dims");
            let before = grid.count(Plain);
            let after = smooth(grid, DEFAULT_ITERATIONS).count(Plain);
            prop_assert!(after <= before);
        }
    }
}
