//! Probabilistic placement of point features.

use fastrand::Rng;
use tileworld_common::{TerrainKind, TilePos};

use crate::grid::TerrainGrid;

/// Chance of a house on each plain cell.
pub const HOUSE_PROBABILITY: f64 = 0.05;

/// Chance of a storage chest on each eligible interior border cell.
pub const STORAGE_PROBABILITY: f64 = 0.1;

/// Scatters `feature` over the whole grid in one row-major pass.
///
/// See [`scatter_at`].
pub fn scatter(
    grid: &mut TerrainGrid,
    feature: TerrainKind,
    eligible: &[TerrainKind],
    probability: f64,
    rng: &mut Rng,
) -> Vec<TilePos> {
    let cells: Vec<TilePos> = grid.positions().collect();
    scatter_at(grid, cells, feature, eligible, probability, rng)
}

/// Visits `cells` in order. Every cell whose current kind is in `eligible`
/// consumes one uniform draw and becomes `feature` when the draw is below
/// `probability`. Ineligible or out-of-grid cells consume no draw and are
/// never touched.
///
/// Returns the converted positions in visiting order.
pub fn scatter_at(
    grid: &mut TerrainGrid,
    cells: impl IntoIterator<Item = TilePos>,
    feature: TerrainKind,
    eligible: &[TerrainKind],
    probability: f64,
    rng: &mut Rng,
) -> Vec<TilePos> {
    let mut placed = Vec::new();
    for pos in cells {
        let Some(&current) = grid.get(pos) else {
            continue;
        };
        if !eligible.contains(&current) {
            continue;
        }
        if rng.f64() < probability {
            grid.set(pos, feature);
            placed.push(pos);
        }
    }
    placed
}
