//! Terrain classification from elevation and moisture.

use tileworld_common::{GenError, GenResult, TerrainKind};

use crate::grid::{Grid, ScalarField, TerrainGrid};

/// Elevation below which a cell is ocean.
pub const OCEAN_BELOW: f64 = 0.3;
/// Elevation above which a cell is mountain.
pub const MOUNTAIN_ABOVE: f64 = 0.7;
/// Minimum elevation (exclusive) for forest.
pub const FOREST_ELEVATION_ABOVE: f64 = 0.4;
/// Minimum moisture (exclusive) for forest.
pub const FOREST_MOISTURE_ABOVE: f64 = 0.6;

/// Classifies one cell. First matching rule wins; all bounds are exclusive.
#[must_use]
pub fn classify(elevation: f64, moisture: f64) -> TerrainKind {
    if elevation < OCEAN_BELOW {
        TerrainKind::Ocean
    } else if elevation > MOUNTAIN_ABOVE {
        TerrainKind::Mountain
    } else if elevation > FOREST_ELEVATION_ABOVE && moisture > FOREST_MOISTURE_ABOVE {
        TerrainKind::Forest
    } else {
        TerrainKind::Plain
    }
}

/// Classifies every cell of two same-sized fields.
pub fn classify_fields(elevation: &ScalarField, moisture: &ScalarField) -> GenResult<TerrainGrid> {
    if !elevation.same_shape(moisture) {
        return Err(GenError::InvalidDimensions {
            width: moisture.width(),
            height: moisture.height(),
        });
    }
    let cells = elevation
        .cells()
        .iter()
        .zip(moisture.cells())
        .map(|(&e, &m)| classify(e, m))
        .collect();
    Grid::from_cells(elevation.width(), elevation.height(), cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ocean_bound_is_exclusive() {
        assert_eq!(classify(0.29, 1.0), TerrainKind::Ocean);
        assert_ne!(classify(0.3, 0.0), TerrainKind::Ocean);
        assert_ne!(classify(0.3, 1.0), TerrainKind::Ocean);
        assert_eq!(classify(0.30001, 0.0), TerrainKind::Plain);
    }

    #[test]
    fn test_mountain_bound_is_exclusive() {
        assert_ne!(classify(0.7, 0.0), TerrainKind::Mountain);
        assert_eq!(classify(0.70001, 0.0), TerrainKind::Mountain);
        assert_eq!(classify(0.9, 0.9), TerrainKind::Mountain);
    }

    #[test]
    fn test_forest_needs_elevation_and_moisture() {
        assert_eq!(classify(0.5, 0.61), TerrainKind::Forest);
        assert_eq!(classify(0.5, 0.5), TerrainKind::Plain);
        assert_eq!(classify(0.4, 0.9), TerrainKind::Plain);
        assert_eq!(classify(0.7, 0.6), TerrainKind::Plain);
    }

    #[test]
    fn test_classify_fields() {
        let elevation = Grid::from_cells(2, 1, vec![0.1, 0.8]).expect("valid dims");
        let moisture = Grid::from_cells(2, 1, vec![0.0, 0.0]).expect("valid dims");
        let grid = classify_fields(&elevation, &moisture).expect("same shape");
        assert_eq!(grid.cells(), &[TerrainKind::Ocean, TerrainKind::Mountain]);
    }

    #[test]
    fn test_classify_fields_shape_mismatch() {
        let elevation = Grid::new(2, 2, 0.5).expect("valid dims");
        let moisture = Grid::new(2, 3, 0.5).expect("valid dims");
        assert!(classify_fields(&elevation, &moisture).is_err());
    }

    proptest! {
        #[test]
        fn prop_classify_only_yields_landscape(e in 0.0f64..=1.0, m in 0.0f64..=1.0) {
            let kind = classify(e, m);
            prop_assert!(matches!(
                kind,
                TerrainKind::Ocean | TerrainKind::Mountain | TerrainKind::Forest | TerrainKind::Plain
            ));
            prop_assert_eq!(kind, classify(e, m));
        }
    }
}
