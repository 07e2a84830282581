//! # Tileworld Gen
//!
//! Procedural generation of tile-based worlds.
//!
//! The pipeline runs in this order:
//! - [`noise`]: multi-octave scalar fields for elevation and moisture
//! - [`biome`]: per-cell terrain classification
//! - [`automaton`]: toroidal cellular-automaton smoothing
//! - [`features`]: probabilistic point features (houses, storage chests)
//! - [`interior`]: one small enclosed map per house
//! - [`portal`]: exterior house <-> interior door links
//!
//! [`compose`] drives the whole pipeline against a
//! [`tileworld_store::WorldStore`] and rolls back on failure.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod automaton;
pub mod biome;
pub mod cancel;
pub mod compose;
pub mod features;
pub mod grid;
pub mod interior;
pub mod noise;
pub mod portal;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::automaton::{smooth, smooth_cancellable};
    pub use crate::biome::{classify, classify_fields};
    pub use crate::cancel::CancelToken;
    pub use crate::compose::*;
    pub use crate::features::{scatter, scatter_at};
    pub use crate::grid::*;
    pub use crate::interior::InteriorBuilder;
    pub use crate::noise::NoiseFieldGenerator;
    pub use crate::portal::*;
    pub use crate::world::*;
}

pub use prelude::*;
