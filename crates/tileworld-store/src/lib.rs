//! # Tileworld Store
//!
//! Persistence for generated worlds.
//!
//! This crate provides:
//! - The [`WorldStore`] trait consumed by the generator
//! - Server, tile and portal record types
//! - An in-memory backend with failure injection
//! - A local filesystem backend

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod local;
pub mod memory;
pub mod records;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::backend::*;
    pub use crate::local::*;
    pub use crate::memory::*;
    pub use crate::records::*;
}

pub use prelude::*;
