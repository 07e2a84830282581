//! # Tileworld
//!
//! Generates one exterior tile world, an interior per house and the portals
//! between them, then persists everything to the configured world store.
//!
//! Store credentials come from `TILEWORLD_STORE_URL` and
//! `TILEWORLD_STORE_KEY`. On success a JSON summary is printed to stdout;
//! logs go to stderr.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("tileworld=info".parse()?))
        .init();

    let args = app::Args::parse();
    info!("Tileworld {}", env!("CARGO_PKG_VERSION"));

    let credentials = app::Credentials::from_env()?;
    let summary = app::run(&args, &credentials)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
