//! ZIG ZAG - procedural NFT art.
//!
//! Seeded generators compose draw lists for four visual styles, a small
//! raster canvas turns them into PNGs, and an HTTP service hands the
//! results out, mints them on chain and renders contract templates.

pub mod auth;
pub mod canvas;
pub mod config;
pub mod contract;
pub mod gallery;
pub mod generators;
pub mod metadata;
pub mod mint;
pub mod notify;
pub mod palette;
pub mod panel;
pub mod request;
pub mod server;

pub use config::ZigzagConfig;
pub use generators::{Generator, ProceduralGenerator};
pub use palette::PaletteKind;
pub use request::{Complexity, GenerationRequest, StyleKind};
