//! # Beam Dump Core
//!
//! The beam dump model itself: a world box containing two graphite window
//! cylinders, a stainless-steel pipe between them, an optional argon fill,
//! a ring of lead-glass calorimeter bars around the upstream window and a
//! lead absorber cube downstream.
//!
//! ## Modules
//!
//! - [`dimensions`] — Primitive inputs and the positions derived from them.
//! - [`toggles`] — Which components to build.
//! - [`builders`] — One make/place pair per component.
//! - [`model`] — Full assembly in the canonical order.
//! - [`config`] — TOML job files for the command-line tools.

pub mod builders;
pub mod config;
pub mod dimensions;
pub mod model;
pub mod toggles;

pub use dimensions::{DimensionError, DumpDimensions};
pub use model::{build_model, ModelError, ModelMaterials};
pub use toggles::BuildToggles;
