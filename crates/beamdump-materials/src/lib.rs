//! # Beam Dump Materials
//!
//! Material definitions for the beam dump geometry. All materials implement
//! the [`MaterialProperties`](properties::MaterialProperties) trait, which
//! exposes the name, density and state that the GDML writer and the viewer
//! need.
//!
//! ## Available sources
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | Geant4 NIST database | [`nist`] | Referenced by name, never redefined |
//! | Mass-fraction compounds | [`compound`] | Built from NIST components (e.g. TF1 lead glass) |

pub mod compound;
pub mod nist;
pub mod properties;

pub use compound::{lead_glass_tf1, CompoundMaterial};
pub use nist::NistMaterial;
pub use properties::{Material, MaterialError, MaterialProperties, State};
