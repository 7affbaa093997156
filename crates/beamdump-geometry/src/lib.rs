//! # Beam Dump Geometry
//!
//! Geometry handling for the beam dump model. This crate provides:
//!
//! - **Solids** ([`solids`]) — Boxes and tubes with GDML parameter
//!   conventions, point classification, surface sampling and wireframes.
//! - **Transformations** ([`transform`]) — Placements (rotation + position)
//!   and the affine transforms derived from them.
//! - **Registry** ([`registry`]) — Name-unique tables of constants,
//!   materials, solids, logical and physical volumes forming the
//!   geometry tree.
//! - **GDML output** ([`gdml`]) — Serialisation of a registry for Geant4
//!   and BDSIM.
//! - **Overlap checks** ([`overlaps`]) — Sampling-based detection of
//!   protruding daughters and overlapping siblings.
//!
//! All lengths are millimetres and all angles radians.

pub mod error;
pub mod gdml;
pub mod overlaps;
pub mod registry;
pub mod solids;
pub mod transform;

pub use error::GeometryError;
pub use registry::{LogicalId, MaterialId, PhysicalId, Registry, SolidId};
pub use solids::{Containment, Expr, Shape, Solid, SolidKind};
pub use transform::{Placement, Transform};
