//! GUI panels for the beam dump viewer.

pub mod build;
pub mod materials;
pub mod view;
