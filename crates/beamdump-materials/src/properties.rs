//! Material property trait and the registry-facing material type.
//!
//! Predefined NIST materials and user compounds both implement
//! [`MaterialProperties`]; [`Material`] wraps either so a geometry registry
//! can store them side by side.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compound::CompoundMaterial;
use crate::nist::NistMaterial;

/// Errors from material lookup and compound validation.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Material not found: {name}. Valid identifiers: {valid}")]
    NotFound { name: String, valid: String },

    #[error("Compound '{name}' declares {declared} components but {message}")]
    ComponentCount {
        name: String,
        declared: usize,
        message: String,
    },

    #[error("Compound '{name}': mass fraction {fraction} of '{component}' must lie in (0, 1]")]
    InvalidFraction {
        name: String,
        component: String,
        fraction: f64,
    },

    #[error("Compound '{name}': mass fractions sum to {sum}, expected 1")]
    FractionSum { name: String, sum: f64 },

    #[error("Material '{name}': density {density} g/cm3 must be positive")]
    InvalidDensity { name: String, density: f64 },
}

/// Physical state written to the GDML `state` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Solid,
    Liquid,
    Gas,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Solid => "solid",
            State::Liquid => "liquid",
            State::Gas => "gas",
        }
    }
}

/// Bulk properties shared by every material kind.
pub trait MaterialProperties {
    /// Identifier used in GDML references.
    fn name(&self) -> &str;

    /// Mass density in g/cm³.
    fn density(&self) -> f64;

    /// Physical state.
    fn state(&self) -> State;
}

/// A material as stored in a geometry registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Material {
    /// A Geant4 NIST material, referenced by name only.
    Predefined(NistMaterial),
    /// A compound that must be defined in the GDML `<materials>` block.
    Compound(CompoundMaterial),
}

impl Material {
    /// Look up a predefined NIST material by name.
    pub fn predefined(name: &str) -> Result<Self, MaterialError> {
        Ok(Material::Predefined(crate::nist::lookup(name)?))
    }

    /// Whether this material needs an explicit definition in GDML.
    pub fn needs_definition(&self) -> bool {
        matches!(self, Material::Compound(_))
    }
}

impl MaterialProperties for Material {
    fn name(&self) -> &str {
        match self {
            Material::Predefined(m) => m.name(),
            Material::Compound(m) => m.name(),
        }
    }

    fn density(&self) -> f64 {
        match self {
            Material::Predefined(m) => m.density(),
            Material::Compound(m) => m.density(),
        }
    }

    fn state(&self) -> State {
        match self {
            Material::Predefined(m) => m.state(),
            Material::Compound(m) => m.state(),
        }
    }
}

impl From<NistMaterial> for Material {
    fn from(m: NistMaterial) -> Self {
        Material::Predefined(m)
    }
}

impl From<CompoundMaterial> for Material {
    fn from(m: CompoundMaterial) -> Self {
        Material::Compound(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_lookup_wraps_nist_entry() {
        let pb = Material::predefined("G4_Pb").unwrap();
        assert_eq!(pb.name(), "G4_Pb");
        assert_eq!(pb.state(), State::Solid);
        assert!(!pb.needs_definition());
    }

    #[test]
    fn test_unknown_material_lists_valid_ids() {
        let err = Material::predefined("G4_UNOBTAINIUM").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("G4_UNOBTAINIUM"));
        assert!(msg.contains("G4_Pb"));
    }

    #[test]
    fn test_compound_needs_definition() {
        let tf1: Material = crate::lead_glass_tf1().into();
        assert!(tf1.needs_definition());
        assert_eq!(tf1.name(), "TF1");
    }
}
