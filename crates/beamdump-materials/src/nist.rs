//! Subset of the Geant4 NIST material database.
//!
//! Transport codes resolve `G4_*` references internally, so these entries are
//! only referenced from GDML and never written out. Densities are carried so
//! that summaries and the viewer can show them.
//!
//! | Identifier | Density (g/cm³) | State |
//! |------------|-----------------|-------|
//! | `G4_Galactic` | 1e-25 | gas |
//! | `G4_AIR` | 0.00120479 | gas |
//! | `G4_Ar` | 0.00166201 | gas |
//! | `G4_WATER` | 1.0 | liquid |
//! | `G4_lAr` | 1.396 | liquid |
//! | `G4_GRAPHITE` | 2.21 | solid |
//! | `G4_Al` | 2.699 | solid |
//! | `G4_CONCRETE` | 2.3 | solid |
//! | `G4_SILICON_DIOXIDE` | 2.32 | solid |
//! | `G4_Fe` | 7.874 | solid |
//! | `G4_STAINLESS-STEEL` | 8.0 | solid |
//! | `G4_Cu` | 8.96 | solid |
//! | `G4_Pb` | 11.35 | solid |
//! | `G4_W` | 19.3 | solid |

use serde::{Deserialize, Serialize};

use crate::properties::{MaterialError, MaterialProperties, State};

const NIST_TABLE: &[(&str, f64, State)] = &[
    ("G4_Galactic", 1e-25, State::Gas),
    ("G4_AIR", 0.00120479, State::Gas),
    ("G4_Ar", 0.00166201, State::Gas),
    ("G4_WATER", 1.0, State::Liquid),
    ("G4_lAr", 1.396, State::Liquid),
    ("G4_GRAPHITE", 2.21, State::Solid),
    ("G4_Al", 2.699, State::Solid),
    ("G4_CONCRETE", 2.3, State::Solid),
    ("G4_SILICON_DIOXIDE", 2.32, State::Solid),
    ("G4_Fe", 7.874, State::Solid),
    ("G4_STAINLESS-STEEL", 8.0, State::Solid),
    ("G4_Cu", 8.96, State::Solid),
    ("G4_Pb", 11.35, State::Solid),
    ("G4_W", 19.3, State::Solid),
];

/// A predefined material from the Geant4 NIST database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NistMaterial {
    name: String,
    density: f64,
    state: State,
}

impl MaterialProperties for NistMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn density(&self) -> f64 {
        self.density
    }

    fn state(&self) -> State {
        self.state
    }
}

/// Look up a NIST material by its `G4_*` identifier (case-sensitive).
pub fn lookup(name: &str) -> Result<NistMaterial, MaterialError> {
    NIST_TABLE
        .iter()
        .find(|(id, _, _)| *id == name)
        .map(|&(id, density, state)| NistMaterial {
            name: id.to_string(),
            density,
            state,
        })
        .ok_or_else(|| MaterialError::NotFound {
            name: name.to_string(),
            valid: identifiers().collect::<Vec<_>>().join(", "),
        })
}

/// All known NIST identifiers, in table order.
pub fn identifiers() -> impl Iterator<Item = &'static str> {
    NIST_TABLE.iter().map(|(id, _, _)| *id)
}

/// All known NIST materials, in table order.
pub fn catalogue() -> Vec<NistMaterial> {
    NIST_TABLE
        .iter()
        .map(|&(id, density, state)| NistMaterial {
            name: id.to_string(),
            density,
            state,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lookup_lead() {
        let pb = lookup("G4_Pb").unwrap();
        assert_relative_eq!(pb.density(), 11.35);
        assert_eq!(pb.state(), State::Solid);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(lookup("g4_pb").is_err());
        assert!(lookup("G4_STAINLESS-STEEL").is_ok());
    }

    #[test]
    fn test_catalogue_covers_every_identifier() {
        let cat = catalogue();
        assert_eq!(cat.len(), identifiers().count());
        assert!(cat.iter().any(|m| m.name() == "G4_Galactic" && m.state() == State::Gas));
    }
}
