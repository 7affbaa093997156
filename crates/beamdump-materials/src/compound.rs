//! Compound materials defined by mass fractions of NIST components.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::nist;
use crate::properties::{MaterialError, MaterialProperties, State};

/// Allowed deviation of the fraction sum from one.
const FRACTION_SUM_TOLERANCE: f64 = 1e-6;

/// One constituent of a compound: a NIST reference and its mass fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub reference: String,
    pub mass_fraction: f64,
}

/// A material mixed from a fixed number of components by mass fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundMaterial {
    name: String,
    density: f64,
    state: State,
    n_components: usize,
    components: Vec<Component>,
}

impl CompoundMaterial {
    /// Start a compound that will hold exactly `n_components` constituents.
    pub fn new(name: impl Into<String>, density: f64, n_components: usize) -> Self {
        Self {
            name: name.into(),
            density,
            state: State::Solid,
            n_components,
            components: Vec::with_capacity(n_components),
        }
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    /// Append a NIST component.
    ///
    /// Fails if the reference is unknown or the declared component count is
    /// already reached.
    pub fn add_component(
        &mut self,
        reference: &str,
        mass_fraction: f64,
    ) -> Result<(), MaterialError> {
        if self.components.len() >= self.n_components {
            return Err(MaterialError::ComponentCount {
                name: self.name.clone(),
                declared: self.n_components,
                message: format!("'{}' would exceed it", reference),
            });
        }
        nist::lookup(reference)?;
        debug!(
            "compound {}: adding {} (mass fraction {})",
            self.name, reference, mass_fraction
        );
        self.components.push(Component {
            reference: reference.to_string(),
            mass_fraction,
        });
        Ok(())
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Check density, component count and mass fractions.
    pub fn validate(&self) -> Result<(), MaterialError> {
        if !(self.density > 0.0) {
            return Err(MaterialError::InvalidDensity {
                name: self.name.clone(),
                density: self.density,
            });
        }
        if self.components.len() != self.n_components {
            return Err(MaterialError::ComponentCount {
                name: self.name.clone(),
                declared: self.n_components,
                message: format!("{} were added", self.components.len()),
            });
        }
        for c in &self.components {
            if !(c.mass_fraction > 0.0 && c.mass_fraction <= 1.0) {
                return Err(MaterialError::InvalidFraction {
                    name: self.name.clone(),
                    component: c.reference.clone(),
                    fraction: c.mass_fraction,
                });
            }
        }
        let sum: f64 = self.components.iter().map(|c| c.mass_fraction).sum();
        if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return Err(MaterialError::FractionSum {
                name: self.name.clone(),
                sum,
            });
        }
        Ok(())
    }
}

impl MaterialProperties for CompoundMaterial {
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

/// TF1 lead glass used for the calorimeter bars: 3.86 g/cm³,
/// 51 % lead and 49 % silicon dioxide by mass.
pub fn lead_glass_tf1() -> CompoundMaterial {
    CompoundMaterial {
        name: "TF1".into(),
        density: 3.86,
        state: State::Solid,
        n_components: 2,
        components: vec![
            Component {
                reference: "G4_Pb".into(),
                mass_fraction: 0.51,
            },
            Component {
                reference: "G4_SILICON_DIOXIDE".into(),
                mass_fraction: 0.49,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tf1_is_valid() {
        let tf1 = lead_glass_tf1();
        tf1.validate().unwrap();
        assert_relative_eq!(tf1.density(), 3.86);
        assert_eq!(tf1.components().len(), 2);
        assert_eq!(tf1.components()[0].reference, "G4_Pb");
    }

    #[test]
    fn test_builder_matches_tf1() {
        let mut glass = CompoundMaterial::new("TF1", 3.86, 2);
        glass.add_component("G4_Pb", 0.51).unwrap();
        glass.add_component("G4_SILICON_DIOXIDE", 0.49).unwrap();
        assert_eq!(glass, lead_glass_tf1());
    }

    #[test]
    fn test_too_many_components_rejected() {
        let mut m = CompoundMaterial::new("mix", 1.0, 1);
        m.add_component("G4_Fe", 1.0).unwrap();
        let err = m.add_component("G4_Cu", 0.1).unwrap_err();
        assert!(matches!(err, MaterialError::ComponentCount { declared: 1, .. }));
    }

    #[test]
    fn test_missing_component_fails_validation() {
        let mut m = CompoundMaterial::new("mix", 1.0, 2);
        m.add_component("G4_Fe", 1.0).unwrap();
        assert!(matches!(
            m.validate(),
            Err(MaterialError::ComponentCount { .. })
        ));
    }

    #[test]
    fn test_fraction_sum_checked() {
        let mut m = CompoundMaterial::new("mix", 1.0, 2);
        m.add_component("G4_Fe", 0.5).unwrap();
        m.add_component("G4_Cu", 0.4).unwrap();
        match m.validate() {
            Err(MaterialError::FractionSum { sum, .. }) => assert_relative_eq!(sum, 0.9),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_component_rejected() {
        let mut m = CompoundMaterial::new("mix", 1.0, 1);
        assert!(matches!(
            m.add_component("G4_NOPE", 1.0),
            Err(MaterialError::NotFound { .. })
        ));
    }

    #[test]
    fn test_non_positive_density_rejected() {
        let mut m = CompoundMaterial::new("mix", 0.0, 1);
        m.add_component("G4_Fe", 1.0).unwrap();
        assert!(matches!(
            m.validate(),
            Err(MaterialError::InvalidDensity { .. })
        ));
    }
}
