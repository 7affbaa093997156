//! Model dimensions.
//!
//! A handful of primitive inputs fix the whole layout. Everything else is
//! derived with plain arithmetic:
//!
//! ```text
//!          bars (ring at bar_ring_z)
//!           ##
//!   lead_cyl |=============== pipe ===============| sec_cyl   +------+
//!            |            (argon fill)            |           | lead |
//!   lead_cyl |====================================| sec_cyl   +------+
//!           ##
//!   z:  leading_cylinder_z                 second_cylinder_z  lead_cube_z
//! ```
//!
//! Lengths are in mm and follow GDML solid conventions: box edges and tube
//! lengths are full lengths.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid model dimensions.
#[derive(Debug, Error, PartialEq)]
pub enum DimensionError {
    #[error("'{field}' must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("'{field}' must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("'{field}' must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("n_bars must be greater than zero")]
    NoBars,

    #[error("derived {quantity} must be positive, got {value}")]
    Derived { quantity: &'static str, value: f64 },
}

/// Primitive inputs of the beam dump layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DumpDimensions {
    /// Full edge of the cubic world.
    pub world_size: f64,
    /// Radius of both window cylinders.
    pub cylinder_radius: f64,
    /// Full z length of each window cylinder.
    pub cylinder_thickness: f64,
    /// z position of the upstream window.
    pub leading_cylinder_z: f64,
    /// Distance between the two windows.
    pub window_separation: f64,
    /// Radial gap between a window and the pipe bore.
    pub pipe_window_tolerance: f64,
    /// Pipe wall thickness; also the gap between pipe end and lead cube.
    pub pipe_wall_thickness: f64,
    /// Full x/y edge of a calorimeter bar.
    pub bar_cross_section: f64,
    /// Full z edge of a calorimeter bar.
    pub bar_length: f64,
    /// z position of the bar ring.
    pub bar_ring_z: f64,
    /// Number of bars in the ring.
    pub n_bars: usize,
    /// Full edge of the lead absorber cube.
    pub lead_cube_size: f64,
}

impl Default for DumpDimensions {
    fn default() -> Self {
        Self {
            world_size: 10000.0,
            cylinder_radius: 300.0,
            cylinder_thickness: 10.0,
            leading_cylinder_z: 0.0,
            window_separation: 5000.0,
            pipe_window_tolerance: 2.0,
            pipe_wall_thickness: 10.0,
            bar_cross_section: 150.0,
            bar_length: 250.0,
            bar_ring_z: 0.0,
            n_bars: 8,
            lead_cube_size: 1000.0,
        }
    }
}

impl DumpDimensions {
    pub fn second_cylinder_z(&self) -> f64 {
        self.window_separation + self.leading_cylinder_z
    }

    pub fn pipe_inner_radius(&self) -> f64 {
        self.cylinder_radius + self.pipe_window_tolerance
    }

    pub fn pipe_outer_radius(&self) -> f64 {
        self.cylinder_radius + self.pipe_window_tolerance + self.pipe_wall_thickness
    }

    /// The pipe runs from z = 0 to the second window.
    pub fn pipe_length(&self) -> f64 {
        self.second_cylinder_z()
    }

    pub fn pipe_z(&self) -> f64 {
        0.5 * self.second_cylinder_z()
    }

    pub fn argon_inner_radius(&self) -> f64 {
        0.0
    }

    /// The argon fill reaches the pipe bore.
    pub fn argon_outer_radius(&self) -> f64 {
        self.pipe_inner_radius()
    }

    pub fn argon_length(&self) -> f64 {
        self.pipe_length()
    }

    pub fn argon_z(&self) -> f64 {
        self.pipe_z()
    }

    /// Distance from the beam axis to the bar centres.
    pub fn bar_ring_radius(&self) -> f64 {
        self.pipe_outer_radius() + self.bar_cross_section
    }

    pub fn lead_cube_z(&self) -> f64 {
        self.pipe_length() + self.pipe_wall_thickness + 0.5 * self.lead_cube_size
    }

    /// Check every primitive input and the derived pipe length.
    pub fn validate(&self) -> Result<(), DimensionError> {
        let positive = [
            ("world_size", self.world_size),
            ("cylinder_radius", self.cylinder_radius),
            ("cylinder_thickness", self.cylinder_thickness),
            ("window_separation", self.window_separation),
            ("pipe_wall_thickness", self.pipe_wall_thickness),
            ("bar_cross_section", self.bar_cross_section),
            ("bar_length", self.bar_length),
            ("lead_cube_size", self.lead_cube_size),
        ];
        let non_negative = [("pipe_window_tolerance", self.pipe_window_tolerance)];
        let any = [
            ("leading_cylinder_z", self.leading_cylinder_z),
            ("bar_ring_z", self.bar_ring_z),
        ];

        for &(field, value) in positive.iter().chain(&non_negative).chain(&any) {
            if !value.is_finite() {
                return Err(DimensionError::NotFinite { field, value });
            }
        }
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(DimensionError::NonPositive { field, value });
            }
        }
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(DimensionError::Negative { field, value });
            }
        }
        if self.n_bars == 0 {
            return Err(DimensionError::NoBars);
        }
        if self.pipe_length() <= 0.0 {
            return Err(DimensionError::Derived {
                quantity: "pipe length",
                value: self.pipe_length(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_derived_values() {
        let d = DumpDimensions::default();
        assert_relative_eq!(d.second_cylinder_z(), 5000.0);
        assert_relative_eq!(d.pipe_inner_radius(), 302.0);
        assert_relative_eq!(d.pipe_outer_radius(), 312.0);
        assert_relative_eq!(d.pipe_length(), 5000.0);
        assert_relative_eq!(d.pipe_z(), 2500.0);
        assert_relative_eq!(d.argon_outer_radius(), 302.0);
        assert_relative_eq!(d.argon_z(), 2500.0);
        assert_relative_eq!(d.bar_ring_radius(), 462.0);
        assert_relative_eq!(d.lead_cube_z(), 5510.0);
        d.validate().unwrap();
    }

    #[test]
    fn test_shifted_leading_window_moves_downstream_parts() {
        let d = DumpDimensions {
            leading_cylinder_z: 100.0,
            ..Default::default()
        };
        assert_relative_eq!(d.second_cylinder_z(), 5100.0);
        assert_relative_eq!(d.pipe_z(), 2550.0);
        assert_relative_eq!(d.lead_cube_z(), 5610.0);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let d = DumpDimensions {
            cylinder_radius: -1.0,
            ..Default::default()
        };
        assert_eq!(
            d.validate(),
            Err(DimensionError::NonPositive {
                field: "cylinder_radius",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_zero_bars_rejected() {
        let d = DumpDimensions {
            n_bars: 0,
            ..Default::default()
        };
        assert_eq!(d.validate(), Err(DimensionError::NoBars));
    }

    #[test]
    fn test_zero_tolerance_allowed_but_negative_rejected() {
        let mut d = DumpDimensions {
            pipe_window_tolerance: 0.0,
            ..Default::default()
        };
        d.validate().unwrap();
        d.pipe_window_tolerance = -0.5;
        assert!(matches!(d.validate(), Err(DimensionError::Negative { .. })));
    }

    #[test]
    fn test_non_finite_rejected() {
        let d = DumpDimensions {
            bar_ring_z: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(d.validate(), Err(DimensionError::NotFinite { field: "bar_ring_z", .. })));
    }

    #[test]
    fn test_pipe_length_must_stay_positive() {
        let d = DumpDimensions {
            leading_cylinder_z: -6000.0,
            ..Default::default()
        };
        assert!(matches!(d.validate(), Err(DimensionError::Derived { .. })));
    }
}
