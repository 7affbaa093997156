//! Solid primitives.
//!
//! A [`Solid`] is the named, registry-facing description of a shape whose
//! parameters may reference named constants (as in GDML, where a tube can
//! use `rmin="zero"` and `deltaphi="twopi"`). Resolving a solid against the
//! registry constants yields a numeric [`Shape`], which supports point
//! classification, surface sampling and wireframe generation.
//!
//! Parameters follow GDML conventions: box edges and tube lengths are full
//! lengths, centred on the local origin.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// A solid parameter: a literal value or a reference to a named constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expr {
    Value(f64),
    Constant(String),
}

impl Expr {
    pub fn constant(name: impl Into<String>) -> Self {
        Expr::Constant(name.into())
    }

    /// Evaluate using `lookup` to resolve constant references.
    pub fn evaluate<F>(&self, lookup: F) -> Result<f64, GeometryError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        match self {
            Expr::Value(v) => Ok(*v),
            Expr::Constant(name) => {
                lookup(name).ok_or_else(|| GeometryError::UnknownConstant(name.clone()))
            }
        }
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::Value(v)
    }
}

impl From<&Expr> for Expr {
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}

/// Parameters of a solid, possibly referencing constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SolidKind {
    /// Axis-aligned box with full edge lengths.
    Box { x: Expr, y: Expr, z: Expr },
    /// Tube segment along z with full length `z`.
    Tube {
        rmin: Expr,
        rmax: Expr,
        z: Expr,
        start_phi: Expr,
        delta_phi: Expr,
    },
}

/// A named solid as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub name: String,
    pub kind: SolidKind,
}

impl Solid {
    pub fn new_box(
        name: impl Into<String>,
        x: impl Into<Expr>,
        y: impl Into<Expr>,
        z: impl Into<Expr>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SolidKind::Box {
                x: x.into(),
                y: y.into(),
                z: z.into(),
            },
        }
    }

    pub fn new_tube(
        name: impl Into<String>,
        rmin: impl Into<Expr>,
        rmax: impl Into<Expr>,
        z: impl Into<Expr>,
        start_phi: impl Into<Expr>,
        delta_phi: impl Into<Expr>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SolidKind::Tube {
                rmin: rmin.into(),
                rmax: rmax.into(),
                z: z.into(),
                start_phi: start_phi.into(),
                delta_phi: delta_phi.into(),
            },
        }
    }

    /// Resolve all parameters and validate the resulting shape.
    pub fn resolve<F>(&self, lookup: F) -> Result<Shape, GeometryError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let shape = match &self.kind {
            SolidKind::Box { x, y, z } => Shape::Box(BoxShape {
                x: x.evaluate(&lookup)?,
                y: y.evaluate(&lookup)?,
                z: z.evaluate(&lookup)?,
            }),
            SolidKind::Tube {
                rmin,
                rmax,
                z,
                start_phi,
                delta_phi,
            } => Shape::Tube(TubeShape {
                rmin: rmin.evaluate(&lookup)?,
                rmax: rmax.evaluate(&lookup)?,
                z: z.evaluate(&lookup)?,
                start_phi: start_phi.evaluate(&lookup)?,
                delta_phi: delta_phi.evaluate(&lookup)?,
            }),
        };
        shape.validate(&self.name)?;
        Ok(shape)
    }
}

/// Where a point lies relative to a shape, within a tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Surface,
    Outside,
}

/// Numeric box: full edge lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Numeric tube segment: radii, full length and phi range (rad).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeShape {
    pub rmin: f64,
    pub rmax: f64,
    pub z: f64,
    pub start_phi: f64,
    pub delta_phi: f64,
}

impl TubeShape {
    fn is_full(&self) -> bool {
        self.delta_phi >= TAU - 1e-12
    }

    /// Sample angles over the phi range. A full circle omits the
    /// duplicated end point.
    fn phi_grid(&self, n: usize) -> Vec<f64> {
        if self.is_full() {
            (0..n)
                .map(|i| self.start_phi + TAU * i as f64 / n as f64)
                .collect()
        } else {
            grid(n, self.start_phi, self.start_phi + self.delta_phi)
        }
    }
}

/// A fully resolved solid in its local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box(BoxShape),
    Tube(TubeShape),
}

impl Shape {
    /// Check the physical sanity of the parameters.
    pub fn validate(&self, name: &str) -> Result<(), GeometryError> {
        let fail = |message: String| {
            Err(GeometryError::InvalidSolid {
                name: name.to_string(),
                message,
            })
        };
        match self {
            Shape::Box(b) => {
                for (axis, v) in [("x", b.x), ("y", b.y), ("z", b.z)] {
                    if !(v > 0.0 && v.is_finite()) {
                        return fail(format!("box {} length must be positive, got {}", axis, v));
                    }
                }
            }
            Shape::Tube(t) => {
                if !(t.rmin >= 0.0) {
                    return fail(format!("rmin must be >= 0, got {}", t.rmin));
                }
                if !(t.rmax > t.rmin) {
                    return fail(format!("rmax ({}) must exceed rmin ({})", t.rmax, t.rmin));
                }
                if !(t.z > 0.0 && t.z.is_finite()) {
                    return fail(format!("length must be positive, got {}", t.z));
                }
                if !(t.delta_phi > 0.0 && t.delta_phi <= TAU + 1e-12) {
                    return fail(format!("delta phi must lie in (0, 2pi], got {}", t.delta_phi));
                }
            }
        }
        Ok(())
    }

    /// Signed distance estimate: negative inside, positive outside.
    ///
    /// Exact for boxes away from edges and for the radial and axial faces of
    /// tubes; the phi faces use the arc length, which is adequate for the
    /// tolerance test in [`classify`](Self::classify).
    pub fn signed_distance(&self, p: &[f64; 3]) -> f64 {
        match self {
            Shape::Box(b) => (p[0].abs() - b.x / 2.0)
                .max(p[1].abs() - b.y / 2.0)
                .max(p[2].abs() - b.z / 2.0),
            Shape::Tube(t) => {
                let r = p[0].hypot(p[1]);
                let mut d = (p[2].abs() - t.z / 2.0).max(r - t.rmax);
                if t.rmin > 0.0 {
                    d = d.max(t.rmin - r);
                }
                if !t.is_full() {
                    let rel = (p[1].atan2(p[0]) - t.start_phi).rem_euclid(TAU);
                    let d_phi = if rel <= t.delta_phi {
                        -rel.min(t.delta_phi - rel) * r
                    } else {
                        (rel - t.delta_phi).min(TAU - rel) * r
                    };
                    d = d.max(d_phi);
                }
                d
            }
        }
    }

    /// Classify a local-frame point. Points within `tolerance` of the
    /// boundary count as [`Containment::Surface`].
    pub fn classify(&self, p: &[f64; 3], tolerance: f64) -> Containment {
        let d = self.signed_distance(p);
        if d < -tolerance {
            Containment::Inside
        } else if d > tolerance {
            Containment::Outside
        } else {
            Containment::Surface
        }
    }

    /// Local axis-aligned bounding box: returns (min_corner, max_corner).
    pub fn bounding_box(&self) -> ([f64; 3], [f64; 3]) {
        let half = match self {
            Shape::Box(b) => [b.x / 2.0, b.y / 2.0, b.z / 2.0],
            Shape::Tube(t) => [t.rmax, t.rmax, t.z / 2.0],
        };
        ([-half[0], -half[1], -half[2]], half)
    }

    /// Deterministic samples on the boundary, `resolution` points per
    /// parametric direction.
    pub fn surface_points(&self, resolution: usize) -> Vec<[f64; 3]> {
        let n = resolution.max(2);
        let mut points = Vec::new();
        match self {
            Shape::Box(b) => {
                let half = [b.x / 2.0, b.y / 2.0, b.z / 2.0];
                for axis in 0..3 {
                    let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
                    for sign in [-1.0, 1.0] {
                        for a in grid(n, -half[u], half[u]) {
                            for c in grid(n, -half[v], half[v]) {
                                let mut p = [0.0; 3];
                                p[axis] = sign * half[axis];
                                p[u] = a;
                                p[v] = c;
                                points.push(p);
                            }
                        }
                    }
                }
            }
            Shape::Tube(t) => {
                let hz = t.z / 2.0;
                let phis = t.phi_grid(n);
                let zs = grid(n, -hz, hz);

                let mut radii = vec![t.rmax];
                if t.rmin > 0.0 {
                    radii.push(t.rmin);
                }
                for &r in &radii {
                    for &phi in &phis {
                        for &z in &zs {
                            points.push([r * phi.cos(), r * phi.sin(), z]);
                        }
                    }
                }

                let rs = grid(n, t.rmin, t.rmax);
                for z in [-hz, hz] {
                    for &r in &rs {
                        for &phi in &phis {
                            points.push([r * phi.cos(), r * phi.sin(), z]);
                        }
                    }
                }

                if !t.is_full() {
                    for phi in [t.start_phi, t.start_phi + t.delta_phi] {
                        for &r in &rs {
                            for &z in &zs {
                                points.push([r * phi.cos(), r * phi.sin(), z]);
                            }
                        }
                    }
                }
            }
        }
        points
    }

    /// Edges for wireframe display in the local frame. Curved edges are
    /// approximated with `segments` straight pieces.
    pub fn wireframe(&self, segments: usize) -> Vec<[[f64; 3]; 2]> {
        match self {
            Shape::Box(b) => {
                let (hx, hy, hz) = (b.x / 2.0, b.y / 2.0, b.z / 2.0);
                let corner = |i: usize| {
                    [
                        if i & 1 == 0 { -hx } else { hx },
                        if i & 2 == 0 { -hy } else { hy },
                        if i & 4 == 0 { -hz } else { hz },
                    ]
                };
                let mut edges = Vec::with_capacity(12);
                for i in 0..8usize {
                    for bit in [1usize, 2, 4] {
                        if i & bit == 0 {
                            edges.push([corner(i), corner(i | bit)]);
                        }
                    }
                }
                edges
            }
            Shape::Tube(t) => {
                let n = segments.max(3);
                let hz = t.z / 2.0;
                let full = t.is_full();
                let at = |r: f64, phi: f64, z: f64| [r * phi.cos(), r * phi.sin(), z];

                let mut radii = vec![t.rmax];
                if t.rmin > 0.0 {
                    radii.push(t.rmin);
                }

                let mut edges = Vec::new();
                for &r in &radii {
                    for z in [-hz, hz] {
                        for i in 0..n {
                            let a0 = t.start_phi + t.delta_phi * i as f64 / n as f64;
                            let a1 = t.start_phi + t.delta_phi * (i + 1) as f64 / n as f64;
                            edges.push([at(r, a0, z), at(r, a1, z)]);
                        }
                    }
                }

                if full {
                    for &r in &radii {
                        for k in 0..4 {
                            let phi = t.start_phi + TAU * k as f64 / 4.0;
                            edges.push([at(r, phi, -hz), at(r, phi, hz)]);
                        }
                    }
                } else {
                    for phi in [t.start_phi, t.start_phi + t.delta_phi] {
                        for z in [-hz, hz] {
                            edges.push([at(t.rmin, phi, z), at(t.rmax, phi, z)]);
                        }
                        edges.push([at(t.rmax, phi, -hz), at(t.rmax, phi, hz)]);
                        edges.push([at(t.rmin, phi, -hz), at(t.rmin, phi, hz)]);
                    }
                }
                edges
            }
        }
    }
}

/// `n` evenly spaced values from `a` to `b` inclusive.
fn grid(n: usize, a: f64, b: f64) -> Vec<f64> {
    if n < 2 {
        return vec![0.5 * (a + b)];
    }
    (0..n)
        .map(|i| a + (b - a) * i as f64 / (n - 1) as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn window() -> Shape {
        Shape::Tube(TubeShape {
            rmin: 0.0,
            rmax: 300.0,
            z: 10.0,
            start_phi: 0.0,
            delta_phi: TAU,
        })
    }

    #[test]
    fn test_constant_reference_resolves() {
        let solid = Solid::new_tube(
            "cyl",
            Expr::constant("zero"),
            300.0,
            10.0,
            0.0,
            Expr::constant("twopi"),
        );
        let shape = solid
            .resolve(|name| match name {
                "zero" => Some(0.0),
                "twopi" => Some(TAU),
                _ => None,
            })
            .unwrap();
        assert_eq!(shape, window());
    }

    #[test]
    fn test_unknown_constant_is_an_error() {
        let solid = Solid::new_box("b", Expr::constant("edge"), 1.0, 1.0);
        let err = solid.resolve(|_| None).unwrap_err();
        assert!(matches!(err, GeometryError::UnknownConstant(ref n) if n == "edge"));
    }

    #[test]
    fn test_invalid_radii_rejected() {
        let solid = Solid::new_tube("pipe", 312.0, 302.0, 100.0, 0.0, TAU);
        assert!(matches!(
            solid.resolve(|_| None),
            Err(GeometryError::InvalidSolid { .. })
        ));
        let negative = Solid::new_tube("neg", -1.0, 10.0, 100.0, 0.0, TAU);
        assert!(negative.resolve(|_| None).is_err());
    }

    #[test]
    fn test_delta_phi_must_lie_in_full_turn() {
        for delta_phi in [0.0, -1.0, 7.0] {
            let solid = Solid::new_tube("seg", 0.0, 10.0, 10.0, 0.0, delta_phi);
            assert!(matches!(
                solid.resolve(|_| None),
                Err(GeometryError::InvalidSolid { .. })
            ));
        }
        let full = Solid::new_tube("full", 0.0, 10.0, 10.0, 0.0, TAU);
        assert!(full.resolve(|_| None).is_ok());
    }

    #[test]
    fn test_zero_length_box_rejected() {
        let solid = Solid::new_box("flat", 10.0, 10.0, 0.0);
        assert!(solid.resolve(|_| None).is_err());
    }

    #[test]
    fn test_box_classification() {
        let b = Shape::Box(BoxShape { x: 2.0, y: 4.0, z: 6.0 });
        assert_eq!(b.classify(&[0.0, 0.0, 0.0], 1e-9), Containment::Inside);
        assert_eq!(b.classify(&[1.0, 0.0, 0.0], 1e-9), Containment::Surface);
        assert_eq!(b.classify(&[0.0, 2.5, 0.0], 1e-9), Containment::Outside);
        assert_relative_eq!(b.signed_distance(&[0.0, 0.0, 2.0]), -1.0);
    }

    #[test]
    fn test_hollow_tube_classification() {
        let pipe = Shape::Tube(TubeShape {
            rmin: 302.0,
            rmax: 312.0,
            z: 5000.0,
            start_phi: 0.0,
            delta_phi: TAU,
        });
        assert_eq!(pipe.classify(&[0.0, 0.0, 0.0], 1e-6), Containment::Outside);
        assert_eq!(pipe.classify(&[307.0, 0.0, 0.0], 1e-6), Containment::Inside);
        assert_eq!(pipe.classify(&[0.0, 302.0, 10.0], 1e-6), Containment::Surface);
        assert_eq!(pipe.classify(&[307.0, 0.0, 2600.0], 1e-6), Containment::Outside);
    }

    #[test]
    fn test_partial_tube_phi_range() {
        let half = Shape::Tube(TubeShape {
            rmin: 0.0,
            rmax: 10.0,
            z: 2.0,
            start_phi: 0.0,
            delta_phi: std::f64::consts::PI,
        });
        assert_eq!(half.classify(&[0.0, 5.0, 0.0], 1e-9), Containment::Inside);
        assert_eq!(half.classify(&[0.0, -5.0, 0.0], 1e-9), Containment::Outside);
    }

    #[test]
    fn test_surface_points_lie_on_surface() {
        let shapes = [
            window(),
            Shape::Box(BoxShape { x: 150.0, y: 150.0, z: 250.0 }),
            Shape::Tube(TubeShape {
                rmin: 5.0,
                rmax: 8.0,
                z: 4.0,
                start_phi: 0.5,
                delta_phi: 2.0,
            }),
        ];
        for shape in &shapes {
            let points = shape.surface_points(6);
            assert!(!points.is_empty());
            for p in &points {
                assert_eq!(shape.classify(p, 1e-6), Containment::Surface, "{:?}", p);
            }
        }
    }

    #[test]
    fn test_surface_point_counts() {
        let b = Shape::Box(BoxShape { x: 1.0, y: 1.0, z: 1.0 });
        assert_eq!(b.surface_points(4).len(), 6 * 16);
        // Solid tube: outer wall plus two caps.
        assert_eq!(window().surface_points(4).len(), 3 * 16);
    }

    #[test]
    fn test_wireframe_edge_counts() {
        let b = Shape::Box(BoxShape { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(b.wireframe(16).len(), 12);
        assert_eq!(window().wireframe(16).len(), 2 * 16 + 4);

        let pipe = Shape::Tube(TubeShape {
            rmin: 302.0,
            rmax: 312.0,
            z: 5000.0,
            start_phi: 0.0,
            delta_phi: TAU,
        });
        assert_eq!(pipe.wireframe(16).len(), 4 * 16 + 8);
    }

    #[test]
    fn test_box_wireframe_edges_are_axis_aligned() {
        let b = Shape::Box(BoxShape { x: 2.0, y: 2.0, z: 2.0 });
        for [a, c] in b.wireframe(8) {
            let changed = (0..3).filter(|&k| (a[k] - c[k]).abs() > 1e-12).count();
            assert_eq!(changed, 1);
        }
    }
}
