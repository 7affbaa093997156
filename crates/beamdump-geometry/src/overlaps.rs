//! Sampling-based overlap detection.
//!
//! For every mother volume, the surface of each daughter is sampled on a
//! regular grid. A sample lying outside the mother marks a protrusion; a
//! sample lying strictly inside a sibling marks an overlap. Touching
//! surfaces (within the tolerance) are allowed.

use log::warn;
use serde::Serialize;

use crate::error::GeometryResult;
use crate::registry::{LogicalId, PhysicalId, Registry};
use crate::solids::{Containment, Shape};
use crate::transform::Transform;

/// Sampling settings.
#[derive(Debug, Clone, Copy)]
pub struct OverlapOptions {
    /// Surface samples per parametric direction.
    pub resolution: usize,
    /// Distance (mm) within which a point counts as on the surface.
    pub tolerance: f64,
}

impl Default for OverlapOptions {
    fn default() -> Self {
        Self {
            resolution: 12,
            tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverlapKind {
    /// A daughter extends outside its mother.
    Protrusion,
    /// Two daughters of the same mother intersect.
    Overlap,
}

/// One detected problem.
#[derive(Debug, Clone, Serialize)]
pub struct OverlapFinding {
    pub kind: OverlapKind,
    /// The protruding daughter, or the first of the two overlapping siblings.
    pub volume: String,
    /// The mother (protrusion) or the second sibling (overlap).
    pub other: String,
    /// Number of offending surface samples.
    pub samples: usize,
    /// Largest penetration depth seen among the offending samples (mm).
    pub depth: f64,
}

/// Outcome of [`check_overlaps`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct OverlapReport {
    pub volumes_checked: usize,
    pub findings: Vec<OverlapFinding>,
}

impl OverlapReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn protrusions(&self) -> impl Iterator<Item = &OverlapFinding> {
        self.findings
            .iter()
            .filter(|f| f.kind == OverlapKind::Protrusion)
    }

    pub fn overlaps(&self) -> impl Iterator<Item = &OverlapFinding> {
        self.findings.iter().filter(|f| f.kind == OverlapKind::Overlap)
    }
}

/// A daughter prepared for testing: its shape, its transform into the
/// mother frame, its surface samples in the mother frame and their bounds.
struct Prepared {
    name: String,
    shape: Shape,
    to_mother: Transform,
    samples: Vec<[f64; 3]>,
    bounds: ([f64; 3], [f64; 3]),
}

/// Check every mother/daughter relation in the registry.
pub fn check_overlaps(registry: &Registry, options: &OverlapOptions) -> GeometryResult<OverlapReport> {
    let mut report = OverlapReport::default();
    let mothers: Vec<LogicalId> = registry.logical_volumes().map(|(id, _)| id).collect();

    for mother in mothers {
        let daughters = registry.daughters(mother);
        if daughters.is_empty() {
            continue;
        }
        let mother_name = registry.logical(mother)?.name.clone();
        let mother_shape = registry.shape_of(mother)?;

        let prepared = daughters
            .iter()
            .map(|&pv| prepare(registry, pv, options.resolution))
            .collect::<GeometryResult<Vec<_>>>()?;
        report.volumes_checked += prepared.len();

        for d in &prepared {
            let (samples, depth) = offending(&d.samples, |p| {
                let dist = mother_shape.signed_distance(p);
                (mother_shape.classify(p, options.tolerance) == Containment::Outside)
                    .then_some(dist)
            });
            if samples > 0 {
                warn!(
                    "{} protrudes from {} ({} samples, depth {:.3} mm)",
                    d.name, mother_name, samples, depth
                );
                report.findings.push(OverlapFinding {
                    kind: OverlapKind::Protrusion,
                    volume: d.name.clone(),
                    other: mother_name.clone(),
                    samples,
                    depth,
                });
            }
        }

        for (i, a) in prepared.iter().enumerate() {
            for b in &prepared[i + 1..] {
                if !boxes_intersect(&a.bounds, &b.bounds) {
                    continue;
                }
                let (n_ab, d_ab) = inside_sibling(a, b, options.tolerance);
                let (n_ba, d_ba) = inside_sibling(b, a, options.tolerance);
                let samples = n_ab + n_ba;
                if samples > 0 {
                    let depth = d_ab.max(d_ba);
                    warn!(
                        "{} overlaps {} ({} samples, depth {:.3} mm)",
                        a.name, b.name, samples, depth
                    );
                    report.findings.push(OverlapFinding {
                        kind: OverlapKind::Overlap,
                        volume: a.name.clone(),
                        other: b.name.clone(),
                        samples,
                        depth,
                    });
                }
            }
        }
    }
    Ok(report)
}

fn prepare(registry: &Registry, pv_id: PhysicalId, resolution: usize) -> GeometryResult<Prepared> {
    let pv = registry.physical(pv_id)?;
    let shape = registry.shape_of(pv.logical)?;
    let to_mother = Transform::from_placement(&pv.placement);
    let samples: Vec<[f64; 3]> = shape
        .surface_points(resolution)
        .iter()
        .map(|p| to_mother.apply(p))
        .collect();

    let (lo, hi) = shape.bounding_box();
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for i in 0..8usize {
        let corner = [
            if i & 1 == 0 { lo[0] } else { hi[0] },
            if i & 2 == 0 { lo[1] } else { hi[1] },
            if i & 4 == 0 { lo[2] } else { hi[2] },
        ];
        let c = to_mother.apply(&corner);
        for k in 0..3 {
            min[k] = min[k].min(c[k]);
            max[k] = max[k].max(c[k]);
        }
    }

    Ok(Prepared {
        name: pv.name.clone(),
        shape,
        to_mother,
        samples,
        bounds: (min, max),
    })
}

/// Samples of `a` lying strictly inside `b`.
fn inside_sibling(a: &Prepared, b: &Prepared, tolerance: f64) -> (usize, f64) {
    let to_b = b.to_mother.inverse();
    offending(&a.samples, |p| {
        let local = to_b.apply(p);
        (b.shape.classify(&local, tolerance) == Containment::Inside)
            .then(|| -b.shape.signed_distance(&local))
    })
}

/// Count samples for which `test` yields a depth, and the maximum depth.
fn offending<F>(samples: &[[f64; 3]], test: F) -> (usize, f64)
where
    F: Fn(&[f64; 3]) -> Option<f64>,
{
    samples
        .iter()
        .filter_map(test)
        .fold((0, 0.0_f64), |(n, max), d| (n + 1, max.max(d)))
}

fn boxes_intersect(a: &([f64; 3], [f64; 3]), b: &([f64; 3], [f64; 3])) -> bool {
    (0..3).all(|k| a.0[k] <= b.1[k] && b.0[k] <= a.1[k])
}
