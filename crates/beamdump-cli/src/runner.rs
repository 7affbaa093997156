//! Build runner: ties together the model, GDML output and overlap checks.

use std::path::Path;

use anyhow::{Context, Result};

use beamdump_core::config::{load_config, JobConfig};
use beamdump_core::build_model;
use beamdump_geometry::gdml::write_gdml_file;
use beamdump_geometry::overlaps::{check_overlaps, OverlapKind, OverlapOptions, OverlapReport};
use beamdump_geometry::Registry;
use beamdump_materials::{lead_glass_tf1, nist, MaterialProperties};

/// Load a job file, or fall back to the default model when none is given.
pub fn load_job(path: Option<&Path>) -> Result<JobConfig> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration '{}'", path.display())),
        None => Ok(JobConfig::default()),
    }
}

/// Assemble the registry described by `job`.
pub fn build_registry(job: &JobConfig) -> Result<Registry> {
    let registry = build_model(&job.dimensions, &job.materials, &job.build)
        .context("Failed to build the beam dump model")?;
    Ok(registry)
}

/// Build the model and write every requested output into `out_dir`.
pub fn run_build(job: &JobConfig, out_dir: &Path) -> Result<Registry> {
    let registry = build_registry(job)?;

    let enabled = job.build.placed_components();
    println!(
        "Components: {}",
        if enabled.is_empty() {
            "none".to_string()
        } else {
            enabled.join(", ")
        }
    );
    println!(
        "  {} solids, {} logical volumes, {} placements",
        registry.solids().len(),
        registry.logical_volumes().count(),
        registry.physical_volumes().count()
    );

    let gdml_path = job.output.gdml_path_in(out_dir);
    write_gdml_file(&registry, &gdml_path)
        .with_context(|| format!("Failed to write GDML to '{}'", gdml_path.display()))?;
    println!("GDML written to: {}", gdml_path.display());

    if job.output.save_summary {
        let summary_path = job.output.summary_path_in(out_dir);
        write_summary_json(&registry, &summary_path)?;
    }

    if job.output.check_overlaps {
        let report = check_overlaps(&registry, &OverlapOptions::default())?;
        print_overlap_report(&report);
    }

    Ok(registry)
}

/// Build the model and report overlaps. With `strict`, any finding is an error.
pub fn run_check(job: &JobConfig, resolution: usize, strict: bool) -> Result<()> {
    if resolution == 0 {
        anyhow::bail!("Sampling resolution must be greater than zero");
    }
    let registry = build_registry(job)?;
    let options = OverlapOptions {
        resolution,
        ..Default::default()
    };
    let report = check_overlaps(&registry, &options)?;
    print_overlap_report(&report);

    if strict && !report.is_clean() {
        anyhow::bail!(
            "{} geometry problem(s) found",
            report.findings.len()
        );
    }
    Ok(())
}

/// Write the registry summary to a JSON file.
pub fn write_summary_json(registry: &Registry, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let summary = registry.summary()?;
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Summary (JSON) written to: {}", path.display());
    Ok(())
}

pub fn print_overlap_report(report: &OverlapReport) {
    println!("Overlap check: {} volumes sampled", report.volumes_checked);
    if report.is_clean() {
        println!("  no overlaps or protrusions found");
        return;
    }
    for finding in &report.findings {
        let relation = match finding.kind {
            OverlapKind::Protrusion => "protrudes from",
            OverlapKind::Overlap => "overlaps",
        };
        println!(
            "  {} {} {} ({} samples, depth {:.3} mm)",
            finding.volume, relation, finding.other, finding.samples, finding.depth
        );
    }
}

pub fn print_materials() {
    println!("Predefined materials (Geant4 NIST):");
    println!();
    for material in nist::catalogue() {
        println!(
            "  {:<22} {:>8.4} g/cm3  {}",
            material.name(),
            material.density(),
            material.state().as_str()
        );
    }
    println!();
    println!("Compounds:");
    println!();
    let tf1 = lead_glass_tf1();
    println!("  {:<22} {:>8.4} g/cm3  lead glass", tf1.name(), tf1.density());
    for component in tf1.components() {
        println!(
            "    {:<20} {:>5.1} %",
            component.reference,
            100.0 * component.mass_fraction
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_writes_gdml_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = JobConfig::default();
        job.output.save_summary = true;
        job.output.check_overlaps = false;

        let registry = run_build(&job, dir.path()).unwrap();
        assert_eq!(registry.physical_volumes().count(), 12);

        let gdml = std::fs::read_to_string(dir.path().join("beamdump.gdml")).unwrap();
        assert!(gdml.contains(r#"<world ref="world_lv"/>"#));

        let json = std::fs::read_to_string(dir.path().join("beamdump.json")).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(summary["world"], "world_lv");
    }

    #[test]
    fn test_output_directory_override_places_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = JobConfig::default();
        job.output.directory = "/nonexistent/configured".into();
        job.output.gdml_file = "dump.gdml".into();
        job.output.save_summary = true;
        job.output.check_overlaps = false;

        let out_dir = dir.path().join("override");
        run_build(&job, &out_dir).unwrap();
        assert!(out_dir.join("dump.gdml").is_file());
        assert!(out_dir.join("dump.json").is_file());
    }

    #[test]
    fn test_strict_check_fails_on_default_protrusions() {
        let job = JobConfig::default();
        assert!(run_check(&job, 4, false).is_ok());
        assert!(run_check(&job, 4, true).is_err());
    }

    #[test]
    fn test_strict_check_passes_without_protruding_parts() {
        let mut job = JobConfig::default();
        job.build.second_cylinder = false;
        job.build.lead_cube_dump = false;
        run_check(&job, 6, true).unwrap();
    }

    #[test]
    fn test_missing_job_file_has_context() {
        let err = load_job(Some(Path::new("/nonexistent/job.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/job.toml"));
    }
}
