//! TOML configuration deserialisation for build jobs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dimensions::DumpDimensions;
use crate::model::{ModelError, ModelMaterials};
use crate::toggles::BuildToggles;

/// Top-level job configuration. Every table is optional; an empty file
/// describes the default beam dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub dimensions: DumpDimensions,
    pub materials: ModelMaterials,
    pub build: BuildToggles,
    pub output: OutputConfig,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// GDML file name inside `directory` (default: "beamdump.gdml").
    #[serde(default = "default_gdml_file")]
    pub gdml_file: String,
    /// Whether to write a JSON summary next to the GDML (default: false).
    #[serde(default)]
    pub save_summary: bool,
    /// Whether to run the overlap check after building (default: true).
    #[serde(default = "default_true")]
    pub check_overlaps: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            gdml_file: default_gdml_file(),
            save_summary: false,
            check_overlaps: true,
        }
    }
}

impl OutputConfig {
    /// GDML path inside the configured directory.
    pub fn gdml_path(&self) -> PathBuf {
        self.gdml_path_in(Path::new(&self.directory))
    }

    /// GDML path inside `directory`, for command-line overrides.
    pub fn gdml_path_in(&self, directory: &Path) -> PathBuf {
        directory.join(&self.gdml_file)
    }

    /// Summary path inside `directory`: the GDML file name with a `.json`
    /// extension.
    pub fn summary_path_in(&self, directory: &Path) -> PathBuf {
        self.gdml_path_in(directory).with_extension("json")
    }
}

fn default_output_dir() -> String {
    "./output".into()
}

fn default_gdml_file() -> String {
    "beamdump.gdml".into()
}

fn default_true() -> bool {
    true
}

/// Parse a TOML job configuration.
pub fn parse_config(content: &str) -> Result<JobConfig, ModelError> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> Result<JobConfig, ModelError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("").unwrap();
        assert_eq!(config, JobConfig::default());
        assert_eq!(config.output.gdml_path(), Path::new("./output/beamdump.gdml"));
    }

    #[test]
    fn test_output_paths_follow_directory_override() {
        let output = OutputConfig {
            gdml_file: "dump.v2.gdml".into(),
            ..Default::default()
        };
        let dir = Path::new("/tmp/run");
        assert_eq!(output.gdml_path_in(dir), Path::new("/tmp/run/dump.v2.gdml"));
        assert_eq!(output.summary_path_in(dir), Path::new("/tmp/run/dump.v2.json"));
        assert_eq!(output.gdml_path(), Path::new("./output/dump.v2.gdml"));
    }

    #[test]
    fn test_partial_tables() {
        let config = parse_config(
            r#"
[dimensions]
n_bars = 12
cylinder_radius = 250.0

[materials]
cylinder = "G4_Al"

[build]
argon_pipe = true

[output]
directory = "out"
save_summary = true
"#,
        )
        .unwrap();
        assert_eq!(config.dimensions.n_bars, 12);
        assert_eq!(config.dimensions.cylinder_radius, 250.0);
        assert_eq!(config.dimensions.bar_length, 250.0);
        assert_eq!(config.materials.cylinder, "G4_Al");
        assert_eq!(config.materials.pipe, "G4_STAINLESS-STEEL");
        assert!(config.build.argon_pipe);
        assert!(config.build.pipe);
        assert_eq!(config.output.directory, "out");
        assert_eq!(config.output.gdml_file, "beamdump.gdml");
        assert!(config.output.save_summary);
        assert!(config.output.check_overlaps);
    }

    #[test]
    fn test_unknown_dimension_rejected() {
        let err = parse_config("[dimensions]\npipe_radius = 3.0\n").unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/beamdump.toml")).unwrap_err();
        assert!(matches!(err, ModelError::Io(_)));
    }
}
