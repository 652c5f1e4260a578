use super::defaults::DefaultsConfig;
use super::models::PolicySelection;
use crate::error::{CliError, Result};
use randwalk::core::random::RandomNumberKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSimulationConfig {
    pub particles: Option<u32>,
    pub bits: Option<u32>,
    pub seed: Option<u64>,
    pub fluctuation: Option<f64>,
    pub style: Option<RandomNumberKind>,
    pub replica: Option<u32>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRunConfig {
    pub steps: Option<u32>,
    pub report: Option<usize>,
    pub policy: Option<PolicySelection>,
    pub chunk_steps: Option<u32>,
    pub track: Option<Vec<usize>>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub simulation: Option<FileSimulationConfig>,
    pub run: Option<FileRunConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Every built-in default, as a fully populated file configuration.
    pub fn from_defaults(defaults: &DefaultsConfig) -> Self {
        Self {
            simulation: Some(FileSimulationConfig {
                particles: Some(defaults.particles),
                bits: Some(defaults.bits),
                seed: Some(defaults.seed),
                fluctuation: Some(defaults.fluctuation),
                style: Some(defaults.style),
                replica: Some(defaults.replica),
            }),
            run: Some(FileRunConfig {
                steps: Some(defaults.steps),
                report: Some(defaults.report),
                policy: Some(defaults.policy),
                chunk_steps: Some(defaults.chunk_steps),
                track: None,
            }),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_full_kebab_case_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walk.toml");
        fs::write(
            &path,
            r#"
[simulation]
particles = 14592
bits = 30
seed = 99
fluctuation = 0.5
style = "uniform"
replica = 2

[run]
steps = 10000
report = 4
policy = "parallel"
chunk-steps = 250
track = [0, 7]
"#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        let simulation = config.simulation.unwrap();
        assert_eq!(simulation.particles, Some(14592));
        assert_eq!(simulation.bits, Some(30));
        assert_eq!(simulation.seed, Some(99));
        assert_eq!(simulation.fluctuation, Some(0.5));
        assert_eq!(simulation.style, Some(RandomNumberKind::Uniform));
        assert_eq!(simulation.replica, Some(2));
        let run = config.run.unwrap();
        assert_eq!(run.steps, Some(10000));
        assert_eq!(run.report, Some(4));
        assert_eq!(run.policy, Some(PolicySelection::Parallel));
        assert_eq!(run.chunk_steps, Some(250));
        assert_eq!(run.track, Some(vec![0, 7]));
    }

    #[test]
    fn partial_file_leaves_missing_values_unset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walk.toml");
        fs::write(&path, "[run]\nsteps = 5\n").unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert!(config.simulation.is_none());
        assert_eq!(config.run.unwrap().steps, Some(5));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walk.toml");
        fs::write(&path, "[simulation]\nparticle-count = 5\n").unwrap();

        let result = FileConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn non_integer_particle_count_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walk.toml");
        fs::write(&path, "[simulation]\nparticles = 2.5\n").unwrap();

        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = FileConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn defaults_document_parses_back() {
        let document = FileConfig::from_defaults(&DefaultsConfig::default())
            .to_toml_string()
            .unwrap();
        assert!(document.contains("[simulation]"));
        assert!(document.contains("chunk-steps = 1000"));
        assert!(document.contains("style = \"gaussian\""));

        let parsed: FileConfig = toml::from_str(&document).unwrap();
        assert_eq!(parsed, FileConfig::from_defaults(&DefaultsConfig::default()));
    }
}
