use crate::error::{CliError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileFeatureConfig {
    pub node: Option<Vec<String>>,
    pub edge: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileOutputConfig {
    pub paired: Option<bool>,
    pub mode: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConjugateConfig {
    pub ph: Option<f64>,
    #[serde(rename = "ignore-danger")]
    pub ignore_danger: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub features: Option<FileFeatureConfig>,
    pub output: Option<FileOutputConfig>,
    pub conjugate: Option<FileConjugateConfig>,
    #[serde(default)]
    pub datasets: BTreeMap<String, PathBuf>,
}

impl FileConfig {
    /// Loads a TOML configuration. Relative dataset paths are taken relative to the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration file.");
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        if let Some(base) = path.parent() {
            for dataset in config.datasets.values_mut() {
                if dataset.is_relative() {
                    *dataset = base.join(&*dataset);
                }
            }
        }
        Ok(config)
    }
}
