use crate::core::features::{DEFAULT_EDGE_FEATURES, DEFAULT_NODE_FEATURES};
use crate::pipeline::conjugate::ProtonToggle;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for {parameter}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    #[error("Unpaired output needs mode 'protonated' or 'deprotonated', got '{0}'")]
    InvalidMode(String),
}

/// Which protonation state a single-sided dataset models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Protonated,
    Deprotonated,
}

impl FromStr for Side {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "protonated" => Ok(Self::Protonated),
            "deprotonated" => Ok(Self::Deprotonated),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Protonated => "protonated",
            Self::Deprotonated => "deprotonated",
        })
    }
}

/// Shape of the samples produced by materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// Both protonation states per sample.
    Paired,
    /// One protonation state per sample.
    Single(Side),
}

impl OutputMode {
    /// Interprets the `paired` flag and `mode` string of a dataset request.
    ///
    /// `mode` is ignored for paired output.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMode`] when `paired` is false and `mode` names no side.
    pub fn from_flags(paired: bool, mode: &str) -> Result<Self, ConfigError> {
        if paired {
            Ok(Self::Paired)
        } else {
            mode.parse().map(Self::Single)
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paired => f.write_str("paired"),
            Self::Single(side) => write!(f, "single ({side})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    /// Node feature names; their order is the column order of node matrices.
    pub node: Vec<String>,
    /// Edge feature names; their order is the column order of edge matrices.
    pub edge: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConjugateConfig {
    pub ph: f64,
    pub ignore_danger: bool,
}

impl ConjugateConfig {
    pub fn generator(&self) -> ProtonToggle {
        ProtonToggle::new(self.ph)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub features: FeatureConfig,
    pub output: OutputMode,
    pub conjugate: ConjugateConfig,
    /// Named input files, processed in name order.
    pub datasets: BTreeMap<String, PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig {
                node: DEFAULT_NODE_FEATURES.iter().map(|s| s.to_string()).collect(),
                edge: DEFAULT_EDGE_FEATURES.iter().map(|s| s.to_string()).collect(),
            },
            output: OutputMode::Paired,
            conjugate: ConjugateConfig {
                ph: ProtonToggle::PHYSIOLOGICAL_PH,
                ignore_danger: true,
            },
            datasets: BTreeMap::new(),
        }
    }
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    node_features: Option<Vec<String>>,
    edge_features: Option<Vec<String>>,
    output: Option<OutputMode>,
    ph: Option<f64>,
    ignore_danger: Option<bool>,
    datasets: BTreeMap<String, PathBuf>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_features<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.node_features = Some(names.into_iter().map(Into::into).collect());
        self
    }
    pub fn edge_features<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.edge_features = Some(names.into_iter().map(Into::into).collect());
        self
    }
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = Some(mode);
        self
    }
    pub fn ph(mut self, ph: f64) -> Self {
        self.ph = Some(ph);
        self
    }
    pub fn ignore_danger(mut self, ignore: bool) -> Self {
        self.ignore_danger = Some(ignore);
        self
    }
    pub fn dataset(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.datasets.insert(name.into(), path.into());
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let ph = self.ph.ok_or(ConfigError::MissingParameter("ph"))?;
        if !(0.0..=14.0).contains(&ph) {
            return Err(ConfigError::InvalidParameter {
                parameter: "ph",
                reason: format!("{ph} is outside 0..=14"),
            });
        }
        Ok(PipelineConfig {
            features: FeatureConfig {
                node: self
                    .node_features
                    .ok_or(ConfigError::MissingParameter("node_features"))?,
                edge: self
                    .edge_features
                    .ok_or(ConfigError::MissingParameter("edge_features"))?,
            },
            output: self.output.ok_or(ConfigError::MissingParameter("output"))?,
            conjugate: ConjugateConfig {
                ph,
                ignore_danger: self
                    .ignore_danger
                    .ok_or(ConfigError::MissingParameter("ignore_danger"))?,
            },
            datasets: self.datasets,
        })
    }
}
