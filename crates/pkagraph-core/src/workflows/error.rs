use crate::core::features::FeatureConfigError;
use crate::core::io::sdf::SdfError;
use crate::pipeline::config::ConfigError;
use crate::pipeline::conjugate::{ConjugateError, ResolveError};
use crate::pipeline::error::GraphError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid feature selection: {0}")]
    Features(#[from] FeatureConfigError),

    #[error("Molecule {molecule} has no '{property}' property")]
    MissingProperty { property: String, molecule: String },

    #[error("Property '{property}' of molecule {molecule} has an unusable value '{value}'")]
    InvalidProperty {
        property: String,
        value: String,
        molecule: String,
    },

    #[error("Could not create the conjugate of molecule {molecule}: {source}")]
    Conjugate {
        molecule: String,
        #[source]
        source: ConjugateError,
    },

    #[error("Could not assign protonation roles for molecule {molecule}: {source}")]
    Resolve {
        molecule: String,
        #[source]
        source: ResolveError,
    },

    #[error("Failed to build graphs for row {row} ('{id}'): {source}")]
    RowGraph {
        row: usize,
        id: String,
        #[source]
        source: GraphError,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Failed to read '{path}': {source}", path = path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: SdfError,
    },

    #[error("Cannot split {items} items into {folds} folds")]
    InvalidFoldCount { folds: usize, items: usize },

    #[error("Fold {index} does not exist, there are {folds} folds")]
    FoldOutOfRange { index: usize, folds: usize },

    #[error("Failed to write manifest: {0}")]
    Manifest(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
