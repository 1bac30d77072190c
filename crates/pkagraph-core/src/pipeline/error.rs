use crate::core::features::FeatureError;
use thiserror::Error;

/// A failure while turning a molecule into graph matrices.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node feature '{feature}' failed for atom {atom}: {source}")]
    NodeFeature {
        feature: String,
        atom: usize,
        #[source]
        source: FeatureError,
    },

    #[error("Edge feature '{feature}' failed for bond {bond}: {source}")]
    EdgeFeature {
        feature: String,
        bond: usize,
        #[source]
        source: FeatureError,
    },

    #[error("Reaction center {index} is out of range for a molecule with {atom_count} atoms")]
    ReactionCenterOutOfRange { index: usize, atom_count: usize },

    #[error("{matrix} width mismatch: expected {expected} columns, found {found}")]
    WidthMismatch {
        matrix: &'static str,
        expected: usize,
        found: usize,
    },
}
