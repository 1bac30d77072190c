//! Named node and edge features and their one-hot encodings.
//!
//! A [`vocabulary::Vocabulary`] maps feature names to an encoder and a [`domain::ValueDomain`].
//! The domain fixes how many columns the feature occupies, so the width of a selection is known
//! before any molecule is seen. Selections keep the order in which features were named, and that
//! order is the column order of every matrix built from them.

pub mod domain;
pub mod standard;
pub mod vocabulary;

pub use domain::{FeatureError, FeatureValue, ValueDomain};
pub use standard::{DEFAULT_EDGE_FEATURES, DEFAULT_NODE_FEATURES};
pub use vocabulary::{
    AtomFeature, AtomView, BondFeature, BondView, EdgeSelection, FeatureConfigError, FeatureKind,
    FeatureSet, NodeSelection, Vocabulary,
};
