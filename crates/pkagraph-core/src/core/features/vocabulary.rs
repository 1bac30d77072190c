use super::domain::{FeatureError, FeatureValue, ValueDomain};
use crate::core::models::atom::Atom;
use crate::core::models::bond::Bond;
use crate::core::models::molecule::Molecule;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Whether a feature describes atoms (graph nodes) or bonds (graph edges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Node,
    Edge,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Edge => "edge",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeatureConfigError {
    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),
    #[error("Feature '{name}' is a {found} feature, but a {expected} feature was requested")]
    WrongKind {
        name: String,
        expected: FeatureKind,
        found: FeatureKind,
    },
    #[error("Selection mixes node feature '{node}' with edge feature '{edge}'")]
    MixedSelection { node: String, edge: String },
    #[error("Feature '{0}' is selected more than once")]
    DuplicateSelection(String),
    #[error("Feature '{name}' is already registered as a {kind} feature")]
    AlreadyRegistered { name: String, kind: FeatureKind },
}

/// The context handed to every node feature: the atom's molecule, its index and the index of
/// the reaction center of the sample being built.
///
/// `center_distances` holds the topological distance of every atom from the reaction center
/// (`None` for other fragments); it is computed once per molecule and shared by all views.
#[derive(Debug, Clone, Copy)]
pub struct AtomView<'a> {
    pub molecule: &'a Molecule,
    pub index: usize,
    pub reaction_center: usize,
    pub center_distances: &'a [Option<usize>],
}

impl<'a> AtomView<'a> {
    /// The atom itself. Views are only created for valid indices.
    pub fn atom(&self) -> &'a Atom {
        &self.molecule.atoms()[self.index]
    }

    pub fn is_reaction_center(&self) -> bool {
        self.index == self.reaction_center
    }

    pub fn distance_to_center(&self) -> Option<usize> {
        self.center_distances.get(self.index).copied().flatten()
    }
}

/// The context handed to every edge feature.
#[derive(Debug, Clone, Copy)]
pub struct BondView<'a> {
    pub molecule: &'a Molecule,
    pub index: usize,
}

impl<'a> BondView<'a> {
    /// The bond itself. Views are only created for valid indices.
    pub fn bond(&self) -> &'a Bond {
        &self.molecule.bonds()[self.index]
    }
}

/// Computes a raw value for one atom.
pub trait AtomFeature: Send + Sync {
    fn compute(&self, atom: &AtomView<'_>) -> Result<FeatureValue, FeatureError>;
}

/// Computes a raw value for one bond. Bonds are undirected: the value must not depend on
/// which atom is the begin atom.
pub trait BondFeature: Send + Sync {
    fn compute(&self, bond: &BondView<'_>) -> Result<FeatureValue, FeatureError>;
}

impl<F> AtomFeature for F
where
    F: Fn(&AtomView<'_>) -> Result<FeatureValue, FeatureError> + Send + Sync,
{
    fn compute(&self, atom: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
        self(atom)
    }
}

impl<F> BondFeature for F
where
    F: Fn(&BondView<'_>) -> Result<FeatureValue, FeatureError> + Send + Sync,
{
    fn compute(&self, bond: &BondView<'_>) -> Result<FeatureValue, FeatureError> {
        self(bond)
    }
}

/// A named feature: its encoder and the value domain fixing its width.
pub struct FeatureEntry<F: ?Sized> {
    name: String,
    domain: ValueDomain,
    encoder: Arc<F>,
}

impl<F: ?Sized> FeatureEntry<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    pub fn encoder(&self) -> &F {
        &self.encoder
    }

    pub fn width(&self) -> usize {
        self.domain.width()
    }
}

impl<F: ?Sized> Clone for FeatureEntry<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            domain: self.domain.clone(),
            encoder: Arc::clone(&self.encoder),
        }
    }
}

impl<F: ?Sized> fmt::Debug for FeatureEntry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureEntry")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

pub type NodeFeatureEntry = FeatureEntry<dyn AtomFeature>;
pub type EdgeFeatureEntry = FeatureEntry<dyn BondFeature>;

/// An ordered subset of a vocabulary. Column order of encoded vectors is the selection order.
pub struct Selection<F: ?Sized> {
    entries: Vec<FeatureEntry<F>>,
}

impl<F: ?Sized> Selection<F> {
    /// Total encoded width: the sum of each selected feature's domain size.
    pub fn width(&self) -> usize {
        self.entries.iter().map(FeatureEntry::width).sum()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(FeatureEntry::name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureEntry<F>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: ?Sized> Clone for Selection<F> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Selection<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

pub type NodeSelection = Selection<dyn AtomFeature>;
pub type EdgeSelection = Selection<dyn BondFeature>;

/// The node and edge selections applied to every molecule of a dataset.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub node: NodeSelection,
    pub edge: EdgeSelection,
}

impl FeatureSet {
    pub fn node_width(&self) -> usize {
        self.node.width()
    }

    pub fn edge_width(&self) -> usize {
        self.edge.width()
    }
}

/// A registry of named node and edge features.
///
/// Every name is registered in exactly one of the two namespaces.
#[derive(Clone, Default)]
pub struct Vocabulary {
    node: HashMap<String, NodeFeatureEntry>,
    edge: HashMap<String, EdgeFeatureEntry>,
}

impl Vocabulary {
    /// Creates an empty vocabulary. See [`Vocabulary::standard`] for the built-in features.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node feature.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureConfigError::AlreadyRegistered`] if the name is taken in either namespace.
    pub fn register_node(
        &mut self,
        name: &str,
        domain: ValueDomain,
        encoder: impl AtomFeature + 'static,
    ) -> Result<(), FeatureConfigError> {
        self.ensure_unregistered(name)?;
        self.insert_node(name, domain, encoder);
        Ok(())
    }

    /// Registers an edge feature.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureConfigError::AlreadyRegistered`] if the name is taken in either namespace.
    pub fn register_edge(
        &mut self,
        name: &str,
        domain: ValueDomain,
        encoder: impl BondFeature + 'static,
    ) -> Result<(), FeatureConfigError> {
        self.ensure_unregistered(name)?;
        self.insert_edge(name, domain, encoder);
        Ok(())
    }

    pub(super) fn insert_node(
        &mut self,
        name: &str,
        domain: ValueDomain,
        encoder: impl AtomFeature + 'static,
    ) {
        self.node.insert(
            name.to_string(),
            FeatureEntry {
                name: name.to_string(),
                domain,
                encoder: Arc::new(encoder),
            },
        );
    }

    pub(super) fn insert_edge(
        &mut self,
        name: &str,
        domain: ValueDomain,
        encoder: impl BondFeature + 'static,
    ) {
        self.edge.insert(
            name.to_string(),
            FeatureEntry {
                name: name.to_string(),
                domain,
                encoder: Arc::new(encoder),
            },
        );
    }

    fn ensure_unregistered(&self, name: &str) -> Result<(), FeatureConfigError> {
        match self.kind_of(name) {
            Some(kind) => Err(FeatureConfigError::AlreadyRegistered {
                name: name.to_string(),
                kind,
            }),
            None => Ok(()),
        }
    }

    pub fn kind_of(&self, name: &str) -> Option<FeatureKind> {
        if self.node.contains_key(name) {
            Some(FeatureKind::Node)
        } else if self.edge.contains_key(name) {
            Some(FeatureKind::Edge)
        } else {
            None
        }
    }

    pub fn node_entry(&self, name: &str) -> Option<&NodeFeatureEntry> {
        self.node.get(name)
    }

    pub fn edge_entry(&self, name: &str) -> Option<&EdgeFeatureEntry> {
        self.edge.get(name)
    }

    /// Registered node feature names, sorted.
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.node.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered edge feature names, sorted.
    pub fn edge_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.edge.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Width of the feature vector produced by `selection`.
    ///
    /// The selection must consist only of node features or only of edge features. An empty
    /// selection has width 0.
    ///
    /// # Errors
    ///
    /// Fails on unknown names, on a selection mixing node and edge features, and on duplicates.
    pub fn feature_width<S: AsRef<str>>(&self, selection: &[S]) -> Result<usize, FeatureConfigError> {
        check_duplicates(selection)?;

        let mut first_node: Option<&str> = None;
        let mut first_edge: Option<&str> = None;
        let mut width = 0;
        for name in selection.iter().map(AsRef::as_ref) {
            if let Some(entry) = self.node.get(name) {
                first_node.get_or_insert(name);
                width += entry.width();
            } else if let Some(entry) = self.edge.get(name) {
                first_edge.get_or_insert(name);
                width += entry.width();
            } else {
                return Err(FeatureConfigError::UnknownFeature(name.to_string()));
            }
        }

        if let (Some(node), Some(edge)) = (first_node, first_edge) {
            return Err(FeatureConfigError::MixedSelection {
                node: node.to_string(),
                edge: edge.to_string(),
            });
        }
        Ok(width)
    }

    /// Selects node features by name, preserving the order of `names`.
    ///
    /// # Errors
    ///
    /// Fails on unknown names, edge feature names and duplicates.
    pub fn select_node_features<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<NodeSelection, FeatureConfigError> {
        check_duplicates(names)?;
        let entries = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.node
                    .get(name)
                    .cloned()
                    .ok_or_else(|| self.lookup_error(name, FeatureKind::Node))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection { entries })
    }

    /// Selects edge features by name, preserving the order of `names`.
    ///
    /// # Errors
    ///
    /// Fails on unknown names, node feature names and duplicates.
    pub fn select_edge_features<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<EdgeSelection, FeatureConfigError> {
        check_duplicates(names)?;
        let entries = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.edge
                    .get(name)
                    .cloned()
                    .ok_or_else(|| self.lookup_error(name, FeatureKind::Edge))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection { entries })
    }

    /// Selects node and edge features in one step.
    ///
    /// # Errors
    ///
    /// Fails if either selection is invalid.
    pub fn feature_set<N: AsRef<str>, E: AsRef<str>>(
        &self,
        node: &[N],
        edge: &[E],
    ) -> Result<FeatureSet, FeatureConfigError> {
        Ok(FeatureSet {
            node: self.select_node_features(node)?,
            edge: self.select_edge_features(edge)?,
        })
    }

    fn lookup_error(&self, name: &str, expected: FeatureKind) -> FeatureConfigError {
        match self.kind_of(name) {
            Some(found) => FeatureConfigError::WrongKind {
                name: name.to_string(),
                expected,
                found,
            },
            None => FeatureConfigError::UnknownFeature(name.to_string()),
        }
    }
}

impl fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vocabulary")
            .field("node", &self.node_names())
            .field("edge", &self.edge_names())
            .finish()
    }
}

fn check_duplicates<S: AsRef<str>>(names: &[S]) -> Result<(), FeatureConfigError> {
    let mut seen = HashSet::new();
    for name in names.iter().map(AsRef::as_ref) {
        if !seen.insert(name) {
            return Err(FeatureConfigError::DuplicateSelection(name.to_string()));
        }
    }
    Ok(())
}
