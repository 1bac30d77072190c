use super::conjugate::PairState;
use super::error::GraphError;
use super::graph::{build_edges, build_nodes};
use crate::core::features::{EdgeSelection, NodeSelection};
use crate::core::models::molecule::Molecule;
use nalgebra::DMatrix;

/// The graph of one protonation state.
///
/// `edge_index` holds 0-based atom indices local to this graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSample {
    /// Node features, `num_nodes × node_width`.
    pub x: DMatrix<f32>,
    /// Directed connectivity, `2 × num_edges`.
    pub edge_index: DMatrix<i64>,
    /// Edge features, `num_edges × edge_width`.
    pub edge_attr: DMatrix<f32>,
    /// Net formal charge of the molecule.
    pub charge: i32,
}

impl GraphSample {
    pub fn num_nodes(&self) -> usize {
        self.x.nrows()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_index.ncols()
    }
}

/// Both protonation states of one ionizable site.
///
/// The two graphs keep separate index spaces; each side's `edge_index` refers to its own nodes.
/// The reaction center is the same atom index on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedSample {
    pub protonated: GraphSample,
    pub deprotonated: GraphSample,
    pub reaction_center: usize,
    /// Regression target, usually the measured pKa.
    pub reference_value: Option<f32>,
    pub id: String,
    /// Free-form label for the kind of ionization, empty when unknown.
    pub reaction_type: String,
    pub state: PairState,
}

/// A single protonation state used on its own.
///
/// `state` is the state of the pair the structure was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleSample {
    pub graph: GraphSample,
    pub reaction_center: usize,
    pub reference_value: Option<f32>,
    pub id: String,
    pub state: PairState,
}

/// One entry of a materialized dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Paired(PairedSample),
    Single(SingleSample),
}

impl Sample {
    pub fn id(&self) -> &str {
        match self {
            Self::Paired(sample) => &sample.id,
            Self::Single(sample) => &sample.id,
        }
    }

    pub fn reference_value(&self) -> Option<f32> {
        match self {
            Self::Paired(sample) => sample.reference_value,
            Self::Single(sample) => sample.reference_value,
        }
    }

    pub fn state(&self) -> PairState {
        match self {
            Self::Paired(sample) => sample.state,
            Self::Single(sample) => sample.state,
        }
    }

    pub fn reaction_center(&self) -> usize {
        match self {
            Self::Paired(sample) => sample.reaction_center,
            Self::Single(sample) => sample.reaction_center,
        }
    }

    /// Attaches the target and identifier after the graphs have been built.
    pub fn annotate(&mut self, reference_value: f32, id: &str) {
        let (target, name) = match self {
            Self::Paired(sample) => (&mut sample.reference_value, &mut sample.id),
            Self::Single(sample) => (&mut sample.reference_value, &mut sample.id),
        };
        *target = Some(reference_value);
        *name = id.to_string();
    }

    pub fn as_paired(&self) -> Option<&PairedSample> {
        match self {
            Self::Paired(sample) => Some(sample),
            Self::Single(_) => None,
        }
    }

    pub fn as_single(&self) -> Option<&SingleSample> {
        match self {
            Self::Single(sample) => Some(sample),
            Self::Paired(_) => None,
        }
    }
}

/// Builds the graph of one molecule: nodes, edges and net charge.
///
/// # Errors
///
/// Propagates any [`GraphError`] from the node or edge builder.
pub fn build_graph(
    molecule: &Molecule,
    reaction_center: usize,
    node_selection: &NodeSelection,
    edge_selection: &EdgeSelection,
) -> Result<GraphSample, GraphError> {
    let x = build_nodes(molecule, reaction_center, node_selection)?;
    let (edge_index, edge_attr) = build_edges(molecule, edge_selection)?;
    Ok(GraphSample {
        x,
        edge_index,
        edge_attr,
        charge: molecule.net_charge(),
    })
}

/// Builds both sides of a conjugate pair with the same feature selections.
///
/// The sample starts without target or identifier and in the [`PairState::Resolved`] state.
///
/// # Errors
///
/// Propagates graph construction failures of either side, and reports
/// [`GraphError::WidthMismatch`] if the two node matrices disagree in width.
pub fn assemble_paired(
    protonated: &Molecule,
    deprotonated: &Molecule,
    reaction_center: usize,
    node_selection: &NodeSelection,
    edge_selection: &EdgeSelection,
) -> Result<PairedSample, GraphError> {
    let protonated = build_graph(protonated, reaction_center, node_selection, edge_selection)?;
    let deprotonated = build_graph(deprotonated, reaction_center, node_selection, edge_selection)?;

    if protonated.x.ncols() != deprotonated.x.ncols() {
        return Err(GraphError::WidthMismatch {
            matrix: "Node feature",
            expected: protonated.x.ncols(),
            found: deprotonated.x.ncols(),
        });
    }

    Ok(PairedSample {
        protonated,
        deprotonated,
        reaction_center,
        reference_value: None,
        id: String::new(),
        reaction_type: String::new(),
        state: PairState::Resolved,
    })
}

/// Builds a single protonation state as a standalone sample, in the
/// [`PairState::Resolved`] state.
///
/// # Errors
///
/// Propagates graph construction failures.
pub fn assemble_single(
    molecule: &Molecule,
    reaction_center: usize,
    node_selection: &NodeSelection,
    edge_selection: &EdgeSelection,
) -> Result<SingleSample, GraphError> {
    Ok(SingleSample {
        graph: build_graph(molecule, reaction_center, node_selection, edge_selection)?,
        reaction_center,
        reference_value: None,
        id: String::new(),
        state: PairState::Resolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::{DEFAULT_EDGE_FEATURES, DEFAULT_NODE_FEATURES, FeatureSet, Vocabulary};
    use crate::core::models::bond::BondOrder;
    use crate::core::models::element::Element;
    use crate::core::models::molecule::MoleculeBuilder;

    fn features() -> FeatureSet {
        Vocabulary::standard()
            .feature_set(DEFAULT_NODE_FEATURES, DEFAULT_EDGE_FEATURES)
            .unwrap()
    }

    fn hydroxide_pair() -> (Molecule, Molecule) {
        let build = |charge: i8, hydrogens: u8| {
            let mut builder = MoleculeBuilder::new("co");
            let c = builder.add_atom(Element::CARBON);
            let o = builder.add_atom(Element::OXYGEN);
            builder.atom_mut(c).unwrap().hydrogens = 3;
            let oxygen = builder.atom_mut(o).unwrap();
            oxygen.formal_charge = charge;
            oxygen.hydrogens = hydrogens;
            builder.add_bond(c, o, BondOrder::Single).unwrap();
            builder.build()
        };
        (build(0, 1), build(-1, 0))
    }

    #[test]
    fn paired_sample_keeps_local_index_spaces_and_net_charges() {
        let features = features();
        let (acid, base) = hydroxide_pair();

        let sample = assemble_paired(&acid, &base, 1, &features.node, &features.edge).unwrap();

        assert_eq!(sample.protonated.num_nodes(), 2);
        assert_eq!(sample.deprotonated.num_nodes(), 2);
        assert_eq!(sample.protonated.edge_index, DMatrix::from_row_slice(2, 2, &[0, 1, 1, 0]));
        assert_eq!(sample.deprotonated.edge_index, sample.protonated.edge_index);
        assert_eq!(sample.protonated.charge, 0);
        assert_eq!(sample.deprotonated.charge, -1);
        assert_eq!(sample.reaction_center, 1);
        assert_eq!(sample.reference_value, None);
        assert_eq!(sample.state, PairState::Resolved);
    }

    #[test]
    fn assembling_twice_gives_identical_matrices() {
        let features = features();
        let (acid, base) = hydroxide_pair();

        let first = assemble_paired(&acid, &base, 1, &features.node, &features.edge).unwrap();
        let second = assemble_paired(&acid, &base, 1, &features.node, &features.edge).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn single_sample_matches_the_corresponding_paired_side() {
        let features = features();
        let (acid, base) = hydroxide_pair();

        let paired = assemble_paired(&acid, &base, 1, &features.node, &features.edge).unwrap();
        let single = assemble_single(&base, 1, &features.node, &features.edge).unwrap();

        assert_eq!(single.graph, paired.deprotonated);
        assert_eq!(single.graph.charge, -1);
        assert_eq!(single.state, PairState::Resolved);
    }

    #[test]
    fn annotate_attaches_target_and_identifier() {
        let features = features();
        let (acid, _) = hydroxide_pair();
        let mut sample = Sample::Single(
            assemble_single(&acid, 1, &features.node, &features.edge).unwrap(),
        );

        sample.annotate(15.5, "methanol");

        assert_eq!(sample.reference_value(), Some(15.5));
        assert_eq!(sample.id(), "methanol");
        assert_eq!(sample.reaction_center(), 1);
        assert!(sample.as_paired().is_none());
    }
}
