use super::error::WorkflowError;
use crate::core::features::{FeatureSet, Vocabulary};
use crate::core::models::molecule::Molecule;
use crate::pipeline::config::{OutputMode, Side};
use crate::pipeline::conjugate::PairState;
use crate::pipeline::progress::{Progress, ProgressReporter};
use crate::pipeline::sample::{Sample, assemble_paired, assemble_single};
use std::fmt;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How a row's conjugate pair came about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowStatus {
    #[default]
    Resolved,
    /// Both structures carry the same charge at the reaction center.
    Ambiguous,
    /// Conjugate generation failed; both sides hold the original structure.
    Degraded(String),
}

impl RowStatus {
    pub fn pair_state(&self) -> PairState {
        match self {
            Self::Resolved => PairState::Resolved,
            Self::Ambiguous | Self::Degraded(_) => PairState::Ambiguous,
        }
    }

    pub fn is_resolved(&self) -> bool {
        *self == Self::Resolved
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved => f.write_str("resolved"),
            Self::Ambiguous => f.write_str("ambiguous"),
            Self::Degraded(reason) => write!(f, "degraded: {reason}"),
        }
    }
}

/// One ionizable site of a dataset with both protonation states already known.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub id: String,
    pub reaction_center: usize,
    pub protonated: Molecule,
    pub deprotonated: Molecule,
    /// The measured pKa.
    pub reference_value: f64,
    pub status: RowStatus,
}

/// Builds one sample per row, in row order.
///
/// Paired output keeps both protonation states; single output keeps the requested side only.
/// Every sample receives the row's pKa as `reference_value`, the row identifier and the row's
/// pair state. Rows are
/// processed in parallel when the `parallel` feature is enabled.
///
/// # Errors
///
/// Returns [`WorkflowError::RowGraph`] for the lowest-indexed row whose graphs cannot be built.
#[instrument(skip_all, name = "materialize_workflow")]
pub fn materialize(
    rows: &[DatasetRow],
    features: &FeatureSet,
    mode: OutputMode,
    reporter: &ProgressReporter,
) -> Result<Vec<Sample>, WorkflowError> {
    info!(
        rows = rows.len(),
        %mode,
        node_width = features.node_width(),
        edge_width = features.edge_width(),
        "Materializing samples."
    );
    let samples = reporter.phase("Featurization", || {
        reporter.report(Progress::TaskStart {
            total: rows.len() as u64,
        });

        #[cfg(not(feature = "parallel"))]
        let iterator = rows.iter().enumerate();

        #[cfg(feature = "parallel")]
        let iterator = rows.par_iter().enumerate();

        let results: Vec<Result<Sample, WorkflowError>> = iterator
            .map(|(index, row)| {
                let sample = materialize_row(index, row, features, mode);
                reporter.report(Progress::TaskIncrement);
                sample
            })
            .collect();

        reporter.report(Progress::TaskFinish);
        results.into_iter().collect::<Result<Vec<_>, _>>()
    })?;

    info!(samples = samples.len(), "Materialization finished.");
    Ok(samples)
}

/// Like [`materialize`], with the selection and output mode given by name.
///
/// # Errors
///
/// Fails with a configuration error for unknown or misplaced feature names, and for
/// `paired == false` combined with a `mode` other than `"protonated"` or `"deprotonated"`.
/// Row failures are reported as in [`materialize`].
pub fn materialize_by_name<N: AsRef<str>, E: AsRef<str>>(
    rows: &[DatasetRow],
    vocabulary: &Vocabulary,
    node_names: &[N],
    edge_names: &[E],
    paired: bool,
    mode: &str,
    reporter: &ProgressReporter,
) -> Result<Vec<Sample>, WorkflowError> {
    let mode = OutputMode::from_flags(paired, mode)?;
    let features = vocabulary.feature_set(node_names, edge_names)?;
    materialize(rows, &features, mode, reporter)
}

fn materialize_row(
    index: usize,
    row: &DatasetRow,
    features: &FeatureSet,
    mode: OutputMode,
) -> Result<Sample, WorkflowError> {
    let center = row.reaction_center;
    let built = match mode {
        OutputMode::Paired => assemble_paired(
            &row.protonated,
            &row.deprotonated,
            center,
            &features.node,
            &features.edge,
        )
        .map(|mut sample| {
            sample.state = row.status.pair_state();
            Sample::Paired(sample)
        }),
        OutputMode::Single(side) => {
            let molecule = match side {
                Side::Protonated => &row.protonated,
                Side::Deprotonated => &row.deprotonated,
            };
            assemble_single(molecule, center, &features.node, &features.edge).map(|mut sample| {
                sample.state = row.status.pair_state();
                Sample::Single(sample)
            })
        }
    };

    let mut sample = built.map_err(|source| WorkflowError::RowGraph {
        row: index,
        id: row.id.clone(),
        source,
    })?;
    sample.annotate(row.reference_value as f32, &row.id);
    Ok(sample)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::features::{DEFAULT_EDGE_FEATURES, DEFAULT_NODE_FEATURES};
    use crate::core::models::atom::Atom;
    use crate::core::models::bond::BondOrder;
    use crate::core::models::element::Element;
    use crate::core::models::molecule::MoleculeBuilder;
    use crate::pipeline::config::ConfigError;
    use crate::pipeline::error::GraphError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Methanol (index 1 is the hydroxyl oxygen) in the given state at the oxygen.
    pub(crate) fn methanol(charge: i8, hydrogens: u8) -> Molecule {
        let mut builder = MoleculeBuilder::new("methanol");
        let c = builder.push_atom(Atom::new(Element::CARBON).with_hydrogens(3));
        let o = builder.push_atom(
            Atom::new(Element::OXYGEN)
                .with_charge(charge)
                .with_hydrogens(hydrogens),
        );
        builder.add_bond(c, o, BondOrder::Single).unwrap();
        builder.build()
    }

    pub(crate) fn rows() -> Vec<DatasetRow> {
        vec![
            DatasetRow {
                id: "mol-1".to_string(),
                reaction_center: 1,
                protonated: methanol(0, 1),
                deprotonated: methanol(-1, 0),
                reference_value: 15.5,
                status: RowStatus::Resolved,
            },
            DatasetRow {
                id: "mol-2".to_string(),
                reaction_center: 1,
                protonated: methanol(1, 2),
                deprotonated: methanol(0, 1),
                reference_value: -2.2,
                status: RowStatus::Ambiguous,
            },
        ]
    }

    fn features() -> FeatureSet {
        Vocabulary::standard()
            .feature_set(DEFAULT_NODE_FEATURES, DEFAULT_EDGE_FEATURES)
            .unwrap()
    }

    #[test]
    fn single_mode_yields_one_sample_per_row_with_reference_values() {
        let samples = materialize_by_name(
            &rows(),
            &Vocabulary::standard(),
            DEFAULT_NODE_FEATURES,
            DEFAULT_EDGE_FEATURES,
            false,
            "protonated",
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].reference_value(), Some(15.5));
        assert_eq!(samples[1].reference_value(), Some(-2.2));
        assert_eq!(samples[0].id(), "mol-1");
        let single = samples[1].as_single().unwrap();
        assert_eq!(single.graph.charge, 1);
    }

    #[test]
    fn single_mode_keeps_the_row_state() {
        let mut degraded = rows();
        degraded[0].status = RowStatus::Degraded("no rule".to_string());
        degraded[0].deprotonated = degraded[0].protonated.clone();

        let samples = materialize(
            &degraded,
            &features(),
            OutputMode::Single(Side::Deprotonated),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(samples[0].as_single().unwrap().state, PairState::Ambiguous);
        assert_eq!(samples[1].as_single().unwrap().state, PairState::Ambiguous);

        let resolved = materialize(
            &rows()[..1],
            &features(),
            OutputMode::Single(Side::Protonated),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(resolved[0].as_single().unwrap().state, PairState::Resolved);
    }

    #[test]
    fn paired_mode_keeps_both_sides_and_row_status() {
        let samples = materialize(
            &rows(),
            &features(),
            OutputMode::Paired,
            &ProgressReporter::new(),
        )
        .unwrap();

        let first = samples[0].as_paired().unwrap();
        assert_eq!(first.protonated.charge, 0);
        assert_eq!(first.deprotonated.charge, -1);
        assert_eq!(first.state, PairState::Resolved);
        assert_eq!(samples[1].as_paired().unwrap().state, PairState::Ambiguous);
    }

    #[test]
    fn unpaired_output_with_unknown_mode_is_a_configuration_error() {
        let err = materialize_by_name(
            &rows(),
            &Vocabulary::standard(),
            DEFAULT_NODE_FEATURES,
            DEFAULT_EDGE_FEATURES,
            false,
            "all",
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Config(ConfigError::InvalidMode(ref mode)) if mode == "all"
        ));
    }

    #[test]
    fn mixed_selection_is_a_configuration_error() {
        let err = materialize_by_name(
            &rows(),
            &Vocabulary::standard(),
            &["element", "bond_type"],
            DEFAULT_EDGE_FEATURES,
            true,
            "",
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Features(_)));
    }

    #[test]
    fn first_failing_row_is_reported() {
        let mut rows = rows();
        rows.push(rows[0].clone());
        rows[1].reaction_center = 7;
        rows[2].reaction_center = 9;

        let err = materialize(&rows, &features(), OutputMode::Paired, &ProgressReporter::new())
            .unwrap_err();

        match err {
            WorkflowError::RowGraph { row, id, source } => {
                assert_eq!(row, 1);
                assert_eq!(id, "mol-2");
                assert!(matches!(
                    source,
                    GraphError::ReactionCenterOutOfRange { index: 7, .. }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn progress_counts_every_row() {
        let increments = AtomicUsize::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if event == Progress::TaskIncrement {
                increments.fetch_add(1, Ordering::Relaxed);
            }
        }));

        materialize(&rows(), &features(), OutputMode::Paired, &reporter).unwrap();

        assert_eq!(increments.load(Ordering::Relaxed), 2);
    }
}
