use super::error::WorkflowError;
use crate::pipeline::config::{OutputMode, Side};
use crate::pipeline::sample::{GraphSample, Sample};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tracing::info;

/// One line of a dataset manifest: identifiers, targets and graph sizes of a sample.
///
/// Columns for a side that the sample does not contain are left empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub id: String,
    pub reference_value: Option<f32>,
    pub reaction_center: usize,
    pub protonated_nodes: Option<usize>,
    pub protonated_edges: Option<usize>,
    pub protonated_charge: Option<i32>,
    pub deprotonated_nodes: Option<usize>,
    pub deprotonated_edges: Option<usize>,
    pub deprotonated_charge: Option<i32>,
    pub state: String,
}

type SideColumns = (Option<usize>, Option<usize>, Option<i32>);

fn columns(graph: &GraphSample) -> SideColumns {
    (
        Some(graph.num_nodes()),
        Some(graph.num_edges()),
        Some(graph.charge),
    )
}

impl ManifestRecord {
    /// Summarizes a sample. `mode` tells which side a single-sided sample holds.
    pub fn new(sample: &Sample, mode: OutputMode) -> Self {
        let empty: SideColumns = (None, None, None);
        let (protonated, deprotonated) = match sample {
            Sample::Paired(paired) => (columns(&paired.protonated), columns(&paired.deprotonated)),
            Sample::Single(single) => match mode {
                OutputMode::Single(Side::Deprotonated) => (empty, columns(&single.graph)),
                _ => (columns(&single.graph), empty),
            },
        };

        Self {
            id: sample.id().to_string(),
            reference_value: sample.reference_value(),
            reaction_center: sample.reaction_center(),
            protonated_nodes: protonated.0,
            protonated_edges: protonated.1,
            protonated_charge: protonated.2,
            deprotonated_nodes: deprotonated.0,
            deprotonated_edges: deprotonated.1,
            deprotonated_charge: deprotonated.2,
            state: sample.state().to_string(),
        }
    }
}

/// Writes one CSV record per sample, with a header row. Returns the number of records.
///
/// # Errors
///
/// Returns [`WorkflowError::Manifest`] if serialization or the writer fails.
pub fn write_manifest<W: io::Write>(
    writer: W,
    samples: &[Sample],
    mode: OutputMode,
) -> Result<usize, WorkflowError> {
    let mut csv = csv::Writer::from_writer(writer);
    for sample in samples {
        csv.serialize(ManifestRecord::new(sample, mode))?;
    }
    csv.flush()?;
    Ok(samples.len())
}

/// Writes a manifest to `path`, replacing any existing file.
///
/// # Errors
///
/// See [`write_manifest`]; failing to create the file is a [`WorkflowError::Io`].
pub fn write_manifest_file(
    path: &Path,
    samples: &[Sample],
    mode: OutputMode,
) -> Result<usize, WorkflowError> {
    let file = std::fs::File::create(path)?;
    let written = write_manifest(io::BufWriter::new(file), samples, mode)?;
    info!(path = %path.display(), records = written, "Wrote manifest.");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::{DEFAULT_EDGE_FEATURES, DEFAULT_NODE_FEATURES, Vocabulary};
    use crate::pipeline::progress::ProgressReporter;
    use crate::workflows::dataset::{RowStatus, materialize};
    use crate::workflows::dataset::tests::rows;

    fn samples(mode: OutputMode) -> Vec<Sample> {
        let features = Vocabulary::standard()
            .feature_set(DEFAULT_NODE_FEATURES, DEFAULT_EDGE_FEATURES)
            .unwrap();
        materialize(&rows(), &features, mode, &ProgressReporter::new()).unwrap()
    }

    #[test]
    fn paired_manifest_lists_both_sides() {
        let mut buffer = Vec::new();
        let written = write_manifest(&mut buffer, &samples(OutputMode::Paired), OutputMode::Paired)
            .unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let records: Vec<ManifestRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "mol-1");
        assert_eq!(records[0].reference_value, Some(15.5));
        assert_eq!(records[0].protonated_nodes, Some(2));
        assert_eq!(records[0].deprotonated_edges, Some(2));
        assert_eq!(records[0].deprotonated_charge, Some(-1));
        assert_eq!(records[0].state, "resolved");
        assert_eq!(records[1].state, "ambiguous");
    }

    #[test]
    fn single_manifest_fills_only_the_modeled_side() {
        let mode = OutputMode::Single(Side::Deprotonated);
        let records: Vec<ManifestRecord> = samples(mode)
            .iter()
            .map(|s| ManifestRecord::new(s, mode))
            .collect();
        assert_eq!(records[0].protonated_nodes, None);
        assert_eq!(records[0].deprotonated_nodes, Some(2));
        assert_eq!(records[0].state, "resolved");
        assert_eq!(records[1].state, "ambiguous");
    }

    #[test]
    fn degraded_single_rows_are_marked_in_the_manifest() {
        let mut degraded = rows();
        degraded[0].status = RowStatus::Degraded("no rule".to_string());
        let mode = OutputMode::Single(Side::Protonated);
        let features = Vocabulary::standard()
            .feature_set(DEFAULT_NODE_FEATURES, DEFAULT_EDGE_FEATURES)
            .unwrap();
        let samples = materialize(&degraded, &features, mode, &ProgressReporter::new()).unwrap();

        let mut buffer = Vec::new();
        write_manifest(&mut buffer, &samples, mode).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let first = text.lines().nth(1).unwrap();
        assert!(first.starts_with("mol-1,"));
        assert!(first.ends_with(",ambiguous"));
    }

    #[test]
    fn manifest_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        write_manifest_file(&path, &samples(OutputMode::Paired), OutputMode::Paired).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,reference_value,reaction_center"));
        assert_eq!(content.lines().count(), 3);
    }
}
