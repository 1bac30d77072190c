use super::sample::{GraphSample, PairedSample};
use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("Cannot collate an empty list of samples")]
    Empty,

    #[error("Sample {sample}: {matrix} has {found} columns, expected {expected}")]
    WidthMismatch {
        sample: usize,
        matrix: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Sample {sample} has no reference value")]
    MissingReference { sample: usize },
}

/// Several graphs concatenated into one disconnected graph.
///
/// Node rows are stacked in sample order and every `edge_index` entry is shifted by the number
/// of nodes of all preceding graphs. `batch[n]` is the sample that node `n` belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphBatch {
    pub x: DMatrix<f32>,
    pub edge_index: DMatrix<i64>,
    pub edge_attr: DMatrix<f32>,
    pub batch: Vec<usize>,
    pub charge: Vec<i32>,
}

impl GraphBatch {
    /// Concatenates graphs, offsetting each graph's edges by the nodes seen so far.
    ///
    /// # Errors
    ///
    /// Fails on an empty input and when node or edge widths differ between graphs.
    pub fn collate<'a, I>(graphs: I) -> Result<Self, BatchError>
    where
        I: IntoIterator<Item = &'a GraphSample>,
    {
        let graphs: Vec<&GraphSample> = graphs.into_iter().collect();
        let first = graphs.first().ok_or(BatchError::Empty)?;
        let node_width = first.x.ncols();
        let edge_width = first.edge_attr.ncols();

        let total_nodes: usize = graphs.iter().map(|g| g.num_nodes()).sum();
        let total_edges: usize = graphs.iter().map(|g| g.num_edges()).sum();

        let mut x = Vec::with_capacity(total_nodes * node_width);
        let mut edge_attr = Vec::with_capacity(total_edges * edge_width);
        let mut sources = Vec::with_capacity(total_edges);
        let mut targets = Vec::with_capacity(total_edges);
        let mut batch = Vec::with_capacity(total_nodes);
        let mut charge = Vec::with_capacity(graphs.len());

        let mut offset = 0i64;
        for (sample, graph) in graphs.iter().enumerate() {
            check_width(sample, "node features", node_width, graph.x.ncols())?;
            check_width(sample, "edge features", edge_width, graph.edge_attr.ncols())?;

            extend_rows(&mut x, &graph.x);
            extend_rows(&mut edge_attr, &graph.edge_attr);
            sources.extend(graph.edge_index.row(0).iter().map(|&i| i + offset));
            targets.extend(graph.edge_index.row(1).iter().map(|&i| i + offset));
            batch.extend(std::iter::repeat_n(sample, graph.num_nodes()));
            charge.push(graph.charge);

            offset += graph.num_nodes() as i64;
        }

        sources.extend(targets);
        Ok(Self {
            x: DMatrix::from_row_slice(total_nodes, node_width, &x),
            edge_index: DMatrix::from_row_slice(2, total_edges, &sources),
            edge_attr: DMatrix::from_row_slice(total_edges, edge_width, &edge_attr),
            batch,
            charge,
        })
    }

    pub fn num_graphs(&self) -> usize {
        self.charge.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.x.nrows()
    }
}

/// A batch of paired samples.
///
/// The protonated and deprotonated sides are collated independently, each with its own node
/// offset, so their edge indices never refer to nodes of the other side.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedBatch {
    pub protonated: GraphBatch,
    pub deprotonated: GraphBatch,
    /// Reaction center of each sample, local to its own graph.
    pub reaction_center: Vec<usize>,
    pub reference_value: Vec<f32>,
    pub id: Vec<String>,
}

impl PairedBatch {
    /// # Errors
    ///
    /// Fails if the batch is empty, if widths differ between samples, or if a sample has no
    /// reference value.
    pub fn collate(samples: &[PairedSample]) -> Result<Self, BatchError> {
        let reference_value = samples
            .iter()
            .enumerate()
            .map(|(sample, s)| {
                s.reference_value
                    .ok_or(BatchError::MissingReference { sample })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            protonated: GraphBatch::collate(samples.iter().map(|s| &s.protonated))?,
            deprotonated: GraphBatch::collate(samples.iter().map(|s| &s.deprotonated))?,
            reaction_center: samples.iter().map(|s| s.reaction_center).collect(),
            reference_value,
            id: samples.iter().map(|s| s.id.clone()).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

fn check_width(
    sample: usize,
    matrix: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), BatchError> {
    if expected == found {
        Ok(())
    } else {
        Err(BatchError::WidthMismatch {
            sample,
            matrix,
            expected,
            found,
        })
    }
}

fn extend_rows(out: &mut Vec<f32>, matrix: &DMatrix<f32>) {
    for row in matrix.row_iter() {
        out.extend(row.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::conjugate::PairState;

    fn graph(nodes: usize, edges: &[(i64, i64)], charge: i32) -> GraphSample {
        let x = DMatrix::from_fn(nodes, 2, |r, c| (r * 2 + c) as f32);
        let mut index = Vec::new();
        index.extend(edges.iter().map(|e| e.0));
        index.extend(edges.iter().map(|e| e.1));
        GraphSample {
            x,
            edge_index: DMatrix::from_row_slice(2, edges.len(), &index),
            edge_attr: DMatrix::from_element(edges.len(), 1, 1.0),
            charge,
        }
    }

    fn paired(prot_nodes: usize, deprot_nodes: usize, value: Option<f32>) -> PairedSample {
        PairedSample {
            protonated: graph(prot_nodes, &[(0, 1), (1, 0)], 0),
            deprotonated: graph(deprot_nodes, &[(0, 1), (1, 0)], -1),
            reaction_center: 0,
            reference_value: value,
            id: format!("{prot_nodes}/{deprot_nodes}"),
            reaction_type: String::new(),
            state: PairState::Resolved,
        }
    }

    #[test]
    fn edges_are_offset_by_preceding_node_counts() {
        let a = graph(2, &[(0, 1), (1, 0)], 0);
        let b = graph(3, &[(1, 2), (2, 1)], 1);

        let batch = GraphBatch::collate([&a, &b]).unwrap();

        assert_eq!(batch.num_nodes(), 5);
        assert_eq!(batch.num_graphs(), 2);
        assert_eq!(
            batch.edge_index,
            DMatrix::from_row_slice(2, 4, &[0, 1, 3, 4, 1, 0, 4, 3])
        );
        assert_eq!(batch.batch, vec![0, 0, 1, 1, 1]);
        assert_eq!(batch.charge, vec![0, 1]);
        assert_eq!(batch.x.row(2), b.x.row(0));
    }

    #[test]
    fn paired_sides_use_independent_offsets() {
        let samples = [paired(2, 3, Some(4.0)), paired(4, 2, Some(9.5))];

        let batch = PairedBatch::collate(&samples).unwrap();

        assert_eq!(batch.protonated.edge_index[(0, 2)], 2);
        assert_eq!(batch.deprotonated.edge_index[(0, 2)], 3);
        assert_eq!(batch.protonated.batch, vec![0, 0, 1, 1, 1, 1]);
        assert_eq!(batch.deprotonated.batch, vec![0, 0, 0, 1, 1]);
        assert_eq!(batch.reference_value, vec![4.0, 9.5]);
        assert_eq!(batch.id, vec!["2/3".to_string(), "4/2".to_string()]);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn collation_rejects_empty_and_inconsistent_input() {
        assert_eq!(
            GraphBatch::collate(std::iter::empty::<&GraphSample>()),
            Err(BatchError::Empty)
        );

        let narrow = graph(2, &[], 0);
        let mut wide = graph(2, &[], 0);
        wide.x = DMatrix::zeros(2, 3);
        assert_eq!(
            GraphBatch::collate([&narrow, &wide]).unwrap_err(),
            BatchError::WidthMismatch {
                sample: 1,
                matrix: "node features",
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn paired_batch_requires_reference_values() {
        let samples = [paired(2, 2, Some(1.0)), paired(2, 2, None)];
        assert_eq!(
            PairedBatch::collate(&samples).unwrap_err(),
            BatchError::MissingReference { sample: 1 }
        );
    }
}
