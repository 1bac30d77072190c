use super::error::GraphError;
use crate::core::chem::perception;
use crate::core::features::{AtomView, BondView, EdgeSelection, NodeSelection};
use crate::core::models::molecule::Molecule;
use nalgebra::DMatrix;

/// Builds the node-feature matrix of a molecule.
///
/// Row `i` describes atom `i` in the molecule's native order; its columns are the encodings of
/// the selected features, in selection order. Every feature sees the reaction center.
///
/// # Errors
///
/// Returns [`GraphError::ReactionCenterOutOfRange`] if `reaction_center` is not an atom of the
/// molecule, and [`GraphError::NodeFeature`] for the first atom whose feature cannot be computed
/// or encoded.
pub fn build_nodes(
    molecule: &Molecule,
    reaction_center: usize,
    selection: &NodeSelection,
) -> Result<DMatrix<f32>, GraphError> {
    let atom_count = molecule.num_atoms();
    if reaction_center >= atom_count {
        return Err(GraphError::ReactionCenterOutOfRange {
            index: reaction_center,
            atom_count,
        });
    }

    let center_distances = perception::topological_distances(molecule, reaction_center);
    let width = selection.width();
    let mut data = Vec::with_capacity(atom_count * width);
    for index in 0..atom_count {
        let view = AtomView {
            molecule,
            index,
            reaction_center,
            center_distances: &center_distances,
        };
        for entry in selection.iter() {
            entry
                .encoder()
                .compute(&view)
                .and_then(|value| entry.domain().encode(value, &mut data))
                .map_err(|source| GraphError::NodeFeature {
                    feature: entry.name().to_string(),
                    atom: index,
                    source,
                })?;
        }
    }

    Ok(DMatrix::from_row_slice(atom_count, width, &data))
}

/// Builds the connectivity and edge-feature matrices of a molecule.
///
/// Bond `k` contributes directed edges `2k` (begin to end) and `2k + 1` (end to begin). Both
/// directions carry the same feature row. The returned `edge_index` has shape
/// `2 × 2·num_bonds` and `edge_attr` has shape `2·num_bonds × width`.
///
/// # Errors
///
/// Returns [`GraphError::EdgeFeature`] for the first bond whose feature cannot be computed or
/// encoded.
pub fn build_edges(
    molecule: &Molecule,
    selection: &EdgeSelection,
) -> Result<(DMatrix<i64>, DMatrix<f32>), GraphError> {
    let bond_count = molecule.num_bonds();
    let width = selection.width();

    let mut sources = Vec::with_capacity(2 * bond_count);
    let mut targets = Vec::with_capacity(2 * bond_count);
    let mut attributes = Vec::with_capacity(2 * bond_count * width);
    let mut row = Vec::with_capacity(width);

    for (index, bond) in molecule.bonds().iter().enumerate() {
        let view = BondView { molecule, index };
        row.clear();
        for entry in selection.iter() {
            entry
                .encoder()
                .compute(&view)
                .and_then(|value| entry.domain().encode(value, &mut row))
                .map_err(|source| GraphError::EdgeFeature {
                    feature: entry.name().to_string(),
                    bond: index,
                    source,
                })?;
        }

        sources.extend([bond.begin as i64, bond.end as i64]);
        targets.extend([bond.end as i64, bond.begin as i64]);
        attributes.extend_from_slice(&row);
        attributes.extend_from_slice(&row);
    }

    let edge_count = sources.len();
    sources.extend(targets);
    let edge_index = DMatrix::from_row_slice(2, edge_count, &sources);
    let edge_attr = DMatrix::from_row_slice(edge_count, width, &attributes);
    Ok((edge_index, edge_attr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::valence::assign_implicit_hydrogens;
    use crate::core::features::{
        DEFAULT_EDGE_FEATURES, DEFAULT_NODE_FEATURES, FeatureError, Vocabulary,
    };
    use crate::core::models::bond::BondOrder;
    use crate::core::models::element::Element;
    use crate::core::models::molecule::MoleculeBuilder;

    fn glycine() -> Molecule {
        let mut builder = MoleculeBuilder::new("glycine");
        let n = builder.add_atom(Element::NITROGEN);
        let ca = builder.add_atom(Element::CARBON);
        let c = builder.add_atom(Element::CARBON);
        let o1 = builder.add_atom(Element::OXYGEN);
        let o2 = builder.add_atom(Element::OXYGEN);
        builder.add_bond(n, ca, BondOrder::Single).unwrap();
        builder.add_bond(ca, c, BondOrder::Single).unwrap();
        builder.add_bond(c, o1, BondOrder::Double).unwrap();
        builder.add_bond(c, o2, BondOrder::Single).unwrap();
        let mut mol = builder.build();
        assign_implicit_hydrogens(&mut mol);
        mol
    }

    #[test]
    fn node_matrix_has_one_row_per_atom_and_selection_width() {
        let vocab = Vocabulary::standard();
        let selection = vocab.select_node_features(DEFAULT_NODE_FEATURES).unwrap();
        let mol = glycine();

        let x = build_nodes(&mol, 4, &selection).unwrap();

        assert_eq!(x.nrows(), mol.num_atoms());
        assert_eq!(x.ncols(), vocab.feature_width(DEFAULT_NODE_FEATURES).unwrap());
    }

    #[test]
    fn node_columns_follow_selection_order() {
        let vocab = Vocabulary::standard();
        let mol = glycine();
        let forward = vocab
            .select_node_features(&["reaction_center", "formal_charge"])
            .unwrap();
        let reverse = vocab
            .select_node_features(&["formal_charge", "reaction_center"])
            .unwrap();

        let a = build_nodes(&mol, 0, &forward).unwrap();
        let b = build_nodes(&mol, 0, &reverse).unwrap();

        assert_eq!(a.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(b.row(0).iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn every_bond_yields_two_reversed_edges_with_equal_attributes() {
        let vocab = Vocabulary::standard();
        let selection = vocab.select_edge_features(DEFAULT_EDGE_FEATURES).unwrap();
        let mol = glycine();

        let (edge_index, edge_attr) = build_edges(&mol, &selection).unwrap();

        assert_eq!(edge_index.shape(), (2, 2 * mol.num_bonds()));
        assert_eq!(edge_attr.nrows(), 2 * mol.num_bonds());
        assert_eq!(edge_attr.ncols(), selection.width());
        for k in 0..mol.num_bonds() {
            assert_eq!(edge_index[(0, 2 * k)], edge_index[(1, 2 * k + 1)]);
            assert_eq!(edge_index[(1, 2 * k)], edge_index[(0, 2 * k + 1)]);
            assert_eq!(edge_attr.row(2 * k), edge_attr.row(2 * k + 1));
        }
        let bond = &mol.bonds()[2];
        assert_eq!(edge_index[(0, 4)], bond.begin as i64);
        assert_eq!(edge_index[(1, 4)], bond.end as i64);
    }

    #[test]
    fn molecule_without_bonds_has_empty_edge_matrices() {
        let vocab = Vocabulary::standard();
        let selection = vocab.select_edge_features(DEFAULT_EDGE_FEATURES).unwrap();
        let mut builder = MoleculeBuilder::new("water");
        builder.add_atom(Element::OXYGEN);
        let mol = builder.build();

        let (edge_index, edge_attr) = build_edges(&mol, &selection).unwrap();

        assert_eq!(edge_index.shape(), (2, 0));
        assert_eq!(edge_attr.shape(), (0, selection.width()));
    }

    #[test]
    fn feature_failure_names_feature_and_atom() {
        let vocab = Vocabulary::standard();
        let selection = vocab.select_node_features(&["element"]).unwrap();
        let mut builder = MoleculeBuilder::new("silanol");
        let o = builder.add_atom(Element::OXYGEN);
        let si = builder.add_atom(Element::from_atomic_number(14).unwrap());
        builder.add_bond(o, si, BondOrder::Single).unwrap();
        let mol = builder.build();

        let err = build_nodes(&mol, o, &selection).unwrap_err();

        assert_eq!(
            err,
            GraphError::NodeFeature {
                feature: "element".to_string(),
                atom: si,
                source: FeatureError::OutOfDomain {
                    value: 14,
                    levels: vec![1, 6, 7, 8, 9, 15, 16, 17, 35, 53]
                }
            }
        );
    }

    #[test]
    fn reaction_center_must_be_an_atom() {
        let vocab = Vocabulary::standard();
        let selection = vocab.select_node_features(DEFAULT_NODE_FEATURES).unwrap();
        let mol = glycine();
        assert!(matches!(
            build_nodes(&mol, 99, &selection),
            Err(GraphError::ReactionCenterOutOfRange {
                index: 99,
                atom_count: 5
            })
        ));
    }
}
