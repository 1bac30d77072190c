use super::domain::{FeatureError, FeatureValue, ValueDomain};
use super::vocabulary::{AtomView, BondView, Vocabulary};
use crate::core::chem::perception::{self, Hybridization};

/// Node features selected when a configuration does not name its own.
pub const DEFAULT_NODE_FEATURES: &[&str] = &[
    "element",
    "formal_charge",
    "hybridization",
    "total_num_hs",
    "aromatic_tag",
    "total_valence",
    "total_degree",
    "is_in_ring",
    "reaction_center",
];

/// Edge features selected when a configuration does not name its own.
pub const DEFAULT_EDGE_FEATURES: &[&str] = &["bond_type", "is_conjugated", "rotatable"];

const ELEMENTS: [i64; 10] = [1, 6, 7, 8, 9, 15, 16, 17, 35, 53];
const MAX_CENTER_DISTANCE: i64 = 6;

fn element(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Category(view.atom().element.atomic_number() as i64))
}

fn formal_charge(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Category(view.atom().formal_charge as i64))
}

fn hybridization(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    match perception::hybridization(view.molecule, view.index) {
        Hybridization::Unspecified => Err(FeatureError::Unsupported(format!(
            "unrecognized hybridization for {} atom",
            view.atom().element
        ))),
        hybridization => Ok(FeatureValue::Category(hybridization.code())),
    }
}

fn total_num_hs(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Category(
        perception::total_hydrogens(view.molecule, view.index) as i64,
    ))
}

fn aromatic_tag(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Flag(perception::is_aromatic(
        view.molecule,
        view.index,
    )))
}

fn total_valence(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Category(
        perception::total_valence(view.molecule, view.index) as i64,
    ))
}

fn total_degree(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Category(
        perception::total_degree(view.molecule, view.index) as i64,
    ))
}

fn is_in_ring(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Flag(view.molecule.is_in_ring(view.index)))
}

fn reaction_center(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Flag(view.is_reaction_center()))
}

// Distances beyond the last level, and atoms in other fragments, share the last level.
fn reaction_center_distance(view: &AtomView<'_>) -> Result<FeatureValue, FeatureError> {
    let distance = view
        .distance_to_center()
        .map_or(MAX_CENTER_DISTANCE, |d| (d as i64).min(MAX_CENTER_DISTANCE));
    Ok(FeatureValue::Category(distance))
}

fn bond_type(view: &BondView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Category(view.bond().order as u8 as i64))
}

fn is_conjugated(view: &BondView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Flag(perception::is_conjugated(
        view.molecule,
        view.index,
    )))
}

fn is_in_ring_bond(view: &BondView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Flag(view.molecule.is_ring_bond(view.index)))
}

fn rotatable(view: &BondView<'_>) -> Result<FeatureValue, FeatureError> {
    Ok(FeatureValue::Flag(perception::is_rotatable(
        view.molecule,
        view.index,
    )))
}

impl Vocabulary {
    /// The built-in node and edge features.
    pub fn standard() -> Self {
        let mut vocab = Self::new();
        vocab.insert_standard();
        vocab
    }

    fn insert_standard(&mut self) {
        self.insert_node("element", ValueDomain::Categories(ELEMENTS.to_vec()), element);
        self.insert_node(
            "formal_charge",
            ValueDomain::Categories(vec![-1, 0, 1]),
            formal_charge,
        );
        self.insert_node(
            "hybridization",
            ValueDomain::Categories(
                [
                    Hybridization::S,
                    Hybridization::SP,
                    Hybridization::SP2,
                    Hybridization::SP3,
                ]
                .map(Hybridization::code)
                .to_vec(),
            ),
            hybridization,
        );
        self.insert_node("total_num_hs", ValueDomain::range(0, 4), total_num_hs);
        self.insert_node("aromatic_tag", ValueDomain::Flag, aromatic_tag);
        self.insert_node("total_valence", ValueDomain::range(0, 6), total_valence);
        self.insert_node("total_degree", ValueDomain::range(0, 6), total_degree);
        self.insert_node("is_in_ring", ValueDomain::Flag, is_in_ring);
        self.insert_node("reaction_center", ValueDomain::Flag, reaction_center);
        self.insert_node(
            "reaction_center_distance",
            ValueDomain::range(0, MAX_CENTER_DISTANCE),
            reaction_center_distance,
        );

        self.insert_edge("bond_type", ValueDomain::range(1, 4), bond_type);
        self.insert_edge("is_conjugated", ValueDomain::Flag, is_conjugated);
        self.insert_edge("is_in_ring_bond", ValueDomain::Flag, is_in_ring_bond);
        self.insert_edge("rotatable", ValueDomain::Flag, rotatable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::valence::assign_implicit_hydrogens;
    use crate::core::models::bond::BondOrder;
    use crate::core::models::element::Element;
    use crate::core::models::molecule::{Molecule, MoleculeBuilder};

    fn acetate() -> Molecule {
        let mut builder = MoleculeBuilder::new("acetate");
        let c1 = builder.add_atom(Element::CARBON);
        let c2 = builder.add_atom(Element::CARBON);
        let o1 = builder.add_atom(Element::OXYGEN);
        let o2 = builder.add_atom(Element::OXYGEN);
        builder.atom_mut(o2).unwrap().formal_charge = -1;
        builder.add_bond(c1, c2, BondOrder::Single).unwrap();
        builder.add_bond(c2, o1, BondOrder::Double).unwrap();
        builder.add_bond(c2, o2, BondOrder::Single).unwrap();
        let mut mol = builder.build();
        assign_implicit_hydrogens(&mut mol);
        mol
    }

    fn encode_atom(vocab: &Vocabulary, name: &str, mol: &Molecule, index: usize, center: usize) -> Vec<f32> {
        let entry = vocab.node_entry(name).unwrap();
        let distances = perception::topological_distances(mol, center);
        let view = AtomView {
            molecule: mol,
            index,
            reaction_center: center,
            center_distances: &distances,
        };
        let mut out = Vec::new();
        let value = entry.encoder().compute(&view).unwrap();
        entry.domain().encode(value, &mut out).unwrap();
        out
    }

    #[test]
    fn standard_vocabulary_contains_every_default_feature() {
        let vocab = Vocabulary::standard();
        assert!(vocab.select_node_features(DEFAULT_NODE_FEATURES).is_ok());
        assert!(vocab.select_edge_features(DEFAULT_EDGE_FEATURES).is_ok());
        assert_eq!(vocab.node_names().len(), 10);
        assert_eq!(vocab.edge_names().len(), 4);
    }

    #[test]
    fn default_widths_are_sums_of_domain_sizes() {
        let vocab = Vocabulary::standard();
        // 10 + 3 + 4 + 5 + 1 + 7 + 7 + 1 + 1
        assert_eq!(vocab.feature_width(DEFAULT_NODE_FEATURES).unwrap(), 39);
        // 4 + 1 + 1
        assert_eq!(vocab.feature_width(DEFAULT_EDGE_FEATURES).unwrap(), 6);
    }

    #[test]
    fn element_and_charge_are_one_hot() {
        let vocab = Vocabulary::standard();
        let mol = acetate();
        assert_eq!(
            encode_atom(&vocab, "element", &mol, 2, 3),
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(encode_atom(&vocab, "formal_charge", &mol, 3, 3), vec![1.0, 0.0, 0.0]);
        assert_eq!(encode_atom(&vocab, "formal_charge", &mol, 0, 3), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn reaction_center_flag_and_distance_follow_the_center() {
        let vocab = Vocabulary::standard();
        let mol = acetate();
        assert_eq!(encode_atom(&vocab, "reaction_center", &mol, 3, 3), vec![1.0]);
        assert_eq!(encode_atom(&vocab, "reaction_center", &mol, 2, 3), vec![0.0]);
        let distance = encode_atom(&vocab, "reaction_center_distance", &mol, 0, 3);
        assert_eq!(distance, vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn distance_feature_reads_the_shared_distance_table() {
        let vocab = Vocabulary::standard();
        let mol = acetate();
        let entry = vocab.node_entry("reaction_center_distance").unwrap();
        let distances = [Some(9), None, Some(1), Some(0)];
        let view = |index| AtomView {
            molecule: &mol,
            index,
            reaction_center: 3,
            center_distances: &distances,
        };
        assert_eq!(
            entry.encoder().compute(&view(0)),
            Ok(FeatureValue::Category(MAX_CENTER_DISTANCE))
        );
        assert_eq!(
            entry.encoder().compute(&view(1)),
            Ok(FeatureValue::Category(MAX_CENTER_DISTANCE))
        );
        assert_eq!(entry.encoder().compute(&view(2)), Ok(FeatureValue::Category(1)));
    }

    #[test]
    fn methyl_carbon_counts_its_hydrogens() {
        let vocab = Vocabulary::standard();
        let mol = acetate();
        assert_eq!(
            encode_atom(&vocab, "total_num_hs", &mol, 0, 3),
            vec![0.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(
            encode_atom(&vocab, "hybridization", &mol, 0, 3),
            vec![0.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(
            encode_atom(&vocab, "hybridization", &mol, 1, 3),
            vec![0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn hypervalent_atoms_fall_outside_the_hybridization_domain() {
        let vocab = Vocabulary::standard();
        let mut builder = MoleculeBuilder::new("sf6");
        let s = builder.add_atom(Element::SULFUR);
        for _ in 0..6 {
            let f = builder.add_atom(Element::FLUORINE);
            builder.add_bond(s, f, BondOrder::Single).unwrap();
        }
        let mol = builder.build();
        let entry = vocab.node_entry("hybridization").unwrap();
        let distances = perception::topological_distances(&mol, s);
        let view = AtomView {
            molecule: &mol,
            index: s,
            reaction_center: s,
            center_distances: &distances,
        };
        let value = entry.encoder().compute(&view).unwrap();
        let mut out = Vec::new();
        assert!(matches!(
            entry.domain().encode(value, &mut out),
            Err(FeatureError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn bond_features_describe_the_carbonyl() {
        let vocab = Vocabulary::standard();
        let mol = acetate();
        let view = BondView {
            molecule: &mol,
            index: 1,
        };
        let entry = vocab.edge_entry("bond_type").unwrap();
        let mut out = Vec::new();
        entry
            .domain()
            .encode(entry.encoder().compute(&view).unwrap(), &mut out)
            .unwrap();
        assert_eq!(out, vec![0.0, 1.0, 0.0, 0.0]);
        let ring = vocab.edge_entry("is_in_ring_bond").unwrap();
        assert_eq!(ring.encoder().compute(&view), Ok(FeatureValue::Flag(false)));
    }
}
