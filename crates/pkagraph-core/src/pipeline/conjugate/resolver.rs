use crate::core::models::molecule::Molecule;
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(
        "Reaction center {index} is out of range for the {side} structure with {atom_count} atoms"
    )]
    CenterOutOfRange {
        index: usize,
        side: &'static str,
        atom_count: usize,
    },
}

/// How confidently the protonation roles of a pair were assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PairState {
    /// The reaction center carries different charges in the two structures.
    #[default]
    Resolved,
    /// Both structures carry the same charge at the reaction center. The original structure was
    /// taken as the protonated side.
    Ambiguous,
}

impl fmt::Display for PairState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolved => "resolved",
            Self::Ambiguous => "ambiguous",
        })
    }
}

/// A conjugate pair sorted into its protonated and deprotonated members.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPair<M> {
    pub protonated: M,
    pub deprotonated: M,
    pub state: PairState,
}

impl<M> ResolvedPair<M> {
    pub fn is_ambiguous(&self) -> bool {
        self.state == PairState::Ambiguous
    }
}

/// Assigns protonated and deprotonated roles to a molecule and its conjugate.
///
/// The structure with the higher formal charge at `reaction_center` is the protonated one. When
/// the charges are equal the original is returned as protonated and the pair is marked
/// [`PairState::Ambiguous`]. Works on owned molecules and on references alike.
///
/// # Errors
///
/// Returns [`ResolveError::CenterOutOfRange`] if the reaction center is not an atom of both
/// structures.
pub fn resolve_pair<M: Borrow<Molecule>>(
    original: M,
    conjugate: M,
    reaction_center: usize,
) -> Result<ResolvedPair<M>, ResolveError> {
    let original_charge = charge_at(original.borrow(), reaction_center, "original")?;
    let conjugate_charge = charge_at(conjugate.borrow(), reaction_center, "conjugate")?;

    let pair = if original_charge < conjugate_charge {
        ResolvedPair {
            protonated: conjugate,
            deprotonated: original,
            state: PairState::Resolved,
        }
    } else if original_charge > conjugate_charge {
        ResolvedPair {
            protonated: original,
            deprotonated: conjugate,
            state: PairState::Resolved,
        }
    } else {
        warn!(
            molecule = original.borrow().name(),
            reaction_center,
            charge = original_charge,
            "Ambiguous protonation state: both structures carry the same charge at the reaction center."
        );
        ResolvedPair {
            protonated: original,
            deprotonated: conjugate,
            state: PairState::Ambiguous,
        }
    };
    Ok(pair)
}

fn charge_at(molecule: &Molecule, index: usize, side: &'static str) -> Result<i8, ResolveError> {
    molecule
        .formal_charge_at(index)
        .ok_or(ResolveError::CenterOutOfRange {
            index,
            side,
            atom_count: molecule.num_atoms(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bond::BondOrder;
    use crate::core::models::element::Element;
    use crate::core::models::molecule::MoleculeBuilder;

    fn diatomic(name: &str, charges: [i8; 2]) -> Molecule {
        let mut builder = MoleculeBuilder::new(name);
        let a = builder.add_atom(Element::CARBON);
        let b = builder.add_atom(Element::OXYGEN);
        builder.atom_mut(a).unwrap().formal_charge = charges[0];
        builder.atom_mut(b).unwrap().formal_charge = charges[1];
        builder.add_bond(a, b, BondOrder::Single).unwrap();
        builder.build()
    }

    #[test]
    fn higher_charge_in_original_makes_it_protonated() {
        let original = diatomic("acid", [0, 0]);
        let conjugate = diatomic("base", [-1, 0]);

        let pair = resolve_pair(&original, &conjugate, 0).unwrap();

        assert_eq!(pair.protonated.name(), "acid");
        assert_eq!(pair.deprotonated.name(), "base");
        assert_eq!(pair.state, PairState::Resolved);
    }

    #[test]
    fn roles_do_not_depend_on_input_order() {
        let acid = diatomic("acid", [1, 0]);
        let base = diatomic("base", [0, 0]);

        let forward = resolve_pair(&acid, &base, 0).unwrap();
        let backward = resolve_pair(&base, &acid, 0).unwrap();

        assert_eq!(forward.protonated.name(), "acid");
        assert_eq!(backward.protonated.name(), "acid");
        assert_eq!(forward.deprotonated.name(), "base");
        assert_eq!(backward.deprotonated.name(), "base");
    }

    #[test]
    fn equal_charges_keep_original_as_protonated_and_flag_the_pair() {
        let original = diatomic("first", [0, 0]);
        let conjugate = diatomic("second", [0, -1]);

        let pair = resolve_pair(original, conjugate, 0).unwrap();

        assert!(pair.is_ambiguous());
        assert_eq!(pair.protonated.name(), "first");
        assert_eq!(pair.deprotonated.name(), "second");
    }

    #[test]
    fn center_outside_either_structure_is_an_error() {
        let original = diatomic("a", [0, 0]);
        let conjugate = diatomic("b", [0, 0]);
        assert_eq!(
            resolve_pair(&original, &conjugate, 2).unwrap_err(),
            ResolveError::CenterOutOfRange {
                index: 2,
                side: "original",
                atom_count: 2
            }
        );
    }
}
