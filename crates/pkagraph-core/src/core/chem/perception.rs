use super::valence::explicit_valence;
use crate::core::models::bond::BondOrder;
use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use std::collections::VecDeque;
use std::fmt;

/// Orbital hybridization of an atom as perceived from its bonding pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Hybridization {
    Unspecified = 0,
    S = 1,
    SP = 2,
    SP2 = 3,
    SP3 = 4,
    SP3D = 5,
    SP3D2 = 6,
}

impl Hybridization {
    pub fn code(self) -> i64 {
        self as u8 as i64
    }
}

impl fmt::Display for Hybridization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::S => "S",
            Self::SP => "SP",
            Self::SP2 => "SP2",
            Self::SP3 => "SP3",
            Self::SP3D => "SP3D",
            Self::SP3D2 => "SP3D2",
        })
    }
}

/// Attached hydrogens plus bonded explicit hydrogen atoms.
pub fn total_hydrogens(molecule: &Molecule, index: usize) -> u8 {
    let Some(atom) = molecule.atom(index) else {
        return 0;
    };
    let explicit = molecule
        .neighbors(index)
        .iter()
        .filter(|n| {
            molecule
                .atom(n.atom)
                .is_some_and(|a| a.element.is_hydrogen())
        })
        .count() as u8;
    atom.hydrogens + explicit
}

/// Number of bonded heavy (non-hydrogen) atoms.
pub fn heavy_degree(molecule: &Molecule, index: usize) -> usize {
    molecule
        .neighbors(index)
        .iter()
        .filter(|n| {
            molecule
                .atom(n.atom)
                .is_some_and(|a| !a.element.is_hydrogen())
        })
        .count()
}

/// Number of bonded atoms including attached hydrogens.
pub fn total_degree(molecule: &Molecule, index: usize) -> usize {
    let attached = molecule.atom(index).map_or(0, |a| a.hydrogens as usize);
    molecule.neighbors(index).len() + attached
}

/// Explicit valence plus attached hydrogens.
pub fn total_valence(molecule: &Molecule, index: usize) -> u8 {
    let attached = molecule.atom(index).map_or(0, |a| a.hydrogens);
    explicit_valence(molecule, index) + attached
}

/// An atom is aromatic when the input flagged it so or when it takes part in an aromatic bond.
pub fn is_aromatic(molecule: &Molecule, index: usize) -> bool {
    molecule.atom(index).is_some_and(|a| a.aromatic) || has_bond_of(molecule, index, None, |o| {
        o == BondOrder::Aromatic
    })
}

fn has_bond_of(
    molecule: &Molecule,
    index: usize,
    excluding: Option<usize>,
    predicate: impl Fn(BondOrder) -> bool,
) -> bool {
    molecule
        .neighbors(index)
        .iter()
        .filter(|n| Some(n.bond) != excluding)
        .filter_map(|n| molecule.bond(n.bond))
        .any(|b| predicate(b.order))
}

fn has_pi_bond(molecule: &Molecule, index: usize, excluding: Option<usize>) -> bool {
    molecule.atom(index).is_some_and(|a| a.aromatic)
        || has_bond_of(molecule, index, excluding, BondOrder::is_multiple)
}

// N, O and S with a free lone pair that can delocalize into an adjacent pi system.
fn has_donor_lone_pair(molecule: &Molecule, index: usize) -> bool {
    let Some(atom) = molecule.atom(index) else {
        return false;
    };
    if atom.formal_charge > 0 {
        return false;
    }
    let max_degree = match atom.element {
        Element::NITROGEN => 3,
        Element::OXYGEN | Element::SULFUR => 2,
        _ => return false,
    };
    total_degree(molecule, index) <= max_degree
}

/// Perceives the hybridization of an atom.
///
/// Hydrogen is `S`. Aromatic atoms and atoms with exactly one double bond are `SP2`, atoms with a
/// triple bond or two cumulated double bonds are `SP`. Saturated N, O and S next to a pi system
/// are `SP2` (amide and aniline nitrogens, phenolate oxygens). Five- and six-coordinate saturated
/// atoms are `SP3D` / `SP3D2`; everything else is `SP3`.
pub fn hybridization(molecule: &Molecule, index: usize) -> Hybridization {
    let Some(atom) = molecule.atom(index) else {
        return Hybridization::Unspecified;
    };
    if atom.element.is_hydrogen() {
        return Hybridization::S;
    }
    if is_aromatic(molecule, index) {
        return Hybridization::SP2;
    }

    let (mut doubles, mut triples) = (0, 0);
    for neighbor in molecule.neighbors(index) {
        match molecule.bond(neighbor.bond).map(|b| b.order) {
            Some(BondOrder::Double) => doubles += 1,
            Some(BondOrder::Triple) => triples += 1,
            _ => {}
        }
    }

    if triples > 0 || doubles >= 2 {
        // Hypervalent centers such as sulfonyl sulfur keep their tetrahedral geometry.
        return if total_degree(molecule, index) >= 4 {
            Hybridization::SP3
        } else {
            Hybridization::SP
        };
    }
    if doubles == 1 {
        return if total_degree(molecule, index) >= 4 {
            Hybridization::SP3
        } else {
            Hybridization::SP2
        };
    }

    match total_degree(molecule, index) {
        5 => return Hybridization::SP3D,
        6 => return Hybridization::SP3D2,
        d if d > 6 => return Hybridization::Unspecified,
        _ => {}
    }

    let conjugated_lone_pair = has_donor_lone_pair(molecule, index)
        && molecule
            .neighbors(index)
            .iter()
            .any(|n| has_pi_bond(molecule, n.atom, Some(n.bond)));
    if conjugated_lone_pair {
        Hybridization::SP2
    } else {
        Hybridization::SP3
    }
}

/// Whether a bond is part of a conjugated system.
///
/// Aromatic bonds are always conjugated. A multiple bond is conjugated when one of its atoms
/// also carries another pi bond or a donor lone pair. A single bond is conjugated when both of
/// its atoms contribute to a pi system and at least one of them through a pi bond.
pub fn is_conjugated(molecule: &Molecule, bond_index: usize) -> bool {
    let Some(bond) = molecule.bond(bond_index) else {
        return false;
    };
    let excluding = Some(bond_index);

    match bond.order {
        BondOrder::Aromatic => true,
        BondOrder::Double | BondOrder::Triple => [bond.begin, bond.end].iter().any(|&atom| {
            molecule
                .neighbors(atom)
                .iter()
                .filter(|n| n.bond != bond_index)
                .any(|n| {
                    has_pi_bond(molecule, n.atom, Some(n.bond))
                        || has_donor_lone_pair(molecule, n.atom)
                })
        }),
        BondOrder::Single => {
            let pi_begin = has_pi_bond(molecule, bond.begin, excluding);
            let pi_end = has_pi_bond(molecule, bond.end, excluding);
            let lp_begin = has_donor_lone_pair(molecule, bond.begin);
            let lp_end = has_donor_lone_pair(molecule, bond.end);
            (pi_begin && (pi_end || lp_end)) || (pi_end && lp_begin)
        }
    }
}

/// Whether rotation about a bond changes the conformation: a non-ring single bond between two
/// non-terminal heavy atoms, neither of which is part of a triple bond.
pub fn is_rotatable(molecule: &Molecule, bond_index: usize) -> bool {
    let Some(bond) = molecule.bond(bond_index) else {
        return false;
    };
    if bond.order != BondOrder::Single || molecule.is_ring_bond(bond_index) {
        return false;
    }
    [bond.begin, bond.end].iter().all(|&atom| {
        heavy_degree(molecule, atom) > 1
            && !has_bond_of(molecule, atom, None, |o| o == BondOrder::Triple)
            && molecule
                .atom(atom)
                .is_some_and(|a| !a.element.is_hydrogen())
    })
}

/// Shortest bond-count distance from `source` to every atom; `None` for unreachable atoms.
pub fn topological_distances(molecule: &Molecule, source: usize) -> Vec<Option<usize>> {
    let mut distances = vec![None; molecule.num_atoms()];
    if source >= distances.len() {
        return distances;
    }
    distances[source] = Some(0);
    let mut queue = VecDeque::from([source]);
    while let Some(current) = queue.pop_front() {
        let next = distances[current].map_or(0, |d| d + 1);
        for neighbor in molecule.neighbors(current) {
            if distances[neighbor.atom].is_none() {
                distances[neighbor.atom] = Some(next);
                queue.push_back(neighbor.atom);
            }
        }
    }
    distances
}
