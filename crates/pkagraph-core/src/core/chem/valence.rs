use crate::core::models::element::Element;
use crate::core::models::molecule::Molecule;
use tracing::debug;

/// Standard valences for the organic subset, lowest first.
fn allowed_valences(element: Element) -> &'static [u8] {
    match element.atomic_number() {
        1 => &[1],
        5 => &[3],
        6 => &[4],
        7 => &[3],
        8 => &[2],
        15 => &[3, 5],
        16 | 34 => &[2, 4, 6],
        9 | 17 | 35 | 53 => &[1],
        _ => &[],
    }
}

fn adjust_for_charge(element: Element, valence: u8, charge: i8) -> Option<u8> {
    let adjusted = match element.atomic_number() {
        1 | 6 => valence as i16 - (charge as i16).abs(),
        5 => valence as i16 - charge as i16,
        _ => valence as i16 + charge as i16,
    };
    u8::try_from(adjusted).ok()
}

/// Sum of the bond orders around an atom, counting explicit hydrogen atoms and rounding
/// aromatic contributions down.
pub fn explicit_valence(molecule: &Molecule, index: usize) -> u8 {
    let half: u32 = molecule
        .neighbors(index)
        .iter()
        .filter_map(|n| molecule.bond(n.bond))
        .map(|b| b.order.half_valence() as u32)
        .sum();
    (half / 2) as u8
}

/// Number of hydrogens needed to satisfy the lowest standard valence of the atom that is
/// compatible with its current bonds and formal charge.
///
/// Elements outside the organic subset never receive implicit hydrogens.
pub fn implicit_hydrogens(molecule: &Molecule, index: usize) -> u8 {
    let Some(atom) = molecule.atom(index) else {
        return 0;
    };
    let bonded = explicit_valence(molecule, index);
    allowed_valences(atom.element)
        .iter()
        .filter_map(|&v| adjust_for_charge(atom.element, v, atom.formal_charge))
        .find(|&target| target >= bonded)
        .map(|target| target - bonded)
        .unwrap_or(0)
}

/// Sets the attached-hydrogen count of every atom from the valence model.
///
/// Used by readers whose input only lists heavy atoms (or a partial set of hydrogens). Counts
/// already on an atom, such as folded explicit hydrogens, are never lowered.
pub fn assign_implicit_hydrogens(molecule: &mut Molecule) {
    let counts: Vec<u8> = (0..molecule.num_atoms())
        .map(|i| implicit_hydrogens(molecule, i))
        .collect();
    for (index, count) in counts.into_iter().enumerate() {
        if let Some(atom) = molecule.atom_mut(index) {
            atom.hydrogens = atom.hydrogens.max(count);
        }
    }
    debug!(
        molecule = molecule.name(),
        "Assigned implicit hydrogens from the valence model."
    );
}
