use crate::core::chem::perception;
use crate::core::models::molecule::Molecule;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConjugateError {
    #[error("Atom {index} is out of range for a molecule with {atom_count} atoms")]
    AtomOutOfRange { index: usize, atom_count: usize },

    #[error(
        "Protonation state of atom {index} is uncertain: pKa {pka} against pH {ph} with {hydrogens} hydrogens"
    )]
    Uncertain {
        index: usize,
        pka: f64,
        ph: f64,
        hydrogens: u8,
    },

    #[error(
        "Atom {index} only carries explicit hydrogen atoms; removing one would renumber the molecule"
    )]
    ExplicitHydrogen { index: usize },

    #[error("Formal charge of atom {index} cannot be changed beyond {charge}")]
    ChargeLimit { index: usize, charge: i8 },

    #[error("Conjugate generation failed: {0}")]
    Failed(String),
}

/// Produces the conjugate acid or base of a molecule at one atom.
///
/// Implementations must keep atom numbering intact: the returned molecule has the same atoms in
/// the same order, differing only in the protonation state of `atom_index`.
pub trait ConjugateGenerator: Sync {
    fn create_conjugate(
        &self,
        molecule: &Molecule,
        atom_index: usize,
        pka: f64,
        ignore_danger: bool,
    ) -> Result<Molecule, ConjugateError>;
}

impl<F> ConjugateGenerator for F
where
    F: Fn(&Molecule, usize, f64, bool) -> Result<Molecule, ConjugateError> + Sync,
{
    fn create_conjugate(
        &self,
        molecule: &Molecule,
        atom_index: usize,
        pka: f64,
        ignore_danger: bool,
    ) -> Result<Molecule, ConjugateError> {
        self(molecule, atom_index, pka, ignore_danger)
    }
}

/// Toggles one attached hydrogen at the reaction center, using a reference pH to decide the
/// direction.
///
/// With `pKa > pH` the input is taken to be the acid and a hydrogen is removed. With `pKa < pH`
/// the input is taken to be the base and a hydrogen is added. The remaining case, an acid with
/// nothing to remove, is refused unless `ignore_danger` is set, in which case the atom is
/// protonated. The direction counts attached hydrogens and bonded hydrogen atoms alike, but
/// only an attached hydrogen is ever removed: explicit hydrogen atoms stay in place so that
/// numbering is preserved, and an acid whose only hydrogens are explicit atoms is refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtonToggle {
    pub ph: f64,
}

impl ProtonToggle {
    pub const PHYSIOLOGICAL_PH: f64 = 7.4;

    pub fn new(ph: f64) -> Self {
        Self { ph }
    }
}

impl Default for ProtonToggle {
    fn default() -> Self {
        Self::new(Self::PHYSIOLOGICAL_PH)
    }
}

impl ConjugateGenerator for ProtonToggle {
    fn create_conjugate(
        &self,
        molecule: &Molecule,
        atom_index: usize,
        pka: f64,
        ignore_danger: bool,
    ) -> Result<Molecule, ConjugateError> {
        let atom_count = molecule.num_atoms();
        if atom_index >= atom_count {
            return Err(ConjugateError::AtomOutOfRange {
                index: atom_index,
                atom_count,
            });
        }
        let hydrogens = perception::total_hydrogens(molecule, atom_index);

        let deprotonate = if pka > self.ph && hydrogens > 0 {
            true
        } else if pka < self.ph || ignore_danger {
            false
        } else {
            return Err(ConjugateError::Uncertain {
                index: atom_index,
                pka,
                ph: self.ph,
                hydrogens,
            });
        };

        let mut conjugate = molecule.clone();
        let Some(center) = conjugate.atom_mut(atom_index) else {
            return Err(ConjugateError::AtomOutOfRange {
                index: atom_index,
                atom_count,
            });
        };
        let limit = ConjugateError::ChargeLimit {
            index: atom_index,
            charge: center.formal_charge,
        };
        if deprotonate {
            center.hydrogens = center
                .hydrogens
                .checked_sub(1)
                .ok_or(ConjugateError::ExplicitHydrogen { index: atom_index })?;
            center.formal_charge = center.formal_charge.checked_sub(1).ok_or(limit)?;
        } else {
            center.formal_charge = center.formal_charge.checked_add(1).ok_or(limit)?;
            center.hydrogens = center.hydrogens.saturating_add(1);
        }

        debug!(
            molecule = molecule.name(),
            atom = atom_index,
            deprotonate,
            "Toggled protonation state."
        );
        Ok(conjugate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chem::valence::assign_implicit_hydrogens;
    use crate::core::models::bond::BondOrder;
    use crate::core::models::element::Element;
    use crate::core::models::molecule::MoleculeBuilder;

    fn acetic_acid() -> Molecule {
        let mut builder = MoleculeBuilder::new("acetic acid");
        let c1 = builder.add_atom(Element::CARBON);
        let c2 = builder.add_atom(Element::CARBON);
        let o1 = builder.add_atom(Element::OXYGEN);
        let o2 = builder.add_atom(Element::OXYGEN);
        builder.add_bond(c1, c2, BondOrder::Single).unwrap();
        builder.add_bond(c2, o1, BondOrder::Double).unwrap();
        builder.add_bond(c2, o2, BondOrder::Single).unwrap();
        builder.property("pKa", 4.76);
        let mut mol = builder.build();
        assign_implicit_hydrogens(&mut mol);
        mol
    }

    #[test]
    fn acid_above_ph_loses_a_proton() {
        let mol = acetic_acid();
        let conj = ProtonToggle::new(2.0)
            .create_conjugate(&mol, 3, 4.76, false)
            .unwrap();
        assert_eq!(conj.atoms()[3].formal_charge, -1);
        assert_eq!(conj.atoms()[3].hydrogens, 0);
        assert_eq!(conj.num_atoms(), mol.num_atoms());
        assert_eq!(conj.bonds(), mol.bonds());
        assert_eq!(conj.properties(), mol.properties());
    }

    #[test]
    fn base_below_ph_gains_a_proton() {
        let mol = acetic_acid();
        let conj = ProtonToggle::default()
            .create_conjugate(&mol, 2, 4.76, false)
            .unwrap();
        assert_eq!(conj.atoms()[2].formal_charge, 1);
        assert_eq!(conj.atoms()[2].hydrogens, 1);
    }

    #[test]
    fn acid_without_hydrogens_is_refused_unless_danger_is_ignored() {
        let mol = acetic_acid();
        let toggle = ProtonToggle::new(2.0);
        assert!(matches!(
            toggle.create_conjugate(&mol, 2, 4.76, false),
            Err(ConjugateError::Uncertain { index: 2, hydrogens: 0, .. })
        ));
        let conj = toggle.create_conjugate(&mol, 2, 4.76, true).unwrap();
        assert_eq!(conj.atoms()[2].formal_charge, 1);
    }

    #[test]
    fn explicit_hydroxyl_hydrogen_is_never_mistaken_for_a_base() {
        let mut builder = MoleculeBuilder::new("methanol");
        let c = builder.add_atom(Element::CARBON);
        let o = builder.add_atom(Element::OXYGEN);
        let h = builder.add_atom(Element::HYDROGEN);
        builder.add_bond(c, o, BondOrder::Single).unwrap();
        builder.add_bond(o, h, BondOrder::Single).unwrap();
        let mut mol = builder.build();
        assign_implicit_hydrogens(&mut mol);
        assert_eq!(mol.atoms()[o].hydrogens, 0);

        assert_eq!(
            ProtonToggle::default().create_conjugate(&mol, o, 15.5, true),
            Err(ConjugateError::ExplicitHydrogen { index: o })
        );
    }

    #[test]
    fn out_of_range_atom_is_an_error() {
        let mol = acetic_acid();
        assert_eq!(
            ProtonToggle::default().create_conjugate(&mol, 10, 4.76, true),
            Err(ConjugateError::AtomOutOfRange {
                index: 10,
                atom_count: 4
            })
        );
    }

    #[test]
    fn closures_act_as_generators() {
        let failing = |_: &Molecule, _: usize, _: f64, _: bool| -> Result<Molecule, ConjugateError> {
            Err(ConjugateError::Failed("no rule".to_string()))
        };
        let mol = acetic_acid();
        assert!(failing.create_conjugate(&mol, 0, 1.0, false).is_err());
    }
}
