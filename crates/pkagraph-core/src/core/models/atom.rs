use super::element::Element;
use nalgebra::Point3;

/// Represents an atom of a small molecule.
///
/// Hydrogens are carried either as explicit atoms bonded to their heavy atom or as an
/// attached-hydrogen count on the heavy atom itself (`hydrogens`). Feature code always looks
/// at the sum of both, see [`crate::core::chem::perception::total_hydrogens`].
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The chemical element.
    pub element: Element,
    /// The formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Number of hydrogens attached to this atom that are not present as separate atoms.
    pub hydrogens: u8,
    /// Whether the atom was flagged aromatic by the input structure.
    pub aromatic: bool,
    /// 2D or 3D coordinates in Angstroms. Cosmetic; never used by feature code.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a neutral, non-aromatic atom at the origin without attached hydrogens.
    pub fn new(element: Element) -> Self {
        Self {
            element,
            formal_charge: 0,
            hydrogens: 0,
            aromatic: false,
            position: Point3::origin(),
        }
    }

    pub fn with_charge(mut self, formal_charge: i8) -> Self {
        self.formal_charge = formal_charge;
        self
    }

    pub fn with_hydrogens(mut self, hydrogens: u8) -> Self {
        self.hydrogens = hydrogens;
        self
    }

    pub fn with_position(mut self, position: Point3<f64>) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let atom = Atom::new(Element::NITROGEN);
        assert_eq!(atom.element, Element::NITROGEN);
        assert_eq!(atom.formal_charge, 0);
        assert_eq!(atom.hydrogens, 0);
        assert!(!atom.aromatic);
        assert_eq!(atom.position, Point3::origin());
    }

    #[test]
    fn builder_style_setters_override_defaults() {
        let atom = Atom::new(Element::OXYGEN)
            .with_charge(-1)
            .with_hydrogens(0)
            .with_position(Point3::new(1.0, 2.0, 0.0));
        assert_eq!(atom.formal_charge, -1);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn atom_equality_and_clone_works() {
        let atom1 = Atom::new(Element::CARBON).with_hydrogens(3);
        let atom2 = atom1.clone();
        assert_eq!(atom1, atom2);
    }
}
