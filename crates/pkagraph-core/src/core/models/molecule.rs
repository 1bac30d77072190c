use super::atom::Atom;
use super::bond::{Bond, BondOrder};
use super::element::Element;
use super::properties::{PropertyBag, PropertyValue};
use std::collections::{BTreeMap, HashSet, VecDeque};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Bond references atom {index}, but the molecule only has {atom_count} atoms")]
    AtomOutOfRange { index: usize, atom_count: usize },
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("Duplicate bond between atoms {0} and {1}")]
    DuplicateBond(usize, usize),
}

/// A neighboring atom together with the index of the bond that connects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub atom: usize,
    pub bond: usize,
}

/// A small molecule: atoms and bonds in their native input order plus a property bag.
///
/// Atom indices are 0-based positions in [`Molecule::atoms`] and are the node index space of
/// every graph built from the molecule. They are never reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    name: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    properties: PropertyBag,
    adjacency: Vec<Vec<Neighbor>>,
    ring_bonds: Vec<bool>,
}

impl Molecule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Mutable access to a single atom.
    ///
    /// Only per-atom state (charge, hydrogens, coordinates) can be changed this way; the bond
    /// graph of a built molecule is fixed.
    pub fn atom_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    pub fn bond(&self, index: usize) -> Option<&Bond> {
        self.bonds.get(index)
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    pub fn neighbors(&self, atom: usize) -> &[Neighbor] {
        self.adjacency.get(atom).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_ring_bond(&self, bond: usize) -> bool {
        self.ring_bonds.get(bond).copied().unwrap_or(false)
    }

    pub fn is_in_ring(&self, atom: usize) -> bool {
        self.neighbors(atom).iter().any(|n| self.ring_bonds[n.bond])
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn formal_charge_at(&self, index: usize) -> Option<i8> {
        self.atoms.get(index).map(|a| a.formal_charge)
    }

    /// Sum of the formal charges of all atoms.
    pub fn net_charge(&self) -> i32 {
        self.atoms.iter().map(|a| a.formal_charge as i32).sum()
    }

    /// Canonical identifier used in diagnostics: the Hill formula followed by the net charge.
    ///
    /// Independent of atom order, so the same structure always yields the same string
    /// (e.g. `C2H6O`, `C2H3O2-`, `NH4+`).
    pub fn canonical_id(&self) -> String {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut hydrogens = 0usize;
        for atom in &self.atoms {
            if atom.element.is_hydrogen() {
                hydrogens += 1;
            } else {
                *counts.entry(atom.element.symbol()).or_default() += 1;
            }
            hydrogens += atom.hydrogens as usize;
        }

        let mut formula = String::new();
        let mut push = |symbol: &str, count: usize| {
            if count == 0 {
                return;
            }
            formula.push_str(symbol);
            if count > 1 {
                formula.push_str(&count.to_string());
            }
        };

        if let Some(carbons) = counts.remove("C") {
            push("C", carbons);
            push("H", hydrogens);
            for (symbol, count) in counts {
                push(symbol, count);
            }
        } else {
            counts.insert("H", hydrogens);
            for (symbol, count) in counts {
                push(symbol, count);
            }
        }

        match self.net_charge() {
            0 => {}
            1 => formula.push('+'),
            -1 => formula.push('-'),
            c if c > 0 => formula.push_str(&format!("+{c}")),
            c => formula.push_str(&c.to_string()),
        }
        formula
    }
}

/// Incrementally assembles a [`Molecule`], validating bonds as they are added.
pub struct MoleculeBuilder {
    name: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    properties: PropertyBag,
    bonded_pairs: HashSet<(usize, usize)>,
}

impl MoleculeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            atoms: Vec::new(),
            bonds: Vec::new(),
            properties: PropertyBag::new(),
            bonded_pairs: HashSet::new(),
        }
    }

    /// Adds a neutral atom of the given element and returns its index.
    pub fn add_atom(&mut self, element: Element) -> usize {
        self.push_atom(Atom::new(element))
    }

    pub fn push_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    pub fn atom_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    pub fn add_bond(
        &mut self,
        begin: usize,
        end: usize,
        order: BondOrder,
    ) -> Result<usize, MoleculeError> {
        let atom_count = self.atoms.len();
        for index in [begin, end] {
            if index >= atom_count {
                return Err(MoleculeError::AtomOutOfRange { index, atom_count });
            }
        }
        if begin == end {
            return Err(MoleculeError::SelfBond(begin));
        }
        if !self.bonded_pairs.insert((begin.min(end), begin.max(end))) {
            return Err(MoleculeError::DuplicateBond(begin, end));
        }
        self.bonds.push(Bond::new(begin, end, order));
        Ok(self.bonds.len() - 1)
    }

    /// Folds every terminal hydrogen atom into the attached-hydrogen count of its heavy neighbor.
    ///
    /// A hydrogen is terminal when it is neutral and singly bonded to exactly one heavy atom.
    /// Other hydrogen atoms (charged, isolated, bridging or bonded to hydrogen) are kept. The
    /// remaining atoms keep their relative order. Returns the number of atoms removed.
    pub fn fold_terminal_hydrogens(&mut self) -> usize {
        let mut degree = vec![0usize; self.atoms.len()];
        for bond in &self.bonds {
            degree[bond.begin] += 1;
            degree[bond.end] += 1;
        }

        let parents: Vec<Option<usize>> = self
            .atoms
            .iter()
            .enumerate()
            .map(|(index, atom)| {
                if !atom.element.is_hydrogen() || atom.formal_charge != 0 || degree[index] != 1 {
                    return None;
                }
                self.bonds
                    .iter()
                    .find(|b| b.contains(index) && b.order == BondOrder::Single)
                    .and_then(|b| b.partner(index))
                    .filter(|&parent| !self.atoms[parent].element.is_hydrogen())
            })
            .collect();

        let removed = parents.iter().flatten().count();
        if removed == 0 {
            return 0;
        }
        for &parent in parents.iter().flatten() {
            let atom = &mut self.atoms[parent];
            atom.hydrogens = atom.hydrogens.saturating_add(1);
        }

        let mut remap = vec![None; self.atoms.len()];
        let mut next = 0;
        for (index, parent) in parents.iter().enumerate() {
            if parent.is_none() {
                remap[index] = Some(next);
                next += 1;
            }
        }

        let atoms = std::mem::take(&mut self.atoms);
        self.atoms = atoms
            .into_iter()
            .zip(&parents)
            .filter(|(_, parent)| parent.is_none())
            .map(|(atom, _)| atom)
            .collect();
        let bonds = std::mem::take(&mut self.bonds);
        self.bonds = bonds
            .into_iter()
            .filter_map(|b| Some(Bond::new(remap[b.begin]?, remap[b.end]?, b.order)))
            .collect();
        self.bonded_pairs = self
            .bonds
            .iter()
            .map(|b| (b.begin.min(b.end), b.begin.max(b.end)))
            .collect();
        removed
    }

    pub fn property(&mut self, key: &str, value: impl Into<PropertyValue>) -> &mut Self {
        self.properties.insert(key, value);
        self
    }

    pub fn build(self) -> Molecule {
        let mut adjacency = vec![Vec::new(); self.atoms.len()];
        for (bond_idx, bond) in self.bonds.iter().enumerate() {
            adjacency[bond.begin].push(Neighbor {
                atom: bond.end,
                bond: bond_idx,
            });
            adjacency[bond.end].push(Neighbor {
                atom: bond.begin,
                bond: bond_idx,
            });
        }

        let ring_bonds = (0..self.bonds.len())
            .map(|bond_idx| closes_cycle(&adjacency, &self.bonds[bond_idx], bond_idx))
            .collect();

        Molecule {
            name: self.name,
            atoms: self.atoms,
            bonds: self.bonds,
            properties: self.properties,
            adjacency,
            ring_bonds,
        }
    }
}

// A bond lies on a ring iff its end atoms stay connected once the bond itself is removed.
fn closes_cycle(adjacency: &[Vec<Neighbor>], bond: &Bond, bond_idx: usize) -> bool {
    let mut visited = vec![false; adjacency.len()];
    let mut queue = VecDeque::from([bond.begin]);
    visited[bond.begin] = true;

    while let Some(current) = queue.pop_front() {
        for neighbor in &adjacency[current] {
            if neighbor.bond == bond_idx || visited[neighbor.atom] {
                continue;
            }
            if neighbor.atom == bond.end {
                return true;
            }
            visited[neighbor.atom] = true;
            queue.push_back(neighbor.atom);
        }
    }
    false
}
