//! # Chemical Perception
//!
//! Derived chemical properties of atoms and bonds that are not stored on the molecule itself:
//! hybridization, conjugation, rotatability, valence and implicit hydrogens, and topological
//! distances. All functions are pure reads of a [`Molecule`](crate::core::models::molecule::Molecule).

pub mod perception;
pub mod valence;
