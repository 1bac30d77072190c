//! # Core Models Module
//!
//! Data structures describing a small molecule as read from a structure file.
//!
//! ## Key Components
//!
//! - [`element`] - Chemical elements and symbol lookup
//! - [`atom`] - Atom with element, formal charge, hydrogen count and coordinates
//! - [`bond`] - Bond between two atom indices with its order
//! - [`properties`] - String-keyed property bag carried by each molecule
//! - [`molecule`] - The molecule itself and its builder
//!
//! ## Usage
//!
//! ```ignore
//! use pkagraph::core::models::{element::Element, molecule::MoleculeBuilder, bond::BondOrder};
//!
//! let mut builder = MoleculeBuilder::new("ethanol");
//! let c1 = builder.add_atom(Element::CARBON);
//! let c2 = builder.add_atom(Element::CARBON);
//! let o = builder.add_atom(Element::OXYGEN);
//! builder.add_bond(c1, c2, BondOrder::Single)?;
//! builder.add_bond(c2, o, BondOrder::Single)?;
//! let molecule = builder.build();
//! ```

pub mod atom;
pub mod bond;
pub mod element;
pub mod molecule;
pub mod properties;
