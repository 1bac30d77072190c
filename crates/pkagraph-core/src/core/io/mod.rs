//! Provides input functionality for annotated structure files.
//!
//! Structure files carry the molecules of a pKa dataset together with their annotations
//! (measured pKa, reaction-center atom, identifiers) as per-record data items. Readers implement
//! the [`traits::StructureFile`] trait.

pub mod sdf;
pub mod traits;
