//! # Core Module
//!
//! Fundamental building blocks for the pKa graph pipeline.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, molecules and property bags
//! - **Chemical Perception** ([`chem`]) - Ring membership, hybridization, conjugation, valence
//! - **File I/O** ([`io`]) - Reading annotated structure files
//! - **Feature Vocabulary** ([`features`]) - Named atom/bond encoders and their value domains

pub mod chem;
pub mod features;
pub mod io;
pub mod models;
