//! # Workflows Module
//!
//! Dataset-wide entry points.
//!
//! A typical pass reads annotated SD files, pairs every molecule with its conjugate
//! ([`preprocess`]), builds graph samples from the resulting rows ([`dataset`]) and optionally
//! writes a manifest ([`manifest`]). Single annotated molecules go through [`annotated`].
//! [`folds`] splits prepared datasets for cross-validation.

pub mod annotated;
pub mod annotations;
pub mod dataset;
pub mod error;
pub mod folds;
pub mod manifest;
pub mod preprocess;
