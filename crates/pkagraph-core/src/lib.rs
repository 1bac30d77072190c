//! # pkagraph Core Library
//!
//! A library for preparing acid dissociation constant (pKa) data for graph neural networks.
//! Every ionizable site is represented by a conjugate pair of molecular graphs, one for the
//! protonated and one for the deprotonated state, sharing a single reaction-center index.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless molecule models, chemical perception, structure-file
//!   I/O and the feature vocabulary that turns atoms and bonds into numeric columns.
//!
//! - **[`pipeline`]: The Transformation Layer.** Conjugate generation and protonation-role
//!   resolution, the graph builder, paired sample assembly and batching.
//!
//! - **[`workflows`]: The Public API.** Dataset-wide passes that drive the pipeline over many
//!   molecules: preprocessing, materialization, annotated-molecule ingestion, cross-validation
//!   folds and manifest export.

pub mod core;
pub mod pipeline;
pub mod workflows;
