//! # Pipeline Module
//!
//! Turns molecules into training samples.
//!
//! ## Key Components
//!
//! - [`conjugate`] - Conjugate generation and protonated/deprotonated role assignment
//! - [`graph`] - Node and edge matrices of a single molecule
//! - [`sample`] - Single and paired samples built from those matrices
//! - [`batch`] - Concatenation of samples into batches with per-side node offsets
//! - [`config`] - Pipeline configuration and its builder
//! - [`progress`] - Progress events for long passes

pub mod batch;
pub mod config;
pub mod conjugate;
pub mod error;
pub mod graph;
pub mod progress;
pub mod sample;
