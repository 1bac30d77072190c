//! Conjugate structures and protonation-role assignment.
//!
//! A [`generator::ConjugateGenerator`] toggles the protonation state of one atom while keeping
//! atom numbering intact. [`resolver::resolve_pair`] then decides which of the two structures is
//! the protonated one by comparing the formal charge at the reaction center.

pub mod generator;
pub mod resolver;

pub use generator::{ConjugateError, ConjugateGenerator, ProtonToggle};
pub use resolver::{PairState, ResolveError, ResolvedPair, resolve_pair};
