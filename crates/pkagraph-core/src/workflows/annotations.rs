use super::error::WorkflowError;
use crate::core::models::molecule::Molecule;
use crate::core::models::properties::PropertyValue;
use itertools::Itertools;

/// Reaction-center keys for annotated molecules, in priority order.
pub const REACTION_CENTER_KEYS: &[&str] = &["epik_atom", "marvin_atom"];
/// Reaction-center keys used when preprocessing whole datasets.
pub const DATASET_CENTER_KEYS: &[&str] = &["marvin_atom"];
/// The experimental pKa, used as the regression target.
pub const PKA_KEYS: &[&str] = &["pKa"];
/// The predicted pKa handed to the conjugate generator during preprocessing.
pub const CONJUGATE_PKA_KEYS: &[&str] = &["marvin_pKa"];
pub const REACTION_TYPE_KEYS: &[&str] = &["pka_number", "marvin_pKa_type"];
pub const ID_KEYS: &[&str] = &["ID"];

/// Name used for a molecule in diagnostics: its title and canonical formula.
pub fn molecule_label(molecule: &Molecule) -> String {
    if molecule.name().is_empty() {
        molecule.canonical_id()
    } else {
        format!("'{}' ({})", molecule.name(), molecule.canonical_id())
    }
}

fn require<'m>(
    molecule: &'m Molecule,
    keys: &[&'static str],
) -> Result<(&'static str, &'m PropertyValue), WorkflowError> {
    molecule
        .properties()
        .first_of(keys)
        .ok_or_else(|| WorkflowError::MissingProperty {
            property: keys.iter().join(" or "),
            molecule: molecule_label(molecule),
        })
}

fn invalid(molecule: &Molecule, key: &str, value: &PropertyValue) -> WorkflowError {
    WorkflowError::InvalidProperty {
        property: key.to_string(),
        value: value.to_string(),
        molecule: molecule_label(molecule),
    }
}

/// The first present key of `keys`, read as an atom index.
pub fn require_index(molecule: &Molecule, keys: &[&'static str]) -> Result<usize, WorkflowError> {
    let (key, value) = require(molecule, keys)?;
    value.as_index().ok_or_else(|| invalid(molecule, key, value))
}

/// The first present key of `keys`, read as a finite number.
pub fn require_f64(molecule: &Molecule, keys: &[&'static str]) -> Result<f64, WorkflowError> {
    let (key, value) = require(molecule, keys)?;
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(molecule, key, value))
}

/// The first present key of `keys` as text, or an empty string.
pub fn text_or_empty(molecule: &Molecule, keys: &[&'static str]) -> String {
    molecule
        .properties()
        .first_of(keys)
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}
