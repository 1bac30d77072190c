use super::annotations::{
    ID_KEYS, PKA_KEYS, REACTION_CENTER_KEYS, REACTION_TYPE_KEYS, molecule_label, require_f64,
    require_index, text_or_empty,
};
use super::error::WorkflowError;
use crate::core::features::FeatureSet;
use crate::core::models::molecule::Molecule;
use crate::pipeline::conjugate::{ConjugateGenerator, resolve_pair};
use crate::pipeline::sample::{PairedSample, assemble_paired};
use tracing::{debug, instrument};

/// Builds a paired sample from one molecule carrying its own annotations.
///
/// The pKa is read from `pKa` and the reaction center from `epik_atom`, falling back to
/// `marvin_atom`. The conjugate comes from `generator` and the protonation roles from the
/// charge at the reaction center; an ambiguous assignment is kept and flagged in
/// [`PairedSample::state`]. The pKa becomes the sample's `reference_value`, `pka_number` or
/// `marvin_pKa_type` its reaction type, and `ID` its identifier.
///
/// # Errors
///
/// Fails if the pKa or reaction center is missing or malformed, if conjugate generation fails,
/// or if graphs cannot be built.
#[instrument(skip_all, fields(molecule = molecule.name()))]
pub fn materialize_from_annotated_molecule<G: ConjugateGenerator + ?Sized>(
    molecule: &Molecule,
    features: &FeatureSet,
    generator: &G,
) -> Result<PairedSample, WorkflowError> {
    let pka = require_f64(molecule, PKA_KEYS)?;
    let reaction_center = require_index(molecule, REACTION_CENTER_KEYS)?;

    let conjugate = generator
        .create_conjugate(molecule, reaction_center, pka, false)
        .map_err(|source| WorkflowError::Conjugate {
            molecule: molecule_label(molecule),
            source,
        })?;

    let pair = resolve_pair(molecule, &conjugate, reaction_center).map_err(|source| {
        WorkflowError::Resolve {
            molecule: molecule_label(molecule),
            source,
        }
    })?;

    let mut sample = assemble_paired(
        pair.protonated,
        pair.deprotonated,
        reaction_center,
        &features.node,
        &features.edge,
    )?;
    sample.reference_value = Some(pka as f32);
    sample.reaction_type = text_or_empty(molecule, REACTION_TYPE_KEYS);
    sample.id = text_or_empty(molecule, ID_KEYS);
    sample.state = pair.state;

    debug!(
        reaction_center,
        state = ?sample.state,
        protonated_charge = sample.protonated.charge,
        deprotonated_charge = sample.deprotonated.charge,
        "Built paired sample."
    );
    Ok(sample)
}
