use super::annotations::{
    CONJUGATE_PKA_KEYS, DATASET_CENTER_KEYS, ID_KEYS, PKA_KEYS, molecule_label, require_f64,
    require_index, text_or_empty,
};
use super::dataset::{DatasetRow, RowStatus};
use super::error::WorkflowError;
use crate::core::io::sdf::SdfFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::molecule::Molecule;
use crate::pipeline::conjugate::{ConjugateGenerator, resolve_pair};
use crate::pipeline::progress::{Progress, ProgressReporter};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pairs every molecule of a dataset with its conjugate.
///
/// Each molecule must carry `marvin_atom` (reaction center), `marvin_pKa` (passed to the
/// generator) and `pKa` (the target); `ID` is optional. When the generator fails for a molecule
/// the failure is logged, the original structure stands in for the conjugate and the row is
/// marked [`RowStatus::Degraded`]. Rows keep the input order.
///
/// # Errors
///
/// Missing or malformed annotations and reaction centers outside the molecule are fatal; the
/// error of the lowest-indexed failing molecule is returned.
#[instrument(skip_all, name = "preprocess_workflow")]
pub fn preprocess<G: ConjugateGenerator + ?Sized>(
    molecules: Vec<Molecule>,
    generator: &G,
    ignore_danger: bool,
    reporter: &ProgressReporter,
) -> Result<Vec<DatasetRow>, WorkflowError> {
    info!(molecules = molecules.len(), "Generating conjugate pairs.");
    let rows = reporter.phase("Conjugate pairing", || {
        reporter.report(Progress::TaskStart {
            total: molecules.len() as u64,
        });

        #[cfg(not(feature = "parallel"))]
        let iterator = molecules.into_iter().enumerate();

        #[cfg(feature = "parallel")]
        let iterator = molecules.into_par_iter().enumerate();

        let results: Vec<Result<DatasetRow, WorkflowError>> = iterator
            .map(|(index, molecule)| {
                let row = pair_molecule(index, molecule, generator, ignore_danger);
                if let Ok(DatasetRow { status, .. }) = &row {
                    if !status.is_resolved() {
                        reporter.report(Progress::RowFlagged {
                            row: index,
                            reason: status.to_string(),
                        });
                    }
                }
                reporter.report(Progress::TaskIncrement);
                row
            })
            .collect();

        reporter.report(Progress::TaskFinish);
        results.into_iter().collect::<Result<Vec<_>, _>>()
    })?;

    let degraded = rows
        .iter()
        .filter(|r| matches!(r.status, RowStatus::Degraded(_)))
        .count();
    let ambiguous = rows
        .iter()
        .filter(|r| r.status == RowStatus::Ambiguous)
        .count();
    info!(rows = rows.len(), degraded, ambiguous, "Conjugate pairing finished.");
    Ok(rows)
}

/// Reads an SDF file and preprocesses its records.
///
/// # Errors
///
/// Returns [`WorkflowError::Input`] if the file cannot be read or parsed, otherwise as
/// [`preprocess`].
pub fn preprocess_file<G: ConjugateGenerator + ?Sized>(
    path: &Path,
    generator: &G,
    ignore_danger: bool,
    reporter: &ProgressReporter,
) -> Result<Vec<DatasetRow>, WorkflowError> {
    let molecules = SdfFile::read_from_path(path).map_err(|source| WorkflowError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), records = molecules.len(), "Read structure file.");
    preprocess(molecules, generator, ignore_danger, reporter)
}

/// Preprocesses several named datasets, in name order.
///
/// # Errors
///
/// Stops at the first dataset that fails.
pub fn preprocess_all<G: ConjugateGenerator + ?Sized>(
    datasets: &BTreeMap<String, PathBuf>,
    generator: &G,
    ignore_danger: bool,
    reporter: &ProgressReporter,
) -> Result<BTreeMap<String, Vec<DatasetRow>>, WorkflowError> {
    let mut prepared = BTreeMap::new();
    for (name, path) in datasets {
        info!(dataset = %name, path = %path.display(), "Preprocessing dataset.");
        reporter.report(Progress::Message(format!("{name}: {}", path.display())));
        let rows = preprocess_file(path, generator, ignore_danger, reporter)?;
        prepared.insert(name.clone(), rows);
    }
    Ok(prepared)
}

fn pair_molecule<G: ConjugateGenerator + ?Sized>(
    index: usize,
    molecule: Molecule,
    generator: &G,
    ignore_danger: bool,
) -> Result<DatasetRow, WorkflowError> {
    let reaction_center = require_index(&molecule, DATASET_CENTER_KEYS)?;
    let conjugate_pka = require_f64(&molecule, CONJUGATE_PKA_KEYS)?;
    let reference_value = require_f64(&molecule, PKA_KEYS)?;
    let id = text_or_empty(&molecule, ID_KEYS);
    let label = molecule_label(&molecule);

    let (conjugate, failure) =
        match generator.create_conjugate(&molecule, reaction_center, conjugate_pka, ignore_danger) {
            Ok(conjugate) => (conjugate, None),
            Err(e) => {
                warn!(
                    row = index,
                    atom = reaction_center,
                    molecule = %label,
                    error = %e,
                    "Could not create conjugate; keeping the original structure."
                );
                (molecule.clone(), Some(e.to_string()))
            }
        };

    let pair = resolve_pair(molecule, conjugate, reaction_center).map_err(|source| {
        WorkflowError::Resolve {
            molecule: label,
            source,
        }
    })?;

    let status = match failure {
        Some(reason) => RowStatus::Degraded(reason),
        None if pair.is_ambiguous() => RowStatus::Ambiguous,
        None => RowStatus::Resolved,
    };

    Ok(DatasetRow {
        id,
        reaction_center,
        protonated: pair.protonated,
        deprotonated: pair.deprotonated,
        reference_value,
        status,
    })
}
