use super::error::WorkflowError;

/// Splits `items` into `k` consecutive folds of near-equal size.
///
/// Every fold gets `n / k` items and the first `n % k` folds get one more. Item order is kept.
///
/// # Errors
///
/// Returns [`WorkflowError::InvalidFoldCount`] if `k` is zero.
pub fn slice_into_folds<T>(items: Vec<T>, k: usize) -> Result<Vec<Vec<T>>, WorkflowError> {
    if k == 0 {
        return Err(WorkflowError::InvalidFoldCount {
            folds: k,
            items: items.len(),
        });
    }

    let base = items.len() / k;
    let remainder = items.len() % k;
    let mut iter = items.into_iter();
    Ok((0..k)
        .map(|fold| {
            let size = base + usize::from(fold < remainder);
            iter.by_ref().take(size).collect()
        })
        .collect())
}

/// Uses fold `index` for validation and the concatenation of all other folds, in order, for
/// training. Returns `(training, validation)`.
///
/// # Errors
///
/// Returns [`WorkflowError::FoldOutOfRange`] if `index` does not name a fold.
pub fn cross_validation_split<T: Clone>(
    folds: &[Vec<T>],
    index: usize,
) -> Result<(Vec<T>, Vec<T>), WorkflowError> {
    let validation = folds
        .get(index)
        .ok_or(WorkflowError::FoldOutOfRange {
            index,
            folds: folds.len(),
        })?
        .clone();
    let training = folds
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .flat_map(|(_, fold)| fold.iter().cloned())
        .collect();
    Ok((training, validation))
}
