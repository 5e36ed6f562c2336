//! Combining structural and schema diagnostics.

use std::collections::HashSet;

use crate::error::ValidationError;

/// Merge the two diagnostic lists.
///
/// A schema entry whose `(position, length)` equals that of any structural
/// entry is dropped. The result is sorted by position; the sort is stable, so
/// entries at the same position keep discovery order (structural first).
pub fn merge_errors(
    structural: Vec<ValidationError>,
    schema: Vec<ValidationError>,
) -> Vec<ValidationError> {
    let taken: HashSet<(usize, usize)> = structural.iter().map(ValidationError::span).collect();

    let mut merged: Vec<ValidationError> = structural
        .into_iter()
        .chain(schema.into_iter().filter(|e| !taken.contains(&e.span())))
        .collect();
    merged.sort_by_key(|e| e.position);
    merged
}
