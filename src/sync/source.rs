//! Highest-rated source selection

use crate::catalog::SourceRecord;

/// Pick the source with the strictly greatest rating
///
/// Ties go to the first occurrence. Returns `None` when no source is rated
/// above zero, which callers treat the same as having no sources.
pub fn select_best_source(sources: &[SourceRecord]) -> Option<&SourceRecord> {
    let mut best = None;
    let mut highest = 0.0;

    for source in sources {
        let rating = source.rating();
        if rating > highest {
            highest = rating;
            best = Some(source);
        }
    }

    best
}
