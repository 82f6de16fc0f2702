//! The filter stage: select the joined records matching a
//! [`FilterCriteria`].

use attendance_core::models::{FilterCriteria, JoinedRecord};
use tracing::debug;

/// Result of filtering.  An empty selection is a normal outcome, kept
/// apart from errors so callers can show a no-data state.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome<'a> {
    Matched(Vec<&'a JoinedRecord>),
    Empty,
}

impl<'a> FilterOutcome<'a> {
    /// Matched records in input order; empty for [`FilterOutcome::Empty`].
    pub fn records(&self) -> &[&'a JoinedRecord] {
        match self {
            Self::Matched(records) => records,
            Self::Empty => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Keep the records that pass `criteria`, preserving input order.
pub fn apply_filters<'a>(
    records: &'a [JoinedRecord],
    criteria: &FilterCriteria,
) -> FilterOutcome<'a> {
    let matched: Vec<&JoinedRecord> = records
        .iter()
        .filter(|r| criteria.matches(&r.record))
        .collect();

    debug!(
        "filter kept {} of {} records ({} students, {} subjects, {} teachers, {})",
        matched.len(),
        records.len(),
        criteria.students.len(),
        criteria.subjects.len(),
        criteria.teachers.len(),
        criteria.date_range
    );

    if matched.is_empty() {
        FilterOutcome::Empty
    } else {
        FilterOutcome::Matched(matched)
    }
}

/// Split `records` into `(passing, failing)`, each in input order.
pub fn partition<'a>(
    records: &'a [JoinedRecord],
    criteria: &FilterCriteria,
) -> (Vec<&'a JoinedRecord>, Vec<&'a JoinedRecord>) {
    records.iter().partition(|r| criteria.matches(&r.record))
}
