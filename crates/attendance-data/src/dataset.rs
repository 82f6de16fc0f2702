//! The joined, immutable collection produced by a load.

use std::collections::BTreeSet;

use attendance_core::models::{DateRange, FilterCriteria, JoinedRecord, StudentMaster};
use serde::{Deserialize, Serialize};

/// Counters describing what happened while the sources were read and
/// joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Non-blank attendance rows read from the sheet.
    pub rows_read: usize,
    /// Attendance rows discarded for a missing or unparseable date.
    pub invalid_dates_dropped: usize,
    /// Joined rows without a master match.
    pub unmatched_records: usize,
    /// Master names that occur more than once.
    pub duplicate_master_names: Vec<String>,
}

/// Values offered by the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub students: Vec<String>,
    pub subjects: Vec<String>,
    pub teachers: Vec<String>,
    pub date_bounds: Option<DateRange>,
}

/// Attendance records joined to the master list.
///
/// Built once per load and never mutated; filters produce borrowed views.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<JoinedRecord>,
    students: Vec<StudentMaster>,
    stats: LoadStats,
}

impl Dataset {
    pub fn new(records: Vec<JoinedRecord>, students: Vec<StudentMaster>, stats: LoadStats) -> Self {
        Self {
            records,
            students,
            stats,
        }
    }

    pub fn records(&self) -> &[JoinedRecord] {
        &self.records
    }

    pub fn students(&self) -> &[StudentMaster] {
        &self.students
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest session day, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let mut days = self.records.iter().map(JoinedRecord::day);
        let first = days.next()?;
        let (min, max) = days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateRange::new(min, max))
    }

    /// Criteria that pass every record: no name restrictions over the full
    /// date range.  `None` when there is nothing to bound.
    pub fn default_criteria(&self) -> Option<FilterCriteria> {
        self.date_bounds().map(FilterCriteria::new)
    }

    /// Sorted distinct student, subject and teacher names plus the date
    /// bounds.  Empty names are not offered.
    pub fn filter_options(&self) -> FilterOptions {
        fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
            values
                .filter(|v| !v.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        }

        FilterOptions {
            students: distinct(self.records.iter().map(|r| r.record.student_name.as_str())),
            subjects: distinct(self.records.iter().map(|r| r.record.subject.as_str())),
            teachers: distinct(self.records.iter().map(|r| r.record.teacher_name.as_str())),
            date_bounds: self.date_bounds(),
        }
    }
}
