use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// One attendance session: a student attending one subject on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// When the session took place.  Rows whose date could not be parsed
    /// never become records.
    pub date: NaiveDateTime,
    pub student_name: String,
    pub teacher_name: String,
    pub subject: String,
    /// Session length in minutes; a missing cell is stored as `0.0`.
    pub duration_minutes: f64,
    /// Name of the file the row was originally collected from, if recorded.
    #[serde(default)]
    pub source_file: Option<String>,
}

impl AttendanceRecord {
    /// Calendar date of the session, without the time of day.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Session length in hours.  Always derived from `duration_minutes`.
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes / 60.0
    }
}

/// One row of the student/teacher master list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentMaster {
    #[serde(default)]
    pub student_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// An attendance record enriched with the master row whose `name` equals
/// the record's `student_name`.
///
/// The match is by display name only; records without a match keep
/// `master: None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub master: Option<StudentMaster>,
}

impl JoinedRecord {
    pub fn day(&self) -> NaiveDate {
        self.record.day()
    }

    pub fn duration_hours(&self) -> f64 {
        self.record.duration_hours()
    }

    pub fn is_matched(&self) -> bool {
        self.master.is_some()
    }
}

// ── Filtering ─────────────────────────────────────────────────────────────────

/// Inclusive calendar-date interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds when they are given in reverse.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A range covering exactly one day.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// User-selected filters.  Empty name sets mean "no restriction".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub students: BTreeSet<String>,
    pub subjects: BTreeSet<String>,
    pub teachers: BTreeSet<String>,
    pub date_range: DateRange,
}

impl FilterCriteria {
    /// Criteria that restrict nothing but the date interval.
    pub fn new(date_range: DateRange) -> Self {
        Self {
            students: BTreeSet::new(),
            subjects: BTreeSet::new(),
            teachers: BTreeSet::new(),
            date_range,
        }
    }

    pub fn with_students<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.students = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_subjects<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_teachers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teachers = names.into_iter().map(Into::into).collect();
        self
    }

    /// `true` when `record` passes every active filter.
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        (self.students.is_empty() || self.students.contains(&record.student_name))
            && (self.subjects.is_empty() || self.subjects.contains(&record.subject))
            && (self.teachers.is_empty() || self.teachers.contains(&record.teacher_name))
            && self.date_range.contains(record.day())
    }

    /// The single selected student, required by the per-student detail
    /// views.
    pub fn single_student(&self) -> Result<&str> {
        match self.students.first() {
            Some(name) if self.students.len() == 1 => Ok(name),
            _ => Err(DashboardError::InvalidSelection {
                selected: self.students.len(),
            }),
        }
    }
}

// ── Aggregate result shapes ───────────────────────────────────────────────────

/// Column a summary table is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Student,
    Teacher,
    Subject,
}

impl GroupKey {
    /// The grouping value of `record`.
    pub fn value_of<'a>(&self, record: &'a AttendanceRecord) -> &'a str {
        match self {
            Self::Student => &record.student_name,
            Self::Teacher => &record.teacher_name,
            Self::Subject => &record.subject,
        }
    }
}

/// One row of a student-, teacher- or subject-wise summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Value of the grouping column.
    pub key: String,
    pub total_minutes: f64,
    pub total_hours: f64,
    /// Number of attendance records in the group.
    pub sessions: usize,
    /// Earliest session date (student grouping only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_date: Option<NaiveDate>,
    /// Latest session date (student grouping only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_date: Option<NaiveDate>,
    /// Distinct students in the group (teacher and subject grouping only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_students: Option<usize>,
    /// Distinct calendar dates in the group (per-student subject breakdown).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_dates: Option<usize>,
}

/// Total hours attended by one student on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBreakdown {
    pub date: NaiveDate,
    pub total_hours: f64,
}

/// Hours per (date, subject) for one student; absent combinations are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateSubjectMatrix {
    /// Row labels, ascending.
    pub dates: Vec<NaiveDate>,
    /// Column labels, sorted.
    pub subjects: Vec<String>,
    /// `cells[row][col]` holds the summed hours for `dates[row]` and
    /// `subjects[col]`.
    pub cells: Vec<Vec<f64>>,
}

impl DateSubjectMatrix {
    /// Look up one cell by its labels.  Unknown labels yield `None`.
    pub fn get(&self, date: NaiveDate, subject: &str) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        let col = self.subjects.iter().position(|s| s == subject)?;
        self.cells.get(row)?.get(col).copied()
    }

    /// Sum of every row, one value per date.
    pub fn row_totals(&self) -> Vec<f64> {
        self.cells.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Headline numbers for the filtered collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub total_hours: f64,
    pub total_minutes: f64,
    pub unique_students: usize,
    pub unique_subjects: usize,
    pub unique_teachers: usize,
    pub unique_dates: usize,
    pub total_records: usize,
}
