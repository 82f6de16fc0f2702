//! Grouped totals over a filtered record collection.
//!
//! Every function is a pure transform of its input slice; nothing is cached
//! between calls.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use attendance_core::models::{
    DailyBreakdown, DateSubjectMatrix, GroupKey, JoinedRecord, OverviewMetrics, SummaryRow,
};
use chrono::NaiveDate;

// ── GroupStats ────────────────────────────────────────────────────────────────

/// Running totals for one group.
#[derive(Debug, Clone, Default)]
struct GroupStats {
    total_minutes: f64,
    sessions: usize,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    students: HashSet<String>,
    dates: HashSet<NaiveDate>,
}

impl GroupStats {
    fn add(&mut self, record: &JoinedRecord) {
        let day = record.day();
        self.total_minutes += record.record.duration_minutes;
        self.sessions += 1;
        self.first_date = Some(self.first_date.map_or(day, |d| d.min(day)));
        self.last_date = Some(self.last_date.map_or(day, |d| d.max(day)));
        if !record.record.student_name.is_empty() {
            self.students.insert(record.record.student_name.clone());
        }
        self.dates.insert(day);
    }

    fn into_row(self, key: String) -> SummaryRow {
        SummaryRow {
            key,
            total_minutes: self.total_minutes,
            total_hours: self.total_minutes / 60.0,
            sessions: self.sessions,
            first_date: self.first_date,
            last_date: self.last_date,
            unique_students: Some(self.students.len()),
            unique_dates: Some(self.dates.len()),
        }
    }
}

// ── AttendanceAggregator ──────────────────────────────────────────────────────

/// Stateless helper that groups attendance records.
pub struct AttendanceAggregator;

impl AttendanceAggregator {
    /// One row per distinct value of `key`, sorted by total hours
    /// descending.  Groups with equal totals keep the order in which their
    /// key first appeared.
    ///
    /// Student rows carry first/last dates, teacher and subject rows carry
    /// the distinct student count.
    pub fn summarize_by(records: &[&JoinedRecord], key: GroupKey) -> Vec<SummaryRow> {
        Self::group(records, |r| key.value_of(&r.record))
            .into_iter()
            .map(|row| match key {
                GroupKey::Student => SummaryRow {
                    unique_students: None,
                    unique_dates: None,
                    ..row
                },
                GroupKey::Teacher | GroupKey::Subject => SummaryRow {
                    first_date: None,
                    last_date: None,
                    unique_dates: None,
                    ..row
                },
            })
            .collect()
    }

    /// Per-subject totals for one student, with session and distinct-date
    /// counts, ordered like [`summarize_by`](Self::summarize_by).
    pub fn subject_breakdown(records: &[&JoinedRecord], student: &str) -> Vec<SummaryRow> {
        let own = Self::records_of(records, student);
        Self::group(&own, |r| r.record.subject.as_str())
            .into_iter()
            .map(|row| SummaryRow {
                first_date: None,
                last_date: None,
                unique_students: None,
                ..row
            })
            .collect()
    }

    /// Hours per calendar date for one student, ascending by date.
    pub fn daily_breakdown(records: &[&JoinedRecord], student: &str) -> Vec<DailyBreakdown> {
        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in Self::records_of(records, student) {
            *by_day.entry(record.day()).or_default() += record.duration_hours();
        }
        by_day
            .into_iter()
            .map(|(date, total_hours)| DailyBreakdown { date, total_hours })
            .collect()
    }

    /// Date by subject pivot of hours for one student.  Dates ascend,
    /// subjects are sorted and absent combinations hold `0.0`.
    pub fn date_subject_matrix(records: &[&JoinedRecord], student: &str) -> DateSubjectMatrix {
        let own = Self::records_of(records, student);

        let dates: Vec<NaiveDate> = own
            .iter()
            .map(|r| r.day())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let subjects: Vec<String> = own
            .iter()
            .map(|r| r.record.subject.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut cells = vec![vec![0.0; subjects.len()]; dates.len()];
        for record in own {
            // Both lookups succeed: the labels were collected from `own`.
            if let (Ok(row), Ok(col)) = (
                dates.binary_search(&record.day()),
                subjects.binary_search(&record.record.subject),
            ) {
                cells[row][col] += record.duration_hours();
            }
        }

        DateSubjectMatrix {
            dates,
            subjects,
            cells,
        }
    }

    /// Scalar totals over the whole collection.  Distinct counts ignore
    /// empty names.
    pub fn overview_metrics(records: &[&JoinedRecord]) -> OverviewMetrics {
        fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> usize {
            values.filter(|v| !v.is_empty()).collect::<HashSet<_>>().len()
        }

        let total_minutes: f64 = records.iter().map(|r| r.record.duration_minutes).sum();

        OverviewMetrics {
            total_hours: total_minutes / 60.0,
            total_minutes,
            unique_students: distinct(records.iter().map(|r| r.record.student_name.as_str())),
            unique_subjects: distinct(records.iter().map(|r| r.record.subject.as_str())),
            unique_teachers: distinct(records.iter().map(|r| r.record.teacher_name.as_str())),
            unique_dates: records.iter().map(|r| r.day()).collect::<HashSet<_>>().len(),
            total_records: records.len(),
        }
    }

    /// The records sorted by date-time, then student name.  Equal keys keep
    /// their input order.
    pub fn raw_records<'a>(records: &[&'a JoinedRecord]) -> Vec<&'a JoinedRecord> {
        let mut sorted = records.to_vec();
        sorted.sort_by(|a, b| {
            a.record
                .date
                .cmp(&b.record.date)
                .then_with(|| a.record.student_name.cmp(&b.record.student_name))
        });
        sorted
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn records_of<'a>(records: &[&'a JoinedRecord], student: &str) -> Vec<&'a JoinedRecord> {
        records
            .iter()
            .copied()
            .filter(|r| r.record.student_name == student)
            .collect()
    }

    /// Accumulate a [`GroupStats`] per key and emit rows sorted by hours
    /// descending, ties in first-occurrence order.
    fn group<'r>(
        records: &[&'r JoinedRecord],
        key_fn: impl Fn(&'r JoinedRecord) -> &'r str,
    ) -> Vec<SummaryRow> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, GroupStats> = HashMap::new();

        for &record in records {
            let key = key_fn(record);
            groups
                .entry(key)
                .or_insert_with(|| {
                    order.push(key);
                    GroupStats::default()
                })
                .add(record);
        }

        let mut rows: Vec<SummaryRow> = order
            .into_iter()
            .filter_map(|key| groups.remove(key).map(|stats| stats.into_row(key.to_string())))
            .collect();
        rows.sort_by(|a, b| b.total_hours.total_cmp(&a.total_hours));
        rows
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
