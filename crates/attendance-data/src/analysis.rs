//! Report assembly: filter the dataset, run every aggregate and hand the
//! result to the presentation layer as one serializable value.

use attendance_core::error::DashboardError;
use attendance_core::models::{
    DailyBreakdown, DateSubjectMatrix, FilterCriteria, GroupKey, JoinedRecord, OverviewMetrics,
    SummaryRow,
};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::AttendanceAggregator;
use crate::dataset::{Dataset, LoadStats};
use crate::filter::{apply_filters, FilterOutcome};

/// Message shown when the per-student views are unavailable.
pub const SELECT_ONE_STUDENT: &str =
    "Select exactly one student to see the subject-wise and date-wise breakdown.";

/// Message shown when the filters match nothing.
pub const NO_DATA: &str = "No data found for the selected filters.";

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything the dashboard shows for one set of filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// RFC 3339 timestamp when this report was built.
    pub generated_at: String,
    pub criteria: FilterCriteria,
    pub stats: LoadStats,
    pub outcome: ReportOutcome,
}

impl DashboardReport {
    /// The aggregates, or `None` when the filters matched nothing.
    pub fn data(&self) -> Option<&ReportData> {
        match &self.outcome {
            ReportOutcome::Data(data) => Some(data),
            ReportOutcome::Empty => None,
        }
    }
}

/// Either the no-data state or the computed aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ReportOutcome {
    Empty,
    Data(Box<ReportData>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub overview: OverviewMetrics,
    pub students: Vec<SummaryRow>,
    pub teachers: Vec<SummaryRow>,
    pub subjects: Vec<SummaryRow>,
    pub detail: StudentDetailView,
    /// Filtered records ordered by date, then student name.
    pub records: Vec<RecordRow>,
}

/// Per-student views, available only for a single selected student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StudentDetailView {
    Available(StudentDetail),
    Unavailable { guidance: String, selected: usize },
}

impl StudentDetailView {
    pub fn detail(&self) -> Option<&StudentDetail> {
        match self {
            Self::Available(detail) => Some(detail),
            Self::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDetail {
    pub student: String,
    pub subjects: Vec<SummaryRow>,
    pub daily: Vec<DailyBreakdown>,
    pub matrix: DateSubjectMatrix,
}

/// One row of the raw records table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub date: NaiveDateTime,
    pub student_name: String,
    pub teacher_name: String,
    pub subject: String,
    pub duration_minutes: f64,
    pub duration_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub student_id: Option<String>,
    pub grade: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

impl From<&JoinedRecord> for RecordRow {
    fn from(joined: &JoinedRecord) -> Self {
        let r = &joined.record;
        let master = joined.master.as_ref();
        Self {
            date: r.date,
            student_name: r.student_name.clone(),
            teacher_name: r.teacher_name.clone(),
            subject: r.subject.clone(),
            duration_minutes: r.duration_minutes,
            duration_hours: r.duration_hours(),
            source_file: r.source_file.clone(),
            student_id: master.and_then(|m| m.student_id.clone()),
            grade: master.and_then(|m| m.grade.clone()),
            email: master.and_then(|m| m.email.clone()),
            status: master.and_then(|m| m.status.clone()),
        }
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Filter `dataset` with `criteria` and compute every aggregate.
///
/// An empty selection yields [`ReportOutcome::Empty`]; a selection that does
/// not name exactly one student yields guidance in place of the detail
/// views.  Neither is an error.
pub fn build_report(dataset: &Dataset, criteria: &FilterCriteria) -> DashboardReport {
    let outcome = match apply_filters(dataset.records(), criteria) {
        FilterOutcome::Empty => ReportOutcome::Empty,
        FilterOutcome::Matched(records) => {
            ReportOutcome::Data(Box::new(build_data(&records, criteria)))
        }
    };

    DashboardReport {
        generated_at: Utc::now().to_rfc3339(),
        criteria: criteria.clone(),
        stats: dataset.stats().clone(),
        outcome,
    }
}

/// Detail views for the single student named by `criteria`.
pub fn student_detail(
    records: &[&JoinedRecord],
    criteria: &FilterCriteria,
) -> Result<StudentDetail, DashboardError> {
    let student = criteria.single_student()?;
    Ok(StudentDetail {
        student: student.to_string(),
        subjects: AttendanceAggregator::subject_breakdown(records, student),
        daily: AttendanceAggregator::daily_breakdown(records, student),
        matrix: AttendanceAggregator::date_subject_matrix(records, student),
    })
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn build_data(records: &[&JoinedRecord], criteria: &FilterCriteria) -> ReportData {
    let detail = match student_detail(records, criteria) {
        Ok(detail) => StudentDetailView::Available(detail),
        Err(e) => {
            debug!("student detail unavailable: {}", e);
            StudentDetailView::Unavailable {
                guidance: SELECT_ONE_STUDENT.to_string(),
                selected: criteria.students.len(),
            }
        }
    };

    ReportData {
        overview: AttendanceAggregator::overview_metrics(records),
        students: AttendanceAggregator::summarize_by(records, GroupKey::Student),
        teachers: AttendanceAggregator::summarize_by(records, GroupKey::Teacher),
        subjects: AttendanceAggregator::summarize_by(records, GroupKey::Subject),
        detail,
        records: AttendanceAggregator::raw_records(records)
            .into_iter()
            .map(RecordRow::from)
            .collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
