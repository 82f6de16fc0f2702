//! One dashboard session: resolved sources, the memoized dataset and the
//! current filter selection.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use attendance_core::error::Result;
use attendance_core::models::{DateRange, FilterCriteria};
use attendance_core::settings::Settings;
use attendance_data::analysis::{build_report, DashboardReport};
use attendance_data::dataset::{Dataset, FilterOptions};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::data_manager::LoadCache;
use crate::sources::{ResolvedSources, SourceSelection};

// ── FilterRequest ─────────────────────────────────────────────────────────────

/// Filters asked for before the data is known.  Missing dates are filled
/// from the dataset's bounds once it is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub students: BTreeSet<String>,
    pub subjects: BTreeSet<String>,
    pub teachers: BTreeSet<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl FilterRequest {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            students: settings.students.iter().cloned().collect(),
            subjects: settings.subjects.iter().cloned().collect(),
            teachers: settings.teachers.iter().cloned().collect(),
            from: settings.from,
            to: settings.to,
        }
    }

    /// Concrete criteria for a dataset spanning `bounds`.  Without bounds
    /// or explicit dates the range collapses to today.
    ///
    /// Two explicit dates are taken in either order.  A missing end is taken
    /// from `bounds` but never crosses the explicit one, so `--from` after
    /// the last record (or `--to` before the first) selects nothing.
    pub fn criteria(&self, bounds: Option<DateRange>) -> FilterCriteria {
        let range = match (self.from, self.to) {
            (Some(from), Some(to)) => DateRange::new(from, to),
            (Some(from), None) => {
                let end = bounds.map_or(from, |b| b.end().max(from));
                DateRange::new(from, end)
            }
            (None, Some(to)) => {
                let start = bounds.map_or(to, |b| b.start().min(to));
                DateRange::new(start, to)
            }
            (None, None) => bounds.unwrap_or_else(|| DateRange::single(Utc::now().date_naive())),
        };

        FilterCriteria::new(range)
            .with_students(self.students.iter().cloned())
            .with_subjects(self.subjects.iter().cloned())
            .with_teachers(self.teachers.iter().cloned())
    }
}

// ── DashboardSession ──────────────────────────────────────────────────────────

/// Owns everything the presentation layer needs between interactions.
///
/// Every filter change only recomputes the report; the sources are read
/// again only when the selection changes or a reload is requested.
pub struct DashboardSession {
    selection: SourceSelection,
    request: FilterRequest,
    cache: LoadCache,
    sources: Option<ResolvedSources>,
    dataset: Option<Arc<Dataset>>,
    criteria: Option<FilterCriteria>,
}

impl DashboardSession {
    pub fn new(selection: SourceSelection, request: FilterRequest) -> Self {
        Self::with_cache(selection, request, LoadCache::new())
    }

    pub fn with_cache(selection: SourceSelection, request: FilterRequest, cache: LoadCache) -> Self {
        Self {
            selection,
            request,
            cache,
            sources: None,
            dataset: None,
            criteria: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            SourceSelection::from_settings(settings),
            FilterRequest::from_settings(settings),
        )
    }

    // ── Loading ───────────────────────────────────────────────────────────

    /// Resolve the sources and load them through the cache.
    ///
    /// Criteria are derived from the filter request whenever a different
    /// pair of files ends up loaded; otherwise the current criteria stay.
    pub fn load(&mut self) -> Result<Arc<Dataset>> {
        self.load_with(false)
    }

    /// Like [`load`](Self::load) but always re-reads the files.
    pub fn reload(&mut self) -> Result<Arc<Dataset>> {
        self.load_with(true)
    }

    /// Switch to another discovered attendance file and load it.  The
    /// previous selection stays in effect when the new file fails to load.
    pub fn select_attendance_file(&mut self, path: PathBuf) -> Result<Arc<Dataset>> {
        let next = self.selection.with_choice(path);
        let previous = std::mem::replace(&mut self.selection, next);
        match self.load() {
            Ok(dataset) => Ok(dataset),
            Err(e) => {
                self.selection = previous;
                Err(e)
            }
        }
    }

    fn load_with(&mut self, force: bool) -> Result<Arc<Dataset>> {
        let resolved = self.selection.resolve()?;
        let dataset = if force {
            self.cache.force_refresh(&resolved.key)?
        } else {
            self.cache.get_or_load(&resolved.key)?
        };

        let source_changed = self
            .sources
            .as_ref()
            .map_or(true, |current| current.key != resolved.key);
        if source_changed || self.criteria.is_none() {
            self.criteria = Some(self.request.criteria(dataset.date_bounds()));
        }

        info!(
            "loaded {} records from {}",
            dataset.records().len(),
            resolved.key.attendance.display()
        );
        self.sources = Some(resolved);
        self.dataset = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    // ── Filters ───────────────────────────────────────────────────────────

    pub fn criteria(&self) -> Option<&FilterCriteria> {
        self.criteria.as_ref()
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        debug!(?criteria, "criteria changed");
        self.criteria = Some(criteria);
    }

    /// Restrict the selection to one student, or go back to the requested
    /// students with `None`.
    pub fn focus_student(&mut self, student: Option<&str>) {
        let Some(current) = self.criteria.clone() else {
            return;
        };
        let next = match student {
            Some(name) => current.with_students([name]),
            None => current.with_students(self.request.students.iter().cloned()),
        };
        self.set_criteria(next);
    }

    /// Selector values for the loaded dataset.
    pub fn filter_options(&self) -> Option<FilterOptions> {
        self.dataset.as_ref().map(|d| d.filter_options())
    }

    // ── Reporting ─────────────────────────────────────────────────────────

    /// Report for the current criteria, loading the data first if needed.
    pub fn report(&mut self) -> Result<DashboardReport> {
        let dataset = match &self.dataset {
            Some(dataset) => Arc::clone(dataset),
            None => self.load()?,
        };
        let criteria = match &self.criteria {
            Some(criteria) => criteria.clone(),
            None => self.request.criteria(dataset.date_bounds()),
        };
        Ok(build_report(&dataset, &criteria))
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn sources(&self) -> Option<&ResolvedSources> {
        self.sources.as_ref()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    pub fn cache(&self) -> &LoadCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::error::ErrorKind;
    use attendance_data::analysis::{ReportOutcome, StudentDetailView};
    use std::path::Path;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_sources(dir: &Path) -> SourceSelection {
        let attendance = dir.join("attendance.csv");
        let master = dir.join("master.csv");
        std::fs::write(
            &attendance,
            "Date,Student_Name,Teacher_Name,Subject,Duration_Minutes\n\
             2024-01-01,A,Ms. Rao,Math,60\n\
             2024-01-02,A,Ms. Rao,Math,30\n\
             2024-01-05,B,Mr. Iyer,Physics,45\n",
        )
        .unwrap();
        std::fs::write(&master, "Student_ID,Name\n1,A\n2,B\n").unwrap();
        SourceSelection::Explicit { attendance, master }
    }

    #[test]
    fn test_request_criteria_uses_bounds() {
        let bounds = DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 31));
        let request = FilterRequest {
            from: Some(ymd(2024, 1, 10)),
            ..Default::default()
        };
        let criteria = request.criteria(Some(bounds));
        assert_eq!(criteria.date_range, DateRange::new(ymd(2024, 1, 10), ymd(2024, 1, 31)));
    }

    #[test]
    fn test_request_criteria_without_bounds() {
        let request = FilterRequest {
            to: Some(ymd(2024, 3, 1)),
            ..Default::default()
        };
        let criteria = request.criteria(None);
        assert_eq!(criteria.date_range, DateRange::single(ymd(2024, 3, 1)));
    }

    #[test]
    fn test_request_from_after_last_record_selects_nothing() {
        let dir = TempDir::new().unwrap();
        let request = FilterRequest {
            from: Some(ymd(2024, 2, 1)),
            ..Default::default()
        };
        let mut session = DashboardSession::new(write_sources(dir.path()), request);

        let report = session.report().unwrap();
        assert_eq!(report.criteria.date_range, DateRange::single(ymd(2024, 2, 1)));
        assert!(matches!(report.outcome, ReportOutcome::Empty));
    }

    #[test]
    fn test_request_to_before_first_record_selects_nothing() {
        let dir = TempDir::new().unwrap();
        let request = FilterRequest {
            to: Some(ymd(2023, 12, 1)),
            ..Default::default()
        };
        let mut session = DashboardSession::new(write_sources(dir.path()), request);

        let report = session.report().unwrap();
        assert_eq!(report.criteria.date_range, DateRange::single(ymd(2023, 12, 1)));
        assert!(matches!(report.outcome, ReportOutcome::Empty));
    }

    #[test]
    fn test_request_explicit_dates_in_either_order() {
        let request = FilterRequest {
            from: Some(ymd(2024, 1, 31)),
            to: Some(ymd(2024, 1, 1)),
            ..Default::default()
        };
        let criteria = request.criteria(None);
        assert_eq!(criteria.date_range, DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 31)));
    }

    #[test]
    fn test_failed_file_switch_keeps_previous_selection() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("attendance_good.csv");
        let broken = dir.path().join("attendance_broken.csv");
        let master = dir.path().join("master.csv");
        std::fs::write(
            &good,
            "Date,Student_Name,Teacher_Name,Subject,Duration_Minutes\n\
             2024-01-01,A,Ms. Rao,Math,60\n",
        )
        .unwrap();
        std::fs::write(&broken, "Date,Student_Name\n2024-01-01,A\n").unwrap();
        std::fs::write(&master, "Student_ID,Name\n1,A\n").unwrap();

        let selection = SourceSelection::Discover {
            dir: dir.path().to_path_buf(),
            pattern: r"^attendance_.*\.csv$".to_string(),
            choice: Some(good.clone()),
            master,
        };
        let mut session = DashboardSession::new(selection, FilterRequest::default());
        session.load().unwrap();

        let err = session.select_attendance_file(broken).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LoadError);
        assert_eq!(session.sources().unwrap().key.attendance, good);

        // Reloading reads the file that is still selected.
        session.reload().unwrap();
        assert_eq!(session.sources().unwrap().key.attendance, good);
        assert_eq!(session.dataset().unwrap().records().len(), 1);
    }

    #[test]
    fn test_load_sets_default_criteria() {
        let dir = TempDir::new().unwrap();
        let mut session = DashboardSession::new(write_sources(dir.path()), FilterRequest::default());

        assert!(session.criteria().is_none());
        session.load().unwrap();

        let criteria = session.criteria().unwrap();
        assert_eq!(criteria.date_range, DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 5)));
        assert!(criteria.students.is_empty());
        assert_eq!(session.filter_options().unwrap().students, vec!["A", "B"]);
    }

    #[test]
    fn test_report_loads_lazily_and_reuses_cache() {
        let dir = TempDir::new().unwrap();
        let mut session = DashboardSession::new(write_sources(dir.path()), FilterRequest::default());

        let report = session.report().unwrap();
        assert_eq!(report.data().unwrap().overview.total_records, 3);

        session.load().unwrap();
        session.report().unwrap();
        assert_eq!(session.cache().load_count(), 1);
    }

    #[test]
    fn test_set_criteria_recomputes_report() {
        let dir = TempDir::new().unwrap();
        let mut session = DashboardSession::new(write_sources(dir.path()), FilterRequest::default());
        session.load().unwrap();

        session.set_criteria(FilterCriteria::new(DateRange::single(ymd(2023, 6, 1))));
        let report = session.report().unwrap();
        assert!(matches!(report.outcome, ReportOutcome::Empty));
    }

    #[test]
    fn test_focus_student_enables_detail() {
        let dir = TempDir::new().unwrap();
        let mut session = DashboardSession::new(write_sources(dir.path()), FilterRequest::default());
        session.load().unwrap();

        session.focus_student(Some("A"));
        let report = session.report().unwrap();
        assert!(matches!(
            report.data().unwrap().detail,
            StudentDetailView::Available(_)
        ));

        session.focus_student(None);
        let report = session.report().unwrap();
        assert!(matches!(
            report.data().unwrap().detail,
            StudentDetailView::Unavailable { selected: 0, .. }
        ));
    }

    #[test]
    fn test_requested_filters_apply_after_load() {
        let dir = TempDir::new().unwrap();
        let request = FilterRequest {
            teachers: ["Mr. Iyer".to_string()].into(),
            ..Default::default()
        };
        let mut session = DashboardSession::new(write_sources(dir.path()), request);
        let report = session.report().unwrap();
        let data = report.data().unwrap();
        assert_eq!(data.overview.total_records, 1);
        assert_eq!(data.teachers[0].key, "Mr. Iyer");
    }

    #[test]
    fn test_missing_source_reports_error_kind() {
        let dir = TempDir::new().unwrap();
        let selection = SourceSelection::Explicit {
            attendance: dir.path().join("missing.xlsx"),
            master: dir.path().join("master.xlsx"),
        };
        let mut session = DashboardSession::new(selection, FilterRequest::default());

        let err = session.report().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert!(session.cache().last_error().is_some());
        assert!(session.dataset().is_none());
    }

    #[test]
    fn test_reload_rereads() {
        let dir = TempDir::new().unwrap();
        let mut session = DashboardSession::new(write_sources(dir.path()), FilterRequest::default());
        session.load().unwrap();
        session.reload().unwrap();
        assert_eq!(session.cache().load_count(), 2);
    }
}
