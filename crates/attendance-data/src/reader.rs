//! Attendance and master-list loading, the name join, and attendance file
//! discovery.
//!
//! Sheets are validated at this boundary: every row that leaves the reader
//! is a typed [`AttendanceRecord`] or [`StudentMaster`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use attendance_core::error::{DashboardError, Result};
use attendance_core::models::{AttendanceRecord, JoinedRecord, StudentMaster};
use regex::Regex;
use tracing::{debug, warn};

use crate::dataset::{Dataset, LoadStats};
use crate::sheet::{Cell, Sheet};

/// Columns every attendance sheet must carry.
pub const ATTENDANCE_COLUMNS: [&str; 5] = [
    "Date",
    "Student_Name",
    "Teacher_Name",
    "Subject",
    "Duration_Minutes",
];

/// Column every master sheet must carry.
pub const MASTER_NAME_COLUMN: &str = "Name";

// ── Attendance ────────────────────────────────────────────────────────────────

/// Typed attendance rows plus counters collected while reading them.
#[derive(Debug, Clone, Default)]
pub struct AttendanceLoad {
    pub records: Vec<AttendanceRecord>,
    /// Non-blank data rows seen.
    pub rows_read: usize,
    /// Rows discarded because their date was missing or unparseable.
    pub invalid_dates_dropped: usize,
}

/// Read an attendance sheet from `path`.
pub fn load_attendance(path: &Path) -> Result<AttendanceLoad> {
    parse_attendance(&Sheet::open(path)?)
}

/// Convert an attendance [`Sheet`] into typed records.
///
/// Rows whose date cannot be parsed are dropped and counted.  A blank
/// `Duration_Minutes` counts as zero; text that is not a finite,
/// non-negative number fails the load.
pub fn parse_attendance(sheet: &Sheet) -> Result<AttendanceLoad> {
    let [date_col, student_col, teacher_col, subject_col, duration_col] =
        ATTENDANCE_COLUMNS.map(|name| sheet.require_column(name));
    let (date_col, student_col, teacher_col, subject_col, duration_col) =
        (date_col?, student_col?, teacher_col?, subject_col?, duration_col?);
    let source_col = sheet.column("Source_File");

    let mut load = AttendanceLoad::default();

    for (row_no, row) in sheet.rows() {
        load.rows_read += 1;

        let Some(date) = row.get(date_col).as_datetime() else {
            debug!(
                "{}: dropping row {} with invalid date {:?}",
                sheet.path().display(),
                row_no,
                row.get(date_col)
            );
            load.invalid_dates_dropped += 1;
            continue;
        };

        let duration_minutes = parse_duration(row.get(duration_col)).ok_or_else(|| {
            DashboardError::InvalidValue {
                path: sheet.path().to_path_buf(),
                row: row_no,
                column: "Duration_Minutes".to_string(),
                value: row.get(duration_col).as_text().unwrap_or_default(),
            }
        })?;

        load.records.push(AttendanceRecord {
            date,
            student_name: row.text(Some(student_col)).unwrap_or_default(),
            teacher_name: row.text(Some(teacher_col)).unwrap_or_default(),
            subject: row.text(Some(subject_col)).unwrap_or_default(),
            duration_minutes,
            source_file: row.text(source_col),
        });
    }

    if load.invalid_dates_dropped > 0 {
        warn!(
            "{}: dropped {} of {} rows with missing or invalid dates",
            sheet.path().display(),
            load.invalid_dates_dropped,
            load.rows_read
        );
    }

    Ok(load)
}

/// Minutes held by a duration cell.  `None` means the value is invalid.
fn parse_duration(cell: &Cell) -> Option<f64> {
    let minutes = match cell {
        Cell::Empty => 0.0,
        Cell::Number(n) => *n,
        Cell::Text(s) => s.parse::<f64>().ok()?,
        Cell::Bool(_) | Cell::DateTime(_) => return None,
    };
    (minutes.is_finite() && minutes >= 0.0).then_some(minutes)
}

// ── Master list ───────────────────────────────────────────────────────────────

/// Read the student/teacher master list from `path`.
pub fn load_master(path: &Path) -> Result<Vec<StudentMaster>> {
    parse_master(&Sheet::open(path)?)
}

/// Convert a master [`Sheet`] into typed rows.  Rows without a name cannot
/// take part in the join and are skipped.
pub fn parse_master(sheet: &Sheet) -> Result<Vec<StudentMaster>> {
    let name_col = sheet.require_column(MASTER_NAME_COLUMN)?;
    let id_col = sheet.column("Student_ID");
    let grade_col = sheet.column("Grade");
    let email_col = sheet.column("Email");
    let status_col = sheet.column("Status");

    let mut students = Vec::new();
    let mut skipped = 0usize;

    for (_, row) in sheet.rows() {
        let Some(name) = row.text(Some(name_col)) else {
            skipped += 1;
            continue;
        };
        students.push(StudentMaster {
            student_id: row.text(id_col),
            name,
            grade: row.text(grade_col),
            email: row.text(email_col),
            status: row.text(status_col),
        });
    }

    debug!(
        "{}: {} master rows, {} without a name skipped",
        sheet.path().display(),
        students.len(),
        skipped
    );

    Ok(students)
}

// ── Join ──────────────────────────────────────────────────────────────────────

/// Left-join attendance records to master rows on
/// `student_name == name`.
///
/// Every attendance record yields one joined row per matching master row,
/// or a single row with `master: None` when nothing matches.  Input order
/// is preserved.  Also returns the master names that occur more than once,
/// sorted, since those multiply the attendance rows they match.
pub fn join_records(
    attendance: Vec<AttendanceRecord>,
    students: &[StudentMaster],
) -> (Vec<JoinedRecord>, Vec<String>) {
    let mut by_name: HashMap<&str, Vec<&StudentMaster>> = HashMap::new();
    for student in students {
        by_name.entry(student.name.as_str()).or_default().push(student);
    }

    let mut duplicates: Vec<String> = by_name
        .iter()
        .filter(|(_, rows)| rows.len() > 1)
        .map(|(name, _)| name.to_string())
        .collect();
    duplicates.sort();

    let mut joined = Vec::with_capacity(attendance.len());
    for record in attendance {
        match by_name.get(record.student_name.as_str()) {
            Some(matches) if !record.student_name.is_empty() => {
                for master in matches {
                    joined.push(JoinedRecord {
                        record: record.clone(),
                        master: Some((*master).clone()),
                    });
                }
            }
            _ => joined.push(JoinedRecord {
                record,
                master: None,
            }),
        }
    }

    (joined, duplicates)
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// Load both sources and join them into a [`Dataset`].
pub fn load_dataset(attendance_path: &Path, master_path: &Path) -> Result<Dataset> {
    let attendance = load_attendance(attendance_path)?;
    let students = load_master(master_path)?;
    let dataset = build_dataset(attendance, students);

    debug!(
        "loaded {} joined records ({} unmatched) from {} and {}",
        dataset.records().len(),
        dataset.stats().unmatched_records,
        attendance_path.display(),
        master_path.display()
    );

    Ok(dataset)
}

/// Join already-parsed sources and collect the load statistics.
pub fn build_dataset(attendance: AttendanceLoad, students: Vec<StudentMaster>) -> Dataset {
    let AttendanceLoad {
        records,
        rows_read,
        invalid_dates_dropped,
    } = attendance;

    let (joined, duplicate_master_names) = join_records(records, &students);
    if !duplicate_master_names.is_empty() {
        warn!(
            "master list has {} duplicated names; matching attendance rows are repeated: {}",
            duplicate_master_names.len(),
            duplicate_master_names.join(", ")
        );
    }

    let stats = LoadStats {
        rows_read,
        invalid_dates_dropped,
        unmatched_records: joined.iter().filter(|r| !r.is_matched()).count(),
        duplicate_master_names,
    };

    Dataset::new(joined, students, stats)
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// An attendance file found by [`find_attendance_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl DiscoveredFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// List files directly inside `dir` whose name matches `pattern`, newest
/// modification time first (ties broken by path).
pub fn find_attendance_files(dir: &Path, pattern: &str) -> Result<Vec<DiscoveredFile>> {
    if !dir.is_dir() {
        return Err(DashboardError::FileNotFound(dir.to_path_buf()));
    }
    let regex = Regex::new(pattern)?;

    let mut files: Vec<DiscoveredFile> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map(|name| regex.is_match(name))
                    .unwrap_or(false)
        })
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some(DiscoveredFile {
                path: entry.into_path(),
                modified,
            })
        })
        .collect();

    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));

    debug!(
        "found {} attendance files matching {:?} in {}",
        files.len(),
        pattern,
        dir.display()
    );

    Ok(files)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
