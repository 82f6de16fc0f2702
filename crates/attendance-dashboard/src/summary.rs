//! Plain-text rendering of a report for the `summary` view.

use std::fmt::Write as _;

use attendance_core::formatting::{format_hours, format_minutes};
use attendance_core::models::{DateSubjectMatrix, GroupKey, SummaryRow};
use attendance_data::analysis::{DashboardReport, StudentDetailView, NO_DATA};

/// Column-aligned text table.  The first column is left-aligned, every
/// other column right-aligned.
struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self, out: &mut String) {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                std::iter::once(&self.headers)
                    .chain(&self.rows)
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, w))| {
                    if i == 0 {
                        format!("{:<w$}", cell, w = *w)
                    } else {
                        format!("{:>w$}", cell, w = *w)
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let _ = writeln!(out, "{}", line(&self.headers));
        let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let _ = writeln!(out, "{}", "-".repeat(rule_width));
        for row in &self.rows {
            let _ = writeln!(out, "{}", line(row));
        }
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}\n{}", title, "=".repeat(title.chars().count()));
}

fn summary_table(key: GroupKey, rows: &[SummaryRow]) -> TextTable {
    let first = match key {
        GroupKey::Student => "Student",
        GroupKey::Teacher => "Teacher",
        GroupKey::Subject => "Subject",
    };
    let mut table = match key {
        GroupKey::Student => TextTable::new([
            first, "Hours", "Minutes", "Sessions", "First Date", "Last Date",
        ]),
        GroupKey::Teacher | GroupKey::Subject => {
            TextTable::new([first, "Hours", "Minutes", "Sessions", "Students"])
        }
    };
    for row in rows {
        let mut cells = vec![
            row.key.clone(),
            format_hours(row.total_hours),
            format_minutes(row.total_minutes),
            row.sessions.to_string(),
        ];
        match key {
            GroupKey::Student => {
                cells.push(row.first_date.map(|d| d.to_string()).unwrap_or_default());
                cells.push(row.last_date.map(|d| d.to_string()).unwrap_or_default());
            }
            GroupKey::Teacher | GroupKey::Subject => {
                cells.push(row.unique_students.map(|n| n.to_string()).unwrap_or_default());
            }
        }
        table.push(cells);
    }
    table
}

fn matrix_table(matrix: &DateSubjectMatrix) -> TextTable {
    let mut headers = vec!["Date".to_string()];
    headers.extend(matrix.subjects.iter().cloned());
    headers.push("Total".to_string());

    let mut table = TextTable::new(headers);
    for ((date, cells), total) in matrix.dates.iter().zip(&matrix.cells).zip(matrix.row_totals()) {
        let mut row = vec![date.to_string()];
        row.extend(cells.iter().map(|h| format_hours(*h)));
        row.push(format_hours(total));
        table.push(row);
    }
    table
}

/// Render `report` as plain text tables.
pub fn render_summary(report: &DashboardReport, source: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ATTENDANCE ANALYSIS DASHBOARD");
    let _ = writeln!(out, "Source: {}", source);
    let _ = writeln!(out, "Dates:  {}", report.criteria.date_range);

    let stats = &report.stats;
    if stats.invalid_dates_dropped > 0 {
        let _ = writeln!(
            out,
            "Note: {} of {} rows dropped for missing or invalid dates",
            stats.invalid_dates_dropped, stats.rows_read
        );
    }
    if !stats.duplicate_master_names.is_empty() {
        let _ = writeln!(
            out,
            "Note: duplicate master names: {}",
            stats.duplicate_master_names.join(", ")
        );
    }

    let Some(data) = report.data() else {
        let _ = writeln!(out, "\n{}", NO_DATA);
        return out;
    };

    heading(&mut out, "Overview");
    let o = &data.overview;
    let _ = writeln!(out, "Total hours:   {}", format_hours(o.total_hours));
    let _ = writeln!(out, "Total minutes: {}", format_minutes(o.total_minutes));
    let _ = writeln!(out, "Students:      {}", o.unique_students);
    let _ = writeln!(out, "Subjects:      {}", o.unique_subjects);
    let _ = writeln!(out, "Teachers:      {}", o.unique_teachers);
    let _ = writeln!(out, "Dates:         {}", o.unique_dates);
    let _ = writeln!(out, "Records:       {}", o.total_records);

    for (title, key, rows) in [
        ("Student-wise Summary", GroupKey::Student, &data.students),
        ("Teacher-wise Summary", GroupKey::Teacher, &data.teachers),
        ("Subject-wise Summary", GroupKey::Subject, &data.subjects),
    ] {
        heading(&mut out, title);
        summary_table(key, rows).render(&mut out);
    }

    match &data.detail {
        StudentDetailView::Available(detail) => {
            heading(&mut out, &format!("{}: subject-wise breakdown", detail.student));
            summary_table(GroupKey::Subject, &detail.subjects).render(&mut out);
            heading(&mut out, &format!("{}: date x subject hours", detail.student));
            matrix_table(&detail.matrix).render(&mut out);
        }
        StudentDetailView::Unavailable { guidance, .. } => {
            let _ = writeln!(out, "\n{}", guidance);
        }
    }

    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::models::{
        AttendanceRecord, DateRange, FilterCriteria, JoinedRecord, StudentMaster,
    };
    use attendance_data::analysis::build_report;
    use attendance_data::dataset::{Dataset, LoadStats};
    use chrono::NaiveDate;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn joined(day: u32, student: &str, subject: &str, minutes: f64) -> JoinedRecord {
        JoinedRecord {
            record: AttendanceRecord {
                date: ymd(day).and_hms_opt(10, 0, 0).unwrap(),
                student_name: student.to_string(),
                teacher_name: "Ms. Rao".to_string(),
                subject: subject.to_string(),
                duration_minutes: minutes,
                source_file: None,
            },
            master: Some(StudentMaster {
                student_id: None,
                name: student.to_string(),
                grade: None,
                email: None,
                status: None,
            }),
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                joined(1, "A", "Math", 60.0),
                joined(2, "A", "Math", 30.0),
                joined(2, "B", "English", 45.0),
            ],
            Vec::new(),
            LoadStats::default(),
        )
    }

    #[test]
    fn test_text_table_alignment() {
        let mut table = TextTable::new(["Name", "Hours"]);
        table.push(vec!["Asha".to_string(), "1.5".to_string()]);
        table.push(vec!["Bo".to_string(), "12.0".to_string()]);
        let mut out = String::new();
        table.render(&mut out);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Name  Hours");
        assert_eq!(lines[1], "-----------");
        assert_eq!(lines[2], "Asha    1.5");
        assert_eq!(lines[3], "Bo     12.0");
    }

    #[test]
    fn test_summary_lists_every_grouping() {
        let data = dataset();
        let criteria = FilterCriteria::new(DateRange::new(ymd(1), ymd(31)));
        let text = render_summary(&build_report(&data, &criteria), "attendance.csv");

        assert!(text.contains("Source: attendance.csv"));
        assert!(text.contains("Total hours:   2.3"));
        assert!(text.contains("Student-wise Summary"));
        assert!(text.contains("Teacher-wise Summary"));
        assert!(text.contains("Subject-wise Summary"));
        assert!(text.contains("Select exactly one student"));
    }

    #[test]
    fn test_summary_single_student_detail() {
        let data = dataset();
        let criteria = FilterCriteria::new(DateRange::new(ymd(1), ymd(31))).with_students(["A"]);
        let text = render_summary(&build_report(&data, &criteria), "attendance.csv");

        assert!(text.contains("A: subject-wise breakdown"));
        assert!(text.contains("A: date x subject hours"));
        assert!(text.contains("2024-01-02"));
    }

    #[test]
    fn test_summary_no_data() {
        let data = dataset();
        let criteria = FilterCriteria::new(DateRange::single(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()));
        let text = render_summary(&build_report(&data, &criteria), "attendance.csv");
        assert!(text.contains(NO_DATA));
        assert!(!text.contains("Overview"));
    }
}
