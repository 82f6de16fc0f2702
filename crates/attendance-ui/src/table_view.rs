//! Report views for the dashboard TUI.
//!
//! Each function renders one tab body into `area`: the overview cards, the
//! grouped summary tables, the per-student detail, the raw records, and
//! the no-data and error screens.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use attendance_core::formatting;
use attendance_core::models::{DateSubjectMatrix, GroupKey, OverviewMetrics, SummaryRow};
use attendance_data::analysis::{RecordRow, StudentDetail, StudentDetailView, NO_DATA};
use attendance_data::dataset::LoadStats;

use crate::components::hours_bar::HoursBar;
use crate::themes::Theme;

/// Bars shown in the overview's top-students chart.
const TOP_STUDENTS: usize = 10;

fn titled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(format!(" {} ", title))
}

fn header_row<'a>(titles: &[&'a str], theme: &Theme) -> Row<'a> {
    Row::new(
        titles
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header))
            .collect::<Vec<_>>(),
    )
    .height(1)
}

fn date_cell<'a>(date: Option<chrono::NaiveDate>) -> Cell<'a> {
    Cell::from(date.map(|d| d.to_string()).unwrap_or_default())
}

// ── Overview ──────────────────────────────────────────────────────────────────

/// Metric cards, load diagnostics and a bar chart of the top students.
pub fn render_overview(
    frame: &mut Frame,
    area: Rect,
    overview: &OverviewMetrics,
    students: &[SummaryRow],
    stats: &LoadStats,
    theme: &Theme,
) {
    let metric = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<18}", label), theme.label),
            Span::styled(value, theme.value),
        ])
    };

    let mut lines = vec![
        metric("Total hours", formatting::format_hours(overview.total_hours)),
        metric("Total minutes", formatting::format_minutes(overview.total_minutes)),
        metric("Students", overview.unique_students.to_string()),
        metric("Subjects", overview.unique_subjects.to_string()),
        metric("Teachers", overview.unique_teachers.to_string()),
        metric("Dates", overview.unique_dates.to_string()),
        metric("Records", overview.total_records.to_string()),
        Line::from(""),
    ];

    if stats.invalid_dates_dropped > 0 {
        lines.push(Line::from(Span::styled(
            format!(
                "{} of {} rows dropped for missing or invalid dates",
                stats.invalid_dates_dropped, stats.rows_read
            ),
            theme.warning,
        )));
    }
    if stats.unmatched_records > 0 {
        lines.push(Line::from(Span::styled(
            format!("{} records have no master-list match", stats.unmatched_records),
            theme.dim,
        )));
    }
    if !stats.duplicate_master_names.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(
                "Duplicate master names: {}",
                stats.duplicate_master_names.join(", ")
            ),
            theme.warning,
        )));
    }

    let max_hours = students.first().map(|r| r.total_hours).unwrap_or(0.0);
    let name_width = students
        .iter()
        .take(TOP_STUDENTS)
        .map(|r| r.key.chars().count())
        .max()
        .unwrap_or(0);

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Top students by hours", theme.header)));
    for row in students.iter().take(TOP_STUDENTS) {
        let mut spans = vec![Span::styled(
            format!("{:<width$}  ", row.key, width = name_width),
            theme.text,
        )];
        spans.extend(HoursBar::new(row.total_hours, max_hours, theme).to_line().spans);
        lines.push(Line::from(spans));
    }

    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(titled_block("Overview", theme)),
        area,
    );
}

// ── Summary tables ────────────────────────────────────────────────────────────

/// Student-, teacher- or subject-wise summary with a totals row.
///
/// `selected` highlights one row (student table navigation).
pub fn render_summary_table(
    frame: &mut Frame,
    area: Rect,
    key: GroupKey,
    rows: &[SummaryRow],
    selected: Option<usize>,
    theme: &Theme,
) {
    let (title, first) = match key {
        GroupKey::Student => ("Student-wise Summary", "Student"),
        GroupKey::Teacher => ("Teacher-wise Summary", "Teacher"),
        GroupKey::Subject => ("Subject-wise Summary", "Subject"),
    };
    let header = match key {
        GroupKey::Student => header_row(
            &[first, "Hours", "Minutes", "Sessions", "First Date", "Last Date"],
            theme,
        ),
        GroupKey::Teacher | GroupKey::Subject => header_row(
            &[first, "Hours", "Minutes", "Sessions", "Students"],
            theme,
        ),
    };

    let mut table_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![
                Cell::from(row.key.clone()),
                Cell::from(formatting::format_hours(row.total_hours)),
                Cell::from(formatting::format_minutes(row.total_minutes)),
                Cell::from(row.sessions.to_string()),
            ];
            match key {
                GroupKey::Student => {
                    cells.push(date_cell(row.first_date));
                    cells.push(date_cell(row.last_date));
                }
                GroupKey::Teacher | GroupKey::Subject => {
                    cells.push(Cell::from(
                        row.unique_students.map(|n| n.to_string()).unwrap_or_default(),
                    ));
                }
            }
            Row::new(cells).style(theme.row_style(i))
        })
        .collect();

    let total_minutes: f64 = rows.iter().map(|r| r.total_minutes).sum();
    let total_sessions: usize = rows.iter().map(|r| r.sessions).sum();
    table_rows.push(
        Row::new(vec![
            Cell::from(format!("TOTAL ({})", rows.len())),
            Cell::from(formatting::format_hours(total_minutes / 60.0)),
            Cell::from(formatting::format_minutes(total_minutes)),
            Cell::from(total_sessions.to_string()),
        ])
        .style(theme.table_total),
    );

    let widths = match key {
        GroupKey::Student => vec![
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
        GroupKey::Teacher | GroupKey::Subject => vec![
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    };

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(titled_block(title, theme))
        .row_highlight_style(theme.table_selected)
        .style(theme.text);

    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}

// ── Student detail ────────────────────────────────────────────────────────────

/// Per-student views, or the guidance message when they are unavailable.
pub fn render_student_detail(
    frame: &mut Frame,
    area: Rect,
    view: &StudentDetailView,
    theme: &Theme,
) {
    match view {
        StudentDetailView::Available(detail) => render_detail(frame, area, detail, theme),
        StudentDetailView::Unavailable { guidance, selected } => {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(guidance.clone(), theme.info)),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Currently selected: {} students", selected),
                    theme.dim,
                )),
                Line::from(Span::styled(
                    "Pick a row on the Students tab and press Enter, or pass --student NAME",
                    theme.dim,
                )),
            ];
            frame.render_widget(
                Paragraph::new(Text::from(text)).block(titled_block("Student Detail", theme)),
                area,
            );
        }
    }
}

fn render_detail(frame: &mut Frame, area: Rect, detail: &StudentDetail, theme: &Theme) {
    let subject_height = (detail.subjects.len() as u16).saturating_add(3);
    let daily_height = (detail.daily.len() as u16).saturating_add(2);
    let [subjects_area, daily_area, matrix_area] = Layout::vertical([
        Constraint::Length(subject_height),
        Constraint::Length(daily_height),
        Constraint::Min(3),
    ])
    .areas(area);

    // Subject breakdown
    let rows: Vec<Row> = detail
        .subjects
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Row::new(vec![
                Cell::from(row.key.clone()),
                Cell::from(formatting::format_hours(row.total_hours)),
                Cell::from(row.sessions.to_string()),
                Cell::from(row.unique_dates.map(|n| n.to_string()).unwrap_or_default()),
            ])
            .style(theme.row_style(i))
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
        ],
    )
    .header(header_row(&["Subject", "Hours", "Sessions", "Dates"], theme))
    .block(titled_block(
        &format!("{}: subject-wise breakdown", detail.student),
        theme,
    ))
    .style(theme.text);
    frame.render_widget(table, subjects_area);

    // Daily series
    let max_hours = detail
        .daily
        .iter()
        .map(|d| d.total_hours)
        .fold(0.0_f64, f64::max);
    let lines: Vec<Line> = detail
        .daily
        .iter()
        .map(|day| {
            let mut spans = vec![Span::styled(format!("{}  ", day.date), theme.label)];
            spans.extend(HoursBar::new(day.total_hours, max_hours, theme).to_line().spans);
            Line::from(spans)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(titled_block("Daily hours", theme)),
        daily_area,
    );

    render_matrix(frame, matrix_area, &detail.matrix, theme);
}

fn render_matrix(frame: &mut Frame, area: Rect, matrix: &DateSubjectMatrix, theme: &Theme) {
    let mut titles: Vec<&str> = vec!["Date"];
    titles.extend(matrix.subjects.iter().map(String::as_str));
    titles.push("Total");

    let totals = matrix.row_totals();
    let rows: Vec<Row> = matrix
        .dates
        .iter()
        .zip(&matrix.cells)
        .zip(&totals)
        .enumerate()
        .map(|(i, ((date, cells), total))| {
            let mut row = vec![Cell::from(date.to_string())];
            row.extend(cells.iter().map(|h| Cell::from(formatting::format_hours(*h))));
            row.push(Cell::from(formatting::format_hours(*total)).style(theme.table_total));
            Row::new(row).style(theme.row_style(i))
        })
        .collect();

    let mut widths = vec![Constraint::Length(12)];
    widths.extend(matrix.subjects.iter().map(|s| {
        Constraint::Length(s.chars().count().clamp(6, 16) as u16 + 1)
    }));
    widths.push(Constraint::Length(8));

    let table = Table::new(rows, widths)
        .header(header_row(&titles, theme))
        .block(titled_block("Date x subject hours", theme))
        .style(theme.text);
    frame.render_widget(table, area);
}

// ── Records ───────────────────────────────────────────────────────────────────

/// Raw filtered records.  `selected` is kept in view when scrolling.
pub fn render_records(
    frame: &mut Frame,
    area: Rect,
    records: &[RecordRow],
    selected: Option<usize>,
    theme: &Theme,
) {
    let with_source = records.iter().any(|r| r.source_file.is_some());

    let mut titles = vec![
        "Date", "Student", "Teacher", "Subject", "Minutes", "Hours", "ID", "Grade", "Status",
    ];
    if with_source {
        titles.push("Source");
    }

    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut cells = vec![
                Cell::from(r.date.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(r.student_name.clone()),
                Cell::from(r.teacher_name.clone()),
                Cell::from(r.subject.clone()),
                Cell::from(formatting::format_minutes(r.duration_minutes)),
                Cell::from(formatting::format_number(r.duration_hours, 2)),
                Cell::from(r.student_id.clone().unwrap_or_default()),
                Cell::from(r.grade.clone().unwrap_or_default()),
                Cell::from(r.status.clone().unwrap_or_default()),
            ];
            if with_source {
                cells.push(Cell::from(r.source_file.clone().unwrap_or_default()));
            }
            Row::new(cells).style(theme.row_style(i))
        })
        .collect();

    let mut widths = vec![
        Constraint::Length(17),
        Constraint::Min(16),
        Constraint::Min(14),
        Constraint::Min(12),
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(9),
    ];
    if with_source {
        widths.push(Constraint::Min(14));
    }

    let table = Table::new(rows, widths)
        .header(header_row(&titles, theme))
        .block(titled_block(
            &format!("Raw Attendance Records ({})", records.len()),
            theme,
        ))
        .row_highlight_style(theme.table_selected)
        .style(theme.text);

    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}

// ── Placeholders ──────────────────────────────────────────────────────────────

/// Shown when the filters match no records.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(NO_DATA, theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Widen the date range or clear the student, subject and teacher filters.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(titled_block("Attendance Dashboard", theme)),
        area,
    );
}

/// Shown when the data could not be loaded.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Could not load attendance data", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.text)),
        Line::from(""),
        Line::from(Span::styled(
            "Fix the path or file and press 'r' to retry, or 'q' to exit",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(titled_block("Attendance Dashboard", theme)),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
