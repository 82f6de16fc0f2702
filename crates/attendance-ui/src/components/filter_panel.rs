use std::collections::BTreeSet;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use attendance_core::dates::parse_date;
use attendance_core::models::{DateRange, FilterCriteria};
use attendance_data::dataset::FilterOptions;

use crate::themes::Theme;

/// Control focused inside the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Students,
    Subjects,
    Teachers,
    From,
    To,
}

impl FilterField {
    const ALL: [FilterField; 5] = [
        FilterField::Students,
        FilterField::Subjects,
        FilterField::Teachers,
        FilterField::From,
        FilterField::To,
    ];

    fn label(self) -> &'static str {
        match self {
            FilterField::Students => "Students",
            FilterField::Subjects => "Subjects",
            FilterField::Teachers => "Teachers",
            FilterField::From => "From",
            FilterField::To => "To",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn is_date(self) -> bool {
        matches!(self, FilterField::From | FilterField::To)
    }
}

/// Outcome of a key press inside the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// Still editing.
    Pending,
    Apply(FilterCriteria),
    Cancel,
}

/// Sidebar for editing the student, subject and teacher selections and the
/// date range.  Edits are kept as a draft until applied.
#[derive(Debug, Clone)]
pub struct FilterPanel {
    options: FilterOptions,
    students: BTreeSet<String>,
    subjects: BTreeSet<String>,
    teachers: BTreeSet<String>,
    from: String,
    to: String,
    field: FilterField,
    cursor: usize,
    error: Option<String>,
}

impl FilterPanel {
    pub fn new(options: FilterOptions, current: &FilterCriteria) -> Self {
        Self {
            options,
            students: current.students.clone(),
            subjects: current.subjects.clone(),
            teachers: current.teachers.clone(),
            from: current.date_range.start().to_string(),
            to: current.date_range.end().to_string(),
            field: FilterField::Students,
            cursor: 0,
            error: None,
        }
    }

    pub fn field(&self) -> FilterField {
        self.field
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn choices(&self, field: FilterField) -> &[String] {
        match field {
            FilterField::Students => &self.options.students,
            FilterField::Subjects => &self.options.subjects,
            FilterField::Teachers => &self.options.teachers,
            FilterField::From | FilterField::To => &[],
        }
    }

    fn selection(&self, field: FilterField) -> Option<&BTreeSet<String>> {
        match field {
            FilterField::Students => Some(&self.students),
            FilterField::Subjects => Some(&self.subjects),
            FilterField::Teachers => Some(&self.teachers),
            FilterField::From | FilterField::To => None,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut BTreeSet<String>> {
        match self.field {
            FilterField::Students => Some(&mut self.students),
            FilterField::Subjects => Some(&mut self.subjects),
            FilterField::Teachers => Some(&mut self.teachers),
            FilterField::From | FilterField::To => None,
        }
    }

    fn date_input_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FilterField::From => Some(&mut self.from),
            FilterField::To => Some(&mut self.to),
            _ => None,
        }
    }

    fn focus(&mut self, field: FilterField) {
        self.field = field;
        self.cursor = 0;
    }

    /// Flip the highlighted name in the focused list.
    fn toggle(&mut self) {
        let Some(name) = self.choices(self.field).get(self.cursor).cloned() else {
            return;
        };
        if let Some(selected) = self.selection_mut() {
            if !selected.remove(&name) {
                selected.insert(name);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        match key.code {
            KeyCode::Esc => return PanelEvent::Cancel,
            KeyCode::Enter => {
                return match self.criteria() {
                    Ok(criteria) => PanelEvent::Apply(criteria),
                    Err(message) => {
                        self.error = Some(message);
                        PanelEvent::Pending
                    }
                };
            }
            KeyCode::Tab | KeyCode::Right => self.focus(self.field.next()),
            KeyCode::BackTab | KeyCode::Left => self.focus(self.field.previous()),
            KeyCode::Down => {
                let len = self.choices(self.field).len();
                self.cursor = (self.cursor + 1).min(len.saturating_sub(1));
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Backspace => {
                if let Some(input) = self.date_input_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) if self.field.is_date() => {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '/' | ' ') {
                    if let Some(input) = self.date_input_mut() {
                        input.push(c);
                    }
                }
            }
            KeyCode::Char(' ') => self.toggle(),
            // No names selected means no restriction.
            KeyCode::Char('a') => {
                if let Some(selected) = self.selection_mut() {
                    selected.clear();
                }
            }
            _ => return PanelEvent::Pending,
        }
        self.error = None;
        PanelEvent::Pending
    }

    /// The draft as criteria.  A blank date falls back to the data's
    /// bounds.
    pub fn criteria(&self) -> Result<FilterCriteria, String> {
        let bounds = self.options.date_bounds;
        let from = date_input(FilterField::From, &self.from, bounds.map(|b| b.start()))?;
        let to = date_input(FilterField::To, &self.to, bounds.map(|b| b.end()))?;

        Ok(FilterCriteria::new(DateRange::new(from, to))
            .with_students(self.students.iter().cloned())
            .with_subjects(self.subjects.iter().cloned())
            .with_teachers(self.teachers.iter().cloned()))
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut lines = Vec::new();

        for field in FilterField::ALL {
            let style = if field == self.field {
                theme.tab_active
            } else {
                theme.label
            };
            let value = match self.selection(field) {
                Some(selected) if selected.is_empty() => "all".to_string(),
                Some(selected) => {
                    format!("{} of {}", selected.len(), self.choices(field).len())
                }
                None if field == FilterField::From => self.from.clone(),
                None => self.to.clone(),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", field.label()), style),
                Span::styled(value, theme.value),
            ]));
        }
        lines.push(Line::from(Span::styled("─".repeat(24), theme.separator)));

        if let Some(selected) = self.selection(self.field) {
            let choices = self.choices(self.field);
            // Rows left after the summary, separator, error and hints.
            let visible = (area.height as usize).saturating_sub(12).max(3);
            let first = self
                .cursor
                .saturating_sub(visible / 2)
                .min(choices.len().saturating_sub(visible));
            for (i, name) in choices.iter().enumerate().skip(first).take(visible) {
                let mark = if selected.contains(name) { "[x]" } else { "[ ]" };
                let style = if i == self.cursor {
                    theme.table_selected
                } else {
                    theme.text
                };
                lines.push(Line::from(Span::styled(format!("{mark} {name}"), style)));
            }
            if choices.is_empty() {
                lines.push(Line::from(Span::styled("(none)", theme.dim)));
            }
        } else {
            let bounds = self
                .options
                .date_bounds
                .map(|b| format!("Data spans {b}"))
                .unwrap_or_default();
            lines.push(Line::from(Span::styled("Type YYYY-MM-DD", theme.dim)));
            lines.push(Line::from(Span::styled(bounds, theme.dim)));
        }

        lines.push(Line::from(""));
        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(error.clone(), theme.error)));
        }
        let hint = if self.field.is_date() {
            "Backspace edit  ←/→ field  Enter apply  Esc cancel"
        } else {
            "Space toggle  a all  ←/→ field  Enter apply  Esc cancel"
        };
        lines.push(Line::from(Span::styled(hint, theme.dim)));

        frame.render_widget(
            Paragraph::new(Text::from(lines)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.table_border)
                    .title(" Filters "),
            ),
            area,
        );
    }
}

fn date_input(
    field: FilterField,
    input: &str,
    fallback: Option<chrono::NaiveDate>,
) -> Result<chrono::NaiveDate, String> {
    if input.trim().is_empty() {
        return fallback.ok_or_else(|| format!("{}: enter a date", field.label()));
    }
    parse_date(input).ok_or_else(|| format!("{}: {:?} is not a date", field.label(), input.trim()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn press(panel: &mut FilterPanel, code: KeyCode) -> PanelEvent {
        panel.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(panel: &mut FilterPanel, text: &str) {
        for c in text.chars() {
            press(panel, KeyCode::Char(c));
        }
    }

    fn clear_input(panel: &mut FilterPanel) {
        for _ in 0..20 {
            press(panel, KeyCode::Backspace);
        }
    }

    fn options() -> FilterOptions {
        FilterOptions {
            students: vec!["A".to_string(), "B".to_string()],
            subjects: vec!["Math".to_string(), "Physics".to_string()],
            teachers: vec!["Mr. Iyer".to_string(), "Ms. Rao".to_string()],
            date_bounds: Some(DateRange::new(ymd(1), ymd(5))),
        }
    }

    fn panel() -> FilterPanel {
        FilterPanel::new(options(), &FilterCriteria::new(DateRange::new(ymd(1), ymd(5))))
    }

    fn applied(panel: &mut FilterPanel) -> FilterCriteria {
        match press(panel, KeyCode::Enter) {
            PanelEvent::Apply(criteria) => criteria,
            other => panic!("expected Apply, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_unchanged_returns_current_criteria() {
        let mut panel = panel();
        assert_eq!(
            applied(&mut panel),
            FilterCriteria::new(DateRange::new(ymd(1), ymd(5)))
        );
    }

    #[test]
    fn test_toggle_subject() {
        let mut panel = panel();
        press(&mut panel, KeyCode::Right);
        assert_eq!(panel.field(), FilterField::Subjects);
        press(&mut panel, KeyCode::Down);
        press(&mut panel, KeyCode::Char(' '));

        let criteria = applied(&mut panel);
        assert_eq!(criteria.subjects, BTreeSet::from(["Physics".to_string()]));
        assert!(criteria.students.is_empty());
    }

    #[test]
    fn test_toggle_twice_deselects() {
        let mut panel = panel();
        press(&mut panel, KeyCode::Char(' '));
        press(&mut panel, KeyCode::Char(' '));
        assert!(applied(&mut panel).students.is_empty());
    }

    #[test]
    fn test_a_selects_all() {
        let current = FilterCriteria::new(DateRange::new(ymd(1), ymd(5))).with_teachers(["Ms. Rao"]);
        let mut panel = FilterPanel::new(options(), &current);
        press(&mut panel, KeyCode::BackTab);
        press(&mut panel, KeyCode::BackTab);
        press(&mut panel, KeyCode::BackTab);
        assert_eq!(panel.field(), FilterField::Teachers);
        press(&mut panel, KeyCode::Char('a'));
        assert!(applied(&mut panel).teachers.is_empty());
    }

    #[test]
    fn test_cursor_is_bounded() {
        let mut panel = panel();
        for _ in 0..5 {
            press(&mut panel, KeyCode::Down);
        }
        press(&mut panel, KeyCode::Char(' '));
        assert_eq!(
            applied(&mut panel).students,
            BTreeSet::from(["B".to_string()])
        );
    }

    #[test]
    fn test_edit_dates() {
        let mut panel = panel();
        press(&mut panel, KeyCode::Left);
        assert_eq!(panel.field(), FilterField::To);
        clear_input(&mut panel);
        type_text(&mut panel, "2024-01-03");
        press(&mut panel, KeyCode::Left);
        assert_eq!(panel.field(), FilterField::From);
        clear_input(&mut panel);
        type_text(&mut panel, "2024-01-02");

        assert_eq!(applied(&mut panel).date_range, DateRange::new(ymd(2), ymd(3)));
    }

    #[test]
    fn test_blank_date_uses_data_bounds() {
        let mut panel = panel();
        press(&mut panel, KeyCode::Left);
        press(&mut panel, KeyCode::Left);
        clear_input(&mut panel);
        type_text(&mut panel, "2024-01-04");
        press(&mut panel, KeyCode::Right);
        clear_input(&mut panel);

        assert_eq!(applied(&mut panel).date_range, DateRange::new(ymd(4), ymd(5)));
    }

    #[test]
    fn test_invalid_date_keeps_panel_open() {
        let mut panel = panel();
        press(&mut panel, KeyCode::Left);
        clear_input(&mut panel);
        type_text(&mut panel, "soon");

        assert_eq!(press(&mut panel, KeyCode::Enter), PanelEvent::Pending);
        assert_eq!(panel.error(), Some("To: \"soon\" is not a date"));

        press(&mut panel, KeyCode::Backspace);
        assert!(panel.error().is_none());
    }

    #[test]
    fn test_escape_cancels() {
        let mut panel = panel();
        press(&mut panel, KeyCode::Char(' '));
        assert_eq!(press(&mut panel, KeyCode::Esc), PanelEvent::Cancel);
    }

    #[test]
    fn test_render_panel() {
        let theme = Theme::dark();
        let current = FilterCriteria::new(DateRange::new(ymd(1), ymd(5))).with_students(["A"]);
        let panel = FilterPanel::new(options(), &current);

        let mut terminal = Terminal::new(TestBackend::new(40, 24)).unwrap();
        terminal
            .draw(|frame| panel.render(frame, frame.area(), &theme))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();

        assert!(text.contains("Filters"));
        assert!(text.contains("1 of 2"));
        assert!(text.contains("[x] A"));
        assert!(text.contains("[ ] B"));
        assert!(text.contains("2024-01-01"));
    }
}
