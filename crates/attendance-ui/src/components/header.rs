use std::collections::BTreeSet;

use crate::themes::Theme;
use attendance_core::models::FilterCriteria;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const ORNAMENT: &str = "◆ ◇ ◆";

/// Dashboard header rendering four lines:
///
/// 1. Application title (ALL CAPS) between ornaments.
/// 2. A 60-column `=` separator.
/// 3. `[ source | date range | active filters ]`.
/// 4. An empty line.
pub struct Header<'a> {
    /// Attendance file name or other short source description.
    pub source: &'a str,
    /// Criteria in effect, `None` before anything is loaded.
    pub criteria: Option<&'a FilterCriteria>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source: &'a str, criteria: Option<&'a FilterCriteria>, theme: &'a Theme) -> Self {
        Self {
            source,
            criteria,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        let mut info = vec![
            Span::styled("[ ", self.theme.label),
            Span::styled(self.source.to_string(), self.theme.value),
        ];
        if let Some(criteria) = self.criteria {
            info.push(Span::styled(" | ", self.theme.label));
            info.push(Span::styled(
                criteria.date_range.to_string(),
                self.theme.value,
            ));
            for (label, names) in [
                ("students", &criteria.students),
                ("subjects", &criteria.subjects),
                ("teachers", &criteria.teachers),
            ] {
                if !names.is_empty() {
                    info.push(Span::styled(format!(" | {label}: "), self.theme.label));
                    info.push(Span::styled(summarize(names), self.theme.value));
                }
            }
        }
        info.push(Span::styled(" ]", self.theme.label));

        vec![
            Line::from(vec![
                Span::styled(ORNAMENT, self.theme.header_accent),
                Span::styled(" ATTENDANCE ANALYSIS DASHBOARD ", self.theme.header),
                Span::styled(ORNAMENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(info),
            Line::from(""),
        ]
    }
}

/// Up to three names, then a count of the rest.
fn summarize(names: &BTreeSet<String>) -> String {
    const SHOWN: usize = 3;
    let mut text = names
        .iter()
        .take(SHOWN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > SHOWN {
        text.push_str(&format!(" +{}", names.len() - SHOWN));
    }
    text
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::models::DateRange;
    use chrono::NaiveDate;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn january() -> FilterCriteria {
        FilterCriteria::new(DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        ))
    }

    #[test]
    fn test_header_has_four_lines() {
        let theme = Theme::dark();
        let lines = Header::new("attendance.xlsx", None, &theme).to_lines();
        assert_eq!(lines.len(), 4);
        assert!(line_text(&lines[3]).is_empty());
    }

    #[test]
    fn test_header_title() {
        let theme = Theme::dark();
        let lines = Header::new("attendance.xlsx", None, &theme).to_lines();
        let title = line_text(&lines[0]);
        assert!(title.contains("ATTENDANCE ANALYSIS DASHBOARD"), "got: {title}");
        assert!(title.starts_with(ORNAMENT));
    }

    #[test]
    fn test_header_separator() {
        let theme = Theme::dark();
        let lines = Header::new("a.csv", None, &theme).to_lines();
        let sep = line_text(&lines[1]);
        assert_eq!(sep.chars().count(), 60);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_info_line_without_criteria() {
        let theme = Theme::dark();
        let lines = Header::new("attendance.xlsx", None, &theme).to_lines();
        assert_eq!(line_text(&lines[2]), "[ attendance.xlsx ]");
    }

    #[test]
    fn test_info_line_with_filters() {
        let theme = Theme::dark();
        let criteria = january()
            .with_students(["Asha"])
            .with_teachers(["A", "B", "C", "D", "E"]);
        let lines = Header::new("attendance.xlsx", Some(&criteria), &theme).to_lines();
        assert_eq!(
            line_text(&lines[2]),
            "[ attendance.xlsx | 2024-01-01 .. 2024-01-31 | students: Asha | teachers: A, B, C +2 ]"
        );
    }
}
