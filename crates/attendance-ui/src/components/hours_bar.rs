use crate::themes::Theme;
use attendance_core::formatting;
use ratatui::text::{Line, Span};

/// Visual appearance of an hours bar.
pub struct HoursBarConfig {
    /// Width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for HoursBarConfig {
    fn default() -> Self {
        Self {
            width: 30,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

/// Horizontal bar showing a number of hours relative to the largest value
/// in the same chart, followed by the hours with one decimal.
pub struct HoursBar<'a> {
    pub hours: f64,
    /// Largest value in the chart; the bar is full at this value.
    pub max_hours: f64,
    pub theme: &'a Theme,
    pub config: HoursBarConfig,
}

impl<'a> HoursBar<'a> {
    pub fn new(hours: f64, max_hours: f64, theme: &'a Theme) -> Self {
        Self {
            hours,
            max_hours,
            theme,
            config: HoursBarConfig::default(),
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.config.width = width;
        self
    }

    /// Fraction of the bar that is filled, clamped to `[0.0, 1.0]`.
    pub fn share(&self) -> f64 {
        if self.max_hours > 0.0 {
            (self.hours / self.max_hours).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let share = self.share();
        let filled = (share * self.config.width as f64).round() as u16;
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        Line::from(vec![
            Span::styled(filled_str, self.theme.bar_style(share)),
            Span::styled(empty_str, self.theme.bar_empty),
            Span::styled(
                format!(" {} h", formatting::format_hours(self.hours)),
                self.theme.label,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_full_bar_at_max() {
        let theme = Theme::dark();
        let line = HoursBar::new(4.0, 4.0, &theme).width(10).to_line();
        assert_eq!(line.spans[0].content.chars().count(), 10);
        assert!(line.spans[1].content.is_empty());
        assert!(text(&line).ends_with(" 4.0 h"));
    }

    #[test]
    fn test_half_bar() {
        let theme = Theme::dark();
        let line = HoursBar::new(1.5, 3.0, &theme).width(20).to_line();
        assert_eq!(line.spans[0].content.chars().count(), 10);
        assert_eq!(line.spans[1].content.chars().count(), 10);
    }

    #[test]
    fn test_zero_max_renders_empty_bar() {
        let theme = Theme::dark();
        let bar = HoursBar::new(0.0, 0.0, &theme).width(8);
        assert_eq!(bar.share(), 0.0);
        let line = bar.to_line();
        assert!(line.spans[0].content.is_empty());
        assert_eq!(line.spans[1].content.chars().count(), 8);
    }

    #[test]
    fn test_share_is_clamped() {
        let theme = Theme::dark();
        assert_eq!(HoursBar::new(10.0, 5.0, &theme).share(), 1.0);
    }

    #[test]
    fn test_bar_colour_follows_share() {
        let theme = Theme::dark();
        let low = HoursBar::new(0.5, 10.0, &theme).to_line();
        let high = HoursBar::new(9.0, 10.0, &theme).to_line();
        assert_eq!(low.spans[0].style, theme.bar_low);
        assert_eq!(high.spans[0].style, theme.bar_high);
    }
}
