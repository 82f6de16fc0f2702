//! Application state and the terminal event loop.
//!
//! [`App`] keeps the theme, the active tab, row selections, the open filter
//! panel and the last report built by the [`DashboardSession`].  Key presses
//! are turned into [`Action`]s first so the navigation logic can be tested
//! without a terminal.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use tracing::{debug, error};

use attendance_core::models::{FilterCriteria, GroupKey};
use attendance_data::analysis::{DashboardReport, ReportData};
use attendance_runtime::session::DashboardSession;

use crate::components::filter_panel::{FilterPanel, PanelEvent};
use crate::components::header::Header;
use crate::table_view;
use crate::themes::Theme;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Dashboard tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Students,
    Teachers,
    Subjects,
    StudentDetail,
    Records,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Overview,
        Tab::Students,
        Tab::Teachers,
        Tab::Subjects,
        Tab::StudentDetail,
        Tab::Records,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Students => "Students",
            Tab::Teachers => "Teachers",
            Tab::Subjects => "Subjects",
            Tab::StudentDetail => "Student Detail",
            Tab::Records => "Records",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Tab for a `1`–`6` key press.
    pub fn from_digit(c: char) -> Option<Self> {
        let n = c.to_digit(10)? as usize;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

// ── Action ────────────────────────────────────────────────────────────────────

/// What a key press asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Re-read the sources from disk.
    Reload,
    /// Switch to the next discovered attendance file.
    NextFile,
    /// Restrict the report to one student.
    Focus(String),
    /// Drop the single-student focus.
    ClearFocus,
    /// Open the filter panel on the current criteria.
    OpenFilters,
    /// Replace the session's criteria.
    ApplyFilters(FilterCriteria),
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Result of the last report request.
#[derive(Debug, Clone)]
enum ViewState {
    Loading,
    Ready(Box<DashboardReport>),
    Failed(String),
}

pub struct App {
    pub theme: Theme,
    pub tab: Tab,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    student_row: usize,
    record_row: usize,
    source: String,
    state: ViewState,
    /// Failure of the last reload or file switch.  Kept on screen until a
    /// later reload or switch succeeds.
    load_error: Option<String>,
    filters: Option<FilterPanel>,
}

impl App {
    pub fn new(theme_name: &str) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            tab: Tab::Overview,
            should_quit: false,
            student_row: 0,
            record_row: 0,
            source: String::new(),
            state: ViewState::Loading,
            load_error: None,
            filters: None,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────

    /// Run the dashboard until the user quits.
    ///
    /// The terminal is restored even when drawing or reading events fails.
    pub fn run(mut self, session: &mut DashboardSession) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, session);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        session: &mut DashboardSession,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);
        self.refresh(session);

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    let action = self.handle_key(key);
                    self.apply(action, session);
                }
            }
        }
        Ok(())
    }

    // ── State updates ─────────────────────────────────────────────────────

    /// Rebuild the report from the session's current criteria.
    pub fn refresh(&mut self, session: &mut DashboardSession) {
        self.state = match (&self.load_error, session.report()) {
            (Some(message), _) => ViewState::Failed(message.clone()),
            (None, Ok(report)) => ViewState::Ready(Box::new(report)),
            (None, Err(e)) => {
                error!("report failed: {e}");
                ViewState::Failed(format!("{} ({:?})", e, e.kind()))
            }
        };
        self.source = session
            .sources()
            .and_then(|s| s.key.attendance.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.clamp_selection();
    }

    /// Translate a key press into an [`Action`], updating navigation state
    /// along the way.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Action::Quit;
        }
        if let Some(panel) = &mut self.filters {
            return match panel.handle_key(key) {
                PanelEvent::Pending => Action::None,
                PanelEvent::Cancel => {
                    self.filters = None;
                    Action::None
                }
                PanelEvent::Apply(criteria) => {
                    self.filters = None;
                    Action::ApplyFilters(criteria)
                }
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                Action::Quit
            }
            KeyCode::Tab | KeyCode::Right => {
                self.tab = self.tab.next();
                Action::None
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.tab = self.tab.previous();
                Action::None
            }
            KeyCode::Char(c @ '1'..='6') => {
                if let Some(tab) = Tab::from_digit(c) {
                    self.tab = tab;
                }
                Action::None
            }
            KeyCode::Down => {
                self.move_selection(1);
                Action::None
            }
            KeyCode::Up => {
                self.move_selection(-1);
                Action::None
            }
            KeyCode::Enter if self.tab == Tab::Students => self
                .data()
                .and_then(|d| d.students.get(self.student_row))
                .map(|row| Action::Focus(row.key.clone()))
                .unwrap_or(Action::None),
            KeyCode::Esc => Action::ClearFocus,
            KeyCode::Char('r') | KeyCode::Char('R') => Action::Reload,
            KeyCode::Char('n') | KeyCode::Char('N') => Action::NextFile,
            KeyCode::Char('f') | KeyCode::Char('F') => Action::OpenFilters,
            _ => Action::None,
        }
    }

    /// Carry out `action` against the session and refresh the report.
    pub fn apply(&mut self, action: Action, session: &mut DashboardSession) {
        match action {
            Action::None | Action::Quit => return,
            Action::Reload => {
                let result = session.reload();
                self.record_load(result.map(drop), "Reload failed");
            }
            Action::NextFile => {
                let next = session.sources().and_then(|s| {
                    let files = &s.discovered;
                    let current = files.iter().position(|f| f.path == s.key.attendance)?;
                    let next = &files[(current + 1) % files.len()];
                    (next.path != s.key.attendance).then(|| next.path.clone())
                });
                match next {
                    Some(path) => {
                        debug!("switching attendance file to {}", path.display());
                        let label = format!("Could not switch to {}", path.display());
                        let result = session.select_attendance_file(path);
                        self.record_load(result.map(drop), &label);
                    }
                    None => return,
                }
            }
            Action::Focus(name) => {
                session.focus_student(Some(&name));
                self.tab = Tab::StudentDetail;
            }
            Action::ClearFocus => session.focus_student(None),
            Action::OpenFilters => {
                // Without a dataset there is nothing to choose from.
                let (Some(options), Some(criteria)) =
                    (session.filter_options(), session.criteria())
                else {
                    return;
                };
                self.filters = Some(FilterPanel::new(options, criteria));
                return;
            }
            Action::ApplyFilters(criteria) => session.set_criteria(criteria),
        }
        self.refresh(session);
    }

    fn record_load(&mut self, result: attendance_core::error::Result<()>, label: &str) {
        self.load_error = match result {
            Ok(()) => None,
            Err(e) => {
                error!("{label}: {e}");
                Some(format!("{label}: {e} ({:?})", e.kind()))
            }
        };
    }

    pub fn filters_open(&self) -> bool {
        self.filters.is_some()
    }

    fn data(&self) -> Option<&ReportData> {
        match &self.state {
            ViewState::Ready(report) => report.data(),
            ViewState::Loading | ViewState::Failed(_) => None,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = match self.tab {
            Tab::Students => self.data_len(|d| d.students.len()),
            Tab::Records => self.data_len(|d| d.records.len()),
            _ => return,
        };
        let row = if self.tab == Tab::Students {
            &mut self.student_row
        } else {
            &mut self.record_row
        };
        *row = row.saturating_add_signed(delta).min(len.saturating_sub(1));
    }

    fn data_len(&self, f: impl Fn(&ReportData) -> usize) -> usize {
        self.data().map(f).unwrap_or(0)
    }

    fn clamp_selection(&mut self) {
        let students = self.data_len(|d| d.students.len());
        let records = self.data_len(|d| d.records.len());
        self.student_row = self.student_row.min(students.saturating_sub(1));
        self.record_row = self.record_row.min(records.saturating_sub(1));
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    /// Draw header, tab bar, the active tab and the key hints.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, tabs_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let criteria = match &self.state {
            ViewState::Ready(report) => Some(&report.criteria),
            _ => None,
        };
        let source = if self.source.is_empty() {
            "no source"
        } else {
            self.source.as_str()
        };
        frame.render_widget(
            Paragraph::new(Header::new(source, criteria, &self.theme).to_lines()),
            header_area,
        );

        let titles = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} {}", i + 1, t.title()));
        frame.render_widget(
            Tabs::new(titles)
                .select(self.tab.index())
                .style(self.theme.tab_inactive)
                .highlight_style(self.theme.tab_active),
            tabs_area,
        );

        let body_area = match &self.filters {
            Some(panel) => {
                let [side, rest] =
                    Layout::horizontal([Constraint::Length(36), Constraint::Min(0)])
                        .areas(body_area);
                panel.render(frame, side, &self.theme);
                rest
            }
            None => body_area,
        };

        match &self.state {
            ViewState::Loading => frame.render_widget(
                Paragraph::new(Span::styled("Loading attendance data...", self.theme.dim)),
                body_area,
            ),
            ViewState::Failed(message) => {
                table_view::render_error(frame, body_area, message, &self.theme)
            }
            ViewState::Ready(report) => match report.data() {
                None => table_view::render_no_data(frame, body_area, &self.theme),
                Some(data) => self.render_tab(frame, body_area, report, data),
            },
        }

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Tab/←/→ switch  1-6 jump  ↑/↓ select  Enter focus student  Esc clear  f filters  n next file  r reload  q quit",
                self.theme.dim,
            ))),
            footer_area,
        );
    }

    fn render_tab(
        &self,
        frame: &mut Frame,
        area: Rect,
        report: &DashboardReport,
        data: &ReportData,
    ) {
        let theme = &self.theme;
        match self.tab {
            Tab::Overview => table_view::render_overview(
                frame,
                area,
                &data.overview,
                &data.students,
                &report.stats,
                theme,
            ),
            Tab::Students => table_view::render_summary_table(
                frame,
                area,
                GroupKey::Student,
                &data.students,
                Some(self.student_row),
                theme,
            ),
            Tab::Teachers => table_view::render_summary_table(
                frame,
                area,
                GroupKey::Teacher,
                &data.teachers,
                None,
                theme,
            ),
            Tab::Subjects => table_view::render_summary_table(
                frame,
                area,
                GroupKey::Subject,
                &data.subjects,
                None,
                theme,
            ),
            Tab::StudentDetail => {
                table_view::render_student_detail(frame, area, &data.detail, theme)
            }
            Tab::Records => table_view::render_records(
                frame,
                area,
                &data.records,
                Some(self.record_row),
                theme,
            ),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_runtime::session::FilterRequest;
    use attendance_runtime::sources::SourceSelection;
    use ratatui::backend::TestBackend;
    use std::path::Path;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
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

    fn loaded(dir: &Path) -> (App, DashboardSession) {
        let mut session = DashboardSession::new(write_sources(dir), FilterRequest::default());
        let mut app = App::new("dark");
        app.refresh(&mut session);
        (app, session)
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Records.next(), Tab::Overview);
        assert_eq!(Tab::Overview.previous(), Tab::Records);
        assert_eq!(Tab::Students.next(), Tab::Teachers);
    }

    #[test]
    fn test_tab_from_digit() {
        assert_eq!(Tab::from_digit('1'), Some(Tab::Overview));
        assert_eq!(Tab::from_digit('5'), Some(Tab::StudentDetail));
        assert_eq!(Tab::from_digit('0'), None);
        assert_eq!(Tab::from_digit('7'), None);
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = App::new("dark");
        assert_eq!(app.handle_key(key(KeyCode::Tab)), Action::None);
        assert_eq!(app.tab, Tab::Students);
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.tab, Tab::Overview);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.tab, Tab::Records);
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.tab, Tab::Teachers);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new("dark");
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::Quit);
        assert!(app.should_quit);

        let mut app = App::new("dark");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c), Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_plain_c_does_not_quit() {
        let mut app = App::new("dark");
        assert_eq!(app.handle_key(key(KeyCode::Char('c'))), Action::None);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_selection_is_bounded() {
        let dir = TempDir::new().unwrap();
        let (mut app, _session) = loaded(dir.path());
        app.tab = Tab::Students;
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.student_row, 1);
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Up));
        }
        assert_eq!(app.student_row, 0);
    }

    #[test]
    fn test_enter_focuses_selected_student() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut session) = loaded(dir.path());
        app.tab = Tab::Students;

        let action = app.handle_key(key(KeyCode::Enter));
        assert_eq!(action, Action::Focus("A".to_string()));

        app.apply(action, &mut session);
        assert_eq!(app.tab, Tab::StudentDetail);
        assert!(screen(&app).contains("A: subject-wise breakdown"));

        app.apply(Action::ClearFocus, &mut session);
        assert!(screen(&app).contains("Select exactly one student"));
    }

    #[test]
    fn test_enter_outside_students_tab_does_nothing() {
        let dir = TempDir::new().unwrap();
        let (mut app, _session) = loaded(dir.path());
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::None);
    }

    #[test]
    fn test_render_each_tab() {
        let dir = TempDir::new().unwrap();
        let (mut app, _session) = loaded(dir.path());
        let expected = [
            "Total hours",
            "Student-wise Summary",
            "Teacher-wise Summary",
            "Subject-wise Summary",
            "Select exactly one student",
            "Raw Attendance Records (3)",
        ];
        for (tab, text) in Tab::ALL.into_iter().zip(expected) {
            app.tab = tab;
            let screen = screen(&app);
            assert!(screen.contains(text), "{tab:?} missing {text}");
            assert!(screen.contains("ATTENDANCE ANALYSIS DASHBOARD"));
            assert!(screen.contains("attendance.csv"));
        }
    }

    #[test]
    fn test_render_error_state() {
        let dir = TempDir::new().unwrap();
        let selection = SourceSelection::Explicit {
            attendance: dir.path().join("missing.xlsx"),
            master: dir.path().join("master.xlsx"),
        };
        let mut session = DashboardSession::new(selection, FilterRequest::default());
        let mut app = App::new("dark");
        app.refresh(&mut session);
        assert!(screen(&app).contains("Could not load attendance data"));
    }

    #[test]
    fn test_next_file_without_discovery_is_noop() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut session) = loaded(dir.path());
        app.apply(Action::NextFile, &mut session);
        assert_eq!(session.cache().load_count(), 1);
    }

    #[test]
    fn test_reload_rereads_sources() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut session) = loaded(dir.path());
        app.apply(Action::Reload, &mut session);
        assert_eq!(session.cache().load_count(), 2);
    }

    fn press(app: &mut App, session: &mut DashboardSession, code: KeyCode) {
        let action = app.handle_key(key(code));
        app.apply(action, session);
    }

    #[test]
    fn test_filter_panel_applies_subject_selection() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut session) = loaded(dir.path());
        app.tab = Tab::Records;

        press(&mut app, &mut session, KeyCode::Char('f'));
        assert!(app.filters_open());
        assert!(screen(&app).contains("Filters"));

        press(&mut app, &mut session, KeyCode::Right);
        press(&mut app, &mut session, KeyCode::Char(' '));
        press(&mut app, &mut session, KeyCode::Enter);

        assert!(!app.filters_open());
        assert_eq!(app.tab, Tab::Records);
        let criteria = session.criteria().unwrap();
        assert_eq!(criteria.subjects.len(), 1);
        assert!(criteria.subjects.contains("Math"));
        let screen = screen(&app);
        assert!(screen.contains("Raw Attendance Records (2)"));
        assert!(screen.contains("subjects: Math"));
    }

    #[test]
    fn test_filter_panel_captures_keys_until_closed() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut session) = loaded(dir.path());
        let before = session.criteria().cloned();

        press(&mut app, &mut session, KeyCode::Char('f'));
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::None);
        assert!(!app.should_quit);
        assert_eq!(app.tab, Tab::Overview);

        press(&mut app, &mut session, KeyCode::Char(' '));
        press(&mut app, &mut session, KeyCode::Esc);
        assert!(!app.filters_open());
        assert_eq!(session.criteria().cloned(), before);

        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn test_filter_panel_needs_loaded_data() {
        let dir = TempDir::new().unwrap();
        let selection = SourceSelection::Explicit {
            attendance: dir.path().join("missing.csv"),
            master: dir.path().join("master.csv"),
        };
        let mut session = DashboardSession::new(selection, FilterRequest::default());
        let mut app = App::new("dark");
        app.refresh(&mut session);

        press(&mut app, &mut session, KeyCode::Char('f'));
        assert!(!app.filters_open());
    }

    #[test]
    fn test_failed_reload_is_shown_until_a_reload_succeeds() {
        let dir = TempDir::new().unwrap();
        let (mut app, mut session) = loaded(dir.path());
        let attendance = dir.path().join("attendance.csv");
        std::fs::write(&attendance, "Date,Student_Name\n2024-01-01,A\n").unwrap();

        press(&mut app, &mut session, KeyCode::Char('r'));
        let screen_text = screen(&app);
        assert!(screen_text.contains("Could not load attendance data"));
        assert!(screen_text.contains("Reload failed"));
        assert!(screen_text.contains("Missing required column"));

        // Other actions keep the failure on screen.
        press(&mut app, &mut session, KeyCode::Esc);
        assert!(screen(&app).contains("Reload failed"));

        write_sources(dir.path());
        press(&mut app, &mut session, KeyCode::Char('r'));
        let screen_text = screen(&app);
        assert!(!screen_text.contains("Reload failed"));
        assert!(screen_text.contains("Total hours"));
    }

    #[test]
    fn test_failed_file_switch_is_shown_and_keeps_source() {
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
        let mut app = App::new("dark");
        app.refresh(&mut session);

        press(&mut app, &mut session, KeyCode::Char('n'));
        let screen_text = screen(&app);
        assert!(screen_text.contains("Could not switch to"));
        assert!(screen_text.contains("attendance_broken.csv"));
        assert!(screen_text.contains("attendance_good.csv"));
        assert_eq!(session.sources().unwrap().key.attendance, good);
    }
}
