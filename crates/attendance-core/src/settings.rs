use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Attendance file used when nothing else is configured.
pub const DEFAULT_ATTENDANCE_FILE: &str = "attendance_master_normalized_november.xlsx";

/// Master list used when nothing else is configured.
pub const DEFAULT_MASTER_FILE: &str = "nowclasses_final_master.xlsx";

/// File-name regex used when discovering attendance files in a directory.
pub const DEFAULT_ATTENDANCE_PATTERN: &str = r"(?i)^attendance.*\.(xlsx|xls|csv)$";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Student-wise, subject-wise and teacher-wise attendance analysis
#[derive(Parser, Debug, Clone)]
#[command(
    name = "attendance-dashboard",
    about = "Student-wise, subject-wise and teacher-wise attendance analysis",
    version
)]
pub struct Settings {
    /// Attendance spreadsheet (.xlsx, .xls, .ods or .csv)
    #[arg(long)]
    pub attendance: Option<PathBuf>,

    /// Student/teacher master spreadsheet
    #[arg(long)]
    pub master: Option<PathBuf>,

    /// Directory scanned for attendance files when --attendance is not given
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// File-name regex used when scanning --data-dir
    #[arg(long, default_value = DEFAULT_ATTENDANCE_PATTERN)]
    pub pattern: String,

    /// Only include this student (repeatable)
    #[arg(long = "student", value_name = "NAME")]
    pub students: Vec<String>,

    /// Only include this subject (repeatable)
    #[arg(long = "subject", value_name = "NAME")]
    pub subjects: Vec<String>,

    /// Only include this teacher (repeatable)
    #[arg(long = "teacher", value_name = "NAME")]
    pub teachers: Vec<String>,

    /// First date to include (YYYY-MM-DD); defaults to the earliest record
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD); defaults to the latest record
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Output view
    #[arg(long, default_value = "tui", value_parser = ["tui", "summary", "json"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,

    /// Problems met while reading or writing the last-used file.  Settings
    /// load before logging is set up, so the caller reports these.
    #[arg(skip)]
    pub warnings: Vec<String>,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to
/// `~/.attendance-dashboard/last_used.json`.
///
/// Only source locations and display preferences are remembered; filters
/// always start empty.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".attendance-dashboard").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// A missing file yields `Default`; malformed JSON is an error.
    pub fn load_from(path: &Path) -> Result<Self, serde_json::Error> {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Atomically write params to `path`, creating parent directories if
    /// needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at `path` if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                settings
                    .warnings
                    .push(format!("could not clear {}: {}", config_path.display(), e));
            }
            return settings.apply_debug();
        }

        let last = LastUsedParams::load_from(config_path).unwrap_or_else(|e| {
            settings
                .warnings
                .push(format!("ignoring unreadable {}: {}", config_path.display(), e));
            LastUsedParams::default()
        });

        // CLI always wins.  An explicit attendance file or data directory on
        // the command line replaces both remembered source locations.
        let explicit_source = is_arg_explicitly_set(&matches, "attendance")
            || is_arg_explicitly_set(&matches, "data_dir");
        if !explicit_source {
            settings.attendance = last.attendance.clone();
            settings.data_dir = last.data_dir.clone();
        }
        if !is_arg_explicitly_set(&matches, "master") {
            if let Some(v) = last.master {
                settings.master = Some(v);
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            settings
                .warnings
                .push(format!("could not save {}: {}", config_path.display(), e));
        }

        settings.apply_debug()
    }

    /// Master list path, falling back to [`DEFAULT_MASTER_FILE`].
    pub fn master_path(&self) -> PathBuf {
        self.master
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MASTER_FILE))
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            attendance: s.attendance.clone(),
            master: s.master.clone(),
            data_dir: s.data_dir.clone(),
            view: Some(s.view.clone()),
            theme: Some(s.theme.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
///
/// clap stores the arg id under the field name (underscores), not the
/// long-flag spelling.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}
