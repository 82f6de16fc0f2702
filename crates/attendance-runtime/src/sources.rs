//! Choosing which attendance and master files a session reads.

use std::path::{Path, PathBuf};

use attendance_core::error::{DashboardError, Result};
use attendance_core::settings::{Settings, DEFAULT_ATTENDANCE_FILE};
use attendance_data::reader::{find_attendance_files, DiscoveredFile};

use crate::data_manager::SourceKey;

/// Where the attendance data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// Both files named directly.
    Explicit { attendance: PathBuf, master: PathBuf },
    /// Attendance file picked from the files in `dir` whose name matches
    /// `pattern`: the newest one, or `choice` when given.
    Discover {
        dir: PathBuf,
        pattern: String,
        choice: Option<PathBuf>,
        master: PathBuf,
    },
}

/// A selection turned into concrete paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSources {
    pub key: SourceKey,
    /// Files offered by discovery, newest first; empty for explicit paths.
    pub discovered: Vec<DiscoveredFile>,
}

impl SourceSelection {
    /// Build the selection described by the command line.  `--data-dir`
    /// switches to discovery, with `--attendance` (if any) as the chosen
    /// file; otherwise the explicit or default paths are used.
    pub fn from_settings(settings: &Settings) -> Self {
        let master = settings.master_path();
        match &settings.data_dir {
            Some(dir) => Self::Discover {
                dir: dir.clone(),
                pattern: settings.pattern.clone(),
                choice: settings.attendance.clone(),
                master,
            },
            None => Self::Explicit {
                attendance: settings
                    .attendance
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_ATTENDANCE_FILE)),
                master,
            },
        }
    }

    /// Resolve to concrete paths.  Discovery fails when the directory is
    /// missing, nothing matches, or the chosen file is not among the
    /// matches.
    pub fn resolve(&self) -> Result<ResolvedSources> {
        match self {
            Self::Explicit { attendance, master } => Ok(ResolvedSources {
                key: SourceKey::new(attendance.clone(), master.clone()),
                discovered: Vec::new(),
            }),
            Self::Discover {
                dir,
                pattern,
                choice,
                master,
            } => {
                let discovered = find_attendance_files(dir, pattern)?;
                let attendance = match choice {
                    Some(choice) => pick(dir, &discovered, choice)?,
                    None => discovered
                        .first()
                        .map(|f| f.path.clone())
                        .ok_or_else(|| DashboardError::NoAttendanceFiles(dir.clone()))?,
                };
                tracing::debug!(
                    "selected {} out of {} discovered attendance files",
                    attendance.display(),
                    discovered.len()
                );
                Ok(ResolvedSources {
                    key: SourceKey::new(attendance, master.clone()),
                    discovered,
                })
            }
        }
    }

    /// The same selection with a different discovered file chosen.  Has no
    /// effect on explicit selections.
    pub fn with_choice(&self, path: PathBuf) -> Self {
        match self {
            Self::Discover {
                dir,
                pattern,
                master,
                ..
            } => Self::Discover {
                dir: dir.clone(),
                pattern: pattern.clone(),
                choice: Some(path),
                master: master.clone(),
            },
            explicit => explicit.clone(),
        }
    }
}

/// Match `choice` against the discovered files, either as a path or as a
/// bare file name inside `dir`.
fn pick(dir: &Path, discovered: &[DiscoveredFile], choice: &Path) -> Result<PathBuf> {
    let wanted = if choice.is_absolute() || choice.starts_with(dir) {
        choice.to_path_buf()
    } else {
        dir.join(choice)
    };
    discovered
        .iter()
        .find(|f| f.path == wanted)
        .map(|f| f.path.clone())
        .ok_or_else(|| {
            DashboardError::Config(format!(
                "{} does not match any attendance file in {}",
                choice.display(),
                dir.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_core::error::ErrorKind;
    use attendance_core::settings::{DEFAULT_ATTENDANCE_PATTERN, DEFAULT_MASTER_FILE};
    use clap::Parser;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn touch(path: &Path, age_secs: u64) {
        std::fs::write(path, "x").unwrap();
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    fn discover(dir: &Path, choice: Option<&str>) -> SourceSelection {
        SourceSelection::Discover {
            dir: dir.to_path_buf(),
            pattern: DEFAULT_ATTENDANCE_PATTERN.to_string(),
            choice: choice.map(PathBuf::from),
            master: PathBuf::from("master.xlsx"),
        }
    }

    #[test]
    fn test_from_settings_defaults() {
        let settings = Settings::parse_from(["attendance-dashboard"]);
        assert_eq!(
            SourceSelection::from_settings(&settings),
            SourceSelection::Explicit {
                attendance: PathBuf::from(DEFAULT_ATTENDANCE_FILE),
                master: PathBuf::from(DEFAULT_MASTER_FILE),
            }
        );
    }

    #[test]
    fn test_from_settings_data_dir_discovers() {
        let settings = Settings::parse_from([
            "attendance-dashboard",
            "--data-dir",
            "/data",
            "--attendance",
            "attendance_nov.xlsx",
            "--master",
            "roster.csv",
        ]);
        match SourceSelection::from_settings(&settings) {
            SourceSelection::Discover {
                dir, choice, master, ..
            } => {
                assert_eq!(dir, PathBuf::from("/data"));
                assert_eq!(choice, Some(PathBuf::from("attendance_nov.xlsx")));
                assert_eq!(master, PathBuf::from("roster.csv"));
            }
            other => panic!("expected discovery, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_resolves_without_touching_disk() {
        let selection = SourceSelection::Explicit {
            attendance: PathBuf::from("/nowhere/a.xlsx"),
            master: PathBuf::from("/nowhere/m.xlsx"),
        };
        let resolved = selection.resolve().unwrap();
        assert_eq!(resolved.key, SourceKey::new("/nowhere/a.xlsx", "/nowhere/m.xlsx"));
        assert!(resolved.discovered.is_empty());
    }

    #[test]
    fn test_discover_picks_newest() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("attendance_oct.csv"), 5_000);
        touch(&dir.path().join("attendance_nov.csv"), 10);

        let resolved = discover(dir.path(), None).resolve().unwrap();
        assert_eq!(resolved.key.attendance, dir.path().join("attendance_nov.csv"));
        assert_eq!(resolved.discovered.len(), 2);
    }

    #[test]
    fn test_discover_honours_choice_by_file_name() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("attendance_oct.csv"), 5_000);
        touch(&dir.path().join("attendance_nov.csv"), 10);

        let resolved = discover(dir.path(), Some("attendance_oct.csv")).resolve().unwrap();
        assert_eq!(resolved.key.attendance, dir.path().join("attendance_oct.csv"));
    }

    #[test]
    fn test_with_choice_switches_file() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("attendance_oct.csv"), 5_000);
        touch(&dir.path().join("attendance_nov.csv"), 10);

        let selection = discover(dir.path(), None).with_choice(dir.path().join("attendance_oct.csv"));
        let resolved = selection.resolve().unwrap();
        assert_eq!(resolved.key.attendance, dir.path().join("attendance_oct.csv"));
    }

    #[test]
    fn test_discover_unknown_choice_is_config_error() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("attendance_nov.csv"), 0);

        let err = discover(dir.path(), Some("attendance_dec.csv"))
            .resolve()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = TempDir::new().unwrap();
        let err = discover(dir.path(), None).resolve().unwrap_err();
        assert!(matches!(err, DashboardError::NoAttendanceFiles(_)));
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }
}
