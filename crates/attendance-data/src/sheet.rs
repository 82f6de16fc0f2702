//! Format-independent view of the first worksheet of a spreadsheet file.
//!
//! Workbooks (`.xlsx`, `.xlsm`, `.xls`, `.xlsb`, `.ods`) are read with
//! `calamine`, `.csv` files with `csv`.  Both end up as a [`Sheet`]: one
//! header row of trimmed column names plus rows of [`Cell`]s.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use attendance_core::dates;
use attendance_core::error::{DashboardError, Result};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::NaiveDateTime;
use tracing::debug;

// ── Cell ──────────────────────────────────────────────────────────────────────

/// A single normalised cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Build a cell from a raw text field; blank text becomes [`Cell::Empty`].
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Render the cell as text.  Whole numbers lose their `.0` so numeric
    /// IDs read back as `"1042"`, not `"1042.0"`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            Cell::Number(n) => Some(n.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Interpret the cell as a date-time.  Native date cells are used as-is,
    /// text is parsed leniently, everything else is missing.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Text(s) => dates::parse_datetime(s),
            _ => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::from_text(s),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            other => other
                .as_datetime()
                .map(Cell::DateTime)
                .or_else(|| other.as_string().map(|s| Cell::from_text(&s)))
                .unwrap_or(Cell::Empty),
        }
    }
}

// ── SheetFormat ───────────────────────────────────────────────────────────────

/// How a file is decoded, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Workbook,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(SheetFormat::Csv),
            Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => Ok(SheetFormat::Workbook),
            _ => Err(DashboardError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

// ── Sheet ─────────────────────────────────────────────────────────────────────

/// Header names plus data rows of one worksheet.
#[derive(Debug, Clone)]
pub struct Sheet {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Open `path` and read its first worksheet.
    ///
    /// Fails with [`DashboardError::FileNotFound`] when the path does not
    /// exist and with a load-type error for anything else.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DashboardError::FileNotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            return Err(DashboardError::load(path, "path is a directory"));
        }

        let sheet = match SheetFormat::from_path(path)? {
            SheetFormat::Csv => {
                let file = File::open(path).map_err(|e| DashboardError::load(path, e))?;
                Self::from_csv_reader(path, file)?
            }
            SheetFormat::Workbook => Self::from_workbook(path)?,
        };

        debug!(
            "read {} rows x {} columns from {}",
            sheet.rows.len(),
            sheet.headers.len(),
            path.display()
        );
        Ok(sheet)
    }

    /// Parse CSV data; `path` is only used for error messages.
    pub fn from_csv_reader<R: Read>(path: &Path, reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| DashboardError::load(path, e))?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| DashboardError::load(path, e))?;
            rows.push(record.iter().map(Cell::from_text).collect());
        }

        Self::from_parts(path, headers, rows)
    }

    fn from_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path).map_err(|e| DashboardError::load(path, e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DashboardError::load(path, "workbook has no worksheets"))?
            .map_err(|e| DashboardError::load(path, e))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| {
                row.iter()
                    .map(|c| Cell::from(c).as_text().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        let data = rows
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Self::from_parts(path, headers, data)
    }

    /// Assemble a sheet from already-decoded parts.
    pub fn from_parts(path: &Path, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if headers.iter().all(|h| h.is_empty()) {
            return Err(DashboardError::load(path, "sheet is empty"));
        }
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Index of the first column named `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`Sheet::column`] but fails with
    /// [`DashboardError::MissingColumn`].
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| DashboardError::MissingColumn {
            path: self.path.clone(),
            column: name.to_string(),
        })
    }

    /// Data rows paired with their 1-based spreadsheet row number (the
    /// header is row 1).  Entirely blank rows are skipped.
    pub fn rows(&self) -> impl Iterator<Item = (usize, SheetRow<'_>)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, cells)| (i + 2, SheetRow { cells }))
            .filter(|(_, row)| !row.is_blank())
    }
}

/// Borrowed view of one data row.
#[derive(Debug, Clone, Copy)]
pub struct SheetRow<'a> {
    cells: &'a [Cell],
}

impl<'a> SheetRow<'a> {
    /// Cell at `column`; short rows read as empty.
    pub fn get(&self, column: usize) -> &'a Cell {
        self.cells.get(column).unwrap_or(&EMPTY)
    }

    /// Text of the cell at `column`, if present.
    pub fn text(&self, column: Option<usize>) -> Option<String> {
        column.and_then(|c| self.get(c).as_text())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }
}
