//! Persisted history as a comma-delimited file with a header row.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::table::{COLUMN_NAMES, HistoryTable, WorkoutRecord};
use crate::utils::parse_date;
use crate::{WorkoutError, WorkoutResult};

/// Storage seam for the history table.
pub trait HistoryStore: Send + Sync {
    /// Load the full history, sorted ascending by date. A store with nothing
    /// in it yields an empty table.
    fn load(&self) -> WorkoutResult<HistoryTable>;
    /// Replace the stored history with `table`.
    fn save(&self, table: &HistoryTable) -> WorkoutResult<()>;
}

#[derive(Clone, Debug)]
pub struct CsvHistoryStore {
    path: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for CsvHistoryStore {
    fn load(&self) -> WorkoutResult<HistoryTable> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "history file missing, starting empty");
                return Ok(HistoryTable::new());
            }
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(HistoryTable::new());
        }
        let text = String::from_utf8_lossy(&bytes);
        let table = parse_history_csv(&text)?;
        debug!(path = %self.path.display(), rows = table.len(), "loaded history");
        Ok(table)
    }

    fn save(&self, table: &HistoryTable) -> WorkoutResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, render_history_csv(table))?;
        debug!(path = %self.path.display(), rows = table.len(), "saved history");
        Ok(())
    }
}

/// Plain comma split with surrounding quotes trimmed. Quoted cells holding a
/// comma are not supported; every canonical column is a date or a number.
fn split_cells(line: &str) -> Vec<&str> {
    line.split(',')
        .map(|c| c.trim().trim_matches('"').trim())
        .collect()
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_minutes(cell: &str) -> Option<u32> {
    parse_number(cell)
        .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32)
}

/// Parse a history table from delimited text.
///
/// Columns are located by header name, so order and extra columns do not
/// matter, but all eight canonical columns must be present. A row with an
/// unreadable date is dropped; an unreadable number only blanks that cell.
pub fn parse_history_csv(text: &str) -> WorkoutResult<HistoryTable> {
    let text = text.trim_start_matches('\u{feff}');
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return Ok(HistoryTable::new());
    };

    let header_cols = split_cells(header);
    let mut indices = [0usize; 8];
    let mut missing = Vec::new();
    for (slot, name) in indices.iter_mut().zip(COLUMN_NAMES) {
        match header_cols.iter().position(|h| *h == name) {
            Some(i) => *slot = i,
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(WorkoutError::MissingColumns(missing));
    }

    let mut table = HistoryTable::new();
    let mut dropped = 0usize;
    for line in lines {
        let cells = split_cells(line);
        let cell = |col: usize| cells.get(indices[col]).copied().unwrap_or("");
        let Some(workout_date) = parse_date(cell(0)) else {
            dropped += 1;
            continue;
        };
        table.push(WorkoutRecord {
            workout_date,
            distance: parse_number(cell(1)),
            avg_speed: parse_number(cell(2)),
            workout_time: parse_minutes(cell(3)),
            total_calories: parse_number(cell(4)),
            heart_rate: parse_number(cell(5)),
            rpm: parse_number(cell(6)),
            level: parse_number(cell(7)),
        });
    }
    if dropped > 0 {
        warn!(dropped, "dropped history rows with unreadable dates");
    }

    Ok(table.sorted_by_date())
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Serialize a table with the canonical header; dates as `YYYY-MM-DD`,
/// missing cells left empty.
pub fn render_history_csv(table: &HistoryTable) -> String {
    let mut out = String::new();
    out.push_str(&COLUMN_NAMES.join(","));
    out.push('\n');
    for r in table {
        let cols = [
            r.workout_date.format("%Y-%m-%d").to_string(),
            format_cell(r.distance),
            format_cell(r.avg_speed),
            r.workout_time.map(|m| m.to_string()).unwrap_or_default(),
            format_cell(r.total_calories),
            format_cell(r.heart_rate),
            format_cell(r.rpm),
            format_cell(r.level),
        ];
        out.push_str(&cols.join(","));
        out.push('\n');
    }
    out
}
