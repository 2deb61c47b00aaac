use std::path::PathBuf;

use crate::WorkoutError;

/// Number of device preamble lines at the top of every DAT export.
pub const DEFAULT_HEADER_LINES: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryConfig {
    pub data_dir: PathBuf,
    pub dat_file: PathBuf,
    pub history_file: PathBuf,
    pub header_lines: usize,
}

impl HistoryConfig {
    /// Build a config rooted at `data_dir` with the default file names.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            dat_file: data_dir.join("AARON.DAT"),
            history_file: data_dir.join("Workout_History.csv"),
            data_dir,
            header_lines: DEFAULT_HEADER_LINES,
        }
    }

    pub fn from_env() -> Result<Self, WorkoutError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, WorkoutError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let data_dir = get("DATA_DIR").unwrap_or_else(|| "data".into());
        let mut cfg = Self::in_dir(data_dir);
        if let Some(dat) = get("DAT_FILE") {
            cfg.dat_file = PathBuf::from(dat);
        }
        if let Some(history) = get("HISTORY_FILE") {
            cfg.history_file = PathBuf::from(history);
        }
        if let Some(raw) = get("DAT_HEADER_LINES") {
            cfg.header_lines = raw.trim().parse().map_err(|_| {
                WorkoutError::Config(format!("DAT_HEADER_LINES must be a number, got '{raw}'"))
            })?;
        }
        Ok(cfg)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_uses_defaults() {
        let cfg = HistoryConfig::from_env_with(|_| None).expect("cfg");
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.dat_file, PathBuf::from("data").join("AARON.DAT"));
        assert_eq!(
            cfg.history_file,
            PathBuf::from("data").join("Workout_History.csv")
        );
        assert_eq!(cfg.header_lines, 8);
    }

    #[test]
    fn from_env_reads_values() {
        let get = |k: &str| match k {
            "DATA_DIR" => Some("/srv/bike".into()),
            "HISTORY_FILE" => Some("/srv/bike/history.csv".into()),
            "DAT_HEADER_LINES" => Some("4".into()),
            _ => None,
        };
        let cfg = HistoryConfig::from_env_with(get).expect("cfg");
        assert_eq!(cfg.dat_file, PathBuf::from("/srv/bike/AARON.DAT"));
        assert_eq!(cfg.history_file, PathBuf::from("/srv/bike/history.csv"));
        assert_eq!(cfg.header_lines, 4);
    }

    #[test]
    fn from_env_rejects_bad_header_lines() {
        let get = |k: &str| match k {
            "DAT_HEADER_LINES" => Some("eight".into()),
            _ => None,
        };
        let res = HistoryConfig::from_env_with(get);
        assert!(matches!(res, Err(WorkoutError::Config(_))));
    }
}
