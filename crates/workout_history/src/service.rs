//! Request-scoped orchestration of the pipeline.
//!
//! Every operation reads the history afresh from the store; imports rewrite
//! it in full after a successful merge. Nothing is written when parsing or
//! validation fails.

use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::chart::{ChartPayload, build_chart};
use crate::config::HistoryConfig;
use crate::merge::merge;
use crate::normalize::normalize_workouts;
use crate::query::{DateRange, Summary, aggregate, filter_by_date};
use crate::store::{CsvHistoryStore, HistoryStore, parse_history_csv, render_history_csv};
use crate::table::{Field, HistoryTable, WorkoutRecord};
use crate::timeseries::{SeriesPoint, to_points};
use crate::tokenizer::parse_dat_payload;
use crate::WorkoutResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportSource {
    Upload,
    HistoryCsv,
    Disk,
}

impl ImportSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportSource::Upload => "upload",
            ImportSource::HistoryCsv => "history_csv",
            ImportSource::Disk => "disk",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImportReport {
    pub source: ImportSource,
    pub filename: Option<String>,
    /// Rows produced by the import before deduplication against history.
    pub imported_rows: usize,
    /// Rows in the persisted history after the merge.
    pub total_rows: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImportOutcome {
    Imported(ImportReport),
    /// The configured DAT file is not present; history was left alone.
    NothingToImport,
}

#[derive(Clone, Debug, Default)]
pub struct OverviewQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub fields: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Overview {
    pub fields: Vec<Field>,
    pub selected_fields: Vec<Field>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub record_count: usize,
    pub historical_count: usize,
    pub chart: Option<ChartPayload>,
    /// Whole history, newest first.
    pub table: Vec<WorkoutRecord>,
}

/// Decode bytes as UTF-8, dropping invalid sequences.
fn decode_lossy(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).replace('\u{FFFD}', "")
}

pub struct WorkoutService<S: HistoryStore> {
    config: HistoryConfig,
    store: S,
}

impl WorkoutService<CsvHistoryStore> {
    /// Service backed by the configured history file.
    pub fn from_config(config: HistoryConfig) -> Self {
        let store = CsvHistoryStore::new(config.history_file.clone());
        Self { config, store }
    }
}

impl<S: HistoryStore> WorkoutService<S> {
    pub fn new(config: HistoryConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn history(&self) -> WorkoutResult<HistoryTable> {
        self.store.load()
    }

    /// Tokenize and normalize a raw DAT payload without touching history.
    pub fn read_dat(&self, raw: &[u8]) -> WorkoutResult<HistoryTable> {
        let text = decode_lossy(raw);
        let objects = parse_dat_payload(&text, self.config.header_lines)?;
        normalize_workouts(objects)
    }

    pub fn import_dat(&self, raw: &[u8], filename: Option<&str>) -> WorkoutResult<ImportReport> {
        let started = Instant::now();
        let new_rows = self.read_dat(raw)?;
        self.merge_and_save(new_rows, ImportSource::Upload, filename, started)
    }

    /// Merge an externally supplied history table. Missing columns reject
    /// the upload before anything is merged.
    pub fn import_history_csv(
        &self,
        raw: &[u8],
        filename: Option<&str>,
    ) -> WorkoutResult<ImportReport> {
        let started = Instant::now();
        let uploaded = parse_history_csv(&decode_lossy(raw))?;
        self.merge_and_save(uploaded, ImportSource::HistoryCsv, filename, started)
    }

    /// Import the DAT file configured on disk, if there is one.
    pub fn import_from_disk(&self) -> WorkoutResult<ImportOutcome> {
        let path = &self.config.dat_file;
        if !path.is_file() {
            warn!(path = %path.display(), "import attempted without DAT file available");
            return Ok(ImportOutcome::NothingToImport);
        }
        let started = Instant::now();
        let raw = std::fs::read(path)?;
        let new_rows = self.read_dat(&raw)?;
        let name = path.file_name().and_then(|n| n.to_str());
        self.merge_and_save(new_rows, ImportSource::Disk, name, started)
            .map(ImportOutcome::Imported)
    }

    fn merge_and_save(
        &self,
        new_rows: HistoryTable,
        source: ImportSource,
        filename: Option<&str>,
        started: Instant,
    ) -> WorkoutResult<ImportReport> {
        let imported_rows = new_rows.len();
        let history = self.store.load()?;
        let merged = merge(new_rows, history);
        self.store.save(&merged)?;

        let elapsed = started.elapsed();
        metrics::counter!("workout_history_imports_total", "source" => source.as_str())
            .increment(1);
        metrics::histogram!(
            "workout_history_import_duration_seconds",
            "source" => source.as_str()
        )
        .record(elapsed.as_secs_f64());
        info!(
            source = source.as_str(),
            file = filename.unwrap_or("-"),
            rows = imported_rows,
            total = merged.len(),
            ?elapsed,
            "history merged"
        );

        Ok(ImportReport {
            source,
            filename: filename.map(str::to_string),
            imported_rows,
            total_rows: merged.len(),
        })
    }

    /// Everything a history page shows: the filtered chart, counts, overall
    /// date bounds and the full table.
    ///
    /// Unknown field names are dropped here rather than rejected, falling
    /// back to the default selection, since they come from a form.
    pub fn overview(&self, query: &OverviewQuery) -> WorkoutResult<Overview> {
        let history = self.store.load()?;
        let range = DateRange::parse(query.start_date.as_deref(), query.end_date.as_deref())?;

        let mut selected: Vec<Field> = Vec::new();
        for field in query.fields.iter().filter_map(|f| f.trim().parse::<Field>().ok()) {
            if !selected.contains(&field) {
                selected.push(field);
            }
        }
        if selected.is_empty() {
            selected = Field::UI_DEFAULT.to_vec();
        }

        let filtered = filter_by_date(&history, &range);
        let chart = build_chart(&filtered, &selected);
        let bounds = history.date_bounds();

        Ok(Overview {
            fields: Field::GRAPHABLE.to_vec(),
            selected_fields: selected,
            start_date: range.start,
            end_date: range.end,
            min_date: bounds.map(|b| b.0),
            max_date: bounds.map(|b| b.1),
            record_count: filtered.len(),
            historical_count: history.len(),
            chart,
            table: history.newest_first(),
        })
    }

    pub fn timeseries<F: AsRef<str>>(
        &self,
        fields: &[F],
        range: &DateRange,
    ) -> WorkoutResult<Vec<SeriesPoint>> {
        let history = self.store.load()?;
        to_points(&filter_by_date(&history, range), fields)
    }

    pub fn summary<F: AsRef<str>>(&self, fields: &[F], range: &DateRange) -> WorkoutResult<Summary> {
        let history = self.store.load()?;
        aggregate(&history, fields, range)
    }

    /// Persisted history rendered for download.
    pub fn history_csv(&self) -> WorkoutResult<String> {
        Ok(render_history_csv(&self.store.load()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkoutError;
    use tempfile::{TempDir, tempdir};

    fn workout(month: u32, day: u32, hours: u32, minutes: u32, distance: f64) -> String {
        format!(
            r#"{{"workoutDate":{{"Month":{month},"Day":{day},"Year":2026}},"distance":{distance},"averageSpeed":14.2,"totalWorkoutTime":{{"Hours":{hours},"Minutes":{minutes}}},"totalCalories":200,"avgHeartRate":130,"avgRpm":75,"avgLevel":5}}"#
        )
    }

    fn dat(body: &[String]) -> Vec<u8> {
        let header = vec!["header"; 8].join("\n");
        format!("{header}\n{}", body.join("\n")).into_bytes()
    }

    fn service() -> (TempDir, WorkoutService<CsvHistoryStore>) {
        let dir = tempdir().unwrap();
        let svc = WorkoutService::from_config(HistoryConfig::in_dir(dir.path()));
        (dir, svc)
    }

    #[test]
    fn import_dat_persists_and_reports() {
        let (_dir, svc) = service();
        let report = svc
            .import_dat(&dat(&[workout(1, 2, 0, 40, 3.2)]), Some("AARON.DAT"))
            .unwrap();
        assert_eq!(report.imported_rows, 1);
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.filename.as_deref(), Some("AARON.DAT"));
        let history = svc.history().unwrap();
        assert_eq!(history.rows()[0].distance, Some(3.2));
        assert_eq!(history.rows()[0].workout_time, Some(40));
    }

    #[test]
    fn reimporting_same_payload_does_not_grow_history() {
        let (_dir, svc) = service();
        let payload = dat(&[workout(1, 2, 0, 40, 3.2), workout(1, 3, 1, 5, 6.0)]);
        svc.import_dat(&payload, None).unwrap();
        let report = svc.import_dat(&payload, None).unwrap();
        assert_eq!(report.total_rows, 2);
    }

    #[test]
    fn recomputed_session_replaces_stored_one() {
        let (_dir, svc) = service();
        svc.import_dat(&dat(&[workout(1, 2, 0, 30, 1.0)]), None).unwrap();
        svc.import_dat(&dat(&[workout(1, 2, 0, 30, 2.0)]), None).unwrap();
        let history = svc.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.rows()[0].distance, Some(2.0));
    }

    #[test]
    fn failed_import_leaves_history_untouched() {
        let (_dir, svc) = service();
        svc.import_dat(&dat(&[workout(1, 2, 0, 30, 1.0)]), None).unwrap();
        let before = std::fs::read_to_string(&svc.config().history_file).unwrap();

        let err = svc.import_dat(&dat(&["garbage {".to_string()]), None).unwrap_err();
        assert!(matches!(err, WorkoutError::NoWorkoutData));
        let err = svc
            .import_dat(&dat(&[r#"{"distance": 1}"#.to_string()]), None)
            .unwrap_err();
        assert!(matches!(err, WorkoutError::MalformedInput { .. }));
        let err = svc
            .import_history_csv(b"Workout_Date,Distance\n2026-01-01,1\n", None)
            .unwrap_err();
        assert!(matches!(err, WorkoutError::MissingColumns(_)));

        let after = std::fs::read_to_string(&svc.config().history_file).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn import_history_csv_merges_rows() {
        let (_dir, svc) = service();
        let csv = "Workout_Date,Distance,Avg_Speed,Workout_Time,Total_Calories,Heart_Rate,RPM,Level\n2026-01-04,3.5,12.2,30,210,128,72,4\n";
        let report = svc.import_history_csv(csv.as_bytes(), Some("history.csv")).unwrap();
        assert_eq!(report.source, ImportSource::HistoryCsv);
        assert_eq!(report.total_rows, 1);
        assert_eq!(svc.history().unwrap().rows()[0].distance, Some(3.5));
    }

    #[test]
    fn import_from_disk_without_file_is_a_no_op() {
        let (_dir, svc) = service();
        assert_eq!(svc.import_from_disk().unwrap(), ImportOutcome::NothingToImport);
        assert!(!svc.config().history_file.exists());
    }

    #[test]
    fn import_from_disk_reads_configured_file() {
        let (_dir, svc) = service();
        std::fs::write(&svc.config().dat_file, dat(&[workout(1, 2, 0, 40, 3.2)])).unwrap();
        match svc.import_from_disk().unwrap() {
            ImportOutcome::Imported(report) => {
                assert_eq!(report.source, ImportSource::Disk);
                assert_eq!(report.filename.as_deref(), Some("AARON.DAT"));
                assert_eq!(report.total_rows, 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_is_ignored() {
        let (_dir, svc) = service();
        let mut payload = dat(&[workout(1, 2, 0, 40, 3.2)]);
        payload.extend_from_slice(&[0xff, 0xfe, b'\n']);
        assert_eq!(svc.import_dat(&payload, None).unwrap().imported_rows, 1);
    }

    #[test]
    fn overview_filters_chart_but_lists_whole_history() {
        let (_dir, svc) = service();
        svc.import_dat(
            &dat(&[
                workout(1, 1, 0, 20, 1.0),
                workout(1, 15, 0, 25, 2.0),
                workout(2, 1, 0, 30, 3.0),
            ]),
            None,
        )
        .unwrap();
        let overview = svc
            .overview(&OverviewQuery {
                start_date: Some("2026-01-15".into()),
                end_date: None,
                fields: vec!["Distance".into(), "Bogus".into()],
            })
            .unwrap();
        assert_eq!(overview.record_count, 2);
        assert_eq!(overview.historical_count, 3);
        assert_eq!(overview.selected_fields, vec![Field::Distance]);
        assert_eq!(overview.table[0].distance, Some(3.0));
        assert_eq!(overview.min_date.unwrap().to_string(), "2026-01-01");
        let chart = overview.chart.expect("chart");
        assert_eq!(chart.traces[0].y, vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn overview_defaults_fields_and_handles_empty_history() {
        let (_dir, svc) = service();
        let overview = svc.overview(&OverviewQuery::default()).unwrap();
        assert_eq!(overview.selected_fields, Field::UI_DEFAULT.to_vec());
        assert!(overview.chart.is_none());
        assert!(overview.min_date.is_none());
        assert_eq!(overview.historical_count, 0);
    }

    #[test]
    fn timeseries_and_summary_are_strict_about_fields() {
        let (_dir, svc) = service();
        svc.import_dat(&dat(&[workout(1, 2, 0, 40, 3.2)]), None).unwrap();
        let range = DateRange::default();
        assert_eq!(svc.timeseries(&["Distance"], &range).unwrap().len(), 1);
        assert!(matches!(
            svc.timeseries(&["Speed"], &range),
            Err(WorkoutError::InvalidField { .. })
        ));
        assert!(matches!(
            svc.summary(&["Speed"], &range),
            Err(WorkoutError::InvalidField { .. })
        ));
        assert_eq!(svc.summary(&["Distance"], &range).unwrap().workout_count, 1);
    }

    #[test]
    fn history_csv_has_canonical_header() {
        let (_dir, svc) = service();
        let csv = svc.history_csv().unwrap();
        assert_eq!(
            csv.trim_end(),
            "Workout_Date,Distance,Avg_Speed,Workout_Time,Total_Calories,Heart_Rate,RPM,Level"
        );
    }
}
