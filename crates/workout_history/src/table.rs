//! Canonical 8-column workout table.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::WorkoutError;

pub const DATE_COLUMN: &str = "Workout_Date";

/// Persisted column names, in canonical order.
pub const COLUMN_NAMES: [&str; 8] = [
    DATE_COLUMN,
    "Distance",
    "Avg_Speed",
    "Workout_Time",
    "Total_Calories",
    "Heart_Rate",
    "RPM",
    "Level",
];

/// A numeric (graphable) column of the canonical table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "Distance")]
    Distance,
    #[serde(rename = "Avg_Speed")]
    AvgSpeed,
    #[serde(rename = "Workout_Time")]
    WorkoutTime,
    #[serde(rename = "Total_Calories")]
    TotalCalories,
    #[serde(rename = "Heart_Rate")]
    HeartRate,
    #[serde(rename = "RPM")]
    Rpm,
    #[serde(rename = "Level")]
    Level,
}

impl Field {
    pub const GRAPHABLE: [Field; 7] = [
        Field::Distance,
        Field::AvgSpeed,
        Field::WorkoutTime,
        Field::TotalCalories,
        Field::HeartRate,
        Field::Rpm,
        Field::Level,
    ];

    /// Selection shown when a UI request names no usable field.
    pub const UI_DEFAULT: [Field; 3] = [Field::Distance, Field::AvgSpeed, Field::WorkoutTime];

    pub fn column_name(self) -> &'static str {
        match self {
            Field::Distance => "Distance",
            Field::AvgSpeed => "Avg_Speed",
            Field::WorkoutTime => "Workout_Time",
            Field::TotalCalories => "Total_Calories",
            Field::HeartRate => "Heart_Rate",
            Field::Rpm => "RPM",
            Field::Level => "Level",
        }
    }

    pub fn allowed_names() -> Vec<String> {
        Self::GRAPHABLE
            .iter()
            .map(|f| f.column_name().to_string())
            .collect()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Field {
    type Err = WorkoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::GRAPHABLE
            .iter()
            .copied()
            .find(|f| f.column_name() == s)
            .ok_or_else(|| WorkoutError::InvalidField {
                value: s.to_string(),
                allowed: Self::allowed_names(),
            })
    }
}

/// One workout session. Numeric cells are `None` when the source value
/// could not be read as a number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    #[serde(rename = "Workout_Date")]
    pub workout_date: NaiveDate,
    #[serde(rename = "Distance")]
    pub distance: Option<f64>,
    #[serde(rename = "Avg_Speed")]
    pub avg_speed: Option<f64>,
    /// Total minutes.
    #[serde(rename = "Workout_Time")]
    pub workout_time: Option<u32>,
    #[serde(rename = "Total_Calories")]
    pub total_calories: Option<f64>,
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: Option<f64>,
    #[serde(rename = "RPM")]
    pub rpm: Option<f64>,
    #[serde(rename = "Level")]
    pub level: Option<f64>,
}

/// Composite identity of a session.
pub type RecordKey = (NaiveDate, Option<u32>);

impl WorkoutRecord {
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Distance => self.distance,
            Field::AvgSpeed => self.avg_speed,
            Field::WorkoutTime => self.workout_time.map(f64::from),
            Field::TotalCalories => self.total_calories,
            Field::HeartRate => self.heart_rate,
            Field::Rpm => self.rpm,
            Field::Level => self.level,
        }
    }

    pub fn key(&self) -> RecordKey {
        (self.workout_date, self.workout_time)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistoryTable {
    rows: Vec<WorkoutRecord>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap rows as-is; callers decide whether ordering matters.
    pub fn from_rows(rows: Vec<WorkoutRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[WorkoutRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorkoutRecord> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<WorkoutRecord> {
        self.rows
    }

    pub fn push(&mut self, record: WorkoutRecord) {
        self.rows.push(record);
    }

    /// Stable ascending sort by date; equal dates keep their relative order.
    pub fn sort_by_date(&mut self) {
        self.rows.sort_by_key(|r| r.workout_date);
    }

    pub fn sorted_by_date(mut self) -> Self {
        self.sort_by_date();
        self
    }

    /// Rows ordered newest first, for display.
    pub fn newest_first(&self) -> Vec<WorkoutRecord> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| b.workout_date.cmp(&a.workout_date));
        rows
    }

    /// Earliest and latest workout dates, if any.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.workout_date).min()?;
        let max = self.rows.iter().map(|r| r.workout_date).max()?;
        Some((min, max))
    }
}

impl FromIterator<WorkoutRecord> for HistoryTable {
    fn from_iter<I: IntoIterator<Item = WorkoutRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for HistoryTable {
    type Item = WorkoutRecord;
    type IntoIter = std::vec::IntoIter<WorkoutRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a HistoryTable {
    type Item = &'a WorkoutRecord;
    type IntoIter = std::slice::Iter<'a, WorkoutRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
pub(crate) fn record(date: (i32, u32, u32), minutes: u32, distance: f64) -> WorkoutRecord {
    WorkoutRecord {
        workout_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("valid date"),
        distance: Some(distance),
        avg_speed: Some(14.2),
        workout_time: Some(minutes),
        total_calories: Some(250.0),
        heart_rate: Some(132.0),
        rpm: Some(78.0),
        level: Some(6.0),
    }
}
