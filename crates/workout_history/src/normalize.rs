//! Mapping of decoded DAT objects onto the canonical table.
//!
//! The batch is all-or-nothing for structure: one record missing a required
//! key fails the whole call. Rows whose date parts do not form a calendar
//! date are dropped afterwards.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::table::{HistoryTable, WorkoutRecord};
use crate::tokenizer::JsonObject;
use crate::utils::date_from_parts;
use crate::{WorkoutError, WorkoutResult};

#[derive(Debug, Deserialize)]
struct RawWorkout {
    #[serde(rename = "workoutDate")]
    workout_date: RawDate,
    #[serde(deserialize_with = "lenient_f64")]
    distance: Option<f64>,
    #[serde(rename = "averageSpeed", deserialize_with = "lenient_f64")]
    average_speed: Option<f64>,
    #[serde(rename = "totalWorkoutTime")]
    total_workout_time: RawDuration,
    #[serde(rename = "totalCalories", deserialize_with = "lenient_f64")]
    total_calories: Option<f64>,
    #[serde(rename = "avgHeartRate", deserialize_with = "lenient_f64")]
    avg_heart_rate: Option<f64>,
    #[serde(rename = "avgRpm", deserialize_with = "lenient_f64")]
    avg_rpm: Option<f64>,
    #[serde(rename = "avgLevel", deserialize_with = "lenient_f64")]
    avg_level: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDate {
    #[serde(deserialize_with = "date_part")]
    month: Option<i64>,
    #[serde(deserialize_with = "date_part")]
    day: Option<i64>,
    #[serde(deserialize_with = "date_part")]
    year: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDuration {
    hours: Value,
    minutes: Value,
}

/// Numbers pass through, numeric strings are parsed, anything else is missing.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

/// Integer date component. `1.0` or `"1.0"` is not a month, so the row
/// ends up with an invalid date and gets dropped.
fn date_part<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    v.is_finite().then_some(v)
}

/// Whole-number reading of an hours/minutes cell; fractional numbers are
/// truncated, fractional strings are rejected.
fn strict_count(value: &Value, name: &str) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
            .ok_or_else(|| format!("{name} is not a usable number: {n}")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("{name} is not an integer: {s:?}")),
        other => Err(format!("{name} is not an integer: {other}")),
    }
}

impl RawDuration {
    fn total_minutes(&self) -> Result<u32, String> {
        let hours = strict_count(&self.hours, "Hours")?;
        let minutes = strict_count(&self.minutes, "Minutes")?;
        let total = hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(minutes))
            .ok_or_else(|| "workout time overflows".to_string())?;
        u32::try_from(total).map_err(|_| format!("workout time out of range: {total} minutes"))
    }
}

struct Staged {
    date_parts: (Option<i64>, Option<i64>, Option<i64>),
    record: WorkoutRecord,
}

fn stage(index: usize, obj: JsonObject) -> WorkoutResult<Staged> {
    let raw: RawWorkout =
        serde_json::from_value(Value::Object(obj)).map_err(|e| WorkoutError::MalformedInput {
            index,
            reason: e.to_string(),
        })?;
    let workout_time = raw
        .total_workout_time
        .total_minutes()
        .map_err(|reason| WorkoutError::MalformedInput { index, reason })?;
    let RawDate { month, day, year } = raw.workout_date;
    Ok(Staged {
        date_parts: (month, day, year),
        record: WorkoutRecord {
            // Placeholder until the date parts are validated below.
            workout_date: chrono::NaiveDate::MIN,
            distance: raw.distance,
            avg_speed: raw.average_speed,
            workout_time: Some(workout_time),
            total_calories: raw.total_calories,
            heart_rate: raw.avg_heart_rate,
            rpm: raw.avg_rpm,
            level: raw.avg_level,
        },
    })
}

/// Normalize decoded workout objects into a canonical table.
///
/// Returns [`WorkoutError::MalformedInput`] for the first structurally broken
/// object; otherwise every object is mapped and rows with impossible dates are
/// dropped. Row order follows input order.
pub fn normalize_workouts<I>(objects: I) -> WorkoutResult<HistoryTable>
where
    I: IntoIterator<Item = JsonObject>,
{
    let staged = objects
        .into_iter()
        .enumerate()
        .map(|(index, obj)| stage(index, obj))
        .collect::<WorkoutResult<Vec<_>>>()?;

    let total = staged.len();
    let table: HistoryTable = staged
        .into_iter()
        .filter_map(|s| {
            let (month, day, year) = s.date_parts;
            let date = date_from_parts(month?, day?, year?)?;
            Some(WorkoutRecord {
                workout_date: date,
                ..s.record
            })
        })
        .collect();

    let dropped = total - table.len();
    if dropped > 0 {
        warn!(dropped, "dropped workouts with invalid dates");
    }
    debug!(rows = table.len(), "normalized workouts");
    Ok(table)
}
