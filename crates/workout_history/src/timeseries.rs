//! Long-format projection of the table for dashboard consumers.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::WorkoutResult;
use crate::query::parse_fields_or_all;
use crate::table::{Field, HistoryTable};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub field: Field,
    pub time: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Midnight UTC of the workout date.
pub fn date_to_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// One point per (record, field), records in table order and fields in
/// request order. An empty request selects every graphable field; unknown
/// names are rejected with the allowed set.
pub fn to_points<S: AsRef<str>>(table: &HistoryTable, fields: &[S]) -> WorkoutResult<Vec<SeriesPoint>> {
    let fields = parse_fields_or_all(fields)?;
    let mut points = Vec::with_capacity(table.len() * fields.len());
    for record in table {
        let time = date_to_instant(record.workout_date);
        points.extend(fields.iter().map(|&field| SeriesPoint {
            field,
            time,
            value: record.value(field),
        }));
    }
    Ok(points)
}
