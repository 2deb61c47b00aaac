//! Date-range filtering and per-field aggregates.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::table::{Field, HistoryTable};
use crate::utils::parse_date;
use crate::{WorkoutError, WorkoutResult};

/// Inclusive date window; a `None` bound is unbounded on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Parse request bounds. Missing or blank strings mean "no bound"; any
    /// other value must be a recognizable date.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> WorkoutResult<Self> {
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

fn parse_bound(raw: Option<&str>) -> WorkoutResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s)
            .map(Some)
            .ok_or_else(|| WorkoutError::InvalidDate(s.to_string())),
    }
}

/// Rows inside `range`, sorted ascending by date.
pub fn filter_by_date(table: &HistoryTable, range: &DateRange) -> HistoryTable {
    table
        .iter()
        .filter(|r| range.contains(r.workout_date))
        .cloned()
        .collect::<HistoryTable>()
        .sorted_by_date()
}

/// Resolve requested field names. Unknown names are rejected with the
/// allowed set; duplicates collapse onto their first position. An empty
/// request resolves to an empty list so callers can pick their own default.
pub fn parse_fields<S: AsRef<str>>(names: &[S]) -> WorkoutResult<Vec<Field>> {
    let mut fields = Vec::with_capacity(names.len());
    for name in names {
        let field: Field = name.as_ref().trim().parse()?;
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    Ok(fields)
}

/// Like [`parse_fields`], defaulting to every graphable field.
pub fn parse_fields_or_all<S: AsRef<str>>(names: &[S]) -> WorkoutResult<Vec<Field>> {
    let fields = parse_fields(names)?;
    if fields.is_empty() {
        return Ok(Field::GRAPHABLE.to_vec());
    }
    Ok(fields)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub workout_count: usize,
    pub fields: Vec<Field>,
    pub minimums: BTreeMap<Field, Option<f64>>,
    pub maximums: BTreeMap<Field, Option<f64>>,
    pub averages: BTreeMap<Field, Option<f64>>,
}

/// Count, min, max and mean per field over the rows inside `range`.
///
/// Missing cells are skipped; a field without any value reports `None`.
pub fn aggregate<S: AsRef<str>>(
    table: &HistoryTable,
    fields: &[S],
    range: &DateRange,
) -> WorkoutResult<Summary> {
    let fields = parse_fields_or_all(fields)?;
    let filtered = filter_by_date(table, range);

    let mut minimums = BTreeMap::new();
    let mut maximums = BTreeMap::new();
    let mut averages = BTreeMap::new();
    for &field in &fields {
        let values: Vec<f64> = filtered.iter().filter_map(|r| r.value(field)).collect();
        let min = values.iter().copied().reduce(f64::min);
        let max = values.iter().copied().reduce(f64::max);
        let avg = (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64);
        minimums.insert(field, min);
        maximums.insert(field, max);
        averages.insert(field, avg);
    }

    Ok(Summary {
        workout_count: filtered.len(),
        fields,
        minimums,
        maximums,
        averages,
    })
}
