//! Renderer-neutral line chart description.
//!
//! The payload mirrors the figure model most browser charting libraries
//! accept (traces plus layout), so a front end can hand it over verbatim.

use std::time::Instant;

use serde::Serialize;

use crate::table::{Field, HistoryTable};

pub const CHART_TITLE: &str = "Workout Performance";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartTrace {
    pub name: Field,
    pub mode: &'static str,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: &'static str,
    pub xaxis_title: &'static str,
    pub yaxis_title: &'static str,
    pub height: u32,
    pub hovermode: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPayload {
    pub traces: Vec<ChartTrace>,
    pub layout: ChartLayout,
}

/// Build one `lines+markers` trace per field, or `None` when there is
/// nothing to draw.
pub fn build_chart(table: &HistoryTable, fields: &[Field]) -> Option<ChartPayload> {
    if table.is_empty() || fields.is_empty() {
        return None;
    }
    let started = Instant::now();

    let x: Vec<String> = table
        .iter()
        .map(|r| r.workout_date.format("%Y-%m-%d").to_string())
        .collect();
    let traces = fields
        .iter()
        .map(|&field| ChartTrace {
            name: field,
            mode: "lines+markers",
            x: x.clone(),
            y: table.iter().map(|r| r.value(field)).collect(),
        })
        .collect();

    metrics::counter!("workout_history_charts_generated_total").increment(1);
    metrics::histogram!("workout_history_chart_generation_duration_seconds")
        .record(started.elapsed().as_secs_f64());
    Some(ChartPayload {
        traces,
        layout: ChartLayout {
            title: CHART_TITLE,
            xaxis_title: "Workout Date",
            yaxis_title: "Value",
            height: 692,
            hovermode: "x unified",
        },
    })
}
