//! Query strings and response bodies of the HTTP surface.

use serde::{Deserialize, Serialize};
use workout_history::service::{ImportReport, OverviewQuery};

/// Dashboard query string.
///
/// Field names may come as `fields` or `field`, repeated or comma separated,
/// each optionally wrapped in quotes (`fields='Distance','Avg_Speed'`).
/// Date bounds are `start_date`/`end_date` or `from`/`to`. Other keys are
/// ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeParams {
    pub fields: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeParams {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "fields" | "field" => params.fields.extend(split_field_names(&value)),
                "start_date" | "from" => params.start_date = Some(value),
                "end_date" | "to" => params.end_date = Some(value),
                _ => {}
            }
        }
        params
    }

    pub fn field_list(&self) -> &[String] {
        &self.fields
    }

    pub fn into_overview_query(self) -> OverviewQuery {
        OverviewQuery {
            fields: self.fields,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

fn split_field_names(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(|name| name.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UploadParams {
    pub filename: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ImportReport>,
}

impl ImportResponse {
    pub fn dat_upload(report: ImportReport) -> Self {
        let name = report.filename.as_deref().unwrap_or("DAT upload");
        Self {
            message: format!("Uploaded {name} and merged {} workouts.", report.imported_rows),
            report: Some(report),
        }
    }

    pub fn history_upload(report: ImportReport) -> Self {
        let name = report.filename.as_deref().unwrap_or("history upload");
        Self {
            message: format!(
                "Uploaded {name} and merged {} historical rows.",
                report.imported_rows
            ),
            report: Some(report),
        }
    }

    pub fn disk(report: ImportReport) -> Self {
        let name = report.filename.as_deref().unwrap_or("DAT file");
        Self {
            message: format!("Imported {name} from disk and merged {} workouts.", report.imported_rows),
            report: Some(report),
        }
    }

    pub fn nothing_to_import() -> Self {
        Self {
            message: "No upload provided and no DAT file found on disk.".to_string(),
            report: None,
        }
    }
}
