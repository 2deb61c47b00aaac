use metrics_exporter_prometheus::PrometheusHandle;
use workout_history::{CsvHistoryStore, HistoryConfig, WorkoutService};

/// Shared by every handler. The service re-reads history per request, so
/// there is no mutable state to guard.
pub struct AppState {
    pub service: WorkoutService<CsvHistoryStore>,
    /// Present when the process installed the global Prometheus recorder.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: HistoryConfig, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            service: WorkoutService::from_config(config),
            metrics,
        }
    }
}
