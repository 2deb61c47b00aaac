use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_VAR: &str = "WORKOUT_HISTORY_LOG_LEVEL";
const FALLBACK_FILTER: &str = "info,hyper=warn";

/// Filter directive from `WORKOUT_HISTORY_LOG_LEVEL`, then `RUST_LOG`,
/// then `info`. Hyper internals stay at warn unless named explicitly.
pub fn log_filter_with<F>(mut get: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let level = get(LOG_LEVEL_VAR)
        .or_else(|| get("RUST_LOG"))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    if level.contains("hyper") {
        level
    } else {
        format!("{level},hyper=warn")
    }
}

pub fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Install the global compact subscriber. Returns the directive in effect.
pub fn init_tracing() -> String {
    let directive = log_filter_with(|k| std::env::var(k).ok());
    tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter(&directive))
        .init();
    directive
}
