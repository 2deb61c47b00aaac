use workout_history::query::DateRange;
use workout_history::service::ImportOutcome;
use workout_history::{HistoryConfig, WorkoutService};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: reads DATA_DIR / DAT_FILE / HISTORY_FILE from env
    let cfg = match HistoryConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let service = WorkoutService::from_config(cfg);
    match service.import_from_disk()? {
        ImportOutcome::Imported(report) => println!(
            "Imported {} workouts ({} in history)",
            report.imported_rows, report.total_rows
        ),
        ImportOutcome::NothingToImport => println!("No DAT file on disk, showing history only"),
    }

    let summary = service.summary::<&str>(&[], &DateRange::default())?;
    println!("Workouts: {}", summary.workout_count);
    for field in &summary.fields {
        let avg = summary.averages.get(field).copied().flatten();
        println!(
            "  {:<15} avg {}",
            field.column_name(),
            avg.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
        );
    }
    Ok(())
}
