use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use workout_history::merge::merge;
use workout_history::normalize::normalize_workouts;
use workout_history::tokenizer::parse_dat_payload;

fn synthetic_dat(sessions: usize) -> String {
    let mut out = vec!["preamble"; 8].join("\n");
    for i in 0..sessions {
        let month = i % 12 + 1;
        let day = i % 28 + 1;
        out.push_str(&format!(
            "\n{{\"workoutDate\":{{\"Month\":{month},\"Day\":{day},\"Year\":2025}},\"distance\":{}.5,\"averageSpeed\":14.2,\"totalWorkoutTime\":{{\"Hours\":0,\"Minutes\":{}}},\"totalCalories\":250,\"avgHeartRate\":132,\"avgRpm\":78,\"avgLevel\":6}}",
            i % 9,
            i % 60
        ));
        // corrupted fragment every few records to exercise resynchronization
        if i % 7 == 0 {
            out.push_str("\n{\"workoutDate\":{\"Mon");
        }
    }
    out
}

fn bench_ingest(c: &mut Criterion) {
    let payload = synthetic_dat(2_000);
    c.bench_function("parse_and_normalize_2000", |b| {
        b.iter(|| {
            let objects = parse_dat_payload(black_box(&payload), 8).expect("objects");
            normalize_workouts(objects).expect("table")
        })
    });

    let table = normalize_workouts(parse_dat_payload(&payload, 8).expect("objects"))
        .expect("table");
    c.bench_function("merge_2000_into_2000", |b| {
        b.iter(|| merge(black_box(table.clone()), black_box(table.clone())))
    });
}

criterion_group!(benches, bench_ingest);
criterion_main!(benches);
