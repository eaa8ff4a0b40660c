use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use fieldbook::engine::{Engine, EngineError, InMemoryStore};
use fieldbook::model::*;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.3}ms, p50={:.3}ms, p95={:.3}ms, p99={:.3}ms, max={:.3}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies[latencies.len() - 1].as_secs_f64() * 1000.0,
    );
}

/// The `slot`th one-hour window of the week, Monday 00:00 onwards.
fn hour_slot(slot: usize) -> AvailabilityRequest {
    let day = Day::ALL[(slot / 24) % 7];
    let hour = (slot % 24) as u32;
    let open = TimeOfDay::hm(hour, 0).expect("hour in range");
    let close = TimeOfDay::hm(hour + 1, 0).expect("hour in range");
    AvailabilityRequest::new(day.name(), open, close)
}

fn setup() -> (Arc<Engine>, Arc<InMemoryStore>) {
    let (engine, store) = Engine::in_memory();
    store.insert_field_type(FieldType { id: 1, description: "Football 5".into() });
    (Arc::new(engine), store)
}

async fn new_field(engine: &Engine, name: String) -> FieldResponse {
    let request = FieldRequest { name, size: "Small".into(), field_type: 1 };
    engine.create_field(&request).await.expect("create field")
}

async fn phase1_sequential(engine: &Engine) {
    let n = 2000;
    let per_field = 64;
    let mut latencies = Vec::with_capacity(n);
    let start = Instant::now();

    let mut field = new_field(engine, "seq-0".into()).await;
    for i in 0..n {
        if i > 0 && i % per_field == 0 {
            field = new_field(engine, format!("seq-{i}")).await;
        }
        let t = Instant::now();
        engine
            .create_availability(field.id, &hour_slot(i % per_field))
            .await
            .expect("create availability");
        latencies.push(t.elapsed());
    }

    let elapsed = start.elapsed();
    let ops = n as f64 / elapsed.as_secs_f64();
    println!("  {n} windows in {:.2}s = {ops:.0} ops/sec", elapsed.as_secs_f64());
    print_latency("write latency", &mut latencies);
}

async fn phase2_contended(engine: Arc<Engine>) {
    let n_tasks = 16;
    let field_id = new_field(&engine, "contended".into()).await.id;

    let start = Instant::now();
    let admitted = Arc::new(AtomicUsize::new(0));
    let conflicts = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    // Every task walks the same 64 slots; each slot is admitted once.
    for _ in 0..n_tasks {
        let engine = engine.clone();
        let admitted = admitted.clone();
        let conflicts = conflicts.clone();
        handles.push(tokio::spawn(async move {
            for slot in 0..64 {
                match engine.create_availability(field_id, &hour_slot(slot)).await {
                    Ok(_) => admitted.fetch_add(1, Ordering::Relaxed),
                    Err(EngineError::Conflict { .. } | EngineError::LimitExceeded(_)) => {
                        conflicts.fetch_add(1, Ordering::Relaxed)
                    }
                    Err(e) => panic!("unexpected error: {e}"),
                };
            }
        }));
    }
    for h in handles {
        h.await.expect("task panicked");
    }

    let elapsed = start.elapsed();
    println!(
        "  {n_tasks} tasks x 64 slots: {} admitted, {} conflicts in {:.2}s",
        admitted.load(Ordering::Relaxed),
        conflicts.load(Ordering::Relaxed),
        elapsed.as_secs_f64()
    );
}

async fn phase3_read_under_load(engine: Arc<Engine>) {
    let reader_field = new_field(&engine, "readers".into()).await;
    for slot in 0..48 {
        engine
            .create_availability(reader_field.id, &hour_slot(slot))
            .await
            .expect("prefill");
    }

    let stop = Arc::new(AtomicBool::new(false));
    let mut writer_handles = Vec::new();
    for w in 0..4 {
        let engine = engine.clone();
        let stop = stop.clone();
        writer_handles.push(tokio::spawn(async move {
            let field = new_field(&engine, format!("writer-{w}")).await;
            let mut slot = 0;
            while !stop.load(Ordering::Relaxed) {
                if engine.create_availability(field.id, &hour_slot(slot)).await.is_ok() {
                    slot += 1;
                }
                if slot == 64 {
                    let windows = engine
                        .get_field_availabilities(field.id)
                        .await
                        .unwrap_or_default();
                    for av in windows {
                        let _ = engine.delete_availability(av.id).await;
                    }
                    slot = 0;
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    let n_readers = 8;
    let reads_per_reader = 500;
    let mut reader_handles = Vec::new();
    for _ in 0..n_readers {
        let engine = engine.clone();
        let field_id = reader_field.id;
        reader_handles.push(tokio::spawn(async move {
            let mut latencies = Vec::with_capacity(reads_per_reader);
            for i in 0..reads_per_reader {
                let t = Instant::now();
                if i % 2 == 0 {
                    engine.get_field_by_id(field_id).await.expect("read field");
                } else {
                    let request = GetFieldsRequest {
                        availability: Some(1),
                        ..Default::default()
                    };
                    engine.get_all_fields(&request).await.expect("list fields");
                }
                latencies.push(t.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for h in reader_handles {
        all_latencies.extend(h.await.expect("reader panicked"));
    }
    stop.store(true, Ordering::Relaxed);
    for h in writer_handles {
        let _ = h.await;
    }

    print_latency("read latency", &mut all_latencies);
}

#[tokio::main]
async fn main() {
    println!("=== fieldbook stress benchmark ===\n");

    let (engine, _store) = setup();

    println!("[phase 1] sequential window creation");
    phase1_sequential(&engine).await;

    println!("\n[phase 2] contended creates on one field");
    phase2_contended(engine.clone()).await;

    println!("\n[phase 3] read latency under write load");
    phase3_read_under_load(engine).await;

    println!("\n=== benchmark complete ===");
}
