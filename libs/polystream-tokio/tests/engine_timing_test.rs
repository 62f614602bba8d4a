//! Integration tests for debounced batching on a tokio runtime
//!
//! These tests verify that:
//! 1. A single fragment is flushed exactly once after the debounce interval
//! 2. Continuous traffic cannot push a flush past the max-wait bound
//! 3. A closed engine flushes its buffer once and rejects further use
//! 4. Concurrent producers racing with timer flushes lose nothing
//! 5. An explicit flush disarms the pending timer

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use polystream_domain::{
    Addressing, BatchEngine, DataType, DebouncedBatchEngine, Dimension, EngineBuilder,
    FlushReason, Fragment, FragmentId, ReceiverConfig, ReceiverError, Scheduler,
};
use polystream_tokio::TokioScheduler;

/// Timer wheel resolution
const SLACK: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
struct Flushed {
    reason: FlushReason,
    ids: Vec<FragmentId>,
    first_received: Instant,
    flushed_at: Instant,
}

type Log = Arc<Mutex<Vec<Flushed>>>;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn fragment(window: &str, slice: i64) -> Fragment {
    Fragment::new(
        Addressing::new()
            .with(Dimension::Window, window)
            .with(Dimension::Channel, 0)
            .with(Dimension::Slice, slice),
        DataType::Image,
        vec![0u8; 4],
    )
}

fn engine(debounce: Duration, max_wait: Duration) -> (DebouncedBatchEngine<TokioScheduler>, Log) {
    let scheduler = TokioScheduler::current().expect("Test must run inside a tokio runtime");
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let clock = scheduler.clone();

    let engine = EngineBuilder::new(ReceiverConfig::new(debounce, max_wait))
        .build_debounced(scheduler, move |batch| {
            let first_received = batch
                .fragments()
                .filter_map(|f| f.received_at())
                .min()
                .ok_or_else(|| anyhow::anyhow!("unstamped batch"))?;
            sink.lock().unwrap().push(Flushed {
                reason: batch.reason(),
                ids: batch.fragments().map(|f| *f.id()).collect(),
                first_received,
                flushed_at: clock.now(),
            });
            Ok(())
        })
        .expect("Failed to build engine");

    (engine, log)
}

fn snapshot(log: &Log) -> Vec<Flushed> {
    log.lock().unwrap().clone()
}

/// Test that one fragment followed by silence flushes once, after the debounce interval
#[tokio::test(start_paused = true)]
async fn test_debounce_only_flush() {
    let (engine, log) = engine(ms(50), ms(1000));

    let f = fragment("roi-1", 0);
    let id = *f.id();
    engine.enqueue(f).unwrap();

    tokio::time::sleep(ms(49)).await;
    assert!(snapshot(&log).is_empty(), "Nothing should flush before the debounce elapses");

    tokio::time::sleep(ms(11)).await;
    let flushed = snapshot(&log);
    assert_eq!(flushed.len(), 1, "Exactly one flush expected");
    assert_eq!(flushed[0].ids, vec![id]);
    assert_eq!(flushed[0].reason, FlushReason::Debounce);

    tokio::time::sleep(ms(2000)).await;
    assert_eq!(snapshot(&log).len(), 1, "No further flush without new data");
}

/// Test that a fragment every 30ms never starves the renderer past max_wait
#[tokio::test(start_paused = true)]
async fn test_max_wait_overrides_debounce() {
    let (engine, log) = engine(ms(50), ms(200));

    for i in 0..20 {
        engine.enqueue(fragment("roi-1", i)).unwrap();
        tokio::time::sleep(ms(30)).await;
    }

    let flushed = snapshot(&log);
    assert!(flushed.len() >= 2, "Expected repeated flushes, got {}", flushed.len());
    for batch in &flushed {
        assert_eq!(batch.reason, FlushReason::MaxWait);
        let latency = batch.flushed_at.duration_since(batch.first_received);
        assert!(
            latency <= ms(200) + SLACK,
            "Flush latency {:?} exceeds max_wait",
            latency
        );
    }

    engine.close();
    let total: usize = snapshot(&log).iter().map(|b| b.ids.len()).sum();
    assert_eq!(total, 20, "Every fragment must be delivered exactly once");
}

/// Test that close flushes the pending buffer once and seals the engine
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_closed_engine_rejects_enqueue() {
    let (engine, log) = engine(ms(10_000), ms(20_000));

    engine
        .enqueue_many(vec![fragment("a", 0), fragment("a", 1), fragment("b", 0)])
        .unwrap();
    engine.close();
    engine.close();

    let err = engine.enqueue(fragment("a", 2)).unwrap_err();
    assert!(matches!(err, ReceiverError::EngineClosed));
    assert!(matches!(engine.flush(), Err(ReceiverError::EngineClosed)));

    let flushed = snapshot(&log);
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].reason, FlushReason::Close);
    assert_eq!(flushed[0].ids.len(), 3);
}

/// Test that producers racing with timer-driven flushes never lose or duplicate fragments
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_data_loss_on_flush_race() {
    let (engine, log) = engine(ms(2), ms(10));
    let engine = Arc::new(engine);

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let engine = engine.clone();
            thread::spawn(move || {
                let mut ids = Vec::new();
                for i in 0..200 {
                    let f = fragment(&format!("roi-{}", p), i);
                    ids.push(*f.id());
                    engine.enqueue(f).expect("Engine closed too early");
                    if i % 25 == 0 {
                        thread::sleep(Duration::from_millis(3));
                    }
                }
                ids
            })
        })
        .collect();

    let expected: HashSet<FragmentId> = producers
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    engine.close();

    let flushed = snapshot(&log);
    let mut delivered = HashSet::new();
    for batch in &flushed {
        for id in &batch.ids {
            assert!(delivered.insert(*id), "Fragment {} delivered twice", id);
        }
    }
    assert_eq!(delivered, expected);
    assert!(flushed.len() > 1, "Timers should have flushed during production");
    assert_eq!(engine.stats().fragments_flushed, 800);
}

/// Test that an explicit flush disarms the timer of the drained batch
#[tokio::test(start_paused = true)]
async fn test_explicit_flush_cancels_timer() {
    let (engine, log) = engine(ms(50), ms(1000));

    engine.enqueue(fragment("roi-1", 0)).unwrap();
    engine.flush().unwrap();
    tokio::time::sleep(ms(500)).await;

    let flushed = snapshot(&log);
    assert_eq!(flushed.len(), 1);
    assert_eq!(flushed[0].reason, FlushReason::Explicit);

    engine.enqueue(fragment("roi-1", 1)).unwrap();
    tokio::time::sleep(ms(60)).await;
    assert_eq!(snapshot(&log).len(), 2);
}
