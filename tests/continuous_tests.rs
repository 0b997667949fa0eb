use rdiscover::{ContinuousEngine, DiscovererSchedule, Engine};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{test_resource, StaticDiscoverer};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;


#[tokio::test(start_paused = true)]
async fn test_initial_pass_runs_immediately() {
    let discoverer = StaticDiscoverer::new("eager", vec![test_resource(1)]);
    let passes = discoverer.pass_counter();
    let engine =
        ContinuousEngine::new().with_discoverer(Arc::new(discoverer), Duration::from_secs(10));

    let (tx, mut rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();
    let engine_task = tokio::spawn(engine.run(shutdown.clone(), tx));

    // the first pass arrives without waiting for the first tick
    let first = rx.recv().await.expect("initial pass result");
    assert_eq!(first.metadata().discoverer_id, "eager");
    assert_eq!(first.resources().len(), 1);

    shutdown.cancel();
    let mut drained = 0;
    while rx.recv().await.is_some() {
        drained += 1;
    }
    engine_task.await.unwrap();
    assert_eq!(passes.load(Ordering::SeqCst), 1 + drained);
}

#[tokio::test(start_paused = true)]
async fn test_passes_follow_the_configured_interval() {
    let discoverer = StaticDiscoverer::new("steady", Vec::new());
    let engine =
        ContinuousEngine::new().with_discoverer(Arc::new(discoverer), Duration::from_secs(1));

    let (tx, mut rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();
    let engine_task = tokio::spawn(engine.run(shutdown.clone(), tx));

    rx.recv().await.expect("initial pass result");
    let started = tokio::time::Instant::now();
    for _ in 0..3 {
        rx.recv().await.expect("ticked pass result");
    }
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(2900) && elapsed <= Duration::from_millis(3100),
        "three passes at 1s cadence took {elapsed:?}"
    );

    shutdown.cancel();
    while rx.recv().await.is_some() {}
    engine_task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_interval_update_changes_cadence() {
    let discoverer = StaticDiscoverer::new("retimed", Vec::new());
    let (update_tx, update_rx) = mpsc::channel(1);
    let schedule = DiscovererSchedule::new(Arc::new(discoverer), Duration::from_secs(10))
        .with_interval_updates(update_rx);
    let engine = ContinuousEngine::new().with_schedule(schedule);

    let (tx, mut rx) = mpsc::channel(64);
    let shutdown = CancellationToken::new();
    let engine_task = tokio::spawn(engine.run(shutdown.clone(), tx));

    rx.recv().await.expect("initial pass result");

    update_tx.send(Duration::from_millis(100)).await.unwrap();
    let started = tokio::time::Instant::now();
    for _ in 0..5 {
        rx.recv().await.expect("pass at the updated cadence");
    }
    let elapsed = started.elapsed();
    assert!(
        elapsed <= Duration::from_secs(1),
        "five passes after the 100ms update took {elapsed:?}, still on the old 10s cadence"
    );

    shutdown.cancel();
    while rx.recv().await.is_some() {}
    engine_task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_manual_trigger_launches_exactly_one_extra_pass() {
    let discoverer = StaticDiscoverer::new("poked", Vec::new());
    let passes = discoverer.pass_counter();
    let (trigger_tx, trigger_rx) = mpsc::channel(1);
    let schedule = DiscovererSchedule::new(Arc::new(discoverer), Duration::from_secs(10))
        .with_triggers(trigger_rx);
    let engine = ContinuousEngine::new().with_schedule(schedule);

    let (tx, mut rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();
    let engine_task = tokio::spawn(engine.run(shutdown.clone(), tx));

    rx.recv().await.expect("initial pass result");

    let started = tokio::time::Instant::now();
    trigger_tx.send(()).await.unwrap();
    rx.recv().await.expect("triggered pass result");
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "triggered pass must not wait for the ticker"
    );

    // in this window the ticker alone would have produced zero passes, so
    // the trigger accounts for exactly one pass beyond the initial one
    shutdown.cancel();
    while rx.recv().await.is_some() {}
    engine_task.await.unwrap();
    assert_eq!(passes.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_passes_are_allowed() {
    // a discoverer slower than its interval: passes pile up in flight
    let discoverer = StaticDiscoverer::new("slow", Vec::new()).with_delay(Duration::from_secs(10));
    let passes = discoverer.pass_counter();
    let engine =
        ContinuousEngine::new().with_discoverer(Arc::new(discoverer), Duration::from_secs(1));

    let (tx, mut rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();
    let engine_task = tokio::spawn(engine.run(shutdown.clone(), tx));

    // initial pass plus ticks at 1s, 2s, and 3s are all in flight
    tokio::time::sleep(Duration::from_millis(3500)).await;
    shutdown.cancel();

    let mut delivered = 0;
    while rx.recv().await.is_some() {
        delivered += 1;
    }
    engine_task.await.unwrap();
    assert_eq!(delivered, 4);
    assert_eq!(passes.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drains_in_flight_passes() {
    let discoverer =
        StaticDiscoverer::new("draining", vec![test_resource(9)]).with_delay(Duration::from_secs(5));
    let engine =
        ContinuousEngine::new().with_discoverer(Arc::new(discoverer), Duration::from_secs(100));

    let (tx, mut rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();
    let engine_task = tokio::spawn(engine.run(shutdown.clone(), tx));

    // cancel while the initial pass is still running
    shutdown.cancel();

    let result = rx.recv().await.expect("in-flight pass result is not discarded");
    assert_eq!(result.resources().len(), 1);
    assert!(rx.recv().await.is_none());
    engine_task.await.unwrap();
}
