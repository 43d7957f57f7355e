use super::*;
use std::sync::Mutex;
use std::time::Duration;

fn config(slots: usize, max_queue: Option<usize>) -> GovernorConfig {
    GovernorConfig {
        policy_slots: slots,
        search_slots: slots,
        engine_slots: slots,
        max_queue,
    }
}

/// A job that reports when it starts and then waits to be released.
fn gated() -> (
    oneshot::Receiver<()>,
    oneshot::Sender<()>,
    impl Future<Output = Result<u32>> + Send + 'static,
) {
    let (started_tx, started_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let job = async move {
        let _ = started_tx.send(());
        let _ = release_rx.await;
        Ok(0)
    };
    (started_rx, release_tx, job)
}

#[tokio::test]
async fn test_lane_never_exceeds_its_slots() {
    let governor = Governor::start(&config(2, None));
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tickets: Vec<_> = (0..6u32)
        .map(|i| {
            let running = running.clone();
            let peak = peak.clone();
            governor
                .submit(StrategyKind::SearchWithModel, async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(i)
                })
                .unwrap()
        })
        .collect();

    for (i, ticket) in tickets.into_iter().enumerate() {
        assert_eq!(ticket.await.unwrap(), i as u32);
    }
    assert_eq!(peak.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_jobs_start_in_submission_order() {
    let governor = Governor::start(&config(1, None));
    let started = Arc::new(Mutex::new(Vec::new()));

    let tickets: Vec<_> = (0..5u32)
        .map(|i| {
            let started = started.clone();
            governor
                .submit(StrategyKind::PolicyOnly, async move {
                    started.lock().unwrap().push(i);
                    tokio::task::yield_now().await;
                    Ok(i)
                })
                .unwrap()
        })
        .collect();
    for ticket in tickets {
        ticket.await.unwrap();
    }
    assert_eq!(*started.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_full_queue_is_refused() {
    let governor = Governor::start(&config(1, Some(1)));
    let (started, release, blocker) = gated();
    let running = governor.submit(StrategyKind::ExternalEngine, blocker).unwrap();
    started.await.unwrap();

    let waiting = governor
        .submit(StrategyKind::ExternalEngine, async { Ok(1) })
        .unwrap();
    assert_eq!(governor.waiting(StrategyKind::ExternalEngine), 1);
    let err = governor
        .submit(StrategyKind::ExternalEngine, async { Ok(2) })
        .err()
        .unwrap();
    assert!(matches!(
        err,
        PredictError::QueueOverflow {
            lane: StrategyKind::ExternalEngine,
            max: 1
        }
    ));

    // Other lanes are unaffected.
    let other = governor
        .submit(StrategyKind::PolicyOnly, async { Ok(3) })
        .unwrap();
    assert_eq!(other.await.unwrap(), 3);

    release.send(()).unwrap();
    assert_eq!(running.await.unwrap(), 0);
    assert_eq!(waiting.await.unwrap(), 1);
}

#[tokio::test]
async fn test_panicking_job_is_reported_and_lane_keeps_going() {
    let governor: Governor<u32> = Governor::start(&config(1, None));
    let boom = governor
        .submit(StrategyKind::SearchWithModel, async {
            if true {
                panic!("model exploded");
            }
            Ok(0)
        })
        .unwrap();
    let after = governor
        .submit(StrategyKind::SearchWithModel, async { Ok(7) })
        .unwrap();

    match boom.await {
        Err(PredictError::WorkerPanicked { lane, message }) => {
            assert_eq!(lane, StrategyKind::SearchWithModel);
            assert_eq!(message, "model exploded");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(after.await.unwrap(), 7);
}

#[tokio::test]
async fn test_job_errors_pass_through() {
    let governor: Governor<u32> = Governor::start(&GovernorConfig::default());
    let ticket = governor
        .submit(StrategyKind::PolicyOnly, async { Err(PredictError::NotReady) })
        .unwrap();
    assert!(matches!(ticket.await, Err(PredictError::NotReady)));
}

#[tokio::test]
async fn test_shutdown_rejects_queued_jobs() {
    let governor = Governor::start(&config(1, None));
    let (started, release, blocker) = gated();
    let running = governor.submit(StrategyKind::PolicyOnly, blocker).unwrap();
    started.await.unwrap();
    let queued = governor
        .submit(StrategyKind::PolicyOnly, async { Ok(1) })
        .unwrap();

    governor.shutdown();
    assert!(matches!(queued.await, Err(PredictError::ShuttingDown)));

    release.send(()).unwrap();
    assert_eq!(running.await.unwrap(), 0);
}
