use anyhow::Result;
use k9::*;
use progctl::observers::{Call, Recorder};
use progctl::{Controller, Shared, Signal};

const WORKERS: u64 = 4;
const UNITS_PER_WORKER: u64 = 25;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_workers_report_through_one_observer() -> Result<()> {
    let recorder = Recorder::new();
    let shared = Shared::new(recorder.clone());

    let mut handles = vec![];
    for worker in 0..WORKERS {
        let mut controller = shared.clone();
        handles.push(tokio::task::spawn_blocking(move || -> Result<()> {
            for i in 0..UNITS_PER_WORKER {
                let unit = format!("w{}/u{}.src", worker, i);
                controller.unit_starting("compile", &unit)?;
                controller.report_progress(i + 1, UNITS_PER_WORKER)?;
            }
            Ok(())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let calls = recorder.calls();
    assert_equal!(calls.len() as u64, 2 * WORKERS * UNITS_PER_WORKER);
    assert_equal!(recorder.polls() as u64, WORKERS * UNITS_PER_WORKER);
    // every unit shows up exactly once
    let mut starts = recorder.unit_starts();
    starts.sort();
    starts.dedup();
    assert_equal!(starts.len() as u64, WORKERS * UNITS_PER_WORKER);
    assert_equal!(
        shared.lock().calls().first().map(|c| matches!(c, Call::UnitStarting { .. })),
        Some(true)
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn abort_is_seen_by_every_worker() -> Result<()> {
    let shared = Shared::new(Recorder::new().abort_on_poll(1));

    let mut handles = vec![];
    for _ in 0..2 {
        let mut controller = shared.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            controller.report_progress(0, 1)
        }));
    }
    for handle in handles {
        let signal = handle.await??;
        assert_equal!(signal, Signal::Abort);
    }
    Ok(())
}
