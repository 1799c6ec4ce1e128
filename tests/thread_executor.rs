// tests/thread_executor.rs

use std::error::Error;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use initiator::dag::TaskRunState;
use initiator::exec::{ExecutorBackend, ThreadExecutor};
use initiator::{FnTask, Initiator, InitiatorOptions, TaskId, ThreadMode, WaitOutcome};
use initiator_test_utils::{init_tracing, primary_env};

type TestResult = Result<(), Box<dyn Error>>;

const CONFIG: TaskId = TaskId::new("config");
const NETWORK: TaskId = TaskId::new("network");
const CACHE: TaskId = TaskId::new("cache");
const UI: TaskId = TaskId::new("ui");
const SLOW: TaskId = TaskId::new("slow");

fn short_timeout() -> InitiatorOptions {
    InitiatorOptions::default().with_wait_timeout(Duration::from_millis(300))
}

/// Thread name each task ran on, by id.
type Seen = Arc<Mutex<Vec<(TaskId, Option<String>)>>>;

fn record(seen: &Seen, id: TaskId) {
    let name = thread::current().name().map(str::to_string);
    seen.lock().unwrap().push((id, name));
}

#[test]
fn each_thread_mode_runs_in_its_own_context() -> TestResult {
    init_tracing();

    let seen: Seen = Arc::default();
    let driver = thread::current().name().map(str::to_string);
    let mut initiator = Initiator::with_options(primary_env(), InitiatorOptions::default());

    let (s1, s2, s3) = (seen.clone(), seen.clone(), seen.clone());
    initiator
        .add_task(
            FnTask::builder(CONFIG)
                .thread_mode(ThreadMode::Main)
                .run(move || {
                    record(&s1, CONFIG);
                    Ok(())
                }),
        )
        .add_task(
            FnTask::builder(NETWORK)
                .thread_mode(ThreadMode::Pooled)
                .need_wait(true)
                .run(move || {
                    record(&s2, NETWORK);
                    Ok(())
                }),
        )
        .add_task(
            FnTask::builder(CACHE)
                .thread_mode(ThreadMode::Dedicated)
                .need_wait(true)
                .run(move || {
                    record(&s3, CACHE);
                    Ok(())
                }),
        );

    assert_eq!(initiator.start()?, WaitOutcome::Completed);

    let seen = seen.lock().unwrap().clone();
    let thread_of = |id: TaskId| {
        seen.iter()
            .find(|(t, _)| *t == id)
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| panic!("{id} did not run"))
    };

    assert_eq!(thread_of(CONFIG), driver);
    assert_eq!(thread_of(NETWORK).as_deref(), Some("initiator-pool"));
    assert_eq!(thread_of(CACHE).as_deref(), Some("initiator-cache"));
    Ok(())
}

#[test]
fn dependents_wait_for_prerequisites_across_threads() -> TestResult {
    init_tracing();

    let order = Arc::new(Mutex::new(Vec::new()));
    let mut initiator = Initiator::with_options(primary_env(), InitiatorOptions::default());

    let (o1, o2, o3) = (order.clone(), order.clone(), order.clone());
    initiator
        .add_task(
            FnTask::builder(UI)
                .after(CACHE)
                .thread_mode(ThreadMode::Main)
                .run(move || {
                    o1.lock().unwrap().push(UI);
                    Ok(())
                }),
        )
        .add_task(
            FnTask::builder(CACHE)
                .after(NETWORK)
                .thread_mode(ThreadMode::Dedicated)
                .need_wait(true)
                .run(move || {
                    o2.lock().unwrap().push(CACHE);
                    Ok(())
                }),
        )
        .add_task(
            FnTask::builder(NETWORK)
                .thread_mode(ThreadMode::Pooled)
                .need_wait(true)
                .run(move || {
                    thread::sleep(Duration::from_millis(50));
                    o3.lock().unwrap().push(NETWORK);
                    Ok(())
                }),
        );

    assert!(initiator.start()?.is_completed());
    assert_eq!(*order.lock().unwrap(), vec![NETWORK, CACHE, UI]);
    assert_eq!(initiator.need_wait_count(), 0);
    assert!(initiator.pending_wait_tasks().is_empty());
    Ok(())
}

#[test]
fn failing_task_still_counts_as_finished() -> TestResult {
    init_tracing();

    let ran = Arc::new(Mutex::new(false));
    let mut initiator = Initiator::with_options(primary_env(), short_timeout());

    let flag = ran.clone();
    initiator
        .add_task(
            FnTask::builder(NETWORK)
                .need_wait(true)
                .run(|| Err(anyhow::anyhow!("no route to host"))),
        )
        .add_task(
            FnTask::builder(CACHE)
                .after(NETWORK)
                .need_wait(true)
                .run(move || {
                    *flag.lock().unwrap() = true;
                    Ok(())
                }),
        );

    assert_eq!(initiator.start()?, WaitOutcome::Completed);
    assert!(*ran.lock().unwrap());
    Ok(())
}

#[test]
fn never_finishing_wait_task_times_out_and_keeps_running() -> TestResult {
    init_tracing();

    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let options = short_timeout();
    let timeout = options.wait_timeout;
    let mut initiator = Initiator::with_options(primary_env(), options);

    initiator.add_task(
        FnTask::builder(SLOW)
            .thread_mode(ThreadMode::Dedicated)
            .need_wait(true)
            .run(move || {
                let _ = release_rx.lock().unwrap().recv();
                Ok(())
            }),
    );

    let started = Instant::now();
    let outcome = initiator.start()?;
    let elapsed = started.elapsed();

    assert_eq!(outcome, WaitOutcome::TimedOut { remaining: 1 });
    assert!(elapsed >= timeout, "returned early after {elapsed:?}");
    assert!(elapsed < timeout + Duration::from_secs(1), "returned late after {elapsed:?}");
    assert_eq!(initiator.pending_wait_tasks(), vec![SLOW]);

    // The task is still alive in the background and finishes once released.
    drop(release_tx);
    let deadline = Instant::now() + Duration::from_secs(5);
    while initiator.need_wait_count() > 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(initiator.finished_tasks(), vec![SLOW]);
    Ok(())
}

#[test]
fn default_timeout_bounds_start_at_ten_seconds() -> TestResult {
    init_tracing();

    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    let mut initiator = Initiator::with_environment(primary_env());

    initiator.add_task(
        FnTask::builder(SLOW)
            .thread_mode(ThreadMode::Pooled)
            .need_wait(true)
            .run(move || {
                let _ = release_rx.lock().unwrap().recv();
                Ok(())
            }),
    );

    let started = Instant::now();
    let outcome = initiator.start()?;
    let elapsed = started.elapsed();
    drop(release_tx);

    assert!(!outcome.is_completed());
    assert!(elapsed >= Duration::from_millis(10_000), "returned early after {elapsed:?}");
    assert!(elapsed < Duration::from_millis(11_000), "returned late after {elapsed:?}");
    Ok(())
}

#[test]
fn huge_wait_timeout_still_waits_for_completion() -> TestResult {
    init_tracing();

    let options = InitiatorOptions::default().with_wait_timeout(Duration::MAX);
    let mut initiator = Initiator::with_options(primary_env(), options);
    initiator.add_task(
        FnTask::builder(NETWORK)
            .thread_mode(ThreadMode::Pooled)
            .need_wait(true)
            .run(|| {
                thread::sleep(Duration::from_millis(20));
                Ok(())
            }),
    );

    assert_eq!(initiator.start()?, WaitOutcome::Completed);
    assert_eq!(initiator.finished_tasks(), vec![NETWORK]);
    Ok(())
}

#[test]
fn panicking_task_still_counts_as_finished() -> TestResult {
    init_tracing();

    let ran = Arc::new(Mutex::new(false));
    let mut initiator = Initiator::with_options(primary_env(), short_timeout());

    let flag = ran.clone();
    initiator
        .add_task(
            FnTask::builder(CONFIG)
                .thread_mode(ThreadMode::Dedicated)
                .need_wait(true)
                .run(|| panic!("config file is corrupt")),
        )
        .add_task(
            FnTask::builder(CACHE)
                .after(CONFIG)
                .thread_mode(ThreadMode::Pooled)
                .need_wait(true)
                .run(move || {
                    *flag.lock().unwrap() = true;
                    Ok(())
                }),
        );

    assert_eq!(initiator.start()?, WaitOutcome::Completed);
    assert!(*ran.lock().unwrap());
    assert_eq!(initiator.run_state_of(CONFIG), Some(TaskRunState::Done));
    Ok(())
}

#[test]
fn main_tasks_do_not_hold_the_gate() -> TestResult {
    let mut initiator = Initiator::with_options(primary_env(), short_timeout());
    initiator.add_task(
        FnTask::builder(UI)
            .thread_mode(ThreadMode::Main)
            .need_wait(true)
            .run(|| Ok(())),
    );

    assert_eq!(initiator.need_wait_count(), 0);
    assert_eq!(initiator.start()?, WaitOutcome::Completed);
    Ok(())
}

#[test]
fn cancelled_executor_skips_work_that_has_not_started() -> TestResult {
    let executor = ThreadExecutor::new(&InitiatorOptions::default());
    executor.cancel_token().cancel();
    assert!(executor.is_cancelled());

    let ran = Arc::new(Mutex::new(Vec::new()));
    let mut initiator =
        Initiator::with_executor(primary_env(), short_timeout(), executor);

    for (id, mode) in [
        (CONFIG, ThreadMode::Main),
        (NETWORK, ThreadMode::Pooled),
        (CACHE, ThreadMode::Dedicated),
    ] {
        let ran = ran.clone();
        initiator.add_task(FnTask::builder(id).thread_mode(mode).run(move || {
            ran.lock().unwrap().push(id);
            Ok(())
        }));
    }

    assert!(initiator.start()?.is_completed());
    thread::sleep(Duration::from_millis(100));
    assert!(ran.lock().unwrap().is_empty());
    Ok(())
}

#[test]
fn sent_flag_is_set_on_dispatch() -> TestResult {
    let task = Arc::new(
        FnTask::builder(CONFIG)
            .thread_mode(ThreadMode::Main)
            .run(|| Ok(())),
    );
    assert!(!task.is_sent());

    let mut initiator = Initiator::with_environment(primary_env());
    initiator.add_shared(task.clone());
    initiator.start()?;

    assert!(task.is_sent());
    Ok(())
}
