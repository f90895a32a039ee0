//! Unit tests for the background executor and its export offload.

use datagrid::ExportFormat;
use datagrid::background::{BackgroundExecutor, TaskResult};
use datagrid::export::{ExportJob, serialize_csv};
use datagrid::services::TaskOffload;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Poll `process_results` until `condition` holds or `timeout` passes.
fn wait_for<F>(executor: &BackgroundExecutor, mut condition: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        executor.process_results();
        if condition() {
            return true;
        }
        std::thread::yield_now();
    }
    executor.process_results();
    condition()
}

#[test]
fn test_idle_executor() {
    let executor = BackgroundExecutor::new(2);
    assert!(!executor.has_pending());
    assert_eq!(executor.process_results(), 0);
}

#[test]
fn test_callback_receives_result() {
    let executor = BackgroundExecutor::new(1);
    let received = Arc::new(Mutex::new(None));
    let received_clone = Arc::clone(&received);

    executor.spawn(
        "sum",
        || Ok((1..=10).sum::<u32>()),
        move |result: TaskResult<u32>| {
            *received_clone.lock() = Some(result);
        },
    );

    assert!(wait_for(&executor, || received.lock().is_some(), Duration::from_secs(2)));
    assert_eq!(received.lock().take(), Some(Ok(55)));
}

#[test]
fn test_error_result_reaches_callback() {
    let executor = BackgroundExecutor::new(1);
    let got_error = Arc::new(AtomicBool::new(false));
    let got_error_clone = Arc::clone(&got_error);

    executor.spawn(
        "failing",
        || Err::<(), _>("disk full".to_string()),
        move |result: TaskResult<()>| {
            assert_eq!(result, Err("disk full".to_string()));
            got_error_clone.store(true, Ordering::SeqCst);
        },
    );

    assert!(wait_for(
        &executor,
        || got_error.load(Ordering::SeqCst),
        Duration::from_secs(2)
    ));
}

#[test]
fn test_many_tasks_all_complete() {
    let executor = BackgroundExecutor::new(2);
    let done = Arc::new(AtomicUsize::new(0));

    for i in 0..8 {
        let done = Arc::clone(&done);
        executor.spawn(
            &format!("task_{}", i),
            move || Ok(i * 2),
            move |result: TaskResult<usize>| {
                if result == Ok(i * 2) {
                    done.fetch_add(1, Ordering::SeqCst);
                }
            },
        );
    }

    assert!(wait_for(
        &executor,
        || done.load(Ordering::SeqCst) == 8,
        Duration::from_secs(2)
    ));
    assert!(!executor.has_pending());
}

#[test]
fn test_offloaded_job_matches_inline_serialization() {
    let executor = BackgroundExecutor::new(1);
    let headers = vec!["Name".to_string(), "Quote".to_string()];
    let rows = vec![
        vec!["Smith, John".to_string(), "said \"hi\"".to_string()],
        vec!["Ann".to_string(), "line\nbreak".to_string()],
    ];
    let expected = serialize_csv(&headers, &rows, ',');
    let job = ExportJob::new(ExportFormat::Csv, "t.csv".into(), headers, rows, ',');

    let output = Arc::new(Mutex::new(None));
    let output_clone = Arc::clone(&output);
    executor.submit(
        job,
        Box::new(move |result: Result<String, String>| {
            *output_clone.lock() = Some(result);
        }),
    );

    assert!(wait_for(&executor, || output.lock().is_some(), Duration::from_secs(2)));
    assert_eq!(output.lock().take(), Some(Ok(expected)));
}
