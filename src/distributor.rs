//! Round-robin work striping and the bounded fan-out/fan-in used for the two
//! batch download operations.
//!
//! Each worker owns its stripe and its own downstream resources (the job
//! closure builds a fresh HTTP session per invocation) and reports exactly
//! once, sending its full result list over a channel at completion. The
//! merged output carries no ordering guarantee across workers.

use std::sync::mpsc;
use tracing::{debug, info};

/// Split `items` into `workers` stripes: worker `i` receives the items at
/// indices `i, i + workers, i + 2*workers, ...`. Adjacent items (often
/// similar in cost) land on different workers.
pub fn stripes<T: Clone>(items: &[T], workers: usize) -> Vec<Vec<T>> {
    let workers = workers.max(1);
    (0..workers)
        .map(|i| items.iter().skip(i).step_by(workers).cloned().collect())
        .collect()
}

/// Below this many items, thread startup costs more than it saves.
fn worth_fanning_out(item_count: usize, workers: usize) -> bool {
    workers > 1 && item_count >= workers * workers
}

/// Run `job` over `items`, fanned out across `workers` stripes when the batch
/// is large enough, sequentially otherwise.
///
/// `job(worker_index, stripe)` returns the results it managed to collect;
/// item-level failures are the job's business to log and skip. The
/// coordinator blocks on exactly one result message per spawned worker and
/// merges in completion order.
pub fn run_batch<T, R, F>(items: &[T], workers: usize, job: F) -> Vec<R>
where
    T: Clone + Send,
    R: Send,
    F: Fn(usize, Vec<T>) -> Vec<R> + Sync,
{
    if !worth_fanning_out(items.len(), workers) {
        return job(0, items.to_vec());
    }

    let parts = stripes(items, workers);
    info!(items = items.len(), workers, "fanning out batch");

    std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<(usize, Vec<R>)>();
        let job = &job;
        for (idx, part) in parts.into_iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let out = job(idx, part);
                // The receiver outlives the scope's spawn loop, so this only
                // fails if the coordinator itself died.
                let _ = tx.send((idx, out));
            });
        }
        drop(tx);

        let mut merged = Vec::new();
        for _ in 0..workers {
            match rx.recv() {
                Ok((idx, out)) => {
                    debug!(worker = idx + 1, results = out.len(), "worker finished");
                    merged.extend(out);
                }
                Err(_) => break,
            }
        }
        merged
    })
}
