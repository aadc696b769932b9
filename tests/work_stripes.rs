use redharvest::{run_batch, stripes};
use std::collections::BTreeSet;
use std::sync::Mutex;

#[test]
fn stripes_are_disjoint_and_recover_the_input() {
    let items: Vec<u32> = (0..23).collect();
    for workers in 1..=6 {
        let parts = stripes(&items, workers);
        assert_eq!(parts.len(), workers);

        // Disjoint, and the union equals the input as a multiset.
        let mut all: Vec<u32> = parts.iter().flatten().copied().collect();
        assert_eq!(all.len(), items.len());
        all.sort_unstable();
        assert_eq!(all, items);

        // Stable re-interleaving reconstructs the original order.
        let mut rebuilt = Vec::new();
        for round in 0..items.len() {
            let part = &parts[round % workers];
            if let Some(v) = part.get(round / workers) {
                rebuilt.push(*v);
            }
        }
        assert_eq!(rebuilt, items);
    }
}

#[test]
fn stripe_lengths_differ_by_at_most_one() {
    for len in 0..40 {
        let items: Vec<usize> = (0..len).collect();
        for workers in 1..=7 {
            let parts = stripes(&items, workers);
            let min = parts.iter().map(Vec::len).min().unwrap();
            let max = parts.iter().map(Vec::len).max().unwrap();
            assert!(max - min <= 1, "len={len} workers={workers}");
        }
    }
}

#[test]
fn stripe_assignment_is_round_robin() {
    let items: Vec<u32> = (0..10).collect();
    let parts = stripes(&items, 3);
    assert_eq!(parts[0], vec![0, 3, 6, 9]);
    assert_eq!(parts[1], vec![1, 4, 7]);
    assert_eq!(parts[2], vec![2, 5, 8]);
}

/// Below workers^2 items the batch must stay on the sequential path: a
/// single job call with worker index 0 and the whole input.
#[test]
fn small_batches_run_sequentially() {
    let items: Vec<u32> = (0..8).collect(); // 8 < 3*3
    let calls = Mutex::new(Vec::new());
    let out = run_batch(&items, 3, |idx, stripe| {
        calls.lock().unwrap().push((idx, stripe.len()));
        stripe
    });

    assert_eq!(out, items);
    assert_eq!(*calls.lock().unwrap(), vec![(0, 8)]);
}

#[test]
fn single_worker_never_fans_out() {
    let items: Vec<u32> = (0..100).collect();
    let calls = Mutex::new(0usize);
    let out = run_batch(&items, 1, |_, stripe| {
        *calls.lock().unwrap() += 1;
        stripe
    });
    assert_eq!(out.len(), 100);
    assert_eq!(*calls.lock().unwrap(), 1);
}

/// At or past the threshold every worker runs its own stripe and the merge
/// loses nothing, regardless of completion order.
#[test]
fn fan_out_merges_all_worker_results() {
    let items: Vec<u32> = (0..25).collect(); // 25 >= 5*5
    let seen_workers = Mutex::new(BTreeSet::new());
    let out = run_batch(&items, 5, |idx, stripe| {
        seen_workers.lock().unwrap().insert(idx);
        stripe
    });

    let mut merged = out;
    merged.sort_unstable();
    assert_eq!(merged, items);
    assert_eq!(seen_workers.lock().unwrap().len(), 5);
}

/// A worker that fails on single items still reports the rest; the batch
/// never aborts.
#[test]
fn item_failures_reduce_counts_without_aborting() {
    let items: Vec<u32> = (0..36).collect();
    let out = run_batch(&items, 6, |_, stripe| {
        stripe.into_iter().filter(|v| v % 2 == 0).collect::<Vec<_>>()
    });

    let mut merged = out;
    merged.sort_unstable();
    let expected: Vec<u32> = (0..36).filter(|v| v % 2 == 0).collect();
    assert_eq!(merged, expected);
}

#[test]
fn empty_input_yields_empty_output() {
    let items: Vec<u32> = Vec::new();
    let out = run_batch(&items, 4, |_, stripe| stripe);
    assert!(out.is_empty());
}
