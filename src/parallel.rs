//! Column-striped data parallelism
//!
//! Work over the x dimension is dealt round-robin to a fixed number of
//! stripes (stripe `i` gets items `i, i + n, i + 2n, ...`) and the stripes
//! run on the rayon pool. Each stripe owns its items outright, so columns
//! handed out as `&mut` slices never alias.

use rayon::prelude::*;

/// Number of stripes a parallel region is split into.
pub fn worker_count() -> usize {
    rayon::current_num_threads().max(4)
}

/// Deal items round-robin into `n` stripes.
pub fn stripe<T>(items: impl IntoIterator<Item = T>, n: usize) -> Vec<Vec<T>> {
    let n = n.max(1);
    let mut stripes: Vec<Vec<T>> = (0..n).map(|_| Vec::new()).collect();
    for (i, item) in items.into_iter().enumerate() {
        stripes[i % n].push(item);
    }
    stripes
}

/// Run `f` on every item, striped across the pool.
pub fn for_each_striped<T, F>(items: impl IntoIterator<Item = T>, f: F)
where
    T: Send,
    F: Fn(T) + Sync,
{
    stripe(items, worker_count())
        .into_par_iter()
        .for_each(|stripe| stripe.into_iter().for_each(&f));
}

/// Evaluate `f(x)` for every `x` in `0..count` across the stripes and
/// concatenate the results in ascending `x` order.
pub fn collect_striped<R, F>(count: usize, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> Vec<R> + Sync,
{
    let mut per_index: Vec<(usize, Vec<R>)> = stripe(0..count, worker_count())
        .into_par_iter()
        .flat_map_iter(|stripe| stripe.into_iter().map(|x| (x, f(x))).collect::<Vec<_>>())
        .collect();
    per_index.sort_unstable_by_key(|(x, _)| *x);
    per_index.into_iter().flat_map(|(_, results)| results).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_stripe_round_robin() {
        let stripes = stripe(0..10, 4);
        assert_eq!(stripes[0], vec![0, 4, 8]);
        assert_eq!(stripes[1], vec![1, 5, 9]);
        assert_eq!(stripes[3], vec![3, 7]);
    }

    #[test]
    fn test_for_each_visits_everything_once() {
        let counter = AtomicUsize::new(0);
        for_each_striped(0..1000, |i| {
            counter.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(counter.load(Ordering::Relaxed), 999 * 1000 / 2);
    }

    #[test]
    fn test_collect_preserves_column_order() {
        let out = collect_striped(50, |x| vec![x, x]);
        assert_eq!(out.len(), 100);
        assert!(out.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_mutable_columns_do_not_alias() {
        let height = 7;
        let mut data = vec![0usize; 13 * height];
        for_each_striped(data.chunks_mut(height).enumerate(), |(x, column)| {
            for cell in column.iter_mut() {
                *cell = x;
            }
        });
        for (i, cell) in data.iter().enumerate() {
            assert_eq!(*cell, i / height);
        }
    }
}
