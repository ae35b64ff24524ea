//! Nearest-centroid assignment, sequential or on a fixed-size worker pool.

use ndarray::ArrayView1;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::dataset::{Centroids, Dataset};
use super::distance::euclidean_distance;
use crate::error::{Error, Result};

/// Label of a point that has not been through an assignment pass yet.
pub const UNASSIGNED: usize = usize::MAX;

/// Index of the centroid closest to `point`. Ties go to the lowest index.
pub fn nearest_centroid(point: ArrayView1<'_, f64>, centroids: &Centroids) -> usize {
    let mut best_cluster = 0;
    let mut best_dist = f64::INFINITY;
    for j in 0..centroids.k() {
        let dist = euclidean_distance(point, centroids.centroid(j));
        if dist < best_dist {
            best_dist = dist;
            best_cluster = j;
        }
    }
    best_cluster
}

/// Relabels every point with its nearest centroid on the calling thread.
///
/// Returns `true` if at least one label changed.
pub fn assign_sequential(
    dataset: &Dataset,
    centroids: &Centroids,
    labels: &mut [usize],
) -> Result<bool> {
    check_shapes(dataset, centroids, labels)?;
    Ok(assign_range(dataset, centroids, 0, labels))
}

/// Parallel form of [`assign_sequential`].
///
/// The label buffer is cut into one contiguous range per worker; a worker only
/// writes its own range and reports a local change flag, and the flags are
/// OR-reduced once every range is done.
pub fn assign_parallel(
    dataset: &Dataset,
    centroids: &Centroids,
    labels: &mut [usize],
    pool: &ThreadPool,
) -> Result<bool> {
    check_shapes(dataset, centroids, labels)?;
    let workers = pool.current_num_threads().max(1);
    let chunk = labels.len().div_ceil(workers).max(1);

    let changed = pool.install(|| {
        labels
            .par_chunks_mut(chunk)
            .enumerate()
            .map(|(w, range)| assign_range(dataset, centroids, w * chunk, range))
            .reduce(|| false, |a, b| a || b)
    });
    Ok(changed)
}

fn assign_range(
    dataset: &Dataset,
    centroids: &Centroids,
    offset: usize,
    labels: &mut [usize],
) -> bool {
    let mut changed = false;
    for (i, label) in labels.iter_mut().enumerate() {
        let best = nearest_centroid(dataset.point(offset + i), centroids);
        if *label != best {
            *label = best;
            changed = true;
        }
    }
    changed
}

fn check_shapes(dataset: &Dataset, centroids: &Centroids, labels: &[usize]) -> Result<()> {
    if centroids.dimension() != dataset.dimension() {
        return Err(Error::DimensionMismatch {
            expected: dataset.dimension(),
            found: centroids.dimension(),
        });
    }
    if labels.len() != dataset.len() {
        return Err(Error::DimensionMismatch {
            expected: dataset.len(),
            found: labels.len(),
        });
    }
    Ok(())
}

/// Where the assignment scan runs.
#[derive(Debug)]
pub enum Executor {
    Sequential,
    Parallel(ThreadPool),
}

impl Executor {
    /// Builds a pool of exactly `workers` threads.
    pub fn parallel(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::configuration("parallel mode needs at least one worker"));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("lloyd-assign-{i}"))
            .build()?;
        Ok(Executor::Parallel(pool))
    }

    pub fn assign(
        &self,
        dataset: &Dataset,
        centroids: &Centroids,
        labels: &mut [usize],
    ) -> Result<bool> {
        match self {
            Executor::Sequential => assign_sequential(dataset, centroids, labels),
            Executor::Parallel(pool) => assign_parallel(dataset, centroids, labels, pool),
        }
    }

    pub fn workers(&self) -> usize {
        match self {
            Executor::Sequential => 1,
            Executor::Parallel(pool) => pool.current_num_threads(),
        }
    }
}
