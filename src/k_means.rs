//! Lloyd's k-means clustering.
//!
//! The loop seeds `k` centroids, then alternates an assignment pass (every
//! point moves to its nearest centroid) with an update pass (every non-empty
//! centroid moves to the mean of its points) until an assignment pass changes
//! nothing or the iteration cap is hit.
//!
//! Seeding ([`SeedingPolicy`]) and execution ([`ExecutionMode`]) are chosen
//! independently. Only the assignment pass runs on the worker pool, so for the
//! same seed both execution modes produce identical labels and centroids.
//!
//! # Example
//!
//! ```
//! use lloyd::k_means::{Dataset, ExecutionMode, KMeans, KMeansConfig, LoopState, SeedingPolicy};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let dataset = Dataset::from_rows(&[
//!     vec![1.0, 2.0],
//!     vec![1.5, 1.8],
//!     vec![5.0, 8.0],
//!     vec![8.0, 8.0],
//! ])
//! .unwrap();
//!
//! let config = KMeansConfig::new(2, 2)
//!     .with_seeding(SeedingPolicy::DistanceWeighted)
//!     .with_execution(ExecutionMode::Parallel { workers: 2 });
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let result = KMeans::new(config).fit(&dataset, &mut rng).unwrap();
//!
//! assert_eq!(result.labels.len(), 4);
//! assert_eq!(result.state, LoopState::Converged);
//! ```

pub mod assign;
pub mod dataset;
pub mod distance;
pub mod seed;
pub mod update;

#[cfg(test)]
mod tests;

use log::{debug, info};
use rand::Rng;

pub use assign::{Executor, UNASSIGNED};
pub use dataset::{Centroids, Dataset};
pub use seed::SeedingPolicy;

use crate::error::{Error, Result};

/// Where the assignment pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Everything on the calling thread.
    #[default]
    Sequential,
    /// Assignment scan split across a pool of exactly `workers` threads.
    Parallel { workers: usize },
}

/// Configuration options for k-means clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansConfig {
    /// Number of clusters to find.
    pub k: usize,
    /// Dimension every point must have.
    pub dimension: usize,
    /// Maximum number of assignment passes.
    pub max_iterations: usize,
    pub seeding: SeedingPolicy,
    pub execution: ExecutionMode,
}

impl KMeansConfig {
    /// Create a new config with 100 iterations, uniform seeding and
    /// sequential execution.
    pub fn new(k: usize, dimension: usize) -> Self {
        Self {
            k,
            dimension,
            max_iterations: 100,
            seeding: SeedingPolicy::Uniform,
            execution: ExecutionMode::Sequential,
        }
    }

    /// Sequential baseline: 10 clusters of 5-dimensional points, at most 200
    /// iterations, uniform seeding.
    pub fn sequential_baseline() -> Self {
        Self::new(10, 5).with_max_iterations(200)
    }

    /// Parallel variant: 5 clusters of 10-dimensional points, at most 100
    /// iterations, distance-weighted seeding.
    pub fn parallel_baseline(workers: usize) -> Self {
        Self::new(5, 10)
            .with_max_iterations(100)
            .with_seeding(SeedingPolicy::DistanceWeighted)
            .with_execution(ExecutionMode::Parallel { workers })
    }

    /// Customize the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_seeding(mut self, seeding: SeedingPolicy) -> Self {
        self.seeding = seeding;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    /// Checks the configuration against `dataset` before any work starts.
    ///
    /// # Errors
    /// * `Configuration` for a zero `k`, dimension, iteration cap or worker
    ///   count, for `k` larger than the dataset, or for a dataset of another
    ///   dimension
    pub fn validate(&self, dataset: &Dataset) -> Result<()> {
        if self.k == 0 {
            return Err(Error::configuration("k must be greater than zero"));
        }
        if self.dimension == 0 {
            return Err(Error::configuration("dimension must be greater than zero"));
        }
        if self.max_iterations == 0 {
            return Err(Error::configuration(
                "max_iterations must be greater than zero",
            ));
        }
        if let ExecutionMode::Parallel { workers: 0 } = self.execution {
            return Err(Error::configuration(
                "parallel mode needs at least one worker",
            ));
        }
        if dataset.is_empty() {
            return Err(Error::configuration("dataset is empty"));
        }
        if self.k > dataset.len() {
            return Err(Error::configuration(format!(
                "cannot create {} clusters from {} points",
                self.k,
                dataset.len()
            )));
        }
        if dataset.dimension() != self.dimension {
            return Err(Error::configuration(format!(
                "configured for dimension {} but the dataset has dimension {}",
                self.dimension,
                dataset.dimension()
            )));
        }
        Ok(())
    }
}

/// States of the clustering loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Seeding,
    Iterating,
    /// An assignment pass changed no label.
    Converged,
    /// `max_iterations` passes ran and the last one still changed a label.
    IterationCapReached,
}

/// Outcome of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Cluster index in `[0, k)` for every point, in dataset order.
    pub labels: Vec<usize>,
    pub centroids: Centroids,
    /// Assignment passes executed, counting the final pass that changed nothing.
    pub iterations: usize,
    /// Either `Converged` or `IterationCapReached`.
    pub state: LoopState,
}

/// A configured k-means runner.
#[derive(Debug, Clone)]
pub struct KMeans {
    config: KMeansConfig,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Seeds centroids with the configured policy and runs the loop.
    pub fn fit<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> Result<KMeansResult> {
        self.config.validate(dataset)?;
        let executor = self.executor()?;

        debug!(
            "{:?}: seeding {} centroids with {:?}",
            LoopState::Seeding,
            self.config.k,
            self.config.seeding
        );
        let centroids = self.config.seeding.seed(dataset, self.config.k, rng)?;
        self.iterate(dataset, centroids, &executor)
    }

    /// Runs the loop from caller-provided initial centroids, skipping seeding.
    ///
    /// # Errors
    /// * `Configuration` if the configuration is invalid for `dataset` or
    ///   `initial` does not hold exactly `k` centroids
    /// * `DimensionMismatch` if `initial` has another dimension than `dataset`
    pub fn fit_from(&self, dataset: &Dataset, initial: Centroids) -> Result<KMeansResult> {
        self.config.validate(dataset)?;
        if initial.k() != self.config.k {
            return Err(Error::configuration(format!(
                "expected {} initial centroids, got {}",
                self.config.k,
                initial.k()
            )));
        }
        if initial.dimension() != dataset.dimension() {
            return Err(Error::DimensionMismatch {
                expected: dataset.dimension(),
                found: initial.dimension(),
            });
        }
        let executor = self.executor()?;
        self.iterate(dataset, initial, &executor)
    }

    fn executor(&self) -> Result<Executor> {
        match self.config.execution {
            ExecutionMode::Sequential => Ok(Executor::Sequential),
            ExecutionMode::Parallel { workers } => Executor::parallel(workers),
        }
    }

    fn iterate(
        &self,
        dataset: &Dataset,
        mut centroids: Centroids,
        executor: &Executor,
    ) -> Result<KMeansResult> {
        let mut labels = vec![UNASSIGNED; dataset.len()];
        let mut iterations = 0;
        let mut state = LoopState::Iterating;

        while state == LoopState::Iterating {
            let changed = executor.assign(dataset, &centroids, &mut labels)?;
            centroids = update::update_centroids(dataset, &labels, &centroids)?;
            iterations += 1;
            debug!("iteration {iterations}: labels changed = {changed}");

            if !changed {
                state = LoopState::Converged;
            } else if iterations >= self.config.max_iterations {
                state = LoopState::IterationCapReached;
            }
        }

        info!(
            "k-means finished after {iterations} iterations ({state:?}, {} workers)",
            executor.workers()
        );
        Ok(KMeansResult {
            labels,
            centroids,
            iterations,
            state,
        })
    }
}

/// Runs k-means on one vector per point.
///
/// Shorthand for building a [`Dataset`] and calling [`KMeans::fit`].
pub fn kmeans<R: Rng + ?Sized>(
    data: &[Vec<f64>],
    config: &KMeansConfig,
    rng: &mut R,
) -> Result<KMeansResult> {
    let dataset = Dataset::from_rows(data)?;
    KMeans::new(config.clone()).fit(&dataset, rng)
}
