//! Initial centroid selection.

use log::{trace, warn};
use rand::Rng;

use super::dataset::{Centroids, Dataset};
use super::distance::euclidean_distance;
use crate::error::{Error, Result};

/// How the initial centroids are picked from the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedingPolicy {
    /// `k` independent uniform draws with replacement. Duplicates are kept.
    #[default]
    Uniform,
    /// First pick uniform; every later pick is weighted by the distance to the
    /// nearest centroid chosen so far.
    DistanceWeighted,
}

impl SeedingPolicy {
    /// Chooses `k` source rows of `dataset`.
    ///
    /// # Errors
    /// * `Configuration` if `k` is zero or larger than the dataset
    pub fn choose_indices<R: Rng + ?Sized>(
        &self,
        dataset: &Dataset,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        if k == 0 || k > dataset.len() {
            return Err(Error::configuration(format!(
                "cannot seed {k} centroids from {} points",
                dataset.len()
            )));
        }
        let indices = match self {
            SeedingPolicy::Uniform => uniform_indices(dataset.len(), k, rng),
            SeedingPolicy::DistanceWeighted => weighted_indices(dataset, k, rng),
        };
        trace!("seeded {:?} from rows {:?}", self, indices);
        Ok(indices)
    }

    /// Chooses `k` rows and copies their positions into a fresh centroid set.
    pub fn seed<R: Rng + ?Sized>(
        &self,
        dataset: &Dataset,
        k: usize,
        rng: &mut R,
    ) -> Result<Centroids> {
        let indices = self.choose_indices(dataset, k, rng)?;
        Ok(Centroids::from_indices(dataset, &indices))
    }
}

fn uniform_indices<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Vec<usize> {
    (0..k).map(|_| rng.gen_range(0..n)).collect()
}

fn weighted_indices<R: Rng + ?Sized>(dataset: &Dataset, k: usize, rng: &mut R) -> Vec<usize> {
    let n = dataset.len();
    let mut chosen = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..n));

    // Distance from every point to its nearest chosen centroid. Only the newest
    // centroid can lower it, so each round folds in one centroid.
    let mut nearest = vec![f64::INFINITY; n];

    while chosen.len() < k {
        let newest = dataset.point(chosen[chosen.len() - 1]);
        for (i, weight) in nearest.iter_mut().enumerate() {
            let dist = euclidean_distance(dataset.point(i), newest);
            if dist < *weight {
                *weight = dist;
            }
        }

        let total: f64 = nearest.iter().sum();
        let next = if total > 0.0 && total.is_finite() {
            let target = rng.gen::<f64>() * total;
            pick_weighted(&nearest, target)
        } else {
            None
        };

        let next = match next {
            Some(index) => index,
            None => {
                warn!(
                    "no remaining distance weight after {} centroids, taking first unchosen point",
                    chosen.len()
                );
                // k <= n guarantees an unchosen row exists
                (0..n).find(|i| !chosen.contains(i)).unwrap_or(0)
            }
        };
        chosen.push(next);
    }
    chosen
}

/// First positive-weight index whose running total reaches `target`.
/// Falls back to the last positive-weight index when rounding leaves the
/// running total just short of the target.
fn pick_weighted(weights: &[f64], target: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(i);
        if cumulative >= target {
            return Some(i);
        }
    }
    last_positive
}
