use log::debug;
use ndarray::Array2;

use super::dataset::{Centroids, Dataset};
use crate::error::{Error, Result};

/// Recomputes every centroid as the mean of the points labelled with it.
///
/// A cluster with no points keeps its previous position bit for bit. Labels
/// outside `[0, k)`, such as `UNASSIGNED`, are not counted anywhere.
///
/// # Errors
/// * `DimensionMismatch` if `labels` is not one per point or `previous` has a
///   different dimension than the dataset
pub fn update_centroids(
    dataset: &Dataset,
    labels: &[usize],
    previous: &Centroids,
) -> Result<Centroids> {
    if previous.dimension() != dataset.dimension() {
        return Err(Error::DimensionMismatch {
            expected: dataset.dimension(),
            found: previous.dimension(),
        });
    }
    if labels.len() != dataset.len() {
        return Err(Error::DimensionMismatch {
            expected: dataset.len(),
            found: labels.len(),
        });
    }

    let k = previous.k();
    let mut sums = Array2::<f64>::zeros((k, dataset.dimension()));
    let mut counts = vec![0_usize; k];
    for (i, &cluster) in labels.iter().enumerate() {
        if cluster >= k {
            continue;
        }
        let mut sum = sums.row_mut(cluster);
        sum += &dataset.point(i);
        counts[cluster] += 1;
    }

    let mut next = previous.positions().to_owned();
    for (cluster, &count) in counts.iter().enumerate() {
        if count == 0 {
            debug!("cluster {cluster} is empty, keeping its centroid");
            continue;
        }
        let mut mean = sums.row_mut(cluster);
        mean /= count as f64;
        next.row_mut(cluster).assign(&mean);
    }
    Ok(Centroids::from_array(next))
}
