pub mod error;
pub mod k_means;

pub use error::{Error, Result};
pub use k_means::{
    kmeans, Centroids, Dataset, ExecutionMode, KMeans, KMeansConfig, KMeansResult, LoopState,
    SeedingPolicy,
};
