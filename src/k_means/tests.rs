use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::error::Error;
use crate::k_means::{
    kmeans, Centroids, Dataset, ExecutionMode, KMeans, KMeansConfig, LoopState, SeedingPolicy,
};

fn line(values: &[f64]) -> Dataset {
    let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
    Dataset::from_rows(&rows).unwrap()
}

fn blobs(seed: u64) -> Dataset {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    Dataset::random_uniform(4000, 5, 0.0, 100.0, &mut rng).unwrap()
}

#[test]
fn test_two_groups_from_fixed_centroids() {
    let dataset = line(&[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    let initial = Centroids::from_rows(&[vec![0.0], vec![10.0]]).unwrap();
    let result = KMeans::new(KMeansConfig::new(2, 1))
        .fit_from(&dataset, initial)
        .unwrap();

    assert_eq!(result.labels, vec![0, 0, 0, 1, 1, 1]);
    assert_eq!(result.centroids.to_vecs(), vec![vec![1.0], vec![11.0]]);
    // one pass that moves everything, one pass that confirms
    assert_eq!(result.iterations, 2);
    assert_eq!(result.state, LoopState::Converged);
}

#[test]
fn test_two_groups_parallel() {
    let dataset = line(&[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    let initial = Centroids::from_rows(&[vec![0.0], vec![10.0]]).unwrap();
    let config =
        KMeansConfig::new(2, 1).with_execution(ExecutionMode::Parallel { workers: 4 });
    let result = KMeans::new(config).fit_from(&dataset, initial).unwrap();

    assert_eq!(result.labels, vec![0, 0, 0, 1, 1, 1]);
    assert_eq!(result.iterations, 2);
}

#[test]
fn test_iteration_cap() {
    let dataset = line(&[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    let initial = Centroids::from_rows(&[vec![0.0], vec![10.0]]).unwrap();
    let config = KMeansConfig::new(2, 1).with_max_iterations(1);
    let result = KMeans::new(config).fit_from(&dataset, initial).unwrap();

    assert_eq!(result.iterations, 1);
    assert_eq!(result.state, LoopState::IterationCapReached);
    // the single pass still completed its update
    assert_eq!(result.centroids.to_vecs(), vec![vec![1.0], vec![11.0]]);
}

#[test]
fn test_empty_cluster_survives_the_loop() {
    let dataset = line(&[0.0, 1.0, 2.0]);
    let initial = Centroids::from_rows(&[vec![1.0], vec![500.25]]).unwrap();
    let result = KMeans::new(KMeansConfig::new(2, 1))
        .fit_from(&dataset, initial)
        .unwrap();

    assert_eq!(result.labels, vec![0, 0, 0]);
    assert_eq!(result.centroids.centroid(1)[0].to_bits(), 500.25_f64.to_bits());
    assert_eq!(result.state, LoopState::Converged);
}

#[test]
fn test_k_larger_than_n() {
    let dataset = line(&[0.0, 1.0]);
    let mut rng = ChaCha20Rng::seed_from_u64(0);
    let result = KMeans::new(KMeansConfig::new(3, 1)).fit(&dataset, &mut rng);
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_invalid_configurations() {
    let dataset = line(&[0.0, 1.0, 2.0]);
    let cases = [
        KMeansConfig::new(0, 1),
        KMeansConfig::new(2, 0),
        KMeansConfig::new(2, 1).with_max_iterations(0),
        KMeansConfig::new(2, 1).with_execution(ExecutionMode::Parallel { workers: 0 }),
        KMeansConfig::new(2, 3),
    ];
    for config in cases {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert!(
            matches!(
                KMeans::new(config.clone()).fit(&dataset, &mut rng),
                Err(Error::Configuration(_))
            ),
            "{config:?} should be rejected"
        );
    }
}

#[test]
fn test_fit_from_checks_initial_centroids() {
    let dataset = line(&[0.0, 1.0, 2.0]);
    let runner = KMeans::new(KMeansConfig::new(2, 1));

    let too_few = Centroids::from_rows(&[vec![0.0]]).unwrap();
    assert!(matches!(
        runner.fit_from(&dataset, too_few),
        Err(Error::Configuration(_))
    ));

    let wrong_dim = Centroids::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
    assert!(matches!(
        runner.fit_from(&dataset, wrong_dim),
        Err(Error::DimensionMismatch {
            expected: 1,
            found: 2
        })
    ));
}

#[test]
fn test_labels_and_iterations_in_bounds() {
    let dataset = blobs(1);
    for seeding in [SeedingPolicy::Uniform, SeedingPolicy::DistanceWeighted] {
        for seed in 0..3 {
            let config = KMeansConfig::new(10, 5)
                .with_max_iterations(50)
                .with_seeding(seeding);
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let result = KMeans::new(config).fit(&dataset, &mut rng).unwrap();

            assert_eq!(result.labels.len(), dataset.len());
            assert!(result.labels.iter().all(|&l| l < 10));
            assert!(result.iterations >= 1 && result.iterations <= 50);
            assert_eq!(result.centroids.k(), 10);
            match result.state {
                LoopState::Converged | LoopState::IterationCapReached => {}
                other => panic!("non-terminal state {other:?}"),
            }
        }
    }
}

#[test]
fn test_sequential_and_parallel_agree() {
    let dataset = blobs(2);
    for seeding in [SeedingPolicy::Uniform, SeedingPolicy::DistanceWeighted] {
        let base = KMeansConfig::new(8, 5)
            .with_max_iterations(200)
            .with_seeding(seeding);

        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let sequential = KMeans::new(base.clone()).fit(&dataset, &mut rng).unwrap();

        for workers in [2, 5] {
            let config = base
                .clone()
                .with_execution(ExecutionMode::Parallel { workers });
            let mut rng = ChaCha20Rng::seed_from_u64(99);
            let parallel = KMeans::new(config).fit(&dataset, &mut rng).unwrap();
            assert_eq!(parallel, sequential);
        }
    }
}

#[test]
fn test_converged_result_is_a_fixed_point() {
    let dataset = blobs(3);
    let config = KMeansConfig::new(6, 5).with_max_iterations(5000);
    let mut rng = ChaCha20Rng::seed_from_u64(4);
    let result = KMeans::new(config.clone()).fit(&dataset, &mut rng).unwrap();
    assert_eq!(result.state, LoopState::Converged);

    let again = KMeans::new(config)
        .fit_from(&dataset, result.centroids.clone())
        .unwrap();
    assert_eq!(again.labels, result.labels);
    assert_eq!(again.centroids, result.centroids);
}

#[test]
fn test_baseline_presets() {
    let sequential = KMeansConfig::sequential_baseline();
    assert_eq!((sequential.k, sequential.dimension), (10, 5));
    assert_eq!(sequential.max_iterations, 200);
    assert_eq!(sequential.seeding, SeedingPolicy::Uniform);
    assert_eq!(sequential.execution, ExecutionMode::Sequential);

    let parallel = KMeansConfig::parallel_baseline(4);
    assert_eq!((parallel.k, parallel.dimension), (5, 10));
    assert_eq!(parallel.max_iterations, 100);
    assert_eq!(parallel.seeding, SeedingPolicy::DistanceWeighted);
    assert_eq!(parallel.execution, ExecutionMode::Parallel { workers: 4 });
}

#[test]
fn test_kmeans_from_rows() {
    let data = vec![
        vec![1.0, 2.0],
        vec![1.5, 1.8],
        vec![5.0, 8.0],
        vec![8.0, 8.0],
        vec![1.0, 0.6],
        vec![9.0, 11.0],
    ];
    let config = KMeansConfig::new(2, 2).with_seeding(SeedingPolicy::DistanceWeighted);
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let result = kmeans(&data, &config, &mut rng).unwrap();

    assert_eq!(result.labels.len(), data.len());
    assert!(result.labels.iter().all(|&l| l < 2));
    assert_eq!(result.centroids.k(), 2);
    for c in result.centroids.to_vecs() {
        assert_eq!(c.len(), 2);
    }
}

#[test]
fn test_kmeans_ragged_rows() {
    let data = vec![vec![1.0, 2.0], vec![1.5]];
    let mut rng = ChaCha20Rng::seed_from_u64(0);
    assert!(matches!(
        kmeans(&data, &KMeansConfig::new(1, 2), &mut rng),
        Err(Error::DimensionMismatch { .. })
    ));
}
