use std::env;
use std::process;
use std::time::Instant;

use env_logger::Env;
use lloyd::{Dataset, ExecutionMode, KMeans, KMeansConfig, SeedingPolicy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const GENERATED_POINTS: usize = 4000;
const GENERATED_DIMENSION: usize = 5;

fn main() {
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    let args: Vec<String> = env::args().collect();
    if args.len() > 3 {
        eprintln!("usage: {} [DATA_FILE] [K]", args[0]);
        process::exit(2);
    }

    if let Err(e) = run(args.get(1).map(String::as_str), args.get(2).map(String::as_str)) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(path: Option<&str>, k: Option<&str>) -> lloyd::Result<()> {
    let seed: u64 = rand::thread_rng().gen();
    log::info!("random seed {seed}");
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    let dataset = match path {
        Some(path) => Dataset::load(path)?,
        None => Dataset::random_uniform(
            GENERATED_POINTS,
            GENERATED_DIMENSION,
            0.0,
            100.0,
            &mut rng,
        )?,
    };
    let k = match k {
        Some(k) => k
            .parse::<usize>()
            .map_err(|e| lloyd::Error::Configuration(format!("invalid K '{k}': {e}")))?,
        None => 5,
    };
    let workers = std::thread::available_parallelism().map_or(1, |n| n.get());
    println!(
        "{} points, dimension {}, k = {k}, {workers} workers",
        dataset.len(),
        dataset.dimension()
    );

    let sequential = KMeansConfig::new(k, dataset.dimension())
        .with_max_iterations(200)
        .with_seeding(SeedingPolicy::Uniform);
    let parallel = KMeansConfig::new(k, dataset.dimension())
        .with_max_iterations(100)
        .with_seeding(SeedingPolicy::DistanceWeighted)
        .with_execution(ExecutionMode::Parallel { workers });

    for (name, config) in [("Sequential", sequential), ("Parallel", parallel)] {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let start = Instant::now();
        let result = KMeans::new(config).fit(&dataset, &mut rng)?;
        let elapsed = start.elapsed();

        println!(
            "K-means completed in {} iterations ({:?})",
            result.iterations, result.state
        );
        println!("{name} execution time: {:.6} seconds", elapsed.as_secs_f64());
    }
    Ok(())
}
