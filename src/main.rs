use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use kmeans_pp::elbow::{self, ELBOW_MAX_K};
use kmeans_pp::input::load_joined;
use kmeans_pp::types::{Distance, IterationCount, PointCount};
use kmeans_pp::{compute_kmeans_pp_clustering, ClusteringProblem, OptionalParameters, DEFAULT_MAX_ITER, DEFAULT_SEED};

/// Joins two keyed CSV tables on their first column and clusters the joined rows by k-means++
/// seeding and Lloyd refinement.
///
/// Prints the indices of the chosen seeds on one line, followed by one line per final centroid
/// with 4 decimal places.
#[derive(Parser, Debug)]
#[command(name = "kmeans_pp_bin")]
#[command(version)]
#[command(about = "k-means++ clustering of two joined CSV tables")]
struct Cli {
    /// Number of clusters (0 prints nothing)
    k: PointCount,

    /// [MAX_ITER] FILE_1 FILE_2
    #[arg(num_args = 2..=3, required = true, value_name = "ARGS")]
    inputs: Vec<String>,

    /// Seed of the k-means++ draws
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Number of worker threads (default: number of cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Minimal summed squared centroid shift that still counts as a change
    #[arg(long)]
    tolerance: Option<Distance>,

    /// Also write the inertia for k = 1..=10 as `k,inertia` lines to this file
    #[arg(long, value_name = "FILE")]
    elbow: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Splits the positional arguments into max_iter and the two input files.
    fn max_iter_and_files(&self) -> anyhow::Result<(IterationCount, &str, &str)> {
        match self.inputs.as_slice() {
            [file_1, file_2] => Ok((DEFAULT_MAX_ITER, file_1.as_str(), file_2.as_str())),
            [max_iter, file_1, file_2] => {
                let max_iter: IterationCount = max_iter
                    .parse()
                    .with_context(|| format!("Invalid maximum iteration count '{}'", max_iter))?;
                Ok((max_iter, file_1.as_str(), file_2.as_str()))
            }
            _ => bail!("expected [MAX_ITER] FILE_1 FILE_2"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Some(output) = run(&cli)? {
        println!("{}", output);
    }
    Ok(())
}

/// Loads and joins the input files, clusters them and returns the text for stdout: the seed
/// indices on the first line, then one line per centroid. Returns None for k = 0.
fn run(cli: &Cli) -> anyhow::Result<Option<String>> {
    let (max_iter, file_1, file_2) = cli.max_iter_and_files()?;
    // input errors are reported even for k = 0
    let space = load_joined(file_1, file_2).with_context(|| format!("Cannot load '{}' and '{}'", file_1, file_2))?;
    if cli.k == 0 {
        tracing::info!("k = 0: nothing to do");
        return Ok(None);
    }

    let prob = ClusteringProblem { k: cli.k, max_iter };
    let optional = OptionalParameters {
        seed: Some(cli.seed),
        thread_count: cli.threads,
        tolerance: cli.tolerance,
    };
    let (clustering, _) = compute_kmeans_pp_clustering(&space, &prob, Some(optional.clone()))?;

    if let Some(path) = &cli.elbow {
        let curve = elbow::elbow_curve(&space, ELBOW_MAX_K, max_iter, Some(optional))?;
        elbow::save_to_file(&curve, path).with_context(|| format!("Cannot write elbow curve to {}", path.display()))?;
        tracing::info!("wrote elbow curve for k = 1..={} to {}", curve.len(), path.display());
    }
    Ok(Some(format!("{}\n{}", clustering.get_seeds(), clustering)))
}
