//! Run a Bank Reserves parameter sweep and write the combined step table.
//!
//! ```text
//! bank-reserves-sweep --iterations 1 --max-steps 1000 --out data/
//! ```

use std::path::PathBuf;

use anyhow::Context;
use bank_reserves::export::SWEEP_FILE_NAME;
use bank_reserves::{BatchRunner, Config, SweepParameters};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bank-reserves-sweep", about = "Bank Reserves parameter sweep")]
struct Args {
    /// JSON file with base simulation parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file with sweep axes (init_people, rich_threshold, reserve_percent)
    #[arg(long)]
    sweep: Option<PathBuf>,

    /// Runs per parameter combination
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// Upper bound on steps per run
    #[arg(long, default_value_t = 1000)]
    max_steps: u64,

    /// Base seed; run `n` uses `seed + n`
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Run one simulation at a time
    #[arg(long)]
    sequential: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let base = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let params = match &args.sweep {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading sweep file {}", path.display()))?;
            serde_json::from_str::<SweepParameters>(&text)
                .with_context(|| format!("parsing sweep file {}", path.display()))?
        }
        None => SweepParameters::default(),
    };

    let mut runner =
        BatchRunner::new(base, params, args.iterations)?.with_max_steps(args.max_steps);
    if let Some(seed) = args.seed {
        runner = runner.with_base_seed(seed);
    }
    if args.sequential {
        runner = runner.sequential();
    }

    let result = runner.run_all();

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    let path = args.out.join(SWEEP_FILE_NAME);
    result.write_csv(&path)?;
    info!(path = %path.display(), rows = result.total_rows(), "sweep written");
    Ok(())
}
