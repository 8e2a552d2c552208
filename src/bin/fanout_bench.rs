use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use fanout_bench::{BatchResult, BenchConfig, Benchmark, Strategy, StrategyRun};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const DEFAULT_URL: &str = "http://localhost:3000/api/hello";
const DEFAULT_REQUESTS: usize = 10;
const DEFAULT_WORKERS: usize = 5;
const DEFAULT_PROCESSING_MS: u64 = 100;

#[tokio::main]
async fn main() -> Result<()> {
    fanout_bench::init_tracing();

    let args = BenchArgs::from_env()?;
    let spinner = build_spinner()?;
    spinner.println(format!(
        "Benchmarking {} with {} requests, {} workers, {}ms processing ({})",
        args.url, args.requests, args.workers, args.processing_ms, args.mode
    ));

    let config = BenchConfig::builder()
        .endpoint_url(args.url.clone())
        .pool_size(args.workers)
        .processing_cost(Duration::from_millis(args.processing_ms))
        .build()?;
    let mut bench = Benchmark::new(config)?;

    let outcome = run_mode(&mut bench, &args, &spinner).await;
    bench.shutdown();

    match outcome {
        Ok(()) => {
            spinner.finish_with_message("done");
            Ok(())
        }
        Err(err) => {
            spinner.finish_with_message("benchmark aborted");
            Err(err)
        }
    }
}

async fn run_mode(bench: &mut Benchmark, args: &BenchArgs, spinner: &ProgressBar) -> Result<()> {
    match args.mode {
        Mode::Single(strategy) => {
            spinner.set_message(format!("running {strategy} strategy"));
            let run = bench.measure(strategy, args.requests).await?;
            print_run(spinner, &run);
        }
        Mode::Compare => {
            spinner.set_message("running direct, then worker strategy");
            let comparison = bench.compare(args.requests).await?;
            print_run(spinner, &comparison.direct);
            print_run(spinner, &comparison.worker);
            spinner.println(format!("Comparison: {comparison}"));
        }
    }

    if let Some(metrics) = bench.endpoint_metrics() {
        spinner.println(format!("Endpoint: {metrics}"));
    }
    Ok(())
}

fn print_run(progress: &ProgressBar, run: &StrategyRun) {
    progress.println(format!(
        "{:>6}: {} responses in {:.2}ms (processing {:.2}ms, avg {:.2}ms per call)",
        run.strategy,
        run.request_count(),
        run.end_to_end_ms(),
        run.batch.total_processing_time_ms,
        average_processing(&run.batch)
    ));
}

fn average_processing(batch: &BatchResult) -> f64 {
    if batch.is_empty() {
        return 0.0;
    }
    batch.total_processing_time_ms / batch.len() as f64
}

fn build_spinner() -> Result<ProgressBar> {
    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout_with_hz(12));
    let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
        .context("invalid spinner template")?;
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    Ok(bar)
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Single(Strategy),
    Compare,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Single(strategy) => write!(f, "{strategy} only"),
            Mode::Compare => f.write_str("compare"),
        }
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compare" | "both" => Ok(Mode::Compare),
            other => match other.parse::<Strategy>() {
                Ok(strategy) => Ok(Mode::Single(strategy)),
                Err(_) => bail!("FANOUT_MODE must be direct, worker or compare (got '{other}')"),
            },
        }
    }
}

struct BenchArgs {
    url: String,
    requests: usize,
    workers: usize,
    processing_ms: u64,
    mode: Mode,
}

impl BenchArgs {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: read_env_or_default("FANOUT_URL", DEFAULT_URL),
            requests: parse_env_with_default::<usize>("FANOUT_REQUESTS", DEFAULT_REQUESTS)?,
            workers: parse_env_with_default::<usize>("FANOUT_WORKERS", DEFAULT_WORKERS)?,
            processing_ms: parse_env_with_default::<u64>(
                "FANOUT_PROCESSING_MS",
                DEFAULT_PROCESSING_MS,
            )?,
            mode: read_env_or_default("FANOUT_MODE", "compare").parse()?,
        })
    }
}

fn read_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_with_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("failed to parse {key}='{value}'")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("failed to read {key}")),
    }
}
