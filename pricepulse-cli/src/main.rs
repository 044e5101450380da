//! PricePulse CLI: crypto indicator dashboard in the terminal.
//!
//! Commands:
//! - `analyze`: one pass over every symbol × interval, printed as a table or JSON
//! - `watch`: re-run `analyze` on a timer
//! - `config init`: write the default dashboard configuration as TOML
//! - `config show`: print the effective configuration

mod logging;
mod render;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pricepulse_core::data::{CircuitBreaker, CsvProvider, PriceProvider, SyntheticProvider, YahooProvider};
use pricepulse_core::{run_dashboard, DashboardConfig};
use render::DashboardView;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "pricepulse",
    about = "PricePulse CLI: crypto price indicators and buy-probability signals"
)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, compute and score every symbol × interval once.
    Analyze(RunArgs),
    /// Re-run the dashboard periodically.
    Watch {
        #[command(flatten)]
        run: RunArgs,

        /// Minutes between refreshes.
        #[arg(long, default_value_t = 15)]
        every_minutes: u64,

        /// Stop after this many refreshes (runs forever when omitted).
        #[arg(long)]
        iterations: Option<u64>,
    },
    /// Configuration file commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration as TOML.
    Init {
        /// Output path. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print the effective configuration.
    Show {
        /// Path to a TOML config file. Defaults to the built-in configuration.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Yahoo Finance chart API.
    Yahoo,
    /// `{csv_dir}/{ticker}_{interval}.csv` files.
    Csv,
    /// Deterministic random walk (offline demo data).
    Synthetic,
}

#[derive(Args)]
struct RunArgs {
    /// Path to a TOML config file. Defaults to the built-in configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Restrict to these symbols (name or ticker, repeatable).
    #[arg(long = "symbol")]
    symbols: Vec<String>,

    /// Market-data source.
    #[arg(long, value_enum, default_value_t = Source::Yahoo)]
    source: Source,

    /// Directory read by `--source csv`.
    #[arg(long, default_value = "data")]
    csv_dir: PathBuf,

    /// Print JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Trailing chart rows (close, SMA, EMA) per cell. Defaults to the
    /// configured `chart_tail` for JSON output and to none for the table.
    #[arg(long)]
    chart: Option<usize>,
}

impl RunArgs {
    fn chart_rows(&self, config: &DashboardConfig) -> usize {
        match (self.chart, self.json) {
            (Some(rows), _) => rows,
            (None, true) => config.analysis.chart_tail,
            (None, false) => 0,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_json);

    match cli.command {
        Commands::Analyze(args) => {
            let (config, provider) = prepare(&args)?;
            run_once(provider.as_ref(), &config, &args)
        }
        Commands::Watch {
            run,
            every_minutes,
            iterations,
        } => run_watch(&run, every_minutes, iterations),
        Commands::Config { action } => match action {
            ConfigAction::Init { output, force } => run_config_init(output.as_deref(), force),
            ConfigAction::Show { config } => run_config_show(config.as_deref()),
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(DashboardConfig::default()),
    }
}

fn build_provider(source: Source, csv_dir: &Path) -> Result<Box<dyn PriceProvider>> {
    Ok(match source {
        Source::Yahoo => {
            let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
            Box::new(YahooProvider::new(circuit_breaker)?)
        }
        Source::Csv => {
            if !csv_dir.is_dir() {
                bail!("CSV directory does not exist: {}", csv_dir.display());
            }
            Box::new(CsvProvider::new(csv_dir))
        }
        Source::Synthetic => Box::new(SyntheticProvider::new()),
    })
}

fn prepare(args: &RunArgs) -> Result<(DashboardConfig, Box<dyn PriceProvider>)> {
    let mut config = load_config(args.config.as_deref())?;
    config.select_symbols(&args.symbols)?;
    let provider = build_provider(args.source, &args.csv_dir)?;
    Ok((config, provider))
}

fn run_once(provider: &dyn PriceProvider, config: &DashboardConfig, args: &RunArgs) -> Result<()> {
    let reports = run_dashboard(provider, config)?;
    let view = DashboardView::new(
        provider.name(),
        &reports,
        args.chart_rows(config),
        Utc::now(),
    );

    if args.json {
        println!("{}", render::to_json(&view)?);
    } else {
        print!("{}", render::to_table(&view));
    }
    Ok(())
}

fn run_watch(args: &RunArgs, every_minutes: u64, iterations: Option<u64>) -> Result<()> {
    if every_minutes == 0 {
        bail!("--every-minutes must be at least 1");
    }
    if iterations == Some(0) {
        bail!("--iterations must be at least 1");
    }

    // One provider for the whole session so the circuit breaker spans refreshes.
    let (config, provider) = prepare(args)?;
    let period = Duration::from_secs(every_minutes * 60);

    let mut run = 0u64;
    loop {
        run += 1;
        info!(run, "refreshing dashboard");
        run_once(provider.as_ref(), &config, args)?;

        if iterations.is_some_and(|limit| run >= limit) {
            return Ok(());
        }
        if !args.json {
            println!();
            println!("Next refresh in {every_minutes} min (Ctrl-C to stop)");
        }
        std::thread::sleep(period);
    }
}

fn run_config_init(output: Option<&Path>, force: bool) -> Result<()> {
    let toml = DashboardConfig::default().to_toml()?;
    match output {
        None => print!("{toml}"),
        Some(path) => {
            if path.exists() && !force {
                bail!("{} already exists (pass --force to overwrite)", path.display());
            }
            std::fs::write(path, toml)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}

fn run_config_show(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
