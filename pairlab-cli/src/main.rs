//! PairLab CLI: download, run, compare, sweep and cache commands.
//!
//! Commands:
//! - `download`: fetch daily bars from Yahoo Finance into the Parquet cache
//! - `run`: one backtest from a TOML config or a named strategy
//! - `compare`: every strategy with default parameters, ranked by return
//! - `sweep`: parallel parameter grid for one strategy
//! - `cache status`: cached symbols and date ranges

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pairlab_core::data::{DataProvider, ParquetCache, YahooProvider};
use pairlab_runner::{
    compare_strategies, generate_comparison, load_series, run_single_backtest, run_sweep,
    save_artifacts, LoadOptions, LoadedData, ParamGrid, RunConfig, RunReport, SweepResults,
};

const DEFAULT_SYMBOLS: [&str; 2] = ["1579.T", "1360.T"];

#[derive(Parser)]
#[command(name = "pairlab", about = "PairLab: daily-bar backtesting for a pair of ETFs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Data source options shared by the backtest commands.
#[derive(Args)]
struct DataArgs {
    /// Symbols to trade. Defaults to 1579.T 1360.T.
    #[arg(long, num_args = 1..)]
    symbols: Vec<String>,

    /// Start date (YYYY-MM-DD). Defaults to 2 years ago.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Initial capital.
    #[arg(long, default_value_t = 1_000_000.0)]
    capital: f64,

    /// Offline mode: no network access.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Use synthetic data as fallback.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Cache directory.
    #[arg(long, default_value = "data")]
    cache_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily bars from Yahoo Finance and cache them as Parquet.
    Download {
        /// Symbols to download. Defaults to 1579.T 1360.T.
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to 2 years ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Run one backtest from a TOML config file or a named strategy.
    Run {
        /// Path to a TOML config file.
        #[arg(long, conflicts_with = "strategy")]
        config: Option<PathBuf>,

        /// Strategy name, e.g. pairs_trading, mean_reversion, combined.
        #[arg(long)]
        strategy: Option<String>,

        #[command(flatten)]
        data: DataArgs,

        /// Output directory for report artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Run every strategy with default parameters and rank them.
    Compare {
        #[command(flatten)]
        data: DataArgs,

        /// Write the comparison table as Markdown to this file.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Sweep a strategy's parameters in parallel.
    Sweep {
        /// Preset grid: pairs_trading or trend_following.
        #[arg(long, default_value = "pairs_trading")]
        grid: String,

        /// Number of best combinations to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached symbols, date ranges and bar counts.
    Status {
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Download { symbols, start, end, force, cache_dir } => {
            run_download(symbols, start, end, force, &cache_dir)
        }
        Commands::Run { config, strategy, data, output_dir } => {
            run_backtest_cmd(config, strategy, &data, &output_dir)
        }
        Commands::Compare { data, report } => run_compare(&data, report.as_deref()),
        Commands::Sweep { grid, top, data } => run_sweep_cmd(&grid, top, &data),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
        },
    }
}

// ─── Argument helpers ───────────────────────────────────────────────

fn parse_date(value: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    value
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'")))
        .transpose()
        .map(|d| d.unwrap_or(default))
}

fn date_range(start: Option<&str>, end: Option<&str>) -> Result<(NaiveDate, NaiveDate)> {
    let today = chrono::Local::now().date_naive();
    let start = parse_date(start, today - chrono::Duration::days(365 * 2))?;
    let end = parse_date(end, today)?;
    Ok((start, end))
}

fn symbols_or_default(symbols: &[String]) -> Vec<String> {
    if symbols.is_empty() {
        DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
    } else {
        symbols.to_vec()
    }
}

impl DataArgs {
    fn base_config(&self, strategy: &str) -> Result<RunConfig> {
        let (start, end) = date_range(self.start.as_deref(), self.end.as_deref())?;
        Ok(RunConfig::for_strategy(strategy, symbols_or_default(&self.symbols), start, end, self.capital)?)
    }

    fn load_options(&self, config: &RunConfig) -> LoadOptions {
        LoadOptions {
            offline: self.offline,
            synthetic: self.synthetic,
            ..LoadOptions::new(config.backtest.start_date, config.backtest.end_date)
        }
    }

    fn provider(&self) -> Result<Option<YahooProvider>> {
        if self.offline {
            return Ok(None);
        }
        Ok(Some(YahooProvider::new()?))
    }

    fn load(&self, config: &RunConfig) -> Result<LoadedData> {
        let cache = ParquetCache::new(&self.cache_dir);
        let provider = self.provider()?;
        let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);
        Ok(load_series(&config.backtest.symbols, &cache, provider_ref, &self.load_options(config))?)
    }
}

// ─── Commands ───────────────────────────────────────────────────────

fn run_download(
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    force: bool,
    cache_dir: &Path,
) -> Result<()> {
    let (start, end) = date_range(start.as_deref(), end.as_deref())?;
    let provider = YahooProvider::new()?;
    let cache = ParquetCache::new(cache_dir);

    let mut failed = Vec::new();
    for symbol in symbols_or_default(&symbols) {
        if !force && cache.covers_range(&symbol, start, end) == pairlab_core::data::CoverageResult::FullyCovered {
            println!("{symbol}: already cached");
            continue;
        }
        match provider.fetch(&symbol, start, end) {
            Ok(fetched) if fetched.bars.is_empty() => {
                warn!(symbol = %symbol, "no bars in range");
                println!("{symbol}: no data for {start} to {end}");
            }
            Ok(fetched) => {
                cache.write(&symbol, &fetched.bars, fetched.source)?;
                println!("{symbol}: {} bars cached", fetched.bars.len());
            }
            Err(e) => {
                eprintln!("Error for {symbol}: {e}");
                failed.push(symbol);
            }
        }
    }

    if !failed.is_empty() {
        bail!("download failed for {}", failed.join(", "));
    }
    Ok(())
}

fn run_backtest_cmd(
    config_path: Option<PathBuf>,
    strategy: Option<String>,
    data: &DataArgs,
    output_dir: &Path,
) -> Result<()> {
    let config = match (config_path, strategy) {
        (Some(path), _) => RunConfig::from_file(&path)?,
        (None, Some(name)) => data.base_config(&name)?,
        (None, None) => bail!("one of --config or --strategy is required"),
    };

    let cache = ParquetCache::new(&data.cache_dir);
    let provider = data.provider()?;
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);
    let report = run_single_backtest(&config, &cache, provider_ref, &data.load_options(&config))?;

    print_summary(&report);
    let run_dir = save_artifacts(&report, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn run_compare(data: &DataArgs, report_path: Option<&Path>) -> Result<()> {
    let base = data.base_config("momentum")?;
    let loaded = data.load(&base)?;
    let results = compare_strategies(&base, &loaded);

    for report in results.all() {
        print_summary(report);
    }
    print_ranking(&results, results.len());
    for (name, err) in &results.failures {
        println!("FAILED {name}: {err}");
    }

    if let Some(path) = report_path {
        std::fs::write(path, generate_comparison(results.all()))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Comparison saved to: {}", path.display());
    }
    Ok(())
}

fn run_sweep_cmd(grid_name: &str, top: usize, data: &DataArgs) -> Result<()> {
    let grid = match grid_name {
        "pairs_trading" | "pairs" => ParamGrid::pairs_default(),
        "trend_following" => ParamGrid::trend_following_default(),
        other => bail!("unknown grid '{other}'. Valid: pairs_trading, trend_following"),
    };
    let base = data.base_config(&grid.strategy)?;
    let loaded = data.load(&base)?;
    info!(combinations = grid.size(), "sweep grid");

    let results = run_sweep(&base, &grid, &loaded)?;
    print_ranking(&results, top);
    if let Some(best) = results.best() {
        let params = serde_json::to_string(&best.config.strategy)?;
        println!();
        println!("Best parameters: {params}");
    }
    Ok(())
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }
    let cache = ParquetCache::new(cache_dir);
    let symbols = cache.cached_symbols();
    if symbols.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    println!("Cache: {}", cache_dir.display());
    println!("Symbols: {}", symbols.len());
    println!();
    println!("{:<10} {:<25} {:>8}", "Symbol", "Date Range", "Bars");
    println!("{}", "-".repeat(45));
    for status in cache.status(&symbols) {
        let range = match (status.start_date, status.end_date) {
            (Some(s), Some(e)) => format!("{s} to {e}"),
            _ => "(no meta)".into(),
        };
        println!("{:<10} {:<25} {:>8}", status.symbol, range, status.bar_count.unwrap_or(0));
    }
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_summary(report: &RunReport) {
    let r = &report.result;
    let m = &report.metrics;
    println!();
    println!("=== {} ===", report.strategy_name());
    println!("Symbols:        {}", r.symbols.join(", "));
    println!("Bars:           {}", r.bar_count);
    println!("Final Value:    {:.2}", r.final_value);
    println!("Total Return:   {:.2}%", r.total_return_pct);
    println!("Max Drawdown:   {:.2}%", r.max_drawdown_pct);
    println!("Trades:         {}", r.total_trades);
    println!("Realized P&L:   {:.2}", r.realized_pnl);
    println!("Unrealized P&L: {:.2}", r.unrealized_pnl);
    println!("Win Rate:       {:.1}%", r.win_rate_pct);
    println!("Sharpe:         {:.3}", m.sharpe);
    println!("Fees Paid:      {:.2}", m.fees_paid);
    if !r.rejections.is_empty() {
        println!("Rejected:       {}", r.rejections.len());
    }
    if report.has_synthetic {
        println!("WARNING: Results based on SYNTHETIC data");
    }
}

fn print_ranking(results: &SweepResults, n: usize) {
    println!();
    println!(
        "{:<4} {:<22} {:>14} {:>9} {:>8} {:>7} {:>9}",
        "#", "Strategy", "Final Value", "Return", "Max DD", "Trades", "Win Rate"
    );
    println!("{}", "-".repeat(79));
    for (i, report) in results.top_n(n).iter().enumerate() {
        let r = &report.result;
        println!(
            "{:<4} {:<22} {:>14.0} {:>8.2}% {:>7.2}% {:>7} {:>8.1}%",
            i + 1,
            report.strategy_name(),
            r.final_value,
            r.total_return_pct,
            r.max_drawdown_pct,
            r.total_trades,
            r.win_rate_pct,
        );
    }
}
