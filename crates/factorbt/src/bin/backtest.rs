//! Factor backtest CLI tool.
//!
//! Runs a cross-sectional factor backtest over CSV market data and prints
//! the per-period report table and summary statistics.
//!
//! Usage: `cargo run --bin backtest --features cli -- START END FACTOR [--data DIR]`
//! Example: `cargo run --bin backtest --features cli -- 2023-01-01 2024-01-01 value_growth --data ./data`
//!
//! The data directory must hold five CSV files with string `YYYY-MM-DD`
//! dates: `prices.csv` (symbol, date, close), `benchmark.csv` (date,
//! close), `fundamentals.csv` (symbol, date, factor inputs),
//! `industries.csv` (symbol, industry), `market_caps.csv` (symbol, date,
//! market_cap).

use std::env;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use factorbt::engine::{Backtester, DataSources, MarketData, report_frame};
use factorbt::factors::FactorRegistry;
use factorbt::primitives::BacktestConfig;
use polars::prelude::*;
use tracing_subscriber::EnvFilter;

/// Default data directory, relative to the working directory.
const DEFAULT_DATA_DIR: &str = "data";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: backtest START END FACTOR [--data DIR]");
        eprintln!("Example: backtest 2023-01-01 2024-01-01 value_growth --data ./data");
        std::process::exit(1);
    }

    let start = NaiveDate::parse_from_str(&args[1], "%Y-%m-%d")?;
    let end = NaiveDate::parse_from_str(&args[2], "%Y-%m-%d")?;
    let factor_name = args[3].as_str();
    let data_dir = parse_data_dir(&args);

    let registry = FactorRegistry::with_defaults();
    let Some(factor) = registry.get(factor_name) else {
        eprintln!("Unknown factor {factor_name:?}. Available: {:?}", registry.names());
        std::process::exit(1);
    };

    let data = load_market_data(&data_dir)?;
    let config = BacktestConfig::default();
    let sources = DataSources {
        prices: &data,
        benchmark: &data,
        fundamentals: &data,
        industries: &data,
        market_caps: &data,
    };

    let report = Backtester::new(&config, factor, sources).run(&[], start, end)?;

    println!("\n{}", report_frame(&report, config.n_buckets)?);
    print_summary(&report, &config);
    Ok(())
}

fn parse_data_dir(args: &[String]) -> PathBuf {
    for i in 0..args.len() {
        if args[i] == "--data" && i + 1 < args.len() {
            return PathBuf::from(&args[i + 1]);
        }
    }
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn load_csv(dir: &Path, name: &str) -> Result<DataFrame, Box<dyn std::error::Error>> {
    let path = dir.join(name);
    let df = LazyCsvReader::new(&path).with_has_header(true).finish()?.collect()?;
    Ok(df)
}

fn load_market_data(dir: &Path) -> Result<MarketData, Box<dyn std::error::Error>> {
    Ok(MarketData::new(
        load_csv(dir, "prices.csv")?,
        load_csv(dir, "benchmark.csv")?,
        load_csv(dir, "fundamentals.csv")?,
        load_csv(dir, "industries.csv")?,
        load_csv(dir, "market_caps.csv")?,
    ))
}

fn print_summary(report: &factorbt::primitives::BacktestReport, config: &BacktestConfig) {
    println!("\nPeriods completed: {}", report.n_periods());
    println!("Periods skipped:   {}", report.gaps.len());
    for gap in &report.gaps {
        println!("  period {} ({}): {}", gap.index, gap.nominal_date, gap.reason);
    }

    let ic = &report.ic_summary;
    println!("\nIC observations:   {}", ic.observations);
    if let Some(mean) = ic.mean {
        println!("IC mean:           {mean:.4}");
    }
    if let Some(std) = ic.std {
        println!("IC std:            {std:.4}");
    }
    if let Some(ratio) = ic.ratio {
        println!("IC ratio:          {ratio:.4}");
    }

    println!("\nCumulative returns by bucket:");
    for k in 1..=config.n_buckets {
        if let Some(cumulative) = report.final_cumulative(k) {
            println!("  bucket {k}: {:+.2}%", cumulative * 100.0);
        }
    }
    if let Some(benchmark) = report.benchmark_cumulative.last() {
        println!("  benchmark: {:+.2}%", benchmark * 100.0);
    }
}
