//! Detect log-return anomalies for an instrument
//!
//! Usage:
//!   cargo run --bin detect_anomalies -- --instrument sp500
//!   cargo run --bin detect_anomalies -- --symbol "^NDX" --json chart.json
//!   cargo run --bin detect_anomalies -- --csv prices.csv --symbol TEST
//!   cargo run --bin detect_anomalies            (interactive menu)

use anyhow::{Context, Result};
use clap::Parser;
use rust_return_anomaly::{
    analysis::{analyze, Analysis},
    config::Config,
    data::{Instrument, PriceSeries, YahooClient},
    timezone,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const INTRO: &str = "
    *** Statistical Indicator of Log-Return Anomalies ***

    This program is not a trading strategy. It is an indicator that measures
    statistical market conditions by analysing the intraday log returns of
    the selected instrument.

    IMPORTANT:
    - Do not make decisions based on this indicator alone.
    - Complement it with auction market theory, context and technical analysis.
";

#[derive(Parser, Debug)]
#[command(author, version, about = "Detect log-return anomalies in intraday prices")]
struct Args {
    /// Instrument from the menu: sp500, ndx, eurjpy
    #[arg(short = 'I', long, conflicts_with_all = ["symbol", "csv"])]
    instrument: Option<Instrument>,

    /// Any Yahoo Finance ticker (also names the series loaded with --csv)
    #[arg(short, long)]
    symbol: Option<String>,

    /// Read `timestamp,close` rows from a CSV file instead of downloading
    #[arg(long)]
    csv: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bar size, e.g. 5m
    #[arg(short, long)]
    interval: Option<String>,

    /// Lookback, e.g. 5d
    #[arg(short, long)]
    range: Option<String>,

    /// Rolling window in return points
    #[arg(short, long)]
    window: Option<usize>,

    /// Envelope width in standard deviations
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Number of recent anomalies to list
    #[arg(short, long)]
    last: Option<usize>,

    /// Reporting timezone (IANA name)
    #[arg(long)]
    timezone: Option<String>,

    /// Write the chart payload as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,
}

impl Args {
    /// File configuration with command-line overrides applied
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(interval) = &self.interval {
            config.data.interval = interval.clone();
        }
        if let Some(range) = &self.range {
            config.data.range = range.clone();
        }
        if let Some(window) = self.window {
            config.detector.window = window;
        }
        if let Some(threshold) = self.threshold {
            config.detector.threshold = threshold;
        }
        if let Some(last) = self.last {
            config.report.last = last;
        }
        if let Some(tz) = &self.timezone {
            config.report.timezone = tz.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    println!("{}", INTRO);

    if let Some(path) = &args.csv {
        let symbol = args.symbol.as_deref().unwrap_or("CSV");
        let series = PriceSeries::from_csv(path, symbol, &config.data.interval)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return run(&series, symbol, &config, args.json.as_ref());
    }

    let client = YahooClient::new().context("Failed to create HTTP client")?;

    if let Some(instrument) = args.instrument {
        return fetch_and_run(
            &client,
            instrument.symbol(),
            instrument.name(),
            &config,
            args.json.as_ref(),
        );
    }
    if let Some(symbol) = &args.symbol {
        return fetch_and_run(&client, symbol, symbol, &config, args.json.as_ref());
    }

    menu(&client, &config, args.json.as_ref())
}

/// Interactive instrument menu; returns when the user picks "Exit"
fn menu(client: &YahooClient, config: &Config, json: Option<&PathBuf>) -> Result<()> {
    let stdin = io::stdin();
    let exit_choice = Instrument::ALL.len() + 1;

    loop {
        println!("\nSelect an instrument to analyse:");
        for (i, instrument) in Instrument::ALL.iter().enumerate() {
            println!("{}. {}", i + 1, instrument);
        }
        println!("{}. Exit", exit_choice);

        print!("Enter option (1-{}): ", exit_choice);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let choice = line.trim();

        if choice == exit_choice.to_string() {
            println!("Exiting...");
            return Ok(());
        }

        match Instrument::from_menu_choice(choice) {
            Some(instrument) => {
                // A failed download ends this analysis, not the session
                if let Err(err) =
                    fetch_and_run(client, instrument.symbol(), instrument.name(), config, json)
                {
                    eprintln!("Error: {:#}", err);
                }
            }
            None => println!("Invalid option. Please try again."),
        }
    }
}

fn fetch_and_run(
    client: &YahooClient,
    symbol: &str,
    name: &str,
    config: &Config,
    json: Option<&PathBuf>,
) -> Result<()> {
    println!("\nDownloading data for {} ({})...", name, symbol);

    let series = client
        .fetch(symbol, &config.data.interval, &config.data.range)
        .with_context(|| format!("Failed to download {}", symbol))?;

    run(&series, name, config, json)
}

fn run(series: &PriceSeries, name: &str, config: &Config, json: Option<&PathBuf>) -> Result<()> {
    let analysis = analyze(series, name, config)
        .with_context(|| format!("Failed to analyse {}", series.symbol))?;

    print_report(&analysis, config);

    if let Some(path) = json {
        analysis
            .chart
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\nChart data written to {}", path.display());
    }

    Ok(())
}

fn print_report(analysis: &Analysis, config: &Config) {
    let summary = &analysis.summary;

    println!(
        "Return points: {} ({} evaluable, window={}, threshold={})",
        summary.total, summary.evaluable, config.detector.window, config.detector.threshold
    );
    if summary.evaluable == 0 {
        println!(
            "Not enough data: need at least {} return points for a full window.",
            config.detector.window
        );
    }

    if analysis.summary.anomalies == 0 {
        println!("\nNo anomalies detected.");
        return;
    }

    println!(
        "Anomalies: {} ({:.2}% of evaluable points)",
        summary.anomalies,
        summary.anomaly_rate() * 100.0
    );

    println!(
        "\nLast {} anomalies detected ({} time):",
        analysis.recent.len(),
        config.report.timezone
    );
    for anomaly in &analysis.recent {
        println!(
            "- {} | Log Return: {:.5}",
            timezone::format_local(&anomaly.local_time),
            anomaly.log_return
        );
    }

    if let Some(annotation) = &analysis.chart.annotation {
        println!("\nLatest anomaly at {}:", annotation.local_time);
        for line in annotation.text.lines() {
            println!("  {}", line);
        }
    }
}
