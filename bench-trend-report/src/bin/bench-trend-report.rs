use bench_trend_report::{FailurePolicy, ReportConfig, chart, generate_report};
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("bench-trend-report")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render benchmark CSV histories into trend charts and an HTML report")
        .arg(
            Arg::new("files")
                .value_name("CSV")
                .help("Benchmark CSV files with tag,min,max,med,avg columns")
                .num_args(1..)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Directory for chart images and report.html")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (.json or .toml)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("isolate-failures")
                .long("isolate-failures")
                .help("List failing inputs in the report instead of aborting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("summary-json")
                .long("summary-json")
                .value_name("FILE")
                .help("Write the run summary as JSON to FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ReportConfig::from_file(path)?,
        None => ReportConfig::default(),
    };

    // Override config with command line arguments
    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        config.output_dir = dir.clone();
    }
    if matches.get_flag("isolate-failures") {
        config.failure_policy = FailurePolicy::Isolate;
    }

    let files: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if !chart::text_rendering_available() {
        log::warn!("No system font found for chart text, rendering will likely fail");
    }

    let summary = generate_report(&config, &files)?;

    if let Some(path) = matches.get_one::<PathBuf>("summary-json") {
        summary.write_json(path)?;
    }

    let regressions = summary.regressions().count();
    log::info!(
        "{} chart(s), {} above threshold, {} failed input(s)",
        summary.charts.len(),
        regressions,
        summary.failures.len()
    );

    Ok(())
}
