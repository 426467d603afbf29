//! ctxeval - In-context vs out-of-context machine translation evaluation
//!
//! Entry point: loads configuration, sets up logging and dispatches the
//! evaluation, scoring and configuration commands.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use ctxeval::cli::{Args, Commands};
use ctxeval::config::Config;
use ctxeval::corpus::{read_references, read_sentences};
use ctxeval::experiment::ExperimentRunner;
use ctxeval::metrics::score_group;
use ctxeval::report::default_report_path;
use ctxeval::translate::{BackendFactory, BackendKind};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    config.apply_env_overrides();

    match args.command {
        Commands::Run { backend, output, lines, pair } => {
            let kind: BackendKind = backend.parse()?;
            if let Some(lines) = lines {
                config.corpus.line_count = lines;
            }
            config.validate()?;

            let pairs = config.select_pairs(&pair)?;
            let translator = BackendFactory::create(kind, &config.providers)?;
            let output = output.unwrap_or_else(|| default_report_path(&config.report.output_dir, kind.as_str()));

            info!(
                "Evaluating {} pairs with {} ({} lines each)",
                pairs.len(),
                kind,
                config.corpus.line_count
            );

            let runner = ExperimentRunner::new(translator.as_ref(), config.corpus.line_count);
            runner.run_and_export(&pairs, &output).await?;

            println!("Report written to {}", output.display());
        }
        Commands::Score { references, candidate, lines } => {
            let line_count = lines.unwrap_or(config.corpus.line_count);

            let references = read_references(&references, line_count)?;
            let candidate = read_sentences(&candidate, line_count)?;
            let scores = score_group(&references, candidate.lines())?;

            println!("\n{:<8} {:>8}", "Metric", "Score");
            println!("{}", "-".repeat(17));
            println!("{:<8} {:>8.2}", "BLEU", scores.bleu);
            println!("{:<8} {:>8.2}", "TER", scores.ter);
            println!("{:<8} {:>8.2}", "chrF", scores.chrf);
        }
        Commands::Pairs => {
            println!("\nConfigured language pairs:");
            println!("{:<14} {:<45} {}", "Pair", "Source", "References");
            println!("{}", "-".repeat(90));

            for spec in &config.pairs {
                let references = spec
                    .reference_files
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{:<14} {:<45} {}", spec.label(), spec.source_file.display(), references);
            }
        }
        Commands::InitConfig { output } => {
            Config::default().save_to_file(&output)?;
            println!("Default configuration written to {}", output.display());
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".ctxeval").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "ctxeval.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("ctxeval.log").display()
    );

    Ok(())
}
