use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare in-context and out-of-context translation for every configured pair
    Run {
        /// Translation backend (deepl, microsoft, google)
        #[arg(short, long)]
        backend: String,

        /// CSV report path (default: <report.output_dir>/scores_<backend>_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of lines read from each corpus file
        #[arg(short, long)]
        lines: Option<usize>,

        /// Only evaluate these pairs, e.g. "en-us->de" (repeatable)
        #[arg(short, long)]
        pair: Vec<String>,
    },

    /// Score an existing translation against reference files
    Score {
        /// Reference files, aligned line by line with the candidate
        #[arg(short, long, num_args = 1.., required = true)]
        references: Vec<PathBuf>,

        /// Candidate translation file
        #[arg(short = 'C', long)]
        candidate: PathBuf,

        /// Number of lines to score
        #[arg(short, long)]
        lines: Option<usize>,
    },

    /// List the configured language pairs and their corpus files
    Pairs,

    /// Write a configuration file with all defaults
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}
