use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::compare::compare_contexts;
use crate::config::PairSpec;
use crate::error::Result;
use crate::report::{render_table, write_csv, ReportRow};
use crate::translate::TranslationBackend;

/// Runs the in-context vs out-of-context comparison over a list of language pairs
pub struct ExperimentRunner<'a> {
    backend: &'a dyn TranslationBackend,
    line_count: usize,
    show_progress: bool,
}

impl<'a> ExperimentRunner<'a> {
    pub fn new(backend: &'a dyn TranslationBackend, line_count: usize) -> Self {
        Self {
            backend,
            line_count,
            show_progress: true,
        }
    }

    /// Disable the terminal progress bar (tests, non-interactive runs)
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }

    /// Compare every pair in order, one report row per pair. Pairs run strictly
    /// one after another; a missing or short corpus file aborts the run.
    pub async fn run(&self, pairs: &[PairSpec]) -> Result<Vec<ReportRow>> {
        let started = Instant::now();
        let pb = self.progress_bar(pairs.len());
        let mut rows = Vec::with_capacity(pairs.len());

        info!(
            "Starting experiment: {} language pairs, {} lines each, backend {}",
            pairs.len(),
            self.line_count,
            self.backend.name()
        );

        for (round, spec) in pairs.iter().enumerate() {
            let label = spec.label();
            pb.set_message(label.clone());
            info!("Round {}/{}: {}", round + 1, pairs.len(), label);

            let comparison = match compare_contexts(self.backend, spec, self.line_count).await {
                Ok(comparison) => comparison,
                Err(e) => {
                    pb.abandon_with_message(format!("failed at {}", label));
                    return Err(e);
                }
            };

            rows.push(ReportRow::new(&label, self.backend.name(), &comparison.scores));
            pb.inc(1);
        }

        pb.finish_with_message("done");
        info!(
            "Experiment finished in {:.1}s",
            started.elapsed().as_secs_f64()
        );

        Ok(rows)
    }

    /// Run all pairs, print the table and export it to `output`
    pub async fn run_and_export<P: AsRef<Path>>(&self, pairs: &[PairSpec], output: P) -> Result<Vec<ReportRow>> {
        let rows = self.run(pairs).await?;

        println!("\n{}", render_table(&rows));
        write_csv(&rows, output)?;

        Ok(rows)
    }
}
