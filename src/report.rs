use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::compare::ContextScores;
use crate::error::Result;

/// One language pair's scores in the exported table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub lang: String,
    pub translator: String,
    #[serde(rename = "BLEU in")]
    pub bleu_in: f64,
    #[serde(rename = "TER in")]
    pub ter_in: f64,
    #[serde(rename = "CHRF in")]
    pub chrf_in: f64,
    #[serde(rename = "BLEU out")]
    pub bleu_out: f64,
    #[serde(rename = "TER out")]
    pub ter_out: f64,
    #[serde(rename = "CHRF out")]
    pub chrf_out: f64,
}

/// Round the exact binary value to 3 decimals, ties to even
pub fn round3(value: f64) -> f64 {
    format!("{:.3}", value).parse().unwrap_or(value)
}

impl ReportRow {
    pub fn new(lang: &str, translator: &str, scores: &ContextScores) -> Self {
        Self {
            lang: lang.to_string(),
            translator: translator.to_string(),
            bleu_in: round3(scores.bleu_in),
            ter_in: round3(scores.ter_in),
            chrf_in: round3(scores.chrf_in),
            bleu_out: round3(scores.bleu_out),
            ter_out: round3(scores.ter_out),
            chrf_out: round3(scores.chrf_out),
        }
    }
}

/// `<dir>/scores_<backend>_<timestamp>.csv`
pub fn default_report_path(output_dir: &Path, backend: &str) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    output_dir.join(format!("scores_{}_{}.csv", backend, stamp))
}

/// Write all rows at once, creating the parent directory if needed
pub fn write_csv<P: AsRef<Path>>(rows: &[ReportRow], path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("Wrote {} report rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read a report back, e.g. to compare backends
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ReportRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<ReportRow>, csv::Error>>()?;
    Ok(rows)
}

/// Console table of the report
pub fn render_table(rows: &[ReportRow]) -> String {
    let mut table = format!(
        "{:<14} {:<10} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}\n",
        "Lang", "Translator", "BLEU in", "TER in", "CHRF in", "BLEU out", "TER out", "CHRF out"
    );
    table.push_str(&"-".repeat(84));
    table.push('\n');

    for row in rows {
        table.push_str(&format!(
            "{:<14} {:<10} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3}\n",
            row.lang,
            row.translator,
            row.bleu_in,
            row.ter_in,
            row.chrf_in,
            row.bleu_out,
            row.ter_out,
            row.chrf_out
        ));
    }

    table
}
