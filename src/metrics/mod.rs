// Corpus-level machine translation metrics
//
// - BLEU: n-gram precision with brevity penalty (13a tokenization)
// - TER: edit rate including block shifts
// - chrF: character n-gram F-score
//
// All three are computed together from the same reference streams.

pub mod bleu;
pub mod chrf;
pub mod ter;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::corpus::ReferenceGroup;
use crate::error::{EvalError, Result};

/// BLEU, TER and chrF for one candidate set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    pub bleu: f64,
    pub ter: f64,
    pub chrf: f64,
}

impl MetricScores {
    /// Rescale from the native 0-100 range to 0-1
    pub fn normalized(&self) -> Self {
        Self {
            bleu: self.bleu / 100.0,
            ter: self.ter / 100.0,
            chrf: self.chrf / 100.0,
        }
    }
}

/// Score `candidates` against every reference stream. All streams must have the
/// same length as the candidates.
pub fn score(references: &[&[String]], candidates: &[String]) -> Result<MetricScores> {
    if references.is_empty() {
        return Err(EvalError::Config("At least one reference stream is required".to_string()));
    }

    for stream in references {
        if stream.len() != candidates.len() {
            return Err(EvalError::Misaligned {
                candidates: candidates.len(),
                references: stream.len(),
            });
        }
    }

    debug!("Scoring {} candidates against {} references", candidates.len(), references.len());

    let scores = MetricScores {
        bleu: bleu::corpus_bleu(candidates, references),
        ter: ter::corpus_ter(candidates, references),
        chrf: chrf::corpus_chrf(candidates, references),
    };

    info!(
        "BLEU {:.2} | TER {:.2} | chrF {:.2}",
        scores.bleu, scores.ter, scores.chrf
    );

    Ok(scores)
}

/// Score against a reference group read from disk
pub fn score_group(references: &ReferenceGroup, candidates: &[String]) -> Result<MetricScores> {
    score(&references.streams(), candidates)
}
