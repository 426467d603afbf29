use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PairSpec;
use crate::corpus::{read_references, read_sentences};
use crate::error::Result;
use crate::metrics::{score_group, MetricScores};
use crate::translate::{LanguagePair, TranslationBackend, TranslationResult};

/// The six normalized (0-1) scores of one in-context vs out-of-context comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextScores {
    pub bleu_in: f64,
    pub bleu_out: f64,
    pub ter_in: f64,
    pub ter_out: f64,
    pub chrf_in: f64,
    pub chrf_out: f64,
}

impl ContextScores {
    /// Combine native-scale scores of both modes, rescaled to 0-1
    pub fn from_native(in_context: MetricScores, out_of_context: MetricScores) -> Self {
        let in_context = in_context.normalized();
        let out_of_context = out_of_context.normalized();

        Self {
            bleu_in: in_context.bleu,
            bleu_out: out_of_context.bleu,
            ter_in: in_context.ter,
            ter_out: out_of_context.ter,
            chrf_in: in_context.chrf,
            chrf_out: out_of_context.chrf,
        }
    }

    /// (bleu-in, bleu-out, ter-in, ter-out, chrf-in, chrf-out)
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64, f64) {
        (
            self.bleu_in,
            self.bleu_out,
            self.ter_in,
            self.ter_out,
            self.chrf_in,
            self.chrf_out,
        )
    }
}

/// Outcome of comparing both translation modes for one language pair
#[derive(Debug, Clone)]
pub struct Comparison {
    pub pair: LanguagePair,
    pub scores: ContextScores,
    pub in_context: TranslationResult,
    pub out_of_context: TranslationResult,
}

/// Pad with empty lines or truncate so candidates line up with the references
pub fn align_candidates(mut lines: Vec<String>, expected: usize, mode: &str) -> Vec<String> {
    if lines.len() != expected {
        warn!(
            "{} translation has {} lines, references have {}; {} to align",
            mode,
            lines.len(),
            expected,
            if lines.len() < expected { "padding" } else { "truncating" }
        );
        lines.resize(expected, String::new());
    }
    lines
}

/// Translate one language pair both ways and score each against the same references
pub async fn compare_contexts(
    backend: &dyn TranslationBackend,
    spec: &PairSpec,
    line_count: usize,
) -> Result<Comparison> {
    let pair = spec.pair();

    let references = read_references(&spec.reference_files, line_count)?;
    let source = read_sentences(&spec.source_file, line_count)?;
    let expected = references.line_count();

    info!("┌─ Comparing contexts for {} ({}) ────────", pair, backend.name());
    info!("│ Source: {} ({} lines)", spec.source_file.display(), source.len());
    info!("│ References: {}", references.sets().len());

    let in_context = backend.translate_document(source.lines(), &pair).await;
    info!("│ In context: {}", in_context.status_label());

    let out_of_context = backend.translate_batch(source.lines(), &pair).await;
    info!("│ Out of context: {}", out_of_context.status_label());

    let in_candidates = align_candidates(in_context.lines.clone(), expected, "In-context");
    let out_candidates = align_candidates(out_of_context.lines.clone(), expected, "Out-of-context");

    let in_scores = score_group(&references, &in_candidates)?;
    let out_scores = score_group(&references, &out_candidates)?;

    let scores = ContextScores::from_native(in_scores, out_scores);

    info!("│ BLEU using context: {:.4} / without: {:.4}", scores.bleu_in, scores.bleu_out);
    info!("│ TER using context: {:.4} / without: {:.4}", scores.ter_in, scores.ter_out);
    info!("│ chrF using context: {:.4} / without: {:.4}", scores.chrf_in, scores.chrf_out);
    info!("└─────────────────────────────────────");

    Ok(Comparison {
        pair,
        scores,
        in_context,
        out_of_context,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::testing::EchoBackend;
    use crate::translate::TranslationStatus;

    #[test]
    fn test_align_pads_and_truncates() {
        let short = align_candidates(vec!["a".to_string()], 3, "test");
        assert_eq!(short, vec!["a", "", ""]);

        let long = align_candidates(vec!["a".into(), "b".into(), "c".into()], 2, "test");
        assert_eq!(long, vec!["a", "b"]);

        let exact = align_candidates(vec!["a".into()], 1, "test");
        assert_eq!(exact, vec!["a"]);
    }

    #[test]
    fn test_from_native_rescales_every_score() {
        let in_context = MetricScores { bleu: 30.0, ter: 60.0, chrf: 55.0 };
        let out_of_context = MetricScores { bleu: 25.0, ter: 65.0, chrf: 50.0 };

        let scores = ContextScores::from_native(in_context, out_of_context);
        assert_eq!(scores.as_tuple(), (0.3, 0.25, 0.6, 0.65, 0.55, 0.5));
    }

    #[test]
    fn test_document_failure_is_scored_as_empty_translation() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("news.src.en");
        let reference = dir.path().join("news.ref.A.de");
        std::fs::write(&source, "one small step\nfor all of mankind\n").unwrap();
        std::fs::write(&reference, "de:one small step\nde:for all of mankind\n").unwrap();
        let spec = PairSpec::new("en", "de", &source, vec![reference]);

        // only the joined document is malformed, single sentences still translate
        let backend = EchoBackend::new().with_malformed("one small step\nfor all of mankind");
        let comparison = tokio_test::block_on(compare_contexts(&backend, &spec, 2)).unwrap();

        assert!(comparison.in_context.is_failed());
        assert_eq!(comparison.out_of_context.status, TranslationStatus::Complete);
        assert_eq!(comparison.scores.bleu_in, 0.0);
        assert_eq!(comparison.scores.ter_in, 1.0);
        assert!((comparison.scores.bleu_out - 1.0).abs() < 1e-9);
        assert_eq!(comparison.scores.ter_out, 0.0);
    }
}
