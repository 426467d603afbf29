use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const MAX_NGRAM_ORDER: usize = 4;

/// log(0) stand-in so a zero precision drives the geometric mean to zero
const LOG_ZERO: f64 = -9_999_999_999.0;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\{-~\[-` -&\(-\+:-@/])").expect("valid punctuation pattern"));
static PERIOD_COMMA_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^0-9])([\.,])").expect("valid period pattern"));
static PERIOD_COMMA_BEFORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\.,])([^0-9])").expect("valid period pattern"));
static DASH_AFTER_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9])(-)").expect("valid dash pattern"));

/// mteval-v13a tokenization
pub fn tokenize_13a(line: &str) -> Vec<String> {
    let mut line = line
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ");

    if line.contains('&') {
        line = line
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let line = format!(" {} ", line);
    let line = PUNCTUATION.replace_all(&line, " ${1} ");
    let line = PERIOD_COMMA_AFTER.replace_all(&line, "${1} ${2} ");
    let line = PERIOD_COMMA_BEFORE.replace_all(&line, " ${1} ${2}");
    let line = DASH_AFTER_DIGIT.replace_all(&line, "${1} ${2} ");

    line.split_whitespace().map(str::to_string).collect()
}

fn ngram_counts(tokens: &[String], order: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() < order {
        return counts;
    }
    for window in tokens.windows(order) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Sufficient statistics accumulated over a corpus
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BleuStats {
    pub correct: [usize; MAX_NGRAM_ORDER],
    pub total: [usize; MAX_NGRAM_ORDER],
    pub sys_len: usize,
    pub ref_len: usize,
}

impl BleuStats {
    /// Add one hypothesis against all of its references
    pub fn add_segment(&mut self, hypothesis: &str, references: &[&str]) {
        let hyp = tokenize_13a(hypothesis);
        let refs: Vec<Vec<String>> = references.iter().map(|r| tokenize_13a(r)).collect();

        // Closest reference length, shorter one on ties
        let mut closest_diff = usize::MAX;
        let mut closest_len = 0;
        for reference in &refs {
            let diff = hyp.len().abs_diff(reference.len());
            if diff < closest_diff {
                closest_diff = diff;
                closest_len = reference.len();
            } else if diff == closest_diff {
                closest_len = closest_len.min(reference.len());
            }
        }

        self.sys_len += hyp.len();
        self.ref_len += closest_len;

        for order in 1..=MAX_NGRAM_ORDER {
            let mut max_ref_counts: HashMap<&[String], usize> = HashMap::new();
            for reference in &refs {
                for (ngram, count) in ngram_counts(reference, order) {
                    let slot = max_ref_counts.entry(ngram).or_insert(0);
                    *slot = (*slot).max(count);
                }
            }

            let hyp_counts = ngram_counts(&hyp, order);
            let matches: usize = hyp_counts
                .iter()
                .map(|(ngram, count)| (*count).min(max_ref_counts.get(ngram).copied().unwrap_or(0)))
                .sum();

            self.correct[order - 1] += matches;
            self.total[order - 1] += hyp.len().saturating_sub(order - 1);
        }
    }

    /// BLEU on the 0-100 scale with exponential smoothing.
    /// A corpus without a single matching n-gram scores 0.
    pub fn score(&self) -> f64 {
        if self.correct.iter().all(|&c| c == 0) {
            return 0.0;
        }

        let mut precisions = [0.0f64; MAX_NGRAM_ORDER];
        let mut smooth = 1.0;

        for n in 0..MAX_NGRAM_ORDER {
            if self.total[n] == 0 {
                break;
            }
            if self.correct[n] == 0 {
                smooth *= 2.0;
                precisions[n] = 100.0 / (smooth * self.total[n] as f64);
            } else {
                precisions[n] = 100.0 * self.correct[n] as f64 / self.total[n] as f64;
            }
        }

        let brevity_penalty = if self.sys_len >= self.ref_len {
            1.0
        } else if self.sys_len == 0 {
            0.0
        } else {
            (1.0 - self.ref_len as f64 / self.sys_len as f64).exp()
        };

        let log_sum: f64 = precisions
            .iter()
            .map(|&p| if p > 0.0 { p.ln() } else { LOG_ZERO })
            .sum();

        brevity_penalty * (log_sum / MAX_NGRAM_ORDER as f64).exp()
    }
}

/// Corpus BLEU; `references` holds one stream per reference set. Every stream
/// must be at least as long as `candidates` (checked by `metrics::score`).
pub(crate) fn corpus_bleu(candidates: &[String], references: &[&[String]]) -> f64 {
    let mut stats = BleuStats::default();

    for (idx, candidate) in candidates.iter().enumerate() {
        let refs: Vec<&str> = references.iter().map(|stream| stream[idx].as_str()).collect();
        stats.add_segment(candidate, &refs);
    }

    stats.score()
}
