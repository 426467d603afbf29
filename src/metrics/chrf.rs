use std::collections::HashMap;

pub const CHAR_ORDER: usize = 6;
pub const BETA: f64 = 2.0;

/// Per n-gram order: (hypothesis n-grams, reference n-grams, matches)
pub type ChrfStats = [[usize; 3]; CHAR_ORDER];

fn char_ngrams(text: &str, order: usize) -> HashMap<String, usize> {
    let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut counts = HashMap::new();
    if chars.len() < order {
        return counts;
    }
    for window in chars.windows(order) {
        *counts.entry(window.iter().collect::<String>()).or_insert(0) += 1;
    }
    counts
}

fn all_char_ngrams(text: &str) -> Vec<HashMap<String, usize>> {
    (1..=CHAR_ORDER).map(|order| char_ngrams(text, order)).collect()
}

fn match_statistics(hyp: &[HashMap<String, usize>], reference: &[HashMap<String, usize>]) -> ChrfStats {
    let mut stats = [[0usize; 3]; CHAR_ORDER];

    for (order, (hyp_counts, ref_counts)) in hyp.iter().zip(reference).enumerate() {
        let matches: usize = hyp_counts
            .iter()
            .map(|(ngram, count)| (*count).min(ref_counts.get(ngram).copied().unwrap_or(0)))
            .sum();
        let n_hyp: usize = hyp_counts.values().sum();
        let n_ref: usize = ref_counts.values().sum();

        stats[order] = [n_hyp, n_ref, matches];
    }

    stats
}

/// chrF on the 0-100 scale from accumulated statistics
pub fn f_score(stats: &ChrfStats) -> f64 {
    let factor = BETA * BETA;
    let mut avg_prec = 0.0;
    let mut avg_rec = 0.0;
    let mut effective_order = 0;

    for &[n_hyp, n_ref, n_match] in stats {
        if n_hyp > 0 && n_ref > 0 {
            avg_prec += n_match as f64 / n_hyp as f64;
            avg_rec += n_match as f64 / n_ref as f64;
            effective_order += 1;
        }
    }

    if effective_order == 0 {
        return 0.0;
    }

    avg_prec /= effective_order as f64;
    avg_rec /= effective_order as f64;

    if avg_prec + avg_rec == 0.0 {
        return 0.0;
    }

    100.0 * (1.0 + factor) * avg_prec * avg_rec / (factor * avg_prec + avg_rec)
}

/// Statistics of one hypothesis against the reference it matches best
pub fn segment_statistics(hypothesis: &str, references: &[&str]) -> ChrfStats {
    let hyp_ngrams = all_char_ngrams(hypothesis);
    let mut best_stats = [[0usize; 3]; CHAR_ORDER];
    let mut best_score = -1.0;

    for reference in references {
        let stats = match_statistics(&hyp_ngrams, &all_char_ngrams(reference));
        let score = f_score(&stats);
        if score > best_score {
            best_score = score;
            best_stats = stats;
        }
    }

    best_stats
}

/// Corpus chrF; statistics are summed over segments before the F-score
pub(crate) fn corpus_chrf(candidates: &[String], references: &[&[String]]) -> f64 {
    let mut totals = [[0usize; 3]; CHAR_ORDER];

    for (idx, candidate) in candidates.iter().enumerate() {
        let refs: Vec<&str> = references.iter().map(|stream| stream[idx].as_str()).collect();
        let stats = segment_statistics(candidate, &refs);

        for (total, segment) in totals.iter_mut().zip(stats.iter()) {
            for k in 0..3 {
                total[k] += segment[k];
            }
        }
    }

    f_score(&totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_scores_100() {
        let refs = lines(&["Der Hund bellt.", "Die Katze schläft."]);
        let score = corpus_chrf(&refs, &[refs.as_slice()]);
        assert!((score - 100.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let refs = lines(&["ab cd"]);
        let hyp = lines(&["abcd"]);
        assert!((corpus_chrf(&hyp, &[refs.as_slice()]) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_scores_zero() {
        let refs = lines(&["aaaa"]);
        let hyp = lines(&["zzzz"]);
        assert_eq!(corpus_chrf(&hyp, &[refs.as_slice()]), 0.0);
    }

    #[test]
    fn test_best_reference_is_chosen_per_segment() {
        let hyp = "the cat";
        let stats = segment_statistics(hyp, &["a dog", "the cat"]);
        assert!((f_score(&stats) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_hypothesis_scores_zero() {
        let refs = lines(&["something"]);
        let hyp = lines(&[""]);
        assert_eq!(corpus_chrf(&hyp, &[refs.as_slice()]), 0.0);
    }
}
