// Translation edit rate with block shifts (tercom-style greedy search)

const MAX_SHIFT_SIZE: usize = 10;
const MAX_SHIFT_DIST: usize = 50;
const MAX_SHIFT_CANDIDATES: usize = 1000;
const BEAM_WIDTH: usize = 25;
const UNREACHABLE: usize = usize::MAX / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditOp {
    Match,
    Substitute,
    /// Hypothesis word with no reference counterpart
    Insert,
    /// Reference word missing from the hypothesis
    Delete,
}

/// Lower-cased whitespace tokens
pub fn tokenize_ter(line: &str) -> Vec<String> {
    line.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Word-level Levenshtein distance with its edit trace, searched within a
/// band around the length-scaled diagonal. Falls back to the full matrix when
/// the band cannot reach the last cell.
fn edit_distance(hyp: &[&str], reference: &[&str]) -> (usize, Vec<EditOp>) {
    let (distance, trace) = banded_edit_distance(hyp, reference, BEAM_WIDTH);
    if distance < UNREACHABLE {
        return (distance, trace);
    }
    banded_edit_distance(hyp, reference, usize::MAX)
}

fn banded_edit_distance(hyp: &[&str], reference: &[&str], beam: usize) -> (usize, Vec<EditOp>) {
    let rows = hyp.len() + 1;
    let cols = reference.len() + 1;
    let mut cost = vec![UNREACHABLE; rows * cols];
    let mut ops = vec![EditOp::Match; rows * cols];

    for j in 0..cols {
        cost[j] = j;
        ops[j] = EditOp::Delete;
    }

    let length_ratio = if hyp.is_empty() {
        1.0
    } else {
        reference.len() as f64 / hyp.len() as f64
    };

    for i in 1..rows {
        let diagonal = (i as f64 * length_ratio).floor() as usize;
        let min_j = diagonal.saturating_sub(beam);
        let max_j = if i == hyp.len() {
            cols
        } else {
            cols.min(diagonal.saturating_add(beam))
        };

        for j in min_j..max_j {
            let here = i * cols + j;
            if j == 0 {
                cost[here] = cost[(i - 1) * cols] + 1;
                ops[here] = EditOp::Insert;
                continue;
            }

            // ties keep the earlier candidate: diagonal, then reference side, then hypothesis side
            let same = hyp[i - 1] == reference[j - 1];
            let mut best = (
                cost[(i - 1) * cols + j - 1] + usize::from(!same),
                if same { EditOp::Match } else { EditOp::Substitute },
            );

            let missing = cost[i * cols + j - 1] + 1;
            if best.0 > missing {
                best = (missing, EditOp::Delete);
            }

            let extra = cost[(i - 1) * cols + j] + 1;
            if best.0 > extra {
                best = (extra, EditOp::Insert);
            }

            cost[here] = best.0;
            ops[here] = best.1;
        }
    }

    let distance = cost[rows * cols - 1];
    if distance >= UNREACHABLE {
        return (UNREACHABLE, Vec::new());
    }

    let mut trace = Vec::with_capacity(rows.max(cols));
    let (mut i, mut j) = (hyp.len(), reference.len());
    while i > 0 || j > 0 {
        let op = ops[i * cols + j];
        trace.push(op);
        match op {
            EditOp::Match | EditOp::Substitute => {
                i -= 1;
                j -= 1;
            }
            EditOp::Insert => i -= 1,
            EditOp::Delete => j -= 1,
        }
    }
    trace.reverse();

    (distance, trace)
}

/// Reference position -> aligned hypothesis position (-1 before the first word),
/// plus per-word error flags on each side
fn trace_to_alignment(trace: &[EditOp]) -> (Vec<i64>, Vec<bool>, Vec<bool>) {
    let mut pos_hyp: i64 = -1;
    let mut alignment = Vec::new();
    let mut ref_err = Vec::new();
    let mut hyp_err = Vec::new();

    for op in trace {
        match op {
            EditOp::Match | EditOp::Substitute => {
                let err = *op == EditOp::Substitute;
                pos_hyp += 1;
                alignment.push(pos_hyp);
                hyp_err.push(err);
                ref_err.push(err);
            }
            EditOp::Insert => {
                pos_hyp += 1;
                hyp_err.push(true);
            }
            EditOp::Delete => {
                alignment.push(pos_hyp);
                ref_err.push(true);
            }
        }
    }

    (alignment, ref_err, hyp_err)
}

/// Matching word runs that could be moved: (hyp start, ref start, length)
fn shifted_pairs(hyp: &[&str], reference: &[&str]) -> Vec<(usize, usize, usize)> {
    let mut pairs = Vec::new();

    for start_h in 0..hyp.len() {
        for start_r in 0..reference.len() {
            if start_h.abs_diff(start_r) > MAX_SHIFT_DIST {
                continue;
            }

            let mut length = 0;
            while length < MAX_SHIFT_SIZE && hyp[start_h + length] == reference[start_r + length] {
                length += 1;
                pairs.push((start_h, start_r, length));
                if start_h + length == hyp.len() || start_r + length == reference.len() {
                    break;
                }
            }
        }
    }

    pairs
}

fn span<'a, 'b>(words: &'b [&'a str], from: usize, to: usize) -> &'b [&'a str] {
    let to = to.min(words.len());
    let from = from.min(to);
    &words[from..to]
}

/// Move `words[start..start + length]` so it begins at `target`
fn perform_shift<'a>(words: &[&'a str], start: usize, length: usize, target: usize) -> Vec<&'a str> {
    let end = start + length;
    let parts: [&[&str]; 4] = if target < start {
        [
            span(words, 0, target),
            span(words, start, end),
            span(words, target, start),
            span(words, end, words.len()),
        ]
    } else if target > end {
        [
            span(words, 0, start),
            span(words, end, target),
            span(words, start, end),
            span(words, target, words.len()),
        ]
    } else {
        [
            span(words, 0, start),
            span(words, end, length + target),
            span(words, start, end),
            span(words, length + target, words.len()),
        ]
    };

    parts.concat()
}

/// Best single shift: (edit reduction, shifted words)
fn best_shift<'a>(words: &[&'a str], reference: &[&str], checked: &mut usize) -> (i64, Vec<&'a str>) {
    let (pre_score, trace) = edit_distance(words, reference);
    let (alignment, ref_err, hyp_err) = trace_to_alignment(&trace);

    // ranked by (reduction, length, earlier start, earlier target)
    let mut best: Option<((i64, usize, i64, i64), Vec<&'a str>)> = None;

    for (start_h, start_r, length) in shifted_pairs(words, reference) {
        if !hyp_err[start_h..start_h + length].iter().any(|&e| e) {
            continue;
        }
        if !ref_err[start_r..start_r + length].iter().any(|&e| e) {
            continue;
        }

        let aligned = alignment[start_r];
        if start_h as i64 <= aligned && aligned < (start_h + length) as i64 {
            continue;
        }

        let mut prev_idx: i64 = -1;
        for offset in -1..length as i64 {
            let ref_pos = start_r as i64 + offset;
            let idx = if ref_pos == -1 {
                0
            } else if let Some(&hyp_pos) = alignment.get(ref_pos as usize) {
                hyp_pos + 1
            } else {
                break;
            };

            if idx == prev_idx {
                continue;
            }
            prev_idx = idx;

            let shifted = perform_shift(words, start_h, length, idx as usize);
            let reduction = pre_score as i64 - edit_distance(&shifted, reference).0 as i64;
            *checked += 1;

            let rank = (reduction, length, -(start_h as i64), -idx);
            if best.as_ref().is_none_or(|(best_rank, _)| rank > *best_rank) {
                best = Some((rank, shifted));
            }
        }

        if *checked >= MAX_SHIFT_CANDIDATES {
            break;
        }
    }

    match best {
        Some(((reduction, ..), shifted)) => (reduction, shifted),
        None => (0, words.to_vec()),
    }
}

/// Edits (including shifts) needed to turn `hyp` into `reference`
pub fn sentence_edits(hyp: &[String], reference: &[String]) -> usize {
    if reference.is_empty() {
        return hyp.len();
    }

    let reference: Vec<&str> = reference.iter().map(String::as_str).collect();
    let mut words: Vec<&str> = hyp.iter().map(String::as_str).collect();
    let mut shifts = 0;
    let mut checked = 0;

    loop {
        let (reduction, shifted) = best_shift(&words, &reference, &mut checked);
        if checked >= MAX_SHIFT_CANDIDATES || reduction <= 0 {
            break;
        }
        shifts += 1;
        words = shifted;
    }

    shifts + edit_distance(&words, &reference).0
}

/// Corpus TER on the 0-100 scale. Each segment uses the reference needing the
/// fewest edits, normalized by the average reference length.
pub(crate) fn corpus_ter(candidates: &[String], references: &[&[String]]) -> f64 {
    let mut total_edits = 0.0;
    let mut total_ref_len = 0.0;

    for (idx, candidate) in candidates.iter().enumerate() {
        let hyp = tokenize_ter(candidate);
        let mut best_edits = usize::MAX;
        let mut ref_len_sum = 0usize;

        for stream in references {
            let reference = tokenize_ter(&stream[idx]);
            best_edits = best_edits.min(sentence_edits(&hyp, &reference));
            ref_len_sum += reference.len();
        }

        if references.is_empty() {
            continue;
        }

        total_edits += best_edits as f64;
        total_ref_len += ref_len_sum as f64 / references.len() as f64;
    }

    if total_ref_len > 0.0 {
        100.0 * total_edits / total_ref_len
    } else if total_edits > 0.0 {
        100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn words(text: &str) -> Vec<String> {
        tokenize_ter(text)
    }

    #[test]
    fn test_identical_has_no_edits() {
        let refs = lines(&["The cat sat on the mat.", "It was raining."]);
        assert_eq!(corpus_ter(&refs, &[refs.as_slice()]), 0.0);
    }

    #[test]
    fn test_case_is_ignored() {
        assert_eq!(sentence_edits(&words("THE Cat"), &words("the cat")), 0);
    }

    #[test]
    fn test_substitution_and_deletion() {
        assert_eq!(sentence_edits(&words("a b c"), &words("a x c")), 1);
        assert_eq!(sentence_edits(&words("a b"), &words("a b c d")), 2);
        assert_eq!(sentence_edits(&words(""), &words("a b c")), 3);
    }

    #[test]
    fn test_block_shift_counts_once() {
        // moving "on monday" to the end is one shift instead of four edits
        let hyp = words("on monday we went to the market");
        let reference = words("we went to the market on monday");
        assert_eq!(sentence_edits(&hyp, &reference), 1);
    }

    #[test]
    fn test_perform_shift() {
        let items = ["a", "b", "c", "d", "e"];
        assert_eq!(perform_shift(&items, 3, 2, 0), vec!["d", "e", "a", "b", "c"]);
        assert_eq!(perform_shift(&items, 0, 2, 5), vec!["c", "d", "e", "a", "b"]);
    }

    #[test]
    fn test_uses_best_reference_and_average_length() {
        let hyp = lines(&["a b c d"]);
        let ref_a = lines(&["a b c d"]);
        let ref_b = lines(&["w x y z q r"]);
        // zero edits against the first reference, average length (4 + 6) / 2
        assert_eq!(corpus_ter(&hyp, &[ref_a.as_slice(), ref_b.as_slice()]), 0.0);

        let miss = lines(&["a b c e"]);
        let score = corpus_ter(&miss, &[ref_a.as_slice(), ref_b.as_slice()]);
        assert!((score - 20.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_disjoint_is_positive() {
        let refs = lines(&["the cat sat"]);
        let hyp = lines(&["dogs run fast"]);
        assert!((corpus_ter(&hyp, &[refs.as_slice()]) - 100.0).abs() < 1e-9);
    }

    fn edits_without_band(hyp: &[&str], reference: &[&str]) -> usize {
        banded_edit_distance(hyp, reference, usize::MAX).0
    }

    #[test]
    fn test_band_matches_full_matrix_on_short_segments() {
        let hyp = ["the", "cat", "sat", "on", "a", "mat"];
        let reference = ["a", "cat", "was", "sitting", "on", "the", "mat"];
        assert_eq!(edit_distance(&hyp, &reference).0, edits_without_band(&hyp, &reference));
        assert_eq!(edit_distance(&hyp, &reference).0, 4);
    }

    #[test]
    fn test_band_limits_long_unbalanced_alignment() {
        // the only cheap alignment matches the hypothesis tail against the
        // reference head, far outside the band around the diagonal
        let reference: Vec<String> = (0..60).map(|i| format!("r{}", i)).collect();
        let mut hyp: Vec<String> = (0..30).map(|i| format!("h{}", i)).collect();
        hyp.extend((0..30).map(|i| format!("r{}", i)));

        let hyp: Vec<&str> = hyp.iter().map(String::as_str).collect();
        let reference: Vec<&str> = reference.iter().map(String::as_str).collect();

        let full = edits_without_band(&hyp, &reference);
        let (banded, trace) = edit_distance(&hyp, &reference);

        assert_eq!(full, 60);
        assert!(banded >= full);
        let consumed_hyp = trace
            .iter()
            .filter(|op| !matches!(op, EditOp::Delete))
            .count();
        assert_eq!(consumed_hyp, hyp.len());
    }

    #[test]
    fn test_tie_prefers_substitution_over_gap() {
        let (distance, trace) = edit_distance(&["a", "x"], &["a", "y"]);
        assert_eq!(distance, 1);
        assert_eq!(trace, vec![EditOp::Match, EditOp::Substitute]);
    }
}
