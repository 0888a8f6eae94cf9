//! Evaluation of predicted changepoints against a known ground truth.

use crate::solution::Evaluation;

/// Greedy one-to-one matching within a tolerance window.
///
/// Predictions are visited in input order; each one consumes the first
/// still-unmatched reference changepoint within `window` samples. The
/// matching is asymmetric but deterministic.
pub fn classify_changepoints(
    reference: &[usize],
    predicted: &[usize],
    window: usize,
) -> Evaluation {
    let mut matched = vec![false; reference.len()];
    let mut correct = 0;
    for &prediction in predicted {
        for (index, &truth) in reference.iter().enumerate() {
            if !matched[index] && prediction.abs_diff(truth) <= window {
                matched[index] = true;
                correct += 1;
                break;
            }
        }
    }
    Evaluation {
        correct,
        incorrect: predicted.len() - correct,
        not_found: reference.len() - correct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_within_the_window() {
        let evaluation = classify_changepoints(&[100, 200], &[95, 205, 400], 10);
        assert_eq!(
            evaluation,
            Evaluation {
                correct: 2,
                incorrect: 1,
                not_found: 0
            }
        );
    }

    #[test]
    fn each_reference_is_consumed_once() {
        // Both predictions sit near the same truth; only one can match.
        let evaluation = classify_changepoints(&[100], &[95, 105], 10);
        assert_eq!(
            evaluation,
            Evaluation {
                correct: 1,
                incorrect: 1,
                not_found: 0
            }
        );
    }

    #[test]
    fn first_reference_wins_on_overlap() {
        // 105 is within the window of both 100 and 110; the lower index
        // is consumed first, leaving 110 for the second prediction.
        let evaluation = classify_changepoints(&[100, 110], &[105, 112], 10);
        assert_eq!(
            evaluation,
            Evaluation {
                correct: 2,
                incorrect: 0,
                not_found: 0
            }
        );
    }

    #[test]
    fn empty_inputs_classify_cleanly() {
        let evaluation = classify_changepoints(&[], &[1, 2], 10);
        assert_eq!(evaluation.incorrect, 2);
        let evaluation = classify_changepoints(&[5], &[], 10);
        assert_eq!(evaluation.not_found, 1);
        assert_eq!(evaluation.correct, 0);
    }
}
