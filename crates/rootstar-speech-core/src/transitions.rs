//! Transition detection on the corrected trigger code stream
//!
//! Each logical event is signalled by a rising pulse, so only rising edges
//! open a new event. Falling edges are not boundaries: an event lasts until
//! the next rising edge.

/// Find the sample indices where the code stream rises.
///
/// The result is strictly increasing and starts with `0` for any non-empty
/// input, so the segment before the first pulse is always represented. An
/// empty input yields an empty result.
///
/// # Example
///
/// ```
/// use rootstar_speech_core::transitions::find_transitions;
///
/// assert_eq!(find_transitions(&[8, 8, 255, 255, 8, 8, 192, 192, 8]), vec![0, 2, 6]);
/// assert_eq!(find_transitions(&[255, 192, 8]), vec![0]);
/// ```
#[must_use]
pub fn find_transitions<T: PartialOrd>(codes: &[T]) -> Vec<usize> {
    if codes.is_empty() {
        return Vec::new();
    }
    core::iter::once(0)
        .chain(
            codes
                .windows(2)
                .enumerate()
                .filter(|(_, pair)| pair[1] > pair[0])
                .map(|(i, _)| i + 1),
        )
        .collect()
}

/// Consecutive `(start, end)` pairs of a transition list.
///
/// The final transition never closes, so `n` transitions give `n - 1` pairs.
pub fn transition_pairs(transitions: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    transitions.windows(2).map(|pair| (pair[0], pair[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TriggerCode;

    #[test]
    fn test_rising_edges_only() {
        let codes = [
            TriggerCode::EXPERIMENT_ENDED,
            TriggerCode::START_SAYING,
            TriggerCode::START_READING,
            TriggerCode::EXPERIMENT_ENDED,
            TriggerCode::EXPERIMENT_ENDED,
            TriggerCode::END_SAYING,
        ];
        assert_eq!(find_transitions(&codes), vec![0, 1, 2, 5]);
    }

    #[test]
    fn test_never_rising_signal_keeps_origin() {
        assert_eq!(find_transitions(&[5u8, 5, 5, 5]), vec![0]);
        assert_eq!(find_transitions(&[9u8, 7, 3]), vec![0]);
        assert_eq!(find_transitions(&[1u8]), vec![0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(find_transitions::<u8>(&[]).is_empty());
    }

    #[test]
    fn test_output_strictly_increasing_from_zero() {
        let codes: Vec<u8> = (0..500u32).map(|i| ((i * 37) % 11) as u8).collect();
        let transitions = find_transitions(&codes);
        assert_eq!(transitions[0], 0);
        assert!(transitions.windows(2).all(|w| w[0] < w[1]));
        for &t in &transitions[1..] {
            assert!(codes[t] > codes[t - 1]);
        }
    }

    #[test]
    fn test_rise_at_index_one_is_not_duplicated() {
        assert_eq!(find_transitions(&[0u8, 255]), vec![0, 1]);
    }

    #[test]
    fn test_pairs_drop_open_tail() {
        let pairs: Vec<_> = transition_pairs(&[0, 2, 6]).collect();
        assert_eq!(pairs, vec![(0, 2), (2, 6)]);
        assert_eq!(transition_pairs(&[0]).count(), 0);
    }
}
