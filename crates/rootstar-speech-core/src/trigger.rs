//! Trigger channel decoding
//!
//! The amplifier records the trigger port as an analog channel. Pulses arrive
//! inverted, scaled by the amplifier gain and smeared by the ADC, so three
//! steps are needed to recover event codes:
//!
//! 1. [`TriggerNormalizer`] rescales the raw channel to `0..=255`
//! 2. [`TriggerCorrector`] snaps each value to the nearest [`TriggerCode`]
//! 3. [`decode`] maps any integer to an [`EventLabel`]
//!
//! Nearest-code ties always resolve to the lowest code value.

use crate::error::{SyncError, SyncResult};
use crate::types::{EventLabel, StreamKind, TriggerCode};

/// Full scale of the normalized trigger channel
pub const TRIGGER_FULL_SCALE: u8 = u8::MAX;

/// Nearest alphabet member to `value` (lowest code wins a tie).
const fn nearest_code(value: u8) -> TriggerCode {
    let mut best = TriggerCode::ALPHABET[0];
    let mut best_distance = value.abs_diff(best.to_raw());
    let mut i = 1;
    while i < TriggerCode::ALPHABET.len() {
        let code = TriggerCode::ALPHABET[i];
        let distance = value.abs_diff(code.to_raw());
        if distance < best_distance
            || (distance == best_distance && code.to_raw() < best.to_raw())
        {
            best = code;
            best_distance = distance;
        }
        i += 1;
    }
    best
}

const fn build_lookup() -> [TriggerCode; 256] {
    let mut table = [TriggerCode::EXPERIMENT_ENDED; 256];
    let mut value = 0;
    while value < 256 {
        table[value] = nearest_code(value as u8);
        value += 1;
    }
    table
}

static SHARED_CORRECTOR: TriggerCorrector = TriggerCorrector {
    lookup: build_lookup(),
};

/// Decode any integer trigger value to its event label.
///
/// Exact alphabet members return their own label. Any other value returns the
/// label of the numerically nearest member; when two members are equally
/// close the lower one wins. Never fails.
///
/// ```
/// use rootstar_speech_core::trigger::decode;
/// use rootstar_speech_core::types::EventLabel;
///
/// assert_eq!(decode(255), EventLabel::StartReading);
/// assert_eq!(decode(1000), EventLabel::StartReading);
/// // 176 sits halfway between 160 and 192
/// assert_eq!(decode(176), EventLabel::EndSaying);
/// assert_eq!(decode(-40), EventLabel::ExperimentEnded);
/// ```
#[must_use]
pub fn decode(code: i64) -> EventLabel {
    let mut best = TriggerCode::ALPHABET[0];
    let mut best_distance = code.abs_diff(i64::from(best.to_raw()));
    for candidate in TriggerCode::ALPHABET.iter().skip(1).copied() {
        let distance = code.abs_diff(i64::from(candidate.to_raw()));
        if distance < best_distance || (distance == best_distance && candidate < best) {
            best = candidate;
            best_distance = distance;
        }
    }
    best.label()
}

/// Rescales a raw analog trigger channel to `0..=255`.
pub struct TriggerNormalizer;

impl TriggerNormalizer {
    /// Invert and rescale `raw` so its extremes map to 0 and 255.
    ///
    /// The inverted minimum maps to 0 and the inverted maximum to 255, with
    /// rounding to the nearest integer. A flat channel carries no pulses and
    /// normalizes to all zeros; an empty channel gives an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NonFiniteSample`] if any sample is NaN or infinite.
    pub fn normalize(raw: &[f64]) -> SyncResult<Vec<u8>> {
        if let Some(index) = raw.iter().position(|v| !v.is_finite()) {
            return Err(SyncError::NonFiniteSample {
                stream: StreamKind::Eeg,
                what: "trigger sample",
                index,
            });
        }

        // Extremes of the inverted signal
        let (min, max) = raw.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(-v), hi.max(-v))
        });
        let span = max - min;
        if raw.is_empty() || span <= 0.0 {
            return Ok(vec![0; raw.len()]);
        }

        let scale = f64::from(TRIGGER_FULL_SCALE) / span;
        Ok(raw
            .iter()
            .map(|&v| ((-v - min) * scale).round().clamp(0.0, 255.0) as u8)
            .collect())
    }
}

/// Snaps normalized trigger values to alphabet members.
///
/// Backed by a lookup table covering every value in `0..=255`, computed at
/// compile time.
#[derive(Clone)]
pub struct TriggerCorrector {
    lookup: [TriggerCode; 256],
}

impl TriggerCorrector {
    /// Build a corrector
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lookup: build_lookup(),
        }
    }

    /// Process-wide corrector instance
    #[must_use]
    pub fn shared() -> &'static Self {
        &SHARED_CORRECTOR
    }

    /// Nearest alphabet member for one normalized value
    #[inline]
    #[must_use]
    pub fn correct_one(&self, value: u8) -> TriggerCode {
        self.lookup[usize::from(value)]
    }

    /// Correct a whole normalized channel
    #[must_use]
    pub fn correct(&self, normalized: &[u8]) -> Vec<TriggerCode> {
        normalized.iter().map(|&v| self.correct_one(v)).collect()
    }
}

impl Default for TriggerCorrector {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TriggerCorrector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TriggerCorrector").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_exact_codes() {
        for code in TriggerCode::ALPHABET {
            assert_eq!(decode(i64::from(code.to_raw())), code.label());
        }
    }

    #[test]
    fn test_decode_snaps_to_nearest() {
        assert_eq!(decode(250), EventLabel::StartReading);
        assert_eq!(decode(230), EventLabel::EndReading);
        assert_eq!(decode(100), EventLabel::StartBlockThinking);
        assert_eq!(decode(0), EventLabel::ExperimentEnded);
        assert_eq!(decode(i64::MAX), EventLabel::StartReading);
        assert_eq!(decode(i64::MIN), EventLabel::ExperimentEnded);
    }

    #[test]
    fn test_decode_tie_picks_lowest_code() {
        assert_eq!(decode(208), EventLabel::StartSaying); // 192 vs 224
        assert_eq!(decode(144), EventLabel::StartBlockSaying); // 128 vs 160
        assert_eq!(decode(12), EventLabel::ExperimentEnded); // 8 vs 16
        assert_eq!(decode(24), EventLabel::ExperimentStarted); // 16 vs 32
    }

    #[test]
    fn test_lookup_matches_decode() {
        let corrector = TriggerCorrector::new();
        for value in 0..=255u8 {
            let corrected = corrector.correct_one(value);
            assert!(TriggerCode::new(corrected.to_raw()).is_some());
            assert_eq!(corrected.label(), decode(i64::from(value)));
        }
    }

    #[test]
    fn test_normalize_inverts_and_rescales() {
        let raw = [0.0, -1.0, -2.0, -4.0, 0.0];
        let normalized = TriggerNormalizer::normalize(&raw).unwrap();
        assert_eq!(normalized, vec![0, 64, 128, 255, 0]);
    }

    #[test]
    fn test_normalize_with_offset_baseline() {
        // Baseline at +3, deepest pulse at -7
        let raw = [3.0, -7.0, 3.0];
        assert_eq!(TriggerNormalizer::normalize(&raw).unwrap(), vec![0, 255, 0]);
    }

    #[test]
    fn test_normalize_degenerate_inputs() {
        assert!(TriggerNormalizer::normalize(&[]).unwrap().is_empty());
        assert_eq!(TriggerNormalizer::normalize(&[2.5; 4]).unwrap(), vec![0; 4]);
    }

    #[test]
    fn test_normalize_rejects_nan() {
        let err = TriggerNormalizer::normalize(&[0.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, SyncError::NonFiniteSample { index: 1, .. }));
    }

    #[test]
    fn test_correct_channel() {
        let codes = TriggerCorrector::shared().correct(&[0, 250, 190, 3]);
        assert_eq!(
            codes,
            vec![
                TriggerCode::EXPERIMENT_ENDED,
                TriggerCode::START_READING,
                TriggerCode::START_SAYING,
                TriggerCode::EXPERIMENT_ENDED,
            ]
        );
    }
}
