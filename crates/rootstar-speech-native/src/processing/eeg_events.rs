//! EEG event mapping
//!
//! Turns the corrected trigger code stream into [`RawEvent`]s: one event per
//! pair of consecutive rising edges, labelled by the code at the first edge,
//! with the block phase threaded through as a fold.

use tracing::debug;

use rootstar_speech_core::config::SyncConfig;
use rootstar_speech_core::error::{SyncError, SyncResult};
use rootstar_speech_core::transitions::{find_transitions, transition_pairs};
use rootstar_speech_core::trigger::{decode, TriggerCorrector, TriggerNormalizer};
use rootstar_speech_core::types::{BlockPhase, RawEvent, StreamKind, TriggerCode};

use crate::bridge::EegRecording;

/// Counts from one mapping pass, for logging and quality audits
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EegDecodeSummary {
    /// Rising-edge transitions found (including index 0)
    pub transitions: usize,
    /// Events kept
    pub kept: usize,
    /// Events discarded as shorter than the minimum pulse width
    pub discarded_short: usize,
}

/// Maps trigger transitions to EEG events.
#[derive(Clone, Copy, Debug)]
pub struct EegEventMapper {
    min_pulse_width: usize,
}

impl EegEventMapper {
    /// Create a mapper from the configuration
    #[must_use]
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            min_pulse_width: config.min_pulse_width_samples,
        }
    }

    /// Map consecutive transition pairs to events.
    ///
    /// `codes` and `timestamps` are indexed by sample. Events shorter than the
    /// minimum pulse width are dropped, but still update the block phase.
    /// The trailing transition never closes and produces no event.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LengthMismatch`] if `timestamps` and `codes`
    /// differ in length or a transition lies outside the code stream.
    pub fn map_events(
        &self,
        transitions: &[usize],
        codes: &[TriggerCode],
        timestamps: &[f64],
    ) -> SyncResult<(Vec<RawEvent>, EegDecodeSummary)> {
        if timestamps.len() != codes.len() {
            return Err(SyncError::LengthMismatch {
                stream: StreamKind::Eeg,
                what: "timestamps",
                expected: codes.len(),
                got: timestamps.len(),
            });
        }
        if let Some(&last) = transitions.last() {
            if last >= codes.len() {
                return Err(SyncError::LengthMismatch {
                    stream: StreamKind::Eeg,
                    what: "transitions",
                    expected: codes.len(),
                    got: last + 1,
                });
            }
        }

        let mut summary = EegDecodeSummary {
            transitions: transitions.len(),
            ..EegDecodeSummary::default()
        };
        let events: Vec<RawEvent> = transition_pairs(transitions)
            .scan(BlockPhase::Unset, |phase, (start, end)| {
                let label = decode(i64::from(codes[start].to_raw()));
                *phase = phase.advance(label.as_str());
                Some(RawEvent {
                    label: label.presentation(),
                    block: *phase,
                    word: None,
                    onset_timestamp: timestamps[start],
                    onset_index: start,
                    duration_samples: end - start,
                })
            })
            .filter(|event| {
                let keep = event.duration_samples >= self.min_pulse_width;
                if !keep {
                    summary.discarded_short += 1;
                }
                keep
            })
            .collect();
        summary.kept = events.len();

        Ok((events, summary))
    }

    /// Run the whole trigger chain on a recording.
    ///
    /// Normalizes and corrects the trigger channel, finds rising edges and maps
    /// them to events with absolute onset times.
    ///
    /// # Errors
    ///
    /// Propagates structural faults from normalization and mapping.
    pub fn extract(&self, recording: &EegRecording) -> SyncResult<Vec<RawEvent>> {
        let normalized = TriggerNormalizer::normalize(&recording.trigger)?;
        let codes = TriggerCorrector::shared().correct(&normalized);
        let transitions = find_transitions(&codes);

        let timestamps = recording.absolute_timestamps();
        let (events, summary) = self.map_events(&transitions, &codes, &timestamps)?;
        debug!(
            transitions = summary.transitions,
            kept = summary.kept,
            discarded_short = summary.discarded_short,
            "Decoded EEG trigger channel"
        );
        Ok(events)
    }
}

impl Default for EegEventMapper {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}
