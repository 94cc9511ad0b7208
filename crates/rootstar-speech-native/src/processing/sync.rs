//! Cross-stream event synchronization
//!
//! Pairs audio trial-start markers with EEG trigger events:
//!
//! 1. **Anchor**: the EEG event whose onset is closest to the first audio
//!    event becomes the first usable EEG event. Everything before it was
//!    recorded before the audio recorder started.
//! 2. **Sequential matching**: a cursor walks forward through the anchored
//!    EEG events. Each `StartReading`/`StartSaying` audio event takes the
//!    first EEG event at or after the cursor with the same label, and the
//!    cursor moves past it. The cursor never moves back, so an EEG event is
//!    used at most once and trial order is preserved.
//!
//! Audio events without a counterpart are dropped and reported; they never
//! abort the run.
//!
//! ```text
//! audio:  SR:cat   ITI   SS:cat   Fix   SR:dog   SS:dog
//!           │               │              │        │
//! EEG:  ... SR     ITI      SS     Fix     SR  ...  SS
//!           ▲ anchor, cursor ─────────────────────────►
//! ```

use tracing::{debug, info};

use rootstar_speech_core::error::{check_sampling_rate, SyncError, SyncResult};
use rootstar_speech_core::types::{
    Annotation, EventLabel, EventsRow, RawEvent, StreamKind, StreamOnset, SynchronizedTrial,
};

use super::nearest::closest_index;

/// An eligible audio event that found no EEG counterpart
#[derive(Clone, Debug, PartialEq)]
pub struct UnmatchedMarker {
    /// Position in the audio event list
    pub position: usize,
    /// Marker label
    pub label: EventLabel,
    /// Marker word
    pub word: Option<String>,
    /// Audio onset sample index
    pub onset_index: usize,
}

/// A matched pair of positions in the input event lists
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatchedPair {
    /// Position in the audio event list
    pub audio: usize,
    /// Position in the (unanchored) EEG event list
    pub eeg: usize,
}

/// Result of one synchronization run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
    /// Synchronized trials in audio order
    pub trials: Vec<SynchronizedTrial>,
    /// Input positions behind every trial
    pub pairs: Vec<MatchedPair>,
    /// Position of the anchor in the EEG event list
    pub anchor: Option<usize>,
    /// EEG events discarded before the anchor
    pub discarded_before_anchor: usize,
    /// Eligible audio events without an EEG counterpart
    pub unmatched: Vec<UnmatchedMarker>,
    /// Audio events that are not trial starts
    pub skipped_markers: usize,
}

impl SyncReport {
    /// Number of trials, kept as dataset metadata
    #[must_use]
    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    /// Number of audio events that sought a match
    #[must_use]
    pub fn eligible_markers(&self) -> usize {
        self.trials.len() + self.unmatched.len()
    }

    /// Rows of the events table
    #[must_use]
    pub fn events_rows(&self) -> Vec<EventsRow> {
        self.trials.iter().map(SynchronizedTrial::events_row).collect()
    }

    /// Annotations for the EEG recording
    #[must_use]
    pub fn annotations(&self) -> Vec<Annotation> {
        self.trials.iter().map(SynchronizedTrial::annotation).collect()
    }
}

/// Position of the EEG event closest in time to `first_audio_onset`.
///
/// The earliest event wins a tie. `None` when there are no EEG events.
#[must_use]
pub fn anchor_index(eeg_events: &[RawEvent], first_audio_onset: f64) -> Option<usize> {
    let onsets: Vec<f64> = eeg_events.iter().map(|e| e.onset_timestamp).collect();
    closest_index(&onsets, first_audio_onset)
}

fn check_ordered(stream: StreamKind, events: &[RawEvent]) -> SyncResult<()> {
    match events
        .windows(2)
        .position(|pair| pair[1].onset_index < pair[0].onset_index)
    {
        Some(i) => Err(SyncError::NonMonotonicEvents {
            stream,
            position: i + 1,
            previous: events[i].onset_index,
            current: events[i + 1].onset_index,
        }),
        None => Ok(()),
    }
}

/// Pairs EEG and audio events into synchronized trials.
#[derive(Clone, Copy, Debug)]
pub struct Synchronizer {
    eeg_rate: f64,
    audio_rate: f64,
}

impl Synchronizer {
    /// Create a synchronizer for the two streams' sampling rates.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidSamplingRate`] for an unusable rate.
    pub fn new(eeg_rate: f64, audio_rate: f64) -> SyncResult<Self> {
        Ok(Self {
            eeg_rate: check_sampling_rate(StreamKind::Eeg, eeg_rate)?,
            audio_rate: check_sampling_rate(StreamKind::Audio, audio_rate)?,
        })
    }

    /// Synchronize two event lists.
    ///
    /// Empty inputs give an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NonMonotonicEvents`] if either list is not
    /// ordered by onset index.
    pub fn synchronize(&self, eeg_events: &[RawEvent], audio_events: &[RawEvent]) -> SyncResult<SyncReport> {
        check_ordered(StreamKind::Eeg, eeg_events)?;
        check_ordered(StreamKind::Audio, audio_events)?;

        let mut report = SyncReport::default();
        let Some(first_audio) = audio_events.first() else {
            return Ok(report);
        };

        report.anchor = anchor_index(eeg_events, first_audio.onset_timestamp);
        let anchor = report.anchor.unwrap_or(0);
        report.discarded_before_anchor = anchor;
        let anchored = &eeg_events[anchor..];
        debug!(
            anchor,
            discarded = anchor,
            first_audio_onset = first_audio.onset_timestamp,
            "Anchored EEG events"
        );

        let mut cursor = 0;
        for (position, audio) in audio_events.iter().enumerate() {
            if !audio.label.is_trial_start() {
                report.skipped_markers += 1;
                continue;
            }

            let found = anchored[cursor..]
                .iter()
                .position(|eeg| eeg.label == audio.label);
            let Some(offset) = found else {
                debug!(
                    position,
                    label = %audio.label,
                    word = audio.word.as_deref().unwrap_or("n/a"),
                    "No EEG event for audio marker"
                );
                report.unmatched.push(UnmatchedMarker {
                    position,
                    label: audio.label.clone(),
                    word: audio.word.clone(),
                    onset_index: audio.onset_index,
                });
                continue;
            };

            let matched = cursor + offset;
            cursor = matched + 1;
            let eeg = &anchored[matched];
            report.pairs.push(MatchedPair {
                audio: position,
                eeg: anchor + matched,
            });
            report.trials.push(SynchronizedTrial {
                trial_type: eeg.label.clone(),
                block: audio.block,
                word: audio.word.clone(),
                eeg: StreamOnset::from_event(eeg, self.eeg_rate),
                audio: StreamOnset::from_event(audio, self.audio_rate),
            });
        }

        info!(
            trials = report.trial_count(),
            unmatched = report.unmatched.len(),
            skipped = report.skipped_markers,
            "Synchronized EEG and audio events"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootstar_speech_core::types::{split_marker, BlockPhase};

    const EEG_RATE: f64 = 500.0;
    const AUDIO_RATE: f64 = 44_100.0;

    fn eeg_event(label: &str, onset: f64) -> RawEvent {
        RawEvent {
            label: EventLabel::parse(label),
            block: BlockPhase::Unset,
            word: None,
            onset_timestamp: onset,
            onset_index: (onset * EEG_RATE) as usize,
            duration_samples: 250,
        }
    }

    fn audio_event(marker: &str, onset: f64) -> RawEvent {
        let (label, word) = split_marker(marker);
        RawEvent {
            label,
            block: BlockPhase::Overt,
            word,
            onset_timestamp: onset,
            onset_index: (onset * AUDIO_RATE) as usize,
            duration_samples: 22_050,
        }
    }

    fn synchronizer() -> Synchronizer {
        Synchronizer::new(EEG_RATE, AUDIO_RATE).unwrap()
    }

    #[test]
    fn test_anchor_picks_closest_eeg_event() {
        let eeg = vec![
            eeg_event("StartReading", 10.0),
            eeg_event("StartReading", 10.5),
            eeg_event("StartReading", 20.0),
        ];
        assert_eq!(anchor_index(&eeg, 10.6), Some(1));

        let audio = vec![audio_event("StartReading:a", 10.6), audio_event("Fixation", 11.0)];
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        assert_eq!(report.anchor, Some(1));
        assert_eq!(report.discarded_before_anchor, 1);
        // The 10.0 event is gone; the match is the anchor itself
        assert_eq!(report.pairs, vec![MatchedPair { audio: 0, eeg: 1 }]);
        assert_eq!(report.trials[0].eeg.onset_index, 5250);
    }

    #[test]
    fn test_anchor_tie_prefers_earlier_event() {
        let eeg = vec![eeg_event("StartSaying", 1.0), eeg_event("StartSaying", 3.0)];
        assert_eq!(anchor_index(&eeg, 2.0), Some(0));
        assert_eq!(anchor_index(&[], 2.0), None);
    }

    #[test]
    fn test_word_extracted_from_marker() {
        let eeg = vec![eeg_event("StartSaying", 5.0)];
        let audio = vec![audio_event("StartSaying:apple", 5.0), audio_event("Fixation", 6.0)];
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        assert_eq!(report.trial_count(), 1);
        let trial = &report.trials[0];
        assert_eq!(trial.word.as_deref(), Some("apple"));
        assert_eq!(trial.trial_type, EventLabel::StartSaying);
        assert_eq!(trial.block, BlockPhase::Overt);
        assert!((trial.eeg.onset_seconds - 5.0).abs() < 1e-9);
        assert!((trial.eeg.duration_seconds - 0.5).abs() < 1e-9);
        assert!((trial.audio.duration_seconds - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_marker_without_word_still_matches() {
        let eeg = vec![eeg_event("StartReading", 1.0)];
        let audio = vec![audio_event("StartReading", 1.0)];
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        assert_eq!(report.trial_count(), 1);
        assert_eq!(report.trials[0].word, None);
    }

    #[test]
    fn test_only_trial_starts_are_matched() {
        let eeg = vec![
            eeg_event("StartBlockSaying", 0.0),
            eeg_event("StartReading", 1.0),
            eeg_event("ITI", 2.0),
            eeg_event("StartSaying", 3.0),
            eeg_event("Fixation", 4.0),
        ];
        let audio = vec![
            audio_event("StartBlockSaying", 0.0),
            audio_event("StartReading:sun", 1.0),
            audio_event("ITI", 2.0),
            audio_event("StartSaying:sun", 3.0),
            audio_event("Fixation", 4.0),
        ];
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        let types: Vec<&str> = report.trials.iter().map(|t| t.trial_type.as_str()).collect();
        assert_eq!(types, vec!["StartReading", "StartSaying"]);
        assert_eq!(report.skipped_markers, 3);
        assert!(report.unmatched.is_empty());
    }

    #[test]
    fn test_unmatched_marker_leaves_cursor_in_place() {
        let eeg = vec![
            eeg_event("StartReading", 1.0),
            eeg_event("StartSaying", 2.0),
            eeg_event("StartReading", 3.0),
        ];
        let audio = vec![
            audio_event("StartReading:a", 1.0),
            // No EEG counterpart anywhere
            audio_event("StartReadingPractice:x", 1.5),
            audio_event("StartSaying:a", 2.0),
            audio_event("StartReading:b", 3.0),
        ];
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        assert_eq!(report.unmatched.len(), 1);
        assert_eq!(report.unmatched[0].position, 1);
        assert_eq!(report.unmatched[0].word.as_deref(), Some("x"));
        // The failed search did not consume the StartSaying at position 1
        assert_eq!(
            report.pairs,
            vec![
                MatchedPair { audio: 0, eeg: 0 },
                MatchedPair { audio: 2, eeg: 1 },
                MatchedPair { audio: 3, eeg: 2 },
            ]
        );
    }

    #[test]
    fn test_cursor_never_reuses_eeg_event() {
        let eeg = vec![eeg_event("StartSaying", 1.0), eeg_event("Fixation", 2.0)];
        let audio = vec![
            audio_event("StartSaying:one", 1.0),
            audio_event("StartSaying:two", 1.2),
            audio_event("StartSaying:three", 1.4),
        ];
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        assert_eq!(report.trial_count(), 1);
        assert_eq!(report.trials[0].word.as_deref(), Some("one"));
        assert_eq!(report.unmatched.len(), 2);
    }

    #[test]
    fn test_cursor_does_not_backtrack_to_skipped_events() {
        // The StartReading at 1.0 is passed over while matching StartSaying
        let eeg = vec![
            eeg_event("StartSaying", 0.5),
            eeg_event("StartReading", 1.0),
            eeg_event("StartSaying", 2.0),
        ];
        let audio = vec![
            audio_event("StartSaying:a", 0.5),
            audio_event("StartSaying:b", 2.0),
            audio_event("StartReading:c", 2.5),
        ];
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        assert_eq!(report.trial_count(), 2);
        assert_eq!(report.unmatched.len(), 1);
        assert_eq!(report.unmatched[0].label, EventLabel::StartReading);
    }

    #[test]
    fn test_output_bounded_by_eligible_markers() {
        let eeg: Vec<RawEvent> = (0..40)
            .map(|i| {
                let label = ["StartReading", "ITI", "StartSaying", "Fixation"][i % 4];
                eeg_event(label, i as f64)
            })
            .collect();
        let audio: Vec<RawEvent> = (0..60)
            .map(|i| {
                let marker = ["StartReading:w", "ITI", "StartSaying:w", "Fixation", "StartSaying:x"][i % 5];
                audio_event(marker, i as f64 * 0.7)
            })
            .collect();
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        let eligible = audio.iter().filter(|e| e.label.is_trial_start()).count();
        assert!(report.trial_count() <= eligible);
        assert!(eligible <= audio.len());
        assert_eq!(report.eligible_markers(), eligible);
        assert_eq!(report.skipped_markers + eligible, audio.len());
        assert!(report.pairs.windows(2).all(|w| w[0].eeg < w[1].eeg && w[0].audio < w[1].audio));
        for (pair, trial) in report.pairs.iter().zip(&report.trials) {
            assert_eq!(eeg[pair.eeg].label, trial.trial_type);
        }
    }

    #[test]
    fn test_label_match_is_exact() {
        let eeg = vec![eeg_event("StartSayingPractice", 1.0), eeg_event("StartSaying", 2.0)];
        let audio = vec![audio_event("StartSaying:a", 1.0)];
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        assert_eq!(report.pairs, vec![MatchedPair { audio: 0, eeg: 1 }]);
    }

    #[test]
    fn test_verbatim_label_matches_by_spelling() {
        let eeg = vec![eeg_event("StartSaying", 1.0)];
        let mut audio = audio_event("StartSaying:a", 1.0);
        audio.label = EventLabel::Other("StartSaying".to_owned());
        let report = synchronizer().synchronize(&eeg, &[audio]).unwrap();
        assert_eq!(report.trial_count(), 1);
        assert!(report.unmatched.is_empty());
        assert_eq!(report.trials[0].word.as_deref(), Some("a"));
    }

    #[test]
    fn test_empty_inputs() {
        let eeg = vec![eeg_event("StartSaying", 1.0)];
        let audio = vec![audio_event("StartSaying:a", 1.0)];

        let report = synchronizer().synchronize(&eeg, &[]).unwrap();
        assert_eq!(report, SyncReport::default());

        let report = synchronizer().synchronize(&[], &audio).unwrap();
        assert_eq!(report.trial_count(), 0);
        assert_eq!(report.anchor, None);
        assert_eq!(report.unmatched.len(), 1);
    }

    #[test]
    fn test_out_of_order_events_are_fatal() {
        let eeg = vec![eeg_event("StartSaying", 2.0), eeg_event("StartSaying", 1.0)];
        let audio = vec![audio_event("StartSaying:a", 1.0)];
        let err = synchronizer().synchronize(&eeg, &audio).unwrap_err();
        assert!(matches!(
            err,
            SyncError::NonMonotonicEvents {
                stream: StreamKind::Eeg,
                position: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_rates() {
        assert!(Synchronizer::new(0.0, AUDIO_RATE).is_err());
        assert!(Synchronizer::new(EEG_RATE, f64::NAN).is_err());
    }

    #[test]
    fn test_report_tables() {
        let eeg = vec![eeg_event("StartSaying", 5.0)];
        let audio = vec![audio_event("StartSaying:apple", 5.0)];
        let report = synchronizer().synchronize(&eeg, &audio).unwrap();
        assert_eq!(report.events_rows()[0].word, "apple");
        assert_eq!(report.annotations()[0].description, "StartSaying_apple");
    }
}
