//! Core types for Rootstar Speech
//!
//! This module provides the data model shared by every stage:
//! - Stream identifiers for the two independently clocked recorders
//! - The trigger code alphabet and its event labels
//! - Block phase tracking (overt vs. inert speech blocks)
//! - Raw per-stream events and the synchronized trial produced from them

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

// ============================================================================
// Streams
// ============================================================================

/// Which recorder a value came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    /// EEG amplifier with a hardware trigger channel
    Eeg,
    /// Audio recorder emitting text markers
    Audio,
}

impl StreamKind {
    /// Human readable stream name
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eeg => "EEG",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Trigger Codes
// ============================================================================

/// A member of the trigger code alphabet.
///
/// The experiment computer writes one of ten 8-bit values to the amplifier's
/// trigger port. Construction is restricted to alphabet members, so every
/// `TriggerCode` has exactly one [`EventLabel`].
///
/// # Example
///
/// ```
/// use rootstar_speech_core::types::{EventLabel, TriggerCode};
///
/// assert_eq!(TriggerCode::new(192), Some(TriggerCode::START_SAYING));
/// assert_eq!(TriggerCode::new(191), None);
/// assert_eq!(TriggerCode::START_SAYING.label(), EventLabel::StartSaying);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TriggerCode(u8);

impl TriggerCode {
    /// Reading prompt shown
    pub const START_READING: Self = Self(255);
    /// Reading prompt removed (presented as ITI)
    pub const END_READING: Self = Self(224);
    /// Speech cue shown
    pub const START_SAYING: Self = Self(192);
    /// Speech cue removed (presented as Fixation)
    pub const END_SAYING: Self = Self(160);
    /// Start of an overt speech block
    pub const START_BLOCK_SAYING: Self = Self(128);
    /// Start of an inert (imagined) speech block
    pub const START_BLOCK_THINKING: Self = Self(96);
    /// Experiment restarted by the operator
    pub const EXPERIMENT_RESTART: Self = Self(64);
    /// Resting period
    pub const EXPERIMENT_RESTING: Self = Self(32);
    /// Experiment started
    pub const EXPERIMENT_STARTED: Self = Self(16);
    /// Experiment ended
    pub const EXPERIMENT_ENDED: Self = Self(8);

    /// The full alphabet, in table order
    pub const ALPHABET: [Self; 10] = [
        Self::START_READING,
        Self::END_READING,
        Self::START_SAYING,
        Self::END_SAYING,
        Self::START_BLOCK_SAYING,
        Self::START_BLOCK_THINKING,
        Self::EXPERIMENT_RESTART,
        Self::EXPERIMENT_RESTING,
        Self::EXPERIMENT_STARTED,
        Self::EXPERIMENT_ENDED,
    ];

    /// Create from a raw value, if it is an alphabet member
    #[must_use]
    pub fn new(raw: u8) -> Option<Self> {
        Self::ALPHABET.iter().copied().find(|code| code.0 == raw)
    }

    /// Get the raw 8-bit value
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        self.0
    }

    /// Event label mapped to this code
    #[must_use]
    pub fn label(self) -> EventLabel {
        match self.0 {
            255 => EventLabel::StartReading,
            224 => EventLabel::EndReading,
            192 => EventLabel::StartSaying,
            160 => EventLabel::EndSaying,
            128 => EventLabel::StartBlockSaying,
            96 => EventLabel::StartBlockThinking,
            64 => EventLabel::ExperimentRestart,
            32 => EventLabel::ExperimentResting,
            16 => EventLabel::ExperimentStarted,
            _ => EventLabel::ExperimentEnded,
        }
    }
}

impl fmt::Display for TriggerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Event Labels
// ============================================================================

/// Name of an experiment event.
///
/// EEG events always carry one of the named variants. Audio markers are free
/// text; a marker spelling a known name parses to that variant, anything else
/// is kept verbatim in [`EventLabel::Other`]. Two labels are equal exactly when
/// their [`EventLabel::as_str`] spellings are equal, so
/// `Other("StartSaying")` equals `StartSaying`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventLabel {
    /// Reading prompt shown
    StartReading,
    /// Reading prompt removed (decode-time name)
    EndReading,
    /// Inter-trial interval (presentation name of [`EventLabel::EndReading`])
    Iti,
    /// Speech cue shown
    StartSaying,
    /// Speech cue removed (decode-time name)
    EndSaying,
    /// Fixation cross (presentation name of [`EventLabel::EndSaying`])
    Fixation,
    /// Start of an overt speech block
    StartBlockSaying,
    /// Start of an inert speech block
    StartBlockThinking,
    /// Experiment restarted
    ExperimentRestart,
    /// Resting period
    ExperimentResting,
    /// Experiment started
    ExperimentStarted,
    /// Experiment ended
    ExperimentEnded,
    /// Marker text that names no known event
    Other(String),
}

impl EventLabel {
    /// Every named label, used for parsing
    const NAMED: [Self; 12] = [
        Self::StartReading,
        Self::EndReading,
        Self::Iti,
        Self::StartSaying,
        Self::EndSaying,
        Self::Fixation,
        Self::StartBlockSaying,
        Self::StartBlockThinking,
        Self::ExperimentRestart,
        Self::ExperimentResting,
        Self::ExperimentStarted,
        Self::ExperimentEnded,
    ];

    /// Canonical spelling, as written in markers and event tables
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::StartReading => "StartReading",
            Self::EndReading => "EndReading",
            Self::Iti => "ITI",
            Self::StartSaying => "StartSaying",
            Self::EndSaying => "EndSaying",
            Self::Fixation => "Fixation",
            Self::StartBlockSaying => "StartBlockSaying",
            Self::StartBlockThinking => "StartBlockThinking",
            Self::ExperimentRestart => "EXPERIMENT_RESTART",
            Self::ExperimentResting => "ExperimentResting",
            Self::ExperimentStarted => "ExperimentStarted",
            Self::ExperimentEnded => "ExperimentEnded",
            Self::Other(text) => text,
        }
    }

    /// Parse a label spelling.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::NAMED
            .iter()
            .find(|label| label.as_str() == text)
            .cloned()
            .unwrap_or_else(|| Self::Other(text.to_owned()))
    }

    /// Presentation name used in event tables.
    ///
    /// `EndReading` becomes `ITI` and `EndSaying` becomes `Fixation`; every
    /// other label is unchanged.
    #[must_use]
    pub fn presentation(self) -> Self {
        match self {
            Self::EndReading => Self::Iti,
            Self::EndSaying => Self::Fixation,
            other => other,
        }
    }

    /// Whether this label marks the start of a trial.
    ///
    /// Substring match, so decorated marker names such as
    /// `StartSayingPractice` still qualify.
    #[must_use]
    pub fn is_trial_start(&self) -> bool {
        let text = self.as_str();
        text.contains("StartReading") || text.contains("StartSaying")
    }
}

impl PartialEq for EventLabel {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for EventLabel {}

impl Hash for EventLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventLabel {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for EventLabel {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<EventLabel> for String {
    fn from(label: EventLabel) -> Self {
        match label {
            EventLabel::Other(text) => text,
            named => named.as_str().to_owned(),
        }
    }
}

// ============================================================================
// Markers
// ============================================================================

/// Delimiter between the event name and the trial word in audio markers
pub const MARKER_DELIMITER: char = ':';

/// Split an audio marker such as `StartSaying:apple` into label and word.
///
/// The word is the field right after the first delimiter. A marker without a
/// delimiter, or with an empty word field, has no word.
///
/// # Example
///
/// ```
/// use rootstar_speech_core::types::{split_marker, EventLabel};
///
/// let (label, word) = split_marker("StartSaying:apple");
/// assert_eq!(label, EventLabel::StartSaying);
/// assert_eq!(word.as_deref(), Some("apple"));
///
/// assert_eq!(split_marker("Fixation"), (EventLabel::Fixation, None));
/// ```
#[must_use]
pub fn split_marker(marker: &str) -> (EventLabel, Option<String>) {
    let mut fields = marker.split(MARKER_DELIMITER);
    let label = EventLabel::parse(fields.next().unwrap_or_default());
    let word = fields
        .next()
        .filter(|word| !word.is_empty())
        .map(str::to_owned);
    (label, word)
}

// ============================================================================
// Block Phase
// ============================================================================

/// Speech block a trial belongs to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockPhase {
    /// No block start seen yet
    #[default]
    Unset,
    /// Words are spoken aloud
    Overt,
    /// Words are only imagined
    Inert,
}

impl BlockPhase {
    /// One step of the block phase fold.
    ///
    /// A label containing `BlockSaying` enters [`BlockPhase::Overt`], one
    /// containing `BlockThinking` enters [`BlockPhase::Inert`]; any other label
    /// keeps the current phase.
    ///
    /// ```
    /// use rootstar_speech_core::types::BlockPhase;
    ///
    /// let phase = ["ExperimentStarted", "StartBlockSaying", "StartReading"]
    ///     .iter()
    ///     .fold(BlockPhase::Unset, |phase, label| phase.advance(label));
    /// assert_eq!(phase, BlockPhase::Overt);
    /// ```
    #[must_use]
    pub fn advance(self, label: &str) -> Self {
        if label.contains("BlockSaying") {
            Self::Overt
        } else if label.contains("BlockThinking") {
            Self::Inert
        } else {
            self
        }
    }

    /// Table spelling (`n/a` while unset)
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unset => "n/a",
            Self::Overt => "Overt",
            Self::Inert => "Inert",
        }
    }
}

impl fmt::Display for BlockPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Events
// ============================================================================

/// One event recovered from a single stream.
///
/// Never references the other stream; pairing happens in the synchronizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event name
    pub label: EventLabel,
    /// Block phase in effect at this event
    pub block: BlockPhase,
    /// Trial word carried by the marker (audio events only)
    pub word: Option<String>,
    /// Absolute onset time in seconds since the Unix epoch
    pub onset_timestamp: f64,
    /// Onset position in stream-native samples
    pub onset_index: usize,
    /// Distance to the next event in stream-native samples
    pub duration_samples: usize,
}

/// Onset and duration of one side of a trial, in both samples and seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamOnset {
    /// Onset in seconds from the start of the stream (`onset_index / rate`)
    pub onset_seconds: f64,
    /// Duration in seconds (`duration_samples / rate`)
    pub duration_seconds: f64,
    /// Onset in stream-native samples
    pub onset_index: usize,
    /// Duration in stream-native samples
    pub duration_samples: usize,
    /// Absolute onset time in seconds since the Unix epoch
    pub unix_time: f64,
}

impl StreamOnset {
    /// Derive timing of `event` for a stream sampled at `rate` Hz.
    #[must_use]
    pub fn from_event(event: &RawEvent, rate: f64) -> Self {
        Self {
            onset_seconds: event.onset_index as f64 / rate,
            duration_seconds: event.duration_samples as f64 / rate,
            onset_index: event.onset_index,
            duration_samples: event.duration_samples,
            unix_time: event.onset_timestamp,
        }
    }

    /// Sample range `[onset, onset + duration)`
    #[must_use]
    pub fn sample_range(&self) -> core::ops::Range<usize> {
        self.onset_index..self.onset_index + self.duration_samples
    }
}

/// A matched EEG/audio event pair: one row of the trial table.
///
/// Created once by the synchronizer and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SynchronizedTrial {
    /// Shared event label of both sides
    pub trial_type: EventLabel,
    /// Block phase, taken from the audio event
    pub block: BlockPhase,
    /// Trial word from the audio marker
    pub word: Option<String>,
    /// EEG side timing
    pub eeg: StreamOnset,
    /// Audio side timing
    pub audio: StreamOnset,
}

/// Onset/duration/description triple attached to the EEG recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Onset in seconds from the start of the EEG recording
    pub onset: f64,
    /// Duration in seconds
    pub duration: f64,
    /// `<trialType>_<word>`
    pub description: String,
}

/// One row of the tab-separated events table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsRow {
    /// EEG onset in seconds
    pub onset: f64,
    /// EEG duration in seconds
    pub duration: f64,
    /// EEG onset sample index
    pub eeg_onset_index: usize,
    /// Audio onset in seconds
    pub audio_onset: f64,
    /// Audio duration in seconds
    pub audio_duration: f64,
    /// Audio onset sample index
    pub audio_onset_index: usize,
    /// Block phase name
    pub block: String,
    /// Event label
    pub trial_type: String,
    /// Trial word or `n/a`
    pub word: String,
}

impl EventsRow {
    /// Column names in table order
    pub const COLUMNS: [&'static str; 9] = [
        "onset",
        "duration",
        "eegOnsetIndex",
        "audioOnset",
        "audioDuration",
        "audioOnsetIndex",
        "block",
        "trialType",
        "word",
    ];
}

impl SynchronizedTrial {
    /// Trial word, or `n/a` if the marker had none
    #[must_use]
    pub fn word_or_na(&self) -> &str {
        self.word.as_deref().unwrap_or("n/a")
    }

    /// Annotation for the EEG recording
    #[must_use]
    pub fn annotation(&self) -> Annotation {
        Annotation {
            onset: self.eeg.onset_seconds,
            duration: self.eeg.duration_seconds,
            description: format!("{}_{}", self.trial_type, self.word_or_na()),
        }
    }

    /// Row for the events table
    #[must_use]
    pub fn events_row(&self) -> EventsRow {
        EventsRow {
            onset: self.eeg.onset_seconds,
            duration: self.eeg.duration_seconds,
            eeg_onset_index: self.eeg.onset_index,
            audio_onset: self.audio.onset_seconds,
            audio_duration: self.audio.duration_seconds,
            audio_onset_index: self.audio.onset_index,
            block: self.block.name().to_owned(),
            trial_type: self.trial_type.as_str().to_owned(),
            word: self.word_or_na().to_owned(),
        }
    }

    /// Offset between the two recorders' clocks at this trial, in seconds
    /// (audio minus EEG).
    #[must_use]
    pub fn clock_offset(&self) -> f64 {
        self.audio.unix_time - self.eeg.unix_time
    }
}
