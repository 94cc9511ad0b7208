//! Session pipeline
//!
//! Runs one recording session end to end: validate both recordings, extract
//! events from each stream, then synchronize them into trials.

use tracing::{info, info_span};

use rootstar_speech_core::config::SyncConfig;
use rootstar_speech_core::error::SyncResult;
use rootstar_speech_core::types::RawEvent;

use crate::bridge::{AudioRecording, EegRecording};
use crate::processing::{
    overt_word_clips, trial_window, AudioEventMapper, EegEventMapper, NearestIndexResolver,
    SyncReport, Synchronizer, TrialWindow, WordClip,
};

// ============================================================================
// Output
// ============================================================================

/// Everything one session run produces
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOutput {
    /// Events decoded from the EEG trigger channel
    pub eeg_events: Vec<RawEvent>,
    /// Events mapped from the audio markers
    pub audio_events: Vec<RawEvent>,
    /// Synchronized trials and matching statistics
    pub report: SyncReport,
    /// EEG sampling frequency used for the trials
    pub eeg_rate: f64,
    /// Audio sampling frequency used for the trials
    pub audio_rate: f64,
    /// Samples in the EEG recording
    pub eeg_samples: usize,
    /// Samples in the audio recording
    pub audio_samples: usize,
}

impl SessionOutput {
    /// Sample windows of every trial in both streams, clamped to the
    /// recordings
    #[must_use]
    pub fn trial_windows(&self) -> Vec<TrialWindow> {
        self.report
            .trials
            .iter()
            .map(|trial| {
                trial_window(trial, self.eeg_rate).clamped(self.eeg_samples, self.audio_samples)
            })
            .collect()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Synchronizes one EEG/audio session.
#[derive(Clone, Debug)]
pub struct SessionPipeline {
    config: SyncConfig,
}

impl SessionPipeline {
    /// Create a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`](rootstar_speech_core::SyncError::InvalidConfig)
    /// if the configuration is unusable.
    pub fn new(config: SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run the session.
    ///
    /// # Errors
    ///
    /// Returns the first structural fault in either recording. Unmatched
    /// markers are not faults; they are listed in the report.
    pub fn run(&self, eeg: &EegRecording, audio: &AudioRecording) -> SyncResult<SessionOutput> {
        let _span = info_span!("session", start = %eeg.measurement_start).entered();
        info!(
            eeg_samples = eeg.len(),
            eeg_rate = eeg.sampling_frequency,
            audio_markers = audio.marker_count(),
            audio_rate = audio.sampling_frequency,
            "Starting session synchronization"
        );

        // Step 1: Reject malformed recordings before any decoding
        let tolerance = self.config.sampling_rate_tolerance;
        eeg.validate(tolerance)?;
        audio.validate(tolerance)?;
        let synchronizer = Synchronizer::new(eeg.sampling_frequency, audio.sampling_frequency)?;

        // Step 2: Events per stream
        let eeg_events = EegEventMapper::new(&self.config).extract(eeg)?;
        let resolver = NearestIndexResolver::new(&self.config);
        let audio_events = AudioEventMapper::new(&self.config).extract(audio, &resolver)?;

        // Step 3: Pair them
        let report = synchronizer.synchronize(&eeg_events, &audio_events)?;

        info!(
            eeg_events = eeg_events.len(),
            audio_events = audio_events.len(),
            trials = report.trial_count(),
            "Session synchronized"
        );

        Ok(SessionOutput {
            eeg_events,
            audio_events,
            report,
            eeg_rate: eeg.sampling_frequency,
            audio_rate: audio.sampling_frequency,
            eeg_samples: eeg.len(),
            audio_samples: audio.samples.len(),
        })
    }

    /// Spoken-word clips of the overt speech trials in `output`
    #[must_use]
    pub fn word_clips<'a>(&self, output: &SessionOutput, audio: &'a AudioRecording) -> Vec<WordClip<'a>> {
        overt_word_clips(
            &output.report.trials,
            &audio.samples,
            audio.sampling_frequency,
            self.config.clip_seconds,
        )
    }
}
