//! Configuration for event extraction and synchronization
//!
//! All tunables travel in one immutable [`SyncConfig`] that callers pass to
//! every stage explicitly.

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Shortest EEG pulse kept, in samples
pub const DEFAULT_MIN_PULSE_WIDTH: usize = 25;

/// Clock skew observed between the audio recorder and the EEG amplifier
pub const DEFAULT_AUDIO_CLOCK_OFFSET_HOURS: f64 = 2.0;

/// Workers used to resolve marker sample indices
pub const DEFAULT_LOOKUP_WORKERS: usize = 20;

/// Allowed relative disagreement between declared and measured sampling rate
pub const DEFAULT_SAMPLING_RATE_TOLERANCE: f64 = 0.01;

/// Length of an overt word clip in seconds
pub const DEFAULT_CLIP_SECONDS: f64 = 1.5;

/// Fixed offset added to every audio-side timestamp.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioClockOffset {
    /// Apply the correction
    pub enabled: bool,
    /// Offset in hours (may be negative)
    pub hours: f64,
}

impl AudioClockOffset {
    /// Correction in seconds, zero when disabled
    #[inline]
    #[must_use]
    pub fn seconds(&self) -> f64 {
        if self.enabled {
            self.hours * 3600.0
        } else {
            0.0
        }
    }

    /// Apply the correction to one timestamp
    #[inline]
    #[must_use]
    pub fn apply(&self, timestamp: f64) -> f64 {
        timestamp + self.seconds()
    }
}

impl Default for AudioClockOffset {
    fn default() -> Self {
        Self {
            enabled: false,
            hours: DEFAULT_AUDIO_CLOCK_OFFSET_HOURS,
        }
    }
}

/// Synchronization configuration.
///
/// # Example
///
/// ```
/// use rootstar_speech_core::config::SyncConfig;
///
/// let config = SyncConfig::default().with_audio_clock_offset_hours(2.0);
/// assert!(config.audio_clock_offset.enabled);
/// assert_eq!(config.audio_clock_offset.seconds(), 7200.0);
/// assert_eq!(config.min_pulse_width_samples, 25);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// EEG events shorter than this many samples are discarded
    pub min_pulse_width_samples: usize,
    /// Clock skew correction for the audio stream
    pub audio_clock_offset: AudioClockOffset,
    /// Worker threads for marker index lookup (0 or 1 runs inline)
    pub lookup_workers: usize,
    /// Relative tolerance when checking declared sampling rates
    pub sampling_rate_tolerance: f64,
    /// Overt word clip length in seconds
    pub clip_seconds: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            min_pulse_width_samples: DEFAULT_MIN_PULSE_WIDTH,
            audio_clock_offset: AudioClockOffset::default(),
            lookup_workers: DEFAULT_LOOKUP_WORKERS,
            sampling_rate_tolerance: DEFAULT_SAMPLING_RATE_TOLERANCE,
            clip_seconds: DEFAULT_CLIP_SECONDS,
        }
    }
}

impl SyncConfig {
    /// Set the minimum EEG pulse width
    #[must_use]
    pub fn with_min_pulse_width(mut self, samples: usize) -> Self {
        self.min_pulse_width_samples = samples;
        self
    }

    /// Enable the audio clock correction with the given offset
    #[must_use]
    pub fn with_audio_clock_offset_hours(mut self, hours: f64) -> Self {
        self.audio_clock_offset = AudioClockOffset {
            enabled: true,
            hours,
        };
        self
    }

    /// Disable the audio clock correction
    #[must_use]
    pub fn without_audio_clock_offset(mut self) -> Self {
        self.audio_clock_offset.enabled = false;
        self
    }

    /// Set the number of lookup workers
    #[must_use]
    pub fn with_lookup_workers(mut self, workers: usize) -> Self {
        self.lookup_workers = workers;
        self
    }

    /// Set the sampling rate tolerance
    #[must_use]
    pub fn with_sampling_rate_tolerance(mut self, tolerance: f64) -> Self {
        self.sampling_rate_tolerance = tolerance;
        self
    }

    /// Set the overt clip length
    #[must_use]
    pub fn with_clip_seconds(mut self, seconds: f64) -> Self {
        self.clip_seconds = seconds;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> SyncResult<()> {
        if !self.audio_clock_offset.hours.is_finite() {
            return Err(SyncError::InvalidConfig {
                field: "audio_clock_offset.hours",
            });
        }
        if !(self.sampling_rate_tolerance.is_finite() && self.sampling_rate_tolerance >= 0.0) {
            return Err(SyncError::InvalidConfig {
                field: "sampling_rate_tolerance",
            });
        }
        if !(self.clip_seconds.is_finite() && self.clip_seconds > 0.0) {
            return Err(SyncError::InvalidConfig {
                field: "clip_seconds",
            });
        }
        Ok(())
    }
}
