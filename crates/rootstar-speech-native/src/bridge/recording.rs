//! In-memory EEG and audio recordings
//!
//! Validation here is the only place structural faults are detected:
//! mismatched array lengths, timestamps that go backwards, non-finite values
//! and sampling-rate metadata that disagrees with the timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rootstar_speech_core::config::AudioClockOffset;
use rootstar_speech_core::error::{check_monotonic, check_sampling_rate, SyncError, SyncResult};
use rootstar_speech_core::types::StreamKind;

/// Sampling rate implied by the median interval between timestamps.
///
/// Returns `None` for fewer than two timestamps or a zero median interval.
#[must_use]
pub fn measured_sampling_rate(timestamps: &[f64]) -> Option<f64> {
    let mut intervals: Vec<f64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
    if intervals.is_empty() {
        return None;
    }
    intervals.sort_by(f64::total_cmp);
    let median = intervals[intervals.len() / 2];
    (median > 0.0).then(|| 1.0 / median)
}

fn check_declared_rate(
    stream: StreamKind,
    declared: f64,
    timestamps: &[f64],
    tolerance: f64,
) -> SyncResult<()> {
    let declared = check_sampling_rate(stream, declared)?;
    if timestamps.len() < 2 {
        return Ok(());
    }
    let measured = measured_sampling_rate(timestamps).unwrap_or(f64::INFINITY);
    if ((measured - declared) / declared).abs() > tolerance {
        return Err(SyncError::SamplingRateMismatch {
            stream,
            declared,
            measured,
        });
    }
    Ok(())
}

fn check_finite(stream: StreamKind, what: &'static str, values: impl IntoIterator<Item = f64>) -> SyncResult<()> {
    match values.into_iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SyncError::NonFiniteSample { stream, what, index }),
        None => Ok(()),
    }
}

// ============================================================================
// EEG
// ============================================================================

/// EEG recording as delivered by the EDF loader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EegRecording {
    /// Raw analog trigger channel
    pub trigger: Vec<f64>,
    /// Sample times in seconds from `measurement_start`
    pub times: Vec<f64>,
    /// Declared sampling frequency in Hz
    pub sampling_frequency: f64,
    /// Wall-clock start of the recording
    pub measurement_start: DateTime<Utc>,
    /// All channel names in the file
    pub channel_names: Vec<String>,
    /// Channels marked bad by the operator
    pub bad_channels: Vec<String>,
}

impl EegRecording {
    /// Create a recording without channel metadata
    #[must_use]
    pub fn new(
        trigger: Vec<f64>,
        times: Vec<f64>,
        sampling_frequency: f64,
        measurement_start: DateTime<Utc>,
    ) -> Self {
        Self {
            trigger,
            times,
            sampling_frequency,
            measurement_start,
            channel_names: Vec::new(),
            bad_channels: Vec::new(),
        }
    }

    /// Attach channel metadata
    #[must_use]
    pub fn with_channels(mut self, channel_names: Vec<String>, bad_channels: Vec<String>) -> Self {
        self.channel_names = channel_names;
        self.bad_channels = bad_channels;
        self
    }

    /// Recording start as seconds since the Unix epoch
    #[must_use]
    pub fn start_epoch_seconds(&self) -> f64 {
        self.measurement_start.timestamp_micros() as f64 / 1e6
    }

    /// Sample times as seconds since the Unix epoch
    #[must_use]
    pub fn absolute_timestamps(&self) -> Vec<f64> {
        let epoch = self.start_epoch_seconds();
        self.times.iter().map(|t| t + epoch).collect()
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.trigger.len()
    }

    /// Whether the recording has no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trigger.is_empty()
    }

    /// Duration in seconds
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.len() as f64 / self.sampling_frequency
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first structural fault found.
    pub fn validate(&self, rate_tolerance: f64) -> SyncResult<()> {
        let stream = StreamKind::Eeg;
        if self.times.len() != self.trigger.len() {
            return Err(SyncError::LengthMismatch {
                stream,
                what: "timestamps",
                expected: self.trigger.len(),
                got: self.times.len(),
            });
        }
        check_finite(stream, "trigger sample", self.trigger.iter().copied())?;
        check_monotonic(stream, "timestamps", &self.times)?;
        check_declared_rate(stream, self.sampling_frequency, &self.times, rate_tolerance)
    }
}

// ============================================================================
// Audio
// ============================================================================

/// Audio recording with its marker stream, as delivered by the XDF loader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioRecording {
    /// Marker texts such as `StartSaying:apple`
    pub marker_labels: Vec<String>,
    /// Marker times in seconds on the audio recorder's clock
    pub marker_timestamps: Vec<f64>,
    /// Mono audio samples
    pub samples: Vec<f32>,
    /// Sample times in seconds on the audio recorder's clock
    pub sample_timestamps: Vec<f64>,
    /// Declared (effective) sampling frequency in Hz
    pub sampling_frequency: f64,
}

impl AudioRecording {
    /// Create a recording
    #[must_use]
    pub fn new(
        marker_labels: Vec<String>,
        marker_timestamps: Vec<f64>,
        samples: Vec<f32>,
        sample_timestamps: Vec<f64>,
        sampling_frequency: f64,
    ) -> Self {
        Self {
            marker_labels,
            marker_timestamps,
            samples,
            sample_timestamps,
            sampling_frequency,
        }
    }

    /// Number of markers
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.marker_labels.len()
    }

    /// Duration of the audio in seconds
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sampling_frequency
    }

    /// Marker times with the clock skew correction applied
    #[must_use]
    pub fn corrected_marker_timestamps(&self, offset: &AudioClockOffset) -> Vec<f64> {
        self.marker_timestamps.iter().map(|&t| offset.apply(t)).collect()
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first structural fault found.
    pub fn validate(&self, rate_tolerance: f64) -> SyncResult<()> {
        let stream = StreamKind::Audio;
        if self.marker_timestamps.len() != self.marker_labels.len() {
            return Err(SyncError::LengthMismatch {
                stream,
                what: "marker timestamps",
                expected: self.marker_labels.len(),
                got: self.marker_timestamps.len(),
            });
        }
        if self.sample_timestamps.len() != self.samples.len() {
            return Err(SyncError::LengthMismatch {
                stream,
                what: "sample timestamps",
                expected: self.samples.len(),
                got: self.sample_timestamps.len(),
            });
        }
        check_monotonic(stream, "marker timestamps", &self.marker_timestamps)?;
        check_monotonic(stream, "sample timestamps", &self.sample_timestamps)?;
        check_declared_rate(
            stream,
            self.sampling_frequency,
            &self.sample_timestamps,
            rate_tolerance,
        )
    }
}
