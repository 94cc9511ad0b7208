//! Error types for Rootstar Speech
//!
//! Only structural faults are errors. Decode ambiguity, unmatched markers,
//! markers without a word and empty streams all degrade gracefully and are
//! never reported through [`SyncError`].

use thiserror::Error;

use crate::types::StreamKind;

/// Structural faults that abort synchronization of a recording pair.
///
/// These indicate upstream data corruption (bad loader output, truncated
/// files, wrong metadata) and cannot be recovered locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Sampling frequency is zero, negative or not finite
    #[error("Invalid {stream} sampling frequency: {rate} Hz")]
    InvalidSamplingRate {
        /// Stream carrying the bad metadata
        stream: StreamKind,
        /// Declared sampling frequency
        rate: f64,
    },

    /// Declared sampling frequency disagrees with the sample timestamps
    #[error("{stream} sampling frequency mismatch: declared {declared} Hz, timestamps imply {measured} Hz")]
    SamplingRateMismatch {
        /// Stream carrying the bad metadata
        stream: StreamKind,
        /// Sampling frequency from the recording header
        declared: f64,
        /// Sampling frequency derived from the median sample interval
        measured: f64,
    },

    /// Two parallel arrays of one stream have different lengths
    #[error("{stream} {what} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Stream the arrays belong to
        stream: StreamKind,
        /// Which array is inconsistent
        what: &'static str,
        /// Length of the reference array
        expected: usize,
        /// Length of the inconsistent array
        got: usize,
    },

    /// Timestamps go backwards
    #[error("Non-monotonic {stream} timestamps at index {index}: {previous} followed by {current}")]
    NonMonotonicTimestamps {
        /// Stream the timestamps belong to
        stream: StreamKind,
        /// Index of the first out-of-order timestamp
        index: usize,
        /// Timestamp before `index`
        previous: f64,
        /// Timestamp at `index`
        current: f64,
    },

    /// A sample or timestamp is NaN or infinite
    #[error("Non-finite {stream} {what} at index {index}")]
    NonFiniteSample {
        /// Stream the value belongs to
        stream: StreamKind,
        /// Which array holds the value
        what: &'static str,
        /// Index of the value
        index: usize,
    },

    /// Mapped events are not ordered by onset sample index
    #[error("{stream} events out of order at position {position}: onset index {previous} followed by {current}")]
    NonMonotonicEvents {
        /// Stream the events belong to
        stream: StreamKind,
        /// Position of the first out-of-order event
        position: usize,
        /// Onset index of the preceding event
        previous: usize,
        /// Onset index of the event at `position`
        current: usize,
    },

    /// A configuration value is out of range
    #[error("Invalid configuration value for {field}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
    },

    /// The marker lookup worker pool could not be created
    #[error("Failed to build lookup worker pool: {reason}")]
    WorkerPool {
        /// Error reported by the pool builder
        reason: String,
    },
}

/// Synchronization result type
pub type SyncResult<T> = Result<T, SyncError>;

impl SyncError {
    /// Stream the fault was found in, if it is tied to one.
    #[must_use]
    pub fn stream(&self) -> Option<StreamKind> {
        match self {
            Self::InvalidSamplingRate { stream, .. }
            | Self::SamplingRateMismatch { stream, .. }
            | Self::LengthMismatch { stream, .. }
            | Self::NonMonotonicTimestamps { stream, .. }
            | Self::NonFiniteSample { stream, .. }
            | Self::NonMonotonicEvents { stream, .. } => Some(*stream),
            Self::InvalidConfig { .. } | Self::WorkerPool { .. } => None,
        }
    }
}

/// Check that `timestamps` are finite and non-decreasing.
///
/// # Errors
///
/// Returns [`SyncError::NonFiniteSample`] or
/// [`SyncError::NonMonotonicTimestamps`] for the first offending index.
pub fn check_monotonic(stream: StreamKind, what: &'static str, timestamps: &[f64]) -> SyncResult<()> {
    for (index, &current) in timestamps.iter().enumerate() {
        if !current.is_finite() {
            return Err(SyncError::NonFiniteSample { stream, what, index });
        }
        if index > 0 {
            let previous = timestamps[index - 1];
            if current < previous {
                return Err(SyncError::NonMonotonicTimestamps {
                    stream,
                    index,
                    previous,
                    current,
                });
            }
        }
    }
    Ok(())
}

/// Check that a declared sampling frequency is usable.
///
/// # Errors
///
/// Returns [`SyncError::InvalidSamplingRate`] for zero, negative or non-finite rates.
pub fn check_sampling_rate(stream: StreamKind, rate: f64) -> SyncResult<f64> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(SyncError::InvalidSamplingRate { stream, rate })
    }
}
