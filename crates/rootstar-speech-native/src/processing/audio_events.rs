//! Audio event mapping
//!
//! The audio recorder writes text markers (`StartSaying:apple`) with its own
//! timestamps. Each marker becomes a [`RawEvent`] whose onset index is the
//! audio sample nearest the marker time and whose duration is the raw gap to
//! the next marker. No pulse-width filter applies on this side.

use tracing::{debug, info, warn};

use rootstar_speech_core::config::{AudioClockOffset, SyncConfig};
use rootstar_speech_core::error::{SyncError, SyncResult};
use rootstar_speech_core::types::{split_marker, BlockPhase, RawEvent, StreamKind};

use super::nearest::NearestIndexResolver;
use crate::bridge::AudioRecording;

/// Maps audio markers to audio events.
#[derive(Clone, Copy, Debug)]
pub struct AudioEventMapper {
    clock_offset: AudioClockOffset,
}

impl AudioEventMapper {
    /// Create a mapper from the configuration
    #[must_use]
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            clock_offset: config.audio_clock_offset,
        }
    }

    /// Map markers to events.
    ///
    /// `marker_timestamps` must already be on the EEG clock (see
    /// [`AudioRecording::corrected_marker_timestamps`]). `onset_indices` holds
    /// the resolved audio sample index of every marker. The last marker has no successor
    /// and produces no event.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LengthMismatch`] if the three arrays differ in length.
    pub fn map_events(
        &self,
        markers: &[String],
        marker_timestamps: &[f64],
        onset_indices: &[usize],
    ) -> SyncResult<Vec<RawEvent>> {
        for (what, len) in [
            ("marker timestamps", marker_timestamps.len()),
            ("marker onset indices", onset_indices.len()),
        ] {
            if len != markers.len() {
                return Err(SyncError::LengthMismatch {
                    stream: StreamKind::Audio,
                    what,
                    expected: markers.len(),
                    got: len,
                });
            }
        }

        let events = (0..markers.len().saturating_sub(1))
            .scan(BlockPhase::Unset, |phase, i| {
                let (label, word) = split_marker(&markers[i]);
                *phase = phase.advance(label.as_str());
                Some(RawEvent {
                    label,
                    block: *phase,
                    word,
                    onset_timestamp: marker_timestamps[i],
                    onset_index: onset_indices[i],
                    duration_samples: onset_indices[i + 1].saturating_sub(onset_indices[i]),
                })
            })
            .collect();
        Ok(events)
    }

    /// Resolve marker sample indices and map a whole recording.
    ///
    /// A recording without audio samples has no sample to anchor a marker
    /// to and yields no events.
    ///
    /// # Errors
    ///
    /// Propagates lookup and mapping faults.
    pub fn extract(
        &self,
        recording: &AudioRecording,
        resolver: &NearestIndexResolver,
    ) -> SyncResult<Vec<RawEvent>> {
        if recording.samples.is_empty() {
            warn!(
                markers = recording.marker_count(),
                "Audio stream has no samples, skipping markers"
            );
            return Ok(Vec::new());
        }
        if self.clock_offset.enabled {
            info!(
                hours = self.clock_offset.hours,
                "Applying audio clock offset"
            );
        }
        // The skew shifts markers and samples alike, so lookups use raw times
        let onset_indices =
            resolver.resolve(&recording.sample_timestamps, &recording.marker_timestamps)?;
        let events = self.map_events(
            &recording.marker_labels,
            &recording.corrected_marker_timestamps(&self.clock_offset),
            &onset_indices,
        )?;
        debug!(
            markers = recording.marker_count(),
            events = events.len(),
            "Mapped audio markers"
        );
        Ok(events)
    }
}

impl Default for AudioEventMapper {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}
