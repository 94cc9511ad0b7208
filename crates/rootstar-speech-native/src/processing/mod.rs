//! Event processing pipelines
//!
//! This module turns recordings into synchronized trials:
//! - [`eeg_events`]: Trigger channel to EEG events
//! - [`audio_events`]: Text markers to audio events
//! - [`nearest`]: Timestamp to sample index lookup
//! - [`sync`]: Cross-stream trial matching
//! - [`windows`]: Trial windows and spoken-word clips

pub mod audio_events;
pub mod eeg_events;
pub mod nearest;
pub mod sync;
pub mod windows;

pub use audio_events::AudioEventMapper;
pub use eeg_events::{EegDecodeSummary, EegEventMapper};
pub use nearest::{closest_index, nearest_index, NearestIndexResolver};
pub use sync::{anchor_index, MatchedPair, SyncReport, Synchronizer, UnmatchedMarker};
pub use windows::{overt_word_clips, trial_window, TrialWindow, WordClip};
