//! Rootstar Speech Native - Host-side EEG/audio event synchronization
//!
//! This crate turns one speech-production session into a trial table:
//! - Trigger channel decoding into EEG events
//! - Audio marker mapping with clock skew correction
//! - Marker sample index lookup on a worker pool
//! - Anchored, order-preserving matching of the two event streams
//! - Trial windows, overt word clips and run metadata
//!
//! # Modules
//!
//! - [`bridge`]: Recording containers handed over by the file loaders
//! - [`processing`]: Event extraction and synchronization
//! - [`pipeline`]: End-to-end session run
//! - [`dataset`]: Run naming, metadata and the events table
//! - [`logging`]: Subscriber initialisation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod bridge;
pub mod dataset;
pub mod logging;
pub mod pipeline;
pub mod processing;

// Re-export key types
pub use bridge::{AudioRecording, EegRecording};
pub use dataset::{events_table, RunId, RunMetadata};
pub use pipeline::{SessionOutput, SessionPipeline};
pub use processing::{SyncReport, Synchronizer, TrialWindow, WordClip};
