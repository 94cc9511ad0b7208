//! Boundary with the recording loaders
//!
//! File-format loaders (EDF for the amplifier, XDF for the audio recorder)
//! live outside this crate. They hand over fully materialized arrays through
//! the containers in [`recording`], which validate the structural invariants
//! every later stage relies on.

pub mod recording;

// Re-export key types
pub use recording::{measured_sampling_rate, AudioRecording, EegRecording};
