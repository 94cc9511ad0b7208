//! Rootstar Speech Core - event types and trigger decoding
//!
//! This crate provides the foundational types for turning a speech-production
//! recording session (an EEG amplifier with a hardware trigger channel plus an
//! independently clocked audio recorder emitting text markers) into a single
//! synchronized trial table. It performs no I/O.
//!
//! # Modules
//!
//! - [`types`]: Trigger codes, event labels, block phases, raw events and trials
//! - [`trigger`]: Trigger channel normalization, code correction and decoding
//! - [`transitions`]: Rising-edge detection on the corrected code stream
//! - [`config`]: Explicit configuration passed to every processing stage
//! - [`error`]: Structural faults that abort synchronization
//!
//! # Example
//!
//! ```rust
//! use rootstar_speech_core::trigger::{decode, TriggerCorrector, TriggerNormalizer};
//! use rootstar_speech_core::transitions::find_transitions;
//! use rootstar_speech_core::types::EventLabel;
//!
//! // The amplifier records trigger pulses as negative voltages
//! let raw = [0.0, 0.0, -5.0, -5.0, 0.0, -3.76, -3.76];
//! let normalized = TriggerNormalizer::normalize(&raw).unwrap();
//! let codes = TriggerCorrector::shared().correct(&normalized);
//!
//! assert_eq!(find_transitions(&codes), vec![0, 2, 5]);
//! assert_eq!(decode(i64::from(codes[2].to_raw())), EventLabel::StartReading);
//! assert_eq!(decode(190), EventLabel::StartSaying);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod transitions;
pub mod trigger;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{AudioClockOffset, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use types::{
    Annotation, BlockPhase, EventLabel, EventsRow, RawEvent, StreamKind, StreamOnset,
    SynchronizedTrial, TriggerCode,
};
