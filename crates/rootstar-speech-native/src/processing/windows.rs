//! Trial windows and spoken-word clips
//!
//! A synchronized trial addresses the same stretch of time in both streams.
//! The audio side defines the length: the EEG window covers
//! `audio duration × EEG rate` samples from the EEG onset, so the two windows
//! play back together.

use core::ops::Range;

use rootstar_speech_core::types::{BlockPhase, EventLabel, SynchronizedTrial};

/// Sample ranges of one trial in both streams
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialWindow {
    /// EEG sample range
    pub eeg: Range<usize>,
    /// Audio sample range
    pub audio: Range<usize>,
}

impl TrialWindow {
    /// Clamp both ranges to the available samples.
    #[must_use]
    pub fn clamped(&self, eeg_len: usize, audio_len: usize) -> Self {
        Self {
            eeg: clamp_range(&self.eeg, eeg_len),
            audio: clamp_range(&self.audio, audio_len),
        }
    }
}

fn clamp_range(range: &Range<usize>, len: usize) -> Range<usize> {
    range.start.min(len)..range.end.min(len)
}

/// Window of `trial` in both streams for an EEG stream sampled at `eeg_rate` Hz.
#[must_use]
pub fn trial_window(trial: &SynchronizedTrial, eeg_rate: f64) -> TrialWindow {
    let eeg_len = (trial.audio.duration_seconds * eeg_rate).round().max(0.0) as usize;
    let eeg_start = trial.eeg.onset_index;
    TrialWindow {
        eeg: eeg_start..eeg_start + eeg_len,
        audio: trial.audio.sample_range(),
    }
}

/// A fixed-length audio excerpt of one spoken word.
#[derive(Clone, Debug, PartialEq)]
pub struct WordClip<'a> {
    /// Clip name, `<audio onset index>_<word>`
    pub name: String,
    /// Spoken word
    pub word: String,
    /// Audio sample range of the clip
    pub range: Range<usize>,
    /// Clip samples
    pub samples: &'a [f32],
}

/// Extract a clip of `clip_seconds` from the onset of every overt speech trial.
///
/// Only `StartSaying` trials of the `Overt` block carry spoken audio. Clips
/// are truncated at the end of the recording; a trial starting past the end
/// yields no clip. Trials without a word are named with `n/a`.
#[must_use]
pub fn overt_word_clips<'a>(
    trials: &[SynchronizedTrial],
    audio: &'a [f32],
    audio_rate: f64,
    clip_seconds: f64,
) -> Vec<WordClip<'a>> {
    let clip_len = (clip_seconds * audio_rate).round().max(0.0) as usize;
    trials
        .iter()
        .filter(|t| t.block == BlockPhase::Overt && t.trial_type == EventLabel::StartSaying)
        .filter_map(|t| {
            let start = t.audio.onset_index;
            if start >= audio.len() {
                return None;
            }
            let range = start..(start + clip_len).min(audio.len());
            let word = t.word_or_na().to_owned();
            Some(WordClip {
                name: format!("{start}_{word}"),
                word,
                samples: &audio[range.clone()],
                range,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootstar_speech_core::types::StreamOnset;

    fn onset(index: usize, duration: usize, rate: f64) -> StreamOnset {
        StreamOnset {
            onset_seconds: index as f64 / rate,
            duration_seconds: duration as f64 / rate,
            onset_index: index,
            duration_samples: duration,
            unix_time: 0.0,
        }
    }

    fn trial(label: EventLabel, block: BlockPhase, word: &str, audio_index: usize) -> SynchronizedTrial {
        SynchronizedTrial {
            trial_type: label,
            block,
            word: Some(word.to_owned()),
            eeg: onset(1000, 300, 500.0),
            audio: onset(audio_index, 800, 1000.0),
        }
    }

    #[test]
    fn test_eeg_window_follows_audio_duration() {
        let t = trial(EventLabel::StartSaying, BlockPhase::Overt, "cat", 2000);
        let window = trial_window(&t, 500.0);
        // 0.8 s of audio at 500 Hz
        assert_eq!(window.eeg, 1000..1400);
        assert_eq!(window.audio, 2000..2800);

        let clamped = window.clamped(1200, 10_000);
        assert_eq!(clamped.eeg, 1000..1200);
        assert_eq!(clamped.audio, 2000..2800);
    }

    #[test]
    fn test_clips_only_for_overt_speech() {
        let audio: Vec<f32> = (0..5000).map(|i| i as f32).collect();
        let trials = vec![
            trial(EventLabel::StartReading, BlockPhase::Overt, "cat", 100),
            trial(EventLabel::StartSaying, BlockPhase::Overt, "cat", 1000),
            trial(EventLabel::StartSaying, BlockPhase::Inert, "dog", 2000),
        ];
        let clips = overt_word_clips(&trials, &audio, 1000.0, 1.5);
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].name, "1000_cat");
        assert_eq!(clips[0].range, 1000..2500);
        assert_eq!(clips[0].samples.len(), 1500);
        assert!((clips[0].samples[0] - 1000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clips_truncated_at_recording_end() {
        let audio = vec![0.0_f32; 1200];
        let trials = vec![
            trial(EventLabel::StartSaying, BlockPhase::Overt, "sun", 1000),
            trial(EventLabel::StartSaying, BlockPhase::Overt, "moon", 1200),
        ];
        let clips = overt_word_clips(&trials, &audio, 1000.0, 1.5);
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].range, 1000..1200);
    }
}
