//! Dataset run naming and metadata
//!
//! Every synchronized session is stored as one run of a subject. Output files
//! share a stem built from the run identifiers, and a JSON sidecar records
//! the facts needed to interpret the trial table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rootstar_speech_core::types::EventsRow;

use crate::bridge::EegRecording;
use crate::pipeline::SessionOutput;

/// Timestamp layout of the `creation_date` field
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Identifies one run within a dataset
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    /// Subject label, e.g. `sub-01`
    pub subject: String,
    /// Session label
    pub session: String,
    /// Task name
    pub task: String,
    /// Run label
    pub run: String,
}

impl RunId {
    /// Create a run identifier
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        session: impl Into<String>,
        task: impl Into<String>,
        run: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            session: session.into(),
            task: task.into(),
            run: run.into(),
        }
    }

    /// Shared file name stem: `<subject>_ses-<session>_task-<task>_run-<run>`
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!(
            "{}_ses-{}_task-{}_run-{}",
            self.subject, self.session, self.task, self.run
        )
    }
}

/// JSON sidecar describing a synchronized run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// EEG measurement start, formatted with [`CREATION_DATE_FORMAT`]
    pub creation_date: String,
    /// When the run was processed
    pub clean_date: String,
    /// Subject label
    pub subject_id: String,
    /// Session label
    pub session_id: String,
    /// Run label
    pub run_id: String,
    /// Task name
    pub task_name: String,
    /// Number of synchronized trials
    pub num_trials: usize,
    /// EEG sampling frequency in Hz
    pub eeg_sampling_rate: f64,
    /// Audio sampling frequency in Hz
    pub audio_sampling_rate: f64,
    /// Channels in the EEG recording
    pub number_of_channels: usize,
    /// Channels marked bad
    pub bads: Vec<String>,
}

impl RunMetadata {
    /// Collect metadata for a finished session.
    #[must_use]
    pub fn from_session(
        run: &RunId,
        eeg: &EegRecording,
        output: &SessionOutput,
        clean_date: DateTime<Utc>,
    ) -> Self {
        Self {
            creation_date: eeg.measurement_start.format(CREATION_DATE_FORMAT).to_string(),
            clean_date: clean_date.to_rfc3339(),
            subject_id: run.subject.clone(),
            session_id: run.session.clone(),
            run_id: run.run.clone(),
            task_name: run.task.clone(),
            num_trials: output.report.trial_count(),
            eeg_sampling_rate: output.eeg_rate,
            audio_sampling_rate: output.audio_rate,
            number_of_channels: eeg.channel_names.len(),
            bads: eeg.bad_channels.clone(),
        }
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns a serialization error from `serde_json`.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Text field with the table separators (tab, line breaks) replaced by spaces
fn table_field(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

/// Render trial rows as a tab-separated table with a header line.
///
/// Tabs and line breaks inside text fields become spaces, so every row keeps
/// its nine columns.
#[must_use]
pub fn events_table(rows: &[EventsRow]) -> String {
    let mut table = EventsRow::COLUMNS.join("\t");
    table.push('\n');
    for row in rows {
        let fields = [
            row.onset.to_string(),
            row.duration.to_string(),
            row.eeg_onset_index.to_string(),
            row.audio_onset.to_string(),
            row.audio_duration.to_string(),
            row.audio_onset_index.to_string(),
            table_field(&row.block),
            table_field(&row.trial_type),
            table_field(&row.word),
        ];
        table.push_str(&fields.join("\t"));
        table.push('\n');
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::processing::SyncReport;

    fn row(word: &str) -> EventsRow {
        EventsRow {
            onset: 3.0,
            duration: 0.5,
            eeg_onset_index: 1500,
            audio_onset: 1.51,
            audio_duration: 0.99,
            audio_onset_index: 1510,
            block: "Overt".to_owned(),
            trial_type: "StartReading".to_owned(),
            word: word.to_owned(),
        }
    }

    #[test]
    fn test_file_stem() {
        let run = RunId::new("sub-03", "01", "overtSpeech", "02");
        assert_eq!(run.file_stem(), "sub-03_ses-01_task-overtSpeech_run-02");
    }

    #[test]
    fn test_metadata_from_session() {
        let start = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        let eeg = EegRecording::new(vec![0.0; 4], vec![0.0, 0.002, 0.004, 0.006], 500.0, start)
            .with_channels(
                vec!["Fp1".into(), "Fp2".into(), "Trigger".into()],
                vec!["Fp2".into()],
            );
        let output = SessionOutput {
            eeg_events: Vec::new(),
            audio_events: Vec::new(),
            report: SyncReport::default(),
            eeg_rate: 500.0,
            audio_rate: 44_100.0,
            eeg_samples: 4,
            audio_samples: 0,
        };
        let run = RunId::new("sub-01", "01", "speech", "01");

        let metadata = RunMetadata::from_session(&run, &eeg, &output, start);
        assert_eq!(metadata.creation_date, "2023-11-14T22:13:20");
        assert_eq!(metadata.num_trials, 0);
        assert_eq!(metadata.number_of_channels, 3);
        assert_eq!(metadata.bads, vec!["Fp2".to_owned()]);

        let json = metadata.to_json_pretty().unwrap();
        assert!(json.contains("\"task_name\": \"speech\""));
        let parsed: RunMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn test_events_table() {
        let table = events_table(&[row("cat"), row("n/a")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "onset\tduration\teegOnsetIndex\taudioOnset\taudioDuration\taudioOnsetIndex\tblock\ttrialType\tword"
        );
        assert_eq!(lines[1], "3\t0.5\t1500\t1.51\t0.99\t1510\tOvert\tStartReading\tcat");
        assert!(lines[2].ends_with("\tn/a"));
    }

    #[test]
    fn test_events_table_keeps_columns_for_odd_words() {
        let table = events_table(&[row("ice\tcream"), row("two\nlines\r")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.split('\t').count(), EventsRow::COLUMNS.len());
        }
        assert!(lines[1].ends_with("\tice cream"));
        assert!(lines[2].ends_with("\ttwo lines "));
    }
}
