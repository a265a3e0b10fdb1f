//! Recording workflow state machine.
//!
//! The only component with explicit states. Coordinates the transitions
//! between capture, upload, and result display:
//!
//! `Idle → Recording → Processing → {Success | Error}`
//!
//! Success returns to Idle only through an explicit reset; Error can also
//! return to Recording through a retry. A start request while a session is
//! already recording or processing is rejected as a no-op.

/// Fixed user-facing message when microphone access fails.
pub const MIC_DENIED_MESSAGE: &str =
    "Could not access microphone. Please check permissions and input devices.";

/// Fixed user-facing message when upload or transcription fails.
/// The underlying error is logged, never displayed.
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process audio. Please try again.";

/// Workflow state. Exactly one value at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Processing,
    Success,
    Error,
}

/// Drives the recording workflow and owns the displayed result.
#[derive(Debug, Default)]
pub struct StateMachine {
    state: RecordingState,
    transcription: Option<String>,
    error_message: Option<String>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// The transcription shown in the Success state.
    pub fn transcription(&self) -> Option<&str> {
        self.transcription.as_deref()
    }

    /// The message shown in the Error state.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Attempts to start a recording.
    ///
    /// Allowed from `Idle` and from `Error` (retry). Rejected while a
    /// session is already recording or processing; the rejection is a
    /// no-op and returns false.
    pub fn try_start(&mut self) -> bool {
        match self.state {
            RecordingState::Idle | RecordingState::Error => {
                self.state = RecordingState::Recording;
                self.error_message = None;
                true
            }
            RecordingState::Recording | RecordingState::Processing => {
                tracing::debug!(
                    "Start requested while {:?}; ignoring re-entrant start",
                    self.state
                );
                false
            }
            RecordingState::Success => {
                tracing::debug!("Start requested from Success; reset required first");
                false
            }
        }
    }

    /// Marks the capture as stopped and the upload as in flight.
    pub fn begin_processing(&mut self) {
        if self.state != RecordingState::Recording {
            tracing::warn!("begin_processing called in state {:?}", self.state);
            return;
        }
        self.state = RecordingState::Processing;
    }

    /// Records a successful transcription.
    pub fn complete(&mut self, text: String) {
        if self.state != RecordingState::Processing {
            tracing::warn!("complete called in state {:?}", self.state);
            return;
        }
        self.transcription = Some(text);
        self.state = RecordingState::Success;
    }

    /// Records a failure with a fixed user-facing message.
    pub fn fail(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
        self.state = RecordingState::Error;
    }

    /// Clears the displayed text and error and returns to Idle.
    pub fn reset(&mut self) {
        self.state = RecordingState::Idle;
        self.transcription = None;
        self.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{word_count, HistoryStore};
    use crate::recording::capture::encode_wav_payload;
    use crate::upload::extract_text;

    #[test]
    fn test_happy_path_transitions() {
        let mut machine = StateMachine::new();
        assert_eq!(machine.state(), RecordingState::Idle);

        assert!(machine.try_start());
        assert_eq!(machine.state(), RecordingState::Recording);

        machine.begin_processing();
        assert_eq!(machine.state(), RecordingState::Processing);

        machine.complete("hello world".to_string());
        assert_eq!(machine.state(), RecordingState::Success);
        assert_eq!(machine.transcription(), Some("hello world"));

        machine.reset();
        assert_eq!(machine.state(), RecordingState::Idle);
        assert!(machine.transcription().is_none());
    }

    #[test]
    fn test_reentrant_start_is_rejected() {
        let mut machine = StateMachine::new();
        assert!(machine.try_start());
        assert!(!machine.try_start());
        assert_eq!(machine.state(), RecordingState::Recording);

        machine.begin_processing();
        assert!(!machine.try_start());
        assert_eq!(machine.state(), RecordingState::Processing);
    }

    #[test]
    fn test_error_allows_retry() {
        let mut machine = StateMachine::new();
        assert!(machine.try_start());
        machine.begin_processing();
        machine.fail(PROCESSING_FAILED_MESSAGE);
        assert_eq!(machine.state(), RecordingState::Error);
        assert_eq!(machine.error_message(), Some(PROCESSING_FAILED_MESSAGE));

        // Retry transitions straight back to Recording and clears the error
        assert!(machine.try_start());
        assert_eq!(machine.state(), RecordingState::Recording);
        assert!(machine.error_message().is_none());
    }

    #[test]
    fn test_mic_denied_fails_before_recording_work() {
        let mut machine = StateMachine::new();
        assert!(machine.try_start());
        machine.fail(MIC_DENIED_MESSAGE);
        assert_eq!(machine.state(), RecordingState::Error);
        assert_eq!(machine.error_message(), Some(MIC_DENIED_MESSAGE));
    }

    #[test]
    fn test_upload_failure_leaves_history_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::open(dir.path()).unwrap();
        store.append("earlier entry").unwrap();
        let total_before = store.word_total().unwrap();

        let mut machine = StateMachine::new();
        assert!(machine.try_start());
        machine.begin_processing();

        // A non-2xx response maps to the fixed failure message; nothing is appended
        machine.fail(PROCESSING_FAILED_MESSAGE);
        assert_eq!(machine.state(), RecordingState::Error);
        assert_eq!(store.entries().unwrap().len(), 1);
        assert_eq!(store.word_total().unwrap(), total_before);
    }

    /// Full workflow: start, capture two chunks, stop, successful upload.
    #[test]
    fn test_record_upload_append_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::open(dir.path()).unwrap();
        let total_before = store.word_total().unwrap();

        let mut machine = StateMachine::new();
        assert!(machine.try_start());

        // Two chunks arrive, then the session stops and assembles the payload
        let mut samples: Vec<i16> = Vec::new();
        samples.extend_from_slice(&[10, 20, 30]);
        samples.extend_from_slice(&[40, 50]);
        let payload = encode_wav_payload(&samples, 16000).unwrap();
        assert!(!payload.is_empty());
        machine.begin_processing();

        // Webhook answers with a JSON body carrying the text field
        let response = serde_json::json!({ "text": "the quick brown fox" });
        let text = extract_text(&response);
        machine.complete(text.clone());
        store.append(&text).unwrap();

        assert_eq!(machine.state(), RecordingState::Success);
        assert_eq!(machine.transcription(), Some("the quick brown fox"));

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word_count, 4);
        assert_eq!(entries[0].word_count, word_count(&entries[0].text));
        assert_eq!(store.word_total().unwrap(), total_before + 4);
    }
}
