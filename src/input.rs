//! Input capture: typed text and one-shot speech, converging on one
//! [`Submission`].
//!
//! ```text
//! Enter key ─────────────┐
//! Send button ───────────┼──▶ InputCapture::submit ──▶ Submission
//! Mic ─▶ recognizer ─▶ field ┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::speech::{RecognitionError, RecognitionRequest, SpeechRecognizer};

// ---------------------------------------------------------------------------
// InputField
// ---------------------------------------------------------------------------

/// The text field, shared by the panel (edits) and the orchestrator
/// (clears it when a turn settles).
#[derive(Debug, Clone, Default)]
pub struct InputField(Arc<Mutex<String>>);

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> String {
        self.lock().clone()
    }

    pub fn set(&self, value: impl Into<String>) {
        *self.lock() = value.into();
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

// ---------------------------------------------------------------------------
// Submission / notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Typed,
    Spoken,
}

/// A trimmed, non-empty query ready for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    pub source: InputSource,
}

/// Blocking notice shown to the user when voice capture cannot proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Notice {
    #[error("Voice input is not supported on this system.")]
    VoiceUnavailable,

    #[error("Mic error: {0}")]
    MicError(String),
}

impl From<RecognitionError> for Notice {
    fn from(e: RecognitionError) -> Self {
        match e {
            RecognitionError::Unavailable => Notice::VoiceUnavailable,
            RecognitionError::Failed(reason) => Notice::MicError(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Keys the text field cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

/// What the panel should do with a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Suppress the widget's own handling of the key.
    pub prevent_default: bool,
    pub submission: Option<Submission>,
}

// ---------------------------------------------------------------------------
// InputCapture
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct InputCapture {
    field: InputField,
    recognizer: Arc<dyn SpeechRecognizer>,
    lang: String,
}

impl InputCapture {
    pub fn new(
        field: InputField,
        recognizer: Arc<dyn SpeechRecognizer>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            field,
            recognizer,
            lang: lang.into(),
        }
    }

    pub fn field(&self) -> &InputField {
        &self.field
    }

    /// Typed path: Enter submits the field and swallows the key.
    pub fn on_key(&self, key: Key) -> KeyOutcome {
        match key {
            Key::Enter => KeyOutcome {
                prevent_default: true,
                submission: self.submit(InputSource::Typed),
            },
            Key::Other => KeyOutcome {
                prevent_default: false,
                submission: None,
            },
        }
    }

    /// Current field value as a submission, or `None` if it is blank.
    pub fn submit(&self, source: InputSource) -> Option<Submission> {
        let text = self.field.get().trim().to_string();
        if text.is_empty() {
            return None;
        }
        Some(Submission { text, source })
    }

    /// Spoken path: run one recognition session, write the transcript into
    /// the field and submit it.
    ///
    /// On error the field is left untouched and a [`Notice`] comes back.
    pub async fn listen(&self) -> Result<Option<Submission>, Notice> {
        let request = RecognitionRequest::one_shot(self.lang.clone());
        match self.recognizer.recognize(&request).await {
            Ok(transcript) => {
                log::info!("input: recognised {:?}", transcript);
                self.field.set(transcript);
                Ok(self.submit(InputSource::Spoken))
            }
            Err(e) => {
                log::warn!("input: voice capture failed: {e}");
                Err(Notice::from(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::UnavailableRecognizer;
    use async_trait::async_trait;

    /// Returns a scripted result and records the request it saw.
    struct ScriptedRecognizer {
        result: Result<String, RecognitionError>,
        seen: Mutex<Option<RecognitionRequest>>,
    }

    impl ScriptedRecognizer {
        fn new(result: Result<String, RecognitionError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                seen: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl SpeechRecognizer for ScriptedRecognizer {
        async fn recognize(
            &self,
            request: &RecognitionRequest,
        ) -> Result<String, RecognitionError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            self.result.clone()
        }
    }

    fn capture(recognizer: Arc<dyn SpeechRecognizer>) -> InputCapture {
        InputCapture::new(InputField::new(), recognizer, "en-US")
    }

    #[test]
    fn enter_submits_trimmed_text_and_prevents_default() {
        let c = capture(Arc::new(UnavailableRecognizer));
        c.field().set("  Godzilla  ");

        let outcome = c.on_key(Key::Enter);

        assert!(outcome.prevent_default);
        assert_eq!(
            outcome.submission,
            Some(Submission {
                text: "Godzilla".into(),
                source: InputSource::Typed
            })
        );
    }

    #[test]
    fn enter_on_blank_field_submits_nothing() {
        let c = capture(Arc::new(UnavailableRecognizer));
        c.field().set("   ");
        let outcome = c.on_key(Key::Enter);
        assert!(outcome.prevent_default);
        assert!(outcome.submission.is_none());
    }

    #[test]
    fn other_keys_pass_through() {
        let c = capture(Arc::new(UnavailableRecognizer));
        c.field().set("abc");
        assert_eq!(
            c.on_key(Key::Other),
            KeyOutcome {
                prevent_default: false,
                submission: None
            }
        );
    }

    #[tokio::test]
    async fn transcript_fills_field_and_submits() {
        let rec = ScriptedRecognizer::new(Ok("Godzilla".into()));
        let c = capture(rec.clone());

        let submission = c.listen().await.unwrap().unwrap();

        assert_eq!(submission.text, "Godzilla");
        assert_eq!(submission.source, InputSource::Spoken);
        assert_eq!(c.field().get(), "Godzilla");

        let seen = rec.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen, RecognitionRequest::one_shot("en-US"));
    }

    #[tokio::test]
    async fn recognition_error_leaves_field_alone() {
        let c = capture(ScriptedRecognizer::new(Err(RecognitionError::Failed(
            "not-allowed".into(),
        ))));
        c.field().set("draft");

        let notice = c.listen().await.unwrap_err();

        assert_eq!(notice, Notice::MicError("not-allowed".into()));
        assert_eq!(notice.to_string(), "Mic error: not-allowed");
        assert_eq!(c.field().get(), "draft");
    }

    #[tokio::test]
    async fn missing_recognizer_is_a_capability_notice() {
        let c = capture(Arc::new(UnavailableRecognizer));
        assert_eq!(c.listen().await.unwrap_err(), Notice::VoiceUnavailable);
    }
}
