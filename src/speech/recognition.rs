//! One-shot speech recognition backends.
//!
//! A recognition session is always final-only and single-alternative; the
//! [`RecognitionRequest`] carries those settings to the backend.

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

// Environment through which [`CommandRecognizer`] hands the session
// settings to the external recogniser.
pub const LANG_ENV: &str = "FRIDAY_RECOGNITION_LANG";
/// `"true"` or `"false"`.
pub const INTERIM_ENV: &str = "FRIDAY_RECOGNITION_INTERIM";
pub const MAX_ALTERNATIVES_ENV: &str = "FRIDAY_RECOGNITION_MAX_ALTERNATIVES";

// ---------------------------------------------------------------------------
// RecognitionError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecognitionError {
    /// No speech input capability on this system.
    #[error("voice input is not supported on this system")]
    Unavailable,

    /// The recogniser ran but reported an error.
    #[error("{0}")]
    Failed(String),
}

// ---------------------------------------------------------------------------
// RecognitionRequest
// ---------------------------------------------------------------------------

/// Settings of one recognition session.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionRequest {
    pub lang: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl RecognitionRequest {
    /// Final results only, one alternative.
    pub fn one_shot(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Listen once and return the best transcript.
    async fn recognize(&self, request: &RecognitionRequest) -> Result<String, RecognitionError>;
}

/// Recogniser used when no speech input is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRecognizer;

#[async_trait]
impl SpeechRecognizer for UnavailableRecognizer {
    async fn recognize(&self, _request: &RecognitionRequest) -> Result<String, RecognitionError> {
        Err(RecognitionError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// CommandRecognizer
// ---------------------------------------------------------------------------

/// Runs an external listen-once program and reads the transcript from its
/// stdout (first non-empty line).
///
/// The request is exported as [`LANG_ENV`], [`INTERIM_ENV`] and
/// [`MAX_ALTERNATIVES_ENV`].
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `[program, args…]` command line; `None` if it is empty.
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn recognize(&self, request: &RecognitionRequest) -> Result<String, RecognitionError> {
        log::debug!("recognizer: running {} ({})", self.program, request.lang);

        let output = Command::new(&self.program)
            .args(&self.args)
            .env(LANG_ENV, &request.lang)
            .env(INTERIM_ENV, request.interim_results.to_string())
            .env(MAX_ALTERNATIVES_ENV, request.max_alternatives.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecognitionError::Unavailable
                } else {
                    RecognitionError::Failed(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RecognitionError::Failed(if stderr.is_empty() {
                format!("recogniser exited with {}", output.status)
            } else {
                stderr
            }));
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| RecognitionError::Failed("no-speech".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RecognitionRequest {
        RecognitionRequest::one_shot("en-US")
    }

    #[test]
    fn one_shot_request_is_final_and_single() {
        let r = request();
        assert_eq!(r.lang, "en-US");
        assert!(!r.interim_results);
        assert_eq!(r.max_alternatives, 1);
    }

    #[test]
    fn empty_command_line_builds_nothing() {
        assert!(CommandRecognizer::from_command_line(&[]).is_none());
    }

    #[tokio::test]
    async fn unavailable_recognizer_reports_missing_capability() {
        assert_eq!(
            UnavailableRecognizer.recognize(&request()).await,
            Err(RecognitionError::Unavailable)
        );
    }

    #[tokio::test]
    async fn missing_program_is_unavailable() {
        let rec = CommandRecognizer::new("no-such-recogniser-binary", vec![]);
        assert_eq!(
            rec.recognize(&request()).await,
            Err(RecognitionError::Unavailable)
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn transcript_is_first_non_empty_line() {
        let rec = CommandRecognizer::from_command_line(&[
            "sh".into(),
            "-c".into(),
            "printf '\\n  Godzilla  \\nKong\\n'".into(),
        ])
        .unwrap();
        assert_eq!(rec.recognize(&request()).await.unwrap(), "Godzilla");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn language_is_passed_to_the_program() {
        let rec = CommandRecognizer::new(
            "sh",
            vec!["-c".into(), format!("echo ${LANG_ENV}")],
        );
        assert_eq!(rec.recognize(&request()).await.unwrap(), "en-US");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_settings_are_passed_to_the_program() {
        let rec = CommandRecognizer::new(
            "sh",
            vec![
                "-c".into(),
                format!("echo \"${INTERIM_ENV} ${MAX_ALTERNATIVES_ENV}\""),
            ],
        );
        assert_eq!(rec.recognize(&request()).await.unwrap(), "false 1");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_program_reports_stderr() {
        let rec = CommandRecognizer::new(
            "sh",
            vec!["-c".into(), "echo not-allowed >&2; exit 1".into()],
        );
        assert_eq!(
            rec.recognize(&request()).await,
            Err(RecognitionError::Failed("not-allowed".into()))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn silent_program_is_no_speech() {
        let rec = CommandRecognizer::new("true", vec![]);
        assert_eq!(
            rec.recognize(&request()).await,
            Err(RecognitionError::Failed("no-speech".into()))
        );
    }
}
