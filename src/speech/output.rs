//! Platform speech output backends.
//!
//! [`SpeechOutput`] is the seam between the [`Speaker`](crate::speech::Speaker)
//! and whatever actually produces sound.  `speak` resolves when playback
//! ends; dropping the future stops playback.
//!
//! * [`EspeakOutput`] drives an `espeak-ng` compatible synthesiser process.
//! * [`SilentOutput`] stands in when no speech output exists; every call
//!   reports [`SpeechError::Unavailable`].

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::speech::speaker::Utterance;
use crate::speech::voice::Voice;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors raised by a speech output backend.
#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    /// The platform has no speech output capability.
    #[error("speech output unavailable: {0}")]
    Unavailable(String),

    /// The synthesiser started but failed.
    #[error("speech playback failed: {0}")]
    Playback(String),
}

// ---------------------------------------------------------------------------
// SpeechOutput trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Read the full list of installed voices.
    async fn voices(&self) -> Result<Vec<Voice>, SpeechError>;

    /// Play one utterance to completion.
    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;
}

// ---------------------------------------------------------------------------
// SilentOutput
// ---------------------------------------------------------------------------

/// Output used when speech is disabled or missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentOutput;

#[async_trait]
impl SpeechOutput for SilentOutput {
    async fn voices(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(Vec::new())
    }

    async fn speak(&self, _utterance: &Utterance) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable("speech output disabled".into()))
    }
}

// ---------------------------------------------------------------------------
// EspeakOutput
// ---------------------------------------------------------------------------

const ESPEAK_DEFAULT_WPM: f32 = 175.0;
const ESPEAK_DEFAULT_PITCH: f32 = 50.0;

/// `espeak-ng` process backend.
///
/// One process per utterance, spawned with `kill_on_drop` so a superseded
/// utterance is silenced as soon as its task is torn down.
#[derive(Debug, Clone)]
pub struct EspeakOutput {
    program: String,
}

impl EspeakOutput {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for one utterance.
    ///
    /// The utterance keeps its raw volume/rate/pitch; values are only mapped
    /// and bounded here, where espeak needs non-negative integers.
    pub fn args(utterance: &Utterance) -> Vec<String> {
        let voice = utterance
            .voice
            .as_ref()
            .map(|v| v.id.clone())
            .unwrap_or_else(|| utterance.lang.to_lowercase());
        let amplitude = (utterance.volume * 100.0).round().clamp(0.0, 200.0) as u32;
        let wpm = (ESPEAK_DEFAULT_WPM * utterance.prosody.rate).round() as u32;
        let pitch = (ESPEAK_DEFAULT_PITCH * utterance.prosody.pitch)
            .round()
            .clamp(0.0, 99.0) as u32;

        vec![
            "-v".into(),
            voice,
            "-a".into(),
            amplitude.to_string(),
            "-s".into(),
            wpm.to_string(),
            "-p".into(),
            pitch.to_string(),
            "--".into(),
            utterance.text.clone(),
        ]
    }

    fn spawn_error(&self, e: std::io::Error) -> SpeechError {
        if e.kind() == std::io::ErrorKind::NotFound {
            SpeechError::Unavailable(format!("{} not found", self.program))
        } else {
            SpeechError::Playback(e.to_string())
        }
    }
}

#[async_trait]
impl SpeechOutput for EspeakOutput {
    async fn voices(&self) -> Result<Vec<Voice>, SpeechError> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(SpeechError::Playback(format!(
                "{} --voices exited with {}",
                self.program, output.status
            )));
        }

        Ok(parse_voice_table(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        let mut child = Command::new(&self.program)
            .args(Self::args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let status = child
            .wait()
            .await
            .map_err(|e| SpeechError::Playback(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Playback(format!(
                "{} exited with {status}",
                self.program
            )))
        }
    }
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US            (en 10)
/// ```
pub fn parse_voice_table(table: &str) -> Vec<Voice> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _priority = cols.next()?;
            let lang = cols.next()?;
            let _age_gender = cols.next()?;
            let name = cols.next()?;
            Some(Voice::new(
                lang,
                name.replace('_', " "),
                normalize_lang(lang),
                true,
            ))
        })
        .collect()
}

/// `en-us` → `en-US`; the region subtag is upper-cased.
fn normalize_lang(tag: &str) -> String {
    match tag.split_once('-') {
        Some((lang, region)) if region.len() == 2 => {
            format!("{}-{}", lang.to_lowercase(), region.to_uppercase())
        }
        _ => tag.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
