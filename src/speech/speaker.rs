//! Single-utterance speech playback.
//!
//! [`Speaker::speak`] builds an [`Utterance`] bound to the currently selected
//! voice, applies prosody jitter and hands it to the [`SpeechOutput`].  At
//! most one utterance is ever audible: starting a new one supersedes the
//! active one, and the new one only reaches the output after the old
//! playback task has been torn down.
//!
//! ```text
//! speak("a") ──▶ slot = [task a: output.speak(a)]
//! speak("b") ──▶ abort(task a) ──▶ slot = [task b: await a's teardown
//!                                               └─▶ output.speak(b)]
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rand::Rng;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::speech::output::{SpeechError, SpeechOutput};
use crate::speech::voice::{SelectedVoice, Voice};

// ---------------------------------------------------------------------------
// Prosody
// ---------------------------------------------------------------------------

/// The two speaking rates an utterance may get.
pub const RATES: [f32; 2] = [1.1, 0.95];
/// The two pitches an utterance may get.
pub const PITCHES: [f32; 2] = [1.2, 0.9];

/// Rate and pitch multipliers of one utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
}

impl Prosody {
    /// Pick rate and pitch independently, each with even odds.
    pub fn jitter<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            rate: if rng.gen_bool(0.5) { RATES[0] } else { RATES[1] },
            pitch: if rng.gen_bool(0.5) { PITCHES[0] } else { PITCHES[1] },
        }
    }
}

impl Default for Prosody {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Utterance
// ---------------------------------------------------------------------------

/// One synthesised-speech playback request.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` lets the platform pick its default voice.
    pub voice: Option<Voice>,
    /// Passed through unclamped.
    pub volume: f32,
    pub prosody: Prosody,
    pub lang: String,
}

/// Volume to use for an utterance: missing or NaN becomes full volume, any
/// other value is kept as is.
pub fn coerce_volume(volume: Option<f32>) -> f32 {
    match volume {
        Some(v) if !v.is_nan() => v,
        _ => 1.0,
    }
}

// ---------------------------------------------------------------------------
// SpeechCompletion
// ---------------------------------------------------------------------------

/// How an utterance ended.
#[derive(Debug, Clone)]
pub enum SpeechOutcome {
    /// Played to the end.
    Finished,
    /// A newer utterance preempted this one.
    Superseded,
    /// No speech output capability; nothing was played.
    Unavailable,
    /// Nothing to say (empty text).
    Skipped,
    /// The output failed mid-way.
    Failed(SpeechError),
}

/// Optional completion signal of one [`Speaker::speak`] call.
///
/// Dropping it does not affect playback.
#[must_use = "dropping the completion is fine, but usually you meant to wait on it"]
pub struct SpeechCompletion(Option<oneshot::Receiver<SpeechOutcome>>);

impl SpeechCompletion {
    fn skipped() -> Self {
        Self(None)
    }

    /// Wait until the utterance has ended one way or another.
    pub async fn wait(self) -> SpeechOutcome {
        match self.0 {
            None => SpeechOutcome::Skipped,
            Some(rx) => rx.await.unwrap_or(SpeechOutcome::Superseded),
        }
    }
}

// ---------------------------------------------------------------------------
// Speaker
// ---------------------------------------------------------------------------

struct ActiveUtterance {
    id: u64,
    task: JoinHandle<()>,
}

/// Owner of the one active utterance.
pub struct Speaker {
    output: Arc<dyn SpeechOutput>,
    voice: SelectedVoice,
    lang: String,
    active: Mutex<Option<ActiveUtterance>>,
    next_id: AtomicU64,
}

impl Speaker {
    /// * `output`: platform backend (use [`SilentOutput`](crate::speech::SilentOutput) when none).
    /// * `voice`: read handle from the [`VoiceCatalog`](crate::speech::VoiceCatalog).
    /// * `lang`: language tag stamped on every utterance.
    pub fn new(output: Arc<dyn SpeechOutput>, voice: SelectedVoice, lang: impl Into<String>) -> Self {
        Self {
            output,
            voice,
            lang: lang.into(),
            active: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Build the utterance `speak` would play, with fresh prosody jitter.
    pub fn utterance(&self, text: &str, volume: Option<f32>) -> Utterance {
        Utterance {
            text: text.to_string(),
            voice: self.voice.get(),
            volume: coerce_volume(volume),
            prosody: Prosody::jitter(&mut rand::thread_rng()),
            lang: self.lang.clone(),
        }
    }

    /// Speak `text`, preempting whatever is currently being spoken.
    ///
    /// Never blocks and never fails; must be called from within a tokio
    /// runtime.  Empty text is ignored.
    pub fn speak(&self, text: &str, volume: Option<f32>) -> SpeechCompletion {
        if text.trim().is_empty() {
            log::debug!("speaker: ignoring empty utterance");
            return SpeechCompletion::skipped();
        }
        let utterance = self.utterance(text, volume);
        self.supersede(utterance)
    }

    /// Cancel the active utterance (if any) and start `utterance` in its
    /// place.
    pub fn supersede(&self, utterance: Utterance) -> SpeechCompletion {
        let (done_tx, done_rx) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut slot = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let previous = slot.take();
        if let Some(prev) = &previous {
            log::debug!("speaker: utterance #{} superseded by #{id}", prev.id);
            prev.task.abort();
        }

        let output = Arc::clone(&self.output);
        let task = tokio::spawn(async move {
            // The old playback must be gone before the new one is audible.
            if let Some(prev) = previous {
                let _ = prev.task.await;
            }

            log::debug!(
                "speaker: #{id} start (rate={}, pitch={}, volume={}, chars={})",
                utterance.prosody.rate,
                utterance.prosody.pitch,
                utterance.volume,
                utterance.text.chars().count()
            );

            let outcome = match output.speak(&utterance).await {
                Ok(()) => SpeechOutcome::Finished,
                Err(SpeechError::Unavailable(reason)) => {
                    log::debug!("speaker: no speech output ({reason})");
                    SpeechOutcome::Unavailable
                }
                Err(e) => {
                    log::warn!("speaker: #{id} failed: {e}");
                    SpeechOutcome::Failed(e)
                }
            };
            let _ = done_tx.send(outcome);
        });

        *slot = Some(ActiveUtterance { id, task });
        SpeechCompletion(Some(done_rx))
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        if let Some(active) = self
            .active
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            active.task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
