//! Conversation orchestrator: one submission → one answered turn.
//!
//! # Turn flow
//!
//! ```text
//! submit(text)
//!   ├─ blank → no-op (Idle)
//!   └─ append user msg + empty assistant msg        [UserMessageAppended]
//!        └─▶ resolver.resolve(text)                 [AwaitingAnswer]
//!              ├─ Ok  → renderer.render ┐ both started,   [AnswerRevealing]
//!              │        speaker.speak   ┘ neither awaited
//!              └─ Err → apology written + spoken          [ErrorRevealing]
//!        └─▶ clear input, scroll to end             [TurnComplete → Idle]
//! ```
//!
//! Rendering and speech keep running after `submit` returns; the returned
//! [`TurnReport`] carries their optional completion signals.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

use crate::input::{InputCapture, Notice, Submission};
use crate::lookup::QueryResolver;
use crate::render::{RenderHandle, TypedRenderer};
use crate::speech::{SpeechCompletion, Speaker};

use super::state::{SharedState, TurnState};
use super::transcript::{MessageId, SharedTranscript};

/// Assistant reply used whenever the lookup fails.
pub const APOLOGY: &str = "Sorry, I couldn't find info on that.";

// ---------------------------------------------------------------------------
// Commands / reports
// ---------------------------------------------------------------------------

/// Requests sent from the panel to the orchestrator task.
#[derive(Debug, Clone)]
pub enum ConversationCommand {
    /// Run a turn for `text`, read from the field when Enter or Send was
    /// pressed.
    Submit { text: String, volume: Option<f32> },
    /// Start one voice capture session and submit its transcript.
    Listen { volume: Option<f32> },
}

/// Volume of the Listen command plus what its voice session produced.
type ListenResult = (Option<f32>, Result<Option<Submission>, Notice>);

/// Handles to one settled turn.
pub struct TurnReport {
    pub user: MessageId,
    pub assistant: MessageId,
    /// `false` when the apology was used.
    pub answered: bool,
    /// Typed reveal of the answer; `None` on the apology path.
    pub render: Option<RenderHandle>,
    pub speech: SpeechCompletion,
}

// ---------------------------------------------------------------------------
// ConversationOrchestrator
// ---------------------------------------------------------------------------

pub struct ConversationOrchestrator {
    state: SharedState,
    transcript: SharedTranscript,
    capture: InputCapture,
    resolver: Arc<dyn QueryResolver>,
    renderer: Arc<TypedRenderer>,
    speaker: Arc<Speaker>,
}

impl ConversationOrchestrator {
    /// * `state`: shared panel state (also read by the UI).
    /// * `transcript`: shared transcript (also read by the UI).
    /// * `capture`: input capture owning the text field.
    /// * `resolver`: answer source (e.g. [`SummaryResolver`](crate::lookup::SummaryResolver)).
    pub fn new(
        state: SharedState,
        transcript: SharedTranscript,
        capture: InputCapture,
        resolver: Arc<dyn QueryResolver>,
        renderer: Arc<TypedRenderer>,
        speaker: Arc<Speaker>,
    ) -> Self {
        Self {
            state,
            transcript,
            capture,
            resolver,
            renderer,
            speaker,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `commands` is closed.  Voice-capture notices go to
    /// `notices`.
    ///
    /// Turns run one after another.  Voice sessions run beside them, so a
    /// typed submission is never held up by a listening microphone; a
    /// session's transcript becomes a turn once it arrives.
    pub async fn run(
        self,
        mut commands: mpsc::Receiver<ConversationCommand>,
        notices: mpsc::Sender<Notice>,
    ) {
        let mut sessions: JoinSet<ListenResult> = JoinSet::new();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(ConversationCommand::Submit { text, volume }) => {
                        self.submit(&text, volume).await;
                    }
                    Some(ConversationCommand::Listen { volume }) => {
                        let capture = self.capture.clone();
                        sessions.spawn(async move { (volume, capture.listen().await) });
                    }
                    None => break,
                },
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    self.finish_listen(joined, &notices).await;
                }
            }
        }

        while let Some(joined) = sessions.join_next().await {
            self.finish_listen(joined, &notices).await;
        }
        log::info!("orchestrator: command channel closed, shutting down");
    }

    async fn finish_listen(
        &self,
        joined: Result<ListenResult, JoinError>,
        notices: &mpsc::Sender<Notice>,
    ) {
        match joined {
            Ok((volume, Ok(Some(submission)))) => {
                self.submit(&submission.text, volume).await;
            }
            Ok((_, Ok(None))) => log::debug!("orchestrator: empty transcript, nothing to submit"),
            Ok((_, Err(notice))) => {
                let _ = notices.send(notice).await;
            }
            Err(e) => log::warn!("orchestrator: voice session ended abnormally: {e}"),
        }
    }

    // -----------------------------------------------------------------------
    // Turn
    // -----------------------------------------------------------------------

    /// Run one turn for `text`.  Returns `None` (and touches nothing) when
    /// `text` is blank.
    pub async fn submit(&self, text: &str, volume: Option<f32>) -> Option<TurnReport> {
        let query = text.trim();
        if query.is_empty() {
            log::debug!("orchestrator: blank submission ignored");
            return None;
        }

        // ── 1. Transcript: user message, then placeholder ────────────────
        let (user, assistant) = {
            let mut transcript = self.transcript.lock();
            let user = transcript.append_user(query);
            let assistant = transcript.append_assistant_placeholder();
            (user, assistant)
        };
        self.set_turn(TurnState::UserMessageAppended);

        // ── 2. Lookup ────────────────────────────────────────────────────
        self.set_turn(TurnState::AwaitingAnswer);
        let report = match self.resolver.resolve(query).await {
            Ok(answer) => {
                log::info!(
                    "orchestrator: answer for {query:?} ({} chars)",
                    answer.chars().count()
                );
                self.set_turn(TurnState::AnswerRevealing);

                // ── 3a. Reveal and speak together ────────────────────────
                let render = self
                    .renderer
                    .render(&answer, self.transcript.surface(assistant));
                let speech = self.speaker.speak(&answer, volume);

                TurnReport {
                    user,
                    assistant,
                    answered: true,
                    render: Some(render),
                    speech,
                }
            }
            Err(e) => {
                if e.is_not_found() {
                    log::info!("orchestrator: no page for {query:?}, apologising");
                } else {
                    log::warn!("orchestrator: lookup for {query:?} failed ({e}), apologising");
                }
                {
                    let mut st = self.lock_state();
                    st.turn = TurnState::ErrorRevealing;
                    st.last_failure = Some(e.to_string());
                }

                // ── 3b. Apology, written directly ────────────────────────
                self.transcript.lock().push_str(assistant, APOLOGY);
                let speech = self.speaker.speak(APOLOGY, volume);

                TurnReport {
                    user,
                    assistant,
                    answered: false,
                    render: None,
                    speech,
                }
            }
        };

        // ── 4. Settle ────────────────────────────────────────────────────
        self.set_turn(TurnState::TurnComplete);
        self.capture.field().clear();
        self.transcript.lock().request_scroll_to_end();
        {
            let mut st = self.lock_state();
            st.turns_completed += 1;
            st.turn = TurnState::Idle;
        }

        Some(report)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn lock_state(&self) -> std::sync::MutexGuard<'_, super::state::PanelState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_turn(&self, turn: TurnState) {
        log::debug!("orchestrator: → {turn:?}");
        self.lock_state().turn = turn;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
