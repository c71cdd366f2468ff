//! Turn state machine and shared panel state.
//!
//! [`TurnState`] drives the orchestrator's state machine.  The panel reads
//! it via [`SharedState`] to show what the assistant is doing.

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// TurnState
// ---------------------------------------------------------------------------

/// States of one conversation turn.
///
/// ```text
/// Idle ──submission──▶ UserMessageAppended ──▶ AwaitingAnswer
///                        ──answer──▶ AnswerRevealing ──▶ TurnComplete ──▶ Idle
///                        ──failure─▶ ErrorRevealing  ──▶ TurnComplete ──▶ Idle
/// Idle ──blank submission──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for the user.
    #[default]
    Idle,

    /// The user message and the empty assistant placeholder are in the
    /// transcript.
    UserMessageAppended,

    /// The lookup is in flight.
    AwaitingAnswer,

    /// The answer is being typed and spoken.
    AnswerRevealing,

    /// The lookup failed; the apology is being shown and spoken.
    ErrorRevealing,

    /// The input has been reset; about to return to `Idle`.
    TurnComplete,
}

impl TurnState {
    /// `true` while a turn is waiting for its answer.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            TurnState::UserMessageAppended | TurnState::AwaitingAnswer
        )
    }

    /// Short label for the panel status line.
    pub fn label(&self) -> &'static str {
        match self {
            TurnState::Idle => "Ready",
            TurnState::UserMessageAppended | TurnState::AwaitingAnswer => "Thinking…",
            TurnState::AnswerRevealing => "Answering",
            TurnState::ErrorRevealing => "No answer",
            TurnState::TurnComplete => "Done",
        }
    }
}

// ---------------------------------------------------------------------------
// PanelState
// ---------------------------------------------------------------------------

/// State shared between the orchestrator and the panel.
#[derive(Debug, Default)]
pub struct PanelState {
    /// Phase of the current turn.
    pub turn: TurnState,

    /// Number of turns that have settled since startup.
    pub turns_completed: u64,

    /// Reason of the most recent failed lookup, for the status tooltip.
    pub last_failure: Option<String>,
}

/// Thread-safe handle to [`PanelState`].
///
/// Lock for a short critical section; do **not** hold the lock across
/// `.await` points.
pub type SharedState = Arc<Mutex<PanelState>>;

pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(PanelState::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
