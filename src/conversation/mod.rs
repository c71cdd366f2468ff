//! Conversation turns: transcript, turn state machine and the orchestrator.
//!
//! # Architecture
//!
//! ```text
//! ConversationCommand (mpsc)
//!        │
//!        ▼
//! ConversationOrchestrator::run()  ← async tokio task
//!        │
//!        ├─ Submit { text } ──────────────────────┐
//!        ├─ Listen → InputCapture::listen (task) ─┴─▶ submit(text)
//!        │                                            ├─ QueryResolver::resolve
//!        │                                            ├─ TypedRenderer::render ┐ concurrently
//!        │                                            └─ Speaker::speak        ┘
//!        └─ Notice (mpsc) ─▶ panel
//!
//! SharedTranscript / SharedState ←─── read by egui update() each frame
//! ```

pub mod orchestrator;
pub mod state;
pub mod transcript;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use orchestrator::{ConversationCommand, ConversationOrchestrator, TurnReport, APOLOGY};
pub use state::{new_shared_state, PanelState, SharedState, TurnState};
pub use transcript::{Message, MessageId, MessageSurface, Role, SharedTranscript, Transcript};
