//! Speech input and output for the assistant panel.
//!
//! * [`VoiceCatalog`]: picks the default synthesis voice and keeps the
//!   [`SelectedVoice`] cell current as the platform catalog changes.
//! * [`Speaker`]: plays one [`Utterance`] at a time with prosody jitter.
//! * [`SpeechOutput`]: platform synthesiser ([`EspeakOutput`], [`SilentOutput`]).
//! * [`SpeechRecognizer`]: one-shot speech-to-text ([`CommandRecognizer`],
//!   [`UnavailableRecognizer`]).
//!
//! # Wiring
//!
//! ```text
//! SpeechOutput::voices() ──▶ VoiceCatalog::refresh ──▶ SelectedVoice
//!                                                          │ (read)
//! ConversationOrchestrator ──▶ Speaker::speak ─────────────┘
//!                                   └──▶ SpeechOutput::speak
//! ```

pub mod output;
pub mod recognition;
pub mod speaker;
pub mod voice;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use output::{parse_voice_table, EspeakOutput, SilentOutput, SpeechError, SpeechOutput};
pub use recognition::{
    CommandRecognizer, RecognitionError, RecognitionRequest, SpeechRecognizer,
    UnavailableRecognizer,
};
pub use speaker::{
    coerce_volume, Prosody, SpeechCompletion, SpeechOutcome, Speaker, Utterance,
};
pub use voice::{select_default, SelectedVoice, Voice, VoiceCatalog};
