//! Configuration module for the FRIDAY assistant panel.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for the platform config directory, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, LookupConfig, RecognitionConfig, RenderConfig, SearchConfig, SearchRoute,
    SpeechConfig, UiConfig, VoiceConfig,
};
