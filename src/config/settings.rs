//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]`, so a hand-edited `settings.toml`
//! only needs the keys it wants to override.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// LookupConfig
// ---------------------------------------------------------------------------

/// Settings for the external summary lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Base URL of the summary endpoint.  The URL-encoded query is appended
    /// as the final path segment.
    pub base_url: String,
    /// Maximum seconds to wait for a summary before giving up.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every lookup.
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/api/rest_v1/page/summary".into(),
            timeout_secs: 10,
            user_agent: concat!("friday-panel/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceConfig
// ---------------------------------------------------------------------------

/// Voice selection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Preferred voice names, highest priority first.  Matched as
    /// case-insensitive substrings of the voice's display name.
    pub preferred: Vec<String>,
    /// Language tag used for the on-device fallback and for every utterance.
    pub language: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            preferred: vec![
                "Google US English".into(),
                "Microsoft Aria".into(),
                "Samantha".into(),
            ],
            language: "en-US".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Speech output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// When `false` the panel runs with no speech output (silent no-op).
    pub enabled: bool,
    /// Synthesiser executable (espeak-ng compatible command line).
    pub program: String,
    /// Initial volume shown on the volume control.
    pub volume: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "espeak-ng".into(),
            volume: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// RecognitionConfig
// ---------------------------------------------------------------------------

/// Speech input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// External one-shot recogniser: program followed by its arguments.  The
    /// program must print the recognised transcript on stdout.  `None`
    /// means voice input is unavailable.
    pub command: Option<Vec<String>>,
    /// Recognition language tag.
    pub language: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            command: None,
            language: "en-US".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

/// Typed reveal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Milliseconds between two revealed characters.
    pub char_delay_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { char_delay_ms: 30 }
    }
}

// ---------------------------------------------------------------------------
// SearchConfig
// ---------------------------------------------------------------------------

/// One keyword rule of the site search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRoute {
    /// Human-readable destination name.
    pub name: String,
    /// Lowercase keywords; any substring hit selects this route.
    pub keywords: Vec<String>,
    /// Page relative to [`SearchConfig::site_root`].
    pub page: String,
}

impl SearchRoute {
    fn new(name: &str, keywords: &[&str], page: &str) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            page: page.into(),
        }
    }
}

/// Keyword search settings.  Routes are evaluated in order; first hit wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base location of the static site pages.
    pub site_root: String,
    /// Ordered keyword rules.
    pub routes: Vec<SearchRoute>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            site_root: "http://localhost:3000/".into(),
            routes: vec![
                SearchRoute::new("Marvel", &["marvel"], "marvel.html"),
                SearchRoute::new("DC", &["dc"], "dcu.html"),
                SearchRoute::new(
                    "MonsterVerse",
                    &["monster", "godzilla", "kong"],
                    "monstervers.html",
                ),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Panel window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner size of the panel window `(width, height)`.
    pub window_size: (f32, f32),
    /// Keep the panel floating above all other windows.
    pub always_on_top: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (420.0, 560.0),
            always_on_top: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use friday_panel::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub lookup: LookupConfig,
    pub voice: VoiceConfig,
    pub speech: SpeechConfig,
    pub recognition: RecognitionConfig,
    pub render: RenderConfig,
    pub search: SearchConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.lookup.base_url, default.lookup.base_url);
        assert_eq!(config.voice.preferred, default.voice.preferred);
        assert_eq!(config.render.char_delay_ms, default.render.char_delay_ms);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(
            cfg.lookup.base_url,
            "https://en.wikipedia.org/api/rest_v1/page/summary"
        );
        assert_eq!(cfg.voice.preferred[0], "Google US English");
        assert_eq!(cfg.voice.preferred[1], "Microsoft Aria");
        assert_eq!(cfg.voice.preferred[2], "Samantha");
        assert_eq!(cfg.voice.language, "en-US");
        assert_eq!(cfg.render.char_delay_ms, 30);
        assert!(cfg.recognition.command.is_none());
        assert_eq!(cfg.search.routes.len(), 3);
        assert_eq!(cfg.search.routes[2].page, "monstervers.html");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.lookup.timeout_secs = 3;
        cfg.voice.preferred = vec!["Daniel".into()];
        cfg.speech.program = "espeak".into();
        cfg.recognition.command = Some(vec!["listen-once".into(), "--en".into()]);
        cfg.render.char_delay_ms = 5;
        cfg.ui.always_on_top = true;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.lookup.timeout_secs, 3);
        assert_eq!(loaded.voice.preferred, vec!["Daniel".to_string()]);
        assert_eq!(loaded.speech.program, "espeak");
        assert_eq!(
            loaded.recognition.command,
            Some(vec!["listen-once".to_string(), "--en".to_string()])
        );
        assert_eq!(loaded.render.char_delay_ms, 5);
        assert!(loaded.ui.always_on_top);
        assert_eq!(loaded.search.routes, cfg.search.routes);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[render]\nchar_delay_ms = 12\n").expect("write");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.render.char_delay_ms, 12);
        assert_eq!(loaded.speech.program, "espeak-ng");
        assert_eq!(loaded.voice.language, "en-US");
    }
}
