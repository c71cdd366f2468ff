//! Voice catalog and deterministic default-voice selection.
//!
//! [`select_default`] is a pure function over a voice list.  [`VoiceCatalog`]
//! owns the single-slot [`SelectedVoice`] cell, recomputes it on every
//! catalog-change notification and hands read-only clones of the cell to the
//! [`Speaker`](crate::speech::Speaker).

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use crate::config::VoiceConfig;

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

/// A synthesised-speech voice as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Platform identifier passed back when speaking.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// BCP-47 style language tag, e.g. `"en-US"`.
    pub lang: String,
    /// `true` for on-device voices.
    pub local: bool,
}

impl Voice {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        lang: impl Into<String>,
        local: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang: lang.into(),
            local,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection policy
// ---------------------------------------------------------------------------

/// Pick the default voice from `voices`.
///
/// Fallback order, first match wins:
/// 1. each entry of `preferred`, in order, as a case-insensitive substring of
///    the voice name;
/// 2. the first on-device voice whose language tag equals `language`;
/// 3. the first voice in platform order;
/// 4. `None` for an empty list.
pub fn select_default<'a>(
    voices: &'a [Voice],
    preferred: &[String],
    language: &str,
) -> Option<&'a Voice> {
    preferred
        .iter()
        .find_map(|wanted| {
            let wanted = wanted.to_lowercase();
            voices
                .iter()
                .find(|v| v.name.to_lowercase().contains(&wanted))
        })
        .or_else(|| voices.iter().find(|v| v.lang == language && v.local))
        .or_else(|| voices.first())
}

// ---------------------------------------------------------------------------
// SelectedVoice
// ---------------------------------------------------------------------------

/// Read handle to the currently selected voice.
///
/// Cheap to clone.  Only [`VoiceCatalog`] writes through it.
#[derive(Debug, Clone, Default)]
pub struct SelectedVoice(Arc<RwLock<Option<Voice>>>);

impl SelectedVoice {
    /// Snapshot of the current selection.
    pub fn get(&self) -> Option<Voice> {
        self.0
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, voice: Option<Voice>) {
        *self
            .0
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = voice;
    }
}

// ---------------------------------------------------------------------------
// VoiceCatalog
// ---------------------------------------------------------------------------

/// Owns the voice selection policy and the [`SelectedVoice`] cell.
pub struct VoiceCatalog {
    preferred: Vec<String>,
    language: String,
    selected: SelectedVoice,
}

impl VoiceCatalog {
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            preferred: config.preferred.clone(),
            language: config.language.clone(),
            selected: SelectedVoice::default(),
        }
    }

    /// Handle for readers of the selection.
    pub fn selected(&self) -> SelectedVoice {
        self.selected.clone()
    }

    /// Apply the selection policy to `voices` without touching state.
    pub fn select_default<'a>(&self, voices: &'a [Voice]) -> Option<&'a Voice> {
        select_default(voices, &self.preferred, &self.language)
    }

    /// Recompute the selection from a freshly read catalog and overwrite the
    /// previous value, including with `None`.
    pub fn refresh(&self, voices: &[Voice]) -> Option<Voice> {
        let choice = self.select_default(voices).cloned();
        match &choice {
            Some(v) => log::info!(
                "voices: selected {:?} ({}) from {} voice(s)",
                v.name,
                v.lang,
                voices.len()
            ),
            None => log::info!("voices: catalog is empty, using platform default"),
        }
        self.selected.set(choice.clone());
        choice
    }

    /// Re-run [`refresh`](Self::refresh) on every catalog-change notification
    /// until the sender side is dropped.
    pub async fn watch(&self, mut changes: mpsc::Receiver<Vec<Voice>>) {
        while let Some(voices) = changes.recv().await {
            self.refresh(&voices);
        }
        log::debug!("voices: catalog notifications closed");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> VoiceCatalog {
        VoiceCatalog::new(&VoiceConfig::default())
    }

    fn v(name: &str, lang: &str, local: bool) -> Voice {
        Voice::new(name.to_lowercase().replace(' ', "-"), name, lang, local)
    }

    #[test]
    fn first_preference_wins_regardless_of_position() {
        let voices = vec![
            v("Samantha", "en-US", true),
            v("Microsoft Aria Online", "en-US", false),
            v("Alex", "en-US", true),
            v("Google US English", "en-US", false),
        ];
        let picked = catalog().select_default(&voices).unwrap();
        assert_eq!(picked.name, "Google US English");
    }

    #[test]
    fn preference_match_is_case_insensitive_substring() {
        let voices = vec![
            v("Alex", "en-US", true),
            v("MICROSOFT ARIA (natural)", "en-US", false),
        ];
        let picked = catalog().select_default(&voices).unwrap();
        assert_eq!(picked.name, "MICROSOFT ARIA (natural)");
    }

    #[test]
    fn second_preference_beats_third() {
        let voices = vec![v("Samantha", "en-US", true), v("Microsoft Aria", "en-US", true)];
        assert_eq!(
            catalog().select_default(&voices).unwrap().name,
            "Microsoft Aria"
        );
    }

    #[test]
    fn falls_back_to_local_en_us() {
        let voices = vec![
            v("Remote US", "en-US", false),
            v("Anna", "de-DE", true),
            v("Fred", "en-US", true),
        ];
        assert_eq!(catalog().select_default(&voices).unwrap().name, "Fred");
    }

    #[test]
    fn falls_back_to_first_voice() {
        let voices = vec![v("Anna", "de-DE", true), v("Remote US", "en-US", false)];
        assert_eq!(catalog().select_default(&voices).unwrap().name, "Anna");
    }

    #[test]
    fn empty_list_selects_none() {
        assert!(catalog().select_default(&[]).is_none());
    }

    #[test]
    fn selection_is_idempotent() {
        let voices = vec![
            v("Anna", "de-DE", true),
            v("Fred", "en-US", true),
            v("Samantha", "en-US", true),
        ];
        let cat = catalog();
        let first = cat.refresh(&voices);
        let second = cat.refresh(&voices);
        assert_eq!(first, second);
        assert_eq!(cat.selected().get(), first);
    }

    #[test]
    fn refresh_overwrites_stale_selection() {
        let cat = catalog();
        let handle = cat.selected();

        cat.refresh(&[v("Samantha", "en-US", true)]);
        assert_eq!(handle.get().unwrap().name, "Samantha");

        cat.refresh(&[]);
        assert!(handle.get().is_none());
    }

    #[tokio::test]
    async fn watch_applies_every_notification() {
        let cat = catalog();
        let handle = cat.selected();
        let (tx, rx) = mpsc::channel(4);

        tx.send(vec![v("Anna", "de-DE", true)]).await.unwrap();
        tx.send(vec![v("Anna", "de-DE", true), v("Samantha", "en-US", true)])
            .await
            .unwrap();
        drop(tx);

        cat.watch(rx).await;
        assert_eq!(handle.get().unwrap().name, "Samantha");
    }
}
