//! Application entry point: FRIDAY assistant panel.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build speech output and select the default voice.
//! 5. Build the resolver, renderer, speaker and recogniser from config.
//! 6. Create channels (`command`, `notice`) and spawn the orchestrator.
//! 7. Run [`eframe::run_native`]: blocks the main thread until the window
//!    is closed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use eframe::egui;
use tokio::sync::mpsc;

use friday_panel::{
    app::AssistantApp,
    config::AppConfig,
    conversation::{new_shared_state, ConversationCommand, ConversationOrchestrator, SharedTranscript},
    input::{InputCapture, InputField, Notice},
    lookup::{QueryResolver, SummaryResolver},
    render::TypedRenderer,
    speech::{
        CommandRecognizer, EspeakOutput, SilentOutput, Speaker, SpeechOutput, SpeechRecognizer,
        UnavailableRecognizer, Voice, VoiceCatalog,
    },
};

/// How often the platform voice list is re-read for changes.
const VOICE_POLL: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Voice catalog
// ---------------------------------------------------------------------------

/// Refresh the selection once, then keep re-reading the catalog and forward
/// every change to [`VoiceCatalog::watch`].
async fn track_voices(output: Arc<dyn SpeechOutput>, catalog: Arc<VoiceCatalog>) {
    let mut current: Vec<Voice> = match output.voices().await {
        Ok(voices) => voices,
        Err(e) => {
            log::warn!("voices: catalog unavailable ({e}); using platform default");
            Vec::new()
        }
    };
    catalog.refresh(&current);

    let (changes_tx, changes_rx) = mpsc::channel::<Vec<Voice>>(4);
    let watcher = Arc::clone(&catalog);
    tokio::spawn(async move { watcher.watch(changes_rx).await });

    let mut ticker = tokio::time::interval(VOICE_POLL);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Ok(voices) = output.voices().await else {
            continue;
        };
        if voices != current {
            current = voices.clone();
            if changes_tx.send(voices).await.is_err() {
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (w, h) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("FRIDAY")
        .with_inner_size([w, h])
        .with_min_inner_size([320.0, 240.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("FRIDAY panel starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Speech output + voice selection
    let output: Arc<dyn SpeechOutput> = if config.speech.enabled {
        Arc::new(EspeakOutput::new(config.speech.program.clone()))
    } else {
        log::info!("Speech output disabled in config");
        Arc::new(SilentOutput)
    };
    let catalog = Arc::new(VoiceCatalog::new(&config.voice));
    let speaker = Arc::new(Speaker::new(
        Arc::clone(&output),
        catalog.selected(),
        config.voice.language.clone(),
    ));
    rt.spawn(track_voices(Arc::clone(&output), catalog));

    // 5. Resolver, renderer, recogniser
    let resolver: Arc<dyn QueryResolver> = Arc::new(SummaryResolver::from_config(&config.lookup));
    let renderer = Arc::new(TypedRenderer::new(Duration::from_millis(
        config.render.char_delay_ms,
    )));

    let recognizer: Arc<dyn SpeechRecognizer> = match config
        .recognition
        .command
        .as_deref()
        .and_then(CommandRecognizer::from_command_line)
    {
        Some(rec) => Arc::new(rec),
        None => {
            log::info!("No recogniser configured; voice input unavailable");
            Arc::new(UnavailableRecognizer)
        }
    };
    let capture = InputCapture::new(
        InputField::new(),
        recognizer,
        config.recognition.language.clone(),
    );

    // 6. Channels + orchestrator
    let (command_tx, command_rx) = mpsc::channel::<ConversationCommand>(16);
    let (notice_tx, notice_rx) = mpsc::channel::<Notice>(8);

    let state = new_shared_state();
    let transcript = SharedTranscript::new();

    let orchestrator = ConversationOrchestrator::new(
        Arc::clone(&state),
        transcript.clone(),
        capture.clone(),
        resolver,
        Arc::clone(&renderer),
        speaker,
    );
    rt.spawn(orchestrator.run(command_rx, notice_tx));

    // 7. Build the egui app and run it (blocks until the window is closed)
    let options = native_options(&config);
    let app = AssistantApp::new(
        state, transcript, capture, renderer, command_tx, notice_rx, config,
    );

    eframe::run_native("FRIDAY", options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))?;

    rt.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}
