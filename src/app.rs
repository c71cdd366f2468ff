//! FRIDAY assistant panel: egui/eframe application.
//!
//! # Architecture
//!
//! [`AssistantApp`] is the top-level [`eframe::App`].  It reads the
//! [`SharedTranscript`] and [`SharedState`] every frame and talks to the
//! orchestrator task through two channel endpoints:
//!
//! * `command_tx`: sends [`ConversationCommand`]s (Submit, Listen).
//! * `notice_rx`: receives voice-capture [`Notice`]s to show as a
//!   blocking dialog.
//!
//! The keyword search runs on the UI thread; a hit opens the destination
//! page, a miss shows a notice.

use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::conversation::{
    ConversationCommand, Message, PanelState, SharedState, SharedTranscript, TurnState,
};
use crate::input::{InputCapture, InputSource, Key, Notice, Submission};
use crate::render::TypedRenderer;
use crate::search::{search, SearchOutcome};

/// One transcript line as shown in the panel.
pub fn display_line(message: &Message) -> String {
    format!("{}{}", message.role.prefix(), message.text)
}

/// Hover text of the status label.
pub fn status_tooltip(state: &PanelState) -> String {
    let mut text = format!("Turns this session: {}", state.turns_completed);
    if let Some(reason) = &state.last_failure {
        text.push_str("\nLast lookup failure: ");
        text.push_str(reason);
    }
    text
}

/// eframe application: the assistant panel.
pub struct AssistantApp {
    // ── Shared with the orchestrator ─────────────────────────────────────
    state: SharedState,
    transcript: SharedTranscript,
    capture: InputCapture,
    renderer: Arc<TypedRenderer>,

    // ── UI state ─────────────────────────────────────────────────────────
    /// Value of the volume control.
    volume: f32,
    /// Contents of the search box.
    search_query: String,
    /// Blocking notice currently on screen.
    notice: Option<String>,
    /// Last `scroll_requests` value the view acted on.
    seen_scroll: u64,

    // ── Channels ─────────────────────────────────────────────────────────
    command_tx: mpsc::Sender<ConversationCommand>,
    notice_rx: mpsc::Receiver<Notice>,

    config: AppConfig,
}

impl AssistantApp {
    pub fn new(
        state: SharedState,
        transcript: SharedTranscript,
        capture: InputCapture,
        renderer: Arc<TypedRenderer>,
        command_tx: mpsc::Sender<ConversationCommand>,
        notice_rx: mpsc::Receiver<Notice>,
        config: AppConfig,
    ) -> Self {
        Self {
            state,
            transcript,
            capture,
            renderer,
            volume: config.speech.volume,
            search_query: String::new(),
            notice: None,
            seen_scroll: 0,
            command_tx,
            notice_rx,
            config,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    fn poll_notices(&mut self) {
        while let Ok(notice) = self.notice_rx.try_recv() {
            self.notice = Some(notice.to_string());
        }
    }

    fn send(&self, command: ConversationCommand) {
        if let Err(e) = self.command_tx.try_send(command) {
            log::warn!("panel: orchestrator not accepting commands: {e}");
        }
    }

    fn submit(&self, submission: Submission) {
        self.send(ConversationCommand::Submit {
            text: submission.text,
            volume: Some(self.volume),
        });
    }

    /// Current turn and the status tooltip, read under one short lock.
    fn status(&self) -> (TurnState, String) {
        let st = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (st.turn, status_tooltip(&st))
    }

    // ── Search ───────────────────────────────────────────────────────────

    fn run_search(&mut self, ctx: &egui::Context) {
        let outcome = search(&self.config.search, &self.search_query);
        match &outcome {
            SearchOutcome::Navigate { url, .. } => {
                ctx.open_url(egui::OpenUrl::same_tab(url.clone()));
            }
            SearchOutcome::NoResults | SearchOutcome::EmptyQuery => {
                self.notice = outcome.notice().map(str::to_string);
            }
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_header(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (turn, tooltip) = self.status();
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("FRIDAY").strong().size(16.0));
            ui.label(
                egui::RichText::new(turn.label())
                    .color(egui::Color32::from_rgb(140, 140, 140))
                    .size(12.0),
            )
            .on_hover_text(tooltip);
            if turn.is_busy() {
                ui.spinner();
            }
        });

        ui.horizontal(|ui| {
            let resp = ui.add(
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text("Search Marvel, DC, MonsterVerse…")
                    .desired_width(ui.available_width() - 70.0),
            );
            let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Search").clicked() || enter {
                self.run_search(ctx);
            }
        });
    }

    fn draw_transcript(&mut self, ui: &mut egui::Ui) {
        let (lines, scroll_requests) = {
            let transcript = self.transcript.lock();
            let lines: Vec<(bool, String)> = transcript
                .messages()
                .iter()
                .map(|m| (m.role == crate::conversation::Role::User, display_line(m)))
                .collect();
            (lines, transcript.scroll_requests())
        };

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for (is_user, line) in &lines {
                    let color = if *is_user {
                        egui::Color32::from_rgb(200, 200, 200)
                    } else {
                        egui::Color32::from_rgb(80, 200, 120)
                    };
                    ui.add(egui::Label::new(egui::RichText::new(line).color(color)).wrap());
                    ui.add_space(4.0);
                }
                if scroll_requests != self.seen_scroll {
                    self.seen_scroll = scroll_requests;
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
    }

    fn draw_input(&mut self, ui: &mut egui::Ui) {
        let field = self.capture.field().clone();
        let mut text = field.get();

        ui.horizontal(|ui| {
            let resp = ui.add(
                egui::TextEdit::singleline(&mut text)
                    .hint_text("Ask FRIDAY…")
                    .desired_width(ui.available_width() - 110.0),
            );
            if resp.changed() {
                field.set(text.clone());
            }

            let key = if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                Key::Enter
            } else {
                Key::Other
            };
            let outcome = self.capture.on_key(key);
            if outcome.prevent_default {
                resp.request_focus();
            }
            if let Some(submission) = outcome.submission {
                self.submit(submission);
            }

            if ui.button("Send").clicked() {
                if let Some(submission) = self.capture.submit(InputSource::Typed) {
                    self.submit(submission);
                }
            }
            if ui.button("🎤").on_hover_text("Speak your question").clicked() {
                self.send(ConversationCommand::Listen {
                    volume: Some(self.volume),
                });
            }
        });

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Volume").size(11.0));
            ui.add(egui::Slider::new(&mut self.volume, 0.0..=1.0).show_value(false));
        });
    }

    fn draw_notice(&mut self, ctx: &egui::Context) {
        let Some(message) = self.notice.clone() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message.as_str());
                ui.add_space(6.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.notice = None;
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for AssistantApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_notices();

        // Typed reveal and lookups progress off the UI thread; keep
        // repainting while either is in flight.
        if self.renderer.pending() > 0 || self.status().0 != TurnState::Idle {
            ctx.request_repaint_after(Duration::from_millis(33));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            let ctx_clone = ctx.clone();
            self.draw_header(ui, &ctx_clone);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("input").show(ctx, |ui| {
            ui.add_space(4.0);
            self.draw_input(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_transcript(ui);
        });

        self.draw_notice(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("FRIDAY panel closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Transcript;

    #[test]
    fn lines_carry_role_prefix() {
        let mut t = Transcript::new();
        let u = t.append_user("Godzilla");
        let a = t.append_assistant_placeholder();
        t.push_str(a, "A monster.");

        assert_eq!(display_line(t.message(u).unwrap()), "🧑 Godzilla");
        assert_eq!(display_line(t.message(a).unwrap()), "🤖 A monster.");
    }

    #[test]
    fn tooltip_counts_turns_and_names_last_failure() {
        let mut st = PanelState::default();
        assert_eq!(status_tooltip(&st), "Turns this session: 0");

        st.turns_completed = 3;
        st.last_failure = Some("lookup service returned HTTP 404".into());
        assert_eq!(
            status_tooltip(&st),
            "Turns this session: 3\nLast lookup failure: lookup service returned HTTP 404"
        );
    }
}
