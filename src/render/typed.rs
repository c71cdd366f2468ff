//! Timer-driven typed reveal into a [`TextSurface`].
//!
//! [`TypedRenderer`] keeps at most one pending render per surface.  A new
//! render on the same surface aborts the old task and bumps the surface's
//! generation; every write checks the generation under the pending-map lock,
//! so a superseded render can never write again, even if it was mid-tick.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::render::reveal::Reveal;

// ---------------------------------------------------------------------------
// TextSurface
// ---------------------------------------------------------------------------

/// Something a renderer can type into.
pub trait TextSurface: Send + Sync + 'static {
    /// Identity of the surface; renders with equal keys target the same
    /// surface.
    fn key(&self) -> u64;

    fn clear(&self);

    fn push(&self, ch: char);
}

// ---------------------------------------------------------------------------
// RenderHandle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Every character was revealed.
    Completed,
    /// Another render took over the surface first.
    Superseded,
}

/// Optional completion signal of one [`TypedRenderer::render`] call.
pub struct RenderHandle(oneshot::Receiver<RenderOutcome>);

impl RenderHandle {
    fn ready(outcome: RenderOutcome) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(outcome);
        Self(rx)
    }

    pub async fn finished(self) -> RenderOutcome {
        self.0.await.unwrap_or(RenderOutcome::Superseded)
    }
}

// ---------------------------------------------------------------------------
// TypedRenderer
// ---------------------------------------------------------------------------

struct PendingRender {
    generation: u64,
    task: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<u64, PendingRender>>>;

fn lock(pending: &PendingMap) -> std::sync::MutexGuard<'_, HashMap<u64, PendingRender>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Shortest tick between two characters; a zero delay types at this pace.
const MIN_TICK: Duration = Duration::from_millis(1);

pub struct TypedRenderer {
    delay: Duration,
    pending: PendingMap,
    next_generation: AtomicU64,
}

impl TypedRenderer {
    /// Renderer revealing one character every `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Clear `surface` and type `text` into it, one character per tick.
    ///
    /// Cancels a render still in progress on the same surface.  Must be
    /// called from within a tokio runtime.
    pub fn render<S: TextSurface>(&self, text: &str, surface: S) -> RenderHandle {
        self.render_with_delay(text, surface, self.delay)
    }

    pub fn render_with_delay<S: TextSurface>(
        &self,
        text: &str,
        surface: S,
        delay: Duration,
    ) -> RenderHandle {
        let delay = delay.max(MIN_TICK);
        let key = surface.key();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut reveal = Reveal::new(text);

        let mut pending = lock(&self.pending);
        if let Some(old) = pending.remove(&key) {
            log::debug!("render: surface {key} superseded (generation {})", old.generation);
            old.task.abort();
        }
        surface.clear();

        if reveal.is_done() {
            return RenderHandle::ready(RenderOutcome::Completed);
        }

        let (done_tx, done_rx) = oneshot::channel();
        let shared = Arc::clone(&self.pending);
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + delay, delay);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;

                let mut pending = lock(&shared);
                if pending.get(&key).map(|p| p.generation) != Some(generation) {
                    return;
                }
                let Some(chunk) = reveal.next_chunk() else {
                    pending.remove(&key);
                    break;
                };
                surface.push(chunk.ch);
                if chunk.done {
                    pending.remove(&key);
                    break;
                }
            }

            let _ = done_tx.send(RenderOutcome::Completed);
        });

        pending.insert(key, PendingRender { generation, task });
        RenderHandle(done_rx)
    }

    /// Number of renders still typing.
    pub fn pending(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl Drop for TypedRenderer {
    fn drop(&mut self) {
        for (_, render) in lock(&self.pending).drain() {
            render.task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
