//! Event dispatcher
//!
//! Receives decoded dispatches from the shard and runs each engine event in
//! its own task under a time limit.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reactrole_service::ReconciliationEngine;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::events::DispatchEvent;

/// Routes gateway events into the reconciliation engine
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    engine: ReconciliationEngine,
    /// Time limit for handling one event
    event_timeout: Duration,
    /// Re-add the bot's reactions on the first READY
    restore_on_ready: bool,
    restored: Arc<AtomicBool>,
    /// Engine events that ran to completion or timed out
    handled: Arc<AtomicU64>,
}

impl EventDispatcher {
    pub fn new(engine: ReconciliationEngine, event_timeout: Duration, restore_on_ready: bool) -> Self {
        Self {
            engine,
            event_timeout,
            restore_on_ready,
            restored: Arc::new(AtomicBool::new(false)),
            handled: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn handled_count(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }

    /// Route events until the channel closes, then wait for running handlers
    pub async fn run(self, mut events: mpsc::Receiver<DispatchEvent>) {
        let mut tasks = JoinSet::new();

        while let Some(event) = events.recv().await {
            self.route(event, &mut tasks);
            while let Some(result) = tasks.try_join_next() {
                report_join(result);
            }
        }

        debug!(in_flight = tasks.len(), "Event channel closed, draining handlers");
        while let Some(result) = tasks.join_next().await {
            report_join(result);
        }
    }

    fn route(&self, event: DispatchEvent, tasks: &mut JoinSet<()>) {
        match event {
            DispatchEvent::Ready(ready) => {
                // Before any later event is routed, so own reactions are recognized
                self.engine.set_self_id(ready.user.id);
                info!(
                    user = %ready.user.username,
                    guilds = ready.guilds.len(),
                    "Gateway ready"
                );

                if self.restore_on_ready && !self.restored.swap(true, Ordering::SeqCst) {
                    let engine = self.engine.clone();
                    tasks.spawn(async move {
                        engine.restore_affordances().await;
                    });
                }
            }
            DispatchEvent::Resumed => {}
            DispatchEvent::Engine(event) => {
                let engine = self.engine.clone();
                let limit = self.event_timeout;
                let handled = Arc::clone(&self.handled);

                tasks.spawn(async move {
                    let kind = event.kind();
                    // Outcomes and errors are logged by the engine. Mapping writes run
                    // in their own task and complete even when this limit fires.
                    if timeout(limit, engine.handle_event(event)).await.is_err() {
                        warn!(
                            kind,
                            timeout_ms = limit.as_millis() as u64,
                            "Event handling timed out, event dropped"
                        );
                    }
                    handled.fetch_add(1, Ordering::Relaxed);
                });
            }
        }
    }
}

fn report_join(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            error!(error = %e, "Event handler panicked");
        }
    }
}
