use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, interval_at};

use crate::lifecycle::MessageEngine;
use crate::lifecycle::types::{ChatSnapshot, LifecycleCommand, LifecycleEvent, Scheduled};

/// State for the lifecycle background task
struct LifecycleTaskState {
    engine: MessageEngine,
    /// One-shot delays still waiting to fire. Dropping the set aborts them.
    timers: JoinSet<()>,
    event_tx: mpsc::UnboundedSender<LifecycleEvent>,
    snapshot_tx: watch::Sender<ChatSnapshot>,
}

impl LifecycleTaskState {
    fn new(
        engine: MessageEngine,
        event_tx: mpsc::UnboundedSender<LifecycleEvent>,
        snapshot_tx: watch::Sender<ChatSnapshot>,
    ) -> Self {
        Self {
            engine,
            timers: JoinSet::new(),
            event_tx,
            snapshot_tx,
        }
    }

    fn handle_command(&mut self, command: LifecycleCommand) -> bool {
        match command {
            LifecycleCommand::Submit(text) => {
                let effects = self.engine.submit(&text);
                if effects.is_empty() {
                    tracing::debug!("Ignoring blank submission");
                    return true;
                }
                self.schedule(effects);
                self.publish();
                true
            }
            LifecycleCommand::Shutdown => false,
        }
    }

    fn handle_event(&mut self, event: LifecycleEvent) {
        if !matches!(event, LifecycleEvent::Tick) {
            tracing::debug!("Lifecycle event: {:?}", event);
        }
        let effects = self.engine.apply(event);
        self.schedule(effects);
        self.publish();
    }

    fn schedule(&mut self, effects: Vec<Scheduled>) {
        for Scheduled { delay, event } in effects {
            let event_tx = self.event_tx.clone();
            self.timers.spawn(async move {
                tokio::time::sleep(delay).await;
                if event_tx.send(event).is_err() {
                    tracing::debug!("Lifecycle task gone, dropping delayed event");
                }
            });
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.engine.snapshot());
    }
}

/// Background task that owns the message engine and serializes every mutation
pub async fn lifecycle_background_task(
    engine: MessageEngine,
    mut command_rx: mpsc::UnboundedReceiver<LifecycleCommand>,
    snapshot_tx: watch::Sender<ChatSnapshot>,
) {
    tracing::info!("Lifecycle task started");

    let period = engine.settings().tick_interval;
    let mut ticker = interval_at(Instant::now() + period, period);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut state = LifecycleTaskState::new(engine, event_tx, snapshot_tx);
    state.publish();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                state.handle_event(LifecycleEvent::Tick);
            }

            command = command_rx.recv() => {
                match command {
                    Some(cmd) => {
                        if !state.handle_command(cmd) {
                            tracing::info!("Shutdown requested, ending lifecycle task");
                            break;
                        }
                    }
                    None => {
                        tracing::info!("Command channel closed, ending lifecycle task");
                        break;
                    }
                }
            }

            Some(event) = event_rx.recv() => {
                state.handle_event(event);
            }

            // Reap finished timers so the set does not grow without bound
            Some(_) = state.timers.join_next(), if !state.timers.is_empty() => {}
        }
    }

    state.timers.abort_all();
    tracing::info!("Lifecycle task ended");
}
