use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::task::lifecycle_background_task;
use crate::lifecycle::{ChatSnapshot, LifecycleCommand, LifecycleSettings, MessageEngine};

/// Handle to the message lifecycle running in a background task.
///
/// Dropping the handle tears the task down together with every pending timer.
#[derive(Debug)]
pub struct LifecycleService {
    /// Send commands to the background lifecycle task
    command_tx: mpsc::UnboundedSender<LifecycleCommand>,
    /// Latest state published by the task
    snapshot_rx: watch::Receiver<ChatSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl LifecycleService {
    /// Start the lifecycle task, optionally seeding the channel with a peer greeting
    pub fn spawn(settings: LifecycleSettings, welcome: Option<String>) -> Self {
        let mut engine = MessageEngine::new(settings);
        if let Some(welcome) = welcome {
            engine.receive(welcome);
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

        let task = tokio::spawn(lifecycle_background_task(engine, command_rx, snapshot_tx));

        Self {
            command_tx,
            snapshot_rx,
            task: Some(task),
        }
    }

    pub fn submit(&self, text: impl Into<String>) -> Result<()> {
        self.command_tx
            .send(LifecycleCommand::Submit(text.into()))
            .map_err(|e| anyhow::anyhow!("Failed to send submit command: {}", e))?;
        Ok(())
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Stop the task and wait for it to finish
    pub async fn shutdown(mut self) -> Result<()> {
        if self.command_tx.send(LifecycleCommand::Shutdown).is_err() {
            tracing::debug!("Lifecycle task already stopped");
        }
        if let Some(task) = self.task.take() {
            task.await.context("Lifecycle task panicked")?;
        }
        Ok(())
    }
}

impl Drop for LifecycleService {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::message::{DeliveryState, Message, Sender};
    use std::time::Duration;
    use tokio::time::sleep;

    fn find<'a>(messages: &'a [Message], text: &str) -> Option<&'a Message> {
        messages.iter().find(|m| m.text == text)
    }

    #[tokio::test(start_paused = true)]
    async fn test_welcome_is_visible_immediately() {
        let service = LifecycleService::spawn(
            LifecycleSettings::default(),
            Some("Secure channel established.".to_string()),
        );

        let snapshot = service.snapshot();
        assert_eq!(snapshot.visible.len(), 1);
        assert_eq!(snapshot.visible[0].sender, Sender::Peer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_progression_and_reply() -> Result<()> {
        let service = LifecycleService::spawn(LifecycleSettings::default(), None);
        service.submit("hello")?;

        sleep(Duration::from_millis(250)).await;
        let snapshot = service.snapshot();
        let msg = find(&snapshot.visible, "hello").unwrap();
        assert_eq!(msg.delivery, DeliveryState::Sent);
        assert_eq!(msg.remaining_secs, 10);

        sleep(Duration::from_millis(500)).await;
        let msg = find(&service.snapshot().visible, "hello").cloned().unwrap();
        assert_eq!(msg.delivery, DeliveryState::Delivered);

        sleep(Duration::from_millis(500)).await;
        let msg = find(&service.snapshot().visible, "hello").cloned().unwrap();
        assert_eq!(msg.delivery, DeliveryState::Seen);
        assert_eq!(msg.remaining_secs, 9);

        sleep(Duration::from_millis(500)).await;
        assert!(service.snapshot().peer_typing);

        sleep(Duration::from_millis(1500)).await;
        let snapshot = service.snapshot();
        assert!(!snapshot.peer_typing);
        assert_eq!(snapshot.visible.len(), 2);
        assert_eq!(snapshot.visible[1].sender, Sender::Peer);

        service.shutdown().await
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_then_grace_then_gone() -> Result<()> {
        let service = LifecycleService::spawn(LifecycleSettings::default(), None);
        service.submit("hello")?;

        sleep(Duration::from_millis(10_250)).await;
        let snapshot = service.snapshot();
        let msg = find(&snapshot.visible, "hello").unwrap();
        assert_eq!(msg.remaining_secs, 0);
        assert!(!msg.destroyed);

        sleep(Duration::from_millis(500)).await;
        let snapshot = service.snapshot();
        assert!(find(&snapshot.visible, "hello").is_none());
        assert!(snapshot.visible.iter().all(|m| !m.destroyed));

        service.shutdown().await
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submit_changes_nothing() -> Result<()> {
        let service = LifecycleService::spawn(LifecycleSettings::default(), None);
        service.submit("   ")?;

        sleep(Duration::from_millis(5_000)).await;
        let snapshot = service.snapshot();
        assert!(snapshot.visible.is_empty());
        assert!(!snapshot.peer_typing);

        service.shutdown().await
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_after_shutdown_fails() -> Result<()> {
        let service = LifecycleService::spawn(LifecycleSettings::default(), None);
        let command_tx = service.command_tx.clone();
        service.shutdown().await?;

        assert!(command_tx.send(LifecycleCommand::Submit("late".to_string())).is_err());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_tears_down_task_and_timers() -> Result<()> {
        let service = LifecycleService::spawn(LifecycleSettings::default(), None);
        service.submit("hello")?;
        sleep(Duration::from_millis(100)).await;
        assert_eq!(service.snapshot().visible.len(), 1);

        let command_tx = service.command_tx.clone();
        drop(service);
        sleep(Duration::from_millis(10)).await;

        assert!(command_tx.is_closed());
        assert!(command_tx.send(LifecycleCommand::Submit("late".to_string())).is_err());
        Ok(())
    }
}
