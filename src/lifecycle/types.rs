use std::time::Duration;

use crate::entities::message::{DeliveryState, Message, MessageId};

/// Timing constants for the message lifecycle.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// Countdown every new message starts with
    pub lifespan_secs: u32,
    pub tick_interval: Duration,
    /// Pause between a countdown reaching zero and the message being destroyed
    pub grace_delay: Duration,
    pub delivered_delay: Duration,
    pub seen_delay: Duration,
    pub typing_delay: Duration,
    pub reply_delay: Duration,
    pub peer_reply_text: String,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            lifespan_secs: 10,
            tick_interval: Duration::from_secs(1),
            grace_delay: Duration::from_millis(500),
            delivered_delay: Duration::from_millis(500),
            seen_delay: Duration::from_millis(1000),
            typing_delay: Duration::from_millis(1500),
            reply_delay: Duration::from_millis(3000),
            peer_reply_text: "Message received. Proceeding with tactical response.".to_string(),
        }
    }
}

/// Events applied to the engine, either by the tick timer or by a one-shot delay firing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Tick,
    AdvanceDelivery(MessageId, DeliveryState),
    Destroy(MessageId),
    PeerTyping,
    PeerReply,
}

/// An event the engine wants delivered back to it after `delay`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled {
    pub delay: Duration,
    pub event: LifecycleEvent,
}

impl Scheduled {
    pub fn after(delay: Duration, event: LifecycleEvent) -> Self {
        Self { delay, event }
    }
}

/// Commands the chat view sends to the lifecycle task
#[derive(Debug, Clone)]
pub enum LifecycleCommand {
    Submit(String),
    Shutdown,
}

/// What the chat view renders: visible messages only, in insertion order
#[derive(Debug, Clone, Default)]
pub struct ChatSnapshot {
    pub visible: Vec<Message>,
    pub peer_typing: bool,
}
