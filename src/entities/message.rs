use chrono::{DateTime, Local};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

/// Stable identifier for a message, unique across engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Me,
    Peer,
}

/// Cosmetic delivery progression. Variants are declared in order so the
/// derived `Ord` matches the only allowed direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeliveryState {
    Sent,
    Delivered,
    Seen,
}

impl DeliveryState {
    pub fn marker(&self) -> &'static str {
        match self {
            DeliveryState::Sent => "✓",
            DeliveryState::Delivered => "✓✓",
            DeliveryState::Seen => "✓✓ seen",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub created_at: SystemTime,
    pub delivery: DeliveryState,
    pub remaining_secs: u32,
    pub destroyed: bool,
}

impl Message {
    pub fn new(text: String, sender: Sender, lifespan_secs: u32) -> Self {
        let delivery = match sender {
            Sender::Me => DeliveryState::Sent,
            Sender::Peer => DeliveryState::Seen,
        };

        Self {
            id: MessageId::new(),
            text,
            sender,
            created_at: SystemTime::now(),
            delivery,
            remaining_secs: lifespan_secs,
            destroyed: false,
        }
    }

    pub fn is_mine(&self) -> bool {
        self.sender == Sender::Me
    }

    /// True once the countdown has entered the final stretch before removal.
    pub fn is_critical(&self, threshold_secs: u32) -> bool {
        self.remaining_secs <= threshold_secs
    }

    pub fn countdown_label(&self) -> String {
        format!("Self-destruct: {}s", self.remaining_secs)
    }

    pub fn time_label(&self) -> String {
        let local: DateTime<Local> = self.created_at.into();
        local.format("%H:%M").to_string()
    }
}
