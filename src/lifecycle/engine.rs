use std::collections::HashMap;

use tracing::debug;

use crate::entities::message::{DeliveryState, Message, MessageId, Sender};
use crate::lifecycle::types::{ChatSnapshot, LifecycleEvent, LifecycleSettings, Scheduled};

/// Owns the ordered message collection and its time-based decay.
///
/// The engine never waits on anything itself. Operations that need a
/// follow-up return [`Scheduled`] effects, and whoever drives the engine
/// feeds each event back through [`MessageEngine::apply`] once its delay elapses.
#[derive(Debug)]
pub struct MessageEngine {
    settings: LifecycleSettings,
    messages: Vec<Message>,
    index: HashMap<MessageId, usize>,
    peer_typing: bool,
}

impl MessageEngine {
    pub fn new(mut settings: LifecycleSettings) -> Self {
        // A countdown must start above zero or it never crosses into zero
        settings.lifespan_secs = settings.lifespan_secs.max(1);

        Self {
            settings,
            messages: Vec::new(),
            index: HashMap::new(),
            peer_typing: false,
        }
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    /// Append a message from the local user. Blank input is ignored.
    pub fn submit(&mut self, text: &str) -> Vec<Scheduled> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let id = self.push(Message::new(
            text.to_string(),
            Sender::Me,
            self.settings.lifespan_secs,
        ));
        debug!("Submitted message {}", id);

        vec![
            Scheduled::after(
                self.settings.delivered_delay,
                LifecycleEvent::AdvanceDelivery(id, DeliveryState::Delivered),
            ),
            Scheduled::after(
                self.settings.seen_delay,
                LifecycleEvent::AdvanceDelivery(id, DeliveryState::Seen),
            ),
            Scheduled::after(self.settings.typing_delay, LifecycleEvent::PeerTyping),
            Scheduled::after(self.settings.reply_delay, LifecycleEvent::PeerReply),
        ]
    }

    /// Append a message from the peer side of the channel.
    pub fn receive(&mut self, text: String) -> MessageId {
        self.peer_typing = false;
        let id = self.push(Message::new(text, Sender::Peer, self.settings.lifespan_secs));
        debug!("Received peer message {}", id);
        id
    }

    /// Advance every live countdown by one step.
    pub fn tick(&mut self) -> Vec<Scheduled> {
        let grace = self.settings.grace_delay;
        let mut scheduled = Vec::new();

        for message in self.messages.iter_mut().filter(|m| !m.destroyed) {
            // A countdown can only cross into zero once, which keeps the
            // destroy schedule to a single registration per message.
            if message.remaining_secs == 0 {
                continue;
            }
            message.remaining_secs -= 1;
            if message.remaining_secs == 0 {
                debug!("Countdown expired for {}", message.id);
                scheduled.push(Scheduled::after(grace, LifecycleEvent::Destroy(message.id)));
            }
        }

        scheduled
    }

    pub fn destroy(&mut self, id: MessageId) {
        if let Some(message) = self.get_mut(id) {
            if !message.destroyed {
                message.destroyed = true;
                debug!("Destroyed message {}", id);
            }
        }
    }

    pub fn advance_delivery(&mut self, id: MessageId, state: DeliveryState) {
        if let Some(message) = self.get_mut(id) {
            if !message.destroyed && state > message.delivery {
                message.delivery = state;
            }
        }
    }

    pub fn apply(&mut self, event: LifecycleEvent) -> Vec<Scheduled> {
        match event {
            LifecycleEvent::Tick => self.tick(),
            LifecycleEvent::AdvanceDelivery(id, state) => {
                self.advance_delivery(id, state);
                Vec::new()
            }
            LifecycleEvent::Destroy(id) => {
                self.destroy(id);
                Vec::new()
            }
            LifecycleEvent::PeerTyping => {
                self.peer_typing = true;
                Vec::new()
            }
            LifecycleEvent::PeerReply => {
                let text = self.settings.peer_reply_text.clone();
                self.receive(text);
                Vec::new()
            }
        }
    }

    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.destroyed)
    }

    /// Every message ever added, destroyed ones included.
    pub fn all_messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index.get(&id).map(|&i| &self.messages[i])
    }

    pub fn peer_typing(&self) -> bool {
        self.peer_typing
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            visible: self.visible_messages().cloned().collect(),
            peer_typing: self.peer_typing,
        }
    }

    fn push(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.index.insert(id, self.messages.len());
        self.messages.push(message);
        id
    }

    fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        let i = *self.index.get(&id)?;
        self.messages.get_mut(i)
    }
}
