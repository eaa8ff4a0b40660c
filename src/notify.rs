use dashmap::DashMap;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::Event;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for change events, one channel per field.
pub struct NotifyHub {
    channels: DashMap<Ulid, broadcast::Sender<Event>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to changes on a field. Creates the channel if needed.
    pub fn subscribe(&self, field_id: Ulid) -> broadcast::Receiver<Event> {
        let sender = self
            .channels
            .entry(field_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send a notification. No-op if nobody is listening; a channel whose
    /// receivers have all been dropped is removed.
    pub fn send(&self, field_id: Ulid, event: &Event) {
        let delivered = match self.channels.get(&field_id) {
            Some(sender) => sender.send(event.clone()).is_ok(),
            None => return,
        };
        if !delivered {
            self.channels
                .remove_if(&field_id, |_, sender| sender.receiver_count() == 0);
        }
    }

    /// Number of fields with an open channel.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
