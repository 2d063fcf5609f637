use dashmap::DashMap;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::{Booking, UserId};

const CHANNEL_CAPACITY: usize = 256;

/// What changed, so a presentation layer can refresh without refetching
/// everything blindly.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingChange {
    Created(Booking),
    PaymentUpdated { id: Ulid, is_paid: bool },
    Deactivated { id: Ulid },
}

/// Broadcast hub for booking changes, one channel per owner.
pub struct NotifyHub {
    channels: DashMap<UserId, broadcast::Sender<BookingChange>>,
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

    /// Subscribe to changes on one owner's bookings. Creates the channel if
    /// needed.
    pub fn subscribe(&self, owner: UserId) -> broadcast::Receiver<BookingChange> {
        let sender = self
            .channels
            .entry(owner)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send a change. No-op if nobody is listening.
    pub fn send(&self, owner: UserId, change: &BookingChange) {
        if let Some(sender) = self.channels.get(&owner) {
            let _ = sender.send(change.clone());
        }
    }

    /// Remove a channel (e.g. when the owner signs out).
    pub fn remove(&self, owner: &UserId) {
        self.channels.remove(owner);
    }
}
