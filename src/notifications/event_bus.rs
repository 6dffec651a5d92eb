//! Broadcast channel for workflow events
//!
//! The workflow service publishes into the bus; audit sinks and front ends
//! hold an [`EventSubscriber`]. A bus with no subscribers drops events.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use super::events::{Event, EventMessage};

/// Events a slow subscriber may fall behind before it starts losing them
const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventMessage>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Stamp and broadcast `event`. Returns how many subscribers got it.
    pub fn publish(&self, event: Event) -> usize {
        let message = EventMessage::new(event);
        let event_type = message.event.event_type();
        let station_id = message.event.station_id().clone();

        let delivered = self.sender.send(message).unwrap_or(0);
        debug!(
            "{} for {} delivered to {} subscriber(s)",
            event_type, station_id, delivered
        );
        delivered
    }

    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
            missed: 0,
        }
    }

    /// Live subscribers, dropped ones excluded.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of the bus; sees events published after it subscribed
pub struct EventSubscriber {
    receiver: broadcast::Receiver<EventMessage>,
    missed: u64,
}

impl EventSubscriber {
    /// Wait for the next event. `None` once every bus handle is gone.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(msg) => return Some(msg),
                Err(RecvError::Lagged(n)) => self.lagged(n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Everything queued right now, oldest first, without waiting.
    pub fn drain(&mut self) -> Vec<EventMessage> {
        let mut out = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(msg) => out.push(msg),
                Err(TryRecvError::Lagged(n)) => self.lagged(n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return out,
            }
        }
    }

    /// Events overwritten before this subscriber could read them.
    pub fn missed(&self) -> u64 {
        self.missed
    }

    fn lagged(&mut self, n: u64) {
        self.missed += n;
        warn!("Event subscriber lagged, {} event(s) lost", n);
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}
