//! Notifications module
//!
//! In-process event bus carrying workflow events to front ends and the
//! audit trail.
//!
//! # Usage
//! ```ignore
//! use ev_support::notifications::{create_event_bus, Event};
//!
//! let event_bus = create_event_bus();
//! let mut subscriber = event_bus.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Some(msg) = subscriber.recv().await {
//!         println!("{} for {}", msg.event.event_type(), msg.event.station_id());
//!     }
//! });
//! ```

pub mod audit;
pub mod event_bus;
pub mod events;

pub use audit::AuditTrail;
pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use events::*;
