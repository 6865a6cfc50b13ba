//! Synchronous in-process publish/subscribe for axon.
//!
//! The bus delivers named messages with keyword payloads to zero or more
//! registered handlers, synchronously and in registration order. It is the
//! only channel components use to talk to each other and to the state
//! store; sibling components never hold references to one another.
//!
//! ```
//! use axon_bus::{Bus, Payload};
//!
//! let bus = Bus::new();
//! bus.subscribe("Update.state_updated.counter", |_| {
//! 	// re-render
//! });
//! bus.publish("Update.state_updated.counter", Payload::new());
//! ```
//!
//! There is no persistence and no cross-process delivery; a message only
//! reaches handlers registered at the moment of the publish.

mod bus;
mod payload;
mod subscriber;

pub use bus::{Bus, SubscriptionId};
pub use payload::Payload;
pub use subscriber::SubscriptionSet;
