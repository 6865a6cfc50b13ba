//! The synchronous in-process bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axon_topics::Topic;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::payload::Payload;

type Handler = Arc<dyn Fn(&Payload) + Send + Sync>;

struct Subscriber {
	seq: u64,
	handler: Handler,
}

#[derive(Default)]
struct Registry {
	topics: FxHashMap<String, Vec<Subscriber>>,
}

/// Identifies one subscription for later removal.
///
/// Handlers are closures without usable identity, so [`Bus::subscribe`]
/// hands back a token instead of matching on the handler itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
	topic: Topic,
	seq: u64,
}

impl SubscriptionId {
	/// The topic this subscription listens on.
	pub fn topic(&self) -> &Topic {
		&self.topic
	}
}

/// Cheaply cloneable handle to one in-process message bus.
///
/// Delivery is synchronous and in registration order per topic: `publish`
/// invokes every matching handler before it returns. The subscriber list is
/// snapshotted before dispatch, so handlers are free to publish, subscribe
/// or unsubscribe re-entrantly; such changes take effect for the next
/// publish, not the one in flight.
///
/// Topic matching is exact. Framework notifications are always scoped by
/// state path, so a subscriber picks the granularity by subscribing to the
/// fully scoped topic.
#[derive(Clone, Default)]
pub struct Bus {
	registry: Arc<RwLock<Registry>>,
	next_seq: Arc<AtomicU64>,
}

impl Bus {
	/// Creates an empty bus.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for messages on `topic`.
	pub fn subscribe(
		&self,
		topic: impl Into<Topic>,
		handler: impl Fn(&Payload) + Send + Sync + 'static,
	) -> SubscriptionId {
		let topic = topic.into();
		let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
		debug!(target: "axon::bus", topic = %topic, seq, "subscribe");

		let mut registry = self.registry.write();
		registry
			.topics
			.entry(topic.as_str().to_owned())
			.or_default()
			.push(Subscriber { seq, handler: Arc::new(handler) });
		SubscriptionId { topic, seq }
	}

	/// Publishes `payload` to every subscriber of `topic`, in registration
	/// order, before returning.
	pub fn publish(&self, topic: impl Into<Topic>, payload: Payload) {
		let topic = topic.into();

		// Snapshot under the read lock, dispatch without it, so handlers can
		// re-enter the bus.
		let handlers: Vec<Handler> = {
			let registry = self.registry.read();
			match registry.topics.get(topic.as_str()) {
				Some(subscribers) => subscribers.iter().map(|s| Arc::clone(&s.handler)).collect(),
				None => Vec::new(),
			}
		};

		debug!(
			target: "axon::bus",
			topic = %topic,
			subscribers = handlers.len(),
			keys = ?payload.keys().collect::<Vec<_>>(),
			"publish"
		);

		for handler in handlers {
			handler(&payload);
		}
	}

	/// Removes the subscription identified by `id`.
	///
	/// Unknown or already-removed ids are a no-op.
	pub fn unsubscribe(&self, id: &SubscriptionId) {
		let mut registry = self.registry.write();
		let Some(subscribers) = registry.topics.get_mut(id.topic.as_str()) else {
			return;
		};
		let before = subscribers.len();
		subscribers.retain(|s| s.seq != id.seq);
		if subscribers.len() != before {
			debug!(target: "axon::bus", topic = %id.topic, seq = id.seq, "unsubscribe");
		}
		if subscribers.is_empty() {
			registry.topics.remove(id.topic.as_str());
		}
	}

	/// Number of live subscriptions on `topic`.
	pub fn subscriber_count(&self, topic: impl Into<Topic>) -> usize {
		let topic = topic.into();
		self.registry.read().topics.get(topic.as_str()).map_or(0, Vec::len)
	}
}

impl std::fmt::Debug for Bus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let registry = self.registry.read();
		let total: usize = registry.topics.values().map(Vec::len).sum();
		f.debug_struct("Bus")
			.field("topics", &registry.topics.len())
			.field("subscriptions", &total)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use parking_lot::Mutex;
	use pretty_assertions::assert_eq;

	use super::*;

	fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&Payload) + Send + Sync>) {
		let log = Arc::new(Mutex::new(Vec::new()));
		let make = {
			let log = Arc::clone(&log);
			move |tag: &str| {
				let log = Arc::clone(&log);
				let tag = tag.to_owned();
				Box::new(move |_: &Payload| log.lock().push(tag.clone())) as Box<dyn Fn(&Payload) + Send + Sync>
			}
		};
		(log, make)
	}

	#[test]
	fn test_delivery_in_registration_order() {
		let bus = Bus::new();
		let (log, make) = recorder();
		bus.subscribe("t", make("first"));
		bus.subscribe("t", make("second"));
		bus.subscribe("t", make("third"));

		bus.publish("t", Payload::new());
		assert_eq!(*log.lock(), vec!["first", "second", "third"]);
	}

	#[test]
	fn test_publish_without_subscribers_is_fine() {
		let bus = Bus::new();
		bus.publish("nobody.listens", Payload::new());
	}

	#[test]
	fn test_exact_topic_matching() {
		let bus = Bus::new();
		let (log, make) = recorder();
		bus.subscribe("Update.state_changed", make("parent"));
		bus.publish("Update.state_changed.user.name", Payload::new());
		assert!(log.lock().is_empty());
	}

	#[test]
	fn test_unsubscribe_stops_delivery() {
		let bus = Bus::new();
		let (log, make) = recorder();
		let id = bus.subscribe("t", make("gone"));
		bus.subscribe("t", make("stays"));

		bus.unsubscribe(&id);
		bus.publish("t", Payload::new());
		assert_eq!(*log.lock(), vec!["stays"]);
		assert_eq!(bus.subscriber_count("t"), 1);

		// Second removal of the same id is a no-op.
		bus.unsubscribe(&id);
		assert_eq!(bus.subscriber_count("t"), 1);
	}

	#[test]
	fn test_handler_may_publish_reentrantly() {
		let bus = Bus::new();
		let (log, make) = recorder();
		bus.subscribe("inner", make("inner"));
		{
			let inner_bus = bus.clone();
			let log = Arc::clone(&log);
			bus.subscribe("outer", move |_| {
				log.lock().push("outer".to_owned());
				inner_bus.publish("inner", Payload::new());
			});
		}

		bus.publish("outer", Payload::new());
		assert_eq!(*log.lock(), vec!["outer", "inner"]);
	}

	#[test]
	fn test_handler_may_subscribe_reentrantly() {
		let bus = Bus::new();
		let hits = Arc::new(Mutex::new(0usize));
		{
			let bus2 = bus.clone();
			let hits = Arc::clone(&hits);
			bus.subscribe("t", move |_| {
				let hits = Arc::clone(&hits);
				bus2.subscribe("t", move |_| *hits.lock() += 1);
			});
		}

		// The subscription added mid-publish only hears the next publish.
		bus.publish("t", Payload::new());
		assert_eq!(*hits.lock(), 0);
		bus.publish("t", Payload::new());
		assert_eq!(*hits.lock(), 1);
	}

	#[test]
	fn test_payload_reaches_handlers() {
		let bus = Bus::new();
		let seen = Arc::new(Mutex::new(None));
		{
			let seen = Arc::clone(&seen);
			bus.subscribe("t", move |payload| {
				*seen.lock() = payload.get::<i64>("new_value");
			});
		}
		bus.publish("t", Payload::new().with("new_value", 42));
		assert_eq!(*seen.lock(), Some(42));
	}
}
