//! Subscription bookkeeping for components.

use axon_topics::Topic;

use crate::bus::{Bus, SubscriptionId};
use crate::payload::Payload;

/// Tracks every subscription a component makes and removes them together.
///
/// Components subscribe through their set instead of through the bus
/// directly; dropping the set (or calling [`teardown`]) unsubscribes
/// everything, so a destroyed widget never leaves handlers behind.
///
/// [`teardown`]: SubscriptionSet::teardown
pub struct SubscriptionSet {
	bus: Bus,
	ids: Vec<SubscriptionId>,
}

impl SubscriptionSet {
	/// Creates an empty set bound to `bus`.
	pub fn new(bus: Bus) -> Self {
		Self { bus, ids: Vec::new() }
	}

	/// The bus this set subscribes on.
	pub fn bus(&self) -> &Bus {
		&self.bus
	}

	/// Subscribes and records the id for later teardown.
	pub fn subscribe(
		&mut self,
		topic: impl Into<Topic>,
		handler: impl Fn(&Payload) + Send + Sync + 'static,
	) -> SubscriptionId {
		let id = self.bus.subscribe(topic, handler);
		self.ids.push(id.clone());
		id
	}

	/// Removes one tracked subscription.
	pub fn unsubscribe(&mut self, id: &SubscriptionId) {
		self.bus.unsubscribe(id);
		self.ids.retain(|tracked| tracked != id);
	}

	/// Removes every tracked subscription.
	pub fn teardown(&mut self) {
		for id in self.ids.drain(..) {
			self.bus.unsubscribe(&id);
		}
	}

	/// Number of live subscriptions in this set.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Whether the set tracks no subscriptions.
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}
}

impl Drop for SubscriptionSet {
	fn drop(&mut self) {
		self.teardown();
	}
}
