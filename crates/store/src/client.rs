//! Typed convenience wrappers over the well-known topics.
//!
//! UI components talk to the store through a [`StoreClient`] instead of
//! hand-composing topic strings and payload maps: the request methods
//! publish with the keyword shape the store expects, and the `on_*` methods
//! subscribe with the matching handler signature. Subscriptions made
//! through a client are torn down when the client is dropped.

use axon_bus::{Bus, Payload, SubscriptionId, SubscriptionSet};
use axon_topics::{UndoTopic, UpdateTopic};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::history::UndoStatus;
use crate::model::{self, ROOT_CONTEXT};

/// Per-component handle for store requests and change notifications.
pub struct StoreClient {
	subscriptions: SubscriptionSet,
}

impl StoreClient {
	/// Creates a client on `bus`.
	pub fn new(bus: Bus) -> Self {
		Self { subscriptions: SubscriptionSet::new(bus) }
	}

	/// The underlying bus.
	pub fn bus(&self) -> &Bus {
		self.subscriptions.bus()
	}

	// --- requests -------------------------------------------------------

	/// Requests assignment of `new_value` at `path`.
	///
	/// # Errors
	///
	/// [`StoreError::TypeMismatch`](crate::StoreError::TypeMismatch) when
	/// `new_value` has no structural form.
	pub fn update_state(&self, path: &str, new_value: impl Serialize) -> Result<()> {
		let value = model::to_tree(&new_value, path)?;
		self.bus().publish(
			UpdateTopic::UpdateState,
			Payload::new().with("state_path", path).with("new_value", value),
		);
		Ok(())
	}

	/// Requests replacement of the whole state object.
	///
	/// # Errors
	///
	/// As for [`update_state`](StoreClient::update_state).
	pub fn replace_state(&self, new_state: impl Serialize) -> Result<()> {
		let value = model::to_tree(&new_state, ROOT_CONTEXT)?;
		self.bus().publish(UpdateTopic::ReplaceState, Payload::new().with("new_state", value));
		Ok(())
	}

	/// Requests appending `item` to the sequence at `path`.
	///
	/// # Errors
	///
	/// As for [`update_state`](StoreClient::update_state).
	pub fn add_to_list(&self, path: &str, item: impl Serialize) -> Result<()> {
		let item = model::to_tree(&item, path)?;
		self.bus()
			.publish(UpdateTopic::AddToList, Payload::new().with("state_path", path).with("item", item));
		Ok(())
	}

	/// Requests inserting `key`/`value` into the mapping at `path`.
	///
	/// # Errors
	///
	/// As for [`update_state`](StoreClient::update_state).
	pub fn add_to_dict(&self, path: &str, key: &str, value: impl Serialize) -> Result<()> {
		let value = model::to_tree(&value, path)?;
		self.bus().publish(
			UpdateTopic::AddToDict,
			Payload::new().with("state_path", path).with("key", key).with("value", value),
		);
		Ok(())
	}

	/// Requests history tracking for `path` with the given cap.
	pub fn enable_undo_redo(&self, path: &str, max_history: usize) {
		self.bus().publish(
			UndoTopic::EnableUndoRedo,
			Payload::new().with("state_path", path).with("max_history", max_history),
		);
	}

	/// Requests dropping history tracking for `path`.
	pub fn disable_undo_redo(&self, path: &str) {
		self.bus().publish(UndoTopic::DisableUndoRedo, Payload::new().with("state_path", path));
	}

	/// Requests an undo at `path`.
	pub fn undo(&self, path: &str) {
		self.bus().publish(UndoTopic::Undo, Payload::new().with("state_path", path));
	}

	/// Requests a redo at `path`.
	pub fn redo(&self, path: &str) {
		self.bus().publish(UndoTopic::Redo, Payload::new().with("state_path", path));
	}

	// --- notifications --------------------------------------------------

	/// Subscribes to the detailed change notification for `path`.
	///
	/// The handler receives the old and the new value.
	pub fn on_state_changed(
		&mut self,
		path: &str,
		handler: impl Fn(&Value, &Value) + Send + Sync + 'static,
	) -> SubscriptionId {
		self.subscriptions.subscribe(UpdateTopic::StateChanged.scoped(path), move |payload| {
			let (Some(old_value), Some(new_value)) =
				(payload.get_value("old_value"), payload.get_value("new_value"))
			else {
				warn!(target: "axon::store", "state_changed notification without old/new value");
				return;
			};
			handler(old_value, new_value);
		})
	}

	/// Subscribes to the payload-free update notification for `path`.
	///
	/// For "something changed, re-render" handlers that read the state
	/// themselves.
	pub fn on_refresh(
		&mut self,
		path: &str,
		handler: impl Fn() + Send + Sync + 'static,
	) -> SubscriptionId {
		self.subscriptions.subscribe(UpdateTopic::StateUpdated.scoped(path), move |_| handler())
	}

	/// Subscribes to list-append notifications for `path`.
	///
	/// The handler receives the appended item and its index.
	pub fn on_item_added(
		&mut self,
		path: &str,
		handler: impl Fn(&Value, usize) + Send + Sync + 'static,
	) -> SubscriptionId {
		self.subscriptions.subscribe(UpdateTopic::StateAdded.scoped(path), move |payload| {
			let (Some(item), Some(index)) = (payload.get_value("item"), payload.get::<usize>("index"))
			else {
				warn!(target: "axon::store", "state_added notification without item/index");
				return;
			};
			handler(item, index);
		})
	}

	/// Subscribes to dict-insert notifications for `path`.
	///
	/// The handler receives the inserted key and value.
	pub fn on_key_added(
		&mut self,
		path: &str,
		handler: impl Fn(&str, &Value) + Send + Sync + 'static,
	) -> SubscriptionId {
		self.subscriptions.subscribe(UpdateTopic::DictAdded.scoped(path), move |payload| {
			let (Some(key), Some(value)) = (payload.get::<String>("key"), payload.get_value("value"))
			else {
				warn!(target: "axon::store", "dict_added notification without key/value");
				return;
			};
			handler(&key, value);
		})
	}

	/// Subscribes to undo/redo status notifications for `path`.
	pub fn on_undo_status(
		&mut self,
		path: &str,
		handler: impl Fn(UndoStatus) + Send + Sync + 'static,
	) -> SubscriptionId {
		self.subscriptions.subscribe(UndoTopic::StatusChanged.scoped(path), move |payload| {
			handler(UndoStatus {
				can_undo: payload.get("can_undo").unwrap_or(false),
				can_redo: payload.get("can_redo").unwrap_or(false),
				undo_count: payload.get("undo_count").unwrap_or(0),
				redo_count: payload.get("redo_count").unwrap_or(0),
			});
		})
	}

	/// Removes one subscription made through this client.
	pub fn unsubscribe(&mut self, id: &SubscriptionId) {
		self.subscriptions.unsubscribe(id);
	}

	/// Removes every subscription made through this client.
	pub fn teardown(&mut self) {
		self.subscriptions.teardown();
	}
}
