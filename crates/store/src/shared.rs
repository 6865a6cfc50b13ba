//! Mutex-guarded store sharing, bus-driven requests and the bind-once
//! factory.

use std::any::{TypeId, type_name};
use std::sync::Arc;

use axon_bus::{Bus, Payload, SubscriptionSet};
use axon_topics::{Topic, UndoTopic, UpdateTopic};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::history::DEFAULT_MAX_HISTORY;
use crate::model::{self, ROOT_CONTEXT, StateModel};
use crate::proxy::StatePath;
use crate::store::{Emission, Store, publish_all};

/// State types that already have a bound store in this process.
static BOUND_STATES: Mutex<Vec<TypeId>> = Mutex::new(Vec::new());

struct SharedInner<T: StateModel> {
	store: Mutex<Store<T>>,
	bus: Bus,
	subscriptions: Mutex<SubscriptionSet>,
}

/// Cloneable, mutex-guarded handle to a [`Store`].
///
/// Every mutating operation and the deep-copy read hold the store mutex for
/// the duration of the state access; notifications are published after the
/// lock is released (still before the call returns), so subscribers may
/// re-enter the store without deadlocking.
///
/// The handle also wires the store to the bus: requests published on the
/// well-known update and undo topics are decoded and applied, which is how
/// UI components mutate state without ever holding a store reference.
/// Failing requests are logged and dropped; direct calls return their
/// errors to the caller.
pub struct SharedStore<T: StateModel> {
	inner: Arc<SharedInner<T>>,
}

impl<T: StateModel> Clone for SharedStore<T> {
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner) }
	}
}

impl<T: StateModel> std::fmt::Debug for SharedStore<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SharedStore").finish_non_exhaustive()
	}
}

impl<T: StateModel> SharedStore<T> {
	/// Wraps `store` and subscribes it to the request topics.
	pub fn new(store: Store<T>) -> Self {
		let bus = store.bus().clone();
		let inner = Arc::new(SharedInner {
			store: Mutex::new(store),
			bus: bus.clone(),
			subscriptions: Mutex::new(SubscriptionSet::new(bus)),
		});
		wire_requests(&inner);
		Self { inner }
	}

	/// The bus this store notifies on.
	pub fn bus(&self) -> &Bus {
		&self.inner.bus
	}

	/// Returns a deep, independent copy of the live state.
	pub fn get_current_state(&self) -> T {
		self.inner.store.lock().get_current_state()
	}

	/// Monotonic mutation counter.
	pub fn version(&self) -> u64 {
		self.inner.store.lock().version()
	}

	/// Starts a shape-checked path chain rooted at the live state.
	pub fn state(&self) -> StatePath {
		self.inner.store.lock().state()
	}

	/// See [`Store::replace_state`].
	pub fn replace_state(&self, new_state: T) -> Result<()> {
		let emissions = self.inner.store.lock().replace_state_inner(new_state)?;
		publish_all(&self.inner.bus, emissions);
		Ok(())
	}

	/// See [`Store::update_state`].
	pub fn update_state(&self, path: &str, new_value: impl Serialize) -> Result<()> {
		let value = model::to_tree(&new_value, path)?;
		let emissions = self.inner.store.lock().update_state_inner(path, value)?;
		publish_all(&self.inner.bus, emissions);
		Ok(())
	}

	/// See [`Store::add_to_list`].
	pub fn add_to_list(&self, path: &str, item: impl Serialize) -> Result<()> {
		let item = model::to_tree(&item, path)?;
		let emissions = self.inner.store.lock().add_to_list_inner(path, item)?;
		publish_all(&self.inner.bus, emissions);
		Ok(())
	}

	/// See [`Store::add_to_dict`].
	pub fn add_to_dict(&self, path: &str, key: &str, value: impl Serialize) -> Result<()> {
		let value = model::to_tree(&value, path)?;
		let emissions = self.inner.store.lock().add_to_dict_inner(path, key, value)?;
		publish_all(&self.inner.bus, emissions);
		Ok(())
	}

	/// See [`Store::enable_undo_redo`].
	pub fn enable_undo_redo(&self, path: &str, max_history: usize) {
		let emissions = self.inner.store.lock().enable_undo_redo_inner(path, max_history);
		publish_all(&self.inner.bus, emissions);
	}

	/// See [`Store::disable_undo_redo`].
	pub fn disable_undo_redo(&self, path: &str) {
		self.inner.store.lock().disable_undo_redo_inner(path);
	}

	/// See [`Store::undo`].
	pub fn undo(&self, path: &str) -> Result<()> {
		let emissions = self.inner.store.lock().undo_inner(path)?;
		publish_all(&self.inner.bus, emissions);
		Ok(())
	}

	/// See [`Store::redo`].
	pub fn redo(&self, path: &str) -> Result<()> {
		let emissions = self.inner.store.lock().redo_inner(path)?;
		publish_all(&self.inner.bus, emissions);
		Ok(())
	}

	/// Unsubscribes the store from the request topics.
	///
	/// Afterwards the store only reacts to direct calls.
	pub fn teardown(&self) {
		self.inner.subscriptions.lock().teardown();
	}
}

/// Binds the process-wide store for state type `T` onto `bus`.
///
/// There is exactly one store per state type: a second bind for the same
/// type fails loudly instead of handing back any instance, because silently
/// reusing a store across call sites with different expectations hides a
/// configuration bug. [`Store::new`] remains available for composition and
/// tests.
///
/// # Errors
///
/// [`StoreError::AlreadyBound`] when `T` already has a bound store;
/// [`StoreError::TypeMismatch`] when the default state has no structural
/// form.
pub fn bind<T: StateModel>(bus: Bus) -> Result<SharedStore<T>> {
	let mut bound = BOUND_STATES.lock();
	if bound.contains(&TypeId::of::<T>()) {
		return Err(StoreError::AlreadyBound { state_type: type_name::<T>() });
	}
	let store = Store::new(bus)?;
	let shared = SharedStore::new(store);
	bound.push(TypeId::of::<T>());
	Ok(shared)
}

/// Subscribes `inner`'s store to every request topic.
///
/// Handlers hold only a weak reference: dropping the last [`SharedStore`]
/// clone releases the store even while the bus still lists the (now inert)
/// subscriptions, and the subscription set tears them down with it.
fn wire_requests<T: StateModel>(inner: &Arc<SharedInner<T>>) {
	let mut subscriptions = inner.subscriptions.lock();

	handle(&mut subscriptions, inner, UpdateTopic::UpdateState.topic(), |store, payload| {
		let (Some(path), Some(value)) = (
			required::<String>(payload, "state_path", UpdateTopic::UpdateState.as_str()),
			required::<Value>(payload, "new_value", UpdateTopic::UpdateState.as_str()),
		) else {
			return Ok(Vec::new());
		};
		store.update_state_inner(&path, value)
	});

	handle(&mut subscriptions, inner, UpdateTopic::ReplaceState.topic(), |store, payload| {
		let Some(value) = required::<Value>(payload, "new_state", UpdateTopic::ReplaceState.as_str())
		else {
			return Ok(Vec::new());
		};
		let new_state: T = model::validate_tree(value, ROOT_CONTEXT)?;
		store.replace_state_inner(new_state)
	});

	handle(&mut subscriptions, inner, UpdateTopic::AddToList.topic(), |store, payload| {
		let (Some(path), Some(item)) = (
			required::<String>(payload, "state_path", UpdateTopic::AddToList.as_str()),
			required::<Value>(payload, "item", UpdateTopic::AddToList.as_str()),
		) else {
			return Ok(Vec::new());
		};
		store.add_to_list_inner(&path, item)
	});

	handle(&mut subscriptions, inner, UpdateTopic::AddToDict.topic(), |store, payload| {
		let (Some(path), Some(key), Some(value)) = (
			required::<String>(payload, "state_path", UpdateTopic::AddToDict.as_str()),
			required::<String>(payload, "key", UpdateTopic::AddToDict.as_str()),
			required::<Value>(payload, "value", UpdateTopic::AddToDict.as_str()),
		) else {
			return Ok(Vec::new());
		};
		store.add_to_dict_inner(&path, &key, value)
	});

	handle(&mut subscriptions, inner, UndoTopic::EnableUndoRedo.topic(), |store, payload| {
		let Some(path) = required::<String>(payload, "state_path", UndoTopic::EnableUndoRedo.as_str())
		else {
			return Ok(Vec::new());
		};
		let max_history = payload.get::<usize>("max_history").unwrap_or(DEFAULT_MAX_HISTORY);
		Ok(store.enable_undo_redo_inner(&path, max_history))
	});

	handle(&mut subscriptions, inner, UndoTopic::DisableUndoRedo.topic(), |store, payload| {
		let Some(path) = required::<String>(payload, "state_path", UndoTopic::DisableUndoRedo.as_str())
		else {
			return Ok(Vec::new());
		};
		store.disable_undo_redo_inner(&path);
		Ok(Vec::new())
	});

	handle(&mut subscriptions, inner, UndoTopic::Undo.topic(), |store, payload| {
		let Some(path) = required::<String>(payload, "state_path", UndoTopic::Undo.as_str()) else {
			return Ok(Vec::new());
		};
		store.undo_inner(&path)
	});

	handle(&mut subscriptions, inner, UndoTopic::Redo.topic(), |store, payload| {
		let Some(path) = required::<String>(payload, "state_path", UndoTopic::Redo.as_str()) else {
			return Ok(Vec::new());
		};
		store.redo_inner(&path)
	});
}

fn handle<T: StateModel>(
	subscriptions: &mut SubscriptionSet,
	inner: &Arc<SharedInner<T>>,
	topic: Topic,
	op: impl Fn(&mut Store<T>, &Payload) -> Result<Vec<Emission>> + Send + Sync + 'static,
) {
	let weak = Arc::downgrade(inner);
	let request_topic = topic.clone();
	subscriptions.subscribe(topic, move |payload| {
		let Some(inner) = weak.upgrade() else {
			return;
		};
		let outcome = {
			let mut store = inner.store.lock();
			op(&mut store, payload)
		};
		match outcome {
			Ok(emissions) => publish_all(&inner.bus, emissions),
			Err(err) => {
				warn!(target: "axon::store", topic = %request_topic, error = %err, "dropping state request");
			}
		}
	});
}

fn required<V: serde::de::DeserializeOwned>(payload: &Payload, key: &str, topic: &str) -> Option<V> {
	let value = payload.get::<V>(key);
	if value.is_none() {
		warn!(target: "axon::store", topic, key, "state request missing or malformed keyword");
	}
	value
}
