//! The typed state container.

use axon_bus::{Bus, Payload};
use axon_topics::{Topic, UndoTopic, UpdateTopic};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::history::HistoryManager;
use crate::model::{self, ROOT_CONTEXT, StateModel};
use crate::path;
use crate::proxy::StatePath;

/// One pending notification: topic plus keyword payload.
pub(crate) type Emission = (Topic, Payload);

/// Publishes collected emissions in order.
///
/// Mutation cores return their notifications instead of publishing them so
/// that lock-holding wrappers can release the lock first; the order of the
/// list is the order on the bus.
pub(crate) fn publish_all(bus: &Bus, emissions: Vec<Emission>) {
	for (topic, payload) in emissions {
		bus.publish(topic, payload);
	}
}

/// Owner of the single authoritative state object.
///
/// The store keeps the state in two synchronized forms: the typed value
/// (handed out by [`get_current_state`]) and its structural tree (addressed
/// by dotted paths). Every mutation goes through a validate-then-commit
/// sequence on a scratch copy of the tree, so a failed operation leaves the
/// state, the version counter and the undo history untouched. Every
/// successful mutation publishes its notifications synchronously, before
/// the mutating call returns, in a fixed order: detailed change first,
/// simple update second.
///
/// This type is the single-threaded core; wrap it in
/// [`SharedStore`](crate::SharedStore) to drive it from bus requests or
/// from multiple threads.
///
/// [`get_current_state`]: Store::get_current_state
pub struct Store<T: StateModel> {
	bus: Bus,
	current: T,
	tree: Value,
	version: u64,
	history: HistoryManager,
}

impl<T: StateModel> Store<T> {
	/// Creates a store owning `T::default()` and publishing on `bus`.
	///
	/// # Errors
	///
	/// [`StoreError::TypeMismatch`] when the default state has no
	/// structural form (e.g. a map with non-string keys).
	pub fn new(bus: Bus) -> Result<Self> {
		let current = T::default();
		let tree = model::to_tree(&current, ROOT_CONTEXT)?;
		Ok(Self { bus, current, tree, version: 0, history: HistoryManager::default() })
	}

	/// The bus this store notifies on.
	pub fn bus(&self) -> &Bus {
		&self.bus
	}

	/// Monotonic mutation counter; bumps once per successful mutation.
	pub fn version(&self) -> u64 {
		self.version
	}

	/// Returns a deep, independent copy of the live state.
	///
	/// Callers may do anything with the copy; the store never observes it.
	pub fn get_current_state(&self) -> T {
		self.current.clone()
	}

	/// Starts a shape-checked path chain rooted at the live state.
	///
	/// ```
	/// # use axon_bus::Bus;
	/// # use serde::{Deserialize, Serialize};
	/// # #[derive(Clone, Default, Serialize, Deserialize)]
	/// # struct User { name: String }
	/// # #[derive(Clone, Default, Serialize, Deserialize)]
	/// # struct AppState { user: User }
	/// # fn main() -> axon_store::Result<()> {
	/// # let mut store = axon_store::Store::<AppState>::new(Bus::new())?;
	/// let path = store.state().field("user")?.field("name")?;
	/// store.update_state(path.as_str(), "ada")?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn state(&self) -> StatePath {
		StatePath::root(self.tree.clone())
	}

	/// Replaces the whole state object.
	///
	/// Emits detailed-changed and simple-updated notifications for every
	/// top-level field, changed or not: a full replace means everything may
	/// have changed.
	///
	/// # Errors
	///
	/// [`StoreError::TypeMismatch`] when `new_state` has no structural form.
	pub fn replace_state(&mut self, new_state: T) -> Result<()> {
		let emissions = self.replace_state_inner(new_state)?;
		publish_all(&self.bus, emissions);
		Ok(())
	}

	/// Assigns `new_value` at `path`.
	///
	/// Structurally compatible values are coerced into the declared field
	/// type; the notifications carry the value as stored.
	///
	/// # Errors
	///
	/// [`StoreError::EmptyPath`], [`StoreError::PathNotFound`] from
	/// resolution; [`StoreError::TypeMismatch`] when the resulting state
	/// would not fit the declared type.
	pub fn update_state(&mut self, path: &str, new_value: impl Serialize) -> Result<()> {
		let value = model::to_tree(&new_value, path)?;
		let emissions = self.update_state_inner(path, value)?;
		publish_all(&self.bus, emissions);
		Ok(())
	}

	/// Appends `item` to the sequence at `path`.
	///
	/// The sequence is rebuilt copy-on-write; previously handed-out state
	/// copies never observe the append.
	///
	/// # Errors
	///
	/// Resolution errors as for [`update_state`](Store::update_state);
	/// [`StoreError::NotAList`] when the value at `path` is not a sequence.
	pub fn add_to_list(&mut self, path: &str, item: impl Serialize) -> Result<()> {
		let item = model::to_tree(&item, path)?;
		let emissions = self.add_to_list_inner(path, item)?;
		publish_all(&self.bus, emissions);
		Ok(())
	}

	/// Inserts `key`/`value` into the mapping at `path`.
	///
	/// # Errors
	///
	/// Resolution errors as for [`update_state`](Store::update_state);
	/// [`StoreError::NotADict`] when the value at `path` is not a mapping.
	pub fn add_to_dict(&mut self, path: &str, key: &str, value: impl Serialize) -> Result<()> {
		let value = model::to_tree(&value, path)?;
		let emissions = self.add_to_dict_inner(path, key, value)?;
		publish_all(&self.bus, emissions);
		Ok(())
	}

	/// Starts tracking undo history for `path` with the given cap.
	///
	/// The current value becomes the history seed; if the path does not
	/// resolve yet, history picks up from the next successful mutation.
	/// Re-enabling an already-tracked path resets its history.
	pub fn enable_undo_redo(&mut self, path: &str, max_history: usize) {
		let emissions = self.enable_undo_redo_inner(path, max_history);
		publish_all(&self.bus, emissions);
	}

	/// Stops tracking `path` and discards its history immediately.
	pub fn disable_undo_redo(&mut self, path: &str) {
		self.disable_undo_redo_inner(path);
	}

	/// Restores the previous value at `path`.
	///
	/// A no-op when the path is untracked, has no step to undo, or no
	/// longer resolves. The restore runs through the ordinary mutation
	/// path, so subscribers see the same notifications as for a user edit.
	///
	/// # Errors
	///
	/// [`StoreError::TypeMismatch`] if the restored snapshot no longer fits
	/// the declared state type.
	pub fn undo(&mut self, path: &str) -> Result<()> {
		let emissions = self.undo_inner(path)?;
		publish_all(&self.bus, emissions);
		Ok(())
	}

	/// Reapplies the most recently undone value at `path`.
	///
	/// Symmetric to [`undo`](Store::undo); a no-op when there is nothing to
	/// redo.
	///
	/// # Errors
	///
	/// As for [`undo`](Store::undo).
	pub fn redo(&mut self, path: &str) -> Result<()> {
		let emissions = self.redo_inner(path)?;
		publish_all(&self.bus, emissions);
		Ok(())
	}

	// --- mutation cores -------------------------------------------------
	//
	// Each core performs the mutation and returns its notifications in
	// publish order; the caller decides when to put them on the bus.

	pub(crate) fn replace_state_inner(&mut self, new_state: T) -> Result<Vec<Emission>> {
		let new_tree = model::to_tree(&new_state, ROOT_CONTEXT)?;
		let old_tree = std::mem::replace(&mut self.tree, new_tree);
		self.current = new_state;
		self.version += 1;
		debug!(target: "axon::store", version = self.version, "replace_state");

		let mut emissions = Vec::new();
		if let Value::Object(fields) = &self.tree {
			for (field, new_value) in fields {
				let old_value = old_tree.get(field).cloned().unwrap_or(Value::Null);
				emissions.push((
					UpdateTopic::StateChanged.scoped(field),
					Payload::new().with("old_value", old_value).with("new_value", new_value.clone()),
				));
				emissions.push((UpdateTopic::StateUpdated.scoped(field), Payload::new()));
			}
		}
		Ok(emissions)
	}

	pub(crate) fn update_state_inner(&mut self, path: &str, new_value: Value) -> Result<Vec<Emission>> {
		let old_value = path::resolve(&self.tree, path)?.value.clone();
		let (typed, tree) = self.validated_assign(path, new_value)?;
		let new_value = path::resolve(&tree, path)?.value.clone();

		let mut emissions = Vec::new();
		self.capture_for_undo(path, &new_value, &mut emissions);
		self.commit(typed, tree);
		debug!(target: "axon::store", path, version = self.version, "update_state");

		emissions.push((
			UpdateTopic::StateChanged.scoped(path),
			Payload::new().with("old_value", old_value).with("new_value", new_value),
		));
		emissions.push((UpdateTopic::StateUpdated.scoped(path), Payload::new()));
		Ok(emissions)
	}

	pub(crate) fn add_to_list_inner(&mut self, path: &str, item: Value) -> Result<Vec<Emission>> {
		let current = path::resolve(&self.tree, path)?.value;
		let Value::Array(items) = current else {
			return Err(StoreError::NotAList { path: path.to_owned() });
		};

		let mut new_items = items.clone();
		new_items.push(item);

		let (typed, tree) = self.validated_assign(path, Value::Array(new_items))?;
		let new_list = path::resolve(&tree, path)?.value.clone();
		let (added, index) = match &new_list {
			Value::Array(items) => (items.last().cloned().unwrap_or(Value::Null), items.len() - 1),
			_ => (Value::Null, 0),
		};

		let mut emissions = Vec::new();
		self.capture_for_undo(path, &new_list, &mut emissions);
		self.commit(typed, tree);
		debug!(target: "axon::store", path, index, version = self.version, "add_to_list");

		emissions.push((
			UpdateTopic::StateAdded.scoped(path),
			Payload::new().with("item", added).with("index", index),
		));
		emissions.push((UpdateTopic::StateUpdated.scoped(path), Payload::new()));
		Ok(emissions)
	}

	pub(crate) fn add_to_dict_inner(&mut self, path: &str, key: &str, value: Value) -> Result<Vec<Emission>> {
		let current = path::resolve(&self.tree, path)?.value;
		let Value::Object(entries) = current else {
			return Err(StoreError::NotADict { path: path.to_owned() });
		};

		let mut new_entries = entries.clone();
		new_entries.insert(key.to_owned(), value);

		let (typed, tree) = self.validated_assign(path, Value::Object(new_entries))?;
		let new_map = path::resolve(&tree, path)?.value.clone();
		let added = new_map.get(key).cloned().unwrap_or(Value::Null);

		let mut emissions = Vec::new();
		self.capture_for_undo(path, &new_map, &mut emissions);
		self.commit(typed, tree);
		debug!(target: "axon::store", path, key, version = self.version, "add_to_dict");

		emissions.push((
			UpdateTopic::DictAdded.scoped(path),
			Payload::new().with("key", key).with("value", added),
		));
		emissions.push((UpdateTopic::StateUpdated.scoped(path), Payload::new()));
		Ok(emissions)
	}

	pub(crate) fn enable_undo_redo_inner(&mut self, path: &str, max_history: usize) -> Vec<Emission> {
		let seed = path::resolve(&self.tree, path).ok().map(|resolved| resolved.value.clone());
		self.history.enable(path, max_history, seed);
		debug!(target: "axon::store", path, max_history, "enable_undo_redo");
		vec![self.status_emission(path)]
	}

	pub(crate) fn disable_undo_redo_inner(&mut self, path: &str) {
		self.history.disable(path);
		debug!(target: "axon::store", path, "disable_undo_redo");
	}

	pub(crate) fn undo_inner(&mut self, path: &str) -> Result<Vec<Emission>> {
		if !self.history.is_tracked(path) {
			return Ok(Vec::new());
		}
		// A tracked path that no longer resolves has no current value to
		// move onto the redo stack; nothing to undo.
		let Ok(resolved) = path::resolve(&self.tree, path) else {
			return Ok(Vec::new());
		};
		let current = resolved.value.clone();
		let Some(restore) = self.history.start_undo(path, &current) else {
			return Ok(Vec::new());
		};

		self.history.begin_restore(path);
		let applied = self.update_state_inner(path, restore);
		self.history.end_restore();

		let mut emissions = applied?;
		emissions.push(self.status_emission(path));
		debug!(target: "axon::store", path, "undo");
		Ok(emissions)
	}

	pub(crate) fn redo_inner(&mut self, path: &str) -> Result<Vec<Emission>> {
		if !self.history.is_tracked(path) || path::resolve(&self.tree, path).is_err() {
			return Ok(Vec::new());
		}
		let Some(restore) = self.history.start_redo(path) else {
			return Ok(Vec::new());
		};

		self.history.begin_restore(path);
		let applied = self.update_state_inner(path, restore);
		self.history.end_restore();

		let mut emissions = applied?;
		emissions.push(self.status_emission(path));
		debug!(target: "axon::store", path, "redo");
		Ok(emissions)
	}

	// --- internals ------------------------------------------------------

	/// Assigns into a scratch copy of the tree and validates the result
	/// against the declared state type. Nothing is committed on failure.
	fn validated_assign(&self, path: &str, new_value: Value) -> Result<(T, Value)> {
		let mut scratch = self.tree.clone();
		*path::resolve_slot_mut(&mut scratch, path)? = new_value;
		let typed: T = model::validate_tree(scratch, path)?;
		let tree = model::to_tree(&typed, path)?;
		Ok((typed, tree))
	}

	fn commit(&mut self, typed: T, tree: Value) {
		self.current = typed;
		self.tree = tree;
		self.version += 1;
	}

	fn capture_for_undo(&mut self, path: &str, new_value: &Value, emissions: &mut Vec<Emission>) {
		if self.history.capture(path, new_value) {
			emissions.push(self.status_emission(path));
		}
	}

	fn status_emission(&self, path: &str) -> Emission {
		let status = self.history.status(path);
		(
			UndoTopic::StatusChanged.scoped(path),
			Payload::new()
				.with("can_undo", status.can_undo)
				.with("can_redo", status.can_redo)
				.with("undo_count", status.undo_count)
				.with("redo_count", status.redo_count),
		)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use pretty_assertions::assert_eq;
	use serde::Deserialize;
	use serde_json::json;

	use super::*;

	#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
	struct User {
		name: String,
		tasks: Vec<String>,
	}

	#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
	struct AppState {
		counter: i64,
		user: User,
		labels: BTreeMap<String, String>,
	}

	fn store() -> Store<AppState> {
		Store::new(Bus::new()).unwrap()
	}

	#[test]
	fn test_update_and_read_back() {
		let mut store = store();
		store.update_state("user.name", "ada").unwrap();
		assert_eq!(store.get_current_state().user.name, "ada");
		assert_eq!(store.version(), 1);
	}

	#[test]
	fn test_update_coerces_structurally_compatible_records() {
		let mut store = store();
		store.update_state("user", json!({"name": "grace", "tasks": ["ship"]})).unwrap();
		let state = store.get_current_state();
		assert_eq!(state.user, User { name: "grace".into(), tasks: vec!["ship".into()] });
	}

	#[test]
	fn test_failed_update_leaves_state_untouched() {
		let mut store = store();
		store.update_state("counter", 5).unwrap();
		let err = store.update_state("counter", "not a number").unwrap_err();
		assert!(matches!(err, StoreError::TypeMismatch { .. }));
		assert_eq!(store.get_current_state().counter, 5);
		assert_eq!(store.version(), 1);
	}

	#[test]
	fn test_add_to_list_appends_at_the_end() {
		let mut store = store();
		store.add_to_list("user.tasks", "one").unwrap();
		store.add_to_list("user.tasks", "two").unwrap();
		assert_eq!(store.get_current_state().user.tasks, vec!["one", "two"]);
	}

	#[test]
	fn test_add_to_list_rejects_non_sequences() {
		let mut store = store();
		let err = store.add_to_list("counter", 1).unwrap_err();
		assert!(matches!(err, StoreError::NotAList { .. }));
	}

	#[test]
	fn test_add_to_dict_inserts_key() {
		let mut store = store();
		store.add_to_dict("labels", "priority", "high").unwrap();
		assert_eq!(store.get_current_state().labels.get("priority"), Some(&"high".to_string()));
	}

	#[test]
	fn test_add_to_dict_rejects_non_mappings() {
		let mut store = store();
		let err = store.add_to_dict("user.tasks", "k", "v").unwrap_err();
		assert!(matches!(err, StoreError::NotADict { .. }));
	}

	#[test]
	fn test_replace_state_swaps_wholesale() {
		let mut store = store();
		let next = AppState { counter: 9, ..AppState::default() };
		store.replace_state(next).unwrap();
		assert_eq!(store.get_current_state().counter, 9);
	}

	#[test]
	fn test_unknown_path_is_an_error() {
		let mut store = store();
		assert!(matches!(store.update_state("no.such.path", 1), Err(StoreError::PathNotFound { .. })));
		assert!(matches!(store.update_state("", 1), Err(StoreError::EmptyPath)));
	}
}
