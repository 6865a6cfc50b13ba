//! Undo/redo history behavior layered on the store.

use std::sync::Arc;

use axon_bus::{Bus, Payload};
use axon_store::Store;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct CounterState {
	counter: i64,
	tags: Vec<String>,
}

type EventLog = Arc<Mutex<Vec<(String, Payload)>>>;

fn record(bus: &Bus, topic: &str, log: &EventLog) {
	let log = Arc::clone(log);
	let name = topic.to_owned();
	bus.subscribe(name.clone(), move |payload| log.lock().push((name.clone(), payload.clone())));
}

fn new_store() -> Store<CounterState> {
	Store::new(Bus::new()).unwrap()
}

#[test]
fn test_undo_seed_invariant() {
	let mut store = new_store();
	store.update_state("counter", 42).unwrap();
	store.enable_undo_redo("counter", 10);

	// No mutation since enable: the single seed entry is not undoable.
	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 42);
}

#[test]
fn test_end_to_end_counter_scenario() {
	let mut store = new_store();
	store.enable_undo_redo("counter", 5);

	store.update_state("counter", 1).unwrap();
	store.update_state("counter", 2).unwrap();
	assert_eq!(store.get_current_state().counter, 2);

	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 1);

	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 0);

	// No further history: a third undo changes nothing and raises nothing.
	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 0);
}

#[test]
fn test_undo_redo_symmetry() {
	let mut store = new_store();
	store.enable_undo_redo("counter", 10);

	store.update_state("counter", 1).unwrap();
	store.update_state("counter", 2).unwrap();

	store.undo("counter").unwrap();
	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 0);

	store.redo("counter").unwrap();
	store.redo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 2);

	// Redo past the stack is a no-op.
	store.redo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 2);
}

#[test]
fn test_history_eviction() {
	let mut store = new_store();
	store.enable_undo_redo("counter", 2);

	for value in 1..=5 {
		store.update_state("counter", value).unwrap();
	}
	assert_eq!(store.get_current_state().counter, 5);

	// A cap of 2 leaves one undoable step; going further is a no-op.
	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 4);
	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 4);
}

#[test]
fn test_redo_invalidation_on_new_mutation() {
	let mut store = new_store();
	store.enable_undo_redo("counter", 10);

	store.update_state("counter", 1).unwrap();
	store.update_state("counter", 2).unwrap();
	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 1);

	// A fresh edit invalidates the redo stack.
	store.update_state("counter", 3).unwrap();
	store.redo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 3);
}

#[test]
fn test_untracked_paths_ignore_undo() {
	let mut store = new_store();
	store.update_state("counter", 1).unwrap();
	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 1);
	store.redo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 1);
}

#[test]
fn test_disable_discards_history() {
	let mut store = new_store();
	store.enable_undo_redo("counter", 10);
	store.update_state("counter", 1).unwrap();

	store.disable_undo_redo("counter");
	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 1);

	// Disabling an untracked path is a no-op.
	store.disable_undo_redo("counter");
}

#[test]
fn test_reenable_resets_history() {
	let mut store = new_store();
	store.enable_undo_redo("counter", 10);
	store.update_state("counter", 1).unwrap();

	// Re-enabling snapshots the current value and clears the old stacks.
	store.enable_undo_redo("counter", 10);
	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 1);
}

#[test]
fn test_list_history_restores_previous_sequence() {
	let mut store = new_store();
	store.add_to_list("tags", "a").unwrap();
	store.enable_undo_redo("tags", 10);

	store.add_to_list("tags", "b").unwrap();
	assert_eq!(store.get_current_state().tags, vec!["a", "b"]);

	store.undo("tags").unwrap();
	assert_eq!(store.get_current_state().tags, vec!["a"]);

	store.redo("tags").unwrap();
	assert_eq!(store.get_current_state().tags, vec!["a", "b"]);
}

#[test]
fn test_undo_notifies_like_a_user_edit() {
	let log: EventLog = Arc::new(Mutex::new(Vec::new()));
	let mut store = new_store();
	store.enable_undo_redo("counter", 10);
	store.update_state("counter", 1).unwrap();

	record(store.bus(), "Update.state_changed.counter", &log);
	record(store.bus(), "Update.state_updated.counter", &log);

	store.undo("counter").unwrap();

	// The restore went through the ordinary mutation path: detailed change
	// first, simple update second, same as any edit.
	let events = log.lock();
	assert_eq!(events.len(), 2);
	assert_eq!(events[0].0, "Update.state_changed.counter");
	assert_eq!(events[0].1.get::<i64>("old_value"), Some(1));
	assert_eq!(events[0].1.get::<i64>("new_value"), Some(0));
	assert_eq!(events[1].0, "Update.state_updated.counter");
}

#[test]
fn test_status_notifications_follow_history() {
	let log: EventLog = Arc::new(Mutex::new(Vec::new()));
	let mut store = new_store();
	record(store.bus(), "Undo.status_changed.counter", &log);

	store.enable_undo_redo("counter", 10);
	store.update_state("counter", 1).unwrap();
	store.undo("counter").unwrap();

	let events = log.lock();
	assert_eq!(events.len(), 3);

	// After enable: only the seed, nothing undoable.
	let enabled = &events[0].1;
	assert_eq!(enabled.get::<bool>("can_undo"), Some(false));
	assert_eq!(enabled.get::<bool>("can_redo"), Some(false));
	assert_eq!(enabled.get::<usize>("undo_count"), Some(0));

	// After the mutation: one undoable step, redo cleared.
	let captured = &events[1].1;
	assert_eq!(captured.get::<bool>("can_undo"), Some(true));
	assert_eq!(captured.get::<bool>("can_redo"), Some(false));
	assert_eq!(captured.get::<usize>("undo_count"), Some(1));

	// After the undo: back on the seed, one redoable step.
	let undone = &events[2].1;
	assert_eq!(undone.get::<bool>("can_undo"), Some(false));
	assert_eq!(undone.get::<bool>("can_redo"), Some(true));
	assert_eq!(undone.get::<usize>("redo_count"), Some(1));
}

#[test]
fn test_mutation_on_other_paths_does_not_touch_tracked_history() {
	let mut store = new_store();
	store.enable_undo_redo("counter", 10);
	store.update_state("counter", 1).unwrap();

	// Mutating an untracked path must not capture or clear anything.
	store.add_to_list("tags", "x").unwrap();

	store.undo("counter").unwrap();
	assert_eq!(store.get_current_state().counter, 0);
	assert_eq!(store.get_current_state().tags, vec!["x"]);
}

#[test]
fn test_enable_on_unresolvable_path_starts_empty() {
	let mut store = new_store();
	// Tracking a path that does not exist yet is tolerated; history starts
	// once the path becomes mutable.
	store.enable_undo_redo("ghost", 10);
	store.undo("ghost").unwrap();
	assert_eq!(store.get_current_state(), CounterState::default());
}
