//! Per-path undo/redo history.
//!
//! Tracking is opt-in per state path; untracked paths cost nothing. Each
//! tracked path owns two snapshot stacks. The undo stack mirrors the value
//! timeline: its oldest entry is the value at the moment tracking was
//! enabled and its top always equals the live value, so undo pops the top
//! onto the redo stack and restores the entry beneath it. Any new mutation
//! clears the redo stack.

use std::collections::HashMap;

use serde_json::Value;

/// History cap used when an enable request does not name one.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Undo/redo availability for one tracked path.
///
/// Published on `Undo.status_changed.<path>` after every history change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UndoStatus {
	/// Whether an undo would change the value.
	pub can_undo: bool,
	/// Whether a redo would change the value.
	pub can_redo: bool,
	/// Number of undoable steps (entries beyond the seed).
	pub undo_count: usize,
	/// Number of redoable steps.
	pub redo_count: usize,
}

#[derive(Debug)]
struct PathHistory {
	undo: Vec<Value>,
	redo: Vec<Value>,
	cap: usize,
}

/// Snapshot stacks for every tracked path, plus the restore token that
/// keeps undo/redo-driven mutations from capturing themselves.
#[derive(Debug, Default)]
pub(crate) struct HistoryManager {
	tracked: HashMap<String, PathHistory>,
	restoring: Option<String>,
}

impl HistoryManager {
	/// Starts (or restarts) tracking `path` with the given cap.
	///
	/// `seed` is the current value at the path, or `None` when the path does
	/// not resolve yet; an unseeded history picks up entries from the next
	/// successful mutation. Re-enabling resets any prior stacks.
	pub fn enable(&mut self, path: &str, cap: usize, seed: Option<Value>) {
		let undo = match seed {
			Some(value) => vec![value],
			None => Vec::new(),
		};
		self.tracked.insert(path.to_owned(), PathHistory { undo, redo: Vec::new(), cap });
	}

	/// Stops tracking `path`, discarding both stacks and the cap.
	///
	/// Disabling an untracked path is a no-op.
	pub fn disable(&mut self, path: &str) {
		self.tracked.remove(path);
	}

	/// Whether `path` is currently tracked.
	pub fn is_tracked(&self, path: &str) -> bool {
		self.tracked.contains_key(path)
	}

	/// Records the value a new mutation is about to commit at `path`.
	///
	/// No-op (returning `false`) when the path is untracked or is the one
	/// currently being restored by undo/redo. Evicts the oldest entry once
	/// the stack exceeds the cap and invalidates the redo stack.
	pub fn capture(&mut self, path: &str, new_value: &Value) -> bool {
		if self.restoring.as_deref() == Some(path) {
			return false;
		}
		let Some(history) = self.tracked.get_mut(path) else {
			return false;
		};

		history.undo.push(new_value.clone());
		if history.undo.len() > history.cap {
			history.undo.remove(0);
		}
		history.redo.clear();
		true
	}

	/// Begins an undo: moves the current value onto the redo stack and
	/// returns the value to restore.
	///
	/// `None` when the path is untracked or holds no step to undo (the seed
	/// entry is never removed by undo).
	pub fn start_undo(&mut self, path: &str, current: &Value) -> Option<Value> {
		let history = self.tracked.get_mut(path)?;
		if history.undo.len() < 2 {
			return None;
		}
		history.redo.push(current.clone());
		history.undo.pop();
		history.undo.last().cloned()
	}

	/// Begins a redo: moves the most recently undone value back onto the
	/// undo stack and returns it for reapplication.
	pub fn start_redo(&mut self, path: &str) -> Option<Value> {
		let history = self.tracked.get_mut(path)?;
		let value = history.redo.pop()?;
		history.undo.push(value.clone());
		Some(value)
	}

	/// Marks `path` as being restored, suppressing capture for it.
	pub fn begin_restore(&mut self, path: &str) {
		self.restoring = Some(path.to_owned());
	}

	/// Clears the restore token.
	pub fn end_restore(&mut self) {
		self.restoring = None;
	}

	/// Current undo/redo availability for `path`.
	pub fn status(&self, path: &str) -> UndoStatus {
		match self.tracked.get(path) {
			Some(history) => UndoStatus {
				can_undo: history.undo.len() > 1,
				can_redo: !history.redo.is_empty(),
				undo_count: history.undo.len().saturating_sub(1),
				redo_count: history.redo.len(),
			},
			None => UndoStatus::default(),
		}
	}
}
