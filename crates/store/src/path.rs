//! Dotted-path resolution over the state tree.
//!
//! A path like `"user.tasks.0"` addresses a location inside the structural
//! form of the state: names step into struct fields and map keys, decimal
//! segments index into sequences. Resolution is read-only and side-effect
//! free; it runs before every mutation and before every history capture.

use serde_json::Value;

use crate::error::{Result, StoreError};

/// Outcome of resolving a path: the penultimate container, the final
/// segment name, and the current value at the path.
#[derive(Debug)]
pub struct Resolved<'v, 'p> {
	/// Direct parent of the target attribute.
	pub parent: &'v Value,
	/// Name of the final segment within `parent`.
	pub attr: &'p str,
	/// Current value at the full path.
	pub value: &'v Value,
}

/// Resolves `path` against `root`.
///
/// # Errors
///
/// [`StoreError::EmptyPath`] when `path` is empty,
/// [`StoreError::PathNotFound`] when any segment is absent from its
/// containing value.
pub fn resolve<'v, 'p>(root: &'v Value, path: &'p str) -> Result<Resolved<'v, 'p>> {
	if path.is_empty() {
		return Err(StoreError::EmptyPath);
	}

	let mut segments = path.split('.');
	// `split` on a non-empty string yields at least one segment.
	let mut attr = segments.next().unwrap_or_default();
	let mut parent = root;

	for segment in segments {
		parent = step(parent, attr, path)?;
		attr = segment;
	}

	let value = step(parent, attr, path)?;
	Ok(Resolved { parent, attr, value })
}

/// Resolves `path` and returns the mutable slot holding its value.
///
/// The final segment must already exist; assignment never creates new
/// attributes, mirroring the read-side contract.
///
/// # Errors
///
/// Same conditions as [`resolve`].
pub(crate) fn resolve_slot_mut<'v>(root: &'v mut Value, path: &str) -> Result<&'v mut Value> {
	if path.is_empty() {
		return Err(StoreError::EmptyPath);
	}

	let mut current = root;
	for segment in path.split('.') {
		current = step_mut(current, segment, path)?;
	}
	Ok(current)
}

fn step<'v>(container: &'v Value, segment: &str, path: &str) -> Result<&'v Value> {
	let found = match container {
		Value::Object(map) => map.get(segment),
		Value::Array(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
		_ => None,
	};
	found.ok_or_else(|| StoreError::PathNotFound { path: path.to_owned(), segment: segment.to_owned() })
}

fn step_mut<'v>(container: &'v mut Value, segment: &str, path: &str) -> Result<&'v mut Value> {
	let found = match container {
		Value::Object(map) => map.get_mut(segment),
		Value::Array(items) => match segment.parse::<usize>() {
			Ok(index) => items.get_mut(index),
			Err(_) => None,
		},
		_ => None,
	};
	found.ok_or_else(|| StoreError::PathNotFound { path: path.to_owned(), segment: segment.to_owned() })
}
