//! Chainable, shape-checked state path construction.

use std::fmt;

use serde_json::Value;

use crate::error::{Result, StoreError};

/// A dotted state path built segment by segment against a state snapshot.
///
/// Each step is checked against the snapshot taken when the chain started,
/// so a typo fails at the call site instead of surfacing later as a failed
/// mutation. The finished chain stringifies to the accumulated path and
/// plugs into every string-path store operation:
///
/// ```
/// # use axon_bus::Bus;
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Clone, Default, Serialize, Deserialize)]
/// # struct AppState { counter: i64 }
/// # fn main() -> axon_store::Result<()> {
/// # let mut store = axon_store::Store::<AppState>::new(Bus::new())?;
/// let counter = store.state().field("counter")?;
/// store.update_state(counter.as_str(), 7)?;
/// # Ok(())
/// # }
/// ```
///
/// The proxy holds no live reference into the store; it is rebuilt fresh on
/// every `state()` call and carries only the snapshot cursor and the path
/// string.
#[derive(Debug, Clone)]
pub struct StatePath {
	cursor: Value,
	path: String,
}

impl StatePath {
	pub(crate) fn root(snapshot: Value) -> Self {
		Self { cursor: snapshot, path: String::new() }
	}

	/// Steps into the struct field or map key `name`.
	///
	/// # Errors
	///
	/// [`StoreError::NoSuchProperty`] when the current segment holds no
	/// member of that name.
	pub fn field(mut self, name: &str) -> Result<Self> {
		let next = match &mut self.cursor {
			Value::Object(map) => map.remove(name),
			_ => None,
		};
		let Some(next) = next else {
			return Err(StoreError::NoSuchProperty { path: self.extended(name) });
		};
		self.path = self.extended(name);
		self.cursor = next;
		Ok(self)
	}

	/// Steps into element `index` of the sequence at the current segment.
	///
	/// # Errors
	///
	/// [`StoreError::NoSuchProperty`] when the current segment is not a
	/// sequence or the index is out of bounds.
	pub fn index(mut self, index: usize) -> Result<Self> {
		let next = match &mut self.cursor {
			Value::Array(items) if index < items.len() => Some(items.swap_remove(index)),
			_ => None,
		};
		let Some(next) = next else {
			return Err(StoreError::NoSuchProperty { path: self.extended(&index.to_string()) });
		};
		self.path = self.extended(&index.to_string());
		self.cursor = next;
		Ok(self)
	}

	/// The accumulated dotted path.
	pub fn as_str(&self) -> &str {
		&self.path
	}

	fn extended(&self, segment: &str) -> String {
		if self.path.is_empty() { segment.to_owned() } else { format!("{}.{segment}", self.path) }
	}
}

impl fmt::Display for StatePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.path)
	}
}

impl AsRef<str> for StatePath {
	fn as_ref(&self) -> &str {
		&self.path
	}
}
