//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures raised synchronously by store operations.
///
/// None of these are transient: every variant reflects either a caller
/// error (bad path, wrong container kind, ill-shaped value) or a guard
/// condition (double bind), so nothing in the store retries.
#[derive(Debug, Error)]
pub enum StoreError {
	/// A state path string was empty.
	#[error("empty state path")]
	EmptyPath,

	/// A path segment does not exist on the current state shape.
	#[error("no such attribute: {segment} in path {path}")]
	PathNotFound {
		/// The full path being resolved.
		path: String,
		/// The segment that failed to resolve.
		segment: String,
	},

	/// A list operation targeted a path whose value is not a sequence.
	#[error("property at '{path}' is not a list")]
	NotAList {
		/// The offending path.
		path: String,
	},

	/// A dict operation targeted a path whose value is not a mapping.
	#[error("property at '{path}' is not a dict")]
	NotADict {
		/// The offending path.
		path: String,
	},

	/// A value could not be validated against the declared state type.
	#[error("value at '{path}' does not fit the declared state shape: {source}")]
	TypeMismatch {
		/// Path of the assignment that failed validation, or `(state)` for
		/// whole-state operations.
		path: String,
		/// The underlying structural validation error.
		#[source]
		source: serde_json::Error,
	},

	/// A path proxy stepped onto a segment absent from the live state.
	#[error("no such property: state.{path}")]
	NoSuchProperty {
		/// The attempted path, up to and including the bad segment.
		path: String,
	},

	/// A store is already bound for this state type.
	#[error("a store is already bound for state type {state_type}")]
	AlreadyBound {
		/// Type name of the state the existing store was bound with.
		state_type: &'static str,
	},
}
