//! The state model contract and structural validation.
//!
//! A state root is any plain data type that serde can take apart and put
//! back together. The store keeps the structural form (a [`Value`] tree) as
//! the canonical representation and revalidates the whole tree against the
//! declared type on every mutation, so an ill-shaped value can never be
//! committed: structurally compatible input is coerced into the declared
//! field types, incompatible input fails [`StoreError::TypeMismatch`] and
//! leaves the state untouched.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, StoreError};

/// Context label used for whole-state validation failures.
pub(crate) const ROOT_CONTEXT: &str = "(state)";

/// Types usable as the single state root owned by a store.
///
/// Blanket-implemented; deriving `Serialize`, `Deserialize`, `Clone` and
/// `Default` on a plain struct is all it takes.
pub trait StateModel: Serialize + DeserializeOwned + Clone + Default + Send + 'static {}

impl<T> StateModel for T where T: Serialize + DeserializeOwned + Clone + Default + Send + 'static {}

/// Serializes a state value into its structural form.
pub(crate) fn to_tree<T: Serialize>(state: &T, context: &str) -> Result<Value> {
	serde_json::to_value(state)
		.map_err(|source| StoreError::TypeMismatch { path: context.to_owned(), source })
}

/// Validates a structural tree against the declared state type.
///
/// This is the structural-coercion step: compatible values (an integer for
/// a wider integer field, a plain map for a nested record) come back as the
/// declared type; incompatible trees fail with the offending path attached.
pub(crate) fn validate_tree<T: DeserializeOwned>(tree: Value, context: &str) -> Result<T> {
	serde_json::from_value(tree)
		.map_err(|source| StoreError::TypeMismatch { path: context.to_owned(), source })
}

#[cfg(test)]
mod tests {
	use serde::Deserialize;
	use serde_json::json;

	use super::*;

	#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
	struct Profile {
		name: String,
		age: u32,
	}

	#[test]
	fn test_round_trip() {
		let profile = Profile { name: "ada".into(), age: 36 };
		let tree = to_tree(&profile, ROOT_CONTEXT).unwrap();
		assert_eq!(tree, json!({"name": "ada", "age": 36}));
		let back: Profile = validate_tree(tree, ROOT_CONTEXT).unwrap();
		assert_eq!(back, profile);
	}

	#[test]
	fn test_structural_coercion_accepts_compatible_maps() {
		let back: Profile = validate_tree(json!({"name": "g", "age": 1}), ROOT_CONTEXT).unwrap();
		assert_eq!(back, Profile { name: "g".into(), age: 1 });
	}

	#[test]
	fn test_incompatible_tree_is_a_type_mismatch() {
		let err = validate_tree::<Profile>(json!({"name": "g", "age": "old"}), "user").unwrap_err();
		match err {
			StoreError::TypeMismatch { path, .. } => assert_eq!(path, "user"),
			other => panic!("unexpected error: {other}"),
		}
	}
}
