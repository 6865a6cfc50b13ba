//! Keyword payloads carried by bus messages.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// The keyword arguments of one published message.
///
/// Keys are field names agreed per topic (`"old_value"`, `"item"`,
/// `"state_path"`, ...); values are structural [`Value`]s so a payload can
/// carry anything the state tree can. Simple-update notifications publish an
/// empty payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
	entries: BTreeMap<String, Value>,
}

impl Payload {
	/// An empty payload.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds one keyword entry, builder style.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.entries.insert(key.into(), value.into());
		self
	}

	/// Returns the raw value stored under `key`.
	pub fn get_value(&self, key: &str) -> Option<&Value> {
		self.entries.get(key)
	}

	/// Deserializes the value under `key` into `T`.
	///
	/// Returns `None` when the key is absent or the value does not fit `T`;
	/// handlers that must distinguish the two should use [`get_value`].
	///
	/// [`get_value`]: Payload::get_value
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let value = self.entries.get(key)?;
		serde_json::from_value(value.clone()).ok()
	}

	/// Iterates the keyword names, in sorted order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Number of keyword entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the payload carries no keywords.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_with_and_get_round_trip() {
		let payload = Payload::new().with("index", 3).with("item", json!({"title": "buy milk"}));
		assert_eq!(payload.get::<usize>("index"), Some(3));
		assert_eq!(payload.get_value("item"), Some(&json!({"title": "buy milk"})));
	}

	#[test]
	fn test_get_is_none_for_missing_or_mismatched() {
		let payload = Payload::new().with("count", "not a number");
		assert_eq!(payload.get::<u32>("count"), None);
		assert_eq!(payload.get::<u32>("absent"), None);
	}

	#[test]
	fn test_empty_payload() {
		let payload = Payload::new();
		assert!(payload.is_empty());
		assert_eq!(payload.len(), 0);
	}
}
