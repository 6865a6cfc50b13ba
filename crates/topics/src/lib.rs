//! Topic naming for the axon publish/subscribe framework.
//!
//! Every notification channel is addressed by a stable dotted string of the
//! form `"<Group>.<member>"`, optionally extended with a state path
//! (`"Update.state_changed.user.name"`). Identical (group, member) pairs
//! always produce identical strings, and distinct groups never collide even
//! when their member names do.
//!
//! The well-known channels used by the state store and its peripheral glue
//! live in [`catalog`]; new groups are declared with the [`topics!`] macro.

mod catalog;
mod macros;

pub use catalog::{NavigateTopic, ProcessorTopic, UndoTopic, UpdateTopic};

use std::borrow::Cow;
use std::fmt;

/// A dotted topic string addressing one notification channel.
///
/// Catalog members carry `'static` strings and allocate nothing; scoped
/// topics own their composed string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(Cow<'static, str>);

impl Topic {
	/// Wraps a precomposed static topic string.
	pub const fn from_static(name: &'static str) -> Self {
		Topic(Cow::Borrowed(name))
	}

	/// Composes a topic from a logical group and a member name.
	///
	/// This is the single naming scheme for the whole framework; callers
	/// normally go through a catalog enum instead of calling this directly.
	pub fn named(group: &str, member: &str) -> Self {
		Topic(Cow::Owned(format!("{group}.{member}")))
	}

	/// Returns the topic addressing `path` underneath this channel.
	pub fn scoped(&self, path: &str) -> Topic {
		Topic(Cow::Owned(format!("{}.{path}", self.0)))
	}

	/// The topic as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Topic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Topic {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&'static str> for Topic {
	fn from(name: &'static str) -> Self {
		Topic(Cow::Borrowed(name))
	}
}

impl From<String> for Topic {
	fn from(name: String) -> Self {
		Topic(Cow::Owned(name))
	}
}
