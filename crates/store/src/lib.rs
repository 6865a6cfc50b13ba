//! Typed reactive state store with path-addressed mutation, change
//! notification and undo/redo.
//!
//! An application declares one plain state struct, hands ownership to a
//! [`Store`], and mutates it exclusively through dotted-path operations
//! (`update_state`, `add_to_list`, `add_to_dict`, `replace_state`). Every
//! successful mutation publishes two notifications on the bus, scoped by
//! the mutated path: a detailed one carrying the old and new value, and a
//! payload-free one for plain re-render subscribers. Undo and redo are
//! per-path, opt-in, and drive the same mutation path, so subscribers never
//! need to distinguish a user edit from a restore.
//!
//! ```
//! use axon_bus::Bus;
//! use axon_store::Store;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct AppState {
//! 	counter: i64,
//! }
//!
//! # fn main() -> axon_store::Result<()> {
//! let bus = Bus::new();
//! let mut store = Store::<AppState>::new(bus.clone())?;
//! bus.subscribe("Update.state_updated.counter", |_| {
//! 	// re-render
//! });
//!
//! store.enable_undo_redo("counter", 10);
//! store.update_state("counter", 1)?;
//! store.update_state("counter", 2)?;
//! assert_eq!(store.get_current_state().counter, 2);
//!
//! store.undo("counter")?;
//! assert_eq!(store.get_current_state().counter, 1);
//! # Ok(())
//! # }
//! ```
//!
//! External readers only ever receive deep copies
//! ([`Store::get_current_state`]); the four mutation operations (plus
//! undo/redo, which wrap them) are the only ways state changes. For
//! bus-driven or multi-threaded use, [`bind`] creates the process-wide
//! [`SharedStore`] for a state type and fails loudly on a second bind.

mod client;
mod error;
mod history;
mod model;
pub mod path;
mod proxy;
mod shared;
mod store;

pub use client::StoreClient;
pub use error::{Result, StoreError};
pub use history::{DEFAULT_MAX_HISTORY, UndoStatus};
pub use model::StateModel;
pub use proxy::StatePath;
pub use shared::{SharedStore, bind};
pub use store::Store;
