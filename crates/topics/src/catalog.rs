//! The default topic catalog.
//!
//! These are the well-known channels spoken by the state store and the
//! peripheral UI glue (navigation handlers, processor registries). Keeping
//! them in one place means no component ever hand-writes a topic string.

use crate::topics;

topics! {
	/// Screen-navigation and window-management channels.
	///
	/// Consumed by the application shell; the core only reserves the names.
	pub enum NavigateTopic("Navigate") {
		/// Swap the active root container.
		SwitchContainer => "switch_container",
		/// Swap the content of a named template slot.
		SwitchSlot => "switch_slot",
		/// Open (or re-focus) a subwindow.
		OpenSubwindow => "open_subwindow",
		/// Close one subwindow by id.
		CloseSubwindow => "close_subwindow",
		/// Close every open subwindow.
		CloseAllSubwindows => "close_all_subwindows",
	}
}

topics! {
	/// State mutation requests and change notifications.
	///
	/// The request channels (`update_state`, `add_to_list`, `add_to_dict`,
	/// `replace_state`) are subscribed by the store; the notification
	/// channels are published by it, scoped by state path.
	pub enum UpdateTopic("Update") {
		/// Request: assign a new value at a state path.
		UpdateState => "update_state",
		/// Request: append an item to the sequence at a state path.
		AddToList => "add_to_list",
		/// Request: insert a key/value pair into the mapping at a state path.
		AddToDict => "add_to_dict",
		/// Request: replace the whole state object.
		ReplaceState => "replace_state",
		/// Notification: a value changed; payload carries old and new value.
		StateChanged => "state_changed",
		/// Notification: an item was appended; payload carries item and index.
		StateAdded => "state_added",
		/// Notification: something under the path changed; no payload.
		StateUpdated => "state_updated",
		/// Notification: a mapping gained a key; payload carries key and value.
		DictAdded => "dict_added",
	}
}

topics! {
	/// Processor lifecycle channels.
	///
	/// Consumed by the application shell's processor registry.
	pub enum ProcessorTopic("Processor") {
		/// Register a processor under a name.
		RegisterProcessor => "register_processor",
		/// Remove a processor by name.
		DeleteProcessor => "delete_processor",
	}
}

topics! {
	/// Undo/redo control and status channels.
	pub enum UndoTopic("Undo") {
		/// Request: start tracking history for a state path.
		EnableUndoRedo => "enable_undo_redo",
		/// Request: stop tracking and discard history for a state path.
		DisableUndoRedo => "disable_undo_redo",
		/// Request: restore the previous value at a state path.
		Undo => "undo",
		/// Request: reapply the last undone value at a state path.
		Redo => "redo",
		/// Notification: history availability changed for a state path.
		StatusChanged => "status_changed",
	}
}
