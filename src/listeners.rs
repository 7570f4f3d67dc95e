use core::{fmt::Debug, hash::Hash};
use hashbrown::HashMap;
use tracing::trace;

/// Owned event listeners, at most one per key.
///
/// A listener `L` is expected to detach itself when dropped (like [`gloo_events::EventListener`]),
/// so a listener is attached exactly as long as it is held here.
///
/// [`gloo_events::EventListener`]: https://docs.rs/gloo-events/0.2/gloo_events/struct.EventListener.html
#[derive(Debug)]
pub struct ListenerSlots<K: Hash + Eq, L>(HashMap<K, L>);

impl<K: Debug + Hash + Eq, L> Default for ListenerSlots<K, L> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K: Debug + Hash + Eq, L> ListenerSlots<K, L> {
	#[must_use]
	pub fn new() -> Self {
		Self(HashMap::new())
	}

	/// Detaches the listener bound to `key` (if any), **then** attaches a new one.
	///
	/// `attach` runs only after the previous listener is gone, so two listeners for the same key never coexist.
	pub fn rebind(&mut self, key: K, attach: impl FnOnce() -> L) -> &mut L {
		if self.0.remove(&key).is_some() {
			trace!(?key, "Detached listener.");
		}
		let listener = attach();
		trace!(?key, "Attached listener.");
		self.0.entry(key).or_insert(listener)
	}

	/// Detaches the listener bound to `key`.
	///
	/// Returns whether there was one.
	pub fn unbind(&mut self, key: &K) -> bool {
		let removed = self.0.remove(key).is_some();
		if removed {
			trace!(?key, "Detached listener.");
		}
		removed
	}
}
