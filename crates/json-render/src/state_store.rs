//! The state model elements read from and write back to.
//!
//! The store hands out `Arc` snapshots of a [`StateNode`] tree. A write copies
//! only the containers on its path, so a snapshot somebody still holds never
//! mutates under its holder and shares every untouched branch with the new
//! one. Writes that change nothing keep the current snapshot and notify
//! nobody.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use json_render_expression::{ActionDispatcher, StateRead};
use json_render_json_pointer::parse_json_pointer;
use serde_json::{json, Value};
use tracing::debug;

use crate::state_tree::StateNode;

type Listener = Rc<dyn Fn(&StateNode)>;
type Listeners = RefCell<Vec<(usize, Listener)>>;

pub struct StateStore {
    snapshot: Arc<StateNode>,
    listeners: Rc<Listeners>,
    next_listener: Cell<usize>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(json!({}))
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("snapshot", &self.snapshot)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl StateStore {
    pub fn new(initial: Value) -> Self {
        Self {
            snapshot: Arc::new(StateNode::from(initial)),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Cell::new(0),
        }
    }

    /// Reads the value at `pointer` in the current snapshot.
    pub fn get(&self, pointer: &str) -> Option<Value> {
        self.snapshot.read(pointer).map(Cow::into_owned)
    }

    /// The current snapshot. It stays unchanged however the store is written
    /// to afterwards.
    pub fn get_snapshot(&self) -> Arc<StateNode> {
        Arc::clone(&self.snapshot)
    }

    pub fn state(&self) -> &StateNode {
        &self.snapshot
    }

    /// Writes one value. Returns whether anything changed.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use json_render::StateStore;
    /// use serde_json::json;
    ///
    /// let mut store = StateStore::new(json!({"count": 1}));
    /// let before = store.get_snapshot();
    /// assert!(!store.set("/count", json!(1)));
    /// assert!(Arc::ptr_eq(&before, &store.get_snapshot()));
    ///
    /// assert!(store.set("/count", json!(2)));
    /// assert!(!Arc::ptr_eq(&before, &store.get_snapshot()));
    /// assert_eq!(*before, json!({"count": 1}));
    /// ```
    pub fn set(&mut self, pointer: &str, value: Value) -> bool {
        self.update([(pointer, value)])
    }

    /// Writes several values and notifies at most once. The outcome is
    /// judged on the state after all writes, so a batch that ends where it
    /// started, or writes nothing that lands, changes nothing.
    pub fn update<I, K>(&mut self, updates: I) -> bool
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let before = Arc::clone(&self.snapshot);
        for (pointer, value) in updates {
            let path = parse_json_pointer(pointer.as_ref());
            Arc::make_mut(&mut self.snapshot).set(&path, value);
        }
        if *self.snapshot == *before {
            self.snapshot = before;
            return false;
        }
        self.notify();
        true
    }

    /// Registers a listener called with the new state after every change.
    /// Calling the returned closure removes it.
    pub fn subscribe<F>(&self, listener: F) -> impl FnOnce() + 'static
    where
        F: Fn(&StateNode) + 'static,
    {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        let listeners = Rc::downgrade(&self.listeners);
        move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn notify(&self) {
        // Listeners may subscribe or unsubscribe while being called.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        debug!(listeners = listeners.len(), "state changed");
        for listener in listeners {
            listener(self.snapshot.as_ref());
        }
    }
}

impl ActionDispatcher for StateStore {
    fn set_state(&mut self, pointer: &str, value: Value) {
        self.set(pointer, value);
    }
}
