use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use json_render_util::BoundedSet;
use serde_json::{Map, Value};

/// A caller-supplied `$computed` function. Receives the resolved `args`.
pub type ComputedFn = dyn Fn(&Map<String, Value>) -> Value;

/// A validation function: the value under validation and the resolved args.
pub type ValidationFn = dyn Fn(Option<&Value>, &Map<String, Value>) -> bool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Upper bound on distinct warnings one evaluator emits. Once reached,
    /// further unknown names are resolved silently.
    pub max_warnings: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        EvaluatorOptions { max_warnings: 256 }
    }
}

/// Owns the named functions expressions may call and the warning cache.
///
/// Prop resolution lives in [`crate::props`], validation in
/// [`crate::validation`]; both are methods on this type.
pub struct Evaluator {
    computed: HashMap<String, Box<ComputedFn>>,
    validators: HashMap<String, Box<ValidationFn>>,
    warned: RefCell<BoundedSet>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut computed: Vec<_> = self.computed.keys().collect();
        computed.sort();
        let mut validators: Vec<_> = self.validators.keys().collect();
        validators.sort();
        f.debug_struct("Evaluator")
            .field("computed", &computed)
            .field("validators", &validators)
            .field("warned", &self.warned.borrow().len())
            .finish()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::with_options(EvaluatorOptions::default())
    }

    pub fn with_options(options: EvaluatorOptions) -> Self {
        Evaluator {
            computed: HashMap::new(),
            validators: HashMap::new(),
            warned: RefCell::new(BoundedSet::new(options.max_warnings)),
        }
    }

    pub fn with_computed<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Value + 'static,
    {
        self.register_computed(name, f);
        self
    }

    pub fn register_computed<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Map<String, Value>) -> Value + 'static,
    {
        self.computed.insert(name.into(), Box::new(f));
    }

    /// Adds a custom validation function. A custom function shadows the
    /// built-in of the same name.
    pub fn with_validation<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Option<&Value>, &Map<String, Value>) -> bool + 'static,
    {
        self.register_validation(name, f);
        self
    }

    pub fn register_validation<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Option<&Value>, &Map<String, Value>) -> bool + 'static,
    {
        self.validators.insert(name.into(), Box::new(f));
    }

    pub(crate) fn computed_fn(&self, name: &str) -> Option<&ComputedFn> {
        self.computed.get(name).map(|f| f.as_ref())
    }

    pub(crate) fn custom_validation_fn(&self, name: &str) -> Option<&ValidationFn> {
        self.validators.get(name).map(|f| f.as_ref())
    }

    /// Returns `true` the first time `key` is seen, while the cap allows.
    pub(crate) fn should_warn(&self, key: &str) -> bool {
        let mut warned = self.warned.borrow_mut();
        if warned.contains(key) || warned.is_full() {
            return false;
        }
        warned.insert(key)
    }

    /// Number of distinct warnings emitted so far.
    pub fn warning_count(&self) -> usize {
        self.warned.borrow().len()
    }
}
