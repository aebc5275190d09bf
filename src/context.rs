//! Per-invocation resolution state and the resolved argument set
//!
//! A `ResolutionContext` is created once per `parse` call and discarded
//! afterwards. It carries the invoking principal, the raw input line, the
//! currently-active command node (reassigned on sub-command descent), and
//! the accumulated `ResultSet`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::command::{CommandNode, ParamSpec};
use crate::value::Value;

/// The invoking principal (user, console, plugin, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    name: String,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One resolved `(parameter, value)` entry; the value is absent for
/// nullable parameters that nothing covered
#[derive(Debug, Clone)]
pub struct ResolvedArg {
    param: ParamSpec,
    value: Option<Value>,
}

impl ResolvedArg {
    pub fn param(&self) -> &ParamSpec {
        &self.param
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

/// Ordered, read-only mapping of resolved parameters to final values.
/// Insertion order equals resolution order.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: Vec<ResolvedArg>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedArg> {
        self.entries.iter()
    }

    /// Entry by parameter name
    pub fn entry(&self, name: &str) -> Option<&ResolvedArg> {
        self.entries.iter().find(|e| e.param.name() == name)
    }

    /// Resolved value by parameter name; `None` for unknown parameters
    /// and for nullable parameters resolved to absence alike
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.entry(name).and_then(|e| e.value.as_ref())
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.value(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.value(name) {
            Some(Value::Float(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.value(name) {
            Some(Value::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.value(name) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn command(&self, name: &str) -> Option<&Arc<CommandNode>> {
        match self.value(name) {
            Some(Value::Command(node)) => Some(node),
            _ => None,
        }
    }

    pub fn principal(&self, name: &str) -> Option<&Principal> {
        match self.value(name) {
            Some(Value::Principal(p)) => Some(p),
            _ => None,
        }
    }
}

/// Mutable state threaded through one resolution walk
pub struct ResolutionContext {
    principal: Principal,
    raw_input: String,
    active: Arc<CommandNode>,
    results: ResultSet,
}

impl ResolutionContext {
    pub fn new(principal: Principal, raw_input: String, active: Arc<CommandNode>) -> Self {
        Self {
            principal,
            raw_input,
            active,
            results: ResultSet::default(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// The node currently being resolved; reassigned on descent
    pub fn active(&self) -> &Arc<CommandNode> {
        &self.active
    }

    pub(crate) fn set_active(&mut self, node: Arc<CommandNode>) {
        self.active = node;
    }

    pub(crate) fn record(&mut self, param: &ParamSpec, value: Option<Value>) {
        self.results.entries.push(ResolvedArg {
            param: param.clone(),
            value,
        });
    }

    pub(crate) fn into_results(self) -> ResultSet {
        self.results
    }
}
