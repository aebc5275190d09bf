//! Parameter modifiers and their handlers
//!
//! A `Modifier` is declarative metadata attached to exactly one parameter
//! and interpreted by exactly one registered `ModifierAdapter`. Handlers
//! check compatibility at registration time and transform or validate the
//! resolved value at parse time. Marker-only kinds (the remainder marker)
//! use `DummyModifierAdapter`, which is always compatible and transforms
//! nothing; the marker is read directly by the string adapter.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::ParamSpec;
use crate::context::ResolutionContext;
use crate::error::{RegistrationError, RegistrationResult, ResolveError, ResolveResult};
use crate::value::{TypeTag, Value};

// =============================================================================
// MODIFIER DESCRIPTOR
// =============================================================================

/// Modifier kinds; built-in handlers cover the closed variants and hosts
/// register their own handlers under `Custom` names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Substitute a declared payload when the value is absent
    DefaultValue,
    /// Inclusive numeric bounds check
    Range,
    /// Marks the parameter as satisfiable by absence
    Optional,
    /// Marker: the parameter greedily consumes the rest of the line
    Remainder,
    /// Populate the parameter with the invoking principal, consuming no input
    InjectPrincipal,
    /// Host-defined kind, dispatched to a user-registered handler
    Custom(String),
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierKind::DefaultValue => write!(f, "default"),
            ModifierKind::Range => write!(f, "range"),
            ModifierKind::Optional => write!(f, "optional"),
            ModifierKind::Remainder => write!(f, "remainder"),
            ModifierKind::InjectPrincipal => write!(f, "inject-principal"),
            ModifierKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// A declarative modifier tag with fixed payload slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    /// Text payload (default string value, choice name, ...)
    pub text: Option<String>,
    /// Numeric payload; lower bound for `Range`
    pub number: Option<f64>,
    /// Upper bound for `Range`
    pub upper: Option<f64>,
    /// Boolean payload (default flag value)
    pub flag: Option<bool>,
}

impl Modifier {
    fn bare(kind: ModifierKind) -> Self {
        Self {
            kind,
            text: None,
            number: None,
            upper: None,
            flag: None,
        }
    }

    /// Inclusive numeric bounds
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            number: Some(min),
            upper: Some(max),
            ..Self::bare(ModifierKind::Range)
        }
    }

    /// Lower bound only
    pub fn at_least(min: f64) -> Self {
        Self {
            number: Some(min),
            ..Self::bare(ModifierKind::Range)
        }
    }

    /// Upper bound only
    pub fn at_most(max: f64) -> Self {
        Self {
            upper: Some(max),
            ..Self::bare(ModifierKind::Range)
        }
    }

    /// Default text payload, used when the value is absent
    pub fn default_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::bare(ModifierKind::DefaultValue)
        }
    }

    /// Default numeric payload, coerced to the parameter's tag
    pub fn default_number(number: f64) -> Self {
        Self {
            number: Some(number),
            ..Self::bare(ModifierKind::DefaultValue)
        }
    }

    /// Default boolean payload
    pub fn default_flag(flag: bool) -> Self {
        Self {
            flag: Some(flag),
            ..Self::bare(ModifierKind::DefaultValue)
        }
    }

    /// Absence is acceptable for this parameter
    pub fn optional() -> Self {
        Self::bare(ModifierKind::Optional)
    }

    /// Consume the rest of the input line instead of a single token
    pub fn remainder() -> Self {
        Self::bare(ModifierKind::Remainder)
    }

    /// Fill the parameter with the invoking principal
    pub fn inject_principal() -> Self {
        Self::bare(ModifierKind::InjectPrincipal)
    }

    /// Host-defined kind; payload slots are public for the host's handler
    pub fn custom(name: impl Into<String>) -> Self {
        Self::bare(ModifierKind::Custom(name.into()))
    }
}

// =============================================================================
// HANDLER TRAIT + REGISTRY
// =============================================================================

/// Handler for one modifier kind
///
/// `validate` runs at registration time and must reject incompatible
/// parameter types there, never at parse time. `out_of_syntax` may supply
/// a value without consuming input; `apply` transforms or rejects the
/// current value. Returning `None` from `apply` means "no opinion" and
/// leaves the current value in place.
pub trait ModifierAdapter: Send + Sync {
    fn kind(&self) -> ModifierKind;

    fn validate(&self, _param: &ParamSpec) -> RegistrationResult<()> {
        Ok(())
    }

    fn out_of_syntax(
        &self,
        _modifier: &Modifier,
        _param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> Option<Value> {
        None
    }

    fn apply(
        &self,
        _value: Option<&Value>,
        _modifier: &Modifier,
        _param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        Ok(None)
    }
}

/// Registry of modifier handlers, one per kind
#[derive(Default)]
pub struct ModifierRegistry {
    handlers: HashMap<ModifierKind, Arc<dyn ModifierAdapter>>,
}

impl ModifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; a duplicate kind overwrites the previous handler
    pub fn register(&mut self, adapter: Arc<dyn ModifierAdapter>) {
        let kind = adapter.kind();
        if self.handlers.insert(kind.clone(), adapter).is_some() {
            debug!(%kind, "modifier handler overwritten");
        }
    }

    pub fn lookup(&self, kind: &ModifierKind) -> Option<Arc<dyn ModifierAdapter>> {
        self.handlers.get(kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

// =============================================================================
// BUILT-IN HANDLERS
// =============================================================================

/// Always-compatible identity handler for marker-only kinds
pub struct DummyModifierAdapter {
    kind: ModifierKind,
}

impl DummyModifierAdapter {
    pub fn new(kind: ModifierKind) -> Self {
        Self { kind }
    }
}

impl ModifierAdapter for DummyModifierAdapter {
    fn kind(&self) -> ModifierKind {
        self.kind.clone()
    }
}

/// Substitutes the declared payload when the resolved value is absent.
/// The payload is coerced to the parameter's tag; slots the tag cannot
/// cover contribute nothing.
pub struct DefaultValueAdapter;

impl DefaultValueAdapter {
    fn coerce(modifier: &Modifier, tag: &TypeTag) -> Option<Value> {
        match tag {
            TypeTag::String | TypeTag::Named(_) => {
                modifier.text.clone().map(Value::String)
            }
            TypeTag::Integer => modifier.number.map(|n| Value::Integer(n as i64)),
            TypeTag::Float => modifier.number.map(Value::Float),
            TypeTag::Boolean => modifier.flag.map(Value::Boolean),
            TypeTag::Principal | TypeTag::Command => None,
        }
    }
}

impl ModifierAdapter for DefaultValueAdapter {
    fn kind(&self) -> ModifierKind {
        ModifierKind::DefaultValue
    }

    fn apply(
        &self,
        value: Option<&Value>,
        modifier: &Modifier,
        param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        if value.is_some() {
            return Ok(None);
        }
        let substituted = Self::coerce(modifier, param.ty());
        if let Some(v) = &substituted {
            debug!(parameter = param.name(), value = %v, "substituted default value");
        }
        Ok(substituted)
    }
}

/// Inclusive numeric bounds check; values strictly outside reject
pub struct RangeAdapter;

impl RangeAdapter {
    fn describe(modifier: &Modifier) -> String {
        match (modifier.number, modifier.upper) {
            (Some(min), Some(max)) => format!("must be between {} and {}", min, max),
            (Some(min), None) => format!("must be at least {}", min),
            (None, Some(max)) => format!("must be at most {}", max),
            (None, None) => "must be a bounded number".to_string(),
        }
    }
}

impl ModifierAdapter for RangeAdapter {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Range
    }

    fn validate(&self, param: &ParamSpec) -> RegistrationResult<()> {
        match param.ty() {
            TypeTag::Integer | TypeTag::Float => Ok(()),
            other => Err(RegistrationError::IncompatibleModifier {
                kind: self.kind().to_string(),
                parameter: param.name().to_string(),
                reason: format!("bounds apply to numeric parameters, not {}", other),
            }),
        }
    }

    fn apply(
        &self,
        value: Option<&Value>,
        modifier: &Modifier,
        param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        let Some(value) = value else {
            return Ok(None);
        };
        let n = value
            .as_number()
            .ok_or_else(|| ResolveError::InvalidArgument {
                parameter: param.name().to_string(),
                reason: format!("'{}' is not numeric", value),
            })?;
        let below = modifier.number.is_some_and(|min| n < min);
        let above = modifier.upper.is_some_and(|max| n > max);
        if below || above {
            return Err(ResolveError::InvalidArgument {
                parameter: param.name().to_string(),
                reason: Self::describe(modifier),
            });
        }
        Ok(None)
    }
}

/// Marks absence as acceptable; pure registration-time semantics
/// (`ParamSpec::with_modifier` relaxes the required/nullable flags)
pub struct OptionalAdapter;

impl ModifierAdapter for OptionalAdapter {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Optional
    }
}

/// Supplies the invoking principal without consuming a token
pub struct InjectPrincipalAdapter;

impl ModifierAdapter for InjectPrincipalAdapter {
    fn kind(&self) -> ModifierKind {
        ModifierKind::InjectPrincipal
    }

    fn validate(&self, param: &ParamSpec) -> RegistrationResult<()> {
        match param.ty() {
            TypeTag::Principal => Ok(()),
            other => Err(RegistrationError::IncompatibleModifier {
                kind: self.kind().to_string(),
                parameter: param.name().to_string(),
                reason: format!(
                    "only principal-typed parameters can be injected, not {}",
                    other
                ),
            }),
        }
    }

    fn out_of_syntax(
        &self,
        _modifier: &Modifier,
        _param: &ParamSpec,
        ctx: &ResolutionContext,
    ) -> Option<Value> {
        Some(Value::Principal(ctx.principal().clone()))
    }
}
