//! Type adapters and their registry
//!
//! A `TypeAdapter` converts tokens into typed values (and back to text).
//! The registry resolves a requested tag exact-first, then scans adapters
//! in registration order for the first whose declared capability relation
//! (`accepts`) admits the tag. First-registered-eligible-wins is the
//! intentional, documented tie-break; registration order is the only
//! control the caller has over loose matches.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::command::ParamSpec;
use crate::context::{Principal, ResolutionContext};
use crate::cursor::InputCursor;
use crate::error::{ResolveError, ResolveResult};
use crate::modifier::ModifierKind;
use crate::value::{TypeTag, Value};

// =============================================================================
// TRAIT + REGISTRY
// =============================================================================

/// Parser/formatter pair for one target type
pub trait TypeAdapter: Send + Sync {
    /// The tag this adapter registers under
    fn tag(&self) -> TypeTag;

    /// Capability relation for fallback lookup; defaults to the exact tag
    fn accepts(&self, tag: &TypeTag) -> bool {
        *tag == self.tag()
    }

    /// Consume one token (or the remainder) and produce a value.
    /// `Ok(None)` means the adapter declined without consuming input.
    fn parse(
        &self,
        cursor: &mut InputCursor<'_>,
        param: &ParamSpec,
        ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>>;

    /// Canonical text form; `parse(format(v))` round-trips
    fn format(&self, value: &Value) -> String {
        value.to_string()
    }
}

/// Registry of type adapters, keyed by tag with an ordered capability scan
#[derive(Default)]
pub struct AdapterRegistry {
    exact: HashMap<TypeTag, Arc<dyn TypeAdapter>>,
    /// First-registration order of tags, for the fallback scan
    order: Vec<TypeTag>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its declared tag; re-registering a tag
    /// overwrites the previous adapter but keeps its scan position
    pub fn register(&mut self, adapter: Arc<dyn TypeAdapter>) {
        let tag = adapter.tag();
        if self.exact.insert(tag.clone(), adapter).is_some() {
            debug!(%tag, "type adapter overwritten");
        } else {
            self.order.push(tag);
        }
    }

    /// Exact match first, then first registered adapter whose capability
    /// relation admits the tag. `None` is a registration-time
    /// configuration error for syntax-bearing parameters, never a
    /// parse-time failure.
    pub fn lookup(&self, tag: &TypeTag) -> Option<Arc<dyn TypeAdapter>> {
        if let Some(adapter) = self.exact.get(tag) {
            return Some(adapter.clone());
        }
        self.order
            .iter()
            .filter_map(|t| self.exact.get(t))
            .find(|adapter| adapter.accepts(tag))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

// =============================================================================
// BUILT-IN ADAPTERS
// =============================================================================

/// Whole numbers, base 10
pub struct IntegerAdapter;

impl TypeAdapter for IntegerAdapter {
    fn tag(&self) -> TypeTag {
        TypeTag::Integer
    }

    fn parse(
        &self,
        cursor: &mut InputCursor<'_>,
        _param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        let position = cursor.position();
        let token = cursor.read_token()?;
        let parsed = token
            .parse::<i64>()
            .map_err(|_| ResolveError::ParseError {
                token: token.to_string(),
                position,
                expected: "an integer".to_string(),
            })?;
        Ok(Some(Value::Integer(parsed)))
    }
}

/// Floating-point numbers; also serves integer-tagged parameters when no
/// exact integer adapter is registered (capability superset)
pub struct FloatAdapter;

impl TypeAdapter for FloatAdapter {
    fn tag(&self) -> TypeTag {
        TypeTag::Float
    }

    fn accepts(&self, tag: &TypeTag) -> bool {
        matches!(tag, TypeTag::Float | TypeTag::Integer)
    }

    fn parse(
        &self,
        cursor: &mut InputCursor<'_>,
        param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        let position = cursor.position();
        let token = cursor.read_token()?;
        let parsed = token
            .parse::<f64>()
            .map_err(|_| ResolveError::ParseError {
                token: token.to_string(),
                position,
                expected: "a number".to_string(),
            })?;
        // Shape the value to the declared tag when serving a fallback match.
        if *param.ty() == TypeTag::Integer {
            return Ok(Some(Value::Integer(parsed as i64)));
        }
        Ok(Some(Value::Float(parsed)))
    }
}

/// `true`/`false`, case-insensitive
pub struct BooleanAdapter;

impl TypeAdapter for BooleanAdapter {
    fn tag(&self) -> TypeTag {
        TypeTag::Boolean
    }

    fn parse(
        &self,
        cursor: &mut InputCursor<'_>,
        _param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        let position = cursor.position();
        let token = cursor.read_token()?;
        match token.to_ascii_lowercase().as_str() {
            "true" => Ok(Some(Value::Boolean(true))),
            "false" => Ok(Some(Value::Boolean(false))),
            _ => Err(ResolveError::ParseError {
                token: token.to_string(),
                position,
                expected: "'true' or 'false'".to_string(),
            }),
        }
    }
}

/// One token, or the rest of the line when the remainder marker modifier
/// is attached to the parameter
pub struct StringAdapter;

impl TypeAdapter for StringAdapter {
    fn tag(&self) -> TypeTag {
        TypeTag::String
    }

    fn parse(
        &self,
        cursor: &mut InputCursor<'_>,
        param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        let token = if param.has_modifier(&ModifierKind::Remainder) {
            cursor.read_remainder()?
        } else {
            cursor.read_token()?
        };
        Ok(Some(Value::String(token.to_string())))
    }
}

/// A principal named by a token (e.g. a target player)
pub struct PrincipalAdapter;

impl TypeAdapter for PrincipalAdapter {
    fn tag(&self) -> TypeTag {
        TypeTag::Principal
    }

    fn parse(
        &self,
        cursor: &mut InputCursor<'_>,
        _param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        let token = cursor.read_token()?;
        Ok(Some(Value::Principal(Principal::new(token))))
    }
}

/// Resolves a token against the active node's children, producing the
/// nested command node that the engine then descends into
pub struct SubCommandAdapter;

impl TypeAdapter for SubCommandAdapter {
    fn tag(&self) -> TypeTag {
        TypeTag::Command
    }

    fn parse(
        &self,
        cursor: &mut InputCursor<'_>,
        _param: &ParamSpec,
        ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        let position = cursor.position();
        let token = cursor.read_token()?;
        let active = ctx.active();
        match active.find_child(token) {
            Some(child) => {
                debug!(parent = active.name(), child = child.name(), "descending into sub-command");
                Ok(Some(Value::Command(child.clone())))
            }
            None => Err(ResolveError::ParseError {
                token: token.to_string(),
                position,
                expected: format!("a sub-command of '{}'", active.name()),
            }),
        }
    }
}

/// Host-defined choice type: one token matched case-insensitively against
/// a fixed variant list, registered under `TypeTag::Named`
pub struct ChoiceAdapter {
    name: String,
    variants: Vec<String>,
}

impl ChoiceAdapter {
    pub fn new(name: impl Into<String>, variants: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

impl TypeAdapter for ChoiceAdapter {
    fn tag(&self) -> TypeTag {
        TypeTag::Named(self.name.clone())
    }

    fn parse(
        &self,
        cursor: &mut InputCursor<'_>,
        _param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        let position = cursor.position();
        let token = cursor.read_token()?;
        let canonical = self
            .variants
            .iter()
            .find(|v| v.eq_ignore_ascii_case(token));
        match canonical {
            Some(v) => Ok(Some(Value::String(v.clone()))),
            None => Err(ResolveError::ParseError {
                token: token.to_string(),
                position,
                expected: format!("one of {}", self.variants.join("|")),
            }),
        }
    }
}
