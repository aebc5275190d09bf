//! Command nodes and parameter descriptors
//!
//! A `CommandNode` is a named, ordered list of parameter descriptors; a
//! parameter declared with `TypeTag::Command` resolves (at parse time)
//! into one of the node's children, switching the resolver onto that
//! child's own parameter list. Descriptors are constructed explicitly by
//! the registration collaborator; the engine never inspects live code
//! structures.

use std::fmt;
use std::sync::Arc;

use crate::context::Principal;
use crate::modifier::{Modifier, ModifierKind};
use crate::value::{TypeTag, Value};

/// Use-validation hook, owned by the host (permission/availability policy)
pub type Guard = Arc<dyn Fn(&Principal) -> bool + Send + Sync>;

// =============================================================================
// PARAMETER DESCRIPTOR
// =============================================================================

/// Static per-parameter metadata, immutable once the command is registered
#[derive(Clone)]
pub struct ParamSpec {
    name: String,
    ty: TypeTag,
    modifiers: Vec<Modifier>,
    required: bool,
    nullable: bool,
    /// True if the parameter consumes a token from input; false if its
    /// value comes purely from a modifier
    syntax: bool,
    default: Option<Value>,
}

impl ParamSpec {
    /// New required, non-nullable, syntax-bearing parameter
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Vec::new(),
            required: true,
            nullable: false,
            syntax: true,
            default: None,
        }
    }

    /// Attach a modifier. Attachment order is preserved and equals the
    /// order transforms run at resolution time. Some kinds also adjust
    /// the descriptor flags: `Optional` relaxes required/nullable,
    /// `InjectPrincipal` makes the parameter non-syntax-bearing.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        match &modifier.kind {
            ModifierKind::Optional => {
                self.required = false;
                self.nullable = true;
            }
            ModifierKind::InjectPrincipal => {
                self.syntax = false;
            }
            _ => {}
        }
        self.modifiers.push(modifier);
        self
    }

    /// Declared fallback used when no input remains
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Absence resolves to an empty entry instead of an error
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The parameter may be omitted entirely
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// The value never consumes a token from input
    pub fn non_syntax(mut self) -> Self {
        self.syntax = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeTag {
        &self.ty
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_syntax(&self) -> bool {
        self.syntax
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// True if any attached modifier has the given kind
    pub fn has_modifier(&self, kind: &ModifierKind) -> bool {
        self.modifiers.iter().any(|m| &m.kind == kind)
    }
}

impl fmt::Debug for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSpec")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("modifiers", &self.modifiers)
            .field("required", &self.required)
            .field("nullable", &self.nullable)
            .field("syntax", &self.syntax)
            .finish()
    }
}

// =============================================================================
// COMMAND NODE
// =============================================================================

/// A named unit of parameters, optionally with sub-commands and a guard
#[derive(Clone)]
pub struct CommandNode {
    name: String,
    aliases: Vec<String>,
    params: Vec<ParamSpec>,
    children: Vec<Arc<CommandNode>>,
    guard: Option<Guard>,
}

impl CommandNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            params: Vec::new(),
            children: Vec::new(),
            guard: None,
        }
    }

    /// Add an alias; stored lowercase, matched case-insensitively
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into().to_lowercase());
        self
    }

    /// Append a parameter; declaration order is resolution order
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Add a sub-command, resolvable through a `TypeTag::Command` parameter
    pub fn with_child(mut self, child: CommandNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Install the use-validation hook run before parameter resolution
    pub fn with_guard(mut self, guard: impl Fn(&Principal) -> bool + Send + Sync + 'static) -> Self {
        self.guard = Some(Arc::new(guard));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn children(&self) -> &[Arc<CommandNode>] {
        &self.children
    }

    /// Case-insensitive match against the node's name or any alias
    pub fn matches_alias(&self, alias: &str) -> bool {
        self.name.eq_ignore_ascii_case(alias)
            || self.aliases.iter().any(|a| a == &alias.to_lowercase())
    }

    /// Find a direct child by name or alias
    pub fn find_child(&self, alias: &str) -> Option<&Arc<CommandNode>> {
        self.children.iter().find(|c| c.matches_alias(alias))
    }

    /// Run the use-validation hook; nodes without a guard accept everyone
    pub fn allows(&self, principal: &Principal) -> bool {
        self.guard.as_ref().map_or(true, |g| g(principal))
    }
}

impl fmt::Debug for CommandNode {
    // guard is a closure and has no useful Debug form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("params", &self.params)
            .field("children", &self.children)
            .finish()
    }
}
