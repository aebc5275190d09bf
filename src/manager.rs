//! The command manager
//!
//! Owns both adapter registries and the root command table for its
//! lifetime. Registration is fail-fast: the whole command tree is
//! validated against the registries before anything is published, so a
//! bad modifier or a missing adapter can never surface at parse time.
//! Registries are mutated during setup only; steady-state parsing reads
//! them and allocates per-call state, so concurrent `parse` calls are
//! independent once registration has completed.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::{
    AdapterRegistry, BooleanAdapter, FloatAdapter, IntegerAdapter, PrincipalAdapter,
    StringAdapter, SubCommandAdapter, TypeAdapter,
};
use crate::command::CommandNode;
use crate::context::{Principal, ResolutionContext, ResultSet};
use crate::cursor::InputCursor;
use crate::engine;
use crate::error::{RegistrationError, RegistrationResult, ResolveError, ResolveResult};
use crate::modifier::{
    DefaultValueAdapter, DummyModifierAdapter, InjectPrincipalAdapter, ModifierAdapter,
    ModifierKind, ModifierRegistry, OptionalAdapter, RangeAdapter,
};

/// Callback invoked with each newly published command
pub type RegisterListener = Box<dyn Fn(&Arc<CommandNode>) + Send + Sync>;

/// Registry owner and external entry point of the resolution engine
pub struct CommandManager {
    adapters: AdapterRegistry,
    modifiers: ModifierRegistry,
    commands: Vec<Arc<CommandNode>>,
    listeners: Vec<RegisterListener>,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandManager {
    /// New manager with the built-in adapter set installed
    pub fn new() -> Self {
        let mut manager = Self {
            adapters: AdapterRegistry::new(),
            modifiers: ModifierRegistry::new(),
            commands: Vec::new(),
            listeners: Vec::new(),
        };
        manager.register_defaults();
        manager
    }

    fn register_defaults(&mut self) {
        self.register_type_adapter(Arc::new(BooleanAdapter));
        self.register_type_adapter(Arc::new(IntegerAdapter));
        self.register_type_adapter(Arc::new(FloatAdapter));
        self.register_type_adapter(Arc::new(StringAdapter));
        self.register_type_adapter(Arc::new(PrincipalAdapter));
        self.register_type_adapter(Arc::new(SubCommandAdapter));

        self.register_modifier_adapter(Arc::new(DefaultValueAdapter));
        self.register_modifier_adapter(Arc::new(RangeAdapter));
        self.register_modifier_adapter(Arc::new(OptionalAdapter));
        self.register_modifier_adapter(Arc::new(InjectPrincipalAdapter));
        self.register_modifier_adapter(Arc::new(DummyModifierAdapter::new(
            ModifierKind::Remainder,
        )));
    }

    /// Register a type adapter; a duplicate tag overwrites
    pub fn register_type_adapter(&mut self, adapter: Arc<dyn TypeAdapter>) {
        self.adapters.register(adapter);
    }

    /// Register a modifier handler; a duplicate kind overwrites
    pub fn register_modifier_adapter(&mut self, adapter: Arc<dyn ModifierAdapter>) {
        self.modifiers.register(adapter);
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    pub fn modifiers(&self) -> &ModifierRegistry {
        &self.modifiers
    }

    /// Add a listener fired for every command published after this call
    pub fn on_register(&mut self, listener: impl Fn(&Arc<CommandNode>) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// All registered commands, in registration order
    pub fn commands(&self) -> &[Arc<CommandNode>] {
        &self.commands
    }

    /// Look up a command by name or alias, case-insensitively
    pub fn command(&self, alias: &str) -> Option<&Arc<CommandNode>> {
        self.commands.iter().find(|c| c.matches_alias(alias))
    }

    /// Validate and publish a command tree. Fails fast: nothing is
    /// published unless the node and all of its descendants pass.
    pub fn register(&mut self, node: CommandNode) -> RegistrationResult<()> {
        if let Some(existing) = self.command(node.name()) {
            return Err(RegistrationError::DuplicateAlias {
                alias: node.name().to_string(),
                existing: existing.name().to_string(),
            });
        }
        for alias in node.aliases() {
            if let Some(existing) = self.command(alias) {
                return Err(RegistrationError::DuplicateAlias {
                    alias: alias.clone(),
                    existing: existing.name().to_string(),
                });
            }
        }
        self.validate_node(&node)?;

        let node = Arc::new(node);
        debug!(command = node.name(), "command registered");
        for listener in &self.listeners {
            listener(&node);
        }
        self.commands.push(node);
        Ok(())
    }

    /// Log-and-continue variant of `register`, for batch registration
    pub fn register_safe(&mut self, node: CommandNode) {
        let name = node.name().to_string();
        if let Err(err) = self.register(node) {
            warn!(command = %name, error = %err, "command registration skipped");
        }
    }

    fn validate_node(&self, node: &CommandNode) -> RegistrationResult<()> {
        for param in node.params() {
            if param.is_syntax() && self.adapters.lookup(param.ty()).is_none() {
                return Err(RegistrationError::NoAdapterFound {
                    parameter: param.name().to_string(),
                    requested: format!("type '{}'", param.ty()),
                });
            }
            for modifier in param.modifiers() {
                let handler = self.modifiers.lookup(&modifier.kind).ok_or_else(|| {
                    RegistrationError::NoAdapterFound {
                        parameter: param.name().to_string(),
                        requested: format!("modifier '{}'", modifier.kind),
                    }
                })?;
                handler.validate(param)?;
            }
        }
        // Sub-command aliases are scoped to the parent node, not the
        // manager table, so children only need structural validation.
        for child in node.children() {
            self.validate_node(child)?;
        }
        Ok(())
    }

    /// Resolve a raw input line into a typed result set.
    /// The line starts with the command alias, followed by its arguments
    /// separated by whitespace.
    pub fn parse(&self, principal: &Principal, input: &str) -> ResolveResult<ResultSet> {
        let trimmed = input.trim_start();
        // The cursor skips leading whitespace itself, so the split point
        // can safely sit on the first whitespace character.
        let (alias, args) = match trimmed.find(char::is_whitespace) {
            Some(split) => trimmed.split_at(split),
            None => (trimmed, ""),
        };
        let node = self
            .command(alias)
            .ok_or_else(|| ResolveError::UnknownCommand {
                alias: alias.to_string(),
            })?;
        debug!(command = node.name(), principal = principal.name(), "parse");

        let ctx = ResolutionContext::new(principal.clone(), input.to_string(), node.clone());
        let mut cursor = InputCursor::new(args);
        engine::resolve(&self.adapters, &self.modifiers, ctx, &mut cursor)
    }
}
