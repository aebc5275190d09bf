//! cmd-core: typed command-line resolution engine
//!
//! Resolves a raw input line ("give 5 apples") into a validated,
//! strongly-typed argument set bound to a registered command or
//! sub-command. The crate contains:
//!
//! - Whitespace tokenizer with cursor position tracking (`InputCursor`)
//! - Pluggable type-adapter registry with capability fallback
//! - Parameter modifiers (defaults, bounds, injection, remainder)
//! - Parameter descriptors and command nodes built explicitly (no
//!   introspection of host code)
//! - The recursive-descent resolution walk with sub-command descent
//! - `CommandManager`: registries, command table, and the `parse` entry
//!   point
//!
//! Registration completes before steady-state parsing; each `parse` call
//! allocates its own cursor and context, so concurrent parse calls share
//! no mutable state.

pub mod adapter;
pub mod command;
pub mod context;
pub mod cursor;
mod engine;
pub mod error;
pub mod manager;
pub mod modifier;
pub mod value;

use std::sync::Mutex;

use once_cell::sync::Lazy;

// Re-export commonly used types
pub use adapter::{
    AdapterRegistry, BooleanAdapter, ChoiceAdapter, FloatAdapter, IntegerAdapter,
    PrincipalAdapter, StringAdapter, SubCommandAdapter, TypeAdapter,
};
pub use command::{CommandNode, Guard, ParamSpec};
pub use context::{Principal, ResolutionContext, ResolvedArg, ResultSet};
pub use cursor::InputCursor;
pub use error::{
    CmdError, CmdResult, RegistrationError, RegistrationResult, ResolveError, ResolveResult,
};
pub use manager::CommandManager;
pub use modifier::{
    DefaultValueAdapter, DummyModifierAdapter, InjectPrincipalAdapter, Modifier, ModifierAdapter,
    ModifierKind, ModifierRegistry, OptionalAdapter, RangeAdapter,
};
pub use value::{TypeTag, Value};

static DEFAULT_MANAGER: Lazy<Mutex<CommandManager>> =
    Lazy::new(|| Mutex::new(CommandManager::new()));

/// Process-wide default manager, for hosts that need a single shared
/// command system. Register during startup, then parse; the mutex only
/// serializes access to the shared instance.
pub fn default_manager() -> &'static Mutex<CommandManager> {
    &DEFAULT_MANAGER
}
