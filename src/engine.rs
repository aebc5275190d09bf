//! The resolution walk
//!
//! Consumes a command node and a cursor, producing a `ResultSet` or a
//! typed failure. Sub-command descent is an explicit restart: when a
//! `TypeTag::Command` parameter resolves to a nested node, the active
//! node in the context is reassigned and parameter iteration starts over
//! on the new node's list, preserving the entries accumulated so far and
//! abandoning the outer node's remaining parameters. Every iteration
//! either consumes a token or advances to a fixed next parameter/node,
//! so the walk terminates in O(tokens + parameters) steps.

use tracing::debug;

use crate::adapter::AdapterRegistry;
use crate::command::ParamSpec;
use crate::context::{ResolutionContext, ResultSet};
use crate::cursor::InputCursor;
use crate::error::{ResolveError, ResolveResult};
use crate::modifier::ModifierRegistry;
use crate::value::{TypeTag, Value};

/// Walk the active node's parameters against the remaining input
pub(crate) fn resolve(
    adapters: &AdapterRegistry,
    modifiers: &ModifierRegistry,
    mut ctx: ResolutionContext,
    cursor: &mut InputCursor<'_>,
) -> ResolveResult<ResultSet> {
    'walk: loop {
        let node = ctx.active().clone();
        if !node.allows(ctx.principal()) {
            return Err(ResolveError::NoPermission {
                principal: ctx.principal().name().to_string(),
                command: node.name().to_string(),
            });
        }
        debug!(command = node.name(), params = node.params().len(), "resolving");

        for param in node.params() {
            // A modifier may supply a value without consuming input.
            let mut value = out_of_syntax_candidate(modifiers, param, &ctx);

            if !param.is_syntax() {
                let value = apply_modifiers(modifiers, value, param, &ctx)?;
                ctx.record(param, value);
                continue;
            }

            if cursor.can_read() {
                if value.is_none() {
                    let adapter =
                        adapters
                            .lookup(param.ty())
                            .ok_or_else(|| ResolveError::InvalidArgument {
                                parameter: param.name().to_string(),
                                reason: format!("no adapter registered for {}", param.ty()),
                            })?;
                    value = adapter.parse(cursor, param, &ctx)?;
                    cursor.skip_space();
                }
                value = apply_modifiers(modifiers, value, param, &ctx)?;
                if value.is_none() && !param.is_nullable() {
                    return Err(ResolveError::MissingArgument {
                        parameter: param.name().to_string(),
                        command: node.name().to_string(),
                    });
                }
                if *param.ty() == TypeTag::Command {
                    if let Some(Value::Command(child)) = &value {
                        // The descent token is already consumed; restart
                        // over the child's parameter list with the entries
                        // accumulated so far.
                        ctx.set_active(child.clone());
                        continue 'walk;
                    }
                }
                ctx.record(param, value);
            } else {
                // Out of input: fall back to the declared default, then
                // run the same transform pipeline as the consuming path.
                if value.is_none() {
                    value = param.default().cloned();
                }
                value = apply_modifiers(modifiers, value, param, &ctx)?;
                if value.is_none() && !param.is_nullable() && param.is_required() {
                    return Err(ResolveError::MissingArgument {
                        parameter: param.name().to_string(),
                        command: node.name().to_string(),
                    });
                }
                ctx.record(param, value);
            }
        }

        return Ok(ctx.into_results());
    }
}

/// First non-absent out-of-syntax contribution across attached modifiers
fn out_of_syntax_candidate(
    modifiers: &ModifierRegistry,
    param: &ParamSpec,
    ctx: &ResolutionContext,
) -> Option<Value> {
    for modifier in param.modifiers() {
        if let Some(handler) = modifiers.lookup(&modifier.kind) {
            if let Some(value) = handler.out_of_syntax(modifier, param, ctx) {
                debug!(parameter = param.name(), kind = %modifier.kind, "out-of-syntax value");
                return Some(value);
            }
        }
    }
    None
}

/// Run every attached modifier's transform in attachment order. A
/// non-absent result overrides the current value (last-applied wins);
/// an absent result leaves it untouched.
fn apply_modifiers(
    modifiers: &ModifierRegistry,
    value: Option<Value>,
    param: &ParamSpec,
    ctx: &ResolutionContext,
) -> ResolveResult<Option<Value>> {
    let mut current = value;
    for modifier in param.modifiers() {
        if let Some(handler) = modifiers.lookup(&modifier.kind) {
            if let Some(transformed) = handler.apply(current.as_ref(), modifier, param, ctx)? {
                current = Some(transformed);
            }
        }
    }
    Ok(current)
}
