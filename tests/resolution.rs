//! End-to-end resolution tests: registration, parsing, modifiers,
//! sub-command descent, and failure attribution.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use cmd_core::{
    ChoiceAdapter, CommandManager, CommandNode, InputCursor, Modifier, ModifierAdapter,
    ModifierKind, ParamSpec, Principal, RegistrationError, ResolutionContext, ResolveError,
    ResolveResult, TypeTag, Value,
};

fn alice() -> Principal {
    Principal::new("alice")
}

/// give <amount> <item>, amount bounded [1, 64]
fn give_command() -> CommandNode {
    CommandNode::new("give").with_alias("g").with_param(
        ParamSpec::new("amount", TypeTag::Integer).with_modifier(Modifier::range(1.0, 64.0)),
    )
    .with_param(ParamSpec::new("item", TypeTag::String))
}

#[test]
fn resolves_typed_arguments_in_order() {
    let mut manager = CommandManager::new();
    manager.register(give_command()).unwrap();

    let results = manager.parse(&alice(), "give 5 apples").unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results.integer("amount"), Some(5));
    assert_eq!(results.text("item"), Some("apples"));

    let names: Vec<&str> = results.iter().map(|e| e.param().name()).collect();
    assert_eq!(names, vec!["amount", "item"]);
}

#[test]
fn alias_lookup_is_case_insensitive() {
    let mut manager = CommandManager::new();
    manager.register(give_command()).unwrap();

    assert!(manager.parse(&alice(), "GIVE 5 apples").is_ok());
    assert!(manager.parse(&alice(), "G 5 apples").is_ok());
}

#[test]
fn unknown_alias_never_reaches_the_engine() {
    let manager = CommandManager::new();
    let err = manager.parse(&alice(), "doesnotexist").unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnknownCommand {
            alias: "doesnotexist".to_string()
        }
    );
}

#[test]
fn name_only_parse_fails_with_missing_argument_not_parse_error() {
    let mut manager = CommandManager::new();
    manager.register(give_command()).unwrap();

    let err = manager.parse(&alice(), "give").unwrap_err();
    assert_eq!(
        err,
        ResolveError::MissingArgument {
            parameter: "amount".to_string(),
            command: "give".to_string(),
        }
    );
}

#[test]
fn parsing_is_idempotent() {
    let mut manager = CommandManager::new();
    manager.register(give_command()).unwrap();

    let first = manager.parse(&alice(), "give 7 bread").unwrap();
    let second = manager.parse(&alice(), "give 7 bread").unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.param().name(), b.param().name());
        assert_eq!(a.value(), b.value());
    }
}

#[test]
fn declared_default_satisfies_a_required_parameter() {
    let mut manager = CommandManager::new();
    manager
        .register(
            CommandNode::new("spawn")
                .with_param(ParamSpec::new("count", TypeTag::Integer).with_default(Value::Integer(1))),
        )
        .unwrap();

    let results = manager.parse(&alice(), "spawn").unwrap();
    assert_eq!(results.integer("count"), Some(1));
}

#[test]
fn default_modifier_substitutes_on_empty_input() {
    let mut manager = CommandManager::new();
    manager
        .register(
            CommandNode::new("tp").with_param(
                ParamSpec::new("distance", TypeTag::Integer)
                    .with_modifier(Modifier::default_number(10.0)),
            ),
        )
        .unwrap();

    let results = manager.parse(&alice(), "tp").unwrap();
    assert_eq!(results.integer("distance"), Some(10));

    // Supplied input still wins over the default.
    let results = manager.parse(&alice(), "tp 3").unwrap();
    assert_eq!(results.integer("distance"), Some(3));
}

#[test]
fn range_bounds_are_inclusive() {
    let mut manager = CommandManager::new();
    manager.register(give_command()).unwrap();

    for boundary in ["1", "64"] {
        let input = format!("give {} dirt", boundary);
        let results = manager.parse(&alice(), &input).unwrap();
        assert_eq!(results.integer("amount"), Some(boundary.parse().unwrap()));
    }

    for outside in ["0", "65"] {
        let input = format!("give {} dirt", outside);
        let err = manager.parse(&alice(), &input).unwrap_err();
        assert!(
            matches!(err, ResolveError::InvalidArgument { ref parameter, .. } if parameter == "amount"),
            "expected InvalidArgument on amount, got {:?}",
            err
        );
    }
}

#[test]
fn malformed_token_is_a_parse_error_with_position() {
    let mut manager = CommandManager::new();
    manager.register(give_command()).unwrap();

    let err = manager.parse(&alice(), "give many apples").unwrap_err();
    match err {
        ResolveError::ParseError { token, .. } => assert_eq!(token, "many"),
        other => panic!("expected ParseError, got {:?}", other),
    }
}

#[test]
fn remainder_parameter_consumes_the_rest_of_the_line() {
    let mut manager = CommandManager::new();
    manager
        .register(
            CommandNode::new("say").with_param(
                ParamSpec::new("message", TypeTag::String).with_modifier(Modifier::remainder()),
            ),
        )
        .unwrap();

    let results = manager.parse(&alice(), "say hello there world").unwrap();
    assert_eq!(results.text("message"), Some("hello there world"));
}

#[test]
fn principal_is_injected_without_consuming_input() {
    let mut manager = CommandManager::new();
    manager
        .register(
            CommandNode::new("home")
                .with_param(
                    ParamSpec::new("who", TypeTag::Principal)
                        .with_modifier(Modifier::inject_principal()),
                )
                .with_param(ParamSpec::new("name", TypeTag::String)),
        )
        .unwrap();

    // "base" must land in `name`; the injected principal consumes nothing.
    let results = manager.parse(&alice(), "home base").unwrap();
    assert_eq!(results.principal("who"), Some(&alice()));
    assert_eq!(results.text("name"), Some("base"));
}

#[test]
fn sub_command_descent_resolves_the_inner_parameter_list() {
    let mut manager = CommandManager::new();
    manager
        .register(
            CommandNode::new("root")
                .with_param(ParamSpec::new("sub", TypeTag::Command))
                .with_child(
                    CommandNode::new("a").with_param(ParamSpec::new("amount", TypeTag::Integer)),
                )
                .with_child(CommandNode::new("b").with_param(ParamSpec::new("word", TypeTag::String))),
        )
        .unwrap();

    let results = manager.parse(&alice(), "root a 5").unwrap();
    assert_eq!(results.integer("amount"), Some(5));
    // The outer node's own parameter list was abandoned on descent.
    assert!(results.entry("sub").is_none());

    let results = manager.parse(&alice(), "root b hello").unwrap();
    assert_eq!(results.text("word"), Some("hello"));
}

#[test]
fn missing_argument_is_attributed_to_the_inner_node() {
    let mut manager = CommandManager::new();
    manager
        .register(
            CommandNode::new("root")
                .with_param(ParamSpec::new("sub", TypeTag::Command))
                .with_child(
                    CommandNode::new("a").with_param(ParamSpec::new("amount", TypeTag::Integer)),
                ),
        )
        .unwrap();

    let err = manager.parse(&alice(), "root a").unwrap_err();
    assert_eq!(
        err,
        ResolveError::MissingArgument {
            parameter: "amount".to_string(),
            command: "a".to_string(),
        }
    );
}

#[test]
fn guard_rejection_maps_to_no_permission() {
    let mut manager = CommandManager::new();
    manager
        .register(CommandNode::new("stop").with_guard(|p| p.name() == "console"))
        .unwrap();

    let err = manager.parse(&alice(), "stop").unwrap_err();
    assert!(matches!(err, ResolveError::NoPermission { .. }));
    assert!(manager.parse(&Principal::new("console"), "stop").is_ok());
}

#[test]
fn range_on_string_parameter_blocks_registration() {
    let mut manager = CommandManager::new();
    let err = manager
        .register(CommandNode::new("rename").with_param(
            ParamSpec::new("name", TypeTag::String).with_modifier(Modifier::range(1.0, 16.0)),
        ))
        .unwrap_err();
    assert!(matches!(err, RegistrationError::IncompatibleModifier { .. }));
    assert!(manager.command("rename").is_none());
}

#[test]
fn host_registered_choice_adapter_participates_in_resolution() {
    let mut manager = CommandManager::new();
    manager.register_type_adapter(Arc::new(ChoiceAdapter::new(
        "gamemode",
        ["survival", "creative", "spectator"],
    )));
    manager
        .register(
            CommandNode::new("mode")
                .with_param(ParamSpec::new("gamemode", TypeTag::Named("gamemode".to_string()))),
        )
        .unwrap();

    let results = manager.parse(&alice(), "mode CREATIVE").unwrap();
    assert_eq!(results.text("gamemode"), Some("creative"));

    let err = manager.parse(&alice(), "mode peaceful").unwrap_err();
    assert!(matches!(err, ResolveError::ParseError { .. }));
}

/// Host handler for a custom kind: forces the parsed value to uppercase.
struct ShoutAdapter;

impl ModifierAdapter for ShoutAdapter {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Custom("shout".to_string())
    }

    fn apply(
        &self,
        value: Option<&Value>,
        _modifier: &Modifier,
        _param: &ParamSpec,
        _ctx: &ResolutionContext,
    ) -> ResolveResult<Option<Value>> {
        match value {
            Some(Value::String(s)) => Ok(Some(Value::String(s.to_uppercase()))),
            _ => Ok(None),
        }
    }
}

#[test]
fn modifier_transform_overrides_the_freshly_parsed_value() {
    let mut manager = CommandManager::new();
    manager.register_modifier_adapter(Arc::new(ShoutAdapter));
    manager
        .register(
            CommandNode::new("yell").with_param(
                ParamSpec::new("word", TypeTag::String).with_modifier(Modifier::custom("shout")),
            ),
        )
        .unwrap();

    let results = manager.parse(&alice(), "yell hello").unwrap();
    assert_eq!(results.text("word"), Some("HELLO"));
}

#[test]
fn unregistered_custom_kind_blocks_registration() {
    let mut manager = CommandManager::new();
    let err = manager
        .register(
            CommandNode::new("yell").with_param(
                ParamSpec::new("word", TypeTag::String).with_modifier(Modifier::custom("shout")),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, RegistrationError::NoAdapterFound { .. }));
}

#[test]
fn nullable_parameter_resolves_to_an_empty_entry() {
    let mut manager = CommandManager::new();
    manager
        .register(
            CommandNode::new("kick")
                .with_param(ParamSpec::new("target", TypeTag::String))
                .with_param(ParamSpec::new("reason", TypeTag::String).with_modifier(Modifier::optional())),
        )
        .unwrap();

    let results = manager.parse(&alice(), "kick bob").unwrap();
    assert_eq!(results.text("target"), Some("bob"));
    assert!(results.entry("reason").is_some());
    assert_eq!(results.value("reason"), None);
}

#[test]
fn cursor_positions_survive_multi_token_reads() {
    // Manual cursor use, as a type adapter with look-ahead would do.
    let mut cursor = InputCursor::new("alpha beta gamma");
    let mark = cursor.save();
    assert_eq!(cursor.read_token().unwrap(), "alpha");
    assert_eq!(cursor.read_token().unwrap(), "beta");
    cursor.restore(mark);
    assert_eq!(cursor.read_token().unwrap(), "alpha");
    assert_eq!(cursor.read_remainder().unwrap(), "beta gamma");
}

#[test]
fn default_manager_is_shared_and_usable() {
    let manager = cmd_core::default_manager();
    let mut guard = manager.lock().unwrap();
    guard.register_safe(CommandNode::new("ping"));
    assert!(guard.parse(&alice(), "ping").is_ok());
}
