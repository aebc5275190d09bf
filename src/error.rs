//! Error types for the command resolution engine
//!
//! Errors are split by phase: registration-time failures abort the
//! registration of the offending command and never reach the resolver,
//! while resolve-time failures terminate the current `parse` call with
//! no partial result set.

use thiserror::Error;

/// Top-level error type wrapping both phases
#[derive(Error, Debug)]
pub enum CmdError {
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

/// Registration-time errors. All of these prevent the command from being
/// published to the manager at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("alias '{alias}' is already registered to command '{existing}'")]
    DuplicateAlias { alias: String, existing: String },

    #[error("modifier '{kind}' cannot be applied to parameter '{parameter}': {reason}")]
    IncompatibleModifier {
        kind: String,
        parameter: String,
        reason: String,
    },

    #[error("no adapter registered for {requested} (parameter '{parameter}')")]
    NoAdapterFound {
        parameter: String,
        requested: String,
    },
}

/// Resolve-time errors, surfaced to the `parse` caller as a typed result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("unknown command '{alias}'")]
    UnknownCommand { alias: String },

    #[error("'{principal}' is not allowed to use command '{command}'")]
    NoPermission { principal: String, command: String },

    #[error("missing required argument '{parameter}' for command '{command}'")]
    MissingArgument { parameter: String, command: String },

    #[error("invalid value for argument '{parameter}': {reason}")]
    InvalidArgument { parameter: String, reason: String },

    #[error("cannot interpret '{token}' as {expected} at position {position}")]
    ParseError {
        token: String,
        position: usize,
        expected: String,
    },

    #[error("unexpected end of input at position {position}")]
    EndOfInput { position: usize },
}

/// Result type aliases for convenience
pub type CmdResult<T> = Result<T, CmdError>;
pub type RegistrationResult<T> = Result<T, RegistrationError>;
pub type ResolveResult<T> = Result<T, ResolveError>;
