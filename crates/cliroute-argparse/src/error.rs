use std::fmt;

use cliroute_metadata::DesignType;
use thiserror::Error;

/// Which kind of declaration a value was bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Option,
    Parameter,
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Option => f.write_str("option"),
            Self::Parameter => f.write_str("parameter"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionParsingError {
    #[error("missing required option '--{name}'")]
    Missing { name: String },
    #[error("unknown option '{raw}'")]
    Unknown { raw: String },
    #[error("option '--{name}' was given both as '--{name}' and as '-{alias}'")]
    NameAndAlias { name: String, alias: String },
    #[error("invalid option '{raw}', did you mean '{expected}'?")]
    Misused { raw: String, expected: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterParsingError {
    #[error("missing required parameter <{name}> at position {index}")]
    Missing { name: String, index: usize },
    #[error("unexpected parameter(s): {}", .values.join(" "))]
    Unexpected { values: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for {kind} '{name}': {reason}")]
pub struct TypeCastingError {
    pub name: String,
    pub kind: ArgumentKind,
    pub expected: DesignType,
    pub value: String,
    pub reason: String,
}

/// Invocation-time failure. Caused by user input; hosts are expected to render it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Option(#[from] OptionParsingError),
    #[error(transparent)]
    Parameter(#[from] ParameterParsingError),
    #[error(transparent)]
    TypeCasting(#[from] TypeCastingError),
    #[error("unknown command '{token}' in '{group}'")]
    UnknownCommand { group: String, token: String },
    #[error("'{group}' requires a command")]
    MissingCommand { group: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Configuration-time failure in the declared command tree.
///
/// These indicate a programming error in the registration, never bad user input,
/// and should abort startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("'{id}' is registered more than once")]
    DuplicateId { id: String },
    #[error("unknown {kind} '{id}' referenced from '{from}'")]
    UnknownReference {
        kind: &'static str,
        id: String,
        from: String,
    },
    #[error("circular module reference: {}", .cycle.join(" -> "))]
    CircularReference { cycle: Vec<String> },
    #[error("group '{group}' declares more than one star route")]
    MultipleStarRoutes { group: String },
    #[error("option '{option}' in '{container}': alias '{alias}' must be exactly one character")]
    InvalidAlias {
        container: String,
        option: String,
        alias: String,
    },
    #[error("'{container}' declares option {field} '{value}' more than once")]
    DuplicateOption {
        container: String,
        field: &'static str,
        value: String,
    },
    #[error(
        "option {key_field} '{key}' is declared differently in '{first}' and '{second}' ({field} differs)"
    )]
    InconsistentOption {
        key_field: &'static str,
        key: String,
        first: String,
        second: String,
        field: &'static str,
    },
    #[error(
        "option name '{name}' in '{container}' collides with the alias of '{other}' in '{other_container}'"
    )]
    NameAliasCollision {
        name: String,
        container: String,
        other: String,
        other_container: String,
    },
    #[error("command '{command}': expected parameter index {expected}, found {found}")]
    NonContiguousParameters {
        command: String,
        expected: usize,
        found: usize,
    },
    #[error("command '{command}': parameter name '{name}' is declared more than once")]
    DuplicateParameter { command: String, name: String },
    #[error("command '{command}': required parameter '{name}' follows an optional one")]
    RequiredAfterOptional { command: String, name: String },
    #[error("command '{command}': array parameter '{name}' must be the last parameter")]
    ArrayNotLast { command: String, name: String },
}
