use std::collections::HashSet;

use cliroute_metadata::ParameterDefinition;

use crate::cast::{Value, cast};
use crate::error::{ArgumentKind, BuildError, ParameterParsingError, ParseResult};
use crate::settings::ParserSettings;
use crate::tokenizer::{RawValue, Scalar};

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedParameter<'d> {
    pub definition: &'d ParameterDefinition,
    pub value: Value,
}

fn sorted(definitions: &[ParameterDefinition]) -> Vec<&ParameterDefinition> {
    let mut defs: Vec<&ParameterDefinition> = definitions.iter().collect();
    defs.sort_by_key(|d| d.index);
    defs
}

/// Bind positional `values` to one command's parameter definitions.
///
/// An array parameter takes every remaining value and is bound as a list.
pub fn bind_parameters<'d>(
    definitions: &'d [ParameterDefinition],
    values: &[String],
    settings: &ParserSettings,
) -> ParseResult<Vec<EvaluatedParameter<'d>>> {
    let mut rest = values;
    let mut bound = Vec::with_capacity(definitions.len());

    for def in sorted(definitions) {
        let raw = if def.is_array {
            if rest.is_empty() {
                None
            } else {
                let all = rest.iter().map(Scalar::text).collect();
                rest = &[];
                Some(RawValue::Many(all))
            }
        } else {
            match rest.split_first() {
                Some((first, tail)) => {
                    rest = tail;
                    Some(RawValue::One(Scalar::text(first)))
                }
                None => None,
            }
        };

        let Some(raw) = raw else {
            if def.optional {
                continue;
            }
            return Err(ParameterParsingError::Missing {
                name: def.name.clone(),
                index: def.index,
            }
            .into());
        };

        let value = if settings.should_cast(def.type_checks) {
            cast(&raw, def.design_type, &def.name, ArgumentKind::Parameter)?
        } else {
            Value::from(&raw)
        };
        bound.push(EvaluatedParameter {
            definition: def,
            value,
        });
    }

    if !rest.is_empty() {
        if !settings.ignore_unknown_parameters {
            return Err(ParameterParsingError::Unexpected {
                values: rest.to_vec(),
            }
            .into());
        }
        tracing::debug!(ignored = rest.len(), "ignoring unexpected parameters");
    }

    tracing::debug!(bound = bound.len(), "bound parameters");
    Ok(bound)
}

/// Check the structure of one command's parameter list.
pub fn validate_parameters(
    command: &str,
    definitions: &[ParameterDefinition],
) -> Result<(), BuildError> {
    let defs = sorted(definitions);
    let mut names = HashSet::new();
    let mut seen_optional = false;

    for (pos, def) in defs.iter().enumerate() {
        let expected = pos + 1;
        if def.index != expected {
            return Err(BuildError::NonContiguousParameters {
                command: command.to_string(),
                expected,
                found: def.index,
            });
        }
        if !names.insert(def.name.as_str()) {
            return Err(BuildError::DuplicateParameter {
                command: command.to_string(),
                name: def.name.clone(),
            });
        }
        if def.optional {
            seen_optional = true;
        } else if seen_optional {
            return Err(BuildError::RequiredAfterOptional {
                command: command.to_string(),
                name: def.name.clone(),
            });
        }
        if def.is_array && expected != defs.len() {
            return Err(BuildError::ArrayNotLast {
                command: command.to_string(),
                name: def.name.clone(),
            });
        }
    }

    Ok(())
}
