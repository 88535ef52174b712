use std::collections::HashSet;

use cliroute_metadata::OptionDefinition;

use crate::cast::{Value, cast};
use crate::error::{ArgumentKind, BuildError, OptionParsingError, ParseResult};
use crate::settings::ParserSettings;
use crate::tokenizer::ParsedOption;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedOption<'d> {
    pub definition: &'d OptionDefinition,
    pub value: Value,
}

/// An option definition together with the container it was declared in.
#[derive(Debug, Clone, Copy)]
pub struct MappedOptionDefinition<'a> {
    pub container: &'a str,
    pub definition: &'a OptionDefinition,
}

/// Bind parsed options to the definitions in scope for one command.
///
/// Only options present in `parsed` produce an [`EvaluatedOption`].
pub fn bind_options<'d>(
    definitions: &'d [OptionDefinition],
    parsed: &[ParsedOption],
    settings: &ParserSettings,
) -> ParseResult<Vec<EvaluatedOption<'d>>> {
    let mut claimed = vec![false; parsed.len()];
    let mut matches: Vec<(&'d OptionDefinition, usize)> = Vec::new();
    let mut missing: Option<&OptionDefinition> = None;

    for def in definitions {
        let long = def.long_flag();
        let by_name = parsed.iter().position(|p| p.raw_name == long);
        let by_alias = def
            .short_flag()
            .and_then(|short| parsed.iter().position(|p| p.raw_name == short));

        let idx = match (by_name, by_alias) {
            (Some(_), Some(_)) => {
                return Err(OptionParsingError::NameAndAlias {
                    name: def.name.clone(),
                    alias: def.alias.clone().unwrap_or_default(),
                }
                .into());
            }
            (Some(idx), None) | (None, Some(idx)) => idx,
            (None, None) => {
                if def.required && missing.is_none() {
                    missing = Some(def);
                }
                continue;
            }
        };
        claimed[idx] = true;
        matches.push((def, idx));
    }

    for (option, _) in parsed.iter().zip(&claimed).filter(|(_, claimed)| !**claimed) {
        if let Some(expected) = misused_form(definitions, option) {
            return Err(OptionParsingError::Misused {
                raw: option.raw_name.clone(),
                expected,
            }
            .into());
        }
        if !settings.ignore_unknown_options {
            return Err(OptionParsingError::Unknown {
                raw: option.raw_name.clone(),
            }
            .into());
        }
        tracing::debug!(option = %option.raw_name, "ignoring unknown option");
    }

    if let Some(def) = missing {
        return Err(OptionParsingError::Missing {
            name: def.name.clone(),
        }
        .into());
    }

    let mut bound = Vec::with_capacity(matches.len());
    for (def, idx) in matches {
        let raw = &parsed[idx].value;
        let value = if settings.should_cast(def.type_checks) {
            cast(raw, def.design_type, &def.name, ArgumentKind::Option)?
        } else {
            Value::from(raw)
        };
        bound.push(EvaluatedOption {
            definition: def,
            value,
        });
    }

    tracing::debug!(bound = bound.len(), "bound options");
    Ok(bound)
}

/// A known option written with the wrong number of dashes (`--v` for alias `v`,
/// `-n` for a one-letter name `n`).
fn misused_form(definitions: &[OptionDefinition], option: &ParsedOption) -> Option<String> {
    definitions.iter().find_map(|def| {
        if option.is_alias {
            (def.name == option.cleaned_name).then(|| def.long_flag())
        } else {
            (def.alias.as_deref() == Some(option.cleaned_name.as_str()))
                .then(|| def.short_flag())
                .flatten()
        }
    })
}

/// Check option declarations reachable along one resolution path.
///
/// Runs at build time. Every failure is a configuration error.
pub fn validate_options(mapped: &[MappedOptionDefinition<'_>]) -> Result<(), BuildError> {
    for m in mapped {
        if let Some(alias) = &m.definition.alias {
            if alias.chars().count() != 1 {
                return Err(BuildError::InvalidAlias {
                    container: m.container.to_string(),
                    option: m.definition.name.clone(),
                    alias: alias.clone(),
                });
            }
        }
    }

    let mut seen_names: HashSet<(&str, &str)> = HashSet::new();
    let mut seen_aliases: HashSet<(&str, &str)> = HashSet::new();
    for m in mapped {
        let def = m.definition;
        if !seen_names.insert((m.container, def.name.as_str())) {
            return Err(BuildError::DuplicateOption {
                container: m.container.to_string(),
                field: "name",
                value: def.name.clone(),
            });
        }
        if let Some(alias) = def.alias.as_deref() {
            if !seen_aliases.insert((m.container, alias)) {
                return Err(BuildError::DuplicateOption {
                    container: m.container.to_string(),
                    field: "alias",
                    value: alias.to_string(),
                });
            }
        }
    }

    for (i, a) in mapped.iter().enumerate() {
        for b in &mapped[i + 1..] {
            if a.container == b.container {
                continue;
            }
            let (x, y) = (a.definition, b.definition);

            if x.name == y.name {
                if let Some(field) = first_difference(x, y) {
                    return Err(inconsistent("name", &x.name, a, b, field));
                }
            }
            if let (Some(alias), Some(other)) = (&x.alias, &y.alias) {
                if alias == other {
                    if let Some(field) = first_difference(x, y) {
                        return Err(inconsistent("alias", alias, a, b, field));
                    }
                }
            }
        }
    }

    for a in mapped {
        for b in mapped {
            let (x, y) = (a.definition, b.definition);
            if x.name != y.name && y.alias.as_deref() == Some(x.name.as_str()) {
                return Err(BuildError::NameAliasCollision {
                    name: x.name.clone(),
                    container: a.container.to_string(),
                    other: y.name.clone(),
                    other_container: b.container.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// First field on which two declarations sharing a name or alias disagree.
fn first_difference(x: &OptionDefinition, y: &OptionDefinition) -> Option<&'static str> {
    if x.name != y.name {
        Some("name")
    } else if x.alias != y.alias {
        Some("alias")
    } else if x.description != y.description {
        Some("description")
    } else if x.design_type != y.design_type {
        Some("type")
    } else if x.required != y.required {
        Some("required")
    } else {
        None
    }
}

fn inconsistent(
    key_field: &'static str,
    key: &str,
    a: &MappedOptionDefinition<'_>,
    b: &MappedOptionDefinition<'_>,
    field: &'static str,
) -> BuildError {
    BuildError::InconsistentOption {
        key_field,
        key: key.to_string(),
        first: a.container.to_string(),
        second: b.container.to_string(),
        field,
    }
}
