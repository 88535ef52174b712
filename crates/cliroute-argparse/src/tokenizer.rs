//! First pass over argv: split raw tokens into options and positional candidates.
//!
//! Rules:
//! - any token starting with `-` is an option
//! - `-abc` is a cluster: `-a` and `-b` become flags, `-c` takes the value
//! - `--name=value` carries its value inline, otherwise the next token is the value
//!   unless it is itself an option
//! - repeated options collapse into one entry holding every value in order

use indexmap::IndexMap;

use crate::settings::ParserSettings;

/// One occurrence's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Text(String),
    /// Option given without a value.
    Flag,
}

impl Scalar {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Textual form used in error messages and rebuilt tokens.
    pub fn display(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Flag => "true",
        }
    }
}

/// A parsed option's value: one occurrence, or every occurrence in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

impl RawValue {
    fn merge(&mut self, next: Scalar) {
        *self = match std::mem::replace(self, Self::Many(Vec::new())) {
            Self::One(first) => Self::Many(vec![first, next]),
            Self::Many(mut values) => {
                values.push(next);
                Self::Many(values)
            }
        };
    }

    pub fn scalars(&self) -> &[Scalar] {
        match self {
            Self::One(s) => std::slice::from_ref(s),
            Self::Many(values) => values.as_slice(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOption {
    /// Token as written, minus any inline value (`--name`, `-n`).
    pub raw_name: String,
    /// `raw_name` without leading dashes.
    pub cleaned_name: String,
    /// Written with a single dash.
    pub is_alias: bool,
    pub value: RawValue,
}

impl ParsedOption {
    fn new(raw_name: String, value: Scalar) -> Self {
        let is_alias = !raw_name.starts_with("--");
        let cleaned_name = raw_name.trim_start_matches('-').to_string();
        Self {
            raw_name,
            cleaned_name,
            is_alias,
            value: RawValue::One(value),
        }
    }

    /// Rebuild one token per occurrence: `{raw}={value}`, or `{raw}` for a flag.
    pub fn to_tokens(&self) -> Vec<String> {
        self.value
            .scalars()
            .iter()
            .map(|scalar| match scalar {
                Scalar::Text(value) => format!("{}={value}", self.raw_name),
                Scalar::Flag => self.raw_name.clone(),
            })
            .collect()
    }
}

/// Output of [`tokenize`].
///
/// `possible_commands` is always a prefix of `possible_parameters`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgumentsContext {
    pub options: Vec<ParsedOption>,
    pub possible_commands: Vec<String>,
    pub possible_parameters: Vec<String>,
}

impl ArgumentsContext {
    /// Drop the first command candidate from both candidate lists.
    ///
    /// Removes by position so a later parameter with the same text survives.
    pub(crate) fn consume_command(&mut self) {
        if self.possible_commands.is_empty() {
            return;
        }
        self.possible_commands.remove(0);
        if !self.possible_parameters.is_empty() {
            self.possible_parameters.remove(0);
        }
    }

    pub fn option(&self, raw_name: &str) -> Option<&ParsedOption> {
        self.options.iter().find(|o| o.raw_name == raw_name)
    }
}

fn record(options: &mut IndexMap<String, ParsedOption>, raw_name: String, value: Scalar) {
    match options.get_mut(&raw_name) {
        Some(existing) => existing.value.merge(value),
        None => {
            let option = ParsedOption::new(raw_name.clone(), value);
            options.insert(raw_name, option);
        }
    }
}

/// Tokenize `argv` (program name excluded).
///
/// Never fails: malformed input just yields fewer options.
pub fn tokenize<S: AsRef<str>>(argv: &[S], settings: &ParserSettings) -> ArgumentsContext {
    let mut options: IndexMap<String, ParsedOption> = IndexMap::new();
    let mut used = vec![false; argv.len()];
    let mut first_option: Option<usize> = None;

    let mut i = 0usize;
    while i < argv.len() {
        let token = argv[i].as_ref();
        if !token.starts_with('-') {
            i += 1;
            continue;
        }
        first_option.get_or_insert(i);
        used[i] = true;

        let (head, inline) = match token.split_once('=') {
            Some((head, value)) => (head, Some(value)),
            None => (token, None),
        };

        let mut raw_name = head.to_string();
        if !head.starts_with("--") {
            let body = &head[1..];
            if body.chars().count() > 1 {
                let mut cluster = body.chars();
                if let Some(last) = cluster.next_back() {
                    for c in cluster {
                        record(&mut options, format!("-{c}"), Scalar::Flag);
                    }
                    raw_name = format!("-{last}");
                }
            }
        }

        let value = match inline {
            Some(value) => Scalar::text(value),
            None => match argv.get(i + 1).map(AsRef::as_ref) {
                Some(next) if !next.starts_with('-') => {
                    i += 1;
                    used[i] = true;
                    Scalar::text(next)
                }
                _ => Scalar::Flag,
            },
        };
        record(&mut options, raw_name, value);
        i += 1;
    }

    let mut possible_parameters = Vec::new();
    let mut possible_commands = Vec::new();
    for (idx, token) in argv.iter().enumerate() {
        if used[idx] {
            continue;
        }
        let token = token.as_ref().to_string();
        let before_options = first_option.is_none_or(|first| idx < first);
        if settings.allow_commands_after_options || before_options {
            possible_commands.push(token.clone());
        }
        possible_parameters.push(token);
    }

    tracing::trace!(
        options = options.len(),
        commands = possible_commands.len(),
        parameters = possible_parameters.len(),
        "tokenized arguments"
    );

    ArgumentsContext {
        options: options.into_values().collect(),
        possible_commands,
        possible_parameters,
    }
}
