use serde::{Deserialize, Serialize};

/// Parser switches supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ParserSettings {
    /// Cast values unless a definition sets `type-checks` explicitly.
    pub apply_type_casting: bool,
    /// Parsed options that match no definition are dropped instead of rejected.
    pub ignore_unknown_options: bool,
    /// Trailing positional values beyond the declared parameters are dropped
    /// instead of rejected.
    pub ignore_unknown_parameters: bool,
    /// Command names may appear after the first option token.
    pub allow_commands_after_options: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            apply_type_casting: true,
            ignore_unknown_options: false,
            ignore_unknown_parameters: false,
            allow_commands_after_options: false,
        }
    }
}

impl ParserSettings {
    /// Whether a value with the given per-field override should go through the caster.
    pub fn should_cast(&self, type_checks: Option<bool>) -> bool {
        type_checks.unwrap_or(self.apply_type_casting)
    }
}
