//! Shared declaration model for cliroute command trees.
//!
//! This crate intentionally carries **no** parsing logic. The types here are what a
//! host registers before any invocation is parsed:
//! - option definitions grouped into named containers
//! - positional parameter definitions per command
//! - commands and groups wired together by routes
//!
//! Every type is plain data. Hosts either construct them in code via the builder-style
//! helpers or deserialize a [`TreeManifest`] from JSON.

use serde::{Deserialize, Serialize};

/// Route path that marks the unnamed fallback route of a group.
pub const STAR_PATH: &str = "*";

/// Semantic type a raw string value is cast to.
///
/// `Any` disables validation: the raw value is handed through unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DesignType {
    String,
    Number,
    Integer,
    Boolean,
    Path,
    #[default]
    Any,
}

impl DesignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Path => "path",
            Self::Any => "any",
        }
    }
}

impl std::fmt::Display for DesignType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named option (`--name`, optionally `-a`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OptionDefinition {
    pub name: String,
    /// Single-character short form, used as `-a`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Opaque host data forwarded untouched with the bound value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Per-option override of the global type casting switch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_checks: Option<bool>,
    #[serde(default, rename = "type")]
    pub design_type: DesignType,
    /// Field name on the host side. Defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
}

impl OptionDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn of_type(mut self, design_type: DesignType) -> Self {
        self.design_type = design_type;
        self
    }

    pub fn type_checks(mut self, enabled: bool) -> Self {
        self.type_checks = Some(enabled);
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn property_name(mut self, property: impl Into<String>) -> Self {
        self.property_name = Some(property.into());
        self
    }

    /// The host-side field this option binds to.
    pub fn property(&self) -> &str {
        self.property_name.as_deref().unwrap_or(&self.name)
    }

    /// `--name`, the form matched against parsed options.
    pub fn long_flag(&self) -> String {
        format!("--{}", self.name)
    }

    /// `-a`, if an alias is declared.
    pub fn short_flag(&self) -> Option<String> {
        self.alias.as_deref().map(|a| format!("-{a}"))
    }
}

/// A positional parameter of one command. Indices are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterDefinition {
    pub index: usize,
    pub name: String,
    #[serde(default)]
    pub optional: bool,
    /// Consumes every remaining positional value. Only valid on the last index.
    #[serde(default)]
    pub is_array: bool,
    #[serde(default, rename = "type")]
    pub design_type: DesignType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_checks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
}

impl ParameterDefinition {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn of_type(mut self, design_type: DesignType) -> Self {
        self.design_type = design_type;
        self
    }

    pub fn type_checks(mut self, enabled: bool) -> Self {
        self.type_checks = Some(enabled);
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn property_name(mut self, property: impl Into<String>) -> Self {
        self.property_name = Some(property.into());
        self
    }

    pub fn property(&self) -> &str {
        self.property_name.as_deref().unwrap_or(&self.name)
    }
}

/// A named bundle of option declarations.
///
/// Containers are attached to a command, or to a group so that every command beneath
/// the group sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OptionsContainer {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDefinition>,
}

impl OptionsContainer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }
}

/// A leaf command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CommandDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Ids of option containers scoped to this command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDefinition>,
}

impl CommandDef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn options(mut self, container: impl Into<String>) -> Self {
        self.options.push(container.into());
        self
    }

    pub fn parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// An edge from a group to a child command or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RouteDef {
    /// Path segment, or [`STAR_PATH`] for the fallback route.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Id of the child command or group.
    pub target: String,
}

impl RouteDef {
    pub fn new(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: None,
            target: target.into(),
        }
    }

    pub fn star(target: impl Into<String>) -> Self {
        Self::new(STAR_PATH, target)
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn is_star(&self) -> bool {
        self.path == STAR_PATH
    }
}

/// A group of routes ("module").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct GroupDef {
    pub id: String,
    /// Ids of option containers applied to every command beneath this group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteDef>,
}

impl GroupDef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn options(mut self, container: impl Into<String>) -> Self {
        self.options.push(container.into());
        self
    }

    pub fn route(mut self, route: RouteDef) -> Self {
        self.routes.push(route);
        self
    }
}

/// Serializable form of a whole registration: every container, command and group,
/// plus the id of the root node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct TreeManifest {
    pub root: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<OptionsContainer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupDef>,
}
