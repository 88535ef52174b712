use cliroute_argparse::{CommandTree, Resolution, Value};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub root: String,
    pub commands: Vec<CommandEntry>,
}

#[derive(Debug, Serialize)]
pub struct CommandEntry {
    pub path: Vec<String>,
    pub command: String,
    pub options: Vec<String>,
    pub parameters: Vec<String>,
}

impl CheckReport {
    pub fn new(root: &str, tree: &CommandTree) -> Self {
        let commands = tree
            .commands()
            .into_iter()
            .map(|(path, command)| CommandEntry {
                path: path.into_iter().map(str::to_string).collect(),
                command: command.id.clone(),
                options: command.options.iter().map(|o| o.long_flag()).collect(),
                parameters: command.parameters.iter().map(|p| p.name.clone()).collect(),
            })
            .collect();
        Self {
            root: root.to_string(),
            commands,
        }
    }
}

/// JSON shape of a successful resolution, keyed by property name.
#[derive(Debug, Serialize)]
pub struct ResolutionReport<'t> {
    pub command: &'t str,
    pub path: Vec<&'t str>,
    pub options: BTreeMap<&'t str, &'t Value>,
    pub parameters: BTreeMap<&'t str, &'t Value>,
}

impl<'t> From<&'t Resolution<'t>> for ResolutionReport<'t> {
    fn from(resolution: &'t Resolution<'t>) -> Self {
        Self {
            command: &resolution.command.id,
            path: resolution.path.clone(),
            options: resolution
                .options
                .iter()
                .map(|o| (o.definition.property(), &o.value))
                .collect(),
            parameters: resolution
                .parameters
                .iter()
                .map(|p| (p.definition.property(), &p.value))
                .collect(),
        }
    }
}
