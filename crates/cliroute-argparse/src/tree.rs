//! Explicit registration of commands, groups and option containers.
//!
//! [`TreeBuilder`] owns plain id → definition maps. [`TreeBuilder::build`] walks the
//! registration from a root id, runs every build-time validator, and materialises a
//! read-only [`CommandTree`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cliroute_metadata::{
    CommandDef, GroupDef, OptionDefinition, OptionsContainer, ParameterDefinition, STAR_PATH,
    TreeManifest,
};
use indexmap::{IndexMap, IndexSet};

use crate::error::BuildError;
use crate::options::{MappedOptionDefinition, validate_options};
use crate::parameters::validate_parameters;

/// A leaf of the tree, with every option in scope along its route path.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub id: String,
    pub description: String,
    pub options: Vec<OptionDefinition>,
    pub parameters: Vec<ParameterDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub path: String,
    pub alias: Option<String>,
    /// Shared between routes that reach the same node under the same scope.
    pub node: Arc<Node>,
}

impl Route {
    pub fn is_star(&self) -> bool {
        self.path == STAR_PATH
    }

    /// Name or alias match. The star route never matches a token.
    pub fn matches(&self, token: &str) -> bool {
        !self.is_star() && (self.path == token || self.alias.as_deref() == Some(token))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Command(Command),
    Group(Group),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Self::Command(c) => &c.id,
            Self::Group(g) => &g.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandTree {
    root: Arc<Node>,
}

impl CommandTree {
    /// Register everything in `manifest` and build from its root.
    pub fn from_manifest(manifest: TreeManifest) -> Result<Self, BuildError> {
        let root = manifest.root.clone();
        TreeBuilder::new().manifest(manifest).build(&root)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Every reachable command with the route path leading to it.
    pub fn commands(&self) -> Vec<(Vec<&str>, &Command)> {
        fn walk<'t>(
            node: &'t Node,
            path: &mut Vec<&'t str>,
            out: &mut Vec<(Vec<&'t str>, &'t Command)>,
        ) {
            match node {
                Node::Command(command) => out.push((path.clone(), command)),
                Node::Group(group) => {
                    for route in &group.routes {
                        path.push(&route.path);
                        walk(&route.node, path, out);
                        path.pop();
                    }
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &mut Vec::new(), &mut out);
        out
    }
}

enum Registered<'s> {
    Group(&'s GroupDef),
    Command(&'s CommandDef),
}

/// Build-time traversal state: the group ids being walked and every node built so far,
/// keyed by id and the container scope it was built under.
#[derive(Default)]
struct Walk<'s> {
    stack: Vec<String>,
    built: HashMap<(&'s str, Vec<&'s str>), Arc<Node>>,
}

#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    containers: IndexMap<String, OptionsContainer>,
    commands: IndexMap<String, CommandDef>,
    groups: IndexMap<String, GroupDef>,
    duplicate: Option<String>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, container: OptionsContainer) -> Self {
        if self.containers.contains_key(&container.id) {
            self.note_duplicate(&container.id);
        } else {
            self.containers.insert(container.id.clone(), container);
        }
        self
    }

    pub fn command(mut self, command: CommandDef) -> Self {
        if self.is_node_id(&command.id) {
            self.note_duplicate(&command.id);
        } else {
            self.commands.insert(command.id.clone(), command);
        }
        self
    }

    pub fn group(mut self, group: GroupDef) -> Self {
        if self.is_node_id(&group.id) {
            self.note_duplicate(&group.id);
        } else {
            self.groups.insert(group.id.clone(), group);
        }
        self
    }

    /// Register every container, command and group of `manifest`.
    pub fn manifest(self, manifest: TreeManifest) -> Self {
        let builder = manifest.containers.into_iter().fold(self, Self::options);
        let builder = manifest.commands.into_iter().fold(builder, Self::command);
        manifest.groups.into_iter().fold(builder, Self::group)
    }

    fn is_node_id(&self, id: &str) -> bool {
        self.commands.contains_key(id) || self.groups.contains_key(id)
    }

    fn note_duplicate(&mut self, id: &str) {
        self.duplicate.get_or_insert_with(|| id.to_string());
    }

    /// Validate the registration reachable from `root` and materialise it.
    ///
    /// A node reached again under the same container scope is shared, not rebuilt.
    pub fn build(&self, root: &str) -> Result<CommandTree, BuildError> {
        if let Some(id) = &self.duplicate {
            return Err(BuildError::DuplicateId { id: id.clone() });
        }

        for container in self.containers.values() {
            let mapped: Vec<MappedOptionDefinition<'_>> = container
                .options
                .iter()
                .map(|definition| MappedOptionDefinition {
                    container: &container.id,
                    definition,
                })
                .collect();
            validate_options(&mapped)?;
        }

        let mut walk = Walk::default();
        let root = self.materialize(root, "<root>", &[], &mut walk)?;

        tracing::debug!(
            root = root.id(),
            nodes = walk.built.len(),
            "built command tree"
        );
        Ok(CommandTree { root })
    }

    fn materialize<'s>(
        &'s self,
        id: &str,
        from: &str,
        scope: &[&'s str],
        walk: &mut Walk<'s>,
    ) -> Result<Arc<Node>, BuildError> {
        if let Some(pos) = walk.stack.iter().position(|s| s == id) {
            let mut cycle = walk.stack[pos..].to_vec();
            cycle.push(id.to_string());
            return Err(BuildError::CircularReference { cycle });
        }

        let (key, registered) = if let Some((key, group)) = self.groups.get_key_value(id) {
            (key, Registered::Group(group))
        } else if let Some((key, command)) = self.commands.get_key_value(id) {
            (key, Registered::Command(command))
        } else {
            return Err(BuildError::UnknownReference {
                kind: "command or group",
                id: id.to_string(),
                from: from.to_string(),
            });
        };

        let cache_key = (key.as_str(), scope.to_vec());
        if let Some(node) = walk.built.get(&cache_key) {
            return Ok(Arc::clone(node));
        }

        let node = match registered {
            Registered::Group(group) => self.materialize_group(group, scope, walk)?,
            Registered::Command(command) => {
                Node::Command(self.materialize_command(command, scope)?)
            }
        };
        let node = Arc::new(node);
        walk.built.insert(cache_key, Arc::clone(&node));
        Ok(node)
    }

    fn materialize_group<'s>(
        &'s self,
        group: &'s GroupDef,
        scope: &[&'s str],
        walk: &mut Walk<'s>,
    ) -> Result<Node, BuildError> {
        if group.routes.iter().filter(|r| r.is_star()).count() > 1 {
            return Err(BuildError::MultipleStarRoutes {
                group: group.id.clone(),
            });
        }

        let mut inner = scope.to_vec();
        for container in &group.options {
            self.container(container, &group.id)?;
            if !inner.contains(&container.as_str()) {
                inner.push(container);
            }
        }
        if inner.len() > scope.len() {
            let mapped = self.mapped_options(inner.iter().copied(), &group.id)?;
            validate_options(&mapped)?;
        }

        walk.stack.push(group.id.clone());
        let mut routes = Vec::with_capacity(group.routes.len());
        for route in &group.routes {
            let node = self.materialize(&route.target, &group.id, &inner, walk)?;
            routes.push(Route {
                path: route.path.clone(),
                alias: route.alias.clone(),
                node,
            });
        }
        walk.stack.pop();

        Ok(Node::Group(Group {
            id: group.id.clone(),
            routes,
        }))
    }

    fn materialize_command<'s>(
        &'s self,
        command: &'s CommandDef,
        scope: &[&'s str],
    ) -> Result<Command, BuildError> {
        let mut ids: IndexSet<&str> = scope.iter().copied().collect();
        ids.extend(command.options.iter().map(String::as_str));

        let mapped = self.mapped_options(ids, &command.id)?;
        validate_options(&mapped)?;
        validate_parameters(&command.id, &command.parameters)?;

        let mut seen = HashSet::new();
        let options = mapped
            .iter()
            .filter(|m| seen.insert(m.definition.name.as_str()))
            .map(|m| m.definition.clone())
            .collect();

        Ok(Command {
            id: command.id.clone(),
            description: command.description.clone(),
            options,
            parameters: command.parameters.clone(),
        })
    }

    /// Every option of the given containers, tagged with its container.
    fn mapped_options<'s>(
        &'s self,
        ids: impl IntoIterator<Item = &'s str>,
        from: &str,
    ) -> Result<Vec<MappedOptionDefinition<'s>>, BuildError> {
        let mut mapped = Vec::new();
        for id in ids {
            let container = self.container(id, from)?;
            mapped.extend(
                container
                    .options
                    .iter()
                    .map(|definition| MappedOptionDefinition {
                        container: &container.id,
                        definition,
                    }),
            );
        }
        Ok(mapped)
    }

    fn container(&self, id: &str, from: &str) -> Result<&OptionsContainer, BuildError> {
        self.containers
            .get(id)
            .ok_or_else(|| BuildError::UnknownReference {
                kind: "options container",
                id: id.to_string(),
                from: from.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ParserSettings;
    use cliroute_metadata::{DesignType, RouteDef};

    fn db_tree() -> TreeBuilder {
        TreeBuilder::new()
            .options(
                OptionsContainer::new("Global")
                    .option(OptionDefinition::new("verbose").alias("v").of_type(DesignType::Boolean)),
            )
            .options(
                OptionsContainer::new("Create")
                    .option(OptionDefinition::new("name").of_type(DesignType::String))
                    .option(OptionDefinition::new("force").alias("f")),
            )
            .command(CommandDef::new("create").options("Create"))
            .command(CommandDef::new("drop").parameter(ParameterDefinition::new(1, "table")))
            .group(
                GroupDef::new("db")
                    .route(RouteDef::new("create", "create").alias("c"))
                    .route(RouteDef::new("drop", "drop")),
            )
            .group(
                GroupDef::new("app")
                    .options("Global")
                    .route(RouteDef::new("db", "db")),
            )
    }

    #[test]
    fn builds_and_lists_commands() {
        let tree = db_tree().build("app").unwrap();
        let commands = tree.commands();
        let paths: Vec<String> = commands.iter().map(|(p, _)| p.join(" ")).collect();
        assert_eq!(paths, ["db create", "db drop"]);

        let create = commands[0].1;
        let names: Vec<&str> = create.options.iter().map(|o| o.name.as_str()).collect();
        // Group-scoped containers come first.
        assert_eq!(names, ["verbose", "name", "force"]);
    }

    #[test]
    fn shared_container_is_deduplicated() {
        let tree = TreeBuilder::new()
            .options(OptionsContainer::new("Global").option(OptionDefinition::new("verbose")))
            .command(CommandDef::new("run").options("Global"))
            .group(
                GroupDef::new("app")
                    .options("Global")
                    .route(RouteDef::new("run", "run")),
            )
            .build("app")
            .unwrap();
        let commands = tree.commands();
        assert_eq!(commands[0].1.options.len(), 1);
    }

    #[test]
    fn same_option_in_two_containers_is_merged() {
        let port = || OptionDefinition::new("port").of_type(DesignType::Integer);
        let tree = TreeBuilder::new()
            .options(OptionsContainer::new("Server").option(port()))
            .options(OptionsContainer::new("Client").option(port()))
            .command(CommandDef::new("run").options("Server").options("Client"))
            .build("run")
            .unwrap();
        let Node::Command(run) = tree.root() else {
            panic!("expected a command root");
        };
        assert_eq!(run.options.len(), 1);
    }

    #[test]
    fn inconsistent_options_along_a_path_fail() {
        let err = TreeBuilder::new()
            .options(
                OptionsContainer::new("Server")
                    .option(OptionDefinition::new("port").of_type(DesignType::Integer)),
            )
            .options(
                OptionsContainer::new("Client")
                    .option(OptionDefinition::new("port").of_type(DesignType::String)),
            )
            .command(CommandDef::new("run").options("Client"))
            .group(
                GroupDef::new("app")
                    .options("Server")
                    .route(RouteDef::new("run", "run")),
            )
            .build("app")
            .unwrap_err();
        assert!(matches!(err, BuildError::InconsistentOption { field: "type", .. }));
    }

    #[test]
    fn sibling_branches_do_not_conflict() {
        // Different paths never see each other's containers.
        TreeBuilder::new()
            .options(
                OptionsContainer::new("A")
                    .option(OptionDefinition::new("port").of_type(DesignType::Integer)),
            )
            .options(
                OptionsContainer::new("B")
                    .option(OptionDefinition::new("port").of_type(DesignType::String)),
            )
            .command(CommandDef::new("a").options("A"))
            .command(CommandDef::new("b").options("B"))
            .group(
                GroupDef::new("app")
                    .route(RouteDef::new("a", "a"))
                    .route(RouteDef::new("b", "b")),
            )
            .build("app")
            .unwrap();
    }

    #[test]
    fn cycles_are_rejected() {
        let err = TreeBuilder::new()
            .command(CommandDef::new("leaf"))
            .group(GroupDef::new("a").route(RouteDef::new("b", "b")))
            .group(
                GroupDef::new("b")
                    .route(RouteDef::new("leaf", "leaf"))
                    .route(RouteDef::new("back", "a")),
            )
            .build("a")
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::CircularReference {
                cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()]
            }
        );
    }

    #[test]
    fn shared_subtree_is_not_a_cycle() {
        let tree = TreeBuilder::new()
            .command(CommandDef::new("list"))
            .group(GroupDef::new("items").route(RouteDef::new("list", "list")))
            .group(
                GroupDef::new("app")
                    .route(RouteDef::new("users", "items"))
                    .route(RouteDef::new("groups", "items")),
            )
            .build("app")
            .unwrap();
        assert_eq!(tree.commands().len(), 2);
    }

    #[test]
    fn diamond_chain_builds_each_group_once() {
        let mut builder = TreeBuilder::new()
            .command(CommandDef::new("leaf"))
            .group(GroupDef::new("g0").route(RouteDef::new("leaf", "leaf")));
        for i in 1..=40 {
            let below = format!("g{}", i - 1);
            builder = builder.group(
                GroupDef::new(format!("g{i}"))
                    .route(RouteDef::new("a", below.clone()))
                    .route(RouteDef::new("b", below)),
            );
        }
        let tree = builder.build("g40").unwrap();

        let Node::Group(top) = tree.root() else {
            panic!("expected a group root");
        };
        assert!(Arc::ptr_eq(&top.routes[0].node, &top.routes[1].node));

        let mut argv: Vec<&str> = (0..40).map(|i| if i % 2 == 0 { "a" } else { "b" }).collect();
        argv.push("leaf");
        let resolution = tree.resolve(&argv, &ParserSettings::default()).unwrap();
        assert_eq!(resolution.command.id, "leaf");
        assert_eq!(resolution.path.len(), 41);
    }

    #[test]
    fn shared_group_keeps_the_scope_of_each_path() {
        let tree = TreeBuilder::new()
            .options(OptionsContainer::new("Global").option(OptionDefinition::new("verbose")))
            .command(CommandDef::new("list"))
            .group(GroupDef::new("items").route(RouteDef::new("list", "list")))
            .group(
                GroupDef::new("scoped")
                    .options("Global")
                    .route(RouteDef::new("items", "items")),
            )
            .group(
                GroupDef::new("app")
                    .route(RouteDef::new("plain", "items"))
                    .route(RouteDef::new("scoped", "scoped")),
            )
            .build("app")
            .unwrap();

        let settings = ParserSettings::default();
        let r = tree
            .resolve(&["scoped", "items", "list", "--verbose"], &settings)
            .unwrap();
        assert_eq!(r.options.len(), 1);
        assert!(tree.resolve(&["plain", "list", "--verbose"], &settings).is_err());
    }

    #[test]
    fn group_scope_is_checked_without_commands() {
        let port = |design_type| OptionDefinition::new("port").of_type(design_type);
        let err = TreeBuilder::new()
            .options(OptionsContainer::new("Server").option(port(DesignType::Integer)))
            .options(OptionsContainer::new("Client").option(port(DesignType::String)))
            .group(GroupDef::new("app").options("Server").options("Client"))
            .build("app")
            .unwrap_err();
        assert!(matches!(err, BuildError::InconsistentOption { field: "type", .. }));

        // Re-attaching a container already in scope is not a duplicate.
        TreeBuilder::new()
            .options(OptionsContainer::new("Server").option(port(DesignType::Integer)))
            .command(CommandDef::new("run"))
            .group(GroupDef::new("inner").options("Server").route(RouteDef::new("run", "run")))
            .group(GroupDef::new("app").options("Server").route(RouteDef::new("inner", "inner")))
            .build("app")
            .unwrap();
    }

    #[test]
    fn registration_errors() {
        let err = TreeBuilder::new()
            .command(CommandDef::new("x"))
            .group(GroupDef::new("x"))
            .build("x")
            .unwrap_err();
        assert_eq!(err, BuildError::DuplicateId { id: "x".to_string() });

        let err = TreeBuilder::new()
            .group(GroupDef::new("app").route(RouteDef::new("run", "missing")))
            .build("app")
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownReference { kind: "command or group", .. }));

        let err = TreeBuilder::new()
            .command(CommandDef::new("run").options("Nope"))
            .build("run")
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownReference { kind: "options container", .. }));

        let err = TreeBuilder::new()
            .command(CommandDef::new("a"))
            .command(CommandDef::new("b"))
            .group(
                GroupDef::new("app")
                    .route(RouteDef::star("a"))
                    .route(RouteDef::star("b")),
            )
            .build("app")
            .unwrap_err();
        assert_eq!(err, BuildError::MultipleStarRoutes { group: "app".to_string() });
    }

    #[test]
    fn invalid_parameters_fail_the_build() {
        let err = TreeBuilder::new()
            .command(
                CommandDef::new("copy")
                    .parameter(ParameterDefinition::new(1, "a").optional())
                    .parameter(ParameterDefinition::new(2, "b")),
            )
            .build("copy")
            .unwrap_err();
        assert!(matches!(err, BuildError::RequiredAfterOptional { .. }));
    }

    #[test]
    fn unreferenced_containers_are_still_checked() {
        let err = TreeBuilder::new()
            .options(OptionsContainer::new("Loose").option(OptionDefinition::new("x").alias("xy")))
            .command(CommandDef::new("run"))
            .build("run")
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidAlias { .. }));
    }
}
