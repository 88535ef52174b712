use crate::error::{ParseError, ParseResult};
use crate::options::{EvaluatedOption, bind_options};
use crate::parameters::{EvaluatedParameter, bind_parameters};
use crate::settings::ParserSettings;
use crate::tokenizer::{ArgumentsContext, tokenize};
use crate::tree::{Command, CommandTree, Node, Route};

/// Arguments after one routing step, with the route that step selected.
#[derive(Debug, Clone)]
pub struct EvaluatedContext<'t> {
    pub context: ArgumentsContext,
    pub route: Option<&'t Route>,
}

/// Consume at most one path segment.
///
/// The first command candidate is matched against every named route by path or
/// alias, first match in declaration order. On a match the candidate is stripped.
/// Otherwise the star route, if any, is selected without consuming anything.
pub fn resolve_route<'t>(
    mut context: ArgumentsContext,
    routes: &'t [Route],
) -> EvaluatedContext<'t> {
    let named = context
        .possible_commands
        .first()
        .and_then(|token| routes.iter().find(|route| route.matches(token)));

    let route = match named {
        Some(route) => {
            context.consume_command();
            Some(route)
        }
        None => routes.iter().find(|route| route.is_star()),
    };

    EvaluatedContext { context, route }
}

/// Result of a successful resolution. Borrows definitions from the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'t> {
    pub command: &'t Command,
    /// Route paths taken from the root, `*` for star routes.
    pub path: Vec<&'t str>,
    pub options: Vec<EvaluatedOption<'t>>,
    pub parameters: Vec<EvaluatedParameter<'t>>,
}

/// Resolve `argv` against `tree`: tokenize, route down to a command, bind.
pub fn resolve<'t, S: AsRef<str>>(
    tree: &'t CommandTree,
    argv: &[S],
    settings: &ParserSettings,
) -> ParseResult<Resolution<'t>> {
    let mut context = tokenize(argv, settings);
    let mut node = tree.root();
    let mut path = Vec::new();

    let command = loop {
        let group = match node {
            Node::Command(command) => break command,
            Node::Group(group) => group,
        };

        let evaluated = resolve_route(context, &group.routes);
        context = evaluated.context;
        let Some(route) = evaluated.route else {
            return Err(match context.possible_commands.first() {
                Some(token) => ParseError::UnknownCommand {
                    group: group.id.clone(),
                    token: token.clone(),
                },
                None => ParseError::MissingCommand {
                    group: group.id.clone(),
                },
            });
        };

        tracing::trace!(group = %group.id, route = %route.path, "matched route");
        path.push(route.path.as_str());
        node = route.node.as_ref();
    };

    tracing::debug!(command = %command.id, path = ?path, "resolved command");

    let options = bind_options(&command.options, &context.options, settings)?;
    let parameters = bind_parameters(&command.parameters, &context.possible_parameters, settings)?;

    Ok(Resolution {
        command,
        path,
        options,
        parameters,
    })
}

impl CommandTree {
    pub fn resolve<S: AsRef<str>>(
        &self,
        argv: &[S],
        settings: &ParserSettings,
    ) -> ParseResult<Resolution<'_>> {
        resolve(self, argv, settings)
    }
}

impl<'t> Resolution<'t> {
    /// Bound option by declared name.
    pub fn option(&self, name: &str) -> Option<&EvaluatedOption<'t>> {
        self.options.iter().find(|o| o.definition.name == name)
    }

    /// Bound parameter by declared name.
    pub fn parameter(&self, name: &str) -> Option<&EvaluatedParameter<'t>> {
        self.parameters.iter().find(|p| p.definition.name == name)
    }
}
