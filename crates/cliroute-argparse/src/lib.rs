//! Argument resolution for nested command trees.
//!
//! Resolution is a pure, synchronous transform:
//! - [`tokenizer`] splits argv into options and positional candidates
//! - [`resolver`] walks a [`CommandTree`] from the root, consuming one command name
//!   per group level
//! - [`options`] and [`parameters`] bind what is left to the leaf command's
//!   declarations, calling [`cast`] per value
//!
//! Structural checks run once, when [`TreeBuilder::build`] materialises the tree, so a
//! bad registration never reaches per-invocation parsing.
//!
//! ```
//! use cliroute_argparse::{ParserSettings, TreeBuilder, Value};
//! use cliroute_metadata::{CommandDef, DesignType, GroupDef, OptionDefinition, OptionsContainer, RouteDef};
//!
//! let tree = TreeBuilder::new()
//!     .options(
//!         OptionsContainer::new("Create")
//!             .option(OptionDefinition::new("name").of_type(DesignType::String))
//!             .option(OptionDefinition::new("force").alias("f")),
//!     )
//!     .command(CommandDef::new("create").options("Create"))
//!     .group(GroupDef::new("db").route(RouteDef::new("create", "create")))
//!     .group(GroupDef::new("app").route(RouteDef::new("db", "db")))
//!     .build("app")
//!     .unwrap();
//!
//! let resolution = tree
//!     .resolve(&["db", "create", "--name", "x", "-f"], &ParserSettings::default())
//!     .unwrap();
//! assert_eq!(resolution.command.id, "create");
//! assert_eq!(resolution.option("name").unwrap().value, Value::String("x".into()));
//! assert_eq!(resolution.option("force").unwrap().value, Value::Bool(true));
//! ```

pub mod cast;
pub mod error;
pub mod options;
pub mod parameters;
pub mod resolver;
pub mod settings;
pub mod tokenizer;
pub mod tree;

pub use cast::Value;
pub use error::{
    ArgumentKind, BuildError, OptionParsingError, ParameterParsingError, ParseError,
    ParseResult, TypeCastingError,
};
pub use options::{EvaluatedOption, MappedOptionDefinition, bind_options, validate_options};
pub use parameters::{EvaluatedParameter, bind_parameters, validate_parameters};
pub use resolver::{EvaluatedContext, Resolution, resolve, resolve_route};
pub use settings::ParserSettings;
pub use tokenizer::{ArgumentsContext, ParsedOption, RawValue, Scalar, tokenize};
pub use tree::{Command, CommandTree, Group, Node, Route, TreeBuilder};
