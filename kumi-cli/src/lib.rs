//! # kumi-cli
//!
//! The command-line grammar engine behind `kumi`.
//!
//! Parsing is a pipeline of pure, synchronous stages:
//!
//! 1. [`tokenize`] turns the argument vector into a [`TokenStream`].
//! 2. [`CommandTreeResolver`] walks the stream against a [`CommandModel`] and
//!    produces a [`ResolvedCommandTree`].
//! 3. [`Binder`] converts the resolved strings into typed [`CommandSettings`].
//!
//! The model is assembled with [`CommandModelBuilder`], which rejects schema
//! mistakes as [`ConfigError`]s before any input is parsed. User input
//! problems surface as [`ParseError`]s carrying enough context to render a
//! caret [`Diagnostic`].
//!
//! ## Example
//!
//! ```
//! use kumi_cli::*;
//!
//! struct Add {
//!     name: String,
//!     count: Option<u32>,
//! }
//!
//! impl CommandSettings for Add {
//!     fn declare(schema: &mut SettingsSchema) {
//!         schema.argument::<String>("name", "<NAME>");
//!         schema.option::<Option<u32>>("count", "-c|--count <N>");
//!     }
//!
//!     fn bind(values: &mut BoundValues) -> Result<Self, BindError> {
//!         Ok(Add {
//!             name: values.take("name")?,
//!             count: values.take("count")?,
//!         })
//!     }
//! }
//!
//! let mut builder = CommandModelBuilder::new(ParsingOptions::default());
//! builder.add_command(NodeId::ROOT, "add", Add::schema()).unwrap();
//! let model = builder.build().unwrap();
//!
//! let args: Vec<String> = ["add", "kumi", "--count=3"].iter().map(|s| s.to_string()).collect();
//! let tree = CommandTreeResolver::new(&model).resolve_args(&args).unwrap();
//!
//! let registry = ConverterRegistry::default();
//! let leaf = tree.leaf().unwrap();
//! let add: Add = Binder::new(&model, &registry).bind(leaf).unwrap();
//! assert_eq!(add.name, "kumi");
//! assert_eq!(add.count, Some(3));
//! ```

mod binder;
mod builder;
mod diagnostic;
mod error;
mod model;
mod resolver;
mod schema;
mod suggest;
mod template;
mod token;
mod tokenizer;

pub use binder::{
    BindFn, Bindable, Binder, BoundValues, ConverterRegistry, CustomConverter,
    DefaultPairDeconstructor, FlagValue, Lookup, PairDeconstructor, PairKind, Scalar, SlotInput,
    ValueEnum, ValueKind, ValueShape,
};
pub use builder::CommandModelBuilder;
pub use diagnostic::Diagnostic;
pub use error::{
    BindError, ConfigError, ParseError, ParseErrorKind, TemplateError, TemplateErrorKind,
    ValidationError,
};
pub use model::{
    CaseSensitivity, CommandArgument, CommandModel, CommandNode, CommandOption, ExecutorId,
    NodeId, NodeKind, ParsingOptions, DEFAULT_COMMAND_NAME,
};
pub use resolver::{CommandTreeResolver, Remaining, ResolvedCommandTree, ResolvedNode};
pub use schema::{ArgumentDecl, CommandSettings, EmptySettings, OptionDecl, SettingsSchema};
pub use suggest::{suggest, Candidate};
pub use template::{
    parse_argument_template, parse_option_template, ArgumentTemplate, OptionTemplate,
    ValueTemplate,
};
pub use token::{CommandLine, Token, TokenKind, TokenStream};
pub use tokenizer::{split_command_line, tokenize};
