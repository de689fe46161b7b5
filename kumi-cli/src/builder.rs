//! Builds and validates the command model.
//!
//! Node-local schema problems (templates, argument layout, type/template
//! mismatches) are reported when a command is added. Problems that depend on
//! the whole tree or on case sensitivity are reported by [`CommandModelBuilder::build`].

use std::collections::HashSet;

use tracing::debug;

use crate::binder::{ValueKind, ValueShape};
use crate::error::ConfigError;
use crate::model::{
    names_equal, CommandArgument, CommandModel, CommandNode, CommandOption, ExecutorId, NodeId,
    NodeKind, ParsingOptions, DEFAULT_COMMAND_NAME,
};
use crate::schema::SettingsSchema;
use crate::template::{parse_argument_template, parse_option_template};

/// Incrementally assembles a [`CommandModel`].
///
/// ```
/// use kumi_cli::{CommandModelBuilder, CommandSettings, EmptySettings, ParsingOptions};
///
/// let mut builder = CommandModelBuilder::new(ParsingOptions::default());
/// let root = builder.root();
/// builder.add_command(root, "status", EmptySettings::schema()).unwrap();
/// let model = builder.build().unwrap();
/// assert!(model.find_child(root, "status").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct CommandModelBuilder {
    nodes: Vec<CommandNode>,
    options: ParsingOptions,
    executors: usize,
}

impl CommandModelBuilder {
    pub fn new(options: ParsingOptions) -> Self {
        let root = CommandNode {
            name: String::new(),
            aliases: Vec::new(),
            description: None,
            parent: None,
            children: Vec::new(),
            arguments: Vec::new(),
            options: Vec::new(),
            kind: NodeKind::Root,
            is_hidden: false,
            is_default: false,
            settings_type: "",
        };
        Self {
            nodes: vec![root],
            options,
            executors: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn options(&self) -> &ParsingOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ParsingOptions {
        &mut self.options
    }

    /// Add a leaf command under `parent`.
    pub fn add_command(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: SettingsSchema,
    ) -> Result<(NodeId, ExecutorId), ConfigError> {
        validate_command_name(name)?;
        let executor = ExecutorId(self.executors);
        let id = self.push_node(parent, name, schema, NodeKind::Leaf(executor))?;
        self.executors += 1;
        debug!(command = name, executor = executor.0, "registered command");
        Ok((id, executor))
    }

    /// Add the command that runs when `parent` is invoked without a sub-command.
    pub fn add_default_command(
        &mut self,
        parent: NodeId,
        schema: SettingsSchema,
    ) -> Result<(NodeId, ExecutorId), ConfigError> {
        let executor = ExecutorId(self.executors);
        let id = self.push_node(parent, DEFAULT_COMMAND_NAME, schema, NodeKind::Leaf(executor))?;
        self.executors += 1;
        let node = &mut self.nodes[id.0];
        node.is_default = true;
        node.is_hidden = true;
        debug!(parent = parent.0, executor = executor.0, "registered default command");
        Ok((id, executor))
    }

    /// Add a branch. Branch settings may declare options only.
    pub fn add_branch(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: SettingsSchema,
    ) -> Result<NodeId, ConfigError> {
        validate_command_name(name)?;
        if schema.has_arguments() {
            return Err(ConfigError::BranchWithArguments(name.to_string()));
        }
        let id = self.push_node(parent, name, schema, NodeKind::Branch)?;
        debug!(branch = name, "registered branch");
        Ok(id)
    }

    pub fn add_alias(&mut self, id: NodeId, alias: &str) -> Result<(), ConfigError> {
        validate_command_name(alias)?;
        self.nodes[id.0].aliases.push(alias.to_string());
        Ok(())
    }

    pub fn set_description(&mut self, id: NodeId, description: impl Into<String>) {
        self.nodes[id.0].description = Some(description.into());
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        self.nodes[id.0].is_hidden = hidden;
    }

    /// Mark an existing child as the default of its parent.
    pub fn set_default(&mut self, id: NodeId) {
        self.nodes[id.0].is_default = true;
    }

    fn push_node(
        &mut self,
        parent: NodeId,
        name: &str,
        schema: SettingsSchema,
        kind: NodeKind,
    ) -> Result<NodeId, ConfigError> {
        match self.nodes.get(parent.0) {
            Some(node) if !matches!(node.kind, NodeKind::Leaf(_)) => {}
            other => {
                return Err(ConfigError::ParentIsNotBranch {
                    parent: other.map_or_else(|| format!("#{}", parent.0), |n| n.name.clone()),
                    name: name.to_string(),
                })
            }
        }
        let (arguments, options) = build_parameters(name, &schema)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(CommandNode {
            name: name.to_string(),
            aliases: Vec::new(),
            description: None,
            parent: Some(parent),
            children: Vec::new(),
            arguments,
            options,
            kind,
            is_hidden: false,
            is_default: false,
            settings_type: schema.type_name(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Run tree-wide validation and freeze the model.
    pub fn build(self) -> Result<CommandModel, ConfigError> {
        if self.nodes[0].children.is_empty() {
            return Err(ConfigError::NoCommandsConfigured);
        }

        for node in &self.nodes {
            if node.kind == NodeKind::Branch && node.children.is_empty() {
                return Err(ConfigError::BranchWithoutChildren(node.name.clone()));
            }
            self.check_children(node)?;
            self.check_options(node)?;
        }

        debug!(nodes = self.nodes.len(), "command model built");
        Ok(CommandModel {
            nodes: self.nodes,
            options: self.options,
        })
    }

    fn check_children(&self, node: &CommandNode) -> Result<(), ConfigError> {
        let sensitive = self.options.case_sensitivity.commands;
        let parent = display_name(node);
        let mut seen: Vec<&str> = Vec::new();
        let mut defaults = 0;

        for child in node.children.iter().map(|id| &self.nodes[id.0]) {
            if child.is_default {
                defaults += 1;
            }
            for name in std::iter::once(&child.name).chain(child.aliases.iter()) {
                if seen.iter().any(|s| names_equal(s, name, sensitive)) {
                    return Err(ConfigError::DuplicateCommand {
                        parent: parent.clone(),
                        name: name.clone(),
                    });
                }
                seen.push(name);
            }
        }

        if defaults > 1 {
            return Err(ConfigError::MultipleDefaultCommands(parent));
        }
        Ok(())
    }

    fn check_options(&self, node: &CommandNode) -> Result<(), ConfigError> {
        let sensitive = self.options.case_sensitivity.long_options;
        let mut longs: Vec<&str> = Vec::new();
        let mut shorts: HashSet<char> = HashSet::new();

        for option in &node.options {
            for long in &option.long_names {
                if longs.iter().any(|l| names_equal(l, long, sensitive)) {
                    return Err(ConfigError::DuplicateOption {
                        command: display_name(node),
                        option: format!("--{}", long),
                    });
                }
                longs.push(long);
            }
            for short in &option.short_names {
                if !shorts.insert(*short) {
                    return Err(ConfigError::DuplicateOption {
                        command: display_name(node),
                        option: format!("-{}", short),
                    });
                }
            }
        }
        Ok(())
    }
}

fn display_name(node: &CommandNode) -> String {
    if node.parent.is_none() {
        "<root>".to_string()
    } else {
        node.name.clone()
    }
}

fn validate_command_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && !name.starts_with('-')
        && !name.chars().any(|c| c.is_whitespace() || c.is_control());
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidCommandName(name.to_string()))
    }
}

fn build_parameters(
    command: &str,
    schema: &SettingsSchema,
) -> Result<(Vec<CommandArgument>, Vec<CommandOption>), ConfigError> {
    let mut fields: HashSet<&str> = HashSet::new();
    for field in schema
        .arguments
        .iter()
        .map(|a| a.field.as_str())
        .chain(schema.options.iter().map(|o| o.field.as_str()))
    {
        if !fields.insert(field) {
            return Err(ConfigError::DuplicateField {
                command: command.to_string(),
                field: field.to_string(),
            });
        }
    }

    let arguments = build_arguments(command, schema)?;
    let options = schema
        .options
        .iter()
        .map(|decl| build_option(command, decl))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((arguments, options))
}

fn build_arguments(command: &str, schema: &SettingsSchema) -> Result<Vec<CommandArgument>, ConfigError> {
    let mut arguments = Vec::with_capacity(schema.arguments.len());

    for (index, decl) in schema.arguments.iter().enumerate() {
        let template = parse_argument_template(&decl.template).map_err(|source| ConfigError::Template {
            command: command.to_string(),
            parameter: decl.field.clone(),
            source,
        })?;

        let unsupported = |shape: &ValueShape| ConfigError::UnsupportedArgumentType {
            command: command.to_string(),
            argument: decl.field.clone(),
            type_name: shape.type_name,
        };
        match decl.shape.kind {
            ValueKind::Flag | ValueKind::FlagValue | ValueKind::Pairs(_) => {
                return Err(unsupported(&decl.shape))
            }
            ValueKind::Scalar | ValueKind::Vector => {}
        }

        if template.required && decl.default_value.is_some() {
            return Err(ConfigError::RequiredArgumentWithDefault {
                command: command.to_string(),
                argument: format!("<{}>", template.value_name),
            });
        }

        arguments.push(CommandArgument {
            field: decl.field.clone(),
            value_name: template.value_name,
            position: decl.position.unwrap_or(index),
            required: template.required,
            is_vector: decl.shape.kind == ValueKind::Vector,
            default_value: decl.default_value.clone(),
            description: decl.description.clone(),
            shape: decl.shape,
            converter: decl.converter.clone(),
            bind: decl.bind,
        });
    }

    arguments.sort_by_key(|a| a.position);

    for pair in arguments.windows(2) {
        if pair[0].position == pair[1].position {
            return Err(ConfigError::DuplicateArgumentPosition {
                command: command.to_string(),
                position: pair[0].position,
            });
        }
    }

    let vectors: Vec<usize> = arguments
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_vector)
        .map(|(i, _)| i)
        .collect();
    if vectors.len() > 1 {
        return Err(ConfigError::MultipleVectorArguments(command.to_string()));
    }
    if let Some(&index) = vectors.first() {
        if index + 1 != arguments.len() {
            return Err(ConfigError::VectorArgumentNotLast {
                command: command.to_string(),
                argument: arguments[index].display(),
            });
        }
    }

    Ok(arguments)
}

fn build_option(command: &str, decl: &crate::schema::OptionDecl) -> Result<CommandOption, ConfigError> {
    let template = parse_option_template(&decl.template).map_err(|source| ConfigError::Template {
        command: command.to_string(),
        parameter: decl.field.clone(),
        source,
    })?;
    let display = match (template.long_names.first(), template.short_names.first()) {
        (Some(long), _) => format!("--{}", long),
        (None, Some(short)) => format!("-{}", short),
        (None, None) => decl.field.clone(),
    };
    let kind = decl.shape.kind;

    match &template.value {
        None if kind != ValueKind::Flag => {
            return Err(ConfigError::FlagMustBeBoolean {
                command: command.to_string(),
                option: display,
                type_name: decl.shape.type_name,
            })
        }
        Some(value) if value.optional && kind != ValueKind::FlagValue => {
            return Err(ConfigError::OptionalValueRequiresFlagValue {
                command: command.to_string(),
                option: display,
                type_name: decl.shape.type_name,
            })
        }
        _ => {}
    }

    let is_pairs = matches!(kind, ValueKind::Pairs(_));
    if is_pairs && decl.converter.is_some() {
        return Err(ConfigError::PairOptionWithConverter {
            command: command.to_string(),
            option: display,
        });
    }
    if !is_pairs && decl.pair_deconstructor.is_some() {
        return Err(ConfigError::DeconstructorWithoutPairs {
            command: command.to_string(),
            option: display,
        });
    }

    Ok(CommandOption {
        field: decl.field.clone(),
        long_names: template.long_names,
        short_names: template.short_names,
        value_is_optional: template.value.as_ref().is_some_and(|v| v.optional),
        is_flag: template.value.is_none(),
        value_name: template.value.map(|v| v.name),
        allow_multiple: decl.shape.is_multiple(),
        required: decl.required,
        is_hidden: decl.hidden,
        default_value: decl.default_value.clone(),
        description: decl.description.clone(),
        shape: decl.shape,
        converter: decl.converter.clone(),
        pair_deconstructor: decl.pair_deconstructor.clone(),
        bind: decl.bind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{CustomConverter, FlagValue};
    use crate::error::TemplateErrorKind;
    use crate::schema::{CommandSettings, EmptySettings};
    use crate::CaseSensitivity;
    use std::collections::HashMap;

    fn builder() -> CommandModelBuilder {
        CommandModelBuilder::new(ParsingOptions::default())
    }

    fn schema() -> SettingsSchema {
        SettingsSchema::new("Test")
    }

    #[test]
    fn test_empty_model_is_rejected() {
        assert_eq!(builder().build().unwrap_err(), ConfigError::NoCommandsConfigured);
    }

    #[test]
    fn test_commands_cannot_nest_under_a_leaf() {
        let mut b = builder();
        let (leaf, _) = b.add_command(NodeId::ROOT, "run", schema()).unwrap();
        let err = b.add_command(leaf, "inner", schema()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ParentIsNotBranch {
                parent: "run".to_string(),
                name: "inner".to_string(),
            }
        );
        assert!(b.add_branch(leaf, "group", schema()).is_err());
        assert!(b.add_default_command(leaf, schema()).is_err());
        assert!(b.build().is_ok());
    }

    #[test]
    fn test_two_vector_arguments_fail_at_registration() {
        let mut b = builder();
        let mut s = schema();
        s.argument::<Vec<String>>("a", "[A]");
        s.argument::<Vec<String>>("b", "[B]");
        let err = b.add_command(NodeId::ROOT, "copy", s).unwrap_err();
        assert_eq!(err, ConfigError::MultipleVectorArguments("copy".to_string()));
    }

    #[test]
    fn test_vector_argument_must_be_last() {
        let mut b = builder();
        let mut s = schema();
        s.argument::<Vec<String>>("files", "<FILES>");
        s.argument::<String>("target", "<TARGET>");
        let err = b.add_command(NodeId::ROOT, "copy", s).unwrap_err();
        assert_eq!(
            err,
            ConfigError::VectorArgumentNotLast {
                command: "copy".to_string(),
                argument: "<FILES>".to_string()
            }
        );
    }

    #[test]
    fn test_explicit_positions_reorder_arguments() {
        let mut b = builder();
        let mut s = schema();
        s.argument::<String>("second", "<SECOND>").position(1);
        s.argument::<String>("first", "<FIRST>").position(0);
        let (id, _) = b.add_command(NodeId::ROOT, "run", s).unwrap();
        let model = b.build().unwrap();
        let names: Vec<_> = model.node(id).arguments.iter().map(|a| a.field.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn test_duplicate_positions() {
        let mut b = builder();
        let mut s = schema();
        s.argument::<String>("a", "<A>").position(0);
        s.argument::<String>("b", "<B>").position(0);
        assert!(matches!(
            b.add_command(NodeId::ROOT, "run", s),
            Err(ConfigError::DuplicateArgumentPosition { position: 0, .. })
        ));
    }

    #[test]
    fn test_required_argument_with_default() {
        let mut b = builder();
        let mut s = schema();
        s.argument::<String>("name", "<NAME>").default_value("x");
        assert!(matches!(
            b.add_command(NodeId::ROOT, "run", s),
            Err(ConfigError::RequiredArgumentWithDefault { .. })
        ));
    }

    #[test]
    fn test_invalid_template_is_a_config_error() {
        let mut b = builder();
        let mut s = schema();
        s.option::<String>("name", "--name <A> <B>");
        match b.add_command(NodeId::ROOT, "run", s) {
            Err(ConfigError::Template { source, .. }) => {
                assert_eq!(source.kind, TemplateErrorKind::MultipleValuesNotSupported)
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_optional_value_requires_flag_value() {
        let mut b = builder();
        let mut s = schema();
        s.option::<i32>("port", "--port [PORT]");
        assert!(matches!(
            b.add_command(NodeId::ROOT, "serve", s),
            Err(ConfigError::OptionalValueRequiresFlagValue { .. })
        ));

        let mut s = schema();
        s.option::<FlagValue<i32>>("port", "--port [PORT]");
        assert!(b.add_command(NodeId::ROOT, "serve", s).is_ok());
    }

    #[test]
    fn test_valueless_option_must_be_bool() {
        let mut b = builder();
        let mut s = schema();
        s.option::<i32>("count", "--count");
        assert!(matches!(
            b.add_command(NodeId::ROOT, "run", s),
            Err(ConfigError::FlagMustBeBoolean { .. })
        ));
    }

    #[test]
    fn test_pair_option_with_converter() {
        let mut b = builder();
        let mut s = schema();
        s.option::<HashMap<String, String>>("vars", "--var <VAR>")
            .converter(CustomConverter::new(|raw: &str| Ok::<_, String>(raw.to_string())));
        assert!(matches!(
            b.add_command(NodeId::ROOT, "run", s),
            Err(ConfigError::PairOptionWithConverter { .. })
        ));
    }

    #[test]
    fn test_duplicate_options_respect_case_sensitivity() {
        let mut s = schema();
        s.option::<bool>("a", "--force");
        s.option::<bool>("b", "--FORCE");

        let mut sensitive = builder();
        sensitive.add_command(NodeId::ROOT, "run", s.clone()).unwrap();
        assert!(sensitive.build().is_ok());

        let mut insensitive = builder();
        insensitive.options_mut().case_sensitivity = CaseSensitivity::none();
        insensitive.add_command(NodeId::ROOT, "run", s).unwrap();
        assert!(matches!(
            insensitive.build(),
            Err(ConfigError::DuplicateOption { .. })
        ));
    }

    #[test]
    fn test_duplicate_command_names_and_aliases() {
        let mut b = builder();
        let (dog, _) = b.add_command(NodeId::ROOT, "dog", EmptySettings::schema()).unwrap();
        b.add_command(NodeId::ROOT, "cat", EmptySettings::schema()).unwrap();
        b.add_alias(dog, "cat").unwrap();
        assert!(matches!(b.build(), Err(ConfigError::DuplicateCommand { .. })));
    }

    #[test]
    fn test_branch_rules() {
        let mut b = builder();
        let mut s = schema();
        s.argument::<String>("name", "<NAME>");
        assert_eq!(
            b.add_branch(NodeId::ROOT, "animal", s).unwrap_err(),
            ConfigError::BranchWithArguments("animal".to_string())
        );

        b.add_branch(NodeId::ROOT, "empty", EmptySettings::schema()).unwrap();
        assert_eq!(
            b.build().unwrap_err(),
            ConfigError::BranchWithoutChildren("empty".to_string())
        );
    }

    #[test]
    fn test_multiple_default_commands() {
        let mut b = builder();
        b.add_default_command(NodeId::ROOT, EmptySettings::schema()).unwrap();
        let (other, _) = b.add_command(NodeId::ROOT, "other", EmptySettings::schema()).unwrap();
        b.set_default(other);
        assert!(matches!(
            b.build(),
            Err(ConfigError::MultipleDefaultCommands(_))
        ));
    }

    #[test]
    fn test_invalid_command_name() {
        let mut b = builder();
        assert!(b.add_command(NodeId::ROOT, "--bad", EmptySettings::schema()).is_err());
        assert!(b.add_command(NodeId::ROOT, "two words", EmptySettings::schema()).is_err());
    }

    #[test]
    fn test_find_child_prefers_name_over_alias() {
        let mut b = builder();
        let (first, _) = b.add_command(NodeId::ROOT, "first", EmptySettings::schema()).unwrap();
        let (second, _) = b.add_command(NodeId::ROOT, "second", EmptySettings::schema()).unwrap();
        b.add_alias(first, "f").unwrap();
        b.add_alias(second, "s").unwrap();
        let model = b.build().unwrap();
        assert_eq!(model.find_child(NodeId::ROOT, "second"), Some(second));
        assert_eq!(model.find_child(NodeId::ROOT, "f"), Some(first));
        assert_eq!(model.find_child(NodeId::ROOT, "x"), None);
        assert_eq!(model.path_names(second), vec!["second".to_string()]);
    }
}
