//! Command tree model.
//!
//! The model is an arena of [`CommandNode`]s with the root at index 0. It is
//! produced by [`CommandModelBuilder`](crate::CommandModelBuilder), validated
//! once, and never mutated afterwards.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::binder::{BindFn, CustomConverter, PairDeconstructor, ValueShape};

/// Name given to default commands registered without one.
pub const DEFAULT_COMMAND_NAME: &str = "__default_command";

/// Index of a node in the model arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of the executor registered for a leaf command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutorId(pub(crate) usize);

impl ExecutorId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Branch,
    Leaf(ExecutorId),
}

/// Which names are matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseSensitivity {
    pub commands: bool,
    pub long_options: bool,
}

impl Default for CaseSensitivity {
    fn default() -> Self {
        Self {
            commands: true,
            long_options: true,
        }
    }
}

impl CaseSensitivity {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn none() -> Self {
        Self {
            commands: false,
            long_options: false,
        }
    }
}

/// Resolver behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingOptions {
    /// Unknown options and unmatched arguments are errors instead of remaining arguments.
    pub strict: bool,
    pub case_sensitivity: CaseSensitivity,
    /// `--flag=value` sets the flag and sends the value to the remaining arguments.
    pub convert_flags_to_remaining: bool,
    /// Maximum edit distance for "Did you mean" suggestions.
    pub suggestion_distance: usize,
}

impl Default for ParsingOptions {
    fn default() -> Self {
        Self {
            strict: false,
            case_sensitivity: CaseSensitivity::default(),
            convert_flags_to_remaining: false,
            suggestion_distance: 2,
        }
    }
}

pub(crate) fn names_equal(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

/// A positional argument of a command.
#[derive(Debug, Clone)]
pub struct CommandArgument {
    pub field: String,
    pub value_name: String,
    pub position: usize,
    pub required: bool,
    pub is_vector: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub shape: ValueShape,
    pub converter: Option<CustomConverter>,
    pub(crate) bind: BindFn,
}

impl CommandArgument {
    /// `<NAME>` or `[NAME]`.
    pub fn display(&self) -> String {
        if self.required {
            format!("<{}>", self.value_name)
        } else {
            format!("[{}]", self.value_name)
        }
    }
}

/// An option of a command or branch.
#[derive(Debug, Clone)]
pub struct CommandOption {
    pub field: String,
    pub long_names: Vec<String>,
    pub short_names: Vec<char>,
    pub value_name: Option<String>,
    /// Declared without a value.
    pub is_flag: bool,
    pub value_is_optional: bool,
    pub allow_multiple: bool,
    pub required: bool,
    pub is_hidden: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub shape: ValueShape,
    pub converter: Option<CustomConverter>,
    pub pair_deconstructor: Option<Arc<dyn PairDeconstructor>>,
    pub(crate) bind: BindFn,
}

impl CommandOption {
    /// Preferred display name: the first long name, else the first short name.
    pub fn display(&self) -> String {
        match (self.long_names.first(), self.short_names.first()) {
            (Some(long), _) => format!("--{}", long),
            (None, Some(short)) => format!("-{}", short),
            (None, None) => self.field.clone(),
        }
    }

    pub fn matches_long(&self, name: &str, case_sensitive: bool) -> bool {
        self.long_names
            .iter()
            .any(|long| names_equal(long, name, case_sensitive))
    }

    pub fn matches_short(&self, name: &str) -> bool {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.short_names.contains(&c),
            _ => false,
        }
    }
}

/// A command, branch or the root.
#[derive(Debug, Clone)]
pub struct CommandNode {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Sorted by position.
    pub arguments: Vec<CommandArgument>,
    pub options: Vec<CommandOption>,
    pub kind: NodeKind,
    pub is_hidden: bool,
    pub is_default: bool,
    pub settings_type: &'static str,
}

impl CommandNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn executor(&self) -> Option<ExecutorId> {
        match self.kind {
            NodeKind::Leaf(id) => Some(id),
            NodeKind::Root | NodeKind::Branch => None,
        }
    }
}

/// The validated command tree.
#[derive(Debug, Clone)]
pub struct CommandModel {
    pub(crate) nodes: Vec<CommandNode>,
    pub(crate) options: ParsingOptions,
}

impl CommandModel {
    pub fn options(&self) -> &ParsingOptions {
        &self.options
    }

    pub fn root(&self) -> &CommandNode {
        &self.nodes[0]
    }

    /// Panics on an id from another model.
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &CommandNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &CommandNode)> {
        self.node(id)
            .children
            .iter()
            .map(move |child| (*child, self.node(*child)))
    }

    /// Find a child by name, then by alias.
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let sensitive = self.options.case_sensitivity.commands;
        self.children(parent)
            .find(|(_, node)| names_equal(&node.name, name, sensitive))
            .or_else(|| {
                self.children(parent).find(|(_, node)| {
                    node.aliases
                        .iter()
                        .any(|alias| names_equal(alias, name, sensitive))
                })
            })
            .map(|(id, _)| id)
    }

    pub fn default_child(&self, parent: NodeId) -> Option<NodeId> {
        self.children(parent)
            .find(|(_, node)| node.is_default)
            .map(|(id, _)| id)
    }

    /// Name used in messages. Default commands borrow their parent's name.
    pub fn display_name(&self, id: NodeId) -> String {
        let node = self.node(id);
        match node.parent {
            None => "<root>".to_string(),
            Some(parent) if node.name == DEFAULT_COMMAND_NAME => {
                if parent == NodeId::ROOT {
                    "<default>".to_string()
                } else {
                    self.node(parent).name.clone()
                }
            }
            Some(_) => node.name.clone(),
        }
    }

    /// Names from the root to `id`, root excluded.
    pub fn path_names(&self, id: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            if node.parent.is_some() {
                names.push(node.name.clone());
            }
            current = node.parent;
        }
        names.reverse();
        names
    }
}
