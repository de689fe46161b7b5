//! Resolves a token stream against the command model.
//!
//! The resolver walks the tokens once, left to right, as an explicit state
//! machine. It selects the path from the root to a leaf command and records
//! the raw values assigned to every argument and option along that path.
//! Values are not converted here; that is the binder's job.

use tracing::debug;

use crate::error::{ParseError, ParseErrorKind};
use crate::model::{CommandModel, NodeId, NodeKind};
use crate::suggest::{suggest, Candidate};
use crate::token::{Token, TokenKind, TokenStream};
use crate::tokenizer::tokenize;

/// Values collected for one node of the resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    pub id: NodeId,
    /// Values per argument, indexed like the node's arguments.
    pub arguments: Vec<Vec<String>>,
    /// Option occurrences in encounter order: option index and value.
    pub options: Vec<(usize, Option<String>)>,
}

impl ResolvedNode {
    fn new(model: &CommandModel, id: NodeId) -> Self {
        Self {
            id,
            arguments: vec![Vec::new(); model.node(id).arguments.len()],
            options: Vec::new(),
        }
    }

    pub fn argument_values(&self, index: usize) -> &[String] {
        self.arguments.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every occurrence of option `index`; `None` entries were given without a value.
    pub fn option_values(&self, index: usize) -> Vec<Option<String>> {
        self.options
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn has_option(&self, index: usize) -> bool {
        self.options.iter().any(|(i, _)| *i == index)
    }
}

/// Input the command tree did not consume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remaining {
    /// Unknown options with their best-effort value, keyed as typed (`--foo`, `-f`).
    pub parsed: Vec<(String, Option<String>)>,
    /// Everything unconsumed, including what follows `--`.
    pub raw: Vec<String>,
}

impl Remaining {
    pub fn get<'a>(&'a self, key: &'a str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        self.parsed
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.parsed.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty() && self.raw.is_empty()
    }
}

/// Successful resolution: the root-to-leaf path and the remaining input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommandTree {
    /// Starts at the root, ends at the selected leaf.
    pub path: Vec<ResolvedNode>,
    pub remaining: Remaining,
}

impl ResolvedCommandTree {
    pub fn leaf(&self) -> Option<&ResolvedNode> {
        self.path.last()
    }

    pub fn find(&self, id: NodeId) -> Option<&ResolvedNode> {
        self.path.iter().find(|node| node.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Root,
    InBranch,
    InCommand,
    InOptionValue { option: usize, token: Token },
    Remaining,
}

/// Walks token streams against a model. Holds no per-parse state.
#[derive(Debug, Clone, Copy)]
pub struct CommandTreeResolver<'m> {
    model: &'m CommandModel,
}

impl<'m> CommandTreeResolver<'m> {
    pub fn new(model: &'m CommandModel) -> Self {
        Self { model }
    }

    /// Tokenize and resolve.
    pub fn resolve_args(&self, args: &[String]) -> Result<ResolvedCommandTree, ParseError> {
        self.resolve(tokenize(args)?)
    }

    pub fn resolve(&self, stream: TokenStream) -> Result<ResolvedCommandTree, ParseError> {
        let walk = Walk {
            model: self.model,
            path: vec![ResolvedNode::new(self.model, NodeId::ROOT)],
            stream,
            remaining: Remaining::default(),
            state: State::Root,
        };
        walk.run()
    }
}

struct Walk<'m> {
    model: &'m CommandModel,
    stream: TokenStream,
    path: Vec<ResolvedNode>,
    remaining: Remaining,
    state: State,
}

impl<'m> Walk<'m> {
    fn run(mut self) -> Result<ResolvedCommandTree, ParseError> {
        while let Some(token) = self.stream.peek().cloned() {
            match self.state.clone() {
                State::Remaining => {
                    self.stream.consume();
                    self.remaining.raw.push(token.value);
                }
                State::InOptionValue { option, token: option_token } => {
                    self.option_value(option, option_token, token)?
                }
                State::Root | State::InBranch => self.expect_command(token)?,
                State::InCommand => self.in_command(token)?,
            }
        }
        self.finish()
    }

    fn error(&self, kind: ParseErrorKind, token: Option<Token>) -> ParseError {
        ParseError::new(kind, self.stream.command_line(), token)
    }

    fn current(&self) -> NodeId {
        self.path.last().map_or(NodeId::ROOT, |node| node.id)
    }

    fn current_mut(&mut self) -> Option<&mut ResolvedNode> {
        self.path.last_mut()
    }

    fn state_for(&self, id: NodeId) -> State {
        match self.model.node(id).kind {
            NodeKind::Root => State::Root,
            NodeKind::Branch => State::InBranch,
            NodeKind::Leaf(_) => State::InCommand,
        }
    }

    fn enter(&mut self, id: NodeId) {
        debug!(command = %self.model.node(id).name, "entering command");
        self.path.push(ResolvedNode::new(self.model, id));
        self.state = self.state_for(id);
    }

    fn expect_command(&mut self, token: Token) -> Result<(), ParseError> {
        let model = self.model;
        let current = self.current();
        match token.kind {
            TokenKind::String => {
                if let Some(child) = model.find_child(current, &token.value) {
                    self.stream.consume();
                    self.enter(child);
                } else if let Some(default) = model.default_child(current) {
                    self.enter(default);
                } else {
                    let suggestion = self.suggest_command(current, &token.value);
                    return Err(self.error(
                        ParseErrorKind::UnknownCommand {
                            name: token.value.clone(),
                            suggestion,
                        },
                        Some(token),
                    ));
                }
            }
            TokenKind::LongOption | TokenKind::ShortOption => {
                if let Some(index) = self.find_option(current, &token) {
                    self.option(index, token)?;
                } else if let Some(default) = model.default_child(current) {
                    self.enter(default);
                } else {
                    self.unknown_option(token)?;
                }
            }
            TokenKind::Separator => {
                self.stream.consume();
                self.state = State::Remaining;
            }
        }
        Ok(())
    }

    fn in_command(&mut self, token: Token) -> Result<(), ParseError> {
        let current = self.current();
        match token.kind {
            TokenKind::String => match self.next_argument_slot() {
                Some(index) => {
                    self.stream.consume();
                    if let Some(node) = self.current_mut() {
                        node.arguments[index].push(token.value);
                    }
                }
                None if self.model.options().strict => {
                    return Err(self.error(
                        ParseErrorKind::CouldNotMatchArgument {
                            value: token.value.clone(),
                        },
                        Some(token),
                    ));
                }
                None => {
                    self.stream.consume();
                    self.remaining.raw.push(token.value);
                }
            },
            TokenKind::LongOption | TokenKind::ShortOption => {
                match self.find_option(current, &token) {
                    Some(index) => self.option(index, token)?,
                    None => self.unknown_option(token)?,
                }
            }
            TokenKind::Separator => {
                self.stream.consume();
                self.state = State::Remaining;
            }
        }
        Ok(())
    }

    /// First argument without a value, or the trailing vector argument.
    fn next_argument_slot(&self) -> Option<usize> {
        let resolved = self.path.last()?;
        let node = self.model.node(resolved.id);
        node.arguments
            .iter()
            .enumerate()
            .find(|(i, arg)| arg.is_vector || resolved.arguments[*i].is_empty())
            .map(|(i, _)| i)
    }

    fn find_option(&self, id: NodeId, token: &Token) -> Option<usize> {
        let sensitive = self.model.options().case_sensitivity.long_options;
        self.model
            .node(id)
            .options
            .iter()
            .position(|option| match token.kind {
                TokenKind::LongOption => option.matches_long(&token.value, sensitive),
                TokenKind::ShortOption => option.matches_short(&token.value),
                TokenKind::String | TokenKind::Separator => false,
            })
    }

    fn record_option(&mut self, index: usize, value: Option<String>) {
        if let Some(node) = self.current_mut() {
            node.options.push((index, value));
        }
    }

    fn option(&mut self, index: usize, token: Token) -> Result<(), ParseError> {
        self.stream.consume();
        let is_flag = self.model.node(self.current()).options[index].is_flag;

        if !is_flag {
            self.state = State::InOptionValue {
                option: index,
                token,
            };
            return Ok(());
        }

        let assigned = self
            .stream
            .peek()
            .filter(|next| next.kind == TokenKind::String && next.is_assigned)
            .cloned();
        let Some(value) = assigned else {
            self.record_option(index, None);
            return Ok(());
        };

        self.stream.consume();
        if value.value.eq_ignore_ascii_case("true") || value.value.eq_ignore_ascii_case("false") {
            self.record_option(index, Some(value.value));
        } else if self.model.options().convert_flags_to_remaining {
            self.record_option(index, None);
            self.remaining
                .parsed
                .push((token.option_name(), Some(value.value.clone())));
            self.remaining.raw.push(value.value);
        } else {
            return Err(self.error(
                ParseErrorKind::CannotAssignValueToFlag {
                    option: token.option_name(),
                },
                Some(value),
            ));
        }
        Ok(())
    }

    fn option_value(&mut self, index: usize, option_token: Token, next: Token) -> Result<(), ParseError> {
        let current = self.current();
        let optional = self.model.node(current).options[index].value_is_optional;
        self.state = self.state_for(current);

        if next.kind == TokenKind::String {
            self.stream.consume();
            self.record_option(index, Some(next.value));
        } else if optional {
            self.record_option(index, None);
        } else {
            return Err(self.error(
                ParseErrorKind::OptionHasNoValue {
                    option: option_token.option_name(),
                },
                Some(option_token),
            ));
        }
        Ok(())
    }

    fn unknown_option(&mut self, token: Token) -> Result<(), ParseError> {
        if self.model.options().strict {
            let suggestion = match token.kind {
                TokenKind::LongOption => self.suggest_option(self.current(), &token.value),
                _ => None,
            };
            return Err(self.error(
                ParseErrorKind::UnknownOption {
                    name: token.option_name(),
                    suggestion,
                },
                Some(token),
            ));
        }

        self.stream.consume();
        let key = token.option_name();
        let next = self.stream.peek().filter(|t| t.kind == TokenKind::String).cloned();
        let value = match next {
            Some(next) if next.is_assigned => {
                self.stream.consume();
                self.remaining
                    .raw
                    .push(format!("{}{}", key, next.representation));
                Some(next.value)
            }
            Some(next) if self.state == State::InCommand && self.next_argument_slot().is_none() => {
                self.stream.consume();
                self.remaining.raw.push(key.clone());
                self.remaining.raw.push(next.value.clone());
                Some(next.value)
            }
            _ => {
                self.remaining.raw.push(key.clone());
                None
            }
        };
        debug!(option = %key, "unknown option kept as remaining");
        self.remaining.parsed.push((key, value));
        Ok(())
    }

    fn suggest_command(&self, parent: NodeId, input: &str) -> Option<String> {
        let options = self.model.options();
        let candidates = self
            .model
            .children(parent)
            .filter(|(_, node)| !node.is_hidden)
            .map(|(_, node)| Candidate {
                name: &node.name,
                aliases: &node.aliases,
            });
        suggest(
            input,
            candidates,
            options.suggestion_distance,
            options.case_sensitivity.commands,
        )
        .map(str::to_string)
    }

    fn suggest_option(&self, id: NodeId, input: &str) -> Option<String> {
        let options = self.model.options();
        let candidates = self
            .model
            .node(id)
            .options
            .iter()
            .filter(|option| !option.is_hidden)
            .flat_map(|option| option.long_names.iter())
            .map(|long| Candidate {
                name: long,
                aliases: &[],
            });
        suggest(
            input,
            candidates,
            options.suggestion_distance,
            options.case_sensitivity.long_options,
        )
        .map(|long| format!("--{}", long))
    }

    fn finish(mut self) -> Result<ResolvedCommandTree, ParseError> {
        if let State::InOptionValue { option, token } = self.state.clone() {
            let current = self.current();
            if !self.model.node(current).options[option].value_is_optional {
                return Err(self.error(
                    ParseErrorKind::OptionHasNoValue {
                        option: token.option_name(),
                    },
                    Some(token),
                ));
            }
            self.record_option(option, None);
            self.state = self.state_for(current);
        }

        loop {
            let current = self.current();
            if self.model.node(current).is_leaf() {
                break;
            }
            match self.model.default_child(current) {
                Some(default) => self.enter(default),
                None => {
                    let parent = (current != NodeId::ROOT).then(|| self.model.display_name(current));
                    return Err(self.error(ParseErrorKind::MissingCommand { parent }, None));
                }
            }
        }

        for resolved in &self.path {
            let node = self.model.node(resolved.id);
            if let Some(argument) = node
                .arguments
                .iter()
                .enumerate()
                .find(|(i, arg)| arg.required && resolved.arguments[*i].is_empty())
                .map(|(_, arg)| arg)
            {
                return Err(self.error(
                    ParseErrorKind::MissingRequiredArgument {
                        command: self.model.display_name(resolved.id),
                        argument: argument.display(),
                    },
                    None,
                ));
            }
        }

        for resolved in &self.path {
            let node = self.model.node(resolved.id);
            if let Some(option) = node
                .options
                .iter()
                .enumerate()
                .find(|(i, option)| option.required && !resolved.has_option(*i))
                .map(|(_, option)| option)
            {
                return Err(self.error(
                    ParseErrorKind::MissingRequiredOption {
                        command: self.model.display_name(resolved.id),
                        option: option.display(),
                    },
                    None,
                ));
            }
        }

        debug!(
            depth = self.path.len(),
            remaining = self.remaining.raw.len(),
            "resolved command tree"
        );
        Ok(ResolvedCommandTree {
            path: self.path,
            remaining: self.remaining,
        })
    }
}
