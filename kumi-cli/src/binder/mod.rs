//! Turns resolved strings into typed settings.
//!
//! Every parameter of a resolved node is bound through the type-erased
//! [`BindFn`] captured at declaration time. All values are produced before the
//! settings object is constructed, so a failure never leaves a partially
//! built object behind.

mod bindable;
mod convert;
mod flag;
mod pairs;

use std::any::Any;
use std::collections::HashMap;

use tracing::trace;

pub use bindable::{BindFn, Bindable, PairKind, Scalar, SlotInput, ValueKind, ValueShape};
pub use convert::{ConverterRegistry, CustomConverter, ValueEnum};
pub(crate) use convert::short_type_name;
pub use flag::FlagValue;
pub use pairs::{DefaultPairDeconstructor, Lookup, PairDeconstructor};

use crate::error::BindError;
use crate::model::CommandModel;
use crate::resolver::ResolvedNode;
use crate::schema::CommandSettings;

/// Bound parameter values of one node, keyed by field name.
pub struct BoundValues {
    settings: &'static str,
    values: HashMap<String, Box<dyn Any + Send>>,
}

impl std::fmt::Debug for BoundValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<&String> = self.values.keys().collect();
        fields.sort();
        f.debug_struct("BoundValues")
            .field("settings", &self.settings)
            .field("fields", &fields)
            .finish()
    }
}

impl BoundValues {
    pub fn new(settings: &'static str) -> Self {
        Self {
            settings,
            values: HashMap::new(),
        }
    }

    pub fn insert<T: Any + Send>(&mut self, field: impl Into<String>, value: T) {
        self.values.insert(field.into(), Box::new(value));
    }

    fn insert_boxed(&mut self, field: &str, value: Box<dyn Any + Send>) {
        self.values.insert(field.to_string(), value);
    }

    /// Remove and return the value of `field`.
    pub fn take<T: Any>(&mut self, field: &str) -> Result<T, BindError> {
        let boxed = self.values.remove(field).ok_or_else(|| BindError::UnknownField {
            settings: self.settings,
            field: field.to_string(),
        })?;
        convert::downcast(field, boxed)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Binds resolved nodes of one model.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    model: &'a CommandModel,
    registry: &'a ConverterRegistry,
}

impl<'a> Binder<'a> {
    pub fn new(model: &'a CommandModel, registry: &'a ConverterRegistry) -> Self {
        Self { model, registry }
    }

    /// Convert every argument and option of `resolved`.
    pub fn bind_values(&self, resolved: &ResolvedNode) -> Result<BoundValues, BindError> {
        let node = self.model.node(resolved.id);
        let mut values = BoundValues::new(node.settings_type);

        for (index, argument) in node.arguments.iter().enumerate() {
            let occurrences: Vec<Option<String>> = resolved
                .argument_values(index)
                .iter()
                .cloned()
                .map(Some)
                .collect();
            let parameter = argument.display();
            let input = SlotInput {
                parameter: &parameter,
                occurrences: &occurrences,
                default_value: argument.default_value.as_deref(),
                converter: argument.converter.as_ref(),
                deconstructor: &DefaultPairDeconstructor,
                registry: self.registry,
            };
            values.insert_boxed(&argument.field, argument.bind.call(&input)?);
        }

        for (index, option) in node.options.iter().enumerate() {
            let occurrences = resolved.option_values(index);
            let parameter = option.display();
            let input = SlotInput {
                parameter: &parameter,
                occurrences: &occurrences,
                default_value: option.default_value.as_deref(),
                converter: option.converter.as_ref(),
                deconstructor: match &option.pair_deconstructor {
                    Some(custom) => custom.as_ref(),
                    None => &DefaultPairDeconstructor as &dyn PairDeconstructor,
                },
                registry: self.registry,
            };
            values.insert_boxed(&option.field, option.bind.call(&input)?);
        }

        trace!(settings = node.settings_type, fields = values.len(), "bound values");
        Ok(values)
    }

    /// Bind and validate a settings object.
    pub fn bind<S: CommandSettings>(&self, resolved: &ResolvedNode) -> Result<S, BindError> {
        let mut values = self.bind_values(resolved)?;
        let settings = S::bind(&mut values)?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_checks_field_and_type() {
        let mut values = BoundValues::new("Settings");
        values.insert("port", 8080u16);
        values.insert("name", "x".to_string());

        assert_eq!(values.take::<u16>("port").unwrap(), 8080);
        assert!(matches!(
            values.take::<u16>("port"),
            Err(BindError::UnknownField { .. })
        ));
        assert!(matches!(
            values.take::<u16>("name"),
            Err(BindError::ConverterTypeMismatch { .. })
        ));
    }
}
