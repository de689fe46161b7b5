//! Settings declarations.
//!
//! A settings type describes its parameters explicitly through
//! [`CommandSettings::declare`] and constructs itself from bound values in
//! [`CommandSettings::bind`]. `#[derive(CommandSettings)]` writes both.

use std::sync::Arc;

use crate::binder::{short_type_name, BindFn, Bindable, BoundValues, CustomConverter, PairDeconstructor, ValueShape};
use crate::error::{BindError, ValidationError};

/// A typed settings object for a command or branch.
///
/// ```
/// use kumi_cli::{BindError, BoundValues, CommandSettings, SettingsSchema};
///
/// struct AddSettings {
///     name: String,
///     force: bool,
/// }
///
/// impl CommandSettings for AddSettings {
///     fn declare(schema: &mut SettingsSchema) {
///         schema.argument::<String>("name", "<NAME>");
///         schema.option::<bool>("force", "-f|--force");
///     }
///
///     fn bind(values: &mut BoundValues) -> Result<Self, BindError> {
///         Ok(Self {
///             name: values.take("name")?,
///             force: values.take("force")?,
///         })
///     }
/// }
/// ```
pub trait CommandSettings: Sized + Send + Sync + 'static {
    fn declare(schema: &mut SettingsSchema);

    fn bind(values: &mut BoundValues) -> Result<Self, BindError>;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Collect the declarations into a schema.
    fn schema() -> SettingsSchema {
        let mut schema = SettingsSchema::new(short_type_name::<Self>());
        Self::declare(&mut schema);
        schema
    }
}

/// Settings for commands without parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptySettings;

impl CommandSettings for EmptySettings {
    fn declare(_schema: &mut SettingsSchema) {}

    fn bind(_values: &mut BoundValues) -> Result<Self, BindError> {
        Ok(EmptySettings)
    }
}

/// A declared positional argument.
#[derive(Debug, Clone)]
pub struct ArgumentDecl {
    pub(crate) field: String,
    pub(crate) template: String,
    pub(crate) position: Option<usize>,
    pub(crate) default_value: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) converter: Option<CustomConverter>,
    pub(crate) shape: ValueShape,
    pub(crate) bind: BindFn,
}

impl ArgumentDecl {
    /// Explicit position; declaration order is used otherwise.
    pub fn position(&mut self, position: usize) -> &mut Self {
        self.position = Some(position);
        self
    }

    pub fn default_value(&mut self, value: impl Into<String>) -> &mut Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn description(&mut self, text: impl Into<String>) -> &mut Self {
        self.description = Some(text.into());
        self
    }

    pub fn converter(&mut self, converter: CustomConverter) -> &mut Self {
        self.converter = Some(converter);
        self
    }
}

/// A declared option.
#[derive(Debug, Clone)]
pub struct OptionDecl {
    pub(crate) field: String,
    pub(crate) template: String,
    pub(crate) default_value: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) required: bool,
    pub(crate) converter: Option<CustomConverter>,
    pub(crate) pair_deconstructor: Option<Arc<dyn PairDeconstructor>>,
    pub(crate) shape: ValueShape,
    pub(crate) bind: BindFn,
}

impl OptionDecl {
    pub fn default_value(&mut self, value: impl Into<String>) -> &mut Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn description(&mut self, text: impl Into<String>) -> &mut Self {
        self.description = Some(text.into());
        self
    }

    pub fn hidden(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    pub fn required(&mut self) -> &mut Self {
        self.required = true;
        self
    }

    pub fn converter(&mut self, converter: CustomConverter) -> &mut Self {
        self.converter = Some(converter);
        self
    }

    pub fn pair_deconstructor(&mut self, deconstructor: impl PairDeconstructor + 'static) -> &mut Self {
        self.pair_deconstructor = Some(Arc::new(deconstructor));
        self
    }
}

/// The parameter declarations of one settings type.
#[derive(Debug, Clone)]
pub struct SettingsSchema {
    type_name: &'static str,
    pub(crate) arguments: Vec<ArgumentDecl>,
    pub(crate) options: Vec<OptionDecl>,
}

impl SettingsSchema {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            arguments: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Declare a positional argument from a `<NAME>`/`[NAME]` template.
    pub fn argument<T: Bindable>(&mut self, field: &str, template: &str) -> &mut ArgumentDecl {
        self.arguments.push(ArgumentDecl {
            field: field.to_string(),
            template: template.to_string(),
            position: None,
            default_value: None,
            description: None,
            converter: None,
            shape: T::shape(),
            bind: BindFn::of::<T>(),
        });
        let last = self.arguments.len() - 1;
        &mut self.arguments[last]
    }

    /// Declare an option from a `-s|--long <VALUE>` template.
    pub fn option<T: Bindable>(&mut self, field: &str, template: &str) -> &mut OptionDecl {
        self.options.push(OptionDecl {
            field: field.to_string(),
            template: template.to_string(),
            default_value: None,
            description: None,
            hidden: false,
            required: false,
            converter: None,
            pair_deconstructor: None,
            shape: T::shape(),
            bind: BindFn::of::<T>(),
        });
        let last = self.options.len() - 1;
        &mut self.options[last]
    }

    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }
}
