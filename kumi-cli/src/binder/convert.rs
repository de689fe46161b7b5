//! Type converter registry.
//!
//! Converters are looked up by [`TypeId`]; there is no reflection. Built-in
//! primitives are registered by [`ConverterRegistry::default`], everything else
//! joins through an explicit registration call.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::binder::bindable::Scalar;
use crate::error::BindError;

type ConvertFn = Arc<dyn Fn(&str) -> Result<Box<dyn Any + Send>, String> + Send + Sync>;

/// Enumerations converted by variant name, ignoring case.
///
/// The variant names double as the domain listed in conversion errors.
pub trait ValueEnum: Sized + Clone + Send + Sync + 'static {
    fn variants() -> &'static [Self];
    fn name(&self) -> &'static str;
}

/// A per-parameter converter that takes precedence over the registry.
#[derive(Clone)]
pub struct CustomConverter {
    convert: ConvertFn,
    type_name: &'static str,
}

impl CustomConverter {
    pub fn new<T, F>(convert: F) -> Self
    where
        T: Any + Send,
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            convert: Arc::new(move |raw| convert(raw).map(|v| Box::new(v) as Box<dyn Any + Send>)),
            type_name: short_type_name::<T>(),
        }
    }

    pub fn convert(&self, raw: &str) -> Result<Box<dyn Any + Send>, String> {
        (self.convert)(raw)
    }

    /// Name of the type this converter produces.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for CustomConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomConverter")
            .field("type_name", &self.type_name)
            .finish()
    }
}

#[derive(Clone)]
struct Entry {
    convert: ConvertFn,
    domain: Option<Vec<String>>,
}

/// Lookup table from type to string converter.
#[derive(Clone)]
pub struct ConverterRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.entries.len())
            .finish()
    }
}

macro_rules! register_from_str {
    ($registry:ident, $($ty:ty),+ $(,)?) => {
        $( $registry.register_from_str::<$ty>(); )+
    };
}

impl ConverterRegistry {
    /// A registry without any converters, not even the built-ins.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn register_builtins(&mut self) {
        register_from_str!(
            self, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char,
            String, PathBuf,
        );
        self.register::<bool, _>(|raw| {
            if raw.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err("expected 'true' or 'false'".to_string())
            }
        });
    }

    /// Register (or replace) the converter for `T`.
    pub fn register<T, F>(&mut self, convert: F) -> &mut Self
    where
        T: Scalar,
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        self.insert::<T, F>(convert, None);
        self
    }

    /// Register `T` through its [`FromStr`] implementation.
    pub fn register_from_str<T>(&mut self) -> &mut Self
    where
        T: Scalar + FromStr,
        T::Err: fmt::Display,
    {
        self.register::<T, _>(|raw| raw.parse::<T>().map_err(|e| e.to_string()))
    }

    /// Register an enumeration converted by variant name.
    pub fn register_enum<T>(&mut self) -> &mut Self
    where
        T: Scalar + ValueEnum,
    {
        let domain: Vec<String> = T::variants().iter().map(|v| v.name().to_string()).collect();
        self.insert::<T, _>(
            |raw| {
                T::variants()
                    .iter()
                    .find(|v| v.name().eq_ignore_ascii_case(raw))
                    .cloned()
                    .ok_or_else(|| "unknown value".to_string())
            },
            Some(domain),
        );
        self
    }

    fn insert<T, F>(&mut self, convert: F, domain: Option<Vec<String>>)
    where
        T: Scalar,
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        let convert: ConvertFn =
            Arc::new(move |raw| convert(raw).map(|v| Box::new(v) as Box<dyn Any + Send>));
        self.entries
            .insert(TypeId::of::<T>(), Entry { convert, domain });
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Valid values for `T`, when it was registered as an enumeration.
    pub fn domain<T: Any>(&self) -> Option<&[String]> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|e| e.domain.as_deref())
    }

    /// Convert `raw` into `T`. `parameter` only feeds error messages.
    pub fn convert<T: Scalar>(&self, parameter: &str, raw: &str) -> Result<T, BindError> {
        let type_name = short_type_name::<T>();
        let entry = self
            .entries
            .get(&TypeId::of::<T>())
            .ok_or(BindError::NoConverter { type_name })?;
        let boxed = (entry.convert)(raw).map_err(|reason| BindError::Conversion {
            parameter: parameter.to_string(),
            value: raw.to_string(),
            type_name,
            reason,
            domain: entry.domain.clone(),
        })?;
        downcast(parameter, boxed)
    }
}

pub(crate) fn downcast<T: Any>(parameter: &str, boxed: Box<dyn Any + Send>) -> Result<T, BindError> {
    boxed
        .downcast::<T>()
        .map(|v| *v)
        .map_err(|_| BindError::ConverterTypeMismatch {
            parameter: parameter.to_string(),
            expected: short_type_name::<T>(),
        })
}

/// `alloc::string::String` becomes `String`; generic names are left alone.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}
