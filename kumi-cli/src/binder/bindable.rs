//! Bindable value shapes.
//!
//! Every settings field type implements [`Bindable`], which reports its
//! [`ValueShape`] at declaration time and turns the accumulated input of one
//! parameter into a value at bind time.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;

use crate::binder::convert::{downcast, short_type_name, ConverterRegistry, CustomConverter};
use crate::binder::pairs::PairDeconstructor;
use crate::error::BindError;

/// Collection a pair option accumulates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    /// Last value wins for duplicate keys.
    Dictionary,
    /// Every value is retained.
    Lookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    /// `bool`: present or not.
    Flag,
    /// Flag with an optional attached value.
    FlagValue,
    /// One value per occurrence.
    Vector,
    /// `key=value` occurrences.
    Pairs(PairKind),
}

/// Declaration-time description of a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueShape {
    pub kind: ValueKind,
    pub nullable: bool,
    pub type_name: &'static str,
}

impl ValueShape {
    pub fn of<T: ?Sized>(kind: ValueKind) -> Self {
        Self {
            kind,
            nullable: false,
            type_name: short_type_name::<T>(),
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self.kind, ValueKind::Vector | ValueKind::Pairs(_))
    }
}

/// Accumulated input for one argument or option.
///
/// Each entry of `occurrences` is one appearance on the command line; `None`
/// is an option given without a value.
pub struct SlotInput<'a> {
    pub parameter: &'a str,
    pub occurrences: &'a [Option<String>],
    pub default_value: Option<&'a str>,
    pub converter: Option<&'a CustomConverter>,
    pub deconstructor: &'a dyn PairDeconstructor,
    pub registry: &'a ConverterRegistry,
}

impl<'a> SlotInput<'a> {
    /// Convert one raw value, preferring the parameter's own converter.
    pub fn convert<T: Scalar>(&self, raw: &str) -> Result<T, BindError> {
        match self.converter {
            Some(converter) => {
                let boxed = converter.convert(raw).map_err(|reason| BindError::Conversion {
                    parameter: self.parameter.to_string(),
                    value: raw.to_string(),
                    type_name: short_type_name::<T>(),
                    reason,
                    domain: None,
                })?;
                downcast(self.parameter, boxed)
            }
            None => self.registry.convert::<T>(self.parameter, raw),
        }
    }

    fn missing(&self) -> BindError {
        BindError::MissingValue {
            parameter: self.parameter.to_string(),
        }
    }

    /// Last occurrence wins; falls back to the declared default, then to
    /// [`Scalar::fallback`].
    pub fn bind_scalar<T: Scalar>(&self) -> Result<T, BindError> {
        match self.occurrences.last() {
            Some(Some(raw)) => self.convert(raw),
            Some(None) => Err(self.missing()),
            None => match self.default_value {
                Some(raw) => self.convert(raw),
                None => T::fallback().ok_or_else(|| self.missing()),
            },
        }
    }

    pub fn bind_optional<T: Scalar>(&self) -> Result<Option<T>, BindError> {
        match self.occurrences.last() {
            Some(Some(raw)) => self.convert(raw).map(Some),
            Some(None) => Err(self.missing()),
            None => self.default_value.map(|raw| self.convert(raw)).transpose(),
        }
    }

    /// A bare occurrence means `true`; an attached value must be a boolean.
    pub fn bind_flag(&self) -> Result<bool, BindError> {
        match self.occurrences.last() {
            Some(None) => Ok(true),
            Some(Some(raw)) => self.convert(raw),
            None => match self.default_value {
                Some(raw) => self.convert(raw),
                None => Ok(false),
            },
        }
    }

    pub fn bind_vector<T: Scalar>(&self) -> Result<Vec<T>, BindError> {
        if self.occurrences.is_empty() {
            return match self.default_value {
                Some(raw) => Ok(vec![self.convert(raw)?]),
                None => Ok(Vec::new()),
            };
        }
        self.occurrences
            .iter()
            .map(|occurrence| match occurrence {
                Some(raw) => self.convert(raw),
                None => Err(self.missing()),
            })
            .collect()
    }

    /// Deconstruct every occurrence into a converted key/value pair, in order.
    pub fn bind_pairs<K: Scalar, V: Scalar>(&self) -> Result<Vec<(K, V)>, BindError> {
        let raws: Vec<&str> = if self.occurrences.is_empty() {
            self.default_value.into_iter().collect()
        } else {
            self.occurrences
                .iter()
                .map(|o| o.as_deref().ok_or_else(|| self.missing()))
                .collect::<Result<_, _>>()?
        };

        raws.into_iter()
            .map(|raw| {
                let (key, value) = self.deconstructor.deconstruct(self.parameter, raw)?;
                let key = self.registry.convert::<K>(self.parameter, &key)?;
                let value = self.registry.convert::<V>(self.parameter, &value)?;
                Ok((key, value))
            })
            .collect()
    }
}

/// A single convertible value.
///
/// `fallback` is used when a non-nullable parameter receives no input and has
/// no declared default. Built-in types fall back to their `Default`.
pub trait Scalar: Any + Send + Sync + Sized {
    fn fallback() -> Option<Self> {
        None
    }
}

/// A settings field type.
pub trait Bindable: Sized + Send + 'static {
    fn shape() -> ValueShape;
    fn bind(input: &SlotInput<'_>) -> Result<Self, BindError>;
}

type ErasedBind = fn(&SlotInput<'_>) -> Result<Box<dyn Any + Send>, BindError>;

/// Type-erased [`Bindable::bind`] stored in the command model.
#[derive(Clone, Copy)]
pub struct BindFn(ErasedBind);

impl BindFn {
    pub fn of<T: Bindable>() -> Self {
        BindFn(bind_erased::<T>)
    }

    pub fn call(&self, input: &SlotInput<'_>) -> Result<Box<dyn Any + Send>, BindError> {
        (self.0)(input)
    }
}

impl fmt::Debug for BindFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BindFn")
    }
}

fn bind_erased<T: Bindable>(input: &SlotInput<'_>) -> Result<Box<dyn Any + Send>, BindError> {
    T::bind(input).map(|value| Box::new(value) as Box<dyn Any + Send>)
}

/// Make user types usable as settings fields.
///
/// The type also needs a converter: either registered with the
/// [`ConverterRegistry`](crate::ConverterRegistry) or attached to the
/// parameter.
///
/// ```
/// #[derive(Debug, Clone)]
/// struct Port(u16);
///
/// kumi_cli::scalar!(Port);
/// ```
#[macro_export]
macro_rules! scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Scalar for $ty {}

            impl $crate::Bindable for $ty {
                fn shape() -> $crate::ValueShape {
                    $crate::ValueShape::of::<$ty>($crate::ValueKind::Scalar)
                }

                fn bind(input: &$crate::SlotInput<'_>) -> ::std::result::Result<Self, $crate::BindError> {
                    input.bind_scalar::<$ty>()
                }
            }
        )+
    };
}

macro_rules! builtin_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Scalar for $ty {
                fn fallback() -> Option<Self> {
                    Some(<$ty>::default())
                }
            }

            impl Bindable for $ty {
                fn shape() -> ValueShape {
                    ValueShape::of::<$ty>(ValueKind::Scalar)
                }

                fn bind(input: &SlotInput<'_>) -> Result<Self, BindError> {
                    input.bind_scalar::<$ty>()
                }
            }
        )+
    };
}

builtin_scalar!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char, String,
    PathBuf,
);

impl Scalar for bool {
    fn fallback() -> Option<Self> {
        Some(false)
    }
}

impl Bindable for bool {
    fn shape() -> ValueShape {
        ValueShape::of::<bool>(ValueKind::Flag)
    }

    fn bind(input: &SlotInput<'_>) -> Result<Self, BindError> {
        input.bind_flag()
    }
}

impl<T: Scalar> Bindable for Option<T> {
    fn shape() -> ValueShape {
        ValueShape::of::<T>(ValueKind::Scalar).nullable()
    }

    fn bind(input: &SlotInput<'_>) -> Result<Self, BindError> {
        input.bind_optional::<T>()
    }
}

impl<T: Scalar> Bindable for Vec<T> {
    fn shape() -> ValueShape {
        ValueShape::of::<T>(ValueKind::Vector)
    }

    fn bind(input: &SlotInput<'_>) -> Result<Self, BindError> {
        input.bind_vector::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::pairs::DefaultPairDeconstructor;

    fn input<'a>(
        occurrences: &'a [Option<String>],
        default_value: Option<&'a str>,
        registry: &'a ConverterRegistry,
    ) -> SlotInput<'a> {
        SlotInput {
            parameter: "--value",
            occurrences,
            default_value,
            converter: None,
            deconstructor: &DefaultPairDeconstructor,
            registry,
        }
    }

    #[test]
    fn test_scalar_last_occurrence_wins() {
        let registry = ConverterRegistry::default();
        let occurrences = vec![Some("1".to_string()), Some("2".to_string())];
        assert_eq!(i32::bind(&input(&occurrences, None, &registry)).unwrap(), 2);
    }

    #[test]
    fn test_scalar_uses_default_then_fallback() {
        let registry = ConverterRegistry::default();
        assert_eq!(i32::bind(&input(&[], Some("7"), &registry)).unwrap(), 7);
        assert_eq!(i32::bind(&input(&[], None, &registry)).unwrap(), 0);
    }

    #[test]
    fn test_nullable_absent_is_none() {
        let registry = ConverterRegistry::default();
        assert_eq!(Option::<u16>::bind(&input(&[], None, &registry)).unwrap(), None);
        let occurrences = vec![Some("80".to_string())];
        assert_eq!(
            Option::<u16>::bind(&input(&occurrences, None, &registry)).unwrap(),
            Some(80)
        );
    }

    #[test]
    fn test_flag_presence() {
        let registry = ConverterRegistry::default();
        assert!(!bool::bind(&input(&[], None, &registry)).unwrap());
        assert!(bool::bind(&input(&[None], None, &registry)).unwrap());
        let assigned = vec![Some("false".to_string())];
        assert!(!bool::bind(&input(&assigned, None, &registry)).unwrap());
    }

    #[test]
    fn test_vector_keeps_order() {
        let registry = ConverterRegistry::default();
        let occurrences: Vec<Option<String>> =
            ["a", "b", "c"].iter().map(|s| Some(s.to_string())).collect();
        assert_eq!(
            Vec::<String>::bind(&input(&occurrences, None, &registry)).unwrap(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_custom_converter_takes_precedence() {
        let registry = ConverterRegistry::default();
        let converter = CustomConverter::new(|raw: &str| Ok::<i32, String>(raw.len() as i32));
        let occurrences = vec![Some("hello".to_string())];
        let slot = SlotInput {
            converter: Some(&converter),
            ..input(&occurrences, None, &registry)
        };
        assert_eq!(i32::bind(&slot).unwrap(), 5);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(bool::shape().kind, ValueKind::Flag);
        assert!(Option::<i32>::shape().nullable);
        assert!(Vec::<String>::shape().is_multiple());
        assert_eq!(String::shape().type_name, "String");
    }
}
