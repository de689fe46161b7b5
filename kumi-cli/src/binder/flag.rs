use crate::binder::bindable::{Bindable, Scalar, SlotInput, ValueKind, ValueShape};
use crate::error::BindError;

/// An option usable as a bare flag or with an attached value.
///
/// `is_set` tracks presence independently of `value`: `--serve` sets the flag
/// and leaves `value` at its default, `--serve 123` sets both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagValue<T> {
    pub is_set: bool,
    pub value: T,
}

impl<T> FlagValue<T> {
    pub fn unset(value: T) -> Self {
        Self {
            is_set: false,
            value,
        }
    }

    pub fn set(value: T) -> Self {
        Self { is_set: true, value }
    }

    /// The value when the flag was given.
    pub fn get(&self) -> Option<&T> {
        self.is_set.then_some(&self.value)
    }
}

impl<T: Scalar + Default> Bindable for FlagValue<T> {
    fn shape() -> ValueShape {
        ValueShape::of::<T>(ValueKind::FlagValue)
    }

    fn bind(input: &SlotInput<'_>) -> Result<Self, BindError> {
        let default = || match input.default_value {
            Some(raw) => input.convert::<T>(raw),
            None => Ok(T::default()),
        };
        match input.occurrences.last() {
            None => default().map(FlagValue::unset),
            Some(None) => default().map(FlagValue::set),
            Some(Some(raw)) => input.convert::<T>(raw).map(FlagValue::set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::convert::ConverterRegistry;
    use crate::binder::pairs::DefaultPairDeconstructor;

    fn bind(occurrences: &[Option<String>], default_value: Option<&str>) -> FlagValue<i32> {
        let registry = ConverterRegistry::default();
        let input = SlotInput {
            parameter: "--serve",
            occurrences,
            default_value,
            converter: None,
            deconstructor: &DefaultPairDeconstructor,
            registry: &registry,
        };
        FlagValue::<i32>::bind(&input).unwrap()
    }

    #[test]
    fn test_flag_without_value_uses_type_default() {
        assert_eq!(bind(&[None], None), FlagValue::set(0));
    }

    #[test]
    fn test_flag_without_value_uses_declared_default() {
        assert_eq!(bind(&[None], Some("8080")), FlagValue::set(8080));
    }

    #[test]
    fn test_flag_with_value() {
        assert_eq!(bind(&[Some("123".to_string())], None), FlagValue::set(123));
    }

    #[test]
    fn test_unbound_flag_is_unset() {
        let value = bind(&[], None);
        assert!(!value.is_set);
        assert_eq!(value.get(), None);
    }
}
