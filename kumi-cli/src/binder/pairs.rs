//! Key/value options: dictionaries and lookups.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use crate::binder::bindable::{Bindable, PairKind, Scalar, SlotInput, ValueKind, ValueShape};
use crate::error::BindError;

/// Splits one `key=value` occurrence into its two halves.
pub trait PairDeconstructor: Send + Sync + fmt::Debug {
    fn deconstruct(&self, parameter: &str, value: &str) -> Result<(String, String), BindError>;
}

/// Splits on `=` and requires exactly two parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPairDeconstructor;

impl PairDeconstructor for DefaultPairDeconstructor {
    fn deconstruct(&self, parameter: &str, value: &str) -> Result<(String, String), BindError> {
        let parts: Vec<&str> = value.split('=').collect();
        match parts.as_slice() {
            [key, value] => Ok((key.to_string(), value.to_string())),
            _ => Err(BindError::PairFormat {
                parameter: parameter.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

/// A multimap keeping every value per key, keys in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup<K, V> {
    entries: Vec<(K, Vec<V>)>,
}

impl<K, V> Default for Lookup<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> Lookup<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, value: V) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// All values for `key`, empty when absent.
    pub fn get(&self, key: &K) -> &[V] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Bindable for HashMap<K, V>
where
    K: Scalar + Eq + Hash,
    V: Scalar,
{
    fn shape() -> ValueShape {
        ValueShape::of::<Self>(ValueKind::Pairs(PairKind::Dictionary))
    }

    fn bind(input: &SlotInput<'_>) -> Result<Self, BindError> {
        Ok(input.bind_pairs::<K, V>()?.into_iter().collect())
    }
}

impl<K, V> Bindable for BTreeMap<K, V>
where
    K: Scalar + Ord,
    V: Scalar,
{
    fn shape() -> ValueShape {
        ValueShape::of::<Self>(ValueKind::Pairs(PairKind::Dictionary))
    }

    fn bind(input: &SlotInput<'_>) -> Result<Self, BindError> {
        Ok(input.bind_pairs::<K, V>()?.into_iter().collect())
    }
}

impl<K, V> Bindable for Lookup<K, V>
where
    K: Scalar + PartialEq,
    V: Scalar,
{
    fn shape() -> ValueShape {
        ValueShape::of::<Self>(ValueKind::Pairs(PairKind::Lookup))
    }

    fn bind(input: &SlotInput<'_>) -> Result<Self, BindError> {
        let mut lookup = Lookup::new();
        for (key, value) in input.bind_pairs::<K, V>()? {
            lookup.insert(key, value);
        }
        Ok(lookup)
    }
}
