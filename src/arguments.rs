//! The incremental argument sets builder.
//!
//! Argument sets hold one value sequence per cartesian slot, in the operation's
//! declaration order, with host-supplied slots skipped. Each sequence is deduplicated as
//! it is added: equal values collapse to their first occurrence, so repeated literals
//! never cause repeated invocations.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::value::Value;

/// Ordered per-slot value sequences awaiting expansion.
///
/// # Examples
///
/// ```rust
/// use cartesian_engine::arguments::ArgumentSets;
/// let sets = ArgumentSets::arguments_for_first_parameter([1, 1, 3])
///     .arguments_for_next_parameter(["A", "B"]);
/// assert_eq!(sets.len(), 2);
/// assert_eq!(sets.entry(0).map(|e| e.len()), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSets {
    entries: Vec<Vec<Value>>,
}

impl ArgumentSets {
    /// An empty builder; add entries with [`add`](Self::add).
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the sets with the values of the first parameter.
    pub fn arguments_for_first_parameter<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::new().arguments_for_next_parameter(values)
    }

    /// Appends the values of the next parameter.
    pub fn arguments_for_next_parameter<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.add(values);
        self
    }

    /// Non-consuming form of [`arguments_for_next_parameter`](Self::arguments_for_next_parameter).
    pub fn add<I, T>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.entries.push(distinct(values.into_iter().map(Into::into)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&[Value]> {
        self.entries.get(index).map(Vec::as_slice)
    }

    pub fn entries(&self) -> &[Vec<Value>] {
        &self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<Vec<Value>> {
        self.entries
    }
}

/// Keeps the first occurrence of every value, preserving order.
///
/// Values are bucketed by a hash consistent with `PartialEq` and compared within the
/// bucket, which keeps large ranges linear.
fn distinct(values: impl Iterator<Item = Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::new();
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    for value in values {
        let bucket = buckets.entry(equality_hash(&value)).or_default();
        if bucket.iter().any(|&i| unique[i] == value) {
            continue;
        }
        bucket.push(unique.len());
        unique.push(value);
    }
    unique
}

fn equality_hash(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    std::mem::discriminant(value).hash(&mut hasher);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(&mut hasher),
        Value::Int(n) => n.hash(&mut hasher),
        // 0.0 == -0.0, so both must land in one bucket.
        Value::Float(x) => (if *x == 0.0 { 0.0f64 } else { *x }).to_bits().hash(&mut hasher),
        Value::Char(c) => c.hash(&mut hasher),
        Value::String(s) => s.hash(&mut hasher),
        Value::Enum(c) => c.hash(&mut hasher),
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let sets = ArgumentSets::arguments_for_first_parameter([3, 1, 3, 2, 1]);
        assert_eq!(
            sets.entry(0).unwrap(),
            &[Value::Int(3), Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn signed_zeros_are_one_value() {
        let sets = ArgumentSets::arguments_for_first_parameter([0.0, -0.0, 1.5]);
        assert_eq!(sets.entry(0).map(<[Value]>::len), Some(2));
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut sets = ArgumentSets::new();
        sets.add(["x"]).add([true, false]);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets.entry(1).unwrap(), &[Value::Bool(true), Value::Bool(false)]);
        assert!(sets.entry(2).is_none());
    }

    #[test]
    fn empty_collections_are_accepted() {
        let empty: Vec<i32> = Vec::new();
        let sets = ArgumentSets::arguments_for_first_parameter([1]).arguments_for_next_parameter(empty);
        assert_eq!(sets.len(), 2);
        assert!(sets.entry(1).unwrap().is_empty());
    }
}
