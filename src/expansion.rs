//! Cartesian expansion of argument sets.
//!
//! The product is never materialized. Tuple `k` is decoded from `k` with mixed-radix
//! strides over the per-slot cardinalities, the last slot varying fastest:
//!
//! ```text
//! stride[i] = n[i+1] * n[i+2] * ... * n[k-1]
//! digit[i]  = (index / stride[i]) % n[i]
//! ```
//!
//! Decoding is a pure function of immutable data, so a [`CartesianProduct`] can be read
//! from any number of threads at once.

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::arguments::ArgumentSets;
use crate::config_err;
use crate::diagnostics::CartesianError;
use crate::value::Value;

/// One combination of values, one per cartesian slot, in slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationTuple {
    index: usize,
    arguments: Vec<Value>,
}

impl InvocationTuple {
    /// 0-based position in the enumeration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based invocation number, as shown to users.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn get(&self, position: usize) -> Option<&Value> {
        self.arguments.get(position)
    }

    pub fn into_arguments(self) -> Vec<Value> {
        self.arguments
    }
}

#[derive(Debug)]
struct ProductData {
    sets: Vec<Vec<Value>>,
    strides: Vec<usize>,
    len: usize,
}

/// The lazily enumerated Cartesian product of frozen argument sets.
///
/// Cloning is cheap; clones share the same immutable value sequences.
///
/// # Examples
///
/// ```rust
/// use cartesian_engine::arguments::ArgumentSets;
/// use cartesian_engine::expansion::CartesianProduct;
/// use cartesian_engine::value::Value;
///
/// let sets = ArgumentSets::arguments_for_first_parameter([1, 2, 4])
///     .arguments_for_next_parameter(["A", "B"]);
/// let product = CartesianProduct::new(sets).unwrap();
/// assert_eq!(product.len(), 6);
/// let third = product.get(2).unwrap();
/// assert_eq!(third.arguments(), &[Value::Int(2), Value::from("A")]);
/// ```
#[derive(Debug, Clone)]
pub struct CartesianProduct {
    data: Arc<ProductData>,
}

impl CartesianProduct {
    /// Freezes `sets`. Fails only when the tuple count does not fit in `usize`.
    pub fn new(sets: ArgumentSets) -> Result<Self, CartesianError> {
        let sets = sets.into_entries();
        let cardinalities: Vec<usize> = sets.iter().map(Vec::len).collect();

        let len = if cardinalities.contains(&0) {
            0
        } else {
            cardinalities.iter().try_fold(1usize, |acc, n| acc.checked_mul(*n)).ok_or_else(|| {
                config_err!(
                    "",
                    "the combination space {:?} has more tuples than can be enumerated",
                    cardinalities
                )
            })?
        };

        // Strides only matter for a non-empty product, where none of them can overflow.
        let mut strides = vec![1usize; sets.len()];
        if len > 0 {
            for i in (0..sets.len().saturating_sub(1)).rev() {
                strides[i] = strides[i + 1] * cardinalities[i + 1];
            }
        }

        Ok(Self {
            data: Arc::new(ProductData { sets, strides, len }),
        })
    }

    /// Number of tuples, `n_0 * n_1 * ... * n_(k-1)`.
    pub fn len(&self) -> usize {
        self.data.len
    }

    pub fn is_empty(&self) -> bool {
        self.data.len == 0
    }

    /// Number of slots per tuple.
    pub fn arity(&self) -> usize {
        self.data.sets.len()
    }

    pub fn cardinalities(&self) -> impl Iterator<Item = usize> + '_ {
        self.data.sets.iter().map(Vec::len)
    }

    /// The deduplicated values of slot `position`.
    pub fn values(&self, position: usize) -> Option<&[Value]> {
        self.data.sets.get(position).map(Vec::as_slice)
    }

    /// Decodes tuple `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<InvocationTuple> {
        if index >= self.data.len {
            return None;
        }
        let arguments = self
            .data
            .sets
            .iter()
            .zip(&self.data.strides)
            .map(|(values, stride)| values[(index / stride) % values.len()].clone())
            .collect();
        Some(InvocationTuple { index, arguments })
    }

    /// Restartable iterator over every tuple, in enumeration order.
    pub fn iter(&self) -> Invocations {
        Invocations {
            product: self.clone(),
            front: 0,
            back: self.data.len,
        }
    }
}

impl<'a> IntoIterator for &'a CartesianProduct {
    type Item = InvocationTuple;
    type IntoIter = Invocations;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the tuples of a [`CartesianProduct`].
#[derive(Debug, Clone)]
pub struct Invocations {
    product: CartesianProduct,
    front: usize,
    back: usize,
}

impl Iterator for Invocations {
    type Item = InvocationTuple;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let tuple = self.product.get(self.front);
        self.front += 1;
        tuple
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for Invocations {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.product.get(self.back)
    }
}

impl ExactSizeIterator for Invocations {}

impl FusedIterator for Invocations {}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sets: ArgumentSets) -> CartesianProduct {
        CartesianProduct::new(sets).unwrap()
    }

    fn rendered(product: &CartesianProduct) -> Vec<String> {
        product
            .iter()
            .map(|t| {
                t.arguments()
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect()
    }

    #[test]
    fn last_slot_varies_fastest() {
        let p = product(
            ArgumentSets::arguments_for_first_parameter([1, 2, 4])
                .arguments_for_next_parameter(["A", "B"]),
        );
        assert_eq!(rendered(&p), vec!["1,A", "1,B", "2,A", "2,B", "4,A", "4,B"]);
    }

    #[test]
    fn duplicates_do_not_multiply_tuples() {
        let with_duplicates = product(
            ArgumentSets::arguments_for_first_parameter([1, 1, 3])
                .arguments_for_next_parameter([2, 2]),
        );
        let without = product(
            ArgumentSets::arguments_for_first_parameter([1, 3]).arguments_for_next_parameter([2]),
        );
        assert_eq!(rendered(&with_duplicates), vec!["1,2", "3,2"]);
        assert_eq!(rendered(&with_duplicates), rendered(&without));
    }

    #[test]
    fn an_empty_slot_empties_the_product() {
        let empty: [i32; 0] = [];
        let p = product(ArgumentSets::arguments_for_first_parameter([1, 2]).arguments_for_next_parameter(empty));
        assert_eq!(p.len(), 0);
        assert!(p.is_empty());
        assert_eq!(p.iter().count(), 0);
        assert!(p.get(0).is_none());
    }

    #[test]
    fn no_slots_yield_one_empty_tuple() {
        let p = product(ArgumentSets::new());
        assert_eq!(p.len(), 1);
        assert_eq!(p.get(0).map(|t| t.arguments().len()), Some(0));
    }

    #[test]
    fn iteration_is_restartable_and_double_ended() {
        let p = product(ArgumentSets::arguments_for_first_parameter([1, 2]).arguments_for_next_parameter([3, 4]));
        let forward: Vec<usize> = p.iter().map(|t| t.index()).collect();
        let again: Vec<usize> = p.iter().map(|t| t.index()).collect();
        let backward: Vec<usize> = p.iter().rev().map(|t| t.index()).collect();
        assert_eq!(forward, vec![0, 1, 2, 3]);
        assert_eq!(forward, again);
        assert_eq!(backward, vec![3, 2, 1, 0]);
        assert_eq!(p.iter().len(), 4);
        assert_eq!(p.iter().nth(2).map(|t| t.number()), Some(3));
        assert!(p.iter().nth(10).is_none());
    }

    #[test]
    fn overflowing_spaces_are_rejected() {
        let mut sets = ArgumentSets::new();
        for _ in 0..17 {
            sets.add(0..16);
        }
        assert!(CartesianProduct::new(sets).is_err());
    }
}
