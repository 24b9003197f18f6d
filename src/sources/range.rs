//! Numeric range sources.
//!
//! A range walks from `from` towards `to` in increments of `step`. Half-open ranges stop
//! before `to`; closed ranges include it when it is hit exactly or not overshot. The
//! `n`-th element is computed as `from + n * step`, so floating ranges do not accumulate
//! rounding error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config_err;
use crate::diagnostics::CartesianError;
use crate::registry::ParameterProvider;
use crate::signature::ParameterSlot;
use crate::value::Value;

/// Numbers a [`Range`] can step over.
pub trait RangeNumber: Copy + PartialOrd + fmt::Display + Into<Value> {
    const ZERO: Self;
    const ONE: Self;

    /// `from + n * step`, or `None` when the result is not representable.
    fn nth(from: Self, step: Self, n: usize) -> Option<Self>;

    fn is_finite(self) -> bool;

    /// Upper bound on the number of elements from `from` to `to`, or `None` when it
    /// does not fit `usize`.
    fn len_bound(from: Self, to: Self, step: Self) -> Option<usize>;
}

impl RangeNumber for i64 {
    const ZERO: Self = 0;
    const ONE: Self = 1;

    fn nth(from: Self, step: Self, n: usize) -> Option<Self> {
        let n = i64::try_from(n).ok()?;
        from.checked_add(step.checked_mul(n)?)
    }

    fn is_finite(self) -> bool {
        true
    }

    fn len_bound(from: Self, to: Self, step: Self) -> Option<usize> {
        let span = (i128::from(to) - i128::from(from)).unsigned_abs();
        let steps = span / i128::from(step).unsigned_abs().max(1);
        usize::try_from(steps.checked_add(1)?).ok()
    }
}

impl RangeNumber for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn nth(from: Self, step: Self, n: usize) -> Option<Self> {
        let value = from + step * n as f64;
        value.is_finite().then_some(value)
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    fn len_bound(from: Self, to: Self, step: Self) -> Option<usize> {
        let steps = ((to - from) / step).abs().floor() + 1.0;
        (steps.is_finite() && steps < usize::MAX as f64).then_some(steps as usize)
    }
}

/// An arithmetic sequence over one numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    #[serde(default)]
    pub from: T,
    pub to: T,
    pub step: T,
    #[serde(default)]
    pub closed: bool,
}

impl<T: RangeNumber> Range<T> {
    /// Half-open range `[from, to)` with step 1.
    pub fn new(from: T, to: T) -> Self {
        Self {
            from,
            to,
            step: T::ONE,
            closed: false,
        }
    }

    /// Half-open range `[0, to)` with step 1.
    pub fn up_to(to: T) -> Self {
        Self::new(T::ZERO, to)
    }

    pub fn step(mut self, step: T) -> Self {
        self.step = step;
        self
    }

    /// Includes `to` in the sequence.
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn check(&self) -> Result<(), CartesianError> {
        if !(self.from.is_finite() && self.to.is_finite() && self.step.is_finite()) {
            return Err(config_err!(
                "",
                "Illegal range. Bounds and step must be finite numbers."
            ));
        }
        if self.step == T::ZERO {
            return Err(config_err!("", "Illegal range. The step cannot be zero."));
        }
        if self.from == self.to && !self.closed {
            return Err(config_err!(
                "",
                "Illegal range. Equal from and to will produce an empty range."
            )
            .with_help("close the range or move one of its bounds"));
        }
        let ascending = self.step > T::ZERO;
        if (ascending && self.from > self.to) || (!ascending && self.from < self.to) {
            return Err(config_err!(
                "",
                "Illegal range. There's no way to get from {} to {} with a step of {}.",
                self.from,
                self.to,
                self.step
            ));
        }
        Ok(())
    }

    /// Number of slots to reserve for the sequence; checked ranges only.
    fn len_bound(&self) -> Result<usize, CartesianError> {
        T::len_bound(self.from, self.to, self.step).ok_or_else(|| {
            config_err!(
                "",
                "Illegal range. The range from {} to {} with a step of {} has too many elements to enumerate.",
                self.from,
                self.to,
                self.step
            )
        })
    }

    /// Checks the range and collects its elements into a buffer sized up front.
    fn collect(&self, wrap: fn(T) -> Value) -> Result<Vec<Value>, CartesianError> {
        self.check()?;
        let bound = self.len_bound()?;
        let mut values = Vec::new();
        values.try_reserve_exact(bound).map_err(|e| {
            config_err!(
                "",
                "Illegal range. Cannot allocate {} elements for the range from {} to {}.",
                bound,
                self.from,
                self.to
            )
            .with_source(e)
        })?;
        values.extend(self.iter().map(wrap));
        Ok(values)
    }

    /// Lazily walks the sequence. Call [`check`](Self::check) first; an unchecked zero
    /// step would never terminate on a closed range.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let ascending = self.step > T::ZERO;
        (0..)
            .map(move |n| T::nth(self.from, self.step, n))
            .take_while(move |next| match next {
                Some(v) if ascending && self.closed => *v <= self.to,
                Some(v) if ascending => *v < self.to,
                Some(v) if self.closed => *v >= self.to,
                Some(v) => *v > self.to,
                None => false,
            })
            .flatten()
    }
}

/// Range descriptor over integers or floats.
///
/// # Examples
///
/// ```rust
/// use cartesian_engine::sources::{NumericRange, Range};
/// let open = NumericRange::Integral(Range::new(1, 3));
/// assert_eq!(open.values().unwrap().len(), 2);
/// let closed = NumericRange::Integral(Range::new(1, 3).closed());
/// assert_eq!(closed.values().unwrap().len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericRange {
    Integral(Range<i64>),
    Floating(Range<f64>),
}

impl NumericRange {
    pub fn ints(from: i64, to: i64) -> Range<i64> {
        Range::new(from, to)
    }

    pub fn floats(from: f64, to: f64) -> Range<f64> {
        Range::new(from, to)
    }

    pub fn check(&self) -> Result<(), CartesianError> {
        match self {
            NumericRange::Integral(range) => range.check(),
            NumericRange::Floating(range) => range.check(),
        }
    }

    /// Checks the range and collects its elements. A range whose length cannot be
    /// allocated is a configuration error rather than an abort.
    pub fn values(&self) -> Result<Vec<Value>, CartesianError> {
        match self {
            NumericRange::Integral(range) => range.collect(Value::Int),
            NumericRange::Floating(range) => range.collect(Value::Float),
        }
    }
}

impl From<Range<i64>> for NumericRange {
    fn from(range: Range<i64>) -> Self {
        NumericRange::Integral(range)
    }
}

impl From<Range<f64>> for NumericRange {
    fn from(range: Range<f64>) -> Self {
        NumericRange::Floating(range)
    }
}

impl ParameterProvider for NumericRange {
    fn provide_arguments(&self, _slot: &ParameterSlot) -> Result<Vec<Value>, CartesianError> {
        self.values()
    }
}
