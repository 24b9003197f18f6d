//! Values produced by value sources and the parameter types they are bound to.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// An enumerated type: a name plus its constants in declaration order.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use cartesian_engine::value::EnumType;
/// let bits = Arc::new(EnumType::new("Bit", ["ZERO", "ONE"]));
/// assert_eq!(bits.constants().len(), 2);
/// assert!(bits.constant("ONE").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumType {
    name: String,
    constants: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds the enum type of a Rust enum that opted in through [`CartesianEnum`].
    pub fn of<E: CartesianEnum>() -> Arc<Self> {
        Arc::new(Self::new(E::TYPE_NAME, E::CONSTANTS.iter().copied()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    /// Looks up a constant by identifier.
    pub fn constant(self: &Arc<Self>, name: &str) -> Option<EnumConstant> {
        self.constants
            .iter()
            .position(|c| c == name)
            .map(|ordinal| EnumConstant {
                ty: Arc::clone(self),
                ordinal,
            })
    }

    /// All constants, in declaration order.
    pub fn values(self: &Arc<Self>) -> Vec<EnumConstant> {
        (0..self.constants.len())
            .map(|ordinal| EnumConstant {
                ty: Arc::clone(self),
                ordinal,
            })
            .collect()
    }
}

/// Implemented by Rust enums whose variants should be usable as enum constants.
///
/// ```rust
/// use cartesian_engine::value::{CartesianEnum, EnumType};
///
/// enum Bit { Zero, One }
///
/// impl CartesianEnum for Bit {
///     const TYPE_NAME: &'static str = "Bit";
///     const CONSTANTS: &'static [&'static str] = &["Zero", "One"];
/// }
///
/// assert_eq!(EnumType::of::<Bit>().constants(), ["Zero", "One"]);
/// ```
pub trait CartesianEnum {
    const TYPE_NAME: &'static str;
    const CONSTANTS: &'static [&'static str];
}

/// One constant of an [`EnumType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    ty: Arc<EnumType>,
    ordinal: usize,
}

impl EnumConstant {
    pub fn name(&self) -> &str {
        &self.ty.constants[self.ordinal]
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn enum_type(&self) -> &Arc<EnumType> {
        &self.ty
    }
}

/// A single argument value.
///
/// Equality is structural and drives deduplication of value sequences. Floats compare
/// with `==`, so `NaN` never deduplicates against itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    Enum(EnumConstant),
}

impl Value {
    /// Name of the value kind, used in diagnostics and literal homogeneity checks.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumConstant> {
        match self {
            Value::Enum(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            // Debug keeps the fractional part: 1.0 renders as "1.0", not "1".
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Enum(c) => write!(f, "{}", c.name()),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(n: $ty) -> Self {
                Value::Int(i64::from(n))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<EnumConstant> for Value {
    fn from(c: EnumConstant) -> Self {
        Value::Enum(c)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Declared type of a parameter slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    Float,
    Char,
    String,
    Enum(Arc<EnumType>),
    /// Accepts any value.
    Any,
    /// A type only the host can produce (framework handles, reporters, ...).
    Other(String),
}

impl ParamType {
    /// Whether `value` may be bound to a slot of this type.
    ///
    /// `Null` binds to reference-like slots (`String`, `Enum`, `Any`, `Other`) but not to
    /// primitives. Integers widen to `Float`.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ParamType::Any, _) => true,
            (ParamType::Bool, Value::Bool(_)) => true,
            (ParamType::Int, Value::Int(_)) => true,
            (ParamType::Float, Value::Float(_) | Value::Int(_)) => true,
            (ParamType::Char, Value::Char(_)) => true,
            (ParamType::String, Value::String(_)) => true,
            (ParamType::Enum(ty), Value::Enum(c)) => c.enum_type().as_ref() == ty.as_ref(),
            (ParamType::String | ParamType::Enum(_) | ParamType::Other(_), Value::Null) => true,
            _ => false,
        }
    }

    pub fn as_enum(&self) -> Option<&Arc<EnumType>> {
        match self {
            ParamType::Enum(ty) => Some(ty),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => write!(f, "bool"),
            ParamType::Int => write!(f, "int"),
            ParamType::Float => write!(f, "float"),
            ParamType::Char => write!(f, "char"),
            ParamType::String => write!(f, "string"),
            ParamType::Enum(ty) => write!(f, "enum:{}", ty.name()),
            ParamType::Any => write!(f, "any"),
            ParamType::Other(name) => write!(f, "{name}"),
        }
    }
}
