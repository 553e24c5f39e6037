//! A general-purpose stack value
//!
//! Grammars with a single result type push that type directly. Grammars that
//! build heterogeneous results (a JSON document, a list of time components
//! next to their separators) can use [`Value`] and convert on the way out with
//! [`ActionContext::pop_as`](crate::ActionContext::pop_as).

use compact_str::CompactString;
use std::fmt;
use thiserror::Error;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(CompactString),
    List(Vec<Value>),
}

impl Value {
    /// Name of the variant, used in conversion errors
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::List(_) => "list",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Char(c) => write!(f, "{c:?}"),
            Self::Str(s) => write!(f, "{:?}", s.as_str()),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A [`Value`] of the wrong variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("found {found}")]
pub struct ValueTypeError {
    pub expected: &'static str,
    pub found: &'static str,
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ValueTypeError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::$variant(inner) => Ok(inner.into()),
                        other => Err(ValueTypeError {
                            expected: $name,
                            found: other.type_name(),
                        }),
                    }
                }
            }
        )*
    };
}

value_conversions! {
    bool => Bool, "bool";
    i64 => Int, "int";
    char => Char, "char";
    CompactString => Str, "string";
    String => Str, "string";
    Vec<Value> => List, "list";
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Integers widen to floats
impl TryFrom<Value> for f64 {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(x) => Ok(x),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(n) => Ok(n as f64),
            other => Err(ValueTypeError {
                expected: "float",
                found: other.type_name(),
            }),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(CompactString::from(value))
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}
