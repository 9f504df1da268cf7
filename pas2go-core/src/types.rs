//! Core type system of the source language.
//!
//! Types are a closed set: five scalars plus a one-level fixed-size array.
//! There is no subtyping and no implicit numeric promotion, so the analyzer
//! compares types with plain structural equality.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Real,
    Boolean,
    Char,
    String,
    /// `array[low..high] of elem`.
    ///
    /// The parser guarantees `low <= high` and that `elem` is a scalar.
    Array {
        low: i64,
        high: i64,
        elem: Box<Type>,
    },
}

impl Type {
    pub fn array(low: i64, high: i64, elem: Type) -> Type {
        Type::Array {
            low,
            high,
            elem: Box::new(elem),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Real)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    /// Element type of an array, `None` for scalars.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// Declared lower bound of an array, `None` for scalars.
    pub fn lower_bound(&self) -> Option<i64> {
        match self {
            Type::Array { low, .. } => Some(*low),
            _ => None,
        }
    }

    /// Number of elements of an array (`high - low + 1`), `None` for scalars.
    pub fn size(&self) -> Option<u64> {
        match self {
            Type::Array { low, high, .. } => Some(high.abs_diff(*low).saturating_add(1)),
            _ => None,
        }
    }
}

/// Source-language spelling, e.g. `array[1..3] of integer`.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => f.write_str("integer"),
            Type::Real => f.write_str("real"),
            Type::Boolean => f.write_str("boolean"),
            Type::Char => f.write_str("char"),
            Type::String => f.write_str("string"),
            Type::Array { low, high, elem } => write!(f, "array[{low}..{high}] of {elem}"),
        }
    }
}
