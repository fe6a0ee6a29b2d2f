#![forbid(unsafe_code)]

//! The type-erased value exchanged between properties and model fields.
//!
//! Controls and models do not share a type system: a numeric edit reports a
//! plain `f64`, a text box a `String`, a combo box an opaque item or nothing
//! at all. [`Value`] is the closed vocabulary both sides speak.
//!
//! # Equality
//!
//! `Value` is `PartialEq` so observers can suppress no-op notifications.
//! `Any` and `Error` payloads compare by identity (`Rc::ptr_eq`), not by
//! content. `Number(NaN)` is never equal to itself.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::numeric::Numeric;

/// An error carried as a value, e.g. a property reporting it cannot produce
/// a current value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ValueError {
    message: Rc<str>,
}

impl ValueError {
    #[must_use]
    pub fn new(message: impl Into<Rc<str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl PartialEq for ValueError {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.message, &other.message)
    }
}

/// A value crossing the property/field boundary.
#[derive(Clone, Default)]
pub enum Value {
    /// No value (e.g. a selection control with nothing selected).
    #[default]
    Null,
    Bool(bool),
    /// The generic double-precision representation used by numeric controls.
    Number(f64),
    /// A number of a concrete width, as stored in a model field.
    Numeric(Numeric),
    Text(String),
    /// An opaque payload, compared by identity.
    Any(Rc<dyn Any>),
    /// An error in place of a value.
    Error(ValueError),
}

impl Value {
    /// Wrap an arbitrary payload.
    #[must_use]
    pub fn any<T: Any>(value: T) -> Self {
        Self::Any(Rc::new(value))
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "float64",
            Self::Numeric(n) => n.kind().type_name(),
            Self::Text(_) => "String",
            Self::Any(_) => "opaque value",
            Self::Error(_) => "error",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow an `Any` payload as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Any(rc) => rc.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Numeric(a), Self::Numeric(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Any(a), Self::Any(b)) => Rc::ptr_eq(a, b),
            (Self::Error(a), Self::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::Numeric(n) => f.debug_tuple("Numeric").field(n).finish(),
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Any(_) => f.write_str("Any(..)"),
            Self::Error(e) => f.debug_tuple("Error").field(&e.message()).finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Numeric> for Value {
    fn from(value: Numeric) -> Self {
        Self::Numeric(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<ValueError> for Value {
    fn from(value: ValueError) -> Self {
        Self::Error(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_compares_by_identity() {
        let a = Value::any(5u32);
        let b = a.clone();
        let c = Value::any(5u32);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<u32>(), Some(&5));
        assert_eq!(a.downcast_ref::<i32>(), None);
    }

    #[test]
    fn number_and_numeric_differ() {
        assert_ne!(Value::Number(5.0), Value::Numeric(Numeric::new(5i32)));
        assert_eq!(Value::Number(5.0), Value::from(5.0));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind_name(), "null");
        assert_eq!(Value::Number(1.0).kind_name(), "float64");
        assert_eq!(Value::Numeric(Numeric::new(1u8)).kind_name(), "u8");
        assert_eq!(Value::from("a").kind_name(), "String");
    }

    #[test]
    fn error_values_share_identity_through_clone() {
        let e = ValueError::new("no selection");
        let v = Value::Error(e.clone());
        assert_eq!(v, Value::Error(e));
        assert_ne!(v, Value::Error(ValueError::new("no selection")));
        assert_eq!(format!("{v:?}"), "Error(\"no selection\")");
    }
}
