#![forbid(unsafe_code)]

//! Field access by name: the capability the binder resolves paths through.
//!
//! A model is any type implementing [`Record`]. A record hands out its fields
//! by name as [`FieldValue`] trait objects, which know their type name, their
//! numeric kind (if any), how to read and assign themselves as a [`Value`],
//! and whether they are a reference to another record.
//!
//! Implementations are usually generated with [`impl_record!`](crate::impl_record):
//!
//! ```
//! use fbind_core::impl_record;
//! use fbind_core::record::Record;
//!
//! #[derive(Clone, Default)]
//! struct Address {
//!     city: String,
//! }
//! impl_record!(Address { "City" => city });
//!
//! #[derive(Clone, Default)]
//! struct Person {
//!     name: String,
//!     address: Option<Box<Address>>,
//! }
//! impl_record!(Person { "Name" => name, "Address" => address });
//!
//! let p = Person::default();
//! assert_eq!(p.field_names(), &["Name", "Address"]);
//! assert!(p.field("City").is_none());
//! ```
//!
//! # Assignment rules
//!
//! | Field type | Accepts |
//! |------------|---------|
//! | numeric primitive | `Numeric` of exactly the same kind |
//! | `bool` | `Bool` |
//! | `String` | `Text` |
//! | `Option<String>` | `Text`, `Null` |
//! | `Value` | anything |
//! | `Box<R>` | `Any` holding an `R` |
//! | `Option<Box<R>>` | `Any` holding an `R`, `Null` |

use crate::numeric::{Numeric, NumericKind, NumericPrimitive};
use crate::value::Value;

/// What a field refers to, for descending along a binding path.
pub enum Indirection<'a> {
    /// The field holds a value, not a reference.
    NotReference,
    /// The field is a reference that currently points nowhere.
    Nil,
    /// The field references a record.
    Record(&'a mut dyn Record),
}

/// A single addressable field of a record.
pub trait FieldValue {
    /// Type name used in error messages.
    fn type_name(&self) -> &'static str;

    /// The numeric kind, for fields that hold a number.
    fn numeric_kind(&self) -> Option<NumericKind> {
        None
    }

    /// Read the field.
    fn get(&self) -> Value;

    /// Assign the field. Returns the value unchanged if its shape is not
    /// assignable to this field.
    fn set(&mut self, value: Value) -> Result<(), Value>;

    /// Follow the field if it is a reference to a record.
    fn indirection(&mut self) -> Indirection<'_> {
        Indirection::NotReference
    }
}

/// A record whose fields can be addressed by name.
pub trait Record {
    fn type_name(&self) -> &'static str;

    /// Field names in declaration order.
    fn field_names(&self) -> &'static [&'static str];

    fn field(&self, name: &str) -> Option<&dyn FieldValue>;

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn FieldValue>;
}

/// Last path component of a Rust type name (`my::model::Address` → `Address`).
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

macro_rules! numeric_field {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn type_name(&self) -> &'static str {
                    <$ty as NumericPrimitive>::KIND.type_name()
                }

                fn numeric_kind(&self) -> Option<NumericKind> {
                    Some(<$ty as NumericPrimitive>::KIND)
                }

                fn get(&self) -> Value {
                    Value::Numeric(Numeric::new(*self))
                }

                fn set(&mut self, value: Value) -> Result<(), Value> {
                    match value {
                        Value::Numeric(n) => match n.get::<$ty>() {
                            Some(v) => {
                                *self = v;
                                Ok(())
                            }
                            None => Err(Value::Numeric(n)),
                        },
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

numeric_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl FieldValue for bool {
    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn get(&self) -> Value {
        Value::Bool(*self)
    }

    fn set(&mut self, value: Value) -> Result<(), Value> {
        match value {
            Value::Bool(b) => {
                *self = b;
                Ok(())
            }
            other => Err(other),
        }
    }
}

impl FieldValue for String {
    fn type_name(&self) -> &'static str {
        "String"
    }

    fn get(&self) -> Value {
        Value::Text(self.clone())
    }

    fn set(&mut self, value: Value) -> Result<(), Value> {
        match value {
            Value::Text(s) => {
                *self = s;
                Ok(())
            }
            other => Err(other),
        }
    }
}

impl FieldValue for Option<String> {
    fn type_name(&self) -> &'static str {
        "Option<String>"
    }

    fn get(&self) -> Value {
        self.clone().map_or(Value::Null, Value::Text)
    }

    fn set(&mut self, value: Value) -> Result<(), Value> {
        match value {
            Value::Text(s) => {
                *self = Some(s);
                Ok(())
            }
            Value::Null => {
                *self = None;
                Ok(())
            }
            other => Err(other),
        }
    }
}

impl FieldValue for Value {
    fn type_name(&self) -> &'static str {
        "Value"
    }

    fn get(&self) -> Value {
        self.clone()
    }

    fn set(&mut self, value: Value) -> Result<(), Value> {
        *self = value;
        Ok(())
    }
}

impl<R: Record + Clone + 'static> FieldValue for Box<R> {
    fn type_name(&self) -> &'static str {
        short_type_name::<R>()
    }

    fn get(&self) -> Value {
        Value::any(R::clone(self))
    }

    fn set(&mut self, value: Value) -> Result<(), Value> {
        match value.downcast_ref::<R>() {
            Some(r) => {
                **self = r.clone();
                Ok(())
            }
            None => Err(value),
        }
    }

    fn indirection(&mut self) -> Indirection<'_> {
        Indirection::Record(&mut **self)
    }
}

impl<R: Record + Clone + 'static> FieldValue for Option<Box<R>> {
    fn type_name(&self) -> &'static str {
        short_type_name::<R>()
    }

    fn get(&self) -> Value {
        match self {
            Some(r) => Value::any(R::clone(r)),
            None => Value::Null,
        }
    }

    fn set(&mut self, value: Value) -> Result<(), Value> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        match value.downcast_ref::<R>() {
            Some(r) => {
                *self = Some(Box::new(r.clone()));
                Ok(())
            }
            None => Err(value),
        }
    }

    fn indirection(&mut self) -> Indirection<'_> {
        match self {
            Some(r) => Indirection::Record(&mut **r),
            None => Indirection::Nil,
        }
    }
}

/// Generate a [`Record`] implementation from a field list.
///
/// Fields are addressed by their Rust name, or by an explicit alias:
///
/// ```ignore
/// impl_record!(Person { name, age });
/// impl_record!(Person { "Name" => name, "Age" => age });
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ident { $($key:literal => $field:ident),* $(,)? }) => {
        $crate::impl_record!(@impl $ty, [$($key => $field),*]);
    };
    ($ty:ident { $($field:ident),* $(,)? }) => {
        $crate::impl_record!(@impl $ty, [$(stringify!($field) => $field),*]);
    };
    (@impl $ty:ident, [$($key:expr => $field:ident),*]) => {
        impl $crate::record::Record for $ty {
            fn type_name(&self) -> &'static str {
                stringify!($ty)
            }

            fn field_names(&self) -> &'static [&'static str] {
                &[$($key),*]
            }

            fn field(&self, name: &str) -> Option<&dyn $crate::record::FieldValue> {
                match name {
                    $(n if n == $key => Some(&self.$field as &dyn $crate::record::FieldValue),)*
                    _ => None,
                }
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> Option<&mut dyn $crate::record::FieldValue> {
                match name {
                    $(n if n == $key => {
                        Some(&mut self.$field as &mut dyn $crate::record::FieldValue)
                    })*
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }
    crate::impl_record!(Point { x, y });

    #[derive(Clone, Default)]
    struct Shape {
        label: Option<String>,
        origin: Option<Box<Point>>,
        anchor: Box<Point>,
        visible: bool,
        extra: Value,
    }
    crate::impl_record!(Shape {
        "Label" => label,
        "Origin" => origin,
        "Anchor" => anchor,
        "Visible" => visible,
        "Extra" => extra,
    });

    #[test]
    fn generated_accessors() {
        let mut p = Point { x: 1, y: 2 };
        assert_eq!(p.type_name(), "Point");
        assert_eq!(p.field_names(), &["x", "y"]);
        assert_eq!(
            p.field("y").map(|f| f.get()),
            Some(Value::from(Numeric::new(2i32)))
        );
        assert!(p.field("z").is_none());

        let f = p.field_mut("x").expect("x exists");
        f.set(Value::from(Numeric::new(9i32))).expect("same kind");
        assert_eq!(p.x, 9);
    }

    #[test]
    fn numeric_requires_same_kind() {
        let mut v = 3u8;
        let rejected = v.set(Value::from(Numeric::new(4i64))).unwrap_err();
        assert_eq!(rejected, Value::from(Numeric::new(4i64)));
        assert!(v.set(Value::Number(4.0)).is_err());
        assert_eq!(v, 3);
        assert_eq!(v.numeric_kind(), Some(<u8 as NumericPrimitive>::KIND));
    }

    #[test]
    fn optional_string_accepts_null() {
        let mut s = Shape::default();
        let f = s.field_mut("Label").expect("label");
        f.set(Value::from("tri")).expect("text");
        assert_eq!(f.get(), Value::from("tri"));
        f.set(Value::Null).expect("null");
        assert_eq!(s.label, None);
    }

    #[test]
    fn optional_reference_indirection() {
        let mut s = Shape::default();
        {
            let f = s.field_mut("Origin").expect("origin");
            assert!(matches!(f.indirection(), Indirection::Nil));
            assert_eq!(f.get(), Value::Null);
            assert_eq!(f.type_name(), "Point");
            f.set(Value::any(Point { x: 4, y: 5 })).expect("point payload");
        }
        let f = s.field_mut("Origin").expect("origin");
        match f.indirection() {
            Indirection::Record(r) => {
                assert_eq!(r.type_name(), "Point");
                assert!(r.field("x").is_some());
            }
            _ => panic!("expected a record"),
        }
        assert_eq!(s.origin.as_deref(), Some(&Point { x: 4, y: 5 }));
    }

    #[test]
    fn boxed_reference_is_never_nil() {
        let mut s = Shape::default();
        let f = s.field_mut("Anchor").expect("anchor");
        assert!(matches!(f.indirection(), Indirection::Record(_)));
        assert!(f.set(Value::Null).is_err());
        assert_eq!(f.get().downcast_ref::<Point>(), Some(&Point::default()));
    }

    #[test]
    fn plain_fields_are_not_references() {
        let mut s = Shape::default();
        let f = s.field_mut("Visible").expect("visible");
        assert!(matches!(f.indirection(), Indirection::NotReference));
        assert!(f.set(Value::from("yes")).is_err());
        f.set(Value::Bool(true)).expect("bool");
        assert!(s.visible);
    }

    #[test]
    fn value_field_accepts_anything() {
        let mut s = Shape::default();
        let f = s.field_mut("Extra").expect("extra");
        f.set(Value::Number(1.5)).expect("number");
        f.set(Value::from("text")).expect("text");
        assert_eq!(s.extra, Value::from("text"));
    }
}
