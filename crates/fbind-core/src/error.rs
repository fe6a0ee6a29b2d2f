#![forbid(unsafe_code)]

//! Structural binding errors.
//!
//! Every variant is fatal to the Reset or Submit call that raised it. The
//! messages are stable and name the offending field or path.

/// Structural problem resolving or converting a bound model field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// The model is not an accessible record.
    #[error("DataSource must be a pointer to a struct.")]
    InvalidDataSource,

    /// A path segment names a field the record does not have.
    #[error("Struct '{record}' has no field '{field}'.")]
    NoSuchField {
        record: &'static str,
        field: String,
    },

    /// An intermediate path segment is not a reference to a record.
    #[error("Field must be a pointer to a struct.")]
    NotAReference,

    /// An intermediate reference is nil.
    #[error("Pointer must not be nil.")]
    NilReference,

    /// Reset: a numeric property is bound to a field that has no numeric kind.
    #[error("Field '{path}': Can't convert {type_name} to float64.")]
    ToCanonical {
        path: String,
        type_name: &'static str,
    },

    /// Submit: a numeric value is bound to a field that has no numeric kind.
    #[error("Field '{path}': Can't convert float64 to {type_name}.")]
    FromCanonical {
        path: String,
        type_name: &'static str,
    },

    /// Submit: the value's shape is not assignable to the field.
    #[error("Field '{path}': Can't assign {value_kind} to {type_name}.")]
    NotAssignable {
        path: String,
        value_kind: &'static str,
        type_name: &'static str,
    },

    /// The binding path is syntactically malformed.
    #[error("Invalid binding path '{path}': {reason}.")]
    InvalidPath { path: String, reason: &'static str },
}
