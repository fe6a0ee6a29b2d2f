#![forbid(unsafe_code)]

//! Dotted binding paths and their resolution against a record.
//!
//! A binding path such as `"Address.City"` names a field by walking from the
//! model root: every segment but the last must name a field that references
//! another record, and the last segment names the field to read or write.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Error |
//! |---------|-------|-------|
//! | Malformed path | empty, `A..B`, `1st` | [`BindingError::InvalidPath`] |
//! | Unknown field | typo, wrong record | [`BindingError::NoSuchField`] |
//! | Value in the middle | `Name.First` where `Name` is a `String` | [`BindingError::NotAReference`] |
//! | Nil in the middle | `Address` is `None` | [`BindingError::NilReference`] |
//!
//! Resolution stops at the first failure; later segments are never touched.

use std::fmt;
use std::str::FromStr;

use crate::error::BindingError;
use crate::record::{FieldValue, Indirection, Record};

/// A validated, dot-separated field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingPath {
    raw: String,
}

impl BindingPath {
    /// Parse and validate a binding path.
    ///
    /// Each segment must be an identifier: an ASCII letter or `_` followed by
    /// ASCII letters, digits or `_`.
    pub fn parse(path: &str) -> Result<Self, BindingError> {
        let invalid = |reason| BindingError::InvalidPath {
            path: path.to_owned(),
            reason,
        };
        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        for segment in path.split('.') {
            let mut chars = segment.chars();
            match chars.next() {
                None => return Err(invalid("empty segment")),
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
                Some(_) => return Err(invalid("segment must start with a letter or '_'")),
            }
            if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("segment contains an invalid character"));
            }
        }
        Ok(Self {
            raw: path.to_owned(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path segments from root to leaf. Never empty.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('.')
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The final segment, naming the bound field.
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.raw.rsplit('.').next().unwrap_or(&self.raw)
    }
}

impl FromStr for BindingPath {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BindingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Walk `path` from `root` and hand the final field to `action`.
///
/// Intermediate segments must reference records; the action runs only if
/// the whole path resolves.
pub fn resolve_field<T>(
    root: &mut dyn Record,
    path: &BindingPath,
    action: impl FnOnce(&mut dyn FieldValue) -> T,
) -> Result<T, BindingError> {
    let mut record = root;
    let depth = path.depth();
    for (i, name) in path.segments().enumerate() {
        let record_name = record.type_name();
        let field = record
            .field_mut(name)
            .ok_or_else(|| BindingError::NoSuchField {
                record: record_name,
                field: name.to_owned(),
            })?;
        if i + 1 == depth {
            return Ok(action(field));
        }
        record = match field.indirection() {
            Indirection::Record(next) => next,
            Indirection::Nil => return Err(BindingError::NilReference),
            Indirection::NotReference => return Err(BindingError::NotAReference),
        };
    }
    // `parse` guarantees at least one segment.
    Err(BindingError::InvalidPath {
        path: path.as_str().to_owned(),
        reason: "path is empty",
    })
}
