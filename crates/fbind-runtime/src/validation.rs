#![forbid(unsafe_code)]

//! Validation rules attached to properties.
//!
//! A [`Validator`] inspects a property's current [`Value`] and either accepts
//! it or returns a [`ValidationError`]. Validators are pure: they see only
//! the value, never the binder or the model.
//!
//! # Example
//!
//! ```
//! use fbind_core::Value;
//! use fbind_runtime::validation::{Range, Required, Validator};
//!
//! assert!(Required.validate(&Value::from("x")).is_ok());
//! assert!(Required.validate(&Value::Null).is_err());
//!
//! let age = Range::new(0.0, 150.0);
//! assert!(age.validate(&Value::Number(42.0)).is_ok());
//! assert_eq!(age.validate(&Value::Number(200.0)).unwrap_err().code(), "range");
//! ```

use fbind_core::Value;

pub const ERROR_CODE_REQUIRED: &str = "required";
pub const ERROR_CODE_RANGE: &str = "range";
pub const ERROR_CODE_MIN_LENGTH: &str = "min_length";
pub const ERROR_CODE_MAX_LENGTH: &str = "max_length";
pub const ERROR_CODE_CUSTOM: &str = "custom";

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    code: &'static str,
    message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A stable machine-readable code, e.g. `"required"`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A validation rule.
pub trait Validator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;
}

/// Rejects `Null` and empty or whitespace-only text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Validator for Required {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let missing = match value {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        };
        if missing {
            Err(ValidationError::new(ERROR_CODE_REQUIRED, "A value is required."))
        } else {
            Ok(())
        }
    }
}

/// Accepts numbers within `min..=max`. `Null` passes; pair with [`Required`].
#[derive(Debug, Clone, Copy)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Validator for Range {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let n = match value {
            Value::Null => return Ok(()),
            Value::Number(n) => *n,
            Value::Numeric(n) => n.to_canonical(),
            other => {
                return Err(ValidationError::new(
                    ERROR_CODE_RANGE,
                    format!("Expected a number, got {}.", other.kind_name()),
                ));
            }
        };
        if n >= self.min && n <= self.max {
            Ok(())
        } else {
            Err(ValidationError::new(
                ERROR_CODE_RANGE,
                format!("Must be between {} and {}.", self.min, self.max),
            ))
        }
    }
}

/// Text must have at least `min` characters. Non-text values pass.
#[derive(Debug, Clone, Copy)]
pub struct MinLength(pub usize);

impl Validator for MinLength {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match value.as_text() {
            Some(s) if s.chars().count() < self.0 => Err(ValidationError::new(
                ERROR_CODE_MIN_LENGTH,
                format!("Must be at least {} characters.", self.0),
            )),
            _ => Ok(()),
        }
    }
}

/// Text must have at most `max` characters. Non-text values pass.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl Validator for MaxLength {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match value.as_text() {
            Some(s) if s.chars().count() > self.0 => Err(ValidationError::new(
                ERROR_CODE_MAX_LENGTH,
                format!("Must be at most {} characters.", self.0),
            )),
            _ => Ok(()),
        }
    }
}

/// A validator backed by a closure.
pub struct FnValidator<F>(F);

impl<F> FnValidator<F>
where
    F: Fn(&Value) -> Result<(), ValidationError>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(&Value) -> Result<(), ValidationError>,
{
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        (self.0)(value)
    }
}

impl<F> std::fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbind_core::Numeric;

    #[test]
    fn required_rejects_blank_text() {
        assert!(Required.validate(&Value::from("  ")).is_err());
        assert!(Required.validate(&Value::Bool(false)).is_ok());
        assert_eq!(
            Required.validate(&Value::Null).unwrap_err().code(),
            ERROR_CODE_REQUIRED
        );
    }

    #[test]
    fn range_is_inclusive() {
        let r = Range::new(1.0, 10.0);
        assert!(r.validate(&Value::Number(1.0)).is_ok());
        assert!(r.validate(&Value::Number(10.0)).is_ok());
        assert!(r.validate(&Value::Number(10.5)).is_err());
        assert!(r.validate(&Value::Number(f64::NAN)).is_err());
    }

    #[test]
    fn range_accepts_concrete_numerics_and_null() {
        let r = Range::new(0.0, 255.0);
        assert!(r.validate(&Value::from(Numeric::new(200u8))).is_ok());
        assert!(r.validate(&Value::from(Numeric::new(-1i32))).is_err());
        assert!(r.validate(&Value::Null).is_ok());
    }

    #[test]
    fn range_rejects_text() {
        let err = Range::new(0.0, 1.0).validate(&Value::from("1")).unwrap_err();
        assert_eq!(err.message(), "Expected a number, got String.");
    }

    #[test]
    fn length_counts_chars() {
        assert!(MinLength(3).validate(&Value::from("héé")).is_ok());
        assert!(MinLength(3).validate(&Value::from("hé")).is_err());
        assert!(MaxLength(2).validate(&Value::from("héé")).is_err());
        assert!(MaxLength(2).validate(&Value::Number(100.0)).is_ok());
    }

    #[test]
    fn closure_validator() {
        let even = FnValidator::new(|v: &Value| match v.as_number() {
            Some(n) if n % 2.0 == 0.0 => Ok(()),
            _ => Err(ValidationError::new(ERROR_CODE_CUSTOM, "Must be even.")),
        });
        assert!(even.validate(&Value::Number(4.0)).is_ok());
        assert_eq!(
            even.validate(&Value::Number(3.0)).unwrap_err().to_string(),
            "Must be even."
        );
    }
}
