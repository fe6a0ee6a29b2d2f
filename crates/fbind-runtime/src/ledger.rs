#![forbid(unsafe_code)]

//! The validation ledger: which (control, property) pairs currently fail.
//!
//! # Invariants
//!
//! 1. A control appears only while at least one of its properties fails;
//!    clearing the last failure removes the control key.
//! 2. [`ValidationLedger::record_failure`] returns `true` exactly when the
//!    ledger goes from empty to non-empty.
//! 3. [`ValidationLedger::clear`] returns `true` exactly when the ledger goes
//!    from non-empty to empty.
//!
//! Commit eligibility is `is_empty()`; the two edge flags are what the binder
//! turns into eligibility notifications.

use ahash::AHashMap;

use crate::control::ControlKey;
use crate::property::PropertyKey;
use crate::validation::ValidationError;

#[derive(Debug, Default)]
pub struct ValidationLedger {
    entries: AHashMap<ControlKey, AHashMap<PropertyKey, ValidationError>>,
}

impl ValidationLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) a failure. Returns whether the ledger just became
    /// non-empty.
    pub fn record_failure(
        &mut self,
        control: ControlKey,
        property: PropertyKey,
        error: ValidationError,
    ) -> bool {
        let was_clean = self.entries.is_empty();
        self.entries
            .entry(control)
            .or_default()
            .insert(property, error);
        was_clean
    }

    /// Clear a failure if present. Returns whether the ledger just became
    /// empty.
    pub fn clear(&mut self, control: ControlKey, property: PropertyKey) -> bool {
        let Some(errors) = self.entries.get_mut(&control) else {
            return false;
        };
        if errors.remove(&property).is_none() || !errors.is_empty() {
            return false;
        }
        self.entries.remove(&control);
        self.entries.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Controls with at least one failure.
    #[must_use]
    pub fn control_count(&self) -> usize {
        self.entries.len()
    }

    /// Total failing properties.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }

    #[must_use]
    pub fn error(&self, control: ControlKey, property: PropertyKey) -> Option<&ValidationError> {
        self.entries.get(&control)?.get(&property)
    }

    /// All failures for one control, in no particular order.
    pub fn errors_for(&self, control: ControlKey) -> impl Iterator<Item = &ValidationError> {
        self.entries.get(&control).into_iter().flat_map(|m| m.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlBase, ControlRef};
    use crate::property::{PropertyRef, ValueProperty};
    use crate::validation::ERROR_CODE_REQUIRED;
    use fbind_core::Value;

    fn keys() -> (ControlRef, ControlRef, PropertyRef, PropertyRef) {
        (
            ControlBase::new("c1").into_ref(),
            ControlBase::new("c2").into_ref(),
            ValueProperty::new(Value::Null).into_ref(),
            ValueProperty::new(Value::Null).into_ref(),
        )
    }

    fn err() -> ValidationError {
        ValidationError::new(ERROR_CODE_REQUIRED, "required")
    }

    #[test]
    fn edges_fire_only_on_transitions() {
        let (c1, c2, p1, p2) = keys();
        let (c1, c2) = (ControlKey::of(&c1), ControlKey::of(&c2));
        let (p1, p2) = (PropertyKey::of(&p1), PropertyKey::of(&p2));
        let mut ledger = ValidationLedger::new();

        assert!(ledger.record_failure(c1, p1, err()));
        assert!(!ledger.record_failure(c1, p1, err()), "still dirty");
        assert!(!ledger.record_failure(c2, p2, err()));
        assert_eq!(ledger.error_count(), 2);

        assert!(!ledger.clear(c1, p1));
        assert!(ledger.clear(c2, p2));
        assert!(ledger.is_empty());
    }

    #[test]
    fn control_removed_with_last_failure() {
        let (c1, _, p1, p2) = keys();
        let c1 = ControlKey::of(&c1);
        let (p1, p2) = (PropertyKey::of(&p1), PropertyKey::of(&p2));
        let mut ledger = ValidationLedger::new();

        ledger.record_failure(c1, p1, err());
        ledger.record_failure(c1, p2, err());
        assert_eq!(ledger.control_count(), 1);
        assert_eq!(ledger.errors_for(c1).count(), 2);

        ledger.clear(c1, p1);
        assert_eq!(ledger.control_count(), 1);
        assert!(ledger.error(c1, p1).is_none());
        assert!(ledger.error(c1, p2).is_some());

        assert!(ledger.clear(c1, p2));
        assert_eq!(ledger.control_count(), 0);
        assert_eq!(ledger.errors_for(c1).count(), 0);
    }

    #[test]
    fn clearing_unknown_entries_is_a_no_op() {
        let (c1, c2, p1, p2) = keys();
        let (c1, c2) = (ControlKey::of(&c1), ControlKey::of(&c2));
        let (p1, p2) = (PropertyKey::of(&p1), PropertyKey::of(&p2));
        let mut ledger = ValidationLedger::new();

        assert!(!ledger.clear(c1, p1));
        ledger.record_failure(c1, p1, err());
        assert!(!ledger.clear(c1, p2));
        assert!(!ledger.clear(c2, p1));
        assert_eq!(ledger.error_count(), 1);
    }
}
