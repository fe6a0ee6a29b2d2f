#![forbid(unsafe_code)]

//! Controls: the owners of bindable properties.
//!
//! The binder sees a control only as a name and an ordered list of declared
//! properties. [`ControlBase`] is a ready-made control for hosts that do not
//! have their own.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::property::PropertyRef;

pub type ControlRef = Rc<dyn Control>;

/// A UI element that declares named properties.
pub trait Control {
    /// Display name, used in diagnostics.
    fn name(&self) -> &str;

    /// Declared properties in declaration order.
    fn properties(&self) -> Vec<(String, PropertyRef)>;
}

/// Reference identity of a control, usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlKey(usize);

impl ControlKey {
    #[must_use]
    pub fn of(control: &ControlRef) -> Self {
        Self(Rc::as_ptr(control).cast::<()>() as usize)
    }
}

/// A control that is nothing but its declared properties.
///
/// ```
/// use fbind_core::Value;
/// use fbind_runtime::control::{Control, ControlBase};
/// use fbind_runtime::property::ValueProperty;
///
/// let edit = ControlBase::new("nameEdit")
///     .with_property("Text", ValueProperty::new(Value::Null).bound_to("Name").into_ref());
/// assert_eq!(edit.properties().len(), 1);
/// assert!(edit.property("Text").is_some());
/// ```
pub struct ControlBase {
    name: String,
    properties: RefCell<Vec<(String, PropertyRef)>>,
}

impl ControlBase {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: RefCell::new(Vec::new()),
        }
    }

    /// Declare a property. Re-declaring a name replaces the property in place.
    pub fn declare(&self, name: impl Into<String>, property: PropertyRef) {
        let name = name.into();
        let mut properties = self.properties.borrow_mut();
        match properties.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = property,
            None => properties.push((name, property)),
        }
    }

    #[must_use]
    pub fn with_property(self, name: impl Into<String>, property: PropertyRef) -> Self {
        self.declare(name, property);
        self
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<PropertyRef> {
        self.properties
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| Rc::clone(p))
    }

    #[must_use]
    pub fn into_ref(self) -> ControlRef {
        Rc::new(self)
    }
}

impl Control for ControlBase {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> Vec<(String, PropertyRef)> {
        self.properties.borrow().clone()
    }
}

impl fmt::Debug for ControlBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .properties
            .borrow()
            .iter()
            .map(|(n, _)| n.clone())
            .collect();
        f.debug_struct("ControlBase")
            .field("name", &self.name)
            .field("properties", &names)
            .finish()
    }
}
