#![forbid(unsafe_code)]

//! Bindable properties declared by controls.
//!
//! A [`Property`] is an observable value endpoint: it can be read and
//! written, may declare a [`Source`] saying where its value comes from, may
//! carry a [`Validator`], and raises [`Property::changed`] whenever its value
//! changes. Properties are shared as [`PropertyRef`] and identified by
//! reference, never by value.
//!
//! [`ValueProperty`] is the stock implementation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use fbind_core::Value;

use crate::reactive::{Event, EventPublisher};
use crate::validation::Validator;

pub type PropertyRef = Rc<dyn Property>;

/// Where a property's value comes from.
#[derive(Clone)]
pub enum Source {
    /// A dotted field path into the binder's model.
    Path(String),
    /// Another property; not model-bound.
    Property(Weak<dyn Property>),
}

impl Source {
    /// The binding path, if this source is one.
    #[must_use]
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(p) => Some(p),
            Self::Property(_) => None,
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Property(_) => f.write_str("Property(..)"),
        }
    }
}

/// A property refused a new value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("property is read-only")]
    ReadOnly,
    #[error("property rejected {value_kind} value: {reason}")]
    Rejected {
        value_kind: &'static str,
        reason: String,
    },
}

/// An addressable, observable value endpoint of a control.
pub trait Property {
    fn get(&self) -> Value;

    fn set(&self, value: Value) -> Result<(), PropertyError>;

    fn source(&self) -> Option<Source> {
        None
    }

    fn validator(&self) -> Option<Rc<dyn Validator>> {
        None
    }

    /// Raised after the value changes.
    fn changed(&self) -> Event<()>;
}

/// Reference identity of a property, usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyKey(usize);

impl PropertyKey {
    #[must_use]
    pub fn of(property: &PropertyRef) -> Self {
        Self(Rc::as_ptr(property).cast::<()>() as usize)
    }
}

/// Stock property holding its own [`Value`].
///
/// Setting an equal value is a no-op: no version bump and no `changed`.
///
/// ```
/// use fbind_core::Value;
/// use fbind_runtime::property::{Property, ValueProperty};
/// use fbind_runtime::validation::Required;
///
/// let name = ValueProperty::new(Value::Null)
///     .bound_to("Name")
///     .with_validator(Required);
/// name.set(Value::from("Ada")).unwrap();
/// assert_eq!(name.get(), Value::from("Ada"));
/// ```
pub struct ValueProperty {
    value: RefCell<Value>,
    version: Cell<u64>,
    changed: EventPublisher<()>,
    source: Option<Source>,
    validator: Option<Rc<dyn Validator>>,
    read_only: bool,
}

impl ValueProperty {
    #[must_use]
    pub fn new(initial: impl Into<Value>) -> Self {
        Self {
            value: RefCell::new(initial.into()),
            version: Cell::new(0),
            changed: EventPublisher::new(),
            source: None,
            validator: None,
            read_only: false,
        }
    }

    /// Bind to a model field path.
    #[must_use]
    pub fn bound_to(mut self, path: impl Into<String>) -> Self {
        self.source = Some(Source::Path(path.into()));
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Rc::new(validator));
        self
    }

    /// Refuse `set` from outside; see [`ValueProperty::force`].
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Change the value even if read-only, as the owning control would.
    pub fn force(&self, value: impl Into<Value>) {
        self.store(value.into());
    }

    /// Incremented on every value change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    #[must_use]
    pub fn into_ref(self) -> PropertyRef {
        Rc::new(self)
    }

    /// Replace the value and raise `changed` after the borrow is released.
    fn store(&self, value: Value) {
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        self.version.set(self.version.get() + 1);
        self.changed.publish(&());
    }
}

impl Property for ValueProperty {
    fn get(&self) -> Value {
        self.value.borrow().clone()
    }

    fn set(&self, value: Value) -> Result<(), PropertyError> {
        if self.read_only {
            return Err(PropertyError::ReadOnly);
        }
        self.store(value);
        Ok(())
    }

    fn source(&self) -> Option<Source> {
        self.source.clone()
    }

    fn validator(&self) -> Option<Rc<dyn Validator>> {
        self.validator.clone()
    }

    fn changed(&self) -> Event<()> {
        self.changed.event()
    }
}

impl fmt::Debug for ValueProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueProperty")
            .field("value", &*self.value.borrow())
            .field("version", &self.version.get())
            .field("source", &self.source)
            .field("has_validator", &self.validator.is_some())
            .field("read_only", &self.read_only)
            .finish()
    }
}
