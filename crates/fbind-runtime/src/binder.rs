#![forbid(unsafe_code)]

//! The data binder: keeps control properties and model fields in sync.
//!
//! A [`DataBinder`] is given a model (any [`Record`] behind
//! `Rc<RefCell<..>>`) and a list of bound controls. Every property whose
//! [`Source`](crate::property::Source) is a binding path is registered;
//! everything else a control declares is ignored.
//!
//! - [`DataBinder::reset`] copies model fields into properties.
//! - [`DataBinder::submit`] copies property values into model fields, but
//!   only while no bound property fails validation.
//! - Each registered property is re-validated whenever it changes. The
//!   outcome goes to the optional [`ErrorPresenter`] and into the validation
//!   ledger; [`DataBinder::can_submit_changed`] fires when the ledger flips
//!   between empty and non-empty.
//!
//! # Invariants
//!
//! 1. Only properties with a non-empty path source are registered.
//! 2. `can_submit()` is exactly "no property currently fails validation".
//! 3. `can_submit_changed` fires once per eligibility flip, never on two
//!    consecutive results with the same eligibility.
//! 4. `submit()` with outstanding failures returns
//!    [`BinderError::ValidationFailed`] and writes nothing.
//! 5. `set_bound_controls` detaches every listener of the previous session
//!    before registering the new one.
//! 6. No binder borrow is held while validators, presenters, eligibility
//!    handlers or property setters run, so they may query the binder.
//!
//! # Failure Modes
//!
//! | Failure | Error |
//! |---------|-------|
//! | Path does not resolve | [`BinderError::Binding`] |
//! | Model already mutably borrowed | [`BindingError::InvalidDataSource`] |
//! | Property refuses a value during reset | [`BinderError::Property`] |
//! | Property reports an error value during submit | [`BinderError::Value`] |
//! | Outstanding validation failures at submit | [`BinderError::ValidationFailed`] |
//!
//! Validators and presenters must not change bound properties from inside
//! the validation callback; the resulting nested validation is not guarded.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use fbind_core::{
    BindingError, BindingPath, FieldValue, Numeric, Record, Value, ValueError, resolve_field,
};
use tracing::{debug, trace};

use crate::control::{ControlKey, ControlRef};
use crate::ledger::ValidationLedger;
use crate::property::{PropertyError, PropertyKey, PropertyRef};
use crate::reactive::{BindingScope, Event, EventPublisher};
use crate::validation::ValidationError;

/// A model shared with the binder.
pub type ModelRef = Rc<RefCell<dyn Record>>;

/// Receives the outcome of every validation of a bound property.
///
/// The presenter is called after every validation, not only on failures.
/// A passing property yields `None` even when its control never failed, so
/// implementations should treat `None` as "clear if shown".
pub trait ErrorPresenter {
    /// `error` is `None` when the property passed.
    fn present_error(&self, error: Option<&ValidationError>, control: &ControlRef);
}

/// Failure of [`DataBinder::reset`] or [`DataBinder::submit`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BinderError {
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("validation failed")]
    ValidationFailed,
    #[error(transparent)]
    Property(#[from] PropertyError),
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// One registered property.
#[derive(Clone)]
struct Binding {
    property: PropertyRef,
    control: ControlRef,
    source: String,
    path: Result<BindingPath, BindingError>,
}

struct BinderState {
    model: Option<ModelRef>,
    bound_controls: Vec<ControlRef>,
    bindings: Vec<Binding>,
    property_to_control: AHashMap<PropertyKey, ControlRef>,
    listeners: BindingScope,
    ledger: ValidationLedger,
    presenter: Option<Rc<dyn ErrorPresenter>>,
    can_submit_changed: EventPublisher<bool>,
}

/// Synchronizes control properties with fields of a model record.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use fbind_core::{Value, impl_record};
/// use fbind_runtime::binder::{DataBinder, ModelRef};
/// use fbind_runtime::control::ControlBase;
/// use fbind_runtime::property::{Property, ValueProperty};
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
/// impl_record!(Person { "Name" => name, "Age" => age });
///
/// let person = Rc::new(RefCell::new(Person { name: "Ada".into(), age: 36 }));
/// let name = ValueProperty::new(Value::Null).bound_to("Name").into_ref();
/// let age = ValueProperty::new(0.0).bound_to("Age").into_ref();
/// let form = ControlBase::new("form")
///     .with_property("Text", name.clone())
///     .with_property("Value", age.clone())
///     .into_ref();
///
/// let binder = DataBinder::new();
/// let model: ModelRef = person.clone();
/// binder.set_model(Some(model));
/// binder.set_bound_controls(vec![form]);
///
/// binder.reset().unwrap();
/// assert_eq!(name.get(), Value::from("Ada"));
/// assert_eq!(age.get(), Value::Number(36.0));
///
/// age.set(Value::Number(37.0)).unwrap();
/// binder.submit().unwrap();
/// assert_eq!(person.borrow().age, 37);
/// ```
pub struct DataBinder {
    state: Rc<RefCell<BinderState>>,
}

impl Default for DataBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl DataBinder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(BinderState {
                model: None,
                bound_controls: Vec::new(),
                bindings: Vec::new(),
                property_to_control: AHashMap::new(),
                listeners: BindingScope::new(),
                ledger: ValidationLedger::new(),
                presenter: None,
                can_submit_changed: EventPublisher::new(),
            })),
        }
    }

    #[must_use]
    pub fn model(&self) -> Option<ModelRef> {
        self.state.borrow().model.clone()
    }

    /// Replace the model. Takes effect on the next reset or submit.
    pub fn set_model(&self, model: Option<ModelRef>) {
        self.state.borrow_mut().model = model;
    }

    #[must_use]
    pub fn bound_controls(&self) -> Vec<ControlRef> {
        self.state.borrow().bound_controls.clone()
    }

    /// Start a new binding session.
    ///
    /// Detaches all listeners of the previous session, rebuilds the property
    /// registry and clears the validation ledger. If that clears outstanding
    /// failures, `can_submit_changed` fires.
    pub fn set_bound_controls(&self, controls: Vec<ControlRef>) {
        let previous = std::mem::take(&mut self.state.borrow_mut().listeners);
        drop(previous);

        let mut listeners = BindingScope::new();
        let mut bindings = Vec::new();
        let mut property_to_control = AHashMap::new();

        for control in &controls {
            for (name, property) in control.properties() {
                let Some(source) = property
                    .source()
                    .and_then(|s| s.as_path().map(str::to_owned))
                    .filter(|p| !p.is_empty())
                else {
                    continue;
                };

                let weak_state = Rc::downgrade(&self.state);
                let weak_property = Rc::downgrade(&property);
                let weak_control = Rc::downgrade(control);
                listeners.attach(&property.changed(), move |()| {
                    on_property_changed(&weak_state, &weak_property, &weak_control);
                });

                trace!(control = control.name(), property = %name, path = %source, "registered binding");
                property_to_control.insert(PropertyKey::of(&property), Rc::clone(control));
                bindings.push(Binding {
                    path: BindingPath::parse(&source),
                    source,
                    property,
                    control: Rc::clone(control),
                });
            }
        }

        let (flipped, publisher) = {
            let mut state = self.state.borrow_mut();
            let had_errors = !state.ledger.is_empty();
            debug!(
                controls = controls.len(),
                bindings = bindings.len(),
                "binding session started"
            );
            state.bound_controls = controls;
            state.bindings = bindings;
            state.property_to_control = property_to_control;
            state.listeners = listeners;
            state.ledger = ValidationLedger::new();
            (had_errors, state.can_submit_changed.clone())
        };
        if flipped {
            debug!(can_submit = true, "commit eligibility changed");
            publisher.publish(&true);
        }
    }

    #[must_use]
    pub fn error_presenter(&self) -> Option<Rc<dyn ErrorPresenter>> {
        self.state.borrow().presenter.clone()
    }

    pub fn set_error_presenter(&self, presenter: Option<Rc<dyn ErrorPresenter>>) {
        self.state.borrow_mut().presenter = presenter;
    }

    /// Whether no bound property currently fails validation.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.state.borrow().ledger.is_empty()
    }

    /// Raised with the new eligibility whenever `can_submit()` flips.
    #[must_use]
    pub fn can_submit_changed(&self) -> Event<bool> {
        self.state.borrow().can_submit_changed.event()
    }

    /// Registered properties in registration order.
    #[must_use]
    pub fn properties(&self) -> Vec<PropertyRef> {
        self.state
            .borrow()
            .bindings
            .iter()
            .map(|b| Rc::clone(&b.property))
            .collect()
    }

    /// The control that declared a registered property.
    #[must_use]
    pub fn control_for(&self, property: &PropertyRef) -> Option<ControlRef> {
        self.state
            .borrow()
            .property_to_control
            .get(&PropertyKey::of(property))
            .cloned()
    }

    /// Number of properties currently failing validation.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.state.borrow().ledger.error_count()
    }

    /// Current validation failures of one control.
    #[must_use]
    pub fn errors_for(&self, control: &ControlRef) -> Vec<ValidationError> {
        self.state
            .borrow()
            .ledger
            .errors_for(ControlKey::of(control))
            .cloned()
            .collect()
    }

    /// Copy every bound model field into its property.
    ///
    /// A property currently holding a `Number` receives the field converted to
    /// the canonical `f64`; a field without a numeric kind is a
    /// [`BindingError::ToCanonical`]. Each property is re-validated after it
    /// is set.
    pub fn reset(&self) -> Result<(), BinderError> {
        let (model, bindings) = self.snapshot();
        let Some(model) = model else {
            return Ok(());
        };
        let _span = tracing::debug_span!("binder_reset", bindings = bindings.len()).entered();

        for binding in &bindings {
            let path = binding.path.clone()?;
            let (field_value, numeric_kind, type_name) = with_model(&model, |root| {
                resolve_field(root, &path, |field| {
                    (field.get(), field.numeric_kind(), field.type_name())
                })
            })?;

            let value = if matches!(binding.property.get(), Value::Number(_)) {
                match (field_value, numeric_kind) {
                    (Value::Numeric(n), Some(_)) => Value::Number(n.to_canonical()),
                    _ => {
                        return Err(BindingError::ToCanonical {
                            path: binding.source.clone(),
                            type_name,
                        }
                        .into());
                    }
                }
            } else {
                field_value
            };

            binding.property.set(value)?;
            validate_property(&self.state, &binding.property, &binding.control);
        }
        debug!("reset complete");
        Ok(())
    }

    /// Copy every bound property value into its model field.
    ///
    /// Refused with [`BinderError::ValidationFailed`] while any property fails
    /// validation. `Null` values are skipped; an `Error` value aborts.
    pub fn submit(&self) -> Result<(), BinderError> {
        if !self.can_submit() {
            debug!(errors = self.error_count(), "submit refused");
            return Err(BinderError::ValidationFailed);
        }
        let (model, bindings) = self.snapshot();
        let Some(model) = model else {
            return Ok(());
        };
        let _span = tracing::debug_span!("binder_submit", bindings = bindings.len()).entered();

        for binding in &bindings {
            let value = binding.property.get();
            match value {
                Value::Null => continue,
                Value::Error(err) => return Err(err.into()),
                _ => {}
            }
            let path = binding.path.clone()?;
            with_model(&model, |root| {
                resolve_field(root, &path, |field| {
                    write_field(field, value, &binding.source)
                })?
            })?;
        }
        debug!("submit complete");
        Ok(())
    }

    fn snapshot(&self) -> (Option<ModelRef>, Vec<Binding>) {
        let state = self.state.borrow();
        (state.model.clone(), state.bindings.clone())
    }
}

impl fmt::Debug for DataBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("DataBinder")
            .field("has_model", &state.model.is_some())
            .field("bound_controls", &state.bound_controls.len())
            .field("bindings", &state.bindings.len())
            .field("errors", &state.ledger.error_count())
            .finish()
    }
}

/// Run `f` against the model with a scoped mutable borrow.
fn with_model<T>(
    model: &ModelRef,
    f: impl FnOnce(&mut dyn Record) -> Result<T, BindingError>,
) -> Result<T, BindingError> {
    let mut root = model
        .try_borrow_mut()
        .map_err(|_| BindingError::InvalidDataSource)?;
    f(&mut *root)
}

/// Assign `value` to `field`, converting canonical numbers to the field's kind.
fn write_field(field: &mut dyn FieldValue, value: Value, source: &str) -> Result<(), BindingError> {
    if let Value::Number(x) = value {
        let type_name = field.type_name();
        let from_canonical = || BindingError::FromCanonical {
            path: source.to_owned(),
            type_name,
        };
        let Some(kind) = field.numeric_kind() else {
            return Err(from_canonical());
        };
        return field
            .set(Value::Numeric(Numeric::from_canonical(x, kind)))
            .map_err(|_| from_canonical());
    }
    field.set(value).map_err(|rejected| BindingError::NotAssignable {
        path: source.to_owned(),
        value_kind: rejected.kind_name(),
        type_name: field.type_name(),
    })
}

fn on_property_changed(
    state: &Weak<RefCell<BinderState>>,
    property: &Weak<dyn crate::property::Property>,
    control: &Weak<dyn crate::control::Control>,
) {
    if let (Some(state), Some(property), Some(control)) =
        (state.upgrade(), property.upgrade(), control.upgrade())
    {
        validate_property(&state, &property, &control);
    }
}

/// Validate one property and update the ledger, presenter and eligibility.
fn validate_property(
    state: &Rc<RefCell<BinderState>>,
    property: &PropertyRef,
    control: &ControlRef,
) {
    let Some(validator) = property.validator() else {
        return;
    };
    let result = validator.validate(&property.get());

    let (presenter, publisher, flipped, can_submit) = {
        let mut state = state.borrow_mut();
        let (ck, pk) = (ControlKey::of(control), PropertyKey::of(property));
        let flipped = match &result {
            Err(err) => state.ledger.record_failure(ck, pk, err.clone()),
            Ok(()) => state.ledger.clear(ck, pk),
        };
        (
            state.presenter.clone(),
            state.can_submit_changed.clone(),
            flipped,
            state.ledger.is_empty(),
        )
    };
    trace!(
        control = control.name(),
        valid = result.is_ok(),
        "property validated"
    );

    if let Some(presenter) = presenter {
        presenter.present_error(result.as_ref().err(), control);
    }
    if flipped {
        debug!(can_submit, "commit eligibility changed");
        publisher.publish(&can_submit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlBase;
    use crate::property::ValueProperty;
    use crate::validation::Required;
    use std::cell::Cell;

    #[derive(Default)]
    struct Note {
        title: String,
    }
    fbind_core::impl_record!(Note { "Title" => title });

    #[test]
    fn only_path_bound_properties_are_registered() {
        let bound = ValueProperty::new(Value::Null).bound_to("Title").into_ref();
        let empty = ValueProperty::new(Value::Null).bound_to("").into_ref();
        let plain = ValueProperty::new(Value::Null).into_ref();
        let control = ControlBase::new("edit")
            .with_property("Text", bound.clone())
            .with_property("Hint", empty)
            .with_property("Enabled", plain)
            .into_ref();

        let binder = DataBinder::new();
        binder.set_bound_controls(vec![control.clone()]);
        let props = binder.properties();
        assert_eq!(props.len(), 1);
        assert_eq!(PropertyKey::of(&props[0]), PropertyKey::of(&bound));
        let owner = binder.control_for(&bound).expect("registered");
        assert_eq!(ControlKey::of(&owner), ControlKey::of(&control));
    }

    #[test]
    fn no_model_makes_reset_and_submit_no_ops() {
        let binder = DataBinder::new();
        let p = ValueProperty::new(Value::Null).bound_to("Missing").into_ref();
        binder.set_bound_controls(vec![ControlBase::new("c").with_property("V", p).into_ref()]);
        assert_eq!(binder.reset(), Ok(()));
        assert_eq!(binder.submit(), Ok(()));
    }

    #[test]
    fn borrowed_model_is_an_invalid_data_source() {
        let note = Rc::new(RefCell::new(Note::default()));
        let model: ModelRef = note.clone();
        let p = ValueProperty::new(Value::Null).bound_to("Title").into_ref();
        let binder = DataBinder::new();
        binder.set_model(Some(model));
        binder.set_bound_controls(vec![ControlBase::new("c").with_property("V", p).into_ref()]);

        let _held = note.borrow_mut();
        assert_eq!(
            binder.reset(),
            Err(BinderError::Binding(BindingError::InvalidDataSource))
        );
    }

    #[test]
    fn presenter_may_query_binder() {
        struct Spy {
            binder: Weak<DataBinder>,
            seen: Cell<Option<bool>>,
        }
        impl ErrorPresenter for Spy {
            fn present_error(&self, _: Option<&ValidationError>, _: &ControlRef) {
                let binder = self.binder.upgrade().expect("alive");
                self.seen.set(Some(binder.can_submit()));
            }
        }

        let binder = Rc::new(DataBinder::new());
        let spy = Rc::new(Spy {
            binder: Rc::downgrade(&binder),
            seen: Cell::new(None),
        });
        binder.set_error_presenter(Some(spy.clone()));
        let p = ValueProperty::new(Value::Null)
            .bound_to("Title")
            .with_validator(Required)
            .into_ref();
        binder.set_bound_controls(vec![ControlBase::new("c").with_property("V", p.clone()).into_ref()]);

        p.set(Value::from(" ")).unwrap();
        assert_eq!(spy.seen.get(), Some(false));
    }

    #[test]
    fn presenter_gets_none_for_control_that_never_failed() {
        #[derive(Default)]
        struct Log(RefCell<Vec<Option<&'static str>>>);
        impl ErrorPresenter for Log {
            fn present_error(&self, error: Option<&ValidationError>, _: &ControlRef) {
                self.0.borrow_mut().push(error.map(ValidationError::code));
            }
        }

        let log = Rc::new(Log::default());
        let binder = DataBinder::new();
        binder.set_error_presenter(Some(log.clone()));
        let p = ValueProperty::new(Value::Null)
            .bound_to("Title")
            .with_validator(Required)
            .into_ref();
        binder.set_bound_controls(vec![ControlBase::new("c").with_property("V", p.clone()).into_ref()]);

        p.set(Value::from("ok")).unwrap();
        assert_eq!(*log.0.borrow(), [None]);
        assert_eq!(binder.error_count(), 0);
    }

    #[test]
    fn rebinding_does_not_accumulate_listeners() {
        let p = ValueProperty::new(Value::Null)
            .bound_to("Title")
            .with_validator(Required)
            .into_ref();
        let control = ControlBase::new("c").with_property("V", p.clone()).into_ref();
        let binder = DataBinder::new();
        for _ in 0..100 {
            binder.set_bound_controls(vec![control.clone()]);
        }
        assert_eq!(p.changed().handler_count(), 1);

        binder.set_bound_controls(Vec::new());
        assert_eq!(p.changed().handler_count(), 0);
    }

    #[test]
    fn debug_summarizes_state() {
        let binder = DataBinder::new();
        let s = format!("{binder:?}");
        assert!(s.contains("has_model: false"));
        assert!(s.contains("errors: 0"));
    }
}
