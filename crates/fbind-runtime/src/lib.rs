#![forbid(unsafe_code)]

//! Runtime side of fbind: properties, controls, validation and the
//! [`DataBinder`] that keeps them in sync with a model.
//!
//! # Role in fbind
//!
//! `fbind-core` knows how to read and write model fields by dotted path.
//! This crate adds the UI-facing half: observable [`property`] endpoints
//! declared by [`control`]s, [`validation`] rules, the [`ledger`] of current
//! validation failures, and the [`binder`] that moves values between the two
//! sides and tracks whether the form may be submitted.
//!
//! # Modules
//!
//! - [`reactive`]: events and listener scopes.
//! - [`property`] / [`control`]: the binding endpoints.
//! - [`validation`]: stock validators.
//! - [`ledger`]: per-control validation failures.
//! - [`binder`]: [`DataBinder`], reset and submit.
//! - [`context`]: application identity and persisted settings.

pub mod binder;
pub mod context;
pub mod control;
pub mod ledger;
pub mod property;
pub mod reactive;
pub mod validation;

pub use binder::{BinderError, DataBinder, ErrorPresenter, ModelRef};
#[cfg(feature = "settings-file")]
pub use context::FileSettings;
pub use context::{AppContext, MemorySettings, Settings, SettingsError};
pub use control::{Control, ControlBase, ControlKey, ControlRef};
pub use ledger::ValidationLedger;
pub use property::{Property, PropertyError, PropertyKey, PropertyRef, Source, ValueProperty};
pub use reactive::{BindingScope, Event, EventHandle, EventPublisher};
pub use validation::{
    FnValidator, MaxLength, MinLength, Range, Required, ValidationError, Validator,
};
