#![forbid(unsafe_code)]

//! Change-notification primitives the binder is built on.
//!
//! - [`EventPublisher`] / [`Event`]: payload events with attach/detach by
//!   [`EventHandle`], the shape property change streams and the binder's
//!   eligibility notification take.
//! - [`BindingScope`]: collects [`Attachment`]s for one binding session and
//!   detaches them together.
//!
//! # Architecture
//!
//! Everything is single-threaded: `Rc<RefCell<..>>` for shared state, `Weak`
//! back-references where a listener would otherwise keep its target alive.
//! Callbacks are collected before they run so no `RefCell` borrow is held
//! across user code.

pub mod event;
pub mod scope;

pub use event::{Attachment, Event, EventHandle, EventPublisher};
pub use scope::BindingScope;
