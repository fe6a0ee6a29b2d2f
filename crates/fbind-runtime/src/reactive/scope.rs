#![forbid(unsafe_code)]

//! Lifetime management for groups of event listeners.
//!
//! A [`BindingScope`] collects the [`Attachment`]s made for one logical
//! session (e.g. one set of bound controls). Dropping or clearing the scope
//! detaches every listener it holds.
//!
//! # Invariants
//!
//! 1. Listeners are detached in reverse attach order on drop or `clear()`.
//! 2. After drop or `clear()`, no handler from this scope fires again.
//! 3. `clear()` leaves the scope empty but reusable.

use super::event::{Attachment, Event, EventHandle};

/// Collects listener attachments for a logical scope.
#[derive(Default)]
pub struct BindingScope {
    attachments: Vec<Attachment>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep an existing attachment alive until the scope ends.
    pub fn hold(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Attach `handler` to `event` for the lifetime of this scope.
    pub fn attach<A: 'static>(
        &mut self,
        event: &Event<A>,
        handler: impl Fn(&A) + 'static,
    ) -> EventHandle {
        let attachment = event.attach_guarded(handler);
        let handle = attachment.handle();
        self.attachments.push(attachment);
        handle
    }

    /// Number of listeners held.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.attachments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// Detach every listener now.
    pub fn clear(&mut self) {
        while let Some(attachment) = self.attachments.pop() {
            drop(attachment);
        }
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("listener_count", &self.attachments.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::EventPublisher;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn scope_drop_detaches() {
        let publisher = EventPublisher::<u8>::new();
        let seen = Rc::new(Cell::new(0));
        {
            let mut scope = BindingScope::new();
            let s = Rc::clone(&seen);
            scope.attach(&publisher.event(), move |v| s.set(*v));
            publisher.publish(&1);
            assert_eq!(seen.get(), 1);
        }
        publisher.publish(&2);
        assert_eq!(seen.get(), 1);
        assert_eq!(publisher.event().handler_count(), 0);
    }

    #[test]
    fn clear_detaches_and_scope_is_reusable() {
        let publisher = EventPublisher::<()>::new();
        let first = Rc::new(Cell::new(false));
        let second = Rc::new(Cell::new(false));

        let mut scope = BindingScope::new();
        let f = Rc::clone(&first);
        scope.attach(&publisher.event(), move |()| f.set(true));
        scope.clear();
        assert!(scope.is_empty());

        let s = Rc::clone(&second);
        scope.attach(&publisher.event(), move |()| s.set(true));
        publisher.publish(&());
        assert!(!first.get());
        assert!(second.get());
        assert_eq!(scope.listener_count(), 1);
    }

    #[test]
    fn hold_external_attachment() {
        let publisher = EventPublisher::<()>::new();
        let mut scope = BindingScope::new();
        scope.hold(publisher.event().attach_guarded(|()| {}));
        assert_eq!(publisher.event().handler_count(), 1);
        drop(scope);
        assert_eq!(publisher.event().handler_count(), 0);
    }

    #[test]
    fn debug_format() {
        let publisher = EventPublisher::<()>::new();
        let mut scope = BindingScope::new();
        scope.attach(&publisher.event(), |()| {});
        scope.attach(&publisher.event(), |()| {});
        assert!(format!("{scope:?}").contains("listener_count: 2"));
    }
}
