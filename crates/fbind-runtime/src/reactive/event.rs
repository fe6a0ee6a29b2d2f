#![forbid(unsafe_code)]

//! Publish/subscribe events with attach/detach-by-handle semantics.
//!
//! An [`EventPublisher<A>`] owns the right to raise an event; the [`Event<A>`]
//! it hands out lets anyone attach handlers. Attaching returns an
//! [`EventHandle`] that detaches exactly that handler later. For scoped
//! lifetimes, [`Event::attach_guarded`] returns an [`Attachment`] that
//! detaches on drop.
//!
//! # Invariants
//!
//! 1. Handlers run in attach order.
//! 2. Handles are never reused within one event, and a detached handler's
//!    storage is released immediately; repeated attach/detach cycles do not
//!    grow the event.
//! 3. A handler detached during a publish still completes that publish if it
//!    was already collected; it is not called again afterwards.
//! 4. Handlers may attach, detach or publish from inside a handler; no
//!    borrow is held while they run.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Handler<A> = Rc<dyn Fn(&A)>;

struct EventInner<A> {
    next_id: u64,
    /// Live handlers in attach order.
    handlers: Vec<(EventHandle, Handler<A>)>,
}

/// Identifies one attached handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle(u64);

/// The subscribable side of an event.
pub struct Event<A> {
    inner: Rc<RefCell<EventInner<A>>>,
}

impl<A> Clone for Event<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.inner.borrow().handlers.len();
        f.debug_struct("Event")
            .field("handler_count", &count)
            .finish()
    }
}

impl<A: 'static> Event<A> {
    /// Attach a handler; keep the handle to detach it.
    pub fn attach(&self, handler: impl Fn(&A) + 'static) -> EventHandle {
        let mut inner = self.inner.borrow_mut();
        let handle = EventHandle(inner.next_id);
        inner.next_id += 1;
        inner.handlers.push((handle, Rc::new(handler)));
        handle
    }

    /// Attach a handler that is detached when the returned guard drops.
    pub fn attach_guarded(&self, handler: impl Fn(&A) + 'static) -> Attachment {
        let handle = self.attach(handler);
        let weak: Weak<RefCell<EventInner<A>>> = Rc::downgrade(&self.inner);
        Attachment {
            handle,
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Event { inner }.detach(handle);
                }
            })),
        }
    }

    /// Detach a handler. Unknown or already-detached handles are ignored.
    pub fn detach(&self, handle: EventHandle) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let pos = inner.handlers.iter().position(|(h, _)| *h == handle);
            pos.map(|pos| inner.handlers.remove(pos))
        };
        // Captures may own other events; release them outside the borrow.
        drop(removed);
    }

    /// Whether `handle` is currently attached.
    #[must_use]
    pub fn is_attached(&self, handle: EventHandle) -> bool {
        self.inner
            .borrow()
            .handlers
            .iter()
            .any(|(h, _)| *h == handle)
    }

    /// Number of attached handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

/// The raising side of an event.
pub struct EventPublisher<A> {
    event: Event<A>,
}

impl<A> Clone for EventPublisher<A> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
        }
    }
}

impl<A> fmt::Debug for EventPublisher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventPublisher").field(&self.event).finish()
    }
}

impl<A: 'static> Default for EventPublisher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> EventPublisher<A> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            event: Event {
                inner: Rc::new(RefCell::new(EventInner {
                    next_id: 0,
                    handlers: Vec::new(),
                })),
            },
        }
    }

    /// The subscribable event.
    #[must_use]
    pub fn event(&self) -> Event<A> {
        self.event.clone()
    }

    /// Invoke every attached handler with `args`.
    pub fn publish(&self, args: &A) {
        let handlers: Vec<Handler<A>> = self
            .event
            .inner
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in &handlers {
            handler(args);
        }
    }
}

/// RAII guard from [`Event::attach_guarded`].
pub struct Attachment {
    handle: EventHandle,
    detach: Option<Box<dyn FnOnce()>>,
}

impl Attachment {
    #[must_use]
    pub fn handle(&self) -> EventHandle {
        self.handle
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
