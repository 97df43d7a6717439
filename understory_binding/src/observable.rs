// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal synchronous push streams.
//!
//! Everything in this crate is single-threaded and synchronous: an
//! [`Observable`] calls its [`Observer`]s on the thread that produced the value,
//! before the producing call returns. Every effect hands back a
//! [`Subscription`], and ending the effect means calling
//! [`Subscription::dispose`]. Dropping a subscription does **not** dispose it.
//!
//! ```rust
//! use core::cell::RefCell;
//! use std::rc::Rc;
//! use understory_binding::{Observable, ObservableExt, Subject};
//!
//! let subject = Subject::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = seen.clone();
//! let mut subscription = subject
//!     .clone()
//!     .map(|v: i32| v * 10)
//!     .subscribe_fn(move |v| sink.borrow_mut().push(v));
//!
//! subject.next(1);
//! subscription.dispose();
//! subject.next(2);
//!
//! assert_eq!(*seen.borrow(), [10]);
//! ```

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::marker::PhantomData;

use smallvec::SmallVec;

/// Receives values pushed by an [`Observable`].
pub trait Observer<T> {
    /// Called for each value.
    fn on_next(&self, value: T);

    /// Called once when the source will produce no more values.
    fn on_completed(&self) {}
}

/// A push-based stream of values.
pub trait Observable<T: 'static> {
    /// Starts delivering values to `observer` until the returned subscription
    /// is disposed or the source completes.
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription;
}

/// A reference-counted, type-erased observable.
pub type SharedObservable<T> = Rc<dyn Observable<T>>;

impl<T: 'static, O: Observable<T> + ?Sized> Observable<T> for Rc<O> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        (**self).subscribe(observer)
    }
}

/// Adapts a closure into an [`Observer`].
pub struct FnObserver<F>(F);

impl<F> FnObserver<F> {
    /// Wraps `f`; it is called for each value.
    #[must_use]
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T, F: Fn(T)> Observer<T> for FnObserver<F> {
    fn on_next(&self, value: T) {
        (self.0)(value);
    }
}

impl<F> fmt::Debug for FnObserver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnObserver").finish_non_exhaustive()
    }
}

/// Combinators available on every [`Observable`].
pub trait ObservableExt<T: 'static>: Observable<T> {
    /// Subscribes a closure.
    fn subscribe_fn<F>(&self, f: F) -> Subscription
    where
        F: Fn(T) + 'static,
    {
        self.subscribe(Rc::new(FnObserver::new(f)))
    }

    /// Transforms each value with `f`.
    fn map<U, F>(self, f: F) -> Map<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> U + 'static,
    {
        Map {
            source: self,
            f: Rc::new(f),
            _marker: PhantomData,
        }
    }

    /// Transforms each value with `f`, dropping values mapped to `None`.
    fn filter_map<U, F>(self, f: F) -> FilterMap<Self, F, T>
    where
        Self: Sized,
        F: Fn(T) -> Option<U> + 'static,
    {
        FilterMap {
            source: self,
            f: Rc::new(f),
            _marker: PhantomData,
        }
    }

    /// Erases the concrete type.
    fn into_shared(self) -> SharedObservable<T>
    where
        Self: Sized + 'static,
    {
        Rc::new(self)
    }
}

impl<T: 'static, O: Observable<T> + ?Sized> ObservableExt<T> for O {}

/// See [`ObservableExt::map`].
pub struct Map<S, F, T> {
    source: S,
    f: Rc<F>,
    _marker: PhantomData<fn(T)>,
}

impl<S, F, T, U> Observable<U> for Map<S, F, T>
where
    S: Observable<T>,
    F: Fn(T) -> U + 'static,
    T: 'static,
    U: 'static,
{
    fn subscribe(&self, observer: Rc<dyn Observer<U>>) -> Subscription {
        let f = Rc::clone(&self.f);
        self.source.subscribe(Rc::new(Mapped {
            f: move |value: T| Some(f(value)),
            inner: observer,
        }))
    }
}

impl<S: fmt::Debug, F, T> fmt::Debug for Map<S, F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// See [`ObservableExt::filter_map`].
pub struct FilterMap<S, F, T> {
    source: S,
    f: Rc<F>,
    _marker: PhantomData<fn(T)>,
}

impl<S, F, T, U> Observable<U> for FilterMap<S, F, T>
where
    S: Observable<T>,
    F: Fn(T) -> Option<U> + 'static,
    T: 'static,
    U: 'static,
{
    fn subscribe(&self, observer: Rc<dyn Observer<U>>) -> Subscription {
        let f = Rc::clone(&self.f);
        self.source.subscribe(Rc::new(Mapped {
            f: move |value: T| f(value),
            inner: observer,
        }))
    }
}

impl<S: fmt::Debug, F, T> fmt::Debug for FilterMap<S, F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterMap")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

struct Mapped<F, U> {
    f: F,
    inner: Rc<dyn Observer<U>>,
}

impl<F, T, U> Observer<T> for Mapped<F, U>
where
    F: Fn(T) -> Option<U>,
{
    fn on_next(&self, value: T) {
        if let Some(value) = (self.f)(value) {
            self.inner.on_next(value);
        }
    }

    fn on_completed(&self) {
        self.inner.on_completed();
    }
}

/// A handle to an active effect: an observation, a binding, or a prioritized
/// write.
///
/// [`dispose`](Self::dispose) ends the effect synchronously and is idempotent.
/// Dropping the handle leaves the effect running until its source goes away.
#[must_use = "dropping a Subscription does not end the effect; call `dispose`"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Creates a subscription that runs `teardown` when disposed.
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Creates an inert subscription with nothing to dispose.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    /// Combines several subscriptions into one that disposes all of them.
    pub fn all(subscriptions: Vec<Self>) -> Self {
        Self::new(move || {
            for mut subscription in subscriptions {
                subscription.dispose();
            }
        })
    }

    /// Returns `true` until the subscription is disposed.
    ///
    /// An [`empty`](Self::empty) subscription is never active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    /// Ends the effect. Calling this again does nothing.
    pub fn dispose(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// A hot multicast source: every value passed to [`next`](Self::next) is
/// delivered to the current observers, in subscription order.
///
/// Clones share the same observer list.
pub struct Subject<T> {
    inner: Rc<SubjectInner<T>>,
}

struct SubjectInner<T> {
    entries: RefCell<Vec<SubjectEntry<T>>>,
    next_id: Cell<u64>,
    completed: Cell<bool>,
}

struct SubjectEntry<T> {
    id: u64,
    active: Rc<Cell<bool>>,
    observer: Rc<dyn Observer<T>>,
}

type Snapshot<T> = SmallVec<[(Rc<Cell<bool>>, Rc<dyn Observer<T>>); 4]>;

impl<T: Clone + 'static> Subject<T> {
    /// Creates a subject with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SubjectInner {
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                completed: Cell::new(false),
            }),
        }
    }

    /// Delivers `value` to every current observer.
    ///
    /// Observers added while delivering do not see this value; observers
    /// disposed while delivering are skipped.
    pub fn next(&self, value: T) {
        if self.inner.completed.get() {
            return;
        }
        for (active, observer) in self.snapshot() {
            if active.get() {
                observer.on_next(value.clone());
            }
        }
    }

    /// Completes every observer and drops them. Later subscribers complete
    /// immediately.
    pub fn complete(&self) {
        if self.inner.completed.replace(true) {
            return;
        }
        let entries = core::mem::take(&mut *self.inner.entries.borrow_mut());
        for entry in entries {
            if entry.active.replace(false) {
                entry.observer.on_completed();
            }
        }
    }

    /// Returns the number of subscribed observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    fn snapshot(&self) -> Snapshot<T> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|entry| (Rc::clone(&entry.active), Rc::clone(&entry.observer)))
            .collect()
    }
}

impl<T: Clone + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Observable<T> for Subject<T> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        if self.inner.completed.get() {
            observer.on_completed();
            return Subscription::empty();
        }
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let active = Rc::new(Cell::new(true));
        self.inner.entries.borrow_mut().push(SubjectEntry {
            id,
            active: Rc::clone(&active),
            observer,
        });

        let inner: Weak<SubjectInner<T>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            active.set(false);
            if let Some(inner) = inner.upgrade() {
                inner.entries.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }
}

impl<T: Clone + 'static> Observer<T> for Subject<T> {
    fn on_next(&self, value: T) {
        self.next(value);
    }

    fn on_completed(&self) {
        self.complete();
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.inner.entries.borrow().len())
            .field("completed", &self.inner.completed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn recorder<T: 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |v| sink.borrow_mut().push(v))
    }

    #[test]
    fn subject_delivers_in_order() {
        let subject = Subject::new();
        let (seen, record) = recorder();
        let _subscription = subject.subscribe_fn(record);

        subject.next(1);
        subject.next(2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn dispose_stops_delivery_and_is_idempotent() {
        let subject = Subject::new();
        let (seen, record) = recorder();
        let mut subscription = subject.subscribe_fn(record);
        assert!(subscription.is_active());

        subject.next(1);
        subscription.dispose();
        subscription.dispose();
        subject.next(2);

        assert!(!subscription.is_active());
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn dropping_a_subscription_keeps_it_alive() {
        let subject = Subject::new();
        let (seen, record) = recorder();
        drop(subject.subscribe_fn(record));

        subject.next(5);
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn disposing_during_delivery_skips_later_observers() {
        let subject: Subject<i32> = Subject::new();
        let later: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let (seen, record) = recorder();

        let handle = Rc::clone(&later);
        let _first = subject.subscribe_fn(move |_| {
            if let Some(mut s) = handle.borrow_mut().take() {
                s.dispose();
            }
        });
        *later.borrow_mut() = Some(subject.subscribe_fn(record));

        subject.next(1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn complete_notifies_and_rejects_new_values() {
        let subject = Subject::new();
        let completed = Rc::new(Cell::new(false));

        struct Probe(Rc<Cell<bool>>);
        impl Observer<i32> for Probe {
            fn on_next(&self, _: i32) {}
            fn on_completed(&self) {
                self.0.set(true);
            }
        }

        let _subscription = subject.subscribe(Rc::new(Probe(Rc::clone(&completed))));
        subject.complete();
        assert!(completed.get());
        assert_eq!(subject.observer_count(), 0);

        let late = Rc::new(Cell::new(false));
        let subscription = subject.subscribe(Rc::new(Probe(Rc::clone(&late))));
        assert!(late.get());
        assert!(!subscription.is_active());
    }

    #[test]
    fn map_and_filter_map() {
        let subject = Subject::new();
        let (seen, record) = recorder();
        let _subscription = subject
            .clone()
            .filter_map(|v: i32| (v % 2 == 0).then_some(v))
            .map(|v| v * 100)
            .subscribe_fn(record);

        for v in 1..=4 {
            subject.next(v);
        }
        assert_eq!(*seen.borrow(), vec![200, 400]);
    }

    #[test]
    fn shared_observable_forwards() {
        let subject = Subject::new();
        let shared: SharedObservable<i32> = subject.clone().into_shared();
        let (seen, record) = recorder();
        let _subscription = shared.subscribe_fn(record);

        subject.next(3);
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn all_disposes_every_member() {
        let subject = Subject::new();
        let a = subject.subscribe_fn(|_: i32| {});
        let b = subject.subscribe_fn(|_: i32| {});
        assert_eq!(subject.observer_count(), 2);

        let mut both = Subscription::all(vec![a, b]);
        both.dispose();
        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn empty_subscription_is_inert() {
        let mut subscription = Subscription::empty();
        assert!(!subscription.is_active());
        subscription.dispose();
    }
}
