// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value observables.

use alloc::rc::Rc;
use core::fmt;

use crate::binding::BindingValue;
use crate::event::PropertyChangedEvent;
use crate::id::AnyProperty;
use crate::object::{PropertyObject, WeakObject};
use crate::observable::{FnObserver, Observable, Observer, SharedObservable, Subscription};
use crate::value::{ErasedValue, PropertyValue};

/// Projects a stored value into the observable's item type.
pub(crate) type Projection<T> = fn(ErasedValue) -> Option<T>;

pub(crate) fn project_erased(value: ErasedValue) -> Option<ErasedValue> {
    Some(value)
}

pub(crate) fn project_typed<T: PropertyValue>(value: ErasedValue) -> Option<T> {
    value.downcast::<T>()
}

pub(crate) fn project_binding<T: PropertyValue>(value: ErasedValue) -> Option<BindingValue<T>> {
    value.downcast::<T>().map(BindingValue::Value)
}

/// The effective value of one property on one object, as a stream.
///
/// Every subscription is served on its own:
///
/// 1. the live listener is registered,
/// 2. the current effective value is emitted synchronously,
/// 3. the new value of every later change is emitted, as long as the change
///    is effective and not outdated.
///
/// The stream never completes. If the object is gone, subscribing emits
/// nothing and returns an inert [`Subscription`].
///
/// # Example
///
/// ```rust
/// use core::cell::RefCell;
/// use std::rc::Rc;
/// use understory_binding::{
///     Class, ObservableExt, Priority, PropertyMetadataBuilder, PropertyObject, PropertyRegistry,
/// };
///
/// static RANGE: Class = Class::new("Range");
///
/// let mut registry = PropertyRegistry::new();
/// let value = registry.register_styled(&RANGE, "Value", PropertyMetadataBuilder::new(0_i32).build());
/// let range = PropertyObject::new(&RANGE, Rc::new(registry));
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
/// let _subscription = range
///     .get_observable(value)
///     .subscribe_fn(move |v| sink.borrow_mut().push(v));
///
/// let _style = range.set_value(value, 5, Priority::Style);
/// range.set_value(value, 7, Priority::LocalValue);
/// // Shadowed by the local value: not emitted.
/// let _style = range.set_value(value, 6, Priority::Style);
///
/// assert_eq!(*seen.borrow(), [0, 5, 7]);
/// ```
pub struct ValueObservable<T> {
    object: WeakObject,
    property: AnyProperty,
    events: SharedObservable<PropertyChangedEvent>,
    project: Projection<T>,
}

impl<T: Clone + 'static> ValueObservable<T> {
    pub(crate) fn new(
        object: &PropertyObject,
        property: AnyProperty,
        events: SharedObservable<PropertyChangedEvent>,
        project: Projection<T>,
    ) -> Self {
        Self::from_weak(object.downgrade(), property, events, project)
    }

    pub(crate) fn from_weak(
        object: WeakObject,
        property: AnyProperty,
        events: SharedObservable<PropertyChangedEvent>,
        project: Projection<T>,
    ) -> Self {
        Self {
            object,
            property,
            events,
            project,
        }
    }

    /// Returns the observed property.
    #[must_use]
    #[inline]
    pub fn property(&self) -> AnyProperty {
        self.property
    }
}

impl<T: Clone + 'static> Observable<T> for ValueObservable<T> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        let Some(object) = self.object.upgrade() else {
            return Subscription::empty();
        };

        let project = self.project;
        let live = Rc::clone(&observer);
        let subscription = self.events.subscribe(Rc::new(FnObserver::new(
            move |event: PropertyChangedEvent| {
                if !event.is_effective_change() || event.is_outdated() {
                    return;
                }
                if let Some(value) = event.new_value().cloned().and_then(project) {
                    live.on_next(value);
                }
            },
        )));

        if let Ok(current) = object.get_value_erased(self.property)
            && let Some(value) = project(current)
        {
            observer.on_next(value);
        }
        subscription
    }
}

impl<T> Clone for ValueObservable<T> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            property: self.property,
            events: Rc::clone(&self.events),
            project: self.project,
        }
    }
}

impl<T> fmt::Debug for ValueObservable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueObservable")
            .field("object", &self.object)
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::id::{DirectProperty, StyledProperty};
    use crate::metadata::PropertyMetadataBuilder;
    use crate::observable::ObservableExt;
    use crate::priority::Priority;
    use crate::registry::PropertyRegistry;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    static RANGE: Class = Class::new("Range");

    fn setup() -> (PropertyObject, StyledProperty<i32>, DirectProperty<bool>) {
        let mut registry = PropertyRegistry::new();
        let value = registry.register_styled(&RANGE, "Value", PropertyMetadataBuilder::new(0_i32).build());
        let pressed =
            registry.register_direct(&RANGE, "IsPressed", PropertyMetadataBuilder::new(false).build());
        (PropertyObject::new(&RANGE, Rc::new(registry)), value, pressed)
    }

    fn record<T: Clone + 'static>(
        source: &impl Observable<T>,
    ) -> (Rc<RefCell<Vec<T>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = source.subscribe_fn(move |v| sink.borrow_mut().push(v));
        (seen, subscription)
    }

    #[test]
    fn replays_current_value_for_each_subscriber() {
        let (object, value, _) = setup();
        object.set_value(value, 3, Priority::LocalValue);
        let observable = object.get_observable(value);

        let (first, _a) = record(&observable);
        object.set_value(value, 4, Priority::LocalValue);
        let (second, _b) = record(&observable);

        assert_eq!(*first.borrow(), [3, 4]);
        assert_eq!(*second.borrow(), [4]);
    }

    #[test]
    fn direct_properties_replay_and_update() {
        let (object, _, pressed) = setup();
        let (seen, _s) = record(&object.get_observable(pressed));
        object.set_value(pressed, true, Priority::LocalValue);
        object.clear_value(pressed);
        assert_eq!(*seen.borrow(), [false, true, false]);
    }

    #[test]
    fn dispose_stops_live_values() {
        let (object, value, _) = setup();
        let (seen, mut subscription) = record(&object.get_observable(value));
        subscription.dispose();
        object.set_value(value, 9, Priority::LocalValue);
        assert_eq!(*seen.borrow(), [0]);
    }

    #[test]
    fn dead_object_emits_nothing() {
        let (object, value, _) = setup();
        let observable = object.get_observable(value);
        drop(object);
        let (seen, subscription) = record(&observable);
        assert!(seen.borrow().is_empty());
        assert!(!subscription.is_active());
    }

    #[test]
    fn outdated_changes_are_skipped() {
        let (object, value, _) = setup();

        // The first listener reacts to 1 by writing 2, which makes the event
        // for 1 outdated before the value observable sees it.
        let reentrant = object.clone();
        let fired = Rc::new(Cell::new(false));
        let guard = Rc::clone(&fired);
        let _writer = object.listen(value).subscribe_fn(move |e: PropertyChangedEvent| {
            if e.new_value_as::<i32>() == Some(1) && !guard.replace(true) {
                reentrant.set_value(value, 2, Priority::LocalValue);
            }
        });
        let (seen, _s) = record(&object.get_observable(value));

        object.set_value(value, 1, Priority::LocalValue);
        assert!(fired.get());
        assert_eq!(*seen.borrow(), [0, 2]);
    }

    #[test]
    fn binding_projection_wraps_values() {
        let (object, value, _) = setup();
        let (seen, _s) = record(&object.get_binding_observable(value));
        object.set_value(value, 8, Priority::LocalValue);
        assert_eq!(
            *seen.borrow(),
            [BindingValue::Value(0), BindingValue::Value(8)]
        );
    }
}
