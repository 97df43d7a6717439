// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-property change streams.
//!
//! Two ways to observe the changes of one property on one object:
//!
//! - [`ChangeStream`] filters the object's change broadcast on every
//!   subscription. It needs no setup and costs one filter check per change
//!   per subscriber.
//! - [`PropertyAdapter`] is created once per (object, property) and cached on
//!   the object. It registers a single listener and fans the matching events
//!   out to its own subscribers, and it offers value projections over them.
//!
//! Both deliver the same events in the same order.

use alloc::rc::{Rc, Weak};
use core::fmt;

use crate::binding::BindingValue;
use crate::event::PropertyChangedEvent;
use crate::id::{AnyProperty, PropertyId};
use crate::object::{PropertyObject, WeakObject};
use crate::observable::{
    FnObserver, Observable, ObservableExt, Observer, SharedObservable, Subject, Subscription,
};
use crate::value::{ErasedValue, PropertyValue};
use crate::values::{ValueObservable, project_binding, project_erased, project_typed};

/// The change events of one property on one object, filtered from the
/// object's broadcast.
#[derive(Clone, Debug)]
pub struct ChangeStream {
    object: WeakObject,
    property: PropertyId,
}

impl ChangeStream {
    pub(crate) fn new(object: &PropertyObject, property: PropertyId) -> Self {
        Self {
            object: object.downgrade(),
            property,
        }
    }
}

impl Observable<PropertyChangedEvent> for ChangeStream {
    fn subscribe(&self, observer: Rc<dyn Observer<PropertyChangedEvent>>) -> Subscription {
        let Some(object) = self.object.upgrade() else {
            return Subscription::empty();
        };
        let property = self.property;
        object.changes().subscribe(Rc::new(FnObserver::new(
            move |event: PropertyChangedEvent| {
                if event.property().id() == property {
                    observer.on_next(event);
                }
            },
        )))
    }
}

/// A cached change stream for one property of one object.
///
/// Obtained from [`PropertyObject::adapter`].
pub struct PropertyAdapter {
    object: WeakObject,
    property: AnyProperty,
    changes: Subject<PropertyChangedEvent>,
}

impl PropertyAdapter {
    pub(crate) fn new(object: &PropertyObject, property: AnyProperty) -> Rc<Self> {
        let adapter = Rc::new(Self {
            object: object.downgrade(),
            property,
            changes: Subject::new(),
        });

        let weak: Weak<Self> = Rc::downgrade(&adapter);
        let id = property.id();
        // Lives as long as the object's broadcast; a dead adapter makes it a no-op.
        let _listener = object
            .changes()
            .subscribe_fn(move |event: PropertyChangedEvent| {
                if event.property().id() == id
                    && let Some(adapter) = weak.upgrade()
                {
                    adapter.changes.next(event);
                }
            });
        adapter
    }

    /// Returns the property this adapter observes.
    #[must_use]
    #[inline]
    pub fn property(&self) -> AnyProperty {
        self.property
    }

    /// Returns the number of current subscribers to the change stream.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.changes.observer_count()
    }

    /// Returns the raw change events.
    #[must_use]
    pub fn changes(&self) -> SharedObservable<PropertyChangedEvent> {
        self.changes.clone().into_shared()
    }

    /// Returns the effective values, type-erased.
    ///
    /// See [`PropertyObject::get_observable`] for the replay behavior.
    #[must_use]
    pub fn values(&self) -> ValueObservable<ErasedValue> {
        ValueObservable::from_weak(
            self.object.clone(),
            self.property,
            self.changes(),
            project_erased,
        )
    }

    /// Returns the effective values as `T`, or `None` if `T` is not the
    /// property's value type.
    #[must_use]
    pub fn typed_values<T: PropertyValue>(&self) -> Option<ValueObservable<T>> {
        self.property.downcast::<T>()?;
        Some(ValueObservable::from_weak(
            self.object.clone(),
            self.property,
            self.changes(),
            project_typed::<T>,
        ))
    }

    /// Returns the effective values wrapped as [`BindingValue::Value`], or
    /// `None` if `T` is not the property's value type.
    #[must_use]
    pub fn binding_values<T: PropertyValue>(&self) -> Option<ValueObservable<BindingValue<T>>> {
        self.property.downcast::<T>()?;
        Some(ValueObservable::from_weak(
            self.object.clone(),
            self.property,
            self.changes(),
            project_binding::<T>,
        ))
    }
}

impl fmt::Debug for PropertyAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAdapter")
            .field("property", &self.property)
            .field("subscribers", &self.changes.observer_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::id::StyledProperty;
    use crate::metadata::PropertyMetadataBuilder;
    use crate::priority::Priority;
    use crate::registry::PropertyRegistry;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    static SLIDER: Class = Class::new("Slider");

    fn setup() -> (PropertyObject, StyledProperty<f64>, StyledProperty<f64>) {
        let mut registry = PropertyRegistry::new();
        let value =
            registry.register_styled(&SLIDER, "Value", PropertyMetadataBuilder::new(0.0_f64).build());
        let maximum =
            registry.register_styled(&SLIDER, "Maximum", PropertyMetadataBuilder::new(1.0_f64).build());
        (PropertyObject::new(&SLIDER, Rc::new(registry)), value, maximum)
    }

    fn collect(
        source: &SharedObservable<PropertyChangedEvent>,
    ) -> (Rc<RefCell<Vec<(Option<f64>, bool)>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = source.subscribe_fn(move |e: PropertyChangedEvent| {
            sink.borrow_mut()
                .push((e.new_value_as::<f64>(), e.is_effective_change()));
        });
        (seen, subscription)
    }

    fn drive(object: &PropertyObject, value: StyledProperty<f64>, maximum: StyledProperty<f64>) {
        object.set_value(value, 0.3, Priority::LocalValue);
        object.set_value(maximum, 5.0, Priority::LocalValue);
        let _style = object.set_value(value, 0.1, Priority::Style);
        object.clear_value(value);
    }

    #[test]
    fn generic_and_adapter_paths_agree() {
        let (generic_object, value, maximum) = setup();
        let (generic, _a) = collect(&generic_object.listen(value));
        drive(&generic_object, value, maximum);

        let (adapted_object, value, maximum) = setup();
        adapted_object.adapter(value);
        let (adapted, _b) = collect(&adapted_object.listen(value));
        drive(&adapted_object, value, maximum);

        assert_eq!(*generic.borrow(), *adapted.borrow());
        assert_eq!(
            *generic.borrow(),
            [(Some(0.3), true), (Some(0.1), false), (Some(0.1), true)]
        );
    }

    #[test]
    fn listen_prefers_existing_adapter() {
        let (object, value, _) = setup();
        let adapter = object.adapter(value);
        let (_seen, _s) = collect(&object.listen(value));
        assert_eq!(adapter.subscriber_count(), 1);
    }

    #[test]
    fn dead_object_yields_inert_stream() {
        let (object, value, _) = setup();
        let stream = ChangeStream::new(&object, value.id());
        drop(object);
        let subscription = stream.subscribe_fn(|_: PropertyChangedEvent| {});
        assert!(!subscription.is_active());
    }

    #[test]
    fn typed_projection_checks_type() {
        let (object, value, _) = setup();
        let adapter = object.adapter(value);
        assert!(adapter.typed_values::<f64>().is_some());
        assert!(adapter.typed_values::<i32>().is_none());
        assert!(adapter.binding_values::<f64>().is_some());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _s = adapter
            .values()
            .subscribe_fn(move |v: ErasedValue| sink.borrow_mut().push(v));
        object.set_value(value, 0.5, Priority::LocalValue);
        assert_eq!(
            *seen.borrow(),
            [ErasedValue::new(0.0_f64), ErasedValue::new(0.5_f64)]
        );
    }
}
