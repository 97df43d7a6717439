// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-way property subjects.
//!
//! A subject reads like the property's value observable and writes through to
//! the property: each value pushed in with [`Observer::on_next`] is one
//! synchronous `set_value` at the subject's priority. Nothing is buffered or
//! validated beyond what `set_value` itself does.

use alloc::rc::Rc;
use core::fmt;

use tracing::warn;

use crate::id::{AnyProperty, Property};
use crate::object::{PropertyObject, WeakObject};
use crate::event::PropertyChangedEvent;
use crate::observable::{Observable, Observer, SharedObservable, Subscription};
use crate::priority::Priority;
use crate::value::{ErasedValue, PropertyValue};
use crate::values::{ValueObservable, project_erased, project_typed};

/// A typed two-way channel to a property.
///
/// Obtained from [`PropertyObject::get_subject`].
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use understory_binding::{Class, Observer, Priority, PropertyMetadataBuilder, PropertyObject, PropertyRegistry};
///
/// static BORDER: Class = Class::new("Border");
///
/// let mut registry = PropertyRegistry::new();
/// let opacity = registry.register_styled(&BORDER, "Opacity", PropertyMetadataBuilder::new(1.0_f64).build());
/// let border = PropertyObject::new(&BORDER, Rc::new(registry));
///
/// let subject = border.get_subject(opacity, Priority::LocalValue);
/// subject.on_next(0.9);
/// assert_eq!(border.get_value(opacity), 0.9);
/// ```
pub struct PropertySubject<T> {
    object: WeakObject,
    property: Property<T>,
    priority: Priority,
    values: ValueObservable<T>,
}

impl<T: PropertyValue> PropertySubject<T> {
    pub(crate) fn new(
        object: &PropertyObject,
        property: Property<T>,
        events: SharedObservable<PropertyChangedEvent>,
        priority: Priority,
    ) -> Self {
        let any = AnyProperty::from(property);
        Self {
            object: object.downgrade(),
            property,
            priority,
            values: ValueObservable::new(object, any, events, project_typed::<T>),
        }
    }

    /// Returns the priority values are written at.
    #[must_use]
    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

impl<T: PropertyValue> Observable<T> for PropertySubject<T> {
    fn subscribe(&self, observer: Rc<dyn Observer<T>>) -> Subscription {
        self.values.subscribe(observer)
    }
}

impl<T: PropertyValue> Observer<T> for PropertySubject<T> {
    fn on_next(&self, value: T) {
        if let Some(object) = self.object.upgrade() {
            let property = AnyProperty::from(self.property);
            let registration = object.expect_registration(property);
            object.write_unheld(property, registration, ErasedValue::new(value), self.priority);
        }
    }
}

impl<T> fmt::Debug for PropertySubject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySubject")
            .field("property", &self.property)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// A type-erased two-way channel to a property.
///
/// Obtained from [`PropertyObject::get_subject_erased`]. A pushed value of the
/// wrong type is logged at `warn` level and dropped.
pub struct AnyPropertySubject {
    object: WeakObject,
    property: AnyProperty,
    priority: Priority,
    values: ValueObservable<ErasedValue>,
}

impl AnyPropertySubject {
    pub(crate) fn new(
        object: &PropertyObject,
        property: AnyProperty,
        events: SharedObservable<PropertyChangedEvent>,
        priority: Priority,
    ) -> Self {
        Self {
            object: object.downgrade(),
            property,
            priority,
            values: ValueObservable::new(object, property, events, project_erased),
        }
    }

    /// Returns the priority values are written at.
    #[must_use]
    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

impl Observable<ErasedValue> for AnyPropertySubject {
    fn subscribe(&self, observer: Rc<dyn Observer<ErasedValue>>) -> Subscription {
        self.values.subscribe(observer)
    }
}

impl Observer<ErasedValue> for AnyPropertySubject {
    fn on_next(&self, value: ErasedValue) {
        let Some(object) = self.object.upgrade() else {
            return;
        };
        if let Err(error) = object.set_value_erased(self.property, value, self.priority) {
            warn!(
                class = object.class().name(),
                property = ?self.property.id(),
                %error,
                "subject dropped a value"
            );
        }
    }
}

impl fmt::Debug for AnyPropertySubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyPropertySubject")
            .field("property", &self.property)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::id::StyledProperty;
    use crate::metadata::PropertyMetadataBuilder;
    use crate::observable::{ObservableExt, Subject};
    use crate::registry::PropertyRegistry;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    static BORDER: Class = Class::new("Border");

    fn setup() -> (PropertyObject, StyledProperty<f64>) {
        let mut registry = PropertyRegistry::new();
        let opacity =
            registry.register_styled(&BORDER, "Opacity", PropertyMetadataBuilder::new(1.0_f64).build());
        (PropertyObject::new(&BORDER, Rc::new(registry)), opacity)
    }

    #[test]
    fn reads_like_the_value_observable() {
        let (object, opacity) = setup();
        let subject = object.get_subject(opacity, Priority::LocalValue);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _s = subject.subscribe_fn(move |v| sink.borrow_mut().push(v));

        subject.on_next(0.9);
        assert_eq!(*seen.borrow(), [1.0, 0.9]);
    }

    #[test]
    fn writes_at_its_priority() {
        let (object, opacity) = setup();
        object.set_value(opacity, 0.5, Priority::LocalValue);
        let subject = object.get_subject(opacity, Priority::Style);
        assert_eq!(subject.priority(), Priority::Style);

        subject.on_next(0.2);
        assert_eq!(object.get_value(opacity), 0.5);
        assert_eq!(object.get_base_value(opacity, Priority::Style), Some(0.2));
    }

    #[test]
    fn can_be_driven_by_another_observable() {
        let (object, opacity) = setup();
        let source = Subject::new();
        let _s = source.subscribe(Rc::new(object.get_subject(opacity, Priority::LocalValue)));

        source.next(0.25);
        assert_eq!(object.get_value(opacity), 0.25);
    }

    #[test]
    fn erased_subject_drops_wrong_types() {
        let (object, opacity) = setup();
        let subject = object
            .get_subject_erased(opacity.into(), Priority::LocalValue)
            .unwrap();

        subject.on_next(ErasedValue::new(3_u8));
        assert_eq!(object.get_value(opacity), 1.0);

        subject.on_next(ErasedValue::new(0.4_f64));
        assert_eq!(object.get_value(opacity), 0.4);
    }

    #[test]
    fn dead_object_is_ignored() {
        let (object, opacity) = setup();
        let subject = object.get_subject(opacity, Priority::LocalValue);
        drop(object);
        subject.on_next(0.1);
    }
}
