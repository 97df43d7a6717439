// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property change notifications.

use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use crate::id::AnyProperty;
use crate::object::PropertyObject;
use crate::priority::Priority;
use crate::value::{ErasedValue, PropertyValue};

/// A record of one write that changed a stored value.
///
/// Events are raised by every write that changes a layer of a styled property
/// or the field of a direct property, including writes shadowed by a stronger
/// layer. Listeners that only care about the value a reader would see should
/// skip events where [`is_effective_change`](Self::is_effective_change) is
/// `false` or [`is_outdated`](Self::is_outdated) is `true`.
///
/// For an effective change, the old and new values are the effective values
/// before and after the write, and the priority is that of the new effective
/// value. For a shadowed write they are the old and new contents of the
/// written layer, and `None` means the layer was empty.
///
/// Cloning is cheap; clones share the record and its outdated flag.
#[derive(Clone)]
pub struct PropertyChangedEvent {
    inner: Rc<EventInner>,
}

struct EventInner {
    sender: PropertyObject,
    property: AnyProperty,
    old_value: Option<ErasedValue>,
    new_value: Option<ErasedValue>,
    priority: Priority,
    is_effective_change: bool,
    is_outdated: Cell<bool>,
}

impl PropertyChangedEvent {
    pub(crate) fn new(
        sender: PropertyObject,
        property: AnyProperty,
        old_value: Option<ErasedValue>,
        new_value: Option<ErasedValue>,
        priority: Priority,
        is_effective_change: bool,
    ) -> Self {
        Self {
            inner: Rc::new(EventInner {
                sender,
                property,
                old_value,
                new_value,
                priority,
                is_effective_change,
                is_outdated: Cell::new(false),
            }),
        }
    }

    /// Returns the object whose property changed.
    #[must_use]
    #[inline]
    pub fn sender(&self) -> &PropertyObject {
        &self.inner.sender
    }

    /// Returns the property that changed.
    #[must_use]
    #[inline]
    pub fn property(&self) -> AnyProperty {
        self.inner.property
    }

    /// Returns the value before the change, or `None` if it was unset.
    #[must_use]
    #[inline]
    pub fn old_value(&self) -> Option<&ErasedValue> {
        self.inner.old_value.as_ref()
    }

    /// Returns the value after the change, or `None` if it is now unset.
    #[must_use]
    #[inline]
    pub fn new_value(&self) -> Option<&ErasedValue> {
        self.inner.new_value.as_ref()
    }

    /// Returns the old value as a `T`, if it is set and of that type.
    #[must_use]
    pub fn old_value_as<T: PropertyValue>(&self) -> Option<T> {
        self.old_value().and_then(ErasedValue::downcast::<T>)
    }

    /// Returns the new value as a `T`, if it is set and of that type.
    #[must_use]
    pub fn new_value_as<T: PropertyValue>(&self) -> Option<T> {
        self.new_value().and_then(ErasedValue::downcast::<T>)
    }

    /// Returns the priority reported for the change.
    #[must_use]
    #[inline]
    pub fn priority(&self) -> Priority {
        self.inner.priority
    }

    /// Returns `true` if the effective value changed.
    #[must_use]
    #[inline]
    pub fn is_effective_change(&self) -> bool {
        self.inner.is_effective_change
    }

    /// Returns `true` once a later effective change to the same property on
    /// the same object was raised while this event was still being delivered.
    #[must_use]
    #[inline]
    pub fn is_outdated(&self) -> bool {
        self.inner.is_outdated.get()
    }

    pub(crate) fn mark_outdated(&self) {
        self.inner.is_outdated.set(true);
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for PropertyChangedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChangedEvent")
            .field("sender", &self.inner.sender.class().name())
            .field("property", &self.inner.property)
            .field("old_value", &self.inner.old_value)
            .field("new_value", &self.inner.new_value)
            .field("priority", &self.inner.priority)
            .field("is_effective_change", &self.inner.is_effective_change)
            .field("is_outdated", &self.inner.is_outdated.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::metadata::PropertyMetadataBuilder;
    use crate::registry::PropertyRegistry;
    use alloc::format;

    static VISUAL: Class = Class::new("Visual");

    fn event() -> PropertyChangedEvent {
        let mut registry = PropertyRegistry::new();
        let opacity =
            registry.register_styled(&VISUAL, "Opacity", PropertyMetadataBuilder::new(1.0_f64).build());
        let object = PropertyObject::new(&VISUAL, Rc::new(registry));
        PropertyChangedEvent::new(
            object,
            opacity.into(),
            Some(ErasedValue::new(1.0_f64)),
            Some(ErasedValue::new(0.5_f64)),
            Priority::LocalValue,
            true,
        )
    }

    #[test]
    fn typed_accessors() {
        let event = event();
        assert_eq!(event.old_value_as::<f64>(), Some(1.0));
        assert_eq!(event.new_value_as::<f64>(), Some(0.5));
        assert_eq!(event.new_value_as::<i32>(), None);
        assert_eq!(event.priority(), Priority::LocalValue);
        assert!(event.is_effective_change());
    }

    #[test]
    fn outdated_flag_is_shared_by_clones() {
        let event = event();
        let clone = event.clone();
        assert!(!clone.is_outdated());
        event.mark_outdated();
        assert!(clone.is_outdated());
        assert!(clone.ptr_eq(&event));
    }

    #[test]
    fn debug_names_the_sender_class() {
        let debug = format!("{:?}", event());
        assert!(debug.contains("Visual"));
        assert!(debug.contains("0.5"));
    }
}
