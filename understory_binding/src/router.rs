// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Kind-agnostic property access.
//!
//! The methods here accept either property kind and dispatch on it with a
//! single `match`. Typed methods take `impl Into<Property<T>>`, so both
//! [`StyledProperty<T>`](crate::StyledProperty) and
//! [`DirectProperty<T>`](crate::DirectProperty) can be passed directly. Erased
//! methods take an [`AnyProperty`] and report bad arguments as
//! [`PropertyError`]s.
//!
//! Every descriptor is checked against the object's registry. A handle whose
//! kind disagrees with its registration is a programming error and panics with
//! "unsupported property kind".

use alloc::rc::Rc;

use crate::binding::BindingValue;
use crate::changes::ChangeStream;
use crate::error::PropertyError;
use crate::event::PropertyChangedEvent;
use crate::id::{AnyProperty, Property, PropertyKind};
use crate::object::{PropertyObject, assert_writable};
use crate::observable::{SharedObservable, Subscription};
use crate::priority::Priority;
use crate::registry::PropertyRegistration;
use crate::subject::{AnyPropertySubject, PropertySubject};
use crate::value::{ErasedValue, PropertyValue};
use crate::values::{ValueObservable, project_binding, project_erased, project_typed};

impl PropertyObject {
    /// Returns the change events for one property of this object.
    ///
    /// The stream carries every write that changed a stored value, including
    /// shadowed writes and events that later become outdated. If an
    /// [`adapter`](Self::adapter) exists for the property the stream is served
    /// from it; both paths deliver the same events in the same order.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered.
    #[must_use]
    pub fn listen(&self, property: impl Into<AnyProperty>) -> SharedObservable<PropertyChangedEvent> {
        let property = property.into();
        self.expect_registration(property);
        self.change_events(property)
    }

    fn change_events(&self, property: AnyProperty) -> SharedObservable<PropertyChangedEvent> {
        match self.existing_adapter(property.id()) {
            Some(adapter) => adapter.changes(),
            None => Rc::new(ChangeStream::new(self, property.id())),
        }
    }

    /// Returns the effective value of a property.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered with this object's registry.
    #[must_use]
    pub fn get_value<T: PropertyValue>(&self, property: impl Into<Property<T>>) -> T {
        let property = AnyProperty::from(property.into());
        let registration = self.expect_registration(property);
        typed(registration, self.read(property, registration))
    }

    /// Returns the effective value of a property, type-erased.
    pub fn get_value_erased(&self, property: AnyProperty) -> Result<ErasedValue, PropertyError> {
        let registration = self.checked_registration(property)?;
        Ok(self.read(property, registration))
    }

    pub(crate) fn read(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
    ) -> ErasedValue {
        match property.kind() {
            PropertyKind::PriorityResolved => self.styled_effective(property.id(), registration).1,
            PropertyKind::BackingField => self.direct_value(property.id(), registration),
        }
    }

    /// Writes a value.
    ///
    /// For a styled property the value is coerced and stored at `priority`;
    /// the returned handle (for priorities other than
    /// [`Priority::LocalValue`]) removes that layer again when disposed, as
    /// long as no later write at the same priority replaced it. A direct
    /// property ignores `priority`, stores the value in its field and returns
    /// `None`.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered, or if `priority` is
    /// [`Priority::Inherited`] or [`Priority::Unset`].
    pub fn set_value<T: PropertyValue>(
        &self,
        property: impl Into<Property<T>>,
        value: T,
        priority: Priority,
    ) -> Option<Subscription> {
        let property = AnyProperty::from(property.into());
        let registration = self.expect_registration(property);
        self.write(property, registration, ErasedValue::new(value), priority)
    }

    /// Writes a type-erased value.
    ///
    /// See [`set_value`](Self::set_value).
    ///
    /// # Panics
    ///
    /// Panics if `priority` is [`Priority::Inherited`] or [`Priority::Unset`].
    pub fn set_value_erased(
        &self,
        property: AnyProperty,
        value: ErasedValue,
        priority: Priority,
    ) -> Result<Option<Subscription>, PropertyError> {
        let registration = self.checked_registration(property)?;
        check_type(property, registration, &value)?;
        Ok(self.write(property, registration, value, priority))
    }

    pub(crate) fn write(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        value: ErasedValue,
        priority: Priority,
    ) -> Option<Subscription> {
        match property.kind() {
            PropertyKind::PriorityResolved => {
                self.set_styled(property, registration, value, priority)
            }
            PropertyKind::BackingField => {
                self.set_direct(property, registration, value);
                None
            }
        }
    }

    /// Writes a value for a binding or subject.
    ///
    /// The layer handle of a styled write is not kept: the value stays until
    /// it is overwritten or cleared.
    pub(crate) fn write_unheld(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        value: ErasedValue,
        priority: Priority,
    ) {
        drop(self.write(property, registration, value, priority));
    }

    /// Clears the local value of a property.
    ///
    /// A styled property falls back to its next-best layer, its inherited
    /// value or its default. A direct property is reset to its default.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered.
    pub fn clear_value<T: PropertyValue>(&self, property: impl Into<Property<T>>) {
        let property = AnyProperty::from(property.into());
        let registration = self.expect_registration(property);
        self.clear_at(property, registration, Priority::LocalValue);
    }

    /// Clears the local value of a property, type-erased.
    ///
    /// See [`clear_value`](Self::clear_value).
    pub fn clear_value_erased(&self, property: AnyProperty) -> Result<(), PropertyError> {
        let registration = self.checked_registration(property)?;
        self.clear_at(property, registration, Priority::LocalValue);
        Ok(())
    }

    pub(crate) fn clear_at(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        priority: Priority,
    ) {
        match property.kind() {
            PropertyKind::PriorityResolved => self.clear_styled(property, registration, priority),
            PropertyKind::BackingField => self.clear_direct(property, registration),
        }
    }

    /// Returns the best value stored at `max_priority` or a weaker priority.
    ///
    /// Layers stronger than `max_priority` are ignored, and so are inherited
    /// and default values: a styled property with nothing stored in range
    /// returns `None`. A direct property has no layers and always returns its
    /// current value.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered.
    #[must_use]
    pub fn get_base_value<T: PropertyValue>(
        &self,
        property: impl Into<Property<T>>,
        max_priority: Priority,
    ) -> Option<T> {
        let property = AnyProperty::from(property.into());
        let registration = self.expect_registration(property);
        self.base(property, registration, max_priority)
            .map(|value| typed(registration, value))
    }

    /// Returns the base value of a property, type-erased.
    ///
    /// See [`get_base_value`](Self::get_base_value).
    pub fn get_base_value_erased(
        &self,
        property: AnyProperty,
        max_priority: Priority,
    ) -> Result<Option<ErasedValue>, PropertyError> {
        let registration = self.checked_registration(property)?;
        Ok(self.base(property, registration, max_priority))
    }

    fn base(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        max_priority: Priority,
    ) -> Option<ErasedValue> {
        match property.kind() {
            PropertyKind::PriorityResolved => self.styled_base(property.id(), max_priority),
            PropertyKind::BackingField => Some(self.direct_value(property.id(), registration)),
        }
    }

    /// Returns an observable of the property's effective value.
    ///
    /// Each subscriber first receives the current value, then every later
    /// effective, non-outdated change.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered.
    #[must_use]
    pub fn get_observable<T: PropertyValue>(
        &self,
        property: impl Into<Property<T>>,
    ) -> ValueObservable<T> {
        let property = AnyProperty::from(property.into());
        ValueObservable::new(self, property, self.listen(property), project_typed::<T>)
    }

    /// Returns an observable of the property's effective value, type-erased.
    pub fn get_observable_erased(
        &self,
        property: AnyProperty,
    ) -> Result<ValueObservable<ErasedValue>, PropertyError> {
        self.checked_registration(property)?;
        Ok(ValueObservable::new(
            self,
            property,
            self.change_events(property),
            project_erased,
        ))
    }

    /// Returns an observable of the property's effective value, wrapped as
    /// [`BindingValue::Value`].
    ///
    /// This is the shape a binding from this property to another one consumes.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered.
    #[must_use]
    pub fn get_binding_observable<T: PropertyValue>(
        &self,
        property: impl Into<Property<T>>,
    ) -> ValueObservable<BindingValue<T>> {
        let property = AnyProperty::from(property.into());
        ValueObservable::new(
            self,
            property,
            self.listen(property),
            project_binding::<T>,
        )
    }

    /// Returns a two-way subject for the property.
    ///
    /// Subscribing to it behaves like [`get_observable`](Self::get_observable);
    /// each value pushed into it is written at `priority`.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered, or if it is styled and
    /// `priority` is [`Priority::Inherited`] or [`Priority::Unset`].
    #[must_use]
    pub fn get_subject<T: PropertyValue>(
        &self,
        property: impl Into<Property<T>>,
        priority: Priority,
    ) -> PropertySubject<T> {
        let property = property.into();
        let any = AnyProperty::from(property);
        self.expect_registration(any);
        assert_writable(any, priority);
        PropertySubject::new(self, property, self.change_events(any), priority)
    }

    /// Returns a two-way subject for the property, type-erased.
    ///
    /// # Panics
    ///
    /// Panics if the property is styled and `priority` is
    /// [`Priority::Inherited`] or [`Priority::Unset`].
    pub fn get_subject_erased(
        &self,
        property: AnyProperty,
        priority: Priority,
    ) -> Result<AnyPropertySubject, PropertyError> {
        self.checked_registration(property)?;
        assert_writable(property, priority);
        Ok(AnyPropertySubject::new(
            self,
            property,
            self.change_events(property),
            priority,
        ))
    }
}

pub(crate) fn check_type(
    property: AnyProperty,
    registration: &PropertyRegistration,
    value: &ErasedValue,
) -> Result<(), PropertyError> {
    if value.type_id() == registration.type_id() {
        Ok(())
    } else {
        Err(PropertyError::TypeMismatch {
            property: property.id(),
            expected: registration.type_name(),
            found: value.type_name(),
        })
    }
}

fn typed<T: PropertyValue>(registration: &PropertyRegistration, value: ErasedValue) -> T {
    match value.downcast::<T>() {
        Some(value) => value,
        None => panic!(
            "{} holds values of type `{}`",
            registration.name(),
            registration.type_name()
        ),
    }
}
