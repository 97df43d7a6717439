// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property registry.
//!
//! This module provides [`PropertyRegistry`] for registering properties of
//! either kind and looking up their metadata, plus the class-level change
//! stream every registration owns.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use hashbrown::{Equivalent, HashMap};

use crate::class::Class;
use crate::event::PropertyChangedEvent;
use crate::id::{AnyProperty, DirectProperty, PropertyId, PropertyKind, StyledProperty};
use crate::metadata::PropertyMetadata;
use crate::observable::{SharedObservable, Subject};
use crate::value::{ErasedValue, PropertyValue};

/// A registration entry for a property.
///
/// This stores the property's name, owner class, kind, value type and
/// metadata.
pub struct PropertyRegistration {
    name: &'static str,
    owner: &'static Class,
    kind: PropertyKind,
    type_id: TypeId,
    type_name: &'static str,
    metadata: Box<dyn ErasedMetadata>,
    changed: Subject<PropertyChangedEvent>,
}

impl PropertyRegistration {
    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the class that declared the property.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> &'static Class {
        self.owner
    }

    /// Returns the storage kind.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Returns the [`TypeId`] of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns whether this property inherits from parents.
    #[must_use]
    #[inline]
    pub fn inherits(&self) -> bool {
        self.metadata.inherits()
    }

    /// Returns whether bindings report data-validation errors to this property.
    #[must_use]
    #[inline]
    pub fn enable_data_validation(&self) -> bool {
        self.metadata.enable_data_validation()
    }

    pub(crate) fn default_erased(&self) -> ErasedValue {
        self.metadata.default_erased()
    }

    pub(crate) fn coerce_erased(&self, value: ErasedValue) -> ErasedValue {
        self.metadata.coerce_erased(value)
    }

    pub(crate) fn changed_subject(&self) -> &Subject<PropertyChangedEvent> {
        &self.changed
    }
}

impl core::fmt::Debug for PropertyRegistration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("name", &self.name)
            .field("owner", &self.owner.name())
            .field("kind", &self.kind)
            .field("type", &self.type_name)
            .field("inherits", &self.inherits())
            .field("enable_data_validation", &self.enable_data_validation())
            .finish_non_exhaustive()
    }
}

/// A registry for properties.
///
/// Properties are registered once at startup; the registry is then shared
/// (behind an `Rc`) by every [`PropertyObject`](crate::PropertyObject) that
/// uses it.
///
/// # Example
///
/// ```rust
/// use understory_binding::{Class, PropertyKind, PropertyMetadataBuilder, PropertyRegistry};
///
/// static VISUAL: Class = Class::new("Visual");
///
/// let mut registry = PropertyRegistry::new();
/// let opacity = registry.register_styled(
///     &VISUAL,
///     "Opacity",
///     PropertyMetadataBuilder::new(1.0_f64).build(),
/// );
/// let bounds = registry.register_direct(
///     &VISUAL,
///     "IsMeasured",
///     PropertyMetadataBuilder::new(false).build(),
/// );
///
/// assert_eq!(registry.name(opacity.id()), Some("Opacity"));
/// assert_eq!(registry.get(bounds.id()).unwrap().kind(), PropertyKind::BackingField);
/// assert_eq!(registry.by_name(&VISUAL, "Opacity"), Some(opacity.id()));
/// ```
#[derive(Default)]
pub struct PropertyRegistry {
    properties: Vec<PropertyRegistration>,
    by_name: HashMap<(usize, &'static str), PropertyId>,
}

/// Classes are compared by identity, so two classes with the same name keep
/// separate property namespaces.
fn owner_key(owner: &Class) -> usize {
    core::ptr::from_ref(owner).addr()
}

/// A borrowed `(owner, name)` key, hashed exactly like the stored tuple.
#[derive(Hash)]
struct NameQuery<'a>(usize, &'a str);

impl Equivalent<(usize, &'static str)> for NameQuery<'_> {
    fn equivalent(&self, key: &(usize, &'static str)) -> bool {
        self.0 == key.0 && self.1 == key.1
    }
}

impl PropertyRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a priority-resolved property.
    ///
    /// # Panics
    ///
    /// Panics if `owner` already declares a property called `name`, or if more
    /// than 65,535 properties are registered.
    pub fn register_styled<T: PropertyValue>(
        &mut self,
        owner: &'static Class,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> StyledProperty<T> {
        let id = self.insert(owner, name, PropertyKind::PriorityResolved, metadata);
        StyledProperty::from_id(id)
    }

    /// Registers a backing-field property.
    ///
    /// # Panics
    ///
    /// Panics if `owner` already declares a property called `name`, if the
    /// metadata asks for inheritance (only styled properties inherit), or if
    /// more than 65,535 properties are registered.
    pub fn register_direct<T: PropertyValue>(
        &mut self,
        owner: &'static Class,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> DirectProperty<T> {
        assert!(
            !metadata.inherits(),
            "Direct property '{name}' cannot inherit"
        );
        let id = self.insert(owner, name, PropertyKind::BackingField, metadata);
        DirectProperty::from_id(id)
    }

    fn insert<T: PropertyValue>(
        &mut self,
        owner: &'static Class,
        name: &'static str,
        kind: PropertyKind,
        metadata: PropertyMetadata<T>,
    ) -> PropertyId {
        let key = (owner_key(owner), name);
        assert!(
            !self.by_name.contains_key(&key),
            "Property '{}.{name}' is already registered",
            owner.name()
        );
        assert!(
            self.properties.len() < u16::MAX as usize,
            "Too many properties registered (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = PropertyId::new(self.properties.len() as u16);

        self.properties.push(PropertyRegistration {
            name,
            owner,
            kind,
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            metadata: Box::new(metadata),
            changed: Subject::new(),
        });
        self.by_name.insert(key, id);
        id
    }

    /// Returns the number of registered properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no properties are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a property by owner class and name.
    #[must_use]
    pub fn by_name(&self, owner: &Class, name: &str) -> Option<PropertyId> {
        self.by_name
            .get(&NameQuery(owner_key(owner), name))
            .copied()
    }

    /// Returns the name of a property.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(|r| r.name)
    }

    /// Returns the registration for a property.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration> {
        self.properties.get(id.index() as usize)
    }

    /// Returns an untyped handle for a registered property.
    #[must_use]
    pub fn handle(&self, id: PropertyId) -> Option<AnyProperty> {
        self.get(id).map(|r| AnyProperty::from_parts(id, r.kind, r.type_id, r.type_name))
    }

    /// Returns the metadata for a typed property.
    ///
    /// Returns `None` if the property is not registered or the type doesn't match.
    #[must_use]
    pub fn get_metadata<T: PropertyValue>(
        &self,
        property: impl Into<AnyProperty>,
    ) -> Option<&PropertyMetadata<T>> {
        self.get(property.into().id())
            .and_then(|r| r.metadata.as_any().downcast_ref())
    }

    /// Returns the class-level change stream for a property.
    ///
    /// Every [`PropertyObject`](crate::PropertyObject) sharing this registry
    /// publishes its changes to this property here, before its own listeners
    /// run. This is the usual input to
    /// [`add_class_handler`](crate::add_class_handler).
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered.
    #[must_use]
    pub fn changed(&self, property: impl Into<AnyProperty>) -> SharedObservable<PropertyChangedEvent> {
        let id = property.into().id();
        let Some(registration) = self.get(id) else {
            panic!("Property {id:?} not found in registry");
        };
        Rc::new(registration.changed.clone())
    }

    /// Returns an iterator over all registered properties.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            (PropertyId::new(i as u16), r)
        })
    }
}

impl core::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("count", &self.properties.len())
            .field(
                "properties",
                &self.properties.iter().map(|r| r.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Type-erased metadata trait for heterogeneous storage.
trait ErasedMetadata: Any {
    fn as_any(&self) -> &dyn Any;
    fn inherits(&self) -> bool;
    fn enable_data_validation(&self) -> bool;
    fn default_erased(&self) -> ErasedValue;
    fn coerce_erased(&self, value: ErasedValue) -> ErasedValue;
}

impl<T: PropertyValue> ErasedMetadata for PropertyMetadata<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inherits(&self) -> bool {
        Self::inherits(self)
    }

    fn enable_data_validation(&self) -> bool {
        Self::enable_data_validation(self)
    }

    fn default_erased(&self) -> ErasedValue {
        ErasedValue::new(self.default_value().clone())
    }

    fn coerce_erased(&self, value: ErasedValue) -> ErasedValue {
        if !self.has_coerce_callback() {
            return value;
        }
        match value.downcast::<T>() {
            Some(typed) => ErasedValue::new(self.coerce(typed)),
            None => value,
        }
    }
}
