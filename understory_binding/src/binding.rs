// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bindings.
//!
//! A binding drives a target property from a source of [`BindingValue`]s at a
//! chosen priority. Sources are either plain observables, passed to
//! [`PropertyObject::bind`] or [`PropertyObject::bind_values`], or
//! implementations of [`Binding`], passed to [`PropertyObject::bind_binding`]
//! and asked to produce a [`BindingResult`] for a specific target.
//!
//! Every bind call returns a [`Subscription`]. Disposing it stops further
//! writes; the last value written stays in place.
//!
//! ```rust
//! use std::rc::Rc;
//! use understory_binding::{Class, Priority, PropertyMetadataBuilder, PropertyObject, PropertyRegistry, Subject};
//!
//! static LABEL: Class = Class::new("Label");
//!
//! let mut registry = PropertyRegistry::new();
//! let width = registry.register_styled(&LABEL, "Width", PropertyMetadataBuilder::new(0.0_f64).build());
//! let label = PropertyObject::new(&LABEL, Rc::new(registry));
//!
//! let source = Subject::new();
//! let mut binding = label.bind(width, source.clone(), Priority::Style);
//! source.next(40.0);
//! assert_eq!(label.get_value(width), 40.0);
//!
//! binding.dispose();
//! source.next(80.0);
//! assert_eq!(label.get_value(width), 40.0);
//! ```

use alloc::rc::Rc;
use alloc::string::String;
use core::any::{Any, TypeId};
use core::fmt;

use tracing::{debug, warn};

use crate::error::PropertyError;
use crate::id::{AnyProperty, Property};
use crate::object::{PropertyObject, WeakObject, assert_writable};
use crate::observable::{Observable, ObservableExt, SharedObservable, Subscription};
use crate::priority::Priority;
use crate::registry::PropertyRegistration;
use crate::router::check_type;
use crate::value::{ErasedValue, PropertyValue};

/// One value produced by a binding source.
#[derive(Clone, Debug, PartialEq)]
pub enum BindingValue<T> {
    /// Write this value.
    Value(T),
    /// Clear the binding's layer, letting the next value source show through.
    Unset,
    /// Leave the target untouched.
    DoNothing,
    /// The source failed.
    ///
    /// The fallback, if any, is written; the error is recorded on the target
    /// when the property has data validation enabled.
    Error {
        /// What went wrong.
        error: BindingError,
        /// A value to write instead.
        fallback: Option<T>,
    },
}

impl<T> BindingValue<T> {
    /// Transforms the carried value, keeping the variant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BindingValue<U> {
        match self {
            Self::Value(value) => BindingValue::Value(f(value)),
            Self::Unset => BindingValue::Unset,
            Self::DoNothing => BindingValue::DoNothing,
            Self::Error { error, fallback } => BindingValue::Error {
                error,
                fallback: fallback.map(f),
            },
        }
    }

    /// Returns the value to write, if this carries one.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Error { fallback, .. } => fallback.as_ref(),
            Self::Unset | Self::DoNothing => None,
        }
    }
}

/// Why a binding could not produce a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingError {
    /// The source rejected the value.
    Validation(String),
    /// The source produced a value of the wrong type.
    TypeMismatch {
        /// The target property's value type.
        expected: &'static str,
        /// The type that was produced.
        found: &'static str,
    },
    /// The source object or property is not available.
    SourceUnavailable,
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected a value of type `{expected}`, got `{found}`")
            }
            Self::SourceUnavailable => f.write_str("binding source is unavailable"),
        }
    }
}

impl core::error::Error for BindingError {}

/// What a [`Binding`] produced when initiated against a target.
pub enum BindingResult {
    /// Nothing to apply; the target is left untouched.
    None,
    /// A single value, written once.
    Value(ErasedValue),
    /// A stream of values, applied until the binding is disposed.
    Stream(SharedObservable<BindingValue<ErasedValue>>),
}

impl fmt::Debug for BindingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A description of a binding that can be applied to a target property.
pub trait Binding {
    /// Produces the values for `property` on `target`.
    ///
    /// `anchor` is an optional context object, for example the object a
    /// relative source is resolved from. `enable_data_validation` is the
    /// target property's setting.
    fn initiate(
        &self,
        target: &PropertyObject,
        property: AnyProperty,
        anchor: Option<&dyn Any>,
        enable_data_validation: bool,
    ) -> BindingResult;
}

/// A binding from any observable.
pub struct ObservableBinding {
    source: SharedObservable<BindingValue<ErasedValue>>,
    type_id: TypeId,
}

impl ObservableBinding {
    /// Binds to a stream of plain values.
    pub fn new<T: PropertyValue>(source: impl Observable<T> + 'static) -> Self {
        Self {
            source: source
                .map(|value: T| BindingValue::Value(ErasedValue::new(value)))
                .into_shared(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Binds to a stream of [`BindingValue`]s.
    pub fn from_values<T: PropertyValue>(
        source: impl Observable<BindingValue<T>> + 'static,
    ) -> Self {
        Self {
            source: source
                .map(|value: BindingValue<T>| value.map(ErasedValue::new))
                .into_shared(),
            type_id: TypeId::of::<T>(),
        }
    }
}

impl Binding for ObservableBinding {
    fn initiate(
        &self,
        _target: &PropertyObject,
        property: AnyProperty,
        _anchor: Option<&dyn Any>,
        _enable_data_validation: bool,
    ) -> BindingResult {
        if property.type_id() != self.type_id {
            debug!(property = ?property.id(), "observable binding has the wrong value type");
        }
        BindingResult::Stream(Rc::clone(&self.source))
    }
}

impl fmt::Debug for ObservableBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableBinding").finish_non_exhaustive()
    }
}

/// Where a [`PropertyBinding`] reads from.
#[derive(Clone, Debug)]
pub enum BindingSource {
    /// The target object itself.
    Target,
    /// The anchor passed to [`PropertyObject::bind_binding`], which must be a
    /// [`PropertyObject`].
    Anchor,
    /// A specific object.
    Object(WeakObject),
}

/// A one-way binding from a property of a source object.
#[derive(Clone, Debug)]
pub struct PropertyBinding {
    source: BindingSource,
    property: AnyProperty,
}

impl PropertyBinding {
    /// Binds to `property` on the object `source` resolves to.
    pub fn new(source: BindingSource, property: impl Into<AnyProperty>) -> Self {
        Self {
            source,
            property: property.into(),
        }
    }
}

impl Binding for PropertyBinding {
    fn initiate(
        &self,
        target: &PropertyObject,
        _property: AnyProperty,
        anchor: Option<&dyn Any>,
        _enable_data_validation: bool,
    ) -> BindingResult {
        let source = match &self.source {
            BindingSource::Target => Some(target.clone()),
            BindingSource::Anchor => {
                anchor.and_then(|anchor| anchor.downcast_ref::<PropertyObject>().cloned())
            }
            BindingSource::Object(object) => object.upgrade(),
        };
        let Some(source) = source else {
            return BindingResult::None;
        };
        match source.get_observable_erased(self.property) {
            Ok(values) => BindingResult::Stream(values.map(BindingValue::Value).into_shared()),
            Err(error) => {
                debug!(%error, "property binding source is not readable");
                BindingResult::None
            }
        }
    }
}

/// A binding to a fixed value.
#[derive(Clone, Debug)]
pub struct ConstantBinding {
    value: ErasedValue,
}

impl ConstantBinding {
    /// Binds to `value`.
    pub fn new<T: PropertyValue>(value: T) -> Self {
        Self {
            value: ErasedValue::new(value),
        }
    }
}

impl Binding for ConstantBinding {
    fn initiate(
        &self,
        _target: &PropertyObject,
        _property: AnyProperty,
        _anchor: Option<&dyn Any>,
        _enable_data_validation: bool,
    ) -> BindingResult {
        BindingResult::Value(self.value.clone())
    }
}

impl PropertyObject {
    /// Binds a property to a stream of plain values.
    ///
    /// Each value is written at `priority` (direct properties ignore it).
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered, or if it is styled and
    /// `priority` is [`Priority::Inherited`] or [`Priority::Unset`].
    pub fn bind<T, S>(
        &self,
        property: impl Into<Property<T>>,
        source: S,
        priority: Priority,
    ) -> Subscription
    where
        T: PropertyValue,
        S: Observable<T>,
    {
        self.bind_values(property, source.map(BindingValue::Value), priority)
    }

    /// Binds a property to a stream of [`BindingValue`]s.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered, or if it is styled and
    /// `priority` is [`Priority::Inherited`] or [`Priority::Unset`].
    pub fn bind_values<T, S>(
        &self,
        property: impl Into<Property<T>>,
        source: S,
        priority: Priority,
    ) -> Subscription
    where
        T: PropertyValue,
        S: Observable<BindingValue<T>>,
    {
        let property = AnyProperty::from(property.into());
        let enable_data_validation = self.expect_registration(property).enable_data_validation();
        assert_writable(property, priority);
        let target = self.downgrade();
        source.subscribe_fn(move |value: BindingValue<T>| {
            if let Some(target) = target.upgrade() {
                target.apply_binding_value(
                    property,
                    value.map(ErasedValue::new),
                    priority,
                    enable_data_validation,
                );
            }
        })
    }

    /// Initiates `binding` against a property and applies what it produces.
    ///
    /// - [`BindingResult::None`]: nothing happens; the returned subscription
    ///   is inert.
    /// - [`BindingResult::Value`]: the value is written once at `priority`;
    ///   the returned subscription is inert.
    /// - [`BindingResult::Stream`]: every emission is applied at `priority`
    ///   until the returned subscription is disposed.
    ///
    /// A fixed value of the wrong type is reported as
    /// [`PropertyError::TypeMismatch`]; streamed values of the wrong type are
    /// logged and reported to the target as [`BindingError::TypeMismatch`].
    ///
    /// # Panics
    ///
    /// Panics if the property is styled and `priority` is
    /// [`Priority::Inherited`] or [`Priority::Unset`], before the binding is
    /// initiated.
    pub fn bind_binding(
        &self,
        property: impl Into<AnyProperty>,
        binding: &dyn Binding,
        priority: Priority,
        anchor: Option<&dyn Any>,
    ) -> Result<Subscription, PropertyError> {
        let property = property.into();
        let registration = self.checked_registration(property)?;
        assert_writable(property, priority);
        let enable_data_validation = registration.enable_data_validation();
        debug!(
            class = self.class().name(),
            property = registration.name(),
            %priority,
            "initiating binding"
        );

        match binding.initiate(self, property, anchor, enable_data_validation) {
            BindingResult::None => {
                debug!(
                    property = registration.name(),
                    "binding produced nothing to apply"
                );
                Ok(Subscription::empty())
            }
            BindingResult::Value(value) => {
                check_type(property, registration, &value)?;
                self.apply_binding_value(
                    property,
                    BindingValue::Value(value),
                    priority,
                    enable_data_validation,
                );
                Ok(Subscription::empty())
            }
            BindingResult::Stream(source) => {
                let target = self.downgrade();
                Ok(source.subscribe_fn(move |value: BindingValue<ErasedValue>| {
                    if let Some(target) = target.upgrade() {
                        target.apply_binding_value(
                            property,
                            value,
                            priority,
                            enable_data_validation,
                        );
                    }
                }))
            }
        }
    }

    fn apply_binding_value(
        &self,
        property: AnyProperty,
        value: BindingValue<ErasedValue>,
        priority: Priority,
        enable_data_validation: bool,
    ) {
        let Ok(registration) = self.registration(property) else {
            return;
        };
        match value {
            BindingValue::Value(value) => {
                if let Some(error) = mismatch(registration, &value) {
                    self.binding_failed(
                        property,
                        registration,
                        error,
                        None,
                        priority,
                        enable_data_validation,
                    );
                    return;
                }
                self.write_unheld(property, registration, value, priority);
                if enable_data_validation {
                    self.set_data_validation_error(property.id(), None);
                }
            }
            BindingValue::Unset => self.clear_at(property, registration, priority),
            BindingValue::DoNothing => {
                debug!(property = registration.name(), "binding chose not to apply a value");
            }
            BindingValue::Error { error, fallback } => {
                self.binding_failed(
                    property,
                    registration,
                    error,
                    fallback,
                    priority,
                    enable_data_validation,
                );
            }
        }
    }

    fn binding_failed(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        error: BindingError,
        fallback: Option<ErasedValue>,
        priority: Priority,
        enable_data_validation: bool,
    ) {
        if let Some(fallback) = fallback
            && mismatch(registration, &fallback).is_none()
        {
            self.write_unheld(property, registration, fallback, priority);
        }
        if enable_data_validation {
            self.set_data_validation_error(property.id(), Some(error));
        }
    }
}

fn mismatch(registration: &PropertyRegistration, value: &ErasedValue) -> Option<BindingError> {
    if value.type_id() == registration.type_id() {
        return None;
    }
    warn!(
        property = registration.name(),
        expected = registration.type_name(),
        found = value.type_name(),
        "binding produced a value of the wrong type"
    );
    Some(BindingError::TypeMismatch {
        expected: registration.type_name(),
        found: value.type_name(),
    })
}
