// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class handlers.
//!
//! A class handler reacts to property changes on every object of a class,
//! rather than on one object. It is usually attached to the class-level stream
//! from [`PropertyRegistry::changed`](crate::PropertyRegistry::changed).

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;

use crate::class::ObjectClass;
use crate::event::PropertyChangedEvent;
use crate::object::PropertyObject;
use crate::observable::{Observable, ObservableExt, Subscription};

/// A [`PropertyObject`] known to be of class `C` or a subclass of it.
pub struct TypedObject<C> {
    object: PropertyObject,
    _marker: PhantomData<fn() -> C>,
}

impl<C: ObjectClass> TypedObject<C> {
    /// Returns the untyped handle.
    #[must_use]
    pub fn into_inner(self) -> PropertyObject {
        self.object
    }
}

impl<C> Deref for TypedObject<C> {
    type Target = PropertyObject;

    fn deref(&self) -> &PropertyObject {
        &self.object
    }
}

impl<C> Clone for TypedObject<C> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            _marker: PhantomData,
        }
    }
}

impl<C> fmt::Debug for TypedObject<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedObject").field(&self.object).finish()
    }
}

impl PropertyObject {
    /// Narrows the handle to class `C`, if the object is a `C`.
    #[must_use]
    pub fn downcast<C: ObjectClass>(&self) -> Option<TypedObject<C>> {
        self.is::<C>().then(|| TypedObject {
            object: self.clone(),
            _marker: PhantomData,
        })
    }
}

/// Calls `handler` for every event in `changes` whose sender is a `C`.
///
/// Senders of class `C` and of its subclasses match; all other events are
/// skipped. Disposing the returned subscription detaches the handler.
///
/// # Example
///
/// ```rust
/// use core::cell::Cell;
/// use std::rc::Rc;
/// use understory_binding::{
///     Class, ObjectClass, Priority, PropertyMetadataBuilder, PropertyObject, PropertyRegistry,
///     add_class_handler,
/// };
///
/// static CONTROL: Class = Class::new("Control");
/// static BUTTON: Class = Class::derived("Button", &CONTROL);
/// static LABEL: Class = Class::derived("Label", &CONTROL);
///
/// struct Button;
/// impl ObjectClass for Button {
///     const CLASS: &'static Class = &BUTTON;
/// }
///
/// let mut registry = PropertyRegistry::new();
/// let content = registry.register_styled(&CONTROL, "Content", PropertyMetadataBuilder::new(0_u32).build());
/// let registry = Rc::new(registry);
///
/// let calls = Rc::new(Cell::new(0));
/// let counter = calls.clone();
/// let _handler = add_class_handler::<Button, _, _>(&registry.changed(content), move |button, _| {
///     assert!(button.is::<Button>());
///     counter.set(counter.get() + 1);
/// });
///
/// let label = PropertyObject::new(&LABEL, registry.clone());
/// let button = PropertyObject::new(&BUTTON, registry.clone());
/// label.set_value(content, 1, Priority::LocalValue);
/// button.set_value(content, 1, Priority::LocalValue);
///
/// assert_eq!(calls.get(), 1);
/// ```
pub fn add_class_handler<C, S, F>(changes: &S, handler: F) -> Subscription
where
    C: ObjectClass,
    S: Observable<PropertyChangedEvent> + ?Sized,
    F: Fn(&TypedObject<C>, &PropertyChangedEvent) + 'static,
{
    changes.subscribe_fn(move |event: PropertyChangedEvent| {
        if let Some(sender) = event.sender().downcast::<C>() {
            handler(&sender, &event);
        }
    })
}
