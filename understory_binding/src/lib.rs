// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Binding: prioritized, observable properties with reactive bindings.
//!
//! This crate provides a property system for objects in a retained UI graph.
//! A property's effective value is chosen from competing sources ordered by
//! [`Priority`] (animation, local value, style trigger, template, style,
//! inheritance, default), and every change can be observed as a push stream.
//! Styling, data binding and animation each write at their own priority and
//! never overwrite each other.
//!
//! ## Core Concepts
//!
//! ### Property kinds
//!
//! Properties are registered in a [`PropertyRegistry`] as one of two kinds:
//!
//! - **Styled** ([`StyledProperty<T>`]) - values are stored per priority in a
//!   [`PriorityStore`]; the best one wins, then the parent's value (if the
//!   property inherits), then the default.
//! - **Direct** ([`DirectProperty<T>`]) - a single backing field in a
//!   [`FieldStore`]; priorities are ignored and the last write wins.
//!
//! [`PropertyObject`] accepts both through one set of methods
//! (`get_value`, `set_value`, `clear_value`, `get_base_value`, `listen`,
//! `get_observable`, `get_subject`, `bind`, ...), dispatching on the kind.
//! Erased variants taking [`AnyProperty`] return [`PropertyError`] for bad
//! arguments.
//!
//! ### Observation
//!
//! - [`PropertyObject::listen`] yields the raw [`PropertyChangedEvent`]s for
//!   one property, shadowed writes included.
//! - [`PropertyObject::get_observable`] yields effective values. Each
//!   subscriber first receives the current value, then every effective change
//!   that was not superseded during its own delivery.
//! - [`PropertyRegistry::changed`] yields the events for one property across
//!   all objects; [`add_class_handler`] filters it by class.
//!
//! ### Bindings
//!
//! [`PropertyObject::bind`] drives a property from any [`Observable`];
//! [`PropertyObject::bind_binding`] applies a [`Binding`] such as
//! [`PropertyBinding`] or [`ConstantBinding`]. Every effect returns a
//! [`Subscription`]; disposal is always explicit, and dropping a subscription
//! leaves the effect running.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use understory_binding::{
//!     Class, Observer, Priority, PropertyMetadataBuilder, PropertyObject, PropertyRegistry,
//! };
//!
//! static BORDER: Class = Class::new("Border");
//!
//! let mut registry = PropertyRegistry::new();
//! let opacity = registry.register_styled(
//!     &BORDER,
//!     "Opacity",
//!     PropertyMetadataBuilder::new(1.0_f64)
//!         .coerce(|v: f64| v.clamp(0.0, 1.0))
//!         .build(),
//! );
//! let border = PropertyObject::new(&BORDER, Rc::new(registry));
//!
//! // A local value beats a style value, whatever the write order.
//! border.set_value(opacity, 0.5, Priority::LocalValue);
//! let _style = border.set_value(opacity, 0.2, Priority::Style);
//! assert_eq!(border.get_value(opacity), 0.5);
//!
//! // Clearing the local value lets the style value through.
//! border.clear_value(opacity);
//! assert_eq!(border.get_value(opacity), 0.2);
//!
//! // A subject writes through at its priority.
//! border.get_subject(opacity, Priority::LocalValue).on_next(0.9);
//! assert_eq!(border.get_value(opacity), 0.9);
//! ```
//!
//! ## Threading
//!
//! Everything is single-threaded and synchronous. Observers run before the
//! write that triggered them returns, and may write again; no borrow is held
//! across a callback.
//!
//! ## Logging
//!
//! Diagnostics are emitted through [`tracing`]: `trace` for every raised
//! change, `debug` when a binding is initiated or declines to apply a value,
//! and `warn` when a value of the wrong type reaches an erased subject or a
//! binding.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod binding;
mod changes;
mod class;
mod class_handler;
mod error;
mod event;
mod id;
mod metadata;
mod object;
mod observable;
mod priority;
mod registry;
mod router;
mod store;
mod subject;
mod value;
mod values;

pub use binding::{
    Binding, BindingError, BindingResult, BindingSource, BindingValue, ConstantBinding,
    ObservableBinding, PropertyBinding,
};
pub use changes::{ChangeStream, PropertyAdapter};
pub use class::{Class, ObjectClass};
pub use class_handler::{TypedObject, add_class_handler};
pub use error::PropertyError;
pub use event::PropertyChangedEvent;
pub use id::{AnyProperty, DirectProperty, Property, PropertyId, PropertyKind, StyledProperty};
pub use metadata::{CoerceValueCallback, PropertyMetadata, PropertyMetadataBuilder};
pub use object::{PropertyObject, WeakObject};
pub use observable::{
    FilterMap, FnObserver, Map, Observable, ObservableExt, Observer, SharedObservable, Subject,
    Subscription,
};
pub use priority::{DEFAULT_PRIORITY, Priority};
pub use registry::{PropertyRegistration, PropertyRegistry};
pub use store::{FieldStore, PriorityStore};
pub use subject::{AnyPropertySubject, PropertySubject};
pub use value::{ErasedValue, PropertyValue};
pub use values::ValueObservable;
