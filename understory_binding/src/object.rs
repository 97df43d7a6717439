// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property objects.
//!
//! A [`PropertyObject`] is a reference-counted handle to one object in a
//! retained graph. It owns a [`PriorityStore`] for styled properties, a
//! [`FieldStore`] for direct properties, an optional parent link used for
//! value inheritance, and the broadcast its change events go through.
//!
//! Value access lives in the kind router (`get_value`, `set_value`, ...);
//! this module holds the storage and notification machinery underneath it.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use smallvec::SmallVec;
use tracing::trace;

use crate::binding::BindingError;
use crate::changes::PropertyAdapter;
use crate::class::{Class, ObjectClass};
use crate::error::PropertyError;
use crate::event::PropertyChangedEvent;
use crate::id::{AnyProperty, PropertyId, PropertyKind};
use crate::observable::{Subject, Subscription};
use crate::priority::Priority;
use crate::registry::{PropertyRegistration, PropertyRegistry};
use crate::store::{FieldStore, PriorityStore};
use crate::value::ErasedValue;

/// A handle to an object that carries properties.
///
/// Clones are cheap and refer to the same object. Equality is identity.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use understory_binding::{Class, Priority, PropertyMetadataBuilder, PropertyObject, PropertyRegistry};
///
/// static BORDER: Class = Class::new("Border");
///
/// let mut registry = PropertyRegistry::new();
/// let opacity = registry.register_styled(&BORDER, "Opacity", PropertyMetadataBuilder::new(1.0_f64).build());
/// let border = PropertyObject::new(&BORDER, Rc::new(registry));
///
/// border.set_value(opacity, 0.5, Priority::LocalValue);
/// let _style = border.set_value(opacity, 0.2, Priority::Style);
/// assert_eq!(border.get_value(opacity), 0.5);
///
/// border.clear_value(opacity);
/// assert_eq!(border.get_value(opacity), 0.2);
/// ```
#[derive(Clone)]
pub struct PropertyObject {
    inner: Rc<ObjectInner>,
}

/// A non-owning reference to a [`PropertyObject`].
#[derive(Clone, Default)]
pub struct WeakObject {
    inner: Weak<ObjectInner>,
}

struct ObjectInner {
    class: &'static Class,
    registry: Rc<PropertyRegistry>,
    state: RefCell<ObjectState>,
    changes: Subject<PropertyChangedEvent>,
    adapters: RefCell<SmallVec<[Rc<PropertyAdapter>; 2]>>,
    in_flight: RefCell<Vec<PropertyChangedEvent>>,
    next_token: Cell<u64>,
}

#[derive(Default)]
struct ObjectState {
    values: PriorityStore,
    fields: FieldStore,
    parent: Option<Weak<ObjectInner>>,
    children: Vec<Weak<ObjectInner>>,
    validation_errors: SmallVec<[(PropertyId, BindingError); 1]>,
}

impl PropertyObject {
    /// Creates an object of `class` whose properties are described by `registry`.
    #[must_use]
    pub fn new(class: &'static Class, registry: Rc<PropertyRegistry>) -> Self {
        Self {
            inner: Rc::new(ObjectInner {
                class,
                registry,
                state: RefCell::new(ObjectState::default()),
                changes: Subject::new(),
                adapters: RefCell::new(SmallVec::new()),
                in_flight: RefCell::new(Vec::new()),
                next_token: Cell::new(0),
            }),
        }
    }

    /// Creates an object of the class named by `C`.
    #[must_use]
    pub fn of<C: ObjectClass>(registry: Rc<PropertyRegistry>) -> Self {
        Self::new(C::CLASS, registry)
    }

    /// Returns the object's class.
    #[must_use]
    #[inline]
    pub fn class(&self) -> &'static Class {
        self.inner.class
    }

    /// Returns `true` if the object's class is `C` or derives from it.
    #[must_use]
    pub fn is<C: ObjectClass>(&self) -> bool {
        self.inner.class.is_subclass_of(C::CLASS)
    }

    /// Returns the registry describing this object's properties.
    #[must_use]
    #[inline]
    pub fn registry(&self) -> &PropertyRegistry {
        &self.inner.registry
    }

    /// Creates a non-owning reference.
    #[must_use]
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the parent object, if one is set and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let parent = self.inner.state.borrow().parent.clone()?;
        parent.upgrade().map(|inner| Self { inner })
    }

    /// Sets or removes the parent that inheriting properties read from.
    ///
    /// Every inheriting styled property without a value of its own whose
    /// effective value changes as a result raises a change event at
    /// [`Priority::Inherited`], here and in the descendants that inherit it.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is this object or one of its descendants, or if it
    /// was created with a different registry: inherited values are looked up
    /// by property id, which is only meaningful within one registry.
    pub fn set_parent(&self, parent: Option<&Self>) {
        if let Some(parent) = parent {
            assert!(
                Rc::ptr_eq(&self.inner.registry, &parent.inner.registry),
                "A parent must share its child's property registry"
            );
            let mut ancestor = Some(parent.clone());
            while let Some(current) = ancestor {
                assert!(
                    !current.ptr_eq(self),
                    "Setting this parent would create a cycle"
                );
                ancestor = current.parent();
            }
        }

        let inheriting: SmallVec<[(AnyProperty, &PropertyRegistration, ErasedValue); 4]> = self
            .registry()
            .iter()
            .filter(|(_, r)| r.inherits() && r.kind() == PropertyKind::PriorityResolved)
            .map(|(id, r)| {
                let property = AnyProperty::from_parts(id, r.kind(), r.type_id(), r.type_name());
                (property, r, self.styled_effective(id, r).1)
            })
            .collect();

        let old_parent = self.inner.state.borrow_mut().parent.take();
        if let Some(old_parent) = old_parent.and_then(|weak| weak.upgrade()) {
            let me = Rc::as_ptr(&self.inner);
            old_parent
                .state
                .borrow_mut()
                .children
                .retain(|child| child.as_ptr() != me);
        }
        if let Some(parent) = parent {
            parent
                .inner
                .state
                .borrow_mut()
                .children
                .push(Rc::downgrade(&self.inner));
            self.inner.state.borrow_mut().parent = Some(Rc::downgrade(&parent.inner));
        }

        for (property, registration, old) in inheriting {
            if self.has_own_styled_value(property.id()) {
                continue;
            }
            let (_, new) = self.styled_effective(property.id(), registration);
            if old != new {
                self.inherited_changed(property, registration, &old, &new);
            }
        }
    }

    /// Returns the data-validation error a binding last reported for
    /// `property`, if any.
    ///
    /// Errors are only recorded for properties registered with
    /// `enable_data_validation`.
    #[must_use]
    pub fn data_validation_error(&self, property: impl Into<AnyProperty>) -> Option<BindingError> {
        let id = property.into().id();
        self.inner
            .state
            .borrow()
            .validation_errors
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, error)| error.clone())
    }

    pub(crate) fn set_data_validation_error(&self, id: PropertyId, error: Option<BindingError>) {
        let mut state = self.inner.state.borrow_mut();
        let errors = &mut state.validation_errors;
        let index = errors.iter().position(|(pid, _)| *pid == id);
        match (index, error) {
            (Some(i), Some(error)) => errors[i].1 = error,
            (Some(i), None) => {
                errors.remove(i);
            }
            (None, Some(error)) => errors.push((id, error)),
            (None, None) => {}
        }
    }

    /// Returns the cached change adapter for `property`, creating it on first use.
    ///
    /// Once an adapter exists, [`listen`](Self::listen) and the value
    /// observables for that property are served from it.
    ///
    /// # Panics
    ///
    /// Panics if the property is not registered with this object's registry.
    pub fn adapter(&self, property: impl Into<AnyProperty>) -> Rc<PropertyAdapter> {
        let property = property.into();
        self.expect_registration(property);
        if let Some(adapter) = self.existing_adapter(property.id()) {
            return adapter;
        }
        let adapter = PropertyAdapter::new(self, property);
        self.inner.adapters.borrow_mut().push(Rc::clone(&adapter));
        adapter
    }

    pub(crate) fn existing_adapter(&self, id: PropertyId) -> Option<Rc<PropertyAdapter>> {
        self.inner
            .adapters
            .borrow()
            .iter()
            .find(|adapter| adapter.property().id() == id)
            .cloned()
    }

    /// The instance-level broadcast every change on this object goes through.
    pub(crate) fn changes(&self) -> &Subject<PropertyChangedEvent> {
        &self.inner.changes
    }

    /// Looks up the registration for `property`.
    ///
    /// # Panics
    ///
    /// Panics with "unsupported property kind" if the registered kind differs
    /// from the handle's kind.
    pub(crate) fn registration(
        &self,
        property: AnyProperty,
    ) -> Result<&PropertyRegistration, PropertyError> {
        let id = property.id();
        let registration = self
            .inner
            .registry
            .get(id)
            .ok_or(PropertyError::UnknownProperty(id))?;
        assert!(
            registration.kind() == property.kind(),
            "unsupported property kind: {id} is registered as {:?}, not {:?}",
            registration.kind(),
            property.kind()
        );
        Ok(registration)
    }

    /// Like [`registration`](Self::registration), but also rejects a handle
    /// whose value type is not the registered one.
    pub(crate) fn checked_registration(
        &self,
        property: AnyProperty,
    ) -> Result<&PropertyRegistration, PropertyError> {
        let registration = self.registration(property)?;
        if registration.type_id() != property.type_id() {
            return Err(PropertyError::TypeMismatch {
                property: property.id(),
                expected: registration.type_name(),
                found: property.type_name(),
            });
        }
        Ok(registration)
    }

    /// Like [`checked_registration`](Self::checked_registration), but panics
    /// on every error.
    pub(crate) fn expect_registration(&self, property: AnyProperty) -> &PropertyRegistration {
        match self.checked_registration(property) {
            Ok(registration) => registration,
            Err(error) => panic!("{error}"),
        }
    }

    fn next_token(&self) -> u64 {
        let token = self.inner.next_token.get() + 1;
        self.inner.next_token.set(token);
        token
    }

    fn has_own_styled_value(&self, id: PropertyId) -> bool {
        self.inner.state.borrow().values.effective(id).is_some()
    }

    /// Resolves a styled property: stored layers, then the parent (if the
    /// property inherits), then the default.
    pub(crate) fn styled_effective(
        &self,
        id: PropertyId,
        registration: &PropertyRegistration,
    ) -> (Priority, ErasedValue) {
        let parent = {
            let state = self.inner.state.borrow();
            if let Some((priority, value)) = state.values.effective(id) {
                return (priority, value.clone());
            }
            if registration.inherits() {
                state.parent.as_ref().and_then(Weak::upgrade)
            } else {
                None
            }
        };
        match parent {
            Some(inner) => {
                let (priority, value) = Self { inner }.styled_effective(id, registration);
                let priority = if priority == Priority::Unset {
                    Priority::Unset
                } else {
                    Priority::Inherited
                };
                (priority, value)
            }
            None => (Priority::Unset, registration.default_erased()),
        }
    }

    pub(crate) fn styled_base(&self, id: PropertyId, max: Priority) -> Option<ErasedValue> {
        self.inner
            .state
            .borrow()
            .values
            .base(id, max)
            .map(|(_, value)| value.clone())
    }

    pub(crate) fn direct_value(
        &self,
        id: PropertyId,
        registration: &PropertyRegistration,
    ) -> ErasedValue {
        self.inner
            .state
            .borrow()
            .fields
            .get(id)
            .cloned()
            .unwrap_or_else(|| registration.default_erased())
    }

    /// Writes a styled layer, raising an event if the layer changed.
    ///
    /// Returns a handle that clears the layer again, for priorities other
    /// than [`Priority::LocalValue`].
    pub(crate) fn set_styled(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        value: ErasedValue,
        priority: Priority,
    ) -> Option<Subscription> {
        assert_writable(property, priority);
        let id = property.id();
        let value = registration.coerce_erased(value);
        let (_, old_effective) = self.styled_effective(id, registration);
        let token = self.next_token();
        let old_layer =
            self.inner
                .state
                .borrow_mut()
                .values
                .set(id, priority, value.clone(), token);

        if old_layer.as_ref() != Some(&value) {
            self.styled_changed(
                property,
                registration,
                old_effective,
                old_layer,
                Some(value),
                priority,
            );
        }

        (priority != Priority::LocalValue).then(|| {
            let object = self.downgrade();
            Subscription::new(move || {
                if let Some(object) = object.upgrade() {
                    object.clear_styled_if_token(property, priority, token);
                }
            })
        })
    }

    fn clear_styled_if_token(&self, property: AnyProperty, priority: Priority, token: u64) {
        let Ok(registration) = self.registration(property) else {
            return;
        };
        let current = self
            .inner
            .state
            .borrow()
            .values
            .token_at(property.id(), priority);
        if current == Some(token) {
            self.clear_styled(property, registration, priority);
        }
    }

    /// Removes a styled layer, raising an event if one was stored.
    pub(crate) fn clear_styled(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        priority: Priority,
    ) {
        let id = property.id();
        let (_, old_effective) = self.styled_effective(id, registration);
        let Some(removed) = self.inner.state.borrow_mut().values.clear(id, priority) else {
            return;
        };
        self.styled_changed(
            property,
            registration,
            old_effective,
            Some(removed),
            None,
            priority,
        );
    }

    fn styled_changed(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        old_effective: ErasedValue,
        old_layer: Option<ErasedValue>,
        new_layer: Option<ErasedValue>,
        priority: Priority,
    ) {
        let (new_priority, new_effective) = self.styled_effective(property.id(), registration);
        if old_effective == new_effective {
            self.raise(
                registration,
                PropertyChangedEvent::new(
                    self.clone(),
                    property,
                    old_layer,
                    new_layer,
                    priority,
                    false,
                ),
            );
            return;
        }

        self.raise(
            registration,
            PropertyChangedEvent::new(
                self.clone(),
                property,
                Some(old_effective.clone()),
                Some(new_effective.clone()),
                new_priority,
                true,
            ),
        );
        if registration.inherits() {
            self.propagate_inherited(property, registration, &old_effective, &new_effective);
        }
    }

    /// Raises an inherited change here and in every descendant without its
    /// own value.
    fn inherited_changed(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        old: &ErasedValue,
        new: &ErasedValue,
    ) {
        self.raise(
            registration,
            PropertyChangedEvent::new(
                self.clone(),
                property,
                Some(old.clone()),
                Some(new.clone()),
                Priority::Inherited,
                true,
            ),
        );
        self.propagate_inherited(property, registration, old, new);
    }

    fn propagate_inherited(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        old: &ErasedValue,
        new: &ErasedValue,
    ) {
        let children: SmallVec<[Self; 4]> = {
            let mut state = self.inner.state.borrow_mut();
            state.children.retain(|child| child.strong_count() > 0);
            state
                .children
                .iter()
                .filter_map(Weak::upgrade)
                .map(|inner| Self { inner })
                .collect()
        };
        for child in children {
            if !child.has_own_styled_value(property.id()) {
                child.inherited_changed(property, registration, old, new);
            }
        }
    }

    /// Writes a direct property's field, raising an event if the value changed.
    pub(crate) fn set_direct(
        &self,
        property: AnyProperty,
        registration: &PropertyRegistration,
        value: ErasedValue,
    ) {
        let id = property.id();
        let value = registration.coerce_erased(value);
        let old = self
            .inner
            .state
            .borrow_mut()
            .fields
            .set(id, value.clone())
            .unwrap_or_else(|| registration.default_erased());
        if old != value {
            self.raise(
                registration,
                PropertyChangedEvent::new(
                    self.clone(),
                    property,
                    Some(old),
                    Some(value),
                    Priority::LocalValue,
                    true,
                ),
            );
        }
    }

    /// Resets a direct property to its default.
    pub(crate) fn clear_direct(&self, property: AnyProperty, registration: &PropertyRegistration) {
        let Some(old) = self.inner.state.borrow_mut().fields.clear(property.id()) else {
            return;
        };
        let default = registration.default_erased();
        if old != default {
            self.raise(
                registration,
                PropertyChangedEvent::new(
                    self.clone(),
                    property,
                    Some(old),
                    Some(default),
                    Priority::LocalValue,
                    true,
                ),
            );
        }
    }

    /// Delivers `event` to the class-level broadcast, then to this object's
    /// listeners.
    ///
    /// An effective change marks events for the same property that are still
    /// being delivered as outdated.
    fn raise(&self, registration: &PropertyRegistration, event: PropertyChangedEvent) {
        trace!(
            class = self.inner.class.name(),
            property = registration.name(),
            priority = %event.priority(),
            effective = event.is_effective_change(),
            "property changed"
        );

        if event.is_effective_change() {
            for pending in self.inner.in_flight.borrow().iter() {
                if pending.property() == event.property() {
                    pending.mark_outdated();
                }
            }
        }

        self.inner.in_flight.borrow_mut().push(event.clone());
        registration.changed_subject().next(event.clone());
        self.inner.changes.next(event.clone());
        self.inner
            .in_flight
            .borrow_mut()
            .retain(|pending| !pending.ptr_eq(&event));
    }
}

/// Panics if `priority` cannot hold values of a styled property.
///
/// Direct properties ignore priorities, so any priority is accepted for them.
pub(crate) fn assert_writable(property: AnyProperty, priority: Priority) {
    if property.kind() == PropertyKind::PriorityResolved {
        assert!(
            priority.is_writable(),
            "Cannot set a value at priority {priority}"
        );
    }
}

impl PartialEq for PropertyObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for PropertyObject {}

impl fmt::Debug for PropertyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("PropertyObject")
            .field("class", &self.inner.class.name())
            .field("styled_values", &state.values.len())
            .field("direct_values", &state.fields.len())
            .field("children", &state.children.len())
            .finish_non_exhaustive()
    }
}

impl WeakObject {
    /// Creates a reference that never upgrades.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the object if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<PropertyObject> {
        self.inner.upgrade().map(|inner| PropertyObject { inner })
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObject")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::StyledProperty;
    use crate::metadata::PropertyMetadataBuilder;
    use crate::observable::ObservableExt;
    use alloc::{format, vec::Vec};

    static PANEL: Class = Class::new("Panel");
    static BUTTON: Class = Class::derived("Button", &PANEL);

    struct Button;
    impl ObjectClass for Button {
        const CLASS: &'static Class = &BUTTON;
    }

    struct Panel;
    impl ObjectClass for Panel {
        const CLASS: &'static Class = &PANEL;
    }

    fn setup() -> (Rc<PropertyRegistry>, StyledProperty<f64>, StyledProperty<f64>) {
        let mut registry = PropertyRegistry::new();
        let opacity = registry.register_styled(
            &PANEL,
            "Opacity",
            PropertyMetadataBuilder::new(1.0_f64).build(),
        );
        let font_size = registry.register_styled(
            &PANEL,
            "FontSize",
            PropertyMetadataBuilder::new(12.0_f64).inherits(true).build(),
        );
        (Rc::new(registry), opacity, font_size)
    }

    fn record(object: &PropertyObject) -> Rc<RefCell<Vec<PropertyChangedEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _listener = object
            .changes()
            .subscribe_fn(move |event| sink.borrow_mut().push(event));
        seen
    }

    #[test]
    fn class_checks() {
        let (registry, _, _) = setup();
        let button = PropertyObject::of::<Button>(registry);
        assert!(button.is::<Button>());
        assert!(button.is::<Panel>());
        assert_eq!(button.class().name(), "Button");
    }

    #[test]
    fn weak_handles_stop_upgrading() {
        let (registry, _, _) = setup();
        let panel = PropertyObject::of::<Panel>(registry);
        let weak = panel.downgrade();
        assert_eq!(weak.upgrade(), Some(panel.clone()));
        drop(panel);
        assert!(weak.upgrade().is_none());
        assert!(WeakObject::new().upgrade().is_none());
    }

    #[test]
    fn inheritance_follows_parent() {
        let (registry, _, font_size) = setup();
        let parent = PropertyObject::of::<Panel>(Rc::clone(&registry));
        let child = PropertyObject::of::<Button>(registry);
        child.set_parent(Some(&parent));

        parent.set_value(font_size, 20.0, Priority::LocalValue);
        assert_eq!(child.get_value(font_size), 20.0);

        child.set_value(font_size, 9.0, Priority::LocalValue);
        parent.set_value(font_size, 30.0, Priority::LocalValue);
        assert_eq!(child.get_value(font_size), 9.0);

        child.clear_value(font_size);
        assert_eq!(child.get_value(font_size), 30.0);
    }

    #[test]
    fn parent_changes_reach_children_as_inherited_events() {
        let (registry, _, font_size) = setup();
        let parent = PropertyObject::of::<Panel>(Rc::clone(&registry));
        let child = PropertyObject::of::<Button>(registry);
        child.set_parent(Some(&parent));
        let seen = record(&child);

        parent.set_value(font_size, 20.0, Priority::LocalValue);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].priority(), Priority::Inherited);
        assert_eq!(seen[0].old_value_as::<f64>(), Some(12.0));
        assert_eq!(seen[0].new_value_as::<f64>(), Some(20.0));
        assert!(seen[0].sender().ptr_eq(&child));
    }

    #[test]
    fn reparenting_raises_inherited_changes() {
        let (registry, _, font_size) = setup();
        let parent = PropertyObject::of::<Panel>(Rc::clone(&registry));
        parent.set_value(font_size, 20.0, Priority::LocalValue);
        let child = PropertyObject::of::<Button>(registry);
        let seen = record(&child);

        child.set_parent(Some(&parent));
        assert_eq!(child.parent(), Some(parent.clone()));
        child.set_parent(None);

        let values: Vec<_> = seen
            .borrow()
            .iter()
            .map(|e| e.new_value_as::<f64>())
            .collect();
        assert_eq!(values, [Some(20.0), Some(12.0)]);
    }

    #[test]
    fn non_inheriting_properties_ignore_parent() {
        let (registry, opacity, _) = setup();
        let parent = PropertyObject::of::<Panel>(Rc::clone(&registry));
        let child = PropertyObject::of::<Button>(registry);
        child.set_parent(Some(&parent));

        parent.set_value(opacity, 0.3, Priority::LocalValue);
        assert_eq!(child.get_value(opacity), 1.0);
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn parent_cycles_are_rejected() {
        let (registry, _, _) = setup();
        let a = PropertyObject::of::<Panel>(Rc::clone(&registry));
        let b = PropertyObject::of::<Panel>(registry);
        b.set_parent(Some(&a));
        a.set_parent(Some(&b));
    }

    #[test]
    #[should_panic(expected = "share its child's property registry")]
    fn parents_must_share_the_registry() {
        let (registry, _, _) = setup();
        let (other, _, _) = setup();
        let parent = PropertyObject::of::<Panel>(other);
        let child = PropertyObject::of::<Button>(registry);
        child.set_parent(Some(&parent));
    }

    #[test]
    fn value_handle_clears_only_its_own_write() {
        let (registry, opacity, _) = setup();
        let panel = PropertyObject::of::<Panel>(registry);

        let first = panel.set_value(opacity, 0.4, Priority::Style);
        let second = panel.set_value(opacity, 0.6, Priority::Style);
        assert!(panel.set_value(opacity, 0.9, Priority::LocalValue).is_none());

        // The layer now holds the second write.
        first.unwrap().dispose();
        assert_eq!(panel.get_base_value(opacity, Priority::Style), Some(0.6));

        second.unwrap().dispose();
        assert_eq!(panel.get_base_value(opacity, Priority::Style), None);
        assert_eq!(panel.get_value(opacity), 0.9);
    }

    #[test]
    fn validation_errors_are_recorded_per_property() {
        let (registry, opacity, font_size) = setup();
        let panel = PropertyObject::of::<Panel>(registry);

        panel.set_data_validation_error(opacity.id(), Some(BindingError::SourceUnavailable));
        assert_eq!(
            panel.data_validation_error(opacity),
            Some(BindingError::SourceUnavailable)
        );
        assert_eq!(panel.data_validation_error(font_size), None);

        panel.set_data_validation_error(opacity.id(), None);
        assert_eq!(panel.data_validation_error(opacity), None);
    }

    #[test]
    fn adapters_are_cached() {
        let (registry, opacity, font_size) = setup();
        let panel = PropertyObject::of::<Panel>(registry);

        let a = panel.adapter(opacity);
        let b = panel.adapter(opacity);
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &panel.adapter(font_size)));
    }

    #[test]
    fn debug_output() {
        let (registry, opacity, _) = setup();
        let panel = PropertyObject::of::<Panel>(registry);
        panel.set_value(opacity, 0.5, Priority::LocalValue);
        let debug = format!("{panel:?}");
        assert!(debug.contains("Panel"));
        assert!(debug.contains("styled_values: 1"));
    }
}
