// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property identification types.
//!
//! This module provides [`PropertyId`] for runtime property identification,
//! the [`PropertyKind`] tag, the typed handles [`StyledProperty<T>`] and
//! [`DirectProperty<T>`], the closed typed union [`Property<T>`] over both,
//! and the untyped [`AnyProperty`] used by kind-agnostic APIs.

use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A runtime property identifier.
///
/// This is a lightweight handle (u16) that uniquely identifies a property
/// within a [`PropertyRegistry`](crate::PropertyRegistry).
///
/// ```rust
/// use understory_binding::PropertyId;
///
/// let id = PropertyId::new(42);
/// assert_eq!(id.index(), 42);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a new property ID from the given index.
    ///
    /// This is typically called by the registry rather than directly.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this property ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}

/// How a property stores its value.
///
/// Fixed at registration; routing decisions derived from it never go stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// The effective value is chosen from a stack of values keyed by
    /// [`Priority`](crate::Priority).
    PriorityResolved,
    /// A single backing field with no priority layering.
    BackingField,
}

/// A type-safe handle to a priority-resolved property.
///
/// Values are stored per [`Priority`](crate::Priority); the effective value is
/// the highest-precedence one, falling back to the inherited value (if the
/// property inherits) and then the registered default.
pub struct StyledProperty<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

/// A type-safe handle to a backing-field property.
///
/// The object stores a single value; writes ignore priority and the last one
/// wins.
pub struct DirectProperty<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

macro_rules! impl_handle {
    ($name:ident, $kind:ident, $variant:ident) => {
        impl<T> $name<T> {
            /// Creates a typed handle from a property ID.
            ///
            /// This is typically called by the registry rather than directly.
            /// The caller must ensure the ID was registered with this kind and
            /// value type; routing a mismatched handle panics.
            #[must_use]
            #[inline]
            pub const fn from_id(id: PropertyId) -> Self {
                Self {
                    id,
                    _marker: PhantomData,
                }
            }

            /// Returns the underlying property ID.
            #[must_use]
            #[inline]
            pub const fn id(self) -> PropertyId {
                self.id
            }

            /// Returns the storage kind of this handle.
            #[must_use]
            #[inline]
            pub const fn kind(self) -> PropertyKind {
                PropertyKind::$kind
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> Clone for $name<T> {
            #[inline]
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> PartialEq for $name<T> {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl<T> Eq for $name<T> {}

        impl<T> Hash for $name<T> {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("id", &self.id)
                    .field("type", &core::any::type_name::<T>())
                    .finish()
            }
        }

        impl<T> From<$name<T>> for Property<T> {
            #[inline]
            fn from(property: $name<T>) -> Self {
                Self::$variant(property)
            }
        }

        impl<T: 'static> From<$name<T>> for AnyProperty {
            #[inline]
            fn from(property: $name<T>) -> Self {
                Self {
                    id: property.id,
                    kind: PropertyKind::$kind,
                    type_id: TypeId::of::<T>(),
                    type_name: core::any::type_name::<T>(),
                }
            }
        }
    };
}

impl_handle!(StyledProperty, PriorityResolved, Styled);
impl_handle!(DirectProperty, BackingField, Direct);

/// A typed property of either kind.
///
/// Kind-agnostic typed APIs accept `impl Into<Property<T>>` and dispatch with a
/// single `match`; there is no third kind.
pub enum Property<T> {
    /// A priority-resolved property.
    Styled(StyledProperty<T>),
    /// A backing-field property.
    Direct(DirectProperty<T>),
}

impl<T> Property<T> {
    /// Returns the underlying property ID.
    #[must_use]
    #[inline]
    pub const fn id(&self) -> PropertyId {
        match self {
            Self::Styled(p) => p.id,
            Self::Direct(p) => p.id,
        }
    }

    /// Returns the storage kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> PropertyKind {
        match self {
            Self::Styled(_) => PropertyKind::PriorityResolved,
            Self::Direct(_) => PropertyKind::BackingField,
        }
    }
}

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<T> Eq for Property<T> {}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Styled(p) => fmt::Debug::fmt(p, f),
            Self::Direct(p) => fmt::Debug::fmt(p, f),
        }
    }
}

impl<T: 'static> From<Property<T>> for AnyProperty {
    #[inline]
    fn from(property: Property<T>) -> Self {
        match property {
            Property::Styled(p) => p.into(),
            Property::Direct(p) => p.into(),
        }
    }
}

/// An untyped property handle.
///
/// Carries the ID, the [`PropertyKind`] and the value [`TypeId`], so it can be
/// routed without the registry and converted back into a typed handle with
/// [`AnyProperty::downcast`].
///
/// ```rust
/// use understory_binding::{AnyProperty, Property, PropertyKind, StyledProperty, PropertyId};
///
/// let opacity: StyledProperty<f64> = StyledProperty::from_id(PropertyId::new(3));
/// let any = AnyProperty::from(opacity);
/// assert_eq!(any.kind(), PropertyKind::PriorityResolved);
/// assert!(matches!(any.downcast::<f64>(), Some(Property::Styled(p)) if p == opacity));
/// assert!(any.downcast::<i32>().is_none());
/// ```
#[derive(Copy, Clone)]
pub struct AnyProperty {
    id: PropertyId,
    kind: PropertyKind,
    type_id: TypeId,
    type_name: &'static str,
}

impl AnyProperty {
    pub(crate) const fn from_parts(
        id: PropertyId,
        kind: PropertyKind,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Self {
        Self {
            id,
            kind,
            type_id,
            type_name,
        }
    }

    /// Returns the underlying property ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }

    /// Returns the storage kind.
    #[must_use]
    #[inline]
    pub const fn kind(self) -> PropertyKind {
        self.kind
    }

    /// Returns the [`TypeId`] of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_id(self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the property's value type, for diagnostics.
    #[must_use]
    #[inline]
    pub const fn type_name(self) -> &'static str {
        self.type_name
    }

    /// Converts to a typed handle if the value type is `T`.
    #[must_use]
    pub fn downcast<T: 'static>(self) -> Option<Property<T>> {
        if self.type_id != TypeId::of::<T>() {
            return None;
        }
        Some(match self.kind {
            PropertyKind::PriorityResolved => Property::Styled(StyledProperty::from_id(self.id)),
            PropertyKind::BackingField => Property::Direct(DirectProperty::from_id(self.id)),
        })
    }
}

impl PartialEq for AnyProperty {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AnyProperty {}

impl Hash for AnyProperty {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for AnyProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyProperty")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
