// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object sparse property storage.
//!
//! This module provides [`PriorityStore`] for styled properties, which keeps one
//! value per (property, priority) layer, and [`FieldStore`] for direct
//! properties, which keeps a single slot per property.
//!
//! # Implementation
//!
//! Both stores use a sorted vector with binary search rather than a hash map,
//! with the first few entries stored inline via `SmallVec`. Most objects only
//! set a handful of properties, so lookups stay in one cache line and no
//! allocation happens in the common case.
//!
//! The stores are value containers only. Defaults, inheritance and change
//! notification belong to [`PropertyObject`](crate::PropertyObject).

use smallvec::SmallVec;

use crate::id::PropertyId;
use crate::priority::Priority;
use crate::value::ErasedValue;

/// Default inline capacity for property entries.
///
/// Most UI objects have fewer than 8 non-default values set,
/// so this avoids heap allocation in the common case.
const INLINE_CAPACITY: usize = 8;

#[derive(Clone, Debug)]
struct Entry {
    id: PropertyId,
    priority: Priority,
    value: ErasedValue,
    token: u64,
}

/// Layered storage for styled properties.
///
/// Entries are sorted by `(PropertyId, Priority)`, so the first entry for a
/// property is its winning value.
///
/// # Example
///
/// ```rust
/// use understory_binding::{ErasedValue, Priority, PriorityStore, PropertyId};
///
/// let opacity = PropertyId::new(0);
/// let mut store = PriorityStore::new();
///
/// store.set(opacity, Priority::Style, ErasedValue::new(0.2_f64), 1);
/// store.set(opacity, Priority::LocalValue, ErasedValue::new(0.5_f64), 2);
///
/// let (priority, value) = store.effective(opacity).unwrap();
/// assert_eq!(priority, Priority::LocalValue);
/// assert_eq!(value.downcast_ref::<f64>(), Some(&0.5));
///
/// store.clear(opacity, Priority::LocalValue);
/// assert_eq!(store.effective(opacity).unwrap().0, Priority::Style);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PriorityStore {
    entries: SmallVec<[Entry; INLINE_CAPACITY]>,
}

impl PriorityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no values are stored.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of stored layers across all properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the property IDs that have at least one stored layer.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        let mut last = None;
        self.entries.iter().filter_map(move |entry| {
            if last == Some(entry.id) {
                None
            } else {
                last = Some(entry.id);
                Some(entry.id)
            }
        })
    }

    /// The contiguous entries for `id`, best priority first.
    #[inline]
    fn layers(&self, id: PropertyId) -> &[Entry] {
        let start = self.entries.partition_point(|e| e.id < id);
        let end = start + self.entries[start..].partition_point(|e| e.id == id);
        &self.entries[start..end]
    }

    #[inline]
    fn find(&self, id: PropertyId, priority: Priority) -> Result<usize, usize> {
        self.entries
            .binary_search_by_key(&(id, priority), |e| (e.id, e.priority))
    }

    /// Returns the winning layer for a property, if any is stored.
    #[must_use]
    pub fn effective(&self, id: PropertyId) -> Option<(Priority, &ErasedValue)> {
        self.layers(id).first().map(|e| (e.priority, &e.value))
    }

    /// Returns the best stored layer at `max` or any weaker priority.
    ///
    /// Layers that beat `max` are skipped.
    #[must_use]
    pub fn base(&self, id: PropertyId, max: Priority) -> Option<(Priority, &ErasedValue)> {
        self.layers(id)
            .iter()
            .find(|e| e.priority >= max)
            .map(|e| (e.priority, &e.value))
    }

    /// Returns the value stored at exactly `priority`.
    #[must_use]
    pub fn get(&self, id: PropertyId, priority: Priority) -> Option<&ErasedValue> {
        self.find(id, priority).ok().map(|idx| &self.entries[idx].value)
    }

    /// Returns the write token of the value stored at `priority`.
    ///
    /// Tokens let a writer tell whether the layer still holds its own value.
    #[must_use]
    pub fn token_at(&self, id: PropertyId, priority: Priority) -> Option<u64> {
        self.find(id, priority).ok().map(|idx| self.entries[idx].token)
    }

    /// Stores `value` at `priority`, stamped with `token`.
    ///
    /// Returns the value previously stored at that layer.
    ///
    /// # Panics
    ///
    /// Panics if `priority` is [`Priority::Inherited`] or [`Priority::Unset`].
    pub fn set(
        &mut self,
        id: PropertyId,
        priority: Priority,
        value: ErasedValue,
        token: u64,
    ) -> Option<ErasedValue> {
        assert!(
            priority.is_writable(),
            "Cannot store a value at priority {priority}"
        );
        match self.find(id, priority) {
            Ok(idx) => {
                let entry = &mut self.entries[idx];
                entry.token = token;
                Some(core::mem::replace(&mut entry.value, value))
            }
            Err(idx) => {
                self.entries.insert(
                    idx,
                    Entry {
                        id,
                        priority,
                        value,
                        token,
                    },
                );
                None
            }
        }
    }

    /// Removes the value stored at `priority`.
    ///
    /// Returns the removed value.
    pub fn clear(&mut self, id: PropertyId, priority: Priority) -> Option<ErasedValue> {
        self.find(id, priority)
            .ok()
            .map(|idx| self.entries.remove(idx).value)
    }
}

/// Single-slot storage for direct properties.
///
/// ```rust
/// use understory_binding::{ErasedValue, FieldStore, PropertyId};
///
/// let mut fields = FieldStore::new();
/// let id = PropertyId::new(4);
///
/// assert!(fields.set(id, ErasedValue::new(1_u32)).is_none());
/// assert_eq!(fields.set(id, ErasedValue::new(2_u32)), Some(ErasedValue::new(1_u32)));
/// assert_eq!(fields.get(id), Some(&ErasedValue::new(2_u32)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FieldStore {
    entries: SmallVec<[(PropertyId, ErasedValue); INLINE_CAPACITY]>,
}

impl FieldStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no fields hold a value.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of fields holding a value.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    /// Returns the stored value, if the field has been written.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.find(id).ok().map(|idx| &self.entries[idx].1)
    }

    /// Stores `value`, returning the previous one.
    pub fn set(&mut self, id: PropertyId, value: ErasedValue) -> Option<ErasedValue> {
        match self.find(id) {
            Ok(idx) => Some(core::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (id, value));
                None
            }
        }
    }

    /// Forgets the stored value, returning it.
    pub fn clear(&mut self, id: PropertyId) -> Option<ErasedValue> {
        self.find(id).ok().map(|idx| self.entries.remove(idx).1)
    }
}
