// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property metadata definitions.
//!
//! This module provides [`PropertyMetadata`] for storing property configuration
//! and [`PropertyMetadataBuilder`] for ergonomic construction.

use alloc::boxed::Box;

use crate::value::PropertyValue;

/// Callback for coercing a property value before it's stored.
///
/// This can be used to clamp values, validate ranges, etc.
/// The callback receives the proposed value and returns the coerced value.
pub type CoerceValueCallback<T> = Box<dyn Fn(T) -> T>;

/// Metadata for a property.
///
/// This contains the configuration for a property including its default value,
/// whether it inherits, whether bindings report data-validation errors to it,
/// and an optional coercion callback.
///
/// # Example
///
/// ```rust
/// use understory_binding::PropertyMetadataBuilder;
///
/// let metadata = PropertyMetadataBuilder::new(1.0_f64)
///     .inherits(true)
///     .coerce(|v: f64| v.clamp(0.0, 1.0))
///     .build();
///
/// assert_eq!(metadata.default_value(), &1.0);
/// assert!(metadata.inherits());
/// assert_eq!(metadata.coerce(3.0), 1.0);
/// ```
pub struct PropertyMetadata<T: PropertyValue> {
    default_value: T,
    inherits: bool,
    enable_data_validation: bool,
    coerce_callback: Option<CoerceValueCallback<T>>,
}

impl<T: PropertyValue> PropertyMetadata<T> {
    /// Creates new property metadata with the given default value.
    ///
    /// All other fields use their defaults:
    /// - `inherits`: `false`
    /// - `enable_data_validation`: `false`
    /// - `coerce_callback`: `None`
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            inherits: false,
            enable_data_validation: false,
            coerce_callback: None,
        }
    }

    /// Returns a reference to the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Returns whether this property inherits from parent objects.
    #[must_use]
    #[inline]
    pub fn inherits(&self) -> bool {
        self.inherits
    }

    /// Returns whether bindings should report data-validation errors.
    #[must_use]
    #[inline]
    pub fn enable_data_validation(&self) -> bool {
        self.enable_data_validation
    }

    /// Coerces a value using the coerce callback if one is set.
    #[inline]
    pub fn coerce(&self, value: T) -> T {
        if let Some(callback) = &self.coerce_callback {
            callback(value)
        } else {
            value
        }
    }

    /// Returns whether a coerce callback is set.
    #[must_use]
    #[inline]
    pub fn has_coerce_callback(&self) -> bool {
        self.coerce_callback.is_some()
    }
}

// Manual Debug impl since callbacks aren't Debug
impl<T: PropertyValue> core::fmt::Debug for PropertyMetadata<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default_value", &self.default_value)
            .field("inherits", &self.inherits)
            .field("enable_data_validation", &self.enable_data_validation)
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
pub struct PropertyMetadataBuilder<T: PropertyValue> {
    metadata: PropertyMetadata<T>,
}

impl<T: PropertyValue> core::fmt::Debug for PropertyMetadataBuilder<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyMetadataBuilder")
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl<T: PropertyValue> PropertyMetadataBuilder<T> {
    /// Creates a new builder with the given default value.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            metadata: PropertyMetadata::new(default_value),
        }
    }

    /// Sets whether this property inherits from parent objects.
    ///
    /// Only styled properties can inherit; registering an inheriting direct
    /// property panics.
    #[must_use]
    pub fn inherits(mut self, inherits: bool) -> Self {
        self.metadata.inherits = inherits;
        self
    }

    /// Sets whether bindings report data-validation errors to the target.
    #[must_use]
    pub fn enable_data_validation(mut self, enable: bool) -> Self {
        self.metadata.enable_data_validation = enable;
        self
    }

    /// Sets a callback to coerce values before they are stored.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) -> T + 'static,
    {
        self.metadata.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Builds the [`PropertyMetadata`].
    #[must_use]
    pub fn build(self) -> PropertyMetadata<T> {
        self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn metadata_defaults() {
        let metadata = PropertyMetadata::new(42_i32);
        assert_eq!(metadata.default_value(), &42);
        assert!(!metadata.inherits());
        assert!(!metadata.enable_data_validation());
        assert!(!metadata.has_coerce_callback());
        assert_eq!(metadata.coerce(7), 7);
    }

    #[test]
    fn metadata_builder() {
        let metadata = PropertyMetadataBuilder::new(100.0_f64)
            .inherits(true)
            .enable_data_validation(true)
            .build();

        assert_eq!(metadata.default_value(), &100.0);
        assert!(metadata.inherits());
        assert!(metadata.enable_data_validation());
    }

    #[test]
    fn metadata_coerce() {
        let metadata = PropertyMetadataBuilder::new(0.0_f64)
            .coerce(|v| v.clamp(0.0, 100.0))
            .build();

        assert!(metadata.has_coerce_callback());
        assert_eq!(metadata.coerce(-10.0), 0.0);
        assert_eq!(metadata.coerce(50.0), 50.0);
        assert_eq!(metadata.coerce(150.0), 100.0);
    }

    #[test]
    fn metadata_debug() {
        let metadata = PropertyMetadataBuilder::new(42_i32).inherits(true).build();

        let debug = format!("{metadata:?}");
        assert!(debug.contains("PropertyMetadata"));
        assert!(debug.contains("42"));
        assert!(debug.contains("true"));
    }
}
