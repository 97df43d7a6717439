// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Object classes.
//!
//! Every [`PropertyObject`](crate::PropertyObject) has a [`Class`]. Classes form
//! a single-inheritance chain, which is what class handlers use to decide
//! whether an event's sender is "a `Button`" (including subclasses of
//! `Button`). Classes are declared as `static`s and compared by address.
//!
//! ```rust
//! use understory_binding::{Class, ObjectClass};
//!
//! static CONTROL: Class = Class::new("Control");
//! static BUTTON: Class = Class::derived("Button", &CONTROL);
//!
//! struct Button;
//! impl ObjectClass for Button {
//!     const CLASS: &'static Class = &BUTTON;
//! }
//!
//! assert!(Button::CLASS.is_subclass_of(&CONTROL));
//! assert!(!CONTROL.is_subclass_of(&BUTTON));
//! ```

use core::fmt;

/// A statically declared object class.
pub struct Class {
    name: &'static str,
    base: Option<&'static Self>,
}

impl Class {
    /// Declares a root class.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name, base: None }
    }

    /// Declares a class derived from `base`.
    #[must_use]
    pub const fn derived(name: &'static str, base: &'static Self) -> Self {
        Self {
            name,
            base: Some(base),
        }
    }

    /// Returns the class name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the base class, if any.
    #[must_use]
    #[inline]
    pub fn base(&self) -> Option<&'static Self> {
        self.base
    }

    /// Returns `true` if `self` is `other` or derives from it.
    #[must_use]
    pub fn is_subclass_of(&self, other: &Self) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if core::ptr::eq(class, other) {
                return true;
            }
            current = class.base;
        }
        false
    }

    /// Iterates `self` and then each base class up to the root.
    pub fn ancestry(&'static self) -> impl Iterator<Item = &'static Self> {
        core::iter::successors(Some(self), |class| class.base)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("base", &self.base.map(|b| b.name))
            .finish()
    }
}

/// A marker type naming a [`Class`].
///
/// Implemented by zero-sized types so class handlers can be written as
/// `add_class_handler::<Button, _, _>(...)`.
pub trait ObjectClass: 'static {
    /// The class this type names.
    const CLASS: &'static Class;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    static VISUAL: Class = Class::new("Visual");
    static CONTROL: Class = Class::derived("Control", &VISUAL);
    static BUTTON: Class = Class::derived("Button", &CONTROL);
    static LABEL: Class = Class::derived("Label", &CONTROL);

    #[test]
    fn subclass_checks() {
        assert!(BUTTON.is_subclass_of(&BUTTON));
        assert!(BUTTON.is_subclass_of(&CONTROL));
        assert!(BUTTON.is_subclass_of(&VISUAL));
        assert!(!BUTTON.is_subclass_of(&LABEL));
        assert!(!VISUAL.is_subclass_of(&CONTROL));
    }

    #[test]
    fn same_name_is_not_same_class() {
        static OTHER_BUTTON: Class = Class::new("Button");
        assert!(!OTHER_BUTTON.is_subclass_of(&BUTTON));
    }

    #[test]
    fn ancestry_walks_to_root() {
        let names: Vec<_> = BUTTON.ancestry().map(Class::name).collect();
        assert_eq!(names, ["Button", "Control", "Visual"]);
    }
}
