// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value priorities.
//!
//! Every value written to a styled property is stored at a [`Priority`]. The
//! effective value is the one stored at the numerically lowest priority, so
//! [`Priority::Animation`] beats [`Priority::LocalValue`], which beats
//! [`Priority::Style`], and so on.

use core::fmt;

/// The priority a value is written at.
///
/// Lower discriminants take precedence. The ordering derived for this type
/// follows the discriminants, so `a < b` means "`a` wins over `b`".
///
/// [`Priority::Inherited`] and [`Priority::Unset`] are only ever *reported*
/// (in change events, or by [`PriorityStore`](crate::PriorityStore) lookups);
/// values cannot be written at them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i32)]
pub enum Priority {
    /// A running animation.
    Animation = -1,
    /// A value set directly on the object.
    #[default]
    LocalValue = 0,
    /// A style trigger, such as a pseudo-class setter.
    StyleTrigger = 1,
    /// A value applied by a control template.
    Template = 2,
    /// A style setter.
    Style = 3,
    /// The value was inherited from the parent object.
    Inherited = 4,
    /// No value is set; the property default applies.
    Unset = i32::MAX,
}

/// The priority used when a caller does not choose one.
pub const DEFAULT_PRIORITY: Priority = Priority::LocalValue;

impl Priority {
    /// Returns `true` if a value at `self` wins over a value at `other`.
    ///
    /// ```rust
    /// use understory_binding::Priority;
    ///
    /// assert!(Priority::LocalValue.takes_precedence_over(Priority::Style));
    /// assert!(!Priority::Style.takes_precedence_over(Priority::LocalValue));
    /// assert!(!Priority::Style.takes_precedence_over(Priority::Style));
    /// ```
    #[must_use]
    #[inline]
    pub const fn takes_precedence_over(self, other: Self) -> bool {
        (self as i32) < (other as i32)
    }

    /// Returns `true` if values can be stored at this priority.
    #[must_use]
    #[inline]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::Inherited | Self::Unset)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Animation => "Animation",
            Self::LocalValue => "LocalValue",
            Self::StyleTrigger => "StyleTrigger",
            Self::Template => "Template",
            Self::Style => "Style",
            Self::Inherited => "Inherited",
            Self::Unset => "Unset",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn lower_discriminant_wins() {
        assert!(Priority::Animation < Priority::LocalValue);
        assert!(Priority::LocalValue < Priority::StyleTrigger);
        assert!(Priority::Template < Priority::Style);
        assert!(Priority::Style < Priority::Inherited);
        assert!(Priority::Inherited < Priority::Unset);

        assert!(Priority::Animation.takes_precedence_over(Priority::LocalValue));
        assert!(!Priority::Unset.takes_precedence_over(Priority::Style));
    }

    #[test]
    fn default_is_local_value() {
        assert_eq!(Priority::default(), Priority::LocalValue);
        assert_eq!(DEFAULT_PRIORITY, Priority::LocalValue);
    }

    #[test]
    fn writable_priorities() {
        assert!(Priority::Animation.is_writable());
        assert!(Priority::Style.is_writable());
        assert!(!Priority::Inherited.is_writable());
        assert!(!Priority::Unset.is_writable());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Priority::StyleTrigger), "StyleTrigger");
    }
}
