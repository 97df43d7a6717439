// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by the erased property APIs.

use core::fmt;

use crate::id::PropertyId;

/// An invalid argument passed to an erased property operation.
///
/// Typed operations cannot produce these: their handles carry the value type,
/// and they panic (as documented) on contract violations such as routing an
/// unregistered handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyError {
    /// The property is not registered with the object's registry.
    UnknownProperty(PropertyId),
    /// A value's type does not match the property's registered value type.
    TypeMismatch {
        /// The property being written.
        property: PropertyId,
        /// The registered value type.
        expected: &'static str,
        /// The type of the supplied value.
        found: &'static str,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProperty(id) => write!(f, "{id} is not registered"),
            Self::TypeMismatch {
                property,
                expected,
                found,
            } => write!(
                f,
                "{property} holds values of type `{expected}`, not `{found}`"
            ),
        }
    }
}

impl core::error::Error for PropertyError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_messages() {
        assert_eq!(
            PropertyError::UnknownProperty(PropertyId::new(9)).to_string(),
            "PropertyId(9) is not registered"
        );
        assert_eq!(
            PropertyError::TypeMismatch {
                property: PropertyId::new(1),
                expected: "f64",
                found: "i32",
            }
            .to_string(),
            "PropertyId(1) holds values of type `f64`, not `i32`"
        );
    }
}
