//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use std::fmt::{Debug, Formatter, Result};

/// Helper trait for a handle type that can be packed into a [`PackedOption`].
///
/// These types reserve one value that can never be handed out by a module,
/// that value is used to distinguish between `None` and `Some`.
///
/// ```
/// # use garnet::utility::*;
/// #[derive(Copy, Clone)]
/// struct NonZero(i32);
///
/// impl Packable for NonZero {
///     fn reserved() -> Self {
///         NonZero(0)
///     }
///
///     fn is_reserved(&self) -> bool {
///         self.0 == 0
///     }
/// }
///
/// let opt = PackedOption::some(NonZero(15));
///
/// assert_eq!(opt.is_some(), true);
/// ```
pub trait Packable: Copy {
    /// Returns the reserved "null" value of the type.
    fn reserved() -> Self;

    /// Checks whether `self` is the reserved value.
    fn is_reserved(&self) -> bool;
}

/// An [`Option`]-like type for entity handles that takes up exactly as much
/// space as the handle on its own.
///
/// The "next" links of every entity chain in a module are stored as these,
/// a chain of a few thousand functions shouldn't pay double for its links.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedOption<T: Packable>(T);

impl<T: Packable> PackedOption<T> {
    /// Creates a `None` instance of `PackedOption`.
    #[inline]
    pub fn none() -> Self {
        Self(T::reserved())
    }

    /// Creates a `Some` instance of `PackedOption`.
    ///
    /// # Panics
    ///
    /// Panics if `value` is the reserved value of `T`.
    #[inline]
    pub fn some(value: T) -> Self {
        assert!(!value.is_reserved(), "cannot pack the reserved value");

        Self(value)
    }

    /// Returns `true` if the packed option is a `None` value.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.0.is_reserved()
    }

    /// Returns `true` if the packed option is a `Some` value.
    #[inline]
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Unpacks into a real [`Option`].
    #[inline]
    pub fn expand(self) -> Option<T> {
        if self.is_none() {
            None
        } else {
            Some(self.0)
        }
    }

    /// Replaces the contained value, returning whatever was there before.
    #[inline]
    pub fn replace(&mut self, value: T) -> Option<T> {
        std::mem::replace(self, Self::some(value)).expand()
    }

    /// Takes the value out, leaving `None` in its place.
    #[inline]
    pub fn take(&mut self) -> Option<T> {
        std::mem::replace(self, Self::none()).expand()
    }
}

impl<T: Packable> Default for PackedOption<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: Packable> From<Option<T>> for PackedOption<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::some(v),
            None => Self::none(),
        }
    }
}

impl<T: Packable> From<PackedOption<T>> for Option<T> {
    fn from(value: PackedOption<T>) -> Self {
        value.expand()
    }
}

impl<T: Packable + Debug> Debug for PackedOption<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.expand() {
            Some(v) => write!(f, "Some({v:?})"),
            None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_eq_size;

    #[derive(Copy, Clone, Debug, PartialEq)]
    struct Slot(u32);

    impl Packable for Slot {
        fn reserved() -> Self {
            Slot(u32::MAX)
        }

        fn is_reserved(&self) -> bool {
            self.0 == u32::MAX
        }
    }

    #[test]
    fn packed_is_same_size() {
        assert_eq_size!(PackedOption<Slot>, Slot);
    }

    #[test]
    fn expand_roundtrip() {
        let mut opt = PackedOption::some(Slot(3));

        assert_eq!(opt.expand(), Some(Slot(3)));
        assert_eq!(opt.replace(Slot(4)), Some(Slot(3)));
        assert_eq!(opt.take(), Some(Slot(4)));
        assert!(opt.is_none());
        assert_eq!(format!("{opt:?}"), "None");
    }

    #[test]
    #[should_panic(expected = "cannot pack the reserved value")]
    fn reserved_cannot_be_packed() {
        let _ = PackedOption::some(Slot(u32::MAX));
    }
}
