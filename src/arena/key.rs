//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022 Evan Cox <evanacox00@gmail.com>. All rights reserved.      //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

// 0 is never handed out, reserved handles use it as their owner
static NEXT_MODULE_ID: AtomicU32 = AtomicU32::new(1);

/// Identifies a single [`Module`](crate::ir::Module) for the lifetime of the process.
///
/// Every entity handle carries the id of the module that created it, so a
/// handle that leaks from one module into another is caught the first time
/// it's used instead of silently referring to an unrelated entity.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct ModuleId(u32);

impl ModuleId {
    /// Allocates a fresh id that has never been returned before in this process.
    pub fn fresh() -> Self {
        let id = NEXT_MODULE_ID.fetch_add(1, Ordering::Relaxed);

        assert_ne!(id, u32::MAX, "ran out of module ids");

        Self(id)
    }

    /// The id used by reserved (null) handles. No module ever has this id.
    #[inline]
    pub const fn reserved() -> Self {
        Self(0)
    }

    /// Gets the raw value of the id.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Models a handle that refers to one entity of one module.
///
/// Note that in most cases this trait should not be implemented directly,
/// prefer to use the [`entity_ref`](crate::entity_ref) macro that provides
/// the implementation for you.
pub trait EntityRef: Copy + Eq + Hash + Debug {
    /// Creates a handle for the entity stored at `index` in the module `owner`.
    ///
    /// Implementations panic if `index` is not representable, the last
    /// representable index is reserved for null handles.
    fn new(owner: ModuleId, index: usize) -> Self;

    /// Gets the module that owns the entity.
    fn owner(self) -> ModuleId;

    /// Gets the dense index of the entity inside its owner's storage.
    fn index(self) -> usize;
}

/// Creates a module-tagged handle type for an entity kind.
///
/// The generated type implements [`EntityRef`] and
/// [`Packable`](crate::utility::Packable), prints as `prefix<index>` when
/// debug-formatted, and exposes `as_raw` for code that needs to cross into
/// a lower-level representation.
///
/// ```
/// # use garnet::entity_ref;
/// # use garnet::arena::*;
/// entity_ref! {
///     /// A handle to a global variable.
///     pub struct Global = "global";
/// }
///
/// let mut map = EntityMap::new(ModuleId::fresh());
/// let g: Global = map.insert("@counter");
///
/// assert_eq!(format!("{g:?}"), "global0");
/// ```
#[macro_export]
macro_rules! entity_ref {
    ( $(#[$outer:meta])* $vis:vis struct $name:ident = $prefix:literal; $($rest:tt)* ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name {
            owner: $crate::arena::ModuleId,
            index: u32,
        }

        impl $name {
            /// Returns the `(module, index)` pair that this handle is made of.
            ///
            /// This is the escape hatch for code that bridges into a lower-level
            /// representation, the pair is stable for the lifetime of the module.
            #[inline]
            $vis fn as_raw(self) -> (u32, u32) {
                (self.owner.as_u32(), self.index)
            }
        }

        impl $crate::arena::EntityRef for $name {
            #[inline]
            fn new(owner: $crate::arena::ModuleId, index: usize) -> Self {
                let index = u32::try_from(index)
                    .ok()
                    .filter(|i| *i != u32::MAX)
                    .expect("index is not representable with entity handle");

                Self { owner, index }
            }

            #[inline]
            fn owner(self) -> $crate::arena::ModuleId {
                self.owner
            }

            #[inline]
            fn index(self) -> usize {
                self.index as usize
            }
        }

        impl $crate::utility::Packable for $name {
            #[inline]
            fn reserved() -> Self {
                Self {
                    owner: $crate::arena::ModuleId::reserved(),
                    index: u32::MAX,
                }
            }

            #[inline]
            fn is_reserved(&self) -> bool {
                self.index == u32::MAX
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}{}", $prefix, self.index)
            }
        }

        $crate::entity_ref!($($rest)*);
    };

    () => {}
}
