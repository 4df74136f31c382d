//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::Func;
use smallvec::SmallVec;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// One slot of a dispatch table: a method or requirement name, and the
/// function that implements it (if the slot has been filled in).
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct TableEntry {
    name: String,
    target: Option<Func>,
}

impl TableEntry {
    /// Creates an entry for `name`, implemented by `target`.
    pub fn new(name: impl Into<String>, target: Option<Func>) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    /// Gets the method or requirement name of the slot.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the implementing function, if there is one.
    #[inline]
    pub fn target(&self) -> Option<Func> {
        self.target
    }
}

type Entries = SmallVec<[TableEntry; 4]>;

/// Describes virtual dispatch for one class.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct VTable {
    class: String,
    entries: Entries,
}

impl VTable {
    /// Creates an empty v-table for `class`.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            entries: Entries::new(),
        }
    }

    /// Adds a method slot, builder-style.
    pub fn with_entry(mut self, method: impl Into<String>, target: Option<Func>) -> Self {
        self.entries.push(TableEntry::new(method, target));
        self
    }

    /// Gets the name of the class the table dispatches for.
    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Gets every method slot in order.
    #[inline]
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }
}

/// Describes how one type conforms to one protocol.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct WitnessTable {
    conforming_type: String,
    protocol: String,
    entries: Entries,
}

impl WitnessTable {
    /// Creates an empty witness table for the conformance `ty: protocol`.
    pub fn new(ty: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            conforming_type: ty.into(),
            protocol: protocol.into(),
            entries: Entries::new(),
        }
    }

    /// Adds a requirement slot, builder-style.
    pub fn with_entry(mut self, requirement: impl Into<String>, witness: Option<Func>) -> Self {
        self.entries.push(TableEntry::new(requirement, witness));
        self
    }

    /// Gets the type that conforms.
    #[inline]
    pub fn conforming_type(&self) -> &str {
        &self.conforming_type
    }

    /// Gets the protocol being conformed to.
    #[inline]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Gets every requirement slot in order.
    #[inline]
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }
}

/// Holds the default implementations of a protocol's requirements, used
/// by conformances that don't provide their own.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct DefaultWitnessTable {
    protocol: String,
    entries: Entries,
}

impl DefaultWitnessTable {
    /// Creates an empty default witness table for `protocol`.
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            entries: Entries::new(),
        }
    }

    /// Adds a requirement slot, builder-style.
    pub fn with_entry(mut self, requirement: impl Into<String>, witness: Option<Func>) -> Self {
        self.entries.push(TableEntry::new(requirement, witness));
        self
    }

    /// Gets the protocol the defaults belong to.
    #[inline]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Gets every requirement slot in order.
    #[inline]
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }
}

/// Gets the entries of any table kind, used by code that treats them uniformly.
pub(crate) trait DispatchTable {
    fn entries(&self) -> &[TableEntry];
}

impl DispatchTable for VTable {
    fn entries(&self) -> &[TableEntry] {
        &self.entries
    }
}

impl DispatchTable for WitnessTable {
    fn entries(&self) -> &[TableEntry] {
        &self.entries
    }
}

impl DispatchTable for DefaultWitnessTable {
    fn entries(&self) -> &[TableEntry] {
        &self.entries
    }
}
