//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use bitflags::bitflags;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// Models the different attributes that can be on a given function.
    #[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
    #[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
    pub struct FunctionFlags: u32 {
        /// The function has a body, as opposed to only being declared.
        const IS_DEFINITION = 1;
        /// The function contains stack allocations that a buffer overflow could
        /// reach, code generation must emit a stack protector for it.
        const NEEDS_STACK_PROTECTION = 2;
        /// The body may be inlined into and serialized for other modules.
        const TRANSPARENT = 4;
    }
}

impl Default for FunctionFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// The mutable part of a function: its attributes and its body.
///
/// A function's name and identity are owned by the [`Module`](crate::ir::Module)
/// and never change, everything in here may be rewritten by a pass that holds
/// the function's transformation session.
///
/// The body is an ordered list of instruction records. This layer does not
/// interpret them, it only keeps them in order for the passes that do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub struct Function {
    flags: FunctionFlags,
    body: Vec<String>,
}

impl Function {
    /// Creates a bodiless function declaration.
    pub fn declaration() -> Self {
        Self::default()
    }

    /// Creates a function definition with a given body.
    pub fn definition<I, S>(body: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: FunctionFlags::IS_DEFINITION,
            body: body.into_iter().map(Into::into).collect(),
        }
    }

    /// Gets the attributes of the function.
    #[inline]
    pub fn flags(&self) -> FunctionFlags {
        self.flags
    }

    /// Gets a mutable reference to the attributes of the function.
    #[inline]
    pub fn flags_mut(&mut self) -> &mut FunctionFlags {
        &mut self.flags
    }

    /// Checks if the function has a body.
    #[inline]
    pub fn is_definition(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_DEFINITION)
    }

    /// Checks if the function has been marked as needing stack protection.
    #[inline]
    pub fn needs_stack_protection(&self) -> bool {
        self.flags.contains(FunctionFlags::NEEDS_STACK_PROTECTION)
    }

    /// Gets the instructions of the function in order.
    #[inline]
    pub fn body(&self) -> &[String] {
        &self.body
    }

    /// Appends an instruction to the end of the body. Appending to a
    /// declaration turns it into a definition.
    pub fn push_instruction(&mut self, inst: impl Into<String>) {
        self.flags.insert(FunctionFlags::IS_DEFINITION);
        self.body.push(inst.into());
    }

    /// Replaces the whole body, returning the old one.
    ///
    /// An empty body turns the function back into a declaration.
    pub fn replace_body<I, S>(&mut self, body: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let new: Vec<String> = body.into_iter().map(Into::into).collect();

        self.flags.set(FunctionFlags::IS_DEFINITION, !new.is_empty());

        std::mem::replace(&mut self.body, new)
    }
}
