//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The in-memory program model that passes operate on.
//!
//! A [`Module`] owns every [`Function`], [`VTable`], [`WitnessTable`] and
//! [`DefaultWitnessTable`] of one compilation unit. Everything else refers to
//! those entities through small `Copy` handles ([`Func`], [`VTableRef`],
//! [`WitnessTableRef`], [`DefaultWitnessTableRef`]).

mod entities;
mod function;
mod module;
mod tables;
mod writer;

pub use crate::arena::ModuleId;
pub use entities::*;
pub use function::*;
pub use module::*;
pub use tables::{DefaultWitnessTable, TableEntry, VTable, WitnessTable};
pub use writer::stringify_module;

pub(crate) use tables::DispatchTable;
