//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Typed, module-tagged storage for IR entities.
//!
//! Entities are stored densely in an [`EntityMap`] and referred to by small
//! `Copy` handles created with [`entity_ref`](crate::entity_ref). Entities
//! that the module keeps in a linked order additionally get threaded onto an
//! [`EntityChain`], which only stores the "next" links.
//!
//! ```
//! # use garnet::entity_ref;
//! # use garnet::arena::*;
//! entity_ref! {
//!     pub struct Table = "table";
//! }
//!
//! let owner = ModuleId::fresh();
//! let mut tables = EntityMap::new(owner);
//! let mut order = EntityChain::new(owner);
//!
//! let t1: Table = tables.insert("first");
//! let t2: Table = tables.insert("second");
//!
//! order.push_back(t2);
//! order.push_back(t1);
//!
//! assert_eq!(order.iter().collect::<Vec<_>>(), vec![t2, t1]);
//! ```

mod chain;
mod key;
mod map;

pub use chain::{ChainIter, EntityChain};
pub use key::{EntityRef, ModuleId};
pub use map::EntityMap;
