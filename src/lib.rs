//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

#![deny(
    unreachable_pub,
    missing_docs,
    missing_abi,
    rust_2018_idioms,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links
)]

//! # Garnet
//!
//! The module-level pass substrate of an optimizer: a module of functions,
//! v-tables and witness tables, and the pass infrastructure that lets passes
//! read the whole module while mutating exactly one function at a time.

pub mod arena;
pub mod ir;
pub mod options;
pub mod pass;
pub mod transforms;
pub mod utility;

pub use options::Options;
