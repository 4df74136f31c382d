//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Defines the passes that ship with the pass infrastructure.
//!
//! Neither of these actually modify the module: the verifier only checks it
//! and the writer only prints it. They exist so that any pipeline can be
//! checked and inspected between the passes that do transform things.

mod printers;
mod verify;

pub use printers::*;
pub use verify::*;
