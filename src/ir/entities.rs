//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022 Evan Cox <evanacox00@gmail.com>. All rights reserved.      //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::entity_ref;

entity_ref! {
    /// A reference to a function inside of a [`Module`](crate::ir::Module).
    ///
    /// These are completely useless without the module they come from, they
    /// are just keys into its function table. The identity of a `Func` never
    /// changes while its module is alive, no matter how many passes rewrite
    /// the function's body.
    pub struct Func = "fn";

    /// A reference to a [`VTable`](crate::ir::VTable). V-tables are stored
    /// contiguously, so the index of a `VTableRef` is also its position.
    pub struct VTableRef = "vtable";

    /// A reference to a [`WitnessTable`](crate::ir::WitnessTable).
    pub struct WitnessTableRef = "wt";

    /// A reference to a [`DefaultWitnessTable`](crate::ir::DefaultWitnessTable).
    pub struct DefaultWitnessTableRef = "dwt";
}
