//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The module-level pass infrastructure.
//!
//! A module pass sees a module through a [`ModulePassContext`]. It can read
//! everything (walk the functions, the witness tables and the default witness
//! tables in module order, index into the v-tables) but it can only mutate a
//! function by calling [`ModulePassContext::transform`]. That opens a
//! transformation session for exactly one function, hands the body of the
//! transformation a [`FunctionPassContext`] and closes the session again once
//! the body is done, however it finishes.
//!
//! At most one session can be open per module. Trying to open a second one
//! from inside a transformation is a bug in the pass and panics.
//!
//! ```
//! # use garnet::ir::Module;
//! # use garnet::options::Options;
//! # use garnet::pass::*;
//! let mut module = Module::new("main");
//! let f = module.define_function("f", ["%0 = address_to_pointer %x", "return"]);
//! let g = module.define_function("g", ["return"]);
//!
//! let mut pm = PassManager::new();
//! pm.add_function_pass(function_pass("protect", |fctx| {
//!     if fctx.function().body().iter().any(|inst| inst.contains("address_to_pointer")) {
//!         fctx.set_needs_stack_protection();
//!     }
//!
//!     Ok(())
//! }));
//!
//! pm.run(&module, &Options::default()).unwrap();
//!
//! assert!(module.function(f).needs_stack_protection());
//! assert!(!module.function(g).needs_stack_protection());
//! ```

mod context;
mod error;
mod iter;
mod manager;
mod registry;
mod session;
mod transform;

pub use context::*;
pub use error::*;
pub use iter::*;
pub use manager::*;
pub use registry::*;
pub use session::SessionState;
pub use transform::*;
