//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::stringify_module;
use crate::pass::{ModulePass, ModulePassContext, PassError};
use std::io;

/// This is a pass that writes out a textual representation of a module
/// to a given stream.
pub struct ModuleWriterPass {
    out: Box<dyn io::Write>,
}

impl ModuleWriterPass {
    /// Shorthand for a writer that prints to [`std::io::stdout`].
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Shorthand for a writer that prints to [`std::io::stderr`].
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr())
    }

    /// Creates an instance of the pass with a given writer.
    ///
    /// This writer will be where the module is printed out when the pass
    /// is run over the IR.
    pub fn with_writer<T: io::Write + 'static>(writer: T) -> Self {
        Self {
            out: Box::new(writer),
        }
    }
}

impl ModulePass for ModuleWriterPass {
    fn name(&self) -> &str {
        "print-module"
    }

    fn run(&mut self, ctx: &ModulePassContext<'_>) -> Result<(), PassError> {
        let text = stringify_module(ctx.module());

        self.out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|err| PassError::failed("print-module", format!("unable to write module: {err}")))
    }
}
