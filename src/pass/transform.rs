//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022 Evan Cox <evanacox00@gmail.com>. All rights reserved.      //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::pass::{FunctionPassContext, ModulePassContext, PassError};
use std::fmt;

/// Models a pass that works over an entire module.
///
/// The pass only ever sees the module through a [`ModulePassContext`], any
/// mutation has to go through [`ModulePassContext::transform`].
pub trait ModulePass {
    /// The name of the pass, used for logging and error reporting.
    fn name(&self) -> &str;

    /// Runs the pass over the module behind `ctx`.
    ///
    /// Returning an `Err` stops the pipeline the pass is part of. Whatever the
    /// pass already committed stays committed.
    fn run(&mut self, ctx: &ModulePassContext<'_>) -> Result<(), PassError>;
}

/// Models a pass that works over a single function at a time.
///
/// These are run inside of an already-open transformation session, see
/// [`FunctionToModulePassAdapter`](crate::pass::FunctionToModulePassAdapter).
pub trait FunctionPass {
    /// The name of the pass, used for logging and error reporting.
    fn name(&self) -> &str;

    /// Runs the pass over the function behind `ctx`.
    fn run(&mut self, ctx: &mut FunctionPassContext<'_>) -> Result<(), PassError>;
}

impl<T: ModulePass + ?Sized> ModulePass for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&mut self, ctx: &ModulePassContext<'_>) -> Result<(), PassError> {
        (**self).run(ctx)
    }
}

impl<T: FunctionPass + ?Sized> FunctionPass for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&mut self, ctx: &mut FunctionPassContext<'_>) -> Result<(), PassError> {
        (**self).run(ctx)
    }
}

/// A module pass made out of a name and a closure. See [`module_pass`].
pub struct ClosureModulePass<F> {
    name: String,
    body: F,
}

impl<F> ModulePass for ClosureModulePass<F>
where
    F: FnMut(&ModulePassContext<'_>) -> Result<(), PassError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, ctx: &ModulePassContext<'_>) -> Result<(), PassError> {
        (self.body)(ctx)
    }
}

impl<F> fmt::Debug for ClosureModulePass<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureModulePass")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A function pass made out of a name and a closure. See [`function_pass`].
pub struct ClosureFunctionPass<F> {
    name: String,
    body: F,
}

impl<F> FunctionPass for ClosureFunctionPass<F>
where
    F: FnMut(&mut FunctionPassContext<'_>) -> Result<(), PassError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, ctx: &mut FunctionPassContext<'_>) -> Result<(), PassError> {
        (self.body)(ctx)
    }
}

impl<F> fmt::Debug for ClosureFunctionPass<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureFunctionPass")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Wraps a closure into a [`ModulePass`].
///
/// ```
/// # use garnet::ir::Module;
/// # use garnet::options::Options;
/// # use garnet::pass::*;
/// let mut module = Module::new("m");
/// let f = module.declare_function("f");
/// let options = Options::default().with_enable_stack_protection(true);
///
/// let mut pass = module_pass("stack-protection", |ctx| {
///     if !ctx.options().enable_stack_protection() {
///         return Ok(());
///     }
///
///     for func in ctx.functions() {
///         ctx.transform(func, |fctx| fctx.set_needs_stack_protection());
///     }
///
///     Ok(())
/// });
///
/// pass.run(&ModulePassContext::new(&module, &options)).unwrap();
///
/// assert!(module.function(f).needs_stack_protection());
/// ```
pub fn module_pass<F>(name: impl Into<String>, body: F) -> ClosureModulePass<F>
where
    F: FnMut(&ModulePassContext<'_>) -> Result<(), PassError>,
{
    ClosureModulePass {
        name: name.into(),
        body,
    }
}

/// Wraps a closure into a [`FunctionPass`].
pub fn function_pass<F>(name: impl Into<String>, body: F) -> ClosureFunctionPass<F>
where
    F: FnMut(&mut FunctionPassContext<'_>) -> Result<(), PassError>,
{
    ClosureFunctionPass {
        name: name.into(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Module;
    use crate::options::Options;

    #[test]
    fn closure_passes_keep_their_names() {
        let module_level = module_pass("count", |_| Ok(()));
        let function_level = function_pass("strip", |_| Ok(()));

        assert_eq!(module_level.name(), "count");
        assert_eq!(function_level.name(), "strip");
        assert_eq!(
            format!("{module_level:?}"),
            "ClosureModulePass { name: \"count\", .. }"
        );
    }

    #[test]
    fn closure_module_pass_can_keep_state() {
        let mut module = Module::new("m");
        module.declare_function("f");
        module.declare_function("g");

        let options = Options::default();
        let ctx = ModulePassContext::new(&module, &options);
        let mut seen = Vec::new();
        let mut pass = module_pass("names", |ctx| {
            seen.extend(ctx.functions().map(|f| ctx.function_name(f).to_owned()));

            Ok(())
        });

        pass.run(&ctx).unwrap();
        pass.run(&ctx).unwrap();
        drop(pass);

        assert_eq!(seen, ["f", "g", "f", "g"]);
    }

    #[test]
    fn boxed_passes_forward() {
        let mut module = Module::new("m");
        let f = module.declare_function("f");
        let options = Options::default();
        let ctx = ModulePassContext::new(&module, &options);

        let mut boxed: Box<dyn FunctionPass> = Box::new(function_pass("define", |fctx| {
            fctx.push_instruction("return");

            Ok(())
        }));

        assert_eq!(FunctionPass::name(&boxed), "define");

        ctx.transform(f, |fctx| boxed.run(fctx)).unwrap();

        assert!(module.function(f).is_definition());
    }
}
