//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::Module;
use crate::options::Options;
use crate::pass::*;
use crate::transforms::VerifyModulePass;
use log::debug;

/// What happened during one run of a [`PassManager`].
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct PipelineStats {
    /// The number of passes that ran to completion, not counting verification.
    pub passes_run: usize,
    /// The number of times the module was verified in between passes.
    pub verifications: usize,
    /// The number of transformation sessions that were opened.
    pub sessions_opened: usize,
}

/// Manages running a set of passes over a module.
///
/// An important note is that this is actually a module pass itself, it's a pass
/// that simply runs other passes.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn ModulePass>>,
}

impl PassManager {
    /// Creates a new, empty, pass manager.
    pub fn new() -> Self {
        Self {
            passes: Vec::default(),
        }
    }

    /// Adds a module pass to the pass manager. This pass's order is defined
    /// relative to other calls to [`Self::add_pass`] and [`Self::add_function_pass`].
    pub fn add_pass<T: ModulePass + 'static>(&mut self, pass: T) {
        self.passes.push(Box::new(pass));
    }

    /// Adds a function pass, wrapped in a [`FunctionToModulePassAdapter`].
    pub fn add_function_pass<T: FunctionPass + 'static>(&mut self, pass: T) {
        self.add_pass(FunctionToModulePassAdapter::adapt(pass));
    }

    /// Gets the names of every pass, in the order they will run.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Gets the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Checks if there are no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Runs every pass over `module` in order.
    ///
    /// The first pass that fails stops the pipeline and its error is returned,
    /// nothing after it runs. When [`Options::verify_all`] is set the module is
    /// verified after every pass, and a verification failure stops the pipeline
    /// the same way.
    pub fn run(&mut self, module: &Module, options: &Options) -> Result<PipelineStats, PassError> {
        self.run_passes(&ModulePassContext::new(module, options))
    }

    fn run_passes(&mut self, ctx: &ModulePassContext<'_>) -> Result<PipelineStats, PassError> {
        let module = ctx.module();
        let sessions_before = module.session_count();
        let mut stats = PipelineStats::default();
        let mut verifier = VerifyModulePass;

        debug!(
            "running {} pass(es) over module `{}`",
            self.passes.len(),
            module.name()
        );

        for pass in self.passes.iter_mut() {
            debug!("running pass `{}`", pass.name());

            if let Err(err) = pass.run(ctx) {
                debug!("pass `{}` failed, stopping pipeline: {err}", pass.name());

                return Err(err);
            }

            stats.passes_run += 1;

            if ctx.options().verify_all() {
                verifier.run(ctx)?;
                stats.verifications += 1;
            }
        }

        stats.sessions_opened = module.session_count() - sessions_before;

        debug!(
            "finished pipeline over module `{}`: {stats:?}",
            module.name()
        );

        Ok(stats)
    }
}

impl ModulePass for PassManager {
    fn name(&self) -> &str {
        "pass-manager"
    }

    fn run(&mut self, ctx: &ModulePassContext<'_>) -> Result<(), PassError> {
        self.run_passes(ctx).map(|_| ())
    }
}

/// Adapts a function pass to a module pass that runs the given
/// function pass over every function in the module.
///
/// Functions are visited in module order, each one in its own transformation
/// session. The first function the pass fails on stops the walk.
pub struct FunctionToModulePassAdapter {
    pass: Box<dyn FunctionPass + 'static>,
}

impl FunctionToModulePassAdapter {
    /// Adapts a given pass into a [`FunctionToModulePassAdapter`] that can then
    /// be used as a module pass.
    pub fn adapt<T: FunctionPass + 'static>(pass: T) -> Self {
        Self {
            pass: Box::new(pass),
        }
    }
}

impl ModulePass for FunctionToModulePassAdapter {
    fn name(&self) -> &str {
        self.pass.name()
    }

    fn run(&mut self, ctx: &ModulePassContext<'_>) -> Result<(), PassError> {
        for func in ctx.functions() {
            ctx.transform(func, |fctx| self.pass.run(fctx))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Func, WitnessTable};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn stack_protection() -> impl ModulePass {
        module_pass("stack-protection", |ctx| {
            if !ctx.options().enable_stack_protection() {
                return Ok(());
            }

            for func in ctx.functions() {
                let unsafe_access = ctx
                    .function(func)
                    .body()
                    .iter()
                    .any(|inst| inst.contains("address_to_pointer"));

                if unsafe_access {
                    ctx.transform(func, |fctx| fctx.set_needs_stack_protection());
                }
            }

            Ok(())
        })
    }

    fn sample() -> (Module, [Func; 3]) {
        let mut module = Module::new("sample");
        let a = module.define_function("a", ["%0 = address_to_pointer %x", "return"]);
        let b = module.define_function("b", ["return"]);
        let c = module.declare_function("c");

        (module, [a, b, c])
    }

    #[test]
    fn pipeline_runs_in_order() {
        let (module, _) = sample();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut pm = PassManager::new();

        for name in ["first", "second", "third"] {
            let order = Rc::clone(&order);

            pm.add_pass(module_pass(name, move |_| {
                order.borrow_mut().push(name);

                Ok(())
            }));
        }

        let stats = pm.run(&module, &Options::default()).unwrap();

        assert_eq!(pm.pass_names(), ["first", "second", "third"]);
        assert_eq!(*order.borrow(), ["first", "second", "third"]);
        assert_eq!(stats.passes_run, 3);
        assert_eq!(stats.sessions_opened, 0);
    }

    #[test]
    fn stack_protection_respects_options() {
        let (module, [a, b, c]) = sample();
        let mut pm = PassManager::new();
        pm.add_pass(stack_protection());

        pm.run(&module, &Options::default()).unwrap();
        assert!(!module.function(a).needs_stack_protection());

        let enabled = Options::default().with_enable_stack_protection(true);
        let stats = pm.run(&module, &enabled).unwrap();

        assert!(module.function(a).needs_stack_protection());
        assert!(!module.function(b).needs_stack_protection());
        assert!(!module.function(c).needs_stack_protection());
        assert_eq!(stats.sessions_opened, 1);
    }

    #[test]
    fn function_passes_visit_every_function_once() {
        let (module, [a, b, c]) = sample();
        let visited = Rc::new(RefCell::new(Vec::new()));
        let mut pm = PassManager::new();

        {
            let visited = Rc::clone(&visited);

            pm.add_function_pass(function_pass("record", move |fctx| {
                assert_eq!(fctx.session_state(), SessionState::Open(fctx.func()));
                visited.borrow_mut().push(fctx.func());

                Ok(())
            }));
        }

        let stats = pm.run(&module, &Options::default()).unwrap();

        assert_eq!(pm.pass_names(), ["record"]);
        assert_eq!(*visited.borrow(), [a, b, c]);
        assert_eq!(stats.sessions_opened, 3);
        assert_eq!(module.transforming(), None);
    }

    #[test]
    fn first_failure_stops_pipeline() {
        let (module, [a, b, _]) = sample();
        let mut pm = PassManager::new();
        let ran_after = Rc::new(RefCell::new(false));

        pm.add_function_pass(function_pass("fail-on-b", move |fctx| {
            if fctx.name() == "b" {
                return Err(PassError::failed("fail-on-b", "b is not allowed"));
            }

            fctx.push_instruction("strong_retain %0");

            Ok(())
        }));

        {
            let ran_after = Rc::clone(&ran_after);

            pm.add_pass(module_pass("after", move |_| {
                *ran_after.borrow_mut() = true;

                Ok(())
            }));
        }

        let err = pm.run(&module, &Options::default()).unwrap_err();

        assert_eq!(err.to_string(), "pass `fail-on-b` failed: b is not allowed");
        assert!(!*ran_after.borrow());
        assert_eq!(module.transforming(), None);

        // the change to `a` happened before the failure and stays
        assert_eq!(module.function(a).body().len(), 3);
        assert_eq!(module.function(b).body().len(), 1);
    }

    #[test]
    fn verify_all_checks_after_every_pass() {
        let (module, _) = sample();
        let mut pm = PassManager::new();
        pm.add_pass(stack_protection());
        pm.add_function_pass(function_pass("noop", |_| Ok(())));

        let options = Options::default().with_verify_all(true);
        let stats = pm.run(&module, &options).unwrap();

        assert_eq!(stats.passes_run, 2);
        assert_eq!(stats.verifications, 2);
    }

    #[test]
    fn verify_all_catches_foreign_references() {
        let mut other = Module::new("other");
        let foreign = other.declare_function("elsewhere");

        let mut module = Module::new("broken");
        module.add_witness_table(WitnessTable::new("Int", "P").with_entry("req", Some(foreign)));

        let mut pm = PassManager::new();
        pm.add_pass(module_pass("noop", |_| Ok(())));

        assert!(pm.run(&module, &Options::default()).is_ok());

        let err = pm
            .run(&module, &Options::default().with_verify_all(true))
            .unwrap_err();

        assert!(matches!(err, PassError::Verification { ref module, .. } if module == "broken"));
    }

    #[test]
    fn managers_nest() {
        let (module, [a, _, _]) = sample();
        let mut inner = PassManager::new();
        inner.add_pass(stack_protection());

        let mut outer = PassManager::new();
        outer.add_pass(inner);

        assert_eq!(outer.pass_names(), ["pass-manager"]);

        outer
            .run(&module, &Options::default().with_enable_stack_protection(true))
            .unwrap();

        assert!(module.function(a).needs_stack_protection());
    }

    #[test]
    fn empty_pipeline_does_nothing() {
        let (module, _) = sample();
        let mut pm = PassManager::new();

        assert!(pm.is_empty());
        assert_eq!(
            pm.run(&module, &Options::default()).unwrap(),
            PipelineStats::default()
        );
    }
}
