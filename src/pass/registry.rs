//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::pass::{FunctionPass, FunctionToModulePassAdapter, ModulePass, PassError, PassManager};
use crate::transforms::{ModuleWriterPass, VerifyModulePass};
use ahash::AHashMap;
use std::fmt;

type Constructor = Box<dyn Fn() -> Box<dyn ModulePass>>;

/// Maps pass names to a way of creating that pass, so that a driver can build
/// a pipeline out of a list of names given on the command line.
#[derive(Default)]
pub struct PassRegistry {
    passes: AHashMap<String, Constructor>,
}

impl PassRegistry {
    /// Creates a registry that knows no passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that knows every pass shipped with the crate:
    ///
    /// - `verify`: [`VerifyModulePass`]
    /// - `print-module`: [`ModuleWriterPass`] printing to stderr
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("verify", || VerifyModulePass);
        registry.register("print-module", ModuleWriterPass::stderr);

        registry
    }

    /// Registers a module pass under `name`, replacing any pass that was
    /// already registered under it.
    pub fn register<P, F>(&mut self, name: &str, make: F)
    where
        P: ModulePass + 'static,
        F: Fn() -> P + 'static,
    {
        let make: Constructor = Box::new(move || Box::new(make()) as Box<dyn ModulePass>);

        self.passes.insert(name.to_owned(), make);
    }

    /// Registers a function pass under `name`. Every pass created from it is
    /// wrapped in a [`FunctionToModulePassAdapter`].
    pub fn register_function_pass<P, F>(&mut self, name: &str, make: F)
    where
        P: FunctionPass + 'static,
        F: Fn() -> P + 'static,
    {
        self.register(name, move || FunctionToModulePassAdapter::adapt(make()));
    }

    /// Checks if a pass is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.passes.contains_key(name)
    }

    /// Gets every registered name, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.passes.keys().map(String::as_str).collect();

        names.sort_unstable();
        names
    }

    /// Creates a fresh instance of the pass registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn ModulePass>, PassError> {
        self.passes
            .get(name)
            .map(|make| make())
            .ok_or_else(|| PassError::UnknownPass(name.to_owned()))
    }

    /// Builds a pipeline that runs the named passes in the order given.
    ///
    /// ```
    /// # use garnet::pass::*;
    /// let registry = PassRegistry::with_builtins();
    ///
    /// let pm = registry.build(["verify", "print-module"]).unwrap();
    /// assert_eq!(pm.pass_names(), ["verify", "print-module"]);
    ///
    /// assert!(registry.build(["verify", "inline"]).is_err());
    /// ```
    pub fn build<I, S>(&self, names: I) -> Result<PassManager, PassError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pm = PassManager::new();

        for name in names {
            pm.add_pass(self.create(name.as_ref())?);
        }

        Ok(pm)
    }
}

impl fmt::Debug for PassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassRegistry")
            .field("passes", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Module;
    use crate::options::Options;
    use crate::ir::FunctionFlags;
    use crate::pass::{function_pass, module_pass};

    #[test]
    fn builtins_are_registered() {
        let registry = PassRegistry::with_builtins();

        assert_eq!(registry.names(), ["print-module", "verify"]);
        assert!(registry.contains("verify"));
        assert!(!registry.contains("inline"));
    }

    #[test]
    fn unknown_names_are_errors() {
        let registry = PassRegistry::with_builtins();

        match registry.build(["verify", "inline", "print-module"]) {
            Err(PassError::UnknownPass(name)) => assert_eq!(name, "inline"),
            other => panic!("expected an unknown pass error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn each_build_creates_fresh_passes() {
        let mut registry = PassRegistry::new();

        registry.register_function_pass("mark-transparent", || {
            let mut count = 0;

            function_pass("mark-transparent", move |fctx| {
                count += 1;

                if count > 1 {
                    return Err(PassError::failed("mark-transparent", "ran twice"));
                }

                fctx.function_mut()
                    .flags_mut()
                    .insert(FunctionFlags::TRANSPARENT);

                Ok(())
            })
        });

        let mut module = Module::new("m");
        let f = module.declare_function("f");
        let options = Options::default();

        registry
            .build(["mark-transparent"])
            .unwrap()
            .run(&module, &options)
            .unwrap();
        registry
            .build(["mark-transparent"])
            .unwrap()
            .run(&module, &options)
            .unwrap();

        assert!(module
            .function(f)
            .flags()
            .contains(FunctionFlags::TRANSPARENT));
    }

    #[test]
    fn later_registration_wins() {
        let mut registry = PassRegistry::with_builtins();

        registry.register("verify", || module_pass("custom-verify", |_| Ok(())));

        let pm = registry.build(["verify"]).unwrap();

        assert_eq!(pm.pass_names(), ["custom-verify"]);
    }
}
