//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::{
    DefaultWitnessTable, DefaultWitnessTableRef, Func, Function, FunctionFlags, Module, VTable,
    VTableRef, WitnessTable, WitnessTableRef,
};
use crate::options::Options;
use crate::pass::session::TransformSession;
use crate::pass::{
    DefaultWitnessTableList, FunctionList, SessionState, VTableArray, WitnessTableList,
};
use std::cell::{Ref, RefMut};

/// The view of a module that a module pass gets.
///
/// Everything in the module can be read through this, and any number of these
/// can exist for the same module at the same time. Mutation only happens
/// through [`Self::transform`], one function at a time.
#[derive(Copy, Clone, Debug)]
pub struct ModulePassContext<'m> {
    module: &'m Module,
    options: &'m Options,
}

impl<'m> ModulePassContext<'m> {
    /// Creates a context over `module` that exposes `options` to passes.
    pub fn new(module: &'m Module, options: &'m Options) -> Self {
        Self { module, options }
    }

    /// Gets the module being worked on.
    #[inline]
    pub fn module(&self) -> &'m Module {
        self.module
    }

    /// Gets the optimizer configuration.
    #[inline]
    pub fn options(&self) -> &'m Options {
        self.options
    }

    /// Walks every function in module order, starting from the current head.
    #[inline]
    pub fn functions(&self) -> FunctionList<'m> {
        FunctionList::new(self.module)
    }

    /// Gets a random-access view of every v-table.
    #[inline]
    pub fn vtables(&self) -> VTableArray<'m> {
        VTableArray::new(self.module)
    }

    /// Walks every witness table in module order.
    #[inline]
    pub fn witness_tables(&self) -> WitnessTableList<'m> {
        WitnessTableList::new(self.module)
    }

    /// Walks every default witness table in module order.
    #[inline]
    pub fn default_witness_tables(&self) -> DefaultWitnessTableList<'m> {
        DefaultWitnessTableList::new(self.module)
    }

    /// Reads a function. See [`Module::function`] for when this panics.
    #[inline]
    pub fn function(&self, func: Func) -> Ref<'m, Function> {
        self.module.function(func)
    }

    /// Gets the name of a function.
    #[inline]
    pub fn function_name(&self, func: Func) -> &'m str {
        self.module.function_name(func)
    }

    /// Reads a v-table.
    #[inline]
    pub fn vtable(&self, vtable: VTableRef) -> &'m VTable {
        self.module.vtable(vtable)
    }

    /// Reads a witness table.
    #[inline]
    pub fn witness_table(&self, table: WitnessTableRef) -> &'m WitnessTable {
        self.module.witness_table(table)
    }

    /// Reads a default witness table.
    #[inline]
    pub fn default_witness_table(&self, table: DefaultWitnessTableRef) -> &'m DefaultWitnessTable {
        self.module.default_witness_table(table)
    }

    /// Gets whether a transformation is in progress on the module.
    #[inline]
    pub fn session_state(&self) -> SessionState {
        SessionState::of(self.module)
    }

    /// Runs `body` with exclusive mutable access to `func`.
    ///
    /// The session is opened before `body` runs and is always closed before this
    /// returns, no matter whether `body` returns normally, returns an `Err`
    /// (whatever `body` returns is passed through) or unwinds.
    ///
    /// ```
    /// # use garnet::ir::Module;
    /// # use garnet::options::Options;
    /// # use garnet::pass::*;
    /// let mut module = Module::new("m");
    /// let f = module.declare_function("f");
    /// let options = Options::default();
    /// let ctx = ModulePassContext::new(&module, &options);
    ///
    /// ctx.transform(f, |fctx| fctx.push_instruction("return"));
    ///
    /// assert!(ctx.function(f).is_definition());
    /// assert_eq!(ctx.session_state(), SessionState::Idle);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `func` is not a function of this module, or if called while
    /// another transformation is in progress (i.e. from inside another
    /// `transform` body).
    pub fn transform<R, F>(&self, func: Func, body: F) -> R
    where
        F: FnOnce(&mut FunctionPassContext<'_>) -> R,
    {
        assert!(
            self.module.contains_function(func),
            "`{func:?}` does not belong to module `{}`",
            self.module.name()
        );

        let _session = TransformSession::begin(self.module, func);
        let mut ctx = FunctionPassContext::new(self.module, self.options, func);
        let result = body(&mut ctx);

        // the borrow of the function has to end before the session does
        drop(ctx);

        result
    }
}

/// The view of a single function that a transformation gets.
///
/// Only exists while the function's transformation session is open. It holds
/// the only mutable borrow of the function, other functions of the module can
/// still be read through [`Self::read_function`].
#[derive(Debug)]
pub struct FunctionPassContext<'s> {
    func: Func,
    data: RefMut<'s, Function>,
    module: &'s Module,
    options: &'s Options,
}

impl<'s> FunctionPassContext<'s> {
    pub(crate) fn new(module: &'s Module, options: &'s Options, func: Func) -> Self {
        debug_assert_eq!(module.transforming(), Some(func));

        Self {
            func,
            data: module.borrow_transforming(),
            module,
            options,
        }
    }

    /// Gets the function being transformed.
    #[inline]
    pub fn func(&self) -> Func {
        self.func
    }

    /// Gets the name of the function being transformed.
    #[inline]
    pub fn name(&self) -> &'s str {
        self.module.function_name(self.func)
    }

    /// Reads the function being transformed.
    #[inline]
    pub fn function(&self) -> &Function {
        &self.data
    }

    /// Mutates the function being transformed.
    #[inline]
    pub fn function_mut(&mut self) -> &mut Function {
        &mut self.data
    }

    /// Marks the function as needing a stack protector.
    pub fn set_needs_stack_protection(&mut self) {
        self.data
            .flags_mut()
            .insert(FunctionFlags::NEEDS_STACK_PROTECTION);
    }

    /// Appends an instruction to the function's body.
    pub fn push_instruction(&mut self, inst: impl Into<String>) {
        self.data.push_instruction(inst);
    }

    /// Replaces the function's body, returning the old one.
    pub fn replace_body<I, S>(&mut self, body: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.replace_body(body)
    }

    /// Gets the optimizer configuration.
    #[inline]
    pub fn options(&self) -> &'s Options {
        self.options
    }

    /// Gets the module the function belongs to.
    #[inline]
    pub fn module(&self) -> &'s Module {
        self.module
    }

    /// Reads a different function of the same module.
    ///
    /// # Panics
    ///
    /// Panics if `other` is the function being transformed, use
    /// [`Self::function`] for that.
    pub fn read_function(&self, other: Func) -> Ref<'s, Function> {
        assert_ne!(
            other,
            self.func,
            "`{}` is being transformed, read it through `function()`",
            self.name()
        );

        self.module.function(other)
    }

    /// Gets the session state of the module, which is always open for this
    /// context's function.
    #[inline]
    pub fn session_state(&self) -> SessionState {
        SessionState::of(self.module)
    }
}
