//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena::{ChainIter, EntityChain, EntityMap, ModuleId};
use crate::ir::{
    DefaultWitnessTable, DefaultWitnessTableRef, Func, Function, VTable, VTableRef, WitnessTable,
    WitnessTableRef,
};
use crate::utility::PackedOption;
use ahash::AHashMap;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::fmt::{Debug, Formatter};

#[derive(Debug)]
struct FunctionSlot {
    name: String,
    data: RefCell<Function>,
}

/// Contains every function, v-table and witness table of one compilation unit.
///
/// Functions are kept in a linked order (the order they appear in the module),
/// v-tables are stored contiguously and are randomly indexable, and witness
/// tables and default witness tables each form their own linked order.
///
/// Passes only ever see a module through a
/// [`ModulePassContext`](crate::pass::ModulePassContext), which can read
/// everything but can only mutate one function at a time through a
/// transformation session. The module itself tracks which function (if any)
/// is currently being transformed.
pub struct Module {
    id: ModuleId,
    name: String,
    functions: EntityMap<Func, FunctionSlot>,
    function_order: EntityChain<Func>,
    names: AHashMap<String, Func>,
    vtables: EntityMap<VTableRef, VTable>,
    witness_tables: EntityMap<WitnessTableRef, WitnessTable>,
    witness_table_order: EntityChain<WitnessTableRef>,
    default_witness_tables: EntityMap<DefaultWitnessTableRef, DefaultWitnessTable>,
    default_witness_table_order: EntityChain<DefaultWitnessTableRef>,
    // the function that is currently being transformed, if any
    transforming: Cell<PackedOption<Func>>,
    sessions: Cell<usize>,
}

impl Module {
    /// Creates a new, empty module with a given name.
    ///
    /// This name is expected to be unique across different [`Module`]s, but it doesn't
    /// *have* to be. Identity is tracked through [`Self::id`] instead.
    pub fn new(name: &str) -> Self {
        let id = ModuleId::fresh();

        Self {
            id,
            name: name.to_owned(),
            functions: EntityMap::new(id),
            function_order: EntityChain::new(id),
            names: AHashMap::default(),
            vtables: EntityMap::new(id),
            witness_tables: EntityMap::new(id),
            witness_table_order: EntityChain::new(id),
            default_witness_tables: EntityMap::new(id),
            default_witness_table_order: EntityChain::new(id),
            transforming: Cell::new(PackedOption::none()),
            sessions: Cell::new(0),
        }
    }

    /// Gets the unique identity of the module. Every handle created by this
    /// module carries this id.
    #[inline]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Gets the name the module was created with.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a function without a body, appending it to the function order.
    pub fn declare_function(&mut self, name: &str) -> Func {
        self.add_function(name, Function::declaration())
    }

    /// Defines a function with a given body, appending it to the function order.
    pub fn define_function<I, S>(&mut self, name: &str, body: I) -> Func
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_function(name, Function::definition(body))
    }

    /// Adds a function to the module and appends it to the function order.
    ///
    /// # Panics
    ///
    /// Panics if a function with the same name already exists.
    pub fn add_function(&mut self, name: &str, data: Function) -> Func {
        let func = self.create_function(name, data);

        self.function_order.push_back(func);

        func
    }

    /// Adds a function to the module and links it directly after `after`
    /// in the function order.
    ///
    /// # Panics
    ///
    /// Panics if a function with the same name already exists, or if `after`
    /// is not a function of this module.
    pub fn insert_function_after(&mut self, after: Func, name: &str, data: Function) -> Func {
        assert!(
            self.contains_function(after),
            "`{after:?}` does not belong to module `{}`",
            self.name
        );

        let func = self.create_function(name, data);

        self.function_order.insert_after(after, func);

        func
    }

    /// Finds a [`Func`] with a given name. If the function has not been added to
    /// the module, `None` is returned.
    pub fn find_function(&self, name: &str) -> Option<Func> {
        self.names.get(name).copied()
    }

    /// Checks if `func` was created by this module.
    #[inline]
    pub fn contains_function(&self, func: Func) -> bool {
        self.functions.contains(func)
    }

    /// Gets the number of functions in the module.
    #[inline]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Gets the name of a function. Names never change, so this is always
    /// readable, even while the function is being transformed.
    pub fn function_name(&self, func: Func) -> &str {
        &self.functions[func].name
    }

    /// Immutably borrows the data of a function.
    ///
    /// # Panics
    ///
    /// Panics if `func` is not from this module, or if `func` is currently
    /// being transformed. The only way to look at a function during its own
    /// transformation is through the session's
    /// [`FunctionPassContext`](crate::pass::FunctionPassContext).
    pub fn function(&self, func: Func) -> Ref<'_, Function> {
        let slot = &self.functions[func];

        match slot.data.try_borrow() {
            Ok(data) => data,
            Err(_) => panic!(
                "cannot read `{}` through the module while it is being transformed",
                slot.name
            ),
        }
    }

    /// Mutably accesses the data of a function.
    ///
    /// This is for whoever builds the module. Holding `&mut Module` means no
    /// pass context can exist at the same time.
    pub fn function_mut(&mut self, func: Func) -> &mut Function {
        self.functions[func].data.get_mut()
    }

    /// Gets the first function in the function order.
    #[inline]
    pub fn first_function(&self) -> Option<Func> {
        self.function_order.first()
    }

    /// Gets the function that follows `func` in the function order.
    #[inline]
    pub fn next_function(&self, func: Func) -> Option<Func> {
        self.function_order.next(func)
    }

    /// Adds a v-table at the end of the v-table array.
    pub fn add_vtable(&mut self, vtable: VTable) -> VTableRef {
        self.vtables.insert(vtable)
    }

    /// Gets a v-table by its handle.
    #[inline]
    pub fn vtable(&self, vtable: VTableRef) -> &VTable {
        &self.vtables[vtable]
    }

    /// Gets the handle of the v-table at position `index` in the array.
    #[inline]
    pub fn vtable_at(&self, index: usize) -> Option<VTableRef> {
        self.vtables.key_at(index)
    }

    /// Checks if `vtable` was created by this module.
    #[inline]
    pub fn contains_vtable(&self, vtable: VTableRef) -> bool {
        self.vtables.contains(vtable)
    }

    /// Gets the number of v-tables in the module.
    #[inline]
    pub fn vtable_count(&self) -> usize {
        self.vtables.len()
    }

    /// Gets every v-table as one contiguous slice.
    #[inline]
    pub fn vtables(&self) -> &[VTable] {
        self.vtables.as_slice()
    }

    /// Adds a witness table to the end of the witness table order.
    pub fn add_witness_table(&mut self, table: WitnessTable) -> WitnessTableRef {
        let wt = self.witness_tables.insert(table);

        self.witness_table_order.push_back(wt);

        wt
    }

    /// Gets a witness table by its handle.
    #[inline]
    pub fn witness_table(&self, table: WitnessTableRef) -> &WitnessTable {
        &self.witness_tables[table]
    }

    /// Checks if `table` was created by this module.
    #[inline]
    pub fn contains_witness_table(&self, table: WitnessTableRef) -> bool {
        self.witness_tables.contains(table)
    }

    /// Gets the number of witness tables in the module.
    #[inline]
    pub fn witness_table_count(&self) -> usize {
        self.witness_tables.len()
    }

    /// Gets the first witness table in the witness table order.
    #[inline]
    pub fn first_witness_table(&self) -> Option<WitnessTableRef> {
        self.witness_table_order.first()
    }

    /// Gets the witness table that follows `table`.
    #[inline]
    pub fn next_witness_table(&self, table: WitnessTableRef) -> Option<WitnessTableRef> {
        self.witness_table_order.next(table)
    }

    /// Adds a default witness table to the end of the default witness table order.
    pub fn add_default_witness_table(
        &mut self,
        table: DefaultWitnessTable,
    ) -> DefaultWitnessTableRef {
        let dwt = self.default_witness_tables.insert(table);

        self.default_witness_table_order.push_back(dwt);

        dwt
    }

    /// Gets a default witness table by its handle.
    #[inline]
    pub fn default_witness_table(&self, table: DefaultWitnessTableRef) -> &DefaultWitnessTable {
        &self.default_witness_tables[table]
    }

    /// Checks if `table` was created by this module.
    #[inline]
    pub fn contains_default_witness_table(&self, table: DefaultWitnessTableRef) -> bool {
        self.default_witness_tables.contains(table)
    }

    /// Gets the number of default witness tables in the module.
    #[inline]
    pub fn default_witness_table_count(&self) -> usize {
        self.default_witness_tables.len()
    }

    /// Gets the first default witness table in its order.
    #[inline]
    pub fn first_default_witness_table(&self) -> Option<DefaultWitnessTableRef> {
        self.default_witness_table_order.first()
    }

    /// Gets the default witness table that follows `table`.
    #[inline]
    pub fn next_default_witness_table(
        &self,
        table: DefaultWitnessTableRef,
    ) -> Option<DefaultWitnessTableRef> {
        self.default_witness_table_order.next(table)
    }

    /// Gets the function that is currently being transformed, if any.
    #[inline]
    pub fn transforming(&self) -> Option<Func> {
        self.transforming.get().expand()
    }

    /// Gets how many transformation sessions have been opened on this
    /// module since it was created.
    #[inline]
    pub fn session_count(&self) -> usize {
        self.sessions.get()
    }

    pub(crate) fn function_chain(&self) -> ChainIter<'_, Func> {
        self.function_order.iter()
    }

    pub(crate) fn witness_table_chain(&self) -> ChainIter<'_, WitnessTableRef> {
        self.witness_table_order.iter()
    }

    pub(crate) fn default_witness_table_chain(&self) -> ChainIter<'_, DefaultWitnessTableRef> {
        self.default_witness_table_order.iter()
    }

    pub(crate) fn linked_counts(&self) -> [(&'static str, usize, usize); 3] {
        [
            ("function", self.function_order.len(), self.functions.len()),
            (
                "witness table",
                self.witness_table_order.len(),
                self.witness_tables.len(),
            ),
            (
                "default witness table",
                self.default_witness_table_order.len(),
                self.default_witness_tables.len(),
            ),
        ]
    }

    /// Marks `func` as the one function that may be mutated.
    ///
    /// # Panics
    ///
    /// Panics if another transformation is already in progress.
    pub(crate) fn begin_transform(&self, func: Func) {
        if let Some(current) = self.transforming() {
            panic!(
                "cannot begin transforming `{}` while `{}` is already being transformed",
                self.function_name(func),
                self.function_name(current)
            );
        }

        self.transforming.set(PackedOption::some(func));
        self.sessions.set(self.sessions.get() + 1);
    }

    pub(crate) fn end_transform(&self, func: Func) {
        assert_eq!(
            self.transforming(),
            Some(func),
            "ending a transformation that was never started"
        );

        self.transforming.set(PackedOption::none());
    }

    /// Mutably borrows the function bound to the current session.
    pub(crate) fn borrow_transforming(&self) -> RefMut<'_, Function> {
        let func = self
            .transforming()
            .expect("no function is being transformed");

        self.functions[func].data.borrow_mut()
    }

    fn create_function(&mut self, name: &str, data: Function) -> Func {
        assert!(
            self.find_function(name).is_none(),
            "function `{name}` is already defined in module `{}`",
            self.name
        );

        let func = self.functions.insert(FunctionSlot {
            name: name.to_owned(),
            data: RefCell::new(data),
        });

        self.names.insert(name.to_owned(), func);

        func
    }
}

impl Debug for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("functions", &self.functions.len())
            .field("vtables", &self.vtables.len())
            .field("witness_tables", &self.witness_tables.len())
            .field("default_witness_tables", &self.default_witness_tables.len())
            .field("transforming", &self.transforming())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    assert_impl_all!(Module: Send);
    assert_not_impl_any!(Module: Sync);

    #[test]
    fn functions_follow_link_order() {
        let mut module = Module::new("test");
        let a = module.declare_function("a");
        let c = module.declare_function("c");
        let b = module.insert_function_after(a, "b", Function::declaration());

        assert_eq!(module.function_chain().collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(module.first_function(), Some(a));
        assert_eq!(module.next_function(b), Some(c));
        assert_eq!(module.next_function(c), None);
    }

    #[test]
    fn find_function_by_name() {
        let mut module = Module::new("test");
        let f = module.define_function("main", ["return"]);

        assert_eq!(module.find_function("main"), Some(f));
        assert_eq!(module.find_function("other"), None);
        assert_eq!(module.function_name(f), "main");
        assert!(module.function(f).is_definition());
    }

    #[test]
    #[should_panic(expected = "function `main` is already defined in module `test`")]
    fn duplicate_names_panic() {
        let mut module = Module::new("test");

        module.declare_function("main");
        module.declare_function("main");
    }

    #[test]
    fn handles_from_other_modules_are_foreign() {
        let mut m1 = Module::new("m1");
        let mut m2 = Module::new("m2");
        let f1 = m1.declare_function("f");
        let _ = m2.declare_function("f");

        assert_ne!(m1.id(), m2.id());
        assert!(m1.contains_function(f1));
        assert!(!m2.contains_function(f1));
    }

    #[test]
    fn tables_are_stored_per_kind() {
        let mut module = Module::new("test");
        let f = module.declare_function("impl");
        let vt = module.add_vtable(VTable::new("C").with_entry("m", Some(f)));
        let wt1 = module.add_witness_table(WitnessTable::new("Int", "P"));
        let wt2 = module.add_witness_table(WitnessTable::new("Bool", "P"));
        let dwt = module.add_default_witness_table(DefaultWitnessTable::new("P"));

        assert_eq!(module.vtable_at(0), Some(vt));
        assert_eq!(module.vtable_at(1), None);
        assert_eq!(module.vtable(vt).entries()[0].target(), Some(f));
        assert_eq!(module.first_witness_table(), Some(wt1));
        assert_eq!(module.next_witness_table(wt1), Some(wt2));
        assert_eq!(module.witness_table(wt2).conforming_type(), "Bool");
        assert_eq!(module.first_default_witness_table(), Some(dwt));
        assert_eq!(module.next_default_witness_table(dwt), None);
    }

    #[test]
    fn transform_bookkeeping() {
        let mut module = Module::new("test");
        let f = module.declare_function("f");

        assert_eq!(module.transforming(), None);

        module.begin_transform(f);
        module.borrow_transforming().push_instruction("return");
        assert_eq!(module.transforming(), Some(f));
        module.end_transform(f);

        assert_eq!(module.transforming(), None);
        assert_eq!(module.session_count(), 1);
        assert!(module.function(f).is_definition());
    }

    #[test]
    #[should_panic(expected = "cannot read `f` through the module while it is being transformed")]
    fn reading_the_transformed_function_panics() {
        let mut module = Module::new("test");
        let f = module.declare_function("f");

        module.begin_transform(f);

        let _guard = module.borrow_transforming();
        let _ = module.function(f);
    }

    #[test]
    #[should_panic(expected = "cannot begin transforming `g` while `f` is already being transformed")]
    fn nested_begin_panics() {
        let mut module = Module::new("test");
        let f = module.declare_function("f");
        let g = module.declare_function("g");

        module.begin_transform(f);
        module.begin_transform(g);
    }
}
