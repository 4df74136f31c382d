//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena::ChainIter;
use crate::ir::{DefaultWitnessTableRef, Func, Module, VTable, VTableRef, WitnessTableRef};
use std::iter::FusedIterator;
use std::ops::Index;

macro_rules! chain_list {
    ($(#[$outer:meta])* $name:ident, $item:ty, $chain:ident) => {
        $(#[$outer])*
        #[derive(Clone, Debug)]
        pub struct $name<'m> {
            inner: ChainIter<'m, $item>,
        }

        impl<'m> $name<'m> {
            pub(crate) fn new(module: &'m Module) -> Self {
                Self {
                    inner: module.$chain(),
                }
            }
        }

        impl<'m> Iterator for $name<'m> {
            type Item = $item;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                self.inner.next()
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<'m> FusedIterator for $name<'m> {}
    };
}

chain_list! {
    /// Walks the functions of a module in module order.
    ///
    /// Each list starts at the head of the function order as it was when the list
    /// was created, and can only be walked once. Create a new one (through
    /// [`ModulePassContext::functions`](crate::pass::ModulePassContext::functions))
    /// to walk the functions again.
    FunctionList, Func, function_chain
}

chain_list! {
    /// Walks the witness tables of a module in module order.
    WitnessTableList, WitnessTableRef, witness_table_chain
}

chain_list! {
    /// Walks the default witness tables of a module in module order.
    DefaultWitnessTableList, DefaultWitnessTableRef, default_witness_table_chain
}

/// A random-access view of a module's v-tables.
///
/// This doesn't copy anything, it's backed directly by the module's
/// contiguous v-table storage.
#[derive(Copy, Clone, Debug)]
pub struct VTableArray<'m> {
    module: &'m Module,
}

impl<'m> VTableArray<'m> {
    pub(crate) fn new(module: &'m Module) -> Self {
        Self { module }
    }

    /// Gets the number of v-tables.
    #[inline]
    pub fn count(&self) -> usize {
        self.module.vtable_count()
    }

    /// Checks if the module has no v-tables.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Gets the handle of the v-table at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Use [`Self::get`] when the index
    /// isn't known to be valid.
    pub fn element(&self, index: usize) -> VTableRef {
        match self.module.vtable_at(index) {
            Some(vtable) => vtable,
            None => panic!(
                "v-table index {index} is out of range for {} v-tables",
                self.count()
            ),
        }
    }

    /// Gets the handle of the v-table at position `index`, or `None` if
    /// `index` is out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<VTableRef> {
        self.module.vtable_at(index)
    }

    /// Iterates over every v-table handle in array order.
    pub fn iter(&self) -> impl Iterator<Item = VTableRef> + 'm {
        let module = self.module;

        (0..module.vtable_count()).filter_map(move |i| module.vtable_at(i))
    }
}

impl<'m> Index<usize> for VTableArray<'m> {
    type Output = VTable;

    fn index(&self, index: usize) -> &Self::Output {
        self.module.vtable(self.element(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DefaultWitnessTable, WitnessTable};

    fn module_with_vtables(n: usize) -> Module {
        let mut module = Module::new("vtables");

        for i in 0..n {
            module.add_vtable(VTable::new(format!("C{i}")));
        }

        module
    }

    #[test]
    fn vtable_array_random_access() {
        let module = module_with_vtables(3);
        let array = VTableArray::new(&module);

        assert_eq!(array.count(), 3);

        for i in 0..3 {
            assert_eq!(module.vtable(array.element(i)).class(), format!("C{i}"));
            assert_eq!(array[i].class(), format!("C{i}"));
        }

        assert_eq!(array.get(3), None);
        assert_eq!(array.iter().count(), 3);
    }

    #[test]
    #[should_panic(expected = "v-table index 2 is out of range for 2 v-tables")]
    fn vtable_array_one_past_end_panics() {
        let module = module_with_vtables(2);

        let _ = VTableArray::new(&module).element(2);
    }

    #[test]
    #[should_panic(expected = "out of range for 0 v-tables")]
    fn vtable_array_huge_index_panics() {
        let module = module_with_vtables(0);

        // the closest thing to a negative index a `usize` can express
        let _ = VTableArray::new(&module).element(usize::MAX);
    }

    #[test]
    fn witness_lists_follow_link_order() {
        let mut module = Module::new("tables");
        let w1 = module.add_witness_table(WitnessTable::new("A", "P"));
        let w2 = module.add_witness_table(WitnessTable::new("B", "P"));
        let d1 = module.add_default_witness_table(DefaultWitnessTable::new("P"));

        assert_eq!(
            WitnessTableList::new(&module).collect::<Vec<_>>(),
            vec![w1, w2]
        );
        assert_eq!(
            DefaultWitnessTableList::new(&module).collect::<Vec<_>>(),
            vec![d1]
        );
    }

    #[test]
    fn function_list_is_fused() {
        let mut module = Module::new("fused");
        let f = module.declare_function("f");
        let mut list = FunctionList::new(&module);

        assert_eq!(list.next(), Some(f));
        assert_eq!(list.next(), None);
        assert_eq!(list.next(), None);
    }
}
