//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::arena::{EntityRef, ModuleId};
use crate::utility::{PackedOption, Packable};
use std::iter::FusedIterator;

#[derive(Copy, Clone, Debug)]
struct ChainNode<K: Packable> {
    next: PackedOption<K>,
    linked: bool,
}

/// A singly-linked ordering over entities that live in an
/// [`EntityMap`](crate::arena::EntityMap).
///
/// The chain doesn't own anything, it only stores a "next" link per entity
/// (indexed by the entity's dense index) along with the head and tail. This
/// mirrors the way a module natively stores its functions and witness tables:
/// the order of the chain is the order entities were linked in, which is not
/// necessarily the order they were created in.
#[derive(Clone, Debug)]
pub struct EntityChain<K: EntityRef + Packable> {
    owner: ModuleId,
    nodes: Vec<ChainNode<K>>,
    // the first entity in the chain, if any exist
    head: PackedOption<K>,
    // the last entity in the chain, if any exist
    tail: PackedOption<K>,
    len: usize,
}

impl<K: EntityRef + Packable> EntityChain<K> {
    /// Creates an empty chain for entities of the module `owner`.
    pub fn new(owner: ModuleId) -> Self {
        Self {
            owner,
            nodes: Vec::default(),
            head: PackedOption::none(),
            tail: PackedOption::none(),
            len: 0,
        }
    }

    /// Links `key` at the end of the chain.
    ///
    /// # Panics
    ///
    /// Panics if `key` is from another module or is already linked.
    pub fn push_back(&mut self, key: K) {
        self.claim(key);

        match self.tail.replace(key) {
            Some(prev) => self.nodes[prev.index()].next = PackedOption::some(key),
            None => self.head = PackedOption::some(key),
        }
    }

    /// Links `key` directly after `after`, which must already be linked.
    ///
    /// # Panics
    ///
    /// Panics if either key is from another module, if `after` is not linked
    /// or if `key` is already linked.
    pub fn insert_after(&mut self, after: K, key: K) {
        assert!(self.contains(after), "`{after:?}` is not linked");

        self.claim(key);

        let next = self.nodes[after.index()].next;

        self.nodes[key.index()].next = next;
        self.nodes[after.index()].next = PackedOption::some(key);

        if next.is_none() {
            self.tail = PackedOption::some(key);
        }
    }

    /// Gets the first entity in the chain.
    #[inline]
    pub fn first(&self) -> Option<K> {
        self.head.expand()
    }

    /// Gets the last entity in the chain.
    #[inline]
    pub fn last(&self) -> Option<K> {
        self.tail.expand()
    }

    /// Follows the "next" link of `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not linked into this chain.
    #[inline]
    pub fn next(&self, key: K) -> Option<K> {
        assert!(self.contains(key), "`{key:?}` is not linked");

        self.nodes[key.index()].next.expand()
    }

    /// Checks if `key` has been linked into the chain.
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        key.owner() == self.owner
            && self
                .nodes
                .get(key.index())
                .map_or(false, |node| node.linked)
    }

    /// Gets the number of linked entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks if nothing has been linked yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Walks the chain from the head in link order.
    pub fn iter(&self) -> ChainIter<'_, K> {
        ChainIter {
            next: self.first(),
            chain: self,
            remaining: self.len,
        }
    }

    fn claim(&mut self, key: K) {
        assert_eq!(
            key.owner(),
            self.owner,
            "`{key:?}` belongs to a different module"
        );
        assert!(!self.contains(key), "`{key:?}` is already linked");

        if self.nodes.len() <= key.index() {
            self.nodes.resize(
                key.index() + 1,
                ChainNode {
                    next: PackedOption::none(),
                    linked: false,
                },
            );
        }

        self.nodes[key.index()] = ChainNode {
            next: PackedOption::none(),
            linked: true,
        };
        self.len += 1;
    }
}

/// Walks an [`EntityChain`] forward, one link at a time.
///
/// Each call to `next` hands out the entity under the cursor and moves the
/// cursor to that entity's "next" link. The walk is bounded by the length of
/// the chain at the time the iterator was created.
#[derive(Clone, Debug)]
pub struct ChainIter<'c, K: EntityRef + Packable> {
    next: Option<K>,
    chain: &'c EntityChain<K>,
    remaining: usize,
}

impl<'c, K: EntityRef + Packable> Iterator for ChainIter<'c, K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.next.map(|key| {
            self.next = self.chain.nodes[key.index()].next.expand();
            self.remaining -= 1;

            key
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(_) => (1.min(self.remaining), Some(self.remaining)),
            None => (0, Some(0)),
        }
    }
}

impl<'c, K: EntityRef + Packable> FusedIterator for ChainIter<'c, K> {}

#[cfg(test)]
mod tests {
    use crate::arena::*;
    use crate::entity_ref;

    entity_ref! {
        struct E = "e";
    }

    fn setup(n: usize) -> (EntityMap<E, usize>, EntityChain<E>) {
        let owner = ModuleId::fresh();
        let mut map = EntityMap::new(owner);

        for i in 0..n {
            let _ = map.insert(i);
        }

        (map, EntityChain::new(owner))
    }

    #[test]
    fn empty_chain_yields_nothing() {
        let (_, chain) = setup(0);
        let mut it = chain.iter();

        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
        assert!(chain.is_empty());
    }

    #[test]
    fn push_back_keeps_order() {
        let (map, mut chain) = setup(3);
        let keys: Vec<E> = map.keys().collect();

        for k in keys.iter().copied() {
            chain.push_back(k);
        }

        assert_eq!(chain.iter().collect::<Vec<_>>(), keys);
        assert_eq!(chain.first(), Some(keys[0]));
        assert_eq!(chain.last(), Some(keys[2]));
        assert_eq!(chain.next(keys[0]), Some(keys[1]));
        assert_eq!(chain.next(keys[2]), None);
    }

    #[test]
    fn insert_after_differs_from_creation_order() {
        let (map, mut chain) = setup(3);
        let keys: Vec<E> = map.keys().collect();

        chain.push_back(keys[0]);
        chain.push_back(keys[1]);
        chain.insert_after(keys[0], keys[2]);

        assert_eq!(
            chain.iter().collect::<Vec<_>>(),
            vec![keys[0], keys[2], keys[1]]
        );
        assert_eq!(chain.last(), Some(keys[1]));
    }

    #[test]
    fn insert_after_tail_moves_tail() {
        let (map, mut chain) = setup(2);
        let keys: Vec<E> = map.keys().collect();

        chain.push_back(keys[0]);
        chain.insert_after(keys[0], keys[1]);

        assert_eq!(chain.last(), Some(keys[1]));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn iterators_are_independent() {
        let (map, mut chain) = setup(4);

        for k in map.keys() {
            chain.push_back(k);
        }

        let mut first = chain.iter();
        let _ = first.next();
        let _ = first.next();

        assert_eq!(chain.iter().count(), 4);
        assert_eq!(first.count(), 2);
    }

    #[test]
    #[should_panic(expected = "is already linked")]
    fn double_link_panics() {
        let (map, mut chain) = setup(1);
        let k = map.keys().next().unwrap();

        chain.push_back(k);
        chain.push_back(k);
    }

    #[test]
    #[should_panic(expected = "belongs to a different module")]
    fn foreign_link_panics() {
        let (mut other, _) = setup(0);
        let (_, mut chain) = setup(1);
        let k: E = other.insert(0);

        chain.push_back(k);
    }
}
