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
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::{fmt, slice};

/// The primary storage for one kind of entity in a module, mapping `K -> V`.
///
/// This is effectively a typed wrapper around `Vec<V>` that remembers which
/// module it belongs to. Entities are never removed, so the storage stays
/// contiguous and every handle it ever returned stays valid.
///
/// Indexing with a handle that was created by a different module (or one that
/// does not exist yet) panics, those are always bugs in the caller.
///
/// ```
/// # use garnet::entity_ref;
/// # use garnet::arena::*;
/// entity_ref! {
///     struct Name = "name";
/// }
///
/// let mut names = EntityMap::new(ModuleId::fresh());
/// let n: Name = names.insert("Hello!");
///
/// assert_eq!(names[n], "Hello!");
/// ```
#[derive(Clone)]
pub struct EntityMap<K: EntityRef, V> {
    owner: ModuleId,
    slots: Vec<V>,
    _unused: PhantomData<fn() -> K>,
}

impl<K: EntityRef, V> EntityMap<K, V> {
    /// Creates a new, empty map owned by `owner`.
    #[inline]
    pub fn new(owner: ModuleId) -> Self {
        Self {
            owner,
            slots: Vec::default(),
            _unused: PhantomData,
        }
    }

    /// Gets the module that owns every handle in this map.
    #[inline]
    pub fn owner(&self) -> ModuleId {
        self.owner
    }

    /// Checks if `key` was returned from [`Self::insert`] on this map.
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        key.owner() == self.owner && key.index() < self.slots.len()
    }

    /// Gets the value associated with `key`, or `None` if the key
    /// isn't from this map.
    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        if key.owner() != self.owner {
            return None;
        }

        self.slots.get(key.index())
    }

    /// Mutable version of [`Self::get`].
    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        if key.owner() != self.owner {
            return None;
        }

        self.slots.get_mut(key.index())
    }

    /// Adds an entity to the map and returns its handle.
    #[inline]
    pub fn insert(&mut self, value: V) -> K {
        let key = self.next_key();

        self.slots.push(value);

        key
    }

    /// Gets the handle that *will be* returned by the next [`Self::insert`].
    #[inline]
    pub fn next_key(&self) -> K {
        K::new(self.owner, self.slots.len())
    }

    /// Gets the handle of the entity at a given position, if one exists.
    #[inline]
    pub fn key_at(&self, index: usize) -> Option<K> {
        (index < self.slots.len()).then(|| K::new(self.owner, index))
    }

    /// Gets the number of entities in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks if the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Gets the entities as one contiguous slice, in insertion order.
    #[inline]
    pub fn as_slice(&self) -> &[V] {
        &self.slots
    }

    /// Iterates over every handle in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        let owner = self.owner;

        (0..self.slots.len()).map(move |i| K::new(owner, i))
    }

    /// Iterates over every `(handle, value)` pair in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        let owner = self.owner;

        self.slots
            .iter()
            .enumerate()
            .map(move |(i, v)| (K::new(owner, i), v))
    }

    /// Iterates over every value in insertion order.
    pub fn values(&self) -> slice::Iter<'_, V> {
        self.slots.iter()
    }

    fn check(&self, key: K) -> usize {
        assert_eq!(
            key.owner(),
            self.owner,
            "`{key:?}` belongs to a different module"
        );
        assert!(key.index() < self.slots.len(), "`{key:?}` does not exist");

        key.index()
    }
}

impl<K: EntityRef, V> Index<K> for EntityMap<K, V> {
    type Output = V;

    fn index(&self, key: K) -> &Self::Output {
        let index = self.check(key);

        &self.slots[index]
    }
}

impl<K: EntityRef, V> IndexMut<K> for EntityMap<K, V> {
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        let index = self.check(key);

        &mut self.slots[index]
    }
}

impl<K: EntityRef, V: Debug> Debug for EntityMap<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "EntityMap ")?;

        f.debug_map().entries(self.iter()).finish()
    }
}
