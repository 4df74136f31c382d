//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::*;
use crate::pass::*;
use ahash::AHashSet;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// One problem found by [`verify_module`].
#[derive(Clone, Debug, Error, Hash, Eq, PartialEq)]
pub enum VerifyError {
    /// Walking an order reached a different number of entities than the
    /// module stores.
    #[error("the {kind} order links {linked} entities but the module stores {stored}")]
    LengthMismatch {
        /// Which order is broken.
        kind: &'static str,
        /// How many entities the order reached.
        linked: usize,
        /// How many entities the module stores.
        stored: usize,
    },

    /// An entity was reached twice while walking an order.
    #[error("{kind} `{entity}` appears more than once in its order")]
    DuplicateLink {
        /// Which order is broken.
        kind: &'static str,
        /// The entity that was reached twice.
        entity: String,
    },

    /// A table entry points at a function that isn't part of the module.
    #[error("entry `{entry}` of {table} references a function outside of the module")]
    DanglingReference {
        /// A description of the table, e.g. `vtable $C`.
        table: String,
        /// The name of the entry.
        entry: String,
    },

    /// A transformation session was left open.
    #[error("function `{0}` is still being transformed")]
    OpenSession(String),
}

/// A module validity verification pass.
///
/// This scans the entire module, and will do nothing if the module is valid. If
/// the module isn't valid, it fails with [`PassError::Verification`].
#[derive(Copy, Clone, Debug, Default)]
pub struct VerifyModulePass;

impl ModulePass for VerifyModulePass {
    fn name(&self) -> &str {
        "verify"
    }

    fn run(&mut self, ctx: &ModulePassContext<'_>) -> Result<(), PassError> {
        let module = ctx.module();

        verify_module(module).map_err(|errors| PassError::Verification {
            module: module.name().to_owned(),
            errors,
        })
    }
}

/// Verifies that a module is structurally sound.
///
/// This checks that every order (functions, witness tables, default witness
/// tables) reaches each of its entities exactly once and agrees with the
/// number of entities the module stores, that every table entry refers to a
/// function of this module, and that no transformation is in progress.
///
/// If it isn't, this function returns every problem that was found.
pub fn verify_module(module: &Module) -> Result<(), Vec<VerifyError>> {
    let mut errors = Vec::new();

    if let Some(func) = module.transforming() {
        errors.push(VerifyError::OpenSession(module.function_name(func).to_owned()));

        // functions cannot be read while one of them is borrowed for a session
        return Err(errors);
    }

    for (kind, linked, stored) in module.linked_counts() {
        if linked != stored {
            errors.push(VerifyError::LengthMismatch {
                kind,
                linked,
                stored,
            });
        }
    }

    check_order(
        "function",
        module.function_count(),
        module.first_function(),
        |f| module.next_function(f),
        &mut errors,
    );

    check_order(
        "witness table",
        module.witness_table_count(),
        module.first_witness_table(),
        |wt| module.next_witness_table(wt),
        &mut errors,
    );

    check_order(
        "default witness table",
        module.default_witness_table_count(),
        module.first_default_witness_table(),
        |dwt| module.next_default_witness_table(dwt),
        &mut errors,
    );

    for vtable in module.vtables() {
        check_entries(
            module,
            || format!("vtable ${}", vtable.class()),
            vtable,
            &mut errors,
        );
    }

    for wt in walk_order(module.first_witness_table(), |wt| {
        module.next_witness_table(wt)
    }) {
        let table = module.witness_table(wt);

        check_entries(
            module,
            || {
                format!(
                    "witness table ${}: {}",
                    table.conforming_type(),
                    table.protocol()
                )
            },
            table,
            &mut errors,
        );
    }

    for dwt in walk_order(module.first_default_witness_table(), |dwt| {
        module.next_default_witness_table(dwt)
    }) {
        let table = module.default_witness_table(dwt);

        check_entries(
            module,
            || format!("default witness table {}", table.protocol()),
            table,
            &mut errors,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// This is [`verify_module`], except that it writes out the module and any
/// errors and then panics on failure.
pub fn verify_module_panic(module: &Module) {
    if let Err(errors) = verify_module(module) {
        if module.transforming().is_none() {
            eprintln!("{}", stringify_module(module));
        }

        for error in errors.iter() {
            eprintln!("error: {error}");
        }

        panic!(
            "module `{}` failed verification with {} error(s)",
            module.name(),
            errors.len()
        );
    }
}

// walks an order without trusting it, stopping at the first repeated entity
fn walk_order<K, N>(first: Option<K>, next: N) -> impl Iterator<Item = K>
where
    K: Copy + Eq + Hash,
    N: Fn(K) -> Option<K>,
{
    let mut seen = AHashSet::new();

    std::iter::successors(first, move |&k| next(k)).take_while(move |&k| seen.insert(k))
}

fn check_order<K, N>(
    kind: &'static str,
    stored: usize,
    first: Option<K>,
    next: N,
    errors: &mut Vec<VerifyError>,
) where
    K: Copy + Eq + Hash + Debug,
    N: Fn(K) -> Option<K>,
{
    let mut seen = AHashSet::new();
    let mut current = first;

    while let Some(k) = current {
        if !seen.insert(k) {
            errors.push(VerifyError::DuplicateLink {
                kind,
                entity: format!("{k:?}"),
            });

            break;
        }

        current = next(k);
    }

    if seen.len() != stored {
        errors.push(VerifyError::LengthMismatch {
            kind,
            linked: seen.len(),
            stored,
        });
    }
}

fn check_entries<T, D>(module: &Module, describe: D, table: &T, errors: &mut Vec<VerifyError>)
where
    T: DispatchTable,
    D: Fn() -> String,
{
    for entry in table.entries() {
        match entry.target() {
            Some(func) if !module.contains_function(func) => {
                errors.push(VerifyError::DanglingReference {
                    table: describe(),
                    entry: entry.name().to_owned(),
                });
            }
            _ => {}
        }
    }
}
