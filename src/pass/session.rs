//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::{Func, Module};
use log::trace;

/// Whether a module currently has a function open for transformation.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum SessionState {
    /// No function may be mutated.
    Idle,
    /// The given function, and only that function, may be mutated.
    Open(Func),
}

impl SessionState {
    /// Reads the session state of a module.
    pub fn of(module: &Module) -> Self {
        match module.transforming() {
            Some(func) => Self::Open(func),
            None => Self::Idle,
        }
    }

    /// Checks if a session is open.
    #[inline]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open(_))
    }
}

/// Scoped ownership of the one transformation slot of a module.
///
/// Creating the guard tells the module that `func` is now the exclusively
/// mutable function, dropping it releases the slot again. The release happens
/// in `Drop` so that it also runs when a transformation returns early with an
/// error or unwinds.
pub(crate) struct TransformSession<'m> {
    module: &'m Module,
    func: Func,
}

impl<'m> TransformSession<'m> {
    /// Opens a session for `func`.
    ///
    /// # Panics
    ///
    /// Panics if another session is already open on `module`.
    pub(crate) fn begin(module: &'m Module, func: Func) -> Self {
        module.begin_transform(func);

        trace!(
            "begin transform of `{}` in module `{}`",
            module.function_name(func),
            module.name()
        );

        Self { module, func }
    }
}

impl Drop for TransformSession<'_> {
    fn drop(&mut self) {
        self.module.end_transform(self.func);

        trace!(
            "end transform of `{}` in module `{}`",
            self.module.function_name(self.func),
            self.module.name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let mut module = Module::new("session");
        let f = module.declare_function("f");

        assert_eq!(SessionState::of(&module), SessionState::Idle);

        {
            let _session = TransformSession::begin(&module, f);

            assert_eq!(SessionState::of(&module), SessionState::Open(f));
            assert!(SessionState::of(&module).is_open());
        }

        assert_eq!(SessionState::of(&module), SessionState::Idle);
    }

    #[test]
    fn sessions_can_follow_each_other() {
        let mut module = Module::new("session");
        let f = module.declare_function("f");
        let g = module.declare_function("g");

        drop(TransformSession::begin(&module, f));
        drop(TransformSession::begin(&module, g));
        drop(TransformSession::begin(&module, f));

        assert_eq!(module.session_count(), 3);
        assert_eq!(SessionState::of(&module), SessionState::Idle);
    }

    #[test]
    #[should_panic(expected = "while `f` is already being transformed")]
    fn overlapping_guards_panic() {
        let mut module = Module::new("session");
        let f = module.declare_function("f");

        let _outer = TransformSession::begin(&module, f);
        let _inner = TransformSession::begin(&module, f);
    }
}
