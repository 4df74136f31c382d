//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::transforms::VerifyError;
use thiserror::Error;

/// The ways a pass pipeline can fail without it being a bug in a pass.
///
/// Contract violations (nested transformations, foreign handles, bad v-table
/// indices) are not represented here, those panic.
#[derive(Debug, Error)]
pub enum PassError {
    /// A pass reported that it could not do its job.
    #[error("pass `{pass}` failed: {message}")]
    Failed {
        /// The name of the pass that failed.
        pass: String,
        /// What went wrong.
        message: String,
    },

    /// A pipeline asked for a pass that nobody registered.
    #[error("no pass named `{0}` is registered")]
    UnknownPass(String),

    /// The module was found to be malformed.
    #[error("module `{module}` failed verification with {} error(s)", .errors.len())]
    Verification {
        /// The name of the module that was verified.
        module: String,
        /// Every problem that was found.
        errors: Vec<VerifyError>,
    },
}

impl PassError {
    /// Shorthand for [`PassError::Failed`].
    pub fn failed(pass: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            pass: pass.into(),
            message: message.into(),
        }
    }
}
