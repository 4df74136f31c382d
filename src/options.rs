//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! Process-wide optimizer configuration.

use paste::paste;
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};

/// Models how `assert`-like checks in the compiled program are treated.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum AssertConfiguration {
    /// Every check is kept.
    #[default]
    Debug,
    /// Checks are kept, but their messages are dropped.
    Release,
    /// Checks are removed, violating them is undefined behavior.
    Unchecked,
}

impl FromStr for AssertConfiguration {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Debug" => Ok(Self::Debug),
            "Release" => Ok(Self::Release),
            "Unchecked" => Ok(Self::Unchecked),
            _ => Err(()),
        }
    }
}

/// Errors that can come out of [`Options::from_flags`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum OptionsError {
    /// The flag isn't one the optimizer knows about.
    #[error("unknown optimizer flag `{0}`")]
    UnknownFlag(String),
    /// The flag expects a value but was the last argument.
    #[error("flag `{0}` expects a value")]
    MissingValue(String),
    /// The flag was given a value it doesn't accept.
    #[error("`{value}` is not a valid value for `{flag}`")]
    InvalidValue {
        /// The flag that was being parsed.
        flag: String,
        /// The rejected value.
        value: String,
    },
}

macro_rules! define_options {
    ( $( $(#[$doc:meta])* $flag:ident : $ty:ty = $default:expr; )* ) => {
        /// A read-only snapshot of the optimizer configuration.
        ///
        /// Created once when the compiler starts and then handed by reference to
        /// every pass. Any flag that isn't given explicitly has a defined default,
        /// asking for it never fails.
        ///
        /// This effectively models the `-enable-thing` argument pattern of the
        /// compiler driver, see [`Options::from_flags`].
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        #[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "enable-serde", serde(default))]
        pub struct Options {
            $( $flag: $ty, )*
        }

        impl Default for Options {
            fn default() -> Self {
                Self {
                    $( $flag: $default, )*
                }
            }
        }

        impl Options {
            $(
                $(#[$doc])*
                #[inline]
                pub fn $flag(&self) -> $ty {
                    self.$flag
                }

                paste! {
                    #[doc = "Returns a copy of the options with `" $flag "` replaced by `value`."]
                    #[must_use]
                    pub fn [<with_ $flag>](mut self, value: $ty) -> Self {
                        self.$flag = value;
                        self
                    }
                }
            )*
        }
    };
}

define_options! {
    /// Whether functions with unsafe stack accesses get stack protectors.
    enable_stack_protection: bool = false;

    /// Whether `inout` arguments are moved into a protected temporary when
    /// their origin can't be found in any caller.
    enable_move_inout_stack_protection: bool = false;

    /// Whether the module is verified after every pass.
    verify_all: bool = false;

    /// How `assert`-like checks are compiled.
    assert_configuration: AssertConfiguration = AssertConfiguration::Debug;
}

impl Options {
    /// Builds a snapshot from driver-style flags. Flags that aren't mentioned
    /// keep their default, later flags override earlier ones.
    ///
    /// ```
    /// # use garnet::options::*;
    /// let opts = Options::from_flags(["-enable-stack-protector", "-assert-config", "Release"]).unwrap();
    ///
    /// assert!(opts.enable_stack_protection());
    /// assert!(!opts.verify_all());
    /// assert_eq!(opts.assert_configuration(), AssertConfiguration::Release);
    /// ```
    pub fn from_flags<I, S>(flags: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();
        let mut flags = flags.into_iter();

        while let Some(flag) = flags.next() {
            opts = match flag.as_ref() {
                "-enable-stack-protector" => opts.with_enable_stack_protection(true),
                "-disable-stack-protector" => opts.with_enable_stack_protection(false),
                "-enable-move-inout-stack-protector" => {
                    opts.with_enable_move_inout_stack_protection(true)
                }
                "-sil-verify-all" => opts.with_verify_all(true),
                "-assert-config" => {
                    let value = flags
                        .next()
                        .ok_or_else(|| OptionsError::MissingValue("-assert-config".into()))?;
                    let config = value.as_ref().parse().map_err(|_| OptionsError::InvalidValue {
                        flag: "-assert-config".into(),
                        value: value.as_ref().into(),
                    })?;

                    opts.with_assert_configuration(config)
                }
                other => return Err(OptionsError::UnknownFlag(other.into())),
            };
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(Options: Copy, Send, Sync);

    #[test]
    fn defaults_are_off() {
        let opts = Options::default();

        assert!(!opts.enable_stack_protection());
        assert!(!opts.enable_move_inout_stack_protection());
        assert!(!opts.verify_all());
        assert_eq!(opts.assert_configuration(), AssertConfiguration::Debug);
    }

    #[test]
    fn empty_flags_are_default() {
        assert_eq!(
            Options::from_flags(Vec::<String>::new()),
            Ok(Options::default())
        );
    }

    #[test]
    fn later_flags_win() {
        let opts =
            Options::from_flags(["-enable-stack-protector", "-disable-stack-protector"]).unwrap();

        assert!(!opts.enable_stack_protection());
    }

    #[test]
    fn builder_methods_only_touch_one_flag() {
        let opts = Options::default()
            .with_verify_all(true)
            .with_enable_move_inout_stack_protection(true);

        assert!(opts.verify_all());
        assert!(opts.enable_move_inout_stack_protection());
        assert!(!opts.enable_stack_protection());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert_eq!(
            Options::from_flags(["-O"]),
            Err(OptionsError::UnknownFlag("-O".into()))
        );
    }

    #[test]
    fn assert_config_needs_a_valid_value() {
        assert_eq!(
            Options::from_flags(["-assert-config"]),
            Err(OptionsError::MissingValue("-assert-config".into()))
        );
        assert_eq!(
            Options::from_flags(["-assert-config", "Fast"]),
            Err(OptionsError::InvalidValue {
                flag: "-assert-config".into(),
                value: "Fast".into()
            })
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            OptionsError::UnknownFlag("-x".into()).to_string(),
            "unknown optimizer flag `-x`"
        );
    }

    #[cfg(feature = "enable-serde")]
    use serde_test::{assert_de_tokens, assert_tokens, Token};

    #[test]
    #[cfg(feature = "enable-serde")]
    fn serialize_options() {
        let opts = Options::default().with_enable_stack_protection(true);

        assert_tokens(
            &opts,
            &[
                Token::Struct {
                    name: "Options",
                    len: 4,
                },
                Token::Str("enable_stack_protection"),
                Token::Bool(true),
                Token::Str("enable_move_inout_stack_protection"),
                Token::Bool(false),
                Token::Str("verify_all"),
                Token::Bool(false),
                Token::Str("assert_configuration"),
                Token::UnitVariant {
                    name: "AssertConfiguration",
                    variant: "Debug",
                },
                Token::StructEnd,
            ],
        );
    }

    #[test]
    #[cfg(feature = "enable-serde")]
    fn missing_fields_use_defaults() {
        assert_de_tokens(
            &Options::default().with_verify_all(true),
            &[
                Token::Struct {
                    name: "Options",
                    len: 1,
                },
                Token::Str("verify_all"),
                Token::Bool(true),
                Token::StructEnd,
            ],
        );
    }
}
