//! # Source-name conventions
//!
//! ENDF-6 `MF=3` sections do not say which projectile they belong to, and older
//! materials do not carry the isomeric state either. Evaluated libraries encode both
//! in their file names instead (`neutrons/n-095_Am_242m1.endf`,
//! `p-026_Fe_056.endf`, ...). The [`NamingConventionResolver`] trait isolates that
//! knowledge so alternative naming schemes can be plugged into the decoder.
//!
//! [`EndfFileNaming`] is the default implementation. It recognises:
//!
//! * a projectile prefix on the file name: `n-`, `n_`, `p-`, `p_`, `neutron_`, `proton-`...
//! * a sublibrary directory anywhere in the path: `neutrons/`, `protons/`, `n/`, `p/`,
//! * an isomer suffix after the mass number: `242m`, `242m1`, `Am-242-M2`.
//!
//! Metadata read from the record itself (`MF=1/MT=451`) always takes precedence
//! over these hints.
use std::fmt::Debug;

use regex::Regex;

use crate::tabulated::reaction::Projectile;

/// What a source name says about the data it contains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceHints {
    pub projectile: Option<Projectile>,
    pub isomeric_state: Option<u32>,
}

pub trait NamingConventionResolver: Send + Sync + Debug {
    fn resolve(&self, source_name: &str) -> SourceHints;
}

#[derive(Debug, Clone)]
pub struct EndfFileNaming {
    file_prefix: Regex,
    directory: Regex,
    isomer: Regex,
}

impl Default for EndfFileNaming {
    fn default() -> Self {
        Self::new()
    }
}

impl EndfFileNaming {
    pub fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("invalid built-in pattern");
        EndfFileNaming {
            file_prefix: compile(r"(?i)^(n|p|neutrons?|protons?)[-_]"),
            directory: compile(r"(?i)(?:^|[/!])(n|p|neutrons?|protons?)/"),
            isomer: compile(r"(?i)\d-?m(\d*)(?:[._-]|$)"),
        }
    }

    fn projectile(token: &str) -> Option<Projectile> {
        token.parse().ok()
    }
}

/// File name part of a path or `archive!entry` name.
fn base_name(source_name: &str) -> &str {
    source_name
        .rsplit(['/', '\\', '!'])
        .next()
        .unwrap_or(source_name)
}

impl NamingConventionResolver for EndfFileNaming {
    fn resolve(&self, source_name: &str) -> SourceHints {
        let base = base_name(source_name);

        let projectile = self
            .file_prefix
            .captures(base)
            .and_then(|c| Self::projectile(&c[1]))
            .or_else(|| {
                self.directory
                    .captures_iter(source_name)
                    .filter_map(|c| Self::projectile(&c[1]))
                    .last()
            });

        let isomeric_state = self.isomer.captures(base).map(|c| match &c[1] {
            "" => 1,
            digits => digits.parse().unwrap_or(1),
        });

        SourceHints {
            projectile,
            isomeric_state,
        }
    }
}
