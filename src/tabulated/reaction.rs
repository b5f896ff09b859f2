//! Reaction identity and records.
//!
//! A [`ReactionKey`] identifies one cross section: the target nuclide
//! ([`TargetId`]: `Z`, `A`, isomeric state, projectile) plus the ENDF `MT` code.
//! A [`ReactionRecord`] binds a key to its [`TabulatedFunction`] and provenance.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{AtomicNumber, MassNumber, Mt},
    tabulated::TabulatedFunction,
};

/// Incident particle of a reaction sublibrary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projectile {
    Neutron,
    Proton,
}

impl Projectile {
    /// Short particle symbol used in reaction labels (`n`, `p`).
    pub fn symbol(self) -> &'static str {
        match self {
            Projectile::Neutron => "n",
            Projectile::Proton => "p",
        }
    }
}

impl fmt::Display for Projectile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Projectile {
    type Err = String;

    /// Accepts the symbol or the particle name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "neutron" | "neutrons" => Ok(Projectile::Neutron),
            "p" | "proton" | "protons" => Ok(Projectile::Proton),
            other => Err(format!("unsupported projectile: {other}")),
        }
    }
}

/// Target nuclide seen by one projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetId {
    pub z: AtomicNumber,
    /// `0` for a natural element.
    pub a: MassNumber,
    pub state: u32,
    pub projectile: Projectile,
}

impl TargetId {
    pub fn new(z: AtomicNumber, a: MassNumber, state: u32, projectile: Projectile) -> Self {
        TargetId {
            z,
            a,
            state,
            projectile,
        }
    }

    pub fn with_mt(self, mt: Mt) -> ReactionKey {
        ReactionKey {
            z: self.z,
            a: self.a,
            state: self.state,
            projectile: self.projectile,
            mt,
        }
    }

    /// Whether the target is a natural element rather than one isotope.
    pub fn is_natural(&self) -> bool {
        self.a == 0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+Z{}", self.projectile, self.z)?;
        if self.is_natural() {
            write!(f, "-nat")?;
        } else {
            write!(f, "-A{}", self.a)?;
        }
        if self.state > 0 {
            write!(f, "m{}", self.state)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ReactionKey {
    pub z: AtomicNumber,
    pub a: MassNumber,
    pub state: u32,
    pub projectile: Projectile,
    pub mt: Mt,
}

impl ReactionKey {
    pub fn target(&self) -> TargetId {
        TargetId::new(self.z, self.a, self.state, self.projectile)
    }
}

impl fmt::Display for ReactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MT={}", self.target(), self.mt)
    }
}

/// Immutable cross section of one reaction, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactionRecord {
    pub key: ReactionKey,
    pub reaction_label: String,
    pub function: TabulatedFunction,
    pub source_version: String,
    /// File name or archive entry the record was decoded from.
    pub origin: String,
}
