//! Decoding errors for ENDF-6 text and pre-decoded JSON records.
//!
//! A [`FormatError`] is fatal for the record or section being decoded only: sibling
//! sections of the same file and sibling files of the same batch keep decoding.
//! Every variant carries an [`Origin`] naming the file (or archive entry) and,
//! when known, the `MAT`/`MT` of the section.
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Where a record or section came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    /// File name or `archive!entry`.
    pub name: String,
    pub mat: Option<i32>,
    pub mt: Option<u32>,
}

impl Origin {
    pub fn named(name: impl Into<String>) -> Self {
        Origin {
            name: name.into(),
            mat: None,
            mt: None,
        }
    }

    pub fn section(name: impl Into<String>, mat: i32, mt: u32) -> Self {
        Origin {
            name: name.into(),
            mat: Some(mat),
            mt: Some(mt),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match (self.mat, self.mt) {
            (Some(mat), Some(mt)) => write!(f, " (MAT {mat}, MT {mt})"),
            (None, Some(mt)) => write!(f, " (MT {mt})"),
            (Some(mat), None) => write!(f, " (MAT {mat})"),
            (None, None) => Ok(()),
        }
    }
}

/// Defect found in a TAB1 interpolation table.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionDefect {
    #[error("boundary {boundary} does not exceed previous boundary {previous}")]
    BoundaryNotIncreasing { previous: i64, boundary: i64 },
    #[error("unknown interpolation law {0}")]
    UnknownLaw(i64),
    #[error("last boundary {boundary} does not match the {points} tabulated points")]
    LastBoundaryMismatch { boundary: i64, points: usize },
}

/// Record/section-level decoding errors.
///
/// Variants
/// -----------------
/// * `InvalidField` – a numeric field is not a valid ENDF integer/float; `line` is 1-based
///   within the source, `field` is 1-based within the line (7, 8, 9 are MAT, MF, MT).
/// * `TruncatedSection` – fewer lines than `NR`/`NP` require.
/// * `InvalidCounts` – `NR < 1` or `NP < 2`.
/// * `NonMonotonicGrid` – energy decreases at the 1-based point `index`.
/// * `InvalidRegions` – malformed `(NBT, INT)` table.
/// * `UnresolvedProjectile` – neither the record nor the source name identifies the projectile.
/// * `MalformedJson` – JSON syntax or schema error, with the line for JSON-Lines input.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatError {
    #[error("{origin}: invalid field {field} on line {line}: {text:?}")]
    InvalidField {
        origin: Origin,
        line: usize,
        field: usize,
        text: String,
    },
    #[error("{origin}: truncated section, {expected} lines required but {found} present")]
    TruncatedSection {
        origin: Origin,
        expected: usize,
        found: usize,
    },
    #[error("{origin}: invalid counts NR={nr}, NP={np} (need NR >= 1 and NP >= 2)")]
    InvalidCounts { origin: Origin, nr: i64, np: i64 },
    #[error("{origin}: energy grid decreases at point {index} ({energy_ev} eV after {previous_ev} eV)")]
    NonMonotonicGrid {
        origin: Origin,
        index: usize,
        previous_ev: f64,
        energy_ev: f64,
    },
    #[error("{origin}: interpolation region {region}: {defect}")]
    InvalidRegions {
        origin: Origin,
        region: usize,
        defect: RegionDefect,
    },
    #[error("{origin}: cannot determine the projectile")]
    UnresolvedProjectile { origin: Origin },
    #[error("{origin}: malformed JSON record{}: {detail}", at_line(.line))]
    MalformedJson {
        origin: Origin,
        line: Option<usize>,
        detail: String,
    },
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

impl FormatError {
    pub fn origin(&self) -> &Origin {
        match self {
            FormatError::InvalidField { origin, .. }
            | FormatError::TruncatedSection { origin, .. }
            | FormatError::InvalidCounts { origin, .. }
            | FormatError::NonMonotonicGrid { origin, .. }
            | FormatError::InvalidRegions { origin, .. }
            | FormatError::UnresolvedProjectile { origin }
            | FormatError::MalformedJson { origin, .. } => origin,
        }
    }
}
