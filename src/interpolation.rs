//! # ENDF-6 interpolation
//!
//! Evaluation of a [`TabulatedFunction`] at one energy with the segmented
//! interpolation rules of ENDF-6.
//!
//! ## Algorithm
//! -----------------
//! 1. If `energy` equals a tabulated energy, the **first** matching point is returned
//!    (left limit of a discontinuity).
//! 2. Otherwise the bracketing points `x1 < energy < x2` are found by binary search.
//! 3. The law is that of the first region whose boundary index is `>=` the index of `x2`.
//! 4. The law is applied:
//!
//! | INT | Law       | Relation                                   |
//! |-----|-----------|--------------------------------------------|
//! | 1   | histogram | `y = y1`                                   |
//! | 2   | lin-lin   | `y` linear in `x`                          |
//! | 3   | lin-log   | `y` linear in `ln x`                       |
//! | 4   | log-lin   | `ln y` linear in `x`                       |
//! | 5   | log-log   | `ln y` linear in `ln x`                    |
//! | 6   | Gamow     | `ln(x y)` linear in `1/sqrt(x)`            |
//!
//! Laws 3 to 6 take logarithms; when one of `x1`, `x2`, `y1`, `y2` or `energy` is not
//! strictly positive they fall back to lin-lin and say so in the [`MethodTag`].
//!
//! Energies outside the grid are not an error here: above the grid the last point is
//! returned, below it the first one. Out-of-range policies live in [`crate::query`].
//!
//! ## See also
//! ------------
//! * [`crate::query::QueryFacade::point_lookup`] – applies the out-of-range policy.
use std::fmt;

use serde::{Serialize, Serializer};

use crate::{
    constants::{Barn, ElectronVolt},
    tabulated::{LawCode, Point, TabulatedFunction},
};

/// How an [`Evaluation`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodTag {
    /// `energy` is a tabulated energy, left-limit value returned.
    DuplicateLeftLimit,
    /// Interpolated with the region's own law.
    Law(LawCode),
    /// A logarithmic law met a non-positive value, lin-lin used instead.
    FallbackNonPositive,
    /// The region carries an unknown law code, lin-lin used instead.
    FallbackUnknownLaw(i64),
    /// `energy` above the grid, last point returned.
    TailLeftLimit,
    /// `energy` below the grid, first point returned.
    HeadBoundary,
}

impl fmt::Display for MethodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodTag::DuplicateLeftLimit => write!(f, "exact (left limit)"),
            MethodTag::Law(law) => write!(f, "{law}"),
            MethodTag::FallbackNonPositive => write!(f, "lin-lin (fallback: non-positive for log)"),
            MethodTag::FallbackUnknownLaw(code) => {
                write!(f, "lin-lin (fallback: unknown law={code})")
            }
            MethodTag::TailLeftLimit => write!(f, "tail (left limit)"),
            MethodTag::HeadBoundary => write!(f, "head (boundary)"),
        }
    }
}

impl Serialize for MethodTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub sigma_b: Barn,
    pub method: MethodTag,
}

fn lin_lin(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    y1 + (y2 - y1) * (x - x1) / (x2 - x1)
}

/// Apply one law on the bracket `[p1, p2]`.
fn interpolate(law: LawCode, p1: &Point, p2: &Point, x: f64) -> Evaluation {
    let (x1, y1, x2, y2) = (p1.energy_ev, p1.sigma_b, p2.energy_ev, p2.sigma_b);
    let logs_defined = x1 > 0.0 && x2 > 0.0 && y1 > 0.0 && y2 > 0.0 && x > 0.0;

    let sigma_b = match law {
        LawCode::Histogram => y1,
        LawCode::LinLin => lin_lin(x1, y1, x2, y2, x),
        LawCode::LinLog | LawCode::LogLin | LawCode::LogLog | LawCode::Gamow
            if !logs_defined =>
        {
            return Evaluation {
                sigma_b: lin_lin(x1, y1, x2, y2, x),
                method: MethodTag::FallbackNonPositive,
            };
        }
        LawCode::LinLog => y1 + (y2 - y1) * (x / x1).ln() / (x2 / x1).ln(),
        LawCode::LogLin => y1 * ((y2 / y1).ln() * (x - x1) / (x2 - x1)).exp(),
        LawCode::LogLog => y1 * ((y2 / y1).ln() * (x / x1).ln() / (x2 / x1).ln()).exp(),
        LawCode::Gamow => {
            let (u1, u2, u) = (x1.sqrt().recip(), x2.sqrt().recip(), x.sqrt().recip());
            let (w1, w2) = ((x1 * y1).ln(), (x2 * y2).ln());
            (w1 + (w2 - w1) * (u - u1) / (u2 - u1)).exp() / x
        }
        LawCode::Unknown(code) => {
            return Evaluation {
                sigma_b: lin_lin(x1, y1, x2, y2, x),
                method: MethodTag::FallbackUnknownLaw(code),
            };
        }
    };

    Evaluation {
        sigma_b,
        method: MethodTag::Law(law),
    }
}

/// Evaluate `function` at `energy`.
///
/// Arguments
/// -----------------
/// * `function`: a validated tabulated function.
/// * `energy`: incident energy in eV. Callers are expected to keep it in
///   `[e_min, e_max]`; values outside are answered with the nearest end point.
///
/// Return
/// ----------
/// * The cross section in barns and the [`MethodTag`] describing how it was obtained.
///   The function is total: it never fails and never panics on a validated function.
pub fn evaluate(function: &TabulatedFunction, energy: ElectronVolt) -> Evaluation {
    let points = function.points();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Evaluation {
            sigma_b: f64::NAN,
            method: MethodTag::HeadBoundary,
        };
    };

    // first index with points[i].energy >= energy
    let i = points.partition_point(|p| p.energy_ev < energy);

    if let Some(hit) = points.get(i).filter(|p| p.energy_ev == energy) {
        return Evaluation {
            sigma_b: hit.sigma_b,
            method: MethodTag::DuplicateLeftLimit,
        };
    }
    if i == points.len() {
        return Evaluation {
            sigma_b: last.sigma_b,
            method: MethodTag::TailLeftLimit,
        };
    }
    if i == 0 {
        return Evaluation {
            sigma_b: first.sigma_b,
            method: MethodTag::HeadBoundary,
        };
    }

    let (left, right) = (&points[i - 1], &points[i]);
    let law = function
        .regions()
        .iter()
        .find(|r| r.boundary_index >= right.index)
        .map_or(LawCode::LinLin, |r| r.law);

    interpolate(law, left, right, energy)
}
