//! # Tabulated cross-section functions
//!
//! A [`TabulatedFunction`] is the in-memory form of an ENDF-6 **TAB1** record:
//! an ordered list of `(energy, cross section)` [`Point`]s and an ordered list of
//! [`InterpolationRegion`]s telling which [`LawCode`] governs each stretch of the grid.
//!
//! ## Invariants
//! -----------------
//! Every value returned by [`TabulatedFunction::new`] satisfies:
//!
//! * at least 2 points and at least 1 region,
//! * energies are **non-decreasing** (two equal adjacent energies encode a
//!   discontinuity),
//! * region boundaries are strictly increasing and the last one equals the index of the
//!   final point, so the regions partition `[1, N]` by right endpoint,
//! * every law code is one of the six ENDF-6 laws.
//!
//! Point indices are **1-based**, as in the ENDF-6 `NBT` convention.
//!
//! ## See also
//! ------------
//! * [`crate::interpolation::evaluate`] – evaluates a function at one energy.
//! * [`crate::endf::tab1`] – builds functions from ENDF-6 text.
//! * [`crate::endf::json_records`] – builds functions from pre-decoded JSON.
pub mod reaction;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{Barn, ElectronVolt},
    endf::{FormatError, Origin, RegionDefect},
};

/// One tabulated sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// 1-based position in the grid.
    pub index: usize,
    #[serde(rename = "energy_eV")]
    pub energy_ev: ElectronVolt,
    pub sigma_b: Barn,
}

/// ENDF-6 interpolation law (`INT` code).
///
/// The enum is closed over the six laws defined by ENDF-6. Codes outside `1..=6`
/// are kept as [`LawCode::Unknown`] so that callers can report them; validated
/// functions never contain one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LawCode {
    /// `INT=1`, y constant (left value).
    Histogram,
    /// `INT=2`, y linear in x.
    LinLin,
    /// `INT=3`, y linear in ln(x).
    LinLog,
    /// `INT=4`, ln(y) linear in x.
    LogLin,
    /// `INT=5`, ln(y) linear in ln(x).
    LogLog,
    /// `INT=6`, charged-particle threshold law.
    Gamow,
    Unknown(i64),
}

impl LawCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => LawCode::Histogram,
            2 => LawCode::LinLin,
            3 => LawCode::LinLog,
            4 => LawCode::LogLin,
            5 => LawCode::LogLog,
            6 => LawCode::Gamow,
            other => LawCode::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            LawCode::Histogram => 1,
            LawCode::LinLin => 2,
            LawCode::LinLog => 3,
            LawCode::LogLin => 4,
            LawCode::LogLog => 5,
            LawCode::Gamow => 6,
            LawCode::Unknown(code) => code,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, LawCode::Unknown(_))
    }
}

impl fmt::Display for LawCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LawCode::Histogram => write!(f, "histogram"),
            LawCode::LinLin => write!(f, "lin-lin"),
            LawCode::LinLog => write!(f, "lin-log"),
            LawCode::LogLin => write!(f, "log-lin"),
            LawCode::LogLog => write!(f, "log-log"),
            LawCode::Gamow => write!(f, "gamow"),
            LawCode::Unknown(code) => write!(f, "unknown law={code}"),
        }
    }
}

impl Serialize for LawCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

/// One `(NBT, INT)` pair: the law applies to every interval whose right endpoint
/// index is `<= boundary_index` and above the previous boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InterpolationRegion {
    pub boundary_index: usize,
    pub law: LawCode,
}

/// Validated ENDF-6 TAB1 function `sigma(E)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabulatedFunction {
    points: Vec<Point>,
    regions: Vec<InterpolationRegion>,
}

impl TabulatedFunction {
    /// Build a function from raw pairs, enforcing every invariant.
    ///
    /// Arguments
    /// -----------------
    /// * `pairs`: `(energy_eV, sigma_b)` in file order; indices `1..=N` are assigned here.
    /// * `regions`: raw `(NBT, INT)` pairs in file order.
    /// * `origin`: where the data came from, copied into any error.
    ///
    /// Return
    /// ----------
    /// * The validated function, or
    ///   - [`FormatError::InvalidCounts`] if there are fewer than 2 points or no region,
    ///   - [`FormatError::NonMonotonicGrid`] at the first decreasing energy,
    ///   - [`FormatError::InvalidRegions`] for a malformed region table.
    pub fn new(
        pairs: Vec<(ElectronVolt, Barn)>,
        regions: Vec<(i64, i64)>,
        origin: &Origin,
    ) -> Result<Self, FormatError> {
        if regions.is_empty() || pairs.len() < 2 {
            return Err(FormatError::InvalidCounts {
                origin: origin.clone(),
                nr: regions.len() as i64,
                np: pairs.len() as i64,
            });
        }

        let points: Vec<Point> = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (energy_ev, sigma_b))| Point {
                index: i + 1,
                energy_ev,
                sigma_b,
            })
            .collect();

        check_monotonic(&points, origin)?;
        let regions = check_regions(&regions, points.len(), origin)?;

        Ok(TabulatedFunction { points, regions })
    }

    /// Build a function without validation, for exercising the evaluator on
    /// malformed tables.
    #[cfg(test)]
    pub(crate) fn from_parts_unchecked(
        points: Vec<Point>,
        regions: Vec<InterpolationRegion>,
    ) -> Self {
        TabulatedFunction { points, regions }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn regions(&self) -> &[InterpolationRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a validated function, provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest tabulated energy.
    pub fn e_min(&self) -> ElectronVolt {
        self.points.first().map_or(f64::NAN, |p| p.energy_ev)
    }

    /// Highest tabulated energy.
    pub fn e_max(&self) -> ElectronVolt {
        self.points.last().map_or(f64::NAN, |p| p.energy_ev)
    }

    /// Whether `energy` lies in the closed tabulated interval.
    pub fn contains(&self, energy: ElectronVolt) -> bool {
        energy >= self.e_min() && energy <= self.e_max()
    }
}

fn check_monotonic(points: &[Point], origin: &Origin) -> Result<(), FormatError> {
    for pair in points.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if current.energy_ev < previous.energy_ev {
            return Err(FormatError::NonMonotonicGrid {
                origin: origin.clone(),
                index: current.index,
                previous_ev: previous.energy_ev,
                energy_ev: current.energy_ev,
            });
        }
    }
    Ok(())
}

fn check_regions(
    raw: &[(i64, i64)],
    n_points: usize,
    origin: &Origin,
) -> Result<Vec<InterpolationRegion>, FormatError> {
    let invalid = |region: usize, defect: RegionDefect| FormatError::InvalidRegions {
        origin: origin.clone(),
        region,
        defect,
    };

    let mut previous = 0i64;
    let mut regions = Vec::with_capacity(raw.len());
    for (i, &(nbt, int)) in raw.iter().enumerate() {
        let region = i + 1;
        if nbt <= previous {
            return Err(invalid(
                region,
                RegionDefect::BoundaryNotIncreasing {
                    previous,
                    boundary: nbt,
                },
            ));
        }
        let law = LawCode::from_code(int);
        if !law.is_known() {
            return Err(invalid(region, RegionDefect::UnknownLaw(int)));
        }
        previous = nbt;
        regions.push(InterpolationRegion {
            boundary_index: nbt as usize,
            law,
        });
    }

    if previous != n_points as i64 {
        return Err(invalid(
            raw.len(),
            RegionDefect::LastBoundaryMismatch {
                boundary: previous,
                points: n_points,
            },
        ));
    }
    Ok(regions)
}
