//! # Query facade
//!
//! Read-side operations on one [`ReactionRecord`]:
//!
//! * [`QueryFacade::raw_window`] – the tabulated points inside an energy window, paginated,
//! * [`QueryFacade::sampled_window`] – the function evaluated on a log-spaced grid,
//! * [`QueryFacade::point_lookup`] – one energy, with an [`OutOfRangePolicy`].
//!
//! ## Windows and clipping
//! -----------------
//! A requested window is intersected with the tabulated range `[e_min, e_max]`. The
//! intersection is the **effective range**; `clipped` is set when it differs from the
//! request. An empty intersection fails with [`OutOfRangeError`] naming both ranges.
//! Omitting the window selects the whole tabulated range.
//!
//! ## Outputs
//! -----------------
//! Every output carries the reaction key and label, the source version and the
//! [`Units`] of its numbers, and serialises to JSON.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{
        Barn, ElectronVolt, CROSS_SECTION_UNIT, DEFAULT_MAX_PAGE_SIZE, DEFAULT_MAX_SAMPLE_POINTS,
        ENERGY_UNIT,
    },
    interpolation::{evaluate, MethodTag},
    tabulated::{
        reaction::{ReactionKey, ReactionRecord},
        Point,
    },
    xs_errors::XsError,
};

/// Closed energy interval in eV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyRange {
    #[serde(rename = "min_eV")]
    pub min: ElectronVolt,
    #[serde(rename = "max_eV")]
    pub max: ElectronVolt,
}

impl EnergyRange {
    pub fn new(min: ElectronVolt, max: ElectronVolt) -> Self {
        EnergyRange { min, max }
    }

    fn validate(&self) -> Result<(), QueryDefect> {
        if self.min.is_nan() || self.max.is_nan() {
            return Err(QueryDefect::NanEnergy);
        }
        if self.min > self.max {
            return Err(QueryDefect::InvertedRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Intersection with `other`, `None` when empty.
    pub fn intersect(&self, other: &EnergyRange) -> Option<EnergyRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(EnergyRange { min, max })
    }

    pub fn contains(&self, energy: ElectronVolt) -> bool {
        energy >= self.min && energy <= self.max
    }
}

/// Page selection for raw windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Points to skip from the start of the window.
    pub offset: usize,
    /// Page size; the configured maximum when `None`.
    pub limit: Option<usize>,
}

impl Pagination {
    pub fn new(offset: usize, limit: usize) -> Self {
        Pagination {
            offset,
            limit: Some(limit),
        }
    }
}

/// What a point lookup does outside the tabulated range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRangePolicy {
    #[default]
    Error,
    /// Evaluate at the nearest end of the grid.
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Units {
    pub energy_unit: &'static str,
    pub cross_section_unit: &'static str,
}

impl Default for Units {
    fn default() -> Self {
        Units {
            energy_unit: ENERGY_UNIT,
            cross_section_unit: CROSS_SECTION_UNIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedEnergy {
    Point(ElectronVolt),
    Window(EnergyRange),
}

/// A request entirely outside the tabulated range.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{} is outside the tabulated range [{e_min}, {e_max}] eV", describe(.requested))]
pub struct OutOfRangeError {
    pub requested: RequestedEnergy,
    #[serde(rename = "e_min_eV")]
    pub e_min: ElectronVolt,
    #[serde(rename = "e_max_eV")]
    pub e_max: ElectronVolt,
}

fn describe(requested: &RequestedEnergy) -> String {
    match requested {
        RequestedEnergy::Point(energy) => format!("energy {energy} eV"),
        RequestedEnergy::Window(range) => format!("window [{}, {}] eV", range.min, range.max),
    }
}

/// Malformed query parameters.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryDefect {
    #[error("energy is NaN")]
    NanEnergy,
    #[error("inverted energy range [{min}, {max}]")]
    InvertedRange { min: f64, max: f64 },
    #[error("sample count {requested} outside 2..={max}")]
    SampleCount { requested: usize, max: usize },
    #[error("page size {requested} outside 1..={max}")]
    PageSize { requested: usize, max: usize },
}

/// Size limits applied to every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub max_sample_points: usize,
    pub max_page_size: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        QueryLimits {
            max_sample_points: DEFAULT_MAX_SAMPLE_POINTS,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RawWindow {
    pub key: ReactionKey,
    pub reaction_label: String,
    pub source_version: String,
    pub units: Units,
    pub requested_range: EnergyRange,
    pub effective_range: EnergyRange,
    pub clipped: bool,
    /// Points of the effective range before pagination.
    pub total_points: usize,
    pub points: Vec<Point>,
    /// Offset of the next page, `None` on the last page.
    pub next_offset: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampledPoint {
    #[serde(rename = "energy_eV")]
    pub energy_ev: ElectronVolt,
    pub sigma_b: Barn,
    pub method: MethodTag,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampledWindow {
    pub key: ReactionKey,
    pub reaction_label: String,
    pub source_version: String,
    pub units: Units,
    pub requested_range: EnergyRange,
    pub effective_range: EnergyRange,
    pub clipped: bool,
    pub points: Vec<SampledPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointLookup {
    pub key: ReactionKey,
    pub reaction_label: String,
    pub source_version: String,
    pub units: Units,
    pub sigma_b: Barn,
    pub method: MethodTag,
    pub clamped: bool,
    #[serde(rename = "requested_energy_eV")]
    pub requested_energy: ElectronVolt,
    #[serde(rename = "effective_energy_eV")]
    pub effective_energy: ElectronVolt,
}

/// `n` energies from `min` to `max` inclusive, log-spaced when `min > 0`.
fn sample_grid(range: &EnergyRange, n: usize) -> Vec<ElectronVolt> {
    if range.min == range.max {
        return vec![range.min];
    }
    let last = (n - 1) as f64;
    let log_spaced = range.min > 0.0;
    let (lo, hi) = if log_spaced {
        (range.min.ln(), range.max.ln())
    } else {
        (range.min, range.max)
    };

    (0..n)
        .map(|k| match k {
            0 => range.min,
            k if k == n - 1 => range.max,
            k => {
                let t = lo + (hi - lo) * k as f64 / last;
                if log_spaced {
                    t.exp()
                } else {
                    t
                }
            }
        })
        .collect()
}

/// Stateless query operations bound to a set of [`QueryLimits`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryFacade {
    limits: QueryLimits,
}

impl QueryFacade {
    pub fn new(limits: QueryLimits) -> Self {
        QueryFacade { limits }
    }

    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    fn tabulated_range(record: &ReactionRecord) -> Result<EnergyRange, XsError> {
        if record.function.len() < 2 {
            return Err(XsError::Internal(format!(
                "{} holds {} point(s)",
                record.key,
                record.function.len()
            )));
        }
        Ok(EnergyRange::new(
            record.function.e_min(),
            record.function.e_max(),
        ))
    }

    /// Validate `requested` and intersect it with the tabulated range.
    fn effective_range(
        record: &ReactionRecord,
        requested: Option<EnergyRange>,
    ) -> Result<(EnergyRange, EnergyRange), XsError> {
        let tabulated = Self::tabulated_range(record)?;
        let requested = requested.unwrap_or(tabulated);
        requested.validate()?;

        let effective = requested
            .intersect(&tabulated)
            .ok_or(OutOfRangeError {
                requested: RequestedEnergy::Window(requested),
                e_min: tabulated.min,
                e_max: tabulated.max,
            })?;
        Ok((requested, effective))
    }

    /// Tabulated points inside a window.
    ///
    /// Arguments
    /// -----------------
    /// * `record`: the reaction.
    /// * `requested`: energy window in eV, the whole tabulated range when `None`.
    /// * `pagination`: offset and page size over the points of the effective range.
    ///
    /// Return
    /// ----------
    /// * The page, or [`XsError::OutOfRange`] for a window outside the grid, or
    ///   [`XsError::InvalidQuery`] for a NaN/inverted window or a page size outside
    ///   `1..=max_page_size`.
    pub fn raw_window(
        &self,
        record: &ReactionRecord,
        requested: Option<EnergyRange>,
        pagination: Pagination,
    ) -> Result<RawWindow, XsError> {
        let max = self.limits.max_page_size;
        let limit = pagination.limit.unwrap_or(max);
        if limit == 0 || limit > max {
            return Err(QueryDefect::PageSize {
                requested: limit,
                max,
            }
            .into());
        }
        let (requested, effective) = Self::effective_range(record, requested)?;

        let inside: Vec<&Point> = record
            .function
            .points()
            .iter()
            .filter(|p| effective.contains(p.energy_ev))
            .collect();
        let total_points = inside.len();
        let points: Vec<Point> = inside
            .into_iter()
            .skip(pagination.offset)
            .take(limit)
            .copied()
            .collect();
        let end = pagination.offset.saturating_add(points.len());

        Ok(RawWindow {
            key: record.key,
            reaction_label: record.reaction_label.clone(),
            source_version: record.source_version.clone(),
            units: Units::default(),
            clipped: effective != requested,
            requested_range: requested,
            effective_range: effective,
            total_points,
            points,
            next_offset: (end < total_points).then_some(end),
        })
    }

    /// The function evaluated on `n_points` energies spanning the effective range.
    ///
    /// Energies are log-spaced with exact end points; linear spacing is used when the
    /// effective minimum is not positive. A degenerate range yields a single point.
    pub fn sampled_window(
        &self,
        record: &ReactionRecord,
        requested: Option<EnergyRange>,
        n_points: usize,
    ) -> Result<SampledWindow, XsError> {
        let max = self.limits.max_sample_points;
        if !(2..=max).contains(&n_points) {
            return Err(QueryDefect::SampleCount {
                requested: n_points,
                max,
            }
            .into());
        }
        let (requested, effective) = Self::effective_range(record, requested)?;

        let points = sample_grid(&effective, n_points)
            .into_iter()
            .map(|energy_ev| {
                let eval = evaluate(&record.function, energy_ev);
                SampledPoint {
                    energy_ev,
                    sigma_b: eval.sigma_b,
                    method: eval.method,
                }
            })
            .collect();

        Ok(SampledWindow {
            key: record.key,
            reaction_label: record.reaction_label.clone(),
            source_version: record.source_version.clone(),
            units: Units::default(),
            clipped: effective != requested,
            requested_range: requested,
            effective_range: effective,
            points,
        })
    }

    /// Evaluate the function at one energy.
    ///
    /// Return
    /// ----------
    /// * The lookup. Outside `[e_min, e_max]`, [`OutOfRangePolicy::Error`] fails with
    ///   [`XsError::OutOfRange`] while [`OutOfRangePolicy::Clamp`] evaluates at the
    ///   nearest bound and sets `clamped`. A NaN energy is an [`XsError::InvalidQuery`].
    pub fn point_lookup(
        &self,
        record: &ReactionRecord,
        energy: ElectronVolt,
        policy: OutOfRangePolicy,
    ) -> Result<PointLookup, XsError> {
        if energy.is_nan() {
            return Err(QueryDefect::NanEnergy.into());
        }
        let tabulated = Self::tabulated_range(record)?;

        let effective_energy = if tabulated.contains(energy) {
            energy
        } else {
            match policy {
                OutOfRangePolicy::Error => {
                    return Err(OutOfRangeError {
                        requested: RequestedEnergy::Point(energy),
                        e_min: tabulated.min,
                        e_max: tabulated.max,
                    }
                    .into())
                }
                OutOfRangePolicy::Clamp => energy.clamp(tabulated.min, tabulated.max),
            }
        };
        let eval = evaluate(&record.function, effective_energy);

        Ok(PointLookup {
            key: record.key,
            reaction_label: record.reaction_label.clone(),
            source_version: record.source_version.clone(),
            units: Units::default(),
            sigma_b: eval.sigma_b,
            method: eval.method,
            clamped: effective_energy != energy,
            requested_energy: energy,
            effective_energy,
        })
    }
}

#[cfg(test)]
mod query_test {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        endf::Origin,
        tabulated::{reaction::Projectile, TabulatedFunction},
    };

    /// Spans `[1e-5, 2e7]` eV with a 1/v-like log-log shape.
    fn record() -> ReactionRecord {
        ReactionRecord {
            key: ReactionKey {
                z: 3,
                a: 6,
                state: 0,
                projectile: Projectile::Neutron,
                mt: 105,
            },
            reaction_label: "n,t".into(),
            function: TabulatedFunction::new(
                vec![(1e-5, 3.0e4), (1e-3, 3.0e3), (1.0, 94.0), (1e6, 0.1), (2e7, 0.02)],
                vec![(5, 5)],
                &Origin::named("li6"),
            )
            .unwrap(),
            source_version: "ENDF/B-VIII.0".into(),
            origin: "li6".into(),
        }
    }

    #[test]
    fn test_point_lookup_clamp() {
        let record = record();
        let lookup = QueryFacade::default()
            .point_lookup(&record, 1e10, OutOfRangePolicy::Clamp)
            .unwrap();
        assert!(lookup.clamped);
        assert_eq!(lookup.effective_energy, 2e7);
        assert_eq!(lookup.requested_energy, 1e10);
        assert_eq!(lookup.sigma_b, evaluate(&record.function, 2e7).sigma_b);

        let low = QueryFacade::default()
            .point_lookup(&record, 0.0, OutOfRangePolicy::Clamp)
            .unwrap();
        assert_eq!(low.effective_energy, 1e-5);
        assert_eq!(low.sigma_b, 3.0e4);
    }

    #[test]
    fn test_point_lookup_error() {
        let err = QueryFacade::default()
            .point_lookup(&record(), 1e10, OutOfRangePolicy::Error)
            .unwrap_err();
        assert_eq!(
            err,
            XsError::OutOfRange(OutOfRangeError {
                requested: RequestedEnergy::Point(1e10),
                e_min: 1e-5,
                e_max: 2e7
            })
        );
    }

    #[test]
    fn test_point_lookup_inside() {
        let lookup = QueryFacade::default()
            .point_lookup(&record(), 0.0253, OutOfRangePolicy::Error)
            .unwrap();
        assert!(!lookup.clamped);
        assert_eq!(lookup.method, MethodTag::Law(crate::tabulated::LawCode::LogLog));
        assert!(matches!(
            QueryFacade::default().point_lookup(&record(), f64::NAN, OutOfRangePolicy::Clamp),
            Err(XsError::InvalidQuery(QueryDefect::NanEnergy))
        ));
    }

    #[test]
    fn test_clipped_raw_window() {
        let window = QueryFacade::default()
            .raw_window(
                &record(),
                Some(EnergyRange::new(1e-7, 1e-3)),
                Pagination::default(),
            )
            .unwrap();
        assert_eq!(window.effective_range, EnergyRange::new(1e-5, 1e-3));
        assert!(window.clipped);
        assert_eq!(window.total_points, 2);
        assert_eq!(window.next_offset, None);
    }

    #[test]
    fn test_raw_window_pagination() {
        let facade = QueryFacade::default();
        let first = facade
            .raw_window(&record(), None, Pagination::new(0, 2))
            .unwrap();
        assert!(!first.clipped);
        assert_eq!(first.points.len(), 2);
        assert_eq!(first.next_offset, Some(2));

        let last = facade
            .raw_window(&record(), None, Pagination::new(4, 2))
            .unwrap();
        assert_eq!(last.points[0].index, 5);
        assert_eq!(last.next_offset, None);

        let err = facade
            .raw_window(&record(), None, Pagination::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, XsError::InvalidQuery(QueryDefect::PageSize { .. })));
    }

    #[test]
    fn test_window_outside_the_grid() {
        let err = QueryFacade::default()
            .raw_window(&record(), Some(EnergyRange::new(3e7, 1e8)), Pagination::default())
            .unwrap_err();
        let XsError::OutOfRange(out) = err else {
            panic!("expected out of range, got {err:?}");
        };
        assert_eq!(out.requested, RequestedEnergy::Window(EnergyRange::new(3e7, 1e8)));
        assert_eq!((out.e_min, out.e_max), (1e-5, 2e7));

        let err = QueryFacade::default()
            .raw_window(&record(), Some(EnergyRange::new(2.0, 1.0)), Pagination::default())
            .unwrap_err();
        assert!(matches!(err, XsError::InvalidQuery(QueryDefect::InvertedRange { .. })));
    }

    #[test]
    fn test_sampled_window_grid() {
        let window = QueryFacade::default()
            .sampled_window(&record(), Some(EnergyRange::new(1e-3, 1e5)), 9)
            .unwrap();
        let energies: Vec<f64> = window.points.iter().map(|p| p.energy_ev).collect();
        assert_eq!(energies[0], 1e-3);
        assert_eq!(energies[8], 1e5);
        for (k, e) in energies.iter().enumerate() {
            assert_relative_eq!(*e, 10f64.powi(k as i32 - 3), max_relative = 1e-9);
        }
        assert_eq!(window.points[0].method, MethodTag::DuplicateLeftLimit);
        assert!(!window.clipped);
    }

    #[test]
    fn test_sampled_window_degenerate_and_limits() {
        let facade = QueryFacade::default();
        let window = facade
            .sampled_window(&record(), Some(EnergyRange::new(2e7, 5e7)), 10)
            .unwrap();
        assert!(window.clipped);
        assert_eq!(window.points.len(), 1);
        assert_eq!(window.points[0].sigma_b, 0.02);

        let err = facade.sampled_window(&record(), None, 1).unwrap_err();
        assert_eq!(
            err,
            XsError::InvalidQuery(QueryDefect::SampleCount {
                requested: 1,
                max: DEFAULT_MAX_SAMPLE_POINTS
            })
        );
    }

    #[test]
    fn test_linear_grid_when_minimum_is_zero() {
        let grid = sample_grid(&EnergyRange::new(0.0, 4.0), 5);
        assert_eq!(grid, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_outputs_carry_units_and_version() {
        let lookup = QueryFacade::default()
            .point_lookup(&record(), 1.0, OutOfRangePolicy::Error)
            .unwrap();
        let json = serde_json::to_value(&lookup).unwrap();
        assert_eq!(json["units"]["energy_unit"], "eV");
        assert_eq!(json["units"]["cross_section_unit"], "b");
        assert_eq!(json["source_version"], "ENDF/B-VIII.0");
        assert_eq!(json["key"]["mt"], 105);
        assert_eq!(json["method"], "exact (left limit)");
    }

    #[test]
    fn test_unvalidated_function_is_an_internal_error() {
        let mut broken = record();
        broken.function = TabulatedFunction::from_parts_unchecked(vec![], vec![]);
        let err = QueryFacade::default()
            .point_lookup(&broken, 1.0, OutOfRangePolicy::Clamp)
            .unwrap_err();
        assert!(matches!(err, XsError::Internal(_)));
    }
}
