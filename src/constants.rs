//! # Constants and type definitions for endfxs
//!
//! This module centralizes the **ENDF-6 layout constants**, the **unit tags**
//! attached to every query output, and the **default limits** used by the
//! configuration layer.
//!
//! ## Overview
//!
//! - ENDF-6 fixed-width line geometry (field width, control columns)
//! - File/section identifiers that the decoder cares about (MF=1, MF=3)
//! - Sublibrary codes mapping `NSUB` to a projectile
//! - Unit tags (`eV`, `b`) carried by query results
//! - Default sizes for sampling, pagination and concurrency

// -------------------------------------------------------------------------------------------------
// ENDF-6 line geometry
// -------------------------------------------------------------------------------------------------

/// Width of a full ENDF-6 line, sequence number included.
pub const ENDF_LINE_WIDTH: usize = 80;

/// Width of one numeric/text field.
pub const ENDF_FIELD_WIDTH: usize = 11;

/// Number of data fields in front of the control columns.
pub const ENDF_FIELDS_PER_LINE: usize = 6;

/// Column range of the material number.
pub const MAT_COLUMNS: std::ops::Range<usize> = 66..70;

/// Column range of the file number.
pub const MF_COLUMNS: std::ops::Range<usize> = 70..72;

/// Column range of the section number.
pub const MT_COLUMNS: std::ops::Range<usize> = 72..75;

/// General information file.
pub const MF_GENERAL_INFO: i32 = 1;

/// Descriptive data and directory section inside MF=1.
pub const MT_DESCRIPTION: i32 = 451;

/// Reaction cross sections.
pub const MF_CROSS_SECTIONS: i32 = 3;

/// `NSUB` value of the incident-neutron sublibrary.
pub const NSUB_NEUTRON: i64 = 10;

/// `NSUB` value of the incident-proton sublibrary.
pub const NSUB_PROTON: i64 = 10010;

// -------------------------------------------------------------------------------------------------
// Units
// -------------------------------------------------------------------------------------------------

/// Energy unit of every abscissa served by the crate.
pub const ENERGY_UNIT: &str = "eV";

/// Cross-section unit of every ordinate served by the crate.
pub const CROSS_SECTION_UNIT: &str = "b";

// -------------------------------------------------------------------------------------------------
// Defaults
// -------------------------------------------------------------------------------------------------

/// Source version stamped on records when the caller gives none.
pub const DEFAULT_SOURCE_VERSION: &str = "unversioned";

/// Concurrent queries admitted by [`crate::service::QueryService`].
pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 16;

/// Points produced by a sampled window when the caller gives no count.
pub const DEFAULT_SAMPLE_POINTS: usize = 200;

/// Upper bound on the points of one sampled window.
pub const DEFAULT_MAX_SAMPLE_POINTS: usize = 10_000;

/// Upper bound on the points of one raw-window page.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 5_000;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Atomic number.
pub type AtomicNumber = u32;

/// Mass number, `0` for a natural element.
pub type MassNumber = u32;

/// ENDF reaction type code.
pub type Mt = u32;

/// Energy in eV.
pub type ElectronVolt = f64;

/// Cross section in barns.
pub type Barn = f64;
