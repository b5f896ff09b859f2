pub mod catalog;
pub mod config;
pub mod constants;
#[cfg(feature = "endf-download")]
pub mod download;
pub mod endf;
pub mod interpolation;
pub mod labels;
pub mod library;
pub mod query;
pub mod service;
pub mod tabulated;
pub mod xs_errors;

pub use catalog::{
    diagnostics::{NotFoundError, ReactionQuery, ReactionSelector},
    Catalog,
};
pub use config::XsConfig;
pub use endf::{FormatError, IngestSource};
pub use interpolation::{evaluate, Evaluation, MethodTag};
pub use library::{IngestSummary, XsLibrary};
pub use query::{EnergyRange, OutOfRangePolicy, Pagination};
pub use tabulated::{
    reaction::{Projectile, ReactionKey, ReactionRecord, TargetId},
    LawCode, TabulatedFunction,
};
pub use xs_errors::XsError;
