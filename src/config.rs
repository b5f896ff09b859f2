//! Library configuration.
//!
//! [`XsConfig`] can be built in code with the `with_*` methods or read from a JSON
//! file; missing keys take their default value:
//!
//! ```json
//! {
//!   "source_version": "ENDF/B-VIII.0",
//!   "max_concurrent_queries": 16,
//!   "default_sample_points": 200,
//!   "max_sample_points": 10000,
//!   "max_page_size": 5000,
//!   "cache_dir": "/var/cache/endfxs"
//! }
//! ```
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::{
    constants::{
        DEFAULT_MAX_CONCURRENT_QUERIES, DEFAULT_MAX_PAGE_SIZE, DEFAULT_MAX_SAMPLE_POINTS,
        DEFAULT_SAMPLE_POINTS, DEFAULT_SOURCE_VERSION,
    },
    query::QueryLimits,
    xs_errors::XsError,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XsConfig {
    /// Version tag stamped on records that do not carry their own.
    pub source_version: String,
    /// Queries served concurrently by a [`crate::service::QueryService`].
    pub max_concurrent_queries: usize,
    /// Sample count used when a sampled-window request gives none.
    pub default_sample_points: usize,
    pub max_sample_points: usize,
    pub max_page_size: usize,
    /// Download cache; the user cache directory when `None`.
    pub cache_dir: Option<Utf8PathBuf>,
}

impl Default for XsConfig {
    fn default() -> Self {
        XsConfig {
            source_version: DEFAULT_SOURCE_VERSION.to_string(),
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
            default_sample_points: DEFAULT_SAMPLE_POINTS,
            max_sample_points: DEFAULT_MAX_SAMPLE_POINTS,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            cache_dir: None,
        }
    }
}

impl XsConfig {
    /// Read and validate a JSON configuration file.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, XsError> {
        let text = fs::read_to_string(path)?;
        let config: XsConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_source_version(mut self, version: impl Into<String>) -> Self {
        self.source_version = version.into();
        self
    }

    pub fn with_max_concurrent_queries(mut self, permits: usize) -> Self {
        self.max_concurrent_queries = permits;
        self
    }

    pub fn with_default_sample_points(mut self, n: usize) -> Self {
        self.default_sample_points = n;
        self
    }

    pub fn with_max_sample_points(mut self, n: usize) -> Self {
        self.max_sample_points = n;
        self
    }

    pub fn with_max_page_size(mut self, n: usize) -> Self {
        self.max_page_size = n;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Check the limits are usable together.
    pub fn validate(&self) -> Result<(), XsError> {
        let invalid = |msg: String| -> Result<(), XsError> { Err(XsError::InvalidConfig(msg)) };

        if self.source_version.trim().is_empty() {
            return invalid("source_version is empty".into());
        }
        if self.max_concurrent_queries == 0 {
            return invalid("max_concurrent_queries must be at least 1".into());
        }
        if self.max_sample_points < 2 {
            return invalid(format!(
                "max_sample_points must be at least 2, got {}",
                self.max_sample_points
            ));
        }
        if !(2..=self.max_sample_points).contains(&self.default_sample_points) {
            return invalid(format!(
                "default_sample_points {} outside 2..={}",
                self.default_sample_points, self.max_sample_points
            ));
        }
        if self.max_page_size == 0 {
            return invalid("max_page_size must be at least 1".into());
        }
        Ok(())
    }

    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            max_sample_points: self.max_sample_points,
            max_page_size: self.max_page_size,
        }
    }
}
