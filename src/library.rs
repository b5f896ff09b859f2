//! # Cross-section library
//!
//! [`XsLibrary`] ties the crate together: it owns the configuration, the reaction
//! dictionary, the naming convention and the shared active catalog.
//!
//! ```no_run
//! use endfxs::{
//!     catalog::diagnostics::ReactionQuery, config::XsConfig, endf::IngestSource,
//!     library::XsLibrary, query::OutOfRangePolicy,
//!     tabulated::reaction::{Projectile, TargetId},
//! };
//!
//! # fn main() -> Result<(), endfxs::xs_errors::XsError> {
//! let library = XsLibrary::new(XsConfig::default().with_source_version("ENDF/B-VIII.0"))?;
//! let summary = library.ingest(&[IngestSource::try_from("dir:data/neutrons")?])?;
//! println!("{} reactions loaded", summary.records);
//!
//! let li6 = TargetId::new(3, 6, 0, Projectile::Neutron);
//! let lookup = library.point_lookup(
//!     &ReactionQuery::by_label(li6, "n,t"),
//!     0.0253,
//!     OutOfRangePolicy::Error,
//! )?;
//! println!("sigma(n,t) at thermal = {} b ({})", lookup.sigma_b, lookup.method);
//! # Ok(())
//! # }
//! ```
//!
//! ## Ingestion
//! -----------------
//! [`XsLibrary::ingest`] decodes every source, builds a new catalog and swaps it in.
//! If any record fails, nothing is swapped: the previous catalog stays active and the
//! error lists every failure. Use [`XsLibrary::decode`] to inspect per-record results
//! without building.
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    catalog::{diagnostics::ReactionQuery, store::SharedCatalog, Catalog, TargetSummary},
    config::XsConfig,
    constants::{AtomicNumber, ElectronVolt},
    endf::{DecodedBatch, EndfDecoder, EndfFileNaming, IngestSource, NamingConventionResolver},
    labels::ReactionDictionary,
    query::{
        EnergyRange, OutOfRangePolicy, Pagination, PointLookup, QueryFacade, RawWindow,
        SampledWindow,
    },
    service::QueryService,
    tabulated::reaction::{Projectile, ReactionRecord},
    xs_errors::XsError,
};

/// Outcome of a successful [`XsLibrary::ingest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Records in the new catalog.
    pub records: usize,
    /// Records overwritten by a later record with the same key.
    pub replaced: usize,
    pub sections_skipped: usize,
    pub sources: usize,
    /// Generation of the catalog now active.
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct XsLibrary {
    config: XsConfig,
    dictionary: Arc<ReactionDictionary>,
    resolver: Arc<dyn NamingConventionResolver>,
    catalog: Arc<SharedCatalog>,
    facade: QueryFacade,
}

impl XsLibrary {
    /// Library with the embedded reaction dictionary, the default file naming convention
    /// and an empty catalog.
    ///
    /// Return
    /// ----------
    /// * The library, or [`XsError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: XsConfig) -> Result<Self, XsError> {
        config.validate()?;
        let dictionary = Arc::new(ReactionDictionary::embedded()?);
        Ok(XsLibrary {
            facade: QueryFacade::new(config.query_limits()),
            catalog: Arc::new(SharedCatalog::empty(dictionary.clone())),
            dictionary,
            resolver: Arc::new(EndfFileNaming::new()),
            config,
        })
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn NamingConventionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the reaction dictionary. The active catalog is reset to an empty one
    /// bound to the new dictionary.
    pub fn with_dictionary(mut self, dictionary: ReactionDictionary) -> Self {
        self.dictionary = Arc::new(dictionary);
        self.catalog = Arc::new(SharedCatalog::empty(self.dictionary.clone()));
        self
    }

    pub fn config(&self) -> &XsConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &ReactionDictionary {
        &self.dictionary
    }

    fn decoder(&self) -> EndfDecoder<'_> {
        EndfDecoder::new(
            &self.dictionary,
            self.resolver.as_ref(),
            &self.config.source_version,
        )
    }

    /// Decode `sources` in order without touching the active catalog.
    pub fn decode(&self, sources: &[IngestSource]) -> Result<DecodedBatch, XsError> {
        let decoder = self.decoder();
        let mut batch = DecodedBatch::default();
        for source in sources {
            batch.extend(decoder.decode_source(source)?);
        }
        Ok(batch)
    }

    /// Decode `sources`, build a catalog and make it the active one.
    ///
    /// Arguments
    /// -----------------
    /// * `sources`: read in order; on duplicate keys the later record wins.
    ///
    /// Return
    /// ----------
    /// * An [`IngestSummary`], or
    ///   - [`XsError::CatalogRejected`] if any record failed (the active catalog is kept),
    ///   - the I/O or source error of the first unreadable source.
    pub fn ingest(&self, sources: &[IngestSource]) -> Result<IngestSummary, XsError> {
        let batch = self.decode(sources)?;
        for failure in batch.failures() {
            warn!(error = %failure, "rejected record");
        }

        let sections_skipped = batch.sections_skipped;
        let catalog = Catalog::build(batch.records, self.dictionary.clone())?;
        let (records, replaced) = (catalog.len(), catalog.replaced());
        let generation = self.catalog.swap(catalog);

        info!(
            sources = sources.len(),
            records, replaced, sections_skipped, generation, "ingestion complete"
        );
        Ok(IngestSummary {
            records,
            replaced,
            sections_skipped,
            sources: sources.len(),
            generation,
        })
    }

    /// [`ingest`](XsLibrary::ingest) from source descriptors such as `"dir:lib/neutrons"`.
    pub fn ingest_descriptors(&self, descriptors: &[&str]) -> Result<IngestSummary, XsError> {
        let sources = descriptors
            .iter()
            .map(|d| IngestSource::try_from(*d))
            .collect::<Result<Vec<_>, _>>()?;
        self.ingest(&sources)
    }

    /// Snapshot of the active catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.snapshot()
    }

    pub fn store(&self) -> Arc<SharedCatalog> {
        self.catalog.clone()
    }

    pub fn resolve(&self, query: &ReactionQuery) -> Result<Arc<ReactionRecord>, XsError> {
        Ok(self.catalog().resolve(query)?)
    }

    pub fn point_lookup(
        &self,
        query: &ReactionQuery,
        energy: ElectronVolt,
        policy: OutOfRangePolicy,
    ) -> Result<PointLookup, XsError> {
        let record = self.resolve(query)?;
        self.facade.point_lookup(&record, energy, policy)
    }

    pub fn raw_window(
        &self,
        query: &ReactionQuery,
        requested: Option<EnergyRange>,
        pagination: Pagination,
    ) -> Result<RawWindow, XsError> {
        let record = self.resolve(query)?;
        self.facade.raw_window(&record, requested, pagination)
    }

    pub fn sampled_window(
        &self,
        query: &ReactionQuery,
        requested: Option<EnergyRange>,
        n_points: Option<usize>,
    ) -> Result<SampledWindow, XsError> {
        let n_points = n_points.unwrap_or(self.config.default_sample_points);
        let record = self.resolve(query)?;
        self.facade.sampled_window(&record, requested, n_points)
    }

    pub fn list_targets(&self, z: AtomicNumber, projectile: Projectile) -> Vec<TargetSummary> {
        self.catalog().list_targets(z, projectile)
    }

    /// Async service reading the same active catalog, later ingestions included.
    pub fn service(&self) -> QueryService {
        QueryService::new(
            self.catalog.clone(),
            self.facade,
            self.config.default_sample_points,
            self.config.max_concurrent_queries,
        )
    }
}
