//! Bounded-concurrency query service.
//!
//! [`QueryService`] fronts a [`SharedCatalog`] for async callers. Each query takes a
//! permit from a FIFO-fair [`Semaphore`] sized by
//! [`XsConfig::max_concurrent_queries`](crate::config::XsConfig); callers over the bound
//! wait in arrival order. A query resolves and evaluates against a single catalog
//! snapshot, so a concurrent rebuild never shows it a mix of old and new records.
//!
//! Dropping a pending query future gives its place in the queue back. Queries never
//! mutate shared state, so cancellation needs no cleanup.
use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::{
    catalog::{diagnostics::ReactionQuery, store::SharedCatalog, Catalog, TargetSummary},
    constants::{AtomicNumber, ElectronVolt},
    query::{
        EnergyRange, OutOfRangePolicy, Pagination, PointLookup, QueryFacade, RawWindow,
        SampledWindow,
    },
    tabulated::reaction::Projectile,
    xs_errors::XsError,
};

#[derive(Debug, Clone)]
pub struct QueryService {
    catalog: Arc<SharedCatalog>,
    facade: QueryFacade,
    default_sample_points: usize,
    permits: Arc<Semaphore>,
}

impl QueryService {
    pub fn new(
        catalog: Arc<SharedCatalog>,
        facade: QueryFacade,
        default_sample_points: usize,
        max_concurrent_queries: usize,
    ) -> Self {
        QueryService {
            catalog,
            facade,
            default_sample_points,
            permits: Arc::new(Semaphore::new(max_concurrent_queries)),
        }
    }

    /// Wait for a permit, then pin the catalog snapshot the query will use.
    async fn admit(&self) -> Result<(SemaphorePermit<'_>, Arc<Catalog>), XsError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| XsError::ServiceClosed)?;
        Ok((permit, self.catalog.snapshot()))
    }

    pub async fn point_lookup(
        &self,
        query: &ReactionQuery,
        energy: ElectronVolt,
        policy: OutOfRangePolicy,
    ) -> Result<PointLookup, XsError> {
        let (_permit, catalog) = self.admit().await?;
        let record = catalog.resolve(query)?;
        self.facade.point_lookup(&record, energy, policy)
    }

    pub async fn raw_window(
        &self,
        query: &ReactionQuery,
        requested: Option<EnergyRange>,
        pagination: Pagination,
    ) -> Result<RawWindow, XsError> {
        let (_permit, catalog) = self.admit().await?;
        let record = catalog.resolve(query)?;
        self.facade.raw_window(&record, requested, pagination)
    }

    /// Sampled window; `n_points` defaults to the configured sample count.
    pub async fn sampled_window(
        &self,
        query: &ReactionQuery,
        requested: Option<EnergyRange>,
        n_points: Option<usize>,
    ) -> Result<SampledWindow, XsError> {
        let (_permit, catalog) = self.admit().await?;
        let record = catalog.resolve(query)?;
        let n_points = n_points.unwrap_or(self.default_sample_points);
        self.facade.sampled_window(&record, requested, n_points)
    }

    pub async fn list_targets(
        &self,
        z: AtomicNumber,
        projectile: Projectile,
    ) -> Result<Vec<TargetSummary>, XsError> {
        let (_permit, catalog) = self.admit().await?;
        Ok(catalog.list_targets(z, projectile))
    }

    /// Permits not held by running queries.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Refuse new queries. Running queries complete; waiting ones fail with
    /// [`XsError::ServiceClosed`]. Affects every clone of the service.
    pub fn close(&self) {
        self.permits.close();
    }
}
