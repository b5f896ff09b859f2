//! Active-catalog holder and persistence seam.
//!
//! [`SharedCatalog`] keeps the catalog currently served behind an [`ArcSwap`]:
//! readers take a snapshot (`Arc<Catalog>`) that stays valid for the whole request,
//! a rebuild installs a new catalog with a single pointer swap. The previous catalog
//! is dropped when its last reader releases it. Writers are serialised, so the
//! catalog served is always the one carrying the highest generation number.
//!
//! [`CatalogStore`] is the interface a persistent backend implements; the in-memory
//! [`SharedCatalog`] is the default one.
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use arc_swap::ArcSwap;
use tracing::info;

use crate::{
    constants::AtomicNumber,
    labels::ReactionDictionary,
    tabulated::reaction::{Projectile, ReactionKey, ReactionRecord},
    xs_errors::XsError,
};

use super::{Catalog, TargetSummary};

/// Storage of reaction records.
///
/// `put_all` replaces the whole content atomically: readers observe either the old
/// records or the new ones, never a mix.
pub trait CatalogStore: Send + Sync {
    fn get(&self, key: &ReactionKey) -> Result<Option<Arc<ReactionRecord>>, XsError>;

    /// Replace every record, returning the number of records held afterwards.
    fn put_all(&self, records: Vec<ReactionRecord>) -> Result<usize, XsError>;

    fn list(&self, z: AtomicNumber, projectile: Projectile) -> Result<Vec<TargetSummary>, XsError>;
}

#[derive(Debug)]
pub struct SharedCatalog {
    active: ArcSwap<Catalog>,
    generation: AtomicU64,
    writer: Mutex<()>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        SharedCatalog {
            active: ArcSwap::from_pointee(catalog),
            generation: AtomicU64::new(0),
            writer: Mutex::new(()),
        }
    }

    pub fn empty(dictionary: Arc<ReactionDictionary>) -> Self {
        Self::new(Catalog::empty(dictionary))
    }

    /// Catalog currently served. Holding the snapshot keeps it alive across swaps.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.active.load_full()
    }

    /// Install `catalog` and return the new generation number.
    pub fn swap(&self, catalog: Catalog) -> u64 {
        let records = catalog.len();
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.load(Ordering::Acquire) + 1;
        self.active.store(Arc::new(catalog));
        self.generation.store(generation, Ordering::Release);
        info!(generation, records, "catalog swapped");
        generation
    }

    /// Number of swaps since construction.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl CatalogStore for SharedCatalog {
    fn get(&self, key: &ReactionKey) -> Result<Option<Arc<ReactionRecord>>, XsError> {
        Ok(self.snapshot().get(key))
    }

    fn put_all(&self, records: Vec<ReactionRecord>) -> Result<usize, XsError> {
        let dictionary = self.snapshot().dictionary().clone();
        let catalog = Catalog::from_records(records, dictionary);
        let len = catalog.len();
        self.swap(catalog);
        Ok(len)
    }

    fn list(&self, z: AtomicNumber, projectile: Projectile) -> Result<Vec<TargetSummary>, XsError> {
        Ok(self.snapshot().list_targets(z, projectile))
    }
}
