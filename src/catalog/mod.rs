//! # Reaction catalog
//!
//! A [`Catalog`] is the immutable set of [`ReactionRecord`]s produced by one ingestion
//! run, indexed by target then by `MT`.
//!
//! ## Building
//! -----------------
//! [`Catalog::build`] consumes the per-record results of the decoder:
//!
//! * any failed record rejects the whole build, and the error lists **every** failure,
//! * two records with the same [`ReactionKey`] keep the later one (input order),
//!   the overwrite is logged and counted.
//!
//! A catalog is never modified after construction; a rebuild produces a new one,
//! swapped in by [`store::SharedCatalog`].
//!
//! ## Lookups
//! -----------------
//! [`Catalog::resolve`] answers a [`ReactionQuery`] with the record or a
//! [`NotFoundError`] describing what the catalog holds instead.
pub mod diagnostics;
pub mod store;

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;
use tracing::debug;

use crate::{
    constants::{AtomicNumber, ElectronVolt, MassNumber, Mt},
    endf::FormatError,
    labels::{normalize_label, ReactionDictionary},
    tabulated::reaction::{Projectile, ReactionKey, ReactionRecord, TargetId},
    xs_errors::XsError,
};

use diagnostics::{
    AliasSuggestion, AvailableTarget, NotFoundError, ReactionQuery, ReactionSelector,
    UnknownReaction, UnknownTarget,
};

/// One line of [`Catalog::list_targets`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSummary {
    #[serde(rename = "A")]
    pub a: MassNumber,
    pub state: u32,
    pub reaction_count: usize,
    /// Lowest tabulated energy over the target's reactions.
    #[serde(rename = "e_min_eV")]
    pub e_min: ElectronVolt,
    /// Highest tabulated energy over the target's reactions.
    #[serde(rename = "e_max_eV")]
    pub e_max: ElectronVolt,
}

type Reactions = BTreeMap<Mt, Arc<ReactionRecord>>;

#[derive(Debug, Clone)]
pub struct Catalog {
    targets: BTreeMap<TargetId, Reactions>,
    dictionary: Arc<ReactionDictionary>,
    len: usize,
    replaced: usize,
}

impl Catalog {
    /// Empty catalog, the state of a library before its first ingestion.
    pub fn empty(dictionary: Arc<ReactionDictionary>) -> Self {
        Catalog {
            targets: BTreeMap::new(),
            dictionary,
            len: 0,
            replaced: 0,
        }
    }

    /// Build a catalog from decoder output.
    ///
    /// Arguments
    /// -----------------
    /// * `records`: per-record decoding results, in ingestion order.
    /// * `dictionary`: labels used to resolve label selectors and alias suggestions.
    ///
    /// Return
    /// ----------
    /// * The catalog, or [`XsError::CatalogRejected`] carrying every decoding failure.
    pub fn build<I>(records: I, dictionary: Arc<ReactionDictionary>) -> Result<Self, XsError>
    where
        I: IntoIterator<Item = Result<ReactionRecord, FormatError>>,
    {
        let mut valid = Vec::new();
        let mut failures = Vec::new();
        for record in records {
            match record {
                Ok(record) => valid.push(record),
                Err(err) => failures.push(err),
            }
        }
        if !failures.is_empty() {
            return Err(XsError::CatalogRejected(failures));
        }
        Ok(Self::from_records(valid, dictionary))
    }

    /// Build a catalog from records known to be valid. Later records win on key collisions.
    pub fn from_records<I>(records: I, dictionary: Arc<ReactionDictionary>) -> Self
    where
        I: IntoIterator<Item = ReactionRecord>,
    {
        let mut catalog = Catalog::empty(dictionary);
        for record in records {
            let key = record.key;
            let origin = record.origin.clone();
            let previous = catalog
                .targets
                .entry(key.target())
                .or_default()
                .insert(key.mt, Arc::new(record));

            match previous {
                Some(previous) => {
                    debug!(
                        key = %key,
                        replaced = %previous.origin,
                        by = %origin,
                        "duplicate reaction key, keeping the later record"
                    );
                    catalog.replaced += 1;
                }
                None => catalog.len += 1,
            }
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Records overwritten by a later record with the same key during the build.
    pub fn replaced(&self) -> usize {
        self.replaced
    }

    pub fn dictionary(&self) -> &Arc<ReactionDictionary> {
        &self.dictionary
    }

    pub fn get(&self, key: &ReactionKey) -> Option<Arc<ReactionRecord>> {
        self.targets.get(&key.target())?.get(&key.mt).cloned()
    }

    /// Every record, ordered by key.
    pub fn records(&self) -> impl Iterator<Item = &Arc<ReactionRecord>> {
        self.targets.values().flat_map(|reactions| reactions.values())
    }

    /// Resolve one lookup.
    ///
    /// Labels are compared normalised, first with the records' own labels, then
    /// through the dictionary (synonyms accepted). A `Both` selector only matches
    /// when the label designates the record held under the requested `MT`.
    ///
    /// Return
    /// ----------
    /// * The record, or
    ///   - [`NotFoundError::UnknownTarget`] with the `(A, state)` present for the same `Z`
    ///     and projectile,
    ///   - [`NotFoundError::UnknownReaction`] with the target's reactions and, when the
    ///     alias table knows a better reaction that the target holds, a suggestion.
    pub fn resolve(&self, query: &ReactionQuery) -> Result<Arc<ReactionRecord>, NotFoundError> {
        let target = &query.target;
        let Some(reactions) = self.targets.get(target) else {
            return Err(NotFoundError::UnknownTarget(UnknownTarget {
                requested: *target,
                available: self.available_targets(target.z, target.projectile),
            }));
        };

        let record = match &query.selector {
            ReactionSelector::Mt(mt) => reactions.get(mt),
            ReactionSelector::Label(label) => self.find_by_label(target, reactions, label),
            ReactionSelector::Both { mt, label } => reactions
                .get(mt)
                .filter(|record| self.designates(record, label)),
        };
        if let Some(record) = record {
            return Ok(record.clone());
        }

        Err(NotFoundError::UnknownReaction(
            self.unknown_reaction(target, reactions, &query.selector),
        ))
    }

    /// The record carrying `label` itself, else the one the dictionary maps it to.
    fn find_by_label<'r>(
        &self,
        target: &TargetId,
        reactions: &'r Reactions,
        label: &str,
    ) -> Option<&'r Arc<ReactionRecord>> {
        let normalized = normalize_label(label);
        reactions
            .values()
            .find(|record| normalize_label(&record.reaction_label) == normalized)
            .or_else(|| {
                self.dictionary
                    .mt_for_label(target.projectile, label)
                    .and_then(|mt| reactions.get(&mt))
            })
    }

    /// Whether `label` names `record`, by its own label or through the dictionary.
    fn designates(&self, record: &ReactionRecord, label: &str) -> bool {
        normalize_label(&record.reaction_label) == normalize_label(label)
            || self.dictionary.mt_for_label(record.key.projectile, label) == Some(record.key.mt)
    }

    fn unknown_reaction(
        &self,
        target: &TargetId,
        reactions: &Reactions,
        selector: &ReactionSelector,
    ) -> UnknownReaction {
        let suggestion = selector
            .label()
            .and_then(|label| self.dictionary.alias_for(target, label))
            .and_then(|rule| {
                let suggested_mt = self
                    .dictionary
                    .mt_for_label(target.projectile, &rule.suggested)?;
                reactions.contains_key(&suggested_mt).then(|| AliasSuggestion {
                    suggested_reaction: rule.suggested.clone(),
                    suggested_mt,
                    reason: rule.reason.clone(),
                })
            });

        UnknownReaction {
            target: *target,
            requested_mt: selector.mt(),
            requested_label: selector.label().map(str::to_string),
            available_mts: reactions.keys().copied().collect(),
            available_reactions: reactions
                .values()
                .map(|record| record.reaction_label.clone())
                .collect(),
            suggestion,
        }
    }

    fn targets_of(
        &self,
        z: AtomicNumber,
        projectile: Projectile,
    ) -> impl Iterator<Item = (&TargetId, &Reactions)> {
        self.targets
            .iter()
            .filter(move |(id, _)| id.z == z && id.projectile == projectile)
    }

    fn available_targets(&self, z: AtomicNumber, projectile: Projectile) -> Vec<AvailableTarget> {
        // BTreeMap order on TargetId is (z, a, state, projectile), already sorted by (a, state)
        self.targets_of(z, projectile)
            .map(|(id, _)| AvailableTarget {
                a: id.a,
                state: id.state,
            })
            .collect()
    }

    /// Targets held for `z` and `projectile`, sorted by `(A, state)`.
    pub fn list_targets(&self, z: AtomicNumber, projectile: Projectile) -> Vec<TargetSummary> {
        self.targets_of(z, projectile)
            .map(|(id, reactions)| {
                let functions = reactions.values().map(|r| &r.function);
                TargetSummary {
                    a: id.a,
                    state: id.state,
                    reaction_count: reactions.len(),
                    e_min: functions
                        .clone()
                        .map(|f| f.e_min())
                        .fold(f64::INFINITY, f64::min),
                    e_max: functions.map(|f| f.e_max()).fold(f64::NEG_INFINITY, f64::max),
                }
            })
            .collect()
    }
}
