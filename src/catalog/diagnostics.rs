//! Lookup requests and structured not-found diagnostics.
//!
//! A failed lookup never returns a bare "not found": it says what the catalog does
//! hold for the request so that a caller (or a user interface) can offer
//! alternatives. Both diagnostics serialise to JSON.
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::{
    constants::{MassNumber, Mt},
    tabulated::reaction::TargetId,
};

/// Which reaction of a target is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionSelector {
    Mt(Mt),
    /// A reaction label or one of its synonyms (`"n,gamma"`, `"(n,g)"`).
    Label(String),
    /// Both must designate the same record.
    Both { mt: Mt, label: String },
}

impl ReactionSelector {
    pub fn mt(&self) -> Option<Mt> {
        match self {
            ReactionSelector::Mt(mt) | ReactionSelector::Both { mt, .. } => Some(*mt),
            ReactionSelector::Label(_) => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ReactionSelector::Label(label) | ReactionSelector::Both { label, .. } => Some(label),
            ReactionSelector::Mt(_) => None,
        }
    }
}

impl fmt::Display for ReactionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactionSelector::Mt(mt) => write!(f, "MT={mt}"),
            ReactionSelector::Label(label) => write!(f, "{label:?}"),
            ReactionSelector::Both { mt, label } => write!(f, "MT={mt} {label:?}"),
        }
    }
}

/// One catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionQuery {
    pub target: TargetId,
    pub selector: ReactionSelector,
}

impl ReactionQuery {
    pub fn by_mt(target: TargetId, mt: Mt) -> Self {
        ReactionQuery {
            target,
            selector: ReactionSelector::Mt(mt),
        }
    }

    pub fn by_label(target: TargetId, label: impl Into<String>) -> Self {
        ReactionQuery {
            target,
            selector: ReactionSelector::Label(label.into()),
        }
    }

    pub fn by_mt_and_label(target: TargetId, mt: Mt, label: impl Into<String>) -> Self {
        ReactionQuery {
            target,
            selector: ReactionSelector::Both {
                mt,
                label: label.into(),
            },
        }
    }
}

/// `(A, isomeric state)` of a target held for the requested `Z` and projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AvailableTarget {
    #[serde(rename = "A")]
    pub a: MassNumber,
    pub state: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownTarget {
    pub requested: TargetId,
    /// Every target with the same `Z` and projectile, sorted.
    pub available: Vec<AvailableTarget>,
}

/// Reaction the caller probably meant, taken from the alias table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasSuggestion {
    pub suggested_reaction: String,
    pub suggested_mt: Mt,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownReaction {
    pub target: TargetId,
    pub requested_mt: Option<Mt>,
    pub requested_label: Option<String>,
    /// Sorted `MT`s held for the target.
    pub available_mts: Vec<Mt>,
    /// Labels of `available_mts`, same order.
    pub available_reactions: Vec<String>,
    pub suggestion: Option<AliasSuggestion>,
}

/// A catalog lookup that matched nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotFoundError {
    #[error("unknown target {}; available (A, state) for Z={}: {}", .0.requested, .0.requested.z, list_targets(&.0.available))]
    UnknownTarget(UnknownTarget),
    #[error("no reaction {} for target {}; available MTs: {:?}{}", requested(.0), .0.target, .0.available_mts, hint(&.0.suggestion))]
    UnknownReaction(UnknownReaction),
}

fn list_targets(available: &[AvailableTarget]) -> String {
    if available.is_empty() {
        return "none".to_string();
    }
    available
        .iter()
        .map(|t| format!("({}, {})", t.a, t.state))
        .collect::<Vec<_>>()
        .join(", ")
}

fn requested(reaction: &UnknownReaction) -> String {
    match (&reaction.requested_mt, &reaction.requested_label) {
        (Some(mt), Some(label)) => format!("MT={mt} {label:?}"),
        (Some(mt), None) => format!("MT={mt}"),
        (None, Some(label)) => format!("{label:?}"),
        (None, None) => String::new(),
    }
}

fn hint(suggestion: &Option<AliasSuggestion>) -> String {
    suggestion
        .as_ref()
        .map(|s| {
            format!(
                "; did you mean {:?} (MT={})? {}",
                s.suggested_reaction, s.suggested_mt, s.reason
            )
        })
        .unwrap_or_default()
}
