//! # Reaction labels and alias suggestions
//!
//! The dictionary maps `(projectile, MT)` to a human-readable reaction label
//! (`(n, 102) -> "n,gamma"`), maps labels and their common spellings back to `MT`,
//! and holds a small table of **alias suggestions** for labels that a user is
//! likely to ask for but that a given nuclide files under another reaction.
//!
//! Both tables are plain CSV data shipped with the crate (`data/*.csv`) and can be
//! replaced at runtime through [`ReactionDictionary::from_csv_readers`], so they
//! are maintained as data rather than as control flow.
//!
//! ```text
//! reaction_labels.csv : projectile,mt,label,synonyms       (synonyms separated by ';')
//! label_aliases.csv   : projectile,z,a,state,requested,suggested,reason
//! ```
//!
//! Labels are compared after [`normalize_label`]: lower case, without blanks or
//! parentheses, so `"(n,g)"`, `"N, G"` and `"n,g"` are the same label.
use std::{collections::HashMap, io::Read};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{AtomicNumber, MassNumber, Mt},
    tabulated::reaction::{Projectile, TargetId},
    xs_errors::XsError,
};

static REACTION_LABELS: &str = include_str!("data/reaction_labels.csv");
static LABEL_ALIASES: &str = include_str!("data/label_aliases.csv");

/// Canonical comparison form of a reaction label.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Deserialize)]
struct LabelRow {
    projectile: String,
    mt: Mt,
    label: String,
    #[serde(default)]
    synonyms: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AliasRow {
    projectile: String,
    z: AtomicNumber,
    a: MassNumber,
    state: Option<u32>,
    requested: String,
    suggested: String,
    reason: String,
}

/// One alias suggestion: on `target`, a request for `requested` should look at
/// `suggested` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasRule {
    pub projectile: Projectile,
    pub z: AtomicNumber,
    pub a: MassNumber,
    /// `None` matches every isomeric state.
    pub state: Option<u32>,
    pub requested: String,
    /// `MT` the dictionary gives to `requested`, if any.
    pub requested_mt: Option<Mt>,
    pub suggested: String,
    pub reason: String,
}

impl AliasRule {
    /// Whether the rule covers a request on `target`. Requests are compared by `MT`
    /// (`requested_mt` is the `MT` of the caller's label), so every spelling of the
    /// reaction matches; labels unknown to the dictionary are compared literally.
    fn applies_to(&self, target: &TargetId, requested: &str, requested_mt: Option<Mt>) -> bool {
        let same_reaction = match (self.requested_mt, requested_mt) {
            (Some(rule_mt), Some(mt)) => rule_mt == mt,
            _ => self.requested == normalize_label(requested),
        };
        self.projectile == target.projectile
            && self.z == target.z
            && self.a == target.a
            && self.state.map_or(true, |s| s == target.state)
            && same_reaction
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReactionDictionary {
    labels: HashMap<(Projectile, Mt), String>,
    by_label: HashMap<(Projectile, String), Mt>,
    aliases: Vec<AliasRule>,
}

fn parse_projectile(text: &str) -> Result<Projectile, XsError> {
    text.parse().map_err(XsError::InvalidDictionaryEntry)
}

impl ReactionDictionary {
    /// Dictionary built from the tables shipped with the crate.
    pub fn embedded() -> Result<Self, XsError> {
        Self::from_csv_readers(REACTION_LABELS.as_bytes(), LABEL_ALIASES.as_bytes())
    }

    /// Build a dictionary from caller-maintained CSV tables.
    ///
    /// Arguments
    /// -----------------
    /// * `labels`: rows `projectile,mt,label,synonyms` with a header line.
    /// * `aliases`: rows `projectile,z,a,state,requested,suggested,reason` with a header line.
    ///
    /// Return
    /// ----------
    /// * The dictionary, or [`XsError::DictionaryError`] / [`XsError::InvalidDictionaryEntry`]
    ///   on malformed rows. A label or synonym claimed by two `MT`s is rejected.
    pub fn from_csv_readers<L: Read, A: Read>(labels: L, aliases: A) -> Result<Self, XsError> {
        let mut dictionary = ReactionDictionary::default();

        for row in csv::Reader::from_reader(labels).deserialize::<LabelRow>() {
            let row = row?;
            let projectile = parse_projectile(&row.projectile)?;
            let spellings = std::iter::once(row.label.as_str()).chain(
                row.synonyms
                    .as_deref()
                    .unwrap_or_default()
                    .split(';')
                    .filter(|s| !s.trim().is_empty()),
            );
            for spelling in spellings {
                let key = (projectile, normalize_label(spelling));
                if let Some(previous) = dictionary.by_label.insert(key, row.mt) {
                    if previous != row.mt {
                        return Err(XsError::InvalidDictionaryEntry(format!(
                            "label {spelling:?} maps to both MT={previous} and MT={}",
                            row.mt
                        )));
                    }
                }
            }
            dictionary.labels.insert((projectile, row.mt), row.label);
        }

        for row in csv::Reader::from_reader(aliases).deserialize::<AliasRow>() {
            let row = row?;
            let projectile = parse_projectile(&row.projectile)?;
            let requested_mt = dictionary.mt_for_label(projectile, &row.requested);
            dictionary.aliases.push(AliasRule {
                projectile,
                z: row.z,
                a: row.a,
                state: row.state,
                requested: normalize_label(&row.requested),
                requested_mt,
                suggested: row.suggested,
                reason: row.reason,
            });
        }

        Ok(dictionary)
    }

    /// Label of `(projectile, mt)`, or `"{projectile},mt{MT}"` when the code is unmapped.
    pub fn label_for(&self, projectile: Projectile, mt: Mt) -> String {
        self.labels
            .get(&(projectile, mt))
            .cloned()
            .unwrap_or_else(|| format!("{projectile},mt{mt}"))
    }

    /// `MT` designated by a label or one of its synonyms.
    pub fn mt_for_label(&self, projectile: Projectile, label: &str) -> Option<Mt> {
        let normalized = normalize_label(label);
        self.by_label
            .get(&(projectile, normalized.clone()))
            .copied()
            .or_else(|| {
                // unmapped codes round-trip through their generated label
                normalized
                    .strip_prefix(&format!("{projectile},mt"))
                    .and_then(|digits| digits.parse().ok())
            })
    }

    pub fn alias_for(&self, target: &TargetId, requested: &str) -> Option<&AliasRule> {
        let requested_mt = self.mt_for_label(target.projectile, requested);
        self.aliases
            .iter()
            .find(|rule| rule.applies_to(target, requested, requested_mt))
    }
}

#[cfg(test)]
mod labels_test {
    use super::*;

    #[test]
    fn test_embedded_tables() {
        let dict = ReactionDictionary::embedded().unwrap();
        assert_eq!(dict.label_for(Projectile::Neutron, 102), "n,gamma");
        assert_eq!(dict.label_for(Projectile::Neutron, 2), "n,elastic");
        assert_eq!(dict.label_for(Projectile::Proton, 4), "p,n");
        assert_eq!(dict.label_for(Projectile::Neutron, 849), "n,mt849");
    }

    #[test]
    fn test_label_lookup_and_synonyms() {
        let dict = ReactionDictionary::embedded().unwrap();
        assert_eq!(dict.mt_for_label(Projectile::Neutron, "(N, G)"), Some(102));
        assert_eq!(dict.mt_for_label(Projectile::Neutron, "n,a"), Some(107));
        assert_eq!(dict.mt_for_label(Projectile::Neutron, "n,mt849"), Some(849));
        assert_eq!(dict.mt_for_label(Projectile::Proton, "n,gamma"), None);
    }

    #[test]
    fn test_alias_rule() {
        let dict = ReactionDictionary::embedded().unwrap();
        let li6 = TargetId::new(3, 6, 0, Projectile::Neutron);
        let rule = dict.alias_for(&li6, "n,a").unwrap();
        assert_eq!(rule.suggested, "n,t");
        assert_eq!(rule.requested_mt, Some(107));
        assert!(rule.reason.contains("MT=105"));
        for spelling in ["n,alpha", "(N, ALPHA)", "n,mt107"] {
            assert_eq!(dict.alias_for(&li6, spelling), Some(rule), "{spelling}");
        }
        assert!(dict.alias_for(&li6, "n,p").is_none());

        let li7 = TargetId::new(3, 7, 0, Projectile::Neutron);
        assert!(dict.alias_for(&li7, "n,a").is_none());
    }

    #[test]
    fn test_alias_for_unmapped_label_is_literal() {
        let labels = "projectile,mt,label,synonyms\nn,105,\"n,t\",\n";
        let aliases = "projectile,z,a,state,requested,suggested,reason\nn,3,6,,\"n,triton\",\"n,t\",spelling\n";
        let dict = ReactionDictionary::from_csv_readers(labels.as_bytes(), aliases.as_bytes())
            .unwrap();
        let li6 = TargetId::new(3, 6, 0, Projectile::Neutron);
        assert!(dict.alias_for(&li6, "N,Triton").is_some());
        assert!(dict.alias_for(&li6, "n,t").is_none());
    }

    #[test]
    fn test_conflicting_label_is_rejected() {
        let labels = "projectile,mt,label,synonyms\nn,102,\"n,gamma\",\nn,103,\"n,p\",\"n,gamma\"\n";
        let aliases = "projectile,z,a,state,requested,suggested,reason\n";
        let err = ReactionDictionary::from_csv_readers(labels.as_bytes(), aliases.as_bytes())
            .unwrap_err();
        assert!(matches!(err, XsError::InvalidDictionaryEntry(_)));
    }
}
