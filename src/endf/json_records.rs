//! Pre-decoded JSON and JSON-Lines reaction records.
//!
//! Some sources ship cross sections already decoded, one object per reaction:
//!
//! ```json
//! {"Z": 3, "A": 6, "state": 0, "projectile": "n", "mt": 105, "reaction": "n,t",
//!  "e_min_eV": 1e-5, "e_max_eV": 2e7,
//!  "points": [{"point_index": 1, "e_eV": 1e-5, "sigma_b": 9.4e3}, ...],
//!  "interp": [{"nbt": 2, "int_law": 5}]}
//! ```
//!
//! Such records bypass text decoding but go through the same validation as TAB1
//! sections ([`TabulatedFunction::new`]). Points are ordered by `point_index` and
//! re-indexed `1..=N`; `e_min_eV`/`e_max_eV` are derived values and are not trusted.
use serde::Deserialize;
use serde_json::Value;

use crate::{
    constants::{AtomicNumber, MassNumber, Mt},
    labels::ReactionDictionary,
    tabulated::{
        reaction::{Projectile, ReactionKey, ReactionRecord},
        TabulatedFunction,
    },
};

use super::{FormatError, Origin};

#[derive(Debug, Clone, Deserialize)]
pub struct JsonPoint {
    pub point_index: i64,
    #[serde(rename = "e_eV")]
    pub e_ev: f64,
    pub sigma_b: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRegion {
    pub nbt: i64,
    pub int_law: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonReaction {
    #[serde(rename = "Z")]
    pub z: AtomicNumber,
    #[serde(rename = "A")]
    pub a: MassNumber,
    #[serde(default)]
    pub state: u32,
    pub projectile: String,
    pub mt: Mt,
    #[serde(default)]
    pub reaction: Option<String>,
    #[serde(default, rename = "e_min_eV")]
    pub e_min_ev: Option<f64>,
    #[serde(default, rename = "e_max_eV")]
    pub e_max_ev: Option<f64>,
    pub points: Vec<JsonPoint>,
    pub interp: Vec<JsonRegion>,
    #[serde(default)]
    pub source_version: Option<String>,
}

impl JsonReaction {
    pub(crate) fn into_record(
        self,
        name: &str,
        dictionary: &ReactionDictionary,
        default_version: &str,
    ) -> Result<ReactionRecord, FormatError> {
        let origin = Origin {
            name: name.to_string(),
            mat: None,
            mt: Some(self.mt),
        };
        let projectile: Projectile = self
            .projectile
            .parse()
            .map_err(|_| FormatError::UnresolvedProjectile {
                origin: origin.clone(),
            })?;

        let mut points = self.points;
        points.sort_by_key(|p| p.point_index);
        let pairs = points.into_iter().map(|p| (p.e_ev, p.sigma_b)).collect();
        let regions = self.interp.into_iter().map(|r| (r.nbt, r.int_law)).collect();
        let function = TabulatedFunction::new(pairs, regions, &origin)?;

        let key = ReactionKey {
            z: self.z,
            a: self.a,
            state: self.state,
            projectile,
            mt: self.mt,
        };
        let reaction_label = self
            .reaction
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| dictionary.label_for(projectile, self.mt));

        Ok(ReactionRecord {
            key,
            reaction_label,
            function,
            source_version: self
                .source_version
                .unwrap_or_else(|| default_version.to_string()),
            origin: name.to_string(),
        })
    }
}

fn malformed(name: &str, line: Option<usize>, err: &serde_json::Error) -> FormatError {
    FormatError::MalformedJson {
        origin: Origin::named(name),
        line: line.or(Some(err.line()).filter(|&l| l > 0)),
        detail: err.to_string(),
    }
}

/// Decode a `.json` document holding one record or an array of records.
pub(crate) fn decode_json_document(
    name: &str,
    text: &str,
    dictionary: &ReactionDictionary,
    default_version: &str,
) -> Vec<Result<ReactionRecord, FormatError>> {
    let document: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => return vec![Err(malformed(name, None, &err))],
    };

    let items = match document {
        Value::Array(items) => items,
        single => vec![single],
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<JsonReaction>(item)
                .map_err(|err| malformed(name, None, &err))
                .and_then(|record| record.into_record(name, dictionary, default_version))
        })
        .collect()
}

/// Decode JSON-Lines input: one record per non-blank line, each failing on its own.
pub(crate) fn decode_json_lines(
    name: &str,
    text: &str,
    dictionary: &ReactionDictionary,
    default_version: &str,
) -> Vec<Result<ReactionRecord, FormatError>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<JsonReaction>(line)
                .map_err(|err| malformed(name, Some(i + 1), &err))
                .and_then(|record| record.into_record(name, dictionary, default_version))
        })
        .collect()
}
