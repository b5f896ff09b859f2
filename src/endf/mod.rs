//! # ENDF-6 decoding
//!
//! Turns raw inputs into validated [`ReactionRecord`]s.
//!
//! ## Pipeline
//! -----------------
//! 1. [`source`] expands an [`IngestSource`] into named, decompressed entries.
//! 2. ENDF-6 text is split into 80-column lines ([`fields`]) and grouped into
//!    `(MAT, MF, MT)` sections ([`sections`]).
//! 3. `MF=1/MT=451` is read for target metadata; every `MF=3` section is decoded as a
//!    TAB1 record ([`tab1`]); other sections are skipped and counted.
//! 4. JSON and JSON-Lines entries skip steps 2-3 ([`json_records`]) and go through the
//!    same validation.
//!
//! Failures are kept per record: one bad section does not stop its siblings. The
//! decoder never builds a catalog itself, it hands a [`DecodedBatch`] to the caller.
//!
//! ## Projectile and isomeric state
//! -----------------
//! `MF=3` carries only `ZA`. The projectile and isomeric state come from the
//! material's `MF=1/MT=451` header when present, then from the
//! [`NamingConventionResolver`] applied to the entry name. The isomeric state
//! defaults to the ground state; a missing projectile fails the section with
//! [`FormatError::UnresolvedProjectile`].
pub mod fields;
pub mod format_error;
pub mod json_records;
pub mod naming;
pub(crate) mod sections;
pub mod source;
pub(crate) mod tab1;

use std::collections::HashMap;

use tracing::debug;

pub use fields::{parse_endf_float, parse_endf_int};
pub use format_error::{FormatError, Origin, RegionDefect};
pub use naming::{EndfFileNaming, NamingConventionResolver, SourceHints};
pub use source::{EntryFormat, IngestSource, SourceEntry};
pub use tab1::split_za;

use crate::{
    constants::{MF_CROSS_SECTIONS, MF_GENERAL_INFO, MT_DESCRIPTION},
    labels::ReactionDictionary,
    tabulated::reaction::{ReactionKey, ReactionRecord},
    xs_errors::XsError,
};

use sections::{group_sections, material_info, MaterialInfo};

/// Per-record outcome of decoding one or more inputs.
#[derive(Debug, Clone, Default)]
pub struct DecodedBatch {
    /// One entry per `MF=3` section or JSON record, in input order.
    pub records: Vec<Result<ReactionRecord, FormatError>>,
    /// Sections that are neither cross sections nor material metadata.
    pub sections_skipped: usize,
}

impl DecodedBatch {
    pub fn extend(&mut self, other: DecodedBatch) {
        self.records.extend(other.records);
        self.sections_skipped += other.sections_skipped;
    }

    pub fn failures(&self) -> impl Iterator<Item = &FormatError> {
        self.records.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Stateless decoder bound to a label dictionary and a naming convention.
#[derive(Debug, Clone, Copy)]
pub struct EndfDecoder<'a> {
    dictionary: &'a ReactionDictionary,
    resolver: &'a dyn NamingConventionResolver,
    source_version: &'a str,
}

impl<'a> EndfDecoder<'a> {
    pub fn new(
        dictionary: &'a ReactionDictionary,
        resolver: &'a dyn NamingConventionResolver,
        source_version: &'a str,
    ) -> Self {
        EndfDecoder {
            dictionary,
            resolver,
            source_version,
        }
    }

    /// Decode the `MF=3` sections of one ENDF-6 text.
    ///
    /// Arguments
    /// -----------------
    /// * `name`: origin name (file path or `archive!member`), also fed to the naming resolver.
    /// * `text`: the whole ENDF-6 text, any number of materials.
    ///
    /// Return
    /// ----------
    /// * A batch with one result per `MF=3` section. A line whose control columns
    ///   (`MAT`/`MF`/`MT`) do not decode fails the `MF=3` section it interrupts, or
    ///   stands as its own error between sections; it never fails its siblings.
    pub fn decode_text(&self, name: &str, text: &str) -> DecodedBatch {
        let hints = self.resolver.resolve(name);
        let mut materials: HashMap<i32, MaterialInfo> = HashMap::new();
        let mut batch = DecodedBatch::default();

        for grouped in group_sections(text, &Origin::named(name)) {
            let section = match &grouped {
                Ok(section) => section,
                Err(err) => {
                    batch.records.push(Err(err.clone()));
                    continue;
                }
            };
            match (section.mf, section.mt) {
                (MF_GENERAL_INFO, MT_DESCRIPTION) => {
                    let origin = Origin::section(name, section.mat, MT_DESCRIPTION as u32);
                    materials.insert(section.mat, material_info(section, &origin));
                }
                (MF_CROSS_SECTIONS, mt) => {
                    let origin = Origin::section(name, section.mat, mt as u32);
                    let info = materials.get(&section.mat).copied().unwrap_or_default();
                    batch
                        .records
                        .push(self.decode_cross_section(section, info, hints, origin));
                }
                (mf, mt) => {
                    debug!(source = name, mat = section.mat, mf, mt, "skipping section");
                    batch.sections_skipped += 1;
                }
            }
        }
        batch
    }

    fn decode_cross_section(
        &self,
        section: &sections::Section,
        info: MaterialInfo,
        hints: SourceHints,
        origin: Origin,
    ) -> Result<ReactionRecord, FormatError> {
        if let Some(defect) = &section.defect {
            return Err(defect.clone());
        }
        let tab1 = tab1::decode_tab1(section, &origin)?;

        let projectile = info
            .projectile
            .or(hints.projectile)
            .ok_or_else(|| FormatError::UnresolvedProjectile {
                origin: origin.clone(),
            })?;
        let state = info.isomeric_state.or(hints.isomeric_state).unwrap_or(0);
        let mt = section.mt as u32;

        Ok(ReactionRecord {
            key: ReactionKey {
                z: tab1.z,
                a: tab1.a,
                state,
                projectile,
                mt,
            },
            reaction_label: self.dictionary.label_for(projectile, mt),
            function: tab1.function,
            source_version: self.source_version.to_string(),
            origin: origin.name,
        })
    }

    pub fn decode_json(&self, name: &str, text: &str) -> DecodedBatch {
        DecodedBatch {
            records: json_records::decode_json_document(
                name,
                text,
                self.dictionary,
                self.source_version,
            ),
            sections_skipped: 0,
        }
    }

    pub fn decode_json_lines(&self, name: &str, text: &str) -> DecodedBatch {
        DecodedBatch {
            records: json_records::decode_json_lines(
                name,
                text,
                self.dictionary,
                self.source_version,
            ),
            sections_skipped: 0,
        }
    }

    /// Decode one source entry according to its format.
    ///
    /// Non UTF-8 content is decoded lossily, the replacement characters then fail
    /// the affected ENDF line as a non-ASCII field.
    pub fn decode_entry(&self, entry: &SourceEntry) -> DecodedBatch {
        let text = String::from_utf8_lossy(&entry.bytes);
        match entry.format {
            EntryFormat::Endf => self.decode_text(&entry.name, &text),
            EntryFormat::Json => self.decode_json(&entry.name, &text),
            EntryFormat::JsonLines => self.decode_json_lines(&entry.name, &text),
        }
    }

    /// Read and decode every entry of a source.
    ///
    /// Return
    /// ----------
    /// * The decoded batch, or an [`XsError`] if the source itself cannot be read
    ///   (missing file, corrupt archive, ...). Decoding failures stay inside the batch.
    pub fn decode_source(&self, source: &IngestSource) -> Result<DecodedBatch, XsError> {
        let mut batch = DecodedBatch::default();
        for entry in source.entries()? {
            batch.extend(self.decode_entry(&entry));
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod endf_test {
    use super::*;
    use crate::tabulated::reaction::Projectile;

    fn line(body: &str, mat: i32, mf: i32, mt: i32) -> String {
        format!("{body:<66}{mat:>4}{mf:>2}{mt:>3}{:>5}", 1)
    }

    fn li6_text(with_header: bool) -> String {
        let mut lines = vec![line(" Li-6 test tape", 1, 0, 0)];
        if with_header {
            lines.extend([
                line(" 3.006000+3 5.963400+0          1          0          0          0", 325, 1, 451),
                line(" 0.000000+0 1.000000+0          0          1          0          6", 325, 1, 451),
                line(" 1.000000+0 2.000000+7          0          0      10010          6", 325, 1, 451),
                line("", 325, 1, 0),
            ]);
        }
        lines.extend([
            line(" 3.006000+3 5.963400+0          0          0          0          0", 325, 3, 2),
            line(" 0.000000+0 0.000000+0          0          0          1          2", 325, 3, 2),
            line("          2          2", 325, 3, 2),
            line(" 1.000000-5 1.000000+0 2.000000+7 3.000000+0", 325, 3, 2),
            line("", 325, 3, 0),
            line(" 3.006000+3 5.963400+0          0          0          0          0", 325, 3, 102),
            line(" 0.000000+0 0.000000+0          0          0          1          2", 325, 3, 102),
            line("          2          9", 325, 3, 102),
            line(" 1.000000-5 1.000000+0 2.000000+7 3.000000+0", 325, 3, 102),
            line("", 325, 3, 0),
            line(" 3.006000+3 5.963400+0          0          0          0          0", 325, 4, 2),
            line("", 325, 4, 0),
            line("", 325, 0, 0),
            line("", 0, 0, 0),
            line("", -1, 0, 0),
        ]);
        lines.join("\n")
    }

    fn decode(name: &str, text: &str) -> DecodedBatch {
        let dictionary = ReactionDictionary::embedded().unwrap();
        let naming = EndfFileNaming::new();
        EndfDecoder::new(&dictionary, &naming, "test-1.0").decode_text(name, text)
    }

    #[test]
    fn test_sibling_sections_decode_independently() {
        let batch = decode("n-003_Li_006.endf", &li6_text(false));
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.sections_skipped, 1);

        let elastic = batch.records[0].as_ref().unwrap();
        assert_eq!(elastic.key, ReactionKey { z: 3, a: 6, state: 0, projectile: Projectile::Neutron, mt: 2 });
        assert_eq!(elastic.reaction_label, "n,elastic");
        assert_eq!(elastic.source_version, "test-1.0");
        assert_eq!(elastic.origin, "n-003_Li_006.endf");

        assert!(matches!(
            batch.records[1],
            Err(FormatError::InvalidRegions {
                defect: RegionDefect::UnknownLaw(9),
                ..
            })
        ));
        assert!(!batch.is_clean());
    }

    #[test]
    fn test_header_overrides_file_name() {
        let batch = decode("n-003_Li_006.endf", &li6_text(true));
        let record = batch.records[0].as_ref().unwrap();
        assert_eq!(record.key.projectile, Projectile::Proton);
        assert_eq!(record.key.state, 1);
    }

    #[test]
    fn test_unresolved_projectile() {
        let batch = decode("li6.endf", &li6_text(false));
        assert!(matches!(
            batch.records[0],
            Err(FormatError::UnresolvedProjectile { .. })
        ));
    }

    #[test]
    fn test_broken_control_columns_stay_local() {
        let text = format!("{}\n{:<66}  ?? 3  2    1", li6_text(false), "");
        let batch = decode("n-003_Li_006.endf", &text);
        assert_eq!(batch.records.len(), 3);
        assert!(batch.records[0].is_ok());
        assert!(matches!(
            batch.records[2],
            Err(FormatError::InvalidField { field: 7, .. })
        ));
    }

    #[test]
    fn test_accented_comment_does_not_hide_cross_sections() {
        let mut lines: Vec<String> = li6_text(true).lines().map(str::to_string).collect();
        lines.insert(4, line(" Evaluated by J. Müller, Université de Liège", 325, 1, 451));
        let batch = decode("n-003_Li_006.endf", &lines.join("\n"));

        assert_eq!(batch.records.len(), 2);
        let elastic = batch.records[0].as_ref().unwrap();
        assert_eq!(elastic.key.projectile, Projectile::Proton);
        assert_eq!(elastic.key.state, 1);
    }
}
