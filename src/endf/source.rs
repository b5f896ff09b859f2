//! # Ingestion sources
//!
//! An [`IngestSource`] names where cross sections are read from. It is usually
//! built from a descriptor string, either with an explicit kind prefix or inferred
//! from the path:
//!
//! | Descriptor                       | Source                                   |
//! |----------------------------------|------------------------------------------|
//! | `endf:lib/n-003_Li_006.endf`     | one ENDF-6 text file (plain or gzip)     |
//! | `json:li6.json`                  | one JSON document (record or array)      |
//! | `jsonl:li6.jsonl`                | JSON-Lines, one record per line          |
//! | `archive:endfb8-neutrons.tgz`    | a `.tar`, `.tgz` or `.tar.gz` archive    |
//! | `dir:lib/neutrons`               | every data file below a directory        |
//! | `lib/n-003_Li_006.endf.gz`       | inferred from the extension              |
//!
//! A source is expanded into [`SourceEntry`]s: named byte buffers with the format
//! to decode them with. Gzip content is detected from its magic bytes and inflated
//! transparently, including members of an archive. Entries come out in a fixed order
//! (archive order, sorted directory walk), which makes last-write-wins ingestion
//! deterministic.
use std::{
    fs,
    io::{self, Read},
};

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::GzDecoder;
use tracing::debug;

use crate::xs_errors::XsError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const ENDF_EXTENSIONS: [&str; 8] = ["endf", "endf6", "dat", "txt", "asc", "tendl", "evl", "jeff"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestSource {
    Endf(Utf8PathBuf),
    Json(Utf8PathBuf),
    JsonLines(Utf8PathBuf),
    Archive(Utf8PathBuf),
    Directory(Utf8PathBuf),
}

/// How the content of one entry is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormat {
    Endf,
    Json,
    JsonLines,
}

/// One named, decompressed input buffer.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// File path, or `archive!member` for archive members.
    pub name: String,
    pub bytes: Vec<u8>,
    pub format: EntryFormat,
}

/// Strip one trailing `.gz` and return the remaining lower-cased extension.
fn data_extension(name: &str) -> Option<String> {
    let lower = name.to_ascii_lowercase();
    let stem = lower.strip_suffix(".gz").unwrap_or(&lower);
    let file = stem.rsplit(['/', '\\', '!']).next().unwrap_or(stem);
    file.rsplit_once('.').map(|(_, ext)| ext.to_string())
}

fn is_archive_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".tar") || lower.ends_with(".tgz") || lower.ends_with(".tar.gz")
}

/// Format implied by an entry name, `None` for files that are not cross-section data.
fn entry_format(name: &str) -> Option<EntryFormat> {
    match data_extension(name)?.as_str() {
        "json" => Some(EntryFormat::Json),
        "jsonl" | "ndjson" => Some(EntryFormat::JsonLines),
        ext if ENDF_EXTENSIONS.contains(&ext) => Some(EntryFormat::Endf),
        _ => None,
    }
}

fn maybe_gunzip(bytes: Vec<u8>) -> io::Result<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes);
    }
    let mut inflated = Vec::new();
    GzDecoder::new(bytes.as_slice()).read_to_end(&mut inflated)?;
    Ok(inflated)
}

impl TryFrom<&str> for IngestSource {
    type Error = XsError;

    /// Parse a source descriptor.
    ///
    /// Arguments
    /// -----------------
    /// * `value`: `kind:path` with kind one of `endf`, `json`, `jsonl`, `archive`, `dir`,
    ///   or a bare path whose kind is inferred.
    ///
    /// Return
    /// ----------
    /// * The source, or [`XsError::InvalidSource`] if the path is empty or its kind
    ///   cannot be inferred.
    ///
    /// Inference checks, in order: archive suffixes, an existing directory, then the
    /// data extensions (`.json`, `.jsonl`/`.ndjson`, ENDF extensions), each optionally
    /// followed by `.gz`.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        let explicit = value.split_once(':').and_then(|(kind, path)| {
            let path = Utf8PathBuf::from(path);
            match kind.to_ascii_lowercase().as_str() {
                "endf" => Some(IngestSource::Endf(path)),
                "json" => Some(IngestSource::Json(path)),
                "jsonl" | "ndjson" => Some(IngestSource::JsonLines(path)),
                "archive" | "tar" => Some(IngestSource::Archive(path)),
                "dir" => Some(IngestSource::Directory(path)),
                _ => None,
            }
        });

        let source = match explicit {
            Some(source) => source,
            None => Self::infer(Utf8Path::new(value))?,
        };
        if source.path().as_str().is_empty() {
            return Err(XsError::InvalidSource(format!(
                "empty path in source descriptor {value:?}"
            )));
        }
        Ok(source)
    }
}

impl IngestSource {
    fn infer(path: &Utf8Path) -> Result<Self, XsError> {
        let name = path.as_str();
        if is_archive_name(name) {
            return Ok(IngestSource::Archive(path.to_path_buf()));
        }
        if path.is_dir() {
            return Ok(IngestSource::Directory(path.to_path_buf()));
        }
        match entry_format(name) {
            Some(EntryFormat::Endf) => Ok(IngestSource::Endf(path.to_path_buf())),
            Some(EntryFormat::Json) => Ok(IngestSource::Json(path.to_path_buf())),
            Some(EntryFormat::JsonLines) => Ok(IngestSource::JsonLines(path.to_path_buf())),
            None => Err(XsError::InvalidSource(format!(
                "cannot infer the kind of source {name:?}, use a kind prefix (endf:, json:, jsonl:, archive:, dir:)"
            ))),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        match self {
            IngestSource::Endf(path)
            | IngestSource::Json(path)
            | IngestSource::JsonLines(path)
            | IngestSource::Archive(path)
            | IngestSource::Directory(path) => path,
        }
    }

    /// Read the source into decompressed entries, in deterministic order.
    ///
    /// Explicit file sources are read whatever their extension. Archives and
    /// directories only yield members whose name has a recognised data extension.
    pub fn entries(&self) -> Result<Vec<SourceEntry>, XsError> {
        let read_file = |path: &Utf8Path, format| -> Result<Vec<SourceEntry>, XsError> {
            Ok(vec![SourceEntry {
                name: path.to_string(),
                bytes: maybe_gunzip(fs::read(path)?)?,
                format,
            }])
        };

        match self {
            IngestSource::Endf(path) => read_file(path, EntryFormat::Endf),
            IngestSource::Json(path) => read_file(path, EntryFormat::Json),
            IngestSource::JsonLines(path) => read_file(path, EntryFormat::JsonLines),
            IngestSource::Archive(path) => read_archive(path),
            IngestSource::Directory(path) => read_directory(path),
        }
    }
}

fn read_archive(path: &Utf8Path) -> Result<Vec<SourceEntry>, XsError> {
    let bytes = maybe_gunzip(fs::read(path)?)?;
    let mut archive = tar::Archive::new(bytes.as_slice());
    let mut entries = Vec::new();

    for member in archive.entries()? {
        let mut member = member?;
        if !member.header().entry_type().is_file() {
            continue;
        }
        let member_path = member.path()?;
        let Some(member_name) = member_path.to_str().map(str::to_string) else {
            return Err(XsError::Utf8PathError(format!(
                "non UTF-8 member {} in archive {path}",
                member_path.display()
            )));
        };
        let Some(format) = entry_format(&member_name) else {
            debug!(archive = %path, member = %member_name, "skipping archive member");
            continue;
        };

        let mut raw = Vec::new();
        member.read_to_end(&mut raw)?;
        entries.push(SourceEntry {
            name: format!("{path}!{member_name}"),
            bytes: maybe_gunzip(raw)?,
            format,
        });
    }
    Ok(entries)
}

fn read_directory(root: &Utf8Path) -> Result<Vec<SourceEntry>, XsError> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut entries = Vec::new();
    for file in files {
        match entry_format(file.as_str()) {
            Some(format) => entries.push(SourceEntry {
                name: file.to_string(),
                bytes: maybe_gunzip(fs::read(&file)?)?,
                format,
            }),
            None => debug!(file = %file, "skipping non-data file"),
        }
    }
    Ok(entries)
}

fn collect_files(dir: &Utf8Path, files: &mut Vec<Utf8PathBuf>) -> Result<(), XsError> {
    for entry in fs::read_dir(dir)? {
        let path = Utf8PathBuf::from_path_buf(entry?.path())
            .map_err(|p| XsError::Utf8PathError(format!("non UTF-8 path {}", p.display())))?;
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod source_test {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};

    use super::*;

    #[test]
    fn test_descriptor_prefixes() {
        assert_eq!(
            IngestSource::try_from("endf:data/li6").unwrap(),
            IngestSource::Endf("data/li6".into())
        );
        assert_eq!(
            IngestSource::try_from("jsonl:out.txt").unwrap(),
            IngestSource::JsonLines("out.txt".into())
        );
        assert_eq!(
            IngestSource::try_from("dir:lib").unwrap(),
            IngestSource::Directory("lib".into())
        );
        assert!(matches!(
            IngestSource::try_from("endf:"),
            Err(XsError::InvalidSource(_))
        ));
    }

    #[test]
    fn test_descriptor_inference() {
        assert_eq!(
            IngestSource::try_from("lib/n-003_Li_006.endf.gz").unwrap(),
            IngestSource::Endf("lib/n-003_Li_006.endf.gz".into())
        );
        assert_eq!(
            IngestSource::try_from("neutrons.tar.gz").unwrap(),
            IngestSource::Archive("neutrons.tar.gz".into())
        );
        assert_eq!(
            IngestSource::try_from("xs.ndjson").unwrap(),
            IngestSource::JsonLines("xs.ndjson".into())
        );
        assert!(matches!(
            IngestSource::try_from("notes.pdf"),
            Err(XsError::InvalidSource(_))
        ));
    }

    #[test]
    fn test_gzip_is_detected_by_content() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"payload").unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(maybe_gunzip(compressed).unwrap(), b"payload");
        assert_eq!(maybe_gunzip(b"plain".to_vec()).unwrap(), b"plain");
    }

    #[test]
    fn test_directory_walk_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::create_dir_all(root.join("neutrons")).unwrap();
        fs::write(root.join("neutrons/b.endf"), "b").unwrap();
        fs::write(root.join("neutrons/a.endf"), "a").unwrap();
        fs::write(root.join("README.md"), "skip me").unwrap();
        fs::write(root.join("extra.jsonl"), "{}").unwrap();

        let entries = IngestSource::Directory(root.to_path_buf()).entries().unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|e| e.name.strip_prefix(root.as_str()).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["/extra.jsonl", "/neutrons/a.endf", "/neutrons/b.endf"]);
        assert_eq!(entries[0].format, EntryFormat::JsonLines);
    }
}
