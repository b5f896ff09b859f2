//! Download of evaluated-library files into a local cache (feature `endf-download`).
//!
//! Files are streamed to `<cache>/endfxs_cache/<file name>` where `<cache>` is
//! [`XsConfig::cache_dir`] or the user cache directory. A file already present in the
//! cache is reused without any network access.
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use tokio::{fs::File, io::AsyncWriteExt};
use tokio_stream::StreamExt;
use tracing::info;

use crate::{config::XsConfig, endf::IngestSource, xs_errors::XsError};

/// Name used while `path` is being written: the whole file name plus `.part`.
fn partial_path(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}.part"))
}

/// Stream `url` into `path`, chunk by chunk.
async fn download_big_file(url: &str, path: &Utf8Path) -> Result<(), XsError> {
    // the final name only appears once the transfer is complete
    let partial = partial_path(path);
    let mut file = File::create(&partial).await?;
    info!(url, "downloading");

    let mut stream = reqwest::get(url)
        .await?
        .error_for_status()?
        .bytes_stream();

    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    tokio::fs::rename(&partial, path).await?;

    info!(url, path = %path, "downloaded");
    Ok(())
}

fn cache_directory(config: &XsConfig) -> Result<Utf8PathBuf, XsError> {
    let base = match &config.cache_dir {
        Some(dir) => dir.clone(),
        None => {
            let dirs = BaseDirs::new().ok_or_else(|| {
                XsError::UnableToCreateBaseDir("cannot find the user cache directory".into())
            })?;
            Utf8Path::from_path(dirs.cache_dir())
                .ok_or_else(|| {
                    XsError::Utf8PathError(format!(
                        "non UTF-8 cache directory {}",
                        dirs.cache_dir().display()
                    ))
                })?
                .to_path_buf()
        }
    };
    let dir = base.join("endfxs_cache");
    fs::create_dir_all(&dir).map_err(|err| XsError::UnableToCreateBaseDir(format!("{dir}: {err}")))?;
    Ok(dir)
}

fn file_name(url: &str) -> Result<&str, XsError> {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| XsError::InvalidSource(format!("no file name in URL {url:?}")))
}

/// Make `url` available locally and return it as an ingestion source.
///
/// Arguments
/// -----------------
/// * `config`: gives the cache directory.
/// * `url`: an archive, ENDF-6 or JSON file; the kind is inferred from its file name.
///
/// Return
/// ----------
/// * The [`IngestSource`] of the cached file, or the I/O / HTTP error.
pub async fn fetch_source(config: &XsConfig, url: &str) -> Result<IngestSource, XsError> {
    let local_file = cache_directory(config)?.join(file_name(url)?);
    if !local_file.exists() {
        download_big_file(url, &local_file).await?;
    }
    IngestSource::try_from(local_file.as_str())
}

/// Blocking variant of [`fetch_source`] for callers without a runtime.
pub fn fetch_source_blocking(config: &XsConfig, url: &str) -> Result<IngestSource, XsError> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(fetch_source(config, url))
}
