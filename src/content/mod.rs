//! Content resolution for raw (non-RPC) requests.
//!
//! A session serves from exactly one [`ContentSource`]:
//! - **Archive**: a bundle loaded into memory, looked up by logical path.
//! - **Filesystem**: an ordered [`SearchPath`]; the first candidate that exists wins,
//!   so overlay directories shadow the directories listed after them.

pub mod archive;
pub mod listing;
pub mod mime;
pub mod search_path;

pub use archive::ArchiveIndex;
pub use listing::DirectoryListing;
pub use search_path::SearchPath;

use crate::error::RequestError;
use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// The backing store for response bytes. Chosen once at startup.
#[derive(Debug, Clone)]
pub enum ContentSource {
    Archive(ArchiveIndex),
    Filesystem(SearchPath),
}

/// The outcome of resolving one request path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// In-memory bytes from an archive entry.
    Bytes {
        body: Bytes,
        mime: Option<&'static str>,
    },
    /// A file on disk, streamed with conditional-request support.
    File {
        path: PathBuf,
        mime: Option<&'static str>,
    },
    /// Redirect to the slash-terminated form of a directory path.
    Redirect { location: String },
    /// Synthesized index page for a directory with no `index.html`.
    Listing { html: String },
}

/// Resolves `logical_path` (the request path with any secret prefix removed and
/// no leading `/`) against `source`.
///
/// `request_path` is the full decoded request path; directory redirects and
/// listing headers are built from it.
pub async fn resolve(
    source: &ContentSource,
    logical_path: &str,
    request_path: &str,
    verbose: bool,
) -> Result<Resolved, RequestError> {
    if search_path::escapes_root(logical_path) {
        return Err(RequestError::ResourceNotFound {
            path: logical_path.to_string(),
        });
    }

    match source {
        ContentSource::Archive(index) => match index.read(logical_path) {
            Some(body) => {
                if verbose {
                    info!("Return zipped file {}", logical_path);
                }
                Ok(Resolved::Bytes {
                    body: body.clone(),
                    mime: mime::mime_type(&ArchiveIndex::entry_name(logical_path)),
                })
            }
            None => {
                if verbose {
                    info!(
                        "Unable to read file {}",
                        ArchiveIndex::entry_name(logical_path)
                    );
                }
                Err(RequestError::ResourceNotFound {
                    path: logical_path.to_string(),
                })
            }
        },
        ContentSource::Filesystem(search_path) => {
            let candidates = search_path.candidates(logical_path);
            for candidate in &candidates {
                if let Some(resolved) = probe_candidate(candidate, request_path).await? {
                    return Ok(resolved);
                }
            }
            if verbose {
                info!("Unable to read file {:?}", candidates);
            }
            Err(RequestError::ResourceNotFound {
                path: logical_path.to_string(),
            })
        }
    }
}

/// Tries one candidate. `Ok(None)` means nothing exists there and the next
/// candidate should be tried.
async fn probe_candidate(
    candidate: &Path,
    request_path: &str,
) -> Result<Option<Resolved>, RequestError> {
    let Ok(metadata) = tokio::fs::metadata(candidate).await else {
        return Ok(None);
    };

    if !metadata.is_dir() {
        // `file.txt/` names a directory that does not exist here.
        if request_path.ends_with('/') {
            return Ok(None);
        }
        return Ok(Some(Resolved::File {
            path: candidate.to_path_buf(),
            mime: mime::mime_type(&candidate.to_string_lossy()),
        }));
    }

    if !request_path.ends_with('/') {
        return Ok(Some(Resolved::Redirect {
            location: format!("{}/", request_path),
        }));
    }

    let index = candidate.join(archive::INDEX_RESOURCE);
    if tokio::fs::metadata(&index)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
    {
        return Ok(Some(Resolved::File {
            path: index,
            mime: Some(mime::HTML),
        }));
    }

    let listing = DirectoryListing::read(candidate, request_path)
        .await
        .map_err(|_| RequestError::ResourceNotFound {
            path: candidate.to_string_lossy().into_owned(),
        })?;
    let html = listing.render().map_err(|message| {
        error!("Directory listing for {} failed: {}", candidate.display(), message);
        RequestError::RenderFailure { message }
    })?;
    Ok(Some(Resolved::Listing { html }))
}

#[cfg(test)]
#[path = "tests/resolve_tests.rs"]
mod tests;
