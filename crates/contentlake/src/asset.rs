use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Where the asset bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource {
    Path(PathBuf),
    Url(String),
}

/// An asset to upload, with an optional MIME type override.
///
/// For a local path the MIME type must be supplied or inferable from the
/// extension; for a remote URL the response's Content-Type header is used as
/// a fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetUpload {
    pub source: AssetSource,
    pub mime_type: Option<String>,
}

impl AssetUpload {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: AssetSource::Path(path.into()),
            mime_type: None,
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            source: AssetSource::Url(url.into()),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Bytes plus resolved content type, ready to post to the asset endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedAsset {
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Infer a MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> Result<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .ok_or_else(|| Error::MimeTypeUnknown(path.display().to_string()))
}

/// Resolve bytes and content type for an upload.
///
/// MIME resolution for local paths happens before any I/O, so an
/// unrecognized extension fails without touching the disk or the network.
/// Remote sources go through the transport's fetch; a failed fetch or a
/// missing Content-Type (with no override) is an [`Error::AssetFetch`].
pub(crate) async fn prepare(
    upload: &AssetUpload,
    transport: &dyn Transport,
) -> Result<PreparedAsset> {
    match &upload.source {
        AssetSource::Path(path) => {
            let mime_type = match &upload.mime_type {
                Some(mime) => mime.clone(),
                None => mime_for_path(path)?,
            };
            let bytes = tokio::fs::read(path).await?;
            Ok(PreparedAsset {
                mime_type,
                bytes: Bytes::from(bytes),
            })
        }
        AssetSource::Url(url) => {
            let fetched = transport
                .fetch(url)
                .await
                .map_err(|err| Error::asset_fetch(err.to_string()))?;
            if !(200..300).contains(&fetched.status) {
                return Err(Error::asset_fetch(format!(
                    "fetching {url} returned status {}",
                    fetched.status
                )));
            }
            let mime_type = match &upload.mime_type {
                Some(mime) => mime.clone(),
                None => fetched
                    .content_type
                    .as_deref()
                    .map(strip_type_params)
                    .filter(|mime| !mime.is_empty())
                    .ok_or_else(|| Error::asset_fetch(format!("no content type for {url}")))?,
            };
            Ok(PreparedAsset {
                mime_type,
                bytes: fetched.bytes,
            })
        }
    }
}

// "image/png; charset=binary" -> "image/png"
fn strip_type_params(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
