//! Image intake: file selection, media-type validation and preview encoding.
//!
//! A selection (file picker or drag-and-drop) is validated synchronously by
//! [`crate::DetectorSession::select_file`], which hands back a [`ReadTicket`].
//! Loading the bytes and encoding the preview happens in [`ReadTicket::load`];
//! the result is only staged once the session accepts it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha3::{Digest, Sha3_256};
use tracing::{debug, warn};

use crate::error::{DetectorError, Result};

/// MIME prefix every staged file must carry.
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

/// Whether a declared media type is an image type.
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with(IMAGE_MEDIA_PREFIX)
}

/// Guess a media type from a file extension, the way a browser declares `File.type`.
pub fn media_type_from_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        Some("heic") => "image/heic",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Where a candidate file's bytes live.
#[derive(Debug, Clone)]
pub enum FileBody {
    Memory(Vec<u8>),
    Path(PathBuf),
}

/// A file offered by the user, not yet validated.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub media_type: String,
    pub body: FileBody,
}

impl CandidateFile {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            body: FileBody::Memory(bytes),
        }
    }

    /// A file on disk, with its media type guessed from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Self {
            name,
            media_type: media_type_from_path(&path).to_string(),
            body: FileBody::Path(path),
        }
    }

    fn validate(&self) -> Result<()> {
        if is_image_media_type(&self.media_type) {
            Ok(())
        } else {
            Err(DetectorError::InvalidMediaType {
                media_type: self.media_type.clone(),
            })
        }
    }
}

/// Origin of a file selection.
#[derive(Debug, Clone)]
pub enum SelectionSource {
    /// Files chosen through the file picker.
    Picker(Vec<CandidateFile>),
    /// Files dropped onto the drop zone.
    Drop(Vec<CandidateFile>),
}

impl SelectionSource {
    pub fn is_drop(&self) -> bool {
        matches!(self, Self::Drop(_))
    }

    /// Only the first file of a selection is considered.
    pub(crate) fn into_first(self) -> Option<CandidateFile> {
        let files = match self {
            Self::Picker(files) | Self::Drop(files) => files,
        };
        if files.len() > 1 {
            debug!(ignored = files.len() - 1, "Ignoring extra files in selection");
        }
        files.into_iter().next()
    }

    /// Validate the first file, returning it if it is an image.
    ///
    /// An empty selection is `Ok(None)`: nothing was chosen, nothing changes.
    pub(crate) fn validated_first(self) -> Result<Option<CandidateFile>> {
        match self.into_first() {
            Some(file) => {
                file.validate()?;
                Ok(Some(file))
            }
            None => Ok(None),
        }
    }
}

/// Cosmetic drag-and-drop hover state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Active,
}

/// The currently staged image.
///
/// Bytes are shared so an in-flight analysis can hold them while the slot
/// stays with the session.
#[derive(Debug, Clone)]
pub struct UploadSlot {
    file_name: String,
    media_type: String,
    raw_bytes: Arc<[u8]>,
    preview: String,
    fingerprint: String,
}

impl UploadSlot {
    /// Build a slot from validated bytes, encoding the preview.
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let media_type = media_type.into();
        let preview = encode_preview(&media_type, &bytes);
        let fingerprint = hex::encode(Sha3_256::digest(&bytes));
        Self {
            file_name: file_name.into(),
            media_type,
            raw_bytes: Arc::from(bytes),
            preview,
            fingerprint,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.raw_bytes)
    }

    /// Data-URI rendering of the image, for display.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// SHA3-256 of the raw bytes, hex encoded.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.raw_bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_bytes.is_empty()
    }
}

/// `data:<media type>;base64,<payload>`
pub fn encode_preview(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", BASE64.encode(bytes))
}

/// A validated selection waiting for its bytes to be read.
#[derive(Debug)]
pub struct ReadTicket {
    pub(crate) generation: u64,
    file: CandidateFile,
}

impl ReadTicket {
    pub(crate) fn new(generation: u64, file: CandidateFile) -> Self {
        Self { generation, file }
    }

    pub fn file_name(&self) -> &str {
        &self.file.name
    }

    pub fn media_type(&self) -> &str {
        &self.file.media_type
    }

    /// Read the file and encode its preview.
    pub async fn load(self) -> LoadedImage {
        let CandidateFile {
            name,
            media_type,
            body,
        } = self.file;

        let bytes = match body {
            FileBody::Memory(bytes) => Ok(bytes),
            FileBody::Path(path) => read_file(&path).await,
        };

        let outcome = bytes.map(|bytes| {
            debug!(file = %name, bytes = bytes.len(), "Encoding preview");
            UploadSlot::new(name, media_type, bytes)
        });

        LoadedImage {
            generation: self.generation,
            outcome,
        }
    }
}

/// Result of a [`ReadTicket::load`], to be committed to the session.
#[derive(Debug)]
pub struct LoadedImage {
    pub(crate) generation: u64,
    pub(crate) outcome: Result<UploadSlot>,
}

impl LoadedImage {
    pub fn slot(&self) -> Option<&UploadSlot> {
        self.outcome.as_ref().ok()
    }
}

#[cfg(feature = "network")]
async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        warn!(path = %path.display(), error = %e, "Failed to read image file");
        DetectorError::ReadFailed(format!("{}: {e}", path.display()))
    })
}

#[cfg(not(feature = "network"))]
async fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Failed to read image file");
        DetectorError::ReadFailed(format!("{}: {e}", path.display()))
    })
}
