//! Image encoding for transport to the Gemini API.
//!
//! Uploaded images travel as an [`ImagePayload`]: a media type plus the
//! base64 text of the raw bytes. Encoding is lossless, so a generated result
//! can be decoded and submitted again as an edit input.

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::ImageFormat;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Media type used when neither the content nor the source declares one.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Extension of downloaded results.
pub const DOWNLOAD_EXTENSION: &str = "png";

/// One encoded image: media type plus base64 data.
///
/// Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    media_type: String,
    data: String,
}

impl ImagePayload {
    /// Wraps already-encoded data, e.g. an inline image from a model response.
    pub fn new(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Encodes raw bytes, resolving the media type from the bytes themselves
    /// before falling back to `declared_type`.
    pub fn from_bytes(bytes: &[u8], declared_type: Option<&str>) -> Self {
        Self {
            media_type: resolve_media_type(bytes, declared_type),
            data: BASE64.encode(bytes),
        }
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The base64 text of the image bytes.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Decodes back to the original bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| AppError::decode(format!("Invalid base64 image data: {}", e)))
    }

    /// Renders the payload as a `data:` URL suitable for display.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Parses a `data:{media type};base64,{data}` URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| AppError::decode("Not a data URL"))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| AppError::decode("Data URL has no payload"))?;
        let (media_type, encoding) = header
            .split_once(';')
            .ok_or_else(|| AppError::decode("Data URL has no encoding"))?;
        if encoding != "base64" {
            return Err(AppError::decode(format!("Unsupported data URL encoding: {}", encoding)));
        }

        let payload = Self::new(media_type, data);
        payload.decode()?;
        Ok(payload)
    }

    /// File name offered when downloading a result created at `timestamp_millis`.
    pub fn download_name(timestamp_millis: i64) -> String {
        format!("ai_image_{}.{}", timestamp_millis, DOWNLOAD_EXTENSION)
    }

    /// Decodes the payload and writes it into `dir` under a timestamped name.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let bytes = self.decode()?;
        let path = dir
            .as_ref()
            .join(Self::download_name(chrono::Utc::now().timestamp_millis()));
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), "saved generated image");
        Ok(path)
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("media_type", &self.media_type)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Where an input image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// A file picked by the user.
    File(PathBuf),
    /// Bytes already in memory, such as a previous result sent back for editing.
    Memory {
        bytes: Vec<u8>,
        media_type: Option<String>,
    },
}

impl ImageSource {
    /// Short description for status lines.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::Memory { bytes, .. } => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

/// Encoding entry points.
pub struct ImageCodec;

impl ImageCodec {
    /// Reads `reader` to the end and encodes its content.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Decode`] if the source cannot be read.
    pub async fn encode<R>(mut reader: R, declared_type: Option<&str>) -> Result<ImagePayload>
    where
        R: AsyncRead + Unpin,
    {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| AppError::decode(format!("Failed to read image: {}", e)))?;

        let payload = ImagePayload::from_bytes(&buffer, declared_type);
        tracing::debug!(media_type = payload.media_type(), bytes = buffer.len(), "encoded image");
        Ok(payload)
    }

    /// Opens and encodes a file, declaring its media type from the extension.
    pub async fn encode_file(path: impl AsRef<Path>) -> Result<ImagePayload> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| AppError::decode(format!("Failed to open {}: {}", path.display(), e)))?;
        let declared = ImageFormat::from_path(path).ok().map(|f| f.to_mime_type());
        Self::encode(file, declared).await
    }

    /// Encodes any [`ImageSource`].
    pub async fn encode_source(source: &ImageSource) -> Result<ImagePayload> {
        match source {
            ImageSource::File(path) => Self::encode_file(path).await,
            ImageSource::Memory { bytes, media_type } => {
                Self::encode(bytes.as_slice(), media_type.as_deref()).await
            }
        }
    }

    /// Inverse of [`ImageCodec::encode`].
    pub fn decode(payload: &ImagePayload) -> Result<Vec<u8>> {
        payload.decode()
    }
}

/// Picks the media type from magic bytes, then the declared type, then the fallback.
fn resolve_media_type(bytes: &[u8], declared_type: Option<&str>) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }
    declared_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string()
}
