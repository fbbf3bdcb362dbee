//! A single user submission.
//!
//! The request is built fresh for every analysis and dropped once the
//! reply (or error) has been handed back to the caller.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Maximum number of characters a caller should accept for the text input.
///
/// The analysis layer never truncates; the cap is enforced where input is
/// collected (see [`crate::domain::Session::submit`]).
pub const MAX_INPUT_CHARS: usize = 3000;

/// Image media types the front-end accepts.
pub const SUPPORTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Supported media type for a file extension (`jpg` is an alias of `jpeg`)
pub fn image_media_type_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    let subtype = if ext == "jpg" { "jpeg" } else { ext.as_str() };
    SUPPORTED_IMAGE_TYPES
        .iter()
        .copied()
        .find(|media_type| media_type.strip_prefix("image/") == Some(subtype))
}

/// Decoded image bytes plus the media type declared by the uploader.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Declared media type, e.g. `image/png`. Passed through unvalidated.
    pub media_type: String,

    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Build a payload from the base64 form a browser upload produces.
    pub fn from_base64(
        media_type: impl Into<String>,
        data: &str,
    ) -> Result<Self, base64::DecodeError> {
        let bytes = BASE64.decode(data.trim().as_bytes())?;
        Ok(Self::new(media_type, bytes))
    }

    /// Base64 form used on the wire
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("media_type", &self.media_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// One user submission: free text, an optional image, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Text exactly as the user entered it
    pub text: String,

    /// Optional image to analyze
    pub image: Option<ImagePayload>,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>, image: Option<ImagePayload>) -> Self {
        Self {
            text: text.into(),
            image,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    /// Whether the text carries anything besides whitespace
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
