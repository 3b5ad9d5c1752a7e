//! Avatar image normalization
//!
//! Uploaded avatars are checked (file name, size, real content type),
//! decoded, cropped to a square, resized to 250×250 and re-encoded as PNG.
//! Only the normalized PNG is stored, so every stored avatar has the same
//! format and dimensions whatever the client sent.

use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;

/// Edge length of a stored avatar, in pixels
pub const AVATAR_SIZE: u32 = 250;

/// Default upload limit (1 MB)
pub const DEFAULT_MAX_BYTES: usize = 1_000_000;

/// Accepted upload file extensions
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Error type for avatar processing
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    /// No bytes were uploaded
    #[error("Avatar upload is empty")]
    Empty,

    /// Upload exceeds the size limit
    #[error("Avatar is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    /// File name or content is not a JPEG/PNG image
    #[error("Please upload an image (jpg, jpeg or png): {0}")]
    UnsupportedType(String),

    /// Content claims to be an image but cannot be decoded
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Re-encoding failed
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Checks that an upload's file name has an accepted extension
///
/// ```
/// use taskdesk_shared::avatar::check_file_name;
///
/// assert!(check_file_name("profile-pic.JPG").is_ok());
/// assert!(check_file_name("notes.pdf").is_err());
/// ```
pub fn check_file_name(file_name: &str) -> Result<(), AvatarError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| AvatarError::UnsupportedType(format!("'{}' has no extension", file_name)))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AvatarError::UnsupportedType(format!(
            "'.{}' is not accepted",
            extension
        )));
    }

    Ok(())
}

/// Normalizes uploaded bytes into a 250×250 PNG
///
/// The content type is sniffed from the bytes; the file name is checked
/// separately with [`check_file_name`]. CPU-bound: callers on an async
/// runtime should run it on a blocking thread.
///
/// # Errors
///
/// - `Empty` / `TooLarge` for size violations
/// - `UnsupportedType` if the content is not JPEG or PNG
/// - `Decode` / `Encode` if the image is corrupt
pub fn process_avatar(bytes: &[u8], max_bytes: usize) -> Result<Vec<u8>, AvatarError> {
    if bytes.is_empty() {
        return Err(AvatarError::Empty);
    }

    if bytes.len() > max_bytes {
        return Err(AvatarError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }

    let format = image::guess_format(bytes)
        .map_err(|_| AvatarError::UnsupportedType("unrecognized content".to_string()))?;

    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(AvatarError::UnsupportedType(format!("{:?} content", format)));
    }

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| AvatarError::Decode(e.to_string()))?;

    let resized = image.resize_to_fill(AVATAR_SIZE, AVATAR_SIZE, FilterType::Lanczos3);

    let mut output = Cursor::new(Vec::new());
    resized
        .write_to(&mut output, ImageFormat::Png)
        .map_err(|e| AvatarError::Encode(e.to_string()))?;

    tracing::debug!(
        input_bytes = bytes.len(),
        output_bytes = output.get_ref().len(),
        "Avatar normalized"
    );

    Ok(output.into_inner())
}
