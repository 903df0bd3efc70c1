//! Image frame input handling
//!
//! The "path or pixels" decision is made exactly once, here. Services never
//! re-inspect the input shape; they receive a resolved [`ImagePayload`] or a
//! classified [`FrameIssue`].

use std::path::{Path, PathBuf};

/// An image frame as provided by the caller
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Path to an encoded image file on disk
    Path(PathBuf),
    /// Encoded image bytes with a MIME type
    Encoded {
        data: Vec<u8>,
        mime_type: String,
    },
    /// Decoded pixel data (height x width x channels, 8-bit)
    Pixels(PixelBuffer),
}

/// Raw 8-bit pixel data
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: Vec<u8>,
}

/// A frame resolved into the single representation model backends consume
#[derive(Debug, Clone)]
pub enum ImagePayload {
    /// Encoded image bytes (what HTTP vision backends upload)
    Encoded {
        data: Vec<u8>,
        mime_type: String,
    },
    /// Raw pixel data (what local backends consume directly)
    Raw(PixelBuffer),
}

/// Why a frame could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameIssue {
    /// No frame was provided at all
    NoInput,
    /// The referenced file does not exist
    FileMissing,
    /// The input format is not one we can hand to a backend
    BadFormat,
    /// The frame exists but contains no pixel data
    EmptyImage,
}

/// Resolve an optional frame input into a payload, classifying failures
///
/// Absence is a valid input ("no frame available") and maps to
/// [`FrameIssue::NoInput`] rather than an error.
pub fn resolve(input: Option<&ImageInput>) -> std::result::Result<ImagePayload, FrameIssue> {
    let Some(input) = input else {
        return Err(FrameIssue::NoInput);
    };

    match input {
        ImageInput::Path(path) => {
            if !path.exists() {
                return Err(FrameIssue::FileMissing);
            }
            let Some(mime_type) = mime_for_path(path) else {
                return Err(FrameIssue::BadFormat);
            };
            let data = std::fs::read(path).map_err(|_| FrameIssue::FileMissing)?;
            if data.is_empty() {
                return Err(FrameIssue::EmptyImage);
            }
            Ok(ImagePayload::Encoded {
                data,
                mime_type: mime_type.to_string(),
            })
        }
        ImageInput::Encoded { data, mime_type } => {
            if data.is_empty() {
                return Err(FrameIssue::EmptyImage);
            }
            if !is_supported_image(mime_type) {
                return Err(FrameIssue::BadFormat);
            }
            Ok(ImagePayload::Encoded {
                data: data.clone(),
                mime_type: mime_type.clone(),
            })
        }
        ImageInput::Pixels(buffer) => {
            if !matches!(buffer.channels, 1 | 3 | 4) {
                return Err(FrameIssue::BadFormat);
            }
            if buffer.data.is_empty() || buffer.width == 0 || buffer.height == 0 {
                return Err(FrameIssue::EmptyImage);
            }
            Ok(ImagePayload::Raw(buffer.clone()))
        }
    }
}

/// Check if a MIME type is a supported image format
pub fn is_supported_image(mime_type: &str) -> bool {
    matches!(
        mime_type,
        "image/png" | "image/jpeg" | "image/gif" | "image/webp"
    )
}

/// Map a file extension to its image MIME type
fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
