//! Content-based type detection over the first block of a file.

use std::path::Path;

/// Result of sniffing a buffer.
///
/// `mime` is `None` when the content matched no known signature and did not
/// look like text; callers fall back to [`guess_from_extension`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sniffed {
    pub mime: Option<String>,
    pub description: String,
}

impl Sniffed {
    fn known(mime: &str, description: impl Into<String>) -> Self {
        Self {
            mime: Some(mime.to_string()),
            description: description.into(),
        }
    }

    fn unknown(description: &str) -> Self {
        Self {
            mime: None,
            description: description.to_string(),
        }
    }
}

/// Classify `buf` by magic numbers, then by a text heuristic.
pub fn identify(buf: &[u8]) -> Sniffed {
    if buf.is_empty() {
        return Sniffed::unknown("empty");
    }

    if let Some(kind) = infer::get(buf) {
        let mime = kind.mime_type();
        return Sniffed::known(mime, describe(mime, kind.extension(), buf));
    }

    match text_kind(buf) {
        Some(description) => Sniffed::known("text/plain", description),
        None => Sniffed::unknown("data"),
    }
}

fn describe(mime: &str, ext: &str, buf: &[u8]) -> String {
    match mime {
        "image/jpeg" => {
            if buf.len() >= 10 && buf[2..4] == [0xFF, 0xE1] && &buf[6..10] == b"Exif" {
                "JPEG image data, Exif standard".to_string()
            } else {
                "JPEG image data".to_string()
            }
        }
        "audio/mpeg" => {
            if buf.len() >= 5 && &buf[..3] == b"ID3" {
                format!("Audio file with ID3 version 2.{}.{}", buf[3], buf[4])
            } else {
                "MPEG ADTS, layer III".to_string()
            }
        }
        "image/png" => "PNG image data".to_string(),
        "image/gif" => "GIF image data".to_string(),
        "image/tiff" => "TIFF image data".to_string(),
        "image/webp" => "RIFF (little-endian) data, Web/P image".to_string(),
        "image/heif" => "ISO Media, HEIF Image".to_string(),
        "audio/x-flac" => "FLAC audio bitstream data".to_string(),
        "audio/ogg" => "Ogg data".to_string(),
        "audio/x-wav" => "RIFF (little-endian) data, WAVE audio".to_string(),
        "audio/m4a" => "ISO Media, Apple iTunes ALAC/AAC-LC (.M4A) Audio".to_string(),
        "application/pdf" => "PDF document".to_string(),
        "application/zip" => "Zip archive data".to_string(),
        "application/gzip" => "gzip compressed data".to_string(),
        "video/mp4" => "ISO Media, MP4 v2".to_string(),
        _ => format!("{} data", ext.to_uppercase()),
    }
}

/// Returns a description if the buffer is plain text.
///
/// A multi-byte sequence cut off at the end of the block still counts as
/// text; only invalid sequences and control bytes disqualify it.
fn text_kind(buf: &[u8]) -> Option<&'static str> {
    let valid = match std::str::from_utf8(buf) {
        Ok(s) => s,
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&buf[..e.valid_up_to()]).ok()?,
        Err(_) => return None,
    };

    let has_control = valid
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\x0c'));
    if has_control {
        return None;
    }

    if valid.is_ascii() {
        Some("ASCII text")
    } else {
        Some("UTF-8 Unicode text")
    }
}

/// Guess a MIME type from the file name alone.
pub fn guess_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "txt" | "log" | "text" | "conf" | "ini" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "xml" => "application/xml",
        "json" => "application/json",
        "js" | "mjs" => "text/javascript",
        "py" => "text/x-python",
        "rs" => "text/x-rust",
        "sh" => "application/x-sh",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "heic" | "heif" => "image/heif",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "flac" => "audio/flac",
        "wav" => "audio/x-wav",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "7z" => "application/x-7z-compressed",
        _ => return None,
    };
    Some(mime)
}
