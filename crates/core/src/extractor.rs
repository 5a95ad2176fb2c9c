//! Format-specific metadata pulled from the first block of a file.
//!
//! Every extractor here is a pure function of the buffer. A file that has no
//! tags, or whose tags are truncated or malformed, simply yields
//! [`Metadata::None`] or a partially filled variant.

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::io::Cursor;
use tracing::trace;

/// EXIF `DateTime` is stored as fixed-width ASCII.
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Which extractor a sniffed MIME type selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Image,
    Audio,
}

impl Family {
    pub fn from_mime(mime: &str) -> Option<Family> {
        let mime = mime.to_lowercase();
        let tagged_image = ["jpeg", "tiff", "heif", "heic", "png", "webp"];
        if tagged_image.iter().any(|k| mime.contains(k)) {
            Some(Family::Image)
        } else if mime.contains("audio") || mime.contains("ogg") {
            Some(Family::Audio)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_time: Option<NaiveDateTime>,
}

impl ImageMetadata {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.capture_time.is_none()
    }
}

/// Track number exactly as the tag recorded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TrackValue {
    Number(u32),
    Text(String),
}

impl TrackValue {
    /// `Number` only when the text is the canonical rendering of one, so
    /// `"07"` and `"5/12"` stay as recorded.
    fn from_raw(raw: &str) -> Option<TrackValue> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(match raw.parse::<u32>() {
            Ok(n) if n.to_string() == raw => TrackValue::Number(n),
            _ => TrackValue::Text(raw.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudioMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackValue>,
}

impl AudioMetadata {
    pub fn is_empty(&self) -> bool {
        self.artist.is_none() && self.album.is_none() && self.title.is_none() && self.track.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Metadata {
    Image(ImageMetadata),
    Audio(AudioMetadata),
    #[default]
    None,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        match self {
            Metadata::Image(m) => m.is_empty(),
            Metadata::Audio(m) => m.is_empty(),
            Metadata::None => true,
        }
    }
}

// Always a JSON object; `None` is `{}` rather than `null`.
impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metadata::Image(m) => m.serialize(serializer),
            Metadata::Audio(m) => m.serialize(serializer),
            Metadata::None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

/// Run the extractor selected by `mime` over `buf`.
pub fn extract(buf: &[u8], mime: &str) -> Metadata {
    match Family::from_mime(mime) {
        Some(Family::Image) => image_metadata(buf).map_or(Metadata::None, Metadata::Image),
        Some(Family::Audio) => audio_metadata(buf).map_or(Metadata::None, Metadata::Audio),
        None => Metadata::None,
    }
}

/// Width, height and capture time from embedded EXIF.
pub fn image_metadata(buf: &[u8]) -> Option<ImageMetadata> {
    use exif::{In, Tag, Value};

    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(buf)) {
        Ok(exif) => exif,
        Err(e) => {
            trace!("no exif: {}", e);
            return None;
        }
    };

    let uint = |tag: Tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0))
    };

    let capture_time = exif
        .get_field(Tag::DateTime, In::PRIMARY)
        .and_then(|f| match &f.value {
            Value::Ascii(parts) => parts.first(),
            _ => None,
        })
        .and_then(|raw| parse_exif_datetime(raw));

    let meta = ImageMetadata {
        width: uint(Tag::PixelXDimension),
        height: uint(Tag::PixelYDimension),
        capture_time,
    };
    (!meta.is_empty()).then_some(meta)
}

fn parse_exif_datetime(raw: &[u8]) -> Option<NaiveDateTime> {
    let text = std::str::from_utf8(raw).ok()?;
    let text = text.trim_end_matches('\0').trim();
    match NaiveDateTime::parse_from_str(text, EXIF_DATE_FORMAT) {
        Ok(dt) => Some(dt),
        Err(e) => {
            trace!("unparsable exif date {:?}: {}", text, e);
            None
        }
    }
}

/// Artist, album, title and track from whatever tag the container carries.
pub fn audio_metadata(buf: &[u8]) -> Option<AudioMetadata> {
    use lofty::file::{FileType, TaggedFileExt};
    use lofty::tag::{Accessor, ItemKey};

    let tagged = match read_tags(buf.to_vec(), None) {
        Ok(tagged) => tagged,
        Err(e) => match complete_id3(buf) {
            Some(completed) => match read_tags(completed, Some(FileType::Mpeg)) {
                Ok(tagged) => tagged,
                Err(e) => {
                    trace!("no audio tags in cut id3 block: {}", e);
                    return None;
                }
            },
            None => {
                trace!("no audio tags: {}", e);
                return None;
            }
        },
    };
    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;

    let track = tag
        .get_string(&ItemKey::TrackNumber)
        .and_then(TrackValue::from_raw)
        .or_else(|| tag.track().map(TrackValue::Number));

    let meta = AudioMetadata {
        artist: non_blank(tag.artist()),
        album: non_blank(tag.album()),
        title: non_blank(tag.title()),
        track,
    };
    (!meta.is_empty()).then_some(meta)
}

fn read_tags(
    bytes: Vec<u8>,
    file_type: Option<lofty::file::FileType>,
) -> lofty::error::Result<lofty::file::TaggedFile> {
    use lofty::config::ParseOptions;
    use lofty::probe::Probe;

    let probe = Probe::new(Cursor::new(bytes)).options(ParseOptions::new().read_properties(false));
    let probe = match file_type {
        Some(file_type) => probe.set_file_type(file_type),
        None => probe.guess_file_type()?,
    };
    probe.read()
}

/// Largest ID3v2 tag we are willing to zero-fill.
const MAX_ID3_TAG: usize = 16 * 1024 * 1024;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no padding: 417 bytes per frame.
const SILENT_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
const SILENT_FRAME_LEN: usize = 417;
const SILENT_FRAMES: usize = 8;

/// Rebuild a readable MP3 from a block that starts with an ID3v2 tag.
///
/// Cover art routinely pushes the tag past the first block, and a tag-only
/// block has no audio frame for the MPEG reader to lock on to. The text
/// frames that did arrive are kept: the rest of the tag is zero-filled
/// (zeros read as padding) and a short run of silent frames is appended.
fn complete_id3(buf: &[u8]) -> Option<Vec<u8>> {
    if buf.len() < 10 || &buf[..3] != b"ID3" {
        return None;
    }
    let size = buf[6..10]
        .iter()
        .try_fold(0usize, |acc, &b| (b < 0x80).then_some((acc << 7) | b as usize))?;
    let footer = if buf[5] & 0x10 != 0 { 10 } else { 0 };
    let tag_len = 10 + size + footer;
    if tag_len > MAX_ID3_TAG {
        return None;
    }

    let mut out = buf[..buf.len().min(tag_len)].to_vec();
    out.resize(tag_len, 0);
    for _ in 0..SILENT_FRAMES {
        let start = out.len();
        out.resize(start + SILENT_FRAME_LEN, 0);
        out[start..start + 4].copy_from_slice(&SILENT_FRAME_HEADER);
    }
    Some(out)
}

// Blank means whitespace-only; stored values keep their spacing.
fn non_blank(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(Cow::into_owned)
}
