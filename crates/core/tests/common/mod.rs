//! Synthesised media fixtures.
#![allow(dead_code)]

/// Baseline JPEG with an APP1 Exif segment carrying `DateTime` in IFD0 and
/// `PixelXDimension`/`PixelYDimension` in the Exif IFD (big-endian TIFF).
pub fn jpeg_with_exif(width: u32, height: u32, date: &str) -> Vec<u8> {
    assert_eq!(date.len(), 19, "EXIF dates are 19 characters");

    fn entry(out: &mut Vec<u8>, tag: u16, typ: u16, count: u32, value: u32) {
        out.extend_from_slice(&tag.to_be_bytes());
        out.extend_from_slice(&typ.to_be_bytes());
        out.extend_from_slice(&count.to_be_bytes());
        out.extend_from_slice(&value.to_be_bytes());
    }

    const ASCII: u16 = 2;
    const LONG: u16 = 4;
    // header (8) + IFD0 (2 + 2*12 + 4) + Exif IFD (2 + 2*12 + 4)
    let exif_ifd_offset = 8 + 30;
    let date_offset = exif_ifd_offset + 30;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2a");
    tiff.extend_from_slice(&8u32.to_be_bytes());

    tiff.extend_from_slice(&2u16.to_be_bytes());
    entry(&mut tiff, 0x0132, ASCII, 20, date_offset);
    entry(&mut tiff, 0x8769, LONG, 1, exif_ifd_offset);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    tiff.extend_from_slice(&2u16.to_be_bytes());
    entry(&mut tiff, 0xA002, LONG, 1, width);
    entry(&mut tiff, 0xA003, LONG, 1, height);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    assert_eq!(tiff.len() as u32, date_offset);
    tiff.extend_from_slice(date.as_bytes());
    tiff.push(0);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let seg_len = (2 + 6 + tiff.len()) as u16;
    jpeg.extend_from_slice(&seg_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\x00\x00");
    jpeg.extend_from_slice(&tiff);
    // Stand-in for scan data so the file is more than its header.
    jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
    jpeg.extend(std::iter::repeat(0x5A).take(2048));
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// JPEG/JFIF header with no Exif segment.
pub fn plain_jpeg() -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    jpeg.extend_from_slice(b"JFIF\x00\x01\x01\x00\x00\x01\x00\x01\x00\x00");
    jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
    jpeg.extend(std::iter::repeat(0x11).take(512));
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// ID3v2.3 tag with Latin-1 text frames followed by silent MPEG-1 Layer III
/// frames (128 kbps, 44.1 kHz, 417 bytes each).
pub fn mp3_with_id3(frames: &[(&str, &str)]) -> Vec<u8> {
    let body: Vec<u8> = frames
        .iter()
        .flat_map(|(id, text)| id3_text_frame(3, id, TextEncoding::Latin1, text))
        .collect();
    let mut out = id3_tag(3, &body);
    out.extend(mpeg_frames(8));
    out
}

#[derive(Debug, Clone, Copy)]
pub enum TextEncoding {
    Latin1,
    /// UTF-16 with a little-endian byte order mark.
    Utf16,
    /// ID3v2.4 only.
    Utf8,
}

/// One `T***` frame. `version` is 3 or 4; v2.4 frame sizes are synchsafe.
pub fn id3_text_frame(version: u8, id: &str, encoding: TextEncoding, text: &str) -> Vec<u8> {
    let mut payload = Vec::new();
    match encoding {
        TextEncoding::Latin1 => {
            payload.push(0);
            payload.extend(text.chars().map(|c| u8::try_from(c as u32).expect("latin-1 text")));
        }
        TextEncoding::Utf16 => {
            payload.push(1);
            payload.extend_from_slice(&[0xFF, 0xFE]);
            payload.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        }
        TextEncoding::Utf8 => {
            payload.push(3);
            payload.extend_from_slice(text.as_bytes());
        }
    }
    id3_frame(version, id, &payload)
}

/// `APIC` frame carrying `image_len` bytes of picture data.
pub fn id3_picture_frame(image_len: usize) -> Vec<u8> {
    let mut payload = vec![0];
    payload.extend_from_slice(b"image/jpeg\0");
    payload.push(3); // front cover
    payload.push(0); // empty description
    payload.extend(std::iter::repeat(0xAB).take(image_len));
    id3_frame(3, "APIC", &payload)
}

fn id3_frame(version: u8, id: &str, payload: &[u8]) -> Vec<u8> {
    assert_eq!(id.len(), 4);
    let mut out = id.as_bytes().to_vec();
    let len = payload.len() as u32;
    if version == 4 {
        out.extend_from_slice(&synchsafe(len));
    } else {
        out.extend_from_slice(&len.to_be_bytes());
    }
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(payload);
    out
}

/// ID3v2 header followed by `body`.
pub fn id3_tag(version: u8, body: &[u8]) -> Vec<u8> {
    let mut out = vec![b'I', b'D', b'3', version, 0, 0];
    out.extend_from_slice(&synchsafe(body.len() as u32));
    out.extend_from_slice(body);
    out
}

/// Silent MPEG-1 Layer III frames.
pub fn mpeg_frames(count: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for _ in 0..count {
        let mut frame = vec![0u8; 417];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        out.extend_from_slice(&frame);
    }
    out
}

fn synchsafe(n: u32) -> [u8; 4] {
    [
        ((n >> 21) & 0x7F) as u8,
        ((n >> 14) & 0x7F) as u8,
        ((n >> 7) & 0x7F) as u8,
        (n & 0x7F) as u8,
    ]
}

/// Ogg Vorbis stream: identification header on the first page, then the
/// comment and setup headers sharing the second page, then one audio page.
pub fn ogg_vorbis(comments: &[&str]) -> Vec<u8> {
    const SERIAL: u32 = 0x1234_5678;

    let mut ident = b"\x01vorbis".to_vec();
    ident.extend_from_slice(&0u32.to_le_bytes()); // version
    ident.push(2); // channels
    ident.extend_from_slice(&44_100u32.to_le_bytes());
    ident.extend_from_slice(&0i32.to_le_bytes());
    ident.extend_from_slice(&128_000i32.to_le_bytes());
    ident.extend_from_slice(&0i32.to_le_bytes());
    ident.push(0xB8); // blocksizes 256 / 2048
    ident.push(1); // framing

    let vendor = b"fixture";
    let mut comment = b"\x03vorbis".to_vec();
    comment.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    comment.extend_from_slice(vendor);
    comment.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for c in comments {
        comment.extend_from_slice(&(c.len() as u32).to_le_bytes());
        comment.extend_from_slice(c.as_bytes());
    }
    comment.push(1);

    let mut setup = b"\x05vorbis".to_vec();
    setup.extend_from_slice(&[0u8; 32]);

    let mut out = ogg_page(0x02, 0, SERIAL, 0, &[ident.as_slice()]);
    out.extend(ogg_page(0x00, 0, SERIAL, 1, &[comment.as_slice(), setup.as_slice()]));
    out.extend(ogg_page(0x04, 44_100, SERIAL, 2, &[&[0u8; 64][..]]));
    out
}

fn ogg_page(header_type: u8, granule: u64, serial: u32, sequence: u32, packets: &[&[u8]]) -> Vec<u8> {
    let mut lacing = Vec::new();
    for packet in packets {
        lacing.extend(std::iter::repeat(255u8).take(packet.len() / 255));
        lacing.push((packet.len() % 255) as u8);
    }
    assert!(lacing.len() <= 255, "packets too large for one page");

    let mut page = b"OggS".to_vec();
    page.push(0);
    page.push(header_type);
    page.extend_from_slice(&granule.to_le_bytes());
    page.extend_from_slice(&serial.to_le_bytes());
    page.extend_from_slice(&sequence.to_le_bytes());
    page.extend_from_slice(&[0; 4]);
    page.push(lacing.len() as u8);
    page.extend_from_slice(&lacing);
    for packet in packets {
        page.extend_from_slice(packet);
    }
    let crc = ogg_crc(&page);
    page[22..26].copy_from_slice(&crc.to_le_bytes());
    page
}

// CRC-32, polynomial 0x04C11DB7, no reflection, zero init.
fn ogg_crc(data: &[u8]) -> u32 {
    let mut crc = 0u32;
    for &byte in data {
        crc ^= (byte as u32) << 24;
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ 0x04C1_1DB7
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Deterministic pseudo-random bytes.
pub fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2654435761).max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}
