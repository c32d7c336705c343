//! Text decoding for JET columns.
//!
//! JET4 stores text as UTF-16LE, usually "compressed": a 0xFF 0xFE prefix
//! marks a stream of single bytes whose high bytes are an implicit 0x00,
//! with in-stream 0x00 markers toggling back to plain two-byte units. JET3
//! stores single-byte text, decoded here as latin1 (an approximation of
//! cp1252). Callers that need a different single-byte codepage can re-decode
//! the raw bytes themselves.

use crate::jet::constants::UCS2_COMPRESSED_PREFIX;
use crate::jet::version::JetVersion;

/// Expand JET4 compressed UCS-2 into plain UTF-16LE bytes.
///
/// `src` is the stream after the 0xFF 0xFE prefix. A 0x00 byte toggles
/// compression; while on, each byte becomes a `(byte, 0x00)` unit, while
/// off, byte pairs are copied verbatim. Output is capped at `2 * src.len()`
/// bytes and a trailing unpaired byte in uncompressed mode is dropped.
pub fn expand_compressed_ucs2(src: &[u8]) -> Vec<u8> {
    let dlen = src.len() * 2;
    let mut out = Vec::with_capacity(dlen);
    let mut compressing = true;
    let mut pos = 0;

    while pos < src.len() && out.len() < dlen {
        let byte = src[pos];
        if byte == 0x00 {
            compressing = !compressing;
            pos += 1;
        } else if compressing {
            out.push(byte);
            out.push(0x00);
            pos += 1;
        } else if pos + 1 < src.len() {
            out.push(src[pos]);
            out.push(src[pos + 1]);
            pos += 2;
        } else {
            break;
        }
    }

    out
}

/// Decode column text bytes according to the database version.
pub fn decode_text(version: JetVersion, bytes: &[u8]) -> String {
    match version {
        JetVersion::Jet3 => decode_latin1(bytes),
        JetVersion::Jet4 => {
            if bytes.len() >= 2 && bytes[0..2] == UCS2_COMPRESSED_PREFIX {
                decode_utf16le(&expand_compressed_ucs2(&bytes[2..]))
            } else {
                decode_utf16le(bytes)
            }
        }
    }
}

/// Decode bytes as latin1, one byte per character.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Decode UTF-16LE bytes.
///
/// An odd trailing byte is dropped; unpaired surrogates are replaced.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
