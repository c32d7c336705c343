//! JET version detection and version-dependent format geometry.
//!
//! Almost every structure in a JET file varies slightly between the 1997
//! (JET3) and 2000–2003 (JET4) formats: page size, the width of row-local
//! counts, header padding, record sizes, and text encoding. [`JetVersion`]
//! carries that geometry so the decoders branch on accessors instead of
//! duplicating themselves per version.

use serde::Serialize;
use std::fmt;

use crate::jet::constants::{HEADER_VERSION_OFFSET, SIZE_PAGE_JET3, SIZE_PAGE_JET4};
use crate::MdbError;

/// JET engine file-format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JetVersion {
    /// Access 97 format: 2048-byte pages, latin1 text.
    Jet3,
    /// Access 2000–2003 format: 4096-byte pages, UTF-16LE text.
    Jet4,
}

impl JetVersion {
    /// Detect the version from the file header.
    ///
    /// `header` must cover the version byte at offset 0x14. Byte values
    /// other than 0x00/0x01 fail with `UnknownVersion`.
    pub fn from_header(header: &[u8]) -> Result<Self, MdbError> {
        let byte = header
            .get(HEADER_VERSION_OFFSET)
            .copied()
            .ok_or_else(|| MdbError::Io(format!("header too short: {} bytes", header.len())))?;
        match byte {
            0x00 => Ok(JetVersion::Jet3),
            0x01 => Ok(JetVersion::Jet4),
            other => Err(MdbError::UnknownVersion(other)),
        }
    }

    /// Page size in bytes.
    pub fn page_size(self) -> usize {
        match self {
            JetVersion::Jet3 => SIZE_PAGE_JET3,
            JetVersion::Jet4 => SIZE_PAGE_JET4,
        }
    }

    /// Width of row-local counts and var-offset entries (u8 vs u16).
    pub fn row_count_size(self) -> usize {
        match self {
            JetVersion::Jet3 => 1,
            JetVersion::Jet4 => 2,
        }
    }

    /// Bytes of data-page header before the row count.
    pub fn data_page_header_size(self) -> usize {
        match self {
            JetVersion::Jet3 => 8,
            JetVersion::Jet4 => 12,
        }
    }

    /// Leading bytes of a used-pages-map page before the start offset.
    pub fn usage_map_skip(self) -> usize {
        match self {
            JetVersion::Jet3 => 10,
            JetVersion::Jet4 => 14,
        }
    }

    /// Size of one index entry in a tdef page.
    pub fn tdef_index_entry_size(self) -> usize {
        match self {
            JetVersion::Jet3 => 8,
            JetVersion::Jet4 => 12,
        }
    }

    /// Size of one column descriptor record in a tdef page.
    pub fn column_record_size(self) -> usize {
        match self {
            JetVersion::Jet3 => 18,
            JetVersion::Jet4 => 25,
        }
    }

    /// Numeric version (3 or 4).
    pub fn number(self) -> u8 {
        match self {
            JetVersion::Jet3 => 3,
            JetVersion::Jet4 => 4,
        }
    }
}

impl fmt::Display for JetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JetVersion::Jet3 => write!(f, "JET3"),
            JetVersion::Jet4 => write!(f, "JET4"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with_version(byte: u8) -> Vec<u8> {
        let mut buf = vec![0u8; 32];
        buf[HEADER_VERSION_OFFSET] = byte;
        buf
    }

    #[test]
    fn test_detect_jet3() {
        let v = JetVersion::from_header(&header_with_version(0x00)).unwrap();
        assert_eq!(v, JetVersion::Jet3);
        assert_eq!(v.page_size(), 2048);
        assert_eq!(v.row_count_size(), 1);
        assert_eq!(v.number(), 3);
    }

    #[test]
    fn test_detect_jet4() {
        let v = JetVersion::from_header(&header_with_version(0x01)).unwrap();
        assert_eq!(v, JetVersion::Jet4);
        assert_eq!(v.page_size(), 4096);
        assert_eq!(v.row_count_size(), 2);
        assert_eq!(v.number(), 4);
    }

    #[test]
    fn test_unknown_version_byte() {
        match JetVersion::from_header(&header_with_version(0x02)) {
            Err(MdbError::UnknownVersion(2)) => {}
            other => panic!("expected UnknownVersion(2), got {:?}", other),
        }
    }

    #[test]
    fn test_header_too_short() {
        assert!(matches!(
            JetVersion::from_header(&[0u8; 10]),
            Err(MdbError::Io(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(JetVersion::Jet3.to_string(), "JET3");
        assert_eq!(JetVersion::Jet4.to_string(), "JET4");
    }
}
