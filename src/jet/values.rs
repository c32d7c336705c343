//! Column value decoding.
//!
//! Maps raw column bytes to typed [`ColumnValue`]s according to the JET
//! type code. Unsupported storage classes never fail: they decode to
//! [`ColumnValue::Unknown`], which displays as the `"[unknown type]"`
//! sentinel, so the rest of the row stays usable.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;
use std::fmt;

use crate::jet::constants::{MEMO_INLINE_DATA, MEMO_MASK_INLINE, MEMO_MASK_LVAL};
use crate::jet::data_page::parse_row_slots;
use crate::jet::pager::Pager;
use crate::jet::unicode;
use crate::jet::version::JetVersion;
use crate::MdbError;

/// Sentinel rendered for column types the decoder does not support.
pub const UNKNOWN_TYPE_SENTINEL: &str = "[unknown type]";

/// JET column type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    /// Yes/No (type 1), one byte.
    Boolean,
    /// Byte (type 2).
    Byte,
    /// 16-bit integer (type 3).
    Int,
    /// 32-bit integer (type 4).
    LongInt,
    /// Currency (type 5); not decoded.
    Currency,
    /// Single-precision float (type 6); not decoded.
    Float,
    /// Double-precision float (type 7).
    Double,
    /// Date/time (type 8), an IEEE-754 double of days since 1899-12-30.
    DateTime,
    /// Binary (type 9); not decoded.
    Binary,
    /// Short text (type 10).
    Text,
    /// OLE object (type 11); not decoded.
    Ole,
    /// Memo / long text (type 12).
    Memo,
    /// GUID (type 15); not decoded.
    Guid,
    /// Fixed-point numeric (type 16); not decoded.
    Numeric,
    /// Any code outside the known set.
    Unknown,
}

impl ColumnType {
    /// Map an on-disk type code to a `ColumnType`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => ColumnType::Boolean,
            2 => ColumnType::Byte,
            3 => ColumnType::Int,
            4 => ColumnType::LongInt,
            5 => ColumnType::Currency,
            6 => ColumnType::Float,
            7 => ColumnType::Double,
            8 => ColumnType::DateTime,
            9 => ColumnType::Binary,
            10 => ColumnType::Text,
            11 => ColumnType::Ole,
            12 => ColumnType::Memo,
            15 => ColumnType::Guid,
            16 => ColumnType::Numeric,
            _ => ColumnType::Unknown,
        }
    }

    /// Human-readable name for this type.
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Boolean => "Boolean",
            ColumnType::Byte => "Byte",
            ColumnType::Int => "Integer",
            ColumnType::LongInt => "Long Integer",
            ColumnType::Currency => "Currency",
            ColumnType::Float => "Single",
            ColumnType::Double => "Double",
            ColumnType::DateTime => "Date/Time",
            ColumnType::Binary => "Binary",
            ColumnType::Text => "Text",
            ColumnType::Ole => "OLE Object",
            ColumnType::Memo => "Memo",
            ColumnType::Guid => "GUID",
            ColumnType::Numeric => "Numeric",
            ColumnType::Unknown => "Unknown",
        }
    }
}

/// A single decoded column value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    /// SQL NULL (null-mask bit clear).
    Null,
    /// Boolean, stored as 0 or 1.
    Bool(u8),
    /// Byte.
    Byte(u8),
    /// 16-bit integer.
    Int(u16),
    /// 32-bit integer.
    Long(u32),
    /// Double-precision float.
    Double(f64),
    /// Date/time as the raw little-endian bit pattern; see [`datetime_days`].
    DateTime(u64),
    /// Text or memo content.
    Text(String),
    /// Unsupported column type; displays as [`UNKNOWN_TYPE_SENTINEL`].
    Unknown,
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Null => write!(f, "NULL"),
            ColumnValue::Bool(v) => write!(f, "{}", v),
            ColumnValue::Byte(v) => write!(f, "{}", v),
            ColumnValue::Int(v) => write!(f, "{}", v),
            ColumnValue::Long(v) => write!(f, "{}", v),
            ColumnValue::Double(v) => write!(f, "{}", v),
            ColumnValue::DateTime(v) => write!(f, "{}", v),
            ColumnValue::Text(s) => f.write_str(s),
            ColumnValue::Unknown => f.write_str(UNKNOWN_TYPE_SENTINEL),
        }
    }
}

/// Reinterpret a raw date/time bit pattern as its IEEE-754 value: days
/// since 1899-12-30, the fractional part carrying the time of day.
/// Conversion to a calendar date is left to the caller.
pub fn datetime_days(raw: u64) -> f64 {
    f64::from_bits(raw)
}

/// Decode one column value from its raw bytes.
///
/// `data` is the column's slice within the row (non-empty; zero-length
/// columns are resolved by the data-page decoder before this point). The
/// pager is needed for memo values stored out of line.
pub fn decode_value(
    version: JetVersion,
    col_type: u8,
    data: &[u8],
    pager: &mut Pager,
) -> Result<ColumnValue, MdbError> {
    match ColumnType::from_u8(col_type) {
        ColumnType::Boolean if !data.is_empty() => {
            Ok(ColumnValue::Bool(u8::from(data[0] != 0)))
        }
        ColumnType::Byte if !data.is_empty() => Ok(ColumnValue::Byte(data[0])),
        ColumnType::Int if data.len() >= 2 => Ok(ColumnValue::Int(LittleEndian::read_u16(data))),
        ColumnType::LongInt if data.len() >= 4 => {
            Ok(ColumnValue::Long(LittleEndian::read_u32(data)))
        }
        ColumnType::Double if data.len() >= 8 => {
            Ok(ColumnValue::Double(LittleEndian::read_f64(data)))
        }
        ColumnType::DateTime if data.len() >= 8 => {
            Ok(ColumnValue::DateTime(LittleEndian::read_u64(data)))
        }
        ColumnType::Text => Ok(ColumnValue::Text(unicode::decode_text(version, data))),
        ColumnType::Memo => decode_memo(version, data, pager),
        // Unsupported types, and supported types whose bytes fall short.
        _ => Ok(ColumnValue::Unknown),
    }
}

/// Decode a memo (type 12) column value.
///
/// The 12-byte memo header carries a 24-bit length, a storage-class mask,
/// and a packed page/row pointer: inline text (0x80) follows the header in
/// the row; a single-page long value (0x40) lives in one slot of a
/// separate data page; a multi-page long value (0x00) is not decoded.
fn decode_memo(version: JetVersion, data: &[u8], pager: &mut Pager) -> Result<ColumnValue, MdbError> {
    if data.len() < 8 {
        return Ok(ColumnValue::Unknown);
    }

    let memo_len = LittleEndian::read_u16(data) as u32 | (u32::from(data[2]) << 16);
    let memo_mask = data[3];
    let pointer = LittleEndian::read_u32(&data[4..]);
    let memo_page = pointer >> 8;
    let memo_row = (pointer & 0xFF) as usize;

    match memo_mask {
        MEMO_MASK_INLINE => {
            let start = MEMO_INLINE_DATA;
            let end = start + memo_len as usize;
            if end > data.len() {
                return Ok(ColumnValue::Unknown);
            }
            Ok(ColumnValue::Text(unicode::decode_text(
                version,
                &data[start..end],
            )))
        }
        MEMO_MASK_LVAL => {
            let page = pager.read_page(memo_page)?;
            let slots = parse_row_slots(version, &page)?;
            let slot = slots.get(memo_row).ok_or_else(|| {
                MdbError::MalformedDataPage(format!(
                    "memo row {} not present on page {}",
                    memo_row, memo_page
                ))
            })?;
            if slot.offset >= slot.next || slot.next > page.len() {
                return Err(MdbError::MalformedDataPage(format!(
                    "memo slot [{}, {}) outside page {}",
                    slot.offset, slot.next, memo_page
                )));
            }
            Ok(ColumnValue::Text(unicode::decode_text(
                version,
                &page[slot.offset..slot.next],
            )))
        }
        _ => Ok(ColumnValue::Unknown),
    }
}
