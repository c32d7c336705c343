//! Data-page parsing: row-slot table and per-row column extraction.
//!
//! A data page (page code 0x01) holds rows of one table. After the page
//! header comes a table of u16 slot words addressing row bodies from the
//! end of the page backwards: slot 0's body ends at the page boundary and
//! each later slot ends where the previous one begins. Within a row body,
//! a null mask and a reversed table of variable-length value offsets grow
//! from the right while the fixed-length area sits at the left.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::jet::constants::PAGE_CODE_DATA;
use crate::jet::pager::Pager;
use crate::jet::tdef::TableDef;
use crate::jet::values::{self, ColumnValue};
use crate::jet::version::JetVersion;
use crate::util::bits::{bit_at_lsb, slot_is_deleted, slot_is_lookup, slot_offset};
use crate::MdbError;

/// One row's location within a data page.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RowSlot {
    /// Start of the row body within the page.
    pub offset: usize,
    /// Exclusive end of the row body.
    pub next: usize,
    /// Slot word carried the deleted flag.
    pub deleted: bool,
    /// Slot word carried the lookup flag.
    pub lookup: bool,
}

/// A decoded row.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    /// Index of the slot this row came from.
    pub slot: u16,
    /// One value per table column, in tdef order.
    pub values: Vec<ColumnValue>,
}

/// Parse only the slot-offset table of a data page.
///
/// Needs no table schema, so the memo long-value path can address rows on
/// a page it has no tdef for.
pub fn parse_row_slots(version: JetVersion, page: &[u8]) -> Result<Vec<RowSlot>, MdbError> {
    if page.first() != Some(&PAGE_CODE_DATA) {
        return Err(MdbError::MalformedDataPage(format!(
            "expected page code 0x01, found {:?}",
            page.first()
        )));
    }

    let header = version.data_page_header_size();
    if page.len() < header + 2 {
        return Err(MdbError::MalformedDataPage(
            "page too short for a row count".into(),
        ));
    }
    let num_rows = LittleEndian::read_u16(&page[header..]) as usize;
    let slots_end = header + 2 + num_rows * 2;
    if page.len() < slots_end {
        return Err(MdbError::MalformedDataPage(format!(
            "slot table for {} rows does not fit",
            num_rows
        )));
    }

    let mut slots = Vec::with_capacity(num_rows);
    let mut next = page.len();
    for i in 0..num_rows {
        let raw = LittleEndian::read_u16(&page[header + 2 + i * 2..]);
        let offset = slot_offset(raw) as usize;
        slots.push(RowSlot {
            offset,
            next,
            deleted: slot_is_deleted(raw),
            lookup: slot_is_lookup(raw),
        });
        next = offset;
    }

    Ok(slots)
}

/// Decode every non-deleted row on a data page.
pub fn parse_data_page(
    version: JetVersion,
    page: &[u8],
    table: &TableDef,
    pager: &mut Pager,
) -> Result<Vec<Row>, MdbError> {
    let slots = parse_row_slots(version, page)?;

    let mut rows = Vec::new();
    for (i, slot) in slots.iter().enumerate() {
        if slot.deleted {
            continue;
        }
        rows.push(Row {
            slot: i as u16,
            values: decode_row(version, page, slot, table, pager)?,
        });
    }
    Ok(rows)
}

/// Decode one row body into values for every table column.
fn decode_row(
    version: JetVersion,
    page: &[u8],
    slot: &RowSlot,
    table: &TableDef,
    pager: &mut Pager,
) -> Result<Vec<ColumnValue>, MdbError> {
    let (start, end) = (slot.offset, slot.next);
    if start >= end || end > page.len() {
        return Err(MdbError::MalformedDataPage(format!(
            "row slot [{}, {}) outside page",
            start, end
        )));
    }
    let count_size = version.row_count_size();

    // Row-local column count at the front of the body.
    let columns_in_row = read_count(version, page, start, end)?;
    let null_mask_size = columns_in_row.div_ceil(8);

    // Null mask occupies the body's last bytes; the var-offset table and
    // its length grow leftwards from there.
    let null_mask_start = end
        .checked_sub(null_mask_size)
        .filter(|&p| p >= start)
        .ok_or_else(|| row_truncated(start, end))?;
    let null_mask = &page[null_mask_start..end];

    let var_count_pos = null_mask_start
        .checked_sub(count_size)
        .filter(|&p| p >= start)
        .ok_or_else(|| row_truncated(start, end))?;
    let var_len = read_count(version, page, var_count_pos, end)?;

    let var_table_start = var_count_pos
        .checked_sub((var_len + 1) * count_size)
        .filter(|&p| p >= start)
        .ok_or_else(|| row_truncated(start, end))?;

    // Entries are stored back-to-front; reverse into natural order. The
    // extra trailing entry is the end of the last variable value.
    let mut var_offsets = Vec::with_capacity(var_len + 1);
    for entry in 0..=var_len {
        let pos = var_table_start + entry * count_size;
        var_offsets.push(read_count(version, page, pos, end)?);
    }
    var_offsets.reverse();

    let mut row_values = Vec::with_capacity(table.columns.len());
    for col in &table.columns {
        let present = bit_at_lsb(null_mask, col.number as usize);

        let (value_start, value_len) = if col.is_fixed() {
            (
                start + col.offset_fixed as usize + count_size,
                col.length as usize,
            )
        } else {
            let idx = col.offset_var as usize;
            let rel = var_offsets.get(idx).copied().unwrap_or(0);
            let len = if idx + 1 < var_offsets.len() {
                var_offsets[idx + 1].saturating_sub(rel)
            } else {
                0
            };
            (start + rel, len)
        };

        let value = if value_len == 0 {
            if present {
                ColumnValue::Text(String::new())
            } else {
                ColumnValue::Null
            }
        } else if !present {
            ColumnValue::Null
        } else {
            let value_end = value_start + value_len;
            if value_start < start || value_end > end {
                return Err(MdbError::MalformedDataPage(format!(
                    "column {:?} bytes [{}, {}) fall outside row [{}, {})",
                    col.name, value_start, value_end, start, end
                )));
            }
            values::decode_value(version, col.col_type, &page[value_start..value_end], pager)?
        };
        row_values.push(value);
    }

    Ok(row_values)
}

/// Read a u8 (JET3) or u16 (JET4) count at `pos`, bounded by the row end.
fn read_count(
    version: JetVersion,
    page: &[u8],
    pos: usize,
    end: usize,
) -> Result<usize, MdbError> {
    let width = version.row_count_size();
    if pos + width > end || pos + width > page.len() {
        return Err(MdbError::MalformedDataPage(format!(
            "count read at {} past row end {}",
            pos, end
        )));
    }
    Ok(match version {
        JetVersion::Jet3 => page[pos] as usize,
        JetVersion::Jet4 => LittleEndian::read_u16(&page[pos..]) as usize,
    })
}

fn row_truncated(start: usize, end: usize) -> MdbError {
    MdbError::MalformedDataPage(format!("row [{}, {}) too short for its headers", start, end))
}
