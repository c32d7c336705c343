//! Table-definition ("tdef") page parsing.
//!
//! A tdef page (page code 0x02) describes one table: row count, column
//! descriptors, column names, and a pointer to the table's used-pages map.
//! A definition too large for one page names a continuation page; its bytes
//! past the page header are appended to form one logical buffer. Only a
//! single continuation hop exists in the format revisions handled here.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::jet::constants::{
    COL_FIXED_FLAG, PAGE_CODE_TDEF, TDEF_BODY, TDEF_LEN, TDEF_NEXT_PAGE, TDEF_OVERFLOW_DATA,
    TDEF_VC_MARK,
};
use crate::jet::pager::Pager;
use crate::jet::unicode;
use crate::jet::version::JetVersion;
use crate::MdbError;

/// One column of a table, as laid out in the tdef page.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDef {
    /// On-disk type code (see [`crate::jet::values::ColumnType`]).
    pub col_type: u8,
    /// Column number; indexes the row null mask.
    pub number: u16,
    /// Position of this column's entry in a row's var-offset table.
    pub offset_var: u16,
    /// Column ordinal within the row.
    pub row_number: u16,
    /// Layout flags; bit 0 set means fixed-length.
    pub bitmask: u8,
    /// Byte offset of the value within the row's fixed-length area.
    pub offset_fixed: u16,
    /// Value length for fixed-layout columns.
    pub length: u16,
    /// Column name (latin1 in JET3, UTF-16LE in JET4).
    pub name: String,
}

impl ColumnDef {
    /// Returns true if the column stores its value in the fixed-length area.
    pub fn is_fixed(&self) -> bool {
        self.bitmask & COL_FIXED_FLAG != 0
    }
}

/// Parsed table definition.
#[derive(Debug, Clone, Serialize)]
pub struct TableDef {
    /// Row count recorded in the tdef.
    pub num_rows: u32,
    /// Number of columns.
    pub num_cols: u16,
    /// Number of variable-length columns.
    pub num_var_cols: u16,
    /// Number of real (non-logical) indexes; their pages are not traversed.
    pub num_real_idx: u32,
    /// Page holding this table's used-pages map.
    pub used_pages_page: u32,
    /// Column descriptors in tdef order.
    pub columns: Vec<ColumnDef>,
}

/// Parse a table-definition page.
///
/// If the page names a continuation page, that page's bytes past its header
/// are appended and parsing continues over the combined buffer. One hop
/// only; a second-level continuation is not followed.
pub fn parse_tdef(
    version: JetVersion,
    page: &[u8],
    pager: &mut Pager,
) -> Result<TableDef, MdbError> {
    if page.first() != Some(&PAGE_CODE_TDEF) {
        return Err(MdbError::MalformedTdef(format!(
            "expected page code 0x02, found {:?}",
            page.first()
        )));
    }
    if page.len() < TDEF_BODY {
        return Err(MdbError::MalformedTdef(format!(
            "tdef page too short: {} bytes",
            page.len()
        )));
    }
    // JET3 carries the "VC" mark at bytes 2-3; JET4 stores free space there.
    if version == JetVersion::Jet3 && &page[2..4] != TDEF_VC_MARK {
        return Err(MdbError::MalformedTdef(
            "missing VC mark on JET3 tdef page".into(),
        ));
    }

    let next_page = LittleEndian::read_u32(&page[TDEF_NEXT_PAGE..]);
    let _tdef_len = LittleEndian::read_u32(&page[TDEF_LEN..]);

    let buf = if next_page > 0 {
        let overflow = pager.read_page(next_page)?;
        let mut buf = page.to_vec();
        buf.extend_from_slice(&overflow[TDEF_OVERFLOW_DATA..]);
        buf
    } else {
        page.to_vec()
    };

    let mut cur = Cursor::new(&buf, TDEF_BODY);

    if version == JetVersion::Jet4 {
        cur.skip(4)?;
    }
    let num_rows = cur.u32()?;
    let _autonumber = cur.u32()?;
    if version == JetVersion::Jet4 {
        let _autonumber_flag = cur.u8()?;
        cur.skip(3)?;
        let _autonumber_value = cur.u32()?;
        cur.skip(8)?;
    }
    let _table_type = cur.u8()?;
    let _max_cols = cur.u16()?;
    let num_var_cols = cur.u16()?;
    let num_cols = cur.u16()?;
    let _num_idx = cur.u32()?;
    let num_real_idx = cur.u32()?;
    let _used_pages_row = cur.u8()?;
    let used_pages_page = cur.u24()?;
    let _free_pages_count = cur.u32()?;

    // Index metadata is not traversed; step over the records.
    cur.skip(num_real_idx as usize * version.tdef_index_entry_size())?;

    if cur.remaining() < num_cols as usize * version.column_record_size() {
        return Err(MdbError::MalformedTdef(format!(
            "{} column records do not fit in {} remaining bytes",
            num_cols,
            cur.remaining()
        )));
    }

    let mut columns = Vec::with_capacity(num_cols as usize);
    for _ in 0..num_cols {
        let col_type = cur.u8()?;
        if version == JetVersion::Jet4 {
            cur.skip(4)?;
        }
        let number = cur.u16()?;
        let offset_var = cur.u16()?;
        let row_number = cur.u16()?;
        if version == JetVersion::Jet3 {
            let _sort_order = cur.u16()?;
        }
        let _misc = cur.u16()?;
        let _misc_ext = cur.u16()?;
        let bitmask = cur.u8()?;
        if version == JetVersion::Jet4 {
            let _misc_flags = cur.u8()?;
            cur.skip(4)?;
        }
        let offset_fixed = cur.u16()?;
        let length = cur.u16()?;

        columns.push(ColumnDef {
            col_type,
            number,
            offset_var,
            row_number,
            bitmask,
            offset_fixed,
            length,
            name: String::new(),
        });
    }

    for col in columns.iter_mut() {
        let name_len = match version {
            JetVersion::Jet3 => cur.u8()? as usize,
            JetVersion::Jet4 => cur.u16()? as usize,
        };
        let raw = cur.bytes(name_len)?;
        col.name = match version {
            JetVersion::Jet3 => unicode::decode_latin1(raw),
            JetVersion::Jet4 => unicode::decode_utf16le(raw),
        };
        if col.name.is_empty() {
            return Err(MdbError::MalformedTdef(format!(
                "column {} has an empty name",
                col.number
            )));
        }
    }

    Ok(TableDef {
        num_rows,
        num_cols,
        num_var_cols,
        num_real_idx,
        used_pages_page,
        columns,
    })
}

/// Sequential reader over the (possibly continuation-extended) tdef buffer.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8], pos: usize) -> Self {
        Cursor { buf, pos }
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], MdbError> {
        if self.remaining() < n {
            return Err(MdbError::MalformedTdef(format!(
                "read of {} bytes at offset {} past tdef end ({})",
                n,
                self.pos,
                self.buf.len()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<(), MdbError> {
        self.take(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8, MdbError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, MdbError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    fn u32(&mut self) -> Result<u32, MdbError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// Three bytes into the low 24 bits of a u32.
    fn u24(&mut self) -> Result<u32, MdbError> {
        let b = self.take(3)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], 0]))
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8], MdbError> {
        self.take(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jet::constants::HEADER_VERSION_OFFSET;

    fn jet4_pager() -> Pager {
        let mut data = vec![0u8; 4096];
        data[HEADER_VERSION_OFFSET] = 0x01;
        Pager::from_bytes(data).unwrap()
    }

    fn jet3_pager() -> Pager {
        let mut data = vec![0u8; 2048];
        data[HEADER_VERSION_OFFSET] = 0x00;
        Pager::from_bytes(data).unwrap()
    }

    /// Append one JET4 column record to `buf`.
    fn push_jet4_column(
        buf: &mut Vec<u8>,
        col_type: u8,
        number: u16,
        offset_var: u16,
        bitmask: u8,
        offset_fixed: u16,
        length: u16,
    ) {
        buf.push(col_type);
        buf.extend_from_slice(&[0u8; 4]);
        buf.extend_from_slice(&number.to_le_bytes());
        buf.extend_from_slice(&offset_var.to_le_bytes());
        buf.extend_from_slice(&number.to_le_bytes()); // row ordinal
        buf.extend_from_slice(&0u16.to_le_bytes()); // misc
        buf.extend_from_slice(&0u16.to_le_bytes()); // misc ext
        buf.push(bitmask);
        buf.push(0); // misc flags
        buf.extend_from_slice(&[0u8; 4]);
        buf.extend_from_slice(&offset_fixed.to_le_bytes());
        buf.extend_from_slice(&length.to_le_bytes());
    }

    /// Build a single-page JET4 tdef with the given columns.
    fn build_jet4_tdef(columns: &[(&str, u8, u16, u16, u8, u16, u16)], map_page: u32) -> Vec<u8> {
        let mut page = vec![0u8; 4096];
        page[0] = PAGE_CODE_TDEF;
        page[1] = 0x01;
        // bytes 2-3: free space, 4-7: next page (0), 8-11: tdef length

        let mut body = Vec::new();
        body.extend_from_slice(&[0u8; 4]); // skip
        body.extend_from_slice(&9u32.to_le_bytes()); // num rows
        body.extend_from_slice(&0u32.to_le_bytes()); // autonumber
        body.push(0); // autonumber flag
        body.extend_from_slice(&[0u8; 3]);
        body.extend_from_slice(&0u32.to_le_bytes()); // autonumber value
        body.extend_from_slice(&[0u8; 8]);
        body.push(0x4E); // table type
        body.extend_from_slice(&(columns.len() as u16).to_le_bytes()); // max cols
        let num_var = columns.iter().filter(|c| c.4 & COL_FIXED_FLAG == 0).count() as u16;
        body.extend_from_slice(&num_var.to_le_bytes());
        body.extend_from_slice(&(columns.len() as u16).to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes()); // num idx
        body.extend_from_slice(&0u32.to_le_bytes()); // num real idx
        body.push(0); // used pages row
        body.extend_from_slice(&map_page.to_le_bytes()[..3]); // u24 map page
        body.extend_from_slice(&0u32.to_le_bytes()); // free pages

        for &(_, col_type, number, offset_var, bitmask, offset_fixed, length) in columns {
            push_jet4_column(
                &mut body, col_type, number, offset_var, bitmask, offset_fixed, length,
            );
        }
        for &(name, ..) in columns {
            let encoded: Vec<u8> = name.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
            body.extend_from_slice(&(encoded.len() as u16).to_le_bytes());
            body.extend_from_slice(&encoded);
        }

        page[TDEF_BODY..TDEF_BODY + body.len()].copy_from_slice(&body);
        page
    }

    #[test]
    fn test_parse_jet4_tdef() {
        let page = build_jet4_tdef(
            &[
                ("Id", 4, 0, 0, 0x01, 0, 4),
                ("Name", 10, 1, 0, 0x00, 0, 0),
            ],
            7,
        );
        let mut pager = jet4_pager();
        let tdef = parse_tdef(JetVersion::Jet4, &page, &mut pager).unwrap();

        assert_eq!(tdef.num_rows, 9);
        assert_eq!(tdef.num_cols, 2);
        assert_eq!(tdef.num_var_cols, 1);
        assert_eq!(tdef.used_pages_page, 7);

        assert_eq!(tdef.columns[0].name, "Id");
        assert!(tdef.columns[0].is_fixed());
        assert_eq!(tdef.columns[0].length, 4);

        assert_eq!(tdef.columns[1].name, "Name");
        assert!(!tdef.columns[1].is_fixed());
        assert_eq!(tdef.columns[1].offset_var, 0);
    }

    #[test]
    fn test_parse_jet3_tdef() {
        let mut page = vec![0u8; 2048];
        page[0] = PAGE_CODE_TDEF;
        page[1] = 0x01;
        page[2..4].copy_from_slice(TDEF_VC_MARK);

        let mut body = Vec::new();
        body.extend_from_slice(&5u32.to_le_bytes()); // num rows
        body.extend_from_slice(&0u32.to_le_bytes()); // autonumber
        body.push(0x4E); // table type
        body.extend_from_slice(&1u16.to_le_bytes()); // max cols
        body.extend_from_slice(&0u16.to_le_bytes()); // num var cols
        body.extend_from_slice(&1u16.to_le_bytes()); // num cols
        body.extend_from_slice(&0u32.to_le_bytes()); // num idx
        body.extend_from_slice(&0u32.to_le_bytes()); // num real idx
        body.push(0);
        body.extend_from_slice(&6u32.to_le_bytes()[..3]); // map page
        body.extend_from_slice(&0u32.to_le_bytes());

        // one fixed Long column
        body.push(4); // type
        body.extend_from_slice(&0u16.to_le_bytes()); // number
        body.extend_from_slice(&0u16.to_le_bytes()); // offset var
        body.extend_from_slice(&0u16.to_le_bytes()); // row ordinal
        body.extend_from_slice(&0u16.to_le_bytes()); // sort order
        body.extend_from_slice(&0u16.to_le_bytes()); // misc
        body.extend_from_slice(&0u16.to_le_bytes()); // misc ext
        body.push(0x01); // bitmask: fixed
        body.extend_from_slice(&0u16.to_le_bytes()); // offset fixed
        body.extend_from_slice(&4u16.to_le_bytes()); // length

        body.push(5); // name length
        body.extend_from_slice(b"Total");

        page[TDEF_BODY..TDEF_BODY + body.len()].copy_from_slice(&body);

        let mut pager = jet3_pager();
        let tdef = parse_tdef(JetVersion::Jet3, &page, &mut pager).unwrap();
        assert_eq!(tdef.num_rows, 5);
        assert_eq!(tdef.num_cols, 1);
        assert_eq!(tdef.used_pages_page, 6);
        assert_eq!(tdef.columns[0].name, "Total");
        assert!(tdef.columns[0].is_fixed());
    }

    #[test]
    fn test_wrong_page_code() {
        let page = vec![0x01u8; 4096];
        let mut pager = jet4_pager();
        assert!(matches!(
            parse_tdef(JetVersion::Jet4, &page, &mut pager),
            Err(MdbError::MalformedTdef(_))
        ));
    }

    #[test]
    fn test_missing_vc_mark() {
        let mut page = vec![0u8; 2048];
        page[0] = PAGE_CODE_TDEF;
        page[2..4].copy_from_slice(b"XX");
        let mut pager = jet3_pager();
        assert!(matches!(
            parse_tdef(JetVersion::Jet3, &page, &mut pager),
            Err(MdbError::MalformedTdef(_))
        ));
    }

    #[test]
    fn test_truncated_column_records() {
        // Claim 200 columns but provide none.
        let mut page = build_jet4_tdef(&[("Id", 4, 0, 0, 0x01, 0, 4)], 7);
        // num_cols sits at body offset 33 (4 skip + 4 + 4 + 1 + 3 + 4 + 8 + 1 + 2 + 2)
        let pos = TDEF_BODY + 33;
        LittleEndian::write_u16(&mut page[pos..], 200);
        let mut pager = jet4_pager();
        assert!(matches!(
            parse_tdef(JetVersion::Jet4, &page, &mut pager),
            Err(MdbError::MalformedTdef(_))
        ));
    }
}
