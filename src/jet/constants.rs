/// JET on-disk structure constants.
///
/// All multi-byte integers in the JET format are little-endian. Page
/// indices are zero-based. Offsets are within a page unless noted.
// File header
pub const HEADER_VERSION_OFFSET: usize = 0x14; // 1 byte - 0x00 = JET3, 0x01 = JET4
pub const HEADER_PROBE_SIZE: usize = 2048; // version byte fits in the smaller page size

// Page sizes
pub const SIZE_PAGE_JET3: usize = 2048;
pub const SIZE_PAGE_JET4: usize = 4096;

// Page codes (byte 0 of every page)
pub const PAGE_CODE_DATA: u8 = 0x01;
pub const PAGE_CODE_TDEF: u8 = 0x02;

// Tdef page layout
pub const TDEF_VC_MARK: &[u8; 2] = b"VC"; // JET3 only, bytes 2-3
pub const TDEF_NEXT_PAGE: usize = 4; // 4 bytes - overflow continuation page (0 = none)
pub const TDEF_LEN: usize = 8; // 4 bytes - total tdef length
pub const TDEF_BODY: usize = 12; // field parsing resumes here
pub const TDEF_OVERFLOW_DATA: usize = 8; // an overflow page contributes bytes from here

// Row slot words (u16 entries after the data page header)
pub const SLOT_OFFSET_MASK: u16 = 0x1FFF;
pub const SLOT_DELETED_FLAG: u16 = 0x4000;
pub const SLOT_LOOKUP_FLAG: u16 = 0x8000;

// Column descriptor bitmask
pub const COL_FIXED_FLAG: u8 = 0x01; // bit 0 set = fixed-length layout

// Memo (type 12) value layout
pub const MEMO_MASK_INLINE: u8 = 0x80; // text follows the memo header in the row
pub const MEMO_MASK_LVAL: u8 = 0x40; // text lives in one slot of a separate page
pub const MEMO_MASK_LVAL_MULTI: u8 = 0x00; // text spans multiple pages (not decoded)
pub const MEMO_INLINE_DATA: usize = 12; // inline memo text starts here

// System catalog
pub const CATALOG_TDEF_PAGE: u32 = 2;
pub const CATALOG_TYPE_MASK: u32 = 0x00FF_FFFF; // low 24 bits of Type; 1 = table
pub const CATALOG_SYSTEM_FLAGS: u32 = 0x8000_0002; // Flags bits marking system objects

// UTF-16LE byte-order mark introducing compressed UCS-2 text
pub const UCS2_COMPRESSED_PREFIX: [u8; 2] = [0xFF, 0xFE];
