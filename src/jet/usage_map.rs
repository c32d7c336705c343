//! Used-pages map parsing.
//!
//! Each table's tdef points at a map recording which data pages hold the
//! table's rows. Two encodings exist on disk: an inline bitmap over a
//! contiguous page range (map type 0) and a paged bitmap spread across
//! dedicated map pages (map type 1). Both iterate bits LSB-first.

use byteorder::{ByteOrder, LittleEndian};

use crate::jet::pager::Pager;
use crate::jet::version::JetVersion;
use crate::util::bits::iter_bits_lsb;
use crate::MdbError;

/// Inline bitmap: `u32` first page, then a bitmap over pages from there.
pub const MAP_TYPE_INLINE: u8 = 0;
/// Paged bitmap: `u32` map-page pointers, each page holding one bitmap run.
pub const MAP_TYPE_PAGED: u8 = 1;

/// Parse a used-pages-map page into the data-page indices it covers, in
/// ascending discovery order.
pub fn read_usage_map(
    version: JetVersion,
    map_page: &[u8],
    pager: &mut Pager,
) -> Result<Vec<u32>, MdbError> {
    let skip = version.usage_map_skip();
    if map_page.len() < skip + 2 {
        return Err(MdbError::MalformedTdef("used-pages map too short".into()));
    }

    let start = LittleEndian::read_u16(&map_page[skip..]) as usize;
    if start >= map_page.len() {
        return Err(MdbError::MalformedTdef(format!(
            "used-pages map start offset {} beyond page end {}",
            start,
            map_page.len()
        )));
    }

    let map_type = map_page[start];
    let body = &map_page[start + 1..];

    match map_type {
        MAP_TYPE_INLINE => read_inline_map(body),
        MAP_TYPE_PAGED => read_paged_map(body, pager),
        other => Err(MdbError::MalformedTdef(format!(
            "unknown usage map type {}",
            other
        ))),
    }
}

fn read_inline_map(body: &[u8]) -> Result<Vec<u32>, MdbError> {
    if body.len() < 4 {
        return Err(MdbError::MalformedTdef(
            "inline usage map missing page start".into(),
        ));
    }

    let page_start = LittleEndian::read_u32(body);
    Ok(iter_bits_lsb(&body[4..])
        .enumerate()
        .filter(|(_, set)| *set)
        .map(|(bit, _)| page_start + bit as u32)
        .collect())
}

/// Each non-zero entry names a map page; its bitmap (after a 4-byte page
/// header) covers `(page_size - 4) * 8` pages, entry `i` starting at page
/// `i * (page_size - 4) * 8`.
fn read_paged_map(body: &[u8], pager: &mut Pager) -> Result<Vec<u32>, MdbError> {
    let pages_per_map = (pager.page_size() - 4) * 8;
    let mut pages = Vec::new();

    for (i, entry) in body.chunks_exact(4).enumerate() {
        let map_page = LittleEndian::read_u32(entry);
        if map_page == 0 {
            continue;
        }

        let buf = pager.read_page(map_page)?;
        let base = (i * pages_per_map) as u32;
        for (bit, set) in iter_bits_lsb(&buf[4..]).enumerate() {
            if set {
                pages.push(base + bit as u32);
            }
        }
    }

    Ok(pages)
}
