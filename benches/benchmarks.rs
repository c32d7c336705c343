//! Criterion benchmarks for mdb core operations.
//!
//! Benchmarks cover:
//! - Compressed UCS-2 expansion (UnicodeCodec hot path)
//! - Row-slot table parsing (parse_row_slots)
//! - Full data-page row decoding (parse_data_page)

use byteorder::{ByteOrder, LittleEndian};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mdb::jet::constants::HEADER_VERSION_OFFSET;
use mdb::jet::data_page::{parse_data_page, parse_row_slots};
use mdb::jet::pager::Pager;
use mdb::jet::tdef::{ColumnDef, TableDef};
use mdb::jet::unicode::expand_compressed_ucs2;
use mdb::jet::version::JetVersion;

const PS: usize = 4096;

// ---------------------------------------------------------------------------
// Synthetic page builders (mirrors integration test helpers)
// ---------------------------------------------------------------------------

fn jet4_pager() -> Pager {
    let mut data = vec![0u8; PS];
    data[HEADER_VERSION_OFFSET] = 0x01;
    Pager::from_bytes(data).unwrap()
}

fn bench_table() -> TableDef {
    TableDef {
        num_rows: 0,
        num_cols: 2,
        num_var_cols: 1,
        num_real_idx: 0,
        used_pages_page: 0,
        columns: vec![
            ColumnDef {
                col_type: 4,
                number: 0,
                offset_var: 0,
                row_number: 0,
                bitmask: 0x01,
                offset_fixed: 0,
                length: 4,
                name: "Id".to_string(),
            },
            ColumnDef {
                col_type: 10,
                number: 1,
                offset_var: 0,
                row_number: 1,
                bitmask: 0x00,
                offset_fixed: 0,
                length: 0,
                name: "Name".to_string(),
            },
        ],
    }
}

/// A JET4 row body: u16 column count, fixed area, one variable value,
/// reversed var-offset table, u16 var count, null mask.
fn build_row(id: u32, name: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&2u16.to_le_bytes());
    body.extend_from_slice(&id.to_le_bytes());
    let start = body.len() as u16;
    body.extend_from_slice(name);
    let end = body.len() as u16;
    body.extend_from_slice(&end.to_le_bytes());
    body.extend_from_slice(&start.to_le_bytes());
    body.extend_from_slice(&1u16.to_le_bytes());
    body.push(0x03);
    body
}

/// A data page filled with `count` rows.
fn build_data_page(count: usize) -> Vec<u8> {
    let mut page = vec![0u8; PS];
    page[0] = 0x01;
    LittleEndian::write_u16(&mut page[12..], count as u16);

    let name: Vec<u8> = "bench row text"
        .encode_utf16()
        .flat_map(|u| u.to_le_bytes())
        .collect();
    let mut end = PS;
    for i in 0..count {
        let body = build_row(i as u32, &name);
        let offset = end - body.len();
        page[offset..end].copy_from_slice(&body);
        LittleEndian::write_u16(&mut page[14 + i * 2..], offset as u16);
        end = offset;
    }
    page
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_ucs2_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ucs2_expansion");
    for size in [64usize, 512, 4096] {
        let src: Vec<u8> = (0..size).map(|i| b'a' + (i % 26) as u8).collect();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &src, |b, src| {
            b.iter(|| expand_compressed_ucs2(black_box(src)));
        });
    }
    group.finish();
}

fn bench_row_slots(c: &mut Criterion) {
    let page = build_data_page(60);
    c.bench_function("parse_row_slots_60", |b| {
        b.iter(|| parse_row_slots(JetVersion::Jet4, black_box(&page)).unwrap());
    });
}

fn bench_data_page(c: &mut Criterion) {
    let page = build_data_page(60);
    let table = bench_table();
    let mut pager = jet4_pager();
    c.bench_function("parse_data_page_60_rows", |b| {
        b.iter(|| {
            parse_data_page(JetVersion::Jet4, black_box(&page), &table, &mut pager).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_ucs2_expansion,
    bench_row_slots,
    bench_data_page
);
criterion_main!(benches);
