//! JET binary format parsing.
//!
//! This module contains types and functions for reading the on-disk
//! structures of the Microsoft JET database engine (versions 3 and 4, the
//! `.mdb` files written by Access 97 through 2003): the file header,
//! table-definition pages, used-pages maps, data pages with their row
//! slots, and the per-type value encodings including compressed UCS-2
//! text and out-of-line memo storage.
//!
//! Start with [`database::Database`] to open a file, or drive the layers
//! directly through [`pager::Pager`].
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`version`] | Version byte detection, per-version format geometry |
//! | [`pager`] | File I/O abstraction, random page reads |
//! | [`unicode`] | Compressed UCS-2 expansion, latin1/UTF-16LE decoding |
//! | [`usage_map`] | Used-pages maps (inline and paged bitmap encodings) |
//! | [`tdef`] | Table-definition pages: columns, names, map pointer |
//! | [`data_page`] | Data-page row slots, fixed/variable value extraction |
//! | [`values`] | Column type codes and typed value decoding |
//! | [`catalog`] | System catalog at page 2, user-table discovery |
//! | [`database`] | Facade: open, list tables, read columns and rows |
//! | [`constants`] | JET page/structure constants |

pub mod catalog;
pub mod constants;
pub mod data_page;
pub mod database;
pub mod pager;
pub mod tdef;
pub mod unicode;
pub mod usage_map;
pub mod values;
pub mod version;
