//! Read-only access to Microsoft Access database files (JET engine
//! versions 3 and 4, the `.mdb` format produced from 1997 through 2003).
//!
//! Open a database with [`jet::database::Database::open`], then list its
//! user tables and decode their rows:
//!
//! ```no_run
//! use mdb::jet::database::Database;
//!
//! let mut db = Database::open("northwind.mdb").unwrap();
//! for table in db.tables() {
//!     println!("{}: {:?}", table, db.columns(&table).unwrap());
//! }
//! ```
//!
//! The crate only reads: no writes, no index traversal, no locking. A
//! handle owns its file descriptor and is single-threaded; open one handle
//! per thread if you need concurrency.

pub mod jet;
pub mod util;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MdbError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("unknown version byte 0x{0:02x} in file header")]
    UnknownVersion(u8),

    #[error("JET version {0} is not supported")]
    UnsupportedVersion(u8),

    #[error("malformed table definition: {0}")]
    MalformedTdef(String),

    #[error("malformed data page: {0}")]
    MalformedDataPage(String),

    #[error("no table named {0:?} in the catalog")]
    UnknownTable(String),
}
