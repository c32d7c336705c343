//! Database facade.

use std::path::Path;

use crate::jet::catalog::{read_catalog, CatalogEntry};
use crate::jet::data_page::{parse_data_page, Row};
use crate::jet::pager::Pager;
use crate::jet::tdef::{parse_tdef, TableDef};
use crate::jet::usage_map::read_usage_map;
use crate::jet::version::JetVersion;
use crate::MdbError;

/// An open Access database.
///
/// Owns the file handle for its lifetime; dropping the handle releases it.
/// A handle is single-threaded: callers needing concurrency open one
/// handle per thread.
pub struct Database {
    pager: Pager,
    catalog: Vec<CatalogEntry>,
}

impl Database {
    /// Open a `.mdb` file: detect its JET version and read the catalog.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MdbError> {
        Self::with_pager(Pager::open(path)?)
    }

    /// Open a database held entirely in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, MdbError> {
        Self::with_pager(Pager::from_bytes(data)?)
    }

    fn with_pager(mut pager: Pager) -> Result<Self, MdbError> {
        let catalog = read_catalog(pager.version(), &mut pager)?;
        Ok(Database { pager, catalog })
    }

    /// The detected file-format version.
    pub fn version(&self) -> JetVersion {
        self.pager.version()
    }

    /// User table names, in catalog discovery order.
    pub fn tables(&self) -> Vec<String> {
        self.catalog.iter().map(|e| e.name.clone()).collect()
    }

    /// Column names of `table`, in tdef order.
    pub fn columns(&mut self, table: &str) -> Result<Vec<String>, MdbError> {
        let tdef = self.table_def(table)?;
        Ok(tdef.columns.iter().map(|c| c.name.clone()).collect())
    }

    /// All non-deleted rows of `table`, page by page in used-pages order.
    pub fn rows(&mut self, table: &str) -> Result<Vec<Row>, MdbError> {
        let tdef = self.table_def(table)?;
        let version = self.pager.version();

        let map_page = self.pager.read_page(tdef.used_pages_page)?;
        let data_pages = read_usage_map(version, &map_page, &mut self.pager)?;

        let mut rows = Vec::new();
        for page_no in data_pages {
            let page = self.pager.read_page(page_no)?;
            rows.extend(parse_data_page(version, &page, &tdef, &mut self.pager)?);
        }
        Ok(rows)
    }

    /// Parse the tdef of a cataloged table by name.
    fn table_def(&mut self, table: &str) -> Result<TableDef, MdbError> {
        let tdef_page = self
            .catalog
            .iter()
            .find(|e| e.name == table)
            .map(|e| e.tdef_page)
            .ok_or_else(|| MdbError::UnknownTable(table.to_string()))?;

        let version = self.pager.version();
        let page = self.pager.read_page(tdef_page)?;
        parse_tdef(version, &page, &mut self.pager)
    }
}
