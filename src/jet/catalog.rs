//! System catalog access.
//!
//! The catalog (Access's MSysObjects) is an ordinary table whose tdef
//! always lives at page 2. Every object in the database has a row there;
//! user tables are the rows whose `Type` is 1 and whose `Flags` carry
//! neither system bit.

use serde::Serialize;

use crate::jet::constants::{CATALOG_SYSTEM_FLAGS, CATALOG_TDEF_PAGE, CATALOG_TYPE_MASK};
use crate::jet::data_page::parse_data_page;
use crate::jet::pager::Pager;
use crate::jet::tdef::parse_tdef;
use crate::jet::usage_map::read_usage_map;
use crate::jet::values::ColumnValue;
use crate::jet::version::JetVersion;
use crate::MdbError;

/// One user table found in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    /// Table name, from the catalog's `Name` column.
    pub name: String,
    /// Page of the table's tdef, from the `Id` column.
    pub tdef_page: u32,
}

/// Read the system catalog and return the user tables in discovery order.
pub fn read_catalog(version: JetVersion, pager: &mut Pager) -> Result<Vec<CatalogEntry>, MdbError> {
    let tdef_page = pager.read_page(CATALOG_TDEF_PAGE)?;
    let catalog = parse_tdef(version, &tdef_page, pager)?;

    let column = |name: &str| -> Result<usize, MdbError> {
        catalog
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| MdbError::MalformedTdef(format!("catalog has no {:?} column", name)))
    };
    let name_col = column("Name")?;
    let type_col = column("Type")?;
    let flags_col = column("Flags")?;
    let id_col = column("Id")?;

    let map_page = pager.read_page(catalog.used_pages_page)?;
    let data_pages = read_usage_map(version, &map_page, pager)?;

    let mut entries = Vec::new();
    for page_no in data_pages {
        let page = pager.read_page(page_no)?;
        for row in parse_data_page(version, &page, &catalog, pager)? {
            let object_type = match row.values.get(type_col) {
                Some(&ColumnValue::Int(v)) => u32::from(v),
                Some(&ColumnValue::Long(v)) => v,
                _ => continue,
            };
            if object_type & CATALOG_TYPE_MASK != 1 {
                continue;
            }

            let flags = match row.values.get(flags_col) {
                Some(&ColumnValue::Long(v)) => v,
                Some(&ColumnValue::Int(v)) => u32::from(v),
                _ => 0, // a null Flags column marks a plain user object
            };
            if flags & CATALOG_SYSTEM_FLAGS != 0 {
                continue;
            }

            let name = match row.values.get(name_col) {
                Some(ColumnValue::Text(s)) => s.clone(),
                _ => continue,
            };
            let tdef_page = match row.values.get(id_col) {
                Some(&ColumnValue::Long(v)) => v,
                Some(&ColumnValue::Int(v)) => u32::from(v),
                _ => continue,
            };

            entries.push(CatalogEntry { name, tdef_page });
        }
    }

    Ok(entries)
}
