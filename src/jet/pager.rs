//! Random-access page reads over an open database file.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use crate::jet::constants::HEADER_PROBE_SIZE;
use crate::jet::version::JetVersion;
use crate::MdbError;

trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Owns the open database file and serves fixed-size page reads.
///
/// The underlying handle is held for the lifetime of the pager and released
/// when it goes out of scope. A pager is not thread-safe; callers serialize
/// access or open one pager per thread.
pub struct Pager {
    reader: Box<dyn ReadSeek>,
    file_size: u64,
    version: JetVersion,
    page_size: usize,
    page_count: u64,
}

impl Pager {
    /// Open a database file and detect its JET version from the header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MdbError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| MdbError::Io(format!("cannot open {}: {}", path.display(), e)))?;
        let file_size = file
            .metadata()
            .map_err(|e| MdbError::Io(format!("cannot stat {}: {}", path.display(), e)))?
            .len();

        Self::init(Box::new(file), file_size)
    }

    /// Create a pager over an in-memory byte buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, MdbError> {
        let file_size = data.len() as u64;
        Self::init(Box::new(Cursor::new(data)), file_size)
    }

    fn init(mut reader: Box<dyn ReadSeek>, file_size: u64) -> Result<Self, MdbError> {
        let probe_len = std::cmp::min(file_size, HEADER_PROBE_SIZE as u64) as usize;
        let mut header = vec![0u8; probe_len];
        reader
            .read_exact(&mut header)
            .map_err(|e| MdbError::Io(format!("cannot read file header: {}", e)))?;

        let version = JetVersion::from_header(&header)?;
        let page_size = version.page_size();
        let page_count = file_size / page_size as u64;

        Ok(Pager {
            reader,
            file_size,
            version,
            page_size,
            page_count,
        })
    }

    /// The detected file-format version.
    pub fn version(&self) -> JetVersion {
        self.version
    }

    /// Page size in bytes (2048 for JET3, 4096 for JET4).
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total number of whole pages in the file.
    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    /// File size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Read page `page` into a newly allocated buffer.
    pub fn read_page(&mut self, page: u32) -> Result<Vec<u8>, MdbError> {
        if u64::from(page) >= self.page_count {
            return Err(MdbError::Io(format!(
                "page {} out of range (file has {} pages)",
                page, self.page_count
            )));
        }

        let offset = u64::from(page) * self.page_size as u64;
        let mut buf = vec![0u8; self.page_size];

        self.reader
            .seek(SeekFrom::Start(offset))
            .map_err(|e| MdbError::Io(format!("cannot seek to page {}: {}", page, e)))?;
        self.reader
            .read_exact(&mut buf)
            .map_err(|e| MdbError::Io(format!("cannot read page {}: {}", page, e)))?;

        Ok(buf)
    }
}
