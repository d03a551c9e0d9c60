//! Module archive reader

use std::fs;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{DocError, DocResult, IoContext};

/// One file of a module archive, held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Entry name, `{module}@{version}/path/in/module`
    pub name: String,
    pub content: Vec<u8>,
}

/// Read every file entry of a zip archive. Directory entries are skipped.
pub fn extract<R: Read + Seek>(reader: R) -> DocResult<Vec<FileRecord>> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut records = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut content = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut content).map_err(|e| DocError::Archive {
            message: format!("Failed to read entry {}: {}", name, e),
        })?;
        records.push(FileRecord { name, content });
    }

    Ok(records)
}

/// Read a zip archive from disk
pub fn extract_file(path: &Path) -> DocResult<Vec<FileRecord>> {
    let file = fs::File::open(path).with_io_context("Failed to open module archive")?;
    extract(file)
}
