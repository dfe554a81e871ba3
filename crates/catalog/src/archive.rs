//! Zip archive input.
//!
//! The dataset ships as a zip holding a single CSV file. The archive is
//! opened, its one entry is streamed straight into the CSV loader, and
//! nothing is extracted to disk.

use crate::error::{CatalogError, Result};
use crate::loader::LoadOptions;
use crate::types::Catalog;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, info, instrument};
use zip::ZipArchive;

impl Catalog {
    /// Load a catalog from a zip archive on disk
    #[instrument]
    pub fn load_from_archive(path: &Path, options: LoadOptions) -> Result<Self> {
        info!("Opening archive {}", path.display());
        let file = File::open(path)?;
        Self::from_archive_reader(BufReader::new(file), options)
    }

    /// Load a catalog from any seekable zip stream.
    ///
    /// The archive must contain exactly one entry.
    pub fn from_archive_reader<R: Read + Seek>(reader: R, options: LoadOptions) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        if archive.len() != 1 {
            return Err(CatalogError::ArchiveEntryCount {
                found: archive.len(),
            });
        }

        let entry = archive.by_index(0)?;
        debug!(entry = entry.name(), size = entry.size(), "Reading archive entry");
        Self::from_reader(entry, options)
    }
}
