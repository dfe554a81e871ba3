//! Catalog construction.
//!
//! Loading is build-then-freeze: a `CatalogBuilder` decodes rows one at a
//! time and applies the row error policy, then `finish()` derives the genre
//! and country lookups and hands back an immutable `Catalog`.

use crate::decoder::{self, CsvHeader, RawRow};
use crate::error::{CatalogError, Result, RowDecodeError};
use crate::types::{Catalog, CountryCode, GenreId, Movie};
use csv::StringRecord;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, instrument, warn};

// =============================================================================
// Load options
// =============================================================================

/// What to do with a row that fails to decode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowErrorPolicy {
    /// Abort the whole load with `CatalogError::RowDecode`
    #[default]
    FailFast,
    /// Drop the row, log a warning and count it in `Catalog::skipped_rows`
    SkipRow,
}

/// Options controlling a catalog load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub row_error_policy: RowErrorPolicy,
}

impl LoadOptions {
    /// Fail-fast options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_error_policy(mut self, policy: RowErrorPolicy) -> Self {
        self.row_error_policy = policy;
        self
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Mutable staging area for a catalog under construction.
#[derive(Debug)]
pub struct CatalogBuilder {
    options: LoadOptions,
    movies: Vec<Movie>,
    skipped_rows: usize,
}

impl CatalogBuilder {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            movies: Vec::new(),
            skipped_rows: 0,
        }
    }

    /// Decode a row and add it.
    ///
    /// `line` only labels errors and warnings. Under `FailFast` a decode
    /// failure is returned; under `SkipRow` it is logged and counted.
    pub fn push_row<R: RawRow + ?Sized>(&mut self, row: &R, line: u64) -> Result<()> {
        match decoder::decode_row(row) {
            Ok(movie) => {
                self.movies.push(movie);
                Ok(())
            }
            Err(source) => self.reject(line, source),
        }
    }

    /// Add an already decoded movie
    pub fn push_movie(&mut self, movie: Movie) {
        self.movies.push(movie);
    }

    fn reject(&mut self, line: u64, source: RowDecodeError) -> Result<()> {
        match self.options.row_error_policy {
            RowErrorPolicy::FailFast => Err(CatalogError::RowDecode { line, source }),
            RowErrorPolicy::SkipRow => {
                warn!(line, column = source.column, "Skipping row: {}", source);
                self.skipped_rows += 1;
                Ok(())
            }
        }
    }

    /// Freeze the builder into a `Catalog`
    pub fn finish(self) -> Catalog {
        let (genres, countries) = derive_lookups(&self.movies);
        Catalog {
            movies: self.movies,
            genres,
            countries,
            skipped_rows: self.skipped_rows,
        }
    }
}

/// Distinct union of every movie's genres and countries.
///
/// Movies are visited in catalog order and the first name seen for an id is
/// kept; a later movie using the same id with another name does not replace it.
fn derive_lookups(
    movies: &[Movie],
) -> (BTreeMap<GenreId, String>, BTreeMap<CountryCode, String>) {
    let mut genres = BTreeMap::new();
    let mut countries = BTreeMap::new();

    for movie in movies {
        for (&id, name) in &movie.genres {
            genres.entry(id).or_insert_with(|| name.clone());
        }
        for (code, name) in &movie.production_countries {
            countries
                .entry(code.clone())
                .or_insert_with(|| name.clone());
        }
    }

    (genres, countries)
}

// =============================================================================
// Entry points
// =============================================================================

impl Catalog {
    /// Build a catalog from movies that are already decoded
    pub fn from_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        let mut builder = CatalogBuilder::new(LoadOptions::default());
        for movie in movies {
            builder.push_movie(movie);
        }
        builder.finish()
    }

    /// Build a catalog from rows addressed by column name.
    ///
    /// Rows are numbered from 1 in error messages.
    pub fn build<R: RawRow>(rows: impl IntoIterator<Item = R>, options: LoadOptions) -> Result<Self> {
        let mut builder = CatalogBuilder::new(options);
        for (idx, row) in rows.into_iter().enumerate() {
            builder.push_row(&row, idx as u64 + 1)?;
        }
        Ok(builder.finish())
    }

    /// Build a catalog from CSV text with a header row.
    ///
    /// Every decoder column must appear in the header; extra columns are
    /// ignored. Row errors carry the source line of the record.
    #[instrument(skip(reader))]
    pub fn from_reader<Rd: Read>(reader: Rd, options: LoadOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header = CsvHeader::new(csv_reader.headers()?);
        if let Some(&column) = header.missing_columns().first() {
            return Err(CatalogError::MissingColumn { column });
        }

        let mut builder = CatalogBuilder::new(options);
        let mut record = StringRecord::new();
        while csv_reader.read_record(&mut record)? {
            let line = record.position().map_or(0, |pos| pos.line());
            builder.push_row(&header.row(&record), line)?;
        }

        let catalog = builder.finish();
        info!(
            "Loaded {} movies ({} genres, {} countries, {} rows skipped)",
            catalog.len(),
            catalog.genres().len(),
            catalog.countries().len(),
            catalog.skipped_rows()
        );
        Ok(catalog)
    }

    /// Load from a file: `.zip` archives go through the archive opener,
    /// anything else is read as plain CSV.
    pub fn load_from_path(path: &Path, options: LoadOptions) -> Result<Self> {
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

        if is_zip {
            Self::load_from_archive(path, options)
        } else {
            info!("Reading CSV {}", path.display());
            let file = File::open(path)?;
            Self::from_reader(BufReader::new(file), options)
        }
    }
}
