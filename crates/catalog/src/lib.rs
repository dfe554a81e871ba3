//! # Catalog Crate
//!
//! This crate loads the movies metadata dataset into an immutable in-memory
//! catalog.
//!
//! ## Main Components
//!
//! - **embedded**: decoder for the Python-literal list cells (`genres`, `production_countries`)
//! - **decoder**: one CSV row → one `Movie`
//! - **loader**: `CatalogBuilder`, load options and the CSV entry points
//! - **archive**: reading the dataset straight out of its zip archive
//! - **types**: `RawMovie`, `Movie`, `Catalog`
//! - **error**: error types for field, row and load failures
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{Catalog, LoadOptions};
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_archive(
//!     Path::new("movies_metadata.csv.zip"),
//!     LoadOptions::default(),
//! )?;
//!
//! println!("{} movies, {} genres", catalog.len(), catalog.genres().len());
//! ```

pub mod archive;
pub mod decoder;
pub mod embedded;
pub mod error;
pub mod loader;
pub mod types;

pub use decoder::{CsvHeader, CsvRow, RawRow, columns, decode_raw_row, decode_row};
pub use embedded::{EntryKeys, decode_embedded_list, decode_embedded_map, normalize_quotes};
pub use error::{CatalogError, FieldError, Result, RowDecodeError};
pub use loader::{CatalogBuilder, LoadOptions, RowErrorPolicy};
pub use types::{
    // Type aliases
    CountryCode,
    GenreId,
    MovieId,
    // Core types
    Catalog,
    Movie,
    RawMovie,
};
