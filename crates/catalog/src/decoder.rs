//! Record decoder: one CSV row in, one `Movie` out.
//!
//! Rows are addressed by column name through the [`RawRow`] trait, so the
//! same decoder serves `csv` records and plain string maps (handy in tests).
//!
//! Field rules:
//! - `genres`, `production_countries`: embedded lists, required
//! - `runtime`: lenient, any failure just means "unknown"
//! - `budget`, `revenue`: optional whole numbers, `0` collapses to absent
//! - `release_date`: optional `YYYY-MM-DD`
//! - `id`, `title`, `original_title`, `popularity`, `vote_count`: required
//! - free text columns: optional, blank means absent

use crate::embedded::{self, COUNTRY_KEYS, GENRE_KEYS};
use crate::error::{FieldError, RowDecodeError};
use crate::types::{Movie, RawMovie};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::{BTreeMap, HashMap};

/// Column names of the source CSV.
pub mod columns {
    pub const BUDGET: &str = "budget";
    pub const GENRES: &str = "genres";
    pub const HOMEPAGE: &str = "homepage";
    pub const ID: &str = "id";
    pub const IMDB_ID: &str = "imdb_id";
    pub const ORIGINAL_LANGUAGE: &str = "original_language";
    pub const ORIGINAL_TITLE: &str = "original_title";
    pub const OVERVIEW: &str = "overview";
    pub const POPULARITY: &str = "popularity";
    pub const PRODUCTION_COUNTRIES: &str = "production_countries";
    pub const RELEASE_DATE: &str = "release_date";
    pub const REVENUE: &str = "revenue";
    pub const RUNTIME: &str = "runtime";
    pub const STATUS: &str = "status";
    pub const TAGLINE: &str = "tagline";
    pub const TITLE: &str = "title";
    pub const VOTE_AVERAGE: &str = "vote_average";
    pub const VOTE_COUNT: &str = "vote_count";

    /// Every column the decoder reads
    pub const ALL: [&str; 18] = [
        BUDGET,
        GENRES,
        HOMEPAGE,
        ID,
        IMDB_ID,
        ORIGINAL_LANGUAGE,
        ORIGINAL_TITLE,
        OVERVIEW,
        POPULARITY,
        PRODUCTION_COUNTRIES,
        RELEASE_DATE,
        REVENUE,
        RUNTIME,
        STATUS,
        TAGLINE,
        TITLE,
        VOTE_AVERAGE,
        VOTE_COUNT,
    ];
}

// =============================================================================
// Row access
// =============================================================================

/// A row whose cells can be looked up by column name.
///
/// `None` means the column doesn't exist; decoding treats that the same as
/// a blank cell.
pub trait RawRow {
    fn field(&self, column: &str) -> Option<&str>;
}

impl RawRow for HashMap<String, String> {
    fn field(&self, column: &str) -> Option<&str> {
        self.get(column).map(String::as_str)
    }
}

impl<'a> RawRow for HashMap<&'a str, &'a str> {
    fn field(&self, column: &str) -> Option<&str> {
        self.get(column).copied()
    }
}

impl RawRow for BTreeMap<String, String> {
    fn field(&self, column: &str) -> Option<&str> {
        self.get(column).map(String::as_str)
    }
}

/// Column name → position map built from a CSV header record.
#[derive(Debug, Clone)]
pub struct CsvHeader {
    positions: HashMap<String, usize>,
}

impl CsvHeader {
    pub fn new(headers: &StringRecord) -> Self {
        let mut positions = HashMap::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            // First occurrence wins if a header name repeats
            positions.entry(name.trim().to_string()).or_insert(idx);
        }
        Self { positions }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Decoder columns this header doesn't have, in `columns::ALL` order
    pub fn missing_columns(&self) -> Vec<&'static str> {
        columns::ALL
            .iter()
            .copied()
            .filter(|column| !self.positions.contains_key(*column))
            .collect()
    }

    /// View a record through this header
    pub fn row<'a>(&'a self, record: &'a StringRecord) -> CsvRow<'a> {
        CsvRow {
            header: self,
            record,
        }
    }
}

/// A CSV record addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct CsvRow<'a> {
    header: &'a CsvHeader,
    record: &'a StringRecord,
}

impl RawRow for CsvRow<'_> {
    fn field(&self, column: &str) -> Option<&str> {
        self.header
            .position(column)
            .and_then(|idx| self.record.get(idx))
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one row into a normalized `Movie`.
pub fn decode_row<R: RawRow + ?Sized>(row: &R) -> Result<Movie, RowDecodeError> {
    decode_raw_row(row).map(Movie::from)
}

/// Decode one row without applying the sentinel rules.
pub fn decode_raw_row<R: RawRow + ?Sized>(row: &R) -> Result<RawMovie, RowDecodeError> {
    Ok(RawMovie {
        id: decode(row, columns::ID, |raw| required(raw, parse_u32))?,
        title: decode(row, columns::TITLE, required_text)?,
        original_title: decode(row, columns::ORIGINAL_TITLE, required_text)?,
        budget: decode(row, columns::BUDGET, |raw| optional(raw, parse_whole))?,
        revenue: decode(row, columns::REVENUE, |raw| optional(raw, parse_whole))?,
        genres: decode(row, columns::GENRES, |raw| {
            embedded::decode_embedded_map(raw, GENRE_KEYS)
        })?,
        production_countries: decode(row, columns::PRODUCTION_COUNTRIES, |raw| {
            embedded::decode_embedded_map(raw, COUNTRY_KEYS)
        })?,
        release_date: decode(row, columns::RELEASE_DATE, |raw| optional(raw, parse_date))?,
        runtime: decode_runtime(cell(row, columns::RUNTIME)),
        popularity: decode(row, columns::POPULARITY, |raw| required(raw, parse_f32))?,
        vote_count: decode(row, columns::VOTE_COUNT, |raw| required(raw, parse_u32))?,
        vote_average: decode(row, columns::VOTE_AVERAGE, |raw| optional(raw, parse_f32))?,
        imdb_id: optional_text(cell(row, columns::IMDB_ID)),
        original_language: optional_text(cell(row, columns::ORIGINAL_LANGUAGE)),
        overview: optional_text(cell(row, columns::OVERVIEW)),
        homepage: optional_text(cell(row, columns::HOMEPAGE)),
        status: optional_text(cell(row, columns::STATUS)),
        tagline: optional_text(cell(row, columns::TAGLINE)),
    })
}

fn cell<'r, R: RawRow + ?Sized>(row: &'r R, column: &str) -> &'r str {
    row.field(column).unwrap_or("")
}

/// Run a field conversion and tag any failure with its column
fn decode<R, T, F>(row: &R, column: &'static str, convert: F) -> Result<T, RowDecodeError>
where
    R: RawRow + ?Sized,
    F: FnOnce(&str) -> Result<T, FieldError>,
{
    convert(cell(row, column)).map_err(|source| RowDecodeError::new(column, source))
}

fn required<T>(raw: &str, parse: fn(&str) -> Result<T, FieldError>) -> Result<T, FieldError> {
    if raw.trim().is_empty() {
        return Err(FieldError::MissingValue);
    }
    parse(raw.trim())
}

fn optional<T>(
    raw: &str,
    parse: fn(&str) -> Result<T, FieldError>,
) -> Result<Option<T>, FieldError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse(raw.trim()).map(Some)
}

fn required_text(raw: &str) -> Result<String, FieldError> {
    if raw.trim().is_empty() {
        return Err(FieldError::MissingValue);
    }
    Ok(raw.to_string())
}

fn optional_text(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn decode_runtime(raw: &str) -> Option<f32> {
    embedded::decode_lenient::<f32>(raw).filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
}

fn invalid(raw: &str, reason: impl Into<String>) -> FieldError {
    FieldError::InvalidValue {
        value: raw.to_string(),
        reason: reason.into(),
    }
}

/// Parse a non-negative whole number.
///
/// Accepts integral float literals such as `"1500.0"`, which is how some
/// integer columns are written in the published dataset.
fn parse_whole(raw: &str) -> Result<u64, FieldError> {
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(n);
    }

    let value: f64 = raw.parse().map_err(|_| invalid(raw, "expected a whole number"))?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(invalid(raw, "expected a non-negative whole number"))
    }
}

fn parse_u32(raw: &str) -> Result<u32, FieldError> {
    let value = parse_whole(raw)?;
    u32::try_from(value).map_err(|_| invalid(raw, "out of range"))
}

/// Parse a finite float; `NaN` and infinities are rejected.
fn parse_f32(raw: &str) -> Result<f32, FieldError> {
    let value = raw.parse::<f32>().map_err(|e| invalid(raw, e.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(raw, "expected a finite number"))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| invalid(raw, format!("expected YYYY-MM-DD: {e}")))
}
