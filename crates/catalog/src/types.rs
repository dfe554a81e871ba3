//! Core domain types for the movie catalog.
//!
//! - `RawMovie`: one decoded row, values exactly as the source gave them
//! - `Movie`: the normalized record the rest of the system sees
//! - `Catalog`: the frozen collection of movies plus derived lookups

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie
pub type MovieId = u32;

/// Identifier of a genre in the `genres` column
pub type GenreId = u32;

/// ISO 3166-1 country code from the `production_countries` column
pub type CountryCode = String;

// =============================================================================
// Movie
// =============================================================================

/// A row after field decoding but before sentinel normalization.
///
/// `budget`/`revenue` still carry the raw `0` meaning "unknown", and
/// `vote_average` is whatever the cell held regardless of `vote_count`.
/// Converting into [`Movie`] applies both rules once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMovie {
    pub id: MovieId,
    pub title: String,
    pub original_title: String,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    pub genres: BTreeMap<GenreId, String>,
    pub production_countries: BTreeMap<CountryCode, String>,
    pub release_date: Option<NaiveDate>,
    pub runtime: Option<f32>,
    pub popularity: f32,
    pub vote_count: u32,
    pub vote_average: Option<f32>,
    pub imdb_id: Option<String>,
    pub original_language: Option<String>,
    pub overview: Option<String>,
    pub homepage: Option<String>,
    pub status: Option<String>,
    pub tagline: Option<String>,
}

/// A movie in the catalog.
///
/// The fields with normalization rules (`budget`, `revenue`, `vote_count`,
/// `vote_average`) are private so that a `Movie` always satisfies them:
/// - `budget()` and `revenue()` never return `Some(0)`
/// - `vote_average()` is `None` whenever `vote_count()` is 0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub original_title: String,
    budget: Option<u64>,
    revenue: Option<u64>,
    pub genres: BTreeMap<GenreId, String>,
    pub production_countries: BTreeMap<CountryCode, String>,
    pub release_date: Option<NaiveDate>,
    /// Runtime in minutes
    pub runtime: Option<f32>,
    pub popularity: f32,
    vote_count: u32,
    vote_average: Option<f32>,
    pub imdb_id: Option<String>,
    pub original_language: Option<String>,
    pub overview: Option<String>,
    pub homepage: Option<String>,
    pub status: Option<String>,
    pub tagline: Option<String>,
}

impl From<RawMovie> for Movie {
    fn from(raw: RawMovie) -> Self {
        let vote_average = if raw.vote_count > 0 {
            raw.vote_average
        } else {
            None
        };

        Self {
            id: raw.id,
            title: raw.title,
            original_title: raw.original_title,
            budget: raw.budget.filter(|&b| b != 0),
            revenue: raw.revenue.filter(|&r| r != 0),
            genres: raw.genres,
            production_countries: raw.production_countries,
            release_date: raw.release_date,
            runtime: raw.runtime,
            popularity: raw.popularity,
            vote_count: raw.vote_count,
            vote_average,
            imdb_id: raw.imdb_id,
            original_language: raw.original_language,
            overview: raw.overview,
            homepage: raw.homepage,
            status: raw.status,
            tagline: raw.tagline,
        }
    }
}

impl Movie {
    pub fn budget(&self) -> Option<u64> {
        self.budget
    }

    pub fn revenue(&self) -> Option<u64> {
        self.revenue
    }

    pub fn vote_count(&self) -> u32 {
        self.vote_count
    }

    /// Average vote, only defined when the movie has votes
    pub fn vote_average(&self) -> Option<f32> {
        self.vote_average
    }

    /// Year of release, if the release date is known
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    /// Signed `revenue - budget`, with unknown values counted as 0.
    ///
    /// A movie with a budget but no recorded revenue therefore shows a loss
    /// of its whole budget.
    pub fn profit(&self) -> i64 {
        let revenue = to_signed(self.revenue.unwrap_or(0));
        let budget = to_signed(self.budget.unwrap_or(0));
        revenue.saturating_sub(budget)
    }
}

fn to_signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

// =============================================================================
// Catalog
// =============================================================================

/// The loaded dataset: every movie in input order plus distinct lookups.
///
/// A `Catalog` is only produced by finishing a
/// [`CatalogBuilder`](crate::loader::CatalogBuilder) (or one of the load
/// functions built on it), and it has no mutating methods. Queries borrow it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) movies: Vec<Movie>,
    /// Distinct genre id → name, first seen name wins
    pub(crate) genres: BTreeMap<GenreId, String>,
    /// Distinct country code → name, first seen name wins
    pub(crate) countries: BTreeMap<CountryCode, String>,
    /// Rows dropped by `RowErrorPolicy::SkipRow`
    pub(crate) skipped_rows: usize,
}

impl Catalog {
    /// All movies, in input row order
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Distinct genres seen across the catalog
    pub fn genres(&self) -> &BTreeMap<GenreId, String> {
        &self.genres
    }

    /// Distinct production countries seen across the catalog
    pub fn countries(&self) -> &BTreeMap<CountryCode, String> {
        &self.countries
    }

    /// Look a movie up by id (linear scan; ids are not indexed)
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == id)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Number of rows dropped while loading (always 0 under fail-fast)
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: MovieId) -> RawMovie {
        RawMovie {
            id,
            title: format!("Movie {id}"),
            original_title: format!("Movie {id}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_budget_and_revenue_are_absent() {
        let movie = Movie::from(RawMovie {
            budget: Some(0),
            revenue: Some(0),
            ..raw(1)
        });

        assert_eq!(movie.budget(), None);
        assert_eq!(movie.revenue(), None);
    }

    #[test]
    fn test_nonzero_budget_is_kept() {
        let movie = Movie::from(RawMovie {
            budget: Some(1_000),
            revenue: Some(5_000),
            ..raw(1)
        });

        assert_eq!(movie.budget(), Some(1_000));
        assert_eq!(movie.revenue(), Some(5_000));
    }

    #[test]
    fn test_vote_average_needs_votes() {
        let unvoted = Movie::from(RawMovie {
            vote_count: 0,
            vote_average: Some(7.5),
            ..raw(1)
        });
        assert_eq!(unvoted.vote_average(), None);

        let voted = Movie::from(RawMovie {
            vote_count: 12,
            vote_average: Some(7.5),
            ..raw(2)
        });
        assert_eq!(voted.vote_average(), Some(7.5));
    }

    #[test]
    fn test_profit_treats_absent_as_zero() {
        let flop = Movie::from(RawMovie {
            budget: Some(1_000),
            revenue: Some(0),
            ..raw(1)
        });
        assert_eq!(flop.profit(), -1_000);

        let hit = Movie::from(RawMovie {
            budget: Some(1_000),
            revenue: Some(4_000),
            ..raw(2)
        });
        assert_eq!(hit.profit(), 3_000);

        assert_eq!(Movie::from(raw(3)).profit(), 0);
    }

    #[test]
    fn test_release_year() {
        let movie = Movie::from(RawMovie {
            release_date: NaiveDate::from_ymd_opt(2010, 7, 16),
            ..raw(1)
        });
        assert_eq!(movie.release_year(), Some(2010));
        assert_eq!(Movie::from(raw(2)).release_year(), None);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
        assert!(catalog.genres().is_empty());
        assert!(catalog.get_movie(1).is_none());
    }
}
