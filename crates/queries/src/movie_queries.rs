//! The analytical queries over a loaded catalog.
//!
//! Every query is a fresh scan of the borrowed catalog; nothing is cached
//! between calls. Rankings are stable: when two movies tie, the one that
//! came first in the input wins.

use crate::error::{QueryError, Result};
use crate::search;
use catalog::{Catalog, GenreId, Movie};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Votes a movie needs (strictly more than) to count as popular
pub const POPULAR_VOTE_THRESHOLD: u32 = 1000;

/// Page size used by the driver when none is given
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Number of movies released with a genre, as returned by the genre ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount<'a> {
    pub genre_id: GenreId,
    pub name: &'a str,
    pub count: usize,
}

/// Read-only query engine over a borrowed `Catalog`.
#[derive(Debug, Clone, Copy)]
pub struct MovieQueries<'a> {
    catalog: &'a Catalog,
}

impl<'a> MovieQueries<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    fn movies(&self) -> std::slice::Iter<'a, Movie> {
        self.catalog.movies().iter()
    }

    /// Highest rated movie among those with more than 1000 votes
    pub fn best_popular_movie(&self) -> Result<&'a Movie> {
        self.movies()
            .filter(|movie| movie.vote_count() > POPULAR_VOTE_THRESHOLD)
            .min_by(|a, b| compare_rating(b.vote_average(), a.vote_average()))
            .ok_or(QueryError::NotFound {
                query: "best_popular_movie",
            })
    }

    /// Number of movies released in `year` (0 if none)
    pub fn count_movies_in_year(&self, year: i32) -> usize {
        self.movies()
            .filter(|movie| movie.release_year() == Some(year))
            .count()
    }

    /// The five genres with the most movies released from 2010 to 2015
    pub fn top5_genres_2010_to_2015(&self) -> Vec<GenreCount<'a>> {
        self.top_genres_between(2010, 2015, 5)
    }

    /// Rank genres by how many movies released in `from..=to` carry them.
    ///
    /// Ties are broken by ascending genre id. Names come from the catalog's
    /// genre lookup.
    #[instrument(skip(self))]
    pub fn top_genres_between(&self, from: i32, to: i32, limit: usize) -> Vec<GenreCount<'a>> {
        let counts: HashMap<GenreId, usize> = self
            .catalog
            .movies()
            .par_iter()
            .filter(|movie| movie.release_year().is_some_and(|year| (from..=to).contains(&year)))
            .fold(HashMap::new, |mut local_counts, movie| {
                for &genre_id in movie.genres.keys() {
                    *local_counts.entry(genre_id).or_insert(0) += 1;
                }
                local_counts
            })
            .reduce(HashMap::new, |mut merged, partial| {
                for (genre_id, count) in partial {
                    *merged.entry(genre_id).or_insert(0) += count;
                }
                merged
            });

        let mut ranked: Vec<(GenreId, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let genres = self.catalog.genres();
        let top: Vec<GenreCount<'a>> = ranked
            .into_iter()
            .filter_map(|(genre_id, count)| {
                genres.get(&genre_id).map(|name| GenreCount {
                    genre_id,
                    name: name.as_str(),
                    count,
                })
            })
            .take(limit)
            .collect();

        debug!("Ranked {} genres", top.len());
        top
    }

    /// The ten movies with the largest known budgets
    pub fn top10_by_budget(&self) -> Vec<&'a Movie> {
        self.top_by_budget(10)
    }

    /// Movies with a known budget, largest first
    pub fn top_by_budget(&self, limit: usize) -> Vec<&'a Movie> {
        let mut movies: Vec<&'a Movie> = self
            .movies()
            .filter(|movie| movie.budget().is_some())
            .collect();
        movies.sort_by(|a, b| b.budget().cmp(&a.budget()));
        movies.truncate(limit);
        movies
    }

    /// The five movies listing the most genres
    pub fn top5_by_genre_count(&self) -> Vec<&'a Movie> {
        self.top_by_genre_count(5)
    }

    pub fn top_by_genre_count(&self, limit: usize) -> Vec<&'a Movie> {
        let mut movies: Vec<&'a Movie> = self.movies().collect();
        movies.sort_by(|a, b| b.genres.len().cmp(&a.genres.len()));
        movies.truncate(limit);
        movies
    }

    /// Largest budget among movies produced in `country` (an ISO code such
    /// as `"HU"`), or `None` when no such movie has a known budget
    pub fn highest_budget_in_country(&self, country: &str) -> Option<&'a Movie> {
        self.movies()
            .filter(|movie| movie.production_countries.contains_key(country))
            .filter(|movie| movie.budget().is_some())
            .min_by(|a, b| b.budget().cmp(&a.budget()))
    }

    /// The movie with the largest `revenue - budget`, and that profit
    pub fn highest_profit_ever(&self) -> Result<(&'a Movie, i64)> {
        self.movies()
            .min_by(|a, b| b.profit().cmp(&a.profit()))
            .map(|movie| (movie, movie.profit()))
            .ok_or(QueryError::NotFound {
                query: "highest_profit_ever",
            })
    }

    /// The movie with the smallest `revenue - budget`, and that profit
    pub fn biggest_flop_movie(&self) -> Result<(&'a Movie, i64)> {
        self.movies()
            .min_by_key(|movie| movie.profit())
            .map(|movie| (movie, movie.profit()))
            .ok_or(QueryError::NotFound {
                query: "biggest_flop_ever",
            })
    }

    /// The smallest `revenue - budget` in the catalog (usually negative)
    pub fn biggest_flop_ever(&self) -> Result<i64> {
        self.biggest_flop_movie().map(|(_, profit)| profit)
    }

    /// Every movie whose title contains `needle`, ignoring case and
    /// diacritics, in catalog order
    pub fn search_title(&self, needle: &str) -> Vec<&'a Movie> {
        let needle = search::fold_for_search(needle);
        self.movies()
            .filter(|movie| search::title_matches(&movie.title, &needle))
            .collect()
    }

    /// One page of [`search_title`](Self::search_title).
    ///
    /// Pages are 0-indexed. A `page_size` of 0 yields an empty page.
    #[instrument(skip(self))]
    pub fn search_title_paged(&self, needle: &str, page: usize, page_size: usize) -> Vec<&'a Movie> {
        let folded = search::fold_for_search(needle);
        let results: Vec<&'a Movie> = self
            .movies()
            .filter(|movie| search::title_matches(&movie.title, &folded))
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .collect();

        debug!("Search page holds {} movies", results.len());
        results
    }
}

/// Order optional ratings with an absent rating below every present one
fn compare_rating(a: Option<f32>, b: Option<f32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
