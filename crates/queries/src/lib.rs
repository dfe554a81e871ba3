//! # Queries Crate
//!
//! Analytical queries over a loaded movie [`Catalog`](catalog::Catalog).
//!
//! ## Components
//!
//! - **movie_queries**: `MovieQueries`, one method per question
//! - **search**: case- and diacritic-insensitive title matching
//! - **error**: `QueryError` for queries that promise a result
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{Catalog, LoadOptions};
//! use queries::MovieQueries;
//!
//! let catalog = Catalog::load_from_archive(path, LoadOptions::default())?;
//! let queries = MovieQueries::new(&catalog);
//!
//! let best = queries.best_popular_movie()?;
//! let in_2010 = queries.count_movies_in_year(2010);
//! let page = queries.search_title_paged("tales", 1, 5);
//! ```
//!
//! `MovieQueries` only borrows the catalog, so any number of them can run
//! against the same catalog from different threads.

pub mod error;
pub mod movie_queries;
pub mod search;

// Re-export commonly used types
pub use error::{QueryError, Result};
pub use movie_queries::{DEFAULT_PAGE_SIZE, GenreCount, MovieQueries, POPULAR_VOTE_THRESHOLD};

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Catalog, Movie, RawMovie};
    use std::thread;

    #[test]
    fn test_queries_share_catalog_across_threads() {
        let catalog = Catalog::from_movies((1..=4).map(|id| -> Movie {
            RawMovie {
                id,
                title: format!("Movie {id}"),
                original_title: format!("Movie {id}"),
                budget: Some(u64::from(id) * 100),
                ..Default::default()
            }
            .into()
        }));

        let budgets: Vec<Option<u64>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let queries = MovieQueries::new(&catalog);
                    scope.spawn(move || queries.top_by_budget(1)[0].budget())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(budgets.iter().all(|&b| b == Some(400)));
    }
}
