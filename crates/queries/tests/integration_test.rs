//! Integration tests for the query engine.
//!
//! These load a small CSV fixture through the real decoder and check every
//! query against hand-computed answers.

use catalog::{Catalog, LoadOptions, RowErrorPolicy, columns};
use queries::{MovieQueries, QueryError};

type Row = &'static [(&'static str, &'static str)];

const MOVIES: &[Row] = &[
    &[
        ("id", "155"),
        ("title", "The Dark Knight"),
        ("release_date", "2008-07-16"),
        ("budget", "185000000"),
        ("revenue", "1004558444"),
        ("genres", "[{'id': 18, 'name': 'Drama'}, {'id': 28, 'name': 'Action'}, {'id': 80, 'name': 'Crime'}, {'id': 53, 'name': 'Thriller'}]"),
        ("production_countries", "[{'iso_3166_1': 'GB', 'name': 'United Kingdom'}, {'iso_3166_1': 'US', 'name': 'United States of America'}]"),
        ("vote_count", "12269"),
        ("vote_average", "8.3"),
    ],
    &[
        ("id", "27205"),
        ("title", "Inception"),
        ("release_date", "2010-07-14"),
        ("budget", "160000000"),
        ("revenue", "825532764"),
        ("genres", "[{'id': 28, 'name': 'Action'}, {'id': 53, 'name': 'Thriller'}, {'id': 878, 'name': 'Science Fiction'}, {'id': 9648, 'name': 'Mystery'}, {'id': 12, 'name': 'Adventure'}]"),
        ("production_countries", "[{'iso_3166_1': 'GB', 'name': 'United Kingdom'}, {'iso_3166_1': 'US', 'name': 'United States of America'}]"),
        ("vote_count", "14075"),
        ("vote_average", "8.1"),
    ],
    &[
        ("id", "10193"),
        ("title", "Toy Story 3"),
        ("release_date", "2010-06-16"),
        ("budget", "200000000"),
        ("revenue", "1066969703"),
        ("genres", "[{'id': 16, 'name': 'Animation'}, {'id': 10751, 'name': 'Family'}, {'id': 35, 'name': 'Comedy'}]"),
        ("production_countries", "[{'iso_3166_1': 'US', 'name': 'United States of America'}]"),
        ("vote_count", "4710"),
        ("vote_average", "7.6"),
    ],
    &[
        ("id", "194"),
        ("title", "Amélie"),
        ("release_date", "2001-04-25"),
        ("budget", "10000000"),
        ("revenue", "173921954"),
        ("genres", "[{'id': 35, 'name': 'Comedy'}, {'id': 10749, 'name': 'Romance'}]"),
        ("production_countries", "[{'iso_3166_1': 'FR', 'name': 'France'}, {'iso_3166_1': 'DE', 'name': 'Germany'}]"),
        ("vote_count", "3403"),
        ("vote_average", "7.8"),
    ],
    &[
        ("id", "26596"),
        ("title", "Tales from the Crypt"),
        ("release_date", "1972-03-08"),
        ("budget", "0"),
        ("revenue", "0"),
        ("genres", "[{'id': 27, 'name': 'Horror'}]"),
        ("production_countries", "[{'iso_3166_1': 'GB', 'name': 'United Kingdom'}]"),
        ("vote_count", "35"),
        ("vote_average", "6.6"),
    ],
    &[
        ("id", "26843"),
        ("title", "The Canterbury Tales"),
        ("release_date", "1972-07-02"),
        ("genres", "[{'id': 35, 'name': 'Comedy'}, {'id': 18, 'name': 'Drama'}]"),
        ("production_countries", "[{'iso_3166_1': 'IT', 'name': 'Italy'}, {'iso_3166_1': 'FR', 'name': 'France'}]"),
        ("vote_count", "0"),
        ("vote_average", "7.0"),
    ],
    &[
        ("id", "29056"),
        ("title", "TALES of Terror"),
        ("release_date", "1962-07-04"),
        ("budget", "1000"),
        ("revenue", "0"),
        ("genres", "[{'id': 27, 'name': 'Horror'}]"),
        ("production_countries", "[]"),
        ("vote_count", "60"),
        ("vote_average", "6.4"),
    ],
    &[
        ("id", "57201"),
        ("title", "The Lone Ranger"),
        ("release_date", "2013-07-03"),
        ("budget", "255000000"),
        ("revenue", "89289910"),
        ("genres", "[{'id': 28, 'name': 'Action'}, {'id': 12, 'name': 'Adventure'}, {'id': 37, 'name': 'Western'}]"),
        ("production_countries", "[{'iso_3166_1': 'US', 'name': 'United States of America'}]"),
        ("vote_count", "2361"),
        ("vote_average", "5.9"),
    ],
    &[
        ("id", "10046"),
        ("title", "Kontroll"),
        ("release_date", "2003-11-19"),
        ("budget", ""),
        ("genres", "[{'id': 35, 'name': 'Comedy'}, {'id': 53, 'name': 'Thriller'}]"),
        ("production_countries", "[{'iso_3166_1': 'HU', 'name': 'Hungary'}]"),
        ("vote_count", "92"),
        ("vote_average", "7.2"),
    ],
    &[
        ("id", "336050"),
        ("title", "Son of Saul"),
        ("release_date", "2015-06-11"),
        ("budget", "1500000"),
        ("revenue", "9790000.0"),
        ("genres", "[{'id': 18, 'name': 'Drama'}]"),
        ("production_countries", "[{'iso_3166_1': 'HU', 'name': 'Hungary'}]"),
        ("vote_count", "331"),
        ("vote_average", "7.4"),
    ],
    &[
        ("id", "76341"),
        ("title", "Mad Max: Fury Road"),
        ("release_date", "2015-05-13"),
        ("budget", "150000000"),
        ("revenue", "378858340"),
        ("genres", "[{'id': 28, 'name': 'Action'}, {'id': 12, 'name': 'Adventure'}, {'id': 878, 'name': 'Science Fiction'}, {'id': 53, 'name': 'Thriller'}]"),
        ("production_countries", "[{'iso_3166_1': 'AU', 'name': 'Australia'}, {'iso_3166_1': 'US', 'name': 'United States of America'}]"),
        ("vote_count", "9629"),
        ("vote_average", "7.3"),
    ],
    &[
        ("id", "99999"),
        ("title", "Undated"),
        ("genres", "[]"),
        ("production_countries", "[]"),
        ("vote_count", "0"),
    ],
];

/// Serialize rows as CSV, filling the columns every row shares
fn to_csv(rows: &[Row]) -> String {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(columns::ALL).unwrap();
        for row in rows {
            let record: Vec<&str> = columns::ALL
                .iter()
                .map(|&column| cell(row, column))
                .collect();
            writer.write_record(&record).unwrap();
        }
        writer.flush().unwrap();
    }
    String::from_utf8(buf).unwrap()
}

fn cell(row: Row, column: &str) -> &'static str {
    if let Some(&(_, value)) = row.iter().find(|(name, _)| *name == column) {
        return value;
    }
    match column {
        "original_title" => row
            .iter()
            .find(|(name, _)| *name == "title")
            .map_or("", |&(_, title)| title),
        "popularity" => "1.5",
        "status" => "Released",
        "original_language" => "en",
        _ => "",
    }
}

fn load(rows: &[Row]) -> Catalog {
    Catalog::from_reader(to_csv(rows).as_bytes(), LoadOptions::new()).unwrap()
}

fn titles(movies: &[&catalog::Movie]) -> Vec<String> {
    movies.iter().map(|movie| movie.title.clone()).collect()
}

#[test]
fn test_fixture_loads() {
    let catalog = load(MOVIES);
    assert_eq!(catalog.len(), MOVIES.len());
    assert_eq!(catalog.countries()["US"], "United States of America");
    assert_eq!(catalog.genres()[&878], "Science Fiction");
    assert_eq!(catalog.skipped_rows(), 0);
}

#[test]
fn test_best_popular_movie() {
    let catalog = load(MOVIES);
    let best = MovieQueries::new(&catalog).best_popular_movie().unwrap();
    assert_eq!(best.title, "The Dark Knight");
    assert_eq!(best.vote_average(), Some(8.3));
}

#[test]
fn test_count_movies_in_year() {
    let catalog = load(MOVIES);
    let queries = MovieQueries::new(&catalog);

    assert_eq!(queries.count_movies_in_year(2010), 2);
    assert_eq!(queries.count_movies_in_year(1972), 2);
    assert_eq!(queries.count_movies_in_year(1999), 0);

    let by_hand = catalog
        .movies()
        .iter()
        .filter(|m| m.release_date.is_some_and(|d| d.format("%Y").to_string() == "2015"))
        .count();
    assert_eq!(queries.count_movies_in_year(2015), by_hand);
}

#[test]
fn test_top5_genres_2010_to_2015() {
    let catalog = load(MOVIES);
    let top = MovieQueries::new(&catalog).top5_genres_2010_to_2015();

    let ranked: Vec<(&str, usize)> = top.iter().map(|g| (g.name, g.count)).collect();
    assert_eq!(
        ranked,
        vec![
            ("Adventure", 3),
            ("Action", 3),
            ("Thriller", 2),
            ("Science Fiction", 2),
            ("Animation", 1),
        ]
    );
}

#[test]
fn test_top10_by_budget() {
    let catalog = load(MOVIES);
    let top = MovieQueries::new(&catalog).top10_by_budget();

    assert!(top.len() <= 10);
    assert_eq!(top.len(), 8);
    assert_eq!(top[0].title, "The Lone Ranger");
    assert!(top.iter().all(|movie| movie.budget().is_some()));
    assert!(top.windows(2).all(|pair| pair[0].budget() >= pair[1].budget()));
    assert!(!titles(&top).contains(&"Tales from the Crypt".to_string()));
}

#[test]
fn test_top5_by_genre_count() {
    let catalog = load(MOVIES);
    let top = MovieQueries::new(&catalog).top5_by_genre_count();

    assert_eq!(
        titles(&top),
        vec![
            "Inception",
            "The Dark Knight",
            "Mad Max: Fury Road",
            "Toy Story 3",
            "The Lone Ranger",
        ]
    );
}

#[test]
fn test_highest_budget_in_country() {
    let catalog = load(MOVIES);
    let queries = MovieQueries::new(&catalog);

    assert_eq!(
        queries.highest_budget_in_country("HU").map(|m| m.title.as_str()),
        Some("Son of Saul")
    );
    assert_eq!(
        queries.highest_budget_in_country("US").map(|m| m.title.as_str()),
        Some("The Lone Ranger")
    );
    assert_eq!(
        queries.highest_budget_in_country("FR").map(|m| m.title.as_str()),
        Some("Amélie")
    );
    assert!(queries.highest_budget_in_country("ZZ").is_none());
}

#[test]
fn test_profit_extremes() {
    let catalog = load(MOVIES);
    let queries = MovieQueries::new(&catalog);

    let (movie, profit) = queries.highest_profit_ever().unwrap();
    assert_eq!(movie.title, "Toy Story 3");
    assert_eq!(profit, 866_969_703);

    assert_eq!(queries.biggest_flop_ever().unwrap(), -165_710_090);
    let (flop, _) = queries.biggest_flop_movie().unwrap();
    assert_eq!(flop.title, "The Lone Ranger");
}

#[test]
fn test_budget_without_revenue_is_a_loss() {
    let terror = MOVIES
        .iter()
        .copied()
        .find(|row| row.contains(&("title", "TALES of Terror")))
        .unwrap();
    let catalog = load(&[terror]);
    let (_, profit) = MovieQueries::new(&catalog).highest_profit_ever().unwrap();
    assert_eq!(profit, -1000);
}

#[test]
fn test_sentinels_are_never_observed() {
    let catalog = load(MOVIES);
    for movie in catalog.movies() {
        assert_ne!(movie.budget(), Some(0), "{}", movie.title);
        assert_ne!(movie.revenue(), Some(0), "{}", movie.title);
        if movie.vote_count() == 0 {
            assert_eq!(movie.vote_average(), None, "{}", movie.title);
        }
    }
}

#[test]
fn test_search_title_paged() {
    let catalog = load(MOVIES);
    let queries = MovieQueries::new(&catalog);

    let upper = queries.search_title_paged("TALES", 0, 5);
    let lower = queries.search_title_paged("tales", 0, 5);
    assert_eq!(titles(&upper), titles(&lower));
    assert_eq!(
        titles(&lower),
        vec!["Tales from the Crypt", "The Canterbury Tales", "TALES of Terror"]
    );

    assert_eq!(titles(&queries.search_title_paged("tales", 0, 2)).len(), 2);
    assert_eq!(
        titles(&queries.search_title_paged("tales", 1, 2)),
        vec!["TALES of Terror"]
    );
    assert!(queries.search_title_paged("tales", 2, 2).is_empty());
}

#[test]
fn test_search_ignores_diacritics() {
    let catalog = load(MOVIES);
    let queries = MovieQueries::new(&catalog);

    assert_eq!(titles(&queries.search_title_paged("amelie", 0, 5)), vec!["Amélie"]);
    assert_eq!(titles(&queries.search_title_paged("AMÉLIE", 0, 5)), vec!["Amélie"]);
}

#[test]
fn test_queries_on_empty_catalog() {
    let catalog = load(&[]);
    let queries = MovieQueries::new(&catalog);

    assert!(matches!(
        queries.best_popular_movie(),
        Err(QueryError::NotFound { .. })
    ));
    assert_eq!(queries.count_movies_in_year(2010), 0);
    assert!(queries.top5_genres_2010_to_2015().is_empty());
    assert!(queries.top10_by_budget().is_empty());
    assert!(queries.top5_by_genre_count().is_empty());
    assert!(queries.highest_budget_in_country("US").is_none());
    assert!(queries.highest_profit_ever().is_err());
    assert!(queries.search_title_paged("a", 0, 5).is_empty());
}

#[test]
fn test_unparseable_rating_cannot_win_best_popular() {
    let rows: &[Row] = &[
        &[
            ("id", "1"),
            ("title", "Real Classic"),
            ("genres", "[]"),
            ("production_countries", "[]"),
            ("vote_count", "5000"),
            ("vote_average", "8.9"),
        ],
        &[
            ("id", "2"),
            ("title", "Garbage Cell"),
            ("genres", "[]"),
            ("production_countries", "[]"),
            ("vote_count", "5000"),
            ("vote_average", "NaN"),
        ],
    ];

    assert!(Catalog::from_reader(to_csv(rows).as_bytes(), LoadOptions::new()).is_err());

    let options = LoadOptions::new().with_row_error_policy(RowErrorPolicy::SkipRow);
    let catalog = Catalog::from_reader(to_csv(rows).as_bytes(), options).unwrap();
    assert_eq!(catalog.skipped_rows(), 1);

    let best = MovieQueries::new(&catalog).best_popular_movie().unwrap();
    assert_eq!(best.title, "Real Classic");
}
