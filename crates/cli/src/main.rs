use anyhow::{Context, Result};
use catalog::{Catalog, LoadOptions, Movie, RowErrorPolicy};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use queries::{GenreCount, MovieQueries, QueryError, DEFAULT_PAGE_SIZE};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// movie-catalog - Queries over a movie metadata dump
#[derive(Parser)]
#[command(name = "movie-catalog")]
#[command(about = "Load a movie metadata CSV and answer questions about it", long_about = None)]
struct Cli {
    /// Path to the metadata CSV, or a zip archive holding it
    #[arg(short, long, default_value = "data/movies_metadata.csv.zip")]
    data: PathBuf,

    /// Drop malformed rows with a warning instead of aborting the load
    #[arg(long)]
    skip_invalid_rows: bool,

    /// Print one JSON object per query instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every query in turn (the default)
    Report(ReportArgs),

    /// Highest rated movie with more than 1000 votes
    BestPopular,

    /// Count the movies released in a year
    Year {
        #[arg(long)]
        year: i32,
    },

    /// Genres with the most releases in a year range
    TopGenres {
        #[arg(long, default_value = "2010")]
        from: i32,

        #[arg(long, default_value = "2015")]
        to: i32,

        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Movies with the largest budgets
    TopBudget {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Movies listing the most genres
    MostGenres {
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Largest budget among a country's productions
    Country {
        /// ISO 3166-1 code, e.g. HU
        #[arg(long)]
        code: String,
    },

    /// Movie with the highest profit
    Profit,

    /// Movie with the lowest profit
    Flop,

    /// Search titles, ignoring case and accents
    Search {
        #[arg(long)]
        title: String,

        /// Page number, starting at 0
        #[arg(long, default_value = "0")]
        page: usize,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Year for the release count
    #[arg(long, default_value = "2010")]
    year: i32,

    /// Country for the budget lookup
    #[arg(long, default_value = "HU")]
    country: String,

    /// Title fragment for the search
    #[arg(long, default_value = "tales")]
    search: String,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            year: 2010,
            country: "HU".to_string(),
            search: "tales".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A query result in a shape both printers understand
#[derive(Serialize)]
#[serde(untagged)]
enum Answer<'a> {
    Movie(&'a Movie),
    Movies(Vec<&'a Movie>),
    Genres(Vec<GenreCount<'a>>),
    Count(usize),
    Profit { movie: &'a Movie, profit: i64 },
    Nothing,
}

/// Search pages the report prints, matching the original console driver
const REPORT_SEARCH_PAGES: [usize; 2] = [1, 2];

/// The timed outcome of one query, and one line of `--json` output
#[derive(Serialize)]
struct QueryReport<'a> {
    query: String,
    elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Answer<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

fn main() -> Result<()> {
    // Initialize tracing on stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = load_options(cli.skip_invalid_rows);

    info!("Loading movie catalog from {}", cli.data.display());
    let start = Instant::now();
    let catalog = Catalog::load_from_path(&cli.data, options)
        .with_context(|| format!("Failed to load movie catalog from {}", cli.data.display()))?;
    if !cli.json {
        println!(
            "{} Loaded {} movies in {:?}",
            "✓".green(),
            catalog.len(),
            start.elapsed()
        );
    }
    if catalog.skipped_rows() > 0 {
        warn!(skipped = catalog.skipped_rows(), "Some rows were dropped while loading");
    }

    let queries = MovieQueries::new(&catalog);
    let json = cli.json;

    // Dispatch to appropriate command handler
    let report = match cli.command.unwrap_or(Commands::Report(ReportArgs::default())) {
        Commands::Report(args) => {
            return handle_report(queries, &args, |report| print_report(&report, json));
        }
        Commands::BestPopular => best_popular(queries),
        Commands::Year { year } => movies_in_year(queries, year),
        Commands::TopGenres { from, to, limit } => run_query("top_genres_between", || {
            Ok(Answer::Genres(queries.top_genres_between(from, to, limit)))
        }),
        Commands::TopBudget { limit } => run_query("top_by_budget", || {
            Ok(Answer::Movies(queries.top_by_budget(limit)))
        }),
        Commands::MostGenres { limit } => run_query("top_by_genre_count", || {
            Ok(Answer::Movies(queries.top_by_genre_count(limit)))
        }),
        Commands::Country { code } => highest_budget_in_country(queries, &code),
        Commands::Profit => highest_profit(queries),
        Commands::Flop => biggest_flop(queries),
        Commands::Search {
            title,
            page,
            page_size,
        } => search(queries, &title, page, page_size),
    };

    print_report(&report, json)
}

/// Map the `--skip-invalid-rows` flag onto load options
fn load_options(skip_invalid_rows: bool) -> LoadOptions {
    let policy = if skip_invalid_rows {
        RowErrorPolicy::SkipRow
    } else {
        RowErrorPolicy::FailFast
    };
    LoadOptions::new().with_row_error_policy(policy)
}

/// Handle the 'report' command: every query in a fixed order, each outcome
/// handed to `emit` as soon as it is ready
fn handle_report<'a>(
    queries: MovieQueries<'a>,
    args: &ReportArgs,
    mut emit: impl FnMut(QueryReport<'a>) -> Result<()>,
) -> Result<()> {
    emit(best_popular(queries))?;
    emit(movies_in_year(queries, args.year))?;
    emit(run_query("top5_genres_2010_to_2015", || {
        Ok(Answer::Genres(queries.top5_genres_2010_to_2015()))
    }))?;
    emit(run_query("top10_by_budget", || {
        Ok(Answer::Movies(queries.top10_by_budget()))
    }))?;
    emit(run_query("top5_by_genre_count", || {
        Ok(Answer::Movies(queries.top5_by_genre_count()))
    }))?;
    emit(highest_budget_in_country(queries, &args.country))?;
    emit(highest_profit(queries))?;
    emit(biggest_flop(queries))?;

    for page in REPORT_SEARCH_PAGES {
        emit(search(queries, &args.search, page, args.page_size))?;
    }
    Ok(())
}

fn best_popular(queries: MovieQueries<'_>) -> QueryReport<'_> {
    run_query("best_popular_movie", || {
        queries.best_popular_movie().map(Answer::Movie)
    })
}

fn movies_in_year(queries: MovieQueries<'_>, year: i32) -> QueryReport<'_> {
    run_query(format!("count_movies_in_year({year})"), || {
        Ok(Answer::Count(queries.count_movies_in_year(year)))
    })
}

fn highest_budget_in_country<'a>(queries: MovieQueries<'a>, code: &str) -> QueryReport<'a> {
    run_query(format!("highest_budget_in_country({code})"), || {
        Ok(queries
            .highest_budget_in_country(code)
            .map_or(Answer::Nothing, Answer::Movie))
    })
}

fn highest_profit(queries: MovieQueries<'_>) -> QueryReport<'_> {
    run_query("highest_profit_ever", || {
        queries
            .highest_profit_ever()
            .map(|(movie, profit)| Answer::Profit { movie, profit })
    })
}

fn biggest_flop(queries: MovieQueries<'_>) -> QueryReport<'_> {
    run_query("biggest_flop_ever", || {
        queries
            .biggest_flop_movie()
            .map(|(movie, profit)| Answer::Profit { movie, profit })
    })
}

fn search<'a>(
    queries: MovieQueries<'a>,
    needle: &str,
    page: usize,
    page_size: usize,
) -> QueryReport<'a> {
    run_query(format!("search_title_paged({needle}, page {page})"), || {
        Ok(Answer::Movies(queries.search_title_paged(needle, page, page_size)))
    })
}

/// Run one query and time it.
///
/// A `NotFound` result becomes a warning on the report, not a failure, so
/// the caller carries on.
fn run_query<'a>(
    name: impl Into<String>,
    query: impl FnOnce() -> queries::Result<Answer<'a>>,
) -> QueryReport<'a> {
    let start = Instant::now();
    let outcome = query();
    let elapsed_ms = start.elapsed().as_millis();

    let (result, warning) = match outcome {
        Ok(answer) => (Some(answer), None),
        Err(err @ QueryError::NotFound { .. }) => (None, Some(err.to_string())),
    };
    QueryReport {
        query: name.into(),
        elapsed_ms,
        result,
        warning,
    }
}

/// Print one report, as a JSON line or as colored text
fn print_report(report: &QueryReport<'_>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    println!("{}", report.query.bold().blue());
    if let Some(answer) = &report.result {
        print_answer(answer);
    }
    if let Some(warning) = &report.warning {
        println!("{}", format!("warning: {warning}").yellow());
    }
    println!(
        "{}",
        format!("{} finished in {}ms.", report.query, report.elapsed_ms).green()
    );
    println!("{}", "-".repeat(60));
    Ok(())
}

/// Helper function to format and print a query result
fn print_answer(answer: &Answer<'_>) {
    match answer {
        Answer::Movie(movie) => println!("{}", describe(movie)),
        Answer::Movies(movies) if movies.is_empty() => println!("(no movies)"),
        Answer::Movies(movies) => {
            for (rank, movie) in movies.iter().enumerate() {
                println!("{}. {}", (rank + 1).to_string().green(), describe(movie));
            }
        }
        Answer::Genres(genres) if genres.is_empty() => println!("(no genres)"),
        Answer::Genres(genres) => {
            for (rank, genre) in genres.iter().enumerate() {
                println!(
                    "{}. {} [{}] - {} movies",
                    (rank + 1).to_string().green(),
                    genre.name,
                    genre.genre_id,
                    genre.count
                );
            }
        }
        Answer::Count(count) => println!("{count}"),
        Answer::Profit { movie, profit } => {
            println!("{} - Profit: {}", describe(movie), profit)
        }
        Answer::Nothing => println!("(none)"),
    }
}

/// Title, year and whichever money and rating figures are known
fn describe(movie: &Movie) -> String {
    let year = movie
        .release_year()
        .map_or_else(|| "n.d.".to_string(), |year| year.to_string());
    let mut line = format!("{} ({}) [id {}]", movie.title, year, movie.id);
    if let Some(budget) = movie.budget() {
        line.push_str(&format!(" - Budget: {budget}"));
    }
    if let Some(revenue) = movie.revenue() {
        line.push_str(&format!(" - Revenue: {revenue}"));
    }
    if let Some(average) = movie.vote_average() {
        line.push_str(&format!(
            " - Rating: {:.1} ({} votes)",
            average,
            movie.vote_count()
        ));
    }
    line
}
