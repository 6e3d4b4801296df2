use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use melodb::config::{AppConfig, CliConfig, FileConfig};
use melodb::{
    AlbumCriteria, ArtistCriteria, CatalogSearch, DataUriChartRenderer, Deadline, SearchCriteria,
    SearchRequest, SqliteCatalog, StatRequest, Statistic, TrackCriteria,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[clap(name = "melodb", about = "Search a music catalog of tracks, albums and artists")]
struct Cli {
    /// Path to the SQLite music catalog database file.
    #[clap(long)]
    db: Option<PathBuf>,

    /// Path to a TOML config file; its values override CLI flags.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Number of read connections for concurrent searches.
    #[clap(long)]
    read_pool_size: Option<usize>,

    /// Abort any search running longer than this many milliseconds.
    #[clap(long)]
    deadline_ms: Option<u64>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search tracks.
    Tracks(TrackArgs),
    /// Search albums.
    Albums(AlbumArgs),
    /// Search artists.
    Artists(ArtistArgs),
}

#[derive(Args, Debug)]
struct TrackArgs {
    /// Track name contains this text.
    #[clap(long)]
    name: Option<String>,

    /// Artist name contains this text.
    #[clap(long)]
    artist: Option<String>,

    /// Released strictly after this year.
    #[clap(long)]
    after: Option<i64>,

    /// Released strictly before this year.
    #[clap(long)]
    before: Option<i64>,

    /// Include explicit tracks (excluded unless set).
    #[clap(long)]
    explicit: bool,

    /// Chart the mean of each audio feature over the matched tracks.
    #[clap(long)]
    chart: bool,

    #[clap(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct AlbumArgs {
    /// Album title contains this text.
    #[clap(long)]
    title: Option<String>,

    /// Released strictly after this year.
    #[clap(long)]
    after: Option<i64>,

    /// Released strictly before this year.
    #[clap(long)]
    before: Option<i64>,

    #[clap(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct ArtistArgs {
    /// Artist name contains this text.
    #[clap(long)]
    name: Option<String>,

    /// Artist genre contains this text.
    #[clap(long)]
    genre: Option<String>,

    /// Chart the genre mix of the matched artists.
    #[clap(long)]
    chart: bool,

    #[clap(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Order column (descending).
    #[clap(long)]
    order: Option<String>,

    /// Statistic to compute over the matched rows; requires --category.
    #[clap(long, value_enum)]
    stat: Option<Statistic>,

    /// Numeric column the statistic runs over; requires --stat.
    #[clap(long)]
    category: Option<String>,

    /// Page of results to display.
    #[clap(long)]
    page: Option<u32>,
}

fn build_request(command: Command) -> SearchRequest {
    let (criteria, want_chart, common) = match command {
        Command::Tracks(args) => (
            SearchCriteria::Track(TrackCriteria {
                name_contains: args.name,
                artist_contains: args.artist,
                released_after: args.after,
                released_before: args.before,
                include_explicit: args.explicit,
            }),
            args.chart,
            args.common,
        ),
        Command::Albums(args) => (
            SearchCriteria::Album(AlbumCriteria {
                title_contains: args.title,
                released_after: args.after,
                released_before: args.before,
            }),
            false,
            args.common,
        ),
        Command::Artists(args) => (
            SearchCriteria::Artist(ArtistCriteria {
                name_contains: args.name,
                genre_contains: args.genre,
            }),
            args.chart,
            args.common,
        ),
    };

    let mut request = SearchRequest::new(criteria);
    request.order_by = common.order;
    request.statistic = StatRequest::from_parts(common.stat, common.category);
    request.want_chart = want_chart;
    request.page = common.page;
    request
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli.db.clone(),
        read_pool_size: cli.read_pool_size,
        search_deadline_ms: cli.deadline_ms,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening music catalog at {:?}...", config.db_path);
    let catalog = Arc::new(SqliteCatalog::open(&config.db_path, config.read_pool_size)?);
    let engine = CatalogSearch::new(catalog, Arc::new(DataUriChartRenderer));

    let mut request = build_request(cli.command);
    request.deadline = config.search_deadline.map(Deadline::after);

    let result = engine.search(&request)?;

    println!(
        "Retrieved {} result(s) matching your search.",
        result.matched_rows.len()
    );
    println!(
        "Page {} ({} row(s)):",
        result.page.page,
        result.page_rows.len()
    );
    println!("{}", serde_json::to_string_pretty(&result.page_rows)?);
    if let Some(value) = result.stat_value {
        println!("Statistic: {}", value);
    }
    if let Some(chart) = &result.chart {
        println!("Chart: {}", chart.as_str());
    }

    Ok(())
}
