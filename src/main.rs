mod app;
mod commands;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use trip_core::EventType;
use trip_core::model::{FilterType, SortType};

use crate::app::App;

#[derive(Parser)]
#[command(name = "trip")]
#[command(about = "Plan your trip against the trip server, offline edits included")]
struct Cli {
    /// Log requests, store writes and sync details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Don't contact the server; work from the local store
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List trip events
    List {
        #[arg(long, default_value = "everything", value_parser = parse_filter)]
        filter: FilterType,

        #[arg(long, default_value = "event", value_parser = parse_sort)]
        sort: SortType,
    },
    /// Show the route, dates and total cost
    Info,
    /// Money, transport and time spent per event type
    Stats,
    Destinations,
    Offers {
        /// Only offers for this event type (e.g. "taxi", "check-in")
        #[arg(value_parser = parse_event_type)]
        event_type: Option<EventType>,
    },
    /// Add an event
    Add {
        #[arg(short = 't', long = "type", value_parser = parse_event_type)]
        event_type: EventType,

        #[arg(short, long)]
        destination: String,

        /// Start date/time (e.g., "2025-03-18T10:00")
        #[arg(short, long)]
        start: String,

        #[arg(short, long)]
        end: String,

        #[arg(short, long)]
        price: u32,

        /// Offer title to include; repeat for several
        #[arg(long = "offer")]
        offers: Vec<String>,
    },
    /// Change an existing event
    Update {
        id: String,

        #[arg(short, long)]
        price: Option<u32>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(long, overrides_with = "no_favorite")]
        favorite: bool,

        #[arg(long, overrides_with = "favorite")]
        no_favorite: bool,
    },
    Delete {
        id: String,
    },
    /// Toggle an event's favorite flag
    Favorite {
        id: String,
    },
    /// Send offline changes to the server
    Sync,
    /// Show connectivity and pending offline changes
    Status,
    /// Keep probing the server and sync whenever it comes back
    Watch,
}

fn parse_filter(s: &str) -> Result<FilterType, String> {
    s.parse()
}

fn parse_sort(s: &str) -> Result<SortType, String> {
    s.parse()
}

fn parse_event_type(s: &str) -> Result<EventType, String> {
    s.parse()
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("trip=debug,trip_core=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let app = App::load(cli.offline).await?;

    match cli.command {
        Commands::List { filter, sort } => commands::list::run(&app, filter, sort).await,
        Commands::Info => commands::info::run(&app).await,
        Commands::Stats => commands::stats::run(&app).await,
        Commands::Destinations => commands::destinations::run(&app).await,
        Commands::Offers { event_type } => commands::offers::run(&app, event_type).await,
        Commands::Add {
            event_type,
            destination,
            start,
            end,
            price,
            offers,
        } => {
            let draft = commands::add::Draft {
                event_type,
                destination,
                start,
                end,
                price,
                offers,
            };
            commands::add::run(&app, draft).await
        }
        Commands::Update {
            id,
            price,
            start,
            end,
            favorite,
            no_favorite,
        } => {
            let favorite = match (favorite, no_favorite) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let changes = commands::update::Changes {
                price,
                start,
                end,
                favorite,
            };
            commands::update::run(&app, &id, changes).await
        }
        Commands::Delete { id } => commands::delete::run(&app, &id).await,
        Commands::Favorite { id } => commands::favorite::run(&app, &id).await,
        Commands::Sync => commands::sync::run(&app).await,
        Commands::Status => commands::status::run(&app),
        Commands::Watch => commands::watch::run(&app).await,
    }
}
