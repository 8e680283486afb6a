//! Photodiary CLI
//!
//! Command-line interface over a JSON-backed diary:
//! - Add, edit and delete entries
//! - List by date, query day ranges, search text
//! - Inspect and rebuild the index

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use photodiary::{
    generate_default_config, Config, Diary, DiaryEntry, EntryPatch, JsonFileStore, LoggingConfig,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "photodiary")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Photo diary with date-ordered listing and text search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Entry store file (overrides config)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add an entry
    Add {
        title: String,
        /// Body text
        #[arg(short = 'b', long, default_value = "")]
        content: String,
        /// Date (default: now). Supports "now", YYYY-MM-DD, RFC 3339
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short = 'T', long)]
        tags: Vec<String>,
        #[arg(short, long)]
        location: Option<String>,
        /// Attached photo paths
        #[arg(short, long)]
        photos: Vec<String>,
    },

    /// Edit an entry
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short = 'b', long)]
        content: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        /// Replace all tags
        #[arg(short = 'T', long)]
        tags: Option<Vec<String>>,
        #[arg(short, long)]
        location: Option<String>,
        /// Remove the location
        #[arg(long, conflicts_with = "location")]
        clear_location: bool,
    },

    /// Delete an entry
    Delete { id: String },

    /// Show one entry
    Show { id: String },

    /// List entries, most recent first
    List {
        #[arg(long, default_value = "0")]
        offset: usize,
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
        /// Only entries carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Entries between two days (inclusive)
    Range {
        /// First day, YYYY-MM-DD
        from: String,
        /// Last day, YYYY-MM-DD
        to: String,
    },

    /// Case-insensitive text search
    Search { query: String },

    /// Rebuild the index from the store
    Rebuild,

    /// Show index statistics
    Stats,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| config.store.store_path());
    tracing::debug!(path = %store_path.display(), "opening diary");
    let store = JsonFileStore::open(&store_path)
        .with_context(|| format!("opening entry store {}", store_path.display()))?;
    let mut diary = Diary::with_options(store, config.index.diary_options());
    let json = cli.format == "json";

    match cli.command {
        Commands::Add {
            title,
            content,
            date,
            tags,
            location,
            photos,
        } => {
            let date = match date {
                Some(s) => parse_date(&s)?,
                None => Utc::now(),
            };
            let mut entry = DiaryEntry::new(date, title).content(content).tags(tags);
            if let Some(location) = location {
                entry = entry.location(location);
            }
            for photo in photos {
                entry = entry.photo(photo);
            }
            let id = diary.create(entry)?;
            println!("{}", id);
        }

        Commands::Edit {
            id,
            title,
            content,
            date,
            tags,
            location,
            clear_location,
        } => {
            let mut patch = EntryPatch::new();
            patch.title = title;
            patch.content = content;
            patch.tags = tags;
            patch.date = date.as_deref().map(parse_date).transpose()?;
            if clear_location {
                patch.location = Some(None);
            } else if let Some(location) = location {
                patch.location = Some(Some(location));
            }
            let entry = diary.edit(&id, patch)?;
            print_entries(&[&entry], json)?;
        }

        Commands::Delete { id } => {
            diary.delete(&id)?;
            println!("Deleted {}", id);
        }

        Commands::Show { id } => match diary.get(&id) {
            Some(entry) => print_entries(&[entry], json)?,
            None => bail!("Entry not found: {}", id),
        },

        Commands::List { offset, limit, tag } => {
            let entries = match tag {
                Some(tag) => diary.list_tagged(&tag, offset, limit),
                None => diary.list(offset, limit),
            };
            print_entries(&entries, json)?;
        }

        Commands::Range { from, to } => {
            let from = parse_day(&from)?;
            let to = parse_day(&to)?;
            let entries = diary.entries_between(from, to);
            print_entries(&entries, json)?;
        }

        Commands::Search { query } => {
            let entries = diary.search(&query);
            print_entries(&entries, json)?;
        }

        Commands::Rebuild => {
            let stats = diary.rebuild();
            println!("Index rebuilt: {}", stats);
        }

        Commands::Stats => {
            diary.ensure_index();
            println!("{}", diary.stats());
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("photodiary={}", config.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Parse "now", a bare day (midnight UTC) or an RFC 3339 timestamp
fn parse_date(s: &str) -> anyhow::Result<DateTime<Utc>> {
    if s == "now" {
        return Ok(Utc::now());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    bail!("Invalid date format: {}", s)
}

fn parse_day(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid day: {}", s))
}

fn print_entries(entries: &[&DiaryEntry], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No entries");
        return Ok(());
    }

    println!("{:<36}  {:<16}  {:<30}  {}", "ID", "DATE", "TITLE", "TAGS");
    for entry in entries {
        println!(
            "{:<36}  {:<16}  {:<30}  {}",
            entry.id,
            entry.date.format("%Y-%m-%d %H:%M").to_string(),
            truncate(&entry.title, 30),
            entry.tags.join(", ")
        );
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
