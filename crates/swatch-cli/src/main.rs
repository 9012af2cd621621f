mod agent_cmd;
mod app;
mod calendar_cmds;
mod config;
mod item_cmds;
mod output;
mod save_cmd;
mod theme_cmds;

#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};

use swatch_core::agent::runner::DEFAULT_MAX_TURNS;

use app::App;
use config::{CliOverrides, SwatchConfig};

#[derive(Parser)]
#[command(name = "swatch", about = "Plan a year of ink swatches", version)]
struct Cli {
    /// Collection JSON file (overrides SWATCHBOOK_COLLECTION)
    #[arg(long, global = true)]
    collection: Option<PathBuf>,

    /// Session file (overrides SWATCHBOOK_SESSION)
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// Calendar year (overrides SWATCHBOOK_YEAR)
    #[arg(long, global = true)]
    year: Option<i32>,

    /// Print raw JSON results
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            collection: self.collection.clone(),
            session: self.session.clone(),
            year: self.year,
        }
    }
}

fn month_arg() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=12)
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a swatch config file from --collection, --session and --year
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Browse the collection
    Items {
        #[command(subcommand)]
        command: ItemsCommands,
    },
    /// Show each day of a month
    Month {
        /// Month number (1-12)
        #[arg(value_parser = month_arg())]
        month: u32,
    },
    /// Assign an item to a date (session only)
    Assign {
        /// Item name, or "<brand> <name>"
        item: String,
        /// Date as YYYY-MM-DD
        date: String,
    },
    /// Remove the session assignment on a date
    Unassign {
        date: String,
    },
    /// Move a session assignment to another date
    Move {
        from: String,
        to: String,
    },
    /// Exchange the session assignments on two dates
    Swap {
        date1: String,
        date2: String,
    },
    /// Assign several items to a month's free days, in order
    Bulk {
        #[arg(value_parser = month_arg())]
        month: u32,
        /// Item names
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Remove every session assignment in a month
    ClearMonth {
        #[arg(value_parser = month_arg())]
        month: u32,
    },
    /// Per-month overview of the year
    Summary,
    /// Find items that could fill empty days
    Candidates {
        /// Text to find in the name, brand, tags or notes
        #[arg(long)]
        query: Option<String>,
        /// Color tag to filter by
        #[arg(long)]
        color: Option<String>,
        /// Brand to filter by
        #[arg(long)]
        brand: Option<String>,
        /// Leave out items already assigned this session
        #[arg(long)]
        unassigned_only: bool,
        /// Maximum number of results
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Month themes
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Write session assignments into the collection's item comments
    Save {
        /// Dates to save (YYYY-MM-DD)
        dates: Vec<String>,
        /// Save every session assignment
        #[arg(long, conflicts_with = "dates")]
        all: bool,
        /// Show what would be saved without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the agent tool definitions as JSON
    Tools,
    /// Run an agent script against the calendar
    Agent {
        /// JSON script of tool-call turns
        #[arg(long)]
        script: PathBuf,
        /// Request passed to the agent
        #[arg(long, default_value = "Plan my swatch calendar")]
        message: String,
        /// Stop after this many turns
        #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
        max_turns: usize,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ItemsCommands {
    /// List every item
    List,
    /// Search items by name, color tag or brand
    Search {
        /// Substring of "<brand> <name>"
        query: Option<String>,
        /// Exact color tag
        #[arg(long)]
        color: Option<String>,
        /// Substring of the brand
        #[arg(long)]
        brand: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ThemeCommands {
    /// Set a month's theme
    Set {
        #[arg(value_parser = month_arg())]
        month: u32,
        theme: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show a month's theme
    Get {
        #[arg(value_parser = month_arg())]
        month: u32,
    },
    /// Clear a month's session theme
    Clear {
        #[arg(value_parser = month_arg())]
        month: u32,
    },
}

/// Execute the `swatch init` command: write config file.
fn cmd_init(overrides: &CliOverrides, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        collection: config::CollectionSection {
            path: Some(
                overrides
                    .collection
                    .clone()
                    .unwrap_or_else(|| config::DEFAULT_COLLECTION.into()),
            ),
        },
        session: config::SessionSection {
            path: Some(
                overrides
                    .session
                    .clone()
                    .unwrap_or_else(|| config::DEFAULT_SESSION.into()),
            ),
        },
        calendar: config::CalendarSection {
            year: overrides.year,
        },
    };

    let path = config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    if let Some(p) = &cfg.collection.path {
        println!("  collection.path = {}", p.display());
    }
    if let Some(p) = &cfg.session.path {
        println!("  session.path    = {}", p.display());
    }
    match cfg.calendar.year {
        Some(year) => println!("  calendar.year   = {year}"),
        None => println!("  calendar.year   = (current year)"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    // Commands that need no collection.
    match &cli.command {
        Commands::Init { force } => return cmd_init(&cli.overrides(), *force),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "swatch", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let resolved = SwatchConfig::resolve(&cli.overrides())?;
    let mut app = App::open(resolved)?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => {}
        Commands::Items { command } => {
            item_cmds::run_items_command(command, &mut app, json)?;
        }
        Commands::Month { month } => {
            calendar_cmds::cmd_month(&mut app, month, json)?;
        }
        Commands::Assign { item, date } => {
            calendar_cmds::cmd_assign(&mut app, &item, &date, json)?;
        }
        Commands::Unassign { date } => {
            calendar_cmds::cmd_unassign(&mut app, &date, json)?;
        }
        Commands::Move { from, to } => {
            calendar_cmds::cmd_move(&mut app, &from, &to, json)?;
        }
        Commands::Swap { date1, date2 } => {
            calendar_cmds::cmd_swap(&mut app, &date1, &date2, json)?;
        }
        Commands::Bulk { month, items } => {
            calendar_cmds::cmd_bulk(&mut app, month, &items, json)?;
        }
        Commands::ClearMonth { month } => {
            calendar_cmds::cmd_clear_month(&mut app, month, json)?;
        }
        Commands::Summary => {
            calendar_cmds::cmd_summary(&mut app, json)?;
        }
        Commands::Candidates {
            query,
            color,
            brand,
            unassigned_only,
            limit,
        } => {
            let args = item_cmds::CandidateArgs {
                query,
                color,
                brand,
                unassigned_only,
                limit,
            };
            item_cmds::cmd_candidates(&mut app, args, json)?;
        }
        Commands::Theme { command } => {
            theme_cmds::run_theme_command(command, &mut app, json)?;
        }
        Commands::Save {
            dates,
            all,
            dry_run,
        } => {
            save_cmd::run_save(&mut app, &dates, all, dry_run, json)?;
        }
        Commands::Tools => {
            agent_cmd::cmd_tools(&app)?;
        }
        Commands::Agent {
            script,
            message,
            max_turns,
        } => {
            agent_cmd::run_agent(&mut app, &script, &message, max_turns, json).await?;
        }
    }

    Ok(())
}
