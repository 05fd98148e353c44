use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use randpick::clipboard::SystemClipboard;
use randpick::collection::ItemCollection;
use randpick::config::{get_config_path, AppConfig};
use randpick::models::Item;
use randpick::notify::{Notice, NoticeLevel, Notifier};
use randpick::selector::{IntervalTicker, RandomSelector, SpinState};
use randpick::session::{ImportStep, PasteOutcome, PickerSession, PreviewEntry};
use randpick::storage::ItemStorage;
use randpick::store::{self, SqliteBlobStore};

#[derive(Parser)]
#[command(name = "rpick")]
#[command(about = "Keep a list of items and pick one at random")]
struct Cli {
    /// Database file (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List items
    List {
        /// Only show items whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add one item
    Add { name: String },
    /// Rename an item
    Edit { id: String, name: String },
    /// Delete an item
    Remove { id: String },
    /// Import many items from pasted text
    Import {
        /// Text to import
        #[arg(long, conflicts_with_all = ["file", "clipboard"])]
        text: Option<String>,

        /// Read the text from a file
        #[arg(long, conflicts_with = "clipboard")]
        file: Option<PathBuf>,

        /// Read the text from the clipboard
        #[arg(long)]
        clipboard: bool,

        /// Import without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Pick a random item
    Pick {
        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,

        /// Delay between frames in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Show item count and pick odds
    Stats,
    /// Show the configuration
    Config {
        /// Write the current configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

/// Prints notices for the terminal user.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error | NoticeLevel::NotFound => {
                eprintln!("{}: {}", notice.title, notice.description)
            }
            NoticeLevel::Success | NoticeLevel::Info => {
                println!("{}: {}", notice.title, notice.description)
            }
        }
    }
}

/// Initialize tracing on stderr so stdout only carries command output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "randpick=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_session(
    db: Option<PathBuf>,
    config: &AppConfig,
    selector: RandomSelector,
) -> Result<PickerSession<ConsoleNotifier>> {
    let path = match db.or_else(|| config.db_path.clone()) {
        Some(path) => path,
        None => store::default_db_path()?,
    };

    let blob_store = SqliteBlobStore::open(path.clone())
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    blob_store.migrate()?;

    let storage = ItemStorage::new(blob_store).with_failure_hook(|e| {
        eprintln!("warning: changes were not saved and may be lost on exit: {}", e);
    });

    let collection = if config.seed_defaults {
        ItemCollection::load(storage)
    } else {
        ItemCollection::load_without_seed(storage)
    };

    Ok(PickerSession::new(collection, selector, ConsoleNotifier))
}

fn print_items(items: &[Item]) {
    for item in items {
        println!("{:<38} {}  {}", item.id, item.color, item.name);
    }
}

fn print_preview(entries: &[PreviewEntry]) {
    println!("Preview ({} items):", entries.len());
    for entry in entries {
        println!("  {}  {}", entry.color, entry.name);
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read text from stdin")?;
    Ok(text)
}

fn run_import(
    session: &mut PickerSession<ConsoleNotifier>,
    text: Option<String>,
    file: Option<PathBuf>,
    clipboard: bool,
    yes: bool,
) -> Result<()> {
    let mut from_stdin = false;
    let step = if clipboard {
        match session.quick_paste(&mut SystemClipboard::new()) {
            PasteOutcome::Parsed(step) => step,
            PasteOutcome::EmptyClipboard => return Ok(()),
            PasteOutcome::ManualEntry => {
                eprintln!("Paste the items, then end input with Ctrl-D:");
                from_stdin = true;
                session.preview_import(&read_stdin()?)
            }
        }
    } else {
        let text = match (text, file) {
            (Some(text), _) => text,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => {
                from_stdin = true;
                read_stdin()?
            }
        };
        session.preview_import(&text)
    };

    let ImportStep::Preview(entries) = step else {
        return Ok(());
    };

    print_preview(&entries);
    let accepted = if yes {
        true
    } else if from_stdin {
        // stdin is exhausted, there is nothing left to read an answer from
        println!("Re-run with --yes to import text read from stdin");
        false
    } else {
        confirm(&format!("Import {} items?", entries.len()))?
    };

    if accepted {
        session.confirm_import();
    } else {
        session.cancel_import();
        println!("Import cancelled");
    }
    Ok(())
}

async fn run_pick(
    session: &mut PickerSession<ConsoleNotifier>,
    interval: Duration,
) -> Result<()> {
    // tokio intervals reject a zero period
    let mut ticker = IntervalTicker::new(interval.max(Duration::from_millis(1)));
    let mut stdout = io::stdout();

    // The settled item is reported by the session's notice.
    session
        .pick(&mut ticker, |state| {
            match state {
                SpinState::Selecting {
                    current: Some(item),
                    ..
                } => {
                    let _ = write!(stdout, "\r\x1b[2K{}", item.name);
                }
                SpinState::Settled(_) => {
                    let _ = write!(stdout, "\r\x1b[2K");
                }
                _ => {}
            }
            let _ = stdout.flush();
        })
        .await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load();
    let command = cli.command.unwrap_or(Commands::List { search: None });

    if let Commands::Config { init } = command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        if init {
            config.save()?;
            println!("Wrote {}", get_config_path()?.display());
        }
        return Ok(());
    }

    let selector = match &command {
        Commands::Pick {
            seed: Some(seed), ..
        } => RandomSelector::seeded(*seed),
        _ => RandomSelector::new(),
    };
    let mut session = open_session(cli.db, &config, selector)?;

    match command {
        Commands::List { search } => {
            let items = session.search(search.as_deref().unwrap_or(""));
            print_items(&items);
            if search.is_some() {
                println!("Showing {} / {} items", items.len(), session.collection().len());
            } else {
                println!("{} items", items.len());
            }
        }
        Commands::Add { name } => {
            let item = session.add(&name)?;
            print_items(&[item]);
        }
        Commands::Edit { id, name } => {
            let item = session.edit(&id, &name)?;
            print_items(&[item]);
        }
        Commands::Remove { id } => {
            if !session.remove(&id) {
                println!("No item with id {}, nothing removed", id);
            }
        }
        Commands::Import {
            text,
            file,
            clipboard,
            yes,
        } => run_import(&mut session, text, file, clipboard, yes)?,
        Commands::Pick { interval_ms, .. } => {
            let interval = interval_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.frame_interval());
            run_pick(&mut session, interval).await?;
        }
        Commands::Stats => {
            let stats = session.stats();
            println!("Items:              {}", stats.total);
            println!("Single-item chance: {}%", stats.single_probability_percent);
            println!("Selected:           {}", stats.selected);
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
