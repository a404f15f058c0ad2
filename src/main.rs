use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use punchcard::clock::{Clock, SystemClock};
use punchcard::config::Settings;
use punchcard::domain::{EntryId, TimesheetId};
use punchcard::logging::enable_logging;
use punchcard::persistence::{ensure_data_dir, init_local_data_dir, FileStore, KeyValueStore};
use punchcard::report::{render_entries, render_header, render_summary, render_timesheet_list};
use punchcard::store::TimesheetStore;
use punchcard::ticker::Ticker;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "punchcard", version)]
#[command(about = "A local, multi-timesheet task timer with running totals and summaries", long_about = None)]
struct Cli {
    /// Data directory. Defaults to the nearest .punchcard directory, then ~/.punchcard
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .punchcard directory in the current directory
    Init,
    #[command(flatten)]
    Store(StoreCommands),
}

/// Commands that operate on the opened timesheet store
#[derive(Subcommand)]
enum StoreCommands {
    /// Start timing a task in the active timesheet
    Start {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Stop a running entry
    Stop { id: EntryId },
    /// Start a new entry for the same task as an existing one
    Restart { id: EntryId },
    /// Delete an entry
    Delete { id: EntryId },
    /// Remove every entry from the active timesheet
    Clear,
    /// Show the entries of the active timesheet (default)
    List,
    /// Show per-task totals for the active timesheet
    Summary,
    /// Redraw the active timesheet on every tick until interrupted
    Watch {
        /// Show the summary instead of the entry list
        #[arg(long)]
        summary: bool,
    },
    /// Manage timesheets
    Sheet {
        #[command(subcommand)]
        command: SheetCommands,
    },
}

#[derive(Subcommand)]
enum SheetCommands {
    /// Create a new timesheet named after today's date and switch to it
    New,
    /// List all timesheets, newest first
    List,
    /// Switch to a timesheet
    Select { id: String },
    /// Rename a timesheet
    Rename {
        id: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Delete a timesheet (the last one can't be deleted)
    Delete { id: String },
    /// Switch to the next older timesheet
    Prev,
    /// Switch to the next newer timesheet
    Next,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command.unwrap_or(Commands::Store(StoreCommands::List)) {
        Commands::Init => return init_here(),
        Commands::Store(command) => command,
    };

    let data_dir = ensure_data_dir(cli.dir.as_deref())?;
    let settings = Settings::load(Settings::path_in(&data_dir))?;
    enable_logging(&settings.log_level, cli.verbose);

    let mut store = TimesheetStore::open(FileStore::new(&data_dir), SystemClock);

    match command {
        StoreCommands::Start { name } => {
            let id = store.create_new_entry(&name.join(" "))?;
            println!("Started entry {}", id);
        }
        StoreCommands::Stop { id } => {
            if store.stop_entry(id) {
                println!("Stopped entry {}", id);
            } else {
                println!("No running entry {} in the active timesheet", id);
                print_running(&store);
            }
        }
        StoreCommands::Restart { id } => match store.restart_entry(id) {
            Some(new_id) => println!("Started entry {} from entry {}", new_id, id),
            None => println!("No entry {} in the active timesheet", id),
        },
        StoreCommands::Delete { id } => {
            if store.delete_entry(id) {
                println!("Deleted entry {}", id);
            } else {
                println!("No entry {} in the active timesheet", id);
            }
        }
        StoreCommands::Clear => {
            store.clear_timesheet();
            println!("Cleared the active timesheet");
        }
        StoreCommands::List => print_active(&store, false),
        StoreCommands::Summary => print_active(&store, true),
        StoreCommands::Watch { summary } => watch(&mut store, &settings, summary)?,
        StoreCommands::Sheet { command } => run_sheet_command(&mut store, command)?,
    }

    Ok(())
}

fn init_here() -> Result<()> {
    let current_dir = std::env::current_dir().context("Could not determine current directory")?;
    let data_dir = init_local_data_dir(&current_dir)?;
    println!("Initialized punchcard directory: {}", data_dir.display());
    println!();
    println!("Timesheets in this directory tree will now be stored there.");
    Ok(())
}

fn run_sheet_command<K: KeyValueStore, C: Clock>(
    store: &mut TimesheetStore<K, C>,
    command: SheetCommands,
) -> Result<()> {
    match command {
        SheetCommands::New => {
            let id = store.create_new_timesheet();
            println!("Created timesheet {}", id);
        }
        SheetCommands::List => print!("{}", render_timesheet_list(store.data(), store.now())),
        SheetCommands::Select { id } => {
            let id = TimesheetId::new(id);
            if store.select_timesheet(&id) {
                print_active(store, false);
            } else {
                println!("No timesheet {}", id);
            }
        }
        SheetCommands::Rename { id, name } => {
            let id = TimesheetId::new(id);
            if store.rename_timesheet(&id, &name.join(" "))? {
                println!("Renamed timesheet {}", id);
            } else {
                println!("No timesheet {}", id);
            }
        }
        SheetCommands::Delete { id } => {
            let id = TimesheetId::new(id);
            if store.delete_timesheet(&id) {
                println!("Deleted timesheet {}", id);
            } else if store.data().timesheets.len() == 1 {
                println!("The last timesheet can't be deleted");
            } else {
                println!("No timesheet {}", id);
            }
        }
        SheetCommands::Prev => {
            if store.select_previous() {
                print_active(store, false);
            } else {
                println!("Already at the oldest timesheet");
            }
        }
        SheetCommands::Next => {
            if store.select_next() {
                print_active(store, false);
            } else {
                println!("Already at the newest timesheet");
            }
        }
    }
    Ok(())
}

fn active_view<K: KeyValueStore, C: Clock>(
    store: &TimesheetStore<K, C>,
    summary: bool,
    now: chrono::DateTime<chrono::Utc>,
) -> String {
    let Some(timesheet) = store.active_timesheet() else {
        return "No active timesheet\n".to_string();
    };
    let body = if summary {
        render_summary(timesheet, now)
    } else {
        render_entries(timesheet, now)
    };
    format!(
        "{}\n\n{}",
        render_header(timesheet, store.navigation().as_ref(), now),
        body
    )
}

fn print_running<K: KeyValueStore, C: Clock>(store: &TimesheetStore<K, C>) {
    let running: Vec<String> = store
        .active_timesheet()
        .map(|timesheet| timesheet.running_entries().map(|entry| entry.id.to_string()).collect())
        .unwrap_or_default();
    if !running.is_empty() {
        println!("Running: {}", running.join(", "));
    }
}

fn print_active<K: KeyValueStore, C: Clock>(store: &TimesheetStore<K, C>, summary: bool) {
    print!("{}", active_view(store, summary, store.now()));
}

fn watch<K: KeyValueStore, C: Clock>(
    store: &mut TimesheetStore<K, C>,
    settings: &Settings,
    summary: bool,
) -> Result<()> {
    let mut ticker = Ticker::new(SystemClock, settings.tick_interval());
    let mut stdout = io::stdout();

    loop {
        let now = ticker.wait();
        // Other processes change storage while this one only displays
        store.reload();
        // Clear screen and home the cursor before each redraw
        write!(stdout, "\x1b[2J\x1b[H{}", active_view(store, summary, now))?;
        stdout.flush()?;
    }
}
