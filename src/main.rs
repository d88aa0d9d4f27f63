use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::path::PathBuf;
use todostore::{Backend, Config, Filter, Storage, TodoItem, TodoStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "TodoStore CLI - a to-do list persisted to a key-value slot")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: <config dir>/todostore/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the store
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Name of the storage slot
    #[arg(short, long)]
    key: Option<String>,

    /// Storage backend
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Show tasks
    List {
        /// Which tasks to show: all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: Filter,

        /// Show when each task was created
        #[arg(short, long)]
        verbose: bool,
    },

    /// Mark a task done, or not done again
    Toggle { id: i64 },

    /// Delete a task
    Remove { id: i64 },

    /// Replace a task's text
    Edit {
        id: i64,
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(store_path) = cli.store_path {
        config.store_path = store_path;
    }
    if let Some(key) = cli.key {
        config.key = key;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    // Open store
    let mut store = TodoStore::open(config.open_storage()?)?;

    match cli.command {
        Commands::Add { text } => {
            store.set_input(text.join(" "));
            match store.submit_input()? {
                Some(id) => println!("Added {}", id.to_string().cyan()),
                None => return Err(eyre!("Task text cannot be empty")),
            }
        }
        Commands::List { filter, verbose } => {
            store.set_filter(filter);
            print_list(&store, verbose);
        }
        Commands::Toggle { id } => {
            if !store.toggle(id)? {
                return Err(eyre!("No task with id {}", id));
            }
            if let Some(item) = store.get(id) {
                let state = if item.completed { "Completed" } else { "Reopened" };
                println!("{}: {}", state, item.text);
            }
        }
        Commands::Remove { id } => {
            let text = store.get(id).map(|item| item.text.clone());
            if !store.remove(id)? {
                return Err(eyre!("No task with id {}", id));
            }
            println!("Removed: {}", text.unwrap_or_default());
        }
        Commands::Edit { id, text } => {
            if !store.begin_edit(id) {
                return Err(eyre!("No task with id {}", id));
            }
            store.set_edit_text(text.join(" "));
            if !store.commit_edit(id)? {
                return Err(eyre!("Task text cannot be empty"));
            }
            println!("Updated {}", id.to_string().cyan());
        }
    }

    Ok(())
}

fn print_list<S: Storage>(store: &TodoStore<S>, verbose: bool) {
    let counts = store.counts();
    let tabs: Vec<String> = Filter::ALL
        .iter()
        .map(|&filter| {
            let tab = format!("{} ({})", filter.label(), counts.get(filter));
            if filter == store.filter() {
                tab.bold().blue().to_string()
            } else {
                tab
            }
        })
        .collect();
    println!("{}\n", tabs.join("  "));

    let visible = store.visible_items();
    if visible.is_empty() {
        println!("{}", "No tasks".dimmed());
        return;
    }

    for item in visible {
        println!("{}", format_item(item, verbose));
    }
}

fn format_item(item: &TodoItem, verbose: bool) -> String {
    let (mark, text) = if item.completed {
        ("[x]", item.text.strikethrough().dimmed().to_string())
    } else {
        ("[ ]", item.text.clone())
    };

    let mut line = format!("{} {} {}", mark, item.id.to_string().cyan(), text);
    if verbose {
        if let Some(created) = chrono::DateTime::from_timestamp_millis(item.id) {
            let created = created.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M");
            line.push_str(&format!("  {}", created.to_string().dimmed()));
        }
    }
    line
}
