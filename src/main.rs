use clap::{ArgAction, Parser, ValueEnum};
use colored::Colorize;
use eyre::{Context, Result};
use std::io::{self, BufRead};
use std::path::PathBuf;
use tasklist::command::{Command, HELP};
use tasklist::render::View;
use tasklist::{CommitPolicy, Config, Entry, Filter, Priority, Task, TaskListStore};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Interactive in-memory to-do list driven by line commands on stdin")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file (default: <config dir>/tasklist/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Which kind of entry the list holds
    #[arg(long, value_enum, default_value_t = Variant::Rich)]
    variant: Variant,

    /// Priority for new tasks (overrides the config file)
    #[arg(long, value_enum)]
    priority: Option<Priority>,

    /// Filter active at startup (overrides the config file)
    #[arg(long, value_enum)]
    filter: Option<Filter>,

    /// What commit does with a blank edit buffer (overrides the config file)
    #[arg(long, value_enum)]
    empty_commit: Option<CommitPolicy>,

    /// Print each view as a JSON document instead of colored text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Variant {
    /// Tasks with completion, priority and timestamp
    Rich,
    /// Bare strings
    Simple,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config =
        Config::discover(cli.config.as_deref())?.with_overrides(cli.priority, cli.filter, cli.empty_commit);

    setup_tracing(cli.verbose, &config.log_level);
    match &config.source {
        Some(path) => info!(path = %path.display(), "Loaded config"),
        None => debug!("No config file found, using defaults"),
    }
    debug!(?config, variant = ?cli.variant, "Starting tasklist");

    match cli.variant {
        Variant::Rich => run::<Task>(&config, cli.json),
        Variant::Simple => run::<String>(&config, cli.json),
    }
}

/// -v flags win over RUST_LOG, which wins over the config file
fn setup_tracing(verbose: u8, config_level: &str) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run<E: Entry>(config: &Config, json: bool) -> Result<()> {
    let mut store: TaskListStore<E> = TaskListStore::with_options(config.store_options());

    let timestamp_format = config.timestamp_format.clone();
    store.subscribe(move |change, view| {
        debug!(?change, "Re-rendering");
        print_view(&View::from_store(view, &timestamp_format), json);
    });

    print_view(&View::from_store(&store, &config.timestamp_format), json);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::List) => print_view(&View::from_store(&store, &config.timestamp_format), json),
            Ok(command) => command.apply(&mut store),
            Err(e) => eprintln!("{} {:#}", "error:".red().bold(), e),
        }
    }

    Ok(())
}

fn print_view(view: &View, json: bool) {
    if !json {
        print!("{}", view.to_text());
        return;
    }

    match view.to_json() {
        Ok(doc) => println!("{}", doc),
        Err(e) => warn!(error = ?e, "Failed to render view"),
    }
}
