mod config;
mod error;
mod export;
mod portal;
mod record;
mod remote;
mod render;
mod script;
mod search;
mod status;
mod ui;
mod worker;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use config::Config;
use portal::{Command as PortalCommand, Portal};
use record::RecordStore;
use remote::http::HttpBackend;
use remote::Backend;

#[derive(Parser, Debug)]
#[command(name = "hallfind", version, about = "Search the residential hall directory")]
struct Cli {
    /// Configuration file (defaults to the user config dir)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Portal server, overrides `server.base_url`
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print autocomplete suggestions (text<TAB>field)
    Suggest(QueryArgs),
    /// Run a search and print one line per result
    Search(QueryArgs),
    /// Run a search and write the result view as HTML
    Render(OutputArgs),
    /// Run a search and export the results as comma-separated text
    Export(OutputArgs),
    /// Show or change the contact status of one result
    Status(StatusArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    query: String,
}

#[derive(Args, Debug)]
struct OutputArgs {
    query: String,

    /// Output file for `render`, output directory for `export`
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("action").required(true).args(["mark", "reset", "show"])))]
struct StatusArgs {
    query: String,

    /// 1-based position in the results
    index: usize,

    #[arg(long)]
    mark: bool,

    #[arg(long)]
    reset: bool,

    #[arg(long)]
    show: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.command.is_none())?;

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.server.base_url = base_url;
    }
    let backend = HttpBackend::new(&config.server.base_url, config.server.timeout)
        .with_context(|| format!("failed to set up client for {}", config.server.base_url))?;
    tracing::debug!(
        config = %config.config_path.display(),
        base_url = %backend.base_url(),
        "starting"
    );

    match cli.command {
        Some(Command::Suggest(args)) => handle_suggest(&backend, &args.query),
        Some(Command::Search(args)) => handle_search(&backend, &config, &args.query),
        Some(Command::Render(args)) => handle_render(&backend, &config, args),
        Some(Command::Export(args)) => handle_export(&backend, &config, args),
        Some(Command::Status(args)) => handle_status(&backend, &config, args),
        None => {
            let mut app = ui::App::new(&config, Arc::new(backend));
            app.run()
        }
    }
}

/// Logs go to stderr for subcommands and to a file while the TUI owns the
/// terminal.
fn init_logging(verbosity: u8, tui: bool) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(false);

    if tui {
        let path = config::data_dir()?.join("hallfind.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn handle_suggest(backend: &dyn Backend, query: &str) -> Result<()> {
    let store = RecordStore::load(backend)?;
    for suggestion in search::suggest(store.records(), query.trim()) {
        println!("{}\t{}", suggestion.text, suggestion.field);
    }
    Ok(())
}

fn handle_search(backend: &dyn Backend, config: &Config, query: &str) -> Result<()> {
    let portal = run_search(backend, &config.export.dir, query)?;
    let view = portal.view();
    if view.cards().is_empty() {
        println!("{}", render::NO_RESULTS);
        return Ok(());
    }

    for card in view.cards() {
        let fields: Vec<String> = card
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.name, field.value.text()))
            .collect();
        println!("{}", fields.join(" | "));
    }
    Ok(())
}

fn handle_render(backend: &dyn Backend, config: &Config, args: OutputArgs) -> Result<()> {
    let portal = run_search(backend, &config.export.dir, &args.query)?;
    let html = portal.view().to_html(&portal.card_statuses());
    match args.output {
        Some(path) => {
            fs::write(&path, html)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}

fn handle_export(backend: &dyn Backend, config: &Config, args: OutputArgs) -> Result<()> {
    let dir = args.output.unwrap_or_else(|| config.export.dir.clone());
    let mut portal = run_search(backend, &dir, &args.query)?;
    let effects = portal.dispatch(PortalCommand::Export, Instant::now());
    fail_on_error(&portal)?;
    worker::run_inline(&mut portal, backend, &dir, effects);
    fail_on_error(&portal)?;
    if let Some(notice) = portal.notice() {
        println!("{}", notice.message);
    }
    Ok(())
}

fn handle_status(backend: &dyn Backend, config: &Config, args: StatusArgs) -> Result<()> {
    let mut portal = run_search(backend, &config.export.dir, &args.query)?;
    let count = portal.results().len();
    if args.index == 0 || args.index > count {
        bail!(
            "result index {} out of range (search returned {} results)",
            args.index,
            count
        );
    }
    let index = args.index - 1;

    let command = if args.mark {
        PortalCommand::MarkContacted(index)
    } else if args.reset {
        PortalCommand::Reset(index)
    } else {
        println!("{}", portal.card_status(index).badge());
        return Ok(());
    };

    let effects = portal.dispatch(command, Instant::now());
    worker::run_inline(&mut portal, backend, &config.export.dir, effects);
    fail_on_error(&portal)?;
    if let Some(notice) = portal.notice() {
        println!("{}", notice.message);
    }
    println!("{}", portal.card_status(index).badge());
    Ok(())
}

/// Submit `query` and wait for the results and their statuses.
fn run_search(backend: &dyn Backend, export_dir: &Path, query: &str) -> Result<Portal> {
    let mut portal = Portal::new();
    portal.dispatch(PortalCommand::Input(query.to_string()), Instant::now());
    let effects = portal.dispatch(PortalCommand::Submit, Instant::now());
    fail_on_error(&portal)?;
    worker::run_inline(&mut portal, backend, export_dir, effects);
    fail_on_error(&portal)?;
    Ok(portal)
}

fn fail_on_error(portal: &Portal) -> Result<()> {
    match portal.error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}
