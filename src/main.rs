use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result};
use notestore::{Alert, AlertSink, Config, FileKv, Locale, Note, NoteStore, NotesApp, SystemClock};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notestore")]
#[command(about = "NoteStore CLI - Short local notes, newest first")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: <config dir>/notestore/notestore.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the notes (overrides the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Display locale: pt-br or en-us (overrides the config file)
    #[arg(short, long)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all notes, newest first
    List,

    /// Save a new note
    Add { text: String },

    /// Replace the text of a note
    Edit { id: String, text: String },

    /// Delete a note
    Delete { id: String },

    /// Delete every note
    Clear,

    /// Show how many notes there are
    Count,
}

/// Prints alerts to stderr
struct CliAlertSink;

impl AlertSink for CliAlertSink {
    fn alert(&self, alert: &Alert) {
        eprintln!("{} {}", format!("{}:", alert.title).red().bold(), alert.message);
    }
}

type App = NotesApp<FileKv, SystemClock, CliAlertSink>;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(locale) = cli.locale {
        config.store.locale = locale;
    }

    let kv = FileKv::open(&config.data_dir)
        .with_context(|| format!("Failed to open note directory {}", config.data_dir.display()))?;
    let store = NoteStore::new(kv, SystemClock, config.store.clone());
    let mut app: App = NotesApp::new(store, CliAlertSink);

    // Don't overwrite notes we failed to read, except when asked to clear them
    if app.start().await.is_err() && !matches!(cli.command, Commands::Clear) {
        process::exit(1);
    }

    let ok = match cli.command {
        Commands::List => {
            print_list(&app);
            true
        }
        Commands::Add { text } => {
            app.set_text(text);
            let ok = app.save().await.is_ok();
            if ok {
                if let Some(note) = app.notes().first() {
                    println!("Saved note {}", note.id.cyan());
                }
            }
            ok
        }
        Commands::Edit { id, text } => {
            let ok = app.select(&id).is_ok() && {
                app.set_text(text);
                app.save().await.is_ok()
            };
            if ok {
                println!("Updated note {}", id.cyan());
            }
            ok
        }
        Commands::Delete { id } => {
            let ok = app.delete(&id).await.is_ok();
            if ok {
                println!("{}", app.header());
            }
            ok
        }
        Commands::Clear => {
            let ok = app.clear_all().await.is_ok();
            if ok {
                println!("{}", app.header());
            }
            ok
        }
        Commands::Count => {
            println!("{}", app.header());
            true
        }
    };

    if !ok {
        process::exit(1);
    }

    Ok(())
}

fn print_list(app: &App) {
    println!("{}", app.header().bold());

    if app.notes().is_empty() {
        println!("{}", app.empty_message().dimmed());
        return;
    }

    for note in app.notes() {
        print_note(note);
    }
}

fn print_note(note: &Note) {
    println!();
    println!("{}  {}", note.stamp().dimmed(), note.id.cyan());
    println!("{}", note.text);
}
