//! Tolmach command-line entry point.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use tolmach::cli::{Args, Commands, ConfigAction, HistoryAction};
use tolmach::config::Config;
use tolmach::controller::{ActionOutcome, Controller};
use tolmach::display;
use tolmach::error::TolmachError;
use tolmach::extract::{HttpExtractor, UploadedFile};
use tolmach::history::HistoryStore;
use tolmach::search::{HistoryFilter, TypeFacet};
use tolmach::session;
use tolmach::translate::TranslatorFactory;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    config.apply_env_overrides();

    match args.command {
        Commands::Config { action } => match action {
            ConfigAction::Init { output } => {
                config.translate.api_key = None;
                config.save_to_file(&output)?;
                println!("Wrote default configuration to {}", output.display());
            }
            ConfigAction::Show => {
                let mut shown = config.clone();
                if shown.translate.api_key.is_some() {
                    shown.translate.api_key = Some("<hidden>".to_string());
                }
                println!("{}", toml::to_string_pretty(&shown)?);
            }
        },
        Commands::History { action } => {
            let mut history = HistoryStore::load(&config.history.path);
            match action {
                HistoryAction::List { query, kind } => {
                    let filter = HistoryFilter::new(query, TypeFacet::parse_optional(&kind)?);
                    println!("{}", display::history_table(&filter.apply(history.records())));
                }
                HistoryAction::Show { id } => {
                    let record = history.get(id).ok_or(TolmachError::NotFound(id))?;
                    println!("{}", display::record(record));
                }
                HistoryAction::Remove { id } => {
                    if history.remove(id) {
                        println!("Removed record {}", id);
                    } else {
                        println!("No record {}", id);
                    }
                }
                HistoryAction::Clear => {
                    let count = history.len();
                    history.clear();
                    println!("Removed {} records", count);
                }
            }
        }
        Commands::Extract { input } => {
            let mut controller = build_controller(&config)?;
            let file = UploadedFile::from_path(&input)?;
            if !file.is_accepted() {
                return Err(TolmachError::UnsupportedFormat(file.name).into());
            }
            controller.select_file(file);

            let pb = display::spinner("Analyzing file...");
            let outcome = controller.extract().await;
            pb.finish_and_clear();

            if let Err(e) = outcome {
                if let Some(alert) = &controller.state().alert {
                    eprintln!("{}", alert);
                }
                return Err(e.into());
            }
            print_result(&controller);
        }
        Commands::Translate { text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .map_err(|_| TolmachError::FileNotFound(path.display().to_string()))?,
                (None, None) => String::new(),
            };

            let mut controller = build_controller(&config)?;
            controller.set_text(text);

            let pb = display::spinner("Translating...");
            let outcome = controller.translate().await?;
            pb.finish_and_clear();

            if outcome == ActionOutcome::Skipped {
                println!("Nothing to translate.");
            } else {
                print_result(&controller);
            }
        }
        Commands::Session => {
            let mut controller = build_controller(&config)?;
            session::run(&mut controller).await?;
        }
    }

    Ok(())
}

fn build_controller(config: &Config) -> Result<Controller> {
    let extractor = HttpExtractor::new(config.extract.clone())?;
    let translator = TranslatorFactory::create_translator(config.translate.clone())?;
    let history = HistoryStore::load(&config.history.path);
    Ok(Controller::new(Box::new(extractor), translator, history))
}

fn print_result(controller: &Controller) {
    let state = controller.state();
    println!("Text:\n  {}\n", state.editable_text);
    if let Some(translations) = &state.translations {
        println!("Translations:\n{}", display::translations(translations));
    }
    if let Some(record) = controller.history().records().first() {
        println!("Saved as history record {}", record.id);
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".tolmach").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation
    let file_appender = rolling::daily(&log_dir, "tolmach.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so stdout stays clean for results
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("tolmach.log").display());

    Ok(())
}
