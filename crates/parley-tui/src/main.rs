use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use parley_core::extractor::{self, PageSource};
use parley_core::settings::{self, read_api_key};
use parley_core::{
    ApiKeyForm, Config, ConversationExtractor, FileSettingsStore, MemorySettingsStore,
    MessageType, SaveStatus, SettingsStore, SystemClipboard,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::Tui;

#[derive(Parser)]
#[command(name = "parley")]
#[command(version)]
#[command(about = "Terminal assistant for drafting marketplace messages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Conversation page to read context from (file path or URL)
    #[arg(short, long, global = true)]
    page: Option<String>,

    /// Path to an alternate config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Chat model to request completions from
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Category selected when the panel opens (e.g. price-negotiation)
    #[arg(short = 't', long = "type", global = true)]
    message_type: Option<MessageType>,

    /// Keep the API key in memory only for this run
    #[arg(long)]
    ephemeral: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the OpenAI API key
    SetKey {
        /// The API key
        key: String,
    },
    /// Print the stored API key, masked
    ShowKey,
    /// Print the messages extracted from the conversation page
    Extract,
    /// List chat models that work with the assistant
    Models,
    /// Write the effective configuration to the config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Warning: file logging disabled: {}", e);
    }

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load_from(&config_path).context("Failed to load config")?;

    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(page) = cli.page {
        config.page = Some(page);
    }
    if let Some(message_type) = cli.message_type {
        config.message_type = message_type;
    }

    match cli.command {
        Some(Commands::SetKey { key }) => set_key(&key),
        Some(Commands::ShowKey) => show_key(),
        Some(Commands::Extract) => extract(&config).await,
        Some(Commands::Models) => {
            for model in parley_core::CompletionClient::list_models() {
                println!("  • {}", model);
            }
            Ok(())
        }
        Some(Commands::Init) => {
            config.save_to(&config_path)?;
            println!("Config written to {}", config_path.display());
            Ok(())
        }
        None => {
            let store: Arc<dyn SettingsStore> = if cli.ephemeral {
                Arc::new(MemorySettingsStore::new())
            } else {
                Arc::new(FileSettingsStore::open_default()?)
            };
            run_tui(&config, store).await
        }
    }
}

fn init_tracing() -> Result<()> {
    let log_dir = Config::config_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    // The terminal belongs to the UI, so logs only go to a daily file
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("parley")
        .filename_suffix("log")
        .max_log_files(7)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    Ok(())
}

/// Save through the settings-screen form.
fn set_key(key: &str) -> Result<()> {
    let store = FileSettingsStore::open_default()?;
    let mut form = ApiKeyForm::new();
    form.input = key.to_string();

    match form.save(&store, Instant::now()) {
        SaveStatus::Success => {
            println!("API Key saved: {}", form.saved_display.unwrap_or_default());
            Ok(())
        }
        _ => anyhow::bail!(
            "Failed to save API Key (key is blank or {} is not writable)",
            store.path().display()
        ),
    }
}

fn show_key() -> Result<()> {
    let store = FileSettingsStore::open_default()?;
    match read_api_key(&store)? {
        Some(key) => println!("Saved Key: {}", settings::mask_secret(&key)),
        None => println!("No API Key saved. Run `parley set-key <KEY>`."),
    }
    Ok(())
}

async fn extract(config: &Config) -> Result<()> {
    let page = config
        .page
        .as_deref()
        .context("No conversation page given. Pass --page <file|url>.")?;
    let source = PageSource::parse(page);
    let extractor = ConversationExtractor::from_config(config)?;

    let messages = extractor::extract_from(&extractor, &source).await?;
    if messages.is_empty() {
        println!("No messages found in {}", source);
    }
    for (i, message) in messages.iter().enumerate() {
        println!("{}. {}", i + 1, message);
    }
    Ok(())
}

async fn run_tui(config: &Config, store: Arc<dyn SettingsStore>) -> Result<()> {
    let page_source = config.page.as_deref().map(PageSource::parse);
    let mut app = App::new(config, store, Arc::new(SystemClipboard::new()), page_source)?;
    tracing::info!(model = %config.model, "starting assistant");

    tui::install_panic_hook();
    let mut tui = Tui::enter()?;

    // Read the conversation once on startup
    app.refresh_context().await;

    let result = async {
        while !app.should_quit {
            tui.terminal.draw(|frame| ui::render(&mut app, frame))?;
            match tui.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui.exit()?;
    result
}
