//! Syllabot terminal chat.
//!
//! Ask questions about a course syllabus and watch the replies type out.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use syllabot_client::{AssistantService, HttpAssistant, HttpClient, DEFAULT_CHAT_PATH};
use syllabot_core::ChatDocument;

mod app;
mod backend;
mod config;
mod event;
mod prefs;
mod state;
mod ui;

use app::App;
use backend::BackendTiming;
use config::ChatConfig;
use event::{BackendCommand, UiEvent};
use prefs::FileStore;

#[derive(Parser)]
#[command(name = "syllabot")]
#[command(about = "Chat with a course syllabus")]
#[command(version)]
struct Cli {
    /// Log file (filter with RUST_LOG)
    #[arg(long, global = true, default_value = "/tmp/syllabot.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat screen for a document
    Chat {
        /// Backend base URL
        #[arg(short, long, default_value = "http://localhost:5000")]
        endpoint: String,

        /// Route of the chat endpoint
        #[arg(long, default_value = DEFAULT_CHAT_PATH)]
        chat_path: String,

        /// Identifier of the uploaded document
        #[arg(short = 'd', long)]
        document_id: String,

        /// File with the extracted document text
        #[arg(short, long)]
        content_file: PathBuf,

        /// Title shown in the header
        #[arg(short, long)]
        title: Option<String>,

        /// Milliseconds between revealed characters
        #[arg(long, default_value = "10")]
        tick_ms: u64,

        /// Milliseconds to wait before revealing a reply
        #[arg(long, default_value = "1000")]
        reply_delay_ms: u64,

        /// Milliseconds to wait before the welcome message
        #[arg(long, default_value = "1000")]
        greeting_delay_ms: u64,

        /// Per-request timeout in seconds (waits indefinitely if unset)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Preferences file
        #[arg(long)]
        state_file: Option<PathBuf>,
    },

    /// Check that the backend is reachable
    Check {
        /// Backend base URL
        #[arg(short, long, default_value = "http://localhost:5000")]
        endpoint: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Write logs to a file to avoid terminal interference
    if let Ok(file) = std::fs::File::create(&cli.log_file) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("syllabot_tui=debug,syllabot_core=debug,syllabot_client=debug")
        });
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_env_filter(filter)
            .with_ansi(false)
            .init();
    }

    match cli.command {
        Commands::Chat {
            endpoint,
            chat_path,
            document_id,
            content_file,
            title,
            tick_ms,
            reply_delay_ms,
            greeting_delay_ms,
            timeout_secs,
            state_file,
        } => {
            let defaults = ChatConfig::default();
            let config = ChatConfig {
                endpoint,
                chat_path,
                tick_interval: Duration::from_millis(tick_ms),
                reply_delay: Duration::from_millis(reply_delay_ms),
                greeting_delay: Duration::from_millis(greeting_delay_ms),
                request_timeout: timeout_secs.map(Duration::from_secs),
                state_file: state_file.unwrap_or(defaults.state_file),
            };

            let content = std::fs::read_to_string(&content_file)?;
            let mut document = ChatDocument::new(document_id, content);
            if let Some(title) = title {
                document = document.with_title(title);
            }

            run_chat(config, document)?;
        }
        Commands::Check { endpoint } => {
            run_check(&endpoint)?;
        }
    }

    Ok(())
}

fn run_chat(config: ChatConfig, document: ChatDocument) -> Result<(), Box<dyn Error>> {
    info!(
        endpoint = %config.endpoint,
        chat_path = %config.chat_path,
        document_id = %document.id,
        "Starting chat"
    );

    let http = match config.request_timeout {
        Some(timeout) => HttpClient::with_timeout(&config.endpoint, timeout)?,
        None => HttpClient::new(&config.endpoint),
    };
    let assistant: Arc<dyn AssistantService> =
        Arc::new(HttpAssistant::new(http).with_chat_path(config.chat_path.clone()));

    let timing = BackendTiming {
        tick_interval: config.tick_interval,
        reply_delay: config.reply_delay,
        greeting_delay: config.greeting_delay,
    };

    // Create channels for UI <-> backend communication
    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(100);
    let (cmd_tx, cmd_rx) = mpsc::channel::<BackendCommand>(100);

    // Build the backend runtime before entering raw mode
    let rt = tokio::runtime::Runtime::new()?;
    let bg_handle = std::thread::spawn(move || {
        rt.block_on(backend::run_backend(assistant, timing, ui_tx, cmd_rx));
    });

    let prefs = Box::new(FileStore::open(&config.state_file));

    // Initialize terminal (enters alternate screen, enables raw mode)
    let terminal = ratatui::init();

    let mut app = App::new(document, prefs, ui_rx, cmd_tx);
    let result = app.run(terminal);

    // Restore terminal (exits alternate screen, disables raw mode)
    ratatui::restore();

    // Dropping the app closes the command channel if Quit was never sent
    drop(app);
    if bg_handle.join().is_err() {
        error!("Backend thread panicked");
    }

    info!("Chat shutdown complete");

    result.map_err(|e| e.into())
}

fn run_check(endpoint: &str) -> Result<(), Box<dyn Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let http = HttpClient::new(endpoint);

    match rt.block_on(http.health()) {
        Ok(true) => {
            println!("{} is healthy", http.base_url());
            Ok(())
        }
        Ok(false) => Err(format!("{} responded but is not healthy", http.base_url()).into()),
        Err(e) => Err(format!("{} is unreachable: {}", http.base_url(), e).into()),
    }
}
