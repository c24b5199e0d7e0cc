//! Vigil TUI - idle-session manager terminal front end
//!
//! Keeps a portal session alive only while the user is at the terminal:
//! after a period of inactivity a countdown is shown, and if nobody
//! responds the session is logged out and its stored data cleared.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vigil_tui::app::TuiConfig;
use vigil_tui::commands::{self, LoginDetails};
use vigil_tui::App;

/// Log file name under the data directory
const LOG_FILE_NAME: &str = "vigil-tui.log";

#[derive(Parser)]
#[command(name = "vigil-tui")]
#[command(about = "Idle-session manager for the banking portal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the dashboard with idle-session management (default)
    Run,

    /// Store a session for a bearer token
    Login {
        /// Bearer token issued by the portal
        #[arg(long)]
        token: String,

        /// User ID (defaults to the token subject)
        #[arg(long)]
        user_id: Option<String>,

        /// Customer ID
        #[arg(long)]
        customer_id: Option<String>,

        /// Email address
        #[arg(long)]
        email: Option<String>,
    },

    /// Show the stored session
    Status,

    /// Log out: notify the server and clear the stored session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = TuiConfig::load();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_tui(&config).await,
        Commands::Login {
            token,
            user_id,
            customer_id,
            email,
        } => commands::login(
            &config,
            &token,
            LoginDetails {
                user_id,
                customer_id,
                email,
            },
        ),
        Commands::Status => commands::status(&config),
        Commands::Logout => commands::logout(&config).await,
    }
}

/// Log to a file so the terminal UI is not disturbed
fn init_logging() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("vigil_tui=info".parse()?)
        .add_directive("vigil_session=info".parse()?);

    let Some(dir) = TuiConfig::data_dir() else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(false))
            .with(filter)
            .init();
        return Ok(());
    };

    fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();
    Ok(())
}

/// Terminal setup, main loop and restoration
async fn run_tui(config: &TuiConfig) -> Result<()> {
    // Set up panic hook to restore terminal on crash
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let mut app = App::new(config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.shutdown().await;

    if let Err(e) = &result {
        tracing::error!("Application error: {}", e);
    }
    result
}
