//! Passkeep - a terminal client for the passkeep vault service.
//!
//! This binary wires the core library to a keyboard-driven ratatui
//! interface: sign in or register, then browse, create, edit, and delete
//! credential entries.

mod app;
mod config;
mod route;
mod ui;
mod utils;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use passkeep_core::{CredentialStore, SessionStore, VaultClient};

use app::{App, AppState};
use config::Config;
use route::View;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Initialize the tracing subscriber, writing to a daily log file under
/// the data directory.
///
/// The terminal owns stdout/stderr while the TUI runs, so logs go to disk.
/// The returned guard must stay alive for the duration of the program or
/// buffered lines are lost.
fn init_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = Config::data_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "passkeep.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--export" {
        return export_entries().await;
    }

    let _guard = init_tracing()?;
    info!("Passkeep starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new()?;

    // A restored session lands straight on the dashboard
    if app.view == View::Dashboard {
        app.activate_dashboard();
    }

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Passkeep shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Apply results of completed vault calls
        app.drain_events();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// Export
// ============================================================================

/// Dump all credential entries to stdout as JSON.
///
/// Reuses the saved session when one exists; otherwise signs in
/// interactively with prompts on stderr so stdout stays clean JSON.
async fn export_entries() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let data_dir = Config::data_dir()?;
    let session = SessionStore::open(&data_dir)?;
    let client = VaultClient::new(config.endpoint(), session.clone())?;

    let data = match session.restore() {
        Some(data) => data,
        None => {
            let (email, password) = prompt_credentials(&config)?;
            eprintln!("Signing in...");
            let data = client
                .sign_in(&email, &password)
                .await
                .map_err(|e| anyhow::anyhow!("Sign-in failed: {}", e))?;
            session.establish(&data)?;
            data
        }
    };

    eprintln!("Fetching entries for {}...", data.username);
    let entries = client
        .list_credentials(&data.user_id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list entries: {}", e))?;

    let json = serde_json::to_string_pretty(&entries)?;
    println!("{}", json);

    eprintln!("Done! {} entries exported.", entries.len());
    Ok(())
}

/// Collect sign-in credentials on the terminal, preferring the stored
/// keychain password when the user accepts it
fn prompt_credentials(config: &Config) -> Result<(String, String)> {
    let default_email = std::env::var("PASSKEEP_EMAIL")
        .ok()
        .filter(|e| !e.is_empty())
        .or_else(|| config.last_email.clone());

    let email = match &default_email {
        Some(default) => {
            eprint!("Email [{}]: ", default);
            io::stderr().flush()?;
            let entered = read_line()?;
            if entered.is_empty() {
                default.clone()
            } else {
                entered
            }
        }
        None => {
            eprint!("Email: ");
            io::stderr().flush()?;
            let entered = read_line()?;
            if entered.is_empty() {
                anyhow::bail!("An email is required");
            }
            entered
        }
    };

    if let Ok(password) = std::env::var("PASSKEEP_PASSWORD") {
        if !password.is_empty() {
            return Ok((email, password));
        }
    }

    if CredentialStore::has_credentials(&email) {
        eprint!("Use stored password? [Y/n]: ");
        io::stderr().flush()?;
        let answer = read_line()?;
        if answer.is_empty() || answer.eq_ignore_ascii_case("y") {
            let password = CredentialStore::get_password(&email)?;
            return Ok((email, password));
        }
    }

    let password = rpassword::prompt_password("Password: ")?;
    Ok((email, password))
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
