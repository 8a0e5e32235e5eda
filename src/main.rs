//! user-admin binary entry point.
//!
//! Resolves configuration, installs file logging, initializes the terminal in
//! raw mode, runs the TUI event loop and restores the terminal state on exit.
//!
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use user_admin::cli::Cli;
use user_admin::config::{self, Config};
use user_admin::{app, logging};

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: configure, run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Also writes the key file when --remember-key is given.
    let config = Config::from_cli(&cli).context("invalid configuration")?;

    let log_path = cli.log_file.clone().unwrap_or_else(config::default_log_path);
    logging::init(&config, &log_path)?;
    info!(environment = config.environment().as_str(), base_url = config.base_url(), "starting");

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, config);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err:#}");
    }
    Ok(())
}
