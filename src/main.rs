//! DreamPi Link Cable Installer
//!
//! Provisions a Raspberry Pi with the DreamPi Link Cable web server over
//! SSH and creates local shortcuts to its web interface.

mod app;
mod constants;
mod net;
mod remote;
mod scripts;
mod settings;
mod shortcuts;
mod ui;
mod workflow;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppMode};
use workflow::WorkflowMessage;

/// DreamPi Link Cable Installer
#[derive(Parser)]
#[command(name = "dreampi-installer")]
#[command(version = "1.0.0")]
#[command(about = "Installs the DreamPi Link Cable web server on a Raspberry Pi over SSH")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the installation against the saved Pi configuration
    Install,
    /// Remove the service and its files from the Pi
    Uninstall,
    /// Check that the Pi's SSH port is reachable
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging to file
    let log_dir = constants::data_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "dreampi-installer.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("DreamPi installer starting");

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Install) => {
            run_tui(AppMode::Install(app::InstallState::new_running())).await
        }
        Some(Commands::Uninstall) => {
            run_tui(AppMode::Uninstall(app::UninstallState::new_running())).await
        }
        Some(Commands::Test) => {
            run_tui(AppMode::TestConnection(app::TestState::new_running())).await
        }
        None => run_tui(AppMode::MainMenu { selected: 0 }).await,
    }
}

async fn run_tui(initial_mode: AppMode) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(initial_mode);

    // Create workflow message channel
    let (msg_tx, mut msg_rx) =
        mpsc::channel::<WorkflowMessage>(constants::WORKFLOW_CHANNEL_SIZE);
    app.set_message_sender(msg_tx);

    // Run the app
    let result = run_app(&mut terminal, &mut app, &mut msg_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Print log path
    println!("Screen log: {}", app.screen_log_path.display());

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        return Err(err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    msg_rx: &mut mpsc::Receiver<WorkflowMessage>,
) -> Result<()> {
    // Start any workflow the initial mode requires (CLI entry)
    app.start_initial_command()?;

    // Create async event stream for responsive input
    let mut event_stream = EventStream::new();

    loop {
        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        let timeout = Duration::from_millis(constants::EVENT_POLL_TIMEOUT_MS);

        tokio::select! {
            biased;  // Prioritize in order: keys, workflow messages, timeout

            // Terminal key events (instant response)
            Some(Ok(event)) = event_stream.next() => {
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code)?;
                    }
                }
            }
            // Output from workflow tasks
            Some(msg) = msg_rx.recv() => {
                app.handle_workflow_message(msg)?;
            }
            // Timeout for spinner animation and redraw
            _ = tokio::time::sleep(timeout) => {}
        }

        // Update spinner animation
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
