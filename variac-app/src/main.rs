mod cli;
mod config;
mod plot;
mod profile_csv;
mod session;
mod ui;

use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event as CrosstermEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use variac_drivers::{SimulatedFeedback, SimulatedServo};
use variac_runtime::ProfileRunner;

use cli::Cli;
use config::load_config;
use session::{Action, Session, SessionStatus};

type SimSession = Session<SimulatedServo, SimulatedFeedback>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_to_file(&cli.log_file)?;

    let config = load_config(cli.config.as_deref()).context("load configuration")?;
    info!("Starting with {:?}", config);

    let runner = ProfileRunner::with_config(
        SimulatedServo::new(),
        SimulatedFeedback::new(config.feedback),
        None,
        config.runner,
    );
    let mut session = Session::new(runner, config.ui);

    if let Some(path) = cli.profile.as_deref() {
        let loaded = session.load_from(path);
        if cli.headless {
            loaded.with_context(|| format!("load profile {}", path.display()))?;
        }
    }

    if cli.headless {
        return run_headless(&mut session);
    }

    let mut terminal = init_terminal()?;
    let run_result = run_app_loop(&mut terminal, &mut session);
    let restore_result = restore_terminal(&mut terminal);
    restore_result?;
    run_result
}

fn init_tracing_to_file(log_path: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("open log file {}", log_path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

/// Run the loaded profile to completion, logging each step
fn run_headless(session: &mut SimSession) -> Result<()> {
    if !session.can_start() {
        bail!("headless mode needs a non-empty --profile");
    }

    session.runner().set_step_callback(|target, feedback| {
        info!("Step: target {:.2} V, feedback {:.2} V", target, feedback);
    });

    session.apply(Action::StartPause);
    if let SessionStatus::Error(message) = session.status() {
        bail!("failed to start profile: {message}");
    }

    let interval = session.config().poll_interval();
    while *session.status() == SessionStatus::Running {
        thread::sleep(interval);
        session.poll(Instant::now());
    }

    println!(
        "Profile complete: {} samples over {:.2}s",
        session.plot().len(),
        session.plot().elapsed_s()
    );
    Ok(())
}

fn run_app_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut SimSession,
) -> Result<()> {
    let interval = session.config().poll_interval();

    loop {
        session.poll(Instant::now());
        terminal.draw(|frame| ui::render(frame, session))?;
        if session.should_quit() {
            break;
        }

        if event::poll(interval)? {
            if let CrosstermEvent::Key(key) = event::read()? {
                if let Some(action) = ui::action_for(key, session.prompt().is_some()) {
                    session.apply(action);
                }
            }
        }
    }

    session.apply(Action::Stop);
    Ok(())
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
