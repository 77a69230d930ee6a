mod accounts;
mod app;
mod board;
mod config;
mod document;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use board::Board;
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal account board: pay accounts and print the total")]
struct Args {
    /// Use this config file instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pay an account by name without opening the TUI (repeatable)
    #[arg(short, long)]
    pay: Vec<String>,

    /// Print the sum of all balances and exit
    #[arg(short, long)]
    total: bool,

    /// Print balances and total as JSON
    #[arg(long)]
    json: bool,

    /// Also send the total as a desktop notification
    #[arg(long)]
    notify: bool,
}

impl Args {
    /// Any of these flags runs without the TUI
    fn is_headless(&self) -> bool {
        self.total || self.json || self.notify || !self.pay.is_empty()
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_default(),
    };

    // Handle CLI-only commands
    if args.is_headless() {
        return run_headless(&args, &config);
    }

    run_tui(&config)
}

fn run_headless(args: &Args, config: &AppConfig) -> Result<()> {
    let mut board = Board::from_config(config)?;
    if board.ledger.is_empty() {
        tracing::warn!("No accounts configured");
    }

    for name in &args.pay {
        board.pay_by_name(name)?;
    }

    let sum = board.print_total()?;

    if args.json {
        println!("{}", serde_json::to_string(&board.to_json())?);
    } else if args.total {
        println!("{}", sum);
    }

    if args.notify || (args.total && config.notifications) {
        notify("tally", &sum)?;
    }
    Ok(())
}

fn run_tui(config: &AppConfig) -> Result<()> {
    // Create app state before touching the terminal so errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                tracing::warn!("Key handler failed: {:#}", e);
                                app.set_status(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        app.tick();
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("accessories-calculator")
        .show()?;
    Ok(())
}
