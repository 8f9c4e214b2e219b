use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::File;
use std::io;
use std::path::PathBuf;

use vanish::auth::{AuthStore, FileAuthStore};
use vanish::config::Config;
use vanish::tui::{AppContext, TuiApp};

/// Self-destructing chat in the terminal
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the config file (defaults to ~/.config/vanish/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where log output goes, the terminal is taken by the UI
    #[arg(long, default_value = "vanish.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Clear the saved session before starting
    #[arg(long)]
    logout: bool,
}

fn init_logging(cli: &Cli) -> Result<()> {
    let file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file: {}", cli.log_file.display()))?;
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let (config, config_path) = Config::load(cli.config.clone())?;
    let session_path = config.session_path(&config_path);
    tracing::info!("Using session file {}", session_path.display());

    let mut auth = FileAuthStore::open(&session_path);
    if cli.logout {
        auth.set_authenticated(false)?;
    }

    let mut app = TuiApp::new(AppContext::new(config, Box::new(auth)));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = app.run(&mut terminal);

    // Restore the terminal before reporting any error from the app loop
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor()?;

    result
}
