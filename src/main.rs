//! Main entry point for hyprchat.
//!
//! Initializes logging and the TUI terminal, loads configuration from the
//! environment, runs the chat loop and restores the terminal on exit.

use hyprchat::app::App;
use hyprchat::config::Config;
use hyprchat::utils;

use anyhow::Result;
use tracing::info;

use crate::utils::guard::ExitGuard;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging before anything else
    let _log_guard = utils::logger::init_logging();

    let config = Config::from_env();
    info!(
        "Config loaded: api key {}, endpoint {:?}, model {}",
        if config.api_key.is_empty() { "missing" } else { "present" },
        config.endpoint,
        config.model
    );

    let mut terminal = ratatui::init();

    // Restores the terminal on both normal exit and panic
    let _exit = ExitGuard::new(ratatui::restore);

    let mut app = App::new(config);
    // draw 1st frame
    app.draw(&mut terminal)?;
    app.run(&mut terminal).await
}
