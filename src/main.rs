//! coin-tui - A terminal market table for cryptocurrencies
//!
//! Fetches a listing in the background and shows it as a sortable, paged
//! table. Uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod browser;
mod cli;
mod component;
mod components;
mod config;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::cli::Cli;
use crate::component::Component;
use crate::config::Config;
use crate::tui::Tui;
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::Event;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_guard = logging::init()?;

    let mut config = Config::load();
    config.apply_cli(&cli);
    if cli.save_config {
        let path = config.save()?;
        tracing::info!(path = %path.display(), "Saved config");
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log = %log_guard.path.display(),
        "Starting coin-tui"
    );

    let mut app = App::new(&config);
    if let Some(column) = &cli.sort {
        app.engine
            .set_sort_from_arg(column)
            .with_context(|| format!("invalid --sort value '{}'", column))?;
    }

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    app.init()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app, &config);

    // Cleanup terminal
    tui.exit()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "Exited with error");
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App, config: &Config) -> Result<()> {
    while !app.should_quit {
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                tracing::error!(error = %e, "Draw failed");
            }
        })?;

        if let Some(url) = app.pending_browser_url.take() {
            app.status_message = Some(match browser::open_url(&url, config.browser.as_deref()) {
                Ok(()) => format!("Opened {}", url),
                Err(e) => {
                    tracing::warn!(url, error = %e, "Could not open browser");
                    format!("Could not open browser: {}", e)
                }
            });
        }

        if let Some(event) = tui.next_event()? {
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Mouse(mouse) => app.handle_mouse_event(mouse)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Action might produce a follow-up action
            let mut current_action = action;
            while let Some(a) = current_action {
                tracing::debug!(action = %a, "Dispatching");
                current_action = app.update(a)?;
            }
        } else {
            // No event - tick polls the background fetch
            app.update(Action::Tick)?;
        }
    }

    Ok(())
}
