//! Interactive touch panel in the terminal.
//!
//! The loop polls the terminal for input every tick, feeds the current
//! "finger" (left mouse button) into the [`Controller`], and paints the
//! display snapshot when it changed. It handles:
//!
//! - Terminal setup and restoration
//! - Translating mouse and key events
//! - Driving the controller at a fixed tick

pub mod input;
pub mod screen;

pub use screen::TerminalDisplay;

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    ExecutableCommand,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::info;

use lightdeck_core::{Controller, DeviceApi, Point};

use crate::config::Config;
use input::Action;

/// Controller tick.
pub const TICK: Duration = Duration::from_millis(10);

type PanelController<A> = Controller<A, TerminalDisplay<CrosstermBackend<io::Stdout>>>;

/// Set up the terminal for panel rendering.
///
/// Enables raw mode, mouse capture, and switches to the alternate screen buffer.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
pub fn restore_terminal() -> Result<()> {
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the panel until the user quits.
pub async fn run(config: &Config) -> Result<()> {
    let client = config.client().context("Failed to create service client")?;
    let store = config.device_store();
    info!(
        lights = store.len(),
        enabled = store.enabled_indices().count(),
        "Starting panel"
    );

    let terminal = setup_terminal()?;
    let display = TerminalDisplay::new(terminal, store.len());
    let mut controller = Controller::new(client, display, store, config.timings);

    let result = run_event_loop(&mut controller).await;

    restore_terminal()?;
    info!("Panel stopped");
    result
}

/// Main event loop for the panel.
async fn run_event_loop<A: DeviceApi>(controller: &mut PanelController<A>) -> Result<()> {
    controller.start(Instant::now()).await;
    let mut touch: Option<Point> = None;

    loop {
        controller.display_mut().flush()?;

        if event::poll(TICK)? {
            let size = controller.display().size();
            match input::handle_event(event::read()?, size) {
                Action::Quit => break,
                Action::Refresh => {
                    info!("Manual refresh");
                    controller.refresh_all(Instant::now()).await;
                }
                Action::Touch(point) => touch = Some(point),
                Action::Lift => touch = None,
                Action::Resize(columns, rows) => controller.display_mut().resize(columns, rows),
                Action::None => {}
            }
        }

        controller.tick(Instant::now(), touch).await;
    }

    Ok(())
}
