//! Full-screen terminal dashboard.

mod app;
mod controls;
mod layout;
mod style;

use std::{
    io::{self, Stdout},
    time::Duration,
};

use chrono::Local;
use crossterm::{
    cursor::Show,
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::task::block_in_place;

use self::app::App;
use crate::{api::DataSource, core::snapshot::Snapshot, prelude::*};

/// How long to wait for a key press before redrawing the clock.
const POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Run the dashboard until the user quits, refreshing the data every `refresh`.
#[instrument(skip_all, fields(refresh = ?refresh))]
pub async fn run(source: &dyn DataSource, refresh: Duration) -> Result {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let mut app = App::new(source.region(), refresh);
    event_loop(&mut terminal, &mut app, source).await
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    source: &dyn DataSource,
) -> Result {
    loop {
        if app.is_refresh_due() {
            app.is_loading = true;
            terminal.draw(|frame| layout::render(frame, app, Local::now()))?;
            let now = Local::now();
            let snapshot = Snapshot::fetch(source, now).await;
            app.update(snapshot, now);
        }

        terminal.draw(|frame| layout::render(frame, app, Local::now()))?;

        if block_in_place(|| event::poll(POLL_TIMEOUT))?
            && let Event::Key(key) = event::read()?
        {
            controls::handle_key(app, key);
        }
        if app.quit {
            return Ok(());
        }
    }
}

/// Raw mode and the alternate screen, restored on drop even when the dashboard fails.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable the raw mode")?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen)
            .context("failed to enter the alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}
