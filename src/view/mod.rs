//! TUI rendering and terminal management (impure shell)

pub mod events_table;
mod layout;
pub mod live_indicator;
pub mod status_panel;
mod styles;

pub use layout::{render_layout, status_summary};
pub use live_indicator::LiveIndicator;
pub use styles::{ColorConfig, MonitorStyles};

use crate::config::{ConfigError, KeyBindings, ResolvedConfig};
use crate::gateway::{FetchWorker, HttpGateway, Job, WorkerStopped};
use crate::logging::LoggingError;
use crate::model::FetchError;
use crate::state::AppState;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Longest the loop blocks on terminal input before checking the workers.
const MAX_POLL_WAIT: Duration = Duration::from_millis(50);

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Backend gateway could not be created
    #[error("Gateway error: {0}")]
    Gateway(#[from] FetchError),

    /// A fetch worker thread went away
    #[error(transparent)]
    Worker(#[from] WorkerStopped),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    app_state: AppState,
    key_bindings: KeyBindings,
    /// Runs event-log pages, one at a time.
    stream_worker: FetchWorker,
    /// Runs link listings, link snapshots and version lookups.
    status_worker: FetchWorker,
    /// Event rows visible at the last draw (for paging).
    viewport_rows: usize,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Spawns the fetch workers, then sets up the terminal in raw mode with
    /// alternate screen.
    pub fn new(config: &ResolvedConfig) -> Result<Self, TuiError> {
        let gateway = HttpGateway::new(&config.url, config.request_timeout())?;
        let stream_worker = FetchWorker::spawn("events", gateway.clone())?;
        let status_worker = FetchWorker::spawn("status", gateway)?;

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let app_state = AppState::new(
            config.url.clone(),
            config.initial_filter(),
            config.stream_policy(),
            config.status_interval(),
        );

        Ok(Self {
            terminal,
            app_state,
            key_bindings: KeyBindings::default(),
            stream_worker,
            status_worker,
            viewport_rows: 0,
        })
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Run the main event loop
    ///
    /// Returns when the user quits.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.app_state.start(Instant::now());
        self.pump(Instant::now())?;
        self.draw()?;

        loop {
            let mut dirty = false;

            if event::poll(self.poll_timeout(Instant::now()))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Resize(width, height) => {
                        debug!(width, height, "terminal resized");
                        dirty = true;
                    }
                    _ => {}
                }
            }

            dirty |= self.pump(Instant::now())?;
            if dirty {
                self.draw()?;
            }
        }
    }

    /// How long to wait for terminal input before the next scheduled job.
    fn poll_timeout(&self, now: Instant) -> Duration {
        self.app_state
            .next_wake()
            .map_or(MAX_POLL_WAIT, |at| at.saturating_duration_since(now))
            .min(MAX_POLL_WAIT)
    }

    /// Handle keyboard input
    ///
    /// Returns true if the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Some(action) = self.key_bindings.get(key) {
            debug!(?action, "key action");
            self.app_state
                .handle_action(action, self.viewport_rows, Instant::now());
        }
        self.app_state.should_quit
    }

    /// Merge finished jobs and submit whatever is due.
    ///
    /// Returns true if any completion changed the state.
    fn pump(&mut self, now: Instant) -> Result<bool, TuiError> {
        let mut changed = false;

        while let Some(completion) = self.stream_worker.try_recv()? {
            changed = true;
            let follow_up = self.app_state.apply_completion(completion, now);
            self.dispatch(follow_up)?;
        }
        while let Some(completion) = self.status_worker.try_recv()? {
            changed = true;
            let follow_up = self.app_state.apply_completion(completion, now);
            self.dispatch(follow_up)?;
        }

        let due = self.app_state.due_jobs(now);
        self.dispatch(due)?;

        Ok(changed)
    }

    fn dispatch(&self, jobs: Vec<Job>) -> Result<(), TuiError> {
        for job in jobs {
            match job {
                Job::Events(_) => self.stream_worker.submit(job)?,
                Job::Links | Job::LinkInfo(_) | Job::Version => self.status_worker.submit(job)?,
            }
        }
        Ok(())
    }

    /// Render the current state
    fn draw(&mut self) -> Result<(), TuiError> {
        let state = &self.app_state;
        let mut rows = self.viewport_rows;
        self.terminal
            .draw(|frame| rows = layout::render_layout(frame, state))?;
        self.viewport_rows = rows;
        Ok(())
    }
}

// ===== Test Helpers =====
// DO NOT use these in production code.

#[cfg(test)]
#[allow(dead_code)] // Not all helpers used in every test
impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Create TuiApp for testing with workers backed by `gateway`.
    ///
    /// **WARNING**: This is for testing only. Do not use in production code.
    pub(crate) fn new_for_test<G>(terminal: Terminal<B>, app_state: AppState, gateway: G) -> Self
    where
        G: crate::gateway::FetchGateway + Clone + Send + 'static,
    {
        Self {
            terminal,
            app_state,
            key_bindings: KeyBindings::default(),
            stream_worker: FetchWorker::spawn("test-events", gateway.clone())
                .expect("spawn stream worker"),
            status_worker: FetchWorker::spawn("test-status", gateway)
                .expect("spawn status worker"),
            viewport_rows: 0,
        }
    }

    pub(crate) fn app_state(&self) -> &AppState {
        &self.app_state
    }

    pub(crate) fn app_state_mut(&mut self) -> &mut AppState {
        &mut self.app_state
    }

    pub(crate) fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

/// Run the monitor until the user quits.
///
/// Handles terminal setup and always restores the terminal afterwards.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_monitor(config: &ResolvedConfig) -> Result<(), TuiError> {
    let mut app = TuiApp::new(config)?;
    info!(url = %config.url, "monitor started");

    // Run the app and ensure cleanup happens even on error
    let result = app.run();

    // Always restore terminal state
    restore_terminal()?;

    info!("monitor stopped");
    result
}

/// Restore terminal to normal state
///
/// Disables raw mode and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
