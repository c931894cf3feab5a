/// Main TUI application
///
/// Owns the terminal, forwards key presses to the monitor, and redraws from
/// whatever view the monitor last published. Refresh cycles run on their own
/// task so a slow daemon never blocks input handling.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::interval;

use crate::core::{DockerClient, HistoryStore, Monitor};
use crate::screens::dashboard::{self, DashboardState, LogsPane};
use crate::utils::{AppConfig, DEFAULT_LOG_TAIL, MAX_HISTORY_WINDOW, MIN_HISTORY_WINDOW};

/// Step applied by the +/- window keys
const WINDOW_STEP: usize = 5;

pub struct App {
    monitor: Arc<Monitor<DockerClient>>,
    client: DockerClient,
    config: AppConfig,
    refresh_notify: Arc<Notify>,
    state: DashboardState,
}

impl App {
    /// Connect to the daemon and set up the monitor. An unreachable daemon
    /// is fatal here; per-container failures later are not.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let client = DockerClient::connect().await?;
        let history = Arc::new(HistoryStore::new(config.history_window));
        let monitor = Arc::new(Monitor::new(client.clone(), history, config.max_workers));
        monitor.set_auto_refresh(config.auto_refresh);

        Ok(Self {
            monitor,
            client,
            config,
            refresh_notify: Arc::new(Notify::new()),
            state: DashboardState::new(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Background refresh task: ticks on the configured interval and on
        // manual triggers. refresh() itself is single-flight, so a manual
        // trigger during a cycle waits instead of overlapping.
        let monitor = Arc::clone(&self.monitor);
        let notify = Arc::clone(&self.refresh_notify);
        let refresh_secs = self.config.refresh_secs;
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(refresh_secs));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if monitor.auto_refresh() {
                            monitor.refresh().await;
                        }
                    }
                    _ = notify.notified() => {
                        monitor.refresh().await;
                    }
                }
            }
        });

        // First cycle right away so the dashboard is not empty
        self.refresh_notify.notify_one();

        let res = self.run_ui_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        // Persist preferences changed during the session
        self.config.auto_refresh = self.monitor.auto_refresh();
        self.config.history_window = self.monitor.history().window();
        let _ = self.config.save();

        res
    }

    async fn run_ui_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            let view = self.monitor.view().await;
            let row_count = dashboard::flattened_rows(&view).len();
            self.state.clamp_selection(row_count);

            let phase = self.monitor.phase();
            let auto_refresh = self.monitor.auto_refresh();
            let history = Arc::clone(self.monitor.history());

            terminal.draw(|f| {
                dashboard::render(f, &view, &history, &self.state, phase, auto_refresh);
            })?;

            // Handle input (with timeout)
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Esc => {
                            if self.state.logs.is_some() {
                                self.state.logs = None;
                            } else {
                                return Ok(());
                            }
                        }
                        KeyCode::Up => self.state.select_prev(),
                        KeyCode::Down => self.state.select_next(row_count),
                        KeyCode::Char('r') => self.refresh_notify.notify_one(),
                        KeyCode::Char('a') => {
                            self.monitor.toggle_auto_refresh();
                        }
                        KeyCode::Char('c') => self.monitor.clear_history(),
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            let window = self.monitor.history().window();
                            self.monitor
                                .set_window((window + WINDOW_STEP).min(MAX_HISTORY_WINDOW));
                        }
                        KeyCode::Char('-') => {
                            let window = self.monitor.history().window();
                            self.monitor.set_window(
                                window.saturating_sub(WINDOW_STEP).max(MIN_HISTORY_WINDOW),
                            );
                        }
                        KeyCode::Char('x') => self.restart_selected(&view).await,
                        KeyCode::Char('l') => self.open_logs(&view).await,
                        _ => {}
                    }
                }
            }
        }
    }

    /// Restart the selected container in the background; the next cycle
    /// picks up its new state.
    async fn restart_selected(&self, view: &crate::core::DashboardView) {
        let rows = dashboard::flattened_rows(view);
        if let Some(row) = rows.get(self.state.selected) {
            let client = self.client.clone();
            let id = row.info.id.clone();
            let notify = Arc::clone(&self.refresh_notify);
            tokio::spawn(async move {
                if client.restart(&id).await.is_ok() {
                    notify.notify_one();
                }
            });
        }
    }

    async fn open_logs(&mut self, view: &crate::core::DashboardView) {
        let rows = dashboard::flattened_rows(view);
        let Some(row) = rows.get(self.state.selected) else {
            return;
        };

        let text = match self.client.logs(&row.info.id, DEFAULT_LOG_TAIL).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
            Err(err) => format!("Failed to fetch logs: {}", err),
        };

        self.state.logs = Some(LogsPane {
            container: row.info.name.clone(),
            text,
        });
    }
}
