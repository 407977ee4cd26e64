use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crossterm::{
    event::{EnableFocusChange, EnableMouseCapture, EventStream},
    execute,
    terminal::{enable_raw_mode, EnterAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::feed::{follow_tape, read_tape, FeedUpdate};
use crate::render::{load_image, LoadRequest, RenderMode};
use crate::ui::events::AppEvent;
use crate::ui::terminal_guard::TerminalGuard;
use crate::ui::viewer::Viewer;

/// Where points come from
#[derive(Debug, Clone)]
pub struct TapeSource {
    pub path: PathBuf,
    /// Keep tailing the file after the initial read
    pub follow: bool,
}

/// Terminal host for the viewer
pub struct App {
    config: Config,
    viewer: Viewer,
    source: TapeSource,
    /// Event channel sender
    event_tx: mpsc::UnboundedSender<AppEvent>,
    /// Event channel receiver
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(config: Config, source: TapeSource, mode: RenderMode) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let label = source
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.path.display().to_string());
        Self {
            viewer: Viewer::new(config.clone(), mode).with_source(label),
            config,
            source,
            event_tx,
            event_rx,
        }
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut guard = TerminalGuard::new();
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        self.start_feed();
        let result = self.event_loop(&mut terminal).await;

        guard.cleanup()?;
        terminal.show_cursor()?;
        result
    }

    fn start_feed(&self) {
        let (feed_tx, mut feed_rx) = mpsc::channel::<FeedUpdate>(16);
        let path = self.source.path.clone();
        let events = self.event_tx.clone();

        // Forward feed updates into the app channel
        let forward = events.clone();
        tokio::spawn(async move {
            while let Some(update) = feed_rx.recv().await {
                if forward.send(AppEvent::Feed(update)).is_err() {
                    break;
                }
            }
        });

        if self.source.follow {
            let poll_interval = self.config.feed.poll_interval();
            tokio::spawn(async move {
                let error = follow_tape(path, poll_interval, feed_tx)
                    .await
                    .err()
                    .map(|e| e.to_string());
                let _ = events.send(AppEvent::FeedStopped { error });
            });
        } else {
            tokio::spawn(async move {
                let loaded = tokio::task::spawn_blocking(move || read_tape(&path)).await;
                let error = match loaded {
                    Ok(Ok(tape)) => {
                        let _ = feed_tx.send(FeedUpdate::Points(tape.points())).await;
                        None
                    }
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(e) => Some(e.to_string()),
                };
                let _ = events.send(AppEvent::FeedStopped { error });
            });
        }
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut input = EventStream::new();
        let mut ticker = tokio::time::interval(self.config.playback.tick_rate());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut dirty = true;

        loop {
            if dirty {
                terminal.draw(|f| self.viewer.draw(f))?;
                dirty = false;
            }
            self.spawn_loads();

            tokio::select! {
                _ = ticker.tick() => {
                    dirty |= self.viewer.tick();
                }

                maybe_event = input.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            self.handle_app_event(AppEvent::Input(event));
                            dirty = true;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Terminal input error");
                        }
                        None => self.viewer.quit(),
                    }
                }

                Some(event) = self.event_rx.recv() => {
                    self.handle_app_event(event);
                    dirty = true;
                }
            }

            if self.viewer.should_quit() {
                break;
            }
        }

        Ok(())
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(event) => self.viewer.handle_event(&event),
            AppEvent::Feed(update) => self.viewer.apply_feed(update),
            AppEvent::FeedStopped { error: Some(error) } => {
                tracing::error!(%error, path = %self.source.path.display(), "Feed stopped");
            }
            AppEvent::FeedStopped { error: None } => {
                tracing::debug!("Feed finished");
            }
            AppEvent::ImageLoaded { key, result } => self.viewer.on_image_loaded(key, result),
        }
    }

    /// Decode requested images off the UI task
    fn spawn_loads(&mut self) {
        for LoadRequest { key, image } in self.viewer.take_load_requests() {
            let events = self.event_tx.clone();
            tokio::spawn(async move {
                let label = image.label();
                let result = match tokio::task::spawn_blocking(move || load_image(&image)).await {
                    Ok(result) => result.map(Arc::new),
                    Err(e) => {
                        tracing::warn!(image = %label, error = %e, "Image load task failed");
                        return;
                    }
                };
                let _ = events.send(AppEvent::ImageLoaded { key, result });
            });
        }
    }
}
