use log::{debug, warn};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{AppConfig, ConfigError, load_config_from_path};

// Editors often write a file several times in a row
const DEBOUNCE: Duration = Duration::from_millis(250);

/// Watches a configuration file for changes and reloads it when modified
pub struct ConfigWatcher {
    rx: Receiver<Result<Event, notify::Error>>,
    _watcher: RecommendedWatcher, // keep watcher alive while watching
    config_path: PathBuf,
    last_event_time: Instant,
}

impl ConfigWatcher {
    /// Start watching `config_path`.
    pub fn new(config_path: impl AsRef<Path>) -> Result<Self, notify::Error> {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
        watcher.watch(config_path.as_ref(), RecursiveMode::NonRecursive)?;

        Ok(Self {
            rx,
            _watcher: watcher,
            config_path: config_path.as_ref().to_path_buf(),
            last_event_time: Instant::now(),
        })
    }

    /// Drain pending file events and reload the config if it was modified.
    ///
    /// # Returns
    ///
    /// `Some(result)` if a reload was attempted, `None` if nothing changed or the
    /// watcher has died.
    pub fn check_for_changes(&mut self) -> Option<Result<AppConfig, ConfigError>> {
        let mut should_reload = false;

        loop {
            match self.rx.try_recv() {
                Ok(Ok(event)) => {
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        debug!("Config file event: {:?}", event.kind);
                        should_reload = true;
                        self.last_event_time = Instant::now();
                    }
                }
                Ok(Err(e)) => {
                    warn!("Error watching config file: {e}");
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Config watcher channel disconnected");
                    return None;
                }
            }
        }

        if !should_reload {
            return None;
        }

        let since_last_event = self.last_event_time.elapsed();
        if since_last_event < DEBOUNCE {
            thread::sleep(DEBOUNCE - since_last_event);
        }

        Some(load_config_from_path(&self.config_path))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
