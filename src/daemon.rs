use crate::api::{ApiClient, TelemetrySource};
use crate::config::watcher::ConfigWatcher;
use crate::config::{AppConfig, LogLevel, find_config_file};
use crate::core::{GamingTier, SystemReport};
use crate::fan;
use crate::monitor;
use crate::util::error::{ApiError, AppError};
use log::{LevelFilter, debug, error, info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

// Upper bound on a single sleep so Ctrl-C is noticed promptly
const MAX_SLEEP_SLICE: Duration = Duration::from_secs(1);

/// Simplified system state used to decide what is worth logging at info level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SystemState {
    gaming_tier: Option<GamingTier>,
    fan_anomaly: bool,
}

impl SystemState {
    fn of(report: &SystemReport) -> Self {
        Self {
            gaming_tier: report.gaming.best_tier,
            fan_anomaly: report.fan_anomaly.has_anomaly,
        }
    }
}

/// Last known-good analysis plus the health of the polling loop.
#[derive(Debug, Default)]
pub struct PollState {
    report: Option<SystemReport>,
    last_error: Option<String>,
    consecutive_failures: u32,
}

/// What gets written to the report file.
#[derive(Serialize)]
struct ReportFile<'a> {
    report: Option<&'a SystemReport>,
    last_error: Option<&'a str>,
    consecutive_failures: u32,
    stale: bool,
}

impl PollState {
    pub fn report(&self) -> Option<&SystemReport> {
        self.report.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn record_failure(&mut self, what: &str, e: &ApiError) {
        self.consecutive_failures += 1;
        self.last_error = Some(format!("{what}: {e}"));
        if self.report.is_some() {
            error!("{what} failed, keeping last known-good result: {e}");
        } else {
            error!("{what} failed and no earlier result is available: {e}");
        }
    }

    /// Run one full analysis cycle. Returns true when the system state changed.
    pub fn poll(&mut self, source: &dyn TelemetrySource) -> bool {
        match monitor::collect_system_report(source) {
            Ok(report) => {
                let previous = self.report.as_ref().map(SystemState::of);
                let current = SystemState::of(&report);

                debug!(
                    "Analysis: gaming='{}' ({}%), fan anomaly={}",
                    report.gaming.label, report.gaming.score, report.fan_anomaly.has_anomaly
                );
                if report.fan_anomaly.has_anomaly {
                    warn!("{}", report.fan_anomaly.message);
                }

                self.report = Some(report);
                self.last_error = None;
                self.consecutive_failures = 0;

                let changed = previous != Some(current);
                if changed {
                    info!("System state changed to: {current:?}");
                }
                changed
            }
            Err(e) => {
                self.record_failure("Collecting system report", &e);
                false
            }
        }
    }

    /// Refresh only the fan readings of the last report.
    pub fn poll_fans(&mut self, source: &dyn TelemetrySource) {
        let Some(report) = self.report.as_mut() else {
            debug!("No analysis yet, skipping fan-only poll");
            return;
        };

        match source.fans() {
            Ok(fans) => {
                let anomaly = fan::detect_anomaly(&fans);
                if anomaly.has_anomaly && !report.fan_anomaly.has_anomaly {
                    warn!("{}", anomaly.message);
                } else if !anomaly.has_anomaly && report.fan_anomaly.has_anomaly {
                    info!("Cooling anomaly cleared");
                }
                report.inventory.fans = fans;
                report.fan_anomaly = anomaly;
                self.last_error = None;
                self.consecutive_failures = 0;
            }
            Err(e) => self.record_failure("Fetching fan data", &e),
        }
    }

    fn write_report_file(&self, path: &str) -> Result<(), std::io::Error> {
        let snapshot = ReportFile {
            report: self.report.as_ref(),
            last_error: self.last_error.as_deref(),
            consecutive_failures: self.consecutive_failures,
            stale: self.consecutive_failures > 0,
        };

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush()
    }
}

const fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warning => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
    }
}

/// Run the polling daemon until interrupted
pub fn run_daemon(mut config: AppConfig, verbose: bool) -> Result<(), AppError> {
    let effective_log_level = if verbose {
        LogLevel::Debug
    } else {
        config.daemon.log_level
    };

    // Update the log level filter without re-initializing the logger
    log::set_max_level(level_filter(effective_log_level));

    info!("Starting rigscope daemon...");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received shutdown signal, exiting...");
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| AppError::Generic(format!("Error setting Ctrl-C handler: {e}")))?;

    let mut client = ApiClient::new(&config.api)?;
    info!(
        "Polling {} every {}s (fans every {}s)",
        client.base_url(),
        config.daemon.poll_interval_sec,
        config.daemon.fan_poll_interval_sec
    );

    if let Some(report_path) = &config.daemon.report_file_path {
        info!("Reports will be written to: {report_path}");
    }

    let mut config_watcher = match find_config_file() {
        Some(path) => match ConfigWatcher::new(&path) {
            Ok(watcher) => {
                info!("Watching config file: {}", watcher.config_path().display());
                Some(watcher)
            }
            Err(e) => {
                warn!("Failed to initialize config file watcher: {e}");
                None
            }
        },
        None => {
            warn!("No config file found to watch for changes.");
            None
        }
    };

    let mut state = PollState::default();
    let mut next_full_poll = Instant::now();
    let mut next_fan_poll =
        next_full_poll + Duration::from_secs(config.daemon.fan_poll_interval_sec);

    while running.load(Ordering::SeqCst) {
        if let Some(watcher) = &mut config_watcher {
            match watcher.check_for_changes() {
                Some(Ok(new_config)) => {
                    info!("Config file changed, updating configuration");
                    match ApiClient::new(&new_config.api) {
                        Ok(new_client) => {
                            client = new_client;
                            config = new_config;
                            log::set_max_level(level_filter(if verbose {
                                LogLevel::Debug
                            } else {
                                config.daemon.log_level
                            }));
                            next_full_poll = Instant::now();
                        }
                        Err(e) => error!("Keeping previous API settings: {e}"),
                    }
                }
                Some(Err(e)) => error!("Error loading new configuration: {e}"),
                None => {}
            }
        }

        let now = Instant::now();
        let mut polled = false;

        if now >= next_full_poll {
            state.poll(&client);
            polled = true;
            next_full_poll = now + Duration::from_secs(config.daemon.poll_interval_sec);
            next_fan_poll = now + Duration::from_secs(config.daemon.fan_poll_interval_sec);
        } else if now >= next_fan_poll {
            state.poll_fans(&client);
            polled = true;
            next_fan_poll = now + Duration::from_secs(config.daemon.fan_poll_interval_sec);
        }

        if polled && state.consecutive_failures() > 0 {
            debug!(
                "{} consecutive failed polls, last error: {}",
                state.consecutive_failures(),
                state.last_error().unwrap_or_default()
            );
        }

        if polled {
            if let Some(report_path) = &config.daemon.report_file_path {
                if let Err(e) = state.write_report_file(report_path) {
                    error!("Failed to write report file: {e}");
                }
            }
        }

        let next_due = next_full_poll.min(next_fan_poll);
        let sleep_time = next_due
            .saturating_duration_since(Instant::now())
            .min(MAX_SLEEP_SLICE);
        if !sleep_time.is_zero() {
            std::thread::sleep(sleep_time);
        }
    }

    match state.report() {
        Some(report) => info!("Daemon stopped, last verdict: {}", report.gaming.label),
        None => info!("Daemon stopped"),
    }
    Ok(())
}
