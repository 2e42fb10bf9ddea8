// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Periodic status sync with visibility-driven pause and resume.
//!
//! A single background task owns all poller state. It reacts to four things:
//! shutdown, commands from the [`Poller`] handle, completion of the in-flight
//! request, and the refresh timer. Every reaction runs to completion without
//! awaiting, so the render sink is never written concurrently.
//!
//! Starting a sync cancels and drops the previous in-flight request, so a
//! superseded response can never reach the sink.

use std::future::{pending, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, Sleep};
use tokio_util::sync::CancellationToken;

use crate::format::{TimestampFormatter, UNKNOWN_PLACEHOLDER};
use crate::protocol::ServerSnapshot;
use crate::render::{PollerStatus, RenderSink, Slot};
use crate::source::{FetchError, StatusSource};

/// Refresh interval used when none (or a non-positive one) is configured.
pub const DEFAULT_REFRESH_MINUTES: f64 = 30.0;

/// Shortest allowed refresh interval.
pub const MIN_REFRESH_MINUTES: f64 = 1.0;

/// Note shown while a sync is in progress.
pub const SYNCING_NOTE: &str = "Sincronizando…";

/// Errors building a [`PollerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid status endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("unsupported endpoint scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
}

/// Resolve configured refresh minutes to the effective value.
///
/// Missing, non-finite or non-positive values fall back to
/// [`DEFAULT_REFRESH_MINUTES`]; anything shorter than a minute is raised to
/// [`MIN_REFRESH_MINUTES`].
#[must_use]
pub fn effective_refresh_minutes(configured: Option<f64>) -> f64 {
    match configured {
        Some(minutes) if minutes.is_finite() && minutes > 0.0 => minutes.max(MIN_REFRESH_MINUTES),
        _ => DEFAULT_REFRESH_MINUTES,
    }
}

/// Immutable poller configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    endpoint: String,
    refresh_minutes: f64,
    formatter: TimestampFormatter,
}

impl PollerConfig {
    pub fn new(endpoint: impl Into<String>, refresh_minutes: Option<f64>) -> Result<Self, ConfigError> {
        let endpoint = endpoint.into();
        let url = Url::parse(&endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }

        Ok(Self {
            endpoint,
            refresh_minutes: effective_refresh_minutes(refresh_minutes),
            formatter: TimestampFormatter::default(),
        })
    }

    /// Replace the timestamp formatter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: TimestampFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Effective refresh interval in minutes.
    #[must_use]
    pub fn refresh_minutes(&self) -> f64 {
        self.refresh_minutes
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.refresh_minutes * 60.0).unwrap_or(Duration::MAX)
    }

    #[must_use]
    pub fn formatter(&self) -> &TimestampFormatter {
        &self.formatter
    }
}

/// Visibility of the surface the card is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug)]
enum Command {
    Visibility(Visibility),
    SyncNow,
}

/// Handle to a running status poller.
///
/// The poller runs in a background task and syncs immediately on spawn.
/// Dropping the handle shuts it down.
pub struct Poller {
    command_tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<PollerStatus>,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("status", &*self.status_rx.borrow())
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl Poller {
    /// Spawn the poller task. Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn<S, R>(config: PollerConfig, source: S, sink: R) -> Self
    where
        S: StatusSource + Send + Sync + 'static,
        R: RenderSink + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(PollerStatus::Loading);
        let cancel_token = CancellationToken::new();

        info!(
            "Starting status poller for {} (every {} min)",
            config.endpoint(),
            config.refresh_minutes()
        );

        let task = SyncTask {
            config,
            source: Arc::new(source),
            sink,
            status: PollerStatus::Loading,
            status_tx,
            is_active: true,
            timer: None,
            request: None,
            command_rx,
            cancel_token: cancel_token.clone(),
        };
        tokio::spawn(task.run());

        Self {
            command_tx,
            status_rx,
            cancel_token,
        }
    }

    /// Report a visibility change. Hidden pauses polling, visible resumes it
    /// with an immediate sync.
    pub fn set_visibility(&self, visibility: Visibility) {
        let _ = self.command_tx.send(Command::Visibility(visibility));
    }

    /// Start a sync now, superseding any in-flight one.
    pub fn sync_now(&self) {
        let _ = self.command_tx.send(Command::SyncNow);
    }

    /// Last-known status.
    #[must_use]
    pub fn status(&self) -> PollerStatus {
        *self.status_rx.borrow()
    }

    /// Watch status transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollerStatus> {
        self.status_rx.clone()
    }

    /// Stop the poller, cancelling any in-flight request.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

type FetchFuture = Pin<Box<dyn Future<Output = Result<Value, FetchError>> + Send>>;

struct InFlight {
    token: CancellationToken,
    response: FetchFuture,
}

struct SyncTask<S, R> {
    config: PollerConfig,
    source: Arc<S>,
    sink: R,
    status: PollerStatus,
    status_tx: watch::Sender<PollerStatus>,
    is_active: bool,
    timer: Option<Pin<Box<Sleep>>>,
    request: Option<InFlight>,
    command_rx: mpsc::UnboundedReceiver<Command>,
    cancel_token: CancellationToken,
}

impl<S, R> SyncTask<S, R>
where
    S: StatusSource + Send + Sync + 'static,
    R: RenderSink,
{
    async fn run(mut self) {
        self.sync_status();

        loop {
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    info!("Status poller shut down");
                    return;
                }

                command = self.command_rx.recv() => match command {
                    Some(Command::Visibility(visibility)) => self.on_visibility_change(visibility),
                    Some(Command::SyncNow) => self.sync_status(),
                    None => {
                        debug!("Poller handle dropped");
                        return;
                    }
                },

                outcome = settle(&mut self.request) => self.finish_sync(outcome),

                () = fire(&mut self.timer) => {
                    self.timer = None;
                    self.sync_status();
                }
            }
        }
    }

    fn sync_status(&mut self) {
        self.set_status(PollerStatus::Loading);
        self.sink.set_slot(Slot::Note, SYNCING_NOTE);
        self.sink.present();

        if let Some(previous) = self.request.take() {
            debug!("Superseding in-flight status request");
            previous.token.cancel();
        }

        let token = self.cancel_token.child_token();
        let fetch_token = token.clone();
        let source = Arc::clone(&self.source);
        let response: FetchFuture = Box::pin(async move { source.fetch(fetch_token).await });

        self.request = Some(InFlight { token, response });
    }

    fn finish_sync(&mut self, outcome: Result<Value, FetchError>) {
        self.request = None;

        match outcome {
            Ok(payload) => self.render_snapshot(&ServerSnapshot::from_payload(&payload)),
            Err(FetchError::Cancelled) => {
                debug!("Status request cancelled");
                self.set_status(PollerStatus::Paused);
                self.sink.present();
            }
            Err(e) => {
                warn!("Could not sync server status: {e}");
                self.render_failure();
            }
        }

        self.schedule_next_sync();
    }

    fn render_snapshot(&mut self, snapshot: &ServerSnapshot) {
        let formatter = *self.config.formatter();
        let players = snapshot.players();
        let updated = if snapshot.updated_at.is_some() {
            formatter.format(snapshot.last_updated())
        } else {
            formatter.now()
        };

        self.sink.set_slot(Slot::Players, &players);
        self.sink.set_slot(Slot::Updated, &updated);
        self.sink
            .set_slot(Slot::Note, &format!("Última sincronización · {updated}"));
        self.set_status(PollerStatus::Ready);
        self.sink.present();

        info!(
            "Server status synced: {} players on {} ({})",
            players,
            snapshot.name.as_deref().unwrap_or("unnamed server"),
            snapshot.display_address()
        );
    }

    fn render_failure(&mut self) {
        let now = self.config.formatter().now();
        let note = format!(
            "No se pudo sincronizar. Reintento automático en {} min.",
            self.config.refresh_minutes()
        );

        self.sink.set_slot(Slot::Players, UNKNOWN_PLACEHOLDER);
        self.sink.set_slot(Slot::Updated, &now);
        self.sink.set_slot(Slot::Note, &note);
        self.set_status(PollerStatus::Error);
        self.sink.present();
    }

    fn schedule_next_sync(&mut self) {
        self.timer = None;
        if !self.is_active {
            return;
        }

        let interval = self.config.refresh_interval();
        debug!("Next status sync in {} seconds", interval.as_secs());
        self.timer = Some(Box::pin(sleep(interval)));
    }

    fn on_visibility_change(&mut self, visibility: Visibility) {
        match visibility {
            Visibility::Hidden => {
                self.is_active = false;
                self.timer = None;

                // Only the state attribute changes; the slots keep their text.
                if let Some(request) = self.request.take() {
                    request.token.cancel();
                    self.set_status(PollerStatus::Paused);
                    self.sink.present();
                }
                info!("Status polling paused");
            }
            Visibility::Visible => {
                self.is_active = true;
                info!("Status polling resumed");
                self.sync_status();
            }
        }
    }

    fn set_status(&mut self, status: PollerStatus) {
        self.status = status;
        self.sink.set_state(status);
        self.status_tx.send_replace(status);
    }
}

async fn settle(request: &mut Option<InFlight>) -> Result<Value, FetchError> {
    match request {
        Some(in_flight) => (&mut in_flight.response).await,
        None => pending().await,
    }
}

async fn fire(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}
