//! Async driver around [`Controller`].
//!
//! A session owns the controller inside a single task. Callers talk to it
//! through a [`SessionHandle`]: events go in over a channel, state snapshots
//! come out through a `watch`. Fetches, geolocation and the location-hint
//! timer run as child tasks that post their outcome back as events, so the
//! controller is never touched from more than one place.

use anyhow::{Result, anyhow};
use std::{fmt::Debug, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::{AbortHandle, JoinHandle, JoinSet},
};
use tracing::{debug, info};

use crate::{
    controller::{Command, Controller, Event},
    geolocation::Geolocator,
    provider::WeatherFetcher,
    state::{Theme, ViewState},
};

/// How long the "use current location" hint stays up.
pub const LOCATION_HINT_TIMEOUT: Duration = Duration::from_secs(6);

/// Boundary adapter for the theme: reflects it onto any presentation
/// context shared outside [`ViewState`].
pub trait ThemeSink: Send + Sync + Debug {
    fn apply_theme(&self, theme: Theme);
}

#[derive(Debug, Default)]
pub struct NoopThemeSink;

impl ThemeSink for NoopThemeSink {
    fn apply_theme(&self, _theme: Theme) {}
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub hint_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            hint_timeout: LOCATION_HINT_TIMEOUT,
        }
    }
}

enum Input {
    Event(Event, Option<oneshot::Sender<ViewState>>),
    Shutdown,
}

struct Session {
    controller: Controller,
    fetcher: Arc<dyn WeatherFetcher>,
    geolocator: Arc<dyn Geolocator>,
    theme_sink: Arc<dyn ThemeSink>,
    inputs: mpsc::UnboundedSender<Input>,
    state_tx: watch::Sender<ViewState>,
    tasks: JoinSet<()>,
    hint_timer: Option<AbortHandle>,
}

/// Starts a session on the current tokio runtime.
pub fn start(
    controller: Controller,
    fetcher: Arc<dyn WeatherFetcher>,
    geolocator: Arc<dyn Geolocator>,
    theme_sink: Arc<dyn ThemeSink>,
    options: SessionOptions,
) -> SessionHandle {
    let (inputs, rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(controller.state().clone());

    theme_sink.apply_theme(controller.state().theme);

    let mut session = Session {
        controller,
        fetcher,
        geolocator,
        theme_sink,
        inputs: inputs.clone(),
        state_tx,
        tasks: JoinSet::new(),
        hint_timer: None,
    };
    session.start_hint_timer(options.hint_timeout);

    let task = tokio::spawn(session.run(rx));

    SessionHandle {
        inputs,
        state: state_rx,
        task: Some(task),
    }
}

impl Session {
    fn start_hint_timer(&mut self, timeout: Duration) {
        let inputs = self.inputs.clone();
        let handle = self.tasks.spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = inputs.send(Input::Event(Event::HintExpired, None));
        });
        self.hint_timer = Some(handle);
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Input>) {
        loop {
            tokio::select! {
                input = rx.recv() => match input {
                    Some(Input::Event(event, ack)) => {
                        self.apply(event);
                        if let Some(ack) = ack {
                            let _ = ack.send(self.controller.state().clone());
                        }
                    }
                    Some(Input::Shutdown) | None => break,
                },
                Some(_) = self.tasks.join_next(), if !self.tasks.is_empty() => {}
            }
        }

        // Nothing may post into a torn-down session.
        self.tasks.abort_all();
        info!("session closed");
    }

    fn apply(&mut self, event: Event) {
        if matches!(event, Event::RequestGeolocation) {
            if let Some(timer) = self.hint_timer.take() {
                timer.abort();
            }
        }

        let command = self.controller.handle(event);
        self.state_tx.send_replace(self.controller.state().clone());

        if let Some(command) = command {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Fetch { seq, query } => {
                debug!(seq, query = %query, "spawning fetch cycle");
                let fetcher = Arc::clone(&self.fetcher);
                let inputs = self.inputs.clone();
                self.tasks.spawn(async move {
                    let result = fetcher.fetch(&query).await;
                    let _ = inputs.send(Input::Event(Event::FetchCompleted { seq, result }, None));
                });
            }
            Command::Geolocate { seq } => {
                debug!(seq, "spawning geolocation lookup");
                let geolocator = Arc::clone(&self.geolocator);
                let inputs = self.inputs.clone();
                self.tasks.spawn(async move {
                    let event = match geolocator.request_location().await {
                        Ok(coords) => Event::GeolocationResolved { seq, coords },
                        Err(error) => Event::GeolocationFailed { seq, error },
                    };
                    let _ = inputs.send(Input::Event(event, None));
                });
            }
            Command::ApplyTheme(theme) => self.theme_sink.apply_theme(theme),
        }
    }
}

/// Caller side of a running session. Dropping it tears the session down.
#[derive(Debug)]
pub struct SessionHandle {
    inputs: mpsc::UnboundedSender<Input>,
    state: watch::Receiver<ViewState>,
    task: Option<JoinHandle<()>>,
}

impl Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Event(event, _) => f.debug_tuple("Event").field(event).finish(),
            Input::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl SessionHandle {
    /// Queue an event without waiting for it to be applied.
    pub fn send(&self, event: Event) -> Result<()> {
        self.inputs
            .send(Input::Event(event, None))
            .map_err(|_| anyhow!("Session has already shut down"))
    }

    /// Apply an event and return the state right after it was handled.
    pub async fn dispatch(&self, event: Event) -> Result<ViewState> {
        let (ack, done) = oneshot::channel();
        self.inputs
            .send(Input::Event(event, Some(ack)))
            .map_err(|_| anyhow!("Session has already shut down"))?;

        done.await
            .map_err(|_| anyhow!("Session shut down before handling the event"))
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Wait until the state satisfies `predicate` and return that state.
    pub async fn wait_for(&self, predicate: impl FnMut(&ViewState) -> bool) -> Result<ViewState> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(predicate)
            .await
            .map_err(|_| anyhow!("Session shut down while waiting for state"))?;
        Ok(state.clone())
    }

    /// Wait until no fetch cycle is loading.
    pub async fn wait_idle(&self) -> Result<ViewState> {
        self.wait_for(|s| !s.loading).await
    }

    /// Stop the event loop and every task it owns.
    pub async fn shutdown(mut self) {
        let _ = self.inputs.send(Input::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
