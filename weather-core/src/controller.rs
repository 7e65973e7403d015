//! The view state machine.
//!
//! [`Controller`] is the only code that mutates [`ViewState`]. It is
//! synchronous: every [`Event`] is applied immediately and may yield a
//! [`Command`] for the caller (normally [`crate::session`]) to execute.
//! Completions come back in as events, so all I/O stays outside.

use tracing::debug;

use crate::{
    LocationQuery, WeatherError, WeatherReport,
    state::{Theme, ViewState},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user edited the query text.
    QueryChanged(String),
    ClearQuery,
    Submit,
    Refresh,
    RequestGeolocation,
    /// Outcome of lookup `seq`; ignored unless it is still pending.
    GeolocationResolved {
        seq: u64,
        coords: String,
    },
    GeolocationFailed {
        seq: u64,
        error: WeatherError,
    },
    FetchCompleted {
        seq: u64,
        result: Result<WeatherReport, WeatherError>,
    },
    ToggleTheme,
    ToggleUnit,
    ToggleAdvanced,
    HintExpired,
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start fetch cycle `seq`. Its result must come back as
    /// [`Event::FetchCompleted`] with the same `seq`.
    Fetch { seq: u64, query: LocationQuery },
    /// Start geolocation lookup `seq`. The outcome must come back with the
    /// same `seq`.
    Geolocate { seq: u64 },
    /// Reflect the theme onto whatever presentation context is shared.
    ApplyTheme(Theme),
}

#[derive(Debug, Clone, Default)]
pub struct Controller {
    state: ViewState,
    latest_seq: u64,
    geo_seq: u64,
    pending_geolocation: Option<u64>,
}

impl Controller {
    pub fn new(state: ViewState) -> Self {
        Self {
            state,
            latest_seq: 0,
            geo_seq: 0,
            pending_geolocation: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Sequence number of the most recently started cycle, `0` before any.
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn handle(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::QueryChanged(text) => {
                self.state.query = text;
                None
            }
            Event::ClearQuery => {
                self.state.query.clear();
                None
            }
            // Submit and refresh share the same guard: nothing happens
            // without a query.
            Event::Submit | Event::Refresh => self.start_cycle(),
            Event::RequestGeolocation => {
                self.geo_seq += 1;
                self.pending_geolocation = Some(self.geo_seq);
                self.state.show_location_hint = false;
                self.state.locating = true;
                Some(Command::Geolocate { seq: self.geo_seq })
            }
            Event::GeolocationResolved { seq, coords } => {
                if !self.take_geolocation(seq) {
                    return None;
                }
                self.state.query = coords;
                self.start_cycle()
            }
            Event::GeolocationFailed { seq, error } => {
                if !self.take_geolocation(seq) {
                    return None;
                }
                // No fetch was attempted. Any cycle still in flight was
                // started before this lookup and is superseded.
                self.latest_seq += 1;
                self.fail(error);
                None
            }
            Event::FetchCompleted { seq, result } => {
                self.complete_cycle(seq, result);
                None
            }
            Event::ToggleTheme => {
                self.state.theme = self.state.theme.toggled();
                Some(Command::ApplyTheme(self.state.theme))
            }
            Event::ToggleUnit => {
                self.state.unit = self.state.unit.toggled();
                None
            }
            Event::ToggleAdvanced => {
                self.state.show_advanced = !self.state.show_advanced;
                None
            }
            Event::HintExpired => {
                self.state.show_location_hint = false;
                None
            }
        }
    }

    fn start_cycle(&mut self) -> Option<Command> {
        let Ok(query) = LocationQuery::new(self.state.query.as_str()) else {
            debug!("ignoring fetch trigger without a query");
            return None;
        };

        // A started cycle wins over a lookup still outstanding.
        self.pending_geolocation = None;
        self.state.locating = false;

        self.latest_seq += 1;
        self.state.loading = true;
        self.state.error = None;
        self.state.current = None;
        self.state.forecast = None;

        debug!(seq = self.latest_seq, query = %query, "fetch cycle started");
        Some(Command::Fetch {
            seq: self.latest_seq,
            query,
        })
    }

    /// Clears the pending lookup if `seq` is it. `false` means stale.
    fn take_geolocation(&mut self, seq: u64) -> bool {
        if self.pending_geolocation != Some(seq) {
            debug!(seq, pending = ?self.pending_geolocation, "discarding stale geolocation outcome");
            return false;
        }
        self.pending_geolocation = None;
        self.state.locating = false;
        true
    }

    fn complete_cycle(&mut self, seq: u64, result: Result<WeatherReport, WeatherError>) {
        if seq != self.latest_seq {
            debug!(seq, latest = self.latest_seq, "discarding stale fetch result");
            return;
        }

        match result {
            Ok(report) => {
                debug!(seq, resolved = report.resolved_location(), "fetch cycle loaded");
                self.state.query = report.resolved_location().to_string();
                self.state.current = Some(report.current);
                self.state.forecast = Some(report.forecast);
                self.state.error = None;
                self.state.loading = false;
            }
            Err(err) => {
                debug!(seq, error = %err, "fetch cycle failed");
                self.fail(err);
            }
        }
    }

    fn fail(&mut self, err: WeatherError) {
        self.state.loading = false;
        self.state.current = None;
        self.state.forecast = None;
        self.state.error = Some(err.to_string());
    }
}
