//! Prompt loop for `weathertap interactive`.

use anyhow::{Context, Result};
use inquire::{InquireError, Text};
use std::time::Duration;
use weathertap_core::{
    Event, SessionHandle, ViewState,
    render::{share_text, share_url},
};

use crate::terminal::TerminalTheme;

/// Upper bound for a geolocation lookup plus the fetch it triggers.
const LOCATE_TIMEOUT: Duration = Duration::from_secs(30);

const HELP: &str = "\
Type a city, postal code or \"lat,lon\" to search. Commands:
  :locate    use your current location
  :refresh   fetch the current location again
  :unit      switch between °C and °F
  :theme     switch between dark and light
  :advanced  show or hide advanced details
  :clear     clear the search text
  :share     print a WhatsApp share link
  :help      show this help
  :quit      leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Search(String),
    Locate,
    Refresh,
    ToggleUnit,
    ToggleTheme,
    ToggleAdvanced,
    Clear,
    Share,
    Help,
    Quit,
    Unknown(String),
    Nothing,
}

pub fn parse_line(line: &str) -> Action {
    let line = line.trim();
    if line.is_empty() {
        return Action::Nothing;
    }

    let Some(command) = line.strip_prefix(':') else {
        return Action::Search(line.to_string());
    };

    match command.to_lowercase().as_str() {
        "locate" | "l" => Action::Locate,
        "refresh" | "r" => Action::Refresh,
        "unit" | "u" => Action::ToggleUnit,
        "theme" | "t" => Action::ToggleTheme,
        "advanced" | "a" => Action::ToggleAdvanced,
        "clear" | "c" => Action::Clear,
        "share" | "s" => Action::Share,
        "help" | "h" | "?" => Action::Help,
        "quit" | "q" | "exit" => Action::Quit,
        _ => Action::Unknown(line.to_string()),
    }
}

/// What the prompt loop does after an action.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Draw(ViewState),
    Stay,
    Quit,
}

pub async fn run(handle: &SessionHandle, term: &TerminalTheme) -> Result<()> {
    println!("{HELP}\n");
    print!("{}", term.draw(&handle.snapshot()));

    loop {
        let prompt = format!("{} >", term.prompt_marker());
        let Some(line) = read_line(prompt).await? else {
            break;
        };

        match perform(handle, parse_line(&line)).await? {
            Outcome::Draw(state) => print!("\n{}", term.draw(&state)),
            Outcome::Stay => {}
            Outcome::Quit => break,
        }
    }

    Ok(())
}

/// Applies one action to the session. Errors are session failures only; a
/// lookup that times out is reported and the loop carries on.
pub async fn perform(handle: &SessionHandle, action: Action) -> Result<Outcome> {
    let state = match action {
        Action::Nothing => return Ok(Outcome::Stay),
        Action::Quit => return Ok(Outcome::Quit),
        Action::Help => {
            println!("{HELP}");
            return Ok(Outcome::Stay);
        }
        Action::Unknown(input) => {
            println!("Unknown command '{input}'. Type :help for a list.");
            return Ok(Outcome::Stay);
        }
        Action::Share => {
            match share_text(&handle.snapshot()) {
                Some(text) => println!("{text}\n\n{}", share_url(&text)),
                None => println!("Nothing to share yet. Search for a location first."),
            }
            return Ok(Outcome::Stay);
        }
        Action::Search(query) => {
            handle.dispatch(Event::QueryChanged(query)).await?;
            fetch(handle, Event::Submit).await?
        }
        Action::Refresh => fetch(handle, Event::Refresh).await?,
        Action::Locate => match locate(handle).await {
            Ok(state) => state,
            Err(err) => {
                println!("{err:#}");
                return Ok(Outcome::Stay);
            }
        },
        Action::ToggleUnit => handle.dispatch(Event::ToggleUnit).await?,
        Action::ToggleTheme => handle.dispatch(Event::ToggleTheme).await?,
        Action::ToggleAdvanced => handle.dispatch(Event::ToggleAdvanced).await?,
        Action::Clear => handle.dispatch(Event::ClearQuery).await?,
    };

    Ok(Outcome::Draw(state))
}

/// Dispatch a fetch trigger and wait for its cycle to finish.
async fn fetch(handle: &SessionHandle, trigger: Event) -> Result<ViewState> {
    let state = handle.dispatch(trigger).await?;
    if !state.loading {
        // Guarded trigger (no query): nothing started.
        return Ok(state);
    }
    handle.wait_idle().await
}

/// Request geolocation and wait until it either failed or its fetch cycle
/// completed.
pub async fn locate(handle: &SessionHandle) -> Result<ViewState> {
    handle.dispatch(Event::RequestGeolocation).await?;

    tokio::time::timeout(LOCATE_TIMEOUT, handle.wait_for(|s| !s.locating && !s.loading))
        .await
        .context("Timed out waiting for location")?
}

/// Reads one line on the blocking pool. `None` means the user bailed out.
async fn read_line(prompt: String) -> Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(move || Text::new(&prompt).prompt())
        .await
        .context("Prompt task failed")?;

    match answer {
        Ok(line) => Ok(Some(line)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read input"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use weathertap_core::{
        Controller, Geolocator, LocationQuery, WeatherError, WeatherFetcher, WeatherReport,
        session::{self, NoopThemeSink, SessionOptions},
    };

    /// Never answers within the locate timeout.
    #[derive(Debug)]
    struct StuckGeolocator;

    #[async_trait]
    impl Geolocator for StuckGeolocator {
        async fn request_location(&self) -> Result<String, WeatherError> {
            tokio::time::sleep(LOCATE_TIMEOUT * 10).await;
            Err(WeatherError::GeolocationDenied)
        }
    }

    #[derive(Debug)]
    struct FailingFetcher;

    #[async_trait]
    impl WeatherFetcher for FailingFetcher {
        async fn fetch(&self, _query: &LocationQuery) -> Result<WeatherReport, WeatherError> {
            Err(WeatherError::FetchFailed)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn locate_timeout_keeps_session_usable() {
        let handle = session::start(
            Controller::default(),
            Arc::new(FailingFetcher),
            Arc::new(StuckGeolocator),
            Arc::new(NoopThemeSink),
            SessionOptions::default(),
        );

        let outcome = perform(&handle, Action::Locate).await.unwrap();
        assert_eq!(outcome, Outcome::Stay);

        match perform(&handle, Action::ToggleUnit).await.unwrap() {
            Outcome::Draw(state) => assert!(state.locating),
            other => panic!("expected a redraw, got {other:?}"),
        }
        assert_eq!(perform(&handle, Action::Quit).await.unwrap(), Outcome::Quit);

        handle.shutdown().await;
    }

    #[test]
    fn plain_text_is_a_search() {
        assert_eq!(parse_line("  New York "), Action::Search("New York".into()));
        assert_eq!(parse_line("48.85,2.35"), Action::Search("48.85,2.35".into()));
    }

    #[test]
    fn commands_and_aliases() {
        assert_eq!(parse_line(":locate"), Action::Locate);
        assert_eq!(parse_line(":U"), Action::ToggleUnit);
        assert_eq!(parse_line(":q"), Action::Quit);
        assert_eq!(parse_line(":share"), Action::Share);
        assert_eq!(parse_line(":weird"), Action::Unknown(":weird".into()));
        assert_eq!(parse_line("   "), Action::Nothing);
    }
}
