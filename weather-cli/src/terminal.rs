use std::{
    io::IsTerminal,
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::debug;
use weathertap_core::{
    Theme, ThemeSink, ViewState,
    render::{Palette, render_with},
};

/// Shared presentation context for the terminal.
///
/// The session reports theme switches here; prompts read it back to pick
/// their decoration. Colour is disabled when stdout is not a terminal.
#[derive(Debug)]
pub struct TerminalTheme {
    dark: AtomicBool,
    color: bool,
}

impl TerminalTheme {
    pub fn new(theme: Theme) -> Self {
        Self {
            dark: AtomicBool::new(theme.is_dark()),
            color: std::io::stdout().is_terminal(),
        }
    }

    pub fn theme(&self) -> Theme {
        if self.dark.load(Ordering::Relaxed) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn prompt_marker(&self) -> &'static str {
        match self.theme() {
            Theme::Dark => "☾",
            Theme::Light => "☀",
        }
    }

    pub fn palette(&self, state: &ViewState) -> Palette {
        if self.color {
            Palette::for_theme(state.theme)
        } else {
            Palette::plain()
        }
    }

    pub fn draw(&self, state: &ViewState) -> String {
        render_with(state, &self.palette(state))
    }
}

impl ThemeSink for TerminalTheme {
    fn apply_theme(&self, theme: Theme) {
        debug!(?theme, "applying theme to terminal");
        self.dark.store(theme.is_dark(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_tracks_latest_theme() {
        let term = TerminalTheme::new(Theme::Dark);
        assert_eq!(term.prompt_marker(), "☾");

        term.apply_theme(Theme::Light);
        assert_eq!(term.theme(), Theme::Light);
        assert_eq!(term.prompt_marker(), "☀");
    }
}
