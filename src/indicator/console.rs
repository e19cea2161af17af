//! Terminal indicator used by the binary in place of a tray icon.

use std::io::{self, Write};

use crate::indicator::IndicatorHost;

const ONLINE_GLYPH: &str = "●";
const HIDDEN_GLYPH: &str = " ";
const OFFLINE_GLYPH: &str = "○";

/// Renders the indicator as a single glyph on stdout.
#[derive(Debug, Clone)]
pub struct ConsoleIndicator {
    stable: &'static str,
}

impl ConsoleIndicator {
    pub fn new() -> Self {
        Self {
            stable: ONLINE_GLYPH,
        }
    }
}

impl Default for ConsoleIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorHost for ConsoleIndicator {
    type Representation = &'static str;

    fn set_displayed(&mut self, representation: &'static str) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "\r[{}] ", representation);
        let _ = out.flush();
    }

    fn current_stable(&self) -> &'static str {
        self.stable
    }

    fn hidden(&self) -> Option<&'static str> {
        Some(HIDDEN_GLYPH)
    }

    fn offline_marker(&self) -> Option<&'static str> {
        Some(OFFLINE_GLYPH)
    }
}
