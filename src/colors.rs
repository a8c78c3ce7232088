//! ANSI styling for command-line output.

use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub error: &'static str,
    pub success: &'static str,
    pub path: &'static str,
    enabled: bool,
}

impl Colors {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            Self {
                error: "\x1b[31m",   // Red
                success: "\x1b[32m", // Green
                path: "\x1b[36m",    // Cyan
                enabled: true,
            }
        } else {
            Self {
                error: "",
                success: "",
                path: "",
                enabled: false,
            }
        }
    }

    pub fn reset(&self) -> &'static str {
        if self.enabled {
            RESET
        } else {
            ""
        }
    }

    /// `text` wrapped in `style`, or unchanged when disabled.
    pub fn paint(&self, style: &'static str, text: impl std::fmt::Display) -> String {
        format!("{style}{text}{}", self.reset())
    }
}

/// Decide whether output written to `stream` is coloured.
pub fn should_use_colors(no_color: bool, stream: &impl IsTerminal) -> bool {
    // Priority: --no-color > NO_COLOR env > TTY detection
    if no_color {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    stream.is_terminal()
}
