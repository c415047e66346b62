use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Success => "ok",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        f.write_str(label)
    }
}

/// Non-blocking user feedback: toasts and the loading indicator.
pub trait Notifier {
    fn toast(&mut self, level: Level, message: &str);
    fn loading(&mut self, active: bool);
}

fn trace_toast(level: Level, message: &str) {
    match level {
        Level::Error => tracing::error!("{}", message),
        Level::Warning => tracing::warn!("{}", message),
        Level::Success | Level::Info => tracing::debug!("{}", message),
    }
}

/// Prints toasts to stderr for CLI commands. Logs share stderr there, so
/// toasts are not traced a second time.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn toast(&mut self, level: Level, message: &str) {
        match level {
            Level::Success | Level::Info => eprintln!("{}", message),
            Level::Warning | Level::Error => eprintln!("[{}] {}", level, message),
        }
    }

    fn loading(&mut self, active: bool) {
        if active {
            eprintln!("Working...");
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub level: Level,
    pub message: String,
}

/// Holds what the console's status bar shows: the latest toast and
/// whether a request is outstanding.
#[derive(Debug, Default)]
pub struct StatusLine {
    pub toast: Option<Toast>,
    pub busy: bool,
}

impl StatusLine {
    pub fn clear(&mut self) {
        self.toast = None;
    }
}

impl Notifier for StatusLine {
    fn toast(&mut self, level: Level, message: &str) {
        trace_toast(level, message);
        self.toast = Some(Toast {
            level,
            message: message.to_string(),
        });
    }

    fn loading(&mut self, active: bool) {
        self.busy = active;
    }
}
