// Operator-facing notifications, the console's equivalent of web toasts
use chrono::{DateTime, Local};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub description: String,
    pub at: DateTime<Local>,
}

impl Notification {
    pub fn new(level: Level, title: &str, description: impl Into<String>) -> Self {
        Self { level, title: title.to_string(), description: description.into(), at: Local::now() }
    }

    pub fn success(title: &str, description: impl Into<String>) -> Self {
        Self::new(Level::Success, title, description)
    }

    pub fn error(title: &str, description: impl Into<String>) -> Self {
        Self::new(Level::Error, title, description)
    }

    pub fn info(title: &str, description: impl Into<String>) -> Self {
        Self::new(Level::Info, title, description)
    }

    pub fn warning(title: &str, description: impl Into<String>) -> Self {
        Self::new(Level::Warning, title, description)
    }

    pub fn emoji(&self) -> &'static str {
        match self.level {
            Level::Success => "✅",
            Level::Error => "❌",
            Level::Info => "ℹ️",
            Level::Warning => "⚠️",
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}: {}", self.emoji(), self.at.format("%H:%M:%S"), self.title, self.description)
    }
}

pub mod titles {
    pub const WALLPAPER_APPROVED: &str = "WALLPAPER APPROVED";
    pub const APPROVAL_FAILED: &str = "APPROVAL FAILED";
    pub const DATA_FETCH_ERROR: &str = "DATA FETCH ERROR";
    pub const STALE_DATA: &str = "STALE DATA";
    pub const TRANSMISSION_SUCCESSFUL: &str = "TRANSMISSION SUCCESSFUL";
    pub const TRANSMISSION_FAILED: &str = "TRANSMISSION FAILED";
    pub const TEST_TRANSMISSION_SUCCESSFUL: &str = "TEST TRANSMISSION SUCCESSFUL";
    pub const TEST_TRANSMISSION_FAILED: &str = "TEST TRANSMISSION FAILED";
    pub const ACCESS_DENIED: &str = "ACCESS DENIED";
    pub const ACCESS_GRANTED: &str = "ACCESS GRANTED";
    pub const SESSION_TERMINATED: &str = "SESSION TERMINATED";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_title_and_description() {
        let n = Notification::error(titles::APPROVAL_FAILED, "Missing wallpaper identifier.");
        let s = n.to_string();
        assert!(s.starts_with("❌"));
        assert!(s.contains("APPROVAL FAILED: Missing wallpaper identifier."));
        assert!(n.is_error());
        assert!(!Notification::success(titles::WALLPAPER_APPROVED, "ok").is_error());
    }

    #[test]
    fn warning_goes_to_stdout() {
        let n = Notification::warning(titles::STALE_DATA, "Approving without a fresh list.");
        assert_eq!(n.level, Level::Warning);
        assert!(n.to_string().starts_with("⚠️"));
        assert!(!n.is_error());
    }
}
