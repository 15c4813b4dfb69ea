use std::fmt;

use serde::Serialize;

use super::Outcome;
use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn title(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "Success",
            NoticeLevel::Warning => "Warning",
            NoticeLevel::Error => "Error",
        }
    }
}

/// A message box's worth of feedback for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub text: String,
}

impl Notice {
    fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            title: level.title(),
            text: text.into(),
        }
    }

    /// A declined confirmation produces no notice.
    pub fn from_outcome(outcome: &Outcome) -> Option<Self> {
        match outcome {
            Outcome::Cancelled => None,
            other => Some(Notice::new(NoticeLevel::Info, other.to_string())),
        }
    }

    /// Blocked deletes and missing selections warn; everything else is an error.
    pub fn from_error(err: &AppError) -> Self {
        let level = match err.kind() {
            ErrorKind::Constraint | ErrorKind::NotFound => NoticeLevel::Warning,
            ErrorKind::Validation | ErrorKind::Format | ErrorKind::Store => NoticeLevel::Error,
        };
        tracing::warn!(
            target: "resortdesk",
            event = "action_failed",
            code = err.code(),
            message = err.message()
        );
        Notice::new(level, err.message())
    }

    /// The write went through but the rows shown could not be reloaded.
    pub fn reload_failed(err: &AppError) -> Self {
        Notice::new(
            NoticeLevel::Warning,
            format!("saved, but the list could not be reloaded: {}", err.message()),
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.text)
    }
}
