// Task model for the rich list variant

use crate::entry::{Entry, EntryDefaults};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use eyre::eyre;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::debug;
use uuid::Uuid;

/// Stable identifier assigned to a task at creation
pub type TaskId = Uuid;

/// Task importance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            other => Err(eyre!("Unknown priority: {} (expected low, normal or high)", other)),
        }
    }
}

/// A single to-do entry with completion and priority metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    /// Creation time (milliseconds since epoch), never changed after creation
    pub created_at: i64,
    pub priority: Priority,
}

impl Task {
    pub fn new(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            completed: false,
            created_at: now_ms(),
            priority,
        }
    }

    /// Creation time rendered in local time with a chrono format string
    pub fn timestamp(&self, format: &str) -> String {
        format_timestamp(self.created_at, format)
    }
}

impl Entry for Task {
    fn from_text(text: &str, defaults: &EntryDefaults) -> Self {
        Task::new(text, defaults.priority)
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn with_text(&self, text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..self.clone()
        }
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn toggled(&self) -> Option<Self> {
        Some(Self {
            completed: !self.completed,
            ..self.clone()
        })
    }

    fn priority(&self) -> Option<Priority> {
        Some(self.priority)
    }

    fn with_priority(&self, priority: Priority) -> Option<Self> {
        Some(Self {
            priority,
            ..self.clone()
        })
    }

    fn created_at(&self) -> Option<i64> {
        Some(self.created_at)
    }
}

/// Format a millisecond timestamp in local time
///
/// Out-of-range timestamps and invalid format strings render as an empty string.
pub fn format_timestamp(ms: i64, format: &str) -> String {
    let Some(dt) = DateTime::from_timestamp_millis(ms) else {
        return String::new();
    };

    let mut out = String::new();
    if write!(out, "{}", dt.with_timezone(&Local).format(format)).is_err() {
        debug!(format, "Invalid timestamp format");
        return String::new();
    }
    out
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    Local::now().timestamp_millis()
}
