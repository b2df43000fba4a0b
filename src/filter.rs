// View filtering for the task list

use crate::entry::Entry;
use clap::ValueEnum;
use eyre::eyre;
use serde::{Deserialize, Serialize};

/// View-level predicate over entries
///
/// Only the derived view is affected; the underlying collection never changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,    // !completed
    Completed, // completed
}

impl Filter {
    /// Whether an entry is visible under this filter
    pub fn matches<E: Entry>(self, entry: &E) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !entry.is_completed(),
            Filter::Completed => entry.is_completed(),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "all"),
            Filter::Active => write!(f, "active"),
            Filter::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for Filter {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            other => Err(eyre!("Unknown filter: {} (expected all, active or completed)", other)),
        }
    }
}
