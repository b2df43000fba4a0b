// Single-slot edit session

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// An in-progress edit of one entry
///
/// `buffer` is a working copy; the stored entry keeps its text until commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditState {
    pub index: usize,
    pub buffer: String,
}

impl EditState {
    pub fn new(index: usize, buffer: impl Into<String>) -> Self {
        Self {
            index,
            buffer: buffer.into(),
        }
    }

    /// True when the buffer is empty or whitespace-only
    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

/// What `commit_edit` does with a blank buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CommitPolicy {
    /// Reject the commit and leave the session open
    #[default]
    KeepOpen,
    /// Close the session without writing anything
    Discard,
}
