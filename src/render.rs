// Rendering of the visible task list for the terminal front end

use crate::edit::EditState;
use crate::entry::Entry;
use crate::filter::Filter;
use crate::store::{Counts, TaskListStore};
use crate::task::{Priority, format_timestamp};
use colored::Colorize;
use eyre::{Context, Result};
use serde::Serialize;

/// One visible row, positions one-based as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub position: usize,
    pub text: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Everything the front end shows after a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub filter: Filter,
    pub rows: Vec<Row>,
    pub counts: Counts,
    pub editing: Option<EditState>,
}

impl View {
    pub fn from_store<E: Entry>(store: &TaskListStore<E>, timestamp_format: &str) -> Self {
        let rows = store
            .visible_indexed()
            .map(|(index, entry)| Row {
                position: index + 1,
                text: entry.text().to_string(),
                completed: entry.is_completed(),
                priority: entry.priority(),
                timestamp: entry.created_at().map(|ms| format_timestamp(ms, timestamp_format)),
            })
            .collect();

        Self {
            filter: store.filter(),
            rows,
            counts: store.counts(),
            editing: store.edit_state().cloned(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize view")
    }

    /// Colored multi-line listing
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        if self.rows.is_empty() {
            out.push_str(&format!("{}\n", "(no tasks)".dimmed()));
        }

        for row in &self.rows {
            let editing = self.editing.as_ref().is_some_and(|e| e.index + 1 == row.position);
            let marker = if row.completed { "[x]" } else { "[ ]" };
            let text = if row.completed {
                row.text.dimmed().strikethrough().to_string()
            } else {
                row.text.clone()
            };

            let mut line = format!("{:>3}. {} {}", row.position, marker, text);
            if let Some(priority) = row.priority {
                let label = match priority {
                    Priority::High => "high".red().bold(),
                    Priority::Normal => "normal".normal(),
                    Priority::Low => "low".blue(),
                };
                line.push_str(&format!("  ({})", label));
            }
            if let Some(timestamp) = &row.timestamp {
                line.push_str(&format!("  {}", timestamp.dimmed()));
            }
            if editing {
                line.push_str(&format!("  {}", "<editing>".yellow()));
            }
            out.push_str(&line);
            out.push('\n');
        }

        out.push_str(&format!(
            "{} total, {} active, {} completed | filter: {}\n",
            self.counts.total,
            self.counts.active,
            self.counts.completed,
            self.filter.to_string().cyan()
        ));

        if let Some(edit) = &self.editing {
            out.push_str(&format!("{} #{}: {}\n", "editing".yellow(), edit.index + 1, edit.buffer));
        }

        out
    }
}
