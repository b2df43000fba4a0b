// Line commands understood by the tasklist front end

use crate::entry::Entry;
use crate::filter::Filter;
use crate::store::TaskListStore;
use crate::task::Priority;
use eyre::{Context, Result, eyre};

pub const HELP: &str = "\
Commands (positions are as listed, starting at 1):
  add <text>              add a task
  rm <n>                  delete task n
  toggle <n>              flip task n between active and completed
  prio <n> <level>        set priority: low, normal, high
  edit <n>                start editing task n
  buf <text>              replace the edit buffer
  commit                  save the edit buffer into the task
  cancel                  abandon the edit
  filter <name>           show all, active or completed tasks
  list                    show the current view
  help                    show this help
  quit                    exit";

/// One parsed input line
///
/// Indices are zero-based; parsing converts from the one-based positions shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Remove(usize),
    Toggle(usize),
    Priority(usize, Priority),
    Edit(usize),
    Buffer(String),
    Commit,
    Cancel,
    Filter(Filter),
    List,
    Help,
    Quit,
}

impl Command {
    /// Apply a store-mutating command; view commands are left to the caller
    pub fn apply<E: Entry>(&self, store: &mut TaskListStore<E>) {
        match self {
            Command::Add(text) => {
                store.add(text);
            }
            Command::Remove(index) => {
                store.remove(*index);
            }
            Command::Toggle(index) => {
                store.toggle_complete(*index);
            }
            Command::Priority(index, priority) => {
                store.set_priority(*index, *priority);
            }
            Command::Edit(index) => store.begin_edit(*index),
            Command::Buffer(text) => store.update_edit_buffer(text),
            Command::Commit => {
                store.commit_edit();
            }
            Command::Cancel => store.cancel_edit(),
            Command::Filter(filter) => store.set_filter(*filter),
            Command::List | Command::Help | Command::Quit => {}
        }
    }
}

impl std::str::FromStr for Command {
    type Err = eyre::Report;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim_start();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line.trim_end(), ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "add" => Command::Add(rest.to_string()),
            "rm" | "remove" | "del" => Command::Remove(parse_position(rest)?),
            "toggle" | "done" => Command::Toggle(parse_position(rest)?),
            "prio" | "priority" => {
                let (position, level) = rest
                    .trim()
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| eyre!("Usage: prio <n> <low|normal|high>"))?;
                Command::Priority(parse_position(position)?, level.parse()?)
            }
            "edit" => Command::Edit(parse_position(rest)?),
            "buf" | "buffer" => Command::Buffer(rest.to_string()),
            "commit" | "save" => no_args(Command::Commit, rest)?,
            "cancel" => no_args(Command::Cancel, rest)?,
            "filter" => Command::Filter(rest.parse()?),
            "list" | "ls" => no_args(Command::List, rest)?,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => return Err(eyre!("Empty command")),
            other => return Err(eyre!("Unknown command: {} (try `help`)", other)),
        };

        Ok(command)
    }
}

/// Parse a one-based position into a zero-based index
fn parse_position(arg: &str) -> Result<usize> {
    let arg = arg.trim();
    let position: usize = arg
        .parse()
        .with_context(|| format!("Expected a task number, got `{}`", arg))?;
    position
        .checked_sub(1)
        .ok_or_else(|| eyre!("Task numbers start at 1"))
}

fn no_args(command: Command, rest: &str) -> Result<Command> {
    if rest.trim().is_empty() {
        Ok(command)
    } else {
        Err(eyre!("Unexpected arguments: {}", rest.trim()))
    }
}
