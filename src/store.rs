// In-memory task list store with immutable snapshots

use crate::edit::{CommitPolicy, EditState};
use crate::entry::{Entry, EntryDefaults};
use crate::filter::Filter;
use crate::task::{Priority, Task, TaskId};
use serde::{Serialize, Serializer};
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable view of the task collection
///
/// Cloning is cheap. A mutation never touches an existing snapshot; it builds a
/// new one, so anything held by an observer stays valid.
#[derive(Debug)]
pub struct Snapshot<E>(Arc<Vec<E>>);

impl<E> Snapshot<E> {
    fn new(entries: Vec<E>) -> Self {
        Self(Arc::new(entries))
    }

    /// True when both snapshots are the same allocation (no mutation in between)
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> Clone for Snapshot<E> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<E> Default for Snapshot<E> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<E> Deref for Snapshot<E> {
    type Target = [E];

    fn deref(&self) -> &[E] {
        &self.0
    }
}

impl<E: Serialize> Serialize for Snapshot<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_slice().serialize(serializer)
    }
}

/// State change reported to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    Added { index: usize },
    Removed { index: usize },
    Toggled { index: usize },
    PriorityChanged { index: usize },
    EditStarted { index: usize },
    EditBufferUpdated,
    EditCommitted { index: usize },
    EditCancelled,
    FilterChanged { filter: Filter },
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Box<dyn FnMut(&Change, &TaskListStore<E>)>;

/// Construction settings for a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub defaults: EntryDefaults,
    pub commit_policy: CommitPolicy,
    pub filter: Filter,
}

/// Entry counts by completion state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Owns the ordered task collection plus the edit session and filter
///
/// Entries are addressed by position. Operations given a stale or out-of-range
/// index, or blank text, do nothing and return the current snapshot.
pub struct TaskListStore<E: Entry = Task> {
    tasks: Snapshot<E>,
    edit: Option<EditState>,
    filter: Filter,
    options: StoreOptions,
    observers: Vec<(SubscriptionId, Listener<E>)>,
    next_subscription: u64,
}

impl<E: Entry> Default for TaskListStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entry> std::fmt::Debug for TaskListStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskListStore")
            .field("tasks", &self.tasks)
            .field("edit", &self.edit)
            .field("filter", &self.filter)
            .field("options", &self.options)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<E: Entry> TaskListStore<E> {
    /// Create an empty store with default options
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            tasks: Snapshot::default(),
            edit: None,
            filter: options.filter,
            options,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// Current snapshot of the full collection
    pub fn snapshot(&self) -> Snapshot<E> {
        self.tasks.clone()
    }

    pub fn edit_state(&self) -> Option<&EditState> {
        self.edit.as_ref()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.tasks.get(index)
    }

    pub fn counts(&self) -> Counts {
        let completed = self.tasks.iter().filter(|t| t.is_completed()).count();
        Counts {
            total: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    /// Entries passing the current filter, in insertion order
    ///
    /// The iterator borrows the current state and can be cloned to restart.
    pub fn visible_tasks(&self) -> impl Iterator<Item = &E> + Clone + '_ {
        self.visible_indexed().map(|(_, entry)| entry)
    }

    /// Like `visible_tasks`, but paired with each entry's index in the store
    pub fn visible_indexed(&self) -> VisibleTasks<'_, E> {
        VisibleTasks {
            inner: self.tasks.iter().enumerate(),
            filter: self.filter,
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new entry built from `text`; blank text is ignored
    pub fn add(&mut self, text: &str) -> Snapshot<E> {
        if text.trim().is_empty() {
            debug!(op = "add", "Ignoring blank text");
            return self.snapshot();
        }

        let entry = E::from_text(text, &self.options.defaults);
        let mut next = self.tasks.to_vec();
        next.push(entry);
        let index = next.len() - 1;
        self.tasks = Snapshot::new(next);

        debug!(op = "add", index, len = self.tasks.len(), "Added entry");
        self.notify(Change::Added { index });
        self.snapshot()
    }

    /// Delete the entry at `index`
    ///
    /// An edit session on that entry is cancelled; one on a later entry is
    /// shifted down so it keeps pointing at the same entry.
    pub fn remove(&mut self, index: usize) -> Snapshot<E> {
        if index >= self.tasks.len() {
            debug!(op = "remove", index, len = self.tasks.len(), "Index out of range");
            return self.snapshot();
        }

        let mut next = self.tasks.to_vec();
        next.remove(index);
        self.tasks = Snapshot::new(next);

        self.edit = self.edit.take().and_then(|mut edit| {
            if edit.index == index {
                debug!(op = "remove", index, "Cancelling edit of removed entry");
                return None;
            }
            if edit.index > index {
                edit.index -= 1;
            }
            Some(edit)
        });

        debug!(op = "remove", index, len = self.tasks.len(), "Removed entry");
        self.notify(Change::Removed { index });
        self.snapshot()
    }

    /// Flip the completion flag of the entry at `index`
    pub fn toggle_complete(&mut self, index: usize) -> Snapshot<E> {
        let Some(updated) = self.get(index).and_then(E::toggled) else {
            debug!(op = "toggle_complete", index, "No entry with a completion flag at index");
            return self.snapshot();
        };

        self.replace_at(index, updated);
        self.notify(Change::Toggled { index });
        self.snapshot()
    }

    /// Set the priority of the entry at `index`
    pub fn set_priority(&mut self, index: usize, priority: Priority) -> Snapshot<E> {
        let Some(updated) = self.get(index).and_then(|e| e.with_priority(priority)) else {
            debug!(op = "set_priority", index, %priority, "No entry with a priority at index");
            return self.snapshot();
        };

        self.replace_at(index, updated);
        self.notify(Change::PriorityChanged { index });
        self.snapshot()
    }

    /// Open an edit session on the entry at `index`
    ///
    /// Any uncommitted session is discarded.
    pub fn begin_edit(&mut self, index: usize) {
        let Some(entry) = self.get(index) else {
            debug!(op = "begin_edit", index, "Index out of range");
            return;
        };

        let state = EditState::new(index, entry.text());
        if let Some(previous) = self.edit.replace(state) {
            debug!(op = "begin_edit", previous = previous.index, "Discarding uncommitted edit");
        }

        self.notify(Change::EditStarted { index });
    }

    /// Overwrite the working copy of the active edit session
    pub fn update_edit_buffer(&mut self, text: &str) {
        match self.edit.as_mut() {
            Some(edit) => edit.buffer = text.to_string(),
            None => {
                debug!(op = "update_edit_buffer", "No active edit session");
                return;
            }
        }

        self.notify(Change::EditBufferUpdated);
    }

    /// Write the edit buffer into the edited entry and close the session
    ///
    /// A blank buffer is never written. Whether the session stays open in that
    /// case depends on the store's `CommitPolicy`.
    pub fn commit_edit(&mut self) -> Snapshot<E> {
        let Some(edit) = self.edit.clone() else {
            debug!(op = "commit_edit", "No active edit session");
            return self.snapshot();
        };

        if edit.is_blank() {
            match self.options.commit_policy {
                CommitPolicy::KeepOpen => {
                    debug!(op = "commit_edit", index = edit.index, "Rejecting blank edit, session kept open");
                }
                CommitPolicy::Discard => {
                    debug!(op = "commit_edit", index = edit.index, "Discarding blank edit");
                    self.edit = None;
                    self.notify(Change::EditCancelled);
                }
            }
            return self.snapshot();
        }

        self.edit = None;
        let Some(updated) = self.get(edit.index).map(|e| e.with_text(&edit.buffer)) else {
            // remove() keeps edit indices in range
            warn!(op = "commit_edit", index = edit.index, "Edited entry no longer exists");
            self.notify(Change::EditCancelled);
            return self.snapshot();
        };

        self.replace_at(edit.index, updated);
        self.notify(Change::EditCommitted { index: edit.index });
        self.snapshot()
    }

    /// Close the edit session without writing
    pub fn cancel_edit(&mut self) {
        if self.edit.take().is_none() {
            debug!(op = "cancel_edit", "No active edit session");
            return;
        }

        self.notify(Change::EditCancelled);
    }

    pub fn set_filter(&mut self, filter: Filter) {
        if self.filter == filter {
            return;
        }

        self.filter = filter;
        debug!(op = "set_filter", %filter, "Filter changed");
        self.notify(Change::FilterChanged { filter });
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Register a listener called after every state change
    ///
    /// Rejected operations do not notify.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Change, &TaskListStore<E>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn replace_at(&mut self, index: usize, entry: E) {
        let mut next = self.tasks.to_vec();
        next[index] = entry;
        self.tasks = Snapshot::new(next);
    }

    fn notify(&mut self, change: Change) {
        if self.observers.is_empty() {
            return;
        }

        // Listeners get a shared view of the store, so move them out while they run
        let mut observers = std::mem::take(&mut self.observers);
        for (_, listener) in observers.iter_mut() {
            listener(&change, self);
        }
        self.observers = observers;
    }
}

impl TaskListStore<Task> {
    /// Current index of the task with the given id
    pub fn position_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

/// Filtered iterator over `(index, entry)` pairs
#[derive(Debug, Clone)]
pub struct VisibleTasks<'a, E> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, E>>,
    filter: Filter,
}

impl<'a, E: Entry> Iterator for VisibleTasks<'a, E> {
    type Item = (usize, &'a E);

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.inner.find(|(_, entry)| filter.matches(*entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn texts<E: Entry>(entries: &[E]) -> Vec<&str> {
        entries.iter().map(|e| e.text()).collect()
    }

    fn store_with(items: &[&str]) -> TaskListStore<Task> {
        let mut store = TaskListStore::new();
        for item in items {
            store.add(item);
        }
        store
    }

    #[test]
    fn test_add_blank_is_noop() {
        let mut store: TaskListStore = TaskListStore::new();
        let before = store.snapshot();

        let after = store.add("");
        assert!(after.is_empty());
        let after = store.add("   ");
        assert!(after.is_empty());
        assert!(after.ptr_eq(&before));
    }

    #[test]
    fn test_add_appends_with_defaults() {
        let mut store: TaskListStore = TaskListStore::new();
        let snapshot = store.add("buy milk");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].text, "buy milk");
        assert!(!snapshot[0].completed);
        assert_eq!(snapshot[0].priority, Priority::Normal);
    }

    #[test]
    fn test_add_uses_configured_priority() {
        let mut store: TaskListStore = TaskListStore::with_options(StoreOptions {
            defaults: EntryDefaults {
                priority: Priority::High,
            },
            ..StoreOptions::default()
        });
        let snapshot = store.add("urgent");
        assert_eq!(snapshot[0].priority, Priority::High);
    }

    #[test]
    fn test_toggle_is_involution() {
        let mut store = store_with(&["a", "b"]);
        let original = store.get(1).cloned().unwrap();

        store.toggle_complete(1);
        assert!(store.get(1).unwrap().completed);
        store.toggle_complete(1);
        assert_eq!(store.get(1).unwrap(), &original);
    }

    #[test]
    fn test_remove_shifts_following_entries() {
        let mut store = store_with(&["a", "b", "c", "d"]);
        let removed = store.get(1).unwrap().id;

        let snapshot = store.remove(1);
        assert_eq!(texts(&snapshot), vec!["a", "c", "d"]);
        assert!(store.position_of(removed).is_none());
    }

    #[test]
    fn test_out_of_range_operations_are_noops() {
        let mut store = store_with(&["a"]);
        let before = store.snapshot();

        assert!(store.remove(5).ptr_eq(&before));
        assert!(store.toggle_complete(1).ptr_eq(&before));
        assert!(store.set_priority(9, Priority::High).ptr_eq(&before));
        store.begin_edit(3);
        assert!(store.edit_state().is_none());
    }

    #[test]
    fn test_set_priority() {
        let mut store = store_with(&["a", "b"]);
        let snapshot = store.set_priority(0, Priority::Low);

        assert_eq!(snapshot[0].priority, Priority::Low);
        assert_eq!(snapshot[1].priority, Priority::Normal);
    }

    #[test]
    fn test_visible_tasks_by_filter() {
        let mut store = store_with(&["a", "b", "c", "d"]);
        store.toggle_complete(1);
        store.toggle_complete(3);

        assert_eq!(store.visible_tasks().count(), 4);

        store.set_filter(Filter::Active);
        let active: Vec<_> = store.visible_tasks().map(|t| t.text.as_str()).collect();
        assert_eq!(active, vec!["a", "c"]);

        store.set_filter(Filter::Completed);
        let completed: Vec<_> = store.visible_indexed().map(|(i, _)| i).collect();
        assert_eq!(completed, vec![1, 3]);

        // Filtering never touches the collection
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_visible_tasks_is_restartable() {
        let mut store = store_with(&["a", "b"]);
        store.set_filter(Filter::Active);

        let mut iter = store.visible_tasks();
        let restart = iter.clone();
        iter.next();
        assert_eq!(iter.count(), 1);
        assert_eq!(restart.count(), 2);
    }

    #[test]
    fn test_edit_commit() {
        let mut store = store_with(&["a", "b"]);
        store.set_priority(1, Priority::High);
        store.toggle_complete(1);
        let before = store.get(1).cloned().unwrap();

        store.begin_edit(1);
        assert_eq!(store.edit_state(), Some(&EditState::new(1, "b")));
        store.update_edit_buffer("new text");
        // Stored entry is unchanged until commit
        assert_eq!(store.get(1).unwrap().text, "b");

        let snapshot = store.commit_edit();
        assert!(store.edit_state().is_none());
        assert_eq!(snapshot[1], Task { text: "new text".to_string(), ..before });
    }

    #[test]
    fn test_edit_cancel() {
        let mut store = store_with(&["a"]);
        let before = store.snapshot();

        store.begin_edit(0);
        store.update_edit_buffer("changed");
        store.cancel_edit();

        assert!(store.edit_state().is_none());
        assert!(store.snapshot().ptr_eq(&before));
        assert_eq!(store.get(0).unwrap().text, "a");
    }

    #[test]
    fn test_blank_commit_keeps_session_open() {
        let mut store = store_with(&["a"]);
        let before = store.snapshot();

        store.begin_edit(0);
        store.update_edit_buffer("  ");
        let after = store.commit_edit();

        assert!(after.ptr_eq(&before));
        assert_eq!(store.edit_state(), Some(&EditState::new(0, "  ")));
    }

    #[test]
    fn test_blank_commit_with_discard_policy() {
        let mut store: TaskListStore<String> = TaskListStore::with_options(StoreOptions {
            commit_policy: CommitPolicy::Discard,
            ..StoreOptions::default()
        });
        store.add("a");

        store.begin_edit(0);
        store.update_edit_buffer("");
        let after = store.commit_edit();

        assert!(store.edit_state().is_none());
        assert_eq!(texts(&after), vec!["a"]);
    }

    #[test]
    fn test_begin_edit_replaces_session() {
        let mut store = store_with(&["a", "b"]);
        store.begin_edit(0);
        store.update_edit_buffer("lost");
        store.begin_edit(1);

        assert_eq!(store.edit_state(), Some(&EditState::new(1, "b")));
        store.commit_edit();
        assert_eq!(texts(&store.snapshot()), vec!["a", "b"]);
    }

    #[test]
    fn test_update_buffer_without_session() {
        let mut store = store_with(&["a"]);
        store.update_edit_buffer("x");
        assert!(store.edit_state().is_none());
        store.commit_edit();
        assert_eq!(store.get(0).unwrap().text, "a");
    }

    #[test]
    fn test_remove_edited_entry_cancels_edit() {
        let mut store = store_with(&["a", "b"]);
        store.begin_edit(1);
        store.remove(1);
        assert!(store.edit_state().is_none());
    }

    #[test]
    fn test_remove_before_edited_entry_shifts_edit() {
        let mut store = store_with(&["a", "b", "c"]);
        store.begin_edit(2);
        store.update_edit_buffer("C");

        store.remove(0);
        assert_eq!(store.edit_state(), Some(&EditState::new(1, "C")));

        let snapshot = store.commit_edit();
        assert_eq!(texts(&snapshot), vec!["b", "C"]);
    }

    #[test]
    fn test_remove_after_edited_entry_keeps_edit() {
        let mut store = store_with(&["a", "b", "c"]);
        store.begin_edit(0);
        store.remove(2);
        assert_eq!(store.edit_state().map(|e| e.index), Some(0));
    }

    #[test]
    fn test_old_snapshots_are_immutable() {
        let mut store = store_with(&["a"]);
        let old = store.snapshot();

        store.toggle_complete(0);
        store.add("b");

        assert_eq!(old.len(), 1);
        assert!(!old[0].completed);
        assert!(!old.ptr_eq(&store.snapshot()));
    }

    #[test]
    fn test_simple_variant() {
        let mut store: TaskListStore<String> = TaskListStore::new();
        store.add("a");
        store.add("b");
        let before = store.snapshot();

        assert!(store.toggle_complete(0).ptr_eq(&before));
        assert!(store.set_priority(0, Priority::High).ptr_eq(&before));

        store.set_filter(Filter::Completed);
        assert_eq!(store.visible_tasks().count(), 0);
        store.set_filter(Filter::Active);
        assert_eq!(store.visible_tasks().count(), 2);

        store.begin_edit(0);
        store.update_edit_buffer("A");
        assert_eq!(texts(&store.commit_edit()), vec!["A", "b"]);
    }

    #[test]
    fn test_counts() {
        let mut store = store_with(&["a", "b", "c"]);
        store.toggle_complete(2);
        assert_eq!(
            store.counts(),
            Counts {
                total: 3,
                active: 2,
                completed: 1
            }
        );
    }

    #[test]
    fn test_position_of_tracks_shifts() {
        let mut store = store_with(&["a", "b", "c"]);
        let id = store.get(2).unwrap().id;
        store.remove(0);
        assert_eq!(store.position_of(id), Some(1));
    }

    #[test]
    fn test_observers_receive_changes() {
        let mut store = store_with(&["a"]);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |change, view| {
            sink.borrow_mut().push((change.clone(), view.len()));
        });

        store.add("b");
        store.add(" "); // rejected, no notification
        store.toggle_complete(7); // rejected
        store.set_filter(Filter::Active);
        store.set_filter(Filter::Active); // unchanged
        store.remove(0);

        assert_eq!(
            *seen.borrow(),
            vec![
                (Change::Added { index: 1 }, 2),
                (Change::FilterChanged { filter: Filter::Active }, 2),
                (Change::Removed { index: 0 }, 1),
            ]
        );

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add("c");
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_observers_see_edit_lifecycle() {
        let mut store = store_with(&["a"]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |change, _| sink.borrow_mut().push(change.clone()));

        store.begin_edit(0);
        store.update_edit_buffer("");
        store.commit_edit(); // rejected under keep-open
        store.update_edit_buffer("b");
        store.commit_edit();

        assert_eq!(
            *seen.borrow(),
            vec![
                Change::EditStarted { index: 0 },
                Change::EditBufferUpdated,
                Change::EditBufferUpdated,
                Change::EditCommitted { index: 0 },
            ]
        );
    }

    #[test]
    fn test_scenario_add_remove_toggle_filter() {
        let mut store: TaskListStore = TaskListStore::new();
        store.add("a");
        store.add("b");
        let snapshot = store.add("c");
        assert_eq!(texts(&snapshot), vec!["a", "b", "c"]);

        let snapshot = store.remove(1);
        assert_eq!(texts(&snapshot), vec!["a", "c"]);

        let snapshot = store.toggle_complete(0);
        assert!(snapshot[0].completed);
        assert!(!snapshot[1].completed);

        store.set_filter(Filter::Completed);
        let visible: Vec<&Task> = store.visible_tasks().collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "a");
        assert!(visible[0].completed);
    }

    #[test]
    fn test_snapshot_serializes_as_list() {
        let mut store: TaskListStore<String> = TaskListStore::new();
        store.add("a");
        let json = serde_json::to_string(&store.snapshot()).unwrap();
        assert_eq!(json, "[\"a\"]");
    }
}
