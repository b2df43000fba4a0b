// Entry trait shared by the rich and simple list variants

use crate::task::Priority;

/// Values applied to every entry created through `add`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryDefaults {
    /// Priority given to new tasks (ignored by entries without priority)
    pub priority: Priority,
}

/// Core trait that any list entry must implement
///
/// Mutating methods return a new value instead of changing `self`, so the store
/// can derive a fresh snapshot and leave older snapshots untouched. Entries that
/// do not track a field return `None` from the matching method, which the store
/// treats as a no-op.
pub trait Entry: Clone + std::fmt::Debug + 'static {
    /// Build a new entry from user-entered text
    fn from_text(text: &str, defaults: &EntryDefaults) -> Self;

    /// Display text
    fn text(&self) -> &str;

    /// Copy of this entry with its text replaced, all other fields preserved
    fn with_text(&self, text: &str) -> Self;

    fn is_completed(&self) -> bool {
        false
    }

    /// Copy with the completion flag flipped
    fn toggled(&self) -> Option<Self> {
        None
    }

    fn priority(&self) -> Option<Priority> {
        None
    }

    /// Copy with a new priority
    fn with_priority(&self, _priority: Priority) -> Option<Self> {
        None
    }

    /// Creation time in milliseconds since epoch, if tracked
    fn created_at(&self) -> Option<i64> {
        None
    }
}

/// The simple variant: a bare string with no metadata
impl Entry for String {
    fn from_text(text: &str, _defaults: &EntryDefaults) -> Self {
        text.to_string()
    }

    fn text(&self) -> &str {
        self
    }

    fn with_text(&self, text: &str) -> Self {
        text.to_string()
    }
}
