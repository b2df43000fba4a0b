//! Demo 01: Basic Usage
//!
//! This demo walks through the store operations a presentation layer
//! drives: add, toggle, re-prioritize, edit, remove and filter. A
//! subscribed observer prints every change as it happens.
//!
//! Run with: cargo run --example 01_basic_usage

use tasklist::render::View;
use tasklist::{Filter, Priority, Task, TaskListStore};

fn main() {
    println!("TaskList Basic Usage Demo");
    println!("=========================\n");

    let mut store: TaskListStore<Task> = TaskListStore::new();

    store.subscribe(|change, view| {
        println!("  -> {:?} ({} tasks)", change, view.len());
    });

    // 1. Add tasks (blank text is ignored)
    println!("1. Adding tasks...");
    store.add("Buy milk");
    store.add("Write report");
    store.add("Call the plumber");
    store.add("   ");
    println!();

    // 2. Complete and re-prioritize
    println!("2. Completing task 1, raising task 2 to high...");
    store.toggle_complete(0);
    store.set_priority(1, Priority::High);
    println!();

    // 3. Edit with a working buffer
    println!("3. Editing task 3...");
    store.begin_edit(2);
    store.update_edit_buffer("Call the plumber before noon");
    let snapshot = store.commit_edit();
    println!("  Task 3 is now: {}\n", snapshot[2].text);

    // 4. Snapshots are immutable
    println!("4. Removing task 1 while holding the old snapshot...");
    let before = store.snapshot();
    store.remove(0);
    println!("  Old snapshot still has {} tasks, store has {}\n", before.len(), store.len());

    // 5. Filtered views
    for filter in [Filter::All, Filter::Active, Filter::Completed] {
        store.set_filter(filter);
        let visible: Vec<_> = store.visible_tasks().map(|t| t.text.as_str()).collect();
        println!("5. Filter {}: {:?}", filter, visible);
    }
    println!();

    store.set_filter(Filter::All);
    print!("{}", View::from_store(&store, "%H:%M").to_text());
}
