// Todo list state with whole-list persistence

use crate::codec;
use crate::filter::Filter;
use crate::models::{IdGenerator, TodoItem, clean_text};
use crate::storage::Storage;
use eyre::{Context, Result};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// The item currently in inline-edit mode and its draft text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: i64,
    pub text: String,
}

/// Item totals per filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl Counts {
    pub fn get(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.all,
            Filter::Active => self.active,
            Filter::Completed => self.completed,
        }
    }
}

/// Owns the todo list and the session state around it
///
/// Every mutation that changes the list writes the full list back to
/// `storage`. Operations that find nothing to change do not write.
pub struct TodoStore<S: Storage> {
    storage: S,
    items: Vec<TodoItem>,
    ids: IdGenerator,
    filter: Filter,
    editing: Option<EditState>,
    input: String,
}

impl<S: Storage> TodoStore<S> {
    /// Load the list from `storage`
    ///
    /// An empty slot gives an empty list. A slot that does not parse is
    /// logged and treated as empty; it is overwritten on the next mutation.
    /// Items sharing an id keep their place, and all but the first get a
    /// fresh id.
    pub fn open(storage: S) -> Result<Self> {
        let mut items = match storage.read().context("Failed to read todo list from storage")? {
            None => {
                debug!("Storage slot is empty, starting with no items");
                Vec::new()
            }
            Some(contents) => match codec::decode(&contents) {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = ?e, "Stored todo list is malformed, starting with no items");
                    Vec::new()
                }
            },
        };

        let mut ids = IdGenerator::seeded(&items);
        let renumbered = renumber_duplicates(&mut items, &mut ids);

        info!(count = items.len(), renumbered, "Loaded todo list");

        Ok(Self {
            storage,
            ids,
            items,
            filter: Filter::default(),
            editing: None,
            input: String::new(),
        })
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// All items in insertion order
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn get(&self, id: i64) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Items selected by the current filter, in insertion order
    pub fn visible_items(&self) -> Vec<&TodoItem> {
        self.items.iter().filter(|item| self.filter.matches(item)).collect()
    }

    pub fn counts(&self) -> Counts {
        let completed = self.items.iter().filter(|item| item.completed).count();
        Counts {
            all: self.items.len(),
            active: self.items.len() - completed,
            completed,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // ========================================================================
    // List mutations
    // ========================================================================

    /// Append a new item, returning its id
    ///
    /// Blank text is ignored. On success the input draft is cleared.
    pub fn add(&mut self, text: &str) -> Result<Option<i64>> {
        let Some(text) = clean_text(text) else {
            debug!("Ignoring blank todo text");
            return Ok(None);
        };

        let id = self.ids.next_id().wrap_err("Failed to allocate todo id")?;
        self.items.push(TodoItem::new(id, text));
        self.input.clear();
        debug!(id, "Added todo");

        self.persist()?;
        Ok(Some(id))
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Add whatever is in the input draft
    pub fn submit_input(&mut self) -> Result<Option<i64>> {
        let text = std::mem::take(&mut self.input);
        let added = self.add(&text)?;
        if added.is_none() {
            self.input = text;
        }
        Ok(added)
    }

    /// Flip an item's completed flag
    pub fn toggle(&mut self, id: i64) -> Result<bool> {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            debug!(id, "toggle: no such todo");
            return Ok(false);
        };

        item.completed = !item.completed;
        debug!(id, completed = item.completed, "Toggled todo");

        self.persist()?;
        Ok(true)
    }

    pub fn remove(&mut self, id: i64) -> Result<bool> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            debug!(id, "remove: no such todo");
            return Ok(false);
        }

        if self.editing.as_ref().is_some_and(|edit| edit.id == id) {
            self.editing = None;
        }
        debug!(id, "Removed todo");

        self.persist()?;
        Ok(true)
    }

    // ========================================================================
    // Inline editing
    // ========================================================================

    /// Put an item into edit mode, seeding the draft with its text
    ///
    /// Any other edit in progress is dropped.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        let Some(text) = self.get(id).map(|item| item.text.clone()) else {
            debug!(id, "begin_edit: no such todo");
            return false;
        };

        self.editing = Some(EditState { id, text });
        true
    }

    /// Replace the draft of the edit in progress
    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        if let Some(edit) = self.editing.as_mut() {
            edit.text = text.into();
        }
    }

    /// Save the draft into the item under edit
    ///
    /// Returns false without touching the list when `id` is not being
    /// edited, the item is gone, or the draft is blank. A blank draft keeps
    /// the edit open.
    pub fn commit_edit(&mut self, id: i64) -> Result<bool> {
        let Some(edit) = self.editing.as_ref().filter(|edit| edit.id == id) else {
            debug!(id, "commit_edit: todo is not being edited");
            return Ok(false);
        };

        let Some(text) = clean_text(&edit.text).map(str::to_string) else {
            debug!(id, "commit_edit: ignoring blank text");
            return Ok(false);
        };

        self.editing = None;

        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            debug!(id, "commit_edit: no such todo");
            return Ok(false);
        };

        item.text = text;
        debug!(id, "Saved todo edit");

        self.persist()?;
        Ok(true)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // ========================================================================
    // View selection
    // ========================================================================

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    fn persist(&mut self) -> Result<()> {
        let contents = codec::encode(&self.items)?;
        self.storage
            .write(&contents)
            .wrap_err("Failed to write todo list to storage")
    }
}

/// Give every repeated id after its first occurrence a fresh one
fn renumber_duplicates(items: &mut [TodoItem], ids: &mut IdGenerator) -> usize {
    let mut seen = HashSet::with_capacity(items.len());
    let mut renumbered = 0;

    for item in items.iter_mut() {
        if seen.insert(item.id) {
            continue;
        }

        match ids.next_id() {
            Ok(id) => {
                warn!(old_id = item.id, new_id = id, "Renumbered duplicate todo id");
                item.id = id;
                seen.insert(id);
                renumbered += 1;
            }
            Err(e) => {
                // Lookups by id act on the first match
                warn!(id = item.id, error = ?e, "Keeping duplicate todo id");
            }
        }
    }

    renumbered
}
