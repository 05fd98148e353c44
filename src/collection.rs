//! The authoritative in-memory item list.
//!
//! Every mutating call changes the list first and then performs exactly one
//! write through [`ItemStorage`], so reads after a call always reflect it.
//! The collection also tracks the current selection, which is either `None`
//! or a copy of an item that is still present.

use thiserror::Error;

use crate::models::{default_items, validate_name, Item, ValidationError};
use crate::storage::ItemStorage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Item not found: {0}")]
    NotFound(String),
}

pub struct ItemCollection {
    items: Vec<Item>,
    selection: Option<Item>,
    storage: ItemStorage,
}

impl ItemCollection {
    /// Load from storage, seeding the default items into an empty store.
    pub fn load(storage: ItemStorage) -> Self {
        let mut collection = Self::load_without_seed(storage);
        if collection.items.is_empty() {
            tracing::info!("No stored items, seeding defaults");
            collection.items = default_items();
            collection.persist();
        }
        collection
    }

    /// Load from storage as is, leaving an empty store empty.
    pub fn load_without_seed(storage: ItemStorage) -> Self {
        let items = storage.load();
        Self {
            items,
            selection: None,
            storage,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn selection(&self) -> Option<&Item> {
        self.selection.as_ref()
    }

    /// Current names, as the bulk parser compares against them.
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.name.as_str()).collect()
    }

    pub fn add(&mut self, name: &str) -> Result<Item, CollectionError> {
        let name = validate_name(name)?;
        let item = Item::new(name, self.items.len());
        self.items.push(item.clone());
        self.persist();
        tracing::debug!("Added item {} ({})", item.id, item.name);
        Ok(item)
    }

    pub fn edit(&mut self, id: &str, new_name: &str) -> Result<Item, CollectionError> {
        let index = self
            .position(id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        let name = validate_name(new_name)?;

        self.items[index].name = name;
        let updated = self.items[index].clone();
        self.persist();

        if let Some(selected) = self.selection.as_mut() {
            if selected.id == id {
                selected.name = updated.name.clone();
            }
        }

        Ok(updated)
    }

    /// Delete the item with `id`. Absent ids are a no-op and return `false`.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.items.remove(index);
        self.persist();

        if self.selection.as_ref().is_some_and(|s| s.id == id) {
            self.selection = None;
        }
        true
    }

    /// Append `names` as new items in order with a single write.
    ///
    /// Names are taken as given; run them through [`crate::import::parse`]
    /// first for trimming, length and duplicate filtering.
    pub fn bulk_import<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<Item> {
        if names.is_empty() {
            return Vec::new();
        }

        let base = self.items.len();
        let created: Vec<Item> = names
            .iter()
            .enumerate()
            .map(|(index, name)| Item::new(name.as_ref(), base + index))
            .collect();

        self.items.extend(created.iter().cloned());
        self.persist();
        tracing::info!("Imported {} items", created.len());
        created
    }

    /// Case-insensitive substring filter; a blank query returns everything.
    pub fn search(&self, query: &str) -> Vec<Item> {
        let query = query.trim();
        if query.is_empty() {
            return self.items.clone();
        }

        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Mark `item` as the current selection. Ignored unless its id is present.
    pub fn set_selection(&mut self, item: &Item) {
        if let Some(current) = self.get(&item.id) {
            self.selection = Some(current.clone());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn persist(&self) {
        self.storage.save(&self.items);
    }
}
