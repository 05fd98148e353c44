//! The controller a front end drives.
//!
//! [`PickerSession`] wires the collection, the selector and a notifier
//! together. It turns every user-visible outcome into one [`Notice`], holds
//! the pending bulk-import preview between "parse" and "confirm", and
//! computes the quick statistics shown next to the pick button.

use crate::clipboard::ClipboardSource;
use crate::collection::{CollectionError, ItemCollection};
use crate::import::{self, ParseOutcome};
use crate::models::{color_for, Item, ValidationError};
use crate::notify::{LogNotifier, Notice, Notifier};
use crate::selector::{RandomSelector, SelectError, SpinState, Ticker};

/// A name waiting to be imported, with the color it will receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStep {
    /// The text was blank.
    NoInput,
    NoValidEntries,
    AllDuplicates,
    /// Names ready for confirmation.
    Preview(Vec<PreviewEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Clipboard text was parsed.
    Parsed(ImportStep),
    /// The clipboard held no text.
    EmptyClipboard,
    /// The clipboard could not be read; ask for the text instead.
    ManualEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    /// Chance of any single item being picked, in whole percent.
    pub single_probability_percent: u32,
    /// 1 when an item is currently selected, else 0.
    pub selected: usize,
}

pub struct PickerSession<N = LogNotifier> {
    collection: ItemCollection,
    selector: RandomSelector,
    notifier: N,
    preview: Option<Vec<PreviewEntry>>,
}

impl<N: Notifier> PickerSession<N> {
    pub fn new(collection: ItemCollection, selector: RandomSelector, notifier: N) -> Self {
        Self {
            collection,
            selector,
            notifier,
            preview: None,
        }
    }

    pub fn collection(&self) -> &ItemCollection {
        &self.collection
    }

    pub fn selector(&self) -> &RandomSelector {
        &self.selector
    }

    pub fn search(&self, query: &str) -> Vec<Item> {
        self.collection.search(query)
    }

    pub fn stats(&self) -> Stats {
        let total = self.collection.len();
        let single_probability_percent = if total == 0 {
            0
        } else {
            (100.0 / total as f64).round() as u32
        };
        Stats {
            total,
            single_probability_percent,
            selected: usize::from(self.collection.selection().is_some()),
        }
    }

    // ============================================================
    // Single-item edits
    // ============================================================

    pub fn add(&mut self, name: &str) -> Result<Item, CollectionError> {
        match self.collection.add(name) {
            Ok(item) => {
                self.notify(Notice::success("Added", "New item added"));
                Ok(item)
            }
            Err(e) => {
                self.notify_collection_error(&e);
                Err(e)
            }
        }
    }

    pub fn edit(&mut self, id: &str, new_name: &str) -> Result<Item, CollectionError> {
        match self.collection.edit(id, new_name) {
            Ok(item) => {
                self.notify(Notice::success("Updated", "Item updated"));
                Ok(item)
            }
            Err(e) => {
                self.notify_collection_error(&e);
                Err(e)
            }
        }
    }

    /// Delete `id`. Absent ids are a silent no-op.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.collection.remove(id);
        if removed {
            self.notify(Notice::success("Deleted", "Item deleted"));
        }
        removed
    }

    // ============================================================
    // Bulk import
    // ============================================================

    /// Parse `text` and hold the result as the pending preview.
    pub fn preview_import(&mut self, text: &str) -> ImportStep {
        self.preview = None;

        if text.trim().is_empty() {
            self.notify(Notice::error("Input error", "Enter the text to import"));
            return ImportStep::NoInput;
        }

        let outcome = import::parse(text, &self.collection.names());
        match outcome {
            ParseOutcome::NoValidEntries => {
                self.notify(Notice::error("Parse error", "No valid items found"));
                ImportStep::NoValidEntries
            }
            ParseOutcome::AllDuplicates => {
                self.notify(Notice::info(
                    "Nothing to import",
                    "All items already exist, nothing was added",
                ));
                ImportStep::AllDuplicates
            }
            ParseOutcome::Candidates(names) => {
                let base = self.collection.len();
                let entries: Vec<PreviewEntry> = names
                    .into_iter()
                    .enumerate()
                    .map(|(index, name)| PreviewEntry {
                        name,
                        color: color_for(base + index).to_string(),
                    })
                    .collect();
                self.preview = Some(entries.clone());
                ImportStep::Preview(entries)
            }
        }
    }

    pub fn pending_preview(&self) -> Option<&[PreviewEntry]> {
        self.preview.as_deref()
    }

    /// Import the pending preview. Returns the created items, empty when
    /// nothing was pending.
    pub fn confirm_import(&mut self) -> Vec<Item> {
        let Some(entries) = self.preview.take() else {
            return Vec::new();
        };

        let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
        let created = self.collection.bulk_import(&names);
        self.notify(Notice::success(
            "Imported",
            format!("Added {} items", created.len()),
        ));
        created
    }

    pub fn cancel_import(&mut self) {
        self.preview = None;
    }

    /// Read the clipboard and preview its contents.
    pub fn quick_paste(&mut self, clipboard: &mut impl ClipboardSource) -> PasteOutcome {
        let text = match clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Quick paste fell back to manual entry: {}", e);
                self.notify(Notice::error(
                    "Read failed",
                    "Cannot access the clipboard, paste the text manually",
                ));
                return PasteOutcome::ManualEntry;
            }
        };

        if text.trim().is_empty() {
            self.notify(Notice::error(
                "Clipboard is empty",
                "Copy the text to import first",
            ));
            return PasteOutcome::EmptyClipboard;
        }

        PasteOutcome::Parsed(self.preview_import(&text))
    }

    // ============================================================
    // Random pick
    // ============================================================

    /// Run an animated pick and record the result as the selection.
    pub async fn pick<T, F>(&mut self, ticker: &mut T, observe: F) -> Result<Item, SelectError>
    where
        T: Ticker,
        F: FnMut(&SpinState),
    {
        if self.collection.is_empty() {
            self.notify(Notice::not_found("Nothing to pick", "Add some items first"));
            return Err(SelectError::EmptyCollection);
        }

        self.collection.clear_selection();
        let items = self.collection.items().to_vec();
        let item = self.selector.run_observed(&items, ticker, observe).await?;

        self.collection.set_selection(&item);
        self.notify(Notice::success(
            "Picked!",
            format!("Randomly picked: {}", item.name),
        ));
        Ok(item)
    }

    fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    fn notify_collection_error(&self, error: &CollectionError) {
        let notice = match error {
            CollectionError::Validation(ValidationError::Empty) => {
                Notice::error("Input error", "Item name cannot be empty")
            }
            CollectionError::Validation(e @ ValidationError::TooLong { .. }) => {
                Notice::error("Input error", e.to_string())
            }
            CollectionError::NotFound(id) => {
                Notice::not_found("Not found", format!("No item with id {}", id))
            }
        };
        self.notify(notice);
    }
}
