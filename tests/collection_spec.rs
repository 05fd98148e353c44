use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use randpick::collection::{CollectionError, ItemCollection};
use randpick::models::{color_for, default_items, Item, ValidationError};
use randpick::storage::{ItemStorage, STORAGE_KEY};
use randpick::store::MemoryBlobStore;
use speculate2::speculate;

/// An unseeded collection over a fresh memory store, plus the store handle.
fn empty_collection() -> (ItemCollection, MemoryBlobStore) {
    let store = MemoryBlobStore::new();
    let collection = ItemCollection::load_without_seed(ItemStorage::new(store.clone()));
    (collection, store)
}

fn stored_items(store: &MemoryBlobStore) -> Vec<Item> {
    ItemStorage::new(store.clone()).load()
}

fn assert_unique_ids(collection: &ItemCollection) {
    let ids: HashSet<&str> = collection.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids.len(), collection.len());
}

speculate! {
    describe "load" {
        it "seeds the ten defaults into an empty store with one write" {
            let store = MemoryBlobStore::new();
            let collection = ItemCollection::load(ItemStorage::new(store.clone()));

            assert_eq!(collection.items(), default_items().as_slice());
            assert_eq!(store.write_count(), 1);
            assert_eq!(stored_items(&store), default_items());
        }

        it "seeds defaults with ids 1 to 10 and palette colors" {
            let defaults = default_items();
            assert_eq!(defaults.len(), 10);
            assert_eq!(defaults[0].name, "Pizza");
            assert_eq!(defaults[5].name, "中式炒饭");
            for (index, item) in defaults.iter().enumerate() {
                assert_eq!(item.id, (index + 1).to_string());
                assert_eq!(item.color, color_for(index));
            }
        }

        it "seeds defaults over a corrupt blob" {
            let store = MemoryBlobStore::with_blob(STORAGE_KEY, "garbage");
            let collection = ItemCollection::load(ItemStorage::new(store.clone()));
            assert_eq!(collection.len(), 10);
            assert_eq!(store.write_count(), 1);
        }

        it "keeps stored items without writing" {
            let store = MemoryBlobStore::new();
            let stored = vec![Item::new("Only", 0)];
            ItemStorage::new(store.clone()).save(&stored);

            let collection = ItemCollection::load(ItemStorage::new(store.clone()));

            assert_eq!(collection.items(), stored.as_slice());
            assert_eq!(store.write_count(), 1);
        }

        it "leaves an empty store empty without seeding" {
            let (collection, store) = empty_collection();
            assert!(collection.is_empty());
            assert_eq!(store.write_count(), 0);
        }
    }

    describe "add" {
        before {
            let (mut collection, store) = empty_collection();
        }

        it "appends a trimmed item and persists it" {
            let item = collection.add("  Pho  ").expect("add failed");

            assert_eq!(item.name, "Pho");
            assert_eq!(item.color, color_for(0));
            assert_eq!(collection.items(), &[item.clone()]);
            assert_eq!(stored_items(&store), vec![item]);
            assert_eq!(store.write_count(), 1);
        }

        it "takes the color from the current length" {
            collection.add("one").expect("add failed");
            collection.add("two").expect("add failed");
            let third = collection.add("three").expect("add failed");
            assert_eq!(third.color, color_for(2));
        }

        it "rejects empty and blank names without writing" {
            assert_eq!(
                collection.add(""),
                Err(CollectionError::Validation(ValidationError::Empty))
            );
            assert_eq!(
                collection.add("   "),
                Err(CollectionError::Validation(ValidationError::Empty))
            );
            assert!(collection.is_empty());
            assert_eq!(store.write_count(), 0);
        }

        it "rejects names over twenty characters" {
            let result = collection.add("this name is far too long");
            assert!(matches!(
                result,
                Err(CollectionError::Validation(ValidationError::TooLong { .. }))
            ));
            assert!(collection.is_empty());
        }

        it "accepts duplicate names" {
            let a = collection.add("Curry").expect("add failed");
            let b = collection.add("curry").expect("add failed");
            assert_ne!(a.id, b.id);
            assert_eq!(collection.len(), 2);
        }
    }

    describe "edit" {
        before {
            let (mut collection, store) = empty_collection();
            let first = collection.add("first").expect("add failed");
            let second = collection.add("second").expect("add failed");
        }

        it "renames in place keeping id, color and order" {
            let edited = collection.edit(&first.id, " renamed ").expect("edit failed");

            assert_eq!(edited.id, first.id);
            assert_eq!(edited.color, first.color);
            assert_eq!(edited.name, "renamed");
            assert_eq!(collection.items()[0], edited);
            assert_eq!(collection.items()[1], second);
            assert_eq!(stored_items(&store)[0].name, "renamed");
            assert_eq!(store.write_count(), 3);
        }

        it "fails with not found for an unknown id" {
            let before = collection.items().to_vec();
            assert_eq!(
                collection.edit("nope", "x"),
                Err(CollectionError::NotFound("nope".to_string()))
            );
            assert_eq!(collection.items(), before.as_slice());
            assert_eq!(store.write_count(), 2);
        }

        it "reports not found before validating the name" {
            assert!(matches!(collection.edit("nope", ""), Err(CollectionError::NotFound(_))));
        }

        it "rejects a blank new name" {
            assert_eq!(
                collection.edit(&first.id, "  "),
                Err(CollectionError::Validation(ValidationError::Empty))
            );
            assert_eq!(collection.items()[0].name, "first");
        }

        it "rejects a new name over twenty characters" {
            let result = collection.edit(&first.id, "this name is far too long");
            assert!(matches!(
                result,
                Err(CollectionError::Validation(ValidationError::TooLong { max: 20, .. }))
            ));
            assert_eq!(collection.items()[0], first);
            assert_eq!(store.write_count(), 2);
        }

        it "refreshes the selection when the selected item is renamed" {
            collection.set_selection(&first);
            collection.edit(&first.id, "fresh").expect("edit failed");

            let selected = collection.selection().expect("selection cleared");
            assert_eq!(selected.id, first.id);
            assert_eq!(selected.name, "fresh");
        }

        it "leaves the selection alone when another item is renamed" {
            collection.set_selection(&first);
            collection.edit(&second.id, "other").expect("edit failed");
            assert_eq!(collection.selection().map(|s| s.name.as_str()), Some("first"));
        }
    }

    describe "remove" {
        before {
            let (mut collection, store) = empty_collection();
            let first = collection.add("first").expect("add failed");
            let second = collection.add("second").expect("add failed");
        }

        it "deletes the item and persists" {
            assert!(collection.remove(&first.id));
            assert_eq!(collection.items(), &[second.clone()]);
            assert_eq!(stored_items(&store), vec![second]);
            assert_eq!(store.write_count(), 3);
        }

        it "is a no-op for an unknown id" {
            assert!(!collection.remove("nope"));
            assert_eq!(collection.len(), 2);
            assert_eq!(store.write_count(), 2);
        }

        it "clears the selection when the selected item is deleted" {
            collection.set_selection(&second);
            collection.remove(&second.id);
            assert!(collection.selection().is_none());
        }

        it "keeps the selection when another item is deleted" {
            collection.set_selection(&second);
            collection.remove(&first.id);
            assert_eq!(collection.selection().map(|s| s.id.clone()), Some(second.id.clone()));
        }

        it "never reuses ids after deletion" {
            collection.remove(&second.id);
            let third = collection.add("third").expect("add failed");
            assert_ne!(third.id, second.id);
            assert_unique_ids(&collection);
        }
    }

    describe "bulk_import" {
        before {
            let (mut collection, store) = empty_collection();
            collection.add("existing").expect("add failed");
        }

        it "appends in order with one write and continuing colors" {
            let created = collection.bulk_import(&["a", "b", "c"]);

            assert_eq!(created.len(), 3);
            assert_eq!(collection.len(), 4);
            let names: Vec<&str> = collection.items().iter().map(|i| i.name.as_str()).collect();
            assert_eq!(names, vec!["existing", "a", "b", "c"]);
            for (index, item) in created.iter().enumerate() {
                assert_eq!(item.color, color_for(1 + index));
            }
            assert_eq!(store.write_count(), 2);
            assert_eq!(stored_items(&store).len(), 4);
            assert_unique_ids(&collection);
        }

        it "does nothing for an empty list" {
            let none: [&str; 0] = [];
            assert!(collection.bulk_import(&none).is_empty());
            assert_eq!(store.write_count(), 1);
        }
    }

    describe "failing writes" {
        before {
            let (mut collection, store) = empty_collection();
            let first = collection.add("first").expect("add failed");
            let saved = store.raw(STORAGE_KEY).expect("nothing saved");
            store.set_fail_writes(true);
        }

        it "keeps an added item in memory" {
            let item = collection.add("Ramen").expect("add failed");

            assert_eq!(collection.len(), 2);
            assert_eq!(collection.search("ramen"), vec![item]);
            assert_eq!(store.raw(STORAGE_KEY), Some(saved));
        }

        it "keeps an edit in memory" {
            collection.edit(&first.id, "renamed").expect("edit failed");

            assert_eq!(collection.items()[0].name, "renamed");
            assert_eq!(collection.search("REN").len(), 1);
            assert_eq!(store.raw(STORAGE_KEY), Some(saved));
        }

        it "keeps a removal in memory" {
            assert!(collection.remove(&first.id));

            assert!(collection.is_empty());
            assert!(collection.search("first").is_empty());
            assert_eq!(store.raw(STORAGE_KEY), Some(saved));
        }

        it "keeps a bulk import in memory" {
            let created = collection.bulk_import(&["a", "b"]);

            assert_eq!(created.len(), 2);
            assert_eq!(collection.len(), 3);
            assert_eq!(stored_items(&store), vec![first.clone()]);
            assert_eq!(store.raw(STORAGE_KEY), Some(saved));
        }

        it "invokes the failure hook once per mutation" {
            let failures = Arc::new(AtomicUsize::new(0));
            let counter = failures.clone();
            let storage = ItemStorage::new(store.clone()).with_failure_hook(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            let mut hooked = ItemCollection::load_without_seed(storage);

            hooked.add("x").expect("add failed");
            hooked.bulk_import(&["y", "z"]);

            assert_eq!(failures.load(Ordering::SeqCst), 2);
            assert_eq!(hooked.len(), 4);
            assert_eq!(store.raw(STORAGE_KEY), Some(saved));
        }
    }

    describe "search" {
        before {
            let (mut collection, _store) = empty_collection();
            collection.bulk_import(&["Pizza", "pizza bianca", "Sushi", "Tacos"]);
        }

        it "matches substrings case-insensitively in order" {
            let names: Vec<String> = collection.search("PIZ").into_iter().map(|i| i.name).collect();
            assert_eq!(names, vec!["Pizza", "pizza bianca"]);
        }

        it "returns everything for an empty or blank query" {
            assert_eq!(collection.search(""), collection.items().to_vec());
            assert_eq!(collection.search("   "), collection.items().to_vec());
        }

        it "returns nothing when no name matches" {
            assert!(collection.search("ramen").is_empty());
        }
    }

    describe "selection" {
        it "ignores items that are not in the collection" {
            let (mut collection, _store) = empty_collection();
            collection.add("here").expect("add failed");
            collection.set_selection(&Item::new("elsewhere", 0));
            assert!(collection.selection().is_none());
        }
    }

    describe "ids" {
        it "stay unique across mixed operations" {
            let (mut collection, _store) = empty_collection();
            let mut ids = Vec::new();
            for round in 0..20 {
                let item = collection.add(&format!("item {}", round)).expect("add failed");
                ids.push(item.id.clone());
                if round % 3 == 0 {
                    collection.remove(&ids[round / 2]);
                }
                if round % 4 == 0 {
                    if let Some(first) = collection.items().first().cloned() {
                        collection.edit(&first.id, "edited").expect("edit failed");
                    }
                }
                collection.bulk_import(&["bulk"]);
                assert_unique_ids(&collection);
            }
        }
    }
}
