//! Bulk import of pasted text.
//!
//! Text is split on newlines, commas, semicolons and vertical bars. Each
//! fragment is trimmed and kept when it is 1 to 20 characters long. Fragments
//! matching an existing name (case-insensitively) are dropped; repeats within
//! the same paste are kept.

use std::collections::HashSet;

use crate::models::MAX_NAME_LEN;

const DELIMITERS: [char; 4] = ['\n', ',', ';', '|'];

/// Result of parsing pasted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// No fragment had a usable length.
    NoValidEntries,
    /// Every usable fragment already exists in the collection.
    AllDuplicates,
    /// New names, in the order they appeared.
    Candidates(Vec<String>),
}

impl ParseOutcome {
    /// Candidate names, empty for the two rejection outcomes.
    pub fn candidates(&self) -> &[String] {
        match self {
            ParseOutcome::Candidates(names) => names,
            _ => &[],
        }
    }
}

/// Parse `raw` into new names, skipping those in `existing_names`.
///
/// `existing_names` may be given in any case; comparison is on lowercase.
pub fn parse<S: AsRef<str>>(raw: &str, existing_names: &[S]) -> ParseOutcome {
    let fragments: Vec<&str> = raw
        .split(&DELIMITERS[..])
        .map(str::trim)
        .filter(|fragment| {
            let len = fragment.chars().count();
            (1..=MAX_NAME_LEN).contains(&len)
        })
        .collect();

    if fragments.is_empty() {
        return ParseOutcome::NoValidEntries;
    }

    let existing: HashSet<String> = existing_names
        .iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect();

    let fresh: Vec<String> = fragments
        .into_iter()
        .filter(|fragment| !existing.contains(&fragment.to_lowercase()))
        .map(str::to_string)
        .collect();

    if fresh.is_empty() {
        ParseOutcome::AllDuplicates
    } else {
        ParseOutcome::Candidates(fresh)
    }
}
