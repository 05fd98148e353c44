use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest item name accepted, in characters.
pub const MAX_NAME_LEN: usize = 20;

/// Display colors cycled by creation ordinal.
///
/// `#85C1E9` appears twice; persisted collections already carry it at both
/// positions so the cycle is kept as is.
pub const PALETTE: [&str; 15] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9", "#F8C471", "#82E0AA", "#F1948A", "#85C1E9", "#D7BDE2",
];

/// Color for the item created at `ordinal` (zero-based collection position).
pub fn color_for(ordinal: usize) -> &'static str {
    PALETTE[ordinal % PALETTE.len()]
}

/// One entry of the collection.
///
/// The JSON shape (`id`, `name`, `color`, all strings) is the persisted
/// layout; adding fields here changes the stored format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique for the lifetime of the collection, never reused.
    pub id: String,
    pub name: String,
    /// Cosmetic only; never used for lookup or equality of names.
    pub color: String,
}

impl Item {
    /// Build an item with a fresh collision-resistant id.
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: color_for(ordinal).to_string(),
        }
    }
}

/// Errors for names rejected by add and edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Item name must not be empty")]
    Empty,

    #[error("Item name is {actual} characters, at most {max} allowed")]
    TooLong { max: usize, actual: usize },
}

/// Trim `raw` and check it against the name rules.
pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty);
    }
    let actual = name.chars().count();
    if actual > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            max: MAX_NAME_LEN,
            actual,
        });
    }
    Ok(name.to_string())
}
