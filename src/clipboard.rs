//! Clipboard access for quick paste.
//!
//! Reading can fail for many platform reasons (no display server, permission
//! denied, non-text contents). Callers treat any failure as a signal to fall
//! back to manual text entry.

use arboard::Clipboard;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

pub trait ClipboardSource {
    fn read_text(&mut self) -> Result<String, ClipboardError>;
}

/// The system clipboard, opened lazily on first read.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        if self.clipboard.is_none() {
            let clipboard =
                Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            self.clipboard = Some(clipboard);
        }

        let clipboard = self
            .clipboard
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("clipboard not initialized".to_string()))?;

        clipboard.get_text().map_err(|e| {
            tracing::debug!("Clipboard read failed: {}", e);
            ClipboardError::Unavailable(e.to_string())
        })
    }
}

/// Fixed clipboard contents, or a fixed failure.
#[derive(Debug, Clone)]
pub struct StaticClipboard {
    contents: Result<String, ClipboardError>,
}

impl StaticClipboard {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Ok(text.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            contents: Err(ClipboardError::Unavailable("no clipboard".to_string())),
        }
    }
}

impl ClipboardSource for StaticClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        self.contents.clone()
    }
}
