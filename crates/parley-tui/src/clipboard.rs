use arboard::Clipboard;
use parley_core::error::Result;
use parley_core::{ChatError, ClipboardWriter};

/// System clipboard. A fresh handle per write; failures are reported, never fatal.
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new().map_err(|e| ChatError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| ChatError::Clipboard(e.to_string()))
    }
}
