use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use crate::error::{AssistantError, Result};

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Writes to the system clipboard through `arboard`, falling back to the
/// platform clipboard commands when no native clipboard is reachable.
pub struct SystemClipboard {
    commands: Vec<(&'static str, Vec<&'static str>)>,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self {
            commands: vec![
                ("pbcopy", vec![]),
                ("wl-copy", vec![]),
                ("xclip", vec!["-selection", "clipboard"]),
                ("xsel", vec!["--clipboard", "--input"]),
            ],
        }
    }
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_native(text: &str) -> std::result::Result<(), arboard::Error> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text)
    }

    fn pipe(program: &str, args: &[&str], text: &str) -> std::io::Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::other(format!("{} exited with {}", program, status)))
        }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        match Self::write_native(text) {
            Ok(()) => return Ok(()),
            Err(e) => tracing::debug!(error = %e, "native clipboard unavailable"),
        }

        for (program, args) in &self.commands {
            match Self::pipe(program, args, text) {
                Ok(()) => return Ok(()),
                Err(e) => tracing::debug!(program, error = %e, "clipboard command unavailable"),
            }
        }
        Err(AssistantError::Clipboard("no clipboard available".to_string()))
    }
}

/// Records copied text instead of touching the system clipboard.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.last().cloned())
    }

    pub fn history(&self) -> Vec<String> {
        self.contents.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        self.contents
            .lock()
            .map_err(|_| AssistantError::Clipboard("clipboard lock poisoned".to_string()))?
            .push(text.to_string());
        Ok(())
    }
}
