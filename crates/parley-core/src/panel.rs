//! Chat panel visibility and copy confirmation state.

use std::time::{Duration, Instant};

/// How long the "copied" marker stays on an entry.
pub const COPY_CONFIRM_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelView {
    #[default]
    Collapsed,
    Expanded {
        minimized: bool,
    },
}

impl PanelView {
    /// Open the panel (toggle button).
    pub fn toggle(&mut self) {
        *self = match *self {
            PanelView::Collapsed => PanelView::Expanded { minimized: false },
            PanelView::Expanded { .. } => PanelView::Collapsed,
        };
    }

    /// Hide or show the body, keeping the header. No-op when collapsed.
    pub fn toggle_minimized(&mut self) {
        if let PanelView::Expanded { minimized } = self {
            *minimized = !*minimized;
        }
    }

    pub fn close(&mut self) {
        *self = PanelView::Collapsed;
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, PanelView::Expanded { .. })
    }

    pub fn is_minimized(&self) -> bool {
        matches!(self, PanelView::Expanded { minimized: true })
    }

    /// True when the chat body is visible.
    pub fn shows_body(&self) -> bool {
        matches!(self, PanelView::Expanded { minimized: false })
    }
}

/// Tracks which log entry, if any, was just copied.
#[derive(Debug, Clone, Default)]
pub struct CopyConfirmation {
    confirmed: Option<(usize, Instant)>,
}

impl CopyConfirmation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `index` as copied, replacing any earlier confirmation.
    pub fn confirm(&mut self, index: usize, now: Instant) {
        self.confirmed = Some((index, now + COPY_CONFIRM_DURATION));
    }

    pub fn confirmed_index(&self) -> Option<usize> {
        self.confirmed.map(|(index, _)| index)
    }

    pub fn is_confirmed(&self, index: usize) -> bool {
        self.confirmed_index() == Some(index)
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some((_, until)) = self.confirmed {
            if now >= until {
                self.confirmed = None;
            }
        }
    }
}
