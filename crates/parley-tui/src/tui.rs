use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Interval between ticks. Ticks drive the loading animation, expire the
/// copy/save indicators, pick up finished requests and redraw after a resize.
pub const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Tick,
}

/// The terminal plus the task feeding it input and ticks.
pub struct Tui {
    pub terminal: Terminal<CrosstermBackend<Stderr>>,
    events: mpsc::UnboundedReceiver<AppEvent>,
    reader: JoinHandle<()>,
}

impl Tui {
    /// Switch the terminal into raw alternate-screen mode and start reading
    /// events.
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stderr()))?;

        let (tx, events) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_events(tx));

        Ok(Self { terminal, events, reader })
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.events.recv().await
    }

    /// Stop reading events and hand the terminal back to the shell.
    pub fn exit(self) -> Result<()> {
        self.reader.abort();
        restore()
    }
}

/// Multiplex terminal input with the tick timer until the receiver goes away.
async fn read_events(tx: mpsc::UnboundedSender<AppEvent>) {
    let mut input = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_RATE);

    loop {
        let event = tokio::select! {
            _ = ticker.tick() => Some(AppEvent::Tick),
            maybe = input.next() => match maybe {
                // Only key presses, not releases
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                Some(Ok(Event::Mouse(mouse))) => Some(AppEvent::Mouse(mouse)),
                Some(Ok(_)) => None,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "terminal event stream error");
                    None
                }
                None => break,
            },
        };

        if let Some(event) = event {
            if tx.send(event).is_err() {
                break;
            }
        }
    }
}

fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Restore the terminal before the default panic output is printed.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}
