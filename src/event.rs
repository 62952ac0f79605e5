use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    /// No input within the poll interval; the loop uses it to advance the
    /// game clock and redraw.
    Tick,
    Resize,
}

/// Reads terminal events on a background thread so the main loop can block
/// on a channel.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(poll_interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                let event = if event::poll(poll_interval).unwrap_or(false) {
                    match event::read() {
                        // Repeat and release events would double-type characters.
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            AppEvent::Key(key)
                        }
                        Ok(Event::Resize(_, _)) => AppEvent::Resize,
                        _ => continue,
                    }
                } else {
                    AppEvent::Tick
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

/// Poll often enough to draw every fall step without busy-waiting.
pub fn poll_interval(tick_interval: Duration) -> Duration {
    (tick_interval / 2).clamp(Duration::from_millis(5), Duration::from_millis(50))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_interval_bounds() {
        assert_eq!(poll_interval(Duration::from_millis(30)), Duration::from_millis(15));
        assert_eq!(poll_interval(Duration::from_millis(2)), Duration::from_millis(5));
        assert_eq!(poll_interval(Duration::from_millis(500)), Duration::from_millis(50));
    }
}
