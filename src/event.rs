use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Tick,
    Resize,
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                let next = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => Some(AppEvent::Key(key)),
                        Ok(Event::Paste(text)) => Some(AppEvent::Paste(text)),
                        Ok(Event::Resize(_, _)) => Some(AppEvent::Resize),
                        _ => None,
                    }
                } else {
                    Some(AppEvent::Tick)
                };
                if let Some(ev) = next
                    && tx.send(ev).is_err()
                {
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
