// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::view::{Paint, Surface};
use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    Resize(u16, u16),
    /// Output of a page component, delivered on the UI task.
    Paint(Paint),
}

/// Terminal input the UI reacts to. Key releases and repeats are ignored.
fn terminal_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

// Polling blocks, so it runs on its own thread. Ticks are due every
// `tick_rate` no matter how much input arrives in between.
fn spawn_input(sender: mpsc::UnboundedSender<Event>, tick_rate: Duration) {
    tokio::task::spawn_blocking(move || {
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout).unwrap_or(false) {
                match event::read() {
                    Ok(input) => {
                        if let Some(event) = terminal_event(input) {
                            if sender.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => tracing::warn!("Failed to read terminal event: {}", e),
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if sender.send(Event::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });
}

pub struct EventHandler {
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate: u64) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        spawn_input(sender.clone(), Duration::from_millis(tick_rate));
        Self { sender, receiver }
    }

    pub fn surface(&self) -> ChannelSurface {
        ChannelSurface {
            sender: self.sender.clone(),
        }
    }

    pub async fn next(&mut self) -> Result<Event> {
        self.receiver
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("Event channel closed"))
    }
}

// Paints share the input channel, so every screen change happens on the
// UI task in the order it was painted.

/// Surface that queues paints for the event loop; components may paint from
/// any task.
#[derive(Clone)]
pub struct ChannelSurface {
    sender: mpsc::UnboundedSender<Event>,
}

impl Surface for ChannelSurface {
    fn paint(&self, paint: Paint) {
        if self.sender.send(Event::Paint(paint)).is_err() {
            tracing::debug!("Dropping paint after the UI closed");
        }
    }
}
