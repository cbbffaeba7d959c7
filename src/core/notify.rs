use std::sync::mpsc::{channel, Receiver, Sender};

/// Fan-out of change events to any number of listeners.
///
/// Listeners whose receiver has been dropped are pruned on the next emit.
#[derive(Debug)]
pub struct Notifier<T: Clone> {
    subscribers: Vec<Sender<T>>,
}

impl<T: Clone> Notifier<T> {
    pub fn new() -> Self {
        Self { subscribers: Vec::new() }
    }

    /// Register a new listener
    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Send an event to every live listener
    pub fn emit(&mut self, event: T) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Clone> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}
