//! Progress sinks
//!
//! The pipeline pushes human-readable status lines into a [`ProgressSink`].
//! It never looks at what the sink does with them.

use std::sync::mpsc::Sender;
use std::sync::Mutex;

pub trait ProgressSink {
    fn notify(&self, message: &str);
}

/// Discards everything. Stands in for "no sink".
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn notify(&self, _message: &str) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&str),
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Forwards messages to another thread. A dropped receiver is ignored.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Sender<String>,
}

impl ChannelSink {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn notify(&self, message: &str) {
        let _ = self.sender.send(message.to_string());
    }
}

/// Writes each message as an INFO event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn notify(&self, message: &str) {
        tracing::info!(target: "vid_gif::progress", "{}", message);
    }
}

/// Keeps every message; handy for tests and for replaying a run.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl ProgressSink for CollectingSink {
    fn notify(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::sync::mpsc;

    #[test]
    fn test_closure_sink() {
        let seen = RefCell::new(Vec::new());
        let sink = |m: &str| seen.borrow_mut().push(m.to_string());
        sink.notify("one");
        sink.notify("two");
        assert_eq!(*seen.borrow(), vec!["one", "two"]);
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        sink.notify("first");
        assert_eq!(rx.recv().unwrap(), "first");
        drop(rx);
        sink.notify("nobody listening");
    }

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        for m in ["a", "b", "c"] {
            sink.notify(m);
        }
        assert_eq!(sink.messages(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_null_and_tracing_sinks_accept_messages() {
        NullSink.notify("ignored");
        TracingSink.notify("logged");
    }
}
