/// Receiver for recoverable load problems.
///
/// Loading keeps going after a message is logged; the offending value is
/// replaced by its default.
pub trait LoadCallback {
    fn log_message(&mut self, msg: &str);
}

/// Stores messages so the caller can show them once loading is done.
#[derive(Debug, Default)]
pub struct CollectingCallback {
    messages: Vec<String>,
}

impl CollectingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Return all collected messages and start over empty.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl LoadCallback for CollectingCallback {
    fn log_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }
}

/// Forwards every message to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCallback;

impl LoadCallback for TracingCallback {
    fn log_message(&mut self, msg: &str) {
        tracing::warn!("{}", msg);
    }
}

/// Message for an attribute whose text could not be understood.
pub fn invalid_value_message(element: &str, attrib: &str, raw: &str) -> String {
    format!(
        "Invalid value '{}' for attribute '{}' on <{}>, using default",
        raw, attrib, element
    )
}
