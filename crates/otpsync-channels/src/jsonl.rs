//! JSON-lines watch link.
//!
//! Writes each message as one JSON object per line. Used by the CLI to hand
//! messages to whatever bridge forwards them to the watch, and handy for
//! inspecting traffic by eye.

use crate::link::{DeviceLink, SendReceipt};
use crate::Result;
use async_trait::async_trait;
use otpsync_core::types::DeviceMessage;
use parking_lot::Mutex;
use std::io::Write;

/// A [`DeviceLink`] that writes messages to any [`Write`] sink.
pub struct JsonLinesLink {
    id: String,
    sink: Mutex<Box<dyn Write + Send>>,
    sent: Mutex<u64>,
}

impl std::fmt::Debug for JsonLinesLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesLink").field("id", &self.id).finish()
    }
}

impl JsonLinesLink {
    /// Create a link writing to `sink`.
    pub fn new(id: impl Into<String>, sink: Box<dyn Write + Send>) -> Self {
        Self {
            id: id.into(),
            sink: Mutex::new(sink),
            sent: Mutex::new(0),
        }
    }

    /// Create a link writing to standard output.
    pub fn stdout() -> Self {
        Self::new("stdout", Box::new(std::io::stdout()))
    }
}

#[async_trait]
impl DeviceLink for JsonLinesLink {
    fn link_id(&self) -> &str {
        &self.id
    }

    async fn send(&self, message: &DeviceMessage) -> Result<SendReceipt> {
        let line = serde_json::to_string(message)?;
        {
            let mut sink = self.sink.lock();
            writeln!(sink, "{line}")?;
            sink.flush()?;
        }

        let mut sent = self.sent.lock();
        *sent += 1;
        Ok(SendReceipt::new(*sent))
    }
}
