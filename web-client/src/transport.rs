use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lobby_common::ClientMessage;

/// Outbound side of the lobby socket.
pub trait Transport {
    fn is_open(&self) -> bool;
    fn send_text(&self, payload: &str) -> Result<(), String>;
}

/// Keeps every frame it is asked to send. Starts open.
#[derive(Clone)]
pub struct RecordingTransport {
    open: Rc<Cell<bool>>,
    sent: Rc<RefCell<Vec<String>>>,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            open: Rc::new(Cell::new(true)),
            sent: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn set_open(&self, open: bool) {
        self.open.set(open);
    }

    pub fn sent_frames(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    /// Sent frames decoded back; frames that do not decode are skipped.
    pub fn sent_messages(&self) -> Vec<ClientMessage> {
        self.sent
            .borrow()
            .iter()
            .filter_map(|frame| ClientMessage::decode(frame).ok())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn is_open(&self) -> bool {
        self.open.get()
    }

    fn send_text(&self, payload: &str) -> Result<(), String> {
        if !self.open.get() {
            return Err("socket is not open".to_string());
        }
        self.sent.borrow_mut().push(payload.to_string());
        Ok(())
    }
}
