use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, WebSocket};

use lobby_common::log_error;

use crate::transport::Transport;

/// The page's single lobby connection. Clones share the socket.
#[derive(Clone)]
pub struct BrowserSocket {
    socket: WebSocket,
}

impl BrowserSocket {
    pub fn connect(url: &str) -> Result<Self, JsValue> {
        Ok(Self { socket: WebSocket::new(url)? })
    }

    /// Installs the handler for text frames; binary frames are ignored.
    pub fn on_text(&self, handler: impl Fn(String) + 'static) {
        let closure = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => handler(text),
                None => log_error!("Ignoring non-text frame"),
            }
        });
        self.socket
            .set_onmessage(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }
}

impl Transport for BrowserSocket {
    fn is_open(&self) -> bool {
        self.socket.ready_state() == WebSocket::OPEN
    }

    fn send_text(&self, payload: &str) -> Result<(), String> {
        self.socket
            .send_with_str(payload)
            .map_err(|e| format!("{:?}", e))
    }
}
