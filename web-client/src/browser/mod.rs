mod dom;
mod scheduler;
mod socket;

use wasm_bindgen::prelude::*;

use lobby_common::defaults::WS_PATH;
use lobby_common::{log, logger, LobbySettings};

use crate::controller::LobbyController;
use dom::BrowserDom;
use scheduler::BrowserScheduler;
use socket::BrowserSocket;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    logger::init_logger(Some("Client".to_string()));

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global `window` exists"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;
    let url = format!("ws://{}{}", window.location().host()?, WS_PATH);

    let socket = BrowserSocket::connect(&url)?;
    let controller = LobbyController::new(
        BrowserDom::new(document),
        socket.clone(),
        BrowserScheduler::new(window),
        LobbySettings::default(),
    );
    controller
        .mount()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    // The message handler keeps the controller alive for the page's lifetime.
    socket.on_text(move |text| controller.handle_message(&text));

    log!("Lobby client connecting to {}", url);
    Ok(())
}
