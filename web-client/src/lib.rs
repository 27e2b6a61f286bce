//! Browser lobby client: nickname form, live roster and the pre-match
//! countdown, driven by the lobby server over a WebSocket.

pub mod controller;
pub mod countdown;
pub mod dom;
pub mod element_builder;
pub mod scheduler;
pub mod store;
pub mod transport;
pub mod views;

#[cfg(target_arch = "wasm32")]
mod browser;

pub use controller::{LobbyController, LobbyState};
pub use countdown::{Countdown, TimerState};
pub use element_builder::{Attr, Child, ElementBuilder, ElementSpec};
pub use store::{Store, Subscription};
