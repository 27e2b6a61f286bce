pub mod config;
pub mod defaults;
pub mod identifiers;
pub mod logger;
pub mod protocol;
pub mod settings;

pub use identifiers::*;
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use settings::LobbySettings;
