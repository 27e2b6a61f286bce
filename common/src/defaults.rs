use std::time::Duration;

/// Roster size at which the countdown starts.
pub const READY_THRESHOLD: usize = 2;
/// Countdown level at which the countdown completes.
pub const COUNTDOWN_CEILING: u32 = 50;
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

pub const WS_PATH: &str = "/ws";
pub const DEFAULT_PORT: u16 = 8080;
pub const MAX_CONNECTIONS: usize = 4;

pub fn avatar_path(position: usize) -> String {
    format!("/assets/default{}.jpg", position)
}
