use serde::{Deserialize, Serialize};

use crate::config::Validate;
use crate::defaults::{COUNTDOWN_CEILING, READY_THRESHOLD, TICK_INTERVAL};

/// Countdown tuning shared by the client state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbySettings {
    pub ready_threshold: usize,
    pub countdown_ceiling: u32,
    pub tick_interval_ms: u32,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            ready_threshold: READY_THRESHOLD,
            countdown_ceiling: COUNTDOWN_CEILING,
            tick_interval_ms: TICK_INTERVAL.as_millis() as u32,
        }
    }
}

impl Validate for LobbySettings {
    fn validate(&self) -> Result<(), String> {
        if self.ready_threshold == 0 {
            return Err("ready_threshold must be greater than 0".to_string());
        }
        if self.countdown_ceiling == 0 {
            return Err("countdown_ceiling must be greater than 0".to_string());
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}
