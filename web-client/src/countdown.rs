//! Pre-match countdown.
//!
//! `Countdown` is a plain value: every input consumes the current value and
//! returns the next one together with the side effects the caller must
//! perform. The controller owns the interval and the socket; this module
//! only decides.

use lobby_common::{ClientMessage, LobbySettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    pub running: bool,
    pub counter: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Countdown {
    #[default]
    Idle,
    Running { counter: u32 },
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartTicking,
    StopTicking,
    Send(ClientMessage),
    Display(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Countdown,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(current: Countdown) -> Self {
        Self { next: current, effects: Vec::new() }
    }
}

impl Countdown {
    pub fn is_running(&self) -> bool {
        matches!(self, Countdown::Running { .. })
    }

    pub fn timer_state(&self) -> TimerState {
        match *self {
            Countdown::Running { counter } => TimerState { running: true, counter },
            Countdown::Idle | Countdown::Done => TimerState { running: false, counter: 0 },
        }
    }

    /// A roster broadcast arrived with `players` entries.
    pub fn on_roster(self, players: usize, settings: &LobbySettings) -> Transition {
        if players < settings.ready_threshold || self.is_running() {
            return Transition::stay(self);
        }
        Transition {
            next: Countdown::Running { counter: 0 },
            effects: vec![Effect::StartTicking, Effect::Display(0)],
        }
    }

    /// One interval period elapsed. Ticks outside `Running` are stale and ignored.
    pub fn on_tick(self, settings: &LobbySettings) -> Transition {
        let Countdown::Running { counter } = self else {
            return Transition::stay(self);
        };

        let counter = counter + 1;
        let mut effects = vec![
            Effect::Send(ClientMessage::Timer { level: counter }),
            Effect::Display(counter),
        ];

        if counter >= settings.countdown_ceiling {
            effects.push(Effect::StopTicking);
            effects.push(Effect::Send(ClientMessage::TimerEnd));
            return Transition { next: Countdown::Done, effects };
        }

        Transition { next: Countdown::Running { counter }, effects }
    }

    /// The server echoed a level. It is displayed but never feeds the local
    /// counter; a level at the ceiling stops a running countdown without
    /// announcing `timerEnd`.
    pub fn on_server_level(self, level: u32, settings: &LobbySettings) -> Transition {
        let mut effects = vec![Effect::Display(level)];
        if level >= settings.countdown_ceiling && self.is_running() {
            effects.push(Effect::StopTicking);
            return Transition { next: Countdown::Done, effects };
        }
        Transition { next: self, effects }
    }
}
