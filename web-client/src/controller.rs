use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use lobby_common::{log, log_error, ClientMessage, LobbySettings, PlayerName, ProtocolError, ServerMessage};

use crate::countdown::{Countdown, Effect, TimerState, Transition};
use crate::dom::{Dom, DomError};
use crate::element_builder::{ElementBuilder, ElementSpec};
use crate::scheduler::{IntervalId, Scheduler};
use crate::store::{Store, Subscription};
use crate::transport::Transport;
use crate::views;

/// Joined players in arrival order; the order decides slots and avatars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LobbyState {
    pub players: Vec<String>,
}

impl LobbyState {
    pub fn with_player(&self, name: PlayerName) -> Self {
        let mut players = self.players.clone();
        players.push(name.into());
        Self { players }
    }
}

/// Bridges the lobby socket, the roster store, the countdown and the page.
pub struct LobbyController<D: Dom, T: Transport, S: Scheduler> {
    builder: ElementBuilder<D>,
    store: Store<LobbyState>,
    transport: T,
    scheduler: S,
    settings: LobbySettings,
    countdown: Cell<Countdown>,
    interval: Cell<Option<IntervalId>>,
    displayed_level: Cell<u32>,
    joined: Cell<bool>,
    app_root: RefCell<Option<D::Node>>,
    _subscription: Subscription,
    this: Weak<Self>,
}

impl<D, T, S> LobbyController<D, T, S>
where
    D: Dom + 'static,
    T: Transport + 'static,
    S: Scheduler + 'static,
{
    pub fn new(dom: D, transport: T, scheduler: S, settings: LobbySettings) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| {
            let store = Store::new(LobbyState::default());
            let listener = this.clone();
            let subscription = store.subscribe(move |state: &LobbyState| {
                if let Some(controller) = listener.upgrade() {
                    controller.on_state_changed(state);
                }
            });

            Self {
                builder: ElementBuilder::new(dom),
                store,
                transport,
                scheduler,
                settings,
                countdown: Cell::new(Countdown::Idle),
                interval: Cell::new(None),
                displayed_level: Cell::new(0),
                joined: Cell::new(false),
                app_root: RefCell::new(None),
                _subscription: subscription,
                this: this.clone(),
            }
        })
    }

    pub fn state(&self) -> Rc<LobbyState> {
        self.store.get_state()
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown.get()
    }

    pub fn timer_state(&self) -> TimerState {
        self.countdown.get().timer_state()
    }

    pub fn displayed_level(&self) -> u32 {
        self.displayed_level.get()
    }

    pub fn has_joined(&self) -> bool {
        self.joined.get()
    }

    /// Shows the nickname form.
    pub fn mount(&self) -> Result<(), DomError> {
        let this = self.this.clone();
        let on_join = move || {
            if let Some(controller) = this.upgrade() {
                controller.submit_from_form();
            }
        };
        self.swap_root(views::app(views::join_form(on_join)))
    }

    fn submit_from_form(&self) {
        let dom = self.builder.dom();
        let Some(input) = dom.element_by_id(views::NICKNAME_ID) else {
            log_error!("Nickname input #{} is missing", views::NICKNAME_ID);
            return;
        };
        let raw = dom.input_value(&input);
        match self.submit_nickname(&raw) {
            Ok(true) => dom.set_input_value(&input, ""),
            Ok(false) => {}
            Err(e) => log_error!("Failed to join: {}", e),
        }
    }

    /// Returns `Ok(false)` when the nickname is blank; the inline error is shown instead.
    pub fn submit_nickname(&self, raw: &str) -> Result<bool, DomError> {
        let Some(name) = PlayerName::parse(raw) else {
            self.show_nickname_error()?;
            return Ok(false);
        };

        let next = self.store.get_state().with_player(name.clone());
        self.store.update_state(next);
        self.send(&ClientMessage::PlayerJoined { player_name: name.to_string() });

        self.joined.set(true);
        self.render_room()?;
        log!("Joined the lobby as {}", name);
        Ok(true)
    }

    fn show_nickname_error(&self) -> Result<(), DomError> {
        let dom = self.builder.dom();
        match dom.element_by_id(views::ERROR_ID) {
            Some(err) => dom.set_style(&err, "visibility", "visible"),
            None => Err(DomError::new(format!("error element #{} is missing", views::ERROR_ID))),
        }
    }

    /// Handles one inbound socket frame.
    pub fn handle_message(&self, text: &str) {
        let message = match ServerMessage::decode(text) {
            Ok(message) => message,
            Err(ProtocolError::UnknownType(message_type)) => {
                log!("Ignoring message of unknown type `{}`", message_type);
                return;
            }
            Err(e) => {
                log_error!("Dropping inbound frame: {}", e);
                return;
            }
        };

        match message {
            ServerMessage::UsersUpdate { users } => {
                let players = users.len();
                self.store.set_state(LobbyState { players: users });
                self.apply(self.countdown.get().on_roster(players, &self.settings));
            }
            ServerMessage::Timer { level } => {
                self.apply(self.countdown.get().on_server_level(level, &self.settings));
            }
        }
    }

    /// One period of the countdown interval.
    pub fn tick(&self) {
        self.apply(self.countdown.get().on_tick(&self.settings));
    }

    fn apply(&self, transition: Transition) {
        self.countdown.set(transition.next);
        for effect in transition.effects {
            match effect {
                Effect::StartTicking => self.start_ticking(),
                Effect::StopTicking => self.stop_ticking(),
                Effect::Send(message) => self.send(&message),
                Effect::Display(level) => self.show_level(level),
            }
        }
    }

    fn start_ticking(&self) {
        if self.interval.get().is_some() {
            return;
        }
        let this = self.this.clone();
        let callback = Rc::new(move || {
            if let Some(controller) = this.upgrade() {
                controller.tick();
            }
        });
        match self.scheduler.set_interval(self.settings.tick_interval_ms, callback) {
            Ok(id) => self.interval.set(Some(id)),
            Err(e) => {
                log_error!("Failed to start countdown: {}", e);
                self.countdown.set(Countdown::Idle);
            }
        }
    }

    fn stop_ticking(&self) {
        if let Some(id) = self.interval.take() {
            self.scheduler.clear_interval(id);
            log!("Countdown stopped");
        }
    }

    /// Frames for a socket that is not open are dropped without error.
    fn send(&self, message: &ClientMessage) {
        if !self.transport.is_open() {
            return;
        }
        let result = message
            .encode()
            .map_err(|e| e.to_string())
            .and_then(|payload| self.transport.send_text(&payload));
        if let Err(e) = result {
            log_error!("Failed to send {:?}: {}", message, e);
        }
    }

    fn show_level(&self, level: u32) {
        self.displayed_level.set(level);
        let dom = self.builder.dom();
        if let Some(time) = dom.element_by_id(views::TIME_ID) {
            dom.set_text_content(&time, &self.remaining_label());
        }
    }

    fn remaining_label(&self) -> String {
        views::format_remaining(self.displayed_level.get(), self.settings.countdown_ceiling)
    }

    fn on_state_changed(&self, _state: &LobbyState) {
        if !self.joined.get() {
            return;
        }
        if let Err(e) = self.render_room() {
            log_error!("Failed to render roster: {}", e);
        }
    }

    fn render_room(&self) -> Result<(), DomError> {
        let state = self.store.get_state();
        self.swap_root(views::app(views::room(&state.players, &self.remaining_label())))
    }

    /// Builds a fresh page and swaps it for the current one.
    fn swap_root(&self, spec: ElementSpec<D::Node>) -> Result<(), DomError> {
        let dom = self.builder.dom();
        let body = dom.body()?;
        let new_root = self.builder.build(spec, None)?;

        let old_root = self.app_root.borrow_mut().take();
        match old_root {
            Some(old_root) => self.builder.replace(&body, &new_root, &old_root)?,
            None => self.builder.mount(&new_root, &body)?,
        }
        *self.app_root.borrow_mut() = Some(new_root);
        Ok(())
    }
}
