use lobby_common::defaults::avatar_path;

use crate::dom::EventInfo;
use crate::element_builder::{Child, ElementSpec};

pub const APP_ID: &str = "IDapp";
pub const CONTAINER_ID: &str = "IDContainer";
pub const NICKNAME_ID: &str = "nickname";
pub const BUTTON_ID: &str = "button";
pub const ERROR_ID: &str = "err";
pub const USER_LIST_ID: &str = "userList";
pub const TIME_ID: &str = "time";

const GAME_TITLE: &str = "BOMBERMAN GAME";

/// Page frame shared by every screen: header, title, `content`, footer.
pub fn app<N>(content: ElementSpec<N>) -> ElementSpec<N> {
    ElementSpec::new("div")
        .attr("class", "app")
        .attr("id", APP_ID)
        .element(ElementSpec::new("div").attr("id", "sec"))
        .element(ElementSpec::new("h1").attr("id", "game").text(GAME_TITLE))
        .element(content)
        .element(ElementSpec::new("div").attr("id", "secf"))
}

/// Nickname form. Both the button click and a form submit call `on_join`.
pub fn join_form<N>(on_join: impl Fn() + Clone + 'static) -> ElementSpec<N> {
    let on_click = on_join.clone();
    let form = ElementSpec::new("form")
        .listener("onSubmit", move |event: &EventInfo| {
            event.prevent_default();
            on_join();
        })
        .element(ElementSpec::new("label").attr("id", "Toggle-label"))
        .element(
            ElementSpec::new("p")
                .attr("id", ERROR_ID)
                .attr("style", "color: red; font-style: italic; visibility: hidden")
                .text("Please enter your nickname!"),
        )
        .element(
            ElementSpec::new("input")
                .attr("id", NICKNAME_ID)
                .attr("placeholder", "Enter your nickname")
                .attr("type", "text"),
        )
        .element(
            ElementSpec::new("input")
                .attr("id", BUTTON_ID)
                .attr("type", "button")
                .attr("value", "Join")
                .listener("onClick", move |_: &EventInfo| on_click()),
        );

    ElementSpec::new("div")
        .attr("class", "contain")
        .attr("id", CONTAINER_ID)
        .element(ElementSpec::new("h3").attr("id", "title").text("Join the game"))
        .element(form)
}

/// Waiting room: remaining time, title and one entry per player.
pub fn room<N>(players: &[String], remaining: &str) -> ElementSpec<N> {
    let entries = players
        .iter()
        .enumerate()
        .map(|(index, name)| Child::Element(roster_entry(index + 1, name)));

    ElementSpec::new("div")
        .attr("class", "contain")
        .attr("id", CONTAINER_ID)
        .element(
            ElementSpec::new("p")
                .attr("class", "time")
                .attr("id", TIME_ID)
                .text(remaining),
        )
        .element(ElementSpec::new("h3").attr("id", "title").text("-- Room --"))
        .element(
            ElementSpec::new("div")
                .attr("class", "roomPart")
                .attr("id", USER_LIST_ID)
                .children(entries),
        )
}

/// `position` is 1-based and picks both the slot class and the default avatar.
pub fn roster_entry<N>(position: usize, name: &str) -> ElementSpec<N> {
    ElementSpec::new("div")
        .attr("class", format!("roomPart{}", position))
        .text(name)
        .element(
            ElementSpec::new("img")
                .attr("class", "image")
                .attr("src", avatar_path(position)),
        )
}

/// Remaining countdown as `MM:SS`, one level per second.
pub fn format_remaining(level: u32, ceiling: u32) -> String {
    let remaining = ceiling.saturating_sub(level);
    format!("{:02}:{:02}", remaining / 60, remaining % 60)
}
