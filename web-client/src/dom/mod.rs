//! The seam between view code and a document.
//!
//! `HeadlessDom` is an in-memory document used natively and in tests; the
//! browser build drives the real DOM through the same trait.

mod headless;

pub use headless::{HeadlessDom, HeadlessNode};

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

pub type EventHandler = Rc<dyn Fn(&EventInfo)>;

/// What a handler sees of a dispatched event.
#[derive(Debug, Default)]
pub struct EventInfo {
    default_prevented: Cell<bool>,
}

impl EventInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomError(String);

impl DomError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DOM error: {}", self.0)
    }
}

impl std::error::Error for DomError {}

pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug;

    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;
    fn create_text_node(&self, text: &str) -> Self::Node;

    fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;
    fn add_event_listener(
        &self,
        node: &Self::Node,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), DomError>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;
    fn replace_child(
        &self,
        parent: &Self::Node,
        new_child: &Self::Node,
        old_child: &Self::Node,
    ) -> Result<(), DomError>;

    fn body(&self) -> Result<Self::Node, DomError>;
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn set_text_content(&self, node: &Self::Node, text: &str);
    fn set_style(&self, node: &Self::Node, property: &str, value: &str) -> Result<(), DomError>;

    fn input_value(&self, node: &Self::Node) -> String;
    fn set_input_value(&self, node: &Self::Node, value: &str);
}
