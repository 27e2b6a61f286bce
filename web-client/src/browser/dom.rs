use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, Node};

use crate::dom::{Dom, DomError, EventHandler, EventInfo};

fn js_error(value: JsValue) -> DomError {
    DomError::new(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn as_element(node: &Node) -> Result<&Element, DomError> {
    node.dyn_ref::<Element>()
        .ok_or_else(|| DomError::new("operation requires an element"))
}

#[derive(Clone)]
pub struct BrowserDom {
    document: Document,
}

impl BrowserDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl Dom for BrowserDom {
    type Node = Node;

    fn create_element(&self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Node::from)
            .map_err(js_error)
    }

    fn create_text_node(&self, text: &str) -> Node {
        self.document.create_text_node(text).into()
    }

    fn get_attribute(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        as_element(node)?.set_attribute(name, value).map_err(js_error)
    }

    fn add_event_listener(&self, node: &Node, event: &str, handler: EventHandler) -> Result<(), DomError> {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let info = EventInfo::new();
            handler(&info);
            if info.default_prevented() {
                event.prevent_default();
            }
        });
        node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        // Listeners live as long as their element; the page never removes them.
        closure.forget();
        Ok(())
    }

    fn append_child(&self, parent: &Node, child: &Node) -> Result<(), DomError> {
        parent.append_child(child).map(|_| ()).map_err(js_error)
    }

    fn replace_child(&self, parent: &Node, new_child: &Node, old_child: &Node) -> Result<(), DomError> {
        parent
            .replace_child(new_child, old_child)
            .map(|_| ())
            .map_err(js_error)
    }

    fn body(&self) -> Result<Node, DomError> {
        self.document
            .body()
            .map(Node::from)
            .ok_or_else(|| DomError::new("document has no body"))
    }

    fn element_by_id(&self, id: &str) -> Option<Node> {
        self.document.get_element_by_id(id).map(Node::from)
    }

    fn set_text_content(&self, node: &Node, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_style(&self, node: &Node, property: &str, value: &str) -> Result<(), DomError> {
        node.dyn_ref::<HtmlElement>()
            .ok_or_else(|| DomError::new("inline style requires an HTML element"))?
            .style()
            .set_property(property, value)
            .map_err(js_error)
    }

    fn input_value(&self, node: &Node) -> String {
        node.dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::value)
            .unwrap_or_default()
    }

    fn set_input_value(&self, node: &Node, value: &str) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }
}
