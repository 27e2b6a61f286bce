use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::{Dom, DomError, EventHandler, EventInfo};

enum NodeKind {
    Element(ElementData),
    Text(String),
}

struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    listeners: Vec<(String, EventHandler)>,
    value: Option<String>,
}

struct NodeData {
    kind: NodeKind,
    children: Vec<HeadlessNode>,
    parent: Weak<RefCell<NodeData>>,
}

/// Handle to a node of a [`HeadlessDom`]. Equality is identity.
#[derive(Clone)]
pub struct HeadlessNode(Rc<RefCell<NodeData>>);

impl HeadlessNode {
    fn new(kind: NodeKind) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            kind,
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    fn parent(&self) -> Option<HeadlessNode> {
        self.0.borrow().parent.upgrade().map(HeadlessNode)
    }

    fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().children.retain(|c| c != self);
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    fn is_element(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Element(_))
    }

    fn is_inclusive_ancestor_of(&self, other: &HeadlessNode) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if &node == self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn with_element<R>(&self, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
        match &self.0.borrow().kind {
            NodeKind::Element(data) => Some(f(data)),
            NodeKind::Text(_) => None,
        }
    }

    fn with_element_mut<R>(&self, f: impl FnOnce(&mut ElementData) -> R) -> Result<R, DomError> {
        match &mut self.0.borrow_mut().kind {
            NodeKind::Element(data) => Ok(f(data)),
            NodeKind::Text(_) => Err(DomError::new("operation requires an element, got a text node")),
        }
    }
}

impl PartialEq for HeadlessNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HeadlessNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.borrow().kind {
            NodeKind::Element(data) => match data.attributes.get("id") {
                Some(id) => write!(f, "<{} id={:?}>", data.tag, id),
                None => write!(f, "<{}>", data.tag),
            },
            NodeKind::Text(text) => write!(f, "#text {:?}", text),
        }
    }
}

/// In-memory document rooted at a `<body>` element.
///
/// Events are delivered to the target node only; there is no bubbling.
#[derive(Clone)]
pub struct HeadlessDom {
    body: HeadlessNode,
}

impl Default for HeadlessDom {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDom {
    pub fn new() -> Self {
        Self {
            body: HeadlessNode::new(NodeKind::Element(ElementData::new("body"))),
        }
    }

    /// Runs every listener registered on `node` for `event`, in registration order.
    pub fn dispatch(&self, node: &HeadlessNode, event: &str) -> EventInfo {
        let handlers: Vec<EventHandler> = node
            .with_element(|data| {
                data.listeners
                    .iter()
                    .filter(|(name, _)| name == event)
                    .map(|(_, handler)| handler.clone())
                    .collect()
            })
            .unwrap_or_default();

        let info = EventInfo::new();
        for handler in handlers {
            handler(&info);
        }
        info
    }

    pub fn tag_name(&self, node: &HeadlessNode) -> Option<String> {
        node.with_element(|data| data.tag.clone())
    }

    pub fn children(&self, node: &HeadlessNode) -> Vec<HeadlessNode> {
        node.0.borrow().children.clone()
    }

    pub fn parent(&self, node: &HeadlessNode) -> Option<HeadlessNode> {
        node.parent()
    }

    pub fn text_content(&self, node: &HeadlessNode) -> String {
        let data = node.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element(_) => data
                .children
                .iter()
                .map(|child| self.text_content(child))
                .collect(),
        }
    }

    pub fn style(&self, node: &HeadlessNode, property: &str) -> Option<String> {
        node.with_element(|data| data.styles.get(property).cloned()).flatten()
    }

    pub fn listener_count(&self, node: &HeadlessNode, event: &str) -> usize {
        node.with_element(|data| data.listeners.iter().filter(|(name, _)| name == event).count())
            .unwrap_or(0)
    }

    fn find(&self, from: &HeadlessNode, predicate: &dyn Fn(&HeadlessNode) -> bool) -> Option<HeadlessNode> {
        if predicate(from) {
            return Some(from.clone());
        }
        self.children(from)
            .iter()
            .find_map(|child| self.find(child, predicate))
    }
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            listeners: Vec::new(),
            value: None,
        }
    }
}

fn parse_inline_style(style: &str) -> BTreeMap<String, String> {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .map(|(property, value)| (property.trim().to_string(), value.trim().to_string()))
        .filter(|(property, _)| !property.is_empty())
        .collect()
}

impl Dom for HeadlessDom {
    type Node = HeadlessNode;

    fn create_element(&self, tag: &str) -> Result<HeadlessNode, DomError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::new(format!("invalid tag name {:?}", tag)));
        }
        Ok(HeadlessNode::new(NodeKind::Element(ElementData::new(tag))))
    }

    fn create_text_node(&self, text: &str) -> HeadlessNode {
        HeadlessNode::new(NodeKind::Text(text.to_string()))
    }

    fn get_attribute(&self, node: &HeadlessNode, name: &str) -> Option<String> {
        node.with_element(|data| data.attributes.get(name).cloned())
            .flatten()
    }

    fn set_attribute(&self, node: &HeadlessNode, name: &str, value: &str) -> Result<(), DomError> {
        node.with_element_mut(|data| {
            if name == "style" {
                data.styles = parse_inline_style(value);
            }
            data.attributes.insert(name.to_string(), value.to_string());
        })
    }

    fn add_event_listener(
        &self,
        node: &HeadlessNode,
        event: &str,
        handler: EventHandler,
    ) -> Result<(), DomError> {
        node.with_element_mut(|data| data.listeners.push((event.to_string(), handler)))
    }

    fn append_child(&self, parent: &HeadlessNode, child: &HeadlessNode) -> Result<(), DomError> {
        if !parent.is_element() {
            return Err(DomError::new("cannot append to a text node"));
        }
        if child.is_inclusive_ancestor_of(parent) {
            return Err(DomError::new("cannot append a node to itself or its descendant"));
        }
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&parent.0);
        parent.0.borrow_mut().children.push(child.clone());
        Ok(())
    }

    fn replace_child(
        &self,
        parent: &HeadlessNode,
        new_child: &HeadlessNode,
        old_child: &HeadlessNode,
    ) -> Result<(), DomError> {
        if old_child.parent().as_ref() != Some(parent) {
            return Err(DomError::new("node to replace is not a child of this parent"));
        }
        if new_child == old_child {
            return Ok(());
        }
        if new_child.is_inclusive_ancestor_of(parent) {
            return Err(DomError::new("cannot insert a node into its own subtree"));
        }
        new_child.detach();

        let mut parent_data = parent.0.borrow_mut();
        let index = parent_data
            .children
            .iter()
            .position(|c| c == old_child)
            .ok_or_else(|| DomError::new("node to replace is not a child of this parent"))?;
        parent_data.children[index] = new_child.clone();
        drop(parent_data);

        new_child.0.borrow_mut().parent = Rc::downgrade(&parent.0);
        old_child.0.borrow_mut().parent = Weak::new();
        Ok(())
    }

    fn body(&self) -> Result<HeadlessNode, DomError> {
        Ok(self.body.clone())
    }

    fn element_by_id(&self, id: &str) -> Option<HeadlessNode> {
        self.find(&self.body, &|node: &HeadlessNode| {
            node.with_element(|data| data.attributes.get("id").map(String::as_str) == Some(id))
                .unwrap_or(false)
        })
    }

    fn set_text_content(&self, node: &HeadlessNode, text: &str) {
        let old_children = {
            let mut data = node.0.borrow_mut();
            if let NodeKind::Text(current) = &mut data.kind {
                *current = text.to_string();
                return;
            }
            std::mem::take(&mut data.children)
        };
        for child in old_children {
            child.0.borrow_mut().parent = Weak::new();
        }
        if !text.is_empty() {
            let text_node = self.create_text_node(text);
            text_node.0.borrow_mut().parent = Rc::downgrade(&node.0);
            node.0.borrow_mut().children.push(text_node);
        }
    }

    fn set_style(&self, node: &HeadlessNode, property: &str, value: &str) -> Result<(), DomError> {
        node.with_element_mut(|data| {
            data.styles.insert(property.to_string(), value.to_string());
        })
    }

    fn input_value(&self, node: &HeadlessNode) -> String {
        node.with_element(|data| {
            data.value
                .clone()
                .or_else(|| data.attributes.get("value").cloned())
                .unwrap_or_default()
        })
        .unwrap_or_default()
    }

    fn set_input_value(&self, node: &HeadlessNode, value: &str) {
        let _ = node.with_element_mut(|data| data.value = Some(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_append_moves_node_between_parents() {
        let dom = HeadlessDom::new();
        let first = dom.create_element("div").unwrap();
        let second = dom.create_element("div").unwrap();
        let child = dom.create_element("span").unwrap();

        dom.append_child(&first, &child).unwrap();
        dom.append_child(&second, &child).unwrap();

        assert!(dom.children(&first).is_empty());
        assert_eq!(dom.children(&second), vec![child.clone()]);
        assert_eq!(dom.parent(&child), Some(second));
    }

    #[test]
    fn test_append_into_own_subtree_is_rejected() {
        let dom = HeadlessDom::new();
        let outer = dom.create_element("div").unwrap();
        let inner = dom.create_element("div").unwrap();
        dom.append_child(&outer, &inner).unwrap();

        assert!(dom.append_child(&inner, &outer).is_err());
        assert!(dom.append_child(&outer, &outer).is_err());
    }

    #[test]
    fn test_element_by_id_searches_only_attached_nodes() {
        let dom = HeadlessDom::new();
        let body = dom.body().unwrap();
        let attached = dom.create_element("p").unwrap();
        dom.set_attribute(&attached, "id", "here").unwrap();
        let detached = dom.create_element("p").unwrap();
        dom.set_attribute(&detached, "id", "gone").unwrap();
        dom.append_child(&body, &attached).unwrap();

        assert_eq!(dom.element_by_id("here"), Some(attached));
        assert_eq!(dom.element_by_id("gone"), None);
    }

    #[test]
    fn test_replace_child_keeps_position() {
        let dom = HeadlessDom::new();
        let parent = dom.create_element("div").unwrap();
        let a = dom.create_element("a").unwrap();
        let b = dom.create_element("b").unwrap();
        let c = dom.create_element("i").unwrap();
        dom.append_child(&parent, &a).unwrap();
        dom.append_child(&parent, &b).unwrap();

        dom.replace_child(&parent, &c, &a).unwrap();

        assert_eq!(dom.children(&parent), vec![c, b]);
        assert_eq!(dom.parent(&a), None);
    }

    #[test]
    fn test_replace_child_requires_existing_child() {
        let dom = HeadlessDom::new();
        let parent = dom.create_element("div").unwrap();
        let stranger = dom.create_element("div").unwrap();
        let fresh = dom.create_element("div").unwrap();

        assert!(dom.replace_child(&parent, &fresh, &stranger).is_err());
    }

    #[test]
    fn test_style_attribute_is_parsed() {
        let dom = HeadlessDom::new();
        let p = dom.create_element("p").unwrap();
        dom.set_attribute(&p, "style", "color: red; visibility: hidden;").unwrap();

        assert_eq!(dom.style(&p, "visibility").as_deref(), Some("hidden"));
        dom.set_style(&p, "visibility", "visible").unwrap();
        assert_eq!(dom.style(&p, "visibility").as_deref(), Some("visible"));
        assert_eq!(dom.style(&p, "color").as_deref(), Some("red"));
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let dom = HeadlessDom::new();
        let p = dom.create_element("p").unwrap();
        let span = dom.create_element("span").unwrap();
        dom.append_child(&p, &span).unwrap();

        dom.set_text_content(&p, "00:50");

        assert_eq!(dom.text_content(&p), "00:50");
        assert_eq!(dom.children(&p).len(), 1);
        assert_eq!(dom.parent(&span), None);
    }

    #[test]
    fn test_dispatch_runs_matching_listeners_only() {
        let dom = HeadlessDom::new();
        let button = dom.create_element("button").unwrap();
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        dom.add_event_listener(&button, "click", Rc::new(move |_: &EventInfo| counter.set(counter.get() + 1)))
            .unwrap();
        dom.add_event_listener(&button, "submit", Rc::new(|event: &EventInfo| event.prevent_default()))
            .unwrap();

        let click = dom.dispatch(&button, "click");
        dom.dispatch(&button, "mouseover");

        assert_eq!(clicks.get(), 1);
        assert!(!click.default_prevented());
        assert!(dom.dispatch(&button, "submit").default_prevented());
    }

    #[test]
    fn test_input_value_falls_back_to_attribute() {
        let dom = HeadlessDom::new();
        let input = dom.create_element("input").unwrap();
        dom.set_attribute(&input, "value", "Join").unwrap();
        assert_eq!(dom.input_value(&input), "Join");

        dom.set_input_value(&input, "typed");
        assert_eq!(dom.input_value(&input), "typed");
    }

    #[test]
    fn test_text_nodes_reject_element_operations() {
        let dom = HeadlessDom::new();
        let text = dom.create_text_node("hi");
        assert!(dom.set_attribute(&text, "id", "x").is_err());
        assert!(dom.append_child(&text, &dom.create_text_node("more")).is_err());
        assert_eq!(dom.get_attribute(&text, "id"), None);
    }
}
