//! Declarative element construction.
//!
//! An [`ElementSpec`] describes one element: tag, attributes and children.
//! [`ElementBuilder::build`] turns it into a live node. There is no diffing:
//! re-rendering means building a fresh tree and swapping it in with
//! [`ElementBuilder::replace`].

use std::rc::Rc;

use lobby_common::log_error;
use serde_json::Value;

use crate::dom::{Dom, DomError, EventHandler, EventInfo};

/// Attribute names starting with this marker and carrying a handler become
/// event listeners (`onClick` listens for `click`).
pub const EVENT_PREFIX: &str = "on";

pub enum Attr {
    Text(String),
    Handler(EventHandler),
}

pub enum Child<N> {
    Text(String),
    Node(N),
    /// Flattened one level into the parent.
    Nodes(Vec<N>),
    Element(ElementSpec<N>),
    /// Anything the builder cannot turn into a node. Logged and skipped.
    Invalid(String),
}

pub struct ElementSpec<N> {
    tag: String,
    attrs: Vec<(String, Attr)>,
    children: Vec<Child<N>>,
}

impl<N> ElementSpec<N> {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr_value(name, Attr::Text(value.into()))
    }

    pub fn attr_value(mut self, name: impl Into<String>, value: Attr) -> Self {
        self.attrs.push((name.into(), value));
        self
    }

    /// Shorthand for a handler attribute, e.g. `.listener("onClick", ...)`.
    pub fn listener(self, name: impl Into<String>, handler: impl Fn(&EventInfo) + 'static) -> Self {
        self.attr_value(name, Attr::Handler(Rc::new(handler)))
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Child::Text(text.into()))
    }

    pub fn element(self, spec: ElementSpec<N>) -> Self {
        self.child(Child::Element(spec))
    }

    pub fn node(self, node: N) -> Self {
        self.child(Child::Node(node))
    }

    pub fn child(mut self, child: Child<N>) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Child<N>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Reads `{"tag": ..., "attrs": {...}, "children": [...]}`.
    ///
    /// Attribute values are stringified. String children become text, object
    /// children nested elements, array children are flattened one level.
    /// Any other child is kept as [`Child::Invalid`] so the builder reports it.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| format!("element description must be an object, got {}", value))?;
        let tag = object
            .get("tag")
            .and_then(Value::as_str)
            .ok_or_else(|| "element description has no string `tag`".to_string())?;

        let mut spec = ElementSpec::new(tag);

        if let Some(attrs) = object.get("attrs") {
            let attrs = attrs
                .as_object()
                .ok_or_else(|| format!("`attrs` of <{}> must be an object", tag))?;
            for (name, value) in attrs {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                spec = spec.attr(name.as_str(), text);
            }
        }

        if let Some(children) = object.get("children") {
            let children = children
                .as_array()
                .ok_or_else(|| format!("`children` of <{}> must be an array", tag))?;
            for child in children {
                match child {
                    Value::Array(nested) => {
                        for item in nested {
                            spec = spec.child(json_child(item));
                        }
                    }
                    other => spec = spec.child(json_child(other)),
                }
            }
        }

        Ok(spec)
    }
}

fn json_child<N>(value: &Value) -> Child<N> {
    match value {
        Value::String(text) => Child::Text(text.clone()),
        Value::Object(_) => match ElementSpec::from_json(value) {
            Ok(spec) => Child::Element(spec),
            Err(reason) => Child::Invalid(reason),
        },
        other => Child::Invalid(other.to_string()),
    }
}

fn event_name(attribute: &str) -> Option<String> {
    attribute
        .strip_prefix(EVENT_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(str::to_lowercase)
}

#[derive(Clone)]
pub struct ElementBuilder<D: Dom> {
    dom: D,
}

impl<D: Dom> ElementBuilder<D> {
    pub fn new(dom: D) -> Self {
        Self { dom }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Builds `spec` and, when `parent` is given, appends the result to it.
    pub fn build(&self, spec: ElementSpec<D::Node>, parent: Option<&D::Node>) -> Result<D::Node, DomError> {
        let ElementSpec { tag, attrs, children } = spec;
        let element = self.dom.create_element(&tag)?;

        for (name, value) in attrs {
            match value {
                Attr::Text(text) => self.dom.set_attribute(&element, &name, &text)?,
                Attr::Handler(handler) => match event_name(&name) {
                    Some(event) => self.dom.add_event_listener(&element, &event, handler)?,
                    None => log_error!(
                        "Handler attribute `{}` on <{}> lacks the `{}` prefix, skipped",
                        name, tag, EVENT_PREFIX
                    ),
                },
            }
        }

        for child in children {
            match child {
                Child::Text(text) => {
                    let text_node = self.dom.create_text_node(&text);
                    self.dom.append_child(&element, &text_node)?;
                }
                Child::Node(node) => self.dom.append_child(&element, &node)?,
                Child::Nodes(nodes) => {
                    for node in nodes {
                        self.dom.append_child(&element, &node)?;
                    }
                }
                Child::Element(nested) => {
                    self.build(nested, Some(&element))?;
                }
                Child::Invalid(description) => {
                    log_error!("Invalid child type in <{}>: {}", tag, description);
                }
            }
        }

        if let Some(parent) = parent {
            self.dom.append_child(parent, &element)?;
        }
        Ok(element)
    }

    pub fn mount(&self, node: &D::Node, root: &D::Node) -> Result<(), DomError> {
        self.dom.append_child(root, node)
    }

    pub fn replace(&self, parent: &D::Node, new_node: &D::Node, old_node: &D::Node) -> Result<(), DomError> {
        self.dom.replace_child(parent, new_node, old_node)
    }

    pub fn get_attribute(&self, node: &D::Node, name: &str) -> Option<String> {
        self.dom.get_attribute(node, name)
    }

    pub fn set_attribute(&self, node: &D::Node, name: &str, value: &str) -> Result<(), DomError> {
        self.dom.set_attribute(node, name, value)
    }

    /// Registers a listener on an already built node.
    pub fn on(&self, node: &D::Node, event: &str, handler: impl Fn(&EventInfo) + 'static) -> Result<(), DomError> {
        self.dom.add_event_listener(node, event, Rc::new(handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{HeadlessDom, HeadlessNode};
    use serde_json::json;
    use std::cell::Cell;

    fn builder() -> (HeadlessDom, ElementBuilder<HeadlessDom>) {
        let dom = HeadlessDom::new();
        (dom.clone(), ElementBuilder::new(dom))
    }

    #[test]
    fn test_build_div_with_id_click_handler_and_text() {
        let (dom, builder) = builder();
        let clicked = Rc::new(Cell::new(0));
        let counter = clicked.clone();

        let spec = ElementSpec::new("div")
            .attr("id", "x")
            .listener("onClick", move |_: &EventInfo| counter.set(counter.get() + 1))
            .text("hi");
        let div = builder.build(spec, None).unwrap();

        assert_eq!(dom.tag_name(&div).as_deref(), Some("div"));
        assert_eq!(builder.get_attribute(&div, "id").as_deref(), Some("x"));
        assert_eq!(dom.text_content(&div), "hi");
        assert_eq!(builder.get_attribute(&div, "onClick"), None);
        assert_eq!(builder.get_attribute(&div, "onclick"), None);

        dom.dispatch(&div, "click");
        assert_eq!(clicked.get(), 1);
    }

    #[test]
    fn test_on_prefixed_text_attribute_is_set_literally() {
        let (_, builder) = builder();
        let spec: ElementSpec<HeadlessNode> = ElementSpec::new("a").attr("onboarding", "yes");
        let a = builder.build(spec, None).unwrap();
        assert_eq!(builder.get_attribute(&a, "onboarding").as_deref(), Some("yes"));
    }

    #[test]
    fn test_handler_without_prefix_is_skipped() {
        let (dom, builder) = builder();
        let spec: ElementSpec<HeadlessNode> = ElementSpec::new("button")
            .listener("click", |_: &EventInfo| {})
            .text("ok");
        let button = builder.build(spec, None).unwrap();

        assert_eq!(dom.listener_count(&button, "click"), 0);
        assert_eq!(dom.text_content(&button), "ok");
    }

    #[test]
    fn test_node_children_are_flattened_one_level() {
        let (dom, builder) = builder();
        let first = builder.build(ElementSpec::new("li").text("1"), None).unwrap();
        let second = builder.build(ElementSpec::new("li").text("2"), None).unwrap();
        let third = builder.build(ElementSpec::new("li").text("3"), None).unwrap();

        let spec = ElementSpec::new("ul")
            .child(Child::Nodes(vec![first.clone(), second.clone()]))
            .node(third.clone());
        let list = builder.build(spec, None).unwrap();

        assert_eq!(dom.children(&list), vec![first, second, third]);
        assert_eq!(dom.text_content(&list), "123");
    }

    #[test]
    fn test_invalid_child_is_skipped_and_siblings_survive() {
        let (dom, builder) = builder();
        let spec: ElementSpec<HeadlessNode> = ElementSpec::new("div")
            .text("before")
            .child(Child::Invalid("42".to_string()))
            .text("after");
        let div = builder.build(spec, None).unwrap();

        assert_eq!(dom.children(&div).len(), 2);
        assert_eq!(dom.text_content(&div), "beforeafter");
    }

    #[test]
    fn test_build_with_parent_appends_immediately() {
        let (dom, builder) = builder();
        let body = dom.body().unwrap();
        let p = builder
            .build(ElementSpec::new("p").attr("id", "err"), Some(&body))
            .unwrap();

        assert_eq!(dom.parent(&p), Some(body));
        assert_eq!(dom.element_by_id("err"), Some(p));
    }

    #[test]
    fn test_build_without_parent_is_unattached() {
        let (dom, builder) = builder();
        let p = builder.build(ElementSpec::new("p").attr("id", "alone"), None).unwrap();
        assert_eq!(dom.parent(&p), None);
        assert_eq!(dom.element_by_id("alone"), None);
    }

    #[test]
    fn test_mount_and_replace_swap_roots() {
        let (dom, builder) = builder();
        let body = dom.body().unwrap();
        let old_root = builder.build(ElementSpec::new("div").attr("id", "IDapp").text("form"), None).unwrap();
        builder.mount(&old_root, &body).unwrap();

        let new_root = builder.build(ElementSpec::new("div").attr("id", "IDapp").text("room"), None).unwrap();
        builder.replace(&body, &new_root, &old_root).unwrap();

        assert_eq!(dom.children(&body), vec![new_root.clone()]);
        assert_eq!(dom.element_by_id("IDapp"), Some(new_root));
        assert_eq!(dom.parent(&old_root), None);
    }

    #[test]
    fn test_set_attribute_and_on_helpers() {
        let (dom, builder) = builder();
        let input = builder.build(ElementSpec::new("input"), None).unwrap();
        builder.set_attribute(&input, "placeholder", "Nickname").unwrap();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        builder.on(&input, "change", move |_: &EventInfo| flag.set(true)).unwrap();

        dom.dispatch(&input, "change");

        assert_eq!(builder.get_attribute(&input, "placeholder").as_deref(), Some("Nickname"));
        assert!(fired.get());
    }

    #[test]
    fn test_nested_element_specs_are_built_in_order() {
        let (dom, builder) = builder();
        let spec: ElementSpec<HeadlessNode> = ElementSpec::new("form")
            .element(ElementSpec::new("label").attr("id", "Toggle-label"))
            .element(ElementSpec::new("input").attr("id", "nickname"));
        let form = builder.build(spec, None).unwrap();

        let tags: Vec<_> = dom.children(&form).iter().filter_map(|c| dom.tag_name(c)).collect();
        assert_eq!(tags, vec!["label", "input"]);
    }

    #[test]
    fn test_from_json_builds_nested_tree() {
        let (dom, builder) = builder();
        let description = json!({
            "tag": "div",
            "attrs": {"class": "contain", "tabindex": 0},
            "children": [
                "Title",
                {"tag": "span", "children": ["inner"]},
                ["a", "b"],
                7,
                null
            ]
        });

        let spec = ElementSpec::from_json(&description).unwrap();
        let div = builder.build(spec, None).unwrap();

        assert_eq!(builder.get_attribute(&div, "class").as_deref(), Some("contain"));
        assert_eq!(builder.get_attribute(&div, "tabindex").as_deref(), Some("0"));
        assert_eq!(dom.children(&div).len(), 4);
        assert_eq!(dom.text_content(&div), "Titleinnerab");
    }

    #[test]
    fn test_from_json_requires_tag() {
        let result: Result<ElementSpec<HeadlessNode>, _> = ElementSpec::from_json(&json!({"attrs": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_event_name_lowercases_suffix() {
        assert_eq!(event_name("onClick").as_deref(), Some("click"));
        assert_eq!(event_name("onSubmit").as_deref(), Some("submit"));
        assert_eq!(event_name("on"), None);
        assert_eq!(event_name("click"), None);
    }
}
