//! Mock page implementation for testing Animation Builder
//!
//! [`MockPage`] is an in-memory document tree implementing [`PageHal`], so
//! the selector engine, executor, scanner and relays can be exercised without
//! a browser. It also simulates the pieces of the page environment the
//! agents depend on:
//!
//! - layout boxes (`offsetParent` visibility),
//! - timers on a manual clock ([`MockPage::advance`]),
//! - the window broadcast channel ([`MockPage::take_posted`]),
//! - pointer listener installation ([`MockPage::is_listening`]).

mod selector;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use ab_hal::{PageHal, PageHalError, Rect, TimerId};
use ab_ipc::PageMessage;

use selector::Compound;

/// Handle to a node in a [`MockPage`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockElement(usize);

/// Builder for elements appended with [`MockPage::append`]
#[derive(Clone, Debug)]
pub struct ElementSpec {
    tag: String,
    id: String,
    class: String,
    text: String,
    layout: Option<Rect>,
    style: Vec<(String, String)>,
}

impl ElementSpec {
    /// A visible element with a default 100x20 layout box
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: String::new(),
            class: String::new(),
            text: String::new(),
            layout: Some(Rect::new(0.0, 0.0, 100.0, 20.0)),
            style: Vec::new(),
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Raw `class` attribute (space separated)
    pub fn class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    /// Own text, placed before any children
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn layout(mut self, rect: Rect) -> Self {
        self.layout = Some(rect);
        self
    }

    /// Not rendered (`display: none`)
    pub fn hidden(mut self) -> Self {
        self.layout = None;
        self
    }

    /// Pre-existing inline style
    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.style.push((property.to_string(), value.to_string()));
        self
    }
}

struct MockNode {
    tag: String,
    id: String,
    class: String,
    text: String,
    style: BTreeMap<String, String>,
    layout: Option<Rect>,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl MockNode {
    fn from_spec(spec: ElementSpec) -> Self {
        Self {
            tag: spec.tag,
            id: spec.id,
            class: spec.class,
            text: spec.text,
            style: spec.style.into_iter().collect(),
            layout: spec.layout,
            parent: None,
            children: Vec::new(),
        }
    }

    fn classes(&self) -> impl Iterator<Item = &str> {
        self.class.split_whitespace()
    }
}

struct PendingTimer {
    id: TimerId,
    due_ms: f64,
    task: Box<dyn FnOnce()>,
}

/// In-memory page for unit testing
pub struct MockPage {
    nodes: RefCell<Vec<MockNode>>,
    root: usize,
    body: usize,
    timers: RefCell<Vec<PendingTimer>>,
    next_timer: Cell<i32>,
    now_ms: Cell<f64>,
    posted: RefCell<Vec<PageMessage>>,
    listening: Cell<bool>,
    reflows: Cell<usize>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPage {
    /// Create a page containing only `<html><body></body></html>`
    pub fn new() -> Self {
        let mut html = MockNode::from_spec(ElementSpec::new("html"));
        let mut body = MockNode::from_spec(ElementSpec::new("body"));
        html.children.push(1);
        body.parent = Some(0);
        Self {
            nodes: RefCell::new(vec![html, body]),
            root: 0,
            body: 1,
            timers: RefCell::new(Vec::new()),
            next_timer: Cell::new(1),
            now_ms: Cell::new(0.0),
            posted: RefCell::new(Vec::new()),
            listening: Cell::new(false),
            reflows: Cell::new(0),
        }
    }

    /// The `<body>` element
    pub fn body_element(&self) -> MockElement {
        MockElement(self.body)
    }

    /// Append a new child to `parent`
    pub fn append(&self, parent: &MockElement, spec: ElementSpec) -> MockElement {
        let mut nodes = self.nodes.borrow_mut();
        let index = nodes.len();
        let mut node = MockNode::from_spec(spec);
        node.parent = Some(parent.0);
        nodes.push(node);
        nodes[parent.0].children.push(index);
        MockElement(index)
    }

    /// Append a new child to `<body>`
    pub fn append_to_body_spec(&self, spec: ElementSpec) -> MockElement {
        let body = self.body_element();
        self.append(&body, spec)
    }

    pub fn set_layout(&self, element: &MockElement, layout: Option<Rect>) {
        self.nodes.borrow_mut()[element.0].layout = layout;
    }

    /// Whether the element is reachable from the document root
    pub fn is_attached(&self, element: &MockElement) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = element.0;
        loop {
            if current == self.root {
                return true;
            }
            match nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Shorthand for [`PageHal::style_property`]
    pub fn style(&self, element: &MockElement, property: &str) -> String {
        self.style_property(element, property)
    }

    pub fn has_class(&self, element: &MockElement, class: &str) -> bool {
        self.nodes.borrow()[element.0].classes().any(|c| c == class)
    }

    // === Clock ===

    /// Current simulated time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    /// Advance the simulated clock, firing due timers in order.
    ///
    /// Timers scheduled by fired tasks also run if they fall inside the
    /// window.
    pub fn advance(&self, ms: f64) {
        let target = self.now_ms.get() + ms;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let index = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due_ms <= target)
                    .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
                    .map(|(i, _)| i);
                index.map(|i| timers.remove(i))
            };
            match next {
                Some(timer) => {
                    self.now_ms.set(timer.due_ms.max(self.now_ms.get()));
                    (timer.task)();
                }
                None => break,
            }
        }
        self.now_ms.set(target);
    }

    /// Fire timers that are already due (zero-delay timers)
    pub fn run_due_timers(&self) {
        self.advance(0.0);
    }

    pub fn pending_timer_count(&self) -> usize {
        self.timers.borrow().len()
    }

    // === Broadcast ===

    /// Drain messages posted on the window channel
    pub fn take_posted(&self) -> Vec<PageMessage> {
        std::mem::take(&mut *self.posted.borrow_mut())
    }

    /// Messages posted and not yet drained
    pub fn posted(&self) -> Vec<PageMessage> {
        self.posted.borrow().clone()
    }

    // === Instrumentation ===

    /// Whether selection listeners are currently installed
    pub fn is_listening(&self) -> bool {
        self.listening.get()
    }

    /// Number of forced layouts
    pub fn reflow_count(&self) -> usize {
        self.reflows.get()
    }

    // === Internals ===

    /// All attached nodes in document order (pre-order)
    fn document_order(&self) -> Vec<usize> {
        let nodes = self.nodes.borrow();
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            order.push(index);
            for child in nodes[index].children.iter().rev() {
                stack.push(*child);
            }
        }
        order
    }

    fn matches(&self, index: usize, compound: &Compound) -> bool {
        let nodes = self.nodes.borrow();
        let node = &nodes[index];
        if let Some(tag) = &compound.tag {
            if &node.tag != tag {
                return false;
            }
        }
        if let Some(id) = &compound.id {
            if &node.id != id {
                return false;
            }
        }
        if !compound
            .classes
            .iter()
            .all(|class| node.classes().any(|c| c == class))
        {
            return false;
        }
        for attr in &compound.attrs {
            let value = match attr.name.as_str() {
                "class" if !node.class.is_empty() => Some(node.class.as_str()),
                "id" if !node.id.is_empty() => Some(node.id.as_str()),
                _ => None,
            };
            if !attr.op.matches(value) {
                return false;
            }
        }
        if let Some(n) = compound.nth_of_type {
            let Some(parent) = node.parent else {
                return false;
            };
            let position = nodes[parent]
                .children
                .iter()
                .filter(|c| nodes[**c].tag == node.tag)
                .position(|c| *c == index);
            if position.map(|p| p + 1) != Some(n) {
                return false;
            }
        }
        true
    }

    fn select(&self, selector: &str) -> Result<Vec<MockElement>, PageHalError> {
        let list = selector::parse(selector)?;
        Ok(self
            .document_order()
            .into_iter()
            .filter(|index| list.iter().any(|compound| self.matches(*index, compound)))
            .map(MockElement)
            .collect())
    }

    fn detach(&self, index: usize) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[index].parent.take() {
            nodes[parent].children.retain(|c| *c != index);
        }
    }

    fn text_of(nodes: &[MockNode], index: usize, out: &mut String) {
        out.push_str(&nodes[index].text);
        for child in &nodes[index].children {
            Self::text_of(nodes, *child, out);
        }
    }
}

impl PageHal for MockPage {
    type Element = MockElement;

    fn query_selector(&self, selector: &str) -> Result<Option<MockElement>, PageHalError> {
        Ok(self.select(selector)?.into_iter().next())
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<MockElement>, PageHalError> {
        self.select(selector)
    }

    fn element_by_id(&self, id: &str) -> Option<MockElement> {
        let order = self.document_order();
        let nodes = self.nodes.borrow();
        order
            .into_iter()
            .find(|index| nodes[*index].id == id)
            .map(MockElement)
    }

    fn body(&self) -> Option<MockElement> {
        Some(MockElement(self.body))
    }

    fn tag_name(&self, element: &MockElement) -> String {
        self.nodes.borrow()[element.0].tag.to_ascii_uppercase()
    }

    fn id_attribute(&self, element: &MockElement) -> String {
        self.nodes.borrow()[element.0].id.clone()
    }

    fn class_name(&self, element: &MockElement) -> String {
        self.nodes.borrow()[element.0].class.clone()
    }

    fn class_list(&self, element: &MockElement) -> Vec<String> {
        self.nodes.borrow()[element.0]
            .classes()
            .map(str::to_string)
            .collect()
    }

    fn text_content(&self, element: &MockElement) -> String {
        let nodes = self.nodes.borrow();
        let mut text = String::new();
        Self::text_of(&nodes, element.0, &mut text);
        text
    }

    fn parent(&self, element: &MockElement) -> Option<MockElement> {
        self.nodes.borrow()[element.0].parent.map(MockElement)
    }

    fn children(&self, element: &MockElement) -> Vec<MockElement> {
        self.nodes.borrow()[element.0]
            .children
            .iter()
            .copied()
            .map(MockElement)
            .collect()
    }

    fn bounding_rect(&self, element: &MockElement) -> Rect {
        self.nodes.borrow()[element.0].layout.unwrap_or_default()
    }

    fn has_layout_box(&self, element: &MockElement) -> bool {
        if !self.is_attached(element) {
            return false;
        }
        let nodes = self.nodes.borrow();
        let mut current = Some(element.0);
        while let Some(index) = current {
            if nodes[index].layout.is_none() {
                return false;
            }
            current = nodes[index].parent;
        }
        true
    }

    fn style_property(&self, element: &MockElement, property: &str) -> String {
        self.nodes.borrow()[element.0]
            .style
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn set_style_property(&self, element: &MockElement, property: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let style = &mut nodes[element.0].style;
        if value.is_empty() {
            style.remove(property);
        } else {
            style.insert(property.to_string(), value.to_string());
        }
    }

    fn add_class(&self, element: &MockElement, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let node = &mut nodes[element.0];
        if node.classes().any(|c| c == class) {
            return;
        }
        if node.class.trim().is_empty() {
            node.class = class.to_string();
        } else {
            node.class = format!("{} {}", node.class.trim_end(), class);
        }
    }

    fn remove_class(&self, element: &MockElement, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let node = &mut nodes[element.0];
        if !node.classes().any(|c| c == class) {
            return;
        }
        node.class = node
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
    }

    fn force_reflow(&self, _element: &MockElement) {
        self.reflows.set(self.reflows.get() + 1);
    }

    fn create_element(&self, tag: &str) -> Result<MockElement, PageHalError> {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(MockNode::from_spec(ElementSpec::new(tag)));
        Ok(MockElement(nodes.len() - 1))
    }

    fn set_element_id(&self, element: &MockElement, id: &str) {
        self.nodes.borrow_mut()[element.0].id = id.to_string();
    }

    fn append_to_body(&self, element: &MockElement) -> Result<(), PageHalError> {
        self.detach(element.0);
        let mut nodes = self.nodes.borrow_mut();
        nodes[element.0].parent = Some(self.body);
        nodes[self.body].children.push(element.0);
        Ok(())
    }

    fn remove_element(&self, element: &MockElement) {
        self.detach(element.0);
    }

    fn listen_pointer_events(&self, enabled: bool) -> Result<(), PageHalError> {
        tracing::trace!(enabled, "mock pointer listeners");
        self.listening.set(enabled);
        Ok(())
    }

    fn set_timeout(&self, delay_ms: f64, task: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.next_timer.get());
        self.next_timer.set(id.0 + 1);
        self.timers.borrow_mut().push(PendingTimer {
            id,
            due_ms: self.now_ms.get() + delay_ms.max(0.0),
            task,
        });
        id
    }

    fn clear_timeout(&self, timer: TimerId) {
        self.timers.borrow_mut().retain(|t| t.id != timer);
    }

    fn post_message(&self, message: &PageMessage) -> Result<(), PageHalError> {
        self.posted.borrow_mut().push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn sample() -> (MockPage, MockElement, MockElement, MockElement) {
        let page = MockPage::new();
        let list = page.append_to_body_spec(ElementSpec::new("ul").class("items"));
        let a = page.append(&list, ElementSpec::new("li").class("item").text("One"));
        let b = page.append(&list, ElementSpec::new("li").class("item").text("Two"));
        (page, list, a, b)
    }

    #[test]
    fn test_query_nth_of_type() {
        let (page, _, a, b) = sample();
        assert_eq!(page.query_selector("li.item").unwrap(), Some(a));
        assert_eq!(page.query_selector("li.item:nth-of-type(2)").unwrap(), Some(b));
        assert_eq!(page.query_selector("li:nth-of-type(3)").unwrap(), None);
    }

    #[test]
    fn test_text_content_is_recursive() {
        let (page, list, _, _) = sample();
        assert_eq!(page.text_content(&list), "OneTwo");
    }

    #[test]
    fn test_layout_box_requires_rendered_ancestors() {
        let page = MockPage::new();
        let hidden = page.append_to_body_spec(ElementSpec::new("div").hidden());
        let child = page.append(&hidden, ElementSpec::new("p").text("x"));
        assert!(!page.has_layout_box(&child));
        page.set_layout(&hidden, Some(Rect::default()));
        assert!(page.has_layout_box(&child));
        page.remove_element(&hidden);
        assert!(!page.has_layout_box(&child));
    }

    #[test]
    fn test_class_mutation() {
        let (page, _, a, _) = sample();
        page.add_class(&a, "hl");
        assert_eq!(page.class_name(&a), "item hl");
        page.add_class(&a, "hl");
        assert_eq!(page.class_name(&a), "item hl");
        page.remove_class(&a, "hl");
        assert_eq!(page.class_name(&a), "item");
    }

    #[test]
    fn test_empty_style_removes_property() {
        let (page, _, a, _) = sample();
        page.set_style_property(&a, "opacity", "0");
        assert_eq!(page.style(&a, "opacity"), "0");
        page.set_style_property(&a, "opacity", "");
        assert_eq!(page.style(&a, "opacity"), "");
    }

    #[test]
    fn test_timers_fire_in_order() {
        let page = Rc::new(MockPage::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, name) in [(50.0, "b"), (10.0, "a"), (50.0, "c")] {
            let log = Rc::clone(&log);
            page.set_timeout(delay, Box::new(move || log.borrow_mut().push(name)));
        }
        page.advance(20.0);
        assert_eq!(*log.borrow(), vec!["a"]);
        page.advance(30.0);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(page.pending_timer_count(), 0);
    }

    #[test]
    fn test_clear_timeout() {
        let page = MockPage::new();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let id = page.set_timeout(0.0, Box::new(move || flag.set(true)));
        page.clear_timeout(id);
        page.run_due_timers();
        assert!(!fired.get());
    }
}
