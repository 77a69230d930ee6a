//! In-memory element tree the account board renders into.
//!
//! Elements live in a flat arena and are addressed by [`ElementId`]. Buttons
//! carry click callbacks that receive the document itself, so a callback can
//! rewrite any element (typically the one label it observes).

use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

/// Handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Page,
    Row,
    Text,
    Label,
    Button,
}

impl ElementKind {
    fn is_container(self) -> bool {
        matches!(self, ElementKind::Page | ElementKind::Row)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("no element {0} in document")]
    UnknownElement(ElementId),

    #[error("element {0} cannot have children")]
    NotAContainer(ElementId),

    #[error("element {0} is already attached to a parent")]
    AlreadyAttached(ElementId),

    #[error("element {0} cannot be placed inside itself")]
    Cycle(ElementId),
}

pub type ClickHandler = Box<dyn FnMut(&mut Document) -> Result<(), DocumentError>>;

struct Element {
    kind: ElementKind,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    on_click: Option<ClickHandler>,
}

pub struct Document {
    elements: Vec<Element>,
    root: ElementId,
    alerts: VecDeque<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a single `Page` root.
    pub fn new() -> Self {
        let mut doc = Self {
            elements: Vec::new(),
            root: ElementId(0),
            alerts: VecDeque::new(),
        };
        doc.root = doc.create_element(ElementKind::Page);
        doc
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn create_element(&mut self, kind: ElementKind) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            kind,
            text: String::new(),
            parent: None,
            children: Vec::new(),
            on_click: None,
        });
        id
    }

    pub fn create_text_node(&mut self, text: impl Into<String>) -> ElementId {
        let id = self.create_element(ElementKind::Text);
        self.elements[id.0].text = text.into();
        id
    }

    fn get(&self, id: ElementId) -> Result<&Element, DocumentError> {
        self.elements.get(id.0).ok_or(DocumentError::UnknownElement(id))
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element, DocumentError> {
        self.elements
            .get_mut(id.0)
            .ok_or(DocumentError::UnknownElement(id))
    }

    pub fn kind(&self, id: ElementId) -> Result<ElementKind, DocumentError> {
        Ok(self.get(id)?.kind)
    }

    pub fn text(&self, id: ElementId) -> Result<&str, DocumentError> {
        Ok(&self.get(id)?.text)
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<(), DocumentError> {
        self.get_mut(id)?.text = text.into();
        Ok(())
    }

    pub fn children(&self, id: ElementId) -> Result<&[ElementId], DocumentError> {
        Ok(&self.get(id)?.children)
    }

    /// Attach `child` as the last child of `parent` and hand `child` back,
    /// so building a row reads as a chain of appends.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<ElementId, DocumentError> {
        if !self.get(parent)?.kind.is_container() {
            return Err(DocumentError::NotAContainer(parent));
        }
        if self.is_ancestor_or_self(child, parent)? {
            return Err(DocumentError::Cycle(child));
        }
        let root = self.root;
        let node = self.get_mut(child)?;
        if node.parent.is_some() || child == root {
            return Err(DocumentError::AlreadyAttached(child));
        }
        node.parent = Some(parent);
        self.elements[parent.0].children.push(child);
        Ok(child)
    }

    /// Whether `ancestor` is `id` or one of its parents
    fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> Result<bool, DocumentError> {
        self.get(ancestor)?;
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return Ok(true);
            }
            current = self.get(node)?.parent;
        }
        Ok(false)
    }

    /// Register the click callback of `id`, replacing any previous one.
    pub fn on_click<F>(&mut self, id: ElementId, handler: F) -> Result<(), DocumentError>
    where
        F: FnMut(&mut Document) -> Result<(), DocumentError> + 'static,
    {
        self.get_mut(id)?.on_click = Some(Box::new(handler));
        Ok(())
    }

    /// Dispatch a click on `id`. Returns `false` when the element has no
    /// callback.
    pub fn click(&mut self, id: ElementId) -> Result<bool, DocumentError> {
        // The callback is taken out while it runs so it can borrow the document.
        let Some(mut handler) = self.get_mut(id)?.on_click.take() else {
            return Ok(false);
        };
        let result = handler(self);

        let slot = &mut self.elements[id.0].on_click;
        if slot.is_none() {
            *slot = Some(handler);
        }
        result.map(|()| true)
    }

    /// Queue a modal message.
    pub fn alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("alert: {}", message);
        self.alerts.push_back(message);
    }

    pub fn pending_alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    /// Dismiss the oldest pending alert.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alerts.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_build_row() {
        let mut doc = Document::new();
        let row = doc.create_element(ElementKind::Row);
        let row = doc.append_child(doc.root(), row).unwrap();
        let name = doc.create_text_node("Bob:");
        doc.append_child(row, name).unwrap();
        let label = doc.create_element(ElementKind::Label);
        let label = doc.append_child(row, label).unwrap();
        doc.set_text(label, "100").unwrap();

        assert_eq!(doc.children(doc.root()).unwrap(), &[row]);
        assert_eq!(doc.children(row).unwrap(), &[name, label]);
        assert_eq!(doc.text(name).unwrap(), "Bob:");
        assert_eq!(doc.text(label).unwrap(), "100");
        assert_eq!(doc.kind(label).unwrap(), ElementKind::Label);
    }

    #[test]
    fn test_append_rules() {
        let mut doc = Document::new();
        let text = doc.create_text_node("leaf");
        let other = doc.create_text_node("other");
        doc.append_child(doc.root(), text).unwrap();

        assert_eq!(doc.append_child(text, other), Err(DocumentError::NotAContainer(text)));
        assert_eq!(doc.append_child(doc.root(), text), Err(DocumentError::AlreadyAttached(text)));

        let missing = ElementId(99);
        assert_eq!(doc.set_text(missing, "x"), Err(DocumentError::UnknownElement(missing)));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let mut doc = Document::new();
        let row = doc.create_element(ElementKind::Row);
        assert_eq!(doc.append_child(row, row), Err(DocumentError::Cycle(row)));
        assert!(doc.children(row).unwrap().is_empty());

        // A detached row holding another row cannot go under its own child
        let inner = doc.create_element(ElementKind::Row);
        doc.append_child(row, inner).unwrap();
        assert_eq!(doc.append_child(inner, row), Err(DocumentError::Cycle(row)));
        assert!(doc.children(inner).unwrap().is_empty());

        let root = doc.root();
        doc.append_child(root, row).unwrap();
        assert_eq!(doc.append_child(inner, root), Err(DocumentError::Cycle(root)));
        assert_eq!(doc.children(root).unwrap(), &[row]);
    }

    #[test]
    fn test_click_dispatch() {
        let mut doc = Document::new();
        let button = doc.create_element(ElementKind::Button);
        let label = doc.create_element(ElementKind::Label);
        let clicks = Rc::new(Cell::new(0));

        let seen = Rc::clone(&clicks);
        doc.on_click(button, move |doc| {
            seen.set(seen.get() + 1);
            doc.set_text(label, seen.get().to_string())
        })
        .unwrap();

        assert!(doc.click(button).unwrap());
        assert!(doc.click(button).unwrap());
        assert_eq!(clicks.get(), 2);
        assert_eq!(doc.text(label).unwrap(), "2");

        // No callback on the label itself.
        assert!(!doc.click(label).unwrap());
    }

    #[test]
    fn test_click_propagates_callback_error() {
        let mut doc = Document::new();
        let button = doc.create_element(ElementKind::Button);
        let missing = ElementId(42);
        doc.on_click(button, move |doc| doc.set_text(missing, "x")).unwrap();

        assert_eq!(doc.click(button), Err(DocumentError::UnknownElement(missing)));
        // Handler survives a failed run.
        assert_eq!(doc.click(button), Err(DocumentError::UnknownElement(missing)));
    }

    #[test]
    fn test_alerts_are_fifo() {
        let mut doc = Document::new();
        assert_eq!(doc.pending_alert(), None);
        doc.alert("first");
        doc.alert("second");
        assert_eq!(doc.pending_alert(), Some("first"));
        assert_eq!(doc.take_alert().as_deref(), Some("first"));
        assert_eq!(doc.take_alert().as_deref(), Some("second"));
        assert_eq!(doc.take_alert(), None);
    }
}
