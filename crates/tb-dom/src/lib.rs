//! Page document model: readiness lifecycle and id-addressed elements.

use tb_core::HostError;
use tb_core::HostResult;

/// Host-reported stage of the document loading lifecycle.
///
/// Ordering matters: readiness only ever moves forward, and any state other
/// than [`ReadyState::Loading`] counts as "not loading" for dispatch purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Interactive => "interactive",
            Self::Complete => "complete",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "loading" => Some(Self::Loading),
            "interactive" => Some(Self::Interactive),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// ID-addressed element whose inner HTML is the mutation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: String,
    pub tag_name: String,
    pub inner_html: String,
}

impl Element {
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            inner_html: String::new(),
        }
    }
}

/// Minimal document: title, URL, readiness, and an id-indexed element store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub url: String,
    ready_state: ReadyState,
    elements: Vec<Element>,
}

impl Document {
    /// New document that is still loading.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ready_state: ReadyState::Loading,
            elements: Vec::new(),
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Moves readiness forward. Backward or same-state transitions are
    /// ignored; returns whether the state changed.
    pub fn advance_ready_state(&mut self, next: ReadyState) -> bool {
        if next <= self.ready_state {
            return false;
        }

        self.ready_state = next;
        true
    }

    /// Adds an element; ids are unique within a document.
    pub fn insert_element(&mut self, element: Element) -> HostResult<()> {
        if element.id.is_empty() {
            return Err(HostError::new(
                "dom.element_id_empty",
                format!("refusing to insert `{}` element without id", element.tag_name),
            ));
        }

        if self.element(&element.id).is_some() {
            return Err(HostError::new(
                "dom.element_id_taken",
                format!("element id `{}` already present", element.id),
            ));
        }

        self.elements.push(element);
        Ok(())
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|element| element.id == id)
    }

    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.element(id).map(|element| element.inner_html.as_str())
    }

    /// Replaces the content of an existing element. A missing element is the
    /// host-surfaced fault of a script writing into a node that is not there.
    pub fn set_inner_html(&mut self, id: &str, html: impl Into<String>) -> HostResult<()> {
        let Some(element) = self.element_mut(id) else {
            return Err(HostError::new(
                "dom.element_missing",
                format!("no element with id `{id}`"),
            ));
        };

        element.inner_html = html.into();
        Ok(())
    }
}
