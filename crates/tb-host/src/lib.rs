//! Simulated page host: the environment surface a bootstrap script probes.
//!
//! A [`PageHost`] owns the document and the two notification mechanisms a
//! browser-like host may offer: a one-time "content loaded" subscription and
//! a generic readiness-change subscription. Capability flags make each
//! mechanism individually absent so legacy and inert hosts can be modeled.

use core::fmt;

use tb_core::HostError;
use tb_core::HostResult;
use tb_core::clamp_log_text;
use tb_core::normalize_log_whitespace;
use tb_dom::Document;
use tb_dom::ReadyState;
use tracing::debug;
use tracing::warn;

const MAX_PAGE_FAULTS: usize = 24;
const MAX_FAULT_MESSAGE_CHARS: usize = 240;

/// One-shot callback delivered when the document content has loaded.
pub type ContentLoadedCallback = Box<dyn FnOnce(&mut Document) -> HostResult<()>>;

/// Persistent callback delivered on every readiness transition.
pub type ReadyStateCallback = Box<dyn FnMut(ReadyState, &mut Document) -> HostResult<()>>;

/// Which notification mechanisms this host offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// General-purpose event subscription (content-loaded notifications).
    pub event_listeners: bool,
    /// Generic readiness-change notifications.
    pub ready_state_events: bool,
}

impl HostCapabilities {
    pub fn modern() -> Self {
        Self {
            event_listeners: true,
            ready_state_events: true,
        }
    }

    pub fn legacy() -> Self {
        Self {
            event_listeners: false,
            ready_state_events: true,
        }
    }

    /// Host offering neither mechanism. Nothing can defer work on it.
    pub fn inert() -> Self {
        Self {
            event_listeners: false,
            ready_state_events: false,
        }
    }
}

/// Single-threaded page host driving the loading lifecycle.
pub struct PageHost {
    document: Document,
    capabilities: HostCapabilities,
    content_loaded: Vec<ContentLoadedCallback>,
    ready_state_change: Vec<ReadyStateCallback>,
    faults: Vec<String>,
}

impl PageHost {
    pub fn new(document: Document, capabilities: HostCapabilities) -> Self {
        Self {
            document,
            capabilities,
            content_loaded: Vec::new(),
            ready_state_change: Vec::new(),
            faults: Vec::new(),
        }
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    pub fn ready_state(&self) -> ReadyState {
        self.document.ready_state()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Faults surfaced by the host while delivering callbacks.
    pub fn faults(&self) -> &[String] {
        &self.faults
    }

    /// Records a fault the way a browser console would: one line, clamped.
    pub fn record_fault(&mut self, error: &HostError) {
        warn!(code = error.code, "page fault: {}", error.message);
        if self.faults.len() >= MAX_PAGE_FAULTS {
            return;
        }

        let message = normalize_log_whitespace(&error.message);
        let message = clamp_log_text(&message, MAX_FAULT_MESSAGE_CHARS);
        self.faults.push(format!("{}: {message}", error.code));
    }

    /// Subscribes a one-time content-loaded listener.
    pub fn on_content_loaded(&mut self, callback: ContentLoadedCallback) -> HostResult<()> {
        if !self.capabilities.event_listeners {
            return Err(HostError::new(
                "host.listeners_unsupported",
                "host offers no general-purpose event subscription",
            ));
        }

        self.content_loaded.push(callback);
        Ok(())
    }

    /// Subscribes a persistent readiness-change listener.
    pub fn on_ready_state_change(&mut self, callback: ReadyStateCallback) -> HostResult<()> {
        if !self.capabilities.ready_state_events {
            return Err(HostError::new(
                "host.ready_events_unsupported",
                "host offers no readiness-change notifications",
            ));
        }

        self.ready_state_change.push(callback);
        Ok(())
    }

    /// Moves the document lifecycle forward and delivers notifications.
    ///
    /// Content-loaded listeners fire once, when the document first leaves
    /// `loading`; readiness-change listeners fire on every forward
    /// transition. Backward transitions deliver nothing.
    pub fn advance(&mut self, next: ReadyState) {
        let previous = self.document.ready_state();
        if !self.document.advance_ready_state(next) {
            return;
        }

        debug!(
            from = previous.as_str(),
            to = next.as_str(),
            "document readiness advanced"
        );

        if previous.is_loading() && !next.is_loading() {
            self.deliver_content_loaded();
        }

        self.deliver_ready_state_change(next);
    }

    fn deliver_content_loaded(&mut self) {
        // Drained, never re-armed: content-loaded listeners are one-shot.
        let listeners = std::mem::take(&mut self.content_loaded);
        debug!(listeners = listeners.len(), "delivering content-loaded");
        for listener in listeners {
            if let Err(error) = listener(&mut self.document) {
                self.record_fault(&error);
            }
        }
    }

    fn deliver_ready_state_change(&mut self, state: ReadyState) {
        let mut faults = Vec::new();
        for listener in &mut self.ready_state_change {
            if let Err(error) = listener(state, &mut self.document) {
                faults.push(error);
            }
        }

        for error in &faults {
            self.record_fault(error);
        }
    }
}

impl fmt::Debug for PageHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHost")
            .field("document", &self.document)
            .field("capabilities", &self.capabilities)
            .field("content_loaded_listeners", &self.content_loaded.len())
            .field("ready_state_listeners", &self.ready_state_change.len())
            .field("faults", &self.faults)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{HostCapabilities, PageHost};
    use std::cell::Cell;
    use std::rc::Rc;
    use tb_core::HostError;
    use tb_dom::{Document, Element, ReadyState};

    fn loading_page(capabilities: HostCapabilities) -> PageHost {
        let mut document = Document::new("Tootboard", "https://tootboard.local/");
        document
            .insert_element(Element::new("result", "div"))
            .unwrap_or_else(|_| unreachable!());
        PageHost::new(document, capabilities)
    }

    #[test]
    fn content_loaded_fires_once_on_leaving_loading() {
        let mut host = loading_page(HostCapabilities::modern());
        let fired = Rc::new(Cell::new(0_u32));
        let counter = Rc::clone(&fired);
        let subscribed = host.on_content_loaded(Box::new(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        }));
        assert!(subscribed.is_ok());

        assert_eq!(fired.get(), 0);
        host.advance(ReadyState::Interactive);
        assert_eq!(fired.get(), 1);
        host.advance(ReadyState::Complete);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn ready_state_listener_sees_every_forward_transition() {
        let mut host = loading_page(HostCapabilities::legacy());
        let states = Rc::new(std::cell::RefCell::new(Vec::new()));
        let seen = Rc::clone(&states);
        let subscribed = host.on_ready_state_change(Box::new(move |state, _| {
            seen.borrow_mut().push(state);
            Ok(())
        }));
        assert!(subscribed.is_ok());

        host.advance(ReadyState::Interactive);
        host.advance(ReadyState::Interactive);
        host.advance(ReadyState::Loading);
        host.advance(ReadyState::Complete);
        assert_eq!(
            *states.borrow(),
            vec![ReadyState::Interactive, ReadyState::Complete]
        );
    }

    #[test]
    fn legacy_host_rejects_modern_subscription() {
        let mut host = loading_page(HostCapabilities::legacy());
        let error = host.on_content_loaded(Box::new(|_| Ok(())));
        assert!(error.is_err_and(|error| error.code == "host.listeners_unsupported"));
    }

    #[test]
    fn inert_host_rejects_both_subscriptions() {
        let mut host = loading_page(HostCapabilities::inert());
        assert!(host.on_content_loaded(Box::new(|_| Ok(()))).is_err());
        assert!(host.on_ready_state_change(Box::new(|_, _| Ok(()))).is_err());
    }

    #[test]
    fn callback_errors_land_in_the_fault_log() {
        let mut host = loading_page(HostCapabilities::modern());
        let subscribed = host.on_content_loaded(Box::new(|document| {
            document.set_inner_html("missing", "<p>never lands</p>")
        }));
        assert!(subscribed.is_ok());

        host.advance(ReadyState::Complete);
        assert_eq!(host.faults().len(), 1);
        assert!(host.faults()[0].starts_with("dom.element_missing:"));
    }

    #[test]
    fn fault_log_is_clamped_and_single_line() {
        let mut host = loading_page(HostCapabilities::modern());
        let noisy = format!("line one\nline two {}", "x".repeat(600));
        host.record_fault(&HostError::new("host.test_fault", noisy));
        assert_eq!(host.faults().len(), 1);
        assert!(!host.faults()[0].contains('\n'));
        assert!(host.faults()[0].len() < 300);
    }

    #[test]
    fn fault_log_has_a_bounded_size() {
        let mut host = loading_page(HostCapabilities::modern());
        for index in 0..40 {
            host.record_fault(&HostError::new("host.test_fault", format!("fault {index}")));
        }
        assert_eq!(host.faults().len(), 24);
    }
}
