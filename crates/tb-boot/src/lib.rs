//! Load-time bootstrap: ready dispatch plus the toot-count renderer.
//!
//! The dispatcher guarantees a callback runs exactly once, no earlier than
//! the document reaching a non-loading readiness state. Which mechanism gets
//! it there depends on what the host offers; the probes run in a fixed
//! priority order and the first applicable one wins.

use tb_core::HostError;
use tb_core::HostResult;
use tb_dom::Document;
use tb_dom::ReadyState;
use tb_feed::TootSet;
use tb_host::HostCapabilities;
use tb_host::PageHost;
use tracing::debug;

/// Element the rendered count lands in.
pub const RESULT_ELEMENT_ID: &str = "result";

/// How a ready callback gets scheduled, in probe priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    /// Document already past loading: run synchronously, right now.
    Immediate,
    /// Defer via a one-time content-loaded subscription.
    ContentLoaded,
    /// Legacy fallback: watch readiness changes until `complete`.
    ReadyStatePoll,
}

impl DispatchStrategy {
    pub fn label(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::ContentLoaded => "content-loaded",
            Self::ReadyStatePoll => "ready-state-poll",
        }
    }
}

/// Picks the first applicable strategy for the given host surface.
pub fn select_strategy(
    state: ReadyState,
    capabilities: HostCapabilities,
) -> Option<DispatchStrategy> {
    if !state.is_loading() {
        return Some(DispatchStrategy::Immediate);
    }

    if capabilities.event_listeners {
        return Some(DispatchStrategy::ContentLoaded);
    }

    if capabilities.ready_state_events {
        return Some(DispatchStrategy::ReadyStatePoll);
    }

    None
}

/// Runs `callback` exactly once, no earlier than document readiness permits.
///
/// Returns the strategy that scheduled it. A callback error is surfaced
/// through the host fault log on every path, so the immediate and deferred
/// branches fail identically. A host offering no usable mechanism yields
/// `boot.no_ready_strategy` and the callback never runs.
pub fn run_when_ready<F>(host: &mut PageHost, callback: F) -> HostResult<DispatchStrategy>
where
    F: FnOnce(&mut Document) -> HostResult<()> + 'static,
{
    let state = host.ready_state();
    let Some(strategy) = select_strategy(state, host.capabilities()) else {
        return Err(HostError::new(
            "boot.no_ready_strategy",
            "host offers no way to observe readiness; callback will never run",
        ));
    };

    debug!(
        ready_state = state.as_str(),
        strategy = strategy.label(),
        "dispatching ready callback"
    );

    match strategy {
        DispatchStrategy::Immediate => {
            if let Err(error) = callback(host.document_mut()) {
                host.record_fault(&error);
            }
        }
        DispatchStrategy::ContentLoaded => {
            host.on_content_loaded(Box::new(callback))?;
        }
        DispatchStrategy::ReadyStatePoll => {
            // Readiness-change notifications repeat; the latch makes the
            // exactly-once guarantee explicit instead of leaning on the
            // callback being idempotent.
            let mut pending = Some(callback);
            host.on_ready_state_change(Box::new(move |state, document| {
                if state != ReadyState::Complete {
                    return Ok(());
                }

                match pending.take() {
                    Some(callback) => callback(document),
                    None => Ok(()),
                }
            }))?;
        }
    }

    Ok(strategy)
}

/// Writes the count line for an explicit toot collection into `#result`.
pub fn render_toot_count(toots: &TootSet, document: &mut Document) -> HostResult<()> {
    let markup = toot_count_markup(toots.len());
    debug!(count = toots.len(), "rendering toot count");
    document.set_inner_html(RESULT_ELEMENT_ID, markup)
}

/// The fixed fragment the dashboard shows.
pub fn toot_count_markup(count: usize) -> String {
    format!("<p>There are {count} toots.</p>")
}

/// The page's single load-time call site: render the count once ready.
pub fn boot_toot_counter(host: &mut PageHost, toots: TootSet) -> HostResult<DispatchStrategy> {
    run_when_ready(host, move |document| render_toot_count(&toots, document))
}
