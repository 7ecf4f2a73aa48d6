use std::path::PathBuf;

use tb_boot::DispatchStrategy;
use tb_host::HostCapabilities;

/// Env override for the timeline file, checked after `--tb-feed`.
const FEED_ENV_VAR: &str = "TOOTBOARD_FEED";

const DEFAULT_PAGE_URL: &str = "https://tootboard.local/";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ShellOptions {
    feed_path: Option<PathBuf>,
    page_url: String,
    query: Option<String>,
    legacy_host: bool,
    show_toots: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            feed_path: None,
            page_url: DEFAULT_PAGE_URL.to_owned(),
            query: None,
            legacy_host: false,
            show_toots: false,
        }
    }
}

impl ShellOptions {
    fn host_capabilities(&self) -> HostCapabilities {
        if self.legacy_host {
            HostCapabilities::legacy()
        } else {
            HostCapabilities::modern()
        }
    }
}

/// What one dashboard boot produced, for printing and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DashboardReport {
    strategy: DispatchStrategy,
    result_html: String,
    toot_count: usize,
    toot_lines: Vec<String>,
    faults: Vec<String>,
}

mod page;
mod startup;

pub(crate) use startup::run;
