use super::*;

use tb_boot::RESULT_ELEMENT_ID;
use tb_boot::boot_toot_counter;
use tb_core::HostResult;
use tb_dom::Document;
use tb_dom::Element;
use tb_dom::ReadyState;
use tb_feed::TootSet;
use tb_host::PageHost;

/// Builds the dashboard page as the server would have shipped it: still
/// loading, with the empty `result` element the bootstrap writes into.
pub(super) fn dashboard_document(page_url: &str) -> Document {
    let mut document = Document::new("Tootboard", page_url);
    let inserted = document.insert_element(Element::new(RESULT_ELEMENT_ID, "div"));
    debug_assert!(inserted.is_ok());
    document
}

/// Boots the dashboard against a fresh host and replays the loading
/// lifecycle to completion.
pub(super) fn boot_dashboard(options: &ShellOptions, toots: TootSet) -> HostResult<DashboardReport> {
    // Search mode narrows the feed and honors indexing opt-outs.
    let toots = match options.query.as_deref() {
        Some(query) => toots.filtered(Some(query)),
        None => toots,
    };

    let toot_count = toots.len();
    let toot_lines = if options.show_toots {
        toots
            .iter()
            .map(|toot| format!("{}  {}", toot.created_at, toot.text()))
            .collect()
    } else {
        Vec::new()
    };

    let document = dashboard_document(&options.page_url);
    let mut host = PageHost::new(document, options.host_capabilities());

    let strategy = boot_toot_counter(&mut host, toots)?;
    host.advance(ReadyState::Interactive);
    host.advance(ReadyState::Complete);

    Ok(DashboardReport {
        strategy,
        result_html: host
            .document()
            .inner_html(RESULT_ELEMENT_ID)
            .unwrap_or_default()
            .to_owned(),
        toot_count,
        toot_lines,
        faults: host.faults().to_vec(),
    })
}

pub(super) fn print_report(report: &DashboardReport) {
    println!(
        "page ready via {} ({} unique toots)",
        report.strategy.label(),
        report.toot_count
    );
    println!("#result: {}", report.result_html);

    for line in &report.toot_lines {
        println!("  {line}");
    }

    if !report.faults.is_empty() {
        eprintln!("{} page fault(s):", report.faults.len());
        for fault in &report.faults {
            eprintln!("  {fault}");
        }
    }
}
