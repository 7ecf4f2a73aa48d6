#[cfg(test)]
mod tests {
    use super::{ShellOptions, normalize_page_url, options_from_args, page};
    use tb_boot::{DispatchStrategy, RESULT_ELEMENT_ID};
    use tb_feed::TootSet;
    use tb_host::HostCapabilities;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|arg| (*arg).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn timeline_of_three() -> TootSet {
        let source = r#"{
            "a.example": [
                {"uri": "https://a.example/statuses/1", "content": "<p>one</p>",
                 "account": "alice"},
                {"uri": "https://a.example/statuses/2", "content": "<p>two</p>",
                 "account": "alice",
                 "account_note": "<p>#<span>nobot</span></p>"}
            ],
            "b.example": [
                {"uri": "https://b.example/statuses/9", "content": "<p>nine</p>"},
                {"uri": "https://a.example/statuses/1", "content": "<p>one</p>",
                 "account": "alice"}
            ]
        }"#;
        TootSet::from_timeline_json(source).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn default_options_use_a_modern_host() {
        let options = options_from_args(args(&[]));
        assert!(options.is_ok());
        let options = options.unwrap_or_else(|_| unreachable!());
        assert_eq!(options, ShellOptions::default());
        assert_eq!(options.host_capabilities(), HostCapabilities::modern());
    }

    #[test]
    fn legacy_flag_downgrades_the_host() {
        let options = options_from_args(args(&["--legacy"]));
        assert!(options.is_ok_and(|options| {
            options.host_capabilities() == HostCapabilities::legacy()
        }));
    }

    #[test]
    fn feed_path_comes_from_the_flag() {
        let options = options_from_args(args(&["--tb-feed", "feeds/home.json"]));
        assert!(options.is_ok_and(|options| {
            options.feed_path.as_deref()
                == Some(std::path::Path::new("feeds/home.json"))
        }));
    }

    #[test]
    fn unknown_arguments_are_rejected() {
        let options = options_from_args(args(&["--frobnicate"]));
        assert!(options.is_err_and(|error| error.contains("--frobnicate")));
    }

    #[test]
    fn missing_flag_values_are_rejected() {
        assert!(options_from_args(args(&["--tb-feed"])).is_err());
        assert!(options_from_args(args(&["--page-url"])).is_err());
        assert!(options_from_args(args(&["--query"])).is_err());
    }

    #[test]
    fn query_flag_is_captured() {
        let options = options_from_args(args(&["--query", "rust"]));
        assert!(options.is_ok_and(|options| options.query.as_deref() == Some("rust")));
    }

    #[test]
    fn page_url_normalization_adds_a_scheme() {
        let normalized = normalize_page_url("tootboard.local/home");
        assert_eq!(normalized.as_deref(), Ok("https://tootboard.local/home"));

        let kept = normalize_page_url("http://localhost:5000/");
        assert_eq!(kept.as_deref(), Ok("http://localhost:5000/"));

        assert!(normalize_page_url("   ").is_err());
        assert!(normalize_page_url("https://").is_err());
    }

    #[test]
    fn dashboard_page_ships_with_an_empty_result_element() {
        let document = page::dashboard_document("https://tootboard.local/");
        assert_eq!(document.inner_html(RESULT_ELEMENT_ID), Some(""));
        assert!(document.ready_state().is_loading());
    }

    #[test]
    fn dashboard_boot_renders_the_aggregated_count() {
        let report = page::boot_dashboard(&ShellOptions::default(), timeline_of_three());
        assert!(report.is_ok());
        let report = report.unwrap_or_else(|_| unreachable!());
        assert_eq!(report.strategy, DispatchStrategy::ContentLoaded);
        assert_eq!(report.toot_count, 3);
        assert_eq!(report.result_html, "<p>There are 3 toots.</p>");
        assert!(report.faults.is_empty());
        assert!(report.toot_lines.is_empty());
    }

    #[test]
    fn dashboard_boot_takes_the_legacy_path_when_asked() {
        let options = ShellOptions {
            legacy_host: true,
            ..ShellOptions::default()
        };
        let report = page::boot_dashboard(&options, TootSet::new());
        assert!(report.is_ok_and(|report| {
            report.strategy == DispatchStrategy::ReadyStatePoll
                && report.result_html == "<p>There are 0 toots.</p>"
        }));
    }

    #[test]
    fn query_narrows_the_rendered_count_and_honors_opt_outs() {
        let options = ShellOptions {
            query: Some("o".to_owned()),
            ..ShellOptions::default()
        };
        // "one" and "two" match the query, but the opted-out author of
        // "two" is dropped; "nine" does not match at all.
        let report = page::boot_dashboard(&options, timeline_of_three());
        assert!(report.is_ok());
        let report = report.unwrap_or_else(|_| unreachable!());
        assert_eq!(report.toot_count, 1);
        assert_eq!(report.result_html, "<p>There are 1 toots.</p>");
    }

    #[test]
    fn show_toots_lists_plain_text_lines() {
        let options = ShellOptions {
            show_toots: true,
            ..ShellOptions::default()
        };
        let report = page::boot_dashboard(&options, timeline_of_three());
        assert!(report.is_ok_and(|report| {
            report.toot_lines.len() == 3
                && report.toot_lines.iter().any(|line| line.contains("one"))
        }));
    }
}
