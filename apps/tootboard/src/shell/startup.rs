use super::*;

use std::process::ExitCode;

use tb_feed::TootSet;
use tracing::warn;
use url::Url;

pub(crate) fn run() -> ExitCode {
    init_tracing();

    let options = match options_from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("Tootboard startup error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let toots = match load_feed(&options) {
        Ok(toots) => toots,
        Err(error) => {
            eprintln!("Tootboard feed error: {error}");
            return ExitCode::FAILURE;
        }
    };

    match page::boot_dashboard(&options, toots) {
        Ok(report) => {
            page::print_report(&report);
            if report.faults.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            eprintln!("Tootboard boot error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn options_from_args(mut args: impl Iterator<Item = String>) -> Result<ShellOptions, String> {
    let mut options = ShellOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tb-feed" => {
                let path = args
                    .next()
                    .ok_or_else(|| "missing path after --tb-feed".to_owned())?;
                options.feed_path = Some(PathBuf::from(path));
            }
            "--page-url" => {
                let raw = args
                    .next()
                    .ok_or_else(|| "missing url after --page-url".to_owned())?;
                options.page_url = normalize_page_url(&raw)?;
            }
            "--query" => {
                let text = args
                    .next()
                    .ok_or_else(|| "missing text after --query".to_owned())?;
                options.query = Some(text);
            }
            "--legacy" => options.legacy_host = true,
            "--show-toots" => options.show_toots = true,
            other => {
                return Err(format!(
                    "unsupported argument `{other}` (expected: --tb-feed <path> | --page-url <url> | --query <text> | --legacy | --show-toots)"
                ));
            }
        }
    }

    if options.feed_path.is_none() {
        if let Some(env_path) = std::env::var_os(FEED_ENV_VAR) {
            options.feed_path = Some(PathBuf::from(env_path));
        }
    }

    Ok(options)
}

/// Accepts bare hosts the way an address bar would: no scheme means https.
fn normalize_page_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("page url is empty".to_owned());
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    Url::parse(&candidate)
        .map(String::from)
        .map_err(|error| format!("invalid page url `{raw}`: {error}"))
}

fn load_feed(options: &ShellOptions) -> Result<TootSet, String> {
    let Some(path) = options.feed_path.as_deref() else {
        warn!("no timeline file given; rendering an empty feed");
        return Ok(TootSet::new());
    };

    let source = std::fs::read_to_string(path)
        .map_err(|error| format!("cannot read `{}`: {error}", path.display()))?;

    TootSet::from_timeline_json(&source).map_err(|error| error.to_string())
}

include!("tests.rs");
