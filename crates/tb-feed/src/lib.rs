//! Toot records and the uri-keyed feed collection the page observes.
//!
//! Timeline files map instance names to lists of toots; the same toot can be
//! seen from several instances, so the collection is keyed by the toot's
//! globally unique `uri` and its count is the key count.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Deserialize;
use serde::Serialize;
use tb_core::HostError;
use tb_core::HostResult;
use tracing::debug;
use url::Url;

/// Sanitized toot record. Only the fields the dashboard reads survive
/// sanitization; everything else in the raw API payload is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toot {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    /// Author acct string, `name` or `name@instance`.
    #[serde(default)]
    pub account: Option<String>,
    /// Author profile note (bio) HTML; carries indexing opt-out tags.
    #[serde(default)]
    pub account_note: Option<String>,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub spoiler_text: String,
    #[serde(default)]
    pub language: Option<String>,
    /// Instance the toot was collected from, not necessarily its origin.
    #[serde(default)]
    pub instance_name: Option<String>,
}

impl Toot {
    /// Origin instance, read from the uri host.
    pub fn home_instance(&self) -> Option<String> {
        let parsed = Url::parse(&self.uri).ok()?;
        parsed.host_str().map(str::to_owned)
    }

    /// True when this copy was collected from the toot's origin instance.
    pub fn is_home_copy(&self) -> bool {
        match (&self.instance_name, self.home_instance()) {
            (Some(seen), Some(home)) => seen.eq_ignore_ascii_case(&home),
            _ => false,
        }
    }

    /// Plain-text rendering of the HTML content.
    pub fn text(&self) -> String {
        toot_text(&self.content)
    }

    /// Fully qualified `name@instance` acct string. A local acct (no `@`)
    /// is qualified with the toot's origin instance.
    pub fn account_string(&self) -> Option<String> {
        let acct = self.account.as_deref()?.trim();
        if acct.is_empty() {
            return None;
        }

        if acct.contains('@') {
            return Some(acct.to_owned());
        }

        match self.home_instance() {
            Some(instance) => Some(format!("{acct}@{instance}")),
            None => Some(acct.to_owned()),
        }
    }

    /// True when the author's profile note asks to be left out of search
    /// and bot traffic via one of the conventional hashtags.
    pub fn opts_out(&self) -> bool {
        self.account_note
            .as_deref()
            .is_some_and(note_opts_out)
    }
}

/// Toots deduplicated by uri.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TootSet {
    toots: BTreeMap<String, Toot>,
}

impl TootSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.toots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toots.is_empty()
    }

    pub fn get(&self, uri: &str) -> Option<&Toot> {
        self.toots.get(uri)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toot> {
        self.toots.values()
    }

    /// Inserts a toot, keeping at most one copy per uri. A copy collected
    /// from the toot's origin instance wins over one seen via federation;
    /// otherwise the first copy seen is kept.
    pub fn insert(&mut self, toot: Toot) -> bool {
        match self.toots.entry(toot.uri.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(toot);
                true
            }
            btree_map::Entry::Occupied(mut slot) => {
                if toot.is_home_copy() && !slot.get().is_home_copy() {
                    slot.insert(toot);
                }
                false
            }
        }
    }

    /// Search-style filtering: an optional substring query over the raw
    /// HTML content, always dropping toots whose authors opted out of
    /// indexing through their profile note.
    pub fn filtered(&self, query: Option<&str>) -> Self {
        let mut kept = Self::new();
        for toot in self.iter() {
            if let Some(query) = query {
                if !toot.content.contains(query) {
                    continue;
                }
            }

            if toot.opts_out() {
                continue;
            }

            kept.insert(toot.clone());
        }

        debug!(before = self.len(), after = kept.len(), "feed filtered");
        kept
    }

    /// Parses a timeline file (`{instance_name: [toots]}`) into a deduped
    /// set, tagging each toot with the instance it was collected from.
    pub fn from_timeline_json(source: &str) -> HostResult<Self> {
        let timelines: BTreeMap<String, Vec<Toot>> =
            serde_json::from_str(source).map_err(|error| {
                HostError::new(
                    "feed.timeline_parse_failed",
                    format!("timeline JSON did not parse: {error}"),
                )
            })?;

        let mut set = Self::new();
        let mut seen = 0_usize;
        for (instance, toots) in timelines {
            for mut toot in toots {
                if toot.uri.is_empty() {
                    return Err(HostError::new(
                        "feed.toot_uri_missing",
                        format!("toot from `{instance}` has no uri"),
                    ));
                }

                toot.instance_name.get_or_insert_with(|| instance.clone());
                seen = seen.saturating_add(1);
                set.insert(toot);
            }
        }

        debug!(seen, unique = set.len(), "timeline aggregated");
        Ok(set)
    }
}

/// Profile-note hashtags that mark an account as off-limits for search
/// and bot traffic.
pub const OPT_OUT_NOTE_TAGS: &[&str] = &["nosearch", "nobots", "noindex", "nobot"];

/// True when the note text carries any opt-out tag as a hashtag. Notes
/// arrive as HTML (`#<span>nobot</span>`), so the check runs over the
/// plain-text rendering.
pub fn note_opts_out(note_html: &str) -> bool {
    let text = toot_text(note_html).to_ascii_lowercase();
    OPT_OUT_NOTE_TAGS.iter().any(|tag| {
        text.match_indices('#').any(|(index, _)| {
            let rest = &text[index + 1..];
            rest.starts_with(tag)
                && rest[tag.len()..]
                    .chars()
                    .next()
                    .is_none_or(|ch| !ch.is_ascii_alphanumeric())
        })
    })
}

/// Converts toot HTML to plain text: `<br>` and paragraph ends become
/// newlines, every other tag is dropped, basic entities are decoded.
pub fn toot_text(html: &str) -> String {
    let bytes = html.as_bytes();
    let mut out = String::with_capacity(html.len());
    let mut idx = 0_usize;

    while idx < bytes.len() {
        if bytes[idx] != b'<' {
            let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
            decode_entities_into(&html[idx..next], &mut out);
            idx = next;
            continue;
        }

        let Some((name, is_end, next_idx)) = parse_tag(bytes, idx) else {
            out.push('<');
            idx = idx.saturating_add(1);
            continue;
        };

        if name == "br" || (name == "p" && is_end) {
            push_newline(&mut out);
        }

        idx = next_idx;
    }

    out.trim_end_matches('\n').trim().to_owned()
}

fn push_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
}

fn decode_entities_into(segment: &str, out: &mut String) {
    let mut rest = segment;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        // Only entity-shaped sequences count; a stray `&` is literal text.
        let entity_like = rest.find(';').filter(|end| {
            (2..=8).contains(end)
                && rest[1..*end]
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '#')
        });
        let Some(end) = entity_like else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };

        match &rest[..=end] {
            "&amp;" => out.push('&'),
            "&lt;" => out.push('<'),
            "&gt;" => out.push('>'),
            "&quot;" => out.push('"'),
            "&apos;" | "&#39;" => out.push('\''),
            "&nbsp;" => out.push(' '),
            other => out.push_str(other),
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
}

fn parse_tag(bytes: &[u8], start: usize) -> Option<(String, bool, usize)> {
    if bytes.get(start).copied() != Some(b'<') {
        return None;
    }

    let mut idx = start.saturating_add(1);
    let mut is_end = false;
    if bytes.get(idx).copied() == Some(b'/') {
        is_end = true;
        idx = idx.saturating_add(1);
    }

    let name_start = idx;
    while idx < bytes.len() && is_tag_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }

    if idx == name_start {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[name_start..idx]).to_ascii_lowercase();
    let close = find_byte(bytes, idx, b'>')?;
    Some((name, is_end, close.saturating_add(1)))
}

fn is_tag_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}
