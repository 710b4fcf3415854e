//! Navigation index building from the remote navigation document.
//!
//! The navigation document is a single HTML page enumerating every API
//! symbol. Each container tag carries a `pageid` attribute and a nested
//! `toc--row` holding the anchor for the symbol's reference page. Identifiers
//! use several separator conventions (`///` for dotted namespaces, `//` for
//! members and functions) that documentation authors reference
//! inconsistently, so every entry is expanded into multiple addressable key
//! variants up front. This keeps lookups to a single exact `get` at the cost
//! of a larger index.
//!
//! The index is built at most once per process. Both the successful index
//! and a failed attempt are memoized: a build failure is sticky, so fetch
//! failures are retried once per process rather than once per page. A
//! document that parses to zero entries counts as a failure; an empty index
//! would turn every lookup into a miss with useless diagnostics.

use std::collections::HashMap;
use std::sync::Arc;

use tl::{HTMLTag, Parser, ParserOptions};
use tokio::sync::OnceCell;
use tracing::{info, warn};
use url::Url;

use crate::{Config, Error, Fetcher, Result};

/// Separator between a namespace identifier and its trailing detail segments.
const NAMESPACE_SEP: &str = "///";

/// Separator marking member/function-style identifiers.
const MEMBER_SEP: &str = "//";

/// Mapping from lookup key to resolved href.
///
/// Keys are unique; the first inserted value for a key wins, so derived
/// variants never overwrite an existing entry. Every value is an absolute
/// URL resolved against the navigation document's own location at insertion
/// time (falling back to the raw href when resolution fails). The index is
/// immutable once built.
#[derive(Debug, Default, Clone)]
pub struct NavigationIndex {
    entries: HashMap<String, String>,
}

impl NavigationIndex {
    /// Look up the href for an exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of lookup keys in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all lookup keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Insert a key unless it is already present.
    pub(crate) fn insert_if_new(&mut self, key: String, href: &str) {
        self.entries
            .entry(key)
            .or_insert_with(|| href.to_string());
    }
}

/// Identifier substring before the `///` separator, or the whole identifier.
fn base_key(pageid: &str) -> &str {
    pageid.split(NAMESPACE_SEP).next().unwrap_or(pageid)
}

/// Dotted variant of a full identifier: separator runs collapsed to periods.
///
/// `proj///mod/Cls` becomes `proj.mod.Cls`, supporting dot-qualified
/// reference syntax for namespaced identifiers.
fn dotted_identifier(pageid: &str) -> String {
    pageid
        .replace(NAMESPACE_SEP, "/")
        .replace(MEMBER_SEP, "/")
        .replace('/', ".")
}

/// Trimmed variant for member/function-style identifiers.
///
/// Keeps everything before the `//` marker plus only the first path segment
/// after it, discarding deeper nesting. Returns `None` when the key has no
/// `//` marker or trimming leaves nothing.
fn trimmed_member(key: &str) -> Option<String> {
    let idx = key.find(MEMBER_SEP)?;
    let before = &key[..idx];
    let after = &key[idx + MEMBER_SEP.len()..];
    let first_segment = after.split('/').next().unwrap_or(after);

    let trimmed = if first_segment.is_empty() {
        before.trim_end_matches('/').to_string()
    } else {
        format!("{before}{MEMBER_SEP}{first_segment}")
    };

    (!trimmed.is_empty()).then_some(trimmed)
}

/// Dotted form of a trimmed key: `//` and `/` collapsed to periods.
fn dotted_trimmed(trimmed: &str) -> String {
    trimmed.replace(MEMBER_SEP, ".").replace('/', ".")
}

/// Read an attribute value as an owned string, `None` when absent or bare.
fn attr(tag: &HTMLTag<'_>, name: &str) -> Option<String> {
    tag.attributes()
        .get(name)
        .flatten()
        .map(|value| value.as_utf8_str().into_owned())
}

/// Depth-first search for the first descendant tag matching the predicate.
fn find_descendant<'p, 'buf, F>(
    tag: &HTMLTag<'buf>,
    parser: &'p Parser<'buf>,
    pred: &F,
) -> Option<&'p HTMLTag<'buf>>
where
    F: Fn(&HTMLTag<'buf>) -> bool,
{
    for handle in tag.children().top().iter() {
        let Some(node) = handle.get(parser) else {
            continue;
        };
        let Some(child) = node.as_tag() else {
            continue;
        };
        if pred(child) {
            return Some(child);
        }
        if let Some(found) = find_descendant(child, parser, pred) {
            return Some(found);
        }
    }
    None
}

fn is_div(tag: &HTMLTag<'_>) -> bool {
    tag.name().as_utf8_str().eq_ignore_ascii_case("div")
}

/// Parse the navigation document into a [`NavigationIndex`].
///
/// Hrefs are resolved against `nav_url` so relative references come out
/// absolute; an href that fails to resolve is stored verbatim.
pub fn parse_navigation(html: &str, nav_url: &str) -> Result<NavigationIndex> {
    let dom = tl::parse(html, ParserOptions::default())
        .map_err(|e| Error::Parse(format!("navigation document: {e}")))?;
    let parser = dom.parser();
    let nav_base = Url::parse(nav_url).ok();

    let mut index = NavigationIndex::default();

    for node in dom.nodes() {
        let Some(tag) = node.as_tag() else { continue };
        if !is_div(tag) {
            continue;
        }
        let Some(pageid) = attr(tag, "pageid") else {
            continue;
        };
        if pageid.is_empty() {
            continue;
        }

        let key = base_key(&pageid);

        let Some(row) = find_descendant(tag, parser, &|t: &HTMLTag<'_>| {
            is_div(t) && t.attributes().is_class_member("toc--row")
        }) else {
            continue;
        };
        let Some(href) = find_descendant(row, parser, &|t: &HTMLTag<'_>| {
            t.name().as_utf8_str().eq_ignore_ascii_case("a")
        })
        .and_then(|anchor| attr(anchor, "href")) else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        let resolved = nav_base
            .as_ref()
            .and_then(|base| base.join(&href).ok())
            .map_or_else(|| href.clone(), |url| url.to_string());

        index.insert_if_new(key.to_string(), &resolved);

        if pageid.contains(NAMESPACE_SEP) {
            index.insert_if_new(dotted_identifier(&pageid), &resolved);
        }

        if key.contains(MEMBER_SEP) {
            if let Some(trimmed) = trimmed_member(key) {
                let dotted_form = dotted_trimmed(&trimmed);
                index.insert_if_new(trimmed, &resolved);
                index.insert_if_new(dotted_form, &resolved);
            }
        }
    }

    Ok(index)
}

async fn build_index(fetcher: &Fetcher, config: &Config) -> Result<NavigationIndex> {
    let html = fetcher.fetch_html(&config.nav_url).await?;
    parse_navigation(&html, &config.nav_url)
}

/// Process-lifetime memoized navigation index with sticky failure.
///
/// The cell holds the outcome of the single build attempt: `Some(index)` on
/// success, `None` on failure. Concurrent first callers await the same
/// in-flight build, so at most one fetch is issued per process.
#[derive(Debug, Default)]
pub struct NavigationCache {
    outcome: OnceCell<Option<Arc<NavigationIndex>>>,
}

impl NavigationCache {
    /// Create an empty cache (no build attempted yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized index, building it on first use.
    ///
    /// Never returns an error: a failed build is reported through a warning
    /// and memoized as `None`, and later calls return that outcome without
    /// touching the network again. A document yielding no entries is treated
    /// the same as a failed build.
    pub async fn get_or_build(
        &self,
        fetcher: &Fetcher,
        config: &Config,
    ) -> Option<Arc<NavigationIndex>> {
        self.outcome
            .get_or_init(|| async {
                match build_index(fetcher, config).await {
                    Ok(index) if index.is_empty() => {
                        warn!(url = %config.nav_url, "navigation document yielded no entries");
                        None
                    },
                    Ok(index) => {
                        info!("API navigation loaded with {} entries", index.len());
                        Some(Arc::new(index))
                    },
                    Err(err) => {
                        warn!(error = %err, url = %config.nav_url, "failed to build API navigation index");
                        None
                    },
                }
            })
            .await
            .clone()
    }
}
