//! Rewriting of `api:` cross-reference links in page text.
//!
//! The resolver is the per-page entry point of the crate: the build pipeline
//! hands it raw page text and gets back the same text with every resolvable
//! `[display](api:key)` link turned into an ordinary absolute link. A page
//! with no `api:` references (or only blank-keyed ones) never triggers the
//! navigation fetch.
//!
//! No failure mode reaches the caller. Unresolvable keys and an unavailable
//! index leave the original custom-syntax link in place, keeping broken
//! references visible in the rendered output instead of silently dropping
//! them.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::warn;
use url::Url;

use crate::nav::{NavigationCache, NavigationIndex};
use crate::suggest::{suggest_keys, variant_hints};
use crate::{Config, Fetcher, Result};

/// Markdown links whose target starts with the `api:` scheme.
///
/// Anchoring on the scheme keeps ordinary links from ever matching.
///
/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static API_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(api:([^)]+)\)").unwrap());

/// SAFETY: Pattern is a compile-time constant that is known to be valid.
#[allow(clippy::unwrap_used)]
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Resolves `api:` links against the memoized navigation index.
///
/// One resolver is shared across all pages of a build (wrap it in an `Arc`
/// when pages are processed concurrently); the navigation document is
/// fetched at most once per process regardless of how many pages reference
/// it.
pub struct ApiLinkResolver {
    config: Config,
    fetcher: Fetcher,
    cache: NavigationCache,
}

impl ApiLinkResolver {
    /// Create a resolver; the navigation index is built lazily on first use.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher,
            cache: NavigationCache::new(),
        })
    }

    /// Rewrite all `api:` links in `text`.
    ///
    /// `page` identifies the originating page in diagnostics only. Always
    /// returns a value; when the navigation index is unavailable every
    /// `api:` link passes through unchanged. Only a match with a non-blank
    /// key triggers the navigation fetch.
    pub async fn rewrite(&self, text: &str, page: &str) -> String {
        if !API_LINK_RE
            .captures_iter(text)
            .any(|caps| !caps[2].trim().is_empty())
        {
            return text.to_string();
        }

        let Some(index) = self.cache.get_or_build(&self.fetcher, &self.config).await else {
            return text.to_string();
        };

        API_LINK_RE
            .replace_all(text, |caps: &Captures<'_>| {
                self.substitute(caps, &index, page)
            })
            .into_owned()
    }

    fn substitute(&self, caps: &Captures<'_>, index: &NavigationIndex, page: &str) -> String {
        let original = caps[0].to_string();
        let key = caps[2].trim();
        if key.is_empty() {
            return original;
        }

        let Some(href) = index.get(key) else {
            self.report_miss(index, key, page);
            return original;
        };

        let display = WHITESPACE_RE.replace_all(caps[1].trim(), "-");
        let resolved = absolutize(&self.config.base_url, href);
        format!("[{display}]({resolved})")
    }

    fn report_miss(&self, index: &NavigationIndex, key: &str, page: &str) {
        warn!(page, key, "unable to resolve API link target");

        for suggestion in suggest_keys(index.keys(), key, self.config.max_suggestions) {
            warn!(page, %suggestion, "did you mean");
        }
        for variant in variant_hints(key) {
            warn!(page, %variant, "try variant form");
        }
    }
}

/// Join an href against the base URL, forcing an absolute result even when
/// the index stored a relative fallback. An unjoinable href passes through
/// verbatim.
fn absolutize(base_url: &str, href: &str) -> String {
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map_or_else(|_| href.to_string(), |url| url.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NAV_HTML: &str = r#"
        <div class="toc--part" pageid="proj///mod/Cls">
          <div class="toc--row"><a href="mod/Cls/index.html">Cls</a></div>
        </div>
        <div class="toc--part" pageid="agents::core//run/extra">
          <div class="toc--row"><a href="agents/run.html">run</a></div>
        </div>
    "#;

    async fn resolver_with_nav(
        status: u16,
        expect: u64,
    ) -> anyhow::Result<(MockServer, ApiLinkResolver)> {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/navigation.html"))
            .respond_with(ResponseTemplate::new(status).set_body_string(NAV_HTML))
            .expect(expect)
            .mount(&mock_server)
            .await;

        let config = Config {
            nav_url: format!("{}/navigation.html", mock_server.uri()),
            base_url: format!("{}/", mock_server.uri()),
            ..Config::default()
        };
        let resolver = ApiLinkResolver::new(config)?;
        Ok((mock_server, resolver))
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("https://api.koog.ai/", "mod/Cls/index.html"),
            "https://api.koog.ai/mod/Cls/index.html"
        );
        // Already absolute hrefs survive the join untouched
        assert_eq!(
            absolutize("https://api.koog.ai/", "https://other.example.com/x.html"),
            "https://other.example.com/x.html"
        );
        assert_eq!(absolutize("not a url", "mod/index.html"), "mod/index.html");
    }

    #[tokio::test]
    async fn test_end_to_end_resolution() -> anyhow::Result<()> {
        let (server, resolver) = resolver_with_nav(200, 1).await?;

        let output = resolver
            .rewrite("See [Cls](api:proj.mod.Cls) for details.", "docs/page.md")
            .await;

        // Hrefs are absolutized against the navigation document's location
        assert_eq!(
            output,
            format!("See [Cls]({}/mod/Cls/index.html) for details.", server.uri())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_rewritten_output_is_stable() -> anyhow::Result<()> {
        let (_server, resolver) = resolver_with_nav(200, 1).await?;

        let once = resolver.rewrite("[Cls](api:proj)", "docs/page.md").await;
        assert!(!once.contains("api:"));

        let twice = resolver.rewrite(&once, "docs/page.md").await;
        assert_eq!(once, twice);
        Ok(())
    }

    #[tokio::test]
    async fn test_whitespace_collapsed_in_display_text() -> anyhow::Result<()> {
        let (server, resolver) = resolver_with_nav(200, 1).await?;

        let output = resolver
            .rewrite("[Foo   Bar\nBaz](api:proj)", "docs/page.md")
            .await;

        assert_eq!(
            output,
            format!("[Foo-Bar-Baz]({}/mod/Cls/index.html)", server.uri())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unresolved_key_left_unchanged() -> anyhow::Result<()> {
        let (server, resolver) = resolver_with_nav(200, 1).await?;

        let input = "[Missing](api:does.not.Exist) and [Cls](api:proj)";
        let output = resolver.rewrite(input, "docs/page.md").await;

        assert!(output.contains("[Missing](api:does.not.Exist)"));
        assert!(output.contains(&format!("[Cls]({}/mod/Cls/index.html)", server.uri())));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_key_left_unchanged() -> anyhow::Result<()> {
        let (server, resolver) = resolver_with_nav(200, 1).await?;

        let input = "[Blank](api:   ) [Cls](api:proj)";
        let output = resolver.rewrite(input, "docs/page.md").await;

        assert!(output.contains("[Blank](api:   )"));
        assert!(output.contains(&format!("[Cls]({}/mod/Cls/index.html)", server.uri())));
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_key_alone_does_not_fetch() -> anyhow::Result<()> {
        // expect(0): a page whose only api: link has a blank key skips the fetch
        let (_server, resolver) = resolver_with_nav(200, 0).await?;

        let input = "[Blank](api:   ) and plain text";
        let output = resolver.rewrite(input, "docs/page.md").await;

        assert_eq!(output, input);
        Ok(())
    }

    #[tokio::test]
    async fn test_ordinary_links_never_fetch_or_change() -> anyhow::Result<()> {
        // expect(0): a page without api: links must not trigger the fetch
        let (_server, resolver) = resolver_with_nav(200, 0).await?;

        let input = "[Docs](https://example.com/docs) plain text [ref](other.md)";
        let output = resolver.rewrite(input, "docs/page.md").await;

        assert_eq!(output, input);
        Ok(())
    }

    #[tokio::test]
    async fn test_unavailable_index_passes_links_through_once_fetched() -> anyhow::Result<()> {
        // Nav fetch fails; expect(1) proves the failure is memoized across pages
        let (_server, resolver) = resolver_with_nav(500, 1).await?;

        let first = resolver.rewrite("[Cls](api:proj)", "docs/a.md").await;
        let second = resolver.rewrite("[Run](api:agents::core//run)", "docs/b.md").await;

        assert_eq!(first, "[Cls](api:proj)");
        assert_eq!(second, "[Run](api:agents::core//run)");
        Ok(())
    }

    #[tokio::test]
    async fn test_member_style_key_resolves() -> anyhow::Result<()> {
        let (server, resolver) = resolver_with_nav(200, 1).await?;

        let output = resolver
            .rewrite("[run](api:agents::core//run)", "docs/page.md")
            .await;

        assert_eq!(output, format!("[run]({}/agents/run.html)", server.uri()));
        Ok(())
    }

    #[test]
    fn test_relative_index_href_joined_against_base_url() -> anyhow::Result<()> {
        // An unparsable navigation URL leaves the stored href relative, so
        // substitution falls back to the configured base URL for the join
        let html = r#"
            <div pageid="proj///mod/Cls">
              <div class="toc--row"><a href="mod/Cls/index.html">Cls</a></div>
            </div>
        "#;
        let index = crate::nav::parse_navigation(html, "not a url")?;
        assert_eq!(index.get("proj"), Some("mod/Cls/index.html"));

        let resolver = ApiLinkResolver::new(Config::default())?;
        let caps = API_LINK_RE.captures("[Cls](api:proj)").unwrap();
        let output = resolver.substitute(&caps, &index, "docs/page.md");

        assert_eq!(output, "[Cls](https://api.koog.ai/mod/Cls/index.html)");
        Ok(())
    }
}
