//! # apilink
//!
//! Resolves custom `api:` cross-reference links in documentation pages
//! against an externally hosted API reference site.
//!
//! A static-site build pipeline invokes the resolver once per page. Links of
//! the form `[display text](api:lookup.key)` are rewritten into ordinary
//! absolute links by looking the key up in a navigation index built from the
//! reference site's navigation document. The document is fetched at most
//! once per process; both success and failure are memoized.
//!
//! ## Quick Start
//!
//! ```no_run
//! use apilink::{ApiLinkResolver, Config};
//!
//! # async fn run() -> apilink::Result<()> {
//! let resolver = ApiLinkResolver::new(Config::default())?;
//! let output = resolver
//!     .rewrite("[AIAgent](api:agents.core.agent.AIAgent)", "docs/agents.md")
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Behavior
//!
//! The resolver never fails the build. A fetch or parse failure disables the
//! index for the rest of the process and every `api:` link passes through
//! unchanged; unresolved keys stay in their original custom-syntax form so
//! they remain easy to spot in the rendered output. Diagnostics (entry
//! counts, unresolved keys, fuzzy suggestions) are emitted through
//! [`tracing`]; the host pipeline decides where they go.

/// Configuration for the navigation fetch and link rewriting
pub mod config;
/// Error types and result aliases
pub mod error;
/// HTTP fetching of the navigation document
pub mod fetcher;
/// Navigation index building and process-lifetime caching
pub mod nav;
/// `api:` link scanning and rewriting
pub mod rewrite;
/// Fuzzy suggestions and variant hints for unresolved keys
pub mod suggest;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use fetcher::Fetcher;
pub use nav::{NavigationCache, NavigationIndex, parse_navigation};
pub use rewrite::ApiLinkResolver;
