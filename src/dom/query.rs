//! Tree-query engines.
//!
//! Extraction code asks for elements by tag name through [`TreeQuery`] and
//! never learns which engine answers. Two realizations exist:
//!
//! - [`TagNameQuery`]: only "all elements named X below a node"; direct
//!   children are found by filtering that list on the parent link.
//! - `SelectorQuery` (feature `selectors`): compiles CSS selectors and matches
//!   them against the arena, with `:scope > X` for direct children.
//!
//! Both must return identical results for every query.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use tracing::debug;

use super::arena::{NodeId, XmlDom};

/// Environment variable that pins the engine chosen by [`QueryEngine::detect`].
pub const ENGINE_ENV_VAR: &str = "FOLIO_QUERY_ENGINE";

/// Which tree-query realization answers element lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "kebab-case"))]
pub enum QueryEngine {
    /// CSS selector matching (requires the `selectors` feature).
    Selectors,
    /// Plain tag-name traversal, always available.
    TagName,
}

impl QueryEngine {
    /// The engine this process uses by default.
    ///
    /// Computed once; later calls return the cached answer. The
    /// `FOLIO_QUERY_ENGINE` variable may pin an engine, but an unknown or
    /// unavailable value falls back to the best compiled-in engine.
    pub fn detect() -> QueryEngine {
        static DETECTED: OnceLock<QueryEngine> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let pinned = std::env::var(ENGINE_ENV_VAR)
                .ok()
                .and_then(|value| value.parse::<QueryEngine>().ok())
                .filter(|engine| engine.is_available());
            let engine = pinned.unwrap_or_else(QueryEngine::best_available);
            debug!(engine = %engine, pinned = pinned.is_some(), "query engine selected");
            engine
        })
    }

    /// The richest engine compiled into this build.
    pub fn best_available() -> QueryEngine {
        if cfg!(feature = "selectors") {
            QueryEngine::Selectors
        } else {
            QueryEngine::TagName
        }
    }

    /// Whether this engine was compiled into this build.
    pub fn is_available(self) -> bool {
        match self {
            QueryEngine::Selectors => cfg!(feature = "selectors"),
            QueryEngine::TagName => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryEngine::Selectors => "selectors",
            QueryEngine::TagName => "tag-name",
        }
    }
}

impl fmt::Display for QueryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "selectors" | "selector" | "css" => Ok(QueryEngine::Selectors),
            "tag-name" | "tagname" | "tag_name" | "basic" => Ok(QueryEngine::TagName),
            other => Err(format!(
                "unknown query engine '{other}' (expected 'selectors' or 'tag-name')"
            )),
        }
    }
}

/// Polymorphic interface over the tree-query engines.
///
/// All results are in document order. Tag names are compared against the
/// element's local name (namespace prefixes are ignored).
pub trait TreeQuery: Send + Sync {
    /// Which engine this is.
    fn engine(&self) -> QueryEngine;

    /// All elements named `tag` anywhere below `scope`.
    fn descendants(&self, dom: &XmlDom, scope: NodeId, tag: &str) -> Vec<NodeId>;

    /// Elements named `tag` that are direct children of `scope`.
    fn children(&self, dom: &XmlDom, scope: NodeId, tag: &str) -> Vec<NodeId>;

    /// First element named `tag` below `scope`.
    fn first_descendant(&self, dom: &XmlDom, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(dom, scope, tag).into_iter().next()
    }
}

/// Minimal engine: tag-name enumeration plus manual filtering.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagNameQuery;

impl TreeQuery for TagNameQuery {
    fn engine(&self) -> QueryEngine {
        QueryEngine::TagName
    }

    fn descendants(&self, dom: &XmlDom, scope: NodeId, tag: &str) -> Vec<NodeId> {
        dom.elements_by_tag_name(scope, tag)
    }

    fn children(&self, dom: &XmlDom, scope: NodeId, tag: &str) -> Vec<NodeId> {
        dom.elements_by_tag_name(scope, tag)
            .into_iter()
            .filter(|&id| dom.parent(id) == Some(scope))
            .collect()
    }

    fn first_descendant(&self, dom: &XmlDom, scope: NodeId, tag: &str) -> Option<NodeId> {
        dom.descendants(scope)
            .find(|&id| dom.element_name(id) == Some(tag))
    }
}

/// Construct the engine implementation, or `None` if it was not compiled in.
pub fn boxed_engine(engine: QueryEngine) -> Option<Box<dyn TreeQuery>> {
    match engine {
        QueryEngine::TagName => Some(Box::new(TagNameQuery)),
        #[cfg(feature = "selectors")]
        QueryEngine::Selectors => Some(Box::new(super::selector::SelectorQuery::new())),
        #[cfg(not(feature = "selectors"))]
        QueryEngine::Selectors => None,
    }
}
