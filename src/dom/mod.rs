//! Document tree access layer.
//!
//! [`Document`] wraps a parsed [`XmlDom`] together with the [`TreeQuery`]
//! engine chosen for this process and offers the only operations the
//! extractors need: first/all/direct-children lookups by tag name, attribute
//! lookup and subtree text.

mod arena;
mod builder;
mod query;
#[cfg(feature = "selectors")]
mod selector;

pub use arena::{Attribute, ChildrenIter, Descendants, Node, NodeData, NodeId, XmlDom};
pub use builder::{MAX_DEPTH, build_dom};
pub use query::{ENGINE_ENV_VAR, QueryEngine, TagNameQuery, TreeQuery, boxed_engine};
#[cfg(feature = "selectors")]
pub use selector::SelectorQuery;

use crate::error::{Error, Result};

/// A parsed document bound to a query engine.
pub struct Document<'q> {
    dom: XmlDom,
    root: NodeId,
    query: &'q dyn TreeQuery,
}

impl<'q> Document<'q> {
    /// Parse raw XML text.
    ///
    /// Fails with [`Error::MalformedDocument`] when no usable root element
    /// can be built.
    pub fn parse(text: &str, query: &'q dyn TreeQuery) -> Result<Self> {
        let dom = build_dom(text)?;
        let root = dom
            .root_element()
            .ok_or_else(|| Error::malformed("no root element found"))?;
        Ok(Self { dom, root, query })
    }

    /// The root element (`TEI` in a well-formed TEI document).
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn engine(&self) -> QueryEngine {
        self.query.engine()
    }

    /// Underlying arena tree.
    pub fn dom(&self) -> &XmlDom {
        &self.dom
    }

    /// First element named `tag` below `scope`.
    pub fn first(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.query.first_descendant(&self.dom, scope, tag)
    }

    /// All elements named `tag` below `scope`, in document order.
    pub fn all(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.query.descendants(&self.dom, scope, tag)
    }

    /// Direct children of `scope` named `tag`, in document order.
    pub fn children(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.query.children(&self.dom, scope, tag)
    }

    /// First direct child of `scope` named `tag`.
    pub fn child(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.children(scope, tag).into_iter().next()
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.dom.element_name(node)
    }

    /// Attribute value by its written name (`"xml:id"`, `"type"`).
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.dom.get_attr(node, name)
    }

    /// Full text of a subtree.
    pub fn text(&self, node: NodeId) -> String {
        self.dom.text(node)
    }

    /// Text of a subtree with the subtrees of matching descendants left out.
    pub fn text_excluding<F>(&self, node: NodeId, skip: F) -> String
    where
        F: Fn(&XmlDom, NodeId) -> bool,
    {
        self.dom.text_excluding(node, skip)
    }
}

impl std::fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("engine", &self.engine())
            .field("nodes", &self.dom.len())
            .finish()
    }
}
