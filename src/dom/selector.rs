//! selectors crate Element implementation for [`XmlDom`].
//!
//! This is the capability-rich tree-query engine: queries are compiled to CSS
//! selectors and matched against the arena. Element names in TEI are
//! case-sensitive camelCase (`teiHeader`, `titleStmt`), so every element is
//! treated as XML, never as HTML.

use std::fmt;

use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::ElementSelectorFlags;
use selectors::parser::{Selector, SelectorParseErrorKind};
use selectors::{Element, OpaqueElement, SelectorImpl};
use tracing::warn;

use super::arena::{NodeData, NodeId, XmlDom};
use super::query::{QueryEngine, TreeQuery};

/// Selector implementation marker for the selectors crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolioSelectors;

/// Identifier string type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct IdentStr(pub String);

fn string_hash(s: &str) -> u32 {
    let mut h: u32 = 0;
    for byte in s.bytes() {
        h = h.wrapping_mul(31).wrapping_add(byte as u32);
    }
    h
}

impl precomputed_hash::PrecomputedHash for IdentStr {
    fn precomputed_hash(&self) -> u32 {
        string_hash(&self.0)
    }
}

impl AsRef<str> for IdentStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentStr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'a> From<&'a str> for IdentStr {
    fn from(s: &'a str) -> Self {
        Self(s.to_string())
    }
}

impl cssparser::ToCss for IdentStr {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Element local name as seen by the selector engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssLocalName(pub String);

impl precomputed_hash::PrecomputedHash for CssLocalName {
    fn precomputed_hash(&self) -> u32 {
        string_hash(&self.0)
    }
}

impl cssparser::ToCss for CssLocalName {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

impl From<String> for CssLocalName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'a> From<&'a str> for CssLocalName {
    fn from(s: &'a str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for CssLocalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Namespace URL. The arena does not resolve namespaces, so only the empty
/// namespace ever matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CssNamespace(pub String);

impl precomputed_hash::PrecomputedHash for CssNamespace {
    fn precomputed_hash(&self) -> u32 {
        string_hash(&self.0)
    }
}

impl cssparser::ToCss for CssNamespace {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

impl From<String> for CssNamespace {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'a> From<&'a str> for CssNamespace {
    fn from(s: &'a str) -> Self {
        Self(s.to_string())
    }
}

impl<'i> selectors::parser::Parser<'i> for FolioSelectors {
    type Impl = FolioSelectors;
    type Error = SelectorParseErrorKind<'i>;
}

/// Pseudo-elements never apply to a static XML tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoElement {}

impl cssparser::ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = FolioSelectors;

    fn accepts_state_pseudo_classes(&self) -> bool {
        false
    }

    fn valid_after_slotted(&self) -> bool {
        false
    }
}

/// No user-action pseudo-classes exist in a static XML tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonTSPseudoClass {}

impl selectors::parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = FolioSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl cssparser::ToCss for NonTSPseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl SelectorImpl for FolioSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = IdentStr;
    type Identifier = IdentStr;
    type LocalName = CssLocalName;
    type NamespaceUrl = CssNamespace;
    type NamespacePrefix = IdentStr;
    type BorrowedLocalName = CssLocalName;
    type BorrowedNamespaceUrl = CssNamespace;
    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// Reference to an element in the [`XmlDom`] for selector matching.
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    pub dom: &'a XmlDom,
    pub id: NodeId,
}

impl<'a> ElementRef<'a> {
    pub fn new(dom: &'a XmlDom, id: NodeId) -> Self {
        Self { dom, id }
    }

    fn attr_named(&self, name: &str) -> Option<&'a str> {
        self.dom
            .attrs(self.id)
            .iter()
            .find(|a| a.local_name() == name)
            .map(|a| a.value.as_str())
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("name", &self.dom.element_name(self.id))
            .finish()
    }
}

impl<'a> selectors::Element for ElementRef<'a> {
    type Impl = FolioSelectors;

    fn opaque(&self) -> OpaqueElement {
        // Identity must survive copies of the ElementRef, so anchor it on
        // the arena slot rather than on `self`.
        match self.dom.get(self.id) {
            Some(node) => OpaqueElement::new(node),
            None => OpaqueElement::new(self),
        }
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.dom.parent(self.id)?;
        self.dom
            .is_element(parent)
            .then(|| Self::new(self.dom, parent))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let mut current = self.dom.get(self.id)?.prev_sibling;
        while current.is_some() {
            if self.dom.is_element(current) {
                return Some(Self::new(self.dom, current));
            }
            current = self.dom.get(current)?.prev_sibling;
        }
        None
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let mut current = self.dom.get(self.id)?.next_sibling;
        while current.is_some() {
            if self.dom.is_element(current) {
                return Some(Self::new(self.dom, current));
            }
            current = self.dom.get(current)?.next_sibling;
        }
        None
    }

    fn first_element_child(&self) -> Option<Self> {
        self.dom
            .children(self.id)
            .find(|&child| self.dom.is_element(child))
            .map(|child| Self::new(self.dom, child))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        false
    }

    fn has_local_name(&self, name: &CssLocalName) -> bool {
        self.dom.element_name(self.id) == Some(name.0.as_str())
    }

    fn has_namespace(&self, ns: &CssNamespace) -> bool {
        ns.0.is_empty()
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.dom.element_name(self.id) == other.dom.element_name(other.id)
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssNamespace>,
        local_name: &CssLocalName,
        operation: &AttrSelectorOperation<&IdentStr>,
    ) -> bool {
        if let NamespaceConstraint::Specific(ns) = ns
            && !ns.0.is_empty()
        {
            return false;
        }

        self.dom
            .attrs(self.id)
            .iter()
            .filter(|attr| attr.local_name() == local_name.0)
            .any(|attr| operation.eval_str(&attr.value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &NonTSPseudoClass,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        _pe: &PseudoElement,
        _context: &mut MatchingContext<'_, Self::Impl>,
    ) -> bool {
        false
    }

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        self.attr_named("id")
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &IdentStr, case_sensitivity: CaseSensitivity) -> bool {
        // TEI has no class attribute; @rend plays that role.
        self.attr_named("rend").is_some_and(|rend| {
            rend.split_whitespace()
                .any(|c| case_sensitivity.eq(c.as_bytes(), name.0.as_bytes()))
        })
    }

    fn imported_part(&self, _name: &IdentStr) -> Option<IdentStr> {
        None
    }

    fn is_part(&self, _name: &IdentStr) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.dom.children(self.id).all(|child| match self.dom.get(child) {
            Some(node) => match &node.data {
                NodeData::Element { .. } => false,
                NodeData::Text(t) => t.trim().is_empty(),
                NodeData::Document => true,
            },
            None => true,
        })
    }

    fn is_root(&self) -> bool {
        self.dom.parent(self.id) == Some(self.dom.document())
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn add_element_unique_hashes(&self, _filter: &mut selectors::bloom::BloomFilter) -> bool {
        false
    }

    fn has_custom_state(&self, _name: &IdentStr) -> bool {
        false
    }
}

/// Parse a single CSS selector.
pub fn compile_selector(
    source: &str,
) -> Result<Selector<FolioSelectors>, cssparser::ParseError<'_, SelectorParseErrorKind<'_>>> {
    let mut parser_input = cssparser::ParserInput::new(source);
    let mut parser = cssparser::Parser::new(&mut parser_input);
    Selector::parse(&FolioSelectors, &mut parser)
}

/// Capability-rich engine backed by the selectors crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorQuery;

impl SelectorQuery {
    pub fn new() -> Self {
        Self
    }

    /// Every element below `scope` matching a CSS selector, in document
    /// order. `:scope` refers to `scope`. An invalid selector matches nothing.
    pub fn select(&self, dom: &XmlDom, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let compiled = match compile_selector(selector) {
            Ok(compiled) => compiled,
            Err(err) => {
                warn!(selector, error = ?err, "selector failed to compile");
                return Vec::new();
            }
        };

        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            selectors::matching::MatchingMode::Normal,
            None,
            &mut caches,
            selectors::context::QuirksMode::NoQuirks,
            selectors::matching::NeedsSelectorFlags::No,
            selectors::matching::MatchingForInvalidation::No,
        );
        context.scope_element = Some(ElementRef::new(dom, scope).opaque());

        dom.descendants(scope)
            .filter(|&id| dom.is_element(id))
            .filter(|&id| {
                let elem = ElementRef::new(dom, id);
                selectors::matching::matches_selector(&compiled, 0, None, &elem, &mut context)
            })
            .collect()
    }
}

impl TreeQuery for SelectorQuery {
    fn engine(&self) -> QueryEngine {
        QueryEngine::Selectors
    }

    fn descendants(&self, dom: &XmlDom, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.select(dom, scope, tag)
    }

    fn children(&self, dom: &XmlDom, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.select(dom, scope, &format!(":scope > {tag}"))
    }
}
