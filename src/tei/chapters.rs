//! Chapter tree construction from nested `div` elements.
//!
//! `level` and `order` are passed down explicitly; nothing is inferred from
//! iteration state, so [`build_chapter`] can be called on any division.

use tracing::trace;

use crate::dom::{Document, NodeId};
use crate::model::Chapter;
use crate::util::{capitalize, collapse_whitespace, non_empty};

pub(crate) const DIVISION: &str = "div";
const HEADING: &str = "head";
const DEFAULT_TYPE: &str = "chapter";

/// Build one root chapter per direct `div` child of `body`.
pub fn extract_chapters(doc: &Document<'_>, body: NodeId) -> Vec<Chapter> {
    doc.children(body, DIVISION)
        .into_iter()
        .enumerate()
        .map(|(index, div)| build_chapter(doc, div, 1, index + 1))
        .collect()
}

/// Build the chapter for `div` and, recursively, its child divisions.
pub fn build_chapter(doc: &Document<'_>, div: NodeId, level: usize, order: usize) -> Chapter {
    let id = ["xml:id", "id"]
        .into_iter()
        .find_map(|name| doc.attr(div, name).and_then(non_empty))
        .map(str::to_string)
        .unwrap_or_else(|| format!("chapter-{order}"));

    let kind = doc
        .attr(div, "type")
        .and_then(non_empty)
        .unwrap_or(DEFAULT_TYPE);

    let title = doc
        .child(div, HEADING)
        .map(|head| collapse_whitespace(&doc.text(head)))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| format!("{} {order}", capitalize(kind)));

    let content = collapse_whitespace(
        &doc.text_excluding(div, |dom, node| dom.element_name(node) == Some(DIVISION)),
    );

    trace!(%id, level, order, "built chapter");

    let children = doc
        .children(div, DIVISION)
        .into_iter()
        .enumerate()
        .map(|(index, child)| build_chapter(doc, child, level + 1, index + 1))
        .collect();

    Chapter {
        id,
        title,
        content,
        level,
        order,
        children,
    }
}
