//! Header metadata extraction.
//!
//! Each field is read independently and none of them is required.

use crate::dom::{Document, NodeId};
use crate::model::Metadata;
use crate::util::non_empty;

pub(crate) const HEADER: &str = "teiHeader";

/// Extract header metadata. A document without a header yields
/// [`Metadata::default()`].
pub fn extract_metadata(doc: &Document<'_>) -> Metadata {
    let root = doc.root();
    let Some(header) = doc.child(root, HEADER) else {
        return Metadata::default();
    };

    let title_stmt = doc.first(header, "titleStmt");
    let publication_stmt = doc.first(header, "publicationStmt");
    let source_desc = doc.first(header, "sourceDesc");

    Metadata {
        title: title_stmt.and_then(|stmt| field(doc, stmt, "title")),
        author: title_stmt.and_then(|stmt| field(doc, stmt, "author")),
        editor: title_stmt.and_then(|stmt| field(doc, stmt, "editor")),
        publisher: publication_stmt.and_then(|stmt| field(doc, stmt, "publisher")),
        pub_date: publication_stmt.and_then(|stmt| field(doc, stmt, "date")),
        language: doc
            .attr(root, "xml:lang")
            .and_then(non_empty)
            .map(str::to_string),
        description: source_desc.and_then(|desc| field(doc, desc, "p")),
        keywords: extract_keywords(doc, header),
        genre: extract_genre(doc, header),
    }
}

/// Trimmed text of the first `tag` below `scope`; empty counts as absent.
fn field(doc: &Document<'_>, scope: NodeId, tag: &str) -> Option<String> {
    let node = doc.first(scope, tag)?;
    non_empty(&doc.text(node)).map(str::to_string)
}

/// Every `term` of every `keywords` block, trimmed, empties skipped.
fn extract_keywords(doc: &Document<'_>, header: NodeId) -> Vec<String> {
    doc.all(header, "keywords")
        .into_iter()
        .flat_map(|block| doc.all(block, "term"))
        .filter_map(|term| non_empty(&doc.text(term)).map(str::to_string))
        .collect()
}

/// Best effort: the first `catRef` target inside a `textClass`, minus `#`.
fn extract_genre(doc: &Document<'_>, header: NodeId) -> Option<String> {
    doc.all(header, "textClass")
        .into_iter()
        .filter_map(|class| doc.first(class, "catRef"))
        .filter_map(|cat| doc.attr(cat, "target"))
        .filter_map(|target| non_empty(target.trim_start_matches('#')))
        .map(str::to_string)
        .next()
}
