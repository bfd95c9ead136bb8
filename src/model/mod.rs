//! Result types produced by parsing a TEI document.
//!
//! Everything here is built fresh per parse call and owned by the caller;
//! nothing is edited after construction.

/// The complete result of parsing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "camelCase"))]
pub struct ParsedDocument {
    /// Header title, or the configured fallback title.
    pub title: String,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub author: Option<String>,
    /// Body text without footnotes, page breaks or line breaks,
    /// whitespace-collapsed.
    pub plain_content: String,
    /// Root-level chapters in document order.
    pub chapters: Vec<Chapter>,
    pub metadata: Metadata,
}

impl ParsedDocument {
    /// Find a chapter anywhere in the tree by id (pre-order search).
    pub fn find_chapter(&self, id: &str) -> Option<&Chapter> {
        self.iter_chapters().find(|chapter| chapter.id == id)
    }

    /// Number of chapters at every level.
    pub fn chapter_count(&self) -> usize {
        self.iter_chapters().count()
    }

    /// Walk every chapter in pre-order.
    pub fn iter_chapters(&self) -> ChapterIter<'_> {
        ChapterIter::new(&self.chapters)
    }
}

/// One division of the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Chapter {
    /// `xml:id`/`id` of the division, else `chapter-<order>`.
    pub id: String,
    /// Heading text, else `<Type> <order>`.
    pub title: String,
    /// Text of this division only; nested divisions are left out.
    pub content: String,
    /// Nesting depth; root-level chapters are level 1.
    pub level: usize,
    /// 1-based position among siblings.
    pub order: usize,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<Chapter>,
}

impl Chapter {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Pre-order iterator over a chapter forest.
pub struct ChapterIter<'a> {
    stack: Vec<&'a Chapter>,
}

impl<'a> ChapterIter<'a> {
    pub fn new(chapters: &'a [Chapter]) -> Self {
        Self {
            stack: chapters.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for ChapterIter<'a> {
    type Item = &'a Chapter;

    fn next(&mut self) -> Option<Self::Item> {
        let chapter = self.stack.pop()?;
        self.stack.extend(chapter.children.iter().rev());
        Some(chapter)
    }
}

/// Header metadata. Every field is optional; a missing header element yields
/// an absent field, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "camelCase"))]
pub struct Metadata {
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub title: Option<String>,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub author: Option<String>,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub editor: Option<String>,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub publisher: Option<String>,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub pub_date: Option<String>,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub language: Option<String>,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
    /// Keyword terms in document order.
    pub keywords: Vec<String>,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Option::is_none"))]
    pub genre: Option<String>,
}

/// A flattened table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct TocEntry {
    pub id: String,
    pub title: String,
    /// Depth in the traversal, recomputed while flattening.
    pub level: usize,
    pub order: usize,
}
