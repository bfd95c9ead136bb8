//! TEI document parsing.
//!
//! [`TeiParser`] owns the tree-query engine it was built with and turns raw
//! TEI text into a [`ParsedDocument`]. The header and the body are read
//! independently from the same tree and combined at the end.

mod chapters;
mod metadata;

pub use chapters::{build_chapter, extract_chapters};
pub use metadata::extract_metadata;

use std::path::Path;

use tracing::debug;

use crate::dom::{Document, NodeId, QueryEngine, TagNameQuery, TreeQuery, XmlDom, boxed_engine};
use crate::error::{Error, Result};
use crate::model::ParsedDocument;
use crate::util::{collapse_whitespace, decode_text, extract_xml_encoding};

/// Title used when the header does not provide one.
pub const UNTITLED: &str = "Untitled Document";

/// Configuration for [`TeiParser`].
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Tree-query engine to use.
    pub engine: QueryEngine,
    /// `ParsedDocument::title` when the header has no title.
    pub fallback_title: String,
    /// Leave `note[place="foot"]` out of the plain content.
    pub skip_footnotes: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            engine: QueryEngine::detect(),
            fallback_title: UNTITLED.to_string(),
            skip_footnotes: true,
        }
    }
}

impl ParserConfig {
    pub fn with_engine(mut self, engine: QueryEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = title.into();
        self
    }

    pub fn with_footnotes(mut self, keep: bool) -> Self {
        self.skip_footnotes = !keep;
        self
    }
}

/// Parser for TEI documents.
///
/// Holds no per-document state; one instance can parse any number of
/// documents, from any number of threads.
pub struct TeiParser {
    config: ParserConfig,
    query: Box<dyn TreeQuery>,
}

impl TeiParser {
    /// Create a parser with the default configuration and the engine
    /// detected for this process.
    pub fn new() -> Self {
        let config = ParserConfig::default();
        let query = boxed_engine(config.engine).unwrap_or_else(|| Box::new(TagNameQuery));
        Self { config, query }
    }

    /// Create a parser with an explicit configuration.
    ///
    /// Fails with [`Error::EngineUnavailable`] when the requested engine was
    /// not compiled in.
    pub fn with_config(config: ParserConfig) -> Result<Self> {
        let query = boxed_engine(config.engine).ok_or(Error::EngineUnavailable(config.engine))?;
        Ok(Self { config, query })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn engine(&self) -> QueryEngine {
        self.query.engine()
    }

    /// Parse raw TEI text.
    pub fn parse(&self, raw: &str) -> Result<ParsedDocument> {
        debug!(engine = %self.engine(), bytes = raw.len(), "parsing TEI document");

        let doc = Document::parse(raw, self.query.as_ref())?;
        let metadata = extract_metadata(&doc);
        let body = locate_body(&doc);

        let chapters = body
            .map(|body| extract_chapters(&doc, body))
            .unwrap_or_default();
        let plain_content = body
            .map(|body| self.plain_body_text(&doc, body))
            .unwrap_or_default();

        let parsed = ParsedDocument {
            title: metadata
                .title
                .clone()
                .unwrap_or_else(|| self.config.fallback_title.clone()),
            author: metadata.author.clone(),
            plain_content,
            chapters,
            metadata,
        };

        debug!(
            title = %parsed.title,
            chapters = parsed.chapter_count(),
            keywords = parsed.metadata.keywords.len(),
            "parsed TEI document"
        );
        Ok(parsed)
    }

    /// Decode bytes (UTF-8, the declared encoding, or Windows-1252) and parse.
    pub fn parse_bytes(&self, raw: &[u8]) -> Result<ParsedDocument> {
        let text = decode_text(raw, extract_xml_encoding(raw));
        self.parse(&text)
    }

    /// Read and parse a file from disk.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParsedDocument> {
        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes)
    }

    /// Plain text of the whole document: the header, footnotes, page breaks
    /// and line breaks are left out and whitespace is collapsed.
    pub fn plain_text(&self, raw: &str) -> Result<String> {
        let doc = Document::parse(raw, self.query.as_ref())?;
        let text = doc.text_excluding(doc.root(), |dom, node| {
            dom.element_name(node) == Some(metadata::HEADER)
                || is_hidden_inline(dom, node, self.config.skip_footnotes)
        });
        Ok(collapse_whitespace(&text))
    }

    fn plain_body_text(&self, doc: &Document<'_>, body: NodeId) -> String {
        let text = doc.text_excluding(body, |dom, node| {
            is_hidden_inline(dom, node, self.config.skip_footnotes)
        });
        collapse_whitespace(&text)
    }
}

impl Default for TeiParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TeiParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeiParser")
            .field("config", &self.config)
            .field("engine", &self.engine())
            .finish()
    }
}

/// `body` inside the document's `text` element.
fn locate_body(doc: &Document<'_>) -> Option<NodeId> {
    let text = doc.first(doc.root(), "text")?;
    doc.first(text, "body")
}

/// Elements whose text never belongs in plain content.
fn is_hidden_inline(dom: &XmlDom, node: NodeId, skip_footnotes: bool) -> bool {
    match dom.element_name(node) {
        Some("pb" | "lb") => true,
        Some("note") => skip_footnotes && dom.get_attr(node, "place") == Some("foot"),
        _ => false,
    }
}
