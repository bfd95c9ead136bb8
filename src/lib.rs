//! # folio
//!
//! A fast, lightweight library for reading TEI documents.
//!
//! ## Features
//!
//! - Parse TEI XML into a [`ParsedDocument`]: header metadata, a nested
//!   chapter tree and whitespace-collapsed plain content
//! - Flatten a chapter tree into a table of contents
//! - Rewrite stored TEI fragments into display HTML
//! - Two interchangeable tree-query engines (CSS selectors or tag-name
//!   lookup) that produce identical results
//!
//! ## Quick Start
//!
//! ```
//! use folio::{parse, table_of_contents};
//!
//! let doc = parse(r#"<TEI>
//!   <teiHeader><fileDesc><titleStmt><title>Letters</title></titleStmt></fileDesc></teiHeader>
//!   <text><body>
//!     <div xml:id="l1"><head>First Letter</head><p>Dear friend,</p></div>
//!   </body></text>
//! </TEI>"#).unwrap();
//!
//! assert_eq!(doc.title, "Letters");
//! assert_eq!(doc.chapters[0].id, "l1");
//!
//! let toc = table_of_contents(&doc.chapters);
//! assert_eq!(toc[0].title, "First Letter");
//! ```
//!
//! ## Display Markup
//!
//! ```
//! use folio::format_for_display;
//!
//! let html = format_for_display(r#"<p>A <hi rend="italic">quiet</hi> street.</p>"#);
//! assert_eq!(html, r#"<p class="mb-4">A <em>quiet</em> street.</p>"#);
//! ```
//!
//! ## Choosing an Engine
//!
//! The free functions use the engine detected for the process (see
//! [`QueryEngine::detect`]). Build a [`TeiParser`] to pick one explicitly:
//!
//! ```
//! use folio::{ParserConfig, QueryEngine, TeiParser};
//!
//! let parser = TeiParser::with_config(
//!     ParserConfig::default().with_engine(QueryEngine::TagName),
//! ).unwrap();
//! assert_eq!(parser.engine(), QueryEngine::TagName);
//! ```

pub mod display;
pub mod dom;
pub mod error;
pub mod model;
pub mod tei;
pub mod toc;
pub(crate) mod util;

use std::path::Path;

pub use display::format_for_display;
pub use dom::{QueryEngine, TreeQuery};
pub use error::{Error, Result};
pub use model::{Chapter, Metadata, ParsedDocument, TocEntry};
pub use tei::{ParserConfig, TeiParser};
pub use toc::table_of_contents;

/// Parse raw TEI text with the default parser.
///
/// Fails with [`Error::MalformedDocument`] when the input is not well-formed
/// XML; every other shortfall (missing header, missing body, missing fields)
/// is reported as absent data instead.
pub fn parse(raw: &str) -> Result<ParsedDocument> {
    TeiParser::new().parse(raw)
}

/// Decode raw bytes and parse them with the default parser.
pub fn parse_bytes(raw: &[u8]) -> Result<ParsedDocument> {
    TeiParser::new().parse_bytes(raw)
}

/// Read and parse a TEI file with the default parser.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedDocument> {
    TeiParser::new().parse_file(path)
}

/// Plain text of the whole document with the default parser.
pub fn plain_text(raw: &str) -> Result<String> {
    TeiParser::new().plain_text(raw)
}
