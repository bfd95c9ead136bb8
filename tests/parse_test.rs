//! Parsing tests over the TEI fixtures.
//!
//! `sample.xml` is the demo document the reader ships with; `nested.xml`
//! exercises nested divisions, footnotes, breaks and entities.

use folio::{
    Error, Metadata, ParserConfig, QueryEngine, TeiParser, parse, parse_bytes, parse_file, plain_text,
    table_of_contents,
};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
}

// ============================================================================
// Header metadata
// ============================================================================

#[test]
fn test_sample_metadata() {
    let doc = parse(&fixture("sample.xml")).expect("Failed to parse sample");

    assert_eq!(doc.title, "Sample TEI Document");
    assert_eq!(doc.author.as_deref(), Some("Jane Doe"));

    let meta = &doc.metadata;
    assert_eq!(meta.title.as_deref(), Some("Sample TEI Document"));
    assert_eq!(meta.editor.as_deref(), Some("John Editor"));
    assert_eq!(meta.publisher.as_deref(), Some("Digital Humanities Press"));
    assert_eq!(meta.pub_date.as_deref(), Some("2024"));
    assert_eq!(meta.language.as_deref(), Some("en"));
    assert_eq!(
        meta.description.as_deref(),
        Some("A sample TEI document for testing the reader application.")
    );
    assert_eq!(meta.keywords, vec!["sample", "testing", "digital humanities"]);
    assert!(meta.genre.is_none());
}

#[test]
fn test_nested_metadata() {
    let doc = parse(&fixture("nested.xml")).expect("Failed to parse nested");
    let meta = &doc.metadata;

    assert_eq!(doc.title, "Lettres & Fragments");
    assert_eq!(doc.author.as_deref(), Some("Anne Lefèvre"));
    assert_eq!(meta.language.as_deref(), Some("fr"));
    assert_eq!(meta.pub_date.as_deref(), Some("1899"));
    assert!(meta.editor.is_none());
    // Terms from every keywords block, trimmed, empties dropped
    assert_eq!(meta.keywords, vec!["letters", "travel"]);
    assert_eq!(meta.genre.as_deref(), Some("correspondence"));
}

#[test]
fn test_missing_header() {
    let doc = parse(&fixture("no_header.xml")).expect("Failed to parse");

    assert_eq!(doc.title, "Untitled Document");
    assert!(doc.author.is_none());
    assert_eq!(doc.metadata, Metadata::default());
    assert_eq!(doc.chapters.len(), 1);
    assert_eq!(doc.chapters[0].id, "chapter-1");
    assert_eq!(doc.chapters[0].title, "Chapter 1");
}

// ============================================================================
// Chapter tree
// ============================================================================

#[test]
fn test_sample_chapters() {
    let doc = parse(&fixture("sample.xml")).unwrap();

    let summary: Vec<_> = doc
        .chapters
        .iter()
        .map(|c| (c.id.as_str(), c.title.as_str(), c.level, c.order))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ch1", "Chapter 1: Introduction", 1, 1),
            ("ch2", "Chapter 2: Features", 1, 2),
            ("ch3", "Chapter 3: Conclusion", 1, 3),
        ]
    );
    assert!(doc.chapters.iter().all(|c| c.is_leaf()));

    let ch1 = &doc.chapters[0];
    assert!(ch1.content.starts_with("Chapter 1: Introduction This is the first chapter"));
    assert!(ch1.content.contains("framework for digital text encoding that preserves"));
    assert!(!ch1.content.contains('\n'));
}

#[test]
fn test_nested_chapters() {
    let doc = parse(&fixture("nested.xml")).unwrap();
    assert_eq!(doc.chapters.len(), 3);
    assert_eq!(doc.chapter_count(), 6);

    let part = &doc.chapters[0];
    assert_eq!(part.id, "part1");
    assert_eq!(part.title, "Part One");
    assert_eq!(part.content, "Part One Letters written from the coast.");

    let letter = &part.children[0];
    assert_eq!((letter.id.as_str(), letter.level, letter.order), ("l1", 2, 1));
    assert_eq!(letter.title, "To my sister");

    // Plain `id` attribute, no head: title from the division type
    let untitled = &part.children[1];
    assert_eq!(untitled.id, "l2");
    assert_eq!(untitled.title, "Letter 2");
    assert_eq!(untitled.content, "Untitled letter \u{2014} undated.");

    let postscript = &untitled.children[0];
    assert_eq!(postscript.id, "chapter-1");
    assert_eq!(postscript.title, "Postscript 1");
    assert_eq!(postscript.level, 3);

    // Blank head falls back to the synthesized title
    assert_eq!(doc.chapters[1].id, "chapter-2");
    assert_eq!(doc.chapters[1].title, "Part 2");
    assert_eq!(doc.chapters[2].title, "Chapter 3");
}

#[test]
fn test_front_and_back_matter_are_not_chapters() {
    let doc = parse(&fixture("nested.xml")).unwrap();
    assert!(doc.iter_chapters().all(|c| !c.content.contains("Front matter")));
    assert!(doc.iter_chapters().all(|c| !c.content.contains("Back matter")));
}

#[test]
fn test_find_chapter() {
    let doc = parse(&fixture("nested.xml")).unwrap();
    let found = doc.find_chapter("l1").expect("l1 should exist");
    assert_eq!(found.title, "To my sister");
    assert!(doc.find_chapter("ch9").is_none());
}

// ============================================================================
// Plain content
// ============================================================================

#[test]
fn test_plain_content_skips_notes_and_breaks() {
    let doc = parse(&fixture("nested.xml")).unwrap();
    assert_eq!(
        doc.plain_content,
        "Part One Letters written from the coast. To my sister The sea is grey today. \
         Untitled letter \u{2014} undated. P.S. Bring the map. \
         The second part has no title of its own. A closing note."
    );
}

#[test]
fn test_plain_content_with_footnotes() {
    let parser = TeiParser::with_config(ParserConfig::default().with_footnotes(true)).unwrap();
    let doc = parser.parse(&fixture("nested.xml")).unwrap();
    assert!(doc.plain_content.contains("grey todayA common complaint.."));
}

#[test]
fn test_whole_document_plain_text() {
    let text = plain_text(&fixture("nested.xml")).unwrap();
    assert!(text.starts_with("Front matter is not part of the body. Part One"));
    assert!(text.ends_with("A closing note. Back matter."));
    assert!(!text.contains("Presses du Nord"));
    assert!(!text.contains("A common complaint"));
}

// ============================================================================
// Table of contents
// ============================================================================

#[test]
fn test_table_of_contents_pre_order() {
    let doc = parse(&fixture("nested.xml")).unwrap();
    let toc = table_of_contents(&doc.chapters);

    let summary: Vec<_> = toc
        .iter()
        .map(|e| (e.id.as_str(), e.level, e.order))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("part1", 1, 1),
            ("l1", 2, 1),
            ("l2", 2, 2),
            ("chapter-1", 3, 1),
            ("chapter-2", 1, 2),
            ("chapter-3", 1, 3),
        ]
    );
    assert_eq!(toc.len(), doc.chapter_count());
}

#[test]
fn test_table_of_contents_of_subtree() {
    let doc = parse(&fixture("nested.xml")).unwrap();
    let toc = table_of_contents(&doc.chapters[0].children);
    assert_eq!(toc[0].id, "l1");
    assert_eq!(toc[0].level, 1);
    assert_eq!(toc[2].level, 2);
}

// ============================================================================
// Decoding and files
// ============================================================================

#[test]
fn test_declared_latin1_encoding() {
    let bytes = std::fs::read(fixture_path("latin1.xml")).unwrap();
    assert!(std::str::from_utf8(&bytes).is_err());

    let doc = parse_bytes(&bytes).expect("Failed to parse Latin-1 document");
    assert_eq!(doc.title, "Café Society");
    assert_eq!(doc.author.as_deref(), Some("Renée Marchand"));
    assert_eq!(doc.chapters[0].title, "\u{c0} la terrasse");
}

#[test]
fn test_parse_file_from_temp_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("copy.xml");
    std::fs::write(&path, fixture("sample.xml")).unwrap();

    let doc = parse_file(&path).expect("Failed to parse file");
    assert_eq!(doc.title, "Sample TEI Document");
}

#[test]
fn test_parse_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_file(dir.path().join("missing.xml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn test_truncated_upload_is_malformed() {
    let err = parse(&fixture("truncated.xml")).unwrap_err();
    assert!(err.is_malformed(), "unexpected error: {err}");
}

#[test]
fn test_malformed_inputs() {
    let cases = [
        "",
        "   \n",
        "plain text, not XML",
        "<TEI><text></TEI>",
        "<TEI><div></span></TEI>",
        "<TEI/><TEI/>",
        "<TEI a=\"1\" a=\"2\"/>",
        "</TEI>",
    ];
    for input in cases {
        match parse(input) {
            Err(err) => assert!(err.is_malformed(), "{input:?}: unexpected error {err}"),
            Ok(doc) => panic!("{input:?} should be rejected, got {doc:?}"),
        }
    }
}

#[test]
fn test_malformed_with_each_engine() {
    for engine in [QueryEngine::TagName, QueryEngine::Selectors] {
        if !engine.is_available() {
            continue;
        }
        let parser = TeiParser::with_config(ParserConfig::default().with_engine(engine)).unwrap();
        assert!(parser.parse("<TEI><text>").unwrap_err().is_malformed());
        assert!(parser.plain_text("<TEI><text>").unwrap_err().is_malformed());
    }
}

#[test]
fn test_minimal_documents_are_accepted() {
    let doc = parse("<TEI/>").unwrap();
    assert_eq!(doc.title, "Untitled Document");
    assert!(doc.chapters.is_empty());
    assert_eq!(doc.plain_content, "");

    // A root that is not TEI still parses; it simply has no body
    let doc = parse("<html><body><div/></body></html>").unwrap();
    assert!(doc.chapters.is_empty());
}

// ============================================================================
// Deep nesting
// ============================================================================

fn nested_divisions(depth: usize) -> String {
    format!(
        "<TEI><text><body>{}{}</body></text></TEI>",
        r#"<div><head>Level</head>"#.repeat(depth),
        "</div>".repeat(depth)
    )
}

#[test]
fn test_deep_nesting_is_rejected_not_fatal() {
    for engine in [QueryEngine::TagName, QueryEngine::Selectors] {
        if !engine.is_available() {
            continue;
        }
        let parser = TeiParser::with_config(ParserConfig::default().with_engine(engine)).unwrap();
        let err = parser.parse(&nested_divisions(1000)).unwrap_err();
        assert!(err.is_malformed(), "unexpected error: {err}");
        assert!(parser.plain_text(&nested_divisions(1000)).unwrap_err().is_malformed());
    }
}

#[test]
fn test_deep_nesting_within_limit() {
    // TEI, text and body take three levels
    let depth = 200;
    for engine in [QueryEngine::TagName, QueryEngine::Selectors] {
        if !engine.is_available() {
            continue;
        }
        let parser = TeiParser::with_config(ParserConfig::default().with_engine(engine)).unwrap();
        let doc = parser.parse(&nested_divisions(depth)).unwrap();
        assert_eq!(doc.chapter_count(), depth);
        let deepest = doc.iter_chapters().last().unwrap();
        assert_eq!(deepest.level, depth);
        assert_eq!(deepest.title, "Level");
    }
}
