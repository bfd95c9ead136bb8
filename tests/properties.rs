//! Property tests over generated chapter trees, run against every engine.

use folio::{Chapter, ParserConfig, QueryEngine, TeiParser, table_of_contents};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Division {
    with_id: bool,
    head: Option<String>,
    children: Vec<Division>,
}

fn division() -> impl Strategy<Value = Division> {
    let leaf = (any::<bool>(), proptest::option::of("[a-z]{1,8}( [a-z]{1,8}){0,2}")).prop_map(
        |(with_id, head)| Division {
            with_id,
            head,
            children: Vec::new(),
        },
    );
    leaf.prop_recursive(3, 32, 4, |inner| {
        (
            any::<bool>(),
            proptest::option::of("[a-z]{1,8}"),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(with_id, head, children)| Division {
                with_id,
                head,
                children,
            })
    })
}

/// Expected `(id, title, level, order)` for one division, in pre-order.
type Expected = (String, String, usize, usize);

fn render(
    divisions: &[Division],
    level: usize,
    next_id: &mut usize,
    xml: &mut String,
    expected: &mut Vec<Expected>,
) {
    for (index, div) in divisions.iter().enumerate() {
        let order = index + 1;
        let id = if div.with_id {
            *next_id += 1;
            let id = format!("d{next_id}");
            xml.push_str(&format!(r#"<div xml:id="{id}">"#));
            id
        } else {
            xml.push_str("<div>");
            format!("chapter-{order}")
        };
        let title = match &div.head {
            Some(head) => {
                xml.push_str(&format!("<head>{head}</head>"));
                head.clone()
            }
            None => format!("Chapter {order}"),
        };
        xml.push_str(&format!("<p>text {level}.{order}</p>"));
        expected.push((id, title, level, order));
        render(&div.children, level + 1, next_id, xml, expected);
        xml.push_str("</div>");
    }
}

fn document(roots: &[Division]) -> (String, Vec<Expected>) {
    let mut xml = String::from("<TEI><teiHeader/><text><body>");
    let mut expected = Vec::new();
    render(roots, 1, &mut 0, &mut xml, &mut expected);
    xml.push_str("</body></text></TEI>");
    (xml, expected)
}

fn engines() -> Vec<TeiParser> {
    [QueryEngine::TagName, QueryEngine::Selectors]
        .into_iter()
        .filter(|engine| engine.is_available())
        .map(|engine| TeiParser::with_config(ParserConfig::default().with_engine(engine)).unwrap())
        .collect()
}

fn check_levels(chapters: &[Chapter], level: usize) -> Result<(), TestCaseError> {
    for (index, chapter) in chapters.iter().enumerate() {
        prop_assert_eq!(chapter.level, level);
        prop_assert_eq!(chapter.order, index + 1);
        check_levels(&chapter.children, level + 1)?;
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_root_divisions_become_ordered_chapters(
        roots in prop::collection::vec(division(), 0..6)
    ) {
        let (xml, _) = document(&roots);
        for parser in engines() {
            let doc = parser.parse(&xml).unwrap();
            prop_assert_eq!(doc.chapters.len(), roots.len());
            for (index, chapter) in doc.chapters.iter().enumerate() {
                prop_assert_eq!(chapter.order, index + 1);
                prop_assert_eq!(chapter.level, 1);
            }
        }
    }

    #[test]
    fn prop_child_level_is_parent_level_plus_one(
        roots in prop::collection::vec(division(), 0..6)
    ) {
        let (xml, _) = document(&roots);
        for parser in engines() {
            let doc = parser.parse(&xml).unwrap();
            check_levels(&doc.chapters, 1)?;
        }
    }

    #[test]
    fn prop_toc_matches_pre_order_traversal(
        roots in prop::collection::vec(division(), 0..6)
    ) {
        let (xml, expected) = document(&roots);
        for parser in engines() {
            let doc = parser.parse(&xml).unwrap();
            let toc: Vec<Expected> = table_of_contents(&doc.chapters)
                .into_iter()
                .map(|e| (e.id, e.title, e.level, e.order))
                .collect();
            prop_assert_eq!(&toc, &expected);
            prop_assert_eq!(toc.len(), doc.chapter_count());
        }
    }

    #[test]
    fn prop_engines_agree(roots in prop::collection::vec(division(), 0..6)) {
        let (xml, _) = document(&roots);
        let results: Vec<_> = engines()
            .iter()
            .map(|parser| parser.parse(&xml).unwrap())
            .collect();
        for pair in results.windows(2) {
            prop_assert_eq!(&pair[0], &pair[1]);
        }
    }

    #[test]
    fn prop_display_never_empty(raw in ".{0,64}") {
        prop_assert!(!folio::format_for_display(&raw).is_empty());
    }
}
