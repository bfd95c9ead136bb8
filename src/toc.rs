//! Table-of-contents flattening.

use crate::model::{Chapter, TocEntry};

/// Flatten a chapter forest into TOC entries in pre-order.
///
/// `level` is the depth in this traversal (roots are 1), not the
/// `Chapter::level` stored on the input.
pub fn table_of_contents(chapters: &[Chapter]) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    push_entries(chapters, 1, &mut entries);
    entries
}

fn push_entries(chapters: &[Chapter], level: usize, entries: &mut Vec<TocEntry>) {
    for chapter in chapters {
        entries.push(TocEntry {
            id: chapter.id.clone(),
            title: chapter.title.clone(),
            level,
            order: chapter.order,
        });
        push_entries(&chapter.children, level + 1, entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, level: usize, order: usize, children: Vec<Chapter>) -> Chapter {
        Chapter {
            id: id.to_string(),
            title: format!("Title {id}"),
            content: String::new(),
            level,
            order,
            children,
        }
    }

    #[test]
    fn test_parent_then_children() {
        let chapters = vec![chapter(
            "p",
            1,
            1,
            vec![chapter("c1", 2, 1, vec![]), chapter("c2", 2, 2, vec![])],
        )];
        let toc = table_of_contents(&chapters);
        let summary: Vec<_> = toc
            .iter()
            .map(|e| (e.id.as_str(), e.level, e.order))
            .collect();
        assert_eq!(summary, vec![("p", 1, 1), ("c1", 2, 1), ("c2", 2, 2)]);
        assert_eq!(toc[1].title, "Title c1");
    }

    #[test]
    fn test_pre_order_across_roots() {
        let chapters = vec![
            chapter("a", 1, 1, vec![chapter("a1", 2, 1, vec![chapter("a1x", 3, 1, vec![])])]),
            chapter("b", 1, 2, vec![]),
        ];
        let ids: Vec<_> = table_of_contents(&chapters)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["a", "a1", "a1x", "b"]);
    }

    #[test]
    fn test_level_is_traversal_depth() {
        // Stored levels are ignored; a subtree passed alone starts at 1.
        let chapters = vec![chapter("deep", 4, 3, vec![chapter("deeper", 9, 1, vec![])])];
        let toc = table_of_contents(&chapters);
        assert_eq!(toc[0].level, 1);
        assert_eq!(toc[0].order, 3);
        assert_eq!(toc[1].level, 2);
    }

    #[test]
    fn test_empty_forest() {
        assert!(table_of_contents(&[]).is_empty());
    }
}
