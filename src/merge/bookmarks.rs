//! Outline reconciliation across merged sources.
//!
//! Each source contributes to the merged outline according to its
//! [`OutlineMode`]; synthetic entries can be restyled via
//! [`BookmarkStyles`] and consecutive entries with the same title collapse
//! into one.

use std::collections::BTreeMap;

use crate::merge::source::{MergedDocumentInfo, OutlineMode};
use crate::outline::BookmarkNode;

/// Build the merged document's top-level outline from the per-source
/// contributions, in source order.
pub(crate) fn assemble_outline(infos: Vec<MergedDocumentInfo>) -> Vec<BookmarkNode> {
    let mut outline: Vec<BookmarkNode> = Vec::new();
    // Index of the synthetic entry that adjacent same-title sources merge
    // into. DescendantsOnly sources never update it.
    let mut last_emitted: Option<usize> = None;
    for info in infos {
        match info.outline_mode {
            OutlineMode::None => {}
            OutlineMode::DescendantsOnly => outline.extend(info.outline),
            OutlineMode::ThisOnly | OutlineMode::WholeHierarchy => {
                let node = synthetic_entry(info);
                match last_emitted {
                    Some(index) if outline[index].title == node.title => {
                        merge_into(&mut outline[index], node);
                    }
                    _ => {
                        outline.push(node);
                        last_emitted = Some(outline.len() - 1);
                    }
                }
            }
        }
    }
    outline
}

/// The synthetic outline entry for one source: titled, black, open,
/// pointing at the source's first page, with styles applied.
fn synthetic_entry(info: MergedDocumentInfo) -> BookmarkNode {
    let mut node = BookmarkNode {
        title: info.title,
        page: Some(info.start_page),
        color: Some([0.0, 0.0, 0.0]),
        open: true,
        kids: match info.outline_mode {
            OutlineMode::WholeHierarchy => Some(info.outline),
            _ => None,
        },
        extra: BTreeMap::new(),
    };
    for (key, value) in &info.bookmark_styles {
        apply_style(&mut node, key, value.as_deref());
    }
    node
}

/// Apply one style override. A present value sets the attribute, an
/// absent one removes it. A `Title` removal is ignored.
fn apply_style(node: &mut BookmarkNode, key: &str, value: Option<&str>) {
    match key {
        "Title" => {
            if let Some(title) = value {
                node.title = title.to_string();
            }
        }
        "Color" => {
            node.color = value.and_then(parse_color);
        }
        "Open" => {
            node.open = value.is_some_and(|v| v.eq_ignore_ascii_case("true"));
        }
        _ => {
            match value {
                Some(v) => {
                    node.extra.insert(key.to_string(), v.to_string());
                }
                None => {
                    node.extra.remove(key);
                }
            };
        }
    }
}

fn parse_color(value: &str) -> Option<[f32; 3]> {
    let mut parts = value.split_whitespace();
    let r = parts.next()?.parse().ok()?;
    let g = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some([r, g, b])
}

/// Fold `current` into `previous`: its children are appended, the rest of
/// it is dropped.
fn merge_into(previous: &mut BookmarkNode, current: BookmarkNode) {
    if let Some(kids) = current.kids {
        previous.kids.get_or_insert_with(Vec::new).extend(kids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::source::BookmarkStyles;

    fn info(title: &str, start_page: u32, mode: OutlineMode) -> MergedDocumentInfo {
        MergedDocumentInfo {
            title: title.to_string(),
            start_page,
            outline: Vec::new(),
            outline_mode: mode,
            bookmark_styles: BookmarkStyles::new(),
        }
    }

    fn with_outline(
        mut base: MergedDocumentInfo,
        outline: Vec<BookmarkNode>,
    ) -> MergedDocumentInfo {
        base.outline = outline;
        base
    }

    #[test]
    fn none_contributes_nothing() {
        let outline = assemble_outline(vec![with_outline(
            info("Hidden", 1, OutlineMode::None),
            vec![BookmarkNode::new("Native", 1)],
        )]);
        assert!(outline.is_empty());
    }

    #[test]
    fn this_only_drops_native_outline() {
        let outline = assemble_outline(vec![with_outline(
            info("Doc", 1, OutlineMode::ThisOnly),
            vec![BookmarkNode::new("Native", 1)],
        )]);
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].title, "Doc");
        assert_eq!(outline[0].page, Some(1));
        assert!(outline[0].kids.is_none());
    }

    #[test]
    fn whole_hierarchy_nests_native_outline() {
        let outline = assemble_outline(vec![with_outline(
            info("Doc", 1, OutlineMode::WholeHierarchy),
            vec![BookmarkNode::new("Native", 1)],
        )]);
        assert_eq!(outline.len(), 1);
        let kids = outline[0].kids.as_ref().unwrap();
        assert_eq!(kids.len(), 1);
        assert_eq!(kids[0].title, "Native");
    }

    #[test]
    fn whole_hierarchy_always_owns_a_children_list() {
        let outline = assemble_outline(vec![info("Doc", 1, OutlineMode::WholeHierarchy)]);
        assert_eq!(outline[0].kids, Some(Vec::new()));
    }

    #[test]
    fn descendants_only_promotes_native_entries() {
        let outline = assemble_outline(vec![with_outline(
            info("Doc", 1, OutlineMode::DescendantsOnly),
            vec![BookmarkNode::new("A", 1), BookmarkNode::new("B", 2)],
        )]);
        assert_eq!(outline.len(), 2);
        assert!(outline.iter().all(|n| n.title != "Doc"));
    }

    #[test]
    fn adjacent_same_title_entries_collapse() {
        let first = with_outline(
            info("Invoices", 1, OutlineMode::WholeHierarchy),
            vec![BookmarkNode::new("Inv 1", 1)],
        );
        let second = with_outline(
            info("Invoices", 3, OutlineMode::WholeHierarchy),
            vec![BookmarkNode::new("Inv 2", 3)],
        );
        let outline = assemble_outline(vec![first, second]);
        assert_eq!(outline.len(), 1);
        let kids = outline[0].kids.as_ref().unwrap();
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[0].title, "Inv 1");
        assert_eq!(kids[1].title, "Inv 2");
    }

    #[test]
    fn title_comparison_is_case_sensitive() {
        let outline = assemble_outline(vec![
            info("Invoices", 1, OutlineMode::ThisOnly),
            info("invoices", 2, OutlineMode::ThisOnly),
        ]);
        assert_eq!(outline.len(), 2);
    }

    #[test]
    fn descendants_only_does_not_participate_in_collapsing() {
        // The middle source emits no synthetic entry and must not reset
        // the reference entry either, so the third source still merges
        // into the first.
        let outline = assemble_outline(vec![
            info("Doc", 1, OutlineMode::ThisOnly),
            with_outline(
                info("Other", 2, OutlineMode::DescendantsOnly),
                vec![BookmarkNode::new("Native", 2)],
            ),
            info("Doc", 3, OutlineMode::WholeHierarchy),
        ]);
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].title, "Doc");
        assert_eq!(outline[1].title, "Native");
        // The later "Doc" merged into the first; its children list was
        // created on demand.
        assert_eq!(outline[0].kids, Some(Vec::new()));
    }

    #[test]
    fn non_adjacent_same_title_entries_stay_separate() {
        let outline = assemble_outline(vec![
            info("Doc", 1, OutlineMode::ThisOnly),
            info("Between", 2, OutlineMode::ThisOnly),
            info("Doc", 3, OutlineMode::ThisOnly),
        ]);
        assert_eq!(outline.len(), 3);
    }

    #[test]
    fn style_overrides_set_and_remove_attributes() {
        let mut styled = info("Doc", 1, OutlineMode::ThisOnly);
        styled.bookmark_styles.insert(
            "Title".to_string(),
            Some("Renamed".to_string()),
        );
        styled
            .bookmark_styles
            .insert("Color".to_string(), Some("1 0 0".to_string()));
        styled.bookmark_styles.insert("Open".to_string(), None);
        styled.bookmark_styles.insert(
            "Style".to_string(),
            Some("bold".to_string()),
        );
        let outline = assemble_outline(vec![styled]);
        let node = &outline[0];
        assert_eq!(node.title, "Renamed");
        assert_eq!(node.color, Some([1.0, 0.0, 0.0]));
        assert!(!node.open);
        assert_eq!(node.extra.get("Style").map(String::as_str), Some("bold"));
    }

    #[test]
    fn title_removal_is_ignored() {
        let mut styled = info("Doc", 1, OutlineMode::ThisOnly);
        styled.bookmark_styles.insert("Title".to_string(), None);
        let outline = assemble_outline(vec![styled]);
        assert_eq!(outline[0].title, "Doc");
    }

    #[test]
    fn malformed_color_override_removes_the_color() {
        let mut styled = info("Doc", 1, OutlineMode::ThisOnly);
        styled
            .bookmark_styles
            .insert("Color".to_string(), Some("red".to_string()));
        let outline = assemble_outline(vec![styled]);
        assert_eq!(outline[0].color, None);
    }
}
