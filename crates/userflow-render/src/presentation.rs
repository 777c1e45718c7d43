//! Presentation geometry derived from a laid-out graph: interaction column
//! order, ordinal header labels, dropout bar placement, label truncation.

use crate::model::{LayoutLink, SankeyLayout};
use serde::{Deserialize, Serialize};
use userflow_core::DROPOUT_NODE_NAME;

/// Distinct column `x0` coordinates in ascending order, one per interaction
/// step. When the trailing column's first node is the dropout sentinel, that
/// column is dropped: dropout renders as an overlay on its source column, not
/// as an interaction of its own.
pub fn column_order(layout: &SankeyLayout) -> Vec<f64> {
    let mut columns: Vec<(f64, usize)> = Vec::new();
    for node in &layout.nodes {
        if !columns.iter().any(|&(x, _)| x == node.x0) {
            columns.push((node.x0, node.index));
        }
    }
    columns.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    if let Some(&(_, first_node)) = columns.last() {
        if layout.nodes[first_node]
            .name
            .eq_ignore_ascii_case(DROPOUT_NODE_NAME)
        {
            columns.pop();
        }
    }

    columns.into_iter().map(|(x, _)| x).collect()
}

/// Ordinal label for a 1-based interaction index.
///
/// Uses the bare mod-10 suffix rule the production chart shipped with, so 11,
/// 12 and 13 come out as "11st", "12nd", "13rd". Kept as-is: downstream
/// dashboards pin these strings.
pub fn ordinal_label(index: usize) -> String {
    match index % 10 {
        1 => format!("{index}st"),
        2 => format!("{index}nd"),
        3 => format!("{index}rd"),
        _ => format!("{index}th"),
    }
}

/// Placement of a dropout link's bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Computes where a dropout link's bar sits on its source column.
///
/// When the source node carries a positive `drop` threshold, the bar stacks
/// below the outgoing links that clear the threshold: walk the source's links
/// in stacking order, stop at the first dropout-targeting sibling, and sum the
/// widths of siblings whose value is at least the threshold. With no
/// threshold the bar pins to the node top.
pub fn dropout_bar_geometry(layout: &SankeyLayout, link: &LayoutLink) -> BarGeometry {
    let source = layout.node(link.source);
    let target = layout.node(link.target);

    let y = if source.drop > 0.0 {
        let mut total_width = 0.0;
        for &li in &source.source_links {
            let sibling = &layout.links[li];
            if layout.node(sibling.target).name.eq_ignore_ascii_case(DROPOUT_NODE_NAME) {
                break;
            }
            if sibling.value >= source.drop {
                total_width += sibling.width;
            }
        }
        source.y0 + total_width
    } else {
        source.y0
    };

    BarGeometry {
        x: source.x1,
        y,
        width: layout.node_width + 3.0,
        height: (target.y0 - target.y1).abs(),
    }
}

/// Truncates display text to `limit` characters, ellipsis included.
/// Absent or empty input becomes the empty string.
pub fn truncate_label(value: Option<&str>, limit: usize) -> String {
    let Some(text) = value else {
        return String::new();
    };
    if text.is_empty() {
        return String::new();
    }
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(1)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_suffixes_follow_the_mod_10_rule() {
        assert_eq!(ordinal_label(1), "1st");
        assert_eq!(ordinal_label(2), "2nd");
        assert_eq!(ordinal_label(3), "3rd");
        assert_eq!(ordinal_label(4), "4th");
        assert_eq!(ordinal_label(10), "10th");
        // The production rule has no 10..=19 exception.
        assert_eq!(ordinal_label(11), "11st");
        assert_eq!(ordinal_label(12), "12nd");
        assert_eq!(ordinal_label(13), "13rd");
        assert_eq!(ordinal_label(21), "21st");
    }

    #[test]
    fn truncation_keeps_short_text_and_clips_long_text() {
        assert_eq!(truncate_label(Some("Homepage"), 20), "Homepage");
        assert_eq!(
            truncate_label(Some("A very long page title exceeding limit"), 10),
            "A very lo..."
        );
        assert_eq!(truncate_label(None, 10), "");
        assert_eq!(truncate_label(Some(""), 10), "");
    }
}
