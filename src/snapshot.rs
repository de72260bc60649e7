//! Snapshot indexing
//!
//! Joins the flattened node arrays of one captured document with its
//! layout subset, producing per-text-node font metrics keyed by backend
//! id. The layout mapping is a struct-of-arrays join: one inverse index
//! (flattened node index → layout row) built in a single scan, then one
//! linear pass over the node arrays. No tree is materialized here.

use crate::error::{Result, SnapshotError};
use crate::protocol::{BackendNodeId, DocumentSnapshot};
use rustc_hash::FxHashMap;

/// Node-type tag of DOM text nodes in the snapshot
pub const TEXT_NODE_TYPE: i64 = 3;

/// Elements whose text children never render
const BLOCKED_PARENTS: [&str; 3] = ["SCRIPT", "STYLE", "NOSCRIPT"];

/// Computed font size and trimmed text length of one qualifying text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextNodeMetrics {
    /// Computed font size in whole pixels. `None` when the computed
    /// value has no leading digits; such a node still counts toward
    /// totals but can never fail the legibility threshold.
    pub font_size: Option<i64>,
    /// Character count of the trimmed text content
    pub text_length: u64,
}

/// Index every qualifying text node of `document`
///
/// A text node qualifies when it has the text node type, its parent is
/// not one of SCRIPT/STYLE/NOSCRIPT, and its trimmed text is non-empty.
/// The font size is read from the parent element's layout row (styles
/// are recorded per style-bearing element, not per text node); a parent
/// with no layout row disqualifies the node rather than defaulting to
/// size zero. A layout row whose value has no leading digits keeps the
/// node but records no size, matching base-10 `parseInt` semantics
/// where an unparseable size never compares below the threshold.
///
/// Length-mismatched parallel arrays are a fatal precondition failure.
pub fn index_text_nodes(
    document: &DocumentSnapshot,
    strings: &[String],
) -> Result<FxHashMap<BackendNodeId, TextNodeMetrics>> {
    let nodes = &document.nodes;
    let count = nodes.parent_index.len();
    check_len("nodeType", count, nodes.node_type.len())?;
    check_len("nodeName", count, nodes.node_name.len())?;
    check_len("nodeValue", count, nodes.node_value.len())?;
    check_len("backendNodeId", count, nodes.backend_node_id.len())?;
    check_len(
        "layout.styles",
        document.layout.node_index.len(),
        document.layout.styles.len(),
    )?;

    // Inverse index, built once per snapshot. Absence of a key is the
    // "no computed style" sentinel; row 0 stays a valid value.
    let mut layout_row: FxHashMap<usize, usize> = FxHashMap::default();
    for (row, &node_index) in document.layout.node_index.iter().enumerate() {
        if node_index >= count {
            return Err(SnapshotError::LayoutIndexOutOfRange { row, node_index }.into());
        }
        layout_row.insert(node_index, row);
    }

    let mut metrics = FxHashMap::default();
    for i in 0..count {
        if nodes.node_type[i] != TEXT_NODE_TYPE {
            continue;
        }
        let Some(text) = nodes.node_value[i].get(strings) else {
            continue;
        };
        let text_length = text.trim().chars().count() as u64;
        if text_length == 0 {
            continue;
        }
        let Ok(parent) = usize::try_from(nodes.parent_index[i]) else {
            continue;
        };
        if parent >= count {
            continue;
        }
        let Some(parent_name) = nodes.node_name[parent].get(strings) else {
            continue;
        };
        if BLOCKED_PARENTS.contains(&parent_name) {
            continue;
        }
        let Some(&row) = layout_row.get(&parent) else {
            continue;
        };
        let font_size = document.layout.styles[row]
            .first()
            .and_then(|&ix| ix.get(strings))
            .and_then(parse_leading_int);
        metrics.insert(nodes.backend_node_id[i], TextNodeMetrics { font_size, text_length });
    }
    log::debug!("indexed {} qualifying text nodes", metrics.len());
    Ok(metrics)
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SnapshotError::ParallelArrayMismatch { field, expected, actual }.into());
    }
    Ok(())
}

/// Leading base-10 integer of a computed value like `"11.5px"`
fn parse_leading_int(value: &str) -> Option<i64> {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}
