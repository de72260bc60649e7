//! Triage and budgeted rule analysis
//!
//! Orchestrates one analysis pass: capture the snapshot, index text
//! nodes, reconstruct the body subtree, find nodes below the legibility
//! threshold, and resolve the governing rule for a bounded subset of
//! them. Each resolved node costs one matched-styles round trip, so the
//! subset is capped and prioritized by text length; the fetches fan out
//! across rayon workers and join before aggregation.

use crate::backend::StyleBackend;
use crate::cascade::{resolve_governing_rule, SourceRule, FONT_SIZE_PROPERTY};
use crate::error::{Result, SnapshotError};
use crate::protocol::{BackendNodeId, NodeId, StyleSheetHeader};
use crate::snapshot::index_text_nodes;
use crate::tree::NodeArena;
use rayon::prelude::*;
use serde::Serialize;

/// Minimum legible font size; computed sizes strictly below fail
pub const LEGIBLE_FONT_SIZE_PX: i64 = 12;

/// Hard cap on matched-styles round trips per analysis
pub const MAX_NODES_TO_ANALYZE: usize = 50;

/// Computed-style properties tracked in the snapshot capture
pub const TRACKED_STYLE_PROPERTIES: [&str; 1] = [FONT_SIZE_PROPERTY];

/// The element owning a failing text node
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub node_id: NodeId,
    pub backend_node_id: BackendNodeId,
    pub node_name: String,
}

/// One analyzed failing text node with its resolved provenance
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFontData {
    pub element: ElementSummary,
    pub font_size: i64,
    pub text_length: u64,
    /// Governing rule, absent when no declaration is reachable or the
    /// fetch for this node failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<SourceRule>,
    /// Header of the stylesheet owning the governing rule, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_sheet: Option<StyleSheetHeader>,
}

/// Aggregate result of one analysis pass
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSizeAnalysis {
    /// Text length of every qualifying text node under body
    pub total_text_length: u64,
    /// Text length of every failing node, analyzed or not
    pub failing_text_length: u64,
    /// Text length of the analyzed (budgeted) subset only
    pub analyzed_failing_text_length: u64,
    /// The budgeted subset, with resolved rules where available
    pub analyzed_nodes: Vec<NodeFontData>,
}

struct Candidate {
    element: usize,
    font_size: i64,
    text_length: u64,
}

/// Run one full analysis of the page at `page_url`
///
/// Fatal only on snapshot preconditions (undecodable or mismatched
/// arrays, no document for the URL). Individual matched-styles fetch
/// failures degrade that node to "no rule" without failing the batch.
pub fn analyze_page<B: StyleBackend>(backend: &B, page_url: &str) -> Result<FontSizeAnalysis> {
    let watch = backend.watch_stylesheets()?;
    let snapshot = backend.capture_document_snapshot(&TRACKED_STYLE_PROPERTIES)?;
    let document = snapshot
        .documents
        .iter()
        .find(|doc| doc.document_url.get(&snapshot.strings) == Some(page_url))
        .ok_or_else(|| SnapshotError::DocumentNotFound { url: page_url.to_string() })?;
    let metrics = index_text_nodes(document, &snapshot.strings)?;

    let arena = NodeArena::build(backend.list_all_nodes()?);

    // Join snapshot metrics against the body subtree. Arena input order
    // keeps the later tie-break stable.
    let mut total_text_length = 0u64;
    let mut failing: Vec<Candidate> = Vec::new();
    for index in arena.body_nodes() {
        let Some(&m) = metrics.get(&arena.get(index).backend_node_id) else {
            continue;
        };
        total_text_length += m.text_length;
        // An unparseable computed size never fails the threshold.
        let Some(font_size) = m.font_size else {
            continue;
        };
        if font_size >= LEGIBLE_FONT_SIZE_PX {
            continue;
        }
        // Matched styles are fetched for the owning element, not the
        // text node itself.
        let Some(element) = arena.parent_of(index) else {
            continue;
        };
        failing.push(Candidate { element, font_size, text_length: m.text_length });
    }

    let failing_text_length: u64 = failing.iter().map(|c| c.text_length).sum();
    let failing_count = failing.len();

    // Longer illegible passages matter more. The sort is stable, so
    // equal lengths keep input order.
    failing.sort_by(|a, b| b.text_length.cmp(&a.text_length));
    failing.truncate(MAX_NODES_TO_ANALYZE);

    let mut analyzed_nodes: Vec<NodeFontData> = failing
        .par_iter()
        .map(|candidate| {
            let element = arena.get(candidate.element);
            let rule = match backend.fetch_matched_styles(element.node_id) {
                Ok(styles) => resolve_governing_rule(&styles),
                Err(err) => {
                    log::warn!("matched-styles fetch failed for node {:?}: {err}", element.node_id);
                    None
                }
            };
            NodeFontData {
                element: ElementSummary {
                    node_id: element.node_id,
                    backend_node_id: element.backend_node_id,
                    node_name: element.node_name.clone(),
                },
                font_size: candidate.font_size,
                text_length: candidate.text_length,
                rule,
                style_sheet: None,
            }
        })
        .collect();

    let sheets = watch.collect();
    for node in &mut analyzed_nodes {
        node.style_sheet = node
            .rule
            .as_ref()
            .and_then(SourceRule::style_sheet_id)
            .and_then(|id| sheets.get(id))
            .cloned();
    }

    let analyzed_failing_text_length: u64 = analyzed_nodes.iter().map(|n| n.text_length).sum();
    log::debug!(
        "analyzed {}/{} failing text nodes ({analyzed_failing_text_length}/{failing_text_length} chars)",
        analyzed_nodes.len(),
        failing_count,
    );

    Ok(FontSizeAnalysis {
        total_text_length,
        failing_text_length,
        analyzed_failing_text_length,
        analyzed_nodes,
    })
}
