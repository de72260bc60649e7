//! Wire types for the DevTools-shaped payloads this engine consumes
//!
//! Everything here mirrors the transport's JSON: the flattened document
//! snapshot (parallel arrays over a shared deduplicated string table),
//! the non-flattened node list, matched-style responses, and stylesheet
//! headers. Deserialization doubles as the presence check for required
//! arrays — a snapshot missing one of them fails to decode and the
//! analysis reports an unexpected response.

use serde::{Deserialize, Serialize};

/// Index into the snapshot string table. `-1` means "no string".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringIndex(pub i64);

impl StringIndex {
    pub const ABSENT: StringIndex = StringIndex(-1);

    /// Dereference through the string table. Out-of-range and absent
    /// indices both yield `None`.
    pub fn get(self, strings: &[String]) -> Option<&str> {
        usize::try_from(self.0)
            .ok()
            .and_then(|i| strings.get(i))
            .map(String::as_str)
    }
}

/// Per-document node identifier from the node-list protocol surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

/// Stable identifier joining a flattened snapshot node with its
/// protocol-form counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendNodeId(pub i64);

/// Identifier of a registered stylesheet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSheetId(pub String);

// ============================================================================
// Flattened document snapshot
// ============================================================================

/// Response of a document-snapshot capture: one entry per document
/// (frames included) plus the shared string table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshotResponse {
    pub documents: Vec<DocumentSnapshot>,
    pub strings: Vec<String>,
}

/// One captured document: node arrays plus the layout subset
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSnapshot {
    #[serde(alias = "documentURL")]
    pub document_url: StringIndex,
    pub nodes: NodeTreeSnapshot,
    pub layout: LayoutTreeSnapshot,
}

/// Parallel arrays keyed by flattened node index
///
/// `parent_index` uses `-1` as the root sentinel; `node_name` and
/// `node_value` reference the string table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTreeSnapshot {
    pub parent_index: Vec<i64>,
    pub node_type: Vec<i64>,
    pub node_name: Vec<StringIndex>,
    pub node_value: Vec<StringIndex>,
    pub backend_node_id: Vec<BackendNodeId>,
}

/// Layout subset: `node_index[i]` is the flattened node index whose
/// tracked computed-style values are `styles[i]`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTreeSnapshot {
    pub node_index: Vec<usize>,
    pub styles: Vec<Vec<StringIndex>>,
}

// ============================================================================
// Protocol-form nodes
// ============================================================================

/// Non-flattened node as returned by the full node list. Parent links
/// arrive as ids and are resolved into arena indices by the tree
/// reconstructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolNode {
    pub node_id: NodeId,
    pub backend_node_id: BackendNodeId,
    pub node_name: String,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
}

// ============================================================================
// Matched styles
// ============================================================================

/// Response of a per-node matched-styles fetch
///
/// Every section is optional on the wire; absent means "nothing
/// applies", never an error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedStyles {
    #[serde(default)]
    pub inline_style: Option<CssStyle>,
    #[serde(default, alias = "matchedCSSRules")]
    pub matched_css_rules: Option<Vec<RuleMatch>>,
    #[serde(default)]
    pub inherited: Option<Vec<InheritedStyleEntry>>,
}

/// One directly-matched rule plus the indices of the selectors in its
/// list that actually matched the element
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub rule: CssRule,
    #[serde(default)]
    pub matching_selectors: Vec<usize>,
}

/// Matched styles contributed by one ancestor, nearest ancestor first
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritedStyleEntry {
    #[serde(default)]
    pub inline_style: Option<CssStyle>,
    #[serde(default, alias = "matchedCSSRules")]
    pub matched_css_rules: Option<Vec<RuleMatch>>,
}

/// A style rule as seen by the transport: declarations plus selector
/// list and cascade origin
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssRule {
    pub style: CssStyle,
    pub origin: StyleRuleOrigin,
    pub selector_list: SelectorList,
    #[serde(default)]
    pub style_sheet_id: Option<StyleSheetId>,
}

/// Selector list of a rule; `text` is the full serialized list
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
    #[serde(default)]
    pub text: String,
}

/// One selector's literal text
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    pub text: String,
}

/// Cascade origin of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleRuleOrigin {
    Injected,
    UserAgent,
    Inspector,
    Regular,
}

/// A block of declarations (inline attribute or rule body)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssStyle {
    #[serde(default)]
    pub css_properties: Vec<CssProperty>,
    #[serde(default)]
    pub style_sheet_id: Option<StyleSheetId>,
    #[serde(default)]
    pub range: Option<SourceRange>,
}

impl CssStyle {
    /// True when the block declares `name`
    pub fn declares(&self, name: &str) -> bool {
        self.css_properties.iter().any(|p| p.name == name)
    }
}

/// One declared property
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssProperty {
    pub name: String,
    pub value: String,
}

/// Source text range of a declaration block within its stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

/// Metadata announced on the stylesheet-registration stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSheetHeader {
    pub style_sheet_id: StyleSheetId,
    #[serde(default, alias = "sourceURL")]
    pub source_url: String,
    #[serde(default)]
    pub is_inline: bool,
}
