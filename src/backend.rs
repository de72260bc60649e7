//! Seam to the browser-instrumentation transport
//!
//! The engine never talks to a browser directly; it consumes the four
//! operations below through `StyleBackend`. Implementations wrap a
//! DevTools connection (or a fixture, in tests). `fetch_matched_styles`
//! is called from rayon worker threads, hence the `Sync` bound.

use crate::error::Result;
use crate::protocol::{
    CaptureSnapshotResponse, MatchedStyles, NodeId, ProtocolNode, StyleSheetHeader, StyleSheetId,
};
use rustc_hash::FxHashMap;
use std::sync::mpsc::{channel, Receiver, Sender};

/// External collaborator owning the transport to the inspected page
pub trait StyleBackend: Sync {
    /// Capture the flattened document snapshot, tracking the given
    /// computed-style properties. One call per analysis.
    fn capture_document_snapshot(&self, tracked_properties: &[&str]) -> Result<CaptureSnapshotResponse>;

    /// Fetch the full, non-flattened node list. One call per analysis.
    fn list_all_nodes(&self) -> Result<Vec<ProtocolNode>>;

    /// Fetch the matched-styles breakdown for one element. Called once
    /// per node in the budgeted analyzed subset, concurrently.
    fn fetch_matched_styles(&self, node_id: NodeId) -> Result<MatchedStyles>;

    /// Subscribe to stylesheet-registration events for the duration of
    /// the analysis.
    fn watch_stylesheets(&self) -> Result<StyleSheetWatch>;
}

/// Live subscription to stylesheet-registration events
///
/// Headers are buffered on a channel while the analysis runs and
/// drained once at the end. Dropping the watch (or collecting it)
/// runs the unsubscribe hook.
pub struct StyleSheetWatch {
    rx: Receiver<StyleSheetHeader>,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl StyleSheetWatch {
    /// Channel-backed watch with no unsubscribe hook; the returned
    /// sender is the event source.
    pub fn new() -> (Sender<StyleSheetHeader>, Self) {
        let (tx, rx) = channel();
        (tx, StyleSheetWatch { rx, unsubscribe: None })
    }

    /// Wrap an existing receiver, running `unsubscribe` when the watch
    /// ends.
    pub fn with_unsubscribe(
        rx: Receiver<StyleSheetHeader>,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        StyleSheetWatch {
            rx,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Drain every header seen so far into an id-keyed map and end the
    /// subscription. Later registrations of the same id win.
    pub fn collect(mut self) -> FxHashMap<StyleSheetId, StyleSheetHeader> {
        let mut sheets = FxHashMap::default();
        while let Ok(header) = self.rx.try_recv() {
            sheets.insert(header.style_sheet_id.clone(), header);
        }
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
        sheets
    }
}

impl Drop for StyleSheetWatch {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
