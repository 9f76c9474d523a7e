//! Element snapshot extraction
//!
//! [`ElementSource`] is the seam between the evaluator and whatever renders
//! the page. [`ChromeElementSource`] reads computed styles from a live
//! [`BrowserSession`], one element at a time, so a browser that dies halfway
//! through still yields the elements read so far.

use crate::browser::BrowserSession;
use crate::error::{Result, StyleGateError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stylegate_core::{truncate_text, ElementStyleSnapshot};
use tracing::{debug, info, warn};

/// Snapshots read from one page, plus what happened while reading them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBatch {
    /// Visible, text-bearing, non-icon elements in page order
    pub snapshots: Vec<ElementStyleSnapshot>,
    /// Elements matched by the selector
    pub matched: usize,
    /// Matched elements filtered out (hidden, empty, icon)
    pub skipped: usize,
    /// Elements that could not be read and were skipped
    pub failed: usize,
    /// Reading stopped early because the browser went away
    pub interrupted: bool,
}

impl SnapshotBatch {
    /// Batch of already-filtered snapshots
    pub fn from_snapshots(snapshots: Vec<ElementStyleSnapshot>) -> Self {
        Self {
            matched: snapshots.len(),
            snapshots,
            ..Default::default()
        }
    }

    /// Number of elements handed to the evaluator
    pub fn checked(&self) -> usize {
        self.snapshots.len()
    }
}

/// Anything that can list the style snapshots of the elements matching a selector
#[async_trait]
pub trait ElementSource: Send + Sync {
    async fn collect_snapshots(&self, selector: &str) -> Result<SnapshotBatch>;
}

/// Runs against the element as `this`. Returns a JSON string so the result
/// survives CDP's by-reference object handling; `"null"` marks a filtered element.
const EXTRACT_STYLE_FN: &str = r#"function() {
    const el = this;
    const text = (el.textContent || "").trim();
    const tagName = el.tagName.toLowerCase();
    const isLikelyIcon = tagName === 'i' || el.classList.contains('icon');
    const visible = typeof el.checkVisibility === 'function'
        ? el.checkVisibility()
        : el.getClientRects().length > 0;
    if (!visible || text.length === 0 || isLikelyIcon) {
        return JSON.stringify(null);
    }
    const style = window.getComputedStyle(el);
    return JSON.stringify({
        tagName,
        textContent: text,
        color: style.color,
        fontFamily: style.fontFamily,
        fontSize: style.fontSize,
        fontStyle: style.fontStyle,
        lineHeight: style.lineHeight,
        fontWeight: style.fontWeight,
        textTransform: style.textTransform,
        letterSpacing: style.letterSpacing
    });
}"#;

/// Decode the extraction script's result; `None` means the element was filtered out
pub fn parse_extraction(value: Option<serde_json::Value>) -> Result<Option<ElementStyleSnapshot>> {
    let raw = match value {
        Some(serde_json::Value::String(raw)) => raw,
        Some(serde_json::Value::Null) | None => return Ok(None),
        Some(other) => {
            return Err(StyleGateError::Browser(format!(
                "Unexpected extraction result: {}",
                other
            )))
        }
    };

    let snapshot: Option<ElementStyleSnapshot> = serde_json::from_str(&raw)?;
    Ok(snapshot.map(|mut s| {
        s.tag_name = s.tag_name.to_lowercase();
        s.text_content = truncate_text(&s.text_content);
        s
    }))
}

/// [`ElementSource`] backed by a live Chrome tab
pub struct ChromeElementSource<'a> {
    session: &'a BrowserSession,
}

impl<'a> ChromeElementSource<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session }
    }

    fn extract_all(&self, selector: &str) -> Result<SnapshotBatch> {
        let tab = self.session.tab();
        let elements = tab.find_elements(selector).map_err(|e| {
            self.session
                .classify(format!("Failed to query {}: {}", selector, e))
        });

        // No matches is not an error for an audit; the page just has nothing to check.
        let elements = match elements {
            Ok(elements) => elements,
            Err(e) if e.is_collaborator_unavailable() => return Err(e),
            Err(e) => {
                debug!("{}", e);
                Vec::new()
            }
        };

        info!("Found {} potential elements to analyze", elements.len());

        let mut batch = SnapshotBatch {
            matched: elements.len(),
            ..Default::default()
        };

        for (index, element) in elements.iter().enumerate() {
            let extracted = element
                .call_js_fn(EXTRACT_STYLE_FN, vec![], false)
                .map_err(|e| {
                    self.session
                        .classify(format!("Failed to read element {}: {}", index, e))
                })
                .and_then(|remote| parse_extraction(remote.value));

            match extracted {
                Ok(Some(snapshot)) => {
                    debug!("Read <{}> \"{}\"", snapshot.tag_name, snapshot.text_content);
                    batch.snapshots.push(snapshot);
                }
                Ok(None) => batch.skipped += 1,
                Err(e) if e.is_collaborator_unavailable() => {
                    warn!(
                        "Stopping after {} of {} elements: {}",
                        index,
                        batch.matched,
                        e
                    );
                    batch.interrupted = true;
                    break;
                }
                Err(e) => {
                    warn!("Skipping element {}: {}", index, e);
                    batch.failed += 1;
                }
            }
        }

        Ok(batch)
    }
}

#[async_trait]
impl<'a> ElementSource for ChromeElementSource<'a> {
    async fn collect_snapshots(&self, selector: &str) -> Result<SnapshotBatch> {
        self.extract_all(selector)
    }
}
